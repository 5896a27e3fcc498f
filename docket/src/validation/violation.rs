use std::fmt::Display;

/// One failed constraint: the field path and a description of the constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Violation {
    field: String,
    constraint: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Violation {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn constraint(&self) -> &str {
        &self.constraint
    }

    /// Re-targets the violation to an indexed candidate, as in `[2].price`.
    pub fn for_index(&self, index: usize) -> Violation {
        Violation {
            field: format!("[{}].{}", index, self.field),
            constraint: self.constraint.clone(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}
