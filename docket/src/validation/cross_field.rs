use crate::collection::Document;
use crate::validation::Violation;
use std::sync::Arc;

type CustomCheck = Arc<dyn Fn(&Document) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
enum RuleKind {
    GreaterThan,
    ProductWithin { tolerance: f64 },
    Custom(CustomCheck),
}

/// A constraint spanning several fields of the same document.
///
/// A rule is skipped when one of its fields is absent or not a number; the
/// field rules report those cases.
#[derive(Clone)]
pub struct CrossFieldRule {
    name: String,
    fields: Vec<String>,
    kind: RuleKind,
}

impl CrossFieldRule {
    /// `field` must be strictly greater than `other`.
    pub fn greater_than(field: &str, other: &str) -> Self {
        CrossFieldRule {
            name: format!("{} > {}", field, other),
            fields: vec![field.to_string(), other.to_string()],
            kind: RuleKind::GreaterThan,
        }
    }

    /// `total` must equal `quantity * unit` within `tolerance`, inclusive:
    /// `|total - quantity * unit| <= tolerance`.
    pub fn product_within(total: &str, quantity: &str, unit: &str, tolerance: f64) -> Self {
        CrossFieldRule {
            name: format!("{} = {} * {}", total, quantity, unit),
            fields: vec![total.to_string(), quantity.to_string(), unit.to_string()],
            kind: RuleKind::ProductWithin { tolerance },
        }
    }

    /// A named rule over `fields`. The check returns the constraint message on
    /// failure; the violation is reported against the first field.
    pub fn custom<F>(name: &str, fields: &[&str], check: F) -> Self
    where
        F: Fn(&Document) -> Result<(), String> + Send + Sync + 'static,
    {
        CrossFieldRule {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            kind: RuleKind::Custom(Arc::new(check)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub(crate) fn check(&self, doc: &Document) -> Option<Violation> {
        match &self.kind {
            RuleKind::GreaterThan => {
                let value = doc.get(&self.fields[0]);
                let other = doc.get(&self.fields[1]);
                if value.is_null() || other.is_null() || !value.is_comparable_with(&other) {
                    return None;
                }
                if value > other {
                    None
                } else {
                    Some(Violation::new(
                        &self.fields[0],
                        format!("must be greater than {}", self.fields[1]),
                    ))
                }
            }
            RuleKind::ProductWithin { tolerance } => {
                let total = doc.get(&self.fields[0]).as_f64()?;
                let quantity = doc.get(&self.fields[1]).as_f64()?;
                let unit = doc.get(&self.fields[2]).as_f64()?;
                if (total - quantity * unit).abs() <= *tolerance {
                    None
                } else {
                    Some(Violation::new(
                        &self.fields[0],
                        format!(
                            "must equal {} * {} within {}",
                            self.fields[1], self.fields[2], tolerance
                        ),
                    ))
                }
            }
            RuleKind::Custom(check) => match check(doc) {
                Ok(()) => None,
                Err(message) => {
                    let field = self.fields.first().cloned().unwrap_or_else(|| self.name.clone());
                    Some(Violation::new(field, message))
                }
            },
        }
    }
}

impl std::fmt::Debug for CrossFieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CrossFieldRule({})", self.name)
    }
}
