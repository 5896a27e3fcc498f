use crate::collection::Document;
use crate::errors::DocketResult;
use crate::validation::{CrossFieldRule, FieldRule, Violation};
use crate::FIELD_SEPARATOR;
use indexmap::IndexMap;

/// A set of field rules and cross-field rules for one collection.
///
/// Fields not declared in the schema are accepted as they are unless the
/// schema is [strict](Schema::strict).
#[derive(Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldRule>,
    cross_field_rules: Vec<CrossFieldRule>,
    strict: bool,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Declares a top-level field. Declaring a field twice replaces its rule.
    pub fn field(mut self, name: &str, rule: FieldRule) -> Self {
        self.fields.insert(name.to_string(), rule);
        self
    }

    pub fn rule(mut self, rule: CrossFieldRule) -> Self {
        self.cross_field_rules.push(rule);
        self
    }

    /// Rejects fields that are not declared.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn field_rule(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn cross_field_rules(&self) -> &[CrossFieldRule] {
        &self.cross_field_rules
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Reports the first malformed rule, searching nested schemas too.
    pub(crate) fn check(&self) -> DocketResult<()> {
        for rule in self.fields.values() {
            if let Some(error) = rule.error() {
                return Err(error.clone());
            }
            if let Some(nested) = rule.nested_schema() {
                nested.check()?;
            }
        }
        Ok(())
    }

    /// Validates `doc` and returns it with normalized values.
    ///
    /// In partial mode absent fields are skipped, `required` is not enforced
    /// and a cross-field rule only runs when every field it names is present.
    pub(crate) fn check_document(
        &self,
        doc: &Document,
        prefix: &str,
        partial: bool,
        violations: &mut Vec<Violation>,
    ) -> Document {
        let mut out = doc.clone();

        for (name, rule) in self.fields.iter() {
            let present = doc.contains_key(name);
            if partial && !present {
                continue;
            }
            let path = join(prefix, name);
            let normalized = rule.check_value(&path, &doc.get(name), partial, violations);
            if present {
                out.put_raw(name, normalized);
            }
        }

        if self.strict {
            for key in doc.keys() {
                if !self.fields.contains_key(key) && !crate::RESERVED_FIELDS.contains(&key.as_str()) {
                    violations.push(Violation::new(join(prefix, key), "is not allowed"));
                }
            }
        }

        for rule in self.cross_field_rules.iter() {
            if partial && !rule.fields().iter().all(|f| doc.contains_field(f)) {
                continue;
            }
            if let Some(violation) = rule.check(&out) {
                violations.push(Violation::new(
                    join(prefix, violation.field()),
                    violation.constraint(),
                ));
            }
        }

        out
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", prefix, FIELD_SEPARATOR, name)
    }
}
