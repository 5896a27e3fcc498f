use crate::collection::Document;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::validation::{Schema, Violation};
use crate::RESERVED_FIELDS;
use std::sync::Arc;

/// Checks documents against a [Schema].
///
/// Validation never touches storage and never stops at the first failure:
/// every violation is collected into one `ValidationError`.
#[derive(Clone)]
pub struct Validator {
    schema: Arc<Schema>,
}

impl Validator {
    /// Creates a validator.
    ///
    /// # Errors
    ///
    /// `ConfigError` if a rule is malformed, `InvalidOperation` if the schema
    /// declares a repository-managed field.
    pub fn new(schema: Schema) -> DocketResult<Validator> {
        schema.check()?;
        if let Some(reserved) = schema.field_names().find(|f| RESERVED_FIELDS.contains(&f.as_str())) {
            log::error!("Schema declares reserved field {}", reserved);
            return Err(DocketError::new(
                &format!("Schema may not declare reserved field {}", reserved),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(Validator {
            schema: Arc::new(schema),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validates a complete candidate.
    ///
    /// A passing candidate is returned with its field values unchanged, except
    /// RFC 3339 strings in timestamp fields which become timestamps.
    pub fn validate(&self, candidate: &Document) -> DocketResult<Document> {
        self.run(candidate, false)
    }

    /// Validates only the supplied fields, as for a partial update.
    ///
    /// `required` is not enforced, and a cross-field rule runs only when every
    /// field it names is supplied.
    pub fn validate_partial(&self, fields: &Document) -> DocketResult<Document> {
        self.run(fields, true)
    }

    /// Re-validates a stored document after the fields in `touched` changed.
    ///
    /// Field rules run for the touched fields; cross-field rules run when
    /// they name at least one touched field and are evaluated against the
    /// whole document.
    pub fn validate_changes(&self, merged: &Document, touched: &[String]) -> DocketResult<()> {
        let mut violations = Vec::new();
        let is_touched = |field: &str| {
            touched
                .iter()
                .any(|t| t == field || top_level(t) == top_level(field))
        };

        for name in self.schema.field_names() {
            if !is_touched(name.as_str()) {
                continue;
            }
            if let Some(rule) = self.schema.field_rule(name) {
                rule.check(name, &merged.get(name), &mut violations);
            }
        }

        for rule in self.schema.cross_field_rules() {
            if rule.fields().iter().any(|f| is_touched(f.as_str())) {
                if let Some(violation) = rule.check(merged) {
                    violations.push(violation);
                }
            }
        }

        finish(violations).map(|_| ())
    }

    fn run(&self, candidate: &Document, partial: bool) -> DocketResult<Document> {
        let mut violations = Vec::new();
        for reserved in RESERVED_FIELDS {
            if candidate.contains_key(reserved) {
                violations.push(Violation::new(reserved, "is managed by the repository"));
            }
        }

        let validated = self.schema.check_document(candidate, "", partial, &mut violations);
        finish(violations)?;
        Ok(validated)
    }
}

fn top_level(path: &str) -> &str {
    path.split(crate::FIELD_SEPARATOR).next().unwrap_or(path)
}

fn finish(violations: Vec<Violation>) -> DocketResult<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        log::error!("Validation failed with {} violation(s)", violations.len());
        Err(DocketError::validation(violations))
    }
}
