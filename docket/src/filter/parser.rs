use crate::collection::Document;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::{Value, FIELD_SEPARATOR};

use super::{all, and, field, not, or, Filter};

const OPERATORS: [&str; 14] = [
    "eq", "ne", "gt", "gte", "lt", "lte", "in", "nin", "regex", "contains", "all", "any",
    "exists", "between",
];

/// Builds a [Filter] from a document-shaped description.
///
/// Top-level keys are field paths combined with AND. A plain value means
/// equality; a nested document whose keys are all operators applies those
/// operators to the field; a nested document without operator keys addresses
/// embedded fields. The keys `or`, `and` (arrays of descriptions) and `not`
/// (a description) combine sub-filters. Operators may carry a `$` prefix.
///
/// ```rust,ignore
/// let filter = parse_filter(&doc! {
///     price: { gte: 5, lte: 15 },
///     status: "open",
///     or: [{ category: "tools" }, { tags: { any: ["sale"] } }]
/// })?;
/// ```
///
/// # Errors
///
/// `FilterError` for an unknown operator, a document mixing operators and
/// plain keys, or an operand of the wrong type.
pub fn parse_filter(description: &Document) -> DocketResult<Filter> {
    let mut filters = Vec::new();
    parse_into(description, "", &mut filters)?;
    Ok(combine(filters))
}

fn combine(mut filters: Vec<Filter>) -> Filter {
    match filters.len() {
        0 => all(),
        1 => filters.remove(0),
        _ => and(filters),
    }
}

fn parse_into(description: &Document, prefix: &str, filters: &mut Vec<Filter>) -> DocketResult<()> {
    for (key, value) in description.iter() {
        let key = key.as_str();
        if prefix.is_empty() {
            match operator_name(key) {
                "or" => {
                    filters.push(or(parse_group(key, value)?));
                    continue;
                }
                "and" => {
                    filters.push(and(parse_group(key, value)?));
                    continue;
                }
                "not" => {
                    let inner = value.as_document().ok_or_else(|| operand_error(key, "a document"))?;
                    filters.push(not(parse_filter(inner)?));
                    continue;
                }
                _ => {}
            }
        }

        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
        };

        match value {
            Value::Document(nested) if !nested.is_empty() => {
                let operator_count = nested.keys().filter(|k| is_operator(k)).count();
                if operator_count == nested.size() {
                    for (op, operand) in nested.iter() {
                        filters.push(build_term(&path, operator_name(op), operand)?);
                    }
                } else if operator_count == 0 {
                    parse_into(nested, &path, filters)?;
                } else {
                    let unknown = nested
                        .keys()
                        .filter(|k| !is_operator(k))
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ");
                    log::error!("Unknown filter operator(s) {} for field {}", unknown, path);
                    return Err(DocketError::new(
                        &format!("Unknown filter operator(s) {} for field {}", unknown, path),
                        ErrorKind::FilterError,
                    ));
                }
            }
            other => filters.push(field(&path).eq(other.clone())),
        }
    }
    Ok(())
}

fn parse_group(key: &str, value: &Value) -> DocketResult<Vec<Filter>> {
    let items = value
        .as_array()
        .ok_or_else(|| operand_error(key, "an array of documents"))?;
    items
        .iter()
        .map(|item| {
            item.as_document()
                .ok_or_else(|| operand_error(key, "an array of documents"))
                .and_then(parse_filter)
        })
        .collect()
}

fn build_term(path: &str, op: &str, operand: &Value) -> DocketResult<Filter> {
    let term = match op {
        "eq" => field(path).eq(operand.clone()),
        "ne" => field(path).ne(operand.clone()),
        "gt" => field(path).gt(operand.clone()),
        "gte" => field(path).gte(operand.clone()),
        "lt" => field(path).lt(operand.clone()),
        "lte" => field(path).lte(operand.clone()),
        "in" => field(path).in_array(array_operand(op, operand)?),
        "nin" => field(path).not_in_array(array_operand(op, operand)?),
        "all" => field(path).contains_all(array_operand(op, operand)?),
        "any" => field(path).contains_any(array_operand(op, operand)?),
        "regex" => field(path).regex(string_operand(op, operand)?),
        "contains" => field(path).contains(string_operand(op, operand)?),
        "exists" => {
            let flag = operand.as_bool().ok_or_else(|| operand_error(op, "a bool"))?;
            field(path).exists(flag)
        }
        "between" => {
            let bounds = array_operand(op, operand)?;
            if bounds.len() != 2 {
                return Err(operand_error(op, "an array of two bounds"));
            }
            field(path).between_inclusive(bounds[0].clone(), bounds[1].clone())
        }
        unknown => {
            log::error!("Unknown filter operator {} for field {}", unknown, path);
            return Err(DocketError::new(
                &format!("Unknown filter operator {} for field {}", unknown, path),
                ErrorKind::FilterError,
            ));
        }
    };
    Ok(term)
}

fn operator_name(key: &str) -> &str {
    key.strip_prefix('$').unwrap_or(key)
}

fn is_operator(key: &str) -> bool {
    OPERATORS.contains(&operator_name(key))
}

fn array_operand(op: &str, operand: &Value) -> DocketResult<Vec<Value>> {
    operand
        .as_array()
        .cloned()
        .ok_or_else(|| operand_error(op, "an array"))
}

fn string_operand<'a>(op: &str, operand: &'a Value) -> DocketResult<&'a str> {
    operand.as_str().ok_or_else(|| operand_error(op, "a string"))
}

fn operand_error(op: &str, expected: &str) -> DocketError {
    log::error!("Filter operator {} expects {}", op, expected);
    DocketError::new(
        &format!("Filter operator {} expects {}", op, expected),
        ErrorKind::FilterError,
    )
}
