use crate::collection::Document;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::{and, parse_filter, Filter};
use crate::query::Lookup;
use crate::{SortOrder, SortableFields, Value};

/// The transient description of one list operation.
///
/// ```rust,ignore
/// let plan = QueryPlan::new()
///     .filter(field("price").between_inclusive(5, 15))
///     .sort_by("price", SortOrder::Descending)
///     .page(1, 2)
///     .lookup(Lookup::new("category_id", "categories", "category"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryPlan {
    filter: Option<Filter>,
    sort: SortableFields,
    skip: Option<u64>,
    limit: Option<u64>,
    include_inactive: bool,
    lookups: Vec<Lookup>,
    projection: Option<Vec<String>>,
}

impl QueryPlan {
    pub fn new() -> Self {
        QueryPlan::default()
    }

    /// Adds a filter. Several calls are combined with AND.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => and(vec![existing, filter]),
            None => filter,
        });
        self
    }

    /// Adds a sort key. Earlier keys take precedence.
    pub fn sort_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = self.sort.add_sorted_field(field.to_string(), order);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Selects a 1-based page of `page_size` documents. Page 0 reads as page 1.
    pub fn page(self, page: u64, page_size: u64) -> Self {
        let page = page.max(1);
        self.skip((page - 1).saturating_mul(page_size)).limit(page_size)
    }

    /// Includes soft-deleted documents in the results.
    pub fn include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = include;
        self
    }

    pub fn lookup(mut self, lookup: Lookup) -> Self {
        self.lookups.push(lookup);
        self
    }

    /// Keeps only the listed top-level fields (plus `id`) in the results.
    pub fn project(mut self, fields: &[&str]) -> Self {
        self.projection = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn get_filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn sort_fields(&self) -> &SortableFields {
        &self.sort
    }

    pub fn get_skip(&self) -> u64 {
        self.skip.unwrap_or(0)
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn includes_inactive(&self) -> bool {
        self.include_inactive
    }

    pub fn lookups(&self) -> &[Lookup] {
        &self.lookups
    }

    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    /// Builds a plan from an API-shaped query document.
    ///
    /// Recognised keys: `filter` (see [parse_filter]), `sort` (`"-price"`,
    /// `["-price", "name"]` or `[{field: "price", order: "desc"}]`), `skip`,
    /// `limit`, `page` with `page_size`, `include_inactive` and `fields`.
    ///
    /// # Errors
    ///
    /// `FilterError` for unknown keys or malformed values.
    pub fn from_document(query: &Document) -> DocketResult<QueryPlan> {
        let mut plan = QueryPlan::new();
        let mut page = None;
        let mut page_size = None;

        for (key, value) in query.iter() {
            match key.as_str() {
                "filter" => {
                    let description = value.as_document().ok_or_else(|| query_error(key, "a document"))?;
                    plan = plan.filter(parse_filter(description)?);
                }
                "sort" => {
                    for (field, order) in parse_sort(value)? {
                        plan = plan.sort_by(&field, order);
                    }
                }
                "skip" => plan = plan.skip(non_negative(key, value)?),
                "limit" => plan = plan.limit(non_negative(key, value)?),
                "page" => page = Some(non_negative(key, value)?),
                "page_size" => page_size = Some(non_negative(key, value)?),
                "include_inactive" => {
                    let flag = value.as_bool().ok_or_else(|| query_error(key, "a bool"))?;
                    plan = plan.include_inactive(flag);
                }
                "fields" => {
                    let fields = value.as_array().ok_or_else(|| query_error(key, "an array of strings"))?;
                    let names = fields
                        .iter()
                        .map(|f| f.as_str().ok_or_else(|| query_error(key, "an array of strings")))
                        .collect::<DocketResult<Vec<&str>>>()?;
                    plan = plan.project(&names);
                }
                unknown => {
                    log::error!("Unknown query key {}", unknown);
                    return Err(DocketError::new(
                        &format!("Unknown query key {}", unknown),
                        ErrorKind::FilterError,
                    ));
                }
            }
        }

        match (page, page_size) {
            (Some(page), Some(size)) => plan = plan.page(page, size),
            (Some(page), None) => {
                let size = plan.get_limit().unwrap_or(crate::DEFAULT_PAGE_SIZE);
                plan = plan.page(page, size);
            }
            (None, Some(size)) => plan = plan.limit(size),
            (None, None) => {}
        }
        Ok(plan)
    }
}

fn parse_sort(value: &Value) -> DocketResult<Vec<(String, SortOrder)>> {
    match value {
        Value::String(key) => Ok(key
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(SortOrder::parse_key)
            .collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(key) => Ok(SortOrder::parse_key(key)),
                Value::Document(spec) => {
                    let field = spec
                        .get("field")
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| query_error("sort", "a field name"))?;
                    let order = match spec.get("order").as_str() {
                        None | Some("asc") | Some("ascending") => SortOrder::Ascending,
                        Some("desc") | Some("descending") => SortOrder::Descending,
                        Some(_) => return Err(query_error("sort", "order asc or desc")),
                    };
                    Ok((field, order))
                }
                _ => Err(query_error("sort", "strings or {field, order} documents")),
            })
            .collect(),
        _ => Err(query_error("sort", "a string or an array")),
    }
}

fn non_negative(key: &str, value: &Value) -> DocketResult<u64> {
    value
        .as_i64()
        .and_then(|v| u64::try_from(v).ok())
        .ok_or_else(|| query_error(key, "a non-negative integer"))
}

fn query_error(key: &str, expected: &str) -> DocketError {
    log::error!("Query key {} expects {}", key, expected);
    DocketError::new(
        &format!("Query key {} expects {}", key, expected),
        ErrorKind::FilterError,
    )
}
