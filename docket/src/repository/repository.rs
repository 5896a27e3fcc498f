use std::sync::Arc;

use chrono::Utc;

use crate::collection::{Document, DocumentId};
use crate::common::{CREATED_AT, DELETED_AT, FIELD_SEPARATOR, IS_ACTIVE, RESERVED_FIELDS, UPDATED_AT};
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::{and, by_id, field, Filter};
use crate::query::{Page, QueryDefaults, QueryExecutor, QueryPlan};
use crate::repository::delta::to_update_spec;
use crate::repository::DeltaOp;
use crate::store::{DocumentStore, UpdateSpec, WriteResult};
use crate::validation::{Schema, Validator, Violation};

/// The data-access contract of one collection.
///
/// A repository validates input against its schema before any store
/// interaction, owns the lifecycle fields (`created_at`, `updated_at`,
/// `is_active`, `deleted_at`) and hides soft-deleted documents from reads.
/// It is cheap to clone and can be shared between threads.
///
/// ```rust,ignore
/// let products = docket.repository("products", schema)?;
/// let widget = products.create(&doc! { name: "Widget", price: 10, cost: 5 })?;
/// let id = widget.id().unwrap();
/// products.update(&id, &doc! { price: 12 })?;
/// products.delete(&id, true)?;
/// ```
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    name: String,
    store: DocumentStore,
    validator: Validator,
    defaults: QueryDefaults,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Creates a repository over the `name` collection of `store`.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for a blank name, and the errors of [Validator::new].
    pub fn new(name: &str, store: DocumentStore, schema: Schema, defaults: QueryDefaults) -> DocketResult<Repository> {
        if name.trim().is_empty() {
            log::error!("Repository name cannot be empty");
            return Err(DocketError::new(
                "Repository name cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        let validator = Validator::new(schema)?;
        Ok(Repository {
            inner: Arc::new(RepositoryInner {
                name: name.to_string(),
                store,
                validator,
                defaults,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn schema(&self) -> &Schema {
        self.inner.validator.schema()
    }

    pub fn validator(&self) -> &Validator {
        &self.inner.validator
    }

    /// Declares `field` unique within the collection.
    pub fn ensure_unique(&self, field: &str) -> DocketResult<()> {
        self.inner.store.ensure_unique(&self.inner.name, field)
    }

    /// Validates and persists a new document.
    ///
    /// The returned document carries the generated `id`, `created_at`,
    /// `updated_at` and `is_active = true`.
    pub fn create(&self, candidate: &Document) -> DocketResult<Document> {
        let validated = self.inner.validator.validate(candidate)?;
        let document = stamp_new(validated)?;
        self.inner.store.insert_one(&self.inner.name, document.clone())?;
        log::debug!("Created {} in {}", document.get("id"), self.inner.name);
        Ok(document)
    }

    /// Validates every candidate, then persists them all.
    ///
    /// Nothing is written when any candidate fails; violations are reported
    /// with the candidate's position (`[2].price`).
    pub fn create_many(&self, candidates: &[Document]) -> DocketResult<Vec<Document>> {
        let mut violations = Vec::new();
        let mut validated = Vec::with_capacity(candidates.len());

        for (index, candidate) in candidates.iter().enumerate() {
            match self.inner.validator.validate(candidate) {
                Ok(document) => validated.push(document),
                Err(err) if err.is_validation() => {
                    violations.extend(err.violations().iter().map(|v| v.for_index(index)));
                }
                Err(err) => return Err(err),
            }
        }

        if !violations.is_empty() {
            log::error!("Batch of {} rejected with {} violation(s)", candidates.len(), violations.len());
            return Err(DocketError::validation(violations));
        }

        let documents = validated
            .into_iter()
            .map(stamp_new)
            .collect::<DocketResult<Vec<_>>>()?;
        self.inner.store.insert_many(&self.inner.name, documents.clone())?;
        Ok(documents)
    }

    /// Returns the active document with the given id.
    pub fn get(&self, id: &DocumentId) -> DocketResult<Document> {
        self.inner
            .store
            .find_one(&self.inner.name, &active_by_id(id))?
            .ok_or_else(|| self.not_found(id))
    }

    /// Merges the validated fields into the active document and returns it.
    pub fn update(&self, id: &DocumentId, fields: &Document) -> DocketResult<Document> {
        self.update_with_result(id, fields)?;
        self.get(id)
    }

    /// Merges the validated fields into the active document.
    ///
    /// Only the supplied fields are validated, then every cross-field rule
    /// that names one of them is checked against the merged document before
    /// it is committed. `updated_at` is refreshed only when a value changed.
    pub fn update_with_result(&self, id: &DocumentId, fields: &Document) -> DocketResult<WriteResult> {
        let validated = self.inner.validator.validate_partial(fields)?;
        let touched = validated.keys().cloned().collect::<Vec<_>>();
        let spec = self.guarded(UpdateSpec::from_document(&validated), touched);

        let result = self.inner.store.update_one(&self.inner.name, &active_by_id(id), &spec)?;
        if result.matched_count() == 0 {
            return Err(self.not_found(id));
        }
        Ok(result)
    }

    /// Applies `ops` to the active document in one atomic store update.
    ///
    /// Values produced by the deltas are re-validated against the schema
    /// rules of the fields they touch. A [DeltaOp::ReplaceElement] whose
    /// element is absent reports `NotFound`.
    pub fn apply_delta(&self, id: &DocumentId, ops: &[DeltaOp]) -> DocketResult<Document> {
        let reserved = ops
            .iter()
            .map(|op| op.field())
            .filter(|f| RESERVED_FIELDS.contains(&top_level(f)))
            .map(|f| Violation::new(f, "is managed by the repository"))
            .collect::<Vec<_>>();
        if !reserved.is_empty() {
            log::error!("Delta targets repository managed fields");
            return Err(DocketError::validation(reserved));
        }

        let mut filters = vec![active_by_id(id)];
        for (path, value) in ops.iter().filter_map(DeltaOp::required_element) {
            filters.push(field(&path).eq(value.clone()));
        }
        let filter = and(filters);

        let touched = ops.iter().map(|op| op.field().to_string()).collect::<Vec<_>>();
        let spec = self.guarded(to_update_spec(ops), touched);

        let result = self.inner.store.update_one(&self.inner.name, &filter, &spec)?;
        if result.matched_count() == 0 {
            return Err(self.not_found(id));
        }
        self.get(id)
    }

    /// Deletes a document.
    ///
    /// A soft delete marks the active document inactive and fails with
    /// `NotFound` when there is none. A hard delete removes the document
    /// whatever its state and reports `deleted_count = 0` for an unknown id.
    pub fn delete(&self, id: &DocumentId, soft: bool) -> DocketResult<WriteResult> {
        if !soft {
            let result = self.inner.store.delete_one(&self.inner.name, &by_id(id))?;
            log::debug!("Purged {} from {} ({})", id, self.inner.name, result.deleted_count());
            return Ok(result);
        }

        let spec = UpdateSpec::new()
            .set(IS_ACTIVE, false)
            .set(DELETED_AT, Utc::now())
            .stamp_on_change(UPDATED_AT);
        let result = self.inner.store.update_one(&self.inner.name, &active_by_id(id), &spec)?;
        if result.matched_count() == 0 {
            return Err(self.not_found(id));
        }
        Ok(result)
    }

    /// Makes a soft-deleted document active again and clears `deleted_at`.
    /// Reactivating an active document changes nothing.
    pub fn reactivate(&self, id: &DocumentId) -> DocketResult<Document> {
        let spec = UpdateSpec::new()
            .set(IS_ACTIVE, true)
            .unset(DELETED_AT)
            .stamp_on_change(UPDATED_AT);
        let result = self.inner.store.update_one(&self.inner.name, &by_id(id), &spec)?;
        if result.matched_count() == 0 {
            return Err(self.not_found(id));
        }
        self.get(id)
    }

    /// Runs a query plan. Inactive documents are excluded unless the plan
    /// includes them.
    pub fn list(&self, plan: &QueryPlan) -> DocketResult<Page> {
        let executor = QueryExecutor::new(&self.inner.store, &self.inner.defaults);
        if plan.includes_inactive() {
            executor.execute(&self.inner.name, plan)
        } else {
            let scoped = plan.clone().filter(active());
            executor.execute(&self.inner.name, &scoped)
        }
    }

    /// Counts the active documents matching `filter`.
    pub fn count(&self, filter: &Filter) -> DocketResult<u64> {
        self.inner
            .store
            .count(&self.inner.name, &and(vec![filter.clone(), active()]))
    }

    fn guarded(&self, spec: UpdateSpec, touched: Vec<String>) -> UpdateSpec {
        let validator = self.inner.validator.clone();
        spec.stamp_on_change(UPDATED_AT)
            .with_guard(move |merged| validator.validate_changes(merged, &touched))
    }

    fn not_found(&self, id: &DocumentId) -> DocketError {
        log::error!("No active document {} in {}", id, self.inner.name);
        DocketError::new(
            &format!("No active document {} in {}", id, self.inner.name),
            ErrorKind::NotFound,
        )
    }
}

fn active() -> Filter {
    field(IS_ACTIVE).ne(false)
}

fn active_by_id(id: &DocumentId) -> Filter {
    and(vec![by_id(id), active()])
}

fn top_level(path: &str) -> &str {
    path.split(FIELD_SEPARATOR).next().unwrap_or(path)
}

fn stamp_new(mut document: Document) -> DocketResult<Document> {
    let now = Utc::now();
    document.ensure_id();
    document.put(CREATED_AT, now)?;
    document.put(UPDATED_AT, now)?;
    document.put(IS_ACTIVE, true)?;
    Ok(document)
}
