use std::marker::PhantomData;

use crate::collection::{Document, DocumentId};
use crate::common::RESERVED_FIELDS;
use crate::errors::DocketResult;
use crate::filter::Filter;
use crate::query::{PageMeta, QueryPlan};
use crate::repository::{DeltaOp, Entity, Repository};
use crate::store::WriteResult;

/// A [Repository] that reads and writes a typed [Entity].
pub struct EntityRepository<T: Entity> {
    repository: Repository,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for EntityRepository<T> {
    fn clone(&self) -> Self {
        EntityRepository {
            repository: self.repository.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entity> EntityRepository<T> {
    pub(crate) fn new(repository: Repository) -> Self {
        EntityRepository {
            repository,
            _phantom: PhantomData,
        }
    }

    /// The underlying document repository.
    pub fn documents(&self) -> &Repository {
        &self.repository
    }

    pub fn create(&self, entity: &T) -> DocketResult<T> {
        let document = self.repository.create(&to_candidate(entity)?)?;
        T::from_document(&document)
    }

    pub fn create_many(&self, entities: &[T]) -> DocketResult<Vec<T>> {
        let candidates = entities.iter().map(to_candidate).collect::<DocketResult<Vec<_>>>()?;
        self.repository
            .create_many(&candidates)?
            .iter()
            .map(T::from_document)
            .collect()
    }

    pub fn get(&self, id: &DocumentId) -> DocketResult<T> {
        T::from_document(&self.repository.get(id)?)
    }

    /// Replaces every mapped field of the stored entity with the values of
    /// `entity`.
    pub fn update(&self, id: &DocumentId, entity: &T) -> DocketResult<T> {
        let document = self.repository.update(id, &to_candidate(entity)?)?;
        T::from_document(&document)
    }

    pub fn apply_delta(&self, id: &DocumentId, ops: &[DeltaOp]) -> DocketResult<T> {
        T::from_document(&self.repository.apply_delta(id, ops)?)
    }

    pub fn delete(&self, id: &DocumentId, soft: bool) -> DocketResult<WriteResult> {
        self.repository.delete(id, soft)
    }

    pub fn reactivate(&self, id: &DocumentId) -> DocketResult<T> {
        T::from_document(&self.repository.reactivate(id)?)
    }

    /// Lists entities. Lookups attach documents the entity mapping may ignore.
    pub fn list(&self, plan: &QueryPlan) -> DocketResult<(Vec<T>, PageMeta)> {
        let page = self.repository.list(plan)?;
        let meta = page.meta().clone();
        let entities = page
            .documents()
            .iter()
            .map(T::from_document)
            .collect::<DocketResult<Vec<_>>>()?;
        Ok((entities, meta))
    }

    pub fn count(&self, filter: &Filter) -> DocketResult<u64> {
        self.repository.count(filter)
    }
}

// an entity read back from the store carries the lifecycle fields
fn to_candidate<T: Entity>(entity: &T) -> DocketResult<Document> {
    let mut document = entity.to_document()?;
    for reserved in RESERVED_FIELDS {
        document.remove(reserved)?;
    }
    Ok(document)
}
