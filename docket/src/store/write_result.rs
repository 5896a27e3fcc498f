use crate::collection::DocumentId;

/// The outcome of a store write.
///
/// `matched_count` and `modified_count` tell "found nothing" apart from
/// "found but no change".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    matched_count: u64,
    modified_count: u64,
    inserted_ids: Vec<DocumentId>,
    deleted_count: u64,
}

impl WriteResult {
    pub fn inserted(inserted_ids: Vec<DocumentId>) -> Self {
        WriteResult {
            inserted_ids,
            ..Default::default()
        }
    }

    pub fn updated(matched_count: u64, modified_count: u64) -> Self {
        WriteResult {
            matched_count,
            modified_count,
            ..Default::default()
        }
    }

    pub fn deleted(deleted_count: u64) -> Self {
        WriteResult {
            matched_count: deleted_count,
            deleted_count,
            ..Default::default()
        }
    }

    pub fn matched_count(&self) -> u64 {
        self.matched_count
    }

    pub fn modified_count(&self) -> u64 {
        self.modified_count
    }

    pub fn inserted_ids(&self) -> &[DocumentId] {
        &self.inserted_ids
    }

    pub fn deleted_count(&self) -> u64 {
        self.deleted_count
    }
}
