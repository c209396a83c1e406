//! Replication status snapshot

use bson::{Bson, Document};

/// Opaque `replSetGetStatus` reply.
///
/// The seeder does not interpret it; it is surfaced to the caller for logging
/// and assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationStatus(Document);

impl ReplicationStatus {
    pub fn new(document: Document) -> Self {
        Self(document)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    /// Relaxed extended JSON rendering.
    pub fn to_json(&self) -> serde_json::Value {
        Bson::Document(self.0.clone()).into_relaxed_extjson()
    }
}

impl From<Document> for ReplicationStatus {
    fn from(document: Document) -> Self {
        Self(document)
    }
}
