//! Remote note gateways: typed operations against the authoritative store.
use crate::errors::GatewayError;
use crate::note::{Note, NoteId, OwnerId};
use futures::future::BoxFuture;
use std::sync::Arc;

mod in_memory;
mod postgresql;
pub mod util;

#[cfg(test)]
mod tests;

pub use in_memory::InMemoryGateway;
pub use postgresql::{PostgresGateway, PostgresGatewayBuilder};

/// Fields supplied when creating a note. Everything is optional: an empty
/// draft produces an untitled root note.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub parent_id: Option<NoteId>,
}

/// Partial update of a note's user-editable fields. `None` leaves the remote
/// value unchanged.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// An abstraction for the remote authoritative store.
///
/// All operations are scoped to an [`OwnerId`]. Reads that match no rows are
/// normal empty results, never errors; only rejected writes and transport
/// failures produce a [`GatewayError`].
pub trait NoteGateway: Send + Sync {
    /// Insert a new note. The store assigns the [`NoteId`] and `created_at`.
    ///
    /// Fails with [`GatewayError::RemoteWrite`] when the store rejects the
    /// insert, e.g. for an invalid parent.
    fn create<'a>(
        &'a self,
        owner: &'a OwnerId,
        draft: NoteDraft,
    ) -> BoxFuture<'a, Result<Note, GatewayError>>;
    /// Direct children of `parent`, or the owner's root notes when `parent`
    /// is `None`. Ordered newest first.
    fn children<'a>(
        &'a self,
        owner: &'a OwnerId,
        parent: Option<NoteId>,
    ) -> BoxFuture<'a, Result<Vec<Note>, GatewayError>>;
    /// Fetch one note by id, scoped to the owner.
    fn find_one<'a>(
        &'a self,
        owner: &'a OwnerId,
        id: NoteId,
    ) -> BoxFuture<'a, Result<Option<Note>, GatewayError>>;
    /// Partial update of title and/or content; unsupplied fields are left
    /// unchanged remotely. `Ok(None)` when the row no longer exists.
    fn update(
        &self,
        id: NoteId,
        patch: NotePatch,
    ) -> BoxFuture<'_, Result<Option<Note>, GatewayError>>;
    /// Case-insensitive substring match against title or content, ordered
    /// newest first.
    fn search<'a>(
        &'a self,
        owner: &'a OwnerId,
        keyword: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Note>, GatewayError>>;
    /// Cascading delete of the note and all of its descendants at the store,
    /// however many of them the client has fetched. Must go through the
    /// store's atomic recursive-delete operation; deleting locally-known
    /// descendants one by one would leave unfetched rows behind.
    fn delete(&self, id: NoteId) -> BoxFuture<'_, Result<(), GatewayError>>;
}

pub type SharedGateway = Arc<dyn NoteGateway>;
