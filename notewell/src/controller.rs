//! Tree-navigation controller: lazy expansion of the note tree plus
//! create/delete orchestration between the gateway and the cache.
use crate::cache::NoteCache;
use crate::errors::GatewayError;
use crate::gateway::{NoteDraft, SharedGateway};
use crate::note::{Note, NoteId, OwnerId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Signal to the (out-of-scope) view layer about where to go after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    ToNote(NoteId),
    ToRoot,
}

/// Per-session navigation state. Ids absent from the expansion map are
/// collapsed.
pub struct TreeController {
    owner: OwnerId,
    gateway: SharedGateway,
    cache: Arc<NoteCache>,
    expanded: RwLock<HashMap<NoteId, bool>>,
}

impl TreeController {
    pub fn new(owner: OwnerId, gateway: SharedGateway, cache: Arc<NoteCache>) -> Self {
        TreeController {
            owner,
            gateway,
            cache,
            expanded: RwLock::new(HashMap::new()),
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn cache(&self) -> &NoteCache {
        &self.cache
    }

    pub async fn is_expanded(&self, id: NoteId) -> bool {
        self.expanded.read().await.get(&id).copied().unwrap_or(false)
    }

    /// Fetch the owner's root notes and merge them into the cache.
    pub async fn load_roots(&self) -> Result<Vec<Note>, GatewayError> {
        let roots = self.gateway.children(&self.owner, None).await?;
        self.cache.merge(roots.clone()).await;
        Ok(roots)
    }

    /// Toggle a node. Collapsing just flips the flag; expanding fetches the
    /// children, merges them, then flips. Re-expanding re-fetches: the merge
    /// is idempotent, so the redundant round trip is wasteful but safe.
    /// Returns the new expansion state.
    pub async fn toggle(&self, id: NoteId) -> Result<bool, GatewayError> {
        if self.is_expanded(id).await {
            self.expanded.write().await.insert(id, false);
            return Ok(false);
        }
        let children = self.gateway.children(&self.owner, Some(id)).await?;
        self.cache.merge(children).await;
        self.expanded.write().await.insert(id, true);
        Ok(true)
    }

    /// Create a note under `parent` (`None` for a root note), merge it into
    /// the cache, and mark the parent expanded so the new note is visible.
    pub async fn create_child(
        &self,
        parent: Option<NoteId>,
    ) -> Result<(Note, Navigation), GatewayError> {
        let note = self
            .gateway
            .create(
                &self.owner,
                NoteDraft {
                    title: None,
                    parent_id: parent,
                },
            )
            .await?;
        self.cache.merge(vec![note.clone()]).await;
        if let Some(parent) = parent {
            self.expanded.write().await.insert(parent, true);
        }
        tracing::info!(id = %note.id, ?parent, "created note");
        let navigation = Navigation::ToNote(note.id);
        Ok((note, navigation))
    }

    /// Cascading delete. The gateway goes first; only on success is the
    /// cached subtree removed, so a rejected delete leaves the tree exactly
    /// as the remote store still has it.
    pub async fn delete(&self, id: NoteId) -> Result<Navigation, GatewayError> {
        self.gateway.delete(id).await?;
        self.cache.remove_subtree(id).await;
        self.expanded.write().await.remove(&id);
        tracing::info!(%id, "deleted note subtree");
        Ok(Navigation::ToRoot)
    }
}
