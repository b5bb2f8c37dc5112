//! Session: the per-user context object tying gateway, cache, controller,
//! and change subscription together.
//!
//! One session is constructed per signed-in user and torn down on sign-out;
//! nothing in the crate lives in ambient global state.
use crate::bridge::{NoteChange, SharedBridge};
use crate::cache::NoteCache;
use crate::controller::TreeController;
use crate::errors::GatewayError;
use crate::gateway::{NotePatch, SharedGateway};
use crate::note::{Note, NoteId, OwnerId};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub struct Session {
    owner: OwnerId,
    gateway: SharedGateway,
    cache: Arc<NoteCache>,
    controller: TreeController,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Subscribe to the owner's change feed and start reconciling remote
    /// changes into the cache.
    pub async fn start(
        owner: OwnerId,
        gateway: SharedGateway,
        bridge: SharedBridge,
    ) -> Result<Self, GatewayError> {
        let cache = Arc::new(NoteCache::new());
        let mut subscription = bridge.subscribe(&owner).await?;
        let pump_cache = Arc::clone(&cache);
        let pump = tokio::spawn(async move {
            while let Some(change) = subscription.recv().await {
                match change {
                    NoteChange::Upserted(note) => {
                        tracing::debug!(id = %note.id, "remote upsert");
                        pump_cache.merge(vec![note]).await;
                    }
                    NoteChange::Removed(id) => {
                        tracing::debug!(%id, "remote removal");
                        pump_cache.remove_subtree(id).await;
                    }
                }
            }
            tracing::debug!("change subscription ended");
        });
        let controller =
            TreeController::new(owner.clone(), Arc::clone(&gateway), Arc::clone(&cache));
        Ok(Session {
            owner,
            gateway,
            cache,
            controller,
            pump: Mutex::new(Some(pump)),
        })
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn controller(&self) -> &TreeController {
        &self.controller
    }

    pub fn cache(&self) -> &NoteCache {
        &self.cache
    }

    /// Fetch one note from the store and cache it. Used when navigating
    /// straight to a note that was never expanded into view.
    pub async fn fetch_note(&self, id: NoteId) -> Result<Option<Note>, GatewayError> {
        let note = self.gateway.find_one(&self.owner, id).await?;
        if let Some(ref note) = note {
            self.cache.merge(vec![note.clone()]).await;
        }
        Ok(note)
    }

    /// Persist edited title/content and reconcile the store's row back into
    /// the cache. `Ok(None)` when the note vanished remotely meanwhile.
    pub async fn save_note(
        &self,
        id: NoteId,
        patch: NotePatch,
    ) -> Result<Option<Note>, GatewayError> {
        let note = self.gateway.update(id, patch).await?;
        if let Some(ref note) = note {
            self.cache.merge(vec![note.clone()]).await;
        }
        Ok(note)
    }

    /// Keyword search at the store; results are not merged, they are a
    /// transient list for the search surface.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Note>, GatewayError> {
        self.gateway.search(&self.owner, keyword).await
    }

    /// Tear the session down: release the change subscription and empty the
    /// cache. Safe to call more than once.
    pub async fn sign_out(&self) {
        if let Ok(mut pump) = self.pump.lock() {
            if let Some(pump) = pump.take() {
                pump.abort();
            }
        }
        self.cache.clear().await;
        tracing::info!(owner = %self.owner, "signed out");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Ok(mut pump) = self.pump.lock() {
            if let Some(pump) = pump.take() {
                pump.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::InMemoryChangeBridge;
    use crate::gateway::{InMemoryGateway, NoteDraft, NoteGateway};
    use std::time::Duration;

    async fn started_session() -> (Arc<InMemoryGateway>, Session) {
        let gateway = Arc::new(InMemoryGateway::new());
        let bridge: SharedBridge = Arc::new(InMemoryChangeBridge::new(Arc::clone(&gateway)));
        let shared: SharedGateway = Arc::clone(&gateway) as SharedGateway;
        let session = Session::start("u1".into(), shared, bridge).await.unwrap();
        (gateway, session)
    }

    async fn settled<F, Fut>(check: F) -> bool
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for _ in 0..50 {
            if check().await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn remote_changes_reconcile_the_cache() {
        let (gateway, session) = started_session().await;
        let owner = OwnerId::from("u1");
        let note = gateway.create(&owner, NoteDraft::default()).await.unwrap();
        assert!(
            settled(|| async { session.cache().get(note.id).await.is_some() }).await,
            "insert event never reached the cache"
        );
        gateway.delete(note.id).await.unwrap();
        assert!(
            settled(|| async { session.cache().get(note.id).await.is_none() }).await,
            "delete event never reached the cache"
        );
    }

    #[tokio::test]
    async fn save_note_round_trips_content() {
        let (_, session) = started_session().await;
        let (note, _) = session.controller().create_child(None).await.unwrap();
        let document = "{\"blocks\":[{\"text\":\"hello\"}]}".to_owned();
        let saved = session
            .save_note(
                note.id,
                NotePatch {
                    title: Some("Saved".to_owned()),
                    content: Some(document.clone()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        // Opaque blob: what was stored is handed back unchanged.
        assert_eq!(saved.content.as_deref(), Some(document.as_str()));
        let cached = session.cache().get(note.id).await.unwrap();
        assert_eq!(cached.content.as_deref(), Some(document.as_str()));
        assert_eq!(cached.title.as_deref(), Some("Saved"));
    }

    #[tokio::test]
    async fn search_passes_through_without_merging() {
        let (_, session) = started_session().await;
        let (note, _) = session.controller().create_child(None).await.unwrap();
        session
            .save_note(
                note.id,
                NotePatch {
                    title: Some("Meeting Notes".to_owned()),
                    content: None,
                },
            )
            .await
            .unwrap();
        let hits = session.search("meeting").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, note.id);
        let misses = session.search("vacation").await.unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn fetch_note_caches_a_deep_node_without_ancestors() {
        let (gateway, session) = started_session().await;
        let owner = OwnerId::from("u1");
        let root = gateway.create(&owner, NoteDraft::default()).await.unwrap();
        let child = gateway
            .create(
                &owner,
                NoteDraft {
                    title: None,
                    parent_id: Some(root.id),
                },
            )
            .await
            .unwrap();
        session.sign_out().await;
        // Partial forest view: the child may be cached without its parent.
        let fetched = session.fetch_note(child.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, child.id);
        assert_eq!(session.cache().len().await, 1);
        assert_eq!(session.cache().get(root.id).await, None);
    }

    #[tokio::test]
    async fn sign_out_clears_and_is_idempotent() {
        let (_, session) = started_session().await;
        session.controller().create_child(None).await.unwrap();
        assert!(!session.cache().is_empty().await);
        session.sign_out().await;
        assert!(session.cache().is_empty().await);
        session.sign_out().await;
        assert!(session.cache().is_empty().await);
    }
}
