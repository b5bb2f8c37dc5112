//! In-memory gateway.
//!
//! This is mostly designed for development and tests, because there is no
//! remote store behind it. It still behaves like one: ids are assigned on
//! insert, deletes cascade through descendants the caller never fetched, and
//! every mutation is published on a broadcast channel carrying the same
//! payloads a real change feed would deliver.
use crate::bridge::{ChangeEvent, ChangePayload};
use crate::errors::GatewayError;
use crate::gateway::{NoteDraft, NoteGateway, NotePatch};
use crate::note::{newest_first, Note, NoteId, OwnerId};
use chrono::Utc;
use futures::future::BoxFuture;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct InMemoryGatewayInner {
    notes: HashMap<NoteId, Note>,
    next_id: i64,
}

impl InMemoryGatewayInner {
    fn assign_id(&mut self) -> NoteId {
        self.next_id += 1;
        NoteId::from(self.next_id)
    }

    fn subtree_ids(&self, id: NoteId) -> Vec<NoteId> {
        let mut doomed = vec![id];
        let mut frontier = vec![id];
        while let Some(parent) = frontier.pop() {
            for note in self.notes.values() {
                if note.parent_id == Some(parent) {
                    doomed.push(note.id);
                    frontier.push(note.id);
                }
            }
        }
        doomed
    }
}

pub struct InMemoryGateway {
    inner: RwLock<InMemoryGatewayInner>,
    changes: broadcast::Sender<ChangePayload>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        InMemoryGateway {
            inner: RwLock::new(InMemoryGatewayInner::default()),
            changes,
        }
    }

    /// Raw change feed, unfiltered. The in-memory change bridge narrows it
    /// down to one owner.
    pub(crate) fn subscribe_raw(&self) -> broadcast::Receiver<ChangePayload> {
        self.changes.subscribe()
    }

    fn publish(&self, event: ChangeEvent, row: Note) {
        // No receivers is fine; nobody is watching the feed.
        let _ = self.changes.send(ChangePayload { event, row });
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteGateway for InMemoryGateway {
    fn create<'a>(
        &'a self,
        owner: &'a OwnerId,
        draft: NoteDraft,
    ) -> BoxFuture<'a, Result<Note, GatewayError>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            if let Some(parent) = draft.parent_id {
                match inner.notes.get(&parent) {
                    Some(parent_note) if &parent_note.owner_id == owner => {}
                    _ => {
                        return Err(GatewayError::RemoteWrite(format!(
                            "parent note `{parent}` does not exist for owner `{owner}`"
                        )))
                    }
                }
            }
            let note = Note {
                id: inner.assign_id(),
                owner_id: owner.clone(),
                parent_id: draft.parent_id,
                title: draft.title,
                content: None,
                created_at: Utc::now(),
            };
            inner.notes.insert(note.id, note.clone());
            drop(inner);
            self.publish(ChangeEvent::Insert, note.clone());
            Ok(note)
        })
    }

    fn children<'a>(
        &'a self,
        owner: &'a OwnerId,
        parent: Option<NoteId>,
    ) -> BoxFuture<'a, Result<Vec<Note>, GatewayError>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let mut notes: Vec<Note> = inner
                .notes
                .values()
                .filter(|note| &note.owner_id == owner && note.parent_id == parent)
                .cloned()
                .collect();
            notes.sort_by(newest_first);
            Ok(notes)
        })
    }

    fn find_one<'a>(
        &'a self,
        owner: &'a OwnerId,
        id: NoteId,
    ) -> BoxFuture<'a, Result<Option<Note>, GatewayError>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            Ok(inner
                .notes
                .get(&id)
                .filter(|note| &note.owner_id == owner)
                .cloned())
        })
    }

    fn update(
        &self,
        id: NoteId,
        patch: NotePatch,
    ) -> BoxFuture<'_, Result<Option<Note>, GatewayError>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            let updated = match inner.notes.get_mut(&id) {
                Some(note) => {
                    if let Some(title) = patch.title {
                        note.title = Some(title);
                    }
                    if let Some(content) = patch.content {
                        note.content = Some(content);
                    }
                    note.clone()
                }
                None => return Ok(None),
            };
            drop(inner);
            self.publish(ChangeEvent::Update, updated.clone());
            Ok(Some(updated))
        })
    }

    fn search<'a>(
        &'a self,
        owner: &'a OwnerId,
        keyword: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Note>, GatewayError>> {
        Box::pin(async move {
            let needle = keyword.to_lowercase();
            let inner = self.inner.read().await;
            let mut notes: Vec<Note> = inner
                .notes
                .values()
                .filter(|note| &note.owner_id == owner)
                .filter(|note| {
                    let title_hit = note
                        .title
                        .as_deref()
                        .map(|t| t.to_lowercase().contains(&needle))
                        .unwrap_or(false);
                    let content_hit = note
                        .content
                        .as_deref()
                        .map(|c| c.to_lowercase().contains(&needle))
                        .unwrap_or(false);
                    title_hit || content_hit
                })
                .cloned()
                .collect();
            notes.sort_by(newest_first);
            Ok(notes)
        })
    }

    fn delete(&self, id: NoteId) -> BoxFuture<'_, Result<(), GatewayError>> {
        Box::pin(async move {
            let mut inner = self.inner.write().await;
            if !inner.notes.contains_key(&id) {
                return Err(GatewayError::RemoteWrite(format!(
                    "note `{id}` does not exist"
                )));
            }
            let doomed = inner.subtree_ids(id);
            let mut removed = Vec::with_capacity(doomed.len());
            for note_id in doomed {
                if let Some(note) = inner.notes.remove(&note_id) {
                    removed.push(note);
                }
            }
            drop(inner);
            // The store's change feed emits one delete per removed row.
            for note in removed {
                self.publish(ChangeEvent::Delete, note);
            }
            Ok(())
        })
    }
}
