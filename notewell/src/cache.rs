//! Local tree cache: the partial, eventually-consistent projection of one
//! owner's notes.
//!
//! The cache is the only shared mutable state in the crate. Every mutation
//! rebuilds the state and swaps it in wholesale, so readers that took a
//! [`NoteCache::snapshot`] never observe a half-applied merge or removal.
//! Conflicts are resolved by last write wins: whatever arrives last, whether
//! from a fetch, a local mutation, or a remote change event, replaces the
//! cached entry with the same id.
//!
//! Alongside the id-keyed mapping the cache maintains an adjacency index
//! (parent id, or `None` for roots, to child ids), updated incrementally on
//! every merge, so subtree removal walks edges instead of scanning the whole
//! mapping per level.
use crate::note::{newest_first, Note, NoteId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One immutable snapshot of the cached forest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheState {
    notes: HashMap<NoteId, Note>,
    children: HashMap<Option<NoteId>, HashSet<NoteId>>,
}

impl CacheState {
    fn insert(&mut self, note: Note) {
        if let Some(prev) = self.notes.get(&note.id) {
            if prev.parent_id != note.parent_id {
                self.unlink(prev.parent_id, note.id);
            }
        }
        self.children
            .entry(note.parent_id)
            .or_default()
            .insert(note.id);
        self.notes.insert(note.id, note);
    }

    fn remove(&mut self, id: NoteId) {
        if let Some(note) = self.notes.remove(&id) {
            self.unlink(note.parent_id, id);
        }
        // Children of the removed note, if any survive, keep their edges;
        // a partial forest may hold nodes whose parent is not cached.
    }

    fn unlink(&mut self, parent: Option<NoteId>, id: NoteId) {
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.remove(&id);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    fn child_ids(&self, parent: NoteId) -> Vec<NoteId> {
        self.children
            .get(&Some(parent))
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn notes(&self) -> &HashMap<NoteId, Note> {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Cached notes under `parent` (`None` for roots), in canonical sibling
    /// order.
    pub fn children_of(&self, parent: Option<NoteId>) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .children
            .get(&parent)
            .into_iter()
            .flatten()
            .filter_map(|id| self.notes.get(id))
            .cloned()
            .collect();
        notes.sort_by(newest_first);
        notes
    }
}

pub struct NoteCache {
    inner: RwLock<Arc<CacheState>>,
}

impl NoteCache {
    pub fn new() -> Self {
        NoteCache {
            inner: RwLock::new(Arc::new(CacheState::default())),
        }
    }

    /// Insert-or-replace every note by id. Repeated merges of the same batch
    /// are idempotent; duplicate ids within one batch resolve to the later
    /// entry; unrelated entries are untouched.
    pub async fn merge(&self, notes: Vec<Note>) {
        if notes.is_empty() {
            return;
        }
        let mut guard = self.inner.write().await;
        let mut next: CacheState = guard.as_ref().clone();
        for note in notes {
            next.insert(note);
        }
        tracing::debug!(cached = next.len(), "merged notes into cache");
        *guard = Arc::new(next);
    }

    /// Remove `id` and the transitive closure of its *cached* descendants in
    /// one swap. An id that is not cached is a no-op: full removal from the
    /// remote view is the cascading delete's job, not ours.
    pub async fn remove_subtree(&self, id: NoteId) {
        let mut guard = self.inner.write().await;
        if guard.get(id).is_none() {
            return;
        }
        let mut next: CacheState = guard.as_ref().clone();
        let mut frontier = vec![id];
        let mut removed = 0usize;
        while let Some(doomed) = frontier.pop() {
            frontier.extend(next.child_ids(doomed));
            next.remove(doomed);
            removed += 1;
        }
        tracing::debug!(removed, cached = next.len(), "removed subtree from cache");
        *guard = Arc::new(next);
    }

    /// Cached notes whose parent equals the argument (`None` for roots), in
    /// canonical sibling order. Absence of children here is not proof that
    /// none exist remotely; this never triggers a fetch.
    pub async fn children(&self, parent: Option<NoteId>) -> Vec<Note> {
        self.snapshot().await.children_of(parent)
    }

    pub async fn get(&self, id: NoteId) -> Option<Note> {
        self.snapshot().await.get(id).cloned()
    }

    /// Cheap consistent view of the whole forest.
    pub async fn snapshot(&self) -> Arc<CacheState> {
        Arc::clone(&*self.inner.read().await)
    }

    /// Empty the cache. Used on user/session change.
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        *guard = Arc::new(CacheState::default());
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl Default for NoteCache {
    fn default() -> Self {
        Self::new()
    }
}
