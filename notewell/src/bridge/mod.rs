//! Change-notification bridge: redelivers the remote store's row-level
//! insert/update/delete feed as normalized events, scoped to one owner.
//!
//! Delivery is at-least-once and possibly out of order relative to local
//! optimistic updates. An event therefore never proves freshness; the cache
//! resolves by last write wins, so re-applying a duplicate or stale event is
//! harmless.
use crate::errors::GatewayError;
use crate::note::{Note, NoteId, OwnerId};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

mod in_memory;
mod postgresql;

pub use in_memory::InMemoryChangeBridge;
pub use postgresql::PostgresChangeBridge;

/// Tag on the wire payload. The catch-all `*` is part of the contract and is
/// handled like whichever of insert/update/delete actually occurred; since a
/// delete is always tagged explicitly, `*` funnels into the upsert path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeEvent {
    Insert,
    Update,
    Delete,
    #[serde(rename = "*")]
    Any,
}

/// Wire payload of the change feed: a tagged event plus the affected row.
/// For deletes the row is the old row, so subscribers learn the vanished id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePayload {
    pub event: ChangeEvent,
    pub row: Note,
}

impl ChangePayload {
    /// Normalize into the two operations the cache understands. Insert and
    /// update are indistinguishable to a last-write-wins cache, so both (and
    /// the catch-all) become upserts.
    pub fn normalize(self) -> NoteChange {
        match self.event {
            ChangeEvent::Delete => NoteChange::Removed(self.row.id),
            ChangeEvent::Insert | ChangeEvent::Update | ChangeEvent::Any => {
                NoteChange::Upserted(self.row)
            }
        }
    }
}

/// A normalized remote change, ready to apply to the local cache.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteChange {
    Upserted(Note),
    Removed(NoteId),
}

/// An abstraction for change-feed transports.
pub trait ChangeBridge: Send + Sync {
    /// Subscribe to all note changes of one owner. Events arrive on the
    /// returned subscription until it is closed or the transport drops.
    fn subscribe<'a>(
        &'a self,
        owner: &'a OwnerId,
    ) -> BoxFuture<'a, Result<ChangeSubscription, GatewayError>>;
}

pub type SharedBridge = Arc<dyn ChangeBridge>;

/// A live change subscription.
///
/// Dropping the subscription releases it; [`ChangeSubscription::close`] does
/// the same explicitly and is idempotent.
pub struct ChangeSubscription {
    rx: mpsc::Receiver<NoteChange>,
    pump: Option<JoinHandle<()>>,
}

impl ChangeSubscription {
    pub(crate) fn new(rx: mpsc::Receiver<NoteChange>, pump: JoinHandle<()>) -> Self {
        ChangeSubscription {
            rx,
            pump: Some(pump),
        }
    }

    /// Next change, or `None` once the subscription is closed or the
    /// transport is gone.
    pub async fn recv(&mut self) -> Option<NoteChange> {
        self.rx.recv().await
    }

    /// Release the subscription. Calling twice is safe.
    pub fn close(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.rx.close();
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.close();
    }
}
