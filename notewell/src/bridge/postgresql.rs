//! Change bridge over the store's LISTEN/NOTIFY feed.
//!
//! A row trigger installed by the migrations notifies the `note_changes`
//! channel with the tagged payload of every insert/update/delete. The bridge
//! task narrows the feed down to one owner and forwards normalized events.
use crate::bridge::{ChangeBridge, ChangePayload, ChangeSubscription, NoteChange};
use crate::errors::GatewayError;
use crate::note::OwnerId;
use futures::future::BoxFuture;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tokio::sync::mpsc;

/// Fixed topic name shared with the trigger in the migrations.
const NOTE_CHANGES_CHANNEL: &str = "note_changes";

pub struct PostgresChangeBridge {
    db_pool: PgPool,
}

impl PostgresChangeBridge {
    pub fn new(db_pool: PgPool) -> Self {
        PostgresChangeBridge { db_pool }
    }
}

impl ChangeBridge for PostgresChangeBridge {
    fn subscribe<'a>(
        &'a self,
        owner: &'a OwnerId,
    ) -> BoxFuture<'a, Result<ChangeSubscription, GatewayError>> {
        Box::pin(async move {
            let mut listener = PgListener::connect_with(&self.db_pool).await?;
            listener.listen(NOTE_CHANGES_CHANNEL).await?;
            tracing::debug!(%owner, channel = NOTE_CHANGES_CHANNEL, "subscribed to change feed");
            let owner = owner.clone();
            let (tx, rx) = mpsc::channel::<NoteChange>(64);
            let pump = tokio::spawn(async move {
                loop {
                    let notification = match listener.recv().await {
                        Ok(notification) => notification,
                        Err(e) => {
                            // Reconnection is the caller's decision; we end
                            // the subscription and the next fetch reconverges.
                            tracing::warn!(error = %e, "change listener lost its connection");
                            break;
                        }
                    };
                    let payload: ChangePayload =
                        match serde_json::from_str(notification.payload()) {
                            Ok(payload) => payload,
                            Err(e) => {
                                tracing::warn!(error = %e, "skipping malformed change payload");
                                continue;
                            }
                        };
                    if payload.row.owner_id != owner {
                        continue;
                    }
                    if tx.send(payload.normalize()).await.is_err() {
                        break;
                    }
                }
            });
            Ok(ChangeSubscription::new(rx, pump))
        })
    }
}
