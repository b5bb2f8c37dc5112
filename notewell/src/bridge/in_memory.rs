//! Change bridge over the in-memory gateway's broadcast feed.
use crate::bridge::{ChangeBridge, ChangeSubscription, NoteChange};
use crate::errors::GatewayError;
use crate::gateway::InMemoryGateway;
use crate::note::OwnerId;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

pub struct InMemoryChangeBridge {
    gateway: Arc<InMemoryGateway>,
}

impl InMemoryChangeBridge {
    pub fn new(gateway: Arc<InMemoryGateway>) -> Self {
        InMemoryChangeBridge { gateway }
    }
}

impl ChangeBridge for InMemoryChangeBridge {
    fn subscribe<'a>(
        &'a self,
        owner: &'a OwnerId,
    ) -> BoxFuture<'a, Result<ChangeSubscription, GatewayError>> {
        Box::pin(async move {
            let mut raw = self.gateway.subscribe_raw();
            let owner = owner.clone();
            let (tx, rx) = mpsc::channel::<NoteChange>(64);
            let pump = tokio::spawn(async move {
                loop {
                    match raw.recv().await {
                        Ok(payload) => {
                            if payload.row.owner_id != owner {
                                continue;
                            }
                            if tx.send(payload.normalize()).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            // At-least-once only holds while we keep up; a
                            // lagging subscriber misses events and relies on
                            // the next fetch to reconverge.
                            tracing::warn!(skipped, "change feed lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });
            Ok(ChangeSubscription::new(rx, pump))
        })
    }
}
