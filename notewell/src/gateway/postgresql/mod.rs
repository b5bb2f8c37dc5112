use crate::bridge::PostgresChangeBridge;
use crate::errors::GatewayError;
use crate::gateway::{NoteDraft, NoteGateway, NotePatch};
use crate::note::{Note, NoteId, OwnerId};
use futures::future::BoxFuture;
use sqlx::postgres::PgConnectOptions;
use sqlx::PgPool;

mod queries;
use queries::*;

pub struct PostgresGatewayBuilder {
    db_options: PgConnectOptions,
}

impl PostgresGatewayBuilder {
    pub fn new(db_options: PgConnectOptions) -> Self {
        Self { db_options }
    }

    pub async fn build(self) -> PostgresGateway {
        let connection_pool = PgPool::connect_with(self.db_options)
            .await
            .expect("Failed to connect to Postgres.");
        sqlx::migrate!("./migrations")
            .run(&connection_pool)
            .await
            .expect("Failed to migrate the database");
        PostgresGateway {
            db_pool: connection_pool,
        }
    }
}

/// Gateway backed by the hosted relational store.
pub struct PostgresGateway {
    db_pool: PgPool,
}

impl PostgresGateway {
    /// A change bridge sharing this gateway's connection pool, listening on
    /// the store's row-level change feed.
    pub fn change_bridge(&self) -> PostgresChangeBridge {
        PostgresChangeBridge::new(self.db_pool.clone())
    }
}

impl NoteGateway for PostgresGateway {
    fn create<'a>(
        &'a self,
        owner: &'a OwnerId,
        draft: NoteDraft,
    ) -> BoxFuture<'a, Result<Note, GatewayError>> {
        Box::pin(async move {
            insert_note(&self.db_pool, owner, &draft)
                .await?
                .ok_or_else(|| {
                    GatewayError::RemoteWrite(format!(
                        "parent note `{:?}` does not exist for owner `{owner}`",
                        draft.parent_id
                    ))
                })
        })
    }

    fn children<'a>(
        &'a self,
        owner: &'a OwnerId,
        parent: Option<NoteId>,
    ) -> BoxFuture<'a, Result<Vec<Note>, GatewayError>> {
        Box::pin(async move { select_children(&self.db_pool, owner, parent).await })
    }

    fn find_one<'a>(
        &'a self,
        owner: &'a OwnerId,
        id: NoteId,
    ) -> BoxFuture<'a, Result<Option<Note>, GatewayError>> {
        Box::pin(async move { select_one(&self.db_pool, owner, id).await })
    }

    fn update(
        &self,
        id: NoteId,
        patch: NotePatch,
    ) -> BoxFuture<'_, Result<Option<Note>, GatewayError>> {
        Box::pin(async move { update_note(&self.db_pool, id, &patch).await })
    }

    fn search<'a>(
        &'a self,
        owner: &'a OwnerId,
        keyword: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Note>, GatewayError>> {
        Box::pin(async move { search_notes(&self.db_pool, owner, keyword).await })
    }

    fn delete(&self, id: NoteId) -> BoxFuture<'_, Result<(), GatewayError>> {
        Box::pin(async move {
            let deleted = delete_subtree(&self.db_pool, id).await?;
            if deleted == 0 {
                return Err(GatewayError::RemoteWrite(format!(
                    "note `{id}` does not exist"
                )));
            }
            tracing::debug!(%id, deleted, "cascading delete removed rows");
            Ok(())
        })
    }
}
