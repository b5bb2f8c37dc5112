use crate::errors::GatewayError;
use crate::gateway::{NoteDraft, NotePatch};
use crate::note::{Note, NoteId, OwnerId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

const NOTE_COLUMNS: &str = "id, owner_id, parent_id, title, content, created_at";

#[derive(sqlx::FromRow)]
pub(super) struct NoteRow {
    id: i64,
    owner_id: String,
    parent_id: Option<i64>,
    title: Option<String>,
    content: Option<String>,
    created_at: DateTime<Utc>,
}

impl NoteRow {
    pub(super) fn into_note(self) -> Note {
        Note {
            id: self.id.into(),
            owner_id: self.owner_id.into(),
            parent_id: self.parent_id.map(NoteId::from),
            title: self.title,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

fn into_notes(rows: Vec<NoteRow>) -> Vec<Note> {
    rows.into_iter().map(NoteRow::into_note).collect()
}

/// Insert a note, guarding against a parent that does not exist or belongs to
/// another owner. Returns `None` when the guard rejected the insert.
pub(super) async fn insert_note(
    pool: &PgPool,
    owner: &OwnerId,
    draft: &NoteDraft,
) -> Result<Option<Note>, GatewayError> {
    let sql = format!(
        "INSERT INTO note (owner_id, parent_id, title)
         SELECT $1, $2, $3
         WHERE $2::bigint IS NULL
            OR EXISTS(SELECT 1 FROM note WHERE id = $2 AND owner_id = $1)
         RETURNING {NOTE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, NoteRow>(&sql)
        .bind(owner.as_ref())
        .bind(draft.parent_id.map(|p| p.as_i64()))
        .bind(draft.title.as_deref())
        .fetch_optional(pool)
        .await?;
    Ok(row.map(NoteRow::into_note))
}

pub(super) async fn select_children(
    pool: &PgPool,
    owner: &OwnerId,
    parent: Option<NoteId>,
) -> Result<Vec<Note>, GatewayError> {
    let rows = match parent {
        Some(parent) => {
            let sql = format!(
                "SELECT {NOTE_COLUMNS} FROM note
                 WHERE owner_id = $1 AND parent_id = $2
                 ORDER BY created_at DESC, id DESC"
            );
            sqlx::query_as::<_, NoteRow>(&sql)
                .bind(owner.as_ref())
                .bind(parent.as_i64())
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {NOTE_COLUMNS} FROM note
                 WHERE owner_id = $1 AND parent_id IS NULL
                 ORDER BY created_at DESC, id DESC"
            );
            sqlx::query_as::<_, NoteRow>(&sql)
                .bind(owner.as_ref())
                .fetch_all(pool)
                .await?
        }
    };
    Ok(into_notes(rows))
}

pub(super) async fn select_one(
    pool: &PgPool,
    owner: &OwnerId,
    id: NoteId,
) -> Result<Option<Note>, GatewayError> {
    let sql = format!("SELECT {NOTE_COLUMNS} FROM note WHERE id = $1 AND owner_id = $2");
    let row = sqlx::query_as::<_, NoteRow>(&sql)
        .bind(id.as_i64())
        .bind(owner.as_ref())
        .fetch_optional(pool)
        .await?;
    Ok(row.map(NoteRow::into_note))
}

pub(super) async fn update_note(
    pool: &PgPool,
    id: NoteId,
    patch: &NotePatch,
) -> Result<Option<Note>, GatewayError> {
    let sql = format!(
        "UPDATE note
         SET title   = COALESCE($2, title),
             content = COALESCE($3, content)
         WHERE id = $1
         RETURNING {NOTE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, NoteRow>(&sql)
        .bind(id.as_i64())
        .bind(patch.title.as_deref())
        .bind(patch.content.as_deref())
        .fetch_optional(pool)
        .await?;
    Ok(row.map(NoteRow::into_note))
}

pub(super) async fn search_notes(
    pool: &PgPool,
    owner: &OwnerId,
    keyword: &str,
) -> Result<Vec<Note>, GatewayError> {
    let sql = format!(
        "SELECT {NOTE_COLUMNS} FROM note
         WHERE owner_id = $1 AND (title ILIKE $2 OR content ILIKE $2)
         ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, NoteRow>(&sql)
        .bind(owner.as_ref())
        .bind(format!("%{keyword}%"))
        .fetch_all(pool)
        .await?;
    Ok(into_notes(rows))
}

/// Invoke the store's atomic recursive delete. Returns the number of rows it
/// removed; zero means the note did not exist.
pub(super) async fn delete_subtree(pool: &PgPool, id: NoteId) -> Result<i64, GatewayError> {
    let deleted: i64 = sqlx::query_scalar("SELECT delete_note_subtree($1)")
        .bind(id.as_i64())
        .fetch_one(pool)
        .await?;
    Ok(deleted)
}
