//! Common tests shared by gateway backends.
use crate::gateway::{NoteDraft, NoteGateway, NotePatch};
use crate::note::{NoteId, OwnerId};

fn owner() -> OwnerId {
    OwnerId::from("u1")
}

fn draft(title: Option<&str>, parent: Option<NoteId>) -> NoteDraft {
    NoteDraft {
        title: title.map(|t| t.to_owned()),
        parent_id: parent,
    }
}

pub(super) async fn create_assigns_identity(store: impl NoteGateway) {
    let owner = owner();
    let first = store.create(&owner, draft(None, None)).await.unwrap();
    let second = store
        .create(&owner, draft(Some("child"), Some(first.id)))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(second.owner_id, owner);
    assert_eq!(second.parent_id, Some(first.id));
    assert_eq!(second.title.as_deref(), Some("child"));
    assert_eq!(first.parent_id, None);
}

pub(super) async fn create_rejects_unknown_parent(store: impl NoteGateway) {
    let owner = owner();
    let err = store
        .create(&owner, draft(None, Some(999.into())))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        crate::errors::GatewayError::RemoteWrite(_)
    ));
}

pub(super) async fn create_rejects_foreign_parent(store: impl NoteGateway) {
    let theirs = store
        .create(&OwnerId::from("u2"), draft(None, None))
        .await
        .unwrap();
    let err = store
        .create(&owner(), draft(None, Some(theirs.id)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        crate::errors::GatewayError::RemoteWrite(_)
    ));
}

pub(super) async fn children_scoped_and_newest_first(store: impl NoteGateway) {
    let owner = owner();
    let root = store.create(&owner, draft(Some("root"), None)).await.unwrap();
    let older = store
        .create(&owner, draft(Some("older"), Some(root.id)))
        .await
        .unwrap();
    let newer = store
        .create(&owner, draft(Some("newer"), Some(root.id)))
        .await
        .unwrap();
    // Someone else's forest stays invisible.
    store
        .create(&OwnerId::from("u2"), draft(Some("other"), None))
        .await
        .unwrap();

    let children = store.children(&owner, Some(root.id)).await.unwrap();
    let ids: Vec<NoteId> = children.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let roots = store.children(&owner, None).await.unwrap();
    let ids: Vec<NoteId> = roots.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![root.id]);
}

pub(super) async fn children_of_leaf_is_empty_not_an_error(store: impl NoteGateway) {
    let owner = owner();
    let leaf = store.create(&owner, draft(None, None)).await.unwrap();
    let children = store.children(&owner, Some(leaf.id)).await.unwrap();
    assert!(children.is_empty());
}

pub(super) async fn find_one_scopes_by_owner(store: impl NoteGateway) {
    let owner = owner();
    let note = store.create(&owner, draft(Some("mine"), None)).await.unwrap();
    let found = store.find_one(&owner, note.id).await.unwrap().unwrap();
    assert_eq!(found.id, note.id);
    assert_eq!(store.find_one(&owner, 999.into()).await.unwrap(), None);
    assert_eq!(
        store.find_one(&OwnerId::from("u2"), note.id).await.unwrap(),
        None
    );
}

pub(super) async fn update_is_partial(store: impl NoteGateway) {
    let owner = owner();
    let note = store.create(&owner, draft(Some("title"), None)).await.unwrap();
    let with_content = store
        .update(
            note.id,
            NotePatch {
                title: None,
                content: Some("body".to_owned()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_content.title.as_deref(), Some("title"));
    assert_eq!(with_content.content.as_deref(), Some("body"));

    let retitled = store
        .update(
            note.id,
            NotePatch {
                title: Some("renamed".to_owned()),
                content: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(retitled.title.as_deref(), Some("renamed"));
    assert_eq!(retitled.content.as_deref(), Some("body"));

    assert_eq!(
        store.update(999.into(), NotePatch::default()).await.unwrap(),
        None
    );
}

pub(super) async fn search_is_case_insensitive_over_title_and_content(store: impl NoteGateway) {
    let owner = owner();
    let by_title = store
        .create(&owner, draft(Some("Groceries List"), None))
        .await
        .unwrap();
    let by_content = store.create(&owner, draft(None, None)).await.unwrap();
    store
        .update(
            by_content.id,
            NotePatch {
                title: None,
                content: Some("remember the grocerIES".to_owned()),
            },
        )
        .await
        .unwrap();
    store
        .create(&owner, draft(Some("unrelated"), None))
        .await
        .unwrap();
    store
        .create(&OwnerId::from("u2"), draft(Some("groceries too"), None))
        .await
        .unwrap();

    let mut hits: Vec<NoteId> = store
        .search(&owner, "groceries")
        .await
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    hits.sort();
    let mut expected = vec![by_title.id, by_content.id];
    expected.sort();
    assert_eq!(hits, expected);

    assert!(store.search(&owner, "vacation").await.unwrap().is_empty());
}

pub(super) async fn delete_cascades_through_unfetched_descendants(store: impl NoteGateway) {
    let owner = owner();
    let root = store.create(&owner, draft(None, None)).await.unwrap();
    let child = store
        .create(&owner, draft(None, Some(root.id)))
        .await
        .unwrap();
    let grandchild = store
        .create(&owner, draft(None, Some(child.id)))
        .await
        .unwrap();
    let bystander = store.create(&owner, draft(None, None)).await.unwrap();

    // The caller only knows the root; the store still removes everything
    // underneath it.
    store.delete(root.id).await.unwrap();
    assert_eq!(store.find_one(&owner, root.id).await.unwrap(), None);
    assert_eq!(store.find_one(&owner, child.id).await.unwrap(), None);
    assert_eq!(store.find_one(&owner, grandchild.id).await.unwrap(), None);
    assert!(store
        .find_one(&owner, bystander.id)
        .await
        .unwrap()
        .is_some());
}

pub(super) async fn delete_of_missing_note_is_rejected(store: impl NoteGateway) {
    let err = store.delete(999.into()).await.unwrap_err();
    assert!(matches!(
        err,
        crate::errors::GatewayError::RemoteWrite(_)
    ));
}
