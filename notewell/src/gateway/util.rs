use crate::gateway::{NoteDraft, SharedGateway};
use crate::note::OwnerId;

/// Seed a small forest for development mode, so a fresh in-memory gateway
/// has something to expand.
pub async fn populate_demo_notes(gateway: &SharedGateway, owner: &OwnerId) {
    let projects = gateway
        .create(
            owner,
            NoteDraft {
                title: Some("Projects".to_owned()),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    let renovation = gateway
        .create(
            owner,
            NoteDraft {
                title: Some("Kitchen renovation".to_owned()),
                parent_id: Some(projects.id),
            },
        )
        .await
        .unwrap();
    gateway
        .create(
            owner,
            NoteDraft {
                title: Some("Quotes".to_owned()),
                parent_id: Some(renovation.id),
            },
        )
        .await
        .unwrap();
    gateway
        .create(
            owner,
            NoteDraft {
                title: Some("Reading list".to_owned()),
                parent_id: None,
            },
        )
        .await
        .unwrap();
}
