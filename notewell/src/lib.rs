//! Notewell: client-side note tree synchronization.
//!
//! An in-memory, partially-loaded projection of a remote note forest, kept
//! eventually consistent with the authoritative store through typed gateway
//! operations and a change-notification feed, with last-write-wins
//! reconciliation.
pub mod bridge;
pub mod cache;
pub mod controller;
pub mod errors;
pub mod gateway;
pub mod note;
pub mod session;

pub use bridge::{ChangeBridge, ChangeSubscription, InMemoryChangeBridge, NoteChange, SharedBridge};
pub use cache::{CacheState, NoteCache};
pub use controller::{Navigation, TreeController};
pub use gateway::{InMemoryGateway, NoteGateway, PostgresGatewayBuilder, SharedGateway};
pub use note::{Note, NoteId, OwnerId};
pub use session::Session;
