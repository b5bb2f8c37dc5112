use thiserror::Error;

/// Errors surfaced by the remote gateway and the change bridge.
///
/// "No rows" is deliberately not represented here: fetch operations return
/// empty collections or `None`, never an error. Only rejected writes and
/// transport failures are worth propagating.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("remote store rejected the write: {0}")]
    RemoteWrite(String),
    #[error("change subscription failed: {0}")]
    Subscription(String),
    #[error("PostgreSQL error")]
    PostgreSQLError(#[from] sqlx::Error),
    #[error("serde error")]
    SerdeError(#[from] serde_json::Error),
}
