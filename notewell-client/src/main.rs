use notewell::Session;
use notewell_client::configuration::CONFIGURATION;
use notewell_client::telemetry;
use tracing::info;

#[tokio::main]
async fn main() {
    let configuration = &*CONFIGURATION;
    let subscriber = telemetry::get_subscriber(configuration);
    telemetry::init_tracing(subscriber);

    let owner = configuration.owner_id();
    let (gateway, bridge) = configuration.get_remote().await;
    let session = Session::start(owner.clone(), gateway, bridge)
        .await
        .expect("Failed to subscribe to the change feed");

    let roots = session
        .controller()
        .load_roots()
        .await
        .expect("Failed to load root notes");
    info!(%owner, count = roots.len(), "loaded root notes");
    for note in &roots {
        info!(id = %note.id, title = note.display_title(), "root note");
    }

    // Mirror remote changes into the cache until interrupted.
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for the shutdown signal");
    info!(cached = session.cache().len().await, "shutting down");
    session.sign_out().await;
}
