use grain_chat::bootstrap::Bootstrapper;
use grain_chat::config::ChatConfig;
use grain_chat::lifecycle::tracing::setup_tracing;
use grain_chat::lifecycle::ChatSystem;
use grain_chat::session::Session;
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = ChatConfig::load().map_err(|e| e.to_string())?;
    info!(endpoint = %config.endpoint(), identity = %config.client.identity, "Starting grain chat");

    let system = ChatSystem::start(config.silo_config());

    let mut bootstrapper =
        Bootstrapper::new(config.endpoint(), Box::new(config.retry_strategy()));
    let client = match bootstrapper
        .connect(&system.gateway(), &mut std::io::stdout())
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Client initialization failed");
            system.shutdown().await;
            return Err(e.to_string());
        }
    };

    let session = Session::new(client, config.session_settings(), std::io::stdout());
    let outcome = session.run(BufReader::new(tokio::io::stdin())).await;

    system.shutdown().await;

    match outcome {
        Ok(_) => {
            info!("Application completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Session failed");
            Err(e.to_string())
        }
    }
}
