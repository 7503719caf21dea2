//! Sortviz Visualization Server
//!
//! Serve live sort runs to browser clients over HTTP and WebSocket.

use sortviz_engine::JsonFileStore;
use sortviz_vis::VisServer;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sortviz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let port: u16 = args.get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    let config_path = env::var("SORTVIZ_CONFIG").unwrap_or_else(|_| "sortviz.json".to_string());
    let seed = env::var("SORTVIZ_SEED").ok().and_then(|s| s.parse().ok());

    let store = JsonFileStore::open(&config_path)?;
    tracing::info!(config = %config_path, ?seed, "settings loaded");

    println!("Sortviz");
    println!("=======");
    println!();
    println!("Starting visualization server on http://localhost:{}", port);
    println!("Connect to /ws for live frames; POST /api/start to sort.");
    println!();

    let server = VisServer::new(Box::new(store), seed);
    server.serve(port).await?;

    Ok(())
}
