use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use post_directory::config::AppConfig;
use post_directory::logging::init_logging_default;
use post_directory::store::mongo::MongoPostStore;
use post_directory::rpc::serve_tcp;
use post_directory::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging_default();
    let cfg = AppConfig::load_and_validate()?;

    info!(database = %cfg.database.name, "connecting to MongoDB");
    let (client, store) = MongoPostStore::connect(&cfg.database).await?;
    let server = PostServer::new(Arc::new(store));

    let (stop_tx, stop_rx) = watch::channel(false);
    let (local_addr, serving) = serve_tcp(cfg.server.bind_addr(), server, stop_rx).await?;
    info!(addr = %local_addr, "post directory listening");

    let mut serving = Box::pin(serving);
    tokio::select! {
        _ = &mut serving => warn!("listener closed"),
        res = tokio::signal::ctrl_c() => {
            if let Err(err) = res {
                warn!(error = %err, "cannot listen for interrupt");
            }
            info!("interrupt received, no longer accepting calls");
        }
    }

    // Open channels drop their calls, and with them any live cursor, so the
    // client shutdown below does not wait on a slow listing.
    let _ = stop_tx.send(true);

    info!("closing MongoDB connection");
    client.shutdown().await;

    info!("closing the listener");
    drop(serving);

    info!("server stopped");
    Ok(())
}
