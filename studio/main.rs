/// dermaview Studio
///
/// A browser front-end for the dermoscopic classification service. Pages are
/// rendered on the server and served by a synchronous tiny_http server; the
/// backend is reached through `dermaview::ClassifierClient`.
///
/// Run with:
///   cargo run --bin studio --release
/// Then open http://127.0.0.1:7878
///
/// Tabs:
///   1. Classify — upload an image, preview it, run classification
///   2. Graphs   — backend health check and training plots

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use tiny_http::Server;

use dermaview::{ClassifierClient, Config};
use state::StudioState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let addr = config.listen_addr.clone();
    let server = Server::http(&addr).map_err(|e| anyhow!("failed to bind {}: {}", addr, e))?;
    let client = ClassifierClient::new(config)?;

    let shared_state = Arc::new(Mutex::new(StudioState::new()));

    println!("╔══════════════════════════════════════════════╗");
    println!("║          dermaview Studio                    ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Open in your browser:                       ║");
    println!("║  http://{:<37}║", addr);
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Tabs: Classify > Graphs                     ║");
    println!("╚══════════════════════════════════════════════╝");
    log::info!("forwarding classifications to {}", client.config().backend_url);

    // One thread per request: backend calls block for up to the configured
    // timeout and must not stall other page loads.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        let client_clone = client.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone, &client_clone);
        });
    }
    Ok(())
}
