//! Thin external collaborator demonstrating a minimal Janus server: binds a
//! socket, registers one handler beyond the built-in catalogue, and serves
//! until interrupted.

use janus::manifest::Manifest;
use janus::{JanusServer, ServerConfig};
use serde_json::json;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let socket_path = std::env::args().nth(1).unwrap_or_else(|| "/tmp/janus_demo.sock".to_string());
    let server = Arc::new(JanusServer::new(ServerConfig::new(socket_path.clone()), Manifest::empty("1.0.0"))?);

    server
        .register_request_handler("add", |args| async move {
            let args = args.unwrap_or_default();
            let a = args.get("a").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let b = args.get("b").and_then(|v| v.as_f64()).unwrap_or(0.0);
            Ok(json!({ "sum": a + b }))
        })
        .await?;

    log::info!("listening on {socket_path}");
    server.listen().await?;
    Ok(())
}
