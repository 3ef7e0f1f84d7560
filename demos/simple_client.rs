//! Thin external collaborator demonstrating a minimal Janus client: pings a
//! server, then calls a request it expects the server to have registered.

use janus::{ClientConfig, JanusClient};
use serde_json::json;
use std::collections::HashMap;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let socket_path = std::env::args().nth(1).unwrap_or_else(|| "/tmp/janus_demo.sock".to_string());
    let mut config = ClientConfig::new(socket_path);
    config.enable_validation = false;
    let client = JanusClient::new(config)?;

    let pong = client.ping().await?;
    println!("ping -> {pong}");

    let mut args = HashMap::new();
    args.insert("a".to_string(), json!(2));
    args.insert("b".to_string(), json!(3));
    let response = client.send_request("add", Some(args), None).await?;
    println!("add(2, 3) -> {:?}", response.result);

    Ok(())
}
