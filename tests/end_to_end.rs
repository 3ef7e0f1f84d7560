//! End-to-end scenarios over real Unix datagram sockets.

use janus::manifest::Manifest;
use janus::{ClientConfig, JanusClient, JanusServer, ServerConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn unique_socket_path(tag: &str) -> String {
    let dir = tempfile::Builder::new()
        .prefix("janus_e2e_")
        .tempdir()
        .unwrap()
        .into_path();
    dir.join(format!("{tag}.sock")).to_string_lossy().into_owned()
}

async fn spawn_server(socket_path: &str, max_concurrent: usize) -> Arc<JanusServer> {
    let mut config = ServerConfig::new(socket_path);
    config.max_concurrent_handlers = max_concurrent;
    let server = Arc::new(JanusServer::new(config, Manifest::empty("1.0.0")).unwrap());
    let listening = server.clone();
    tokio::spawn(async move {
        let _ = listening.listen().await;
    });
    // Give the listener a moment to bind before the test sends anything.
    tokio::time::sleep(Duration::from_millis(50)).await;
    server
}

fn client_for(socket_path: &str) -> JanusClient {
    let mut config = ClientConfig::new(socket_path);
    config.enable_validation = false;
    JanusClient::new(config).unwrap()
}

#[tokio::test]
async fn ping_returns_pong() {
    let socket_path = unique_socket_path("ping");
    let _server = spawn_server(&socket_path, 10).await;
    let client = client_for(&socket_path);

    let response = client.send_request("ping", None, None).await.unwrap();
    assert!(response.success);
    assert_eq!(response.result.unwrap()["message"], json!("pong"));
}

#[tokio::test]
async fn echo_round_trips_the_message() {
    let socket_path = unique_socket_path("echo");
    let _server = spawn_server(&socket_path, 10).await;
    let client = client_for(&socket_path);

    let mut args = std::collections::HashMap::new();
    args.insert("message".to_string(), json!("hello there"));
    let response = client.send_request("echo", Some(args), None).await.unwrap();
    assert!(response.success);
    assert_eq!(response.result.unwrap()["message"], json!("hello there"));
}

#[tokio::test]
async fn unknown_request_is_method_not_found() {
    let socket_path = unique_socket_path("unknown");
    let _server = spawn_server(&socket_path, 10).await;
    let client = client_for(&socket_path);

    let response = client.send_request("does_not_exist", None, None).await.unwrap();
    assert!(!response.success);
    assert_eq!(response.error.unwrap().code, -32601);
}

#[tokio::test]
async fn registered_handler_runs_and_replies() {
    let socket_path = unique_socket_path("handler");
    let server = spawn_server(&socket_path, 10).await;
    server
        .register_request_handler("double", |args| async move {
            let n = args.and_then(|a| a.get("n").and_then(|v| v.as_i64())).unwrap_or(0);
            Ok(json!(n * 2))
        })
        .await
        .unwrap();

    let client = client_for(&socket_path);
    let mut args = std::collections::HashMap::new();
    args.insert("n".to_string(), json!(21));
    let response = client.send_request("double", Some(args), None).await.unwrap();
    assert!(response.success);
    assert_eq!(response.result.unwrap(), json!(42));
}

#[tokio::test]
async fn concurrency_cap_rejects_overflow_requests() {
    let socket_path = unique_socket_path("cap");
    let server = spawn_server(&socket_path, 1).await;
    server
        .register_request_handler("slow", |_args| async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(json!({"done": true}))
        })
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..3 {
        let socket_path = socket_path.clone();
        handles.push(tokio::spawn(async move {
            let client = client_for(&socket_path);
            client.send_request("slow", None, Some(2.0)).await
        }));
    }

    let mut successes = 0;
    let mut rejections = 0;
    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        if response.success {
            successes += 1;
        } else if response.error.unwrap().code == -32003 {
            rejections += 1;
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(rejections, 2);
}

#[tokio::test]
async fn fire_and_forget_request_returns_no_response() {
    let socket_path = unique_socket_path("noresponse");
    let _server = spawn_server(&socket_path, 10).await;
    let client = client_for(&socket_path);

    client.send_request_no_response("ping", None).await.unwrap();
}
