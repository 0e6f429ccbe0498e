//! Shared fixtures: an axum stand-in for the backend on an ephemeral port.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use desbravadores_sdk::{ApiClient, ClientConfig, MemoryTokenStorage, SessionStore};
use serde_json::json;

/// Serve `router` on 127.0.0.1 and return its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().expect("Mock backend has no address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock backend failed");
    });

    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn dead_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Unsigned JWT-shaped token carrying `role`.
pub fn token_with_role(role: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": "a@b.com", "role": role }).to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

/// Client and loaded session backed by `storage`.
pub async fn client_with_storage(
    base_url: &str,
    storage: MemoryTokenStorage,
) -> (ApiClient, Arc<SessionStore>) {
    let session = Arc::new(SessionStore::new(Arc::new(storage)));
    session.load().await.expect("Failed to load session");
    let config = ClientConfig::new(base_url).expect("Invalid base URL");
    let client = ApiClient::new(config, session.clone()).expect("Failed to build client");
    (client, session)
}

/// Client whose session already holds a token for `role`.
pub async fn signed_in_client(base_url: &str, role: &str) -> (ApiClient, Arc<SessionStore>, MemoryTokenStorage) {
    let storage = MemoryTokenStorage::with_token(token_with_role(role));
    let (client, session) = client_with_storage(base_url, storage.clone()).await;
    (client, session, storage)
}
