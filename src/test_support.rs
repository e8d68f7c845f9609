// Stub LMS backend for tests: an axum router on an ephemeral port.

use axum::Router;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::{
    api::ApiClient,
    urls::{Environment, StorageConfig, Urls},
};

pub async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn client_for(base: String) -> ApiClient {
    let urls = Urls::new(base, Environment::Development, StorageConfig::default());
    ApiClient::new(urls, Duration::from_secs(5)).unwrap()
}
