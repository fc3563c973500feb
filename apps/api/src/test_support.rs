use std::path::Path;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub async fn spawn_local(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn test_config(storage_dir: &Path) -> Config {
    Config {
        port: 0,
        storage_dir: storage_dir.to_path_buf(),
        analysis_service_url: "http://127.0.0.1:9/analyze".to_string(),
        analysis_timeout: Duration::from_secs(5),
        upload_retention: Duration::from_secs(3600),
        sweep_interval: Duration::from_secs(300),
        max_upload_bytes: 10 * 1024 * 1024,
        rust_log: "info".to_string(),
    }
}
