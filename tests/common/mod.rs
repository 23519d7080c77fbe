//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;
use rate_limited_api::{HttpServer, ServiceConfig, Shutdown};

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service with `config` on 127.0.0.1 and a random port.
pub async fn start_server(mut config: ServiceConfig) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    TestServer { addr, shutdown }
}

/// Client without connection pooling so concurrent requests use separate sockets.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
