use crate::domain::deployment::{HealthProbe, ProbeOutcome};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpHealthProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        // Falls back to a default client if the builder rejects the settings
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    fn url(&self) -> String {
        self.url.clone()
    }

    async fn probe(&self) -> ProbeOutcome {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!("Health probe {} answered {}", self.url, status);
                ProbeOutcome::Responded(status)
            }
            Err(e) => {
                debug!("Health probe {} failed: {}", self.url, e);
                ProbeOutcome::Unreachable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status_line: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
        });
        port
    }

    #[tokio::test]
    async fn test_probe_reports_status() {
        let port = serve_once("HTTP/1.1 200 OK").await;
        let probe = HttpHealthProbe::new(format!("http://127.0.0.1:{port}/"), Duration::from_secs(2));
        let outcome = probe.probe().await;
        assert_eq!(outcome, ProbeOutcome::Responded(200));
        assert!(outcome.is_healthy());
    }

    #[tokio::test]
    async fn test_probe_server_error_is_unhealthy() {
        let port = serve_once("HTTP/1.1 500 Internal Server Error").await;
        let probe = HttpHealthProbe::new(format!("http://127.0.0.1:{port}/"), Duration::from_secs(2));
        let outcome = probe.probe().await;
        assert_eq!(outcome, ProbeOutcome::Responded(500));
        assert!(!outcome.is_healthy());
    }

    #[tokio::test]
    async fn test_probe_closed_port_is_unreachable() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let probe = HttpHealthProbe::new(format!("http://127.0.0.1:{port}/"), Duration::from_secs(2));
        assert!(matches!(probe.probe().await, ProbeOutcome::Unreachable(_)));
    }
}
