//! Alarm webhook server.
//!
//! `AlarmWebhook` binds a TCP port and turns each `POST /v1/alarms`
//! into one scaler invocation. Requests are independent — two
//! overlapping alarms race on the pool size exactly like overlapping
//! harness invocations would.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};

use surge_autoscale::{Scaler, ScalingAction};
use surge_provider::InstanceProvider;

use crate::convert::{parse_notification, TriggerError};

/// HTTP webhook accepting alarm notifications.
pub struct AlarmWebhook<P: InstanceProvider> {
    bind_addr: SocketAddr,
    scaler: Arc<Scaler<P>>,
}

impl<P: InstanceProvider> AlarmWebhook<P> {
    /// Create a webhook bound to the given address.
    pub fn new(bind_addr: SocketAddr, scaler: Arc<Scaler<P>>) -> Self {
        Self { bind_addr, scaler }
    }

    /// Start the server.
    ///
    /// Runs until the shutdown signal flips. Spawns a tokio task per
    /// connection using HTTP/1.1.
    pub async fn serve(
        self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .context("failed to bind alarm webhook")?;

        info!(addr = %self.bind_addr, "alarm webhook listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, peer_addr) = accept_result.context("accept failed")?;
                    let scaler = self.scaler.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let svc = service_fn(move |req: Request<Incoming>| {
                            let scaler = scaler.clone();
                            async move {
                                Ok::<_, hyper::Error>(handle_request(scaler, req).await)
                            }
                        });

                        if let Err(e) = http1::Builder::new()
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(%peer_addr, error = %e, "connection error");
                        }
                    });
                }
                _ = shutdown.changed() => {
                    info!("alarm webhook shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Route one request.
///
/// Generic over the body type so tests can drive it with `Full<Bytes>`
/// instead of a live connection.
pub async fn handle_request<P, B>(
    scaler: Arc<Scaler<P>>,
    req: Request<B>,
) -> Response<Full<Bytes>>
where
    P: InstanceProvider,
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    if req.method() != Method::POST || req.uri().path() != "/v1/alarms" {
        return json_response(
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": "not found" }),
        );
    }

    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": format!("failed to read body: {e}") }),
            );
        }
    };

    match invoke(&scaler, &body).await {
        Ok(action) => json_response(
            StatusCode::ACCEPTED,
            serde_json::to_value(&action).unwrap_or_default(),
        ),
        Err(e @ TriggerError::MalformedEvent(_)) => json_response(
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": e.to_string() }),
        ),
        Err(e @ TriggerError::Scale(_)) => {
            error!(error = %e, "scaling invocation failed");
            json_response(
                StatusCode::BAD_GATEWAY,
                serde_json::json!({ "error": e.to_string() }),
            )
        }
    }
}

/// One invocation: parse, then scale.
async fn invoke<P: InstanceProvider>(
    scaler: &Scaler<P>,
    body: &[u8],
) -> Result<ScalingAction, TriggerError> {
    let event = parse_notification(body)?;
    let action = scaler.handle_alarm(&event).await?;
    Ok(action)
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use surge_core::{ScalerConfig, ScalingBounds};
    use surge_provider::FakeProvider;

    fn test_scaler(min: u32, max: u32) -> (Arc<Scaler<FakeProvider>>, FakeProvider) {
        let provider = FakeProvider::new();
        let config = ScalerConfig {
            region: "us-east-1".to_string(),
            project_name: "myproj".to_string(),
            blueprint_id: "ubuntu_22_04".to_string(),
            bundle_id: "small_2_0".to_string(),
            availability_zone: "us-east-1a".to_string(),
            ssh_key_name: "deploy-key".to_string(),
            bounds: ScalingBounds {
                min_workers: min,
                max_workers: max,
            },
            provider_endpoint: "http://localhost:9400".to_string(),
            provider_token: None,
        };
        (Arc::new(Scaler::new(provider.clone(), config)), provider)
    }

    fn post(body: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri("/v1/alarms")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_alarm() {
        let (scaler, provider) = test_scaler(0, 3);

        let resp = handle_request(scaler, post(r#"{"detail":{"alarmName":"HighCpuAlarm"}}"#)).await;

        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(provider.mutations().len(), 1);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["action"], "scaled_up");
        assert_eq!(value["worker"], "myproj-worker-1");
    }

    #[tokio::test]
    async fn noop_is_still_accepted() {
        let (scaler, provider) = test_scaler(0, 3);

        let resp = handle_request(scaler, post(r#"{"detail":{"alarmName":"info-alarm"}}"#)).await;

        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert!(provider.mutations().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let (scaler, provider) = test_scaler(0, 3);

        let resp = handle_request(scaler, post("not json")).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_maps_to_bad_gateway() {
        let (scaler, provider) = test_scaler(0, 3);
        provider.fail_mutations();

        let resp = handle_request(scaler, post(r#"{"detail":{"alarmName":"HighCpuAlarm"}}"#)).await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (scaler, _provider) = test_scaler(0, 3);

        let req = Request::builder()
            .method(Method::GET)
            .uri("/v1/alarms")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = handle_request(scaler, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn webhook_serves_and_shuts_down() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let (scaler, _provider) = test_scaler(0, 3);
        let webhook = AlarmWebhook::new(addr, scaler);

        let (tx, rx) = tokio::sync::watch::channel(false);

        let server = tokio::spawn(async move { webhook.serve(rx).await });

        // Give it a moment to bind.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        tx.send(true).unwrap();

        let result = server.await.unwrap();
        assert!(result.is_ok());
    }
}
