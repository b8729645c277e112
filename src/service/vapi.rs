//! Vapi voice service client
//!
//! Creates a call over the REST API with the websocket transport, then keeps
//! the call's websocket open on a background task. Control frames go out as
//! JSON text; audio frames coming back are ignored, the rest are forwarded as
//! `ServiceEvent::Message`.

use crate::service::{
    CallOptions, OutgoingMessage, ServiceEvent, ServiceEventSender, VoiceService, WireFrame,
};
use crate::{MocktalkError, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://api.vapi.ai";

/// How long `stop` waits for the socket to close before aborting it
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Credentials and endpoint for the Vapi API
#[derive(Clone, Debug)]
pub struct VapiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Whole-request limit for call creation
    pub request_timeout: Duration,
    /// TCP connect limit, also applied to the websocket handshake
    pub connect_timeout: Duration,
}

impl VapiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeouts(mut self, request: Duration, connect: Duration) -> Self {
        self.request_timeout = request;
        self.connect_timeout = connect;
        self
    }

    fn call_endpoint(&self) -> String {
        format!("{}/call", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedCall {
    id: String,
    transport: Option<CallTransport>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallTransport {
    websocket_call_url: Option<String>,
}

/// A connected call and the task pumping its socket
struct LiveCall {
    id: Uuid,
    vapi_id: String,
    /// Frames queued for the socket writer
    outbound: UnboundedSender<Message>,
    connection: JoinHandle<()>,
}

/// Voice service backed by a Vapi websocket call
pub struct VapiService {
    config: VapiConfig,
    http: Client,
    events: Option<ServiceEventSender>,
    call: Mutex<Option<LiveCall>>,
}

impl VapiService {
    pub fn new(config: VapiConfig) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            config,
            http,
            events: None,
            call: Mutex::new(None),
        }
    }

    /// Vapi's id for the live call, if any
    pub fn call_id(&self) -> Option<String> {
        self.call.lock().as_ref().map(|c| c.vapi_id.clone())
    }

    pub fn is_connected(&self) -> bool {
        self.call
            .lock()
            .as_ref()
            .is_some_and(|c| !c.connection.is_finished())
    }

    fn emit(&self, event: ServiceEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    /// Forget a call whose transport already closed on the remote side.
    /// Fails if a call is still live.
    fn ensure_idle(&self) -> Result<()> {
        let mut call = self.call.lock();
        if call.as_ref().is_some_and(|c| c.connection.is_finished()) {
            if let Some(ended) = call.take() {
                debug!("Releasing ended call {}", ended.vapi_id);
            }
        }
        match call.as_ref() {
            Some(live) => Err(MocktalkError::ServiceError(format!(
                "call {} is already in progress",
                live.vapi_id
            ))),
            None => Ok(()),
        }
    }

    async fn create_call(&self, assistant_id: &str, options: &CallOptions) -> Result<CreatedCall> {
        let body = json!({
            "assistantId": assistant_id,
            "assistantOverrides": options,
            "transport": {
                "provider": "vapi.websocket",
                "audioFormat": {
                    "format": "pcm_s16le",
                    "container": "raw",
                    "sampleRate": 16000,
                },
            },
        });

        let response = self
            .http
            .post(self.config.call_endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MocktalkError::ConnectionError(format!(
                "call creation failed ({}): {}",
                status, detail
            )));
        }

        Ok(response.json::<CreatedCall>().await?)
    }
}

#[async_trait]
impl VoiceService for VapiService {
    fn subscribe(&mut self, events: ServiceEventSender) {
        self.events = Some(events);
    }

    async fn start(&self, call: Uuid, assistant_id: &str, options: &CallOptions) -> Result<()> {
        self.ensure_idle()?;

        let created = self.create_call(assistant_id, options).await?;
        let url = created
            .transport
            .and_then(|t| t.websocket_call_url)
            .ok_or_else(|| {
                MocktalkError::ConnectionError("call response has no websocketCallUrl".to_string())
            })?;

        debug!("Connecting to call transport {}", url);
        let handshake = tokio::time::timeout(self.config.connect_timeout, connect_async(url.as_str()));
        let (stream, _) = handshake.await.map_err(|_| {
            MocktalkError::ConnectionError(format!(
                "timed out connecting to call transport after {:?}",
                self.config.connect_timeout
            ))
        })??;
        info!("Vapi call {} connected", created.id);

        // Announce before the socket task can report the end of the call
        self.emit(ServiceEvent::CallStart(call));

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let connection = tokio::spawn(run_connection(stream, outbound_rx, self.events.clone(), call));
        *self.call.lock() = Some(LiveCall {
            id: call,
            vapi_id: created.id,
            outbound: outbound_tx,
            connection,
        });
        Ok(())
    }

    async fn stop(&self) {
        let live = self.call.lock().take();
        let Some(live) = live else {
            return;
        };

        match serde_json::to_string(&WireFrame::EndCall) {
            Ok(frame) => {
                let _ = live.outbound.send(Message::Text(frame));
            }
            Err(e) => warn!("Failed to encode end-call frame: {}", e),
        }
        let _ = live.outbound.send(Message::Close(None));

        let abort = live.connection.abort_handle();
        if tokio::time::timeout(STOP_GRACE, live.connection).await.is_err() {
            warn!("Call transport did not close in time, aborting");
            abort.abort();
        }

        info!("Vapi call {} ({}) stopped", live.vapi_id, live.id);
    }

    fn send(&self, message: &OutgoingMessage) {
        let call = self.call.lock();
        let Some(live) = call.as_ref() else {
            debug!("No live call, dropping {} message", message.kind());
            return;
        };

        for frame in message.frames() {
            match serde_json::to_string(&frame) {
                Ok(text) => {
                    if live.outbound.send(Message::Text(text)).is_err() {
                        warn!("Call transport closed, dropping {} message", message.kind());
                        return;
                    }
                }
                Err(e) => warn!("Failed to encode {} frame: {}", message.kind(), e),
            }
        }
    }
}

/// True for the status update Vapi sends when the call is over
fn is_call_ended(message: &Value) -> bool {
    message["type"] == "status-update" && message["status"] == "ended"
}

async fn run_connection<S>(
    stream: S,
    mut outbound: UnboundedReceiver<Message>,
    events: Option<ServiceEventSender>,
    call: Uuid,
) where
    S: futures::Stream<Item = std::result::Result<Message, tokio_tungstenite::tungstenite::Error>>
        + futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    let emit = |event: ServiceEvent| {
        if let Some(events) = &events {
            let _ = events.send(event);
        }
    };

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    let closing = matches!(frame, Message::Close(_));
                    if let Err(e) = write.send(frame).await {
                        emit(ServiceEvent::Error(format!("send failed: {}", e)));
                        break;
                    }
                    if closing {
                        break;
                    }
                }
                None => {
                    let _ = write.close().await;
                    break;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<Value>(&text) {
                    Ok(value) => {
                        let ended = is_call_ended(&value);
                        emit(ServiceEvent::Message(value));
                        if ended {
                            break;
                        }
                    }
                    Err(e) => debug!("Ignoring non-JSON frame: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    debug!("Call transport closed by remote: {:?}", frame);
                    break;
                }
                // Binary audio and ping/pong
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(ServiceEvent::Error(format!("transport error: {}", e)));
                    break;
                }
                None => break,
            },
        }
    }

    emit(ServiceEvent::CallEnd(call));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::TWO_SUM;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP request with `body` as a 201 JSON response; yields the
    /// raw request text
    async fn respond_once(listener: TcpListener, body: String) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while !request_complete(&request) {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 201 Created\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= length
    }

    fn short_timeouts(base_url: String) -> VapiConfig {
        VapiConfig::new("key")
            .with_base_url(base_url)
            .with_timeouts(Duration::from_millis(300), Duration::from_millis(300))
    }

    #[test]
    fn test_call_endpoint_trims_trailing_slash() {
        let config = VapiConfig::new("key").with_base_url("http://localhost:9000/");
        assert_eq!(config.call_endpoint(), "http://localhost:9000/call");
        assert_eq!(VapiConfig::new("key").call_endpoint(), "https://api.vapi.ai/call");
    }

    #[test]
    fn test_created_call_parses_websocket_url() {
        let call: CreatedCall = serde_json::from_value(json!({
            "id": "call-123",
            "status": "queued",
            "transport": {
                "provider": "vapi.websocket",
                "websocketCallUrl": "wss://api.vapi.ai/call-123/transport"
            }
        }))
        .unwrap();

        assert_eq!(call.id, "call-123");
        assert_eq!(
            call.transport.and_then(|t| t.websocket_call_url).as_deref(),
            Some("wss://api.vapi.ai/call-123/transport")
        );
    }

    #[test]
    fn test_is_call_ended() {
        assert!(is_call_ended(&json!({ "type": "status-update", "status": "ended" })));
        assert!(!is_call_ended(&json!({ "type": "status-update", "status": "in-progress" })));
        assert!(!is_call_ended(&json!({ "type": "transcript" })));
    }

    #[test]
    fn test_send_without_call_is_dropped() {
        let service = VapiService::new(VapiConfig::new("key"));
        service.send(&OutgoingMessage::ManualShare {
            problem: TWO_SUM,
            code: "int x;".to_string(),
        });
        assert!(!service.is_connected());
        assert!(service.call_id().is_none());
    }

    #[tokio::test]
    async fn test_start_fails_when_endpoint_unreachable() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut service =
            VapiService::new(VapiConfig::new("key").with_base_url("http://127.0.0.1:1"));
        service.subscribe(tx);

        let options = CallOptions::technical_interview("Two Sum", "cpp");
        let result = service.start(Uuid::new_v4(), "assistant", &options).await;

        assert!(matches!(result, Err(MocktalkError::ConnectionError(_))));
        assert!(!service.is_connected());
    }

    #[tokio::test]
    async fn test_start_times_out_when_api_stalls() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        // Accept and then say nothing
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let service = VapiService::new(short_timeouts(base_url));
        let options = CallOptions::technical_interview("Two Sum", "cpp");
        let started = tokio::time::Instant::now();
        let result = service.start(Uuid::new_v4(), "assistant", &options).await;

        assert!(matches!(result, Err(MocktalkError::ConnectionError(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_start_times_out_when_transport_handshake_stalls() {
        // Bound but never accepted: TCP connects, the websocket handshake hangs
        let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_url = format!("ws://{}/transport", silent.local_addr().unwrap());

        let api = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", api.local_addr().unwrap());
        let body = json!({
            "id": "call-9",
            "transport": { "provider": "vapi.websocket", "websocketCallUrl": ws_url }
        })
        .to_string();
        let server = tokio::spawn(respond_once(api, body));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut service = VapiService::new(short_timeouts(base_url));
        service.subscribe(tx);

        let options = CallOptions::technical_interview("Two Sum", "cpp");
        let result = service.start(Uuid::new_v4(), "assistant-7", &options).await;

        match result {
            Err(MocktalkError::ConnectionError(message)) => assert!(message.contains("timed out")),
            other => panic!("expected a connection timeout, got {:?}", other),
        }
        assert!(!service.is_connected());
        assert!(rx.try_recv().is_err(), "no call-start for a failed call");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /call"));
        assert!(request.contains("Bearer key"));
        assert!(request.contains("\"assistantId\":\"assistant-7\""));
        assert!(request.contains("vapi.websocket"));
        drop(silent);
    }
}
