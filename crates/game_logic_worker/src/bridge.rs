//! WebSocket bridge to a receptionist.
//!
//! A concrete [`Transport`] that connects to `ws://host:port/worker` (or
//! `wss://` when the active channel is secure) and speaks a small JSON
//! protocol. Every frame is a [`BridgeMessage`] envelope:
//!
//! ```json
//! {"namespace": "receptionist", "event": "connect", "data": {"worker_id": "UnityGameLogic-..."}}
//! ```
//!
//! | direction | namespace | event | data |
//! |---|---|---|---|
//! | worker → receptionist | `receptionist` | `connect` | [`ConnectRequest`] |
//! | receptionist → worker | `receptionist` | `accepted` / `rejected` | `{"reason": ...}` on rejection |
//! | worker → receptionist | `load_balancing` | `install` | the partition scheme |
//! | receptionist → worker | `load_balancing` | `installed` / `already_installed` | `{"anchor": 1}` when already installed |

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use worker_connector::{
    ConnectFailure, ConnectionParameters, EntityId, InstallError, LinkProtocol, LocalScheduler, PartitionInstaller,
    PartitionScheme, ReceptionistSettings, Scheduler, SecurityMode, Transport, WorkerSession, SINGLETON_ANCHOR,
};

type BridgeStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const RECEPTIONIST_NAMESPACE: &str = "receptionist";
pub const LOAD_BALANCING_NAMESPACE: &str = "load_balancing";

/// JSON envelope carried by every bridge frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub namespace: String,
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl BridgeMessage {
    pub fn new(namespace: &str, event: &str, data: serde_json::Value) -> Self {
        Self {
            namespace: namespace.to_string(),
            event: event.to_string(),
            data,
        }
    }

    fn to_frame(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::Text(serde_json::to_string(self)?.into()))
    }
}

/// Handshake payload sent to the receptionist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub worker_id: String,
    pub worker_type: String,
    pub link_protocol: LinkProtocol,
    pub security: SecurityMode,
    pub use_external_ip: bool,
    pub protocol_logging: bool,
}

impl ConnectRequest {
    pub fn new(settings: &ReceptionistSettings, parameters: &ConnectionParameters) -> Self {
        Self {
            worker_id: settings.worker_id().to_string(),
            worker_type: parameters.worker_type().to_string(),
            link_protocol: parameters.network.link_protocol,
            security: parameters.network.active_channel().security,
            use_external_ip: parameters.network.use_external_ip,
            protocol_logging: parameters.enable_protocol_logging,
        }
    }
}

/// `ws://` or `wss://` URL of the receptionist's worker endpoint.
pub fn receptionist_url(settings: &ReceptionistSettings, security: SecurityMode) -> String {
    let scheme = match security {
        SecurityMode::Insecure => "ws",
        SecurityMode::Secure => "wss",
    };
    format!("{scheme}://{}/worker", settings.address())
}

/// Maps a WebSocket error raised while connecting to a [`ConnectFailure`].
pub fn classify_error(error: tungstenite::Error) -> ConnectFailure {
    match error {
        tungstenite::Error::Io(e) => ConnectFailure::DiscoveryFailed(e.to_string()),
        tungstenite::Error::Url(e) => ConnectFailure::DiscoveryFailed(e.to_string()),
        tungstenite::Error::Http(response) => {
            let status = response.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                ConnectFailure::CredentialsRejected(format!("receptionist answered {status}"))
            } else {
                ConnectFailure::DiscoveryFailed(format!("receptionist answered {status}"))
            }
        }
        tungstenite::Error::Protocol(e) => ConnectFailure::MalformedResponse(e.to_string()),
        other => ConnectFailure::Transport(other.to_string()),
    }
}

/// Reads the next envelope in `namespace`, skipping control frames.
async fn next_message(stream: &mut BridgeStream, namespace: &str) -> Result<BridgeMessage, ConnectFailure> {
    while let Some(frame) = stream.next().await {
        match frame.map_err(classify_error)? {
            Message::Text(text) => {
                let message: BridgeMessage = serde_json::from_str(text.as_str())
                    .map_err(|e| ConnectFailure::MalformedResponse(e.to_string()))?;
                if message.namespace == namespace {
                    return Ok(message);
                }
                trace!("Ignoring {}:{} while waiting for {}", message.namespace, message.event, namespace);
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    Err(ConnectFailure::Transport("receptionist closed the connection".to_string()))
}

/// Transport that reaches the receptionist over a WebSocket bridge.
#[derive(Debug, Clone, Default)]
pub struct BridgeTransport;

impl BridgeTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for BridgeTransport {
    async fn connect_receptionist(
        &self,
        settings: &ReceptionistSettings,
        parameters: &ConnectionParameters,
    ) -> Result<Box<dyn WorkerSession>, ConnectFailure> {
        let security = parameters.network.active_channel().security;
        let url = receptionist_url(settings, security);
        debug!("🔗 Connecting to receptionist at {}", url);

        let (mut stream, _) = connect_async(url.as_str()).await.map_err(classify_error)?;

        let request = ConnectRequest::new(settings, parameters);
        let data = serde_json::to_value(&request).map_err(|e| ConnectFailure::Transport(e.to_string()))?;
        let frame = BridgeMessage::new(RECEPTIONIST_NAMESPACE, "connect", data)
            .to_frame()
            .map_err(|e| ConnectFailure::Transport(e.to_string()))?;
        stream.send(frame).await.map_err(classify_error)?;

        let reply = next_message(&mut stream, RECEPTIONIST_NAMESPACE).await?;
        match reply.event.as_str() {
            "accepted" => {}
            "rejected" => {
                let reason = reply
                    .data
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or("no reason given")
                    .to_string();
                let _ = stream.close(None).await;
                return Err(ConnectFailure::CredentialsRejected(reason));
            }
            other => {
                return Err(ConnectFailure::MalformedResponse(format!("unexpected handshake reply: {other}")));
            }
        }

        info!("🤝 Receptionist accepted worker {}", settings.worker_id());
        let stream = Arc::new(Mutex::new(stream));
        Ok(Box::new(BridgeSession {
            worker_id: settings.worker_id().to_string(),
            scheduler: LocalScheduler::new(),
            installer: BridgeInstaller {
                stream: stream.clone(),
                reply_timeout: parameters.network.connection_timeout,
            },
            stream,
        }))
    }
}

/// Forwards partition schemes to the receptionist.
pub struct BridgeInstaller {
    stream: Arc<Mutex<BridgeStream>>,
    reply_timeout: Duration,
}

#[async_trait]
impl PartitionInstaller for BridgeInstaller {
    async fn install(&self, scheme: &PartitionScheme) -> Result<(), InstallError> {
        let data = serde_json::to_value(scheme).map_err(|e| InstallError::Unreachable(e.to_string()))?;
        let frame = BridgeMessage::new(LOAD_BALANCING_NAMESPACE, "install", data)
            .to_frame()
            .map_err(|e| InstallError::Unreachable(e.to_string()))?;

        let mut stream = self.stream.lock().await;
        stream
            .send(frame)
            .await
            .map_err(|e| InstallError::Unreachable(e.to_string()))?;

        let reply = tokio::time::timeout(self.reply_timeout, next_message(&mut stream, LOAD_BALANCING_NAMESPACE))
            .await
            .map_err(|_| InstallError::Unreachable("no reply to install request".to_string()))?
            .map_err(|e| InstallError::Unreachable(e.to_string()))?;

        match reply.event.as_str() {
            "installed" => Ok(()),
            "already_installed" => {
                let anchor = reply
                    .data
                    .get("anchor")
                    .cloned()
                    .and_then(|anchor| serde_json::from_value::<EntityId>(anchor).ok())
                    .unwrap_or(SINGLETON_ANCHOR);
                Err(InstallError::AlreadyInstalled(anchor))
            }
            other => Err(InstallError::Unreachable(format!("unexpected install reply: {other}"))),
        }
    }
}

/// A worker session held open over the bridge.
pub struct BridgeSession {
    worker_id: String,
    scheduler: LocalScheduler,
    installer: BridgeInstaller,
    stream: Arc<Mutex<BridgeStream>>,
}

#[async_trait]
impl WorkerSession for BridgeSession {
    fn worker_id(&self) -> &str {
        &self.worker_id
    }

    fn scheduler(&self) -> &dyn Scheduler {
        &self.scheduler
    }

    fn partition_installer(&self) -> &dyn PartitionInstaller {
        &self.installer
    }

    async fn disconnect(&mut self) {
        let mut stream = self.stream.lock().await;
        match stream.close(None).await {
            Ok(()) => debug!("🔌 Closed bridge connection for {}", self.worker_id),
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {}
            Err(e) => warn!("⚠️ Error closing bridge connection for {}: {}", self.worker_id, e),
        }
    }
}
