//! In-process receptionist speaking the bridge protocol.

use crate::bridge::{BridgeMessage, LOAD_BALANCING_NAMESPACE, RECEPTIONIST_NAMESPACE};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::{accept_async, tungstenite::Message};

#[derive(Debug, Clone)]
pub enum ReceptionistBehavior {
    Accept,
    Reject(String),
    /// Accepts the worker but reports the scheme as already installed
    AlreadyInstalled,
}

pub struct TestReceptionist {
    port: u16,
    requests: Arc<Mutex<Vec<BridgeMessage>>>,
}

impl TestReceptionist {
    pub async fn spawn(behavior: ReceptionistBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, behavior.clone(), recorded.clone()));
            }
        });

        Self { port, requests }
    }

    /// A local port nothing is listening on.
    pub async fn unused_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn requests(&self) -> Vec<BridgeMessage> {
        self.requests.lock().await.clone()
    }
}

async fn serve(stream: TcpStream, behavior: ReceptionistBehavior, requests: Arc<Mutex<Vec<BridgeMessage>>>) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };

    while let Some(Ok(frame)) = ws.next().await {
        let Message::Text(text) = frame else {
            continue;
        };
        let Ok(request) = serde_json::from_str::<BridgeMessage>(text.as_str()) else {
            continue;
        };
        requests.lock().await.push(request.clone());

        let reply = match (request.namespace.as_str(), request.event.as_str(), &behavior) {
            (RECEPTIONIST_NAMESPACE, "connect", ReceptionistBehavior::Reject(reason)) => {
                BridgeMessage::new(RECEPTIONIST_NAMESPACE, "rejected", serde_json::json!({ "reason": reason }))
            }
            (RECEPTIONIST_NAMESPACE, "connect", _) => {
                BridgeMessage::new(RECEPTIONIST_NAMESPACE, "accepted", serde_json::json!({}))
            }
            (LOAD_BALANCING_NAMESPACE, "install", ReceptionistBehavior::AlreadyInstalled) => {
                BridgeMessage::new(LOAD_BALANCING_NAMESPACE, "already_installed", serde_json::json!({ "anchor": 1 }))
            }
            (LOAD_BALANCING_NAMESPACE, "install", _) => {
                BridgeMessage::new(LOAD_BALANCING_NAMESPACE, "installed", serde_json::json!({}))
            }
            _ => continue,
        };

        let text = serde_json::to_string(&reply).unwrap();
        if ws.send(Message::Text(text.into())).await.is_err() {
            break;
        }
    }
}
