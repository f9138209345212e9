//! CSMS WebSocket connection endpoint
//!
//! One endpoint represents one logical connection to the central system,
//! plain (`ws://`) or TLS (`wss://`), negotiating the `ocpp1.6`
//! subprotocol. The transport runs on a spawned task; registered callbacks
//! fire from that task. A lost connection schedules a single fixed-interval
//! reconnect; `disconnect()` shuts the endpoint down permanently.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async_tls_with_config,
    tungstenite::{
        client::IntoClientRequest,
        http::{header, HeaderValue},
        protocol::{frame::coding::CloseCode, frame::CloseFrame, Message},
    },
    Connector, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::tls::TlsPolicy;

/// OCPP 1.6 WebSocket subprotocol
pub const OCPP_SUBPROTOCOL: &str = "ocpp1.6";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

pub type ConnectedCallback = Arc<dyn Fn() + Send + Sync>;
pub type DisconnectedCallback = Arc<dyn Fn() + Send + Sync>;
pub type MessageCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    Idle,
    Connecting,
    Connected,
    /// Closed by the server or by a clean stream end.
    Closed,
    /// Lost to a transport error.
    Failed,
    ReconnectScheduled,
    /// Terminal; the endpoint is permanently inert.
    ShuttingDown,
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid connection URI: {0}")]
    InvalidUri(String),
    #[error("could not build connection request: {0}")]
    Request(String),
    #[error("TLS configuration error: {0}")]
    Tls(#[from] native_tls::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl EndpointError {
    /// Setup errors are permanent; retrying with the same settings cannot
    /// succeed.
    fn is_setup(&self) -> bool {
        matches!(
            self,
            EndpointError::InvalidUri(_) | EndpointError::Request(_) | EndpointError::Tls(_)
        )
    }
}

/// Parameters of a single endpoint, fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// CSMS URL (`ws://` or `wss://`), including the charge point path.
    pub uri: String,
    /// Charge point identity, used as the HTTP Basic username.
    pub charge_point_id: String,
    /// HTTP Basic credential; only sent on the TLS path.
    pub authorization_key: Option<String>,
    /// WebSocket ping cadence; zero disables pings.
    pub ping_interval: Duration,
    /// Fixed delay before a reconnect attempt.
    pub reconnect_interval: Duration,
    pub tls: TlsPolicy,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            uri: "ws://localhost:8180/ocpp/cp001".to_string(),
            charge_point_id: "cp001".to_string(),
            authorization_key: None,
            ping_interval: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(10),
            tls: TlsPolicy::default(),
        }
    }
}

#[derive(Default)]
struct Callbacks {
    connected: Option<ConnectedCallback>,
    disconnected: Option<DisconnectedCallback>,
    message: Option<MessageCallback>,
}

struct Shared {
    settings: ConnectionSettings,
    state: Mutex<EndpointState>,
    callbacks: Mutex<Callbacks>,
    writer: tokio::sync::Mutex<Option<WsSink>>,
    session: Mutex<Option<JoinHandle<()>>>,
    reconnect_timer: Mutex<Option<JoinHandle<()>>>,
}

/// A CSMS connection with registered event callbacks.
pub struct ConnectionEndpoint {
    shared: Arc<Shared>,
}

impl ConnectionEndpoint {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                settings,
                state: Mutex::new(EndpointState::Idle),
                callbacks: Mutex::new(Callbacks::default()),
                writer: tokio::sync::Mutex::new(None),
                session: Mutex::new(None),
                reconnect_timer: Mutex::new(None),
            }),
        }
    }

    pub fn on_connected(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.shared.callbacks.lock().connected = Some(Arc::new(callback));
    }

    pub fn on_disconnected(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.shared.callbacks.lock().disconnected = Some(Arc::new(callback));
    }

    pub fn on_message(&self, callback: impl Fn(String) + Send + Sync + 'static) {
        self.shared.callbacks.lock().message = Some(Arc::new(callback));
    }

    /// All three callbacks registered and the endpoint not shut down.
    pub fn initialized(&self) -> bool {
        let callbacks = self.shared.callbacks.lock();
        callbacks.connected.is_some()
            && callbacks.disconnected.is_some()
            && callbacks.message.is_some()
            && self.state() != EndpointState::ShuttingDown
    }

    pub fn state(&self) -> EndpointState {
        *self.shared.state.lock()
    }

    /// Start connecting. Returns false without any I/O when the endpoint
    /// is not initialized, the URI scheme is not a WebSocket scheme, or a
    /// session has already been started on this endpoint.
    pub fn connect(&self) -> bool {
        if !self.initialized() {
            warn!("connect refused: endpoint is not initialized");
            return false;
        }
        let uri = &self.shared.settings.uri;
        if !uri.starts_with("ws://") && !uri.starts_with("wss://") {
            error!("connect refused: {} is not a websocket URI", uri);
            return false;
        }
        {
            let mut state = self.shared.state.lock();
            if *state != EndpointState::Idle {
                warn!("connect refused: endpoint is {:?}", *state);
                return false;
            }
            *state = EndpointState::Connecting;
        }
        let shared = self.shared.clone();
        let handle = tokio::spawn(Shared::run_session(shared));
        *self.shared.session.lock() = Some(handle);
        true
    }

    /// Send a text frame. Any write error counts as connection loss: the
    /// reconnect path starts and false is returned.
    pub async fn send(&self, message: String) -> bool {
        if self.state() != EndpointState::Connected {
            warn!("cannot send, endpoint is not connected");
            return false;
        }
        let mut writer = self.shared.writer.lock().await;
        let Some(sink) = writer.as_mut() else {
            return false;
        };
        debug!("sending: {}", message);
        if let Err(e) = sink.send(Message::Text(message)).await {
            warn!("send failed, treating connection as lost: {}", e);
            *writer = None;
            drop(writer);
            self.shared.set_state(EndpointState::Failed);
            self.shared.start_reconnect();
            return false;
        }
        true
    }

    /// Shut the endpoint down: cancel any pending reconnect, close the
    /// connection with a normal closure, and leave the endpoint inert.
    pub async fn disconnect(&self) {
        self.shared.set_state(EndpointState::ShuttingDown);
        if let Some(timer) = self.shared.reconnect_timer.lock().take() {
            timer.abort();
        }
        {
            let mut writer = self.shared.writer.lock().await;
            if let Some(mut sink) = writer.take() {
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: "".into(),
                };
                if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                    debug!("close frame not delivered: {}", e);
                }
                let _ = sink.close().await;
            }
        }
        if let Some(session) = self.shared.session.lock().take() {
            session.abort();
        }
        if let Some(callback) = self.shared.disconnected_callback() {
            callback();
        }
        info!("endpoint shut down");
    }
}

impl Shared {
    fn set_state(&self, state: EndpointState) {
        debug!("endpoint state -> {:?}", state);
        *self.state.lock() = state;
    }

    fn state(&self) -> EndpointState {
        *self.state.lock()
    }

    fn shutting_down(&self) -> bool {
        self.state() == EndpointState::ShuttingDown
    }

    fn connected_callback(&self) -> Option<ConnectedCallback> {
        self.callbacks.lock().connected.clone()
    }

    fn disconnected_callback(&self) -> Option<DisconnectedCallback> {
        self.callbacks.lock().disconnected.clone()
    }

    fn message_callback(&self) -> Option<MessageCallback> {
        self.callbacks.lock().message.clone()
    }

    async fn run_session(self: Arc<Self>) {
        if self.shutting_down() {
            return;
        }
        match self.establish().await {
            Ok(stream) => self.session_loop(stream).await,
            Err(e) if e.is_setup() => {
                error!("connection setup failed, not retrying: {}", e);
                if !self.shutting_down() {
                    self.set_state(EndpointState::Failed);
                }
            }
            Err(e) => {
                warn!("connection attempt failed: {}", e);
                if self.shutting_down() {
                    return;
                }
                self.set_state(EndpointState::Failed);
                self.start_reconnect();
            }
        }
    }

    async fn establish(&self) -> Result<WsStream, EndpointError> {
        let url = &self.settings.uri;
        let secure = url.starts_with("wss://");

        // into_client_request carries the mandatory upgrade headers; the
        // subprotocol and credentials go on top of those
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|_| EndpointError::InvalidUri(url.clone()))?;
        request.headers_mut().insert(
            header::SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_static(OCPP_SUBPROTOCOL),
        );
        if secure {
            if let Some(key) = &self.settings.authorization_key {
                let credential = general_purpose::STANDARD
                    .encode(format!("{}:{}", self.settings.charge_point_id, key));
                let value = HeaderValue::from_str(&format!("Basic {credential}"))
                    .map_err(|e| EndpointError::Request(e.to_string()))?;
                request.headers_mut().insert(header::AUTHORIZATION, value);
            }
        }

        let connector = if secure {
            Connector::NativeTls(self.settings.tls.build_connector()?)
        } else {
            Connector::Plain
        };

        // the handshake itself rejects a CSMS that does not accept the
        // requested subprotocol
        let (stream, _response) =
            connect_async_tls_with_config(request, None, false, Some(connector)).await?;

        info!("websocket connected to {}", url);
        Ok(stream)
    }

    async fn session_loop(self: Arc<Self>, stream: WsStream) {
        let (sink, mut reader) = stream.split();
        *self.writer.lock().await = Some(sink);
        self.set_state(EndpointState::Connected);
        if let Some(callback) = self.connected_callback() {
            callback();
        }

        let ping_interval = self.settings.ping_interval;
        let mut ping = tokio::time::interval(if ping_interval.is_zero() {
            Duration::from_secs(3600)
        } else {
            ping_interval
        });
        // the first interval tick completes immediately
        ping.tick().await;

        let mut failed = false;
        loop {
            tokio::select! {
                msg = reader.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            debug!("received: {}", text);
                            if let Some(callback) = self.message_callback() {
                                callback(text);
                            }
                        }
                        Some(Ok(Message::Ping(payload))) => {
                            let mut writer = self.writer.lock().await;
                            if let Some(sink) = writer.as_mut() {
                                if let Err(e) = sink.send(Message::Pong(payload)).await {
                                    warn!("pong failed: {}", e);
                                    failed = true;
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("websocket closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("websocket error: {}", e);
                            failed = true;
                            break;
                        }
                        None => {
                            info!("websocket stream ended");
                            break;
                        }
                    }
                }
                _ = ping.tick() => {
                    if ping_interval.is_zero() {
                        continue;
                    }
                    let mut writer = self.writer.lock().await;
                    let Some(sink) = writer.as_mut() else {
                        break;
                    };
                    if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                        warn!("ping failed: {}", e);
                        failed = true;
                        break;
                    }
                }
            }
        }

        *self.writer.lock().await = None;
        if self.shutting_down() {
            return;
        }
        self.set_state(if failed {
            EndpointState::Failed
        } else {
            EndpointState::Closed
        });
        self.start_reconnect();
        if let Some(callback) = self.disconnected_callback() {
            callback();
        }
    }

    /// Schedule a single reconnect attempt. At most one timer exists at a
    /// time; the slot is checked and set under its mutex, the wait itself
    /// happens on the spawned task.
    fn start_reconnect(self: &Arc<Self>) {
        let mut timer = self.reconnect_timer.lock();
        if timer.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("reconnect already scheduled");
            return;
        }
        if self.shutting_down() {
            return;
        }
        self.set_state(EndpointState::ReconnectScheduled);
        let delay = self.settings.reconnect_interval;
        info!("reconnecting in {:?}", delay);
        let shared = self.clone();
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if shared.shutting_down() {
                return;
            }
            // free the slot before the session runs; a loss of the new
            // session must be able to schedule the next attempt
            let _ = shared.reconnect_timer.lock().take();
            shared.set_state(EndpointState::Connecting);
            let session = tokio::spawn(Shared::run_session(shared.clone()));
            *shared.session.lock() = Some(session);
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::handshake::server::{
        Request as HandshakeRequest, Response as HandshakeResponse,
    };

    const WAIT: Duration = Duration::from_secs(5);

    /// Accept a client handshake, echoing the requested subprotocol the
    /// way a CSMS would.
    async fn accept_ocpp(stream: TcpStream) -> WebSocketStream<TcpStream> {
        tokio_tungstenite::accept_hdr_async(
            stream,
            |request: &HandshakeRequest, mut response: HandshakeResponse| {
                if let Some(protocol) = request.headers().get(header::SEC_WEBSOCKET_PROTOCOL) {
                    response
                        .headers_mut()
                        .insert(header::SEC_WEBSOCKET_PROTOCOL, protocol.clone());
                }
                Ok(response)
            },
        )
        .await
        .unwrap()
    }

    fn wired_endpoint(
        uri: String,
        reconnect: Duration,
    ) -> (
        ConnectionEndpoint,
        mpsc::UnboundedReceiver<()>,
        mpsc::UnboundedReceiver<()>,
        mpsc::UnboundedReceiver<String>,
    ) {
        let endpoint = ConnectionEndpoint::new(ConnectionSettings {
            uri,
            reconnect_interval: reconnect,
            ping_interval: Duration::ZERO,
            ..ConnectionSettings::default()
        });
        let (conn_tx, conn_rx) = mpsc::unbounded_channel();
        let (disc_tx, disc_rx) = mpsc::unbounded_channel();
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        endpoint.on_connected(move || {
            let _ = conn_tx.send(());
        });
        endpoint.on_disconnected(move || {
            let _ = disc_tx.send(());
        });
        endpoint.on_message(move |text| {
            let _ = msg_tx.send(text);
        });
        (endpoint, conn_rx, disc_rx, msg_rx)
    }

    #[tokio::test]
    async fn test_connect_requires_callbacks() {
        let endpoint = ConnectionEndpoint::new(ConnectionSettings::default());
        assert!(!endpoint.initialized());
        assert!(!endpoint.connect());
        assert_eq!(endpoint.state(), EndpointState::Idle);

        endpoint.on_connected(|| {});
        endpoint.on_disconnected(|| {});
        assert!(!endpoint.initialized());
        endpoint.on_message(|_| {});
        assert!(endpoint.initialized());
    }

    #[tokio::test]
    async fn test_connect_rejects_non_websocket_scheme() {
        let (endpoint, ..) = wired_endpoint(
            "http://localhost:8180/ocpp/cp001".to_string(),
            Duration::from_secs(3600),
        );
        assert!(!endpoint.connect());
        assert_eq!(endpoint.state(), EndpointState::Idle);
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let (endpoint, ..) = wired_endpoint(
            "ws://localhost:9/ocpp/cp001".to_string(),
            Duration::from_secs(3600),
        );
        assert!(!endpoint.send("[2,\"1\",\"Heartbeat\",{}]".to_string()).await);
    }

    #[tokio::test]
    async fn test_plain_session_lifecycle() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_hdr_async(
                stream,
                |request: &HandshakeRequest, mut response: HandshakeResponse| {
                    // a complete upgrade request with the OCPP subprotocol
                    assert!(request.headers().contains_key(header::SEC_WEBSOCKET_KEY));
                    assert_eq!(
                        request.headers().get(header::SEC_WEBSOCKET_PROTOCOL),
                        Some(&HeaderValue::from_static(OCPP_SUBPROTOCOL))
                    );
                    response
                        .headers_mut()
                        .insert(header::SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(OCPP_SUBPROTOCOL));
                    Ok(response)
                },
            )
            .await
            .unwrap();
            ws.send(Message::Text("[2,\"19223201\",\"Reset\",{\"type\":\"Soft\"}]".to_string()))
                .await
                .unwrap();
            loop {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => break text,
                    Some(Ok(_)) => continue,
                    other => panic!("expected client reply, got {:?}", other),
                }
            }
            // connection drops when the server task returns
        });

        let (endpoint, mut conn_rx, mut disc_rx, mut msg_rx) = wired_endpoint(
            format!("ws://{}/ocpp/cp001", addr),
            Duration::from_secs(3600),
        );
        assert!(endpoint.connect());

        timeout(WAIT, conn_rx.recv()).await.unwrap().unwrap();
        assert_eq!(endpoint.state(), EndpointState::Connected);

        let pushed = timeout(WAIT, msg_rx.recv()).await.unwrap().unwrap();
        assert!(pushed.contains("Reset"));

        assert!(endpoint.send("[3,\"19223201\",{\"status\":\"Accepted\"}]".to_string()).await);
        let echoed = timeout(WAIT, server).await.unwrap().unwrap();
        assert!(echoed.contains("Accepted"));

        // server dropped the connection: disconnected fires, one reconnect
        // gets scheduled
        timeout(WAIT, disc_rx.recv()).await.unwrap().unwrap();
        assert_eq!(endpoint.state(), EndpointState::ReconnectScheduled);

        endpoint.disconnect().await;
        assert_eq!(endpoint.state(), EndpointState::ShuttingDown);
        assert!(!endpoint.initialized());
        assert!(!endpoint.connect());
    }

    #[tokio::test]
    async fn test_reconnects_after_connection_loss() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // first session: accept the handshake, then drop immediately
            let (stream, _) = listener.accept().await.unwrap();
            let ws = accept_ocpp(stream).await;
            drop(ws);
            // second session: hold until the client disconnects
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_ocpp(stream).await;
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (endpoint, mut conn_rx, mut disc_rx, _msg_rx) = wired_endpoint(
            format!("ws://{}/ocpp/cp001", addr),
            Duration::from_millis(200),
        );
        assert!(endpoint.connect());

        timeout(WAIT, conn_rx.recv()).await.unwrap().unwrap();
        timeout(WAIT, disc_rx.recv()).await.unwrap().unwrap();
        // the single scheduled reconnect lands on the second accept
        timeout(WAIT, conn_rx.recv()).await.unwrap().unwrap();
        assert_eq!(endpoint.state(), EndpointState::Connected);

        endpoint.disconnect().await;
        timeout(WAIT, server).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_reconnects_after_repeated_losses() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // two sessions dropped right after the handshake, then one held
            for _ in 0..2 {
                let (stream, _) = listener.accept().await.unwrap();
                let ws = accept_ocpp(stream).await;
                drop(ws);
            }
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_ocpp(stream).await;
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (endpoint, mut conn_rx, mut disc_rx, _msg_rx) = wired_endpoint(
            format!("ws://{}/ocpp/cp001", addr),
            Duration::from_millis(200),
        );
        assert!(endpoint.connect());

        // each loss must schedule a fresh attempt, including losses of
        // sessions that were themselves reconnects
        for _ in 0..2 {
            timeout(WAIT, conn_rx.recv()).await.unwrap().unwrap();
            timeout(WAIT, disc_rx.recv()).await.unwrap().unwrap();
        }
        timeout(WAIT, conn_rx.recv()).await.unwrap().unwrap();
        assert_eq!(endpoint.state(), EndpointState::Connected);

        endpoint.disconnect().await;
        timeout(WAIT, server).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_connect_is_single_shot() {
        // bound but never accepted: the first attempt stays pending
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (endpoint, ..) = wired_endpoint(
            format!("ws://{}/ocpp/cp001", addr),
            Duration::from_secs(3600),
        );
        assert!(endpoint.connect());
        assert!(!endpoint.connect());

        endpoint.disconnect().await;
        assert!(!endpoint.connect());
    }

    #[tokio::test]
    async fn test_scheme_selects_transport() {
        // wss:// opens with a TLS ClientHello (record type 0x16), never a
        // plaintext upgrade request
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let first_byte = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1];
            stream.read_exact(&mut buf).await.unwrap();
            buf[0]
        });
        let (secure, ..) = wired_endpoint(
            format!("wss://{}/ocpp/cp001", addr),
            Duration::from_secs(3600),
        );
        assert!(secure.connect());
        assert_eq!(timeout(WAIT, first_byte).await.unwrap().unwrap(), 0x16);
        secure.disconnect().await;

        // ws:// starts the HTTP upgrade directly
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let first_byte = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1];
            stream.read_exact(&mut buf).await.unwrap();
            buf[0]
        });
        let (plain, ..) = wired_endpoint(
            format!("ws://{}/ocpp/cp001", addr),
            Duration::from_secs(3600),
        );
        assert!(plain.connect());
        assert_eq!(timeout(WAIT, first_byte).await.unwrap().unwrap(), b'G');
        plain.disconnect().await;
    }

    #[tokio::test]
    async fn test_disconnect_cancels_pending_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = accept_ocpp(stream).await;
            drop(ws);
            // no further accept: a fired reconnect would hang on connect,
            // not flip the state back
        });

        let (endpoint, mut conn_rx, mut disc_rx, _msg_rx) = wired_endpoint(
            format!("ws://{}/ocpp/cp001", addr),
            Duration::from_millis(200),
        );
        assert!(endpoint.connect());
        timeout(WAIT, conn_rx.recv()).await.unwrap().unwrap();
        timeout(WAIT, disc_rx.recv()).await.unwrap().unwrap();

        endpoint.disconnect().await;
        assert_eq!(endpoint.state(), EndpointState::ShuttingDown);

        // give an uncancelled timer ample time to fire; shutdown must stick
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(endpoint.state(), EndpointState::ShuttingDown);
    }
}
