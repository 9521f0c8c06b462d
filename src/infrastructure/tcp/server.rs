use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::core::codec;
use crate::core::message::Message;
use crate::core::sync::{IoHooks, NoopHooks};
use crate::domain::error::{ComError, ComResult};

enum ServerState {
    Closed,
    Listening {
        listener: TcpListener,
    },
    Connected {
        listener: TcpListener,
        client: TcpStream,
        peer: SocketAddr,
    },
}

/// TCP push server for the supervising GUI.
///
/// Owns a listening endpoint and at most one connected client, as an
/// explicit `Closed -> Listening -> Connected` state machine.
/// Messages are serialized through the text codec, one JSON line per
/// message. `send` is not safe for concurrent invocation; install
/// [`IoHooks`] for external locking.
pub struct SocketServer {
    state: ServerState,
    hooks: Box<dyn IoHooks>,
}

impl SocketServer {
    pub fn new() -> Self {
        Self {
            state: ServerState::Closed,
            hooks: Box::new(NoopHooks),
        }
    }

    /// Install synchronization hooks around the blocking send.
    pub fn with_hooks(mut self, hooks: impl IoHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Bind and listen on `port` (all interfaces). Fails with a setup
    /// error if the port cannot be bound or the server is already
    /// open.
    pub fn open(&mut self, port: u16) -> ComResult<()> {
        if !matches!(self.state, ServerState::Closed) {
            return Err(ComError::Setup {
                message: "server is already open".to_string(),
            });
        }

        let listener = TcpListener::bind(("0.0.0.0", port)).map_err(|e| ComError::Setup {
            message: format!("failed to bind port {port}: {e}"),
        })?;

        info!(port, "gui server listening");
        self.state = ServerState::Listening { listener };
        Ok(())
    }

    /// Block until one GUI client connects.
    ///
    /// Called while a client is already connected, the current client
    /// is dropped and the server waits for a replacement. Fails with
    /// a setup error if the server has not been opened.
    pub fn accept_client(&mut self) -> ComResult<SocketAddr> {
        let listener = match std::mem::replace(&mut self.state, ServerState::Closed) {
            ServerState::Closed => {
                return Err(ComError::Setup {
                    message: "server is not open".to_string(),
                })
            }
            ServerState::Listening { listener } => listener,
            ServerState::Connected { listener, client, peer } => {
                drop(client);
                info!(%peer, "previous gui client dropped");
                listener
            }
        };

        match listener.accept() {
            Ok((client, peer)) => {
                if let Err(e) = client.set_nodelay(true) {
                    warn!("failed to set TCP_NODELAY: {}", e);
                }
                info!(%peer, "gui client connected");
                self.state = ServerState::Connected { listener, client, peer };
                Ok(peer)
            }
            Err(e) => {
                self.state = ServerState::Listening { listener };
                Err(ComError::Connection {
                    message: format!("accept failed: {e}"),
                })
            }
        }
    }

    /// Serialize and push one message to the connected client.
    ///
    /// Takes the message by value: the caller hands over ownership
    /// regardless of outcome. A write failure drops the dead client
    /// (the server returns to listening) and is reported as a
    /// communication error, not a fatal fault.
    pub fn send(&mut self, msg: Message) -> ComResult<()> {
        self.hooks.write_pre();
        let result = self.send_inner(&msg);
        self.hooks.write_post();

        if matches!(result, Err(ComError::Communication { .. })) {
            self.drop_client();
        }
        result
    }

    /// Tear down the client connection (if any) and the listening
    /// endpoint. Safe to call more than once.
    pub fn close(&mut self) {
        if !matches!(self.state, ServerState::Closed) {
            self.state = ServerState::Closed;
            info!("gui server closed");
        }
    }

    /// Address the server is listening on, once open.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            ServerState::Closed => None,
            ServerState::Listening { listener } | ServerState::Connected { listener, .. } => {
                listener.local_addr().ok()
            }
        }
    }

    /// Address of the connected client, if any.
    pub fn client_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            ServerState::Connected { peer, .. } => Some(*peer),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ServerState::Connected { .. })
    }

    fn send_inner(&mut self, msg: &Message) -> ComResult<()> {
        let client = match &mut self.state {
            ServerState::Connected { client, .. } => client,
            _ => {
                return Err(ComError::Communication {
                    message: "no gui client connected".to_string(),
                })
            }
        };

        let line = codec::encode_text(msg)?;
        client
            .write_all(line.as_bytes())
            .and_then(|_| client.flush())
            .map_err(|e| ComError::Communication {
                message: format!("gui write failed: {e}"),
            })?;

        debug!(len = line.len(), "message pushed to gui");
        Ok(())
    }

    fn drop_client(&mut self) {
        if let ServerState::Connected { .. } = self.state {
            if let ServerState::Connected { listener, peer, .. } =
                std::mem::replace(&mut self.state, ServerState::Closed)
            {
                warn!(%peer, "gui client dropped after write failure");
                self.state = ServerState::Listening { listener };
            }
        }
    }
}

impl Default for SocketServer {
    fn default() -> Self {
        Self::new()
    }
}
