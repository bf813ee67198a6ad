//! The agent's TCP server.
//!
//! One connection is served at a time; requests on that connection are
//! strictly serial (read one frame, dispatch, write the ack). A client
//! arriving while another is being served gets a busy error ack and is
//! closed.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use monkey_protocol::{encode_message, AckStatus, FrameBuffer, Message, ProtocolError};

use crate::backend::ActionBackend;

const READ_CHUNK: usize = 64 * 1024;

#[derive(Debug, Error)]
enum ServeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("unexpected {0} frame from client")]
    Violation(&'static str),
}

/// The agent server. Owns the backend; serves one Controller at a time.
pub struct Agent {
    backend: Arc<dyn ActionBackend>,
}

impl Agent {
    pub fn new(backend: Arc<dyn ActionBackend>) -> Self {
        Self { backend }
    }

    /// Accept loop. Runs until the listener fails.
    pub async fn serve(&self, listener: TcpListener) -> io::Result<()> {
        let local = listener.local_addr()?;
        tracing::info!(addr = %local, "agent listening");

        let slot = Arc::new(Semaphore::new(1));
        loop {
            let (stream, peer) = listener.accept().await?;
            match slot.clone().try_acquire_owned() {
                Ok(permit) => {
                    let backend = self.backend.clone();
                    tokio::spawn(async move {
                        tracing::info!(%peer, "client connected");
                        match serve_connection(stream, backend).await {
                            Ok(()) => tracing::info!(%peer, "client disconnected"),
                            Err(err) => {
                                tracing::warn!(%peer, error = %err, "connection closed")
                            }
                        }
                        drop(permit);
                    });
                }
                Err(_) => {
                    tokio::spawn(refuse(stream, peer));
                }
            }
        }
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    backend: Arc<dyn ActionBackend>,
) -> Result<(), ServeError> {
    stream.set_nodelay(true)?;

    let mut frames = FrameBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        frames.extend(&chunk[..n]);

        while let Some(request) = frames.next_message()? {
            let reply = match request {
                Message::Execute {
                    actions,
                    typing_speed,
                    typing_variance,
                } => {
                    tracing::info!(actions = actions.len(), "executing action block");
                    match backend
                        .execute(&actions, typing_speed, typing_variance)
                        .await
                    {
                        Ok(()) => Message::Ack {
                            status: AckStatus::Ok,
                            message: None,
                        },
                        Err(err) => {
                            tracing::warn!(error = %err, "action block failed");
                            Message::Ack {
                                status: AckStatus::Error,
                                message: Some(err.to_string()),
                            }
                        }
                    }
                }
                Message::Ping => Message::Pong,
                Message::Ack { .. } => return Err(ServeError::Violation("Ack")),
                Message::Pong => return Err(ServeError::Violation("Pong")),
            };

            // A write failure here means the client vanished mid-block;
            // the ack is simply dropped.
            let bytes = encode_message(&reply)?;
            stream.write_all(&bytes).await?;
        }
    }
}

async fn refuse(mut stream: TcpStream, peer: SocketAddr) {
    tracing::warn!(%peer, "refusing client while another is active");
    let busy = Message::Ack {
        status: AckStatus::Error,
        message: Some("busy".into()),
    };
    if let Ok(bytes) = encode_message(&busy) {
        let _ = stream.write_all(&bytes).await;
    }
}
