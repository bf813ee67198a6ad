use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

use monkey_core::block::{group_blocks, Block, BlockKind};
use monkey_core::script::{FrontMatter, Script};
use monkey_protocol::{encode_message, AckStatus, FrameBuffer, Message, ProtocolError};

/// How long the Controller waits for an ack before declaring the
/// connection lost.
pub const ACK_DEADLINE: Duration = Duration::from_secs(30);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_CHUNK: usize = 64 * 1024;

/// Outcome of one [`Presenter::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// The action block ran on the agent; cursor advanced.
    Executed,
    /// A pause block; cursor advanced, caller honors the timeout.
    Paused(Option<u64>),
    /// A narration-only block; cursor advanced, nothing sent.
    NarrationOnly,
    /// The cursor is past the last block.
    Finished,
    /// The agent reported a failure; cursor unchanged.
    AgentError(String),
    /// I/O failure, deadline, or protocol violation; the socket is
    /// dropped and the cursor unchanged.
    ConnectionLost,
}

#[derive(Debug, Error)]
enum ExchangeError {
    #[error("not connected")]
    NotConnected,
    #[error("connection closed by agent")]
    Closed,
    #[error("ack deadline exceeded")]
    Deadline,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// The Controller state machine.
///
/// Owns the immutable block list, the cursor, and (while live) the
/// socket to the agent.
pub struct Presenter {
    blocks: Vec<Block>,
    current: usize,
    front_matter: FrontMatter,
    connection: Option<TcpStream>,
    agent_addr: SocketAddr,
}

impl Presenter {
    /// Build a presenter from a parsed script. Blocks are grouped once
    /// and never change afterwards.
    pub fn new(script: Script, agent_addr: SocketAddr) -> Self {
        let blocks = group_blocks(&script);
        Self {
            blocks,
            current: 0,
            front_matter: script.front_matter,
            connection: None,
            agent_addr,
        }
    }

    /// Establish the TCP link. Failure is recoverable; callers retry at
    /// their own pace.
    pub async fn connect(&mut self) -> io::Result<()> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(self.agent_addr))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        stream.set_nodelay(true)?;
        tracing::info!(addr = %self.agent_addr, "connected to agent");
        self.connection = Some(stream);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    /// The block the next `step` will act on, or `None` when finished.
    pub fn current_block(&self) -> Option<&Block> {
        self.blocks.get(self.current)
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.current, self.blocks.len())
    }

    /// Move the cursor back one block. Never goes below zero, and never
    /// un-executes anything already sent.
    pub fn go_back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Hop over the current block without executing it.
    pub fn skip(&mut self) {
        if self.current < self.blocks.len() {
            self.current += 1;
        }
    }

    /// Advance by one block.
    ///
    /// Narration and pause blocks advance locally. Action blocks are
    /// sent as one `Execute` and the ack awaited under [`ACK_DEADLINE`];
    /// an error ack or a dead connection leaves the cursor unchanged.
    pub async fn step(&mut self) -> StepResult {
        let block = match self.blocks.get(self.current) {
            Some(block) => block.clone(),
            None => return StepResult::Finished,
        };

        match block.kind {
            BlockKind::NarrationOnly => {
                self.current += 1;
                StepResult::NarrationOnly
            }
            BlockKind::Pause(timeout_secs) => {
                self.current += 1;
                StepResult::Paused(timeout_secs)
            }
            BlockKind::Action => {
                let request = Message::Execute {
                    actions: block.actions.clone(),
                    typing_speed: self.front_matter.typing_speed,
                    typing_variance: self.front_matter.typing_variance,
                };
                match self.exchange(request).await {
                    Ok(Message::Ack {
                        status: AckStatus::Ok,
                        ..
                    }) => {
                        self.current += 1;
                        StepResult::Executed
                    }
                    Ok(Message::Ack {
                        status: AckStatus::Error,
                        message,
                    }) => StepResult::AgentError(
                        message.unwrap_or_else(|| "agent reported an unknown error".into()),
                    ),
                    Ok(other) => {
                        // Anything but an ack here is a protocol
                        // violation; drop the socket.
                        tracing::warn!(message = ?other, "unexpected reply to Execute");
                        self.connection = None;
                        StepResult::ConnectionLost
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "connection lost during step");
                        self.connection = None;
                        StepResult::ConnectionLost
                    }
                }
            }
        }
    }

    /// Write one message and read one reply under the ack deadline.
    async fn exchange(&mut self, request: Message) -> Result<Message, ExchangeError> {
        let stream = self.connection.as_mut().ok_or(ExchangeError::NotConnected)?;

        let bytes = encode_message(&request)?;
        stream.write_all(&bytes).await?;

        let mut frames = FrameBuffer::new();
        let mut chunk = vec![0u8; READ_CHUNK];
        let read_one = async {
            loop {
                let n = stream.read(&mut chunk).await?;
                if n == 0 {
                    return Err(ExchangeError::Closed);
                }
                frames.extend(&chunk[..n]);
                if let Some(reply) = frames.next_message()? {
                    return Ok(reply);
                }
            }
        };

        timeout(ACK_DEADLINE, read_one)
            .await
            .map_err(|_| ExchangeError::Deadline)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monkey_core::script::{Directive, ParsedLine};
    use monkey_protocol::decode_message;
    use tokio::net::TcpListener;

    fn script_of(directives: Vec<Directive>) -> Script {
        Script {
            front_matter: FrontMatter::default(),
            lines: directives
                .into_iter()
                .enumerate()
                .map(|(i, directive)| ParsedLine {
                    line_number: i + 1,
                    directive,
                })
                .collect(),
        }
    }

    /// A one-connection agent stand-in that answers each request from a
    /// canned list and reports what it received.
    async fn mock_agent(
        responses: Vec<Message>,
    ) -> (SocketAddr, tokio::task::JoinHandle<Vec<Message>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut responses = responses.into_iter();
            let mut pending = Vec::new();
            let mut chunk = vec![0u8; 4096];

            loop {
                let n = match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => n,
                };
                pending.extend_from_slice(&chunk[..n]);

                while let Some((msg, consumed)) = decode_message(&pending).unwrap() {
                    pending.drain(..consumed);
                    received.push(msg);
                    if let Some(reply) = responses.next() {
                        let bytes = encode_message(&reply).unwrap();
                        stream.write_all(&bytes).await.unwrap();
                    }
                }
            }

            received
        });

        (addr, handle)
    }

    fn ok_ack() -> Message {
        Message::Ack {
            status: AckStatus::Ok,
            message: None,
        }
    }

    fn unused_addr() -> SocketAddr {
        // Reserved port; never listened on in these tests.
        "127.0.0.1:1".parse().unwrap()
    }

    #[tokio::test]
    async fn empty_script_is_immediately_finished() {
        let mut presenter = Presenter::new(script_of(vec![]), unused_addr());
        assert_eq!(presenter.step().await, StepResult::Finished);
        assert_eq!(presenter.progress(), (0, 0));
    }

    #[tokio::test]
    async fn narration_needs_no_network() {
        let script = script_of(vec![Directive::Say("Hello".into())]);
        let mut presenter = Presenter::new(script, unused_addr());

        assert_eq!(presenter.step().await, StepResult::NarrationOnly);
        assert_eq!(presenter.step().await, StepResult::Finished);
    }

    #[tokio::test]
    async fn pause_needs_no_network() {
        let script = script_of(vec![Directive::Pause(Some(3))]);
        let mut presenter = Presenter::new(script, unused_addr());

        assert_eq!(presenter.step().await, StepResult::Paused(Some(3)));
    }

    #[tokio::test]
    async fn action_block_executes_and_advances() {
        let (addr, handle) = mock_agent(vec![ok_ack()]).await;

        let script = script_of(vec![
            Directive::Focus("Terminal".into()),
            Directive::Type("ls".into()),
            Directive::Run,
        ]);
        let mut presenter = Presenter::new(script, addr);
        presenter.connect().await.unwrap();

        assert_eq!(presenter.step().await, StepResult::Executed);
        assert_eq!(presenter.progress(), (1, 1));

        drop(presenter);
        let received = handle.await.unwrap();
        assert_eq!(received.len(), 1);
        match &received[0] {
            Message::Execute {
                actions,
                typing_speed,
                typing_variance,
            } => {
                assert_eq!(actions.len(), 3);
                assert_eq!(*typing_speed, 40);
                assert_eq!(*typing_variance, 15);
            }
            other => panic!("expected Execute, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn front_matter_timing_rides_the_execute_message() {
        let (addr, handle) = mock_agent(vec![ok_ack()]).await;

        let mut script = script_of(vec![Directive::Type("hi".into())]);
        script.front_matter.typing_speed = 80;
        let mut presenter = Presenter::new(script, addr);
        presenter.connect().await.unwrap();
        presenter.step().await;

        drop(presenter);
        let received = handle.await.unwrap();
        match &received[0] {
            Message::Execute { typing_speed, .. } => assert_eq!(*typing_speed, 80),
            other => panic!("expected Execute, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_ack_keeps_the_cursor() {
        let (addr, _handle) = mock_agent(vec![Message::Ack {
            status: AckStatus::Error,
            message: Some("no accessibility permission".into()),
        }])
        .await;

        let script = script_of(vec![Directive::Run]);
        let mut presenter = Presenter::new(script, addr);
        presenter.connect().await.unwrap();

        match presenter.step().await {
            StepResult::AgentError(msg) => assert!(msg.contains("no accessibility")),
            other => panic!("expected AgentError, got {other:?}"),
        }
        assert_eq!(presenter.progress(), (0, 1));
        assert!(presenter.is_connected());
    }

    #[tokio::test]
    async fn severed_connection_keeps_the_cursor() {
        // The mock sends no reply and drops the socket on read EOF,
        // but here we close it outright by answering zero requests and
        // letting the accept task finish.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let script = script_of(vec![Directive::Run, Directive::Run]);
        let mut presenter = Presenter::new(script, addr);
        presenter.connect().await.unwrap();

        assert_eq!(presenter.step().await, StepResult::ConnectionLost);
        assert_eq!(presenter.progress(), (0, 2));
        assert!(!presenter.is_connected());
    }

    #[tokio::test]
    async fn reconnect_resends_the_same_block() {
        // First server connection dies without answering; the second
        // answers. The presenter must transmit the same payload twice.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);

            let (mut stream, _) = listener.accept().await.unwrap();
            let mut pending = Vec::new();
            let mut chunk = vec![0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                pending.extend_from_slice(&chunk[..n]);
                if let Some((msg, _)) = decode_message(&pending).unwrap() {
                    let bytes = encode_message(&Message::Ack {
                        status: AckStatus::Ok,
                        message: None,
                    })
                    .unwrap();
                    stream.write_all(&bytes).await.unwrap();
                    return msg;
                }
            }
        });

        let script = script_of(vec![Directive::Type("echo hi".into())]);
        let mut presenter = Presenter::new(script, addr);
        presenter.connect().await.unwrap();

        assert_eq!(presenter.step().await, StepResult::ConnectionLost);
        assert_eq!(presenter.progress(), (0, 1));

        presenter.connect().await.unwrap();
        assert_eq!(presenter.step().await, StepResult::Executed);
        assert_eq!(presenter.progress(), (1, 1));

        let resent = handle.await.unwrap();
        match resent {
            Message::Execute { actions, .. } => {
                assert_eq!(actions, vec![Directive::Type("echo hi".into())]);
            }
            other => panic!("expected Execute, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn step_without_connection_is_connection_lost() {
        let script = script_of(vec![Directive::Run]);
        let mut presenter = Presenter::new(script, unused_addr());

        assert_eq!(presenter.step().await, StepResult::ConnectionLost);
        assert_eq!(presenter.progress(), (0, 1));
    }

    #[tokio::test]
    async fn go_back_and_skip_stay_in_bounds() {
        let script = script_of(vec![Directive::Say("a".into()), Directive::Pause(None)]);
        let mut presenter = Presenter::new(script, unused_addr());

        presenter.go_back();
        assert_eq!(presenter.progress(), (0, 2));

        presenter.skip();
        presenter.skip();
        presenter.skip();
        assert_eq!(presenter.progress(), (2, 2));

        presenter.go_back();
        assert_eq!(presenter.progress(), (1, 2));
    }

    #[tokio::test]
    async fn mixed_script_walks_blocks_in_order() {
        let (addr, _handle) = mock_agent(vec![ok_ack()]).await;

        let script = script_of(vec![
            Directive::Say("intro".into()),
            Directive::Focus("Terminal".into()),
            Directive::Type("ls".into()),
            Directive::Run,
            Directive::Pause(None),
        ]);
        let mut presenter = Presenter::new(script, addr);
        presenter.connect().await.unwrap();

        assert_eq!(presenter.progress(), (0, 2));
        assert_eq!(presenter.step().await, StepResult::Executed);
        assert_eq!(presenter.step().await, StepResult::Paused(None));
        assert_eq!(presenter.step().await, StepResult::Finished);
    }
}
