use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{BRIDGE_FAILURE_MESSAGE, RewriteRequest, RewriteResult};
use crate::infra::wire::{WireCodec, WireError};

use super::RequestRouter;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("background host is not running")]
    HostUnavailable,
    #[error("background host dropped call {call_id} without replying")]
    ReplyDropped { call_id: u64 },
    #[error("failed to start bridge thread: {message}")]
    Spawn { message: String },
}

enum BridgeMessage {
    CallLlm {
        call_id: u64,
        request: RewriteRequest,
        reply_tx: mpsc::Sender<RewriteResult>,
    },
    Shutdown,
}

/// Background side of the bridge. Owns the dispatcher thread; each call runs
/// on its own handler thread so one slow vendor call never blocks another.
pub struct BridgeHost {
    message_tx: mpsc::Sender<BridgeMessage>,
    next_call_id: Arc<AtomicU64>,
    dispatcher_handle: Option<thread::JoinHandle<()>>,
}

impl BridgeHost {
    pub fn spawn(router: RequestRouter) -> Result<Self, BridgeError> {
        let (message_tx, message_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("wordsmith-bridge-dispatcher".to_string())
            .spawn(move || dispatcher_loop(router, message_rx))
            .map_err(|error| BridgeError::Spawn {
                message: error.to_string(),
            })?;

        Ok(Self {
            message_tx,
            next_call_id: Arc::new(AtomicU64::new(1)),
            dispatcher_handle: Some(handle),
        })
    }

    pub fn client(&self) -> BridgeClient {
        BridgeClient {
            message_tx: self.message_tx.clone(),
            next_call_id: Arc::clone(&self.next_call_id),
        }
    }
}

impl Drop for BridgeHost {
    fn drop(&mut self) {
        let _ = self.message_tx.send(BridgeMessage::Shutdown);

        if let Some(handle) = self.dispatcher_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Page side of the bridge. Cheap to clone; every `send` is an independent call.
#[derive(Clone)]
pub struct BridgeClient {
    message_tx: mpsc::Sender<BridgeMessage>,
    next_call_id: Arc<AtomicU64>,
}

impl BridgeClient {
    pub fn send(&self, request: RewriteRequest) -> Result<PendingRewrite, BridgeError> {
        let call_id = self.next_call_id.fetch_add(1, Ordering::SeqCst);
        let (reply_tx, reply_rx) = mpsc::channel();

        self.message_tx
            .send(BridgeMessage::CallLlm {
                call_id,
                request,
                reply_tx,
            })
            .map_err(|_| BridgeError::HostUnavailable)?;

        debug!(call_id, "callLLM sent over bridge");
        Ok(PendingRewrite { call_id, reply_rx })
    }

    pub fn call(&self, request: RewriteRequest) -> Result<RewriteResult, BridgeError> {
        self.send(request)?.wait()
    }
}

/// Handle to one in-flight call.
#[derive(Debug)]
pub struct PendingRewrite {
    call_id: u64,
    reply_rx: mpsc::Receiver<RewriteResult>,
}

impl PendingRewrite {
    pub fn call_id(&self) -> u64 {
        self.call_id
    }

    /// Non-blocking poll. `None` while the call is still running.
    pub fn try_take(&self) -> Option<Result<RewriteResult, BridgeError>> {
        match self.reply_rx.try_recv() {
            Ok(result) => Some(Ok(result)),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(BridgeError::ReplyDropped {
                call_id: self.call_id,
            })),
        }
    }

    pub fn wait(self) -> Result<RewriteResult, BridgeError> {
        self.reply_rx.recv().map_err(|_| BridgeError::ReplyDropped {
            call_id: self.call_id,
        })
    }

    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<RewriteResult, BridgeError>> {
        match self.reply_rx.recv_timeout(timeout) {
            Ok(result) => Some(Ok(result)),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(Err(BridgeError::ReplyDropped {
                call_id: self.call_id,
            })),
        }
    }
}

fn dispatcher_loop(router: RequestRouter, message_rx: mpsc::Receiver<BridgeMessage>) {
    while let Ok(message) = message_rx.recv() {
        match message {
            BridgeMessage::CallLlm {
                call_id,
                request,
                reply_tx,
            } => spawn_handler(&router, call_id, request, reply_tx),
            BridgeMessage::Shutdown => break,
        }
    }
    debug!("bridge dispatcher stopped");
}

fn spawn_handler(
    router: &RequestRouter,
    call_id: u64,
    request: RewriteRequest,
    reply_tx: mpsc::Sender<RewriteResult>,
) {
    let router = router.clone();
    let spawned = thread::Builder::new()
        .name(format!("wordsmith-call-{call_id}"))
        .spawn(move || {
            let result = router.handle(&request);
            if reply_tx.send(result).is_err() {
                debug!(call_id, "caller went away before the reply arrived");
            }
        });

    // A failed spawn drops reply_tx, which the caller sees as ReplyDropped.
    if let Err(error) = spawned {
        warn!(call_id, "failed to start handler thread: {error}");
    }
}

/// Answers newline-delimited `callLLM` messages read from `input`, one JSON
/// response per non-blank line. Lines are handled in order; the wire format
/// has no call id to match out-of-order replies. Returns the number of
/// responses written.
pub fn serve_lines<R: BufRead, W: Write>(
    client: &BridgeClient,
    codec: &WireCodec,
    input: R,
    mut output: W,
) -> io::Result<usize> {
    let mut answered = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let result = match codec.decode_request(&line) {
            Ok(request) => client.call(request).unwrap_or_else(|error| {
                warn!("bridge call failed: {error}");
                RewriteResult::failure(BRIDGE_FAILURE_MESSAGE)
            }),
            Err(error) => rejected_message(&error),
        };
        let response = codec.encode_response(&result).map_err(io::Error::other)?;
        writeln!(output, "{response}")?;
        output.flush()?;
        answered += 1;
    }

    debug!(answered, "bridge input closed");
    Ok(answered)
}

fn rejected_message(error: &WireError) -> RewriteResult {
    debug!("rejected bridge message: {error}");
    RewriteResult::failure(match error {
        WireError::Rejected { message } => message.clone(),
        other => format!("Invalid message: {other}"),
    })
}
