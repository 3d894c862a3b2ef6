use tokio::sync::mpsc;

use crate::config::PoolConfig;
use crate::job::Job;
use crate::protocol::{SubmitRequest, SubmitResult};

/// Transport interface to one upstream pool, implemented by the
/// network/codec layer below this crate.
///
/// All operations are non-blocking; connect/read/write completion is
/// reported through [`Link::poll`], which the core drains on its
/// single processing context.
pub trait Link: Send {
    /// Begin or resume the asynchronous connect + login sequence.
    fn open(&mut self);

    /// Tear the connection down. Cancels an in-flight connect attempt.
    fn close(&mut self);

    /// Forward a validated share to the pool.
    fn submit(&mut self, request: &SubmitRequest);

    /// Drain the next completion notification, if any.
    fn poll(&mut self) -> Option<LinkEvent>;
}

/// Completion notification from a transport link.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// Login completed; the connection is usable.
    Connected,
    /// New job pushed by the pool.
    Job(Job),
    /// Verdict for a forwarded submission. `error` is the pool's
    /// rejection reason, relayed verbatim.
    Result {
        result: SubmitResult,
        error: Option<String>,
    },
    /// Connection lost, or the connect attempt failed.
    Closed,
}

/// Creates transport links for pool descriptors. Implemented by the
/// network layer; the core never opens sockets itself.
pub trait LinkFactory: Send + Sync {
    fn create(&self, pool: &PoolConfig) -> Box<dyn Link>;
}

/// Command a [`ChannelLink`] forwards to its transport task.
#[derive(Debug, Clone)]
pub enum LinkCommand {
    Open,
    Close,
    Submit(SubmitRequest),
}

/// Transport-task side of a [`ChannelLink`] pair.
#[derive(Debug)]
pub struct TransportHandle {
    /// Commands issued by the core, in call order.
    pub commands: mpsc::UnboundedReceiver<LinkCommand>,
    /// Completion notifications back to the core.
    pub events: mpsc::UnboundedSender<LinkEvent>,
}

/// Channel-backed [`Link`]: the bridge between the synchronous core and
/// an async transport task. Commands flow out and completion events
/// flow back over unbounded channels, so nothing on the processing
/// context ever blocks on I/O.
#[derive(Debug)]
pub struct ChannelLink {
    commands: mpsc::UnboundedSender<LinkCommand>,
    events: mpsc::UnboundedReceiver<LinkEvent>,
}

impl ChannelLink {
    /// Create a link and the handle its transport task drives.
    pub fn pair() -> (ChannelLink, TransportHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        (
            ChannelLink {
                commands: command_tx,
                events: event_rx,
            },
            TransportHandle {
                commands: command_rx,
                events: event_tx,
            },
        )
    }
}

impl Link for ChannelLink {
    fn open(&mut self) {
        // a gone transport task surfaces as a silent link, never a panic
        let _ = self.commands.send(LinkCommand::Open);
    }

    fn close(&mut self) {
        let _ = self.commands.send(LinkCommand::Close);
    }

    fn submit(&mut self, request: &SubmitRequest) {
        let _ = self.commands.send(LinkCommand::Submit(request.clone()));
    }

    fn poll(&mut self) -> Option<LinkEvent> {
        self.events.try_recv().ok()
    }
}
