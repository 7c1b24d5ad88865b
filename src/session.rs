//! Serialized event loop for one peer.
//!
//! Local input and inbound messages are funnelled into one queue; a single
//! [`PeerSession::run`] loop owns the [`GameStateMachine`] and the sending
//! half of the connection and applies events one at a time. A separate task
//! blocks on the receiving half and feeds the queue.

use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};

use crate::core::game::{GameEvent, GameSnapshot, GameStateMachine, LocalInput, Role};
use crate::protocol::Message;
use crate::transport::{PeerReceiver, PeerSender, Transport};

/// Everything the session loop reacts to.
#[derive(Debug)]
pub enum SessionEvent {
    Input(LocalInput),
    Inbound(Message),
    /// The receive task ended, with the failure if there was one.
    Closed(Option<String>),
    /// Periodic check for stalled hand-offs.
    Tick(std::time::Instant),
    Exit,
}

/// Runtime settings for a session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// End the game as stalled when a hand-off is pending this long.
    pub hand_off_timeout: Option<Duration>,
    /// Seed for auto-placement, for reproducible games.
    pub seed: Option<u64>,
}

impl SessionConfig {
    /// Build a state machine for `role` with these settings.
    pub fn machine(&self, role: Role) -> GameStateMachine {
        let machine = GameStateMachine::new(role).with_hand_off_timeout(self.hand_off_timeout);
        match self.seed {
            Some(seed) => machine.with_seed(seed),
            None => machine,
        }
    }
}

/// Presentation-side end of a session: feeds local input in, observes state.
pub struct SessionHandle {
    commands: UnboundedSender<SessionEvent>,
    /// Latest render snapshot.
    pub snapshots: watch::Receiver<GameSnapshot>,
    /// Notifications in the order they happened.
    pub events: UnboundedReceiver<GameEvent>,
}

impl SessionHandle {
    /// Queue a local input. Fails once the session has ended.
    pub fn input(&self, input: LocalInput) -> anyhow::Result<()> {
        self.commands
            .send(SessionEvent::Input(input))
            .map_err(|_| anyhow::anyhow!("session has ended"))
    }

    /// Ask the session loop to stop and close the connection.
    pub fn exit(&self) {
        let _ = self.commands.send(SessionEvent::Exit);
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }
}

pub struct PeerSession<S: PeerSender> {
    machine: GameStateMachine,
    sender: S,
    queue: UnboundedReceiver<SessionEvent>,
    snapshots: watch::Sender<GameSnapshot>,
    notify: UnboundedSender<GameEvent>,
    receive_task: JoinHandle<()>,
    stall_check: Option<Duration>,
}

impl<S: PeerSender + 'static> PeerSession<S> {
    /// Split `transport`, spawn its receive task and return the session loop
    /// with the handle that drives it. Must be called inside a tokio runtime.
    pub fn start<T>(machine: GameStateMachine, transport: T) -> (Self, SessionHandle)
    where
        T: Transport<Sender = S>,
    {
        Self::start_with_stall_check(machine, transport, None)
    }

    /// Like [`PeerSession::start`], polling for stalled hand-offs every
    /// `period`.
    pub fn start_with_stall_check<T>(
        machine: GameStateMachine,
        transport: T,
        period: Option<Duration>,
    ) -> (Self, SessionHandle)
    where
        T: Transport<Sender = S>,
    {
        let (sender, receiver) = transport.split();
        let (queue_tx, queue) = unbounded_channel();
        let (notify, events) = unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(machine.snapshot());

        let receive_task = tokio::spawn(receive_loop(receiver, queue_tx.clone()));

        let session = Self {
            machine,
            sender,
            queue,
            snapshots,
            notify,
            receive_task,
            stall_check: period,
        };
        let handle = SessionHandle {
            commands: queue_tx,
            snapshots: snapshot_rx,
            events,
        };
        (session, handle)
    }

    /// Process events until exit, returning the final snapshot.
    pub async fn run(mut self) -> GameSnapshot {
        let mut ticker = self.stall_check.map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            let event = tokio::select! {
                event = self.queue.recv() => event,
                now = tick(&mut ticker) => Some(SessionEvent::Tick(now.into_std())),
            };
            let Some(event) = event else {
                break;
            };

            match event {
                SessionEvent::Tick(now) => {
                    if !self.machine.check_stall(now) {
                        continue;
                    }
                }
                SessionEvent::Exit => {
                    info!("exit requested");
                    break;
                }
                SessionEvent::Input(input) => match self.machine.handle_input(input) {
                    Ok(outbound) => self.send_all(outbound).await,
                    Err(e) => {
                        debug!("rejected {:?}: {}", input, e);
                        let _ = self.notify.send(GameEvent::Rejected(e.to_string()));
                    }
                },
                SessionEvent::Inbound(msg) => {
                    let kind = msg.kind();
                    match self.machine.handle_message(msg) {
                        Ok(outbound) => self.send_all(outbound).await,
                        Err(e) => warn!("dropping {} message from peer: {}", kind, e),
                    }
                }
                SessionEvent::Closed(reason) => {
                    if let Some(reason) = reason {
                        error!("connection failed: {}", reason);
                    }
                    self.machine.handle_disconnect();
                }
            }
            self.publish();
        }

        self.shutdown().await;
        self.publish();
        self.machine.snapshot()
    }

    async fn send_all(&mut self, outbound: Vec<Message>) {
        for msg in outbound {
            if let Err(e) = self.sender.send(&msg).await {
                error!("failed to send {}: {:#}", msg.kind(), e);
                self.machine.handle_disconnect();
                return;
            }
        }
    }

    fn publish(&mut self) {
        for event in self.machine.take_events() {
            let _ = self.notify.send(event);
        }
        self.snapshots.send_replace(self.machine.snapshot());
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.sender.close().await {
            debug!("closing connection: {:#}", e);
        }
        self.receive_task.abort();
    }
}

async fn tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(ticker) => ticker.tick().await,
        None => std::future::pending().await,
    }
}

/// Forward inbound messages into the session queue until the connection
/// ends.
async fn receive_loop<R: PeerReceiver>(mut receiver: R, queue: UnboundedSender<SessionEvent>) {
    loop {
        match receiver.recv().await {
            Ok(Some(msg)) => {
                if queue.send(SessionEvent::Inbound(msg)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                info!("peer closed the connection");
                let _ = queue.send(SessionEvent::Closed(None));
                break;
            }
            Err(e) => {
                error!("receive failed: {:#}", e);
                let _ = queue.send(SessionEvent::Closed(Some(e.to_string())));
                break;
            }
        }
    }
}
