//! Game state machine for one peer.
//!
//! [`GameStateMachine`] owns the authoritative own board and the enemy board
//! inferred from `Result` messages. It is driven by local inputs and inbound
//! messages, returns the messages to send in response, and records
//! [`GameEvent`]s for the presentation layer. It performs no I/O.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::board::Board;
use super::common::{AttackOutcome, BoardError, Coord};
use super::config::{FLEET, NUM_SHIPS};
use super::fleet::{sunk_name, FleetStatus};
use super::ship::{Orientation, ShipDef};
use crate::protocol::Message;

/// Which end of the connection this peer is. The host fires first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Guest,
}

/// How a finished game ended for this peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Won,
    Lost,
    /// The connection closed or failed.
    Disconnected,
    /// A hand-off did not complete within the configured timeout.
    Stalled,
}

/// Coarse stage of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    TitleScreen,
    PlacingShips,
    WaitingForOpponent,
    Playing,
    GameOver(GameOutcome),
}

/// Who may fire, including the in-flight hand-off states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// We may fire.
    Mine,
    /// We fired at the cell and wait for its `Result`.
    AwaitingResult(Coord),
    /// We answered a miss and wait for the attacker's `TurnChange`.
    AwaitingHandOff,
    /// The opponent is firing.
    Theirs,
}

impl Turn {
    fn initial(role: Role) -> Self {
        match role {
            Role::Host => Turn::Mine,
            Role::Guest => Turn::Theirs,
        }
    }
}

/// Input produced by the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalInput {
    /// Leave the title screen.
    Start,
    /// Flip the orientation used for the next placement.
    ToggleOrientation,
    /// Place the next ship starting at the cell.
    PlaceShip(Coord),
    /// Place the next ship at a random valid position.
    AutoPlace,
    /// Fire at a cell of the enemy board.
    Attack(Coord),
    /// Start a new game after the current one ended.
    Reset,
}

/// Notable things that happened, for the presentation layer to announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    OrientationChanged(Orientation),
    ShipPlaced {
        name: &'static str,
        at: Coord,
        orientation: Orientation,
    },
    OpponentReady,
    /// Outcome of our shot.
    ShotResolved {
        cell: Coord,
        hit: bool,
        sunk: Option<String>,
    },
    /// Outcome of the opponent's shot on our board.
    IncomingShot {
        cell: Coord,
        hit: bool,
        sunk: Option<&'static str>,
    },
    TurnGained,
    TurnPassed,
    GameOver(GameOutcome),
    ResetByPeer,
    /// A local input was refused.
    Rejected(String),
}

/// Errors for refused inputs and protocol violations. A refused call never
/// changes state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("{action} is not allowed during {phase:?}")]
    WrongPhase {
        phase: GamePhase,
        action: &'static str,
    },
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("cannot place the {name} at {at}")]
    InvalidPlacement { name: &'static str, at: Coord },
    #[error("unexpected {kind} message during {phase:?} ({turn:?})")]
    UnexpectedMessage {
        kind: &'static str,
        phase: GamePhase,
        turn: Turn,
    },
    #[error("opponent is disconnected")]
    PeerDisconnected,
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Render-facing view of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub role: Role,
    pub phase: GamePhase,
    pub turn: Turn,
    pub my_turn: bool,
    pub own_board: Board,
    pub enemy_board: Board,
    pub own_fleet: FleetStatus,
    pub enemy_sunk: Vec<String>,
    pub next_ship: Option<ShipDef>,
    pub orientation: Orientation,
    pub opponent_ready: bool,
}

pub struct GameStateMachine {
    role: Role,
    phase: GamePhase,
    turn: Turn,
    own: Board,
    enemy: Board,
    orientation: Orientation,
    placed: usize,
    opponent_ready: bool,
    enemy_sunk: Vec<String>,
    /// We sent `Reset` and have not heard from the peer since.
    reset_in_flight: bool,
    hand_off_timeout: Option<Duration>,
    waiting_since: Option<Instant>,
    events: Vec<GameEvent>,
    rng: SmallRng,
}

impl GameStateMachine {
    /// Create a machine on the title screen.
    pub fn new(role: Role) -> Self {
        let mut seed_rng = rand::rng();
        Self {
            role,
            phase: GamePhase::TitleScreen,
            turn: Turn::initial(role),
            own: Board::new(),
            enemy: Board::new(),
            orientation: Orientation::Horizontal,
            placed: 0,
            opponent_ready: false,
            enemy_sunk: Vec::new(),
            reset_in_flight: false,
            hand_off_timeout: None,
            waiting_since: None,
            events: Vec::new(),
            rng: SmallRng::from_rng(&mut seed_rng),
        }
    }

    /// End the game as stalled when a hand-off takes longer than `timeout`.
    pub fn with_hand_off_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.hand_off_timeout = timeout;
        self
    }

    /// Seed the generator used by auto-placement.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// `true` while the right to fire is ours, including while our shot is
    /// in flight.
    pub fn is_my_turn(&self) -> bool {
        self.phase == GamePhase::Playing && matches!(self.turn, Turn::Mine | Turn::AwaitingResult(_))
    }

    /// `true` when an attack input would be accepted now.
    pub fn can_attack(&self) -> bool {
        self.phase == GamePhase::Playing && self.turn == Turn::Mine
    }

    /// `true` while waiting on the peer to complete a hand-off.
    pub fn is_awaiting_peer(&self) -> bool {
        self.phase == GamePhase::Playing
            && matches!(self.turn, Turn::AwaitingResult(_) | Turn::AwaitingHandOff)
    }

    pub fn own_board(&self) -> &Board {
        &self.own
    }

    pub fn enemy_board(&self) -> &Board {
        &self.enemy
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn opponent_ready(&self) -> bool {
        self.opponent_ready
    }

    /// Names of enemy ships reported sunk, in the order they went down.
    pub fn enemy_sunk(&self) -> &[String] {
        &self.enemy_sunk
    }

    /// Next ship to place, if placement is still in progress.
    pub fn next_ship(&self) -> Option<ShipDef> {
        FLEET.get(self.placed).copied()
    }

    /// Drain the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            role: self.role,
            phase: self.phase,
            turn: self.turn,
            my_turn: self.is_my_turn(),
            own_board: self.own.clone(),
            enemy_board: self.enemy.clone(),
            own_fleet: FleetStatus::of(&self.own),
            enemy_sunk: self.enemy_sunk.clone(),
            next_ship: self.next_ship(),
            orientation: self.orientation,
            opponent_ready: self.opponent_ready,
        }
    }

    /// Apply a local input, returning the messages to send to the peer.
    pub fn handle_input(&mut self, input: LocalInput) -> Result<Vec<Message>, GameError> {
        debug!("local input {:?} during {:?}", input, self.phase);
        match input {
            LocalInput::Start => {
                self.require_phase(GamePhase::TitleScreen, "start")?;
                self.set_phase(GamePhase::PlacingShips);
                Ok(Vec::new())
            }
            LocalInput::ToggleOrientation => {
                self.require_phase(GamePhase::PlacingShips, "rotate")?;
                self.orientation = self.orientation.toggled();
                self.events.push(GameEvent::OrientationChanged(self.orientation));
                Ok(Vec::new())
            }
            LocalInput::PlaceShip(at) => {
                self.require_phase(GamePhase::PlacingShips, "place")?;
                self.place_next(at, self.orientation)
            }
            LocalInput::AutoPlace => {
                self.require_phase(GamePhase::PlacingShips, "auto-place")?;
                let def = self.current_ship()?;
                let (at, orientation) = self.own.random_placement(&mut self.rng, def.length())?;
                self.place_next(at, orientation)
            }
            LocalInput::Attack(at) => self.fire(at),
            LocalInput::Reset => {
                match self.phase {
                    GamePhase::GameOver(GameOutcome::Disconnected) => {
                        return Err(GameError::PeerDisconnected)
                    }
                    GamePhase::GameOver(_) => {}
                    phase => {
                        return Err(GameError::WrongPhase {
                            phase,
                            action: "reset",
                        })
                    }
                }
                info!("resetting game");
                self.reset_state();
                self.reset_in_flight = true;
                Ok(vec![Message::Reset])
            }
        }
    }

    /// Apply a message from the peer, returning the messages to send back.
    ///
    /// A message that is not valid in the current state is refused with an
    /// error and leaves the state untouched.
    pub fn handle_message(&mut self, msg: Message) -> Result<Vec<Message>, GameError> {
        debug!("inbound {:?} during {:?} ({:?})", msg, self.phase, self.turn);
        let crossing_reset = std::mem::take(&mut self.reset_in_flight);
        let kind = msg.kind();

        if self.phase == GamePhase::GameOver(GameOutcome::Disconnected) {
            return Err(self.unexpected(kind));
        }

        match msg {
            Message::Ready => match self.phase {
                GamePhase::TitleScreen | GamePhase::PlacingShips if !self.opponent_ready => {
                    self.opponent_ready = true;
                    self.events.push(GameEvent::OpponentReady);
                    Ok(Vec::new())
                }
                GamePhase::WaitingForOpponent => {
                    self.opponent_ready = true;
                    self.events.push(GameEvent::OpponentReady);
                    self.enter_playing();
                    Ok(Vec::new())
                }
                _ => Err(self.unexpected(kind)),
            },
            Message::Attack { cell } => {
                if self.phase != GamePhase::Playing || self.turn != Turn::Theirs {
                    return Err(self.unexpected(kind));
                }
                self.defend(cell)
            }
            Message::Result {
                cell,
                hit,
                sunk_name,
                game_over,
            } => {
                let pending = match (self.phase, self.turn) {
                    (GamePhase::Playing, Turn::AwaitingResult(pending)) => pending,
                    _ => return Err(self.unexpected(kind)),
                };
                if pending != cell {
                    return Err(self.unexpected(kind));
                }
                self.enemy.record_result(cell, hit)?;
                self.waiting_since = None;
                let sunk_name = sunk_name.filter(|_| hit);
                self.events.push(GameEvent::ShotResolved {
                    cell,
                    hit,
                    sunk: sunk_name.clone(),
                });
                if let Some(name) = sunk_name {
                    info!("sank the enemy {}", name);
                    self.enemy_sunk.push(name);
                }
                if !hit {
                    if game_over == Some(true) {
                        warn!("ignoring game_over flag on a miss at {}", cell);
                    }
                    // No stall timer in `Theirs`; a lost TurnChange times out
                    // on the defender, which waits in `AwaitingHandOff`.
                    self.turn = Turn::Theirs;
                    self.events.push(GameEvent::TurnPassed);
                    return Ok(vec![Message::TurnChange]);
                }
                if game_over == Some(true) {
                    self.finish(GameOutcome::Won);
                } else {
                    // A hit keeps the turn without any further message.
                    self.turn = Turn::Mine;
                }
                Ok(Vec::new())
            }
            Message::TurnChange => {
                if self.phase != GamePhase::Playing || self.turn != Turn::AwaitingHandOff {
                    return Err(self.unexpected(kind));
                }
                self.turn = Turn::Mine;
                self.waiting_since = None;
                self.events.push(GameEvent::TurnGained);
                Ok(Vec::new())
            }
            Message::Reset => {
                let fresh = matches!(
                    self.phase,
                    GamePhase::PlacingShips | GamePhase::WaitingForOpponent
                );
                if crossing_reset && fresh {
                    debug!("absorbing peer reset that crossed ours");
                    return Ok(Vec::new());
                }
                info!("peer reset the game");
                self.reset_state();
                self.events.push(GameEvent::ResetByPeer);
                Ok(Vec::new())
            }
        }
    }

    /// The connection closed or failed; the game cannot continue.
    pub fn handle_disconnect(&mut self) {
        if self.phase == GamePhase::GameOver(GameOutcome::Disconnected) {
            return;
        }
        warn!("peer disconnected during {:?}", self.phase);
        self.reset_in_flight = false;
        self.waiting_since = None;
        self.finish(GameOutcome::Disconnected);
    }

    /// End the game as stalled if a hand-off has been pending for longer
    /// than the configured timeout. Returns `true` if it did.
    pub fn check_stall(&mut self, now: Instant) -> bool {
        let (Some(timeout), Some(since)) = (self.hand_off_timeout, self.waiting_since) else {
            return false;
        };
        if !self.is_awaiting_peer() || now.saturating_duration_since(since) < timeout {
            return false;
        }
        warn!("hand-off pending for over {:?} ({:?}); ending game", timeout, self.turn);
        self.waiting_since = None;
        self.finish(GameOutcome::Stalled);
        true
    }

    fn fire(&mut self, at: Coord) -> Result<Vec<Message>, GameError> {
        self.require_phase(GamePhase::Playing, "attack")?;
        if self.turn != Turn::Mine {
            return Err(GameError::NotYourTurn);
        }
        if !at.in_bounds() {
            return Err(BoardError::OutOfBounds(at).into());
        }
        if !self.enemy.is_unattacked(at) {
            return Err(BoardError::AlreadyAttacked(at).into());
        }
        debug!("firing at {}", at);
        self.turn = Turn::AwaitingResult(at);
        self.waiting_since = Some(Instant::now());
        Ok(vec![Message::Attack { cell: at }])
    }

    fn defend(&mut self, cell: Coord) -> Result<Vec<Message>, GameError> {
        let outcome = self.own.resolve_attack(cell)?;
        let reply = match outcome {
            AttackOutcome::Hit(id) => {
                let sunk = sunk_name(&self.own, id)?;
                let destroyed = self.own.is_fleet_destroyed();
                self.events.push(GameEvent::IncomingShot {
                    cell,
                    hit: true,
                    sunk,
                });
                if destroyed {
                    self.finish(GameOutcome::Lost);
                }
                Message::Result {
                    cell,
                    hit: true,
                    sunk_name: sunk.map(str::to_string),
                    game_over: destroyed.then_some(true),
                }
            }
            AttackOutcome::Miss => {
                self.events.push(GameEvent::IncomingShot {
                    cell,
                    hit: false,
                    sunk: None,
                });
                self.turn = Turn::AwaitingHandOff;
                self.waiting_since = Some(Instant::now());
                Message::Result {
                    cell,
                    hit: false,
                    sunk_name: None,
                    game_over: None,
                }
            }
        };
        Ok(vec![reply])
    }

    fn current_ship(&self) -> Result<ShipDef, GameError> {
        self.next_ship().ok_or(GameError::WrongPhase {
            phase: self.phase,
            action: "place",
        })
    }

    fn place_next(&mut self, at: Coord, orientation: Orientation) -> Result<Vec<Message>, GameError> {
        let def = self.current_ship()?;
        if !self.own.is_valid_placement(at, def.length(), orientation) {
            return Err(GameError::InvalidPlacement {
                name: def.name(),
                at,
            });
        }
        self.own.place_ship(at, def.length(), orientation);
        self.placed += 1;
        self.events.push(GameEvent::ShipPlaced {
            name: def.name(),
            at,
            orientation,
        });
        if self.placed < NUM_SHIPS {
            return Ok(Vec::new());
        }
        info!("fleet placed; sending ready");
        if self.opponent_ready {
            self.enter_playing();
        } else {
            self.set_phase(GamePhase::WaitingForOpponent);
        }
        Ok(vec![Message::Ready])
    }

    fn enter_playing(&mut self) {
        self.turn = Turn::initial(self.role);
        self.waiting_since = None;
        self.set_phase(GamePhase::Playing);
        if self.turn == Turn::Mine {
            self.events.push(GameEvent::TurnGained);
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.set_phase(GamePhase::GameOver(outcome));
        self.events.push(GameEvent::GameOver(outcome));
    }

    fn reset_state(&mut self) {
        self.own = Board::new();
        self.enemy = Board::new();
        self.turn = Turn::initial(self.role);
        self.orientation = Orientation::Horizontal;
        self.placed = 0;
        self.opponent_ready = false;
        self.enemy_sunk.clear();
        self.waiting_since = None;
        self.set_phase(GamePhase::PlacingShips);
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            info!("phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    fn require_phase(&self, phase: GamePhase, action: &'static str) -> Result<(), GameError> {
        if self.phase == GamePhase::GameOver(GameOutcome::Disconnected) {
            return Err(GameError::PeerDisconnected);
        }
        if self.phase != phase {
            return Err(GameError::WrongPhase {
                phase: self.phase,
                action,
            });
        }
        Ok(())
    }

    fn unexpected(&self, kind: &'static str) -> GameError {
        GameError::UnexpectedMessage {
            kind,
            phase: self.phase,
            turn: self.turn,
        }
    }
}
