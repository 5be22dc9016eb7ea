//! The authoritative game state machine.
//!
//! `GameSession` owns the position, the side to move, the clocks and the
//! game status. Every handler runs to completion on the session actor, so
//! checking whose turn it is and applying the move form one atomic step.

use super::SessionEvent;
use crate::{
    clock::{Clock, IntervalTicker, TickOutcome},
    config::ServerConfig,
    connection::{ClientConnection, ConnectionRegistry},
    error::ServerError,
    messaging::ServerMessage,
    rules::{MoveOutcome, RulesEngine, RulesError, StandardChess, TerminalReason},
    types::{
        ClockState, ConnectionId, GameOverNotice, GameOverReason, GameStatus, MoveRequest,
        Position, Role, Side,
    },
};
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

pub struct GameSession {
    registry: ConnectionRegistry,
    rules: Box<dyn RulesEngine>,
    clock: Clock,
    position: Position,
    side_to_move: Side,
    status: GameStatus,
}

impl GameSession {
    /// Creates a waiting session with empty slots and full clocks, at
    /// whatever position `rules` currently holds.
    ///
    /// # Arguments
    ///
    /// * `rules` - Engine holding the starting position
    /// * `clock` - A clock that has not been started
    ///
    /// # Errors
    ///
    /// Fails if the engine cannot report its current position.
    pub fn new(rules: Box<dyn RulesEngine>, clock: Clock) -> Result<Self, RulesError> {
        let position = rules.current_position()?;
        let side_to_move = rules.side_to_move();
        Ok(Self {
            registry: ConnectionRegistry::new(),
            rules,
            clock,
            position,
            side_to_move,
            status: GameStatus::Waiting,
        })
    }

    /// Builds the production session: standard chess, the configured
    /// starting position and a one-second ticker feeding `events`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Rules`] if the starting position does not load.
    pub fn from_config(
        config: &ServerConfig,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Result<Self, ServerError> {
        let rules = match &config.starting_position {
            Some(fen) => StandardChess::from_position(&Position(fen.clone()))?,
            None => StandardChess::new(),
        };
        let clock = Clock::new(
            config.clock_seconds,
            Box::new(IntervalTicker::every_second(events)),
        );
        Ok(Self::new(Box::new(rules), clock)?)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Dispatches one queued event. `Break` means the actor should exit.
    pub fn handle_event(&mut self, event: SessionEvent) -> ControlFlow<()> {
        match event {
            SessionEvent::Connected {
                connection_id,
                remote_addr,
                outbound,
            } => {
                self.handle_connect(connection_id, ClientConnection::new(remote_addr, outbound));
            }
            SessionEvent::Disconnected { connection_id } => self.handle_disconnect(connection_id),
            SessionEvent::MoveRequested {
                connection_id,
                request,
            } => self.handle_move_request(connection_id, request),
            SessionEvent::Tick => self.handle_tick(),
            SessionEvent::Shutdown => {
                self.clock.stop();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Seats the connection and sends it the catch-up snapshot: role,
    /// position, clock and, once the game is over, the final result.
    ///
    /// # Returns
    ///
    /// The role the connection was given.
    pub fn handle_connect(&mut self, connection_id: ConnectionId, client: ClientConnection) -> Role {
        let role = self.registry.on_connect(connection_id, client);

        self.registry.send_to(connection_id, ServerMessage::Role(role));
        self.registry
            .send_to(connection_id, ServerMessage::Position(self.position.clone()));
        self.registry
            .send_to(connection_id, ServerMessage::Clock(self.clock.state()));
        if let Some(notice) = self.game_over_notice() {
            self.registry
                .send_to(connection_id, ServerMessage::GameOver(notice));
        }

        role
    }

    /// Frees the connection's slot. The game itself carries on; the clock
    /// simply stops counting until both seats are filled again.
    pub fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        let Some(role) = self.registry.on_disconnect(connection_id) else {
            return;
        };
        if role != Role::Observer && self.status == GameStatus::InProgress {
            info!("⏸️ {:?} left mid-game, clocks paused", role);
        }
        if self.registry.is_empty() {
            debug!("Last connection left, game state kept for the next arrival");
        }
    }

    /// Arbitrates one move request.
    ///
    /// Requests after the game ended, from anyone but the holder of the
    /// side to move, or judged illegal by the rules engine get a private
    /// `invalidMove` reply. An accepted move is broadcast as `position`
    /// then `move`; the first one starts the clock and a terminal one ends
    /// the game.
    ///
    /// # Arguments
    ///
    /// * `connection_id` - The connection that sent the request
    /// * `request` - The move as the client sent it

    pub fn handle_move_request(&mut self, connection_id: ConnectionId, request: MoveRequest) {
        if self.status.is_over() {
            debug!("Move {} from {} after game over", request, connection_id);
            self.reject(connection_id, request);
            return;
        }

        let mover = self.side_to_move;
        if self.registry.slots().holder(mover) != Some(connection_id) {
            debug!(
                "Move {} from {} ({:?}) out of turn, {} to move",
                request,
                connection_id,
                self.registry.role_of(connection_id),
                mover
            );
            self.reject(connection_id, request);
            return;
        }

        match self.rules.try_apply_move(&request) {
            Ok(MoveOutcome::Rejected) => {
                debug!("Illegal move {} from {}", request, connection_id);
                self.reject(connection_id, request);
            }
            Ok(MoveOutcome::Applied {
                new_position,
                is_terminal,
                terminal_reason,
            }) => {
                self.position = new_position;
                self.side_to_move = self.rules.side_to_move();

                if self.status == GameStatus::Waiting {
                    self.status = GameStatus::InProgress;
                    self.clock.start();
                    info!("♟️ Game started with {}", request);
                }

                self.registry
                    .broadcast(ServerMessage::Position(self.position.clone()));
                self.registry.broadcast(ServerMessage::Move(request));

                if is_terminal {
                    let (reason, winner) = match terminal_reason {
                        TerminalReason::Checkmate => (GameOverReason::Checkmate, Some(mover)),
                        TerminalReason::Stalemate | TerminalReason::OtherDraw => {
                            (GameOverReason::Draw, None)
                        }
                        TerminalReason::None => (GameOverReason::Other, None),
                    };
                    self.finish(reason, winner);
                }
            }
            Err(e) => {
                error!("Rules engine failed on {} from {}: {}", request, connection_id, e);
                self.finish(GameOverReason::Other, None);
            }
        }
    }

    /// Applies one clock tick to the side to move and broadcasts the new
    /// clock state. Running out of time ends the game.
    pub fn handle_tick(&mut self) {
        match self
            .clock
            .on_tick(self.registry.both_occupied(), self.side_to_move)
        {
            TickOutcome::Inactive => debug!("Ignoring tick on a stopped clock"),
            TickOutcome::Frozen => trace!("Tick while a seat is empty"),
            TickOutcome::Updated(state) => self.registry.broadcast(ServerMessage::Clock(state)),
            TickOutcome::Expired { state, loser } => {
                self.registry.broadcast(ServerMessage::Clock(state));
                self.handle_clock_timeout(loser);
            }
        }
    }

    /// Ends the game in favour of the side that still has time.
    ///
    /// # Arguments
    ///
    /// * `losing_side` - The side whose clock reached zero
    ///
    /// Ignored if the game already ended.
    pub fn handle_clock_timeout(&mut self, losing_side: Side) {
        if self.status.is_over() {
            debug!("Timeout for {} after game over, ignored", losing_side);
            return;
        }
        self.finish(GameOverReason::Timeout, Some(losing_side.other()));
    }

    fn reject(&self, connection_id: ConnectionId, request: MoveRequest) {
        self.registry
            .send_to(connection_id, ServerMessage::InvalidMove(request));
    }

    fn game_over_notice(&self) -> Option<GameOverNotice> {
        match self.status {
            GameStatus::Over { reason, winner } => Some(GameOverNotice {
                winner: winner.into(),
                reason,
            }),
            _ => None,
        }
    }

    /// Terminal transition. Only the first call has any effect.
    fn finish(&mut self, reason: GameOverReason, winner: Option<Side>) {
        if self.status.is_over() {
            return;
        }
        self.status = GameStatus::Over { reason, winner };
        self.clock.stop();

        let notice = GameOverNotice {
            winner: winner.into(),
            reason,
        };
        info!("🏁 Game over: {:?}, winner {:?}", notice.reason, notice.winner);
        self.registry.broadcast(ServerMessage::GameOver(notice));
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("position", &self.position)
            .field("side_to_move", &self.side_to_move)
            .field("status", &self.status)
            .field("clock", &self.clock)
            .field("connections", &self.registry.len())
            .finish()
    }
}
