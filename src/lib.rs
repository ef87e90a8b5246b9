//! Chess rule engine: move legality, special moves, notation, and an
//! immutable game-state machine driven by square selections.
//!
//! Callers exchange only squares, roles and [`game_logic::GameState`]
//! snapshots with the core; how moves are solicited or drawn is up to them.

pub mod board;
pub mod feedback;
pub mod game_logic;
pub mod rules;
pub mod script;
pub mod terminal;

pub use board::{Board, CastlingRights, CastlingSide, Color, Piece, Role, Square};
pub use game_logic::{GameEngine, GameError, GameState, Move, PendingPromotion};
pub use rules::special::MoveKind;
pub use rules::{MoveContext, is_legal_move, legal_destinations};
