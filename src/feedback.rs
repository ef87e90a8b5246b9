use crate::board::{Role, Square};
use crate::game_logic::GameState;
use crate::rules;

/// Type of visual feedback for an individual square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareFeedback {
    /// Legal destination of the selected piece
    Destination,
    /// Moving here captures an opponent piece
    Capture,
    /// The selected piece (origin of move)
    Origin,
    /// King of the side to move, currently in check
    Check,
    /// Opponent piece giving check
    Checker,
}

/// Squares and their highlight for the current game state.
///
/// `BoardFeedback` is computed by [`compute_feedback`] and consumed by any
/// display layer. It carries no rule knowledge of its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardFeedback {
    squares: Vec<(Square, SquareFeedback)>,
}

impl BoardFeedback {
    /// Get all square feedback entries
    #[inline]
    pub fn squares(&self) -> &[(Square, SquareFeedback)] {
        &self.squares
    }

    /// Get feedback for a specific square, if any
    #[inline]
    pub fn get(&self, square: Square) -> Option<SquareFeedback> {
        self.squares
            .iter()
            .find(|(sq, _)| *sq == square)
            .map(|(_, feedback)| *feedback)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }
}

impl From<Vec<(Square, SquareFeedback)>> for BoardFeedback {
    fn from(squares: Vec<(Square, SquareFeedback)>) -> Self {
        Self { squares }
    }
}

/// Compute visual feedback based on current game state.
///
/// - Promotion pending: origin and promotion square
/// - Piece selected: origin, destinations and captures
/// - Otherwise, in check: the king and its checkers
pub fn compute_feedback(state: &GameState) -> BoardFeedback {
    if let Some(pending) = state.pending_promotion() {
        return vec![
            (pending.from, SquareFeedback::Origin),
            (pending.square, SquareFeedback::Destination),
        ]
        .into();
    }

    match state.selected_square() {
        Some(from) => show_destinations_for(state, from),
        None if state.is_check() => show_check(state),
        None => BoardFeedback::default(),
    }
}

/// Show legal destinations of the selected piece
fn show_destinations_for(state: &GameState, from: Square) -> BoardFeedback {
    std::iter::once((from, SquareFeedback::Origin))
        .chain(
            state
                .legal_moves_for_selection()
                .iter()
                .map(|&to| classify_destination(state, from, to)),
        )
        .collect::<Vec<_>>()
        .into()
}

/// Classify a destination as either a capture or a quiet move
fn classify_destination(state: &GameState, from: Square, to: Square) -> (Square, SquareFeedback) {
    let captures_piece = state.piece_at(to).is_some();
    let en_passant = state.piece_at(from).is_some_and(|p| p.role == Role::Pawn)
        && state.en_passant_target() == Some(to)
        && from.col() != to.col();

    if captures_piece || en_passant {
        (to, SquareFeedback::Capture)
    } else {
        (to, SquareFeedback::Destination)
    }
}

/// Show the checked king and every piece giving check
fn show_check(state: &GameState) -> BoardFeedback {
    let color = state.current_player();
    let Some(king) = state.board().king_square(color) else {
        return BoardFeedback::default();
    };

    std::iter::once((king, SquareFeedback::Check))
        .chain(
            rules::checkers(state.board(), color)
                .into_iter()
                .map(|sq| (sq, SquareFeedback::Checker)),
        )
        .collect::<Vec<_>>()
        .into()
}
