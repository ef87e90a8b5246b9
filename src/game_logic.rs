use std::fmt;

use thiserror::Error;

use crate::board::fen::{Fen, FenError};
use crate::board::{Board, CastlingRights, Color, Piece, Role, Square};
use crate::rules::special::{self, MoveKind};
use crate::rules::{self, MoveContext, notation};
use crate::script::MoveScript;

/// Why an action was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("{from}{to} is not a legal move")]
    IllegalMove { from: Square, to: Square },
    #[error("the piece on {0} does not belong to the side to move")]
    NotYourTurn(Square),
    #[error("there is no piece on {0}")]
    EmptySquare(Square),
    #[error("a promotion choice is pending")]
    PromotionPending,
    #[error("no promotion is pending")]
    NoPendingPromotion,
    #[error("cannot promote to {0:?}")]
    InvalidPromotion(Role),
    #[error("the game is over")]
    GameOver,
}

/// One committed ply. Never mutated once appended to history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub kind: MoveKind,
    pub notation: String,
}

impl Move {
    #[inline]
    pub fn is_castling(&self) -> bool {
        matches!(self.kind, MoveKind::Castling(_))
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.kind == MoveKind::EnPassant
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        self.promoted_to().is_some()
    }

    pub fn promoted_to(&self) -> Option<Role> {
        match self.kind {
            MoveKind::Promotion(role) => Some(role),
            _ => None,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}

/// A pawn has reached the last row and waits for its new role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPromotion {
    pub from: Square,
    pub square: Square,
    pub color: Color,
}

/// Immutable game snapshot.
///
/// Every action returns a new `GameState`; a snapshot a caller still holds
/// never changes underneath it. Rejected actions return an unchanged copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Color,
    selected: Option<Square>,
    legal_moves: Vec<Square>,
    is_check: bool,
    is_checkmate: bool,
    is_stalemate: bool,
    history: Vec<Move>,
    /// Pieces captured *by* each color, indexed by [`Color::index`].
    captured: [Vec<Piece>; 2],
    castling_rights: CastlingRights,
    en_passant: Option<Square>,
    pending_promotion: Option<PendingPromotion>,
    start_fullmove: u32,
    start_player: Color,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// The canonical starting position, white to move.
    pub fn new() -> Self {
        Self::from_setup(Board::initial(), Color::White, CastlingRights::ALL, None, 1)
    }

    /// Starts a game from a FEN position.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fen: Fen = fen.parse()?;
        Ok(Self::from_setup(
            fen.board,
            fen.turn,
            fen.castling,
            fen.en_passant,
            fen.fullmove,
        ))
    }

    fn from_setup(
        board: Board,
        current_player: Color,
        castling_rights: CastlingRights,
        en_passant: Option<Square>,
        start_fullmove: u32,
    ) -> Self {
        let mut state = GameState {
            board,
            current_player,
            selected: None,
            legal_moves: Vec::new(),
            is_check: false,
            is_checkmate: false,
            is_stalemate: false,
            history: Vec::new(),
            captured: [Vec::new(), Vec::new()],
            castling_rights,
            en_passant,
            pending_promotion: None,
            start_fullmove,
            start_player: current_player,
        };
        state.refresh_status();
        state
    }

    /// Writes the position back out as FEN.
    pub fn to_fen(&self) -> String {
        let plies = self.history.len() as u32 + u32::from(self.start_player == Color::Black);
        Fen {
            board: self.board,
            turn: self.current_player,
            castling: self.castling_rights,
            en_passant: self.en_passant,
            fullmove: self.start_fullmove.saturating_add(plies / 2),
        }
        .to_string()
    }

    /// Fullmove number of the position the game started from.
    #[inline]
    pub fn first_fullmove(&self) -> u32 {
        self.start_fullmove
    }

    /// Side that moved first in this game's history.
    #[inline]
    pub fn first_player(&self) -> Color {
        self.start_player
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    #[inline]
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    #[inline]
    pub fn selected_square(&self) -> Option<Square> {
        self.selected
    }

    /// Legal destinations of the selected piece; empty without a selection.
    #[inline]
    pub fn legal_moves_for_selection(&self) -> &[Square] {
        &self.legal_moves
    }

    /// The side to move is in check.
    #[inline]
    pub fn is_check(&self) -> bool {
        self.is_check
    }

    #[inline]
    pub fn is_checkmate(&self) -> bool {
        self.is_checkmate
    }

    #[inline]
    pub fn is_stalemate(&self) -> bool {
        self.is_stalemate
    }

    #[inline]
    pub fn game_over(&self) -> bool {
        self.is_checkmate || self.is_stalemate
    }

    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Pieces `color` has captured so far.
    #[inline]
    pub fn captured_by(&self, color: Color) -> &[Piece] {
        &self.captured[color.index()]
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.pending_promotion
    }

    /// The auxiliary state the validator needs alongside the board.
    #[inline]
    pub fn context(&self) -> MoveContext {
        MoveContext {
            castling: self.castling_rights,
            en_passant: self.en_passant,
        }
    }

    /// Squares the current player's piece on `from` may move to. Empty for
    /// empty squares and opponent pieces.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        match self.board.piece_at(from) {
            Some(piece) if piece.color == self.current_player => {
                rules::legal_destinations(from, &self.board, &self.context())
            }
            _ => Vec::new(),
        }
    }

    /// Every legal `(from, to)` pair for the side to move.
    pub fn all_legal_moves(&self) -> Vec<(Square, Square)> {
        self.board
            .pieces()
            .filter(|(_, piece)| piece.color == self.current_player)
            .flat_map(|(from, _)| {
                self.legal_destinations(from)
                    .into_iter()
                    .map(move |to| (from, to))
            })
            .collect()
    }

    /// Handles a click on `square`.
    ///
    /// - Own piece: select it (or switch selection) and list its moves.
    /// - The selected square again: clear the selection.
    /// - A listed destination: play the move.
    /// - Anything else: clear the selection.
    ///
    /// Ignored while a promotion is pending or the game is over.
    pub fn select_square(&self, square: Square) -> GameState {
        if self.pending_promotion.is_some() || self.game_over() {
            log::debug!("selection of {square} ignored");
            return self.clone();
        }

        if let Some(selected) = self.selected {
            if selected == square {
                return self.with_selection(None);
            }
            if self.legal_moves.contains(&square) {
                return self.apply_move(selected, square);
            }
        }

        match self.board.piece_at(square) {
            Some(piece) if piece.color == self.current_player => self.with_selection(Some(square)),
            _ => self.with_selection(None),
        }
    }

    fn with_selection(&self, selected: Option<Square>) -> GameState {
        let mut next = self.clone();
        next.selected = selected;
        next.legal_moves = selected
            .map(|from| self.legal_destinations(from))
            .unwrap_or_default();
        if let Some(from) = selected {
            log::debug!("selected {from}: {} legal moves", next.legal_moves.len());
        }
        next
    }

    /// Plays `from -> to`, returning an unchanged copy if the move is rejected.
    ///
    /// A pawn reaching the last row does not move yet: the returned state
    /// holds a [`PendingPromotion`] until [`GameState::choose_promotion`] or
    /// [`GameState::cancel_promotion`].
    pub fn apply_move(&self, from: Square, to: Square) -> GameState {
        self.try_apply_move(from, to).unwrap_or_else(|err| {
            log::debug!("move {from}{to} rejected: {err}");
            self.clone()
        })
    }

    /// Like [`GameState::apply_move`] but reports why a move was rejected.
    pub fn try_apply_move(&self, from: Square, to: Square) -> Result<GameState, GameError> {
        if self.game_over() {
            return Err(GameError::GameOver);
        }
        if self.pending_promotion.is_some() {
            return Err(GameError::PromotionPending);
        }
        let piece = self.board.piece_at(from).ok_or(GameError::EmptySquare(from))?;
        if piece.color != self.current_player {
            return Err(GameError::NotYourTurn(from));
        }
        if !rules::is_legal_move(from, to, &self.board, &self.context()) {
            return Err(GameError::IllegalMove { from, to });
        }

        if special::is_promotion(to, piece) {
            let mut next = self.clone();
            next.selected = Some(from);
            next.legal_moves.clear();
            next.pending_promotion = Some(PendingPromotion {
                from,
                square: to,
                color: piece.color,
            });
            log::debug!("promotion pending on {to}");
            return Ok(next);
        }

        Ok(self.commit(from, to, piece, None))
    }

    /// Completes a pending promotion with `role`.
    ///
    /// Pawns and kings are rejected with [`GameError::InvalidPromotion`];
    /// the caller's state, including its pending promotion, is untouched.
    pub fn choose_promotion(&self, role: Role) -> Result<GameState, GameError> {
        let pending = self
            .pending_promotion
            .ok_or(GameError::NoPendingPromotion)?;
        if !role.is_promotable() {
            log::debug!("promotion to {role:?} rejected");
            return Err(GameError::InvalidPromotion(role));
        }
        let pawn = self
            .board
            .piece_at(pending.from)
            .ok_or(GameError::EmptySquare(pending.from))?;

        Ok(self.commit(pending.from, pending.square, pawn, Some(role)))
    }

    /// Abandons a pending promotion. The board and side to move are exactly
    /// as before the attempted move. Without a pending promotion the state
    /// is returned unchanged.
    pub fn cancel_promotion(&self) -> GameState {
        if self.pending_promotion.is_none() {
            log::debug!("no promotion to cancel");
            return self.clone();
        }
        let mut next = self.clone();
        next.pending_promotion = None;
        log::debug!("promotion cancelled");
        next.selected = None;
        next.legal_moves.clear();
        next
    }

    /// Plays every move of `script` in order, stopping at the first rejection.
    pub fn play_script(&self, script: &MoveScript) -> Result<GameState, GameError> {
        script.moves().iter().try_fold(self.clone(), |state, mv| {
            let next = state.try_apply_move(mv.from, mv.to)?;
            match (next.pending_promotion.is_some(), mv.promotion) {
                (true, Some(role)) => next.choose_promotion(role),
                (true, None) => Err(GameError::PromotionPending),
                (false, None) => Ok(next),
                (false, Some(_)) => Err(GameError::IllegalMove {
                    from: mv.from,
                    to: mv.to,
                }),
            }
        })
    }

    /// Commits a validated move and derives the next snapshot.
    fn commit(&self, from: Square, to: Square, piece: Piece, promotion: Option<Role>) -> GameState {
        let tentative_capture = self.board.piece_at(to);
        let kind = special::classify(from, to, piece, self.en_passant, promotion);
        let (board, removed) = special::execute(&self.board, from, to, kind);
        let captured = tentative_capture.or(removed);

        let mut next = self.clone();
        next.board = board;
        if let Some(victim) = captured {
            next.captured[piece.color.index()].push(victim);
        }

        let mut mv = Move {
            from,
            to,
            piece,
            captured,
            kind,
            notation: notation::encode(from, to, piece, captured, kind),
        };

        next.castling_rights = special::update_castling_rights(self.castling_rights, &mv);
        next.en_passant = special::update_en_passant_target(&mv);
        next.current_player = self.current_player.other();
        next.selected = None;
        next.legal_moves.clear();
        next.pending_promotion = None;
        next.refresh_status();

        if next.is_checkmate {
            mv.notation.push('#');
        } else if next.is_check {
            mv.notation.push('+');
        }
        log::info!("{} played {}", piece.color, mv.notation);
        if next.is_checkmate {
            log::info!("checkmate, {} wins", piece.color);
        } else if next.is_stalemate {
            log::info!("stalemate");
        }

        next.history.push(mv);
        next
    }

    /// Recomputes check, checkmate and stalemate for the side to move.
    fn refresh_status(&mut self) {
        let ctx = self.context();
        let can_move = rules::has_legal_move(&self.board, self.current_player, &ctx);
        self.is_check = rules::is_in_check(&self.board, self.current_player);
        self.is_checkmate = self.is_check && !can_move;
        self.is_stalemate = !self.is_check && !can_move;
    }
}

/// Owns the live game and serializes every action on it.
///
/// Each action swaps in a whole new [`GameState`]; borrowers of a previous
/// snapshot keep a consistent value.
#[derive(Debug, Default)]
pub struct GameEngine {
    state: GameState,
}

impl GameEngine {
    #[inline]
    pub fn new() -> Self {
        Self::from_state(GameState::new())
    }

    pub fn from_state(state: GameState) -> Self {
        Self { state }
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Click on a square; see [`GameState::select_square`].
    pub fn select(&mut self, square: Square) -> &GameState {
        self.state = self.state.select_square(square);
        &self.state
    }

    pub fn play(&mut self, from: Square, to: Square) -> Result<&GameState, GameError> {
        self.state = self.state.try_apply_move(from, to)?;
        Ok(&self.state)
    }

    pub fn promote(&mut self, role: Role) -> Result<&GameState, GameError> {
        self.state = self.state.choose_promotion(role)?;
        Ok(&self.state)
    }

    pub fn cancel_promotion(&mut self) -> &GameState {
        self.state = self.state.cancel_promotion();
        &self.state
    }

    pub fn play_script(&mut self, script: &MoveScript) -> Result<&GameState, GameError> {
        self.state = self.state.play_script(script)?;
        Ok(&self.state)
    }

    /// Discards the current game and starts over.
    pub fn new_game(&mut self) -> &GameState {
        log::info!("new game");
        self.state = GameState::new();
        &self.state
    }

    pub fn load_fen(&mut self, fen: &str) -> Result<&GameState, FenError> {
        self.state = GameState::from_fen(fen)?;
        Ok(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CastlingSide;
    use test_case::test_case;

    fn sq(s: &str) -> Square {
        s.parse().expect("test square should be valid")
    }

    fn assert_piece(state: &GameState, square: &str, role: Role, color: Color) {
        let expected = Piece { role, color };
        assert_eq!(
            state.piece_at(sq(square)),
            Some(expected),
            "Expected {:?} at {}, found {:?}",
            expected,
            square,
            state.piece_at(sq(square))
        );
    }

    fn assert_empty(state: &GameState, square: &str) {
        assert_eq!(
            state.piece_at(sq(square)),
            None,
            "Expected empty at {}, found {:?}",
            square,
            state.piece_at(sq(square))
        );
    }

    fn play(state: &GameState, script: &str) -> GameState {
        let script: MoveScript = script.parse().expect("test script should be valid");
        state.play_script(&script).expect("test script should be legal")
    }

    fn from_fen(fen: &str) -> GameState {
        GameState::from_fen(fen).expect("test FEN should be valid")
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::new();

        assert_eq!(state.current_player(), Color::White);
        assert_eq!(state.selected_square(), None);
        assert!(state.legal_moves_for_selection().is_empty());
        assert!(state.history().is_empty());
        assert_eq!(state.castling_rights(), CastlingRights::ALL);
        assert_eq!(state.en_passant_target(), None);
        assert!(!state.is_check() && !state.is_checkmate() && !state.game_over());
        assert_eq!(state.all_legal_moves().len(), 20);
        assert_eq!(state.to_fen(), crate::board::fen::STARTING_FEN);
    }

    #[test]
    fn test_e4_from_initial_position() {
        let state = GameState::new().apply_move(sq("e2"), sq("e4"));

        assert_piece(&state, "e4", Role::Pawn, Color::White);
        assert_empty(&state, "e2");
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.history()[0].notation, "e4");
        assert_eq!(state.en_passant_target(), Some(sq("e3")));
        assert_eq!(state.castling_rights(), CastlingRights::ALL);
        assert_eq!(state.current_player(), Color::Black);
        assert_eq!(
            state.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_snapshots_are_not_mutated() {
        let before = GameState::new();
        let snapshot = before.clone();
        let _after = before.apply_move(sq("e2"), sq("e4"));

        assert_eq!(before, snapshot);
    }

    #[test_case("e2", "e5"; "illegal geometry")]
    #[test_case("e7", "e5"; "opponent piece")]
    #[test_case("e4", "e5"; "empty origin")]
    fn test_rejected_move_leaves_state_unchanged(from: &str, to: &str) {
        let state = GameState::new();
        assert_eq!(state.apply_move(sq(from), sq(to)), state);
    }

    #[test]
    fn test_try_apply_move_reports_reason() {
        let state = GameState::new();
        assert_eq!(
            state.try_apply_move(sq("e7"), sq("e5")),
            Err(GameError::NotYourTurn(sq("e7")))
        );
        assert_eq!(
            state.try_apply_move(sq("e4"), sq("e5")),
            Err(GameError::EmptySquare(sq("e4")))
        );
        assert_eq!(
            state.try_apply_move(sq("e2"), sq("e5")),
            Err(GameError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            })
        );
    }

    #[test]
    fn test_select_own_piece_lists_moves() {
        let state = GameState::new().select_square(sq("g1"));

        assert_eq!(state.selected_square(), Some(sq("g1")));
        assert_eq!(state.legal_moves_for_selection(), &[sq("f3"), sq("h3")]);
    }

    #[test]
    fn test_select_same_square_clears() {
        let state = GameState::new()
            .select_square(sq("e2"))
            .select_square(sq("e2"));

        assert_eq!(state.selected_square(), None);
        assert!(state.legal_moves_for_selection().is_empty());
    }

    #[test]
    fn test_select_other_own_piece_switches() {
        let state = GameState::new()
            .select_square(sq("e2"))
            .select_square(sq("b1"));

        assert_eq!(state.selected_square(), Some(sq("b1")));
        assert_eq!(state.legal_moves_for_selection(), &[sq("a3"), sq("c3")]);
    }

    #[test_case("e5"; "unreachable empty square")]
    #[test_case("e7"; "opponent piece out of reach")]
    fn test_select_non_destination_clears(target: &str) {
        let state = GameState::new()
            .select_square(sq("e2"))
            .select_square(sq(target));

        assert_eq!(state.selected_square(), None);
        assert_eq!(state.board(), &Board::initial());
    }

    #[test]
    fn test_select_opponent_piece_when_idle_does_nothing() {
        let state = GameState::new().select_square(sq("e7"));
        assert_eq!(state.selected_square(), None);
    }

    #[test]
    fn test_select_destination_commits() {
        let state = GameState::new()
            .select_square(sq("e2"))
            .select_square(sq("e4"));

        assert_piece(&state, "e4", Role::Pawn, Color::White);
        assert_eq!(state.current_player(), Color::Black);
        assert_eq!(state.selected_square(), None);
        assert!(state.legal_moves_for_selection().is_empty());
    }

    #[test]
    fn test_capture_recorded_for_capturing_side() {
        let state = play(&GameState::new(), "e2e4 d7d5 e4d5");

        assert_eq!(
            state.captured_by(Color::White),
            &[Piece::new(Role::Pawn, Color::Black)]
        );
        assert!(state.captured_by(Color::Black).is_empty());
        assert_eq!(state.history()[2].notation, "exd5");
    }

    #[test]
    fn test_en_passant_window_lasts_one_ply() {
        let start = play(&GameState::new(), "e2e4 a7a6 e4e5 d7d5");
        assert_eq!(start.en_passant_target(), Some(sq("d6")));

        let captured = start.apply_move(sq("e5"), sq("d6"));
        assert_eq!(captured.history().last().map(|m| m.notation.as_str()), Some("exd6 e.p."));
        assert!(captured.history().last().is_some_and(Move::is_en_passant));
        assert_empty(&captured, "d5");
        assert_eq!(captured.en_passant_target(), None);
        assert_eq!(
            captured.captured_by(Color::White),
            &[Piece::new(Role::Pawn, Color::Black)]
        );

        // Any other move closes the window
        let waited = play(&start, "g1f3 h7h6");
        assert_eq!(waited.en_passant_target(), None);
        assert_eq!(waited.apply_move(sq("e5"), sq("d6")), waited);
    }

    #[test]
    fn test_consecutive_double_advances_each_set_their_own_target() {
        let state = play(&GameState::new(), "e2e4 d7d5");
        assert_eq!(state.en_passant_target(), Some(sq("d6")));
    }

    const CASTLE_READY: &str = "r3k2r/pppq1ppp/2npbn2/2b1p3/2B1P3/2NPBN2/PPPQ1PPP/R3K2R w KQkq - 0 1";

    #[test]
    fn test_white_king_side_castling() {
        let state = from_fen(CASTLE_READY).apply_move(sq("e1"), sq("g1"));

        assert_piece(&state, "g1", Role::King, Color::White);
        assert_piece(&state, "f1", Role::Rook, Color::White);
        assert_empty(&state, "e1");
        assert_empty(&state, "h1");
        let mv = &state.history()[0];
        assert_eq!(mv.notation, "O-O");
        assert!(mv.is_castling());
        assert!(!state.castling_rights().has(Color::White, CastlingSide::KingSide));
        assert!(!state.castling_rights().has(Color::White, CastlingSide::QueenSide));
        assert!(state.castling_rights().has(Color::Black, CastlingSide::KingSide));
    }

    #[test]
    fn test_black_queen_side_castling() {
        let state = play(&from_fen(CASTLE_READY), "a2a3 e8c8");

        assert_piece(&state, "c8", Role::King, Color::Black);
        assert_piece(&state, "d8", Role::Rook, Color::Black);
        assert_eq!(state.history()[1].notation, "O-O-O");
    }

    #[test]
    fn test_rook_move_then_return_does_not_restore_right() {
        let state = play(&from_fen(CASTLE_READY), "h1g1 a7a6 g1h1 a6a5");

        assert!(!state.castling_rights().has(Color::White, CastlingSide::KingSide));
        assert_eq!(state.apply_move(sq("e1"), sq("g1")), state);
    }

    const PROMOTION_READY: &str = "r1bqkbnr/pPpppppp/2n5/8/8/8/PP1PPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_promotion_is_deferred() {
        let before = from_fen(PROMOTION_READY);
        let pending = before.apply_move(sq("b7"), sq("b8"));

        assert_eq!(
            pending.pending_promotion(),
            Some(PendingPromotion {
                from: sq("b7"),
                square: sq("b8"),
                color: Color::White
            })
        );
        assert_eq!(pending.board(), before.board());
        assert_eq!(pending.current_player(), Color::White);
        assert!(pending.history().is_empty());
    }

    #[test]
    fn test_choose_promotion_completes_move() {
        let state = from_fen(PROMOTION_READY)
            .apply_move(sq("b7"), sq("a8"))
            .choose_promotion(Role::Queen)
            .expect("queen is a valid promotion");

        assert_piece(&state, "a8", Role::Queen, Color::White);
        assert_empty(&state, "b7");
        assert_eq!(state.pending_promotion(), None);
        assert_eq!(state.current_player(), Color::Black);
        let mv = &state.history()[0];
        assert_eq!(mv.notation, "bxa8=Q");
        assert_eq!(mv.promoted_to(), Some(Role::Queen));
        assert_eq!(state.captured_by(Color::White), &[Piece::new(Role::Rook, Color::Black)]);
        assert!(!state.castling_rights().has(Color::Black, CastlingSide::QueenSide));
    }

    #[test_case(Role::Pawn)]
    #[test_case(Role::King)]
    fn test_invalid_promotion_keeps_pending(role: Role) {
        let pending = from_fen(PROMOTION_READY).apply_move(sq("b7"), sq("b8"));

        assert_eq!(pending.choose_promotion(role), Err(GameError::InvalidPromotion(role)));
        assert!(pending.pending_promotion().is_some());
    }

    #[test]
    fn test_cancel_promotion_restores_position() {
        let before = from_fen(PROMOTION_READY);
        let cancelled = before.apply_move(sq("b7"), sq("b8")).cancel_promotion();

        assert_eq!(cancelled.board(), before.board());
        assert_eq!(cancelled.current_player(), before.current_player());
        assert_eq!(cancelled.pending_promotion(), None);
        assert_eq!(cancelled.selected_square(), None);
    }

    #[test]
    fn test_cancel_without_pending_promotion_changes_nothing() {
        let selected = GameState::new().select_square(sq("e2"));

        assert_eq!(selected.cancel_promotion(), selected);
        assert_eq!(selected.cancel_promotion().selected_square(), Some(sq("e2")));
    }

    #[test_case("4k3/8/8/8/3Pp3/8/8/4K3 w - e5 0 1"; "target on wrong row")]
    #[test_case("4k3/8/3n4/3pP3/8/8/8/4K3 w - d6 0 1"; "target occupied")]
    fn test_inconsistent_en_passant_fen_rejected(fen: &str) {
        assert!(matches!(GameState::from_fen(fen), Err(FenError::BadEnPassant(_))));
    }

    #[test]
    fn test_fullmove_counter_saturates() {
        let state = play(&from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 4294967295"), "e1e2 e8e7");

        assert_eq!(state.first_fullmove(), u32::MAX);
        assert!(state.to_fen().ends_with(" 0 4294967295"));
    }

    #[test]
    fn test_actions_blocked_while_promotion_pending() {
        let pending = from_fen(PROMOTION_READY).apply_move(sq("b7"), sq("b8"));

        assert_eq!(pending.select_square(sq("e2")), pending);
        assert_eq!(
            pending.try_apply_move(sq("e2"), sq("e4")),
            Err(GameError::PromotionPending)
        );
        assert_eq!(
            GameState::new().choose_promotion(Role::Queen),
            Err(GameError::NoPendingPromotion)
        );
    }

    #[test]
    fn test_fools_mate_ends_game() {
        let state = play(&GameState::new(), "f2f3 e7e5 g2g4 d8h4");

        assert!(state.is_check());
        assert!(state.is_checkmate());
        assert!(state.game_over());
        assert_eq!(state.history()[3].notation, "Qh4#");
        assert_eq!(
            state.try_apply_move(sq("a2"), sq("a3")),
            Err(GameError::GameOver)
        );
        assert_eq!(state.select_square(sq("a2")), state);
    }

    #[test]
    fn test_check_suffix() {
        let state = play(&GameState::new(), "e2e4 f7f6 d1h5");
        assert!(state.is_check());
        assert!(!state.is_checkmate());
        assert_eq!(state.history()[2].notation, "Qh5+");
    }

    #[test]
    fn test_stalemate() {
        let state = from_fen("7k/8/6Q1/8/8/8/8/K7 w - - 0 1").apply_move(sq("g6"), sq("f7"));

        assert!(state.is_stalemate());
        assert!(!state.is_check());
        assert!(state.game_over());
    }

    #[test]
    fn test_quiet_piece_moves_capture_nothing() {
        let state = play(&GameState::new(), "g1f3 g8f6 f3g1 f6g8 b1c3 b8c6");

        assert!(state.captured_by(Color::White).is_empty());
        assert!(state.captured_by(Color::Black).is_empty());
        assert_eq!(state.castling_rights(), CastlingRights::ALL);
    }

    #[test]
    fn test_script_promotion_letter_required() {
        let script: MoveScript = "b7b8".parse().expect("valid script");
        assert_eq!(
            from_fen(PROMOTION_READY).play_script(&script),
            Err(GameError::PromotionPending)
        );
    }

    #[test]
    fn test_fullmove_counter_in_fen() {
        let state = play(&GameState::new(), "e2e4 e7e5 g1f3");
        assert_eq!(
            state.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 0 2"
        );
    }

    #[test]
    fn test_engine_replaces_state_wholesale() {
        let mut engine = GameEngine::new();
        let before = engine.state().clone();

        engine.select(sq("e2"));
        engine.select(sq("e4"));
        assert_eq!(engine.state().current_player(), Color::Black);
        assert_eq!(before, GameState::new());

        assert!(engine.play(sq("e2"), sq("e4")).is_err());
        engine.new_game();
        assert_eq!(engine.state(), &GameState::new());
    }
}
