//! Castling, en passant and promotion: classification, execution, and the
//! bookkeeping that follows every ply.

use crate::board::{Board, CastlingRights, CastlingSide, KING_START_COL, Piece, Role, Square};
use crate::game_logic::Move;

/// How a committed move differs from a plain relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    Castling(CastlingSide),
    EnPassant,
    Promotion(Role),
}

/// Castling side if `piece` is a king moving two files along its row.
///
/// Shape only; see [`castling_allowed`] for the board preconditions.
pub fn castling_side(from: Square, to: Square, piece: Piece) -> Option<CastlingSide> {
    if piece.role != Role::King || from.row() != to.row() {
        return None;
    }
    match to.col() as i8 - from.col() as i8 {
        2 => Some(CastlingSide::KingSide),
        -2 => Some(CastlingSide::QueenSide),
        _ => None,
    }
}

#[inline]
pub fn is_castling(from: Square, to: Square, piece: Piece) -> bool {
    castling_side(from, to, piece).is_some()
}

/// The single authority on castling preconditions: the king stands on its
/// original square, the matching right is held, a same-color rook sits on
/// the corner, and every square between them is empty.
///
/// Attacks on the king's path are checked by [`crate::rules::is_legal_move`].
pub fn castling_allowed(board: &Board, from: Square, to: Square, rights: CastlingRights) -> bool {
    let Some(king) = board.piece_at(from) else {
        return false;
    };
    let Some(side) = castling_side(from, to, king) else {
        return false;
    };
    let row = king.color.back_row();
    if from.row() != row || from.col() != KING_START_COL {
        return false;
    }
    if !rights.has(king.color, side) {
        return false;
    }

    let rook_home = Square::new(row, side.rook_col());
    if rook_home.and_then(|sq| board.piece_at(sq)) != Some(Piece::new(Role::Rook, king.color)) {
        return false;
    }

    let (lo, hi) = match side {
        CastlingSide::KingSide => (KING_START_COL + 1, side.rook_col()),
        CastlingSide::QueenSide => (side.rook_col() + 1, KING_START_COL),
    };
    (lo..hi).all(|col| Square::new(row, col).is_some_and(|sq| board.is_empty(sq)))
}

/// A pawn moving one file diagonally forward onto the en-passant square.
pub fn is_en_passant(from: Square, to: Square, piece: Piece, en_passant: Option<Square>) -> bool {
    piece.role == Role::Pawn
        && en_passant == Some(to)
        && to.row() as i8 - from.row() as i8 == piece.color.forward()
        && (to.col() as i8 - from.col() as i8).abs() == 1
}

/// A pawn arriving on the far row for its color.
pub fn is_promotion(to: Square, piece: Piece) -> bool {
    piece.role == Role::Pawn && to.row() == piece.color.promotion_row()
}

/// Classifies a move already known to be legal. `promotion` is the chosen
/// role when the move promotes; it is ignored otherwise.
pub fn classify(
    from: Square,
    to: Square,
    piece: Piece,
    en_passant: Option<Square>,
    promotion: Option<Role>,
) -> MoveKind {
    if let Some(side) = castling_side(from, to, piece) {
        MoveKind::Castling(side)
    } else if is_en_passant(from, to, piece, en_passant) {
        MoveKind::EnPassant
    } else if is_promotion(to, piece)
        && let Some(role) = promotion
    {
        MoveKind::Promotion(role)
    } else {
        MoveKind::Normal
    }
}

/// Moves the king to `to` and its rook to the square it crossed, in one
/// new board. Assumes the move was validated.
pub fn execute_castling(board: &Board, from: Square, to: Square) -> Board {
    let mut next = board.relocate(from, to);
    let side = board
        .piece_at(from)
        .and_then(|king| castling_side(from, to, king));
    if let Some(side) = side
        && let (Some(rook_from), Some(rook_to)) = (
            Square::new(from.row(), side.rook_col()),
            Square::new(from.row(), side.rook_to_col()),
        )
    {
        next = next.relocate(rook_from, rook_to);
    }
    next
}

/// Moves the pawn to `to` and removes the enemy pawn one row behind it.
/// Returns the removed piece for the capture record.
pub fn execute_en_passant(
    board: &Board,
    from: Square,
    to: Square,
    piece: Piece,
) -> (Board, Option<Piece>) {
    let mut next = board.relocate(from, to);
    let captured = to
        .offset(-piece.color.forward(), 0)
        .and_then(|victim| next.take(victim));
    (next, captured)
}

/// Applies a classified move, returning the new board and whatever piece
/// left the board as a capture.
pub fn execute(board: &Board, from: Square, to: Square, kind: MoveKind) -> (Board, Option<Piece>) {
    match kind {
        MoveKind::Castling(_) => (execute_castling(board, from, to), None),
        MoveKind::EnPassant => match board.piece_at(from) {
            Some(pawn) => execute_en_passant(board, from, to, pawn),
            None => (*board, None),
        },
        MoveKind::Promotion(role) => {
            let captured = board.piece_at(to);
            let mut next = board.relocate(from, to);
            if let Some(pawn) = board.piece_at(from) {
                next.set(to, Some(Piece::new(role, pawn.color)));
            }
            (next, captured)
        }
        MoveKind::Normal => (board.relocate(from, to), board.piece_at(to)),
    }
}

/// The board after `from -> to`, for king-safety probing. Promotions are
/// left as pawns since the promoted role cannot change who attacks the
/// mover's king.
pub fn resulting_board(board: &Board, from: Square, to: Square, en_passant: Option<Square>) -> Board {
    let Some(piece) = board.piece_at(from) else {
        return *board;
    };
    let kind = classify(from, to, piece, en_passant, None);
    execute(board, from, to, kind).0
}

/// Rights after `mv`: a king move clears both of its color's rights, a rook
/// leaving its corner clears that side, and capturing a rook on its corner
/// clears the owner's right on that side.
pub fn update_castling_rights(rights: CastlingRights, mv: &Move) -> CastlingRights {
    let mut next = rights;

    if mv.piece.role == Role::King {
        next = next.revoke_all(mv.piece.color);
    }
    if mv.piece.role == Role::Rook
        && let Some(side) = corner_side(mv.from, mv.piece)
    {
        next = next.revoke(mv.piece.color, side);
    }
    if let Some(victim) = mv.captured
        && victim.role == Role::Rook
        && let Some(side) = corner_side(mv.to, victim)
    {
        next = next.revoke(victim.color, side);
    }

    next
}

/// Side whose rook corner `square` is, for a rook of `rook.color`.
fn corner_side(square: Square, rook: Piece) -> Option<CastlingSide> {
    if square.row() != rook.color.back_row() {
        return None;
    }
    CastlingSide::ALL
        .into_iter()
        .find(|side| side.rook_col() == square.col())
}

/// The square passed over when `mv` is a double pawn advance, otherwise none.
/// The window therefore lasts exactly one ply.
pub fn update_en_passant_target(mv: &Move) -> Option<Square> {
    let forward = mv.piece.color.forward();
    let double_advance = mv.piece.role == Role::Pawn
        && mv.from.col() == mv.to.col()
        && mv.to.row() as i8 - mv.from.row() as i8 == 2 * forward;

    if double_advance {
        mv.from.offset(forward, 0)
    } else {
        None
    }
}
