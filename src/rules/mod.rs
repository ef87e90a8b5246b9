//! Move legality.
//!
//! [`is_pseudo_legal_move`] checks movement shape and board occupancy only.
//! [`is_legal_move`] additionally rejects moves that leave the mover's king
//! attacked, and castling out of or through check.

pub mod notation;
pub mod special;

use crate::board::{Board, CastlingRights, Color, Piece, Role, Square};

/// State a bare board cannot express but legality depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveContext {
    pub castling: CastlingRights,
    /// Square passed over by the previous ply's double pawn advance.
    pub en_passant: Option<Square>,
}

/// Row/column delta from `from` to `to`.
#[inline]
fn delta(from: Square, to: Square) -> (i8, i8) {
    (
        to.row() as i8 - from.row() as i8,
        to.col() as i8 - from.col() as i8,
    )
}

/// True if every square strictly between `from` and `to` is empty.
///
/// Callers guarantee the two squares share a row, column or diagonal.
fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = delta(from, to);
    let step = (dr.signum(), dc.signum());

    let mut current = from.offset(step.0, step.1);
    while let Some(sq) = current
        && sq != to
    {
        if !board.is_empty(sq) {
            return false;
        }
        current = sq.offset(step.0, step.1);
    }
    true
}

/// Movement geometry shared by move validation and attack detection, for
/// every role except the pawn (whose pushes and captures differ) and the
/// king's castling step.
fn reaches(board: &Board, role: Role, from: Square, to: Square) -> bool {
    let (dr, dc) = delta(from, to);
    let straight = dr == 0 || dc == 0;
    let diagonal = dr.abs() == dc.abs();

    match role {
        Role::Knight => matches!((dr.abs(), dc.abs()), (1, 2) | (2, 1)),
        Role::King => dr.abs().max(dc.abs()) == 1,
        Role::Rook => straight && path_clear(board, from, to),
        Role::Bishop => diagonal && path_clear(board, from, to),
        Role::Queen => (straight || diagonal) && path_clear(board, from, to),
        Role::Pawn => false,
    }
}

fn pawn_move_ok(board: &Board, from: Square, to: Square, pawn: Piece, ctx: &MoveContext) -> bool {
    let forward = pawn.color.forward();
    let (dr, dc) = delta(from, to);

    match dc.abs() {
        0 if dr == forward => board.is_empty(to),
        0 if dr == 2 * forward && from.row() == pawn.color.pawn_row() => {
            from.offset(forward, 0)
                .is_some_and(|mid| board.is_empty(mid))
                && board.is_empty(to)
        }
        1 if dr == forward => {
            let enemy_on_target = board
                .piece_at(to)
                .is_some_and(|target| target.color != pawn.color);
            enemy_on_target || en_passant_available(board, to, pawn, ctx)
        }
        _ => false,
    }
}

/// The target square is the live en-passant square and the pawn that just
/// passed over it is still there.
fn en_passant_available(board: &Board, to: Square, pawn: Piece, ctx: &MoveContext) -> bool {
    ctx.en_passant == Some(to)
        && to
            .offset(-pawn.color.forward(), 0)
            .and_then(|sq| board.piece_at(sq))
            == Some(Piece::new(Role::Pawn, pawn.color.other()))
}

/// Movement-shape and occupancy legality, without king safety.
///
/// False when `from` is empty, when `from == to`, or when `to` holds a piece
/// of the mover's own color.
pub fn is_pseudo_legal_move(from: Square, to: Square, board: &Board, ctx: &MoveContext) -> bool {
    let Some(piece) = board.piece_at(from) else {
        return false;
    };
    if from == to {
        return false;
    }
    if board
        .piece_at(to)
        .is_some_and(|target| target.color == piece.color)
    {
        return false;
    }

    match piece.role {
        Role::Pawn => pawn_move_ok(board, from, to, piece, ctx),
        Role::King if special::castling_side(from, to, piece).is_some() => {
            special::castling_allowed(board, from, to, ctx.castling)
        }
        role => reaches(board, role, from, to),
    }
}

/// Full legality: pseudo-legal, and the mover's king is not attacked
/// afterwards. Castling also requires the king not to start in check or
/// pass over an attacked square.
pub fn is_legal_move(from: Square, to: Square, board: &Board, ctx: &MoveContext) -> bool {
    if !is_pseudo_legal_move(from, to, board, ctx) {
        return false;
    }
    let Some(piece) = board.piece_at(from) else {
        return false;
    };

    if let Some(side) = special::castling_side(from, to, piece) {
        let passed = Square::new(from.row(), side.rook_to_col());
        if is_in_check(board, piece.color)
            || passed.is_some_and(|sq| is_square_attacked(board, sq, piece.color.other()))
        {
            log::trace!("castling {from}{to} rejected: king in or passing through check");
            return false;
        }
    }

    let after = special::resulting_board(board, from, to, ctx.en_passant);
    !is_in_check(&after, piece.color)
}

/// Every square the piece on `from` may legally move to, in board order.
///
/// Runs the validator against all 64 squares.
pub fn legal_destinations(from: Square, board: &Board, ctx: &MoveContext) -> Vec<Square> {
    Square::all()
        .filter(|&to| is_legal_move(from, to, board, ctx))
        .collect()
}

/// Whether the piece on `from` attacks `target`, regardless of what stands
/// on `target`.
pub fn attacks(board: &Board, from: Square, target: Square) -> bool {
    let Some(piece) = board.piece_at(from) else {
        return false;
    };
    if from == target {
        return false;
    }

    match piece.role {
        Role::Pawn => {
            let (dr, dc) = delta(from, target);
            dr == piece.color.forward() && dc.abs() == 1
        }
        role => reaches(board, role, from, target),
    }
}

/// Whether any piece of color `by` attacks `square`.
pub fn is_square_attacked(board: &Board, square: Square, by: Color) -> bool {
    board
        .pieces()
        .any(|(from, piece)| piece.color == by && attacks(board, from, square))
}

/// Whether `color`'s king is attacked. A board without that king is never
/// in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_square(color)
        .is_some_and(|king| is_square_attacked(board, king, color.other()))
}

/// Squares holding pieces of `color.other()` that attack `color`'s king.
pub fn checkers(board: &Board, color: Color) -> Vec<Square> {
    let Some(king) = board.king_square(color) else {
        return Vec::new();
    };
    board
        .pieces()
        .filter(|&(from, piece)| piece.color != color && attacks(board, from, king))
        .map(|(from, _)| from)
        .collect()
}

/// Whether `color` has at least one legal move.
pub fn has_legal_move(board: &Board, color: Color, ctx: &MoveContext) -> bool {
    board
        .pieces()
        .filter(|(_, piece)| piece.color == color)
        .any(|(from, _)| Square::all().any(|to| is_legal_move(from, to, board, ctx)))
}
