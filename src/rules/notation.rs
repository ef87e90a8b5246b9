//! Short algebraic notation for committed moves.
//!
//! Moves are not disambiguated: two knights able to reach d2 both produce
//! "Nd2". Check and mate suffixes are appended by the game manager, which is
//! the only place that knows the position after the move.

use crate::board::{CastlingSide, Piece, Role, Square};
use crate::rules::special::MoveKind;

/// Renders a move as e.g. "e4", "Nxf3", "exd6 e.p.", "e8=Q" or "O-O".
pub fn encode(from: Square, to: Square, piece: Piece, captured: Option<Piece>, kind: MoveKind) -> String {
    match kind {
        MoveKind::Castling(CastlingSide::KingSide) => return "O-O".to_string(),
        MoveKind::Castling(CastlingSide::QueenSide) => return "O-O-O".to_string(),
        _ => {}
    }

    let mut out = String::new();
    let is_en_passant = kind == MoveKind::EnPassant;

    if piece.role != Role::Pawn {
        out.push(piece.role.upper_char());
    }
    if captured.is_some() || is_en_passant {
        if piece.role == Role::Pawn {
            out.push(from.file());
        }
        out.push('x');
    }
    out.push_str(&to.to_string());

    if is_en_passant {
        out.push_str(" e.p.");
    }
    if let MoveKind::Promotion(role) = kind {
        out.push('=');
        out.push(role.upper_char());
    }
    out
}
