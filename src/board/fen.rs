//! Forsyth–Edwards Notation import and export.
//!
//! Only the fields the rule engine tracks are interpreted: piece placement,
//! side to move, castling rights and the en-passant square. The halfmove
//! clock is accepted and ignored; the fullmove number is kept so a position
//! can be written back out.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::{BOARD_SIZE, Board, CastlingRights, CastlingSide, Color, Piece, Role, Square};

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Error when parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected at least 4 space-separated fields, found {0}")]
    MissingFields(usize),
    #[error("piece placement must have 8 ranks")]
    RankCount,
    #[error("rank {0} does not describe exactly 8 squares")]
    RankWidth(u8),
    #[error("invalid piece character '{0}'")]
    BadPiece(char),
    #[error("side to move must be 'w' or 'b', found '{0}'")]
    BadTurn(String),
    #[error("invalid castling field '{0}'")]
    BadCastling(String),
    #[error("invalid en passant square '{0}'")]
    BadEnPassant(String),
    #[error("invalid move counter '{0}'")]
    BadCounter(String),
}

/// A parsed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    pub board: Board,
    pub turn: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub fullmove: u32,
}

impl FromStr for Fen {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::MissingFields(fields.len()));
        }

        let board = parse_placement(fields[0])?;

        let turn = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadTurn(other.to_string())),
        };

        let castling = parse_castling(fields[2])?;

        let en_passant = match fields[3] {
            "-" => None,
            other => {
                let square = other
                    .parse()
                    .map_err(|_| FenError::BadEnPassant(other.to_string()))?;
                if !en_passant_consistent(&board, turn, square) {
                    return Err(FenError::BadEnPassant(other.to_string()));
                }
                Some(square)
            }
        };

        if let Some(halfmove) = fields.get(4) {
            halfmove
                .parse::<u32>()
                .map_err(|_| FenError::BadCounter(halfmove.to_string()))?;
        }
        let fullmove = match fields.get(5) {
            Some(field) => field
                .parse()
                .map_err(|_| FenError::BadCounter(field.to_string()))?,
            None => 1,
        };

        Ok(Fen {
            board,
            turn,
            castling,
            en_passant,
            fullmove,
        })
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let turn = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        write!(
            f,
            "{} {} {} {} 0 {}",
            placement(&self.board),
            turn,
            castling_field(self.castling),
            en_passant,
            self.fullmove
        )
    }
}

fn parse_placement(field: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != BOARD_SIZE as usize {
        return Err(FenError::RankCount);
    }

    let mut board = Board::empty();
    for (row, rank) in (0u8..).zip(ranks) {
        let rank_label = BOARD_SIZE - row;
        let mut col = 0u8;
        for ch in rank.chars() {
            if let Some(skip) = ch.to_digit(10) {
                if !(1..=u32::from(BOARD_SIZE)).contains(&skip) {
                    return Err(FenError::RankWidth(rank_label));
                }
                col = col.saturating_add(skip as u8);
                continue;
            }
            let piece = Piece::from_char(ch).ok_or(FenError::BadPiece(ch))?;
            let square = Square::new(row, col).ok_or(FenError::RankWidth(rank_label))?;
            board.set(square, Some(piece));
            col += 1;
        }
        if col != BOARD_SIZE {
            return Err(FenError::RankWidth(rank_label));
        }
    }
    Ok(board)
}

/// The square must be the one an enemy pawn just passed over: on the
/// passed-over row, empty, with that pawn beyond it and its start empty.
fn en_passant_consistent(board: &Board, turn: Color, square: Square) -> bool {
    let mover = turn.other();
    let forward = mover.forward();
    let pawn = Piece::new(Role::Pawn, mover);

    square.row() as i8 == mover.pawn_row() as i8 + forward
        && board.is_empty(square)
        && square.offset(forward, 0).and_then(|sq| board.piece_at(sq)) == Some(pawn)
        && square.offset(-forward, 0).is_some_and(|sq| board.is_empty(sq))
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    if field == "-" {
        return Ok(CastlingRights::NONE);
    }
    field.chars().try_fold(CastlingRights::NONE, |rights, ch| {
        let (color, side) = match ch {
            'K' => (Color::White, CastlingSide::KingSide),
            'Q' => (Color::White, CastlingSide::QueenSide),
            'k' => (Color::Black, CastlingSide::KingSide),
            'q' => (Color::Black, CastlingSide::QueenSide),
            _ => return Err(FenError::BadCastling(field.to_string())),
        };
        Ok(rights.grant(color, side))
    })
}

fn castling_field(rights: CastlingRights) -> String {
    let field: String = [
        (Color::White, CastlingSide::KingSide, 'K'),
        (Color::White, CastlingSide::QueenSide, 'Q'),
        (Color::Black, CastlingSide::KingSide, 'k'),
        (Color::Black, CastlingSide::QueenSide, 'q'),
    ]
    .into_iter()
    .filter(|&(color, side, _)| rights.has(color, side))
    .map(|(_, _, ch)| ch)
    .collect();

    if field.is_empty() { "-".to_string() } else { field }
}

/// Renders only the piece placement field.
pub fn placement(board: &Board) -> String {
    let mut out = String::new();
    for row in 0..BOARD_SIZE {
        if row > 0 {
            out.push('/');
        }
        let mut empty = 0;
        for col in 0..BOARD_SIZE {
            let piece = Square::new(row, col).and_then(|sq| board.piece_at(sq));
            match piece {
                Some(piece) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push(piece.char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
    }
    out
}
