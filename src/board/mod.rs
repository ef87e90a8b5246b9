pub mod fen;
mod square;

use std::fmt;
use std::ops::Not;

pub use square::{BOARD_SIZE, Square, SquareParseError};

/// The two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// Index for per-color arrays: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row holding this color's king and rooks at the start.
    #[inline]
    pub const fn back_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row this color's pawns start on.
    #[inline]
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row where this color's pawns promote.
    #[inline]
    pub const fn promotion_row(self) -> u8 {
        self.other().back_row()
    }

    /// Row delta of a forward pawn step.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        self.other()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

/// Piece kind, independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Role {
    /// Uppercase initial used in notation ('P' for pawns, though notation omits it).
    pub const fn upper_char(self) -> char {
        match self {
            Role::Pawn => 'P',
            Role::Knight => 'N',
            Role::Bishop => 'B',
            Role::Rook => 'R',
            Role::Queen => 'Q',
            Role::King => 'K',
        }
    }

    /// Parses a role from its initial, case-insensitively.
    pub fn from_char(ch: char) -> Option<Role> {
        match ch.to_ascii_lowercase() {
            'p' => Some(Role::Pawn),
            'n' => Some(Role::Knight),
            'b' => Some(Role::Bishop),
            'r' => Some(Role::Rook),
            'q' => Some(Role::Queen),
            'k' => Some(Role::King),
            _ => None,
        }
    }

    /// Whether a pawn may be promoted to this role.
    pub const fn is_promotable(self) -> bool {
        !matches!(self, Role::Pawn | Role::King)
    }
}

/// A colored piece. Immutable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub role: Role,
    pub color: Color,
}

impl Piece {
    pub const fn new(role: Role, color: Color) -> Self {
        Piece { role, color }
    }

    /// FEN character: uppercase for white, lowercase for black.
    pub fn char(self) -> char {
        let ch = self.role.upper_char();
        match self.color {
            Color::White => ch,
            Color::Black => ch.to_ascii_lowercase(),
        }
    }

    pub fn from_char(ch: char) -> Option<Piece> {
        let role = Role::from_char(ch)?;
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { role, color })
    }
}

/// Side of the board a castling move goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    /// Toward the higher-indexed file (h-file).
    KingSide,
    /// Toward the lower-indexed file (a-file).
    QueenSide,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::KingSide, CastlingSide::QueenSide];

    /// Column the rook starts on.
    pub const fn rook_col(self) -> u8 {
        match self {
            CastlingSide::KingSide => 7,
            CastlingSide::QueenSide => 0,
        }
    }

    /// Column the rook lands on, adjacent to the king on the side of travel.
    pub const fn rook_to_col(self) -> u8 {
        match self {
            CastlingSide::KingSide => 5,
            CastlingSide::QueenSide => 3,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Column the king starts on for both colors.
pub const KING_START_COL: u8 = 4;

/// Per-color, per-side castling eligibility.
///
/// Rights can only be revoked through the public API, never granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRights([[bool; 2]; 2]);

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights([[true; 2]; 2]);
    pub const NONE: CastlingRights = CastlingRights([[false; 2]; 2]);

    #[inline]
    pub const fn has(self, color: Color, side: CastlingSide) -> bool {
        self.0[color.index()][side.index()]
    }

    /// Returns these rights with one flag cleared.
    #[must_use]
    pub const fn revoke(mut self, color: Color, side: CastlingSide) -> Self {
        self.0[color.index()][side.index()] = false;
        self
    }

    /// Returns these rights with both flags for `color` cleared.
    #[must_use]
    pub const fn revoke_all(self, color: Color) -> Self {
        self.revoke(color, CastlingSide::KingSide)
            .revoke(color, CastlingSide::QueenSide)
    }

    /// Used only when setting up a position from FEN.
    pub(crate) const fn grant(mut self, color: Color, side: CastlingSide) -> Self {
        self.0[color.index()][side.index()] = true;
        self
    }

    /// Whether any right remains for either color.
    pub fn any(self) -> bool {
        self.0.iter().flatten().any(|&flag| flag)
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        CastlingRights::ALL
    }
}

/// An 8×8 grid of optional pieces.
///
/// `Board` is a small `Copy` value: each ply produces a fresh board and
/// history never aliases the live one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

const BACK_RANK: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

impl Board {
    /// A board with no pieces.
    pub const fn empty() -> Self {
        Board {
            squares: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
        }
    }

    /// The canonical starting layout.
    pub fn initial() -> Self {
        let mut board = Board::empty();
        for color in Color::ALL {
            for (col, role) in (0u8..).zip(BACK_RANK) {
                board.squares[color.back_row() as usize][col as usize] =
                    Some(Piece::new(role, color));
                board.squares[color.pawn_row() as usize][col as usize] =
                    Some(Piece::new(Role::Pawn, color));
            }
        }
        board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row() as usize][square.col() as usize]
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Places (or clears) a piece on this board value.
    #[inline]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row() as usize][square.col() as usize] = piece;
    }

    /// Removes and returns the piece on `square`.
    #[inline]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.row() as usize][square.col() as usize].take()
    }

    /// Returns a new board with the piece on `from` moved to `to`,
    /// replacing whatever stood there.
    #[must_use]
    pub fn relocate(&self, from: Square, to: Square) -> Board {
        let mut next = *self;
        let piece = next.take(from);
        next.set(to, piece);
        next
    }

    /// Iterates all occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|piece| (sq, piece)))
    }

    /// Locates the king of `color`. Returns the first one found if the board
    /// holds several, `None` if it holds none.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| *piece == Piece::new(Role::King, color))
            .map(|(sq, _)| sq)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Board")
            .field(&fen::placement(self))
            .finish()
    }
}
