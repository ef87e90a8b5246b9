use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: u8 = 8;

/// A single square on the board, addressed by `(row, col)`.
///
/// Row 0 is black's back rank (rank 8) and row 7 is white's back rank
/// (rank 1). Column 0 is the a-file. A `Square` can only be constructed
/// in bounds, so every API taking one may index the board directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Creates a square if both coordinates are in `0..8`.
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Square { row, col })
        } else {
            None
        }
    }

    /// Like [`Square::new`] but for signed coordinates, e.g. from user input.
    pub fn from_coords(row: i32, col: i32) -> Option<Self> {
        let row = u8::try_from(row).ok()?;
        let col = u8::try_from(col).ok()?;
        Self::new(row, col)
    }

    #[inline]
    pub const fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub const fn col(self) -> u8 {
        self.col
    }

    /// Returns the square `(dr, dc)` away, or `None` if it falls off the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        Self::from_coords(
            i32::from(self.row) + i32::from(dr),
            i32::from(self.col) + i32::from(dc),
        )
    }

    /// Returns the file letter ('a'-'h') of this square.
    pub fn file(self) -> char {
        (b'a' + self.col) as char
    }

    /// Returns the rank (1-8) of this square.
    pub fn rank(self) -> u8 {
        BOARD_SIZE - self.row
    }

    /// Iterates all 64 squares, row by row starting at row 0.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Square { row, col }))
    }
}

/// Parse algebraic notation like "e4" into a Square.
///
/// # Examples
/// ```
/// # use chess_core::board::Square;
/// let square: Square = "e4".parse().unwrap();
/// assert_eq!((square.row(), square.col()), (4, 4));
/// ```
impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(SquareParseError::WrongLength);
        };

        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) {
            return Err(SquareParseError::BadFile);
        }
        let rank = rank.to_digit(10).ok_or(SquareParseError::BadRank)?;
        if !(1..=8).contains(&rank) {
            return Err(SquareParseError::BadRank);
        }

        let col = file as u8 - b'a';
        let row = BOARD_SIZE - rank as u8;
        Ok(Square { row, col })
    }
}

/// Display square in algebraic notation (e.g., "e4").
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Error type for parsing square notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SquareParseError {
    #[error("square must be 2 characters (e.g., 'e4')")]
    WrongLength,
    #[error("file must be a-h")]
    BadFile,
    #[error("rank must be 1-8")]
    BadRank,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_square_bounds() {
        assert!(Square::new(0, 0).is_some());
        assert!(Square::new(7, 7).is_some());
        assert!(Square::new(8, 0).is_none());
        assert!(Square::new(0, 8).is_none());
        assert!(Square::from_coords(-1, 3).is_none());
        assert!(Square::from_coords(3, 300).is_none());
    }

    #[test_case("a8", 0, 0)]
    #[test_case("h8", 0, 7)]
    #[test_case("a1", 7, 0)]
    #[test_case("h1", 7, 7)]
    #[test_case("e4", 4, 4)]
    #[test_case("E2", 6, 4; "uppercase file")]
    fn test_square_from_str(s: &str, row: u8, col: u8) {
        assert_eq!(s.parse::<Square>(), Ok(Square::new(row, col).unwrap()));
    }

    #[test_case("", SquareParseError::WrongLength)]
    #[test_case("a", SquareParseError::WrongLength)]
    #[test_case("abc", SquareParseError::WrongLength)]
    #[test_case("i1", SquareParseError::BadFile)]
    #[test_case("a9", SquareParseError::BadRank)]
    #[test_case("a0", SquareParseError::BadRank)]
    fn test_square_from_str_invalid(s: &str, err: SquareParseError) {
        assert_eq!(s.parse::<Square>(), Err(err));
    }

    #[test]
    fn test_square_display() {
        assert_eq!(Square::new(7, 0).unwrap().to_string(), "a1");
        assert_eq!(Square::new(0, 7).unwrap().to_string(), "h8");
        assert_eq!(Square::new(6, 4).unwrap().to_string(), "e2");
    }

    #[test]
    fn test_offset_stays_on_board() {
        let a1 = Square::new(7, 0).unwrap();
        assert_eq!(a1.offset(-1, 1), Square::new(6, 1));
        assert_eq!(a1.offset(1, 0), None);
        assert_eq!(a1.offset(0, -1), None);
    }

    #[test]
    fn test_all_yields_64_distinct_squares() {
        let squares: std::collections::HashSet<_> = Square::all().collect();
        assert_eq!(squares.len(), 64);
    }
}
