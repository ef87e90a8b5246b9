use std::str::FromStr;

use thiserror::Error;

use crate::board::{Role, Square};

/// Error when parsing a move script.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid move token: '{0}'")]
pub struct ParseError(String);

/// One scripted move: origin, destination and an optional promotion role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl FromStr for ScriptMove {
    type Err = ParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let err = || ParseError(token.to_string());

        if !token.is_ascii() || !(4..=5).contains(&token.len()) {
            return Err(err());
        }
        let from = token[0..2].parse().map_err(|_| err())?;
        let to = token[2..4].parse().map_err(|_| err())?;
        let promotion = match token[4..].chars().next() {
            Some(ch) => Some(
                Role::from_char(ch)
                    .filter(|role| role.is_promotable())
                    .ok_or_else(err)?,
            ),
            None => None,
        };

        Ok(ScriptMove {
            from,
            to,
            promotion,
        })
    }
}

/// A sequence of moves in coordinate notation.
///
/// Format:
/// - Each move is origin + destination (e.g., "e2e4")
/// - A fifth letter picks the promotion role (e.g., "b7b8q")
/// - Moves are separated by whitespace
///
/// Examples:
/// - `"e2e4 e7e5 g1f3"`
/// - `"a7a8n"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveScript {
    moves: Vec<ScriptMove>,
}

impl MoveScript {
    #[inline]
    pub fn moves(&self) -> &[ScriptMove] {
        &self.moves
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl FromStr for MoveScript {
    type Err = ParseError;

    fn from_str(script: &str) -> Result<Self, Self::Err> {
        let moves = script
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()?;
        Ok(MoveScript { moves })
    }
}
