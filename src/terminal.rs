use std::io::{self, BufRead, Write};

use crate::board::{BOARD_SIZE, Color, Role, Square};
use crate::feedback::{BoardFeedback, SquareFeedback, compute_feedback};
use crate::game_logic::{GameEngine, GameState};
use crate::script::MoveScript;

/// Error type for terminal display operations.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("failed to write to terminal: {0}")]
    Io(#[from] io::Error),
}

/// Clears the screen and moves cursor to top-left.
#[inline]
fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    write!(w, "\x1B[2J\x1B[H")
}

/// Runs an interactive terminal game on stdin/stdout.
pub fn run_interactive_terminal() -> Result<(), DisplayError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_session(stdin.lock(), &mut stdout)
}

/// Command loop over any reader/writer pair. Extracted for testability.
pub fn run_session(input: impl BufRead, w: &mut impl Write) -> Result<(), DisplayError> {
    let mut engine = GameEngine::new();
    let mut flipped = false;

    draw_interface(w, engine.state(), flipped)?;

    for line in input.lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            continue;
        };
        let rest = line.trim_start()[command.len()..].trim();

        let message = match command {
            "q" => break,
            "n" => {
                engine.new_game();
                Some("🔄 New game".to_string())
            }
            "f" => {
                flipped = !flipped;
                None
            }
            "c" => {
                engine.cancel_promotion();
                None
            }
            "p" => match parts.get(1).and_then(|s| s.chars().next()).and_then(Role::from_char) {
                Some(role) => engine.promote(role).err().map(|e| format!("❌ {e}")),
                None => Some("Usage: p <q|r|b|n>".to_string()),
            },
            "m" => match rest.parse::<MoveScript>() {
                Ok(script) if !script.is_empty() => {
                    engine.play_script(&script).err().map(|e| format!("❌ {e}"))
                }
                Ok(_) => Some("Usage: m <e2e4> [e7e5 ...]".to_string()),
                Err(e) => Some(format!("❌ {e}")),
            },
            "load" => match engine.load_fen(rest) {
                Ok(_) => Some("✅ Position loaded from FEN".to_string()),
                Err(e) => Some(format!("❌ Invalid FEN: {e}")),
            },
            "fen" => Some(engine.state().to_fen()),
            other => match other.parse::<Square>() {
                Ok(square) => {
                    engine.select(square);
                    None
                }
                Err(_) => Some("Unknown command".to_string()),
            },
        };

        draw_interface(w, engine.state(), flipped)?;
        if let Some(message) = message {
            writeln!(w, "\n{message}")?;
        }
    }
    Ok(())
}

/// Draws help text, the board and the move list.
fn draw_interface(w: &mut impl Write, state: &GameState, flipped: bool) -> Result<(), DisplayError> {
    clear_screen(w)?;
    writeln!(w, "♟️  Chess")?;
    writeln!(w)?;
    writeln!(
        w,
        "Commands: <square> (select) | m <e2e4 ...> | p <q|r|b|n> | c (cancel promotion)"
    )?;
    writeln!(w, "          f (flip) | n (new game) | load <fen> | fen | q (quit)")?;
    writeln!(w)?;

    render_board(w, state, &compute_feedback(state), flipped)?;
    writeln!(w)?;

    let status = if state.is_checkmate() {
        format!("Checkmate, {} wins", state.current_player().other())
    } else if state.is_stalemate() {
        "Stalemate".to_string()
    } else if let Some(pending) = state.pending_promotion() {
        format!("Promote on {}: p <q|r|b|n>, or c to cancel", pending.square)
    } else if state.is_check() {
        format!("{} to move, in check", state.current_player())
    } else {
        format!("{} to move", state.current_player())
    };
    writeln!(w, "{status}")?;

    let moves = move_list(state);
    if !moves.is_empty() {
        writeln!(w, "{moves}")?;
    }
    w.flush()?;
    Ok(())
}

/// Numbered move list, e.g. "12... Ke7  13. e4 Ke6", counted from the
/// position the game started in.
fn move_list(state: &GameState) -> String {
    let history = state.history();

    let (lead, rest) = match history.split_first() {
        Some((first, rest)) if state.first_player() == Color::Black => (Some(first), rest),
        _ => (None, history),
    };

    let mut entries = Vec::new();
    let mut numbers = (0u32..).map(|i| state.first_fullmove().saturating_add(i));
    if let Some(first) = lead
        && let Some(number) = numbers.next()
    {
        entries.push(format!("{number}... {first}"));
    }
    entries.extend(rest.chunks(2).zip(numbers).map(|(pair, number)| {
        let plies: Vec<&str> = pair.iter().map(|mv| mv.notation.as_str()).collect();
        format!("{number}. {}", plies.join(" "))
    }));
    entries.join("  ")
}

/// Renders pieces with feedback colors, white at the bottom unless flipped.
fn render_board(
    w: &mut impl Write,
    state: &GameState,
    feedback: &BoardFeedback,
    flipped: bool,
) -> Result<(), DisplayError> {
    let order = |i: u8| if flipped { BOARD_SIZE - 1 - i } else { i };

    for row in (0..BOARD_SIZE).map(order) {
        let rank = BOARD_SIZE - row;
        write!(w, " {rank} ")?;
        for col in (0..BOARD_SIZE).map(order) {
            let Some(square) = Square::new(row, col) else {
                continue;
            };
            let symbol = state.piece_at(square).map_or('·', |piece| piece.char());
            write!(w, "{}", format_square(feedback.get(square), symbol))?;
        }
        writeln!(w)?;
    }

    let files: Vec<String> = (0..BOARD_SIZE)
        .map(order)
        .map(|col| ((b'a' + col) as char).to_string())
        .collect();
    writeln!(w, "    {}", files.join("  "))?;
    Ok(())
}

/// Map a feedback variant to an ANSI-colored cell string.
fn format_square(feedback: Option<SquareFeedback>, symbol: char) -> String {
    match feedback {
        Some(SquareFeedback::Destination) => format!("\x1b[44m {symbol} \x1b[0m"),
        Some(SquareFeedback::Capture) => format!("\x1b[41m {symbol} \x1b[0m"),
        Some(SquareFeedback::Origin) => format!("\x1b[42m {symbol} \x1b[0m"),
        Some(SquareFeedback::Check) => format!("\x1b[45m {symbol} \x1b[0m"),
        Some(SquareFeedback::Checker) => format!("\x1b[43m {symbol} \x1b[0m"),
        None => format!(" {symbol} "),
    }
}
