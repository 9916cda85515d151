/// Interactive ranking loop over any line-based input and text output.
use songrank_core::{EngineError, RankingEngine, View};
use std::io::{self, BufRead, Write};
use tracing::debug;

use crate::output::album_names;
use crate::parse::{parse_command, Command};
use crate::prompt::{render_comparison, HELP};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Complete,
    /// User quit or input ran out before every song was placed.
    Stopped { placed: usize, total: usize },
}

/// Drive `engine` with commands read from `input` until it completes or the
/// user stops. The engine must already be initialized.
pub fn run_session<R: BufRead, W: Write>(engine: &mut RankingEngine, mut input: R, out: &mut W) -> io::Result<SessionEnd> {
    let albums = album_names(engine.collections());
    let mut line = String::new();

    loop {
        let (placed, total) = match engine.current_state() {
            View::Complete { .. } => return Ok(SessionEnd::Complete),
            View::Uninitialized => return Ok(SessionEnd::Stopped { placed: 0, total: 0 }),
            View::Comparing { round, placed, total, .. } => {
                write!(out, "{}", render_comparison(round, placed, total, &albums, engine.can_undo()))?;
                (placed, total)
            }
        };
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(SessionEnd::Stopped { placed, total });
        }

        match parse_command(&line) {
            Some(Command::Decide(preference)) => {
                debug!(?preference, "user decision");
                if let Err(e) = engine.decide(preference) {
                    writeln!(out, "Cannot do that now: {e}")?;
                }
            }
            Some(Command::Undo) => match engine.undo() {
                Ok(()) => writeln!(out, "Undone.")?,
                Err(EngineError::NoHistory) => writeln!(out, "Nothing to undo.")?,
                Err(e) => writeln!(out, "Cannot undo: {e}")?,
            },
            Some(Command::Quit) => return Ok(SessionEnd::Stopped { placed, total }),
            Some(Command::Help) => write!(out, "{HELP}")?,
            None => writeln!(out, "Unrecognized input \"{}\". Type ? for help.", line.trim())?,
        }
    }
}
