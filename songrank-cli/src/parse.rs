/// Parsing of one line of user input during a ranking session.
use songrank_core::Preference;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Decide(Preference),
    Undo,
    Quit,
    Help,
}

/// Parse a line of input. Case-insensitive, surrounding whitespace ignored.
/// Returns `None` for anything unrecognized.
pub fn parse_command(input: &str) -> Option<Command> {
    let command = match input.trim().to_lowercase().as_str() {
        "1" | "a" => Command::Decide(Preference::PreferSubject),
        "2" | "b" => Command::Decide(Preference::PreferProbe),
        "=" | "e" | "equal" => Command::Decide(Preference::Equal),
        "n" | "0" | "none" | "skip" => Command::Decide(Preference::NoOpinion),
        "u" | "undo" => Command::Undo,
        "q" | "quit" | "exit" => Command::Quit,
        "?" | "h" | "help" => Command::Help,
        _ => return None,
    };
    Some(command)
}
