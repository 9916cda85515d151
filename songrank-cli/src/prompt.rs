/// Text shown to the user for each comparison.
use songrank_core::{CollectionKey, ComparisonRound};
use std::collections::HashMap;

pub const HELP: &str = "\
  1   prefer the first song
  2   prefer the second song
  =   rank them equal (first goes right after second)
  n   no opinion (first goes to the bottom)
  u   undo the last answer
  q   quit without finishing
";

/// Build the comparison prompt for one round.
///
/// `albums` maps collection keys to display names; unknown keys show no album.
pub fn render_comparison(
    round: &ComparisonRound,
    placed: usize,
    total: usize,
    albums: &HashMap<CollectionKey, String>,
    can_undo: bool,
) -> String {
    let describe = |name: &str, collection: CollectionKey| match albums.get(&collection) {
        Some(album) => format!("{name} ({album})"),
        None => name.to_string(),
    };
    let undo = if can_undo { ", u undo" } else { "" };

    format!(
        "\n[{placed}/{total} placed] Which song do you prefer?\n  \
         [1] {}\n  \
         [2] {}\n\
         (1, 2, = equal, n no opinion{undo}, q quit, ? help)\n",
        describe(&round.subject.name, round.subject.collection),
        describe(&round.probe.name, round.probe.collection),
    )
}
