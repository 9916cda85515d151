/// songrank-core: Pairwise-preference ranking engine.
///
/// Items are placed one at a time into a ranked list by binary search, each
/// step driven by a single "which do you prefer?" answer. Every answer can be
/// undone. No IO, no randomness: the caller supplies items already in the
/// order they should be presented.
///
/// Items and collections are identified by caller-provided `i64` keys.
///
/// # Quick start
///
/// ```rust
/// use songrank_core::{Collection, EngineConfig, Item, Preference, RankingEngine, View};
///
/// let albums = vec![Collection::new(100, "Debut"), Collection::new(200, "Second")];
/// let songs = vec![
///     Item::new(1, "Opener", 100),
///     Item::new(2, "Single", 100),
///     Item::new(3, "Closer", 200),
/// ];
///
/// let mut engine = RankingEngine::new(EngineConfig::default());
/// engine.initialize(songs, albums).unwrap();
///
/// while let View::Comparing { round, .. } = engine.current_state() {
///     // Always prefer the song with the shorter name
///     let preference = if round.subject.name.len() < round.probe.name.len() {
///         Preference::PreferSubject
///     } else {
///         Preference::PreferProbe
///     };
///     engine.decide(preference).unwrap();
/// }
///
/// if let View::Complete { ranked, collection_ranking } = engine.current_state() {
///     for (rank, song) in ranked.iter().enumerate() {
///         println!("{}. {}", rank + 1, song.name);
///     }
///     for album in collection_ranking {
///         println!("{}: {:.2}", album.collection.name, album.mean_rank);
///     }
/// }
/// ```

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod search;
pub mod state;
pub mod types;

// Re-export primary public API at crate root.
pub use aggregate::rank_collections;
pub use engine::{EngineConfig, RankingEngine, View};
pub use error::EngineError;
pub use search::{Narrowing, SearchMode};
pub use state::{transition, Event, Phase, RankingState};
pub use types::{Collection, CollectionKey, CollectionRanking, ComparisonRound, Item, ItemKey, Preference};
