/// Ranking engine: owns the current state and the undo history.
///
/// Single-writer. Every call runs to completion and either applies one
/// transition or returns an error without touching anything.
use tracing::{debug, trace};

use crate::error::EngineError;
use crate::search::SearchMode;
use crate::state::{transition, Event, Phase, RankingState};
use crate::types::{Collection, CollectionIndex, CollectionRanking, ComparisonRound, Item, Preference};

/// Configuration for the ranking engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    pub search: SearchMode,
}

/// Read-only projection of the engine state for a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Uninitialized,
    /// Waiting for the user to compare `round.subject` against `round.probe`.
    Comparing {
        round: &'a ComparisonRound,
        ranked: &'a [Item],
        /// Items already in the ranked list.
        placed: usize,
        total: usize,
    },
    Complete {
        ranked: &'a [Item],
        collection_ranking: &'a [CollectionRanking],
    },
}

#[derive(Debug, Default)]
pub struct RankingEngine {
    config: EngineConfig,
    collections: Vec<Collection>,
    total_items: usize,
    state: RankingState,
    /// Full state before each successful `decide`, oldest first.
    history: Vec<RankingState>,
}

impl RankingEngine {
    pub fn new(config: EngineConfig) -> Self {
        RankingEngine {
            config,
            ..Default::default()
        }
    }

    /// Load items in their final order, replacing any previous session.
    ///
    /// One item completes immediately. Two or more start the first
    /// comparison: the second item against the first.
    pub fn initialize(&mut self, items: Vec<Item>, collections: Vec<Collection>) -> Result<(), EngineError> {
        CollectionIndex::from_collections(&collections)?;
        let total_items = items.len();
        let next = transition(&self.state, Event::Initialize(items), &collections, self.config.search)?;

        debug!(items = total_items, collections = collections.len(), phase = %next.phase(), "initialized");
        self.collections = collections;
        self.total_items = total_items;
        self.state = next;
        self.history.clear();
        Ok(())
    }

    /// Apply one decision to the current comparison.
    pub fn decide(&mut self, preference: Preference) -> Result<(), EngineError> {
        let next = transition(&self.state, Event::Decide(preference), &self.collections, self.config.search)?;

        match &next {
            RankingState::Comparing { ranked, round, .. } => trace!(
                ?preference,
                placed = ranked.len(),
                subject = round.subject.key,
                probe = round.probe.key,
                lower = round.lower_bound,
                upper = round.upper_bound,
                "decided"
            ),
            RankingState::Complete { ranked, .. } => {
                debug!(?preference, placed = ranked.len(), "ranking complete")
            }
            _ => {}
        }

        let previous = std::mem::replace(&mut self.state, next);
        self.history.push(previous);
        Ok(())
    }

    /// Revert the most recent `decide`, whatever it did.
    pub fn undo(&mut self) -> Result<(), EngineError> {
        let previous = self.history.pop().ok_or(EngineError::NoHistory)?;
        trace!(phase = %previous.phase(), remaining = self.history.len(), "undo");
        self.state = previous;
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn current_state(&self) -> View<'_> {
        match &self.state {
            RankingState::Comparing { ranked, round, .. } => View::Comparing {
                round,
                ranked,
                placed: ranked.len(),
                total: self.total_items,
            },
            RankingState::Complete { ranked, collection_ranking } => View::Complete {
                ranked,
                collection_ranking,
            },
            RankingState::Uninitialized | RankingState::Seeded { .. } => View::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Full current state, including the pending queue.
    pub fn state(&self) -> &RankingState {
        &self.state
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn song(key: i64, album: i64) -> Item {
        Item::new(key, format!("S{key}"), album)
    }

    fn keys(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.key).collect()
    }

    fn engine(mode: SearchMode) -> RankingEngine {
        RankingEngine::new(EngineConfig { search: mode })
    }

    /// Conservation, no duplication and bounds validity for the current state.
    fn check_invariants(engine: &RankingEngine) {
        let state = engine.state();
        assert_eq!(state.item_count(), engine.total_items());

        let mut seen = HashSet::new();
        for item in state.ranked() {
            assert!(seen.insert(item.key), "duplicate {} in ranked list", item.key);
        }
        if let RankingState::Comparing { ranked, pending, round } = state {
            for item in pending {
                assert!(seen.insert(item.key), "duplicate {} in queue", item.key);
            }
            assert!(seen.insert(round.subject.key), "subject {} already placed", round.subject.key);

            let mid = round.mid();
            assert!(round.lower_bound <= mid);
            assert!(mid <= round.upper_bound);
            assert!(round.upper_bound <= ranked.len());
            assert!(round.lower_bound < round.upper_bound);
            assert_eq!(ranked[mid], round.probe);
        }
    }

    /// Mixes all four preferences, seeded by the step number.
    fn mixed_policy(step: usize) -> Preference {
        match (step * 7 + 3) % 11 {
            0 => Preference::Equal,
            1 => Preference::NoOpinion,
            n if n % 2 == 0 => Preference::PreferSubject,
            _ => Preference::PreferProbe,
        }
    }

    /// Prefers whichever item has the smaller key.
    fn by_key(round: &ComparisonRound) -> Preference {
        if round.subject.key < round.probe.key {
            Preference::PreferSubject
        } else {
            Preference::PreferProbe
        }
    }

    fn permutations(n: i64) -> Vec<Vec<i64>> {
        fn permute(rest: Vec<i64>, prefix: Vec<i64>, out: &mut Vec<Vec<i64>>) {
            if rest.is_empty() {
                out.push(prefix);
                return;
            }
            for i in 0..rest.len() {
                let mut rest = rest.clone();
                let mut prefix = prefix.clone();
                prefix.push(rest.remove(i));
                permute(rest, prefix, out);
            }
        }
        let mut out = Vec::new();
        permute((1..=n).collect(), Vec::new(), &mut out);
        out
    }

    #[test]
    fn test_three_song_scenario() {
        let albums = vec![Collection::new(100, "P"), Collection::new(200, "Q")];
        let mut engine = engine(SearchMode::Bounds);
        engine
            .initialize(vec![song(1, 100), song(2, 100), song(3, 200)], albums)
            .unwrap();

        let View::Comparing { round, ranked, placed, total } = engine.current_state() else {
            panic!("expected comparing");
        };
        assert_eq!(keys(ranked), vec![1]);
        assert_eq!((round.subject.key, round.probe.key), (2, 1));
        assert_eq!((round.lower_bound, round.upper_bound), (0, 1));
        assert_eq!((placed, total), (1, 3));

        engine.decide(Preference::PreferSubject).unwrap();
        let View::Comparing { round, ranked, .. } = engine.current_state() else {
            panic!("expected comparing");
        };
        assert_eq!(keys(ranked), vec![2, 1]);
        assert_eq!((round.subject.key, round.probe.key), (3, 1));
        assert_eq!((round.lower_bound, round.upper_bound), (0, 2));

        engine.decide(Preference::NoOpinion).unwrap();
        let View::Complete { ranked, collection_ranking } = engine.current_state() else {
            panic!("expected complete");
        };
        assert_eq!(keys(ranked), vec![2, 1, 3]);
        assert_eq!(collection_ranking.len(), 2);
        assert_eq!(collection_ranking[0].collection.name, "P");
        assert_eq!(collection_ranking[0].mean_rank, 1.5);
        assert_eq!(collection_ranking[1].collection.name, "Q");
        assert_eq!(collection_ranking[1].mean_rank, 3.0);
    }

    #[test]
    fn test_single_item_completes_without_comparisons() {
        let mut engine = engine(SearchMode::Bounds);
        engine.initialize(vec![song(1, 1)], vec![Collection::new(1, "P")]).unwrap();

        assert_eq!(engine.phase(), Phase::Complete);
        assert!(!engine.can_undo());
        let View::Complete { ranked, .. } = engine.current_state() else {
            panic!("expected complete");
        };
        assert_eq!(keys(ranked), vec![1]);
        assert!(matches!(
            engine.decide(Preference::PreferSubject),
            Err(EngineError::InvalidPhase { actual: Phase::Complete, .. })
        ));
    }

    #[test]
    fn test_empty_input_leaves_engine_untouched() {
        let mut engine = engine(SearchMode::Bounds);
        assert_eq!(engine.initialize(vec![], vec![]), Err(EngineError::EmptyInput));
        assert_eq!(engine.phase(), Phase::Uninitialized);
        assert_eq!(engine.current_state(), View::Uninitialized);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let mut engine = engine(SearchMode::Bounds);
        assert_eq!(
            engine.initialize(vec![song(1, 1), song(1, 1)], vec![Collection::new(1, "P")]),
            Err(EngineError::DuplicateItem(1))
        );
        assert_eq!(
            engine.initialize(vec![song(1, 1)], vec![Collection::new(1, "P"), Collection::new(1, "Q")]),
            Err(EngineError::DuplicateCollection(1))
        );
        assert_eq!(engine.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_decide_before_initialize_fails() {
        let mut engine = engine(SearchMode::Bounds);
        assert_eq!(
            engine.decide(Preference::Equal),
            Err(EngineError::InvalidPhase {
                expected: Phase::Comparing,
                actual: Phase::Uninitialized,
            })
        );
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_undo_with_empty_history() {
        let mut engine = engine(SearchMode::Bounds);
        assert_eq!(engine.undo(), Err(EngineError::NoHistory));

        engine.initialize(vec![song(1, 1), song(2, 1)], vec![]).unwrap();
        let before = engine.state().clone();
        assert_eq!(engine.undo(), Err(EngineError::NoHistory));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_undo_reverses_round_advancement_and_completion() {
        let mut engine = engine(SearchMode::Bounds);
        engine
            .initialize((1..=4).map(|k| song(k, 1)).collect(), vec![Collection::new(1, "P")])
            .unwrap();

        engine.decide(Preference::PreferProbe).unwrap(); // [1, 2], subject 3
        engine.decide(Preference::PreferProbe).unwrap(); // [1, 2, 3], subject 4 at [0, 3)
        engine.decide(Preference::PreferProbe).unwrap(); // narrowed to [1, 3)
        let narrowed = engine.state().clone();
        assert_eq!(narrowed.round().map(|r| (r.lower_bound, r.upper_bound)), Some((1, 3)));

        engine.decide(Preference::PreferProbe).unwrap(); // insert at 3 -> complete
        assert_eq!(engine.phase(), Phase::Complete);
        assert_eq!(keys(engine.state().ranked()), vec![1, 2, 3, 4]);

        engine.undo().unwrap();
        assert_eq!(engine.state(), &narrowed);

        engine.undo().unwrap();
        let round = engine.state().round().unwrap();
        assert_eq!(round.subject.key, 4);
        assert_eq!((round.lower_bound, round.upper_bound), (0, 3));

        engine.undo().unwrap();
        let round = engine.state().round().unwrap();
        assert_eq!(round.subject.key, 3);
        assert_eq!(keys(engine.state().ranked()), vec![1, 2]);

        engine.undo().unwrap();
        assert_eq!(keys(engine.state().ranked()), vec![1]);
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_failed_decide_records_no_history() {
        let mut engine = engine(SearchMode::Bounds);
        engine.initialize(vec![song(1, 1), song(2, 1)], vec![]).unwrap();
        engine.decide(Preference::Equal).unwrap();
        assert_eq!(engine.history_len(), 1);

        assert!(engine.decide(Preference::Equal).is_err());
        assert_eq!(engine.history_len(), 1);
    }

    #[test]
    fn test_reinitialize_clears_history() {
        let mut engine = engine(SearchMode::Bounds);
        engine.initialize(vec![song(1, 1), song(2, 1), song(3, 1)], vec![]).unwrap();
        engine.decide(Preference::PreferSubject).unwrap();
        assert!(engine.can_undo());

        engine.initialize(vec![song(7, 1), song(8, 1)], vec![]).unwrap();
        assert!(!engine.can_undo());
        assert_eq!(engine.total_items(), 2);
        assert_eq!(engine.state().round().map(|r| r.subject.key), Some(8));
    }

    #[test]
    fn test_undo_is_exact_inverse_for_every_step() {
        for mode in [SearchMode::Bounds, SearchMode::Strict] {
            for order in permutations(5) {
                let mut engine = engine(mode);
                let items = order.iter().map(|&k| song(k, k % 2)).collect();
                engine
                    .initialize(items, vec![Collection::new(0, "Even"), Collection::new(1, "Odd")])
                    .unwrap();

                let mut step = 0;
                let mut snapshots = vec![engine.state().clone()];
                while engine.phase() == Phase::Comparing {
                    let before = engine.state().clone();
                    let preference = mixed_policy(step);
                    engine.decide(preference).unwrap();
                    let after = engine.state().clone();

                    engine.undo().unwrap();
                    assert_eq!(engine.state(), &before);
                    engine.decide(preference).unwrap();
                    assert_eq!(engine.state(), &after);

                    snapshots.push(after);
                    step += 1;
                }

                // Unwind everything back to the initial state
                snapshots.pop();
                while let Some(expected) = snapshots.pop() {
                    engine.undo().unwrap();
                    assert_eq!(engine.state(), &expected);
                }
                assert!(!engine.can_undo());
            }
        }
    }

    #[test]
    fn test_invariants_hold_in_every_reachable_state() {
        for mode in [SearchMode::Bounds, SearchMode::Strict] {
            for n in 1..=6 {
                for (offset, order) in permutations(n).into_iter().enumerate() {
                    let mut engine = engine(mode);
                    engine.initialize(order.iter().map(|&k| song(k, 1)).collect(), vec![]).unwrap();
                    check_invariants(&engine);

                    let mut step = offset;
                    while engine.phase() == Phase::Comparing {
                        engine.decide(mixed_policy(step)).unwrap();
                        check_invariants(&engine);
                        step += 1;
                    }
                    assert_eq!(engine.state().ranked().len(), n as usize);
                }
            }
        }
    }

    #[test]
    fn test_comparisons_per_insertion_are_bounded() {
        for mode in [SearchMode::Bounds, SearchMode::Strict] {
            for order in permutations(6) {
                let mut engine = engine(mode);
                engine.initialize(order.iter().map(|&k| song(k, 1)).collect(), vec![]).unwrap();

                let mut comparisons = 0;
                let mut current_subject = None;
                while let View::Comparing { round, placed, .. } = engine.current_state() {
                    if current_subject != Some(round.subject.key) {
                        current_subject = Some(round.subject.key);
                        comparisons = 0;
                    }
                    comparisons += 1;
                    assert!(
                        comparisons <= mode.max_comparisons(placed),
                        "{mode:?}: {comparisons} comparisons placing into {placed} items"
                    );
                    let preference = by_key(round);
                    engine.decide(preference).unwrap();
                }
                assert_eq!(engine.state().ranked().len(), 6);
            }
        }
    }

    #[test]
    fn test_strict_mode_sorts_consistent_preferences() {
        for order in permutations(6) {
            let mut engine = engine(SearchMode::Strict);
            engine.initialize(order.iter().map(|&k| song(k, 1)).collect(), vec![]).unwrap();
            while let View::Comparing { round, .. } = engine.current_state() {
                let preference = by_key(round);
                engine.decide(preference).unwrap();
            }
            assert_eq!(keys(engine.state().ranked()), vec![1, 2, 3, 4, 5, 6], "input {order:?}");
        }
    }

    #[test]
    fn test_bounds_mode_keeps_earlier_relative_order() {
        // Once placed, two items never swap while later items are inserted.
        for order in permutations(5) {
            let mut engine = engine(SearchMode::Bounds);
            engine.initialize(order.iter().map(|&k| song(k, 1)).collect(), vec![]).unwrap();
            let mut previous: Vec<i64> = keys(engine.state().ranked());
            while let View::Comparing { round, .. } = engine.current_state() {
                let preference = by_key(round);
                engine.decide(preference).unwrap();
                let now = keys(engine.state().ranked());
                let filtered: Vec<i64> = now.iter().copied().filter(|k| previous.contains(k)).collect();
                assert_eq!(filtered, previous);
                previous = now;
            }
        }
    }

    #[test]
    fn test_engine_keeps_config_and_collections() {
        let mut engine = engine(SearchMode::Strict);
        let albums = vec![Collection::new(1, "P")];
        engine.initialize(vec![song(1, 1), song(2, 1)], albums.clone()).unwrap();
        assert_eq!(engine.config().search, SearchMode::Strict);
        assert_eq!(engine.collections(), albums.as_slice());
    }
}
