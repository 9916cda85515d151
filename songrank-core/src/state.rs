/// Ranking state as a closed set of phases, advanced by a pure transition
/// function.
///
/// `transition` never mutates its input. The engine keeps the previous value
/// around for undo.
use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::aggregate::rank_collections;
use crate::error::EngineError;
use crate::search::{Narrowing, SearchMode};
use crate::types::{Collection, CollectionRanking, ComparisonRound, Item, Preference};

/// Phase tag of a [`RankingState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Uninitialized,
    Seeded,
    Comparing,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Seeded => "seeded",
            Phase::Comparing => "comparing",
            Phase::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Full engine state. One variant per phase.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RankingState {
    #[default]
    Uninitialized,
    /// Items loaded but not yet split into list and queue. Never stored:
    /// `transition` advances it to `Comparing` or `Complete` right away.
    Seeded { items: Vec<Item> },
    Comparing {
        ranked: Vec<Item>,
        pending: VecDeque<Item>,
        round: ComparisonRound,
    },
    Complete {
        ranked: Vec<Item>,
        collection_ranking: Vec<CollectionRanking>,
    },
}

impl RankingState {
    pub fn phase(&self) -> Phase {
        match self {
            RankingState::Uninitialized => Phase::Uninitialized,
            RankingState::Seeded { .. } => Phase::Seeded,
            RankingState::Comparing { .. } => Phase::Comparing,
            RankingState::Complete { .. } => Phase::Complete,
        }
    }

    /// Items placed so far, best first.
    pub fn ranked(&self) -> &[Item] {
        match self {
            RankingState::Comparing { ranked, .. } | RankingState::Complete { ranked, .. } => ranked,
            RankingState::Uninitialized | RankingState::Seeded { .. } => &[],
        }
    }

    /// Items waiting for their turn, next first.
    pub fn pending(&self) -> Option<&VecDeque<Item>> {
        match self {
            RankingState::Comparing { pending, .. } => Some(pending),
            _ => None,
        }
    }

    pub fn round(&self) -> Option<&ComparisonRound> {
        match self {
            RankingState::Comparing { round, .. } => Some(round),
            _ => None,
        }
    }

    /// Number of items this state accounts for across list, queue and subject.
    pub fn item_count(&self) -> usize {
        match self {
            RankingState::Uninitialized => 0,
            RankingState::Seeded { items } => items.len(),
            RankingState::Comparing { ranked, pending, .. } => ranked.len() + pending.len() + 1,
            RankingState::Complete { ranked, .. } => ranked.len(),
        }
    }
}

/// Input to [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Load items in their final order. Valid from any phase; replaces the
    /// current state.
    Initialize(Vec<Item>),
    /// Answer the current comparison. Valid only while `Comparing`.
    Decide(Preference),
}

/// Compute the state that follows `state` on `event`.
///
/// `collections` feeds the aggregate computed on reaching `Complete`.
pub fn transition(
    state: &RankingState,
    event: Event,
    collections: &[Collection],
    search: SearchMode,
) -> Result<RankingState, EngineError> {
    match event {
        Event::Initialize(items) => {
            let seeded = seed(items)?;
            Ok(split(seeded, collections))
        }
        Event::Decide(preference) => match state {
            RankingState::Comparing { ranked, pending, round } => {
                Ok(decide(ranked, pending, round, preference, collections, search))
            }
            other => Err(EngineError::InvalidPhase {
                expected: Phase::Comparing,
                actual: other.phase(),
            }),
        },
    }
}

fn seed(items: Vec<Item>) -> Result<RankingState, EngineError> {
    if items.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if !seen.insert(item.key) {
            return Err(EngineError::DuplicateItem(item.key));
        }
    }
    Ok(RankingState::Seeded { items })
}

/// Seeded -> first list entry plus queue, then straight into the first round.
fn split(seeded: RankingState, collections: &[Collection]) -> RankingState {
    let items = match seeded {
        RankingState::Seeded { items } => items,
        other => return other,
    };
    let mut pending: VecDeque<Item> = items.into();
    let ranked: Vec<Item> = pending.pop_front().into_iter().collect();
    advance(ranked, pending, collections)
}

fn decide(
    ranked: &[Item],
    pending: &VecDeque<Item>,
    round: &ComparisonRound,
    preference: Preference,
    collections: &[Collection],
    search: SearchMode,
) -> RankingState {
    let mut ranked = ranked.to_vec();
    let pending = pending.clone();
    let mid = round.mid();
    let subject = round.subject.clone();

    match preference {
        Preference::PreferSubject | Preference::PreferProbe => {
            let subject_preferred = preference == Preference::PreferSubject;
            match search.narrow(round.lower_bound, round.upper_bound, subject_preferred) {
                Narrowing::Insert(index) => ranked.insert(index, subject),
                Narrowing::Continue { lower, upper } => {
                    let probe = ranked[(lower + upper) / 2].clone();
                    return RankingState::Comparing {
                        ranked,
                        pending,
                        round: ComparisonRound {
                            subject,
                            probe,
                            lower_bound: lower,
                            upper_bound: upper,
                        },
                    };
                }
            }
        }
        Preference::Equal => ranked.insert(mid + 1, subject),
        Preference::NoOpinion => ranked.push(subject),
    }

    advance(ranked, pending, collections)
}

/// Start the next round, or finish when the queue is drained.
fn advance(ranked: Vec<Item>, mut pending: VecDeque<Item>, collections: &[Collection]) -> RankingState {
    match pending.pop_front() {
        None => {
            let collection_ranking = rank_collections(&ranked, collections);
            RankingState::Complete {
                ranked,
                collection_ranking,
            }
        }
        Some(subject) => {
            let upper_bound = ranked.len();
            let probe = ranked[upper_bound / 2].clone();
            RankingState::Comparing {
                ranked,
                pending,
                round: ComparisonRound {
                    subject,
                    probe,
                    lower_bound: 0,
                    upper_bound,
                },
            }
        }
    }
}
