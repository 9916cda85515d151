/// Simulate command: ranks synthetic songs against a hidden reference order.
///
/// Each trial shuffles a reference ranking, shuffles the presentation order,
/// and answers every comparison by the reference. Reports how many questions
/// were asked and how far the result is from the reference.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use songrank_core::{EngineConfig, EngineError, Item, Preference, RankingEngine, SearchMode, View};

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub mode: String,
    pub items: usize,
    pub trials: usize,
    pub mean_comparisons: f64,
    /// Most comparisons spent placing a single song, over all trials.
    pub worst_insertion: usize,
    /// Mean count of song pairs ordered against the reference.
    pub mean_inversions: f64,
    /// Fraction of trials that reproduced the reference exactly.
    pub exact_rate: f64,
}

/// Outcome of one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Trial {
    comparisons: usize,
    worst_insertion: usize,
    inversions: usize,
}

/// Run `trials` seeded trials of `items` songs each.
///
/// Fails with `EngineError::EmptyInput` when `items` is zero.
pub fn simulate(items: usize, trials: usize, mode: SearchMode, seed: u64) -> Result<SimulationReport, EngineError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut total_comparisons = 0;
    let mut total_inversions = 0;
    let mut worst_insertion = 0;
    let mut exact = 0;

    for _ in 0..trials {
        // reference[key - 1] = reference rank of song `key`
        let mut reference: Vec<usize> = (0..items).collect();
        reference.shuffle(&mut rng);
        let mut order: Vec<Item> = (1..=items as i64).map(|k| Item::new(k, format!("Song {k}"), 0)).collect();
        order.shuffle(&mut rng);

        let trial = run_trial(order, &reference, mode)?;
        total_comparisons += trial.comparisons;
        total_inversions += trial.inversions;
        worst_insertion = worst_insertion.max(trial.worst_insertion);
        if trial.inversions == 0 {
            exact += 1;
        }
    }

    let per_trial = |total: usize| if trials == 0 { 0.0 } else { total as f64 / trials as f64 };
    Ok(SimulationReport {
        mode: mode_name(mode).to_string(),
        items,
        trials,
        mean_comparisons: per_trial(total_comparisons),
        worst_insertion,
        mean_inversions: per_trial(total_inversions),
        exact_rate: per_trial(exact),
    })
}

fn run_trial(order: Vec<Item>, reference: &[usize], mode: SearchMode) -> Result<Trial, EngineError> {
    let rank_of = |item: &Item| reference[(item.key - 1) as usize];
    let mut engine = RankingEngine::new(EngineConfig { search: mode });
    engine.initialize(order, Vec::new())?;

    let mut comparisons = 0;
    let mut worst_insertion = 0;
    let mut current = (None, 0);
    while let View::Comparing { round, .. } = engine.current_state() {
        if current.0 != Some(round.subject.key) {
            current = (Some(round.subject.key), 0);
        }
        current.1 += 1;
        comparisons += 1;
        worst_insertion = worst_insertion.max(current.1);

        let preference = if rank_of(&round.subject) < rank_of(&round.probe) {
            Preference::PreferSubject
        } else {
            Preference::PreferProbe
        };
        engine.decide(preference)?;
    }

    let ranks: Vec<usize> = engine.state().ranked().iter().map(rank_of).collect();
    Ok(Trial {
        comparisons,
        worst_insertion,
        inversions: count_inversions(&ranks),
    })
}

/// Pairs `(i, j)` with `i < j` and `ranks[i] > ranks[j]`.
fn count_inversions(ranks: &[usize]) -> usize {
    let mut count = 0;
    for i in 0..ranks.len() {
        for j in i + 1..ranks.len() {
            if ranks[i] > ranks[j] {
                count += 1;
            }
        }
    }
    count
}

pub fn mode_name(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Bounds => "bounds",
        SearchMode::Strict => "strict",
    }
}

pub fn print_reports(reports: &[SimulationReport]) {
    println!(" Mode   | Songs | Trials | Avg comparisons | Worst per song | Avg inversions | Exact");
    println!("--------|-------|--------|-----------------|----------------|----------------|------");
    for r in reports {
        println!(
            " {:<6} | {:>5} | {:>6} | {:>15.2} | {:>14} | {:>14.2} | {:>4.0}%",
            r.mode,
            r.items,
            r.trials,
            r.mean_comparisons,
            r.worst_insertion,
            r.mean_inversions,
            r.exact_rate * 100.0,
        );
    }
}
