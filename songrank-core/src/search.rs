/// How a preference narrows the bounds of a binary-search insertion.
///
/// Both modes share the round representation: bounds `[lower, upper)` with
/// the probe at `floor((lower + upper) / 2)`. They differ in what a
/// preference rules out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchMode {
    /// The probe's rank becomes the new bound on either side. Settles as soon
    /// as the bounds are at most one apart and inserts at the upper bound.
    #[default]
    Bounds,
    /// A preference also excludes the probe's own position. Settles when the
    /// bounds meet, so the subject has been compared against both neighbours
    /// it ends up between (or the list edge).
    Strict,
}

/// Outcome of applying one preference to a round's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Narrowing {
    /// Insertion point is known.
    Insert(usize),
    /// Keep comparing within the new bounds.
    Continue { lower: usize, upper: usize },
}

impl SearchMode {
    /// Apply a binary preference to `[lower, upper)`.
    ///
    /// `subject_preferred` is true when the subject ranks better than the
    /// probe at `floor((lower + upper) / 2)`.
    pub fn narrow(self, lower: usize, upper: usize, subject_preferred: bool) -> Narrowing {
        let mid = (lower + upper) / 2;
        match self {
            SearchMode::Bounds => {
                let (lower, upper) = if subject_preferred { (lower, mid) } else { (mid, upper) };
                if upper - lower <= 1 {
                    Narrowing::Insert(upper)
                } else {
                    Narrowing::Continue { lower, upper }
                }
            }
            SearchMode::Strict => {
                let (lower, upper) = if subject_preferred { (lower, mid) } else { (mid + 1, upper) };
                if lower >= upper {
                    Narrowing::Insert(lower)
                } else {
                    Narrowing::Continue { lower, upper }
                }
            }
        }
    }

    /// Most comparisons needed to place one item into a list of `len` items.
    pub fn max_comparisons(self, len: usize) -> usize {
        let positions = match self {
            SearchMode::Bounds => len,
            SearchMode::Strict => len + 1,
        };
        ceil_log2(positions).max(1)
    }
}

fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        (usize::BITS - (n - 1).leading_zeros()) as usize
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bounds" => Ok(SearchMode::Bounds),
            "strict" => Ok(SearchMode::Strict),
            other => Err(format!("Unknown search mode \"{other}\". Use \"bounds\" or \"strict\".")),
        }
    }
}
