/// Per-collection aggregate derived from a finished ranking.
use crate::types::{Collection, CollectionIndex, CollectionRanking, Item};

/// Rank collections by the mean `1 + rank` of their placed items.
///
/// Lower mean ranks first. Ties keep the order of `collections`. Collections
/// with no placed item are left out, as are items whose collection key is not
/// in `collections`. A repeated collection key only counts at its first
/// occurrence.
pub fn rank_collections(ranked: &[Item], collections: &[Collection]) -> Vec<CollectionRanking> {
    let index = CollectionIndex::first_key_wins(collections);

    // (sum of 1-based ranks, member count), indexed like `collections`
    let mut totals = vec![(0usize, 0usize); collections.len()];
    for (rank, item) in ranked.iter().enumerate() {
        if let Some(idx) = index.to_idx(item.collection) {
            totals[idx].0 += rank + 1;
            totals[idx].1 += 1;
        }
    }

    let mut rankings: Vec<CollectionRanking> = collections
        .iter()
        .zip(totals)
        .filter(|(_, (_, count))| *count > 0)
        .map(|(collection, (sum, count))| CollectionRanking {
            collection: collection.clone(),
            mean_rank: sum as f64 / count as f64,
            placed: count,
        })
        .collect();

    // sort_by is stable, which gives input-order tie breaking
    rankings.sort_by(|a, b| a.mean_rank.total_cmp(&b.mean_rank));
    rankings
}
