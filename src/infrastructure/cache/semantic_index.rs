//! Nearest-neighbour scan over stored embeddings
//!
//! Linear in the number of live entries. Intended for hundreds to low
//! thousands of entries; larger stores need an ANN index instead.

use crate::domain::cache::CacheEntry;
use crate::domain::embedding::cosine_similarity;

/// Best candidate found by a scan
#[derive(Debug, Clone, Copy)]
pub struct SemanticMatch<'a> {
    pub entry: &'a CacheEntry,
    pub similarity: f32,
}

/// Find the candidate most similar to `query`, returning it only when its
/// similarity is at least `threshold` (equality is a hit).
///
/// Ties at the maximum similarity go to the most recently created entry.
/// Zero vectors on either side never match, whatever the threshold.
pub fn find_nearest<'a, I>(candidates: I, query: &[f32], threshold: f32) -> Option<SemanticMatch<'a>>
where
    I: IntoIterator<Item = &'a CacheEntry>,
{
    if is_zero(query) {
        return None;
    }

    let mut best: Option<SemanticMatch<'a>> = None;

    for entry in candidates {
        if is_zero(entry.embedding()) {
            continue;
        }

        let similarity = cosine_similarity(query, entry.embedding());

        if similarity.is_nan() {
            continue;
        }

        let replaces = match best {
            None => true,
            Some(current) => {
                similarity > current.similarity
                    || (similarity == current.similarity && is_newer(entry, current.entry))
            }
        };

        if replaces {
            best = Some(SemanticMatch { entry, similarity });
        }
    }

    best.filter(|candidate| candidate.similarity >= threshold)
}

fn is_zero(vector: &[f32]) -> bool {
    vector.iter().all(|x| *x == 0.0)
}

fn is_newer(a: &CacheEntry, b: &CacheEntry) -> bool {
    (a.created_at(), a.sequence()) > (b.created_at(), b.sequence())
}
