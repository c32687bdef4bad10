//! Latin squares, counterbalance queues and stable hashing.
//!
//! Everything here is a pure function of its inputs and the supplied RNG, so
//! a seeded generator reproduces the same squares and queues.

use std::collections::VecDeque;
use std::hash::Hasher;

use rand::seq::SliceRandom;
use rand::Rng;
use siphasher::sip::SipHasher13;

/// Number of shuffled permutations concatenated into a counterbalance queue.
pub const COUNTERBALANCE_REPETITIONS: usize = 4;

/// An `n x n` grid over `0..n` where every row and every column is a permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatinSquare {
    rows: Vec<Vec<usize>>,
}

impl LatinSquare {
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> &[usize] {
        &self.rows[index]
    }

    pub fn cell(&self, row: usize, col: usize) -> usize {
        self.rows[row][col]
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// Check the Latin property: each row and each column covers `0..n` exactly once.
    pub fn is_latin(&self) -> bool {
        let n = self.size();
        let covers = |values: &mut dyn Iterator<Item = usize>| {
            let mut seen = vec![false; n];
            for v in values {
                if v >= n || seen[v] {
                    return false;
                }
                seen[v] = true;
            }
            seen.into_iter().all(|s| s)
        };

        self.rows.iter().all(|row| row.len() == n && covers(&mut row.iter().copied()))
            && (0..n).all(|col| covers(&mut self.rows.iter().map(|row| row[col])))
    }
}

/// Generate a Latin square of size `n`.
///
/// Row `i` starts as the cyclic shift `(i + j) mod n`; the rows are then
/// shuffled as whole rows, which keeps every column a permutation.
/// `n == 0` yields an empty square.
pub fn generate_latin_square<R: Rng + ?Sized>(n: usize, rng: &mut R) -> LatinSquare {
    let mut rows: Vec<Vec<usize>> = (0..n)
        .map(|i| (0..n).map(|j| (i + j) % n).collect())
        .collect();
    rows.shuffle(rng);
    LatinSquare { rows }
}

/// Build a queue of `COUNTERBALANCE_REPETITIONS` independently shuffled
/// permutations of `ids`, concatenated front to back.
pub fn build_counterbalance_queue<T, R>(ids: &[T], rng: &mut R) -> VecDeque<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let mut queue = VecDeque::with_capacity(ids.len() * COUNTERBALANCE_REPETITIONS);
    for _ in 0..COUNTERBALANCE_REPETITIONS {
        let mut order = ids.to_vec();
        order.shuffle(rng);
        queue.extend(order);
    }
    queue
}

/// Build a queue of `COUNTERBALANCE_REPETITIONS` shuffled whole-list orders.
///
/// Unlike [`build_counterbalance_queue`], each permutation stays intact as
/// one queue entry.
pub fn build_order_queue<T, R>(items: &[T], rng: &mut R) -> VecDeque<Vec<T>>
where
    T: Clone,
    R: Rng + ?Sized,
{
    (0..COUNTERBALANCE_REPETITIONS)
        .map(|_| {
            let mut order = items.to_vec();
            order.shuffle(rng);
            order
        })
        .collect()
}

/// Platform-stable hash of a sequence of string parts.
///
/// SipHash-1-3 with fixed zero keys; parts are length-prefixed so
/// `("ab", "c")` and `("a", "bc")` hash differently.
pub fn stable_hash(parts: &[&str]) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    for part in parts {
        hasher.write_u64(part.len() as u64);
        hasher.write(part.as_bytes());
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_latin_square_property_for_small_sizes() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in 1..=9 {
            let square = generate_latin_square(n, &mut rng);
            assert_eq!(square.size(), n);
            assert!(square.is_latin(), "size {n} must be latin: {:?}", square.rows());
        }
    }

    #[test]
    fn test_latin_square_zero_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let square = generate_latin_square(0, &mut rng);
        assert!(square.is_empty());
        assert!(square.is_latin());
    }

    #[test]
    fn test_latin_square_deterministic_with_seed() {
        let a = generate_latin_square(6, &mut StdRng::seed_from_u64(42));
        let b = generate_latin_square(6, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_is_latin_rejects_broken_square() {
        let square = LatinSquare {
            rows: vec![vec![0, 1], vec![0, 1]],
        };
        assert!(!square.is_latin());
    }

    #[test]
    fn test_counterbalance_queue_contains_each_id_per_repetition() {
        let ids = vec!["a", "b", "c"];
        let queue = build_counterbalance_queue(&ids, &mut StdRng::seed_from_u64(3));
        assert_eq!(queue.len(), ids.len() * COUNTERBALANCE_REPETITIONS);

        let items: Vec<_> = queue.into_iter().collect();
        for chunk in items.chunks(ids.len()) {
            let set: HashSet<_> = chunk.iter().collect();
            assert_eq!(set.len(), ids.len(), "each block is a full permutation");
        }
    }

    #[test]
    fn test_order_queue_entries_are_permutations() {
        let items = vec![1, 2, 3, 4];
        let queue = build_order_queue(&items, &mut StdRng::seed_from_u64(5));
        assert_eq!(queue.len(), COUNTERBALANCE_REPETITIONS);
        for order in queue {
            let mut sorted = order.clone();
            sorted.sort();
            assert_eq!(sorted, items);
        }
    }

    #[test]
    fn test_stable_hash_is_stable_and_length_prefixed() {
        assert_eq!(stable_hash(&["session", "anchoring"]), stable_hash(&["session", "anchoring"]));
        assert_ne!(stable_hash(&["ab", "c"]), stable_hash(&["a", "bc"]));
    }
}
