use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Uniform permutation and sampling helper.
///
/// A seeded shuffler replays the same sequence of permutations, which is
/// what tests and `--seed` rely on. Unseeded ones draw from OS entropy.
#[derive(Debug, Clone)]
pub struct Shuffler {
    rng: StdRng,
}

impl Shuffler {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Fisher-Yates shuffle into a new vector; the input is left untouched.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        out.shuffle(&mut self.rng);
        out
    }

    /// Shuffled `0..len`
    pub fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut out: Vec<usize> = (0..len).collect();
        out.shuffle(&mut self.rng);
        out
    }

    /// Up to `count` distinct elements of `pool`, none equal to `exclude`,
    /// sampled uniformly without replacement. Never fails: a small pool just
    /// yields fewer elements.
    pub fn pick_distractors<T: Clone + PartialEq>(
        &mut self,
        pool: &[T],
        exclude: &T,
        count: usize,
    ) -> Vec<T> {
        let mut candidates: Vec<&T> = Vec::with_capacity(pool.len());
        for item in pool {
            if item != exclude && !candidates.contains(&item) {
                candidates.push(item);
            }
        }

        let mut picked: Vec<T> = candidates
            .choose_multiple(&mut self.rng, count)
            .map(|item| (*item).clone())
            .collect();
        picked.shuffle(&mut self.rng);
        picked
    }
}

impl Default for Shuffler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// One-shot shuffle; deterministic when `seed` is given.
pub fn shuffle<T: Clone>(items: &[T], seed: Option<u64>) -> Vec<T> {
    Shuffler::new(seed).shuffle(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_permutation() {
        let input: Vec<u32> = (0..50).collect();
        let mut out = shuffle(&input, None);

        assert_eq!(out.len(), input.len());
        out.sort_unstable();
        assert_eq!(out, input);
    }

    #[test]
    fn shuffle_keeps_repeated_elements() {
        let input = vec!["a", "b", "a", "c", "a"];
        let mut out = shuffle(&input, Some(3));
        out.sort_unstable();
        assert_eq!(out, vec!["a", "a", "a", "b", "c"]);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let input: Vec<u32> = (0..20).collect();
        assert_eq!(shuffle(&input, Some(42)), shuffle(&input, Some(42)));

        let mut a = Shuffler::seeded(7);
        let mut b = Shuffler::seeded(7);
        for _ in 0..5 {
            assert_eq!(a.permutation(10), b.permutation(10));
        }
    }

    #[test]
    fn shuffle_empty_and_single() {
        let empty: Vec<u8> = vec![];
        assert!(shuffle(&empty, Some(1)).is_empty());
        assert_eq!(shuffle(&[9], Some(1)), vec![9]);
    }

    #[test]
    fn shuffle_is_roughly_uniform() {
        // every element should land in first position a fair share of the time
        let input = [0usize, 1, 2, 3];
        let mut counts = [0u32; 4];
        let mut s = Shuffler::seeded(1234);
        for _ in 0..4000 {
            counts[s.shuffle(&input)[0]] += 1;
        }
        for c in counts {
            assert!((800..1200).contains(&c), "skewed counts: {counts:?}");
        }
    }

    #[test]
    fn distractors_never_include_excluded_or_duplicates() {
        let pool = vec!["a", "b", "b", "c", "d", "a", "e"];
        let mut s = Shuffler::seeded(9);

        for _ in 0..100 {
            let picked = s.pick_distractors(&pool, &"a", 3);
            assert_eq!(picked.len(), 3);
            assert!(!picked.contains(&"a"));
            let mut dedup = picked.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(dedup.len(), picked.len());
        }
    }

    #[test]
    fn distractors_from_small_pool() {
        let mut s = Shuffler::seeded(1);
        assert_eq!(s.pick_distractors(&["x", "y"], &"x", 3), vec!["y"]);
        assert!(s.pick_distractors(&["x", "x"], &"x", 3).is_empty());
        assert!(s.pick_distractors::<&str>(&[], &"x", 3).is_empty());
        assert!(s.pick_distractors(&["a", "b"], &"x", 0).is_empty());
    }
}
