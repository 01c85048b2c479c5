use rand::Rng;
use rand::seq::index;

/// Draws `k` distinct elements uniformly at random, without replacement.
///
/// When `k` is at least `items.len()` every element is returned in its
/// original order. Otherwise the order of the result is unspecified.
pub fn sample<T, R>(items: &[T], k: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if k >= items.len() {
        return items.to_vec();
    }

    index::sample(rng, items.len(), k)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_sample_returns_exactly_k_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let items: Vec<u32> = (0..10).collect();

        for k in 1..=10 {
            let picked = sample(&items, k, &mut rng);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(picked.len(), k);
            assert_eq!(unique.len(), k);
            assert!(picked.iter().all(|p| items.contains(p)));
        }
    }

    #[test]
    fn test_sample_all_keeps_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let items = vec!["a", "b", "c"];
        assert_eq!(sample(&items, 3, &mut rng), items);
        assert_eq!(sample(&items, 8, &mut rng), items);
    }

    #[test]
    fn test_sample_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample(&[1, 2, 3], 0, &mut rng).is_empty());
    }

    #[test]
    fn test_sample_is_unbiased_over_pairs() {
        const TRIALS: usize = 20_000;

        let mut rng = StdRng::seed_from_u64(0x5eed);
        let items = [0_u8, 1, 2, 3, 4];
        let mut counts: HashMap<(u8, u8), usize> = HashMap::new();

        for _ in 0..TRIALS {
            let mut pair = sample(&items, 2, &mut rng);
            pair.sort_unstable();
            *counts.entry((pair[0], pair[1])).or_default() += 1;
        }

        assert_eq!(counts.len(), 10);

        let expected = TRIALS / 10;
        for (pair, count) in counts {
            let deviation = count.abs_diff(expected);
            assert!(
                deviation < expected / 10,
                "pair {pair:?} drawn {count} times, expected about {expected}"
            );
        }
    }
}
