//! Probabilistic choice of the acting agent

use rand::Rng;

/// Per-agent trial probability for a tick with `live` agents
pub fn trial_probability(live: usize) -> f64 {
    if live == 0 {
        0.0
    } else {
        1.0 / live as f64
    }
}

/// Walk `items` in order and return the first eligible item whose
/// independent Bernoulli(`p`) trial succeeds
///
/// Ineligible items get no trial. Returning `None` is a normal outcome.
/// Earlier items win whenever several trials would have succeeded.
pub fn first_success<'a, T, R, F>(items: &'a [T], p: f64, rng: &mut R, mut eligible: F) -> Option<&'a T>
where
    R: Rng,
    F: FnMut(&T) -> bool,
{
    let p = p.clamp(0.0, 1.0);
    items
        .iter()
        .filter(|item| eligible(*item))
        .find(|_| rng.gen_bool(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_trial_probability() {
        assert_eq!(trial_probability(0), 0.0);
        assert_eq!(trial_probability(1), 1.0);
        assert_eq!(trial_probability(4), 0.25);
    }

    #[test]
    fn test_certain_trial_picks_first_eligible() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = [1, 2, 3, 4];
        assert_eq!(first_success(&items, 1.0, &mut rng, |_| true), Some(&1));
        assert_eq!(first_success(&items, 1.0, &mut rng, |i| *i > 2), Some(&3));
        assert_eq!(first_success(&items, 1.0, &mut rng, |_| false), None);
    }

    #[test]
    fn test_impossible_trial_picks_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(first_success(&[1, 2, 3], 0.0, &mut rng, |_| true), None);
        let empty: [u8; 0] = [];
        assert_eq!(first_success(&empty, 1.0, &mut rng, |_| true), None);
    }

    #[test]
    fn test_at_most_one_and_sometimes_none() {
        let mut rng = StdRng::seed_from_u64(42);
        let items = ["a", "b", "c"];
        let p = trial_probability(items.len());

        let mut counts = [0usize; 4];
        for _ in 0..3000 {
            match first_success(&items, p, &mut rng, |_| true) {
                Some(&"a") => counts[0] += 1,
                Some(&"b") => counts[1] += 1,
                Some(_) => counts[2] += 1,
                None => counts[3] += 1,
            }
        }

        // P(a)=1/3, P(b)=2/9, P(c)=4/27, P(none)=8/27
        assert!(counts[0] > counts[1] && counts[1] > counts[2]);
        assert!(counts[3] > 600 && counts[3] < 1200);
    }
}
