#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use polecart::agent::EpsilonSchedule;
    use polecart::metrics::EpisodeLog;
    use polecart::replay_buffer::{ReplayBuffer, Transition};
    use ndarray::Array3;

    fn tagged(tag: usize) -> Transition {
        Transition {
            state: Array3::from_elem((1, 1, 1), tag as f32),
            action: 0,
            next_state: Array3::zeros((1, 1, 1)),
            reward: 0.0,
            done: false,
        }
    }

    // Strategy for generating valid exploration bounds
    fn eps_bounds_strategy() -> impl Strategy<Value = (f32, f32)> {
        (0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(a, b)| if a >= b { (a, b) } else { (b, a) })
    }

    proptest! {
        #[test]
        fn test_buffer_never_exceeds_capacity(capacity in 1usize..50, pushes in 0usize..200) {
            let mut buffer = ReplayBuffer::with_seed(capacity, 0).unwrap();
            for i in 0..pushes {
                buffer.push(tagged(i));
                prop_assert!(buffer.len() <= capacity);
            }
            prop_assert_eq!(buffer.len(), pushes.min(capacity));

            // Survivors are exactly the newest pushes, oldest first
            let expected: Vec<f32> = (pushes.saturating_sub(capacity)..pushes).map(|i| i as f32).collect();
            let kept: Vec<f32> = buffer.iter().map(|t| t.state[[0, 0, 0]]).collect();
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn test_sample_is_distinct_subset(len in 1usize..60, seed in any::<u64>(), frac in 0.0f64..=1.0) {
            let mut buffer = ReplayBuffer::with_seed(len, seed).unwrap();
            for i in 0..len {
                buffer.push(tagged(i));
            }
            let n = ((len as f64) * frac).round() as usize;

            let mut tags: Vec<usize> = buffer
                .sample(n)
                .unwrap()
                .iter()
                .map(|t| t.state[[0, 0, 0]] as usize)
                .collect();
            prop_assert_eq!(tags.len(), n);
            tags.sort_unstable();
            tags.dedup();
            prop_assert_eq!(tags.len(), n);
            prop_assert!(tags.iter().all(|&t| t < len));

            prop_assert!(buffer.sample(len + 1).is_err());
        }

        #[test]
        fn test_linear_epsilon_monotone_and_bounded(
            (max_eps, min_eps) in eps_bounds_strategy(),
            total in 1usize..10_000,
            episode in 0usize..20_000,
        ) {
            let schedule = EpsilonSchedule::linear(max_eps, min_eps, total);
            let now = schedule.value(episode);
            let later = schedule.value(episode + 1);
            prop_assert!(now >= min_eps && now <= max_eps);
            prop_assert!(later <= now);
        }

        #[test]
        fn test_exponential_epsilon_monotone_and_bounded(
            (max_eps, min_eps) in eps_bounds_strategy(),
            decay in 0.5f32..500.0,
            start in 0usize..100,
            episode in 0usize..5_000,
        ) {
            let schedule = EpsilonSchedule::exponential(max_eps, min_eps, decay, start);
            let now = schedule.value(episode);
            let later = schedule.value(episode + 1);
            prop_assert!(now >= min_eps && now <= max_eps);
            prop_assert!(later <= now);
        }

        #[test]
        fn test_moving_average_length(durations in prop::collection::vec(1usize..500, 0..300), window in 1usize..120) {
            let log = EpisodeLog::from_durations(durations.clone());
            let averages = log.moving_average(window);
            let expected = if durations.len() >= window { durations.len() } else { 0 };
            prop_assert_eq!(averages.len(), expected);
            prop_assert!(averages.iter().all(|a| a.is_finite() && *a >= 0.0));
        }
    }
}
