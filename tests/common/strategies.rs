use proptest::prelude::*;
use std::time::Duration;

/// Strategy for retry limits small enough to run quickly
pub fn max_retries_strategy() -> impl Strategy<Value = u32> {
    0u32..6
}

/// Strategy for (base, max) delay pairs with base <= max
pub fn delay_bounds_strategy() -> impl Strategy<Value = (Duration, Duration)> {
    (1u64..500, 0u64..10_000).prop_map(|(base_ms, extra_ms)| {
        (
            Duration::from_millis(base_ms),
            Duration::from_millis(base_ms + extra_ms),
        )
    })
}

pub fn backoff_multiplier_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(1.0), Just(1.5), Just(2.0), Just(3.0)]
}

/// Outcome sequences for a breaker; `true` is a success
pub fn outcome_sequence_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..40)
}

/// Command type names in `VerbNounCommand` form
pub fn command_name_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
    (
        "[A-Z][a-z]{1,8}",
        prop::collection::vec("[A-Z][a-z]{1,8}", 1..4),
    )
        .prop_map(|(verb, nouns)| {
            let mut words = vec![verb];
            words.extend(nouns);
            (format!("{}Command", words.concat()), words)
        })
}
