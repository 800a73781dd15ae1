//! Wall-clock helper

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in whole seconds.
///
/// Signed so that age and window arithmetic (`now - offset * week`) cannot
/// underflow on odd system clocks.
pub fn epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_seconds_is_past_2024() {
        // 2024-01-01T00:00:00Z
        assert!(epoch_seconds() > 1_704_067_200);
    }
}
