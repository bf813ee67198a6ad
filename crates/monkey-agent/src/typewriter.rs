//! Character-by-character decomposition of `[TYPE]` text.

use rand::Rng;
use tokio::time::{sleep, Duration};

use crate::applescript::{run_applescript, type_char_script};
use crate::backend::BackendError;

/// Decompose text into `(script, delay_ms)` pairs, one per character.
///
/// Each delay is drawn uniformly from `speed_ms ..= speed_ms +
/// variance_ms` and is applied after the character is sent. The
/// generator is injected so tests can seed it.
pub fn typewriter_scripts<R: Rng>(
    text: &str,
    speed_ms: u64,
    variance_ms: u64,
    rng: &mut R,
) -> Vec<(String, u64)> {
    text.chars()
        .map(|ch| {
            let jitter = if variance_ms > 0 {
                rng.random_range(0..=variance_ms)
            } else {
                0
            };
            (type_char_script(ch), speed_ms + jitter)
        })
        .collect()
}

/// Type text against the live desktop with jittered pacing.
pub async fn type_text(text: &str, speed_ms: u64, variance_ms: u64) -> Result<(), BackendError> {
    let pairs = typewriter_scripts(text, speed_ms, variance_ms, &mut rand::rng());
    for (script, delay_ms) in pairs {
        run_applescript(&script).await?;
        sleep(Duration::from_millis(delay_ms)).await;
    }
    Ok(())
}
