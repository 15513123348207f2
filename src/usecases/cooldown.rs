use std::time::Duration;

use tokio::time::Instant;

use super::gateways::Progress;

pub struct Cooldown {
    jitter: f64,
    ticks: u32,
}

pub fn new(jitter: f64, ticks: u32) -> Cooldown {
    Cooldown {
        jitter: jitter.max(1.0),
        ticks: ticks.max(1),
    }
}

impl Cooldown {
    /// Sleeps `reset_after * jitter` seconds, reporting the time left on every tick.
    pub async fn wait(&self, reset_after: f64, progress: &dyn Progress) {
        let total = self.duration(reset_after);
        let per_tick = total / self.ticks;
        let start = Instant::now();

        tracing::info!(seconds = total.as_secs_f64(), "rate limited, cooling down");

        for _ in 0..self.ticks {
            let left = total.saturating_sub(start.elapsed());
            progress.report(&format!(
                "Fetching members (on cooldown for {:.2}s)",
                left.as_secs_f64()
            ));
            tokio::time::sleep(per_tick).await;
        }
    }

    fn duration(&self, reset_after: f64) -> Duration {
        if !reset_after.is_finite() || reset_after <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(reset_after * self.jitter).unwrap_or(Duration::MAX)
    }
}
