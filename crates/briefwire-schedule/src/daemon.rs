//! Standalone refresh daemon — a minute-resolution evaluation loop.
//!
//! The tokio interval ticks faster than a minute so every minute bucket
//! gets at least one evaluation even under scheduling jitter; the bucket
//! key dedupes so no bucket is evaluated twice. Rules match minute-exact,
//! which makes the pair "at least once, at most once" per minute.

use chrono::{DateTime, Utc};

use crate::runner::{OutcomeStatus, RefreshRunner};

/// Minute key an instant belongs to ("2026-03-02T09:30").
fn minute_bucket(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M").to_string()
}

/// Run the refresh loop forever.
pub async fn run_daemon(runner: RefreshRunner, check_interval_secs: u64) {
    tracing::info!(
        "⏰ Refresh daemon started (check every {}s)",
        check_interval_secs
    );

    let mut interval =
        tokio::time::interval(std::time::Duration::from_secs(check_interval_secs.max(1)));
    let mut last_bucket = String::new();

    loop {
        interval.tick().await;

        let now = Utc::now();
        let bucket = minute_bucket(now);
        if bucket == last_bucket {
            continue;
        }
        last_bucket = bucket;

        match runner.run_at(now).await {
            Ok(report) if report.due_count > 0 => {
                let succeeded = report
                    .outcomes
                    .iter()
                    .filter(|o| o.status == OutcomeStatus::Success)
                    .count();
                tracing::info!(
                    "✅ Evaluation done: {} rule(s) due, {} refreshed",
                    report.due_count,
                    succeeded
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("⚠️ Evaluation failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bucket_has_minute_resolution() {
        let a = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 5).unwrap();
        let b = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 55).unwrap();
        let c = Utc.with_ymd_and_hms(2026, 3, 2, 9, 31, 0).unwrap();
        assert_eq!(minute_bucket(a), "2026-03-02T09:30");
        assert_eq!(minute_bucket(a), minute_bucket(b));
        assert_ne!(minute_bucket(b), minute_bucket(c));
    }
}
