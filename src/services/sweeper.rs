use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::state::SharedState;

/// Sweep the serving directory every `period`, on top of the sweeps done per request.
pub async fn run(state: SharedState, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately and startup already swept
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let report = state.store().sweep(OffsetDateTime::now_utc()).await;
        if report.deleted > 0 || report.failed > 0 {
            info!(
                deleted = report.deleted,
                failed = report.failed,
                kept = report.kept,
                "periodic sweep removed stale files"
            );
        } else {
            debug!(kept = report.kept, "periodic sweep found nothing stale");
        }
    }
}
