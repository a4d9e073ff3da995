use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::state::AppState;

/// Periodic expiry sweep: the cron-style external trigger for
/// `expire_quotes`, plus an expiring-soon scan for notification surfaces.
pub async fn start_expiry_worker(state: AppState) {
    let mut ticker = interval(Duration::from_secs(state.rules.expiry_sweep_seconds));
    info!(
        every_seconds = state.rules.expiry_sweep_seconds,
        "expiry worker started"
    );

    loop {
        ticker.tick().await;

        match state.quotes.expire_quotes(Utc::now()).await {
            Ok(0) => {}
            Ok(count) => info!(count, "expiry sweep transitioned quotes"),
            Err(e) => error!("expiry sweep failed: {}", e),
        }

        let lookahead = ChronoDuration::days(state.rules.expiring_lookahead_days);
        match state.quotes.check_expiring(Utc::now(), lookahead).await {
            Ok(expiring) => {
                for quote in expiring {
                    info!(
                        quote = %quote.number,
                        valid_until = %quote.terms.valid_until,
                        "quote expiring soon"
                    );
                }
            }
            Err(e) => error!("expiring-soon scan failed: {}", e),
        }
    }
}
