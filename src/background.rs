use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, info_span, warn, Instrument};
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::models::booking::PaymentStatus;

/// Handle to the sweeper task. Dropping it also ends the loop, but without waiting.
pub struct BackgroundWorker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl BackgroundWorker {
    pub fn start(state: Arc<AppState>) -> Self {
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(start_background_worker(state, rx));
        Self { shutdown, handle }
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            error!("Background worker did not shut down cleanly: {:?}", e);
        }
    }
}

pub async fn start_background_worker(state: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    let interval = Duration::from_secs(state.config.sweep_interval_secs.max(1));
    info!("Starting background worker (sweep every {:?})...", interval);

    loop {
        tokio::select! {
            _ = sleep(interval) => {
                if let Err(e) = sweep_stale_pending(&state).await {
                    error!("Stale booking sweep failed: {:?}", e);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Background worker stopping");
                    break;
                }
            }
        }
    }
}

/// Deletes bookings that never reached checkout within the configured TTL.
///
/// Stale rows with a checkout session attached are not deleted: the processor
/// is asked once per session, so expired sessions free their slots and paid
/// ones are settled. Sessions still open are left for the webhook.
pub async fn sweep_stale_pending(state: &AppState) -> Result<u64, AppError> {
    let ttl = chrono::Duration::minutes(state.config.pending_booking_ttl_minutes);
    let cutoff = Utc::now() - ttl;

    let span = info_span!("stale_booking_sweep", cutoff = %cutoff);
    async move {
        let deleted = state.booking_repo.delete_stale_pending(cutoff).await?;
        if deleted > 0 {
            info!("Deleted {} stale pending booking(s)", deleted);
        }

        let mut seen = HashSet::new();
        for booking in state.booking_repo.list_stale_checkouts(cutoff).await? {
            let Some(session_id) = booking.checkout_session_id.clone() else { continue };
            if !seen.insert(session_id) {
                continue;
            }
            match state.payment_service.sync_status(&booking).await {
                Ok(PaymentStatus::Pending) => {}
                Ok(status) => info!("Stale checkout for booking {} settled as {}", booking.id, status.as_str()),
                Err(e) => warn!("Could not check stale checkout for booking {}: {:?}", booking.id, e),
            }
        }
        Ok(deleted)
    }
        .instrument(span)
        .await
}
