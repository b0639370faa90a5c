use std::sync::Arc;
use crate::domain::{
    models::{booking::{Booking, PaymentStatus}, checkout::RemoteSessionStatus},
    ports::{BookingRepository, PaymentGateway, StudentRepository},
};
use crate::error::AppError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Applies payment-processor outcomes to bookings. The processor is the only
/// source of truth for captured money.
pub struct PaymentService {
    booking_repo: Arc<dyn BookingRepository>,
    student_repo: Arc<dyn StudentRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        student_repo: Arc<dyn StudentRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self { booking_repo, student_repo, gateway }
    }

    /// The booking together with the rest of its series, ordered by date.
    pub async fn series_of(&self, booking: &Booking) -> Result<Vec<Booking>, AppError> {
        match &booking.recurring_id {
            Some(recurring_id) => {
                let mut series = self.booking_repo.list_by_series(recurring_id).await?;
                series.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));
                Ok(series)
            }
            None => Ok(vec![booking.clone()]),
        }
    }

    /// Asks the processor once about a pending booking's session.
    pub async fn sync_status(&self, booking: &Booking) -> Result<PaymentStatus, AppError> {
        if booking.payment_status != PaymentStatus::Pending {
            return Ok(booking.payment_status);
        }
        let Some(session_id) = booking.checkout_session_id.as_deref() else {
            return Ok(PaymentStatus::Pending);
        };

        let session = self.gateway.fetch_session(session_id).await?;
        self.apply(booking, session.status).await
    }

    pub async fn apply(&self, booking: &Booking, remote: RemoteSessionStatus) -> Result<PaymentStatus, AppError> {
        let target = match remote {
            RemoteSessionStatus::Open => return Ok(booking.payment_status),
            RemoteSessionStatus::Paid => PaymentStatus::Paid,
            RemoteSessionStatus::Failed | RemoteSessionStatus::Expired => PaymentStatus::Failed,
        };

        if !booking.payment_status.can_transition_to(target) {
            if booking.payment_status != target {
                warn!(
                    "Ignoring payment transition {} -> {} for booking {}",
                    booking.payment_status.as_str(), target.as_str(), booking.id
                );
            }
            return Ok(booking.payment_status);
        }

        let series = self.series_of(booking).await?;
        let ids: Vec<String> = series.iter().map(|b| b.id.clone()).collect();
        let changed = self.booking_repo.settle_payment(&ids, target).await?;

        if target == PaymentStatus::Paid && series.iter().any(|b| b.is_trial) {
            self.student_repo.mark_trial_used(&booking.student_id).await?;
        }

        info!("Payment {} for booking {} ({} rows)", target.as_str(), booking.id, changed);
        Ok(target)
    }
}

pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex HMAC-SHA256 signature over the raw body.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(signature) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trip() {
        let body = br#"{"sessionId":"cs_1","bookingId":"b1","status":"paid"}"#;
        let signature = sign_payload("whsec", body);
        assert!(verify_signature("whsec", body, &signature));
        assert!(!verify_signature("other", body, &signature));
        assert!(!verify_signature("whsec", b"tampered", &signature));
        assert!(!verify_signature("whsec", body, "not-hex"));
    }
}
