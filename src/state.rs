use std::sync::Arc;
use crate::domain::ports::{
    AvailabilityRepository, BookingRepository, PaymentGateway, StudentRepository, TutorRepository,
};
use crate::domain::services::payment_service::PaymentService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tutor_repo: Arc<dyn TutorRepository>,
    pub availability_repo: Arc<dyn AvailabilityRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub student_repo: Arc<dyn StudentRepository>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub payment_service: Arc<PaymentService>,
}

impl AppState {
    pub fn new(
        config: Config,
        tutor_repo: Arc<dyn TutorRepository>,
        availability_repo: Arc<dyn AvailabilityRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        student_repo: Arc<dyn StudentRepository>,
        payment_gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let payment_service = Arc::new(PaymentService::new(
            booking_repo.clone(),
            student_repo.clone(),
            payment_gateway.clone(),
        ));

        Self {
            config,
            tutor_repo,
            availability_repo,
            booking_repo,
            student_repo,
            payment_gateway,
            payment_service,
        }
    }
}
