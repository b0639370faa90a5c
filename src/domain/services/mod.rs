pub mod availability;
pub mod local_time;
pub mod payment_service;
pub mod pricing;
pub mod schedule;
