pub mod auth;
pub mod availability;
pub mod booking;
pub mod checkout;
pub mod trial;
pub mod tutor;
