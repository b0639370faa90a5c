pub mod booking;
pub mod checkout;
pub mod health;
pub mod trial;
pub mod tutor;
