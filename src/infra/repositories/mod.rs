pub mod sqlite_availability_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_student_repo;
pub mod sqlite_tutor_repo;

pub mod postgres_availability_repo;
pub mod postgres_booking_repo;
pub mod postgres_student_repo;
pub mod postgres_tutor_repo;
