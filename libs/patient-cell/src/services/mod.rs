pub mod patient;
pub mod dob;

pub use patient::PatientService;
pub use dob::normalize_date_of_birth;
