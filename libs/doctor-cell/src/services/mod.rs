pub mod availability;
pub mod insurance;
pub mod choice;

pub use availability::AvailabilityService;
pub use insurance::InsuranceService;
pub use choice::resolve_doctor_choice;
