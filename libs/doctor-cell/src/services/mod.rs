pub mod category;
pub mod chamber;
pub mod doctor;
pub mod schedule;
