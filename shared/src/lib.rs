pub mod account;
pub mod event;
pub mod feedback;
pub mod insights;
