pub mod access;
pub mod uploads;
