pub mod core;
pub mod export;
pub mod faculty;
pub mod import;
pub mod schedule;
