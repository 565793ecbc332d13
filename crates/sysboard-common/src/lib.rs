pub mod types;
pub mod units;
