pub mod billing;
pub mod config;
pub mod mail;
pub mod period;
pub mod report;
