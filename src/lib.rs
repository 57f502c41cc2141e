pub mod calc;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod parallel;
pub mod server;

pub use dashboard::Dashboard;
