pub mod app;
pub mod ascp;
pub mod config;
pub mod domain;
pub mod ena;
pub mod error;
pub mod logging;
pub mod output;
pub mod process;
