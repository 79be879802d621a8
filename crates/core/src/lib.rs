pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod matcher;
pub mod ports;
pub mod utils;
