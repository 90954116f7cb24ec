//! Startup helpers shared by the server binary and integration tests
//!
//! - configuration loading and validation
//! - database pool creation
//! - service wiring

pub mod config;
pub mod database;
pub mod services;

pub use config::load_config;
pub use database::init_database;
pub use services::{init_services, Services};
