// src/core/mod.rs
//! Core services shared by the session controller and the CLI

pub mod config_manager;
pub mod fs_ops;
pub mod service_client;

pub use config_manager::ConfigManager;
pub use fs_ops::FsOps;
pub use service_client::{JobService, ServiceClient};
