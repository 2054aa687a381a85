// src/lib.rs

// Declaração dos nossos módulos
pub mod common;
pub mod config;
pub mod models;
pub mod services;
pub mod store;

pub use common::error::AppError;
pub use config::{AppContext, Config};
pub use store::Store;
