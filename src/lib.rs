//! Listings ML - очистка объявлений о продаже автомобилей и модель цены

pub mod api;
pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
pub mod preprocessing;
pub mod types;

pub use types::*;
pub use models::*;
pub use preprocessing::*;

// Re-export для удобства
pub use error::{ModelError, PipelineError, StorageError};
