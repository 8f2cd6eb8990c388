//! Database models and types module.
//! This module contains the diesel row types, request parameters and JSON response shapes.

mod db_models; // Diesel rows and insertables
mod params; // Query, path and body inputs
mod responses; // API response models

// Re-export all models for easier access
pub use db_models::*;
pub use params::*;
pub use responses::*;
