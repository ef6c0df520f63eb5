#![forbid(unsafe_code)]

//! Drug knowledge lookup and pediatric dosage recommendation engine.
//!
//! This crate provides:
//! - Drug registry loading and case-insensitive lookup
//! - Adult dose string parsing
//! - Clark's Rule and Young's Rule dose estimates
//! - Drug name extraction from free prescription text
//! - A recommendation facade composing all of the above

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod registry;
pub mod dose;
pub mod calculator;
pub mod extract;
pub mod recommend;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use registry::{sample_registry, DrugRegistry};
pub use dose::{parse_adult_dose, DEFAULT_ADULT_DOSE_MG};
pub use calculator::{clark_rule, recommend_dosage, young_rule};
pub use extract::{extract_drugs, SAMPLE_PRESCRIPTION};
pub use recommend::Recommender;
