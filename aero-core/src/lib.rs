//! Core types for the Aero-Cast air-quality explorer: observation timestamps,
//! CSV parsing, the site/timestamp index, boundary regions, file-name
//! resolution and map selection state.

pub mod catalog;
pub mod error;
pub mod index;
pub mod monthly;
pub mod region;
pub mod resolver;
pub mod selection;
pub mod timestamp;

pub use error::{AeroError, Result};
