//! desaka-unifier - multi-language product attribute normalization
//!
//! Normalizes scraped table-tennis eshop product data (brand, product
//! type, model, category, stock status, variant names) into canonical
//! Czech values. Resolution is layered: durable learned memory, then
//! heuristic extractors, then an AI oracle gated by optional human
//! confirmation, and every answer is written back to memory so it is
//! never paid for twice.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod extract;
pub mod memory;
pub mod report;
pub mod reprocess;
pub mod resolver;
pub mod usage;
pub mod vocab;

pub use crate::error::{Error, Result};
