//! ICS file generation.
//!
//! This module writes a single-VEVENT calendar according to RFC 5545.

mod generate;

pub use generate::{PRODUCT_ID, escape_text, generate_ics};
