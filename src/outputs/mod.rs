//! Rendering of browser views for the terminal.
//!
//! This module contains submodules responsible for turning a
//! [`crate::browser::BrowserView`] into text:
//!
//! # Submodules
//!
//! - [`cards`]: article cards, catalog listings, and status panels for
//!   human reading
//! - [`json`]: machine-readable article dumps for piping into other tools

pub mod cards;
pub mod json;
