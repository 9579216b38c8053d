//! Page-object test harness for the ACME demo banking app.
//!
//! The harness drives a headless Chrome through its DevTools endpoint and
//! exposes the demo app's pages (login form, customer dashboard) as semantic
//! accessors, so the suites under `tests/` read like the scenarios they
//! verify instead of locator plumbing.

pub mod amount;
pub mod browser;
pub mod check;
pub mod config;
pub mod error;
pub mod pages;
pub mod visual;

pub use error::{ProbeError, Result};
