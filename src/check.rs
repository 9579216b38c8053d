//! Non-blocking assertions for appearance audits.
//!
//! A page full of labels is best verified in one pass: every mismatch is
//! recorded, and the suite fails once at the end with the complete list
//! instead of stopping at the first wrong string.

use std::fmt::Debug;

#[derive(Debug, Default)]
pub struct SoftCheck {
    failures: Vec<String>,
}

impl SoftCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<T: PartialEq + Debug>(&mut self, actual: T, expected: T, context: &str) {
        if actual != expected {
            self.failures.push(format!(
                "{}: expected {:?}, got {:?}",
                context, expected, actual
            ));
        }
    }

    pub fn is_true(&mut self, condition: bool, context: &str) {
        if !condition {
            self.failures.push(context.to_string());
        }
    }

    /// Record a failure when the value is missing, empty, or whitespace.
    pub fn not_blank(&mut self, value: Option<&str>, context: &str) {
        match value {
            Some(v) if !v.trim().is_empty() => {}
            other => self
                .failures
                .push(format!("{}: expected non-blank text, got {:?}", context, other)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Panic with every recorded failure. Call at the end of a test.
    pub fn assert_all(self) {
        if !self.failures.is_empty() {
            panic!(
                "{} soft check(s) failed:\n  - {}",
                self.failures.len(),
                self.failures.join("\n  - ")
            );
        }
    }
}
