//! Approval-style visual checkpoints.
//!
//! A checkpoint captures the window and compares its digest against the
//! stored baseline for `(app, test, tag)`. The first capture of a state
//! becomes the baseline; later captures either match it or are kept next to
//! it for manual review.

use crate::browser::CdpClient;
use crate::config::schema::VisualSettings;
use crate::error::{ProbeError, Result};
use md5::{Digest, Md5};
use std::fs;
use std::path::{Path, PathBuf};

/// Hex MD5 digest. Also used for the canvas approval checksums, which hash
/// the exported data-URL string bytes.
pub fn md5_hex(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No baseline existed; this capture was saved as the baseline.
    New,
    Matched,
    Mismatched {
        baseline_digest: String,
        actual_digest: String,
    },
}

impl CheckOutcome {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, CheckOutcome::Mismatched { .. })
    }
}

#[derive(Debug, Clone)]
pub struct CheckRecord {
    pub tag: String,
    pub outcome: CheckOutcome,
}

#[derive(Debug, Clone)]
pub struct VisualReport {
    pub test_name: String,
    pub checks: Vec<CheckRecord>,
}

pub struct VisualRunner {
    app_name: String,
    baseline_dir: PathBuf,
    test_name: Option<String>,
    records: Vec<CheckRecord>,
}

impl VisualRunner {
    pub fn new(app_name: &str, baseline_dir: &Path) -> Self {
        Self {
            app_name: app_name.to_string(),
            baseline_dir: baseline_dir.to_path_buf(),
            test_name: None,
            records: Vec::new(),
        }
    }

    pub fn from_settings(settings: &VisualSettings) -> Self {
        Self::new(&settings.app_name, &settings.baseline_dir)
    }

    /// Begin a batch of checkpoints under one test name.
    pub fn open(&mut self, test_name: &str) {
        self.test_name = Some(test_name.to_string());
        self.records.clear();
        tracing::info!("Visual batch opened: {} / {}", self.app_name, test_name);
    }

    /// Capture the window and compare against the baseline for `tag`.
    pub async fn check_window(&mut self, client: &CdpClient, tag: &str) -> Result<CheckOutcome> {
        let png = client.screenshot_png().await?;
        self.check_bytes(tag, &png)
    }

    /// Digest-compare `bytes` against the stored baseline for `tag`.
    pub fn check_bytes(&mut self, tag: &str, bytes: &[u8]) -> Result<CheckOutcome> {
        let test_name = self.test_name.clone().ok_or_else(|| {
            ProbeError::Visual("check_window called before open".to_string())
        })?;

        let dir = self
            .baseline_dir
            .join(slugify(&self.app_name))
            .join(slugify(&test_name));
        let baseline_path = dir.join(format!("{}.png", slugify(tag)));

        let outcome = if baseline_path.exists() {
            let baseline = fs::read(&baseline_path)?;
            let baseline_digest = md5_hex(&baseline);
            let actual_digest = md5_hex(bytes);
            if baseline_digest == actual_digest {
                CheckOutcome::Matched
            } else {
                let actual_path = dir.join(format!("{}.actual.png", slugify(tag)));
                fs::write(&actual_path, bytes)?;
                tracing::warn!(
                    "Checkpoint {:?} differs from baseline, actual kept at {:?}",
                    tag,
                    actual_path
                );
                CheckOutcome::Mismatched {
                    baseline_digest,
                    actual_digest,
                }
            }
        } else {
            fs::create_dir_all(&dir)?;
            fs::write(&baseline_path, bytes)?;
            tracing::info!("Checkpoint {:?} baseline created at {:?}", tag, baseline_path);
            CheckOutcome::New
        };

        self.records.push(CheckRecord {
            tag: tag.to_string(),
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// End the batch. Fails if any checkpoint mismatched.
    pub fn close(&mut self) -> Result<VisualReport> {
        let test_name = self.test_name.take().ok_or_else(|| {
            ProbeError::Visual("close called without an open batch".to_string())
        })?;
        let checks = std::mem::take(&mut self.records);

        let mismatched: Vec<&str> = checks
            .iter()
            .filter(|r| r.outcome.is_mismatch())
            .map(|r| r.tag.as_str())
            .collect();
        if !mismatched.is_empty() {
            return Err(ProbeError::Visual(format!(
                "{}: checkpoint(s) differ from baseline: {}",
                test_name,
                mismatched.join(", ")
            )));
        }

        Ok(VisualReport { test_name, checks })
    }

    /// Discard an unfinished batch.
    pub fn abort(&mut self) {
        if let Some(test_name) = self.test_name.take() {
            tracing::info!("Visual batch aborted: {}", test_name);
        }
        self.records.clear();
    }
}

/// Filesystem-safe slug: lowercase, alphanumeric runs joined by dashes.
fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
