use crate::config::schema::HarnessConfig;
use crate::error::{ProbeError, Result};

impl HarnessConfig {
    /// Validate the loaded configuration before any browser is launched.
    pub fn validate(&self) -> Result<()> {
        let url = &self.environment.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ProbeError::Validation(format!(
                "Invalid base_url: {}. Must start with http:// or https://",
                url
            )));
        }

        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            return Err(ProbeError::Validation(format!(
                "Window size must be non-zero, got {}x{}",
                self.browser.window_width, self.browser.window_height
            )));
        }

        if self.browser.lang.is_empty() {
            return Err(ProbeError::Validation(
                "Language code cannot be empty".to_string(),
            ));
        }

        for (name, digest) in [
            ("reference_two_years", &self.canvas.reference_two_years),
            ("reference_three_years", &self.canvas.reference_three_years),
        ] {
            if let Some(d) = digest {
                validate_md5_hex(name, d)?;
            }
        }

        if self.visual.app_name.trim().is_empty() {
            return Err(ProbeError::Validation(
                "Visual app_name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_md5_hex(name: &str, digest: &str) -> Result<()> {
    if digest.len() != 32 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProbeError::Validation(format!(
            "Invalid {}: {}. Must be a 32-character hex MD5 digest",
            name, digest
        )));
    }
    Ok(())
}
