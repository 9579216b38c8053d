//! The login page of the demo app.

use crate::browser::{CdpClient, Locator};
use crate::error::{ProbeError, Result};
use crate::pages::items::{ButtonsPanel, FormField};

const EMPTY_ALERT_ID: &str = "alertEmpty";

const ALERT_SELECTOR: &str = ".alert";
const BUTTONS_SECTION_SELECTOR: &str = ".buttons-w";
const FORM_GROUP_SELECTOR: &str = "form .form-group";
const HEADER_SELECTOR: &str = "h4";
const LOGIN_FORM_SELECTOR: &str = "form";
const LOGO_IMAGE_SELECTOR: &str = ".logo-w img";

pub struct LoginPage<'a> {
    client: &'a CdpClient,
}

impl<'a> LoginPage<'a> {
    /// Navigate to the login page and wait for the form to render.
    /// `query_string` is appended verbatim (e.g. `"?showAd=true"`).
    pub async fn open(
        client: &'a CdpClient,
        base_url: &str,
        query_string: &str,
    ) -> Result<LoginPage<'a>> {
        client
            .navigate(&format!("{}{}", base_url, query_string))
            .await?;
        let page = LoginPage { client };
        client
            .wait_for_js(
                &format!(
                    "document.querySelector('{}') !== null",
                    LOGIN_FORM_SELECTOR
                ),
                "login form to render",
            )
            .await?;
        Ok(page)
    }

    pub async fn header_text(&self) -> Result<String> {
        self.client.text(&Locator::css(HEADER_SELECTOR)).await
    }

    pub async fn logo_image_url(&self) -> Result<String> {
        self.client
            .resolved_src(&Locator::css(LOGO_IMAGE_SELECTOR))
            .await
    }

    pub async fn logo_alt(&self) -> Result<Option<String>> {
        self.client
            .attr(&Locator::css(LOGO_IMAGE_SELECTOR), "alt")
            .await
    }

    /// Texts of the visible alerts. The `#alertEmpty` placeholder and
    /// anything hidden with an inline `display: none` do not count.
    pub async fn alerts(&self) -> Result<Vec<String>> {
        self.client.eval_json(&Self::alerts_js()).await
    }

    /// Wait until exactly one alert is showing.
    pub async fn wait_for_single_alert(&self) -> Result<()> {
        self.client
            .wait_for_js(
                &format!("{}.length === 1", Self::alerts_js()),
                "a single alert to show",
            )
            .await
    }

    fn alerts_js() -> String {
        format!(
            "(function() {{ return Array.from(document.querySelectorAll('{}')) \
             .filter(function(el) {{ return el.id !== '{}' && el.style.display !== 'none'; }}) \
             .map(function(el) {{ return (el.innerText || '').trim(); }}); }})()",
            ALERT_SELECTOR, EMPTY_ALERT_ID
        )
    }

    pub async fn form_fields(&self) -> Result<Vec<FormField<'a>>> {
        let count = self.client.count(&Locator::css(FORM_GROUP_SELECTOR)).await?;
        Ok((0..count)
            .map(|i| FormField::new(self.client, Locator::css(FORM_GROUP_SELECTOR).nth(i)))
            .collect())
    }

    /// The form field whose input carries the given id.
    pub async fn form_field(&self, input_id: &str) -> Result<FormField<'a>> {
        for field in self.form_fields().await? {
            if field.input_id().await?.as_deref() == Some(input_id) {
                return Ok(field);
            }
        }
        Err(ProbeError::ElementNotFound(format!(
            "form field with input id {:?}",
            input_id
        )))
    }

    pub fn buttons(&self) -> ButtonsPanel<'a> {
        ButtonsPanel::new(self.client, Locator::css(BUTTONS_SECTION_SELECTOR))
    }

    pub async fn type_user_name(&self, value: &str) -> Result<()> {
        self.form_field("username").await?.type_text(value).await
    }

    pub async fn type_password(&self, value: &str) -> Result<()> {
        self.form_field("password").await?.type_text(value).await
    }

    pub async fn submit(&self) -> Result<()> {
        self.buttons().press_submit().await
    }
}
