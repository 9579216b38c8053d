//! Reusable page fragments: form groups, the button panel, table rows,
//! advert balances.

use crate::amount::parse_amount;
use crate::browser::{CdpClient, Locator};
use crate::error::{ProbeError, Result};
use serde::Deserialize;

/// Column order of the transactions table.
pub const TRANSACTION_COLUMNS: [&str; 5] =
    ["status", "date", "description", "category", "amount"];

const INPUT_SELECTOR: &str = ".form-control";
const ICON_SELECTOR: &str = ".os-icon";
const LABEL_SELECTOR: &str = "label";
const SUBMIT_SELECTOR: &str = "button";
const REMEMBER_CHECKBOX_SELECTOR: &str = ".form-check-label";
const SOCIAL_ICON_SELECTOR: &str = "a > img";

/// One `.form-group` of the login form: a label, an input, and an icon.
pub struct FormField<'a> {
    client: &'a CdpClient,
    root: Locator,
}

impl<'a> FormField<'a> {
    pub(crate) fn new(client: &'a CdpClient, root: Locator) -> Self {
        Self { client, root }
    }

    pub async fn label(&self) -> Result<String> {
        self.client.text(&self.root.clone().child(LABEL_SELECTOR)).await
    }

    pub async fn placeholder(&self) -> Result<Option<String>> {
        self.client
            .attr(&self.root.clone().child(INPUT_SELECTOR), "placeholder")
            .await
    }

    pub async fn input_id(&self) -> Result<Option<String>> {
        self.client
            .attr(&self.root.clone().child(INPUT_SELECTOR), "id")
            .await
    }

    /// The concrete icon class: last token of the icon element's class list.
    pub async fn icon_class(&self) -> Result<String> {
        let classes = self
            .client
            .attr(&self.root.clone().child(ICON_SELECTOR), "class")
            .await?
            .unwrap_or_default();
        classes
            .split_whitespace()
            .last()
            .map(str::to_string)
            .ok_or_else(|| {
                ProbeError::ElementNotFound(format!("icon class in {}", self.root.describe()))
            })
    }

    /// Clear the field and type the value.
    pub async fn type_text(&self, value: &str) -> Result<()> {
        self.client
            .clear_and_type(&self.root.clone().child(INPUT_SELECTOR), value)
            .await
    }
}

/// The `.buttons-w` panel under the login form.
pub struct ButtonsPanel<'a> {
    client: &'a CdpClient,
    root: Locator,
}

impl<'a> ButtonsPanel<'a> {
    pub(crate) fn new(client: &'a CdpClient, root: Locator) -> Self {
        Self { client, root }
    }

    pub async fn submit_button_text(&self) -> Result<String> {
        self.client.text(&self.root.clone().child(SUBMIT_SELECTOR)).await
    }

    pub async fn checkbox_text(&self) -> Result<String> {
        self.client
            .text(&self.root.clone().child(REMEMBER_CHECKBOX_SELECTOR))
            .await
    }

    pub async fn social_icons(&self) -> Result<Vec<SocialIcon>> {
        let expr = format!(
            "(function() {{ var root = {}; if (root === null) return null; \
             return Array.from(root.querySelectorAll('{}')).map(function(img) {{ \
               return {{ src: String(img.src), alt: img.getAttribute('alt') }}; \
             }}); }})()",
            self.root.js_element(),
            SOCIAL_ICON_SELECTOR
        );
        self.client
            .eval_json::<Option<Vec<SocialIcon>>>(&expr)
            .await?
            .ok_or_else(|| ProbeError::ElementNotFound(self.root.describe()))
    }

    pub async fn press_submit(&self) -> Result<()> {
        self.client.click(&self.root.clone().child(SUBMIT_SELECTOR)).await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SocialIcon {
    #[serde(rename = "src")]
    pub image_url: String,
    #[serde(rename = "alt")]
    pub accessibility_text: Option<String>,
}

/// One row of the transactions table, cells as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub status: String,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: String,
}

impl Transaction {
    pub fn from_cells(cells: &[String]) -> Result<Self> {
        if cells.len() < TRANSACTION_COLUMNS.len() {
            return Err(ProbeError::ElementNotFound(format!(
                "transaction row with {} cells, expected {}",
                cells.len(),
                TRANSACTION_COLUMNS.len()
            )));
        }
        Ok(Self {
            status: cells[0].clone(),
            date: cells[1].clone(),
            description: cells[2].clone(),
            category: cells[3].clone(),
            amount: cells[4].clone(),
        })
    }

    /// Numeric amount in cents, for ordering.
    pub fn amount_cents(&self) -> Result<i64> {
        parse_amount(&self.amount)
    }
}

/// A balance entry that turned out to be an advert (it contains an image).
#[derive(Debug, Clone, Deserialize)]
pub struct Advert {
    #[serde(rename = "src")]
    pub image_url: String,
    #[serde(rename = "displayed")]
    pub is_displayed: bool,
}
