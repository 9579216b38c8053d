//! The customer dashboard: transactions table, expense chart, adverts.

use crate::browser::{CdpClient, Locator};
use crate::error::{ProbeError, Result};
use crate::pages::items::{Advert, Transaction};
use std::time::{Duration, Instant};

const TRANSACTIONS_TABLE_SELECTOR: &str = "#transactionsTable";
const AMOUNTS_HEADER_SELECTOR: &str = "#amount";
const TABLE_ROW_SELECTOR: &str = "tbody > tr";
const COMPARE_EXPENSES_SELECTOR: &str = "#showExpensesChart";
const SHOW_NEXT_YEAR_SELECTOR: &str = "#addDataset";
const CANVAS_SELECTOR: &str = "#canvas";
const BALANCE_SELECTOR: &str = ".element-balances > .balance";

const LOADED_POLL_MS: u64 = 100;
const LOADED_TIMEOUT_MS: u64 = 10_000;

pub struct DashboardPage<'a> {
    client: &'a CdpClient,
}

impl<'a> DashboardPage<'a> {
    pub fn new(client: &'a CdpClient) -> Self {
        Self { client }
    }

    /// The dashboard counts as loaded once the amounts column header of the
    /// transactions table is on screen.
    pub async fn is_loaded(&self) -> Result<bool> {
        self.client
            .is_displayed(
                &Locator::css(TRANSACTIONS_TABLE_SELECTOR).child(AMOUNTS_HEADER_SELECTOR),
            )
            .await
    }

    /// Poll until loaded. Evaluation errors are expected while the login
    /// navigation is still in flight and count as "not yet".
    pub async fn wait_until_loaded(&self) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(LOADED_TIMEOUT_MS);
        loop {
            if matches!(self.is_loaded().await, Ok(true)) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ProbeError::Timeout("dashboard to load".to_string()));
            }
            tokio::time::sleep(Duration::from_millis(LOADED_POLL_MS)).await;
        }
    }

    /// All rows of the transactions table, in display order.
    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        let expr = format!(
            "(function() {{ var table = document.querySelector('{}'); if (!table) return null; \
             return Array.from(table.querySelectorAll('{}')).map(function(tr) {{ \
               return Array.from(tr.querySelectorAll('td')).map(function(td) {{ \
                 return (td.innerText || '').trim(); }}); }}); }})()",
            TRANSACTIONS_TABLE_SELECTOR, TABLE_ROW_SELECTOR
        );
        let rows: Option<Vec<Vec<String>>> = self.client.eval_json(&expr).await?;
        let rows = rows.ok_or_else(|| {
            ProbeError::ElementNotFound(TRANSACTIONS_TABLE_SELECTOR.to_string())
        })?;
        rows.iter().map(|cells| Transaction::from_cells(cells)).collect()
    }

    /// Click the amounts header; the table sorts ascending by amount.
    pub async fn order_by_amount(&self) -> Result<()> {
        self.client
            .click(&Locator::css(TRANSACTIONS_TABLE_SELECTOR).child(AMOUNTS_HEADER_SELECTOR))
            .await
    }

    pub async fn view_expense_chart(&self) -> Result<()> {
        self.client
            .click(&Locator::css(COMPARE_EXPENSES_SELECTOR))
            .await
    }

    pub async fn include_another_year(&self) -> Result<()> {
        self.client.click(&Locator::css(SHOW_NEXT_YEAR_SELECTOR)).await
    }

    /// The expense chart canvas exported as a PNG data URL.
    pub async fn canvas_export(&self) -> Result<String> {
        self.client.canvas_data_url(&Locator::css(CANVAS_SELECTOR)).await
    }

    /// Balance entries that carry an image are adverts.
    pub async fn adverts(&self) -> Result<Vec<Advert>> {
        let expr = format!(
            "(function() {{ return Array.from(document.querySelectorAll('{}')) \
             .map(function(b) {{ var img = b.querySelector('img'); if (!img) return null; \
               var r = img.getBoundingClientRect(); \
               return {{ src: String(img.src), displayed: r.width > 0 && r.height > 0 }}; }}) \
             .filter(function(x) {{ return x !== null; }}); }})()",
            BALANCE_SELECTOR
        );
        self.client.eval_json(&expr).await
    }
}
