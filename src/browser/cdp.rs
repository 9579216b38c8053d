//! DevTools-protocol client and browser session lifecycle.
//!
//! One WebSocket per session, commands correlated to responses by id. All
//! element operations compile a [`Locator`](super::Locator) into a single
//! `Runtime.evaluate` round-trip.

use crate::browser::chrome::{build_command, LaunchOptions};
use crate::browser::locator::Locator;
use crate::error::{ProbeError, Result};
use base64::Engine as _;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::Child;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};

/// Explicit waits poll against this deadline unless stated otherwise.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

const COMMAND_TIMEOUT_SECS: u64 = 30;
const POLL_INTERVAL_MS: u64 = 100;
const ATTACH_RETRIES: u32 = 30;
const ATTACH_RETRY_DELAY_MS: u64 = 500;

type WsSink = futures::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    WsMessage,
>;

/// A running Chrome plus the client attached to its page target.
pub struct Browser {
    child: Child,
    client: CdpClient,
    killed: bool,
}

impl Browser {
    /// Spawn Chrome with the given options and attach to its first page
    /// target once the DevTools endpoint answers.
    pub async fn launch(opts: &LaunchOptions) -> Result<Browser> {
        let child = build_command(opts)
            .spawn()
            .map_err(|e| ProbeError::Browser(format!("Failed to launch Chrome: {}", e)))?;

        tracing::info!(
            "Launched Chrome (pid {}) on debug port {}",
            child.id(),
            opts.debug_port
        );

        match CdpClient::attach(opts.debug_port).await {
            Ok(client) => Ok(Browser {
                child,
                client,
                killed: false,
            }),
            Err(e) => {
                let mut child = child;
                let _ = child.kill();
                let _ = child.wait();
                Err(e)
            }
        }
    }

    pub fn client(&self) -> &CdpClient {
        &self.client
    }

    /// Tear down the WebSocket and kill the Chrome process.
    pub async fn close(mut self) -> Result<()> {
        self.client.close().await;
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.killed = true;
        Ok(())
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        if !self.killed {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// DevTools client over a raw WebSocket.
pub struct CdpClient {
    ws_tx: Option<Arc<Mutex<WsSink>>>,
    responses: Arc<Mutex<HashMap<u64, tokio::sync::oneshot::Sender<Value>>>>,
    msg_id: AtomicU64,
}

impl CdpClient {
    /// Connect to the page target of a Chrome listening on `port`.
    /// Polls the target list until Chrome is ready to accept connections.
    pub async fn attach(port: u16) -> Result<CdpClient> {
        let list_url = format!("http://127.0.0.1:{}/json/list", port);
        let mut last_error = String::new();

        for retry in 0..ATTACH_RETRIES {
            tokio::time::sleep(Duration::from_millis(ATTACH_RETRY_DELAY_MS)).await;

            let targets = match reqwest::get(&list_url).await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<Value>().await {
                        Ok(v) => v,
                        Err(e) => {
                            last_error = format!("Failed to parse targets response: {}", e);
                            continue;
                        }
                    }
                }
                Ok(response) => {
                    last_error = format!("HTTP error: {}", response.status());
                    continue;
                }
                Err(e) => {
                    last_error = format!("Connection error: {}", e);
                    tracing::debug!("Attach retry {}/{}: {}", retry + 1, ATTACH_RETRIES, last_error);
                    continue;
                }
            };

            let ws_url = targets
                .as_array()
                .and_then(|arr| {
                    arr.iter()
                        .find(|t| t.get("type").and_then(Value::as_str) == Some("page"))
                })
                .and_then(|t| t.get("webSocketDebuggerUrl").and_then(Value::as_str))
                .map(str::to_string);

            let Some(ws_url) = ws_url else {
                last_error = "No page target with a webSocketDebuggerUrl".to_string();
                continue;
            };

            match connect_async(ws_url.as_str()).await {
                Ok((ws_stream, _)) => {
                    let (tx, rx) = ws_stream.split();
                    let responses: Arc<Mutex<HashMap<u64, tokio::sync::oneshot::Sender<Value>>>> =
                        Arc::new(Mutex::new(HashMap::new()));

                    Self::spawn_reader(rx, Arc::clone(&responses));

                    let client = CdpClient {
                        ws_tx: Some(Arc::new(Mutex::new(tx))),
                        responses,
                        msg_id: AtomicU64::new(1),
                    };

                    client.send_command("Page.enable", json!({})).await?;
                    client.send_command("Runtime.enable", json!({})).await?;

                    tracing::info!("Attached to page target on port {}", port);
                    return Ok(client);
                }
                Err(e) => {
                    last_error = format!("Failed to connect WebSocket: {}", e);
                }
            }
        }

        Err(ProbeError::Browser(format!(
            "Failed to attach to Chrome after {} retries: {}",
            ATTACH_RETRIES, last_error
        )))
    }

    fn spawn_reader(
        mut rx: futures::stream::SplitStream<
            tokio_tungstenite::WebSocketStream<
                tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
            >,
        >,
        responses: Arc<Mutex<HashMap<u64, tokio::sync::oneshot::Sender<Value>>>>,
    ) {
        tokio::spawn(async move {
            while let Some(msg) = rx.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => {
                        if let Ok(json) = serde_json::from_str::<Value>(&text) {
                            if let Some(id) = json.get("id").and_then(Value::as_u64) {
                                if let Some(sender) = responses.lock().await.remove(&id) {
                                    let _ = sender.send(json);
                                }
                            }
                        }
                    }
                    Ok(WsMessage::Close(_)) => {
                        tracing::debug!("DevTools WebSocket closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!("DevTools WebSocket error: {:?}", e);
                        break;
                    }
                    _ => {}
                }
            }
        });
    }

    /// Send one command and wait for its response. Returns the `result`
    /// payload; protocol-level errors become typed errors.
    async fn send_command(&self, method: &str, params: Value) -> Result<Value> {
        let tx = self
            .ws_tx
            .as_ref()
            .ok_or_else(|| ProbeError::Browser("WebSocket not connected".to_string()))?;

        let id = self.msg_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = tokio::sync::oneshot::channel();
        self.responses.lock().await.insert(id, sender);

        let command = json!({
            "id": id,
            "method": method,
            "params": params
        });

        {
            let mut tx_guard = tx.lock().await;
            tx_guard
                .send(WsMessage::Text(command.to_string()))
                .await
                .map_err(|e| ProbeError::Browser(format!("Failed to send {}: {}", method, e)))?;
        }

        let response =
            match tokio::time::timeout(Duration::from_secs(COMMAND_TIMEOUT_SECS), receiver).await {
                Ok(Ok(response)) => response,
                Ok(Err(_)) => {
                    return Err(ProbeError::Browser(format!(
                        "Response channel closed for {}",
                        method
                    )))
                }
                Err(_) => {
                    self.responses.lock().await.remove(&id);
                    return Err(ProbeError::Timeout(format!("{} command", method)));
                }
            };

        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown protocol error");
            return Err(ProbeError::Browser(format!("{}: {}", method, message)));
        }

        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Evaluate a JavaScript expression and return its value.
    /// Page-side exceptions surface as [`ProbeError::Script`].
    pub async fn eval(&self, expression: &str) -> Result<Value> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true
                }),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let description = exception
                .get("exception")
                .and_then(|e| e.get("description"))
                .and_then(Value::as_str)
                .or_else(|| exception.get("text").and_then(Value::as_str))
                .unwrap_or("unknown exception");
            return Err(ProbeError::Script(description.to_string()));
        }

        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Evaluate an expression and deserialize its JSON value.
    pub async fn eval_json<T: DeserializeOwned>(&self, expression: &str) -> Result<T> {
        let value = self.eval(expression).await?;
        serde_json::from_value(value)
            .map_err(|e| ProbeError::Script(format!("Unexpected evaluation result: {}", e)))
    }

    /// Navigate and wait for the document to finish loading.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        // Stamp the outgoing document. The stamp disappears with it, so the
        // readyState poll below cannot pass against the page being left --
        // re-navigating to the current URL included.
        self.eval("window.__leavingPage = true; true").await?;

        let result = self
            .send_command("Page.navigate", json!({ "url": url }))
            .await?;
        if let Some(error_text) = result.get("errorText").and_then(Value::as_str) {
            if !error_text.is_empty() {
                return Err(ProbeError::Browser(format!(
                    "Navigation to {} failed: {}",
                    url, error_text
                )));
            }
        }

        self.wait_for_js(
            "window.__leavingPage === undefined && document.readyState === 'complete'",
            &format!("load of {}", url),
        )
        .await?;
        tracing::info!("Navigated to: {}", url);
        Ok(())
    }

    pub async fn title(&self) -> Result<String> {
        let value = self.eval("document.title").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    pub async fn current_url(&self) -> Result<String> {
        let value = self.eval("window.location.href").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Rendered text of the element, trimmed.
    pub async fn text(&self, locator: &Locator) -> Result<String> {
        let expr = format!(
            "(function() {{ var el = {}; if (el === null) return null; \
             return ((el.innerText !== undefined ? el.innerText : el.textContent) || '').trim(); }})()",
            locator.js_element()
        );
        match self.eval(&expr).await? {
            Value::Null => Err(ProbeError::ElementNotFound(locator.describe())),
            v => Ok(v.as_str().unwrap_or_default().to_string()),
        }
    }

    /// Raw attribute value; `None` when the attribute is absent.
    pub async fn attr(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let name_js = js_string(name);
        let expr = format!(
            "(function() {{ var el = {}; if (el === null) return '__no_element__'; \
             var v = el.getAttribute({}); return v === null ? null : String(v); }})()",
            locator.js_element(),
            name_js
        );
        match self.eval(&expr).await? {
            Value::Null => Ok(None),
            Value::String(s) if s == "__no_element__" => {
                Err(ProbeError::ElementNotFound(locator.describe()))
            }
            v => Ok(Some(v.as_str().unwrap_or_default().to_string())),
        }
    }

    /// Fully-resolved `src` of an image element.
    pub async fn resolved_src(&self, locator: &Locator) -> Result<String> {
        let expr = format!(
            "(function() {{ var el = {}; if (el === null || el.src === undefined) return null; \
             return String(el.src); }})()",
            locator.js_element()
        );
        match self.eval(&expr).await? {
            Value::Null => Err(ProbeError::ElementNotFound(locator.describe())),
            v => Ok(v.as_str().unwrap_or_default().to_string()),
        }
    }

    /// Number of matches of the locator's last segment.
    pub async fn count(&self, locator: &Locator) -> Result<usize> {
        let value = self.eval(&locator.js_count()).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    /// Whether the element exists and occupies a non-empty rect.
    /// A missing element is simply not displayed.
    pub async fn is_displayed(&self, locator: &Locator) -> Result<bool> {
        let expr = format!(
            "(function() {{ var el = {}; if (el === null) return false; \
             var r = el.getBoundingClientRect(); return r.width > 0 && r.height > 0; }})()",
            locator.js_element()
        );
        let value = self.eval(&expr).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn click(&self, locator: &Locator) -> Result<()> {
        let expr = format!(
            "(function() {{ var el = {}; if (el === null) return false; el.click(); return true; }})()",
            locator.js_element()
        );
        let value = self.eval(&expr).await?;
        if value.as_bool().unwrap_or(false) {
            tracing::debug!("Clicked {}", locator.describe());
            Ok(())
        } else {
            Err(ProbeError::ElementNotFound(locator.describe()))
        }
    }

    /// Clear the field, then set the new value with synthetic `input` and
    /// `change` events so framework listeners fire.
    pub async fn clear_and_type(&self, locator: &Locator, text: &str) -> Result<()> {
        let text_js = js_string(text);
        let expr = format!(
            "(function() {{ var el = {}; if (el === null) return false; \
             el.focus(); el.value = ''; el.value = {}; \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); return true; }})()",
            locator.js_element(),
            text_js
        );
        let value = self.eval(&expr).await?;
        if value.as_bool().unwrap_or(false) {
            tracing::debug!("Typed into {}", locator.describe());
            Ok(())
        } else {
            Err(ProbeError::ElementNotFound(locator.describe()))
        }
    }

    /// PNG export of a canvas element as a data URL string.
    pub async fn canvas_data_url(&self, locator: &Locator) -> Result<String> {
        let expr = format!(
            "(function() {{ var el = {}; if (el === null) return null; \
             if (typeof el.toDataURL !== 'function') return '__not_canvas__'; \
             return el.toDataURL('image/png'); }})()",
            locator.js_element()
        );
        match self.eval(&expr).await? {
            Value::Null => Err(ProbeError::ElementNotFound(locator.describe())),
            Value::String(s) if s == "__not_canvas__" => Err(ProbeError::Script(format!(
                "{} is not a canvas element",
                locator.describe()
            ))),
            v => Ok(v.as_str().unwrap_or_default().to_string()),
        }
    }

    /// Full-page screenshot as PNG bytes.
    pub async fn screenshot_png(&self) -> Result<Vec<u8>> {
        let result = self
            .send_command("Page.captureScreenshot", json!({ "format": "png" }))
            .await?;

        let data = result
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::Browser("Screenshot returned no data".to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| ProbeError::Browser(format!("Screenshot is not valid base64: {}", e)))
    }

    /// Drop focus from whatever element holds it. Keeps a blinking caret out
    /// of screenshots taken after typing.
    pub async fn blur_active_element(&self) -> Result<()> {
        self.eval(
            "(function() { if (document.activeElement && document.activeElement.blur) \
             document.activeElement.blur(); return true; })()",
        )
        .await?;
        Ok(())
    }

    /// Poll a boolean expression until it is true or the deadline passes.
    /// Evaluation errors while a navigation is in flight count as "not yet".
    pub async fn wait_for_js(&self, expression: &str, what: &str) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS);
        loop {
            match self.eval(expression).await {
                Ok(value) if value.as_bool().unwrap_or(false) => return Ok(()),
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Wait poll for {} errored, retrying: {}", what, e);
                }
            }
            if Instant::now() >= deadline {
                return Err(ProbeError::Timeout(what.to_string()));
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    pub async fn wait_for_url_contains(&self, needle: &str) -> Result<()> {
        let expr = format!(
            "window.location.href.indexOf({}) !== -1",
            js_string(needle)
        );
        self.wait_for_js(&expr, &format!("URL containing {:?}", needle))
            .await
    }

    /// Close the WebSocket. The owning [`Browser`] kills the process.
    pub async fn close(&mut self) {
        if let Some(tx) = self.ws_tx.take() {
            let mut tx_guard = tx.lock().await;
            let _ = tx_guard.close().await;
        }
    }
}

/// Encode a Rust string as a JavaScript string literal.
fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
