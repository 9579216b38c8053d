//! Shared harness for the browser suites.
//!
//! Serves a faithful local copy of the ACME demo app from an in-process HTTP
//! server so the suites run self-contained; point `ACMEPROBE_BASE_URL` at a
//! real deployment to run against it instead. Chrome discovery failures skip
//! the suite rather than failing it.

#![allow(dead_code)]

use acmeprobe::browser::{resolve_chrome, Browser, CdpClient, LaunchOptions};
use acmeprobe::config::load_config;
use acmeprobe::config::schema::BrowserSettings;
use acmeprobe::pages::{DashboardPage, LoginPage};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::sync::oneshot;

/// Chrome for a suite run: the configured path when it exists, discovery
/// otherwise. `None` means the suite is skipped.
pub fn locate_chrome() -> Option<PathBuf> {
    resolve_chrome(&load_config().expect("valid harness config").browser)
}

/// Expected image paths, resolved against whatever base the app is served
/// from (`https://demo.applitools.com/` or the local fixture origin).
pub const LOGO_IMAGE_PATH: &str = "img/logo-big.png";
pub const SOCIAL_ICON_PATHS: [&str; 3] = [
    "img/social-icons/twitter.png",
    "img/social-icons/facebook.png",
    "img/social-icons/linkedin.png",
];
pub const ADVERT_IMAGE_PATHS: [&str; 2] = ["img/flashSale.gif", "img/flashSale2.gif"];

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Resolve a relative app path against a base URL.
pub fn resolve(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// The app under test: `ACMEPROBE_BASE_URL` if set, otherwise a freshly
/// spawned local fixture. Keep the shutdown handle alive for the test.
pub async fn target_app() -> (String, Option<oneshot::Sender<()>>) {
    if let Ok(url) = std::env::var("ACMEPROBE_BASE_URL") {
        if !url.is_empty() {
            return (url, None);
        }
    }
    let (base, shutdown) = spawn_demo_app().await;
    (base, Some(shutdown))
}

/// Spin up the in-process demo app. Returns `(base_url, shutdown_sender)`.
pub async fn spawn_demo_app() -> (String, oneshot::Sender<()>) {
    let app = Router::new()
        .route("/", get(|| async { Html(LOGIN_HTML) }))
        .route("/hackathonApp", get(|| async { Html(DASHBOARD_HTML) }))
        .route("/img/*path", get(serve_image));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base = format!("http://127.0.0.1:{}/", addr.port());

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await
            .ok();
    });

    (base, tx)
}

async fn serve_image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/gif")], PIXEL_GIF)
}

/// A 1x1 transparent GIF, enough for every image slot of the fixture.
const PIXEL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3B,
];

/// RAII browser session: temp profile dir, spawned Chrome, attached client.
pub struct TestBrowser {
    browser: Browser,
    _profile_dir: tempfile::TempDir,
}

impl TestBrowser {
    /// Launch with the default suite settings (headless, 1920x1080).
    pub async fn launch(chrome: PathBuf) -> TestBrowser {
        Self::launch_sized(chrome, 1920, 1080).await
    }

    /// Launch with an explicit window size (the visual suite uses the
    /// original 1024x768 viewport).
    pub async fn launch_sized(chrome: PathBuf, width: u32, height: u32) -> TestBrowser {
        let profile_dir = tempfile::tempdir().expect("failed to create profile dir");

        let mut settings = BrowserSettings::default();
        settings.window_width = width;
        settings.window_height = height;

        let opts =
            LaunchOptions::from_settings(&settings, chrome, profile_dir.path().to_path_buf());
        let browser = Browser::launch(&opts).await.expect("failed to launch Chrome");

        TestBrowser {
            browser,
            _profile_dir: profile_dir,
        }
    }

    pub fn client(&self) -> &CdpClient {
        self.browser.client()
    }

    pub async fn kill(self) {
        let TestBrowser {
            browser,
            _profile_dir,
        } = self;
        let _ = browser.close().await;
    }
}

/// Log in and wait for the dashboard. `query` is appended to the login URL
/// (e.g. `"?showAd=true"`).
pub async fn sign_in<'a>(
    client: &'a CdpClient,
    base: &str,
    query: &str,
    user: &str,
    password: &str,
) -> DashboardPage<'a> {
    let login = LoginPage::open(client, base, query).await.expect("login page");
    login.type_user_name(user).await.expect("type user");
    login.type_password(password).await.expect("type password");
    login.submit().await.expect("submit");

    let dashboard = DashboardPage::new(client);
    dashboard
        .wait_until_loaded()
        .await
        .expect("dashboard to load");
    dashboard
}

// ── fixture HTML ─────────────────────────────────────────────────────────────

pub const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>ACME demo app</title>
<style>
  body { font-family: sans-serif; background: #f2f4f8; margin: 0; }
  .auth-box-w { width: 420px; margin: 40px auto; background: #fff; padding: 30px; }
  .logo-w { text-align: center; padding: 10px; }
  .logo-w img { width: 160px; }
  .alert { background: #fff5cc; border: 1px solid #e0c050; padding: 10px; margin: 10px 0; }
  .form-group { margin: 12px 0; position: relative; }
  .form-control { width: 100%; padding: 8px; box-sizing: border-box; }
  .pre-icon { position: absolute; right: 8px; bottom: 10px; width: 12px; height: 12px; background: #9aa4b8; }
  .buttons-w { margin-top: 16px; }
  .form-check-label { margin-left: 6px; }
  .social-icons { margin-top: 12px; }
  .social-icons img { width: 24px; height: 24px; margin-right: 6px; }
</style>
</head>
<body>
<div class="auth-box-w">
  <div class="logo-w">
    <a href="/"><img src="img/logo-big.png" alt="ACME demo app"></a>
  </div>
  <h4>Login Form</h4>
  <div class="alert alert-warning" id="alertEmpty" style="display: none;"></div>
  <div class="alert alert-warning" id="alertMessage" style="display: none;"></div>
  <form>
    <div class="form-group">
      <label>Username</label>
      <input class="form-control" id="username" type="text" placeholder="Enter your username">
      <div class="pre-icon os-icon os-icon-user-male-circle"></div>
    </div>
    <div class="form-group">
      <label>Password</label>
      <input class="form-control" id="password" type="password" placeholder="Enter your password">
      <div class="pre-icon os-icon os-icon-fingerprint"></div>
    </div>
    <div class="buttons-w">
      <button id="log-in" type="button" onclick="logIn()">Log In</button>
      <input type="checkbox" id="remember">
      <label class="form-check-label" for="remember">Remember Me</label>
      <div class="social-icons">
        <a href="https://twitter.com/acme"><img src="img/social-icons/twitter.png" alt="Twitter"></a>
        <a href="https://www.facebook.com/acme"><img src="img/social-icons/facebook.png" alt="Facebook"></a>
        <a href="https://www.linkedin.com/company/acme"><img src="img/social-icons/linkedin.png" alt="LinkedIn"></a>
      </div>
    </div>
  </form>
</div>
<script>
  function logIn() {
    var username = document.getElementById('username').value;
    var password = document.getElementById('password').value;
    var alertBox = document.getElementById('alertMessage');
    var message = '';
    if (username === '' && password === '') {
      message = 'Both Username and Password must be present';
    } else if (password === '') {
      message = 'Password must be present';
    } else if (username === '') {
      message = 'Username must be present';
    }
    if (message !== '') {
      alertBox.innerText = message;
      alertBox.style.display = 'block';
      return;
    }
    window.location.href = 'hackathonApp' + window.location.search;
  }
</script>
</body>
</html>"#;

pub const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>ACME demo app</title>
<style>
  body { font-family: sans-serif; background: #f2f4f8; margin: 0; padding: 12px; }
  .element-balances { display: flex; }
  .balance { background: #fff; margin: 8px; padding: 12px; min-width: 160px; }
  .balance-title { color: #6c757d; font-size: 13px; }
  .balance-value { font-size: 22px; }
  table { border-collapse: collapse; background: #fff; width: 95%; margin: 16px 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 8px 12px; text-align: left; }
  th { cursor: pointer; color: #6c757d; }
  #showExpensesChart { margin: 8px; }
  #expenses { display: none; margin: 16px 8px; background: #fff; padding: 12px; }
</style>
</head>
<body>
<div class="element-balances">
  <div class="balance">
    <div class="balance-title">Total Balance</div>
    <div class="balance-value">$350</div>
  </div>
  <div class="balance">
    <div class="balance-title">Credit Available</div>
    <div class="balance-value">$17,800</div>
  </div>
  <div class="balance balance-ad">
    <img src="img/flashSale.gif" width="180" height="100" alt="Flash sale">
  </div>
  <div class="balance balance-ad">
    <img src="img/flashSale2.gif" width="180" height="100" alt="Flash sale, part two">
  </div>
</div>
<button id="showExpensesChart" type="button">Compare Expenses</button>
<div id="expenses">
  <canvas id="canvas" width="800" height="400"></canvas>
  <div><button id="addDataset" type="button">Show data for next year</button></div>
</div>
<table id="transactionsTable">
  <thead>
    <tr>
      <th id="status">Status</th>
      <th id="date">Date</th>
      <th id="description">Description</th>
      <th id="category">Category</th>
      <th id="amount">Amount</th>
    </tr>
  </thead>
  <tbody>
    <tr><td>Complete</td><td>Today 1:52am</td><td>Starbucks coffee</td><td>Restaurant / Cafe</td><td>+ 1,250.00 USD</td></tr>
    <tr><td>Declined</td><td>Jan 19th, 3:22pm</td><td>Stripe Payment Processing</td><td>Finance</td><td>+ 952.23 USD</td></tr>
    <tr><td>Pending</td><td>Yesterday 7:45am</td><td>MailChimp Services</td><td>Software</td><td>- 320.00 USD</td></tr>
    <tr><td>Complete</td><td>Jan 23rd, 2:07pm</td><td>Shopify product</td><td>Shopping</td><td>- 17.99 USD</td></tr>
    <tr><td>Pending</td><td>Jan 9th, 7:45pm</td><td>Templates Inc</td><td>Business</td><td>+ 340.00 USD</td></tr>
    <tr><td>Complete</td><td>Jan 7th, 9:51am</td><td>Car Insurance</td><td>Insurance</td><td>- 251.00 USD</td></tr>
    <tr><td>Complete</td><td>Dec 21st, 4:38pm</td><td>Ordered iPhone cover</td><td>Shopping</td><td>- 5.98 USD</td></tr>
    <tr><td>Declined</td><td>Dec 18th, 11:40am</td><td>Amazon Payment</td><td>Shopping</td><td>+ 2,100.98 USD</td></tr>
  </tbody>
</table>
<script>
  (function() {
    var params = new URLSearchParams(window.location.search);
    if (params.get('showAd') !== 'true') {
      Array.prototype.slice.call(document.querySelectorAll('.balance-ad')).forEach(function(el) {
        el.remove();
      });
    }

    function amountValue(text) {
      return parseFloat(text.slice(0, -4).replace(/[, ]/g, ''));
    }

    document.getElementById('amount').addEventListener('click', function() {
      var tbody = document.querySelector('#transactionsTable tbody');
      var rows = Array.prototype.slice.call(tbody.querySelectorAll('tr'));
      rows.sort(function(a, b) {
        return amountValue(a.cells[4].innerText) - amountValue(b.cells[4].innerText);
      });
      rows.forEach(function(row) { tbody.appendChild(row); });
    });

    var CHART_DATA = {
      2017: [10, 25, 40, 35, 20, 45, 30, 15, 50, 38, 22, 18],
      2018: [15, 30, 22, 48, 36, 28, 42, 19, 33, 25, 47, 29],
      2019: [24, 18, 36, 27, 49, 31, 23, 44, 29, 37, 21, 40]
    };
    var COLORS = { 2017: '#1f3a93', 2018: '#26a65b', 2019: '#f39c12' };
    var activeYears = [2017, 2018];

    function drawChart() {
      var canvas = document.getElementById('canvas');
      var ctx = canvas.getContext('2d');
      ctx.fillStyle = '#ffffff';
      ctx.fillRect(0, 0, canvas.width, canvas.height);
      for (var month = 0; month < 12; month++) {
        for (var yi = 0; yi < activeYears.length; yi++) {
          var year = activeYears[yi];
          var value = CHART_DATA[year][month];
          ctx.fillStyle = COLORS[year];
          var x = 20 + month * 64 + yi * 18;
          var barHeight = value * 6;
          ctx.fillRect(x, canvas.height - 20 - barHeight, 16, barHeight);
        }
      }
    }

    document.getElementById('showExpensesChart').addEventListener('click', function() {
      document.getElementById('expenses').style.display = 'block';
      drawChart();
    });

    document.getElementById('addDataset').addEventListener('click', function() {
      if (activeYears.indexOf(2019) === -1) { activeYears.push(2019); }
      drawChart();
    });
  })();
</script>
</body>
</html>"#;
