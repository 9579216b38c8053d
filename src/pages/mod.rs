//! Page objects for the ACME demo app.
//!
//! Locator tables live beside the page they belong to; everything the suites
//! touch goes through a semantic accessor, never a raw selector.

pub mod dashboard;
pub mod items;
pub mod login;

pub use dashboard::DashboardPage;
pub use items::{Advert, ButtonsPanel, FormField, SocialIcon, Transaction};
pub use login::LoginPage;
