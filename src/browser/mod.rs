pub mod cdp;
pub mod chrome;
pub mod locator;

pub use cdp::{Browser, CdpClient};
pub use chrome::{allocate_debug_port, build_command, find_chrome, resolve_chrome, LaunchOptions};
pub use locator::Locator;
