//! Driver layer for browser automation.
//!
//! This crate wraps a `fantoccini` WebDriver client with the handful of page
//! operations document retrieval needs.
//!
//! - [`charity_browser::driver::CharityDriver`]: session launch and teardown
//! - [`charity_browser::page::CharityPage`]: navigation, element lookup, capture
//! - [`charity_browser::idle`]: network-idle detection over WebDriver
//! - [`charity_browser::launch`]: Chrome arguments and the launch options
//! - [`charity_browser::locate`]: XPath builders for accessible-name lookups
pub mod charity_browser;
