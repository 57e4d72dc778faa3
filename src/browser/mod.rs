//! Browser automation module
//!
//! This module provides browser control through ChromiumOxide: process
//! lifecycle, navigation, the [`RenderedPage`] capability the scraper core
//! works against, and session ownership with reconnect.

pub mod controller;
pub mod navigation;
pub mod page;
pub mod session;

pub use controller::{BrowserConfig, BrowserController};
pub use navigation::{NavigationOptions, NavigationResult, PageNavigator, WaitUntil};
pub use page::{ChromiumPage, ElementPath, RenderedPage};
pub use session::{ChromiumSessionFactory, SessionController, SessionFactory};
