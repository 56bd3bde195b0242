//! # Share Widget Library
//!
//! Core of an embeddable share widget: resolves token-gated short links
//! through a remote issuing service, coordinates the selected gift amount
//! against the visitor's credit balance, renders per-channel outbound links,
//! manages one popup per destination and attaches a claimed share code to
//! the page's own address.
//!
//! Modules:
//! - `config` — settings file, per-widget share configuration
//! - `catalog` — channel URL templates
//! - `client` — issuing service client and its memoization cache
//! - `host` — page abstraction (markup view-model, windows, clipboard, address bar)
//! - `widget` — the widget controller and its coordinators

pub mod catalog;
pub mod client;
pub mod config;
pub mod helpers;
pub mod host;
pub mod observability;
pub mod tests;
pub mod utils;
pub mod widget;


pub use crate::catalog::templates::Channel;
pub use crate::client::short_link::{ResolvedShareLink, ShareContext, ShortLinkClient};
pub use crate::config::share::{ShareConfig, ShareConfigOverrides};
pub use crate::widget::share::{Share, ShareServices};
