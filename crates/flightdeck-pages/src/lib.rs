//! Page objects for browser tests of the Add-on Builder package search.
//!
//! Tests drive the search page through intent-level calls ("search for
//! term", "sort by", "move the activity slider") instead of raw DOM queries.
//! Every call that changes the result list blocks until the results spinner
//! is gone, so tests always observe a settled page.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────────────┐   ┌──────────────────┐
//! │  Test code   │──►│ SearchPage / SearchResult │──►│ PageContext      │
//! │              │   │ Paginator / Header        │   │  ├ WebSession    │
//! │              │◄──│ EditorPage<K>             │   │  ├ PageConfig    │
//! └──────────────┘   └───────────────────────────┘   │  └ Clock         │
//!                                                    └──────────────────┘
//! ```
//!
//! The session is either the in-memory [`MockSession`] or, with the
//! `browser` feature, a real Chromium driven over CDP.
//!
//! ```
//! use flightdeck_pages::prelude::*;
//!
//! let ctx = TestContext::with_clock(MockSession::new(), PageConfig::default(), ManualClock::new());
//! let page = SearchPage::open(&ctx)?;
//! assert!(page.is_current()?);
//! # Ok::<(), PageError>(())
//! ```

// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod clock;
mod config;
mod context;
mod editor_page;
mod locator;
pub mod logging;
mod mock;
mod page_object;
mod regions;
mod result;
mod search_page;
mod search_result;
mod session;
mod wait;

/// Real browser backend over the Chrome DevTools Protocol
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod cdp;

#[cfg(feature = "browser")]
pub use cdp::{BrowserOptions, ChromiumSession};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    PageConfig, DEFAULT_PACKAGE_SEARCH_TIMEOUT_MS, ENV_BASE_URL, ENV_TIMEOUT_MS,
};
pub use context::{PageContext, TestContext};
pub use editor_page::{AddonEditorPage, EditorPage, LibraryEditorPage};
pub use locator::{xpath_literal, Selector, SelectorQuery};
pub use mock::{MockElement, MockSession};
pub use page_object::{PageObject, UrlMatcher};
pub use regions::{Header, PagePosition, Paginator};
pub use result::{PageError, PageResult};
pub use search_page::{
    locators, parse_count_label, SearchPage, Slider, SEARCH_AJAX_TIMEOUT_MESSAGE, SEARCH_PATH,
};
pub use search_result::{
    ActivityRating, Addon, AddonResult, Library, LibraryResult, PackageKind, ResultLookup,
    SearchResult,
};
pub use session::{ElementRef, WebSession};
pub use wait::{
    WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::cdp::*;
    pub use super::clock::*;
    pub use super::config::*;
    pub use super::context::*;
    pub use super::editor_page::*;
    pub use super::locator::*;
    pub use super::mock::*;
    pub use super::page_object::*;
    pub use super::regions::*;
    pub use super::result::*;
    pub use super::search_page::*;
    pub use super::search_result::*;
    pub use super::session::*;
    pub use super::wait::*;
}
