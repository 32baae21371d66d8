//! Page context: the capabilities every page object is built on.
//!
//! A [`PageContext`] bundles the browser session, the shared configuration
//! and the clock waits run against. Page objects take the context by
//! reference in their constructors; nothing is held in global state.

use crate::clock::{Clock, SystemClock};
use crate::config::PageConfig;
use crate::locator::Selector;
use crate::result::PageResult;
use crate::session::{ElementRef, WebSession};
use crate::wait::Waiter;

/// Capabilities shared by all page objects
pub trait PageContext {
    /// Browser session type
    type Session: WebSession;

    /// Active browser session
    fn session(&self) -> &Self::Session;

    /// Shared configuration
    fn config(&self) -> &PageConfig;

    /// Time source for waits
    fn clock(&self) -> &dyn Clock;

    /// Default wait timeout in milliseconds
    fn timeout_ms(&self) -> u64 {
        self.config().timeout_ms
    }

    /// Waiter using the default timeout
    fn waiter(&self) -> Waiter<'_> {
        Waiter::new(self.clock(), self.config().wait_options())
    }

    /// First element in the document matching `selector`
    fn find_element(&self, selector: &Selector) -> PageResult<ElementRef> {
        self.session().find_element(None, selector)
    }

    /// All elements in the document matching `selector`
    fn find_elements(&self, selector: &Selector) -> PageResult<Vec<ElementRef>> {
        self.session().find_elements(None, selector)
    }

    /// Whether at least one element matches `selector`
    fn is_element_present(&self, selector: &Selector) -> PageResult<bool> {
        Ok(!self.find_elements(selector)?.is_empty())
    }

    /// Whether the first element matching `selector` exists and is visible
    fn is_element_visible(&self, selector: &Selector) -> PageResult<bool> {
        match self.find_element(selector) {
            Ok(element) => self.session().is_displayed(element),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Context owning a session for the duration of one test
#[derive(Debug)]
pub struct TestContext<S, C = SystemClock> {
    session: S,
    config: PageConfig,
    clock: C,
}

impl<S: WebSession> TestContext<S> {
    /// Context on the wall clock
    pub fn new(session: S, config: PageConfig) -> Self {
        Self::with_clock(session, config, SystemClock::new())
    }
}

impl<S: WebSession, C: Clock> TestContext<S, C> {
    /// Context on a caller-supplied clock
    pub fn with_clock(session: S, config: PageConfig, clock: C) -> Self {
        Self {
            session,
            config,
            clock,
        }
    }

    /// Give the session back, ending the test
    pub fn into_session(self) -> S {
        self.session
    }
}

impl<S: WebSession, C: Clock> PageContext for TestContext<S, C> {
    type Session = S;

    fn session(&self) -> &S {
        &self.session
    }

    fn config(&self) -> &PageConfig {
        &self.config
    }

    fn clock(&self) -> &dyn Clock {
        &self.clock
    }
}
