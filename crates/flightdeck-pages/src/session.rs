//! Abstract browser session.
//!
//! Page objects never talk to a browser directly. They go through
//! [`WebSession`], which lets the same page code run against a real
//! Chromium instance (feature `browser`) or the in-memory
//! [`MockSession`](crate::MockSession) used by unit tests.
//!
//! Sessions are driven from a single test thread, one command at a time,
//! so every method takes `&self`; implementations keep whatever mutable
//! state they need behind interior mutability.

use crate::locator::Selector;
use crate::result::{PageError, PageResult};

/// Opaque handle to an element found by a session.
///
/// Handles are only meaningful to the session that issued them and may go
/// stale once the DOM changes; page objects re-query instead of caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(usize);

impl ElementRef {
    /// Wrap a session-specific element index
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Session-specific element index
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Browser automation surface consumed by the page objects
pub trait WebSession {
    /// Find all elements matching `selector`, searching under `scope` when
    /// given and in the whole document otherwise. An empty result is not an
    /// error.
    fn find_elements(
        &self,
        scope: Option<ElementRef>,
        selector: &Selector,
    ) -> PageResult<Vec<ElementRef>>;

    /// Find the first element matching `selector`.
    fn find_element(&self, scope: Option<ElementRef>, selector: &Selector) -> PageResult<ElementRef> {
        self.find_elements(scope, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| PageError::not_found(selector.to_string()))
    }

    /// Visible text of an element
    fn text(&self, element: ElementRef) -> PageResult<String>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self, element: ElementRef) -> PageResult<bool>;

    /// Click the element
    fn click(&self, element: ElementRef) -> PageResult<()>;

    /// Type text into the element
    fn send_keys(&self, element: ElementRef, text: &str) -> PageResult<()>;

    /// Clear an input element
    fn clear(&self, element: ElementRef) -> PageResult<()>;

    /// Press on the element, move by the offset in pixels, release
    fn drag_by_offset(&self, element: ElementRef, dx: i32, dy: i32) -> PageResult<()>;

    /// Choose the option of a `<select>` whose visible text equals `text`
    fn select_by_visible_text(&self, element: ElementRef, text: &str) -> PageResult<()>;

    /// Visible text of the first selected option of a `<select>`
    fn selected_option_text(&self, element: ElementRef) -> PageResult<String>;

    /// Load `url` in the current tab
    fn navigate(&self, url: &str) -> PageResult<()>;

    /// URL of the current document
    fn current_url(&self) -> PageResult<String>;
}

impl<S: WebSession + ?Sized> WebSession for &S {
    fn find_elements(
        &self,
        scope: Option<ElementRef>,
        selector: &Selector,
    ) -> PageResult<Vec<ElementRef>> {
        (**self).find_elements(scope, selector)
    }

    fn find_element(&self, scope: Option<ElementRef>, selector: &Selector) -> PageResult<ElementRef> {
        (**self).find_element(scope, selector)
    }

    fn text(&self, element: ElementRef) -> PageResult<String> {
        (**self).text(element)
    }

    fn is_displayed(&self, element: ElementRef) -> PageResult<bool> {
        (**self).is_displayed(element)
    }

    fn click(&self, element: ElementRef) -> PageResult<()> {
        (**self).click(element)
    }

    fn send_keys(&self, element: ElementRef, text: &str) -> PageResult<()> {
        (**self).send_keys(element, text)
    }

    fn clear(&self, element: ElementRef) -> PageResult<()> {
        (**self).clear(element)
    }

    fn drag_by_offset(&self, element: ElementRef, dx: i32, dy: i32) -> PageResult<()> {
        (**self).drag_by_offset(element, dx, dy)
    }

    fn select_by_visible_text(&self, element: ElementRef, text: &str) -> PageResult<()> {
        (**self).select_by_visible_text(element, text)
    }

    fn selected_option_text(&self, element: ElementRef) -> PageResult<String> {
        (**self).selected_option_text(element)
    }

    fn navigate(&self, url: &str) -> PageResult<()> {
        (**self).navigate(url)
    }

    fn current_url(&self) -> PageResult<String> {
        (**self).current_url()
    }
}
