//! Selectors for locating elements.
//!
//! A [`Selector`] names one lookup strategy and its expression. Page objects
//! keep their selectors as constants and hand them to the session, which
//! resolves them against the live DOM on every call.

use crate::result::{PageError, PageResult};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., "#Search input[type='search']")
    Css(String),
    /// Anchor whose visible text equals the given string
    LinkText(String),
    /// XPath expression
    XPath(String),
    /// Element id attribute
    Id(String),
}

/// Backend-level query a selector resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorQuery {
    /// Query with `querySelectorAll`
    Css(String),
    /// Query with `document.evaluate`
    XPath(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a link-text selector
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Strategy name, as used in the display form
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::LinkText(_) => "link",
            Self::XPath(_) => "xpath",
            Self::Id(_) => "id",
        }
    }

    /// Raw expression without the strategy prefix
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Css(s) | Self::LinkText(s) | Self::XPath(s) | Self::Id(s) => s,
        }
    }

    /// XPath selecting the `index`-th (zero-based) node matched by `expr`.
    ///
    /// The expression is parenthesized so the position applies to the whole
    /// document-order result set, not to siblings under each parent.
    #[must_use]
    pub fn xpath_nth(expr: &str, index: usize) -> Self {
        Self::XPath(format!("({expr})[{}]", index + 1))
    }

    /// XPath narrowing `expr` to nodes with a descendant `h3/a` whose
    /// normalized text equals `title`.
    #[must_use]
    pub fn xpath_with_heading(expr: &str, title: &str) -> Self {
        Self::XPath(format!(
            "{expr}[descendant::h3/a[normalize-space(text())={}]]",
            xpath_literal(title)
        ))
    }

    /// Reject selectors with a blank expression
    pub fn validate(&self) -> PageResult<()> {
        if self.expression().trim().is_empty() {
            return Err(PageError::InvalidSelector {
                message: format!("empty {} selector", self.kind()),
            });
        }
        Ok(())
    }

    /// Resolve to the query a DOM backend can run
    #[must_use]
    pub fn query(&self) -> SelectorQuery {
        match self {
            Self::Css(s) => SelectorQuery::Css(s.clone()),
            Self::XPath(s) => SelectorQuery::XPath(s.clone()),
            Self::Id(id) => SelectorQuery::Css(format!("[id={}]", css_string(id))),
            Self::LinkText(text) => SelectorQuery::XPath(format!(
                ".//a[normalize-space(.)={}]",
                xpath_literal(text.trim())
            )),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.expression())
    }
}

/// Quote a string as an XPath 1.0 literal.
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// spliced together with `concat()`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value
            .split('\'')
            .map(|part| format!("'{part}'"))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn css_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
