//! Regions shared by several pages: the site header and the result
//! paginator.

use crate::context::PageContext;
use crate::locator::Selector;
use crate::result::{PageError, PageResult};
use crate::search_page::wait_for_search_ajax;
use crate::session::WebSession;
use regex::Regex;
use std::fmt;
use tracing::debug;

const HEADER_SEARCH: &str = "#app-bar a.search";

const PAGE_LABEL: &str = ".pagination .page-count";
const NEXT_PAGE: &str = ".pagination a.next";
const PREV_PAGE: &str = ".pagination a.prev";

/// Site header present on every page
pub struct Header<'a, C: PageContext> {
    ctx: &'a C,
}

impl<C: PageContext> fmt::Debug for Header<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header").finish_non_exhaustive()
    }
}

impl<'a, C: PageContext> Header<'a, C> {
    /// Header of the current page
    pub const fn new(ctx: &'a C) -> Self {
        Self { ctx }
    }

    /// Follow the header's search link and wait for results to settle
    pub fn click_search(&self) -> PageResult<()> {
        let link = self.ctx.find_element(&Selector::css(HEADER_SEARCH))?;
        debug!("clicking header search link");
        self.ctx.session().click(link)?;
        wait_for_search_ajax(self.ctx)
    }
}

/// Position within a paged result list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePosition {
    /// Current page, starting at 1
    pub current: usize,
    /// Number of pages
    pub total: usize,
}

impl PagePosition {
    /// Parse a label of the form "Page 2 of 5"
    pub fn parse(label: &str) -> PageResult<Self> {
        let pattern = Regex::new(r"(?i)^page\s+(\d+)\s+of\s+(\d+)$").map_err(|e| {
            PageError::Pattern {
                message: format!("page label: {e}"),
            }
        })?;
        let malformed = || PageError::PageLabel {
            label: label.to_string(),
        };
        let caps = pattern.captures(label.trim()).ok_or_else(malformed)?;
        let number = |i: usize| caps[i].parse::<usize>().map_err(|_| malformed());
        Ok(Self {
            current: number(1)?,
            total: number(2)?,
        })
    }
}

/// Pager below the search results
pub struct Paginator<'a, C: PageContext> {
    ctx: &'a C,
}

impl<C: PageContext> fmt::Debug for Paginator<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator").finish_non_exhaustive()
    }
}

impl<'a, C: PageContext> Paginator<'a, C> {
    /// Paginator of the current page
    pub const fn new(ctx: &'a C) -> Self {
        Self { ctx }
    }

    fn position(&self) -> PageResult<PagePosition> {
        let label = self.ctx.find_element(&Selector::css(PAGE_LABEL))?;
        PagePosition::parse(&self.ctx.session().text(label)?)
    }

    /// Current page, starting at 1
    pub fn page_number(&self) -> PageResult<usize> {
        Ok(self.position()?.current)
    }

    /// Number of result pages
    pub fn total_page_count(&self) -> PageResult<usize> {
        Ok(self.position()?.total)
    }

    pub fn is_first_page(&self) -> PageResult<bool> {
        Ok(self.position()?.current <= 1)
    }

    pub fn is_last_page(&self) -> PageResult<bool> {
        let position = self.position()?;
        Ok(position.current >= position.total)
    }

    pub fn click_next_page(&self) -> PageResult<()> {
        self.click_and_wait(NEXT_PAGE)
    }

    pub fn click_prev_page(&self) -> PageResult<()> {
        self.click_and_wait(PREV_PAGE)
    }

    fn click_and_wait(&self, css: &str) -> PageResult<()> {
        let link = self.ctx.find_element(&Selector::css(css))?;
        debug!(selector = css, "changing result page");
        self.ctx.session().click(link)?;
        wait_for_search_ajax(self.ctx)
    }
}
