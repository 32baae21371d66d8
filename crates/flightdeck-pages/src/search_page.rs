//! Package search page.
//!
//! [`SearchPage`] drives the search form, the result-type filters, the sort
//! dropdown and the three range sliders. Every call that changes the result
//! list blocks until the results spinner is gone, so callers always observe
//! a settled page.

use crate::context::PageContext;
use crate::locator::Selector;
use crate::page_object::PageObject;
use crate::regions::{Header, Paginator};
use crate::result::{PageError, PageResult};
use crate::search_result::{AddonResult, LibraryResult, PackageKind, ResultLookup, SearchResult};
use crate::session::WebSession;
use regex::Regex;
use std::fmt;
use tracing::{debug, info};

/// Message of the timeout raised while the results spinner stays up
pub const SEARCH_AJAX_TIMEOUT_MESSAGE: &str =
    "The search results spinner did not disappear before the timeout";

/// Path of the search page
pub const SEARCH_PATH: &str = "/search/";

/// Locators of the search page
pub mod locators {
    use crate::locator::Selector;

    pub fn search_field() -> Selector {
        Selector::css("#Search input[type='search']")
    }

    pub fn search_button() -> Selector {
        Selector::css("#Search button[type='submit']")
    }

    pub fn filter_addons() -> Selector {
        Selector::link_text("Add-ons")
    }

    pub fn filter_libraries() -> Selector {
        Selector::link_text("Libraries")
    }

    pub fn addon_count_label() -> Selector {
        Selector::xpath("//strong[preceding-sibling::a[contains(text(),'Add-ons')]]")
    }

    pub fn library_count_label() -> Selector {
        Selector::xpath("//strong[preceding-sibling::a[contains(text(),'Libraries')]]")
    }

    pub fn copies_knob() -> Selector {
        Selector::css("#CopiesFilter div.knob")
    }

    pub fn used_knob() -> Selector {
        Selector::css("#UsedFilter div.knob")
    }

    pub fn activity_knob() -> Selector {
        Selector::css("#ActivityFilter div.knob")
    }

    /// Present while a search request is in flight
    pub fn results_loading() -> Selector {
        Selector::css("#SearchResults.loading")
    }

    pub fn see_all_matching_addons() -> Selector {
        Selector::xpath(".//a[contains(text(),'matching add-ons')]")
    }

    pub fn see_all_matching_libraries() -> Selector {
        Selector::xpath(".//a[contains(text(),'matching libraries')]")
    }

    pub fn sort_select() -> Selector {
        Selector::id("SortSelect")
    }

    /// Link whose text is a result's title
    pub fn item_by_name(name: &str) -> Selector {
        Selector::link_text(name)
    }
}

/// Range filter slider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    /// Number of copies
    Copies,
    /// Number of packages using the result
    UsedPackages,
    /// Recent activity
    Activity,
}

impl Slider {
    pub const ALL: [Self; 3] = [Self::Copies, Self::UsedPackages, Self::Activity];

    /// Pixels the knob travels per notch
    #[must_use]
    pub const fn pixels_per_notch(self) -> i32 {
        match self {
            Self::Copies => 33,
            Self::UsedPackages => 8,
            Self::Activity => 38,
        }
    }

    /// Horizontal drag offset for `notches` (negative moves left), or
    /// `None` when it overflows
    #[must_use]
    pub const fn offset(self, notches: i32) -> Option<i32> {
        self.pixels_per_notch().checked_mul(notches)
    }

    #[must_use]
    pub fn knob(self) -> Selector {
        match self {
            Self::Copies => locators::copies_knob(),
            Self::UsedPackages => locators::used_knob(),
            Self::Activity => locators::activity_knob(),
        }
    }
}

/// Parse a result-count label such as "(42)".
///
/// Surrounding whitespace is ignored; anything else must be a parenthesized
/// run of digits.
pub fn parse_count_label(label: &str) -> PageResult<usize> {
    let pattern = Regex::new(r"^\((\d+)\)$").map_err(|e| PageError::Pattern {
        message: format!("count label: {e}"),
    })?;
    let malformed = || PageError::CountLabel {
        label: label.to_string(),
    };
    let caps = pattern.captures(label.trim()).ok_or_else(malformed)?;
    caps[1].parse().map_err(|_| malformed())
}

/// Block until the results spinner is absent
pub(crate) fn wait_for_search_ajax<C: PageContext>(ctx: &C) -> PageResult<()> {
    let spinner = locators::results_loading();
    let outcome = ctx
        .waiter()
        .until(SEARCH_AJAX_TIMEOUT_MESSAGE, || {
            Ok(!ctx.is_element_present(&spinner)?)
        })?;
    debug!(
        attempts = outcome.attempts,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "search results settled"
    );
    Ok(())
}

/// The package search page
pub struct SearchPage<'a, C: PageContext> {
    ctx: &'a C,
}

impl<C: PageContext> fmt::Debug for SearchPage<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchPage")
            .field("timeout_ms", &self.ctx.timeout_ms())
            .finish_non_exhaustive()
    }
}

impl<'a, C: PageContext> SearchPage<'a, C> {
    /// Page object for the search page already on screen
    pub const fn new(ctx: &'a C) -> Self {
        Self { ctx }
    }

    /// Load the search page
    pub fn open(ctx: &'a C) -> PageResult<Self> {
        let url = ctx.config().url(SEARCH_PATH);
        info!(%url, "opening search page");
        ctx.session().navigate(&url)?;
        Ok(Self::new(ctx))
    }

    /// Whether the browser is on the search page
    pub fn is_current(&self) -> PageResult<bool> {
        Ok(self.matches_url(&self.ctx.session().current_url()?))
    }

    fn click(&self, selector: &Selector) -> PageResult<()> {
        let element = self.ctx.find_element(selector)?;
        debug!(%selector, "click");
        self.ctx.session().click(element)
    }

    fn click_and_wait(&self, selector: &Selector) -> PageResult<()> {
        self.click(selector)?;
        wait_for_search_ajax(self.ctx)
    }

    fn read_text(&self, selector: &Selector) -> PageResult<String> {
        let element = self.ctx.find_element(selector)?;
        self.ctx.session().text(element)
    }

    // Result regions

    /// Add-on result by zero-based position or title
    pub fn addon(&self, lookup: impl Into<ResultLookup>) -> AddonResult<'a, C> {
        SearchResult::new(self.ctx, lookup)
    }

    /// Library result by zero-based position or title
    pub fn library(&self, lookup: impl Into<ResultLookup>) -> LibraryResult<'a, C> {
        SearchResult::new(self.ctx, lookup)
    }

    /// Locator for the link titled `name`
    pub fn item_locator_by_name(&self, name: &str) -> Selector {
        locators::item_by_name(name)
    }

    pub fn paginator(&self) -> Paginator<'a, C> {
        Paginator::new(self.ctx)
    }

    pub fn header(&self) -> Header<'a, C> {
        Header::new(self.ctx)
    }

    // Search form

    /// Type into the search field without submitting
    pub fn type_search_term(&self, text: &str) -> PageResult<()> {
        let field = self.ctx.find_element(&locators::search_field())?;
        debug!(text, "typing search term");
        self.ctx.session().send_keys(field, text)
    }

    pub fn clear_search(&self) -> PageResult<()> {
        let field = self.ctx.find_element(&locators::search_field())?;
        self.ctx.session().clear(field)
    }

    /// Submit the search and wait for results
    pub fn click_search(&self) -> PageResult<()> {
        self.click_and_wait(&locators::search_button())
    }

    /// Replace the search term and submit
    pub fn search_for_term(&self, term: &str) -> PageResult<()> {
        info!(term, "searching");
        self.clear_search()?;
        self.type_search_term(term)?;
        self.click_search()
    }

    /// Search for `name` once; true if `package` is visible afterwards.
    ///
    /// On a miss the header search link is followed so the next attempt
    /// starts from a fresh search page.
    pub fn search_and_check_if_package_exists<K: PackageKind>(
        &self,
        name: &str,
        package: &SearchResult<'_, C, K>,
    ) -> PageResult<bool> {
        self.search_for_term(name)?;
        if package.is_displayed()? {
            return Ok(true);
        }
        debug!(name, kind = K::LABEL, "package not in results yet");
        self.header().click_search()?;
        Ok(false)
    }

    /// Repeat the search until `package` shows up.
    ///
    /// New packages reach the search index asynchronously, so this keeps
    /// searching for up to the configured package-search timeout.
    pub fn search_until_package_exists<K: PackageKind>(
        &self,
        name: &str,
        package: &SearchResult<'_, C, K>,
    ) -> PageResult<()> {
        let timeout_ms = self.ctx.config().package_search_timeout_ms;
        info!(name, timeout_ms, "waiting for package to be searchable");
        let message = format!("Package {name} could not be found before the timeout");
        let outcome = self
            .ctx
            .waiter()
            .with_timeout(timeout_ms)
            .until(&message, || self.search_and_check_if_package_exists(name, package))?;
        info!(name, attempts = outcome.attempts, "package found");
        Ok(())
    }

    // Filters and sorting

    pub fn click_filter_addons_link(&self) -> PageResult<()> {
        self.click_and_wait(&locators::filter_addons())
    }

    pub fn click_filter_libraries_link(&self) -> PageResult<()> {
        self.click_and_wait(&locators::filter_libraries())
    }

    pub fn is_see_all_matching_addons_visible(&self) -> PageResult<bool> {
        self.ctx
            .is_element_visible(&locators::see_all_matching_addons())
    }

    pub fn click_see_all_matching_addons(&self) -> PageResult<()> {
        self.click_and_wait(&locators::see_all_matching_addons())
    }

    pub fn is_see_all_matching_libraries_visible(&self) -> PageResult<bool> {
        self.ctx
            .is_element_visible(&locators::see_all_matching_libraries())
    }

    pub fn click_see_all_matching_libraries(&self) -> PageResult<()> {
        self.click_and_wait(&locators::see_all_matching_libraries())
    }

    /// Pick a sort order by its visible label and wait for results
    pub fn sort_addons_by(&self, method: &str) -> PageResult<()> {
        let select = self.ctx.find_element(&locators::sort_select())?;
        info!(method, "sorting results");
        self.ctx.session().select_by_visible_text(select, method)?;
        wait_for_search_ajax(self.ctx)
    }

    /// Label of the selected sort order
    pub fn current_sort_method(&self) -> PageResult<String> {
        let select = self.ctx.find_element(&locators::sort_select())?;
        self.ctx.session().selected_option_text(select)
    }

    // Sliders

    /// Drag a slider knob by whole notches and wait for results
    pub fn move_slider(&self, slider: Slider, notches: i32) -> PageResult<()> {
        let dx = slider
            .offset(notches)
            .ok_or(PageError::SliderOutOfRange { notches })?;
        let knob = self.ctx.find_element(&slider.knob())?;
        debug!(?slider, notches, dx, "dragging slider");
        self.ctx.session().drag_by_offset(knob, dx, 0)?;
        wait_for_search_ajax(self.ctx)
    }

    pub fn move_copies_slider(&self, notches: i32) -> PageResult<()> {
        self.move_slider(Slider::Copies, notches)
    }

    pub fn move_used_packages_slider(&self, notches: i32) -> PageResult<()> {
        self.move_slider(Slider::UsedPackages, notches)
    }

    pub fn move_activity_slider(&self, notches: i32) -> PageResult<()> {
        self.move_slider(Slider::Activity, notches)
    }

    // Counts

    /// Rendered add-on results on this page
    pub fn addons_element_count(&self) -> PageResult<usize> {
        Ok(self.ctx.find_elements(&AddonResult::<C>::base_locator())?.len())
    }

    /// Rendered library results on this page
    pub fn library_element_count(&self) -> PageResult<usize> {
        Ok(self.ctx.find_elements(&LibraryResult::<C>::base_locator())?.len())
    }

    /// Total add-on matches reported by the server
    pub fn addons_count_label(&self) -> PageResult<usize> {
        parse_count_label(&self.read_text(&locators::addon_count_label())?)
    }

    /// Total library matches reported by the server
    pub fn library_count_label(&self) -> PageResult<usize> {
        parse_count_label(&self.read_text(&locators::library_count_label())?)
    }
}

impl<C: PageContext> PageObject for SearchPage<'_, C> {
    fn url_pattern(&self) -> &str {
        SEARCH_PATH
    }

    fn is_loaded(&self) -> PageResult<bool> {
        self.ctx.is_element_visible(&locators::search_field())
    }

    fn page_name(&self) -> &str {
        "SearchPage"
    }
}

impl<'a, C: PageContext> From<&'a C> for SearchPage<'a, C> {
    fn from(ctx: &'a C) -> Self {
        Self::new(ctx)
    }
}
