//! One card in the search result list.
//!
//! A [`SearchResult`] is anchored on a root element found either by position
//! or by title, and reads everything else relative to that root. The package
//! kind (`Addon` or `Library`) is a type parameter: it picks the root
//! locator and fixes the editor page returned by [`SearchResult::click`].

use crate::context::PageContext;
use crate::editor_page::EditorPage;
use crate::locator::Selector;
use crate::result::{PageError, PageResult};
use crate::session::{ElementRef, WebSession};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use tracing::{debug, info};

const NAME: &str = "h3 > a";
const AUTHOR_LINK: &str = "ul.search_meta li:nth-child(1) > a";
const ACTIVITY: &str = "ul.search_meta > li.activity";
const TRY_IN_BROWSER: &str = "li.UI_Try_in_Browser > a";

/// Kind of package a result card or editor page shows
pub trait PackageKind: fmt::Debug {
    /// XPath matching every result card of this kind
    const RESULT_XPATH: &'static str;
    /// URL pattern of the kind's editor page
    const EDITOR_URL_PATTERN: &'static str;
    /// Display name used in logs
    const LABEL: &'static str;
}

/// Add-on packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addon {}

/// Library packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Library {}

impl PackageKind for Addon {
    const RESULT_XPATH: &'static str = "//div[contains(@class,'addon')]";
    const EDITOR_URL_PATTERN: &'static str = "/package/:id/latest/";
    const LABEL: &'static str = "add-on";
}

impl PackageKind for Library {
    const RESULT_XPATH: &'static str = "//div[contains(@class,'library')]";
    const EDITOR_URL_PATTERN: &'static str = "/library/:id/latest/";
    const LABEL: &'static str = "library";
}

/// Recent-activity level shown on a result card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActivityRating {
    /// "inactive"
    Inactive = 0,
    /// "stale"
    Stale = 1,
    /// "low"
    Low = 2,
    /// "moderate"
    Moderate = 3,
    /// "high"
    High = 4,
    /// "rockin'"
    Rockin = 5,
}

impl ActivityRating {
    /// All ratings, lowest first
    pub const ALL: [Self; 6] = [
        Self::Inactive,
        Self::Stale,
        Self::Low,
        Self::Moderate,
        Self::High,
        Self::Rockin,
    ];

    /// Ordinal value, 0 (inactive) to 5 (rockin')
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Label as rendered on the page
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Stale => "stale",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Rockin => "rockin'",
        }
    }
}

impl FromStr for ActivityRating {
    type Err = PageError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|rating| rating.label() == label)
            .ok_or_else(|| PageError::UnknownActivityRating {
                label: label.to_string(),
            })
    }
}

impl fmt::Display for ActivityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a result card is picked out of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultLookup {
    /// Zero-based position among cards of the same kind
    Index(usize),
    /// Exact (whitespace-normalized) title
    Title(String),
}

impl From<usize> for ResultLookup {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ResultLookup {
    fn from(title: &str) -> Self {
        Self::Title(title.to_string())
    }
}

impl From<String> for ResultLookup {
    fn from(title: String) -> Self {
        Self::Title(title)
    }
}

/// A result card of kind `K`
pub struct SearchResult<'a, C: PageContext, K: PackageKind> {
    ctx: &'a C,
    root: Selector,
    kind: PhantomData<K>,
}

/// Add-on result card
pub type AddonResult<'a, C> = SearchResult<'a, C, Addon>;

/// Library result card
pub type LibraryResult<'a, C> = SearchResult<'a, C, Library>;

impl<C: PageContext, K: PackageKind> fmt::Debug for SearchResult<'_, C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchResult")
            .field("kind", &K::LABEL)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<'a, C: PageContext, K: PackageKind> SearchResult<'a, C, K> {
    /// Locate a card by position or title
    pub fn new(ctx: &'a C, lookup: impl Into<ResultLookup>) -> Self {
        let root = match lookup.into() {
            ResultLookup::Index(index) => Selector::xpath_nth(K::RESULT_XPATH, index),
            ResultLookup::Title(title) => Selector::xpath_with_heading(K::RESULT_XPATH, &title),
        };
        Self {
            ctx,
            root,
            kind: PhantomData,
        }
    }

    /// Selector for every card of this kind
    #[must_use]
    pub fn base_locator() -> Selector {
        Selector::xpath(K::RESULT_XPATH)
    }

    /// Selector anchoring this card
    #[must_use]
    pub const fn root_locator(&self) -> &Selector {
        &self.root
    }

    /// Root element of the card
    pub fn root_element(&self) -> PageResult<ElementRef> {
        self.ctx.find_element(&self.root)
    }

    fn child(&self, css: &str) -> PageResult<ElementRef> {
        let root = self.root_element()?;
        self.ctx.session().find_element(Some(root), &Selector::css(css))
    }

    fn child_text(&self, css: &str) -> PageResult<String> {
        let element = self.child(css)?;
        self.ctx.session().text(element)
    }

    /// Whether the card is present and visible
    pub fn is_displayed(&self) -> PageResult<bool> {
        self.ctx.is_element_visible(&self.root)
    }

    /// Package name
    pub fn name(&self) -> PageResult<String> {
        self.child_text(NAME)
    }

    /// Author display name
    pub fn author_name(&self) -> PageResult<String> {
        self.child_text(AUTHOR_LINK)
    }

    /// Activity rating parsed from the card's label
    pub fn activity_rating(&self) -> PageResult<ActivityRating> {
        self.child_text(ACTIVITY)?.parse()
    }

    /// Open the package in its editor
    pub fn click(&self) -> PageResult<EditorPage<'a, C, K>> {
        let link = self.child(NAME)?;
        info!(kind = K::LABEL, root = %self.root, "opening package from search results");
        self.ctx.session().click(link)?;
        Ok(EditorPage::new(self.ctx))
    }

    /// Follow the author link
    pub fn click_author(&self) -> PageResult<()> {
        let link = self.child(AUTHOR_LINK)?;
        debug!(kind = K::LABEL, root = %self.root, "following author link");
        self.ctx.session().click(link)
    }
}

impl<C: PageContext> SearchResult<'_, C, Addon> {
    /// Click "Try in browser"
    pub fn click_test(&self) -> PageResult<()> {
        let button = self.child(TRY_IN_BROWSER)?;
        debug!(root = %self.root, "trying add-on in browser");
        self.ctx.session().click(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::PageConfig;
    use crate::context::TestContext;
    use crate::mock::{MockElement, MockSession};

    type Ctx = TestContext<MockSession, ManualClock>;

    fn context() -> Ctx {
        TestContext::with_clock(MockSession::new(), PageConfig::default(), ManualClock::new())
    }

    /// Render a result card reachable by index and by title
    fn card<K: PackageKind>(
        ctx: &Ctx,
        index: usize,
        title: &str,
        author: &str,
        activity: &str,
    ) -> ElementRef {
        let session = ctx.session();
        let root = session.add(
            None,
            &Selector::xpath_nth(K::RESULT_XPATH, index),
            MockElement::new(),
        );
        session.bind(None, &Selector::xpath(K::RESULT_XPATH), root);
        session.bind(None, &Selector::xpath_with_heading(K::RESULT_XPATH, title), root);
        session.add(Some(root), &Selector::css(NAME), MockElement::new().with_text(title));
        session.add(
            Some(root),
            &Selector::css(AUTHOR_LINK),
            MockElement::new().with_text(author),
        );
        session.add(
            Some(root),
            &Selector::css(ACTIVITY),
            MockElement::new().with_text(activity),
        );
        root
    }

    mod activity_rating_tests {
        use super::*;

        #[test]
        fn test_known_labels() {
            assert_eq!("inactive".parse::<ActivityRating>().unwrap().value(), 0);
            assert_eq!("stale".parse::<ActivityRating>().unwrap().value(), 1);
            assert_eq!("low".parse::<ActivityRating>().unwrap().value(), 2);
            assert_eq!("moderate".parse::<ActivityRating>().unwrap().value(), 3);
            assert_eq!("high".parse::<ActivityRating>().unwrap().value(), 4);
            assert_eq!("rockin'".parse::<ActivityRating>().unwrap().value(), 5);
        }

        #[test]
        fn test_surrounding_whitespace_is_ignored() {
            assert_eq!(
                "\n   high  ".parse::<ActivityRating>().unwrap(),
                ActivityRating::High
            );
        }

        #[test]
        fn test_unknown_label() {
            let err = "blazing".parse::<ActivityRating>().unwrap_err();
            match err {
                PageError::UnknownActivityRating { label } => assert_eq!(label, "blazing"),
                other => panic!("unexpected error {other:?}"),
            }
        }

        #[test]
        fn test_labels_are_case_sensitive() {
            assert!("High".parse::<ActivityRating>().is_err());
        }

        #[test]
        fn test_display_round_trips() {
            for rating in ActivityRating::ALL {
                assert_eq!(rating.to_string().parse::<ActivityRating>().unwrap(), rating);
            }
        }

        #[test]
        fn test_ordering_follows_value() {
            assert!(ActivityRating::Rockin > ActivityRating::High);
            assert!(ActivityRating::Inactive < ActivityRating::Stale);
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_index_selects_position() {
            let ctx = context();
            let result = AddonResult::new(&ctx, 2_usize);
            assert_eq!(
                result.root_locator(),
                &Selector::xpath("(//div[contains(@class,'addon')])[3]")
            );
        }

        #[test]
        fn test_title_selects_heading() {
            let ctx = context();
            let result = LibraryResult::new(&ctx, "MyAddon");
            assert_eq!(
                result.root_locator(),
                &Selector::xpath(
                    "//div[contains(@class,'library')][descendant::h3/a[normalize-space(text())='MyAddon']]"
                )
            );
        }

        #[test]
        fn test_base_locators_differ_by_kind() {
            assert_eq!(
                AddonResult::<Ctx>::base_locator(),
                Selector::xpath("//div[contains(@class,'addon')]")
            );
            assert_eq!(
                LibraryResult::<Ctx>::base_locator(),
                Selector::xpath("//div[contains(@class,'library')]")
            );
        }
    }

    mod reader_tests {
        use super::*;

        #[test]
        fn test_reads_card_fields() {
            let ctx = context();
            card::<Addon>(&ctx, 0, "Tab Sidebar", "jdoe", " rockin' ");

            let by_index = AddonResult::new(&ctx, 0_usize);
            assert!(by_index.is_displayed().unwrap());
            assert_eq!(by_index.name().unwrap(), "Tab Sidebar");
            assert_eq!(by_index.author_name().unwrap(), "jdoe");
            assert_eq!(by_index.activity_rating().unwrap(), ActivityRating::Rockin);

            let by_title = AddonResult::new(&ctx, "Tab Sidebar");
            assert_eq!(by_title.name().unwrap(), "Tab Sidebar");
        }

        #[test]
        fn test_missing_card_is_not_displayed() {
            let ctx = context();
            let result = LibraryResult::new(&ctx, "Nope");
            assert!(!result.is_displayed().unwrap());
            assert!(result.name().unwrap_err().is_not_found());
        }

        #[test]
        fn test_hidden_card_is_not_displayed() {
            let ctx = context();
            let root = card::<Library>(&ctx, 0, "utils", "jdoe", "low");
            ctx.session().update(root, |el| el.displayed = false);
            assert!(!LibraryResult::new(&ctx, "utils").is_displayed().unwrap());
        }

        #[test]
        fn test_unknown_activity_propagates() {
            let ctx = context();
            card::<Addon>(&ctx, 0, "Hot", "jdoe", "blazing");
            let err = AddonResult::new(&ctx, 0_usize).activity_rating().unwrap_err();
            assert!(matches!(err, PageError::UnknownActivityRating { .. }));
        }

        #[test]
        fn test_kinds_do_not_share_cards() {
            let ctx = context();
            card::<Addon>(&ctx, 0, "Shared Name", "jdoe", "low");
            assert!(AddonResult::new(&ctx, "Shared Name").is_displayed().unwrap());
            assert!(!LibraryResult::new(&ctx, "Shared Name").is_displayed().unwrap());
        }
    }

    mod navigation_tests {
        use super::*;
        use crate::page_object::PageObject;

        #[test]
        fn test_click_returns_editor_for_kind() {
            let ctx = context();
            card::<Addon>(&ctx, 0, "Tab Sidebar", "jdoe", "high");
            let editor = AddonResult::new(&ctx, 0_usize).click().unwrap();
            assert_eq!(editor.url_pattern(), "/package/:id/latest/");

            card::<Library>(&ctx, 0, "utils", "jdoe", "high");
            let editor = LibraryResult::new(&ctx, "utils").click().unwrap();
            assert_eq!(editor.url_pattern(), "/library/:id/latest/");

            assert_eq!(ctx.session().call_count("click:"), 2);
        }

        #[test]
        fn test_click_author() {
            let ctx = context();
            let root = card::<Library>(&ctx, 0, "utils", "jdoe", "high");
            let author = ctx
                .session()
                .find_element(Some(root), &Selector::css(AUTHOR_LINK))
                .unwrap();
            LibraryResult::new(&ctx, 0_usize).click_author().unwrap();
            assert!(ctx.session().was_called(&format!("click:{}", author.index())));
        }

        #[test]
        fn test_click_test_on_addon() {
            let ctx = context();
            let root = card::<Addon>(&ctx, 1, "Tab Sidebar", "jdoe", "high");
            let button = ctx.session().add(
                Some(root),
                &Selector::css(TRY_IN_BROWSER),
                MockElement::new(),
            );
            AddonResult::new(&ctx, 1_usize).click_test().unwrap();
            assert!(ctx.session().was_called(&format!("click:{}", button.index())));
        }

        #[test]
        fn test_click_missing_card_fails() {
            let ctx = context();
            assert!(AddonResult::new(&ctx, 4_usize).click().unwrap_err().is_not_found());
        }
    }
}
