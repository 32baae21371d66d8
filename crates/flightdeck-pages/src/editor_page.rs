//! Package editor page reached from a search result.

use crate::context::PageContext;
use crate::locator::Selector;
use crate::page_object::PageObject;
use crate::result::PageResult;
use crate::search_result::{Addon, Library, PackageKind};
use crate::session::WebSession;
use std::fmt;
use std::marker::PhantomData;

const PACKAGE_NAME: &str = "#package-info-name";

/// Editor for a package of kind `K`
pub struct EditorPage<'a, C: PageContext, K: PackageKind> {
    ctx: &'a C,
    kind: PhantomData<K>,
}

/// Editor opened from an add-on result
pub type AddonEditorPage<'a, C> = EditorPage<'a, C, Addon>;

/// Editor opened from a library result
pub type LibraryEditorPage<'a, C> = EditorPage<'a, C, Library>;

impl<C: PageContext, K: PackageKind> fmt::Debug for EditorPage<'_, C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorPage")
            .field("kind", &K::LABEL)
            .finish_non_exhaustive()
    }
}

impl<'a, C: PageContext, K: PackageKind> EditorPage<'a, C, K> {
    /// Page object for the editor currently on screen
    pub const fn new(ctx: &'a C) -> Self {
        Self {
            ctx,
            kind: PhantomData,
        }
    }

    /// Name shown in the package info panel
    pub fn package_name(&self) -> PageResult<String> {
        let element = self.ctx.find_element(&Selector::css(PACKAGE_NAME))?;
        Ok(self.ctx.session().text(element)?.trim().to_string())
    }
}

impl<C: PageContext, K: PackageKind> PageObject for EditorPage<'_, C, K> {
    fn url_pattern(&self) -> &str {
        K::EDITOR_URL_PATTERN
    }

    fn is_loaded(&self) -> PageResult<bool> {
        let url = self.ctx.session().current_url()?;
        Ok(self.matches_url(&url) && self.ctx.is_element_visible(&Selector::css(PACKAGE_NAME))?)
    }

    fn page_name(&self) -> &str {
        "EditorPage"
    }
}
