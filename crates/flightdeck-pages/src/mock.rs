//! In-memory session for unit testing page objects.
//!
//! [`MockSession`] keeps a flat table of elements and the selectors that
//! find them. Tests register elements under a selector (optionally scoped to
//! a parent element), attach hooks that fire when an element is clicked,
//! dragged or has an option selected, and inspect the call history
//! afterwards.

use crate::locator::Selector;
use crate::result::{PageError, PageResult};
use crate::session::{ElementRef, WebSession};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Element state held by the mock
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockElement {
    /// Visible text
    pub text: String,
    /// Whether the element is visible
    pub displayed: bool,
    /// Input value
    pub value: String,
    /// Horizontal position in pixels
    pub x: i32,
    /// Vertical position in pixels
    pub y: i32,
    /// `<select>` option labels
    pub options: Vec<String>,
    /// Index of the selected option
    pub selected: Option<usize>,
    /// Lookups left before the element detaches itself
    pub remaining_lookups: Option<usize>,
}

impl MockElement {
    /// Visible element with no text
    #[must_use]
    pub fn new() -> Self {
        Self {
            displayed: true,
            ..Self::default()
        }
    }

    /// Set visible text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Make the element invisible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Set position
    #[must_use]
    pub const fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Turn the element into a `<select>` with the first option selected
    #[must_use]
    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| (*o).to_string()).collect();
        self.selected = if self.options.is_empty() { None } else { Some(0) };
        self
    }

    /// Detach after being returned by `lookups` searches
    #[must_use]
    pub const fn vanishing_after(mut self, lookups: usize) -> Self {
        self.remaining_lookups = Some(lookups);
        self
    }
}

type Hook = Rc<dyn Fn(&MockSession)>;

#[derive(Debug)]
struct Node {
    element: MockElement,
    attached: bool,
}

#[derive(Debug)]
struct Binding {
    scope: Option<ElementRef>,
    selector: Selector,
    element: ElementRef,
}

/// Mock session for unit testing
#[derive(Default)]
pub struct MockSession {
    nodes: RefCell<Vec<Node>>,
    bindings: RefCell<Vec<Binding>>,
    hooks: RefCell<HashMap<ElementRef, Vec<Hook>>>,
    history: RefCell<Vec<String>>,
    url: RefCell<String>,
}

impl fmt::Debug for MockSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSession")
            .field("nodes", &self.nodes.borrow().len())
            .field("history", &self.history.borrow())
            .field("url", &self.url.borrow())
            .finish_non_exhaustive()
    }
}

impl MockSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new element reachable through `selector`
    pub fn add(
        &self,
        scope: Option<ElementRef>,
        selector: &Selector,
        element: MockElement,
    ) -> ElementRef {
        let handle = {
            let mut nodes = self.nodes.borrow_mut();
            nodes.push(Node {
                element,
                attached: true,
            });
            ElementRef::new(nodes.len() - 1)
        };
        self.bind(scope, selector, handle);
        handle
    }

    /// Make an existing element reachable through another selector
    pub fn bind(&self, scope: Option<ElementRef>, selector: &Selector, element: ElementRef) {
        self.bindings.borrow_mut().push(Binding {
            scope,
            selector: selector.clone(),
            element,
        });
    }

    /// Run `hook` after every click, drag or selection on `element`
    pub fn on_interact<F>(&self, element: ElementRef, hook: F)
    where
        F: Fn(&Self) + 'static,
    {
        self.hooks
            .borrow_mut()
            .entry(element)
            .or_default()
            .push(Rc::new(hook));
    }

    /// Detach an element from the DOM
    pub fn remove(&self, element: ElementRef) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(element.index()) {
            node.attached = false;
        }
    }

    /// Re-attach a previously removed element
    pub fn restore(&self, element: ElementRef) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(element.index()) {
            node.attached = true;
        }
    }

    /// Change an element's state in place
    pub fn update<F>(&self, element: ElementRef, change: F)
    where
        F: FnOnce(&mut MockElement),
    {
        if let Some(node) = self.nodes.borrow_mut().get_mut(element.index()) {
            change(&mut node.element);
        }
    }

    /// Snapshot of an element's state
    #[must_use]
    pub fn element(&self, element: ElementRef) -> Option<MockElement> {
        self.nodes
            .borrow()
            .get(element.index())
            .map(|node| node.element.clone())
    }

    /// Whether the element is still attached
    #[must_use]
    pub fn is_attached(&self, element: ElementRef) -> bool {
        self.nodes
            .borrow()
            .get(element.index())
            .is_some_and(|node| node.attached)
    }

    /// Set current URL
    pub fn set_url(&self, url: impl Into<String>) {
        *self.url.borrow_mut() = url.into();
    }

    /// Recorded interactions, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    /// Whether any recorded interaction starts with `prefix`
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history.borrow().iter().any(|c| c.starts_with(prefix))
    }

    /// Number of recorded interactions starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.history
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Forget recorded interactions
    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }

    fn record(&self, call: String) {
        self.history.borrow_mut().push(call);
    }

    fn with_attached<T>(
        &self,
        element: ElementRef,
        read: impl FnOnce(&mut MockElement) -> PageResult<T>,
    ) -> PageResult<T> {
        let mut nodes = self.nodes.borrow_mut();
        match nodes.get_mut(element.index()) {
            Some(node) if node.attached => read(&mut node.element),
            Some(_) => Err(PageError::session(format!(
                "stale element reference: #{}",
                element.index()
            ))),
            None => Err(PageError::session(format!(
                "unknown element reference: #{}",
                element.index()
            ))),
        }
    }

    fn with_interactable<T>(
        &self,
        element: ElementRef,
        act: impl FnOnce(&mut MockElement) -> PageResult<T>,
    ) -> PageResult<T> {
        self.with_attached(element, |el| {
            if el.displayed {
                act(el)
            } else {
                Err(PageError::session(format!(
                    "element not interactable: #{}",
                    element.index()
                )))
            }
        })
    }

    fn fire_hooks(&self, element: ElementRef) {
        let hooks = self.hooks.borrow().get(&element).cloned().unwrap_or_default();
        for hook in hooks {
            hook(self);
        }
    }
}

impl WebSession for MockSession {
    fn find_elements(
        &self,
        scope: Option<ElementRef>,
        selector: &Selector,
    ) -> PageResult<Vec<ElementRef>> {
        selector.validate()?;
        if let Some(parent) = scope {
            self.with_attached(parent, |_| Ok(()))?;
        }
        let candidates: Vec<ElementRef> = self
            .bindings
            .borrow()
            .iter()
            .filter(|b| b.scope == scope && &b.selector == selector)
            .map(|b| b.element)
            .collect();

        let mut nodes = self.nodes.borrow_mut();
        let mut found = Vec::new();
        for handle in candidates {
            let Some(node) = nodes.get_mut(handle.index()) else {
                continue;
            };
            if !node.attached {
                continue;
            }
            match node.element.remaining_lookups {
                Some(0) => node.attached = false,
                Some(n) => {
                    node.element.remaining_lookups = Some(n - 1);
                    found.push(handle);
                }
                None => found.push(handle),
            }
        }
        Ok(found)
    }

    fn text(&self, element: ElementRef) -> PageResult<String> {
        self.with_attached(element, |el| Ok(el.text.clone()))
    }

    fn is_displayed(&self, element: ElementRef) -> PageResult<bool> {
        self.with_attached(element, |el| Ok(el.displayed))
    }

    fn click(&self, element: ElementRef) -> PageResult<()> {
        self.with_interactable(element, |_| Ok(()))?;
        self.record(format!("click:{}", element.index()));
        self.fire_hooks(element);
        Ok(())
    }

    fn send_keys(&self, element: ElementRef, text: &str) -> PageResult<()> {
        self.with_interactable(element, |el| {
            el.value.push_str(text);
            Ok(())
        })?;
        self.record(format!("send_keys:{}:{text}", element.index()));
        Ok(())
    }

    fn clear(&self, element: ElementRef) -> PageResult<()> {
        self.with_interactable(element, |el| {
            el.value.clear();
            Ok(())
        })?;
        self.record(format!("clear:{}", element.index()));
        Ok(())
    }

    fn drag_by_offset(&self, element: ElementRef, dx: i32, dy: i32) -> PageResult<()> {
        self.with_interactable(element, |el| {
            el.x = el.x.saturating_add(dx);
            el.y = el.y.saturating_add(dy);
            Ok(())
        })?;
        self.record(format!("drag:{}:{dx}:{dy}", element.index()));
        self.fire_hooks(element);
        Ok(())
    }

    fn select_by_visible_text(&self, element: ElementRef, text: &str) -> PageResult<()> {
        self.with_interactable(element, |el| {
            let index = el
                .options
                .iter()
                .position(|o| o == text)
                .ok_or_else(|| PageError::not_found(format!("option with text {text:?}")))?;
            el.selected = Some(index);
            Ok(())
        })?;
        self.record(format!("select:{}:{text}", element.index()));
        self.fire_hooks(element);
        Ok(())
    }

    fn selected_option_text(&self, element: ElementRef) -> PageResult<String> {
        self.with_attached(element, |el| {
            el.selected
                .and_then(|i| el.options.get(i).cloned())
                .ok_or_else(|| PageError::not_found("selected option"))
        })
    }

    fn navigate(&self, url: &str) -> PageResult<()> {
        self.record(format!("navigate:{url}"));
        self.set_url(url);
        Ok(())
    }

    fn current_url(&self) -> PageResult<String> {
        Ok(self.url.borrow().clone())
    }
}
