//! Chromium session over the Chrome DevTools Protocol.
//!
//! [`ChromiumSession`] implements [`WebSession`] with chromiumoxide. The
//! page-object API is synchronous, so the session owns a private tokio
//! runtime and blocks on every command.
//!
//! Elements are tracked by tagging matched DOM nodes with a
//! `data-flightdeck-ref` attribute. An [`ElementRef`] whose node has left
//! the document reports a stale-reference session error.

use crate::locator::{Selector, SelectorQuery};
use crate::result::{PageError, PageResult};
use crate::session::{ElementRef, WebSession};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, MouseButton,
};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::cell::Cell;
use std::future::Future;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const REF_ATTRIBUTE: &str = "data-flightdeck-ref";

/// Chromium launch options
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a window
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 1024,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserOptions {
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub const fn with_window(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

#[derive(Debug, Deserialize)]
struct Lookup {
    refs: Vec<usize>,
    next: usize,
}

#[derive(Debug, Deserialize)]
struct NodeReply {
    stale: bool,
    #[serde(default)]
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Center {
    x: f64,
    y: f64,
}

/// Browser session backed by a real Chromium
#[derive(Debug)]
pub struct ChromiumSession {
    runtime: Runtime,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    next_ref: Cell<usize>,
}

fn cdp_error(context: &str, err: impl std::fmt::Display) -> PageError {
    PageError::session(format!("{context}: {err}"))
}

fn js_string(value: &str) -> PageResult<String> {
    serde_json::to_string(value).map_err(|e| cdp_error("encoding script argument", e))
}

/// Script resolving `ref` to its node, or `null`
fn node_expr(element: ElementRef) -> String {
    format!(
        "document.querySelector('[{REF_ATTRIBUTE}=\"{}\"]')",
        element.index()
    )
}

impl ChromiumSession {
    /// Launch Chromium and open a blank tab
    pub fn launch(options: &BrowserOptions) -> PageResult<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let mut builder =
            BrowserConfig::builder().window_size(options.window_width, options.window_height);
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(|e| cdp_error("configuring chromium", e))?;

        let (browser, mut events) = runtime
            .block_on(Browser::launch(config))
            .map_err(|e| cdp_error("launching chromium", e))?;

        let handler = runtime.spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(|e| cdp_error("opening tab", e))?;

        info!(headless = options.headless, "chromium session started");
        Ok(Self {
            runtime,
            browser,
            page,
            handler,
            next_ref: Cell::new(1),
        })
    }

    /// Close the browser
    pub fn close(mut self) -> PageResult<()> {
        let result = self.runtime.block_on(self.browser.close());
        self.handler.abort();
        result.map_err(|e| cdp_error("closing chromium", e))?;
        Ok(())
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn evaluate<T: DeserializeOwned>(&self, script: String) -> PageResult<T> {
        let result = self
            .block_on(self.page.evaluate(script))
            .map_err(|e| cdp_error("evaluating script", e))?;
        result
            .into_value()
            .map_err(|e| cdp_error("decoding script result", e))
    }

    /// Run `body` with `el` bound to the element's node
    fn on_node<T: DeserializeOwned>(&self, element: ElementRef, body: &str) -> PageResult<T> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) {{ return {{ stale: true }}; }} return {{ stale: false, value: (() => {{ {body} }})() }}; }})()",
            node_expr(element)
        );
        let reply: NodeReply = self.evaluate(script)?;
        if reply.stale {
            return Err(PageError::session(format!(
                "stale element reference: #{}",
                element.index()
            )));
        }
        serde_json::from_value(reply.value).map_err(|e| cdp_error("decoding script result", e))
    }

    fn handle(&self, element: ElementRef) -> PageResult<Element> {
        let css = format!("[{REF_ATTRIBUTE}=\"{}\"]", element.index());
        self.block_on(self.page.find_element(css)).map_err(|_| {
            PageError::session(format!("stale element reference: #{}", element.index()))
        })
    }

    fn mouse(&self, kind: DispatchMouseEventType, x: f64, y: f64) -> PageResult<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(|e| cdp_error("building mouse event", e))?;
        self.block_on(self.page.execute(params))
            .map_err(|e| cdp_error("dispatching mouse event", e))?;
        Ok(())
    }
}

impl WebSession for ChromiumSession {
    fn find_elements(
        &self,
        scope: Option<ElementRef>,
        selector: &Selector,
    ) -> PageResult<Vec<ElementRef>> {
        selector.validate()?;
        let scope_expr = scope.map_or_else(|| "document".to_string(), node_expr);
        let collect = match selector.query() {
            SelectorQuery::Css(css) => format!(
                "Array.from(scope.querySelectorAll({}))",
                js_string(&css)?
            ),
            SelectorQuery::XPath(xpath) => format!(
                "(() => {{ const r = document.evaluate({}, scope, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 const out = []; for (let i = 0; i < r.snapshotLength; i++) {{ out.push(r.snapshotItem(i)); }} return out; }})()",
                js_string(&xpath)?
            ),
        };
        let script = format!(
            "(() => {{ const scope = {scope_expr}; if (!scope) {{ return null; }} let next = {next}; \
             const refs = {collect}.filter(n => n.nodeType === 1).map(n => {{ \
             if (!n.hasAttribute('{REF_ATTRIBUTE}')) {{ n.setAttribute('{REF_ATTRIBUTE}', String(next++)); }} \
             return Number(n.getAttribute('{REF_ATTRIBUTE}')); }}); return {{ refs, next }}; }})()",
            next = self.next_ref.get(),
        );

        let lookup: Option<Lookup> = self.evaluate(script)?;
        let Some(lookup) = lookup else {
            return Err(PageError::session(format!(
                "stale element reference: #{}",
                scope.map_or(0, ElementRef::index)
            )));
        };
        self.next_ref.set(lookup.next);
        debug!(%selector, found = lookup.refs.len(), "lookup");
        Ok(lookup.refs.into_iter().map(ElementRef::new).collect())
    }

    fn text(&self, element: ElementRef) -> PageResult<String> {
        self.on_node(element, "return el.innerText ?? el.textContent ?? '';")
    }

    fn is_displayed(&self, element: ElementRef) -> PageResult<bool> {
        self.on_node(
            element,
            "const s = window.getComputedStyle(el); const r = el.getBoundingClientRect(); \
             return s.display !== 'none' && s.visibility !== 'hidden' && r.width > 0 && r.height > 0;",
        )
    }

    fn click(&self, element: ElementRef) -> PageResult<()> {
        let handle = self.handle(element)?;
        self.block_on(handle.click())
            .map_err(|e| cdp_error("clicking element", e))?;
        Ok(())
    }

    fn send_keys(&self, element: ElementRef, text: &str) -> PageResult<()> {
        let handle = self.handle(element)?;
        self.block_on(handle.focus())
            .map_err(|e| cdp_error("focusing element", e))?;
        self.block_on(handle.type_str(text))
            .map_err(|e| cdp_error("typing into element", e))?;
        Ok(())
    }

    fn clear(&self, element: ElementRef) -> PageResult<()> {
        self.on_node::<bool>(
            element,
            "el.value = ''; el.dispatchEvent(new Event('input', { bubbles: true })); \
             el.dispatchEvent(new Event('change', { bubbles: true })); return true;",
        )?;
        Ok(())
    }

    fn drag_by_offset(&self, element: ElementRef, dx: i32, dy: i32) -> PageResult<()> {
        let start: Center = self.on_node(
            element,
            "el.scrollIntoView({ block: 'center' }); const r = el.getBoundingClientRect(); \
             return { x: r.left + r.width / 2, y: r.top + r.height / 2 };",
        )?;
        let (end_x, end_y) = (start.x + f64::from(dx), start.y + f64::from(dy));
        debug!(element = element.index(), dx, dy, "dragging");
        self.mouse(DispatchMouseEventType::MousePressed, start.x, start.y)?;
        self.mouse(DispatchMouseEventType::MouseMoved, end_x, end_y)?;
        self.mouse(DispatchMouseEventType::MouseReleased, end_x, end_y)
    }

    fn select_by_visible_text(&self, element: ElementRef, text: &str) -> PageResult<()> {
        let body = format!(
            "const opt = Array.from(el.options || []).find(o => o.text.trim() === {}); \
             if (!opt) {{ return false; }} el.value = opt.value; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true;",
            js_string(text)?
        );
        if self.on_node::<bool>(element, &body)? {
            Ok(())
        } else {
            Err(PageError::not_found(format!("option with text {text:?}")))
        }
    }

    fn selected_option_text(&self, element: ElementRef) -> PageResult<String> {
        let text: Option<String> = self.on_node(
            element,
            "const opt = el.selectedOptions && el.selectedOptions[0]; return opt ? opt.text : null;",
        )?;
        text.ok_or_else(|| PageError::not_found("selected option"))
    }

    fn navigate(&self, url: &str) -> PageResult<()> {
        info!(url, "navigating");
        self.block_on(self.page.goto(url))
            .map_err(|e| cdp_error("navigating", e))?;
        Ok(())
    }

    fn current_url(&self) -> PageResult<String> {
        let url = self
            .block_on(self.page.url())
            .map_err(|e| cdp_error("reading url", e))?;
        Ok(url.unwrap_or_default())
    }
}
