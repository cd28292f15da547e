//! Chromium-backed page driver over the DevTools protocol
//!
//! Launches (or attaches to) a Chromium instance and implements `PageDriver`
//! with small evaluated scripts. Queried elements are parked in an in-page
//! registry keyed by snapshot id so later commands can click them; handles
//! go stale on navigation and surface as errors, which executors degrade to
//! spoken messages.
//!
//! The driver is synchronous on the outside: it owns a small tokio runtime
//! and blocks on each CDP call, keeping the command loop single-threaded.

use std::sync::atomic::{AtomicU64, Ordering};

use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::page::Page;
use futures_util::StreamExt;

use crate::config;
use crate::page::{
    Block, DriverResult, PageDriver, PageElement, PageOrigin, ScrollEdge, VideoCommand, Viewport,
};

/// Name of the in-page element registry.
const REGISTRY: &str = "__websight_elements";
const STYLE_ID: &str = "websight-accessibility-style";
const OVERLAY_ID: &str = "eye-comfort-overlay";

pub struct BrowserDriver {
    rt: tokio::runtime::Runtime,
    browser: Browser,
    page: Page,
    tab_id: String,
    snapshot: AtomicU64,
}

impl BrowserDriver {
    /// Launch or attach per config and open the start page.
    pub fn start(config: &config::BrowserConfig, start_url: &str) -> DriverResult<Self> {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;

        let debug_ws_url = config.debug_ws_url.clone();
        let headful = config.headful;
        let start = start_url.to_string();

        let (browser, page) = rt.block_on(async move {
            let (browser, mut handler) = match debug_ws_url {
                Some(ws) => Browser::connect(ws).await?,
                None => {
                    let mut builder = ChromiumConfig::builder();
                    if headful {
                        builder = builder.with_head();
                    }
                    Browser::launch(builder.build()?).await?
                }
            };

            // Pump CDP messages for the lifetime of the connection.
            tokio::task::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page(start.as_str()).await?;
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>((browser, page))
        })?;

        let tab_id = serde_json::to_value(page.target_id())
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "tab-0".to_string());

        Ok(Self {
            rt,
            browser,
            page,
            tab_id,
            snapshot: AtomicU64::new(0),
        })
    }

    /// Stable identifier of the driven tab.
    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    /// Close the browser connection (and the process, when launched here).
    pub fn close(mut self) -> DriverResult<()> {
        self.rt.block_on(async {
            self.browser.close().await?;
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(())
        })
    }

    fn eval<T: serde::de::DeserializeOwned>(&self, js: String) -> DriverResult<T> {
        let result = self.rt.block_on(self.page.evaluate(js))?;
        Ok(result.into_value()?)
    }

    fn eval_unit(&self, js: String) -> DriverResult<()> {
        self.rt.block_on(self.page.evaluate(js))?;
        Ok(())
    }

    /// JS expression resolving a registered element, or undefined.
    fn element_ref(el: &PageElement) -> String {
        format!(
            "((window.{registry} || {{}})[{snapshot}] || [])[{index}]",
            registry = REGISTRY,
            snapshot = el.snapshot,
            index = el.index,
        )
    }
}

impl PageDriver for BrowserDriver {
    fn origin(&self) -> DriverResult<PageOrigin> {
        self.eval(
            "(() => ({ hostname: location.hostname, pathname: location.pathname }))()".to_string(),
        )
    }

    fn title(&self) -> DriverResult<String> {
        Ok(self.rt.block_on(self.page.get_title())?.unwrap_or_default())
    }

    fn viewport(&self) -> DriverResult<Viewport> {
        self.eval(
            "(() => ({ width: window.innerWidth || document.documentElement.clientWidth, \
             height: window.innerHeight || document.documentElement.clientHeight }))()"
                .to_string(),
        )
    }

    fn query(&self, selector: &str) -> DriverResult<Vec<PageElement>> {
        let key = self.snapshot.fetch_add(1, Ordering::SeqCst) + 1;
        let js = format!(
            r#"(() => {{
                const els = Array.from(document.querySelectorAll({selector}));
                window.{registry} = window.{registry} || {{}};
                window.{registry}[{key}] = els;
                return els.map((el, i) => {{
                    const r = el.getBoundingClientRect();
                    const cs = window.getComputedStyle(el);
                    return {{
                        snapshot: {key},
                        index: i,
                        tag: el.tagName.toLowerCase(),
                        text: el.innerText || el.textContent || "",
                        rect: {{ x: r.x, y: r.y, width: r.width, height: r.height }},
                        displayed: cs.visibility !== 'hidden' && cs.display !== 'none',
                        href: el.href || null
                    }};
                }});
            }})()"#,
            selector = serde_json::to_string(selector)?,
            registry = REGISTRY,
            key = key,
        );
        self.eval(js)
    }

    fn cleaned_text(&self, el: &PageElement) -> DriverResult<String> {
        let js = format!(
            r#"(() => {{
                const el = {el_ref};
                if (!el) return null;
                const clone = el.cloneNode(true);
                clone.querySelectorAll('svg, time, [role="button"], [data-testid="caret"]')
                    .forEach(n => n.remove());
                return clone.innerText || clone.textContent || "";
            }})()"#,
            el_ref = Self::element_ref(el),
        );
        let text: Option<String> = self.eval(js)?;
        text.ok_or_else(|| "element went stale".into())
    }

    fn following_blocks(&self, el: &PageElement) -> DriverResult<Vec<Block>> {
        let js = format!(
            r#"(() => {{
                const el = {el_ref};
                if (!el) return null;
                const blocks = [];
                let sib = el.nextElementSibling;
                while (sib) {{
                    blocks.push({{
                        tag: sib.tagName.toLowerCase(),
                        text: sib.innerText || sib.textContent || ""
                    }});
                    sib = sib.nextElementSibling;
                }}
                return blocks;
            }})()"#,
            el_ref = Self::element_ref(el),
        );
        let blocks: Option<Vec<Block>> = self.eval(js)?;
        blocks.ok_or_else(|| "element went stale".into())
    }

    fn descendant_href(&self, el: &PageElement, selector: &str) -> DriverResult<Option<String>> {
        let js = format!(
            r#"(() => {{
                const el = {el_ref};
                if (!el) return null;
                const a = el.querySelector({selector});
                return a && a.href ? a.href : null;
            }})()"#,
            el_ref = Self::element_ref(el),
            selector = serde_json::to_string(selector)?,
        );
        self.eval(js)
    }

    fn enclosing_href(&self, el: &PageElement, selector: &str) -> DriverResult<Option<String>> {
        let js = format!(
            r#"(() => {{
                const el = {el_ref};
                if (!el) return null;
                const a = el.closest({selector});
                return a && a.href ? a.href : null;
            }})()"#,
            el_ref = Self::element_ref(el),
            selector = serde_json::to_string(selector)?,
        );
        self.eval(js)
    }

    fn click_descendant(&self, el: &PageElement, selector: &str) -> DriverResult<bool> {
        let js = format!(
            r#"(() => {{
                const el = {el_ref};
                if (!el) return false;
                const target = el.querySelector({selector});
                if (!target) return false;
                target.click();
                return true;
            }})()"#,
            el_ref = Self::element_ref(el),
            selector = serde_json::to_string(selector)?,
        );
        self.eval(js)
    }

    fn click(&self, el: &PageElement) -> DriverResult<()> {
        let js = format!(
            "(() => {{ const el = {el_ref}; if (!el) return false; el.click(); return true; }})()",
            el_ref = Self::element_ref(el),
        );
        let clicked: bool = self.eval(js)?;
        if clicked {
            Ok(())
        } else {
            Err("element went stale".into())
        }
    }

    fn scroll_by(&self, dy: f64) -> DriverResult<()> {
        self.eval_unit(format!(
            "window.scrollBy({{ top: {dy}, behavior: 'smooth' }})"
        ))
    }

    fn scroll_to(&self, edge: ScrollEdge) -> DriverResult<()> {
        let js = match edge {
            ScrollEdge::Top => "window.scrollTo({ top: 0, behavior: 'smooth' })".to_string(),
            ScrollEdge::Bottom => {
                "window.scrollTo({ top: document.body.scrollHeight, behavior: 'smooth' })"
                    .to_string()
            }
        };
        self.eval_unit(js)
    }

    fn scroll_into_view(&self, el: &PageElement) -> DriverResult<()> {
        let js = format!(
            "(() => {{ const el = {el_ref}; if (el) el.scrollIntoView({{ behavior: 'smooth' }}); }})()",
            el_ref = Self::element_ref(el),
        );
        self.eval_unit(js)
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.rt.block_on(self.page.goto(url))?;
        Ok(())
    }

    fn history_back(&self) -> DriverResult<()> {
        self.eval_unit("window.history.back()".to_string())
    }

    fn has_video(&self) -> DriverResult<bool> {
        self.eval("!!document.querySelector('video')".to_string())
    }

    fn video_command(&self, cmd: VideoCommand) -> DriverResult<()> {
        let action = match cmd {
            VideoCommand::Play => "v.play();".to_string(),
            VideoCommand::Pause => "v.pause();".to_string(),
            VideoCommand::SetMuted(muted) => format!("v.muted = {};", muted),
            VideoCommand::AdjustVolume(delta) => {
                format!("v.volume = Math.min(1, Math.max(0, v.volume + {}));", delta)
            }
            VideoCommand::SeekBy(delta) => format!("v.currentTime += {};", delta),
        };
        self.eval_unit(format!(
            "(() => {{ const v = document.querySelector('video'); if (v) {{ {action} }} }})()"
        ))
    }

    fn inject_css(&self, css: &str) -> DriverResult<()> {
        let js = if css.is_empty() {
            format!(
                "(() => {{ const s = document.getElementById('{STYLE_ID}'); if (s) s.remove(); }})()"
            )
        } else {
            format!(
                r#"(() => {{
                    let style = document.getElementById('{STYLE_ID}');
                    if (!style) {{
                        style = document.createElement('style');
                        style.id = '{STYLE_ID}';
                        document.documentElement.appendChild(style);
                    }}
                    style.textContent = {css};
                }})()"#,
                css = serde_json::to_string(css)?,
            )
        };
        self.eval_unit(js)
    }

    fn ensure_overlay(&self) -> DriverResult<()> {
        self.eval_unit(format!(
            r#"(() => {{
                if (!document.getElementById('{OVERLAY_ID}')) {{
                    const overlay = document.createElement('div');
                    overlay.id = '{OVERLAY_ID}';
                    document.documentElement.appendChild(overlay);
                }}
            }})()"#
        ))
    }

    fn set_zoom(&self, factor: f64) -> DriverResult<()> {
        self.eval_unit(format!(
            "document.documentElement.style.zoom = '{}'",
            factor
        ))
    }
}
