//! Page driver seam - the boundary between command executors and a live document
//!
//! Executors never touch a browser directly. They query a `PageDriver` for
//! element records (text, geometry, computed-style visibility) and ask it to
//! perform native actions. Geometry and visibility filtering happen on this
//! side of the seam so the logic is testable against a scripted driver.

use serde::Deserialize;

pub type DriverResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Bounding rectangle relative to the viewport, as reported by the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A queried element. `snapshot`/`index` identify the live node inside the
/// driver's registry; everything else is data captured at query time.
#[derive(Debug, Clone, Deserialize)]
pub struct PageElement {
    pub snapshot: u64,
    pub index: usize,
    /// Lowercase tag name.
    pub tag: String,
    /// Rendered text content.
    pub text: String,
    pub rect: Rect,
    /// Computed style is not `visibility: hidden` / `display: none`.
    pub displayed: bool,
    /// Resolved href for anchors.
    pub href: Option<String>,
}

impl PageElement {
    /// Trimmed rendered text.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// A following-sibling content block, used for section walking.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub tag: String,
    pub text: String,
}

/// Hostname and pathname of the current document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageOrigin {
    pub hostname: String,
    pub pathname: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollEdge {
    Top,
    Bottom,
}

/// Operations on the page's `<video>` element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VideoCommand {
    Play,
    Pause,
    SetMuted(bool),
    /// Adjust volume by a delta, clamped to [0, 1].
    AdjustVolume(f64),
    /// Seek by a delta in seconds.
    SeekBy(f64),
}

/// Abstraction over the live document.
///
/// Every method that touches the DOM recomputes from current page state;
/// element handles go stale after navigation and implementations surface
/// that as an error, which executors degrade to a spoken message.
pub trait PageDriver {
    fn origin(&self) -> DriverResult<PageOrigin>;
    fn title(&self) -> DriverResult<String>;
    fn viewport(&self) -> DriverResult<Viewport>;

    /// Elements matching a CSS selector, in document order.
    fn query(&self, selector: &str) -> DriverResult<Vec<PageElement>>;
    /// Text of the element with presentation chrome (icons, timestamps,
    /// buttons) stripped, for feed items.
    fn cleaned_text(&self, el: &PageElement) -> DriverResult<String>;
    /// Following-sibling blocks of `el`, to the end of its parent.
    fn following_blocks(&self, el: &PageElement) -> DriverResult<Vec<Block>>;
    /// Href of the first descendant of `el` matching `selector`.
    fn descendant_href(&self, el: &PageElement, selector: &str) -> DriverResult<Option<String>>;
    /// Href of the closest enclosing element of `el` matching `selector`.
    fn enclosing_href(&self, el: &PageElement, selector: &str) -> DriverResult<Option<String>>;
    /// Click the first descendant of `el` matching `selector`; false when absent.
    fn click_descendant(&self, el: &PageElement, selector: &str) -> DriverResult<bool>;

    fn click(&self, el: &PageElement) -> DriverResult<()>;
    fn scroll_by(&self, dy: f64) -> DriverResult<()>;
    fn scroll_to(&self, edge: ScrollEdge) -> DriverResult<()>;
    fn scroll_into_view(&self, el: &PageElement) -> DriverResult<()>;
    fn navigate(&self, url: &str) -> DriverResult<()>;
    fn history_back(&self) -> DriverResult<()>;

    fn has_video(&self) -> DriverResult<bool>;
    fn video_command(&self, cmd: VideoCommand) -> DriverResult<()>;

    /// Replace the injected accessibility style element with `css`.
    fn inject_css(&self, css: &str) -> DriverResult<()>;
    /// Make sure the fixed eye-comfort overlay element exists.
    fn ensure_overlay(&self) -> DriverResult<()>;
    fn set_zoom(&self, factor: f64) -> DriverResult<()>;
}

/// Non-zero rendered size.
pub fn has_size(rect: &Rect) -> bool {
    rect.width > 0.0 && rect.height > 0.0
}

/// Full containment in the viewport.
pub fn in_viewport(rect: &Rect, vp: &Viewport) -> bool {
    rect.top() >= 0.0 && rect.left() >= 0.0 && rect.bottom() <= vp.height && rect.right() <= vp.width
}

/// Containment within the viewport's vertical bounds only (feed items).
pub fn in_vertical_band(rect: &Rect, vp: &Viewport) -> bool {
    rect.top() >= 0.0 && rect.bottom() <= vp.height
}
