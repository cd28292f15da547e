//! Scripted page driver and collecting speech sink for interpreter tests.

use std::collections::HashMap;
use std::sync::Mutex;

use websight::actions::{ActionContext, Outcome};
use websight::config::Tuning;
use websight::interpreter;
use websight::page::{
    Block, DriverResult, PageDriver, PageElement, PageOrigin, Rect, ScrollEdge, VideoCommand,
    Viewport,
};
use websight::session::TabSession;
use websight::speech::SpeechSink;

/// Everything the fake driver was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Click(String),
    ClickDescendant { element: String, selector: String },
    Navigate(String),
    ScrollBy(f64),
    ScrollTo(ScrollEdge),
    ScrollIntoView(String),
    HistoryBack,
    Video(VideoCommand),
    InjectCss(String),
    Overlay,
    Zoom(f64),
}

#[derive(Debug, Default)]
pub struct FakeElement {
    pub tag: String,
    pub text: String,
    pub rect: Rect,
    pub displayed: bool,
    pub href: Option<String>,
    /// Chrome-stripped text; falls back to `text`.
    pub cleaned: Option<String>,
    /// selector -> href for `descendant_href`.
    pub descendant_hrefs: HashMap<String, String>,
    /// Selectors with a clickable descendant.
    pub descendant_buttons: Vec<String>,
    /// selector -> href for `enclosing_href`.
    pub enclosing_hrefs: HashMap<String, String>,
    pub following: Vec<Block>,
}

/// A visible element with the given text, fully inside the viewport.
pub fn visible(tag: &str, text: &str, y: f64) -> FakeElement {
    FakeElement {
        tag: tag.to_string(),
        text: text.to_string(),
        rect: Rect::new(10.0, y, 200.0, 20.0),
        displayed: true,
        ..FakeElement::default()
    }
}

pub fn block(tag: &str, text: &str) -> Block {
    Block {
        tag: tag.to_string(),
        text: text.to_string(),
    }
}

pub struct FakePage {
    pub origin: PageOrigin,
    pub title: String,
    pub viewport: Viewport,
    selectors: HashMap<String, Vec<usize>>,
    elements: Vec<FakeElement>,
    pub video_present: bool,
    actions: Mutex<Vec<Recorded>>,
}

impl FakePage {
    pub fn new(hostname: &str, pathname: &str) -> Self {
        Self {
            origin: PageOrigin {
                hostname: hostname.to_string(),
                pathname: pathname.to_string(),
            },
            title: "Untitled".to_string(),
            viewport: Viewport {
                width: 1024.0,
                height: 768.0,
            },
            selectors: HashMap::new(),
            elements: Vec::new(),
            video_present: false,
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Register an element under a selector; insertion order is document order.
    pub fn add(&mut self, selector: &str, element: FakeElement) -> usize {
        let id = self.elements.len();
        self.elements.push(element);
        self.selectors
            .entry(selector.to_string())
            .or_default()
            .push(id);
        id
    }

    /// Drop every element registered under a selector.
    pub fn clear_selector(&mut self, selector: &str) {
        self.selectors.remove(selector);
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: Recorded) {
        self.actions.lock().unwrap().push(action);
    }

    fn fake(&self, el: &PageElement) -> DriverResult<&FakeElement> {
        self.elements
            .get(el.index)
            .ok_or_else(|| "element went stale".into())
    }

    fn to_page_element(&self, id: usize) -> PageElement {
        let fake = &self.elements[id];
        PageElement {
            snapshot: 1,
            index: id,
            tag: fake.tag.clone(),
            text: fake.text.clone(),
            rect: fake.rect,
            displayed: fake.displayed,
            href: fake.href.clone(),
        }
    }
}

impl PageDriver for FakePage {
    fn origin(&self) -> DriverResult<PageOrigin> {
        Ok(self.origin.clone())
    }

    fn title(&self) -> DriverResult<String> {
        Ok(self.title.clone())
    }

    fn viewport(&self) -> DriverResult<Viewport> {
        Ok(self.viewport)
    }

    fn query(&self, selector: &str) -> DriverResult<Vec<PageElement>> {
        Ok(self
            .selectors
            .get(selector)
            .map(|ids| ids.iter().map(|&id| self.to_page_element(id)).collect())
            .unwrap_or_default())
    }

    fn cleaned_text(&self, el: &PageElement) -> DriverResult<String> {
        let fake = self.fake(el)?;
        Ok(fake.cleaned.clone().unwrap_or_else(|| fake.text.clone()))
    }

    fn following_blocks(&self, el: &PageElement) -> DriverResult<Vec<Block>> {
        Ok(self.fake(el)?.following.clone())
    }

    fn descendant_href(&self, el: &PageElement, selector: &str) -> DriverResult<Option<String>> {
        Ok(self.fake(el)?.descendant_hrefs.get(selector).cloned())
    }

    fn enclosing_href(&self, el: &PageElement, selector: &str) -> DriverResult<Option<String>> {
        Ok(self.fake(el)?.enclosing_hrefs.get(selector).cloned())
    }

    fn click_descendant(&self, el: &PageElement, selector: &str) -> DriverResult<bool> {
        let fake = self.fake(el)?;
        if fake.descendant_buttons.iter().any(|s| s == selector) {
            self.record(Recorded::ClickDescendant {
                element: fake.text.clone(),
                selector: selector.to_string(),
            });
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn click(&self, el: &PageElement) -> DriverResult<()> {
        let fake = self.fake(el)?;
        self.record(Recorded::Click(fake.text.clone()));
        Ok(())
    }

    fn scroll_by(&self, dy: f64) -> DriverResult<()> {
        self.record(Recorded::ScrollBy(dy));
        Ok(())
    }

    fn scroll_to(&self, edge: ScrollEdge) -> DriverResult<()> {
        self.record(Recorded::ScrollTo(edge));
        Ok(())
    }

    fn scroll_into_view(&self, el: &PageElement) -> DriverResult<()> {
        let fake = self.fake(el)?;
        self.record(Recorded::ScrollIntoView(fake.text.clone()));
        Ok(())
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.record(Recorded::Navigate(url.to_string()));
        Ok(())
    }

    fn history_back(&self) -> DriverResult<()> {
        self.record(Recorded::HistoryBack);
        Ok(())
    }

    fn has_video(&self) -> DriverResult<bool> {
        Ok(self.video_present)
    }

    fn video_command(&self, cmd: VideoCommand) -> DriverResult<()> {
        self.record(Recorded::Video(cmd));
        Ok(())
    }

    fn inject_css(&self, css: &str) -> DriverResult<()> {
        self.record(Recorded::InjectCss(css.to_string()));
        Ok(())
    }

    fn ensure_overlay(&self) -> DriverResult<()> {
        self.record(Recorded::Overlay);
        Ok(())
    }

    fn set_zoom(&self, factor: f64) -> DriverResult<()> {
        self.record(Recorded::Zoom(factor));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CollectingSpeech {
    utterances: Mutex<Vec<String>>,
    cancels: Mutex<usize>,
}

impl CollectingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.utterances.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        *self.cancels.lock().unwrap()
    }
}

impl SpeechSink for CollectingSpeech {
    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }

    fn enqueue(&self, text: &str) {
        self.utterances.lock().unwrap().push(text.to_string());
    }
}

/// Page + speech + session wired together, with test-friendly tuning
/// (no settle delays, single video poll).
pub struct Harness {
    pub page: FakePage,
    pub speech: CollectingSpeech,
    pub session: TabSession,
    pub tuning: Tuning,
}

impl Harness {
    pub fn new(page: FakePage) -> Self {
        let mut tuning = Tuning::default();
        tuning.settle_ms = 0;
        tuning.video_poll_attempts = 1;
        tuning.video_poll_interval_ms = 0;
        Self {
            page,
            speech: CollectingSpeech::default(),
            session: TabSession::default(),
            tuning,
        }
    }

    pub fn handle(&mut self, raw: &str) -> Outcome {
        let mut ctx = ActionContext {
            page: &self.page,
            speech: &self.speech,
            session: &mut self.session,
            tuning: &self.tuning,
        };
        interpreter::handle(raw, &mut ctx)
    }

    pub fn spoken(&self) -> Vec<String> {
        self.speech.spoken()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.page.recorded()
    }
}
