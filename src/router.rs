//! Intent routing - ordered pattern matchers over normalized commands
//!
//! Matching policy is first-match-wins in a fixed priority order: the generic
//! set is always tested first, then exactly one site-scoped set chosen from
//! the page origin, then the catch-all. Each matcher is a pure function from
//! a normalized command to an optional intent, so the router is testable
//! without a DOM.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::page::PageOrigin;

/// The action a normalized command resolves to. Spoken indices stay 1-based
/// here; executors convert to 0-based at lookup time.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    // Generic page control
    ScrollDown,
    ScrollUp,
    GoToTop,
    GoToBottom,
    ReadTitle,
    ReadFirstParagraph,
    ReadAllText,
    StopReading,
    ReadLinks,
    ClickLink(LinkRef),
    Summarize,

    // Video site
    PlayVideo,
    PauseVideo,
    Mute,
    Unmute,
    VolumeUp,
    VolumeDown,
    SkipForward,
    Rewind,
    ReadVideoTitle,
    ReadDescription,
    ReadComments,
    NextVideo,
    PreviousVideo,

    // Social feed
    ReadLatestTweet,
    ReadTweet(u32),
    LikeTweet(u32),
    ShareTweet(u32),
    OpenTweet(u32),

    // Search results
    ReadTopResult,
    ReadResult(u32),
    OpenResult(u32),
    ReadAllResults,

    // Encyclopedia articles
    ReadSection(String),
    GoToSection(String),

    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkRef {
    Number(u32),
    Last,
}

/// Site-scoped pattern set, selected once per command from the page origin.
/// Article doubles as the fall-through scope for unrecognized origins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scope {
    Video,
    Feed,
    Search,
    Article,
}

impl Scope {
    pub fn for_origin(origin: &PageOrigin) -> Self {
        let host = origin.hostname.as_str();
        if host.contains("youtube.com") {
            Scope::Video
        } else if host.contains("twitter.com") || host.contains("x.com") {
            Scope::Feed
        } else if host.contains("google.com") && origin.pathname == "/search" {
            Scope::Search
        } else {
            Scope::Article
        }
    }
}

type Matcher = fn(&str) -> Option<Intent>;

static CLICK_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"click (last|\d+) link").unwrap());
static READ_TWEET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"read tweet number (\d+)").unwrap());
static LIKE_TWEET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"like tweet number (\d+)").unwrap());
static SHARE_TWEET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"share tweet number (\d+)").unwrap());
static OPEN_TWEET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"open tweet number (\d+)").unwrap());
static READ_RESULT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"read result number (\d+)").unwrap());
static OPEN_RESULT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"open result number (\d+)").unwrap());
static READ_SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"read section ['"]?(.+?)['"]?$"#).unwrap());
static GO_SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"go to section ['"]?(.+?)['"]?$"#).unwrap());

fn captured_number(re: &Regex, cmd: &str) -> Option<u32> {
    re.captures(cmd)?.get(1)?.as_str().parse().ok()
}

// Generic matchers, in priority order.

fn m_scroll_down(cmd: &str) -> Option<Intent> {
    cmd.contains("scroll down").then_some(Intent::ScrollDown)
}

fn m_scroll_up(cmd: &str) -> Option<Intent> {
    cmd.contains("scroll up").then_some(Intent::ScrollUp)
}

fn m_go_to_top(cmd: &str) -> Option<Intent> {
    cmd.contains("go to top").then_some(Intent::GoToTop)
}

fn m_go_to_bottom(cmd: &str) -> Option<Intent> {
    cmd.contains("go to bottom").then_some(Intent::GoToBottom)
}

fn m_read_title(cmd: &str) -> Option<Intent> {
    cmd.contains("read title").then_some(Intent::ReadTitle)
}

fn m_read_first_paragraph(cmd: &str) -> Option<Intent> {
    cmd.contains("read first paragraph")
        .then_some(Intent::ReadFirstParagraph)
}

fn m_read_all_text(cmd: &str) -> Option<Intent> {
    cmd.contains("read all text").then_some(Intent::ReadAllText)
}

fn m_stop_reading(cmd: &str) -> Option<Intent> {
    cmd.contains("stop reading").then_some(Intent::StopReading)
}

fn m_read_links(cmd: &str) -> Option<Intent> {
    cmd.contains("read links").then_some(Intent::ReadLinks)
}

fn m_click_link(cmd: &str) -> Option<Intent> {
    let caps = CLICK_LINK_RE.captures(cmd)?;
    let spoken = caps.get(1)?.as_str();
    let target = if spoken == "last" {
        LinkRef::Last
    } else {
        LinkRef::Number(spoken.parse().ok()?)
    };
    Some(Intent::ClickLink(target))
}

fn m_summarize(cmd: &str) -> Option<Intent> {
    cmd.contains("summarize").then_some(Intent::Summarize)
}

const GENERIC: &[Matcher] = &[
    m_scroll_down,
    m_scroll_up,
    m_go_to_top,
    m_go_to_bottom,
    m_read_title,
    m_read_first_paragraph,
    m_read_all_text,
    m_stop_reading,
    m_read_links,
    m_click_link,
    m_summarize,
];

// Video-site matchers. These are exact phrases.

fn m_play_video(cmd: &str) -> Option<Intent> {
    (cmd == "play video" || cmd == "start video").then_some(Intent::PlayVideo)
}

fn m_pause_video(cmd: &str) -> Option<Intent> {
    (cmd == "pause video" || cmd == "stop video").then_some(Intent::PauseVideo)
}

fn m_mute(cmd: &str) -> Option<Intent> {
    (cmd == "mute").then_some(Intent::Mute)
}

fn m_unmute(cmd: &str) -> Option<Intent> {
    (cmd == "unmute").then_some(Intent::Unmute)
}

fn m_volume_up(cmd: &str) -> Option<Intent> {
    (cmd == "volume up").then_some(Intent::VolumeUp)
}

fn m_volume_down(cmd: &str) -> Option<Intent> {
    (cmd == "volume down").then_some(Intent::VolumeDown)
}

fn m_skip_forward(cmd: &str) -> Option<Intent> {
    (cmd == "skip forward").then_some(Intent::SkipForward)
}

fn m_rewind(cmd: &str) -> Option<Intent> {
    (cmd == "rewind").then_some(Intent::Rewind)
}

fn m_read_video_title(cmd: &str) -> Option<Intent> {
    (cmd == "read video title").then_some(Intent::ReadVideoTitle)
}

fn m_read_description(cmd: &str) -> Option<Intent> {
    (cmd == "read description").then_some(Intent::ReadDescription)
}

fn m_read_comments(cmd: &str) -> Option<Intent> {
    (cmd == "read comments").then_some(Intent::ReadComments)
}

fn m_next_video(cmd: &str) -> Option<Intent> {
    (cmd == "next video").then_some(Intent::NextVideo)
}

fn m_previous_video(cmd: &str) -> Option<Intent> {
    (cmd == "previous video").then_some(Intent::PreviousVideo)
}

const VIDEO: &[Matcher] = &[
    m_play_video,
    m_pause_video,
    m_mute,
    m_unmute,
    m_volume_up,
    m_volume_down,
    m_skip_forward,
    m_rewind,
    m_read_video_title,
    m_read_description,
    m_read_comments,
    m_next_video,
    m_previous_video,
];

// Social-feed matchers.

fn m_read_latest_tweet(cmd: &str) -> Option<Intent> {
    (cmd == "read latest tweet" || cmd == "read first tweet").then_some(Intent::ReadLatestTweet)
}

fn m_read_tweet(cmd: &str) -> Option<Intent> {
    captured_number(&READ_TWEET_RE, cmd).map(Intent::ReadTweet)
}

fn m_like_tweet(cmd: &str) -> Option<Intent> {
    captured_number(&LIKE_TWEET_RE, cmd).map(Intent::LikeTweet)
}

fn m_share_tweet(cmd: &str) -> Option<Intent> {
    captured_number(&SHARE_TWEET_RE, cmd).map(Intent::ShareTweet)
}

fn m_open_tweet(cmd: &str) -> Option<Intent> {
    captured_number(&OPEN_TWEET_RE, cmd).map(Intent::OpenTweet)
}

const FEED: &[Matcher] = &[
    m_read_latest_tweet,
    m_read_tweet,
    m_like_tweet,
    m_share_tweet,
    m_open_tweet,
];

// Search-results matchers.

fn m_read_top_result(cmd: &str) -> Option<Intent> {
    (cmd.contains("read top result") || cmd.contains("read first result"))
        .then_some(Intent::ReadTopResult)
}

fn m_read_result(cmd: &str) -> Option<Intent> {
    captured_number(&READ_RESULT_RE, cmd).map(Intent::ReadResult)
}

fn m_open_result(cmd: &str) -> Option<Intent> {
    captured_number(&OPEN_RESULT_RE, cmd).map(Intent::OpenResult)
}

fn m_read_all_results(cmd: &str) -> Option<Intent> {
    cmd.contains("read all results").then_some(Intent::ReadAllResults)
}

const SEARCH: &[Matcher] = &[
    m_read_top_result,
    m_read_result,
    m_open_result,
    m_read_all_results,
];

// Article matchers.

fn m_read_section(cmd: &str) -> Option<Intent> {
    let caps = READ_SECTION_RE.captures(cmd)?;
    Some(Intent::ReadSection(caps.get(1)?.as_str().to_string()))
}

fn m_go_to_section(cmd: &str) -> Option<Intent> {
    let caps = GO_SECTION_RE.captures(cmd)?;
    Some(Intent::GoToSection(caps.get(1)?.as_str().to_string()))
}

const ARTICLE: &[Matcher] = &[m_read_section, m_go_to_section];

/// Resolve a normalized command to an intent. First match wins; a command
/// that matches nothing within the applicable scope falls through to
/// `Unrecognized` even if another scope would have matched it.
pub fn route(command: &str, scope: Scope) -> Intent {
    let scoped: &[Matcher] = match scope {
        Scope::Video => VIDEO,
        Scope::Feed => FEED,
        Scope::Search => SEARCH,
        Scope::Article => ARTICLE,
    };

    for matcher in GENERIC.iter().chain(scoped) {
        if let Some(intent) = matcher(command) {
            return intent;
        }
    }
    Intent::Unrecognized
}
