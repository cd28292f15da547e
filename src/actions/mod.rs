//! DOM action executors - one handler per intent
//!
//! Executors recompute their element sets fresh from the driver on every
//! command, convert spoken 1-based indices at lookup time, and degrade to a
//! specific spoken message whenever a target is missing. The only work that
//! leaves the executor is a summary submission, which the event loop runs on
//! a worker thread.

pub mod article;
pub mod feed;
pub mod generic;
pub mod search;
pub mod video;

use std::thread;
use std::time::Duration;

use crate::config::Tuning;
use crate::page::{DriverResult, PageDriver};
use crate::router::Intent;
use crate::session::TabSession;
use crate::speech::SpeechSink;

/// Everything an executor may touch, owned elsewhere and borrowed per command.
pub struct ActionContext<'a> {
    pub page: &'a dyn PageDriver,
    pub speech: &'a dyn SpeechSink,
    pub session: &'a mut TabSession,
    pub tuning: &'a Tuning,
}

impl ActionContext<'_> {
    pub fn say(&self, text: &str) {
        self.speech.enqueue(text);
    }

    /// Let a scroll or navigation settle before speaking.
    pub fn settle(&self) {
        if self.tuning.settle_ms > 0 {
            thread::sleep(Duration::from_millis(self.tuning.settle_ms));
        }
    }
}

/// What a dispatched command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Handled to completion, including all spoken feedback.
    Handled,
    /// Page text collected for summarization; the event loop submits it and
    /// speaks the reply unless a newer command has started.
    Summarize { text: String, generation: u64 },
}

/// Run the executor for `intent`. Driver errors bubble to the interpreter,
/// which turns them into a spoken message.
pub fn run(intent: Intent, ctx: &mut ActionContext) -> DriverResult<Outcome> {
    match intent {
        Intent::ScrollDown => generic::scroll_down(ctx),
        Intent::ScrollUp => generic::scroll_up(ctx),
        Intent::GoToTop => generic::go_to_top(ctx),
        Intent::GoToBottom => generic::go_to_bottom(ctx),
        Intent::ReadTitle => generic::read_title(ctx),
        Intent::ReadFirstParagraph => generic::read_first_paragraph(ctx),
        Intent::ReadAllText => generic::read_all_text(ctx),
        Intent::StopReading => generic::stop_reading(ctx),
        Intent::ReadLinks => generic::read_links(ctx),
        Intent::ClickLink(target) => generic::click_link(ctx, target),
        Intent::Summarize => generic::summarize(ctx),

        Intent::PlayVideo => video::play(ctx),
        Intent::PauseVideo => video::pause(ctx),
        Intent::Mute => video::mute(ctx),
        Intent::Unmute => video::unmute(ctx),
        Intent::VolumeUp => video::volume_up(ctx),
        Intent::VolumeDown => video::volume_down(ctx),
        Intent::SkipForward => video::skip_forward(ctx),
        Intent::Rewind => video::rewind(ctx),
        Intent::ReadVideoTitle => video::read_title(ctx),
        Intent::ReadDescription => video::read_description(ctx),
        Intent::ReadComments => video::read_comments(ctx),
        Intent::NextVideo => video::next_video(ctx),
        Intent::PreviousVideo => video::previous_video(ctx),

        Intent::ReadLatestTweet => feed::read_tweet(ctx, 1),
        Intent::ReadTweet(n) => feed::read_tweet(ctx, n),
        Intent::LikeTweet(n) => feed::like_tweet(ctx, n),
        Intent::ShareTweet(n) => feed::share_tweet(ctx, n),
        Intent::OpenTweet(n) => feed::open_tweet(ctx, n),

        Intent::ReadTopResult => search::read_top_result(ctx),
        Intent::ReadResult(n) => search::read_result(ctx, n),
        Intent::OpenResult(n) => search::open_result(ctx, n),
        Intent::ReadAllResults => search::read_all_results(ctx),

        Intent::ReadSection(title) => article::read_section(ctx, &title),
        Intent::GoToSection(title) => article::go_to_section(ctx, &title),

        Intent::Unrecognized => {
            ctx.say("Sorry, I didn't understand that command.");
            Ok(Outcome::Handled)
        }
    }
}

/// Convert a spoken 1-based index to 0-based; zero yields none.
pub(crate) fn zero_based(spoken: u32) -> Option<usize> {
    (spoken as usize).checked_sub(1)
}
