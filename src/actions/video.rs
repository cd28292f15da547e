//! Video-site controls - playback, volume, seeking, metadata reading
//!
//! Players load late, so playback controls wait for the `<video>` element
//! with a bounded poll before acting.

use std::thread;
use std::time::Duration;

use super::{ActionContext, Outcome};
use crate::page::{DriverResult, VideoCommand};

const VOLUME_STEP: f64 = 0.1;
const SEEK_SECONDS: f64 = 10.0;

/// Selector fallback chain for the watch-page title.
const TITLE_SELECTORS: &[&str] = &[
    "h1.title yt-formatted-string",
    "h1.ytd-watch-metadata",
    "h1",
    "title",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    "#description",
    "#description yt-formatted-string",
    "ytd-expander .content",
];

const COMMENT_SELECTOR: &str = "#comments #content-text";
const NEXT_BUTTON_SELECTOR: &str = ".ytp-next-button, ytd-compact-video-renderer a";

/// Wait for the player element to appear, up to the configured bound.
fn wait_for_video(ctx: &ActionContext) -> DriverResult<bool> {
    for attempt in 0..ctx.tuning.video_poll_attempts {
        if ctx.page.has_video()? {
            return Ok(true);
        }
        if attempt + 1 < ctx.tuning.video_poll_attempts {
            thread::sleep(Duration::from_millis(ctx.tuning.video_poll_interval_ms));
        }
    }
    Ok(false)
}

fn control(ctx: &mut ActionContext, cmd: VideoCommand, confirmation: &str) -> DriverResult<Outcome> {
    if wait_for_video(ctx)? {
        ctx.page.video_command(cmd)?;
        ctx.say(confirmation);
    } else {
        ctx.say("No video player found on this page.");
    }
    Ok(Outcome::Handled)
}

pub fn play(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    control(ctx, VideoCommand::Play, "Video playing")
}

pub fn pause(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    control(ctx, VideoCommand::Pause, "Video paused")
}

pub fn mute(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    control(ctx, VideoCommand::SetMuted(true), "Muted")
}

pub fn unmute(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    control(ctx, VideoCommand::SetMuted(false), "Unmuted")
}

pub fn volume_up(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    control(ctx, VideoCommand::AdjustVolume(VOLUME_STEP), "Volume up")
}

pub fn volume_down(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    control(ctx, VideoCommand::AdjustVolume(-VOLUME_STEP), "Volume down")
}

pub fn skip_forward(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    control(
        ctx,
        VideoCommand::SeekBy(SEEK_SECONDS),
        "Skipped forward 10 seconds",
    )
}

pub fn rewind(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    control(ctx, VideoCommand::SeekBy(-SEEK_SECONDS), "Rewinded 10 seconds")
}

/// First non-empty text for any selector in the chain.
fn first_text(ctx: &ActionContext, selectors: &[&str]) -> DriverResult<Option<String>> {
    for selector in selectors {
        if let Some(el) = ctx.page.query(selector)?.into_iter().next() {
            let text = el.trimmed_text().to_string();
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

pub fn read_title(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    let title = match first_text(ctx, TITLE_SELECTORS)? {
        Some(t) => t,
        None => ctx.page.title()?,
    };
    ctx.say(&format!("Title: {}", title));
    Ok(Outcome::Handled)
}

pub fn read_description(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    match first_text(ctx, DESCRIPTION_SELECTORS)? {
        Some(desc) => ctx.say(&format!("Description: {}", desc)),
        None => ctx.say("Description not found."),
    }
    Ok(Outcome::Handled)
}

pub fn read_comments(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    match first_text(ctx, &[COMMENT_SELECTOR])? {
        Some(comment) => ctx.say(&format!("First comment says: {}", comment)),
        None => ctx.say("No comments found."),
    }
    Ok(Outcome::Handled)
}

pub fn next_video(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    match ctx.page.query(NEXT_BUTTON_SELECTOR)?.first() {
        Some(button) => ctx.page.click(button)?,
        None => ctx.say("Next video button not found."),
    }
    Ok(Outcome::Handled)
}

pub fn previous_video(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    ctx.page.history_back()?;
    Ok(Outcome::Handled)
}
