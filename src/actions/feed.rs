//! Social-feed controls - reading, liking, sharing, opening posts
//!
//! Feed items are the `article[role="article"]` elements whose vertical
//! bounds sit inside the viewport. Indices are spoken 1-based; "read latest
//! tweet" is index 1. Reads wait for the settle delay first so a fresh
//! scroll has finished rendering.

use super::{ActionContext, Outcome, zero_based};
use crate::page::{self, DriverResult, PageElement};

const TWEET_SELECTOR: &str = "article[role=\"article\"]";
const STATUS_LINK_SELECTOR: &str = "a[href*=\"/status/\"]";

fn visible_tweets(ctx: &ActionContext) -> DriverResult<Vec<PageElement>> {
    let vp = ctx.page.viewport()?;
    Ok(ctx
        .page
        .query(TWEET_SELECTOR)?
        .into_iter()
        .filter(|el| page::in_vertical_band(&el.rect, &vp))
        .collect())
}

/// Join a tweet's text lines into speakable prose, dropping empty lines and
/// bare counters.
pub fn clean_tweet_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(". ")
}

pub fn read_tweet(ctx: &mut ActionContext, number: u32) -> DriverResult<Outcome> {
    ctx.settle();

    let tweets = visible_tweets(ctx)?;
    eprintln!("feed: {} visible tweets", tweets.len());

    if tweets.is_empty() {
        ctx.say("No visible tweets found.");
        return Ok(Outcome::Handled);
    }

    match zero_based(number).and_then(|i| tweets.get(i)) {
        Some(tweet) => {
            let text = clean_tweet_text(&ctx.page.cleaned_text(tweet)?);
            if text.is_empty() {
                ctx.say("Tweet found but it has no readable text.");
            } else {
                ctx.say(&format!("Tweet {}: {}", number, text));
            }
        }
        None => ctx.say("That tweet number is not available."),
    }
    Ok(Outcome::Handled)
}

/// Click a named action button inside the numbered tweet.
fn click_tweet_button(
    ctx: &mut ActionContext,
    number: u32,
    test_id: &str,
    action_name: &str,
) -> DriverResult<Outcome> {
    let tweets = visible_tweets(ctx)?;
    let tweet = match zero_based(number).and_then(|i| tweets.get(i)) {
        Some(t) => t,
        None => {
            ctx.say(&format!("Tweet number {} is not available.", number));
            return Ok(Outcome::Handled);
        }
    };

    let selector = format!("[data-testid=\"{}\"]", test_id);
    if ctx.page.click_descendant(tweet, &selector)? {
        ctx.say(&format!("{} tweet number {}", action_name, number));
    } else {
        ctx.say(&format!(
            "Couldn't find the {} button on tweet {}",
            action_name.to_lowercase(),
            number
        ));
    }
    Ok(Outcome::Handled)
}

pub fn like_tweet(ctx: &mut ActionContext, number: u32) -> DriverResult<Outcome> {
    click_tweet_button(ctx, number, "like", "Liked")
}

pub fn share_tweet(ctx: &mut ActionContext, number: u32) -> DriverResult<Outcome> {
    click_tweet_button(ctx, number, "retweet", "Retweeted")
}

pub fn open_tweet(ctx: &mut ActionContext, number: u32) -> DriverResult<Outcome> {
    let tweets = visible_tweets(ctx)?;
    let tweet = match zero_based(number).and_then(|i| tweets.get(i)) {
        Some(t) => t,
        None => {
            ctx.say(&format!("Tweet number {} is not available.", number));
            return Ok(Outcome::Handled);
        }
    };

    match ctx.page.descendant_href(tweet, STATUS_LINK_SELECTOR)? {
        Some(href) => {
            ctx.say(&format!("Opening tweet number {}", number));
            ctx.page.navigate(&href)?;
        }
        None => ctx.say("Could not open that tweet."),
    }
    Ok(Outcome::Handled)
}
