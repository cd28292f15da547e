//! Generic page controls - scrolling, reading, links, summarization
//!
//! These work on every origin and are always matched before any site-scoped
//! set.

use super::{ActionContext, Outcome, zero_based};
use crate::page::{self, DriverResult, PageElement, ScrollEdge};
use crate::router::LinkRef;
use crate::services::SUMMARY_WAIT_PHRASE;

/// Content tags considered when collecting text for summarization.
const SUMMARY_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, article, section";
/// Tags read aloud by "read all text".
const READ_ALL_SELECTOR: &str = "p, li, blockquote, h1, h2, h3, h4";
/// Blocks shorter than this are skipped by "read all text".
const READ_ALL_MIN_CHARS: usize = 30;

pub fn scroll_down(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    ctx.page.scroll_by(ctx.tuning.scroll_step)?;
    ctx.settle();
    ctx.say("Scrolled down.");
    Ok(Outcome::Handled)
}

pub fn scroll_up(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    ctx.page.scroll_by(-ctx.tuning.scroll_step)?;
    ctx.settle();
    ctx.say("Scrolled up.");
    Ok(Outcome::Handled)
}

pub fn go_to_top(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    ctx.page.scroll_to(ScrollEdge::Top)?;
    ctx.settle();
    ctx.say("Went to the top of the page.");
    Ok(Outcome::Handled)
}

pub fn go_to_bottom(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    ctx.page.scroll_to(ScrollEdge::Bottom)?;
    ctx.settle();
    ctx.say("Went to the bottom of the page.");
    Ok(Outcome::Handled)
}

pub fn read_title(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    let title = ctx.page.title()?;
    ctx.say(&title);
    Ok(Outcome::Handled)
}

pub fn read_first_paragraph(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    let vp = ctx.page.viewport()?;
    let paragraphs = ctx.page.query("p")?;
    let first = paragraphs
        .iter()
        .find(|p| !p.trimmed_text().is_empty() && page::in_viewport(&p.rect, &vp));

    match first {
        Some(p) => ctx.say(p.trimmed_text()),
        None => ctx.say("No visible paragraph found."),
    }
    Ok(Outcome::Handled)
}

pub fn read_all_text(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    let vp = ctx.page.viewport()?;
    let blocks = ctx.page.query(READ_ALL_SELECTOR)?;
    let readable: Vec<&PageElement> = blocks
        .iter()
        .filter(|el| {
            el.trimmed_text().chars().count() > READ_ALL_MIN_CHARS
                && page::in_viewport(&el.rect, &vp)
                && el.displayed
        })
        .take(ctx.tuning.read_all_limit)
        .collect();

    if readable.is_empty() {
        ctx.say("No visible readable content found.");
    } else {
        for el in readable {
            ctx.say(el.trimmed_text());
        }
    }
    Ok(Outcome::Handled)
}

pub fn stop_reading(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    ctx.speech.cancel();
    ctx.say("Reading stopped");
    Ok(Outcome::Handled)
}

/// All links with visible, non-empty text inside the viewport, document order.
fn visible_links(ctx: &ActionContext) -> DriverResult<Vec<PageElement>> {
    let vp = ctx.page.viewport()?;
    Ok(ctx
        .page
        .query("a")?
        .into_iter()
        .filter(|a| {
            !a.trimmed_text().is_empty() && a.displayed && page::in_viewport(&a.rect, &vp)
        })
        .collect())
}

pub fn read_links(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    let links = visible_links(ctx)?;

    if links.is_empty() {
        ctx.say("No visible links found on this page.");
    } else {
        for (i, link) in links.iter().enumerate() {
            ctx.say(&format!("{}. {}", i + 1, link.trimmed_text()));
        }
    }
    ctx.session.links = Some(links);
    Ok(Outcome::Handled)
}

pub fn click_link(ctx: &mut ActionContext, target: LinkRef) -> DriverResult<Outcome> {
    // Reuse the list from the last "read links"; requery when there is none.
    let links = match ctx.session.links.take() {
        Some(cached) if !cached.is_empty() => cached,
        _ => visible_links(ctx)?,
    };

    let index = match target {
        LinkRef::Last => links.len().checked_sub(1),
        LinkRef::Number(n) => zero_based(n),
    };

    match index.and_then(|i| links.get(i)) {
        Some(link) => {
            let position = index.unwrap_or(0) + 1;
            ctx.say(&format!("Clicking link {}: {}", position, link.trimmed_text()));
            ctx.page.click(link)?;
        }
        None => ctx.say("That link number is not available."),
    }
    ctx.session.links = Some(links);
    Ok(Outcome::Handled)
}

/// Text visible on the page, joined in document order and capped for the
/// summarization service.
pub fn collect_summary_text(ctx: &ActionContext) -> DriverResult<String> {
    let blocks = ctx.page.query(SUMMARY_SELECTOR)?;
    let joined = blocks
        .iter()
        .filter(|el| page::has_size(&el.rect) && el.displayed)
        .map(|el| el.trimmed_text())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(truncate_chars(&joined, ctx.tuning.summary_char_limit))
}

pub fn summarize(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    let text = collect_summary_text(ctx)?;
    if text.is_empty() {
        ctx.say("No readable content found on this page.");
        return Ok(Outcome::Handled);
    }

    ctx.say(SUMMARY_WAIT_PHRASE);
    Ok(Outcome::Summarize {
        text,
        generation: ctx.session.generation,
    })
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
