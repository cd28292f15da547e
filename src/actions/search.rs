//! Search-results controls - reading and opening result headings
//!
//! Results are the `h3` headings currently inside the viewport; opening one
//! navigates to its enclosing anchor.

use super::{ActionContext, Outcome, zero_based};
use crate::page::{self, DriverResult, PageElement};

fn visible_results(ctx: &ActionContext) -> DriverResult<Vec<PageElement>> {
    let vp = ctx.page.viewport()?;
    Ok(ctx
        .page
        .query("h3")?
        .into_iter()
        .filter(|el| page::in_viewport(&el.rect, &vp))
        .collect())
}

pub fn read_top_result(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    let results = visible_results(ctx)?;
    match results.first() {
        Some(result) => ctx.say(result.trimmed_text()),
        None => ctx.say("No results found."),
    }
    Ok(Outcome::Handled)
}

pub fn read_result(ctx: &mut ActionContext, number: u32) -> DriverResult<Outcome> {
    let results = visible_results(ctx)?;
    match zero_based(number).and_then(|i| results.get(i)) {
        Some(result) => ctx.say(result.trimmed_text()),
        None => ctx.say("Result not found."),
    }
    Ok(Outcome::Handled)
}

pub fn open_result(ctx: &mut ActionContext, number: u32) -> DriverResult<Outcome> {
    let results = visible_results(ctx)?;
    let href = match zero_based(number).and_then(|i| results.get(i)) {
        Some(result) => ctx.page.enclosing_href(result, "a")?,
        None => None,
    };

    match href {
        Some(url) => ctx.page.navigate(&url)?,
        None => ctx.say("Could not open that result."),
    }
    Ok(Outcome::Handled)
}

pub fn read_all_results(ctx: &mut ActionContext) -> DriverResult<Outcome> {
    let results = visible_results(ctx)?;
    if results.is_empty() {
        ctx.say("No search results found.");
    } else {
        for (i, result) in results.iter().take(ctx.tuning.results_limit).enumerate() {
            ctx.say(&format!("{}: {}", i + 1, result.trimmed_text()));
        }
    }
    Ok(Outcome::Handled)
}
