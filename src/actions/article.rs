//! Encyclopedia-article controls - reading and jumping to sections
//!
//! Section lookup is a case-insensitive substring match over the page's
//! h2/h3/h4 headings. Reading collects the heading's following siblings
//! until the next heading of equal or higher rank.

use super::{ActionContext, Outcome};
use crate::page::{Block, DriverResult, PageElement};

const HEADING_SELECTOR: &str = "h2, h3, h4";

/// Numeric rank of a heading tag; lower is more important.
fn heading_rank(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn find_heading(ctx: &ActionContext, title: &str) -> DriverResult<Option<PageElement>> {
    let wanted = title.to_lowercase();
    Ok(ctx
        .page
        .query(HEADING_SELECTOR)?
        .into_iter()
        .find(|h| h.text.to_lowercase().contains(&wanted)))
}

/// Content blocks belonging to `heading`: following siblings up to the next
/// heading of equal or higher rank.
pub fn section_blocks(heading_tag: &str, siblings: &[Block]) -> Vec<String> {
    let own_rank = heading_rank(heading_tag).unwrap_or(u8::MAX);
    let mut texts = Vec::new();
    for block in siblings {
        if let Some(rank) = heading_rank(&block.tag) {
            if rank <= own_rank {
                break;
            }
        }
        let text = block.text.trim();
        if !text.is_empty() {
            texts.push(text.to_string());
        }
    }
    texts
}

pub fn read_section(ctx: &mut ActionContext, title: &str) -> DriverResult<Outcome> {
    let heading = match find_heading(ctx, title)? {
        Some(h) => h,
        None => {
            ctx.say("Section not found.");
            return Ok(Outcome::Handled);
        }
    };

    let siblings = ctx.page.following_blocks(&heading)?;
    let texts = section_blocks(&heading.tag, &siblings);

    if texts.is_empty() {
        ctx.say("No content found in that section.");
    } else {
        for text in texts.iter().take(ctx.tuning.section_limit) {
            ctx.say(text);
        }
    }
    Ok(Outcome::Handled)
}

pub fn go_to_section(ctx: &mut ActionContext, title: &str) -> DriverResult<Outcome> {
    match find_heading(ctx, title)? {
        Some(heading) => {
            ctx.page.scroll_into_view(&heading)?;
            ctx.say(&format!("Scrolled to section {}", title));
        }
        None => ctx.say("Section not found."),
    }
    Ok(Outcome::Handled)
}
