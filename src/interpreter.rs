//! Command pipeline - normalize, route, dispatch
//!
//! One command is processed to completion before the next is handled. Each
//! command cancels whatever the previous one was still saying, then queues
//! its own feedback. Driver failures degrade to a spoken error line; nothing
//! here panics or propagates.

use crate::actions::{self, ActionContext, Outcome};
use crate::command::normalize;
use crate::router::{self, Scope};

/// Spoken when an executor hits a driver failure (page gone mid-command,
/// evaluation error).
pub const FAILURE_PHRASE: &str = "Sorry, something went wrong running that command.";

/// Interpret one raw transcript against the current page.
pub fn handle(raw: &str, ctx: &mut ActionContext) -> Outcome {
    let command = normalize(raw.to_lowercase().trim());

    // New command: stop leftover speech, invalidate stale service replies.
    ctx.speech.cancel();
    ctx.session.begin_command();

    let scope = match ctx.page.origin() {
        Ok(origin) => Scope::for_origin(&origin),
        Err(e) => {
            eprintln!("interpreter: origin unavailable ({}), using article scope", e);
            Scope::Article
        }
    };

    let intent = router::route(&command, scope);
    match actions::run(intent, ctx) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("interpreter: command {:?} failed: {}", command, e);
            ctx.say(FAILURE_PHRASE);
            Outcome::Handled
        }
    }
}
