//! Command normalization - unifies spoken phrasing before intent matching
//!
//! Raw transcripts arrive lower-cased and trimmed. Normalization is a fixed
//! sequence of pure string rewrites:
//! 1. Summarize synonyms collapse to "summarize"
//! 2. Spoken ordinals/cardinals before "link" become digits
//! 3. Scrolling synonyms collapse to canonical forms
//!
//! Re-normalizing a normalized command yields itself.

use once_cell::sync::Lazy;
use regex::Regex;

/// Spoken ordinal/cardinal words and their values (1-20 and 30).
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
    ("eleventh", 11),
    ("twelfth", 12),
    ("thirteenth", 13),
    ("fourteenth", 14),
    ("fifteenth", 15),
    ("sixteenth", 16),
    ("seventeenth", 17),
    ("eighteenth", 18),
    ("nineteenth", 19),
    ("twentieth", 20),
    ("thirtieth", 30),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    ("thirty", 30),
];

/// Look up a spoken number word, falling back to parsing a digit literal.
pub fn word_to_number(word: &str) -> Option<u32> {
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, n)| *n)
        .or_else(|| word.parse().ok())
}

static SUMMARIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(summarize|summarise|summary)\b").unwrap());

static LINK_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:the )?(first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth|eleventh|twelfth|thirteenth|fourteenth|fifteenth|sixteenth|seventeenth|eighteenth|nineteenth|twentieth|thirtieth|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty) link\b",
    )
    .unwrap()
});

static SCROLL_DOWN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(go|move|scroll) (down|lower)").unwrap());
static SCROLL_UP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(go|move|scroll) (up|higher)").unwrap());
static GO_TOP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(go|move) to top").unwrap());
static GO_BOTTOM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(go|move) to bottom").unwrap());

/// Normalize a raw command string. Pure and deterministic; substrings that
/// match no rule are left untouched.
pub fn normalize(command: &str) -> String {
    let cmd = SUMMARIZE_RE.replace_all(command, "summarize");

    let cmd = LINK_NUMBER_RE.replace_all(&cmd, |caps: &regex::Captures| {
        let word = &caps[1];
        match word_to_number(word) {
            Some(n) => format!("{} link", n),
            None => format!("{} link", word),
        }
    });

    let cmd = SCROLL_DOWN_RE.replace_all(&cmd, "scroll down");
    let cmd = SCROLL_UP_RE.replace_all(&cmd, "scroll up");
    // The top/bottom rules only ever rewrite the first occurrence.
    let cmd = GO_TOP_RE.replace(&cmd, "go to top");
    let cmd = GO_BOTTOM_RE.replace(&cmd, "go to bottom");

    cmd.into_owned()
}
