//! Site launcher - utterances that open a site instead of acting on the page
//!
//! Runs before the in-page interpreter, the way the background coordinator
//! intercepted queries before forwarding them to the content script. A
//! matched utterance becomes a tab navigation; anything else falls through
//! to the interpreter.

use url::Url;

/// URL to open for a launch utterance, if it is one.
pub fn match_site_launch(query: &str) -> Option<String> {
    if query.contains("search") {
        let q = query.replacen("search", "", 1).trim().to_string();
        return search_url("https://www.google.com/search", &q);
    }
    if query.contains("youtube") {
        let q = query.replacen("youtube", "", 1).trim().to_string();
        return search_url("https://www.youtube.com/results", &q);
    }
    if query.contains("wikipedia") {
        let q = query.replacen("wikipedia", "", 1).trim().to_string();
        // Only the first space becomes an underscore, as the original did.
        let title = q.replacen(' ', "_", 1);
        return Url::parse(&format!("https://en.wikipedia.org/wiki/{}", title))
            .ok()
            .map(|u| u.to_string());
    }
    if query.contains("twitter") {
        return Some("https://x.com".to_string());
    }
    None
}

fn search_url(base: &str, q: &str) -> Option<String> {
    let param = if base.contains("youtube") { "search_query" } else { "q" };
    Url::parse_with_params(base, &[(param, q)])
        .ok()
        .map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_launch() {
        let url = match_site_launch("search rust programming").unwrap();
        assert_eq!(url, "https://www.google.com/search?q=rust+programming");
    }

    #[test]
    fn test_youtube_launch() {
        let url = match_site_launch("youtube lofi beats").unwrap();
        assert_eq!(url, "https://www.youtube.com/results?search_query=lofi+beats");
    }

    #[test]
    fn test_wikipedia_launch_first_space_only() {
        let url = match_site_launch("wikipedia ada lovelace").unwrap();
        assert_eq!(url, "https://en.wikipedia.org/wiki/ada_lovelace");
    }

    #[test]
    fn test_twitter_launch() {
        assert_eq!(match_site_launch("twitter").as_deref(), Some("https://x.com"));
    }

    #[test]
    fn test_page_commands_fall_through() {
        assert_eq!(match_site_launch("scroll down"), None);
        assert_eq!(match_site_launch("read all results"), None);
        assert_eq!(match_site_launch("read tweet number 2"), None);
        assert_eq!(match_site_launch("summarize"), None);
    }
}
