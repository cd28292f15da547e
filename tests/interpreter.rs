//! End-to-end interpreter tests against a scripted page driver.

mod common;

use common::{FakePage, Harness, Recorded, block, visible};
use websight::actions::Outcome;
use websight::filters::Condition;
use websight::page::{Rect, ScrollEdge, VideoCommand};
use websight::services::{self, SUMMARY_ERROR_PHRASE};
use websight::session;

const SUMMARY_SELECTOR: &str = "p, h1, h2, h3, h4, h5, h6, li, article, section";
const TWEET_SELECTOR: &str = "article[role=\"article\"]";

fn article_page() -> FakePage {
    FakePage::new("en.wikipedia.org", "/wiki/Ada_Lovelace")
}

fn page_with_links(texts: &[&str]) -> FakePage {
    let mut page = article_page();
    for (i, text) in texts.iter().enumerate() {
        page.add("a", visible("a", text, 50.0 + 30.0 * i as f64));
    }
    page
}

// ---------------------------------------------------------------------------
// Generic controls
// ---------------------------------------------------------------------------

#[test]
fn scroll_down_scrolls_and_confirms() {
    let mut h = Harness::new(article_page());
    h.handle("scroll down");
    assert_eq!(h.recorded(), vec![Recorded::ScrollBy(500.0)]);
    assert_eq!(h.spoken(), vec!["Scrolled down."]);
}

#[test]
fn scroll_synonyms_share_one_action() {
    let mut h = Harness::new(article_page());
    h.handle("go lower");
    h.handle("move down");
    assert_eq!(
        h.recorded(),
        vec![Recorded::ScrollBy(500.0), Recorded::ScrollBy(500.0)]
    );
    assert_eq!(h.spoken(), vec!["Scrolled down.", "Scrolled down."]);
}

#[test]
fn go_to_edges() {
    let mut h = Harness::new(article_page());
    h.handle("go to top");
    h.handle("move to bottom");
    assert_eq!(
        h.recorded(),
        vec![
            Recorded::ScrollTo(ScrollEdge::Top),
            Recorded::ScrollTo(ScrollEdge::Bottom)
        ]
    );
    assert_eq!(
        h.spoken(),
        vec!["Went to the top of the page.", "Went to the bottom of the page."]
    );
}

#[test]
fn read_title_speaks_document_title() {
    let mut page = article_page();
    page.title = "Ada Lovelace - Wikipedia".to_string();
    let mut h = Harness::new(page);
    h.handle("read title");
    assert_eq!(h.spoken(), vec!["Ada Lovelace - Wikipedia"]);
}

#[test]
fn read_first_paragraph_picks_first_visible() {
    let mut page = article_page();
    // Off-viewport paragraph is skipped
    page.add("p", visible("p", "below the fold", 2000.0));
    page.add("p", visible("p", "the visible one", 100.0));
    let mut h = Harness::new(page);
    h.handle("read first paragraph");
    assert_eq!(h.spoken(), vec!["the visible one"]);
}

#[test]
fn read_first_paragraph_degrades() {
    let mut h = Harness::new(article_page());
    h.handle("read first paragraph");
    assert_eq!(h.spoken(), vec!["No visible paragraph found."]);
}

#[test]
fn read_all_text_skips_short_and_hidden_blocks() {
    let mut page = article_page();
    let selector = "p, li, blockquote, h1, h2, h3, h4";
    page.add(selector, visible("p", "short", 40.0));
    let mut hidden = visible(
        "p",
        "this block is long enough to read but it is hidden away",
        80.0,
    );
    hidden.displayed = false;
    page.add(selector, hidden);
    page.add(
        selector,
        visible("p", "this block is long enough to be read aloud in full", 120.0),
    );

    let mut h = Harness::new(page);
    h.handle("read all text");
    assert_eq!(
        h.spoken(),
        vec!["this block is long enough to be read aloud in full"]
    );
}

#[test]
fn stop_reading_cancels_then_confirms() {
    let mut h = Harness::new(article_page());
    h.handle("stop reading");
    // One cancel at command start, one from the stop executor.
    assert_eq!(h.speech.cancel_count(), 2);
    assert_eq!(h.spoken(), vec!["Reading stopped"]);
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

#[test]
fn read_links_enumerates_visible_links() {
    let mut page = page_with_links(&["Home", "Talk"]);
    page.add("a", visible("a", "Offscreen", 5000.0));
    let mut empty = visible("a", "", 200.0);
    empty.text = "   ".to_string();
    page.add("a", empty);

    let mut h = Harness::new(page);
    h.handle("read links");
    assert_eq!(h.spoken(), vec!["1. Home", "2. Talk"]);
}

#[test]
fn read_links_degrades_when_none() {
    let mut h = Harness::new(article_page());
    h.handle("read links");
    assert_eq!(h.spoken(), vec!["No visible links found on this page."]);
}

#[test]
fn click_second_link_in_document_order() {
    let mut h = Harness::new(page_with_links(&["alpha", "beta", "gamma"]));
    h.handle("click 2 link");
    assert_eq!(h.recorded(), vec![Recorded::Click("beta".to_string())]);
    assert_eq!(h.spoken(), vec!["Clicking link 2: beta"]);
}

#[test]
fn spoken_ordinals_click_too() {
    let mut h = Harness::new(page_with_links(&["alpha", "beta", "gamma"]));
    h.handle("click the third link");
    assert_eq!(h.recorded(), vec![Recorded::Click("gamma".to_string())]);
}

#[test]
fn click_last_link_clicks_final_one() {
    let mut h = Harness::new(page_with_links(&["alpha", "beta", "gamma"]));
    h.handle("click last link");
    assert_eq!(h.recorded(), vec![Recorded::Click("gamma".to_string())]);
    assert_eq!(h.spoken(), vec!["Clicking link 3: gamma"]);
}

#[test]
fn click_out_of_range_link_degrades() {
    let mut h = Harness::new(page_with_links(&["alpha", "beta"]));
    h.handle("click 9 link");
    assert!(h.recorded().is_empty());
    assert_eq!(h.spoken(), vec!["That link number is not available."]);
}

#[test]
fn click_zero_link_degrades() {
    let mut h = Harness::new(page_with_links(&["alpha"]));
    h.handle("click 0 link");
    assert!(h.recorded().is_empty());
    assert_eq!(h.spoken(), vec!["That link number is not available."]);
}

#[test]
fn click_reuses_list_from_read_links() {
    let mut h = Harness::new(page_with_links(&["alpha", "beta"]));
    h.handle("read links");
    // Links vanish from the page; the cached list still serves the click.
    h.page.clear_selector("a");
    h.handle("click 1 link");
    assert_eq!(h.recorded(), vec![Recorded::Click("alpha".to_string())]);
}

// ---------------------------------------------------------------------------
// Summarization
// ---------------------------------------------------------------------------

#[test]
fn summarize_empty_page_makes_no_request() {
    let mut h = Harness::new(article_page());
    let outcome = h.handle("summarize");
    // No Summarize outcome means nothing is ever submitted.
    assert_eq!(outcome, Outcome::Handled);
    assert_eq!(h.spoken(), vec!["No readable content found on this page."]);
}

#[test]
fn summarize_whitespace_only_page_makes_no_request() {
    let mut page = article_page();
    page.add(SUMMARY_SELECTOR, visible("p", "   \n  ", 50.0));
    let mut h = Harness::new(page);
    assert_eq!(h.handle("summarise"), Outcome::Handled);
    assert_eq!(h.spoken(), vec!["No readable content found on this page."]);
}

#[test]
fn summarize_collects_visible_text_in_order() {
    let mut page = article_page();
    page.add(SUMMARY_SELECTOR, visible("h1", "Title", 10.0));
    let mut hidden = visible("p", "invisible", 20.0);
    hidden.displayed = false;
    page.add(SUMMARY_SELECTOR, hidden);
    let mut sizeless = visible("p", "zero size", 30.0);
    sizeless.rect = Rect::new(0.0, 30.0, 0.0, 0.0);
    page.add(SUMMARY_SELECTOR, sizeless);
    page.add(SUMMARY_SELECTOR, visible("p", "Body text", 40.0));

    let mut h = Harness::new(page);
    let outcome = h.handle("summary");
    match outcome {
        Outcome::Summarize { text, generation } => {
            assert_eq!(text, "Title\nBody text");
            assert!(h.session.is_current(generation));
        }
        other => panic!("expected summarize outcome, got {:?}", other),
    }
    assert_eq!(h.spoken(), vec![services::SUMMARY_WAIT_PHRASE]);
}

#[test]
fn stale_summary_reply_is_discarded() {
    let mut page = article_page();
    page.add(SUMMARY_SELECTOR, visible("p", "Body text", 40.0));
    let mut h = Harness::new(page);

    let generation = match h.handle("summarize") {
        Outcome::Summarize { generation, .. } => generation,
        other => panic!("expected summarize outcome, got {:?}", other),
    };

    // A newer command starts before the reply lands.
    h.handle("scroll down");
    assert!(!h.session.is_current(generation));
}

#[test]
fn transport_failure_has_a_fixed_phrase() {
    let reply: Result<Option<String>, String> = Err("connection refused".to_string());
    assert_eq!(services::summary_phrase(&reply), SUMMARY_ERROR_PHRASE);
}

// ---------------------------------------------------------------------------
// Router priority and catch-all
// ---------------------------------------------------------------------------

#[test]
fn generic_wins_on_scoped_sites() {
    let mut page = FakePage::new("www.google.com", "/search");
    page.title = "results".to_string();
    let mut h = Harness::new(page);
    h.handle("read title");
    assert_eq!(h.spoken(), vec!["results"]);
}

#[test]
fn unknown_command_hits_catch_all() {
    let mut h = Harness::new(article_page());
    h.handle("make me a sandwich");
    assert_eq!(h.spoken(), vec!["Sorry, I didn't understand that command."]);
}

#[test]
fn scoped_command_on_wrong_site_hits_catch_all() {
    let mut h = Harness::new(article_page());
    h.handle("play video");
    assert_eq!(h.spoken(), vec!["Sorry, I didn't understand that command."]);
}

#[test]
fn each_command_cancels_previous_speech_once() {
    let mut h = Harness::new(article_page());
    h.handle("read title");
    h.handle("read title");
    assert_eq!(h.speech.cancel_count(), 2);
}

// ---------------------------------------------------------------------------
// Video site
// ---------------------------------------------------------------------------

fn video_page() -> FakePage {
    let mut page = FakePage::new("www.youtube.com", "/watch");
    page.video_present = true;
    page
}

#[test]
fn play_and_volume_controls() {
    let mut h = Harness::new(video_page());
    h.handle("play video");
    h.handle("volume up");
    h.handle("rewind");
    assert_eq!(
        h.recorded(),
        vec![
            Recorded::Video(VideoCommand::Play),
            Recorded::Video(VideoCommand::AdjustVolume(0.1)),
            Recorded::Video(VideoCommand::SeekBy(-10.0)),
        ]
    );
    assert_eq!(
        h.spoken(),
        vec!["Video playing", "Volume up", "Rewinded 10 seconds"]
    );
}

#[test]
fn missing_player_degrades() {
    let mut page = video_page();
    page.video_present = false;
    let mut h = Harness::new(page);
    h.handle("pause video");
    assert!(h.recorded().is_empty());
    assert_eq!(h.spoken(), vec!["No video player found on this page."]);
}

#[test]
fn read_video_title_falls_back_through_selectors() {
    let mut page = video_page();
    page.title = "fallback title".to_string();
    page.add("h1", visible("h1", "Actual Video Title", 30.0));
    let mut h = Harness::new(page);
    h.handle("read video title");
    assert_eq!(h.spoken(), vec!["Title: Actual Video Title"]);
}

#[test]
fn read_video_title_uses_document_title_last() {
    let mut page = video_page();
    page.title = "fallback title".to_string();
    let mut h = Harness::new(page);
    h.handle("read video title");
    assert_eq!(h.spoken(), vec!["Title: fallback title"]);
}

#[test]
fn read_comments_degrades() {
    let mut h = Harness::new(video_page());
    h.handle("read comments");
    assert_eq!(h.spoken(), vec!["No comments found."]);
}

#[test]
fn next_video_clicks_button_silently() {
    let mut page = video_page();
    page.add(
        ".ytp-next-button, ytd-compact-video-renderer a",
        visible("button", "Next", 700.0),
    );
    let mut h = Harness::new(page);
    h.handle("next video");
    assert_eq!(h.recorded(), vec![Recorded::Click("Next".to_string())]);
    assert!(h.spoken().is_empty());
}

#[test]
fn previous_video_goes_back() {
    let mut h = Harness::new(video_page());
    h.handle("previous video");
    assert_eq!(h.recorded(), vec![Recorded::HistoryBack]);
}

// ---------------------------------------------------------------------------
// Social feed
// ---------------------------------------------------------------------------

fn feed_page(tweets: &[&str]) -> FakePage {
    let mut page = FakePage::new("x.com", "/home");
    for (i, text) in tweets.iter().enumerate() {
        page.add(TWEET_SELECTOR, visible("article", text, 50.0 + 120.0 * i as f64));
    }
    page
}

#[test]
fn read_latest_tweet_reads_first_visible() {
    let mut h = Harness::new(feed_page(&["good morning\n42", "second tweet"]));
    h.handle("read latest tweet");
    assert_eq!(h.spoken(), vec!["Tweet 1: good morning"]);
}

#[test]
fn read_tweet_by_number_ignores_offscreen_items() {
    let mut page = feed_page(&["first", "second"]);
    page.add(TWEET_SELECTOR, visible("article", "below the fold", 900.0));
    let mut h = Harness::new(page);
    h.handle("read tweet number 2");
    assert_eq!(h.spoken(), vec!["Tweet 2: second"]);
    h.handle("read tweet number 3");
    assert_eq!(
        h.spoken().last().map(String::as_str),
        Some("That tweet number is not available.")
    );
}

#[test]
fn no_visible_tweets_degrades() {
    let mut h = Harness::new(FakePage::new("twitter.com", "/home"));
    h.handle("read tweet number 1");
    assert_eq!(h.spoken(), vec!["No visible tweets found."]);
}

#[test]
fn like_tweet_clicks_like_button() {
    let mut page = FakePage::new("x.com", "/home");
    let mut tweet = visible("article", "likeable", 100.0);
    tweet.descendant_buttons.push("[data-testid=\"like\"]".to_string());
    page.add(TWEET_SELECTOR, tweet);

    let mut h = Harness::new(page);
    h.handle("like tweet number 1");
    assert_eq!(
        h.recorded(),
        vec![Recorded::ClickDescendant {
            element: "likeable".to_string(),
            selector: "[data-testid=\"like\"]".to_string(),
        }]
    );
    assert_eq!(h.spoken(), vec!["Liked tweet number 1"]);
}

#[test]
fn share_tweet_without_button_degrades() {
    let mut h = Harness::new(feed_page(&["no buttons here"]));
    h.handle("share tweet number 1");
    assert!(h.recorded().is_empty());
    assert_eq!(
        h.spoken(),
        vec!["Couldn't find the retweeted button on tweet 1"]
    );
}

#[test]
fn open_tweet_navigates_to_status_link() {
    let mut page = FakePage::new("x.com", "/home");
    let mut tweet = visible("article", "openable", 100.0);
    tweet.descendant_hrefs.insert(
        "a[href*=\"/status/\"]".to_string(),
        "https://x.com/a/status/123".to_string(),
    );
    page.add(TWEET_SELECTOR, tweet);

    let mut h = Harness::new(page);
    h.handle("open tweet number 1");
    assert_eq!(
        h.recorded(),
        vec![Recorded::Navigate("https://x.com/a/status/123".to_string())]
    );
    assert_eq!(h.spoken(), vec!["Opening tweet number 1"]);
}

#[test]
fn open_missing_tweet_degrades() {
    let mut h = Harness::new(feed_page(&["only one"]));
    h.handle("open tweet number 4");
    assert!(h.recorded().is_empty());
    assert_eq!(h.spoken(), vec!["Tweet number 4 is not available."]);
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

fn search_page(results: &[&str]) -> FakePage {
    let mut page = FakePage::new("www.google.com", "/search");
    for (i, text) in results.iter().enumerate() {
        page.add("h3", visible("h3", text, 60.0 + 40.0 * i as f64));
    }
    page
}

#[test]
fn read_top_result() {
    let mut h = Harness::new(search_page(&["First hit", "Second hit"]));
    h.handle("read top result");
    assert_eq!(h.spoken(), vec!["First hit"]);
}

#[test]
fn read_result_out_of_range_speaks_not_found() {
    let mut h = Harness::new(search_page(&["one", "two", "three", "four", "five"]));
    h.handle("read result number 10");
    assert!(h.recorded().is_empty());
    assert_eq!(h.spoken(), vec!["Result not found."]);
}

#[test]
fn open_result_navigates_to_enclosing_anchor() {
    let mut page = FakePage::new("www.google.com", "/search");
    let mut result = visible("h3", "First hit", 60.0);
    result
        .enclosing_hrefs
        .insert("a".to_string(), "https://example.org/hit".to_string());
    page.add("h3", result);

    let mut h = Harness::new(page);
    h.handle("open result number 1");
    assert_eq!(
        h.recorded(),
        vec![Recorded::Navigate("https://example.org/hit".to_string())]
    );
    assert!(h.spoken().is_empty());
}

#[test]
fn open_result_without_anchor_degrades() {
    let mut h = Harness::new(search_page(&["bare heading"]));
    h.handle("open result number 1");
    assert!(h.recorded().is_empty());
    assert_eq!(h.spoken(), vec!["Could not open that result."]);
}

#[test]
fn read_all_results_caps_at_five() {
    let mut h = Harness::new(search_page(&["a", "b", "c", "d", "e", "f"]));
    h.handle("read all results");
    assert_eq!(h.spoken(), vec!["1: a", "2: b", "3: c", "4: d", "5: e"]);
}

#[test]
fn read_all_results_degrades_when_empty() {
    let mut h = Harness::new(FakePage::new("www.google.com", "/search"));
    h.handle("read all results");
    assert_eq!(h.spoken(), vec!["No search results found."]);
}

// ---------------------------------------------------------------------------
// Article sections
// ---------------------------------------------------------------------------

#[test]
fn read_section_speaks_up_to_three_blocks() {
    let mut page = article_page();
    let mut heading = visible("h2", "Early life", 100.0);
    heading.following = vec![
        block("p", "one"),
        block("p", "two"),
        block("p", "three"),
        block("p", "four"),
        block("h2", "Career"),
    ];
    page.add("h2, h3, h4", heading);

    let mut h = Harness::new(page);
    h.handle("read section early life");
    assert_eq!(h.spoken(), vec!["one", "two", "three"]);
}

#[test]
fn read_section_matches_case_insensitive_substring() {
    let mut page = article_page();
    let mut heading = visible("h2", "Historical Background", 100.0);
    heading.following = vec![block("p", "content")];
    page.add("h2, h3, h4", heading);

    let mut h = Harness::new(page);
    h.handle("read section 'background'");
    assert_eq!(h.spoken(), vec!["content"]);
}

#[test]
fn read_section_with_no_content_degrades() {
    let mut page = article_page();
    let mut heading = visible("h2", "Empty", 100.0);
    heading.following = vec![block("h2", "Next")];
    page.add("h2, h3, h4", heading);

    let mut h = Harness::new(page);
    h.handle("read section empty");
    assert_eq!(h.spoken(), vec!["No content found in that section."]);
}

#[test]
fn missing_section_degrades() {
    let mut h = Harness::new(article_page());
    h.handle("read section nowhere");
    assert_eq!(h.spoken(), vec!["Section not found."]);
    h.handle("go to section nowhere");
    assert_eq!(
        h.spoken().last().map(String::as_str),
        Some("Section not found.")
    );
}

#[test]
fn go_to_section_scrolls_and_confirms() {
    let mut page = article_page();
    page.add("h2, h3, h4", visible("h2", "References", 3000.0));
    let mut h = Harness::new(page);
    h.handle("go to section references");
    assert_eq!(
        h.recorded(),
        vec![Recorded::ScrollIntoView("References".to_string())]
    );
    assert_eq!(h.spoken(), vec!["Scrolled to section references"]);
}

// ---------------------------------------------------------------------------
// Condition application
// ---------------------------------------------------------------------------

#[test]
fn applying_photophobia_injects_css_overlay_and_zoom() {
    let page = FakePage::new("example.org", "/");
    session::apply_condition(&page, Condition::Photophobia).unwrap();
    let recorded = page.recorded();
    assert_eq!(recorded.len(), 3);
    assert!(matches!(&recorded[0], Recorded::InjectCss(css) if css.contains("brightness(90%)")));
    assert_eq!(recorded[1], Recorded::Overlay);
    assert_eq!(recorded[2], Recorded::Zoom(1.2));
}

#[test]
fn applying_blindness_clears_visual_treatment() {
    let page = FakePage::new("example.org", "/");
    session::apply_condition(&page, Condition::CompleteBlindness).unwrap();
    assert_eq!(
        page.recorded(),
        vec![Recorded::InjectCss(String::new()), Recorded::Zoom(1.0)]
    );
}
