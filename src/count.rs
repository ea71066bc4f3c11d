//! Total-match count extraction from the upstream HTML results page.
//!
//! The upstream JSON API reports no total match count; the only place the
//! number exists is the human-facing results banner on the HTML page, in a
//! fixed spot deep inside the layout table. This module digs it out.
//!
//! Two banner forms are recognized, tried in order:
//!
//! 1. `"<n> results shown (<total> total matches)"`, where the total may
//!    carry thousands separators, which are stripped.
//! 2. `"<n> results"` with no parenthetical; the shown count is the total.
//!
//! Anything else (the element missing, the text reworded, the markup
//! restructured) yields `None`, meaning *unknown*. Callers must keep
//! unknown distinct from zero. Upstream markup drift is an expected
//! failure mode here, never a crash.

use regex::Regex;
use scraper::{Html, Selector};

/// Where the results banner lives in the upstream page layout.
const BANNER_SELECTOR: &str = "body > table > tbody > tr > td:nth-of-type(2) > b > tt > font";

/// Extract the total match count from an upstream results page.
pub fn extract_total(html: &str) -> Option<u64> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(BANNER_SELECTOR).expect("selector for the results banner");
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect();
    parse_banner(&text)
}

/// Apply the two recognition patterns to the banner text.
fn parse_banner(text: &str) -> Option<u64> {
    let with_total = Regex::new(r"\d+ results shown \((\d+(?:,\d+)*) total matches\)")
        .expect("regex for the full banner form");
    if let Some(caps) = with_total.captures(text) {
        return caps[1].replace(',', "").parse().ok();
    }

    let bare = Regex::new(r"(\d+) results").expect("regex for the bare banner form");
    let caps = bare.captures(text)?;
    caps[1].parse().ok()
}
