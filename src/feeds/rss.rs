//! Tolerant extraction of ranked items from a trending-searches RSS document.
//!
//! The upstream document is loosely structured and the proxied mirrors wrap
//! it in extra text, so this is pattern extraction rather than a full XML
//! parse. Everything the fallback chain and the persistence guard need goes
//! through [`parse_feed_items`]; swapping in a real parser only touches this
//! module.

use crate::models::{MAX_ITEMS, RankedItem};
use itertools::Itertools;
use once_cell::sync::Lazy;
use quick_xml::escape::unescape;
use regex::Regex;
use std::cmp::Reverse;

const DOCUMENT_MARKERS: [&str; 3] = ["<?xml", "<rss", "<feed"];
const ITEM_OPEN: &str = "<item>";
const ITEM_CLOSE: &str = "</item>";

static TITLE_RE: Lazy<Regex> = Lazy::new(|| tag_regex("title"));
static LINK_RE: Lazy<Regex> = Lazy::new(|| tag_regex("link"));
static PUB_DATE_RE: Lazy<Regex> = Lazy::new(|| tag_regex("pubDate"));
static TRAFFIC_RE: Lazy<Regex> = Lazy::new(|| tag_regex("ht:approx_traffic"));
static BARE_TRAFFIC_RE: Lazy<Regex> = Lazy::new(|| tag_regex("approx_traffic"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static CDATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<!\[CDATA\[|\]\]>").unwrap());

fn tag_regex(tag: &str) -> Regex {
    let tag = regex::escape(tag);
    Regex::new(&format!(r"(?s)<{tag}>(.*?)</{tag}>")).unwrap()
}

/// Slice `text` from the earliest document start marker.
///
/// Returns `None` when none of `<?xml`, `<rss` or `<feed` occurs.
pub fn extract_document(text: &str) -> Option<&str> {
    DOCUMENT_MARKERS
        .iter()
        .filter_map(|marker| text.find(marker))
        .min()
        .map(|start| &text[start..])
}

/// Parse every `<item>` block into a [`RankedItem`].
///
/// Items are ordered by approximate traffic (descending, stable for ties),
/// capped at [`MAX_ITEMS`], and ranked 1..n after sorting, so mirrors that
/// reorder the feed still produce the same ranking. Items without a title are
/// dropped. Item URLs are left empty when the feed carries no link.
pub fn parse_feed_items(raw: &str) -> Vec<RankedItem> {
    let document = extract_document(raw).unwrap_or(raw);

    document
        .split(ITEM_OPEN)
        .skip(1)
        .map(|part| part.split(ITEM_CLOSE).next().unwrap_or(part))
        .filter_map(parse_item)
        .sorted_by_key(|item| Reverse(item.metric()))
        .take(MAX_ITEMS)
        .enumerate()
        .map(|(index, mut item)| {
            item.rank = index as u32 + 1;
            item
        })
        .collect()
}

fn parse_item(block: &str) -> Option<RankedItem> {
    let title = pick(&TITLE_RE, block)?;
    if title.is_empty() {
        return None;
    }
    let link = pick(&LINK_RE, block).unwrap_or_default();
    let traffic = pick(&TRAFFIC_RE, block)
        .or_else(|| pick(&BARE_TRAFFIC_RE, block))
        .unwrap_or_default();

    let mut item = RankedItem::new(0, title, link)
        .with_views(parse_traffic(&traffic));
    item.pub_date = pick(&PUB_DATE_RE, block)
        .filter(|d| !d.is_empty());
    Some(item)
}

/// First capture of `re` in `block`, with CDATA markers stripped and XML
/// entities decoded.
fn pick(re: &Regex, block: &str) -> Option<String> {
    let raw = re.captures(block)?.get(1)?.as_str();
    let stripped = CDATA_RE.replace_all(raw, "");
    let decoded = unescape(&stripped)
        .map(|text| text.into_owned())
        .unwrap_or_else(|_| stripped.to_string());
    Some(decoded.trim().to_string())
}

/// Coerce an approximate traffic label (`"10,000+"`, `"2万+"`) to a number.
///
/// Thousands separators are removed and the first run of digits is used;
/// anything without digits is 0.
pub fn parse_traffic(label: &str) -> u64 {
    let cleaned = label.replace(',', "");
    DIGITS_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
