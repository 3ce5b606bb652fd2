//! Text heuristics for semi-structured archive fields
//!
//! Pure functions, no I/O: year extraction from free text, markup cleanup,
//! word truncation, and the reference-search URL derived from a title.

use chrono::Datelike;
use regex_lite::Regex;
use std::sync::OnceLock;

static RE_YEAR: OnceLock<Regex> = OnceLock::new();
static RE_TAG: OnceLock<Regex> = OnceLock::new();
static RE_PARENS: OnceLock<Regex> = OnceLock::new();

/// Earliest year accepted as an artifact date
pub const MIN_YEAR: i32 = 1970;

/// Marker appended to truncated text
pub const ELLIPSIS: &str = "...";

/// Terms that already anchor a reference search in the computing domain
const COMPUTING_TERMS: &[&str] = &[
    "computer",
    "computing",
    "pc",
    "macintosh",
    "apple",
    "ibm",
    "commodore",
    "atari",
    "amiga",
    "trs",
    "sinclair",
    "spectrum",
    "altair",
    "osborne",
];

/// Words of the title kept for the reference search
const REFERENCE_TITLE_WORDS: usize = 3;

/// Named entities the upstream emits, in decode order
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// First plausible year (1970..=current year) in `text`, scanning left to right
pub fn extract_year(text: &str) -> Option<i32> {
    extract_year_until(text, current_year())
}

/// Like [`extract_year`] with an explicit upper bound
pub fn extract_year_until(text: &str, max_year: i32) -> Option<i32> {
    if text.is_empty() {
        return None;
    }

    let re = RE_YEAR.get_or_init(|| Regex::new(r"\b(19[7-9]\d|20[0-2]\d)\b").unwrap());
    re.find_iter(text)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .find(|year| (MIN_YEAR..=max_year).contains(year))
}

/// Apply [`extract_year`] over fields in priority order; first hit wins
pub fn first_year<'a, I>(fields: I) -> Option<i32>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    fields
        .into_iter()
        .flatten()
        .find_map(extract_year)
}

/// Strip tags, decode the common entities and normalize whitespace.
///
/// Applied until the text stops changing, so the result contains no tag or
/// entity that a second pass would touch.
pub fn clean_markup(html: Option<&str>) -> String {
    let Some(html) = html else {
        return String::new();
    };

    let mut current = clean_once(html);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_once(html: &str) -> String {
    let re = RE_TAG.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
    let mut text = re.replace_all(html, "").into_owned();
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }
    normalize_whitespace(&text)
}

/// Collapse whitespace runs into single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `limit` words, appending [`ELLIPSIS`] when anything was cut
pub fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return text.to_string();
    }
    format!("{}{}", words[..limit].join(" "), ELLIPSIS)
}

/// Reference-search URL for an item title.
///
/// `template` holds a `{}` placeholder for the percent-encoded query.
pub fn reference_search_url(title: &str, template: &str) -> String {
    let re = RE_PARENS.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap());
    let without_parens = re.replace_all(title, "");
    let short_title = without_parens
        .split_whitespace()
        .take(REFERENCE_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    let lowered = short_title.to_lowercase();
    let query = if COMPUTING_TERMS.iter().any(|term| lowered.contains(term)) {
        short_title
    } else {
        format!("{} computer", short_title).trim().to_string()
    };

    template.replacen("{}", &urlencoding::encode(&query), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIKI: &str = "https://en.wikipedia.org/wiki/Special:Search?search={}";

    // ========================================================================
    // extract_year
    // ========================================================================

    #[test]
    fn test_extract_year_first_match_wins() {
        assert_eq!(extract_year("Model X (1979), re-released 2010"), Some(1979));
    }

    #[test]
    fn test_extract_year_skips_out_of_range() {
        // 1969 does not match the pattern, 2029 exceeds the ceiling
        assert_eq!(extract_year_until("built 1969, sold 2029, shown 1985", 2026), Some(1985));
        assert_eq!(extract_year_until("catalog 2029", 2026), None);
        assert_eq!(extract_year_until("catalog 2029", 2029), Some(2029));
    }

    #[test]
    fn test_extract_year_requires_word_boundaries() {
        assert_eq!(extract_year("serial 119845 and part A1984B"), None);
        assert_eq!(extract_year("1984-01-24"), Some(1984));
    }

    #[test]
    fn test_extract_year_empty_and_no_match() {
        assert_eq!(extract_year(""), None);
        assert_eq!(extract_year("no digits here"), None);
        assert_eq!(extract_year("1800s steam engine"), None);
    }

    #[test]
    fn test_extract_year_never_leaves_range() {
        let ceiling = current_year();
        let samples = [
            "1970 1999 2000 2029",
            "2028 then 1975",
            "circa 2025",
            "x1971 1972x 1973",
        ];
        for sample in samples {
            if let Some(year) = extract_year(sample) {
                assert!((MIN_YEAR..=ceiling).contains(&year), "{} from {:?}", year, sample);
            }
        }
    }

    #[test]
    fn test_first_year_follows_priority() {
        assert_eq!(
            first_year([None, Some("undated"), Some("Apple II (1977)"), Some("1983")]),
            Some(1977)
        );
        assert_eq!(first_year([Some("1990"), Some("1977")]), Some(1990));
        assert_eq!(first_year([None, None]), None);
    }

    // ========================================================================
    // clean_markup
    // ========================================================================

    #[test]
    fn test_clean_markup_strips_tags_and_entities() {
        let html = "<p>The&nbsp;<b>Commodore</b> 64 &amp; friends &lt;3 &quot;C64&quot; isn&#39;t\n\n old</p>";
        assert_eq!(
            clean_markup(Some(html)),
            "The Commodore 64 & friends <3 \"C64\" isn't old"
        );
    }

    #[test]
    fn test_clean_markup_absent_is_empty() {
        assert_eq!(clean_markup(None), "");
        assert_eq!(clean_markup(Some("")), "");
        assert_eq!(clean_markup(Some("   <br/>  ")), "");
    }

    #[test]
    fn test_clean_markup_idempotent() {
        let samples = [
            "<div>plain</div>",
            "&amp;lt;b&amp;gt;nested&amp;lt;/b&amp;gt;",
            "&lt;i&gt;escaped tag&lt;/i&gt;",
            "a < b and c > d",
            "  spaced\t\tout  ",
            "&amp;nbsp;",
            "<unterminated",
        ];
        for sample in samples {
            let once = clean_markup(Some(sample));
            assert_eq!(clean_markup(Some(&once)), once, "not idempotent for {:?}", sample);
        }
    }

    // ========================================================================
    // truncate_words
    // ========================================================================

    #[test]
    fn test_truncate_words_short_text_unchanged() {
        assert_eq!(truncate_words("one two three", 3), "one two three");
        assert_eq!(truncate_words("", 5), "");
    }

    #[test]
    fn test_truncate_words_long_text() {
        let truncated = truncate_words("one  two\tthree four five", 3);
        assert_eq!(truncated, "one two three...");

        let body = truncated.strip_suffix(ELLIPSIS).unwrap();
        assert_eq!(body.split_whitespace().count(), 3);
    }

    // ========================================================================
    // reference_search_url
    // ========================================================================

    #[test]
    fn test_reference_url_keeps_computing_titles() {
        assert_eq!(
            reference_search_url("Commodore 64 (1982) brochure scan", WIKI),
            "https://en.wikipedia.org/wiki/Special:Search?search=Commodore%2064%20brochure"
        );
    }

    #[test]
    fn test_reference_url_appends_computer() {
        assert_eq!(
            reference_search_url("Kaypro II", WIKI),
            "https://en.wikipedia.org/wiki/Special:Search?search=Kaypro%20II%20computer"
        );
    }

    #[test]
    fn test_reference_url_vocabulary_is_substring_match() {
        // "pc" inside "PCjr" counts
        assert_eq!(
            reference_search_url("IBM PCjr", WIKI),
            "https://en.wikipedia.org/wiki/Special:Search?search=IBM%20PCjr"
        );
        assert!(reference_search_url("Topcat manual", WIKI).ends_with("Topcat%20manual"));
    }

    #[test]
    fn test_reference_url_empty_title() {
        assert_eq!(
            reference_search_url("", WIKI),
            "https://en.wikipedia.org/wiki/Special:Search?search=computer"
        );
    }
}
