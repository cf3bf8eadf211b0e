//! HTML-to-text extraction for scraped company pages.
//!
//! Each pass is a function `&str -> String` applied in a fixed order:
//! script blocks, style blocks, landmark chrome (nav/footer/header),
//! comments, remaining tags, entity decoding, whitespace collapsing.
//! The output is a flat prose excerpt suitable for prompting — not
//! structured content.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum visible-text length for a page to count as signal, not noise.
pub const MIN_VIABLE_CHARS: usize = 200;

/// Cap on a single page's contribution to the aggregated excerpt.
pub const PAGE_EXCERPT_CHARS: usize = 4000;

/// Extract a plain-text excerpt from raw HTML.
///
/// Returns `None` when the visible text falls below [`MIN_VIABLE_CHARS`] —
/// parked domains, interstitials, and JS-only shells produce short residue
/// that would pollute the prompt. Truncation to [`PAGE_EXCERPT_CHARS`]
/// happens at aggregation time, not here.
pub fn extract_text(html: &str) -> Option<String> {
    let text = clean_html(html);
    if text.chars().count() < MIN_VIABLE_CHARS {
        return None;
    }
    Some(text)
}

/// Run the full cleanup pipeline on raw HTML, without the viability check.
pub fn clean_html(html: &str) -> String {
    let mut result = html.to_string();

    result = strip_script_blocks(&result);
    result = strip_style_blocks(&result);
    result = strip_landmark_blocks(&result);
    result = strip_comments(&result);
    result = strip_tags(&result);
    result = decode_entities(&result);
    result = collapse_whitespace(&result);

    result
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Pass 1-2: script and style blocks
// ---------------------------------------------------------------------------

fn strip_script_blocks(html: &str) -> String {
    static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex")
    });
    SCRIPT_RE.replace_all(html, "").to_string()
}

fn strip_style_blocks(html: &str) -> String {
    static STYLE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
    STYLE_RE.replace_all(html, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: landmark chrome
// ---------------------------------------------------------------------------

/// Remove nav, footer, and header landmark blocks — site chrome that
/// repeats across pages and drowns out the actual copy.
fn strip_landmark_blocks(html: &str) -> String {
    static NAV_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?is)<nav[^>]*>.*?</nav>").expect("valid regex"));
    static FOOTER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?is)<footer[^>]*>.*?</footer>").expect("valid regex"));
    static HEADER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?is)<header[^>]*>.*?</header>").expect("valid regex"));

    let result = NAV_RE.replace_all(html, "");
    let result = FOOTER_RE.replace_all(&result, "");
    HEADER_RE.replace_all(&result, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4-5: comments and remaining tags
// ---------------------------------------------------------------------------

fn strip_comments(html: &str) -> String {
    static COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
    COMMENT_RE.replace_all(html, "").to_string()
}

/// Replace any remaining tag with a space so adjacent text nodes don't fuse.
fn strip_tags(html: &str) -> String {
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
    TAG_RE.replace_all(html, " ").to_string()
}

// ---------------------------------------------------------------------------
// Pass 6: entity decoding
// ---------------------------------------------------------------------------

/// Decode the minimal entity set that shows up in marketing copy.
/// Anything rarer passes through literally.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}

// ---------------------------------------------------------------------------
// Pass 7: whitespace
// ---------------------------------------------------------------------------

fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
    WS_RE.replace_all(text, " ").trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_decodes_entities() {
        let html = "<script>x</script><p>Hello&nbsp;World</p>";
        assert_eq!(clean_html(html), "Hello World");
    }

    #[test]
    fn strips_style_blocks() {
        let html = "<style>body { color: red; }</style><p>Visible</p>";
        assert_eq!(clean_html(html), "Visible");
    }

    #[test]
    fn strips_landmark_chrome() {
        let html = concat!(
            "<header><h1>Logo</h1></header>",
            "<nav><a href=\"/\">Home</a></nav>",
            "<main><p>The actual pitch.</p></main>",
            "<footer>Copyright 2024</footer>",
        );
        let text = clean_html(html);
        assert_eq!(text, "The actual pitch.");
    }

    #[test]
    fn strips_comments() {
        let html = "<p>Before</p><!-- hidden\nnote --><p>After</p>";
        assert_eq!(clean_html(html), "Before After");
    }

    #[test]
    fn decodes_minimal_entity_set() {
        let html = "<p>A &amp; B &lt;3 &quot;C&quot; &#39;D&#39;</p>";
        assert_eq!(clean_html(html), "A & B <3 \"C\" 'D'");
    }

    #[test]
    fn collapses_whitespace_runs() {
        let html = "<div>  spaced \n\n out\t\ttext  </div>";
        assert_eq!(clean_html(html), "spaced out text");
    }

    #[test]
    fn tags_become_word_boundaries() {
        let html = "<span>one</span><span>two</span>";
        assert_eq!(clean_html(html), "one two");
    }

    #[test]
    fn short_pages_are_rejected() {
        // 50 visible chars is below the viability threshold
        let html = format!("<p>{}</p>", "x".repeat(50));
        assert!(extract_text(&html).is_none());
    }

    #[test]
    fn long_pages_pass_viability() {
        let html = format!("<p>{}</p>", "word ".repeat(100));
        let text = extract_text(&html).expect("viable text");
        assert!(text.chars().count() >= MIN_VIABLE_CHARS);
    }

    #[test]
    fn case_insensitive_tag_matching() {
        let html = "<SCRIPT>var x = 1;</SCRIPT><P>Kept</P>";
        assert_eq!(clean_html(html), "Kept");
    }

    #[test]
    fn truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // Multibyte: must not split a char mid-sequence
        assert_eq!(truncate_chars("café au lait", 4), "café");
    }
}
