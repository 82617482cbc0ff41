//! Backend replies may carry HTML. The client never renders it; replies are
//! reduced to plain text before they enter a transcript.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(p|div|li|h[1-6]|pre|tr|blockquote)\s*>").unwrap());
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<li\b[^>]*>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Convert a possibly-HTML reply to plain text
pub fn to_plain_text(input: &str) -> String {
    if !input.contains('<') && !input.contains('&') {
        return input.to_string();
    }

    let text = SCRIPT.replace_all(input, "");
    let text = STYLE.replace_all(&text, "");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = BLOCK_END.replace_all(&text, "\n");
    let text = LIST_ITEM.replace_all(&text, "- ");
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = BLANK_RUN.replace_all(&text, "\n\n");

    text.trim().to_string()
}

fn decode_entities(input: &str) -> String {
    // &amp; last so "&amp;lt;" stays "&lt;"
    input
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
