//! Converts the digest's markdown subset into an HTML fragment.

use regex::{Captures, Regex};

// Substitution order is load bearing: escape first, domain annotations before
// emphasis, explicit links before bare URLs, block-level rules before the
// paragraph pass.
pub fn markdown_to_html(text: &str) -> String {
    let mut html = text.to_string();

    // Escape HTML metacharacters exactly once, before any tag is generated.
    html = html.replace('&', "&amp;");
    html = html.replace('<', "&lt;");
    html = html.replace('>', "&gt;");

    // Paywall notices and open-access badges carry bold markers of their own,
    // so they must be rewritten before the generic emphasis rules run.
    let paywall_re = Regex::new(r"(?i)\[PAYWALL:\s*Abstract only reviewed\]").unwrap();
    html = paywall_re
        .replace_all(
            &html,
            r#"<span class="paywall-notice">PAYWALL: Abstract only reviewed</span>"#,
        )
        .into_owned();

    let access_re = Regex::new(r"(?i)\*\*Access:\*\*\s*OPEN\s*ACCESS").unwrap();
    html = access_re
        .replace_all(
            &html,
            r#"<strong>Access:</strong> <span class="open-access-badge">OPEN ACCESS</span>"#,
        )
        .into_owned();

    // Headings, most-specific prefix first so "#### x" never matches as h1.
    for (pattern, replacement) in [
        (r"(?m)^#### (.*)$", "<h4>${1}</h4>"),
        (r"(?m)^### (.*)$", "<h3>${1}</h3>"),
        (r"(?m)^## (.*)$", "<h2>${1}</h2>"),
        (r"(?m)^# (.*)$", "<h1>${1}</h1>"),
    ] {
        html = Regex::new(pattern)
            .unwrap()
            .replace_all(&html, replacement)
            .into_owned();
    }

    // Emphasis, longest marker first to avoid partial matches.
    let bold_italic_re = Regex::new(r"\*\*\*(.*?)\*\*\*").unwrap();
    html = bold_italic_re
        .replace_all(&html, "<strong><em>${1}</em></strong>")
        .into_owned();
    let bold_re = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    html = bold_re.replace_all(&html, "<strong>${1}</strong>").into_owned();
    let italic_re = Regex::new(r"\*(.*?)\*").unwrap();
    html = italic_re.replace_all(&html, "<em>${1}</em>").into_owned();

    // Explicit markdown links first, then bare URLs.
    let link_re = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
    html = link_re
        .replace_all(&html, r#"<a href="${2}" target="_blank" rel="noopener">${1}</a>"#)
        .into_owned();

    // A URL preceded by `"` sits inside an href attribute; one preceded by
    // `>` is the display text of an anchor generated above. Both were already
    // linked, so only URLs after any other character get wrapped. (The regex
    // crate has no lookbehind; the leading capture group stands in for one.)
    let bare_url_re = Regex::new(r#"(^|[^">])(https?://[^\s<>)]+)"#).unwrap();
    html = bare_url_re
        .replace_all(&html, |caps: &Captures| {
            format!(
                r#"{}<a href="{}" target="_blank" rel="noopener">{}</a>"#,
                &caps[1], &caps[2], &caps[2]
            )
        })
        .into_owned();

    // Blockquotes operate on the already-escaped `>` marker.
    let quote_re = Regex::new(r"(?m)^&gt; (.*)$").unwrap();
    html = quote_re
        .replace_all(&html, "<blockquote>${1}</blockquote>")
        .into_owned();

    // List items, then coalesce consecutive items into a single <ul>.
    let dash_item_re = Regex::new(r"(?m)^- (.*)$").unwrap();
    html = dash_item_re.replace_all(&html, "<li>${1}</li>").into_owned();
    let star_item_re = Regex::new(r"(?m)^\* (.*)$").unwrap();
    html = star_item_re.replace_all(&html, "<li>${1}</li>").into_owned();

    let list_run_re = Regex::new(r"(<li>.*?</li>\n?)+").unwrap();
    html = list_run_re
        .replace_all(&html, |caps: &Captures| format!("<ul>{}</ul>", &caps[0]))
        .into_owned();

    let hr_re = Regex::new(r"(?m)^---$").unwrap();
    html = hr_re.replace_all(&html, "<hr>").into_owned();

    // Paragraphs: blank-line-separated blocks that are not already
    // block-level elements get wrapped, with inner newlines as <br>.
    let processed: Vec<String> = html
        .split("\n\n")
        .map(|block| {
            let block = block.trim();
            if block.is_empty() || is_block_element(block) {
                block.to_string()
            } else {
                format!("<p>{}</p>", block)
            }
        })
        .collect();
    html = processed.join("\n");

    let para_re = Regex::new(r"(?s)<p>(.*?)</p>").unwrap();
    html = para_re
        .replace_all(&html, |caps: &Captures| {
            format!("<p>{}</p>", caps[1].replace('\n', "<br>"))
        })
        .into_owned();

    html
}

fn is_block_element(block: &str) -> bool {
    ["<h", "<ul", "<ol", "<blockquote", "<hr"]
        .iter()
        .any(|prefix| block.starts_with(prefix))
}
