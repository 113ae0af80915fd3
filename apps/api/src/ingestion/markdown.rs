//! Turns a GitHub profile README into plain narrative text suitable for an
//! About section: no fences, no HTML, no markdown decoration.

use regex::Regex;

/// Applied in order; later rules see the output of earlier ones.
const CLEAN_RULES: [(&str, &str); 10] = [
    (r"(?s)```.*?```", ""),              // fenced code blocks
    (r"`[^`]+`", ""),                    // inline code
    (r"!\[.*?\]\(.*?\)", ""),            // images
    (r"<[^>]+>", ""),                    // HTML tags
    (r"\[([^\]]+)\]\([^)]+\)", "$1"),    // links -> link text
    (r"#{1,6}\s+", ""),                  // headings
    (r"\*{1,3}([^*]+)\*{1,3}", "$1"),    // bold/italic
    (r"-{3,}|={3,}", ""),                // horizontal rules
    (r"(?m)^[-*+]\s+", "\u{2022} "),     // list markers -> bullet char
    (r"\n{3,}", "\n\n"),                 // collapse blank-line runs
];

pub fn clean_markdown(raw: &str) -> String {
    let mut text = raw.to_string();
    for (pattern, replacement) in CLEAN_RULES {
        if let Ok(re) = Regex::new(pattern) {
            text = re.replace_all(&text, replacement).to_string();
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_markdown_strips_code_and_images() {
        let input = "# Hi\n\nI build things.\n\n```rust\nfn main() {}\n```\n\n![badge](https://img.example/b.svg)\n\nSee `cargo` docs.";
        let out = clean_markdown(input);
        assert!(!out.contains("fn main"));
        assert!(!out.contains("badge"));
        assert!(!out.contains('`'));
        assert!(out.contains("I build things."));
    }

    #[test]
    fn test_clean_markdown_flattens_links_and_emphasis() {
        let out = clean_markdown("Check [my site](https://example.com) for **more** details.");
        assert_eq!(out, "Check my site for more details.");
    }

    #[test]
    fn test_clean_markdown_normalizes_lists_and_blank_lines() {
        let out = clean_markdown("- one\n- two\n\n\n\n* three");
        assert_eq!(out, "\u{2022} one\n\u{2022} two\n\n\u{2022} three");
    }

    #[test]
    fn test_clean_markdown_strips_html() {
        let out = clean_markdown("<p align=\"center\">Hello</p>");
        assert_eq!(out, "Hello");
    }
}
