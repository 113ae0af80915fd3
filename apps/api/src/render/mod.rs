//! HTML rendering. Two dialects over the same bundle: `preview` (modern
//! CSS for in-app WebViews) and `print` (XHTML 1.0 Strict, CSS 2.1 only,
//! for the PDF renderer). Everything here is pure string building.

use chrono::NaiveDate;

use crate::models::portfolio::{Proficiency, ProjectRow, SkillRow};
use crate::portfolio::bundle::Bundle;

pub mod pdf;
pub mod preview;
pub mod print;

/// Per-render toggles. Missing optional strings silently omit the field.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub ai_rewrite: bool,
    pub include_photo: bool,
    pub photo_url: Option<String>,
    pub include_phone: bool,
    pub phone: Option<String>,
    pub include_linkedin: bool,
    pub linkedin: Option<String>,
    pub include_website: bool,
    pub website: Option<String>,
}

/// HTML-escapes the four characters that matter in both dialects.
pub fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn nl2br(s: &str) -> String {
    s.replace('\n', "<br/>")
}

/// Splits a description into bullet sentences: newline-separated lines
/// first, then sentence boundaries, else the whole text as one item.
pub fn split_bullets(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if text.contains('\n') {
        return text
            .lines()
            .map(|line| line.trim_start_matches(['-', '\u{2022}', '*', '>']).trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
    }

    let sentences = split_sentences(text);
    if sentences.len() >= 2 {
        return sentences;
    }

    vec![text.to_string()]
}

/// Splits after `.`/`!`/`?` followed by whitespace and an uppercase letter.
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        if matches!(chars[i], '.' | '!' | '?') {
            let mut j = i + 1;
            let mut saw_space = false;
            while j < chars.len() && chars[j].is_whitespace() {
                saw_space = true;
                j += 1;
            }
            if saw_space && j < chars.len() && chars[j].is_uppercase() {
                let part: String = chars[start..=i].iter().collect();
                let part = part.trim().to_string();
                if !part.is_empty() {
                    parts.push(part);
                }
                start = j;
                i = j;
                continue;
            }
        }
        i += 1;
    }
    let tail: String = chars[start..].iter().collect();
    let tail = tail.trim().to_string();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

/// Highlighted projects first; stars-descending fallback; capped.
pub fn top_projects(projects: &[ProjectRow], cap: usize) -> Vec<&ProjectRow> {
    let highlighted: Vec<&ProjectRow> = projects.iter().filter(|p| p.is_highlighted).collect();
    if !highlighted.is_empty() {
        return highlighted.into_iter().take(cap).collect();
    }
    let mut by_stars: Vec<&ProjectRow> = projects.iter().collect();
    by_stars.sort_by(|a, b| b.stars.cmp(&a.stars));
    by_stars.into_iter().take(cap).collect()
}

/// Groups skills by proficiency in the fixed EXPERT..BEGINNER order,
/// dropping empty tiers.
pub fn group_skills(skills: &[SkillRow]) -> Vec<(Proficiency, Vec<&SkillRow>)> {
    Proficiency::ALL
        .iter()
        .filter_map(|tier| {
            let group: Vec<&SkillRow> = skills
                .iter()
                .filter(|s| s.proficiency == tier.as_str())
                .collect();
            if group.is_empty() {
                None
            } else {
                Some((*tier, group))
            }
        })
        .collect()
}

pub fn resolve_display_name(bundle: &Bundle) -> String {
    if let Some(name) = bundle.user.display_name.as_deref() {
        if !name.trim().is_empty() {
            return name.to_string();
        }
    }
    if let Some(title) = bundle.portfolio.title.as_deref() {
        return title.to_string();
    }
    "Developer".to_string()
}

pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|w| w.chars().next())
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// `MMM yyyy`, e.g. "Mar 2024". Preview dialect.
pub fn fmt_month_year(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// `MM/yyyy`, e.g. "03/2024". Print dialect.
pub fn fmt_mm_yyyy(date: NaiveDate) -> String {
    date.format("%m/%Y").to_string()
}

/// Date span with "Present" substituted for a missing end on current rows.
pub fn date_span(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    is_current: bool,
    fmt: fn(NaiveDate) -> String,
) -> String {
    let start = start.map(fmt).unwrap_or_default();
    let end = if is_current {
        "Present".to_string()
    } else {
        end.map(fmt).unwrap_or_default()
    };
    match (start.is_empty(), end.is_empty()) {
        (true, _) => String::new(),
        (false, true) => start,
        (false, false) => format!("{start} - {end}"),
    }
}

/// `#RRGGBB` + alpha to a CSS rgba() literal. Falls through unchanged on
/// anything unparseable.
pub fn rgba(hex: &str, alpha: f32) -> String {
    let hex = hex.trim_start_matches('#');
    let expanded: String = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };
    if expanded.len() != 6 {
        return format!("#{hex}");
    }
    match (
        u8::from_str_radix(&expanded[0..2], 16),
        u8::from_str_radix(&expanded[2..4], 16),
        u8::from_str_radix(&expanded[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => format!("rgba({r},{g},{b},{alpha:.2})"),
        _ => format!("#{hex}"),
    }
}

/// Contact line parts: phone | email | linkedin | github | website.
pub fn contact_parts(email: &str, github_username: Option<&str>, options: &ExportOptions) -> Vec<String> {
    let mut parts = Vec::new();
    if options.include_phone {
        if let Some(phone) = options.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            parts.push(esc(phone));
        }
    }
    if !email.trim().is_empty() {
        parts.push(esc(email));
    }
    if options.include_linkedin {
        if let Some(li) = options.linkedin.as_deref().filter(|l| !l.trim().is_empty()) {
            let li = if li.starts_with("http") {
                li.to_string()
            } else {
                format!("linkedin.com/in/{li}")
            };
            parts.push(esc(&li));
        }
    }
    if let Some(gh) = github_username.filter(|g| !g.trim().is_empty()) {
        parts.push(format!("github.com/{}", esc(gh)));
    }
    if options.include_website {
        if let Some(site) = options.website.as_deref().filter(|w| !w.trim().is_empty()) {
            parts.push(esc(site));
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn skill(name: &str, proficiency: Proficiency) -> SkillRow {
        SkillRow {
            id: Uuid::new_v4(),
            portfolio_id: Uuid::new_v4(),
            name: name.to_string(),
            category: "Language".to_string(),
            proficiency: proficiency.as_str().to_string(),
            display_order: 0,
        }
    }

    fn project(name: &str, stars: i32, highlighted: bool) -> ProjectRow {
        ProjectRow {
            id: Uuid::new_v4(),
            portfolio_id: Uuid::new_v4(),
            github_repo_id: None,
            name: name.to_string(),
            description: None,
            ai_enhanced_description: None,
            ai_enhanced_at: None,
            url: None,
            languages: Json(vec![]),
            stars,
            forks: 0,
            is_highlighted: highlighted,
            display_order: 0,
        }
    }

    #[test]
    fn test_esc_covers_all_four() {
        assert_eq!(
            esc("<script>alert(\"x & y\")</script>"),
            "&lt;script&gt;alert(&quot;x &amp; y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_split_bullets_newlines_strip_markers() {
        let bullets = split_bullets("- Built a thing\n\u{2022} Shipped it\n\nMaintained it");
        assert_eq!(bullets, vec!["Built a thing", "Shipped it", "Maintained it"]);
    }

    #[test]
    fn test_split_bullets_sentence_boundaries() {
        let bullets = split_bullets("Built a parser. Deployed it to prod! Optimized hot paths.");
        assert_eq!(
            bullets,
            vec!["Built a parser.", "Deployed it to prod!", "Optimized hot paths."]
        );
    }

    #[test]
    fn test_split_bullets_single_sentence_stays_whole() {
        assert_eq!(
            split_bullets("A single e.g. sentence with no split"),
            vec!["A single e.g. sentence with no split"]
        );
    }

    #[test]
    fn test_top_projects_prefers_highlighted() {
        let projects = vec![
            project("low", 1, true),
            project("high", 100, false),
        ];
        let top = top_projects(&projects, 8);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "low");
    }

    #[test]
    fn test_top_projects_falls_back_to_stars_with_cap() {
        let projects: Vec<ProjectRow> =
            (0..10).map(|i| project(&format!("p{i}"), i, false)).collect();
        let top = top_projects(&projects, 8);
        assert_eq!(top.len(), 8);
        assert_eq!(top[0].name, "p9");
        assert_eq!(top[7].name, "p2");
    }

    #[test]
    fn test_group_skills_fixed_order_skips_empty() {
        let skills = vec![
            skill("Go", Proficiency::Beginner),
            skill("Rust", Proficiency::Expert),
            skill("C", Proficiency::Expert),
        ];
        let groups = group_skills(&skills);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Proficiency::Expert);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, Proficiency::Beginner);
    }

    #[test]
    fn test_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(fmt_month_year(d), "Mar 2024");
        assert_eq!(fmt_mm_yyyy(d), "03/2024");
    }

    #[test]
    fn test_date_span_present_substitution() {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1);
        assert_eq!(date_span(start, None, true, fmt_mm_yyyy), "01/2022 - Present");
        assert_eq!(date_span(start, None, false, fmt_mm_yyyy), "01/2022");
        assert_eq!(date_span(None, None, true, fmt_mm_yyyy), "");
    }

    #[test]
    fn test_rgba_parses_hex() {
        assert_eq!(rgba("#8B5CF6", 0.12), "rgba(139,92,246,0.12)");
        assert_eq!(rgba("#fff", 0.5), "rgba(255,255,255,0.50)");
        assert_eq!(rgba("#zzz", 0.5), "#zzz");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("alice dev smith"), "AD");
        assert_eq!(initials("bob"), "B");
    }

    #[test]
    fn test_contact_parts_omits_disabled_fields() {
        let options = ExportOptions {
            include_phone: true,
            phone: Some("+1 555 0100".to_string()),
            include_linkedin: true,
            linkedin: Some("alice".to_string()),
            ..Default::default()
        };
        let parts = contact_parts("alice@example.com", Some("alice-dev"), &options);
        assert_eq!(
            parts,
            vec![
                "+1 555 0100",
                "alice@example.com",
                "linkedin.com/in/alice",
                "github.com/alice-dev"
            ]
        );

        let none = contact_parts("", None, &ExportOptions::default());
        assert!(none.is_empty());
    }
}
