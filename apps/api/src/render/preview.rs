//! In-app preview page. Modern CSS (flex and grid) is fine here; only the
//! print dialect has to stay CSS 2.1 clean.

use std::fmt::Write as _;

use crate::portfolio::bundle::Bundle;
use crate::render::{
    date_span, esc, fmt_month_year, group_skills, initials, nl2br, resolve_display_name, rgba,
    top_projects,
};

const PREVIEW_PROJECT_CAP: usize = 6;

struct Theme {
    bg: &'static str,
    card: &'static str,
    text: &'static str,
    muted: &'static str,
    accent: &'static str,
    border: &'static str,
    font: &'static str,
    name_effect: NameEffect,
}

enum NameEffect {
    Gradient(&'static str, &'static str),
    Shadow(&'static str),
    Plain,
}

fn theme_for(key: &str) -> Theme {
    match key {
        "minimal" => Theme {
            bg: "#fafafa",
            card: "#ffffff",
            text: "#1a1a2e",
            muted: "#6b7280",
            accent: "#2563eb",
            border: "#e5e7eb",
            font: "'Segoe UI', 'Helvetica Neue', Arial, sans-serif",
            name_effect: NameEffect::Plain,
        },
        "hacker" => Theme {
            bg: "#0a0e0a",
            card: "#101810",
            text: "#33ff33",
            muted: "#1f9e1f",
            accent: "#33ff33",
            border: "#1f3d1f",
            font: "'Courier New', Courier, monospace",
            name_effect: NameEffect::Shadow("#33ff33"),
        },
        _ => Theme {
            bg: "#0f0f1a",
            card: "#1a1a2e",
            text: "#e8e8f0",
            muted: "#9090a8",
            accent: "#8b5cf6",
            border: "#2a2a44",
            font: "'Segoe UI', 'Helvetica Neue', Arial, sans-serif",
            name_effect: NameEffect::Gradient("#8b5cf6", "#06b6d4"),
        },
    }
}

/// Renders the full preview document for a bundle.
pub fn generate(bundle: &Bundle) -> String {
    let theme = theme_for(&bundle.portfolio.theme_key);
    let name = resolve_display_name(bundle);

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\"/>\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"/>\n");
    let _ = writeln!(html, "<title>{}</title>", esc(&name));
    html.push_str("<style>\n");
    push_css(&mut html, &theme);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"page\">\n");

    push_header(&mut html, bundle, &name, &theme);
    push_summary(&mut html, bundle);
    push_skills(&mut html, bundle);
    push_experiences(&mut html, bundle);
    push_projects(&mut html, bundle);
    push_education(&mut html, bundle);
    push_certifications(&mut html, bundle);

    html.push_str("<footer class=\"footer\">Built with OpenFolio</footer>\n");
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn push_css(html: &mut String, t: &Theme) {
    let accent_soft = rgba(t.accent, 0.12);
    let accent_line = rgba(t.accent, 0.35);
    let name_css = match t.name_effect {
        NameEffect::Gradient(from, to) => format!(
            "background:linear-gradient(90deg,{from},{to});-webkit-background-clip:text;\
             background-clip:text;color:transparent;"
        ),
        NameEffect::Shadow(color) => format!("color:{};text-shadow:0 0 12px {};", color, rgba(color, 0.6)),
        NameEffect::Plain => format!("color:{};", t.text),
    };
    let _ = write!(
        html,
        "*{{margin:0;padding:0;box-sizing:border-box;}}\n\
         body{{background:{bg};color:{text};font-family:{font};line-height:1.6;}}\n\
         .page{{max-width:860px;margin:0 auto;padding:48px 24px;}}\n\
         .header{{display:flex;align-items:center;gap:24px;margin-bottom:40px;}}\n\
         .avatar{{width:96px;height:96px;border-radius:50%;object-fit:cover;border:2px solid {accent};}}\n\
         .avatar-fallback{{width:96px;height:96px;border-radius:50%;background:{accent_soft};\
         color:{accent};display:flex;align-items:center;justify-content:center;\
         font-size:2rem;font-weight:700;}}\n\
         .name{{font-size:2.2rem;font-weight:800;{name_css}}}\n\
         .tagline{{color:{muted};margin-top:4px;}}\n\
         .contacts{{display:flex;flex-wrap:wrap;gap:8px;margin-top:12px;}}\n\
         .pill{{background:{accent_soft};color:{accent};border:1px solid {accent_line};\
         border-radius:999px;padding:2px 12px;font-size:0.8rem;}}\n\
         .section{{background:{card};border:1px solid {border};border-radius:12px;\
         padding:24px;margin-bottom:24px;}}\n\
         .section h2{{font-size:1.1rem;text-transform:uppercase;letter-spacing:0.08em;\
         color:{accent};margin-bottom:16px;}}\n\
         .skill-row{{display:flex;align-items:baseline;gap:12px;margin-bottom:10px;}}\n\
         .skill-level{{min-width:110px;color:{muted};font-size:0.85rem;}}\n\
         .chips{{display:flex;flex-wrap:wrap;gap:8px;}}\n\
         .chip{{background:{accent_soft};color:{text};border-radius:6px;padding:3px 10px;\
         font-size:0.85rem;}}\n\
         .entry{{margin-bottom:18px;}}\n\
         .entry:last-child{{margin-bottom:0;}}\n\
         .entry-head{{display:flex;justify-content:space-between;gap:12px;flex-wrap:wrap;}}\n\
         .entry-title{{font-weight:700;}}\n\
         .entry-sub{{color:{muted};}}\n\
         .entry-dates{{color:{muted};font-size:0.85rem;white-space:nowrap;}}\n\
         .entry-body{{margin-top:6px;color:{text};font-size:0.95rem;}}\n\
         .projects{{display:grid;grid-template-columns:repeat(auto-fill,minmax(320px,1fr));gap:16px;}}\n\
         .project{{border:1px solid {border};border-radius:10px;padding:16px;}}\n\
         .project-meta{{color:{muted};font-size:0.8rem;margin-top:8px;}}\n\
         .footer{{text-align:center;color:{muted};font-size:0.8rem;margin-top:32px;}}\n\
         a{{color:{accent};text-decoration:none;}}\n",
        bg = t.bg,
        text = t.text,
        font = t.font,
        accent = t.accent,
        accent_soft = accent_soft,
        accent_line = accent_line,
        muted = t.muted,
        card = t.card,
        border = t.border,
        name_css = name_css,
    );
}

fn push_header(html: &mut String, bundle: &Bundle, name: &str, _t: &Theme) {
    html.push_str("<header class=\"header\">\n");
    match bundle.user.avatar_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let _ = writeln!(html, "<img class=\"avatar\" src=\"{}\" alt=\"\"/>", esc(url));
        }
        None => {
            let _ = writeln!(html, "<div class=\"avatar-fallback\">{}</div>", esc(&initials(name)));
        }
    }
    html.push_str("<div>\n");
    let _ = writeln!(html, "<h1 class=\"name\">{}</h1>", esc(name));
    if let Some(tagline) = bundle.portfolio.tagline.as_deref().filter(|t| !t.trim().is_empty()) {
        let _ = writeln!(html, "<p class=\"tagline\">{}</p>", esc(tagline));
    }
    html.push_str("<div class=\"contacts\">\n");
    if !bundle.user.email.trim().is_empty() {
        let _ = writeln!(html, "<span class=\"pill\">{}</span>", esc(&bundle.user.email));
    }
    if let Some(login) = bundle.user.github_username.as_deref().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(html, "<span class=\"pill\">github.com/{}</span>", esc(login));
    }
    if !bundle.projects.is_empty() {
        let _ = writeln!(html, "<span class=\"pill\">{} repos</span>", bundle.projects.len());
    }
    html.push_str("</div>\n</div>\n</header>\n");
}

fn push_summary(html: &mut String, bundle: &Bundle) {
    let Some(about) = bundle.about.as_deref() else {
        return;
    };
    html.push_str("<section class=\"section\">\n<h2>Professional Summary</h2>\n");
    let _ = writeln!(html, "<p class=\"entry-body\">{}</p>", nl2br(&esc(about)));
    html.push_str("</section>\n");
}

fn push_skills(html: &mut String, bundle: &Bundle) {
    let groups = group_skills(&bundle.skills);
    if groups.is_empty() {
        return;
    }
    html.push_str("<section class=\"section\">\n<h2>Core Skills</h2>\n");
    for (tier, skills) in groups {
        html.push_str("<div class=\"skill-row\">\n");
        let _ = writeln!(html, "<span class=\"skill-level\">{}</span>", tier.label());
        html.push_str("<div class=\"chips\">\n");
        for skill in skills {
            let _ = writeln!(
                html,
                "<span class=\"chip chip-{}\">{}</span>",
                tier.as_str().to_lowercase(),
                esc(&skill.name)
            );
        }
        html.push_str("</div>\n</div>\n");
    }
    html.push_str("</section>\n");
}

fn push_experiences(html: &mut String, bundle: &Bundle) {
    if bundle.experiences.is_empty() {
        return;
    }
    html.push_str("<section class=\"section\">\n<h2>Work Experience</h2>\n");
    for exp in &bundle.experiences {
        html.push_str("<div class=\"entry\">\n<div class=\"entry-head\">\n<div>\n");
        let _ = writeln!(html, "<div class=\"entry-title\">{}</div>", esc(&exp.title));
        let _ = writeln!(html, "<div class=\"entry-sub\">{}</div>", esc(&exp.company));
        html.push_str("</div>\n");
        let dates = date_span(exp.start_date, exp.end_date, exp.is_current, fmt_month_year);
        if !dates.is_empty() {
            let _ = writeln!(html, "<div class=\"entry-dates\">{dates}</div>");
        }
        html.push_str("</div>\n");
        if let Some(desc) = exp.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(html, "<div class=\"entry-body\">{}</div>", nl2br(&esc(desc)));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</section>\n");
}

fn push_projects(html: &mut String, bundle: &Bundle) {
    let projects = top_projects(&bundle.projects, PREVIEW_PROJECT_CAP);
    if projects.is_empty() {
        return;
    }
    html.push_str("<section class=\"section\">\n<h2>Notable Projects</h2>\n<div class=\"projects\">\n");
    for project in projects {
        html.push_str("<div class=\"project\">\n");
        match project.url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => {
                let _ = writeln!(
                    html,
                    "<div class=\"entry-title\"><a href=\"{}\">{}</a></div>",
                    esc(url),
                    esc(&project.name)
                );
            }
            None => {
                let _ = writeln!(html, "<div class=\"entry-title\">{}</div>", esc(&project.name));
            }
        }
        if let Some(desc) = project.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(html, "<div class=\"entry-body\">{}</div>", nl2br(&esc(desc)));
        }
        let mut meta = Vec::new();
        if !project.languages.0.is_empty() {
            meta.push(esc(&project.languages.0.join(", ")));
        }
        meta.push(format!("{} stars / {} forks", project.stars, project.forks));
        let _ = writeln!(html, "<div class=\"project-meta\">{}</div>", meta.join(" \u{2022} "));
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n</section>\n");
}

fn push_education(html: &mut String, bundle: &Bundle) {
    if bundle.education.is_empty() {
        return;
    }
    html.push_str("<section class=\"section\">\n<h2>Education</h2>\n");
    for edu in &bundle.education {
        html.push_str("<div class=\"entry\">\n<div class=\"entry-head\">\n<div>\n");
        let _ = writeln!(html, "<div class=\"entry-title\">{}</div>", esc(&edu.institution));
        if let Some(line) = degree_line(edu.degree.as_deref(), edu.field.as_deref()) {
            let _ = writeln!(html, "<div class=\"entry-sub\">{}</div>", esc(&line));
        }
        html.push_str("</div>\n");
        if let Some(years) = year_range(edu.start_year, edu.end_year) {
            let _ = writeln!(html, "<div class=\"entry-dates\">{years}</div>");
        }
        html.push_str("</div>\n</div>\n");
    }
    html.push_str("</section>\n");
}

fn push_certifications(html: &mut String, bundle: &Bundle) {
    if bundle.certifications.is_empty() {
        return;
    }
    html.push_str("<section class=\"section\">\n<h2>Licenses &amp; Certifications</h2>\n");
    for cert in &bundle.certifications {
        html.push_str("<div class=\"entry\">\n<div class=\"entry-head\">\n<div>\n");
        let _ = writeln!(html, "<div class=\"entry-title\">{}</div>", esc(&cert.name));
        if let Some(org) = cert.issuing_organization.as_deref().filter(|o| !o.trim().is_empty()) {
            let _ = writeln!(html, "<div class=\"entry-sub\">{}</div>", esc(org));
        }
        html.push_str("</div>\n");
        if let Some(issued) = cert.issue_date {
            let _ = writeln!(html, "<div class=\"entry-dates\">{}</div>", fmt_month_year(issued));
        }
        html.push_str("</div>\n</div>\n");
    }
    html.push_str("</section>\n");
}

pub(crate) fn degree_line(degree: Option<&str>, field: Option<&str>) -> Option<String> {
    let degree = degree.filter(|d| !d.trim().is_empty());
    let field = field.filter(|f| !f.trim().is_empty());
    match (degree, field) {
        (Some(d), Some(f)) => Some(format!("{d} in {f}")),
        (Some(d), None) => Some(d.to_string()),
        (None, Some(f)) => Some(f.to_string()),
        (None, None) => None,
    }
}

pub(crate) fn year_range(start: Option<i32>, end: Option<i32>) -> Option<String> {
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{s} - {e}")),
        (Some(s), None) => Some(s.to_string()),
        (None, Some(e)) => Some(e.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::models::portfolio::{PortfolioRow, ProjectRow, SkillRow};
    use crate::models::user::UserRow;

    fn bundle(theme_key: &str) -> Bundle {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let portfolio_id = Uuid::new_v4();
        Bundle {
            portfolio: PortfolioRow {
                id: portfolio_id,
                user_id,
                slug: "alice".to_string(),
                title: Some("Alice's Portfolio".to_string()),
                tagline: Some("Builds compilers".to_string()),
                theme_key: theme_key.to_string(),
                is_published: true,
                ai_enhanced_summary: None,
                ai_enhanced_at: None,
                created_at: now,
                updated_at: now,
            },
            user: UserRow {
                id: user_id,
                email: "alice@example.com".to_string(),
                display_name: Some("Alice Dev".to_string()),
                github_username: Some("alice-dev".to_string()),
                avatar_url: None,
                created_at: now,
            },
            about: Some("Systems programmer.\nLikes <tools>.".to_string()),
            projects: vec![ProjectRow {
                id: Uuid::new_v4(),
                portfolio_id,
                github_repo_id: Some("1".to_string()),
                name: "rusty".to_string(),
                description: Some("A thing".to_string()),
                ai_enhanced_description: None,
                ai_enhanced_at: None,
                url: Some("https://github.com/alice-dev/rusty".to_string()),
                languages: Json(vec!["Rust".to_string()]),
                stars: 42,
                forks: 3,
                is_highlighted: true,
                display_order: 0,
            }],
            skills: vec![SkillRow {
                id: Uuid::new_v4(),
                portfolio_id,
                name: "Rust".to_string(),
                category: "Language".to_string(),
                proficiency: "EXPERT".to_string(),
                display_order: 0,
            }],
            experiences: vec![],
            education: vec![],
            certifications: vec![],
        }
    }

    #[test]
    fn test_preview_escapes_about_content() {
        let html = generate(&bundle("dark"));
        assert!(html.contains("Likes &lt;tools&gt;."));
        assert!(!html.contains("Likes <tools>"));
    }

    #[test]
    fn test_preview_contains_core_sections() {
        let html = generate(&bundle("dark"));
        assert!(html.contains("Professional Summary"));
        assert!(html.contains("Core Skills"));
        assert!(html.contains("Notable Projects"));
        assert!(html.contains("github.com/alice-dev"));
        assert!(html.contains("1 repos"));
        assert!(html.contains("Built with OpenFolio"));
        assert!(!html.contains("Work Experience"));
        assert!(!html.contains("Education</h2>"));
    }

    #[test]
    fn test_preview_theme_switches_palette() {
        let hacker = generate(&bundle("hacker"));
        assert!(hacker.contains("#33ff33"));
        assert!(hacker.contains("monospace"));
        let minimal = generate(&bundle("minimal"));
        assert!(minimal.contains("#fafafa"));
    }

    #[test]
    fn test_preview_initials_fallback_without_avatar() {
        let html = generate(&bundle("dark"));
        assert!(html.contains("avatar-fallback"));
        assert!(html.contains(">AD<"));
    }

    #[test]
    fn test_degree_line_and_year_range() {
        assert_eq!(degree_line(Some("BSc"), Some("CS")).as_deref(), Some("BSc in CS"));
        assert_eq!(degree_line(None, Some("CS")).as_deref(), Some("CS"));
        assert_eq!(degree_line(None, None), None);
        assert_eq!(year_range(Some(2018), Some(2022)).as_deref(), Some("2018 - 2022"));
        assert_eq!(year_range(Some(2018), None).as_deref(), Some("2018"));
    }
}
