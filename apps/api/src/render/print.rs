//! Print dialect: XHTML 1.0 Strict with table layout and CSS 2.1 only,
//! which is what the external PDF renderer consumes reliably.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::models::portfolio::Proficiency;
use crate::portfolio::bundle::Bundle;
use crate::render::preview::{degree_line, year_range};
use crate::render::{
    contact_parts, date_span, esc, fmt_mm_yyyy, group_skills, resolve_display_name, split_bullets,
    top_projects, ExportOptions,
};

const PRINT_PROJECT_CAP: usize = 8;
const SIDEBAR_LANG_CAP: usize = 8;

struct Palette {
    header_bg: &'static str,
    header_text: &'static str,
    header_tagline: &'static str,
    header_contact: &'static str,
    accent: &'static str,
    body_bg: &'static str,
    body_text: &'static str,
    body_muted: &'static str,
    body_faint: &'static str,
    divider: &'static str,
    font_family: &'static str,
    monospace: bool,
}

enum Layout {
    TwoColumn,
    SingleColumn,
}

fn resolve_template(key: &str) -> (Palette, Layout) {
    match key {
        "dark" => (
            Palette {
                header_bg: "#111827",
                header_text: "#f9fafb",
                header_tagline: "#9ca3af",
                header_contact: "#d1d5db",
                accent: "#8b5cf6",
                body_bg: "#1f2937",
                body_text: "#e5e7eb",
                body_muted: "#9ca3af",
                body_faint: "#6b7280",
                divider: "#374151",
                font_family: "Helvetica, Arial, sans-serif",
                monospace: false,
            },
            Layout::TwoColumn,
        ),
        "hacker" => (
            Palette {
                header_bg: "#0a0e0a",
                header_text: "#33ff33",
                header_tagline: "#1f9e1f",
                header_contact: "#2ecc2e",
                accent: "#33ff33",
                body_bg: "#0a0e0a",
                body_text: "#33ff33",
                body_muted: "#1f9e1f",
                body_faint: "#176e17",
                divider: "#1f3d1f",
                font_family: "Courier, 'Courier New', monospace",
                monospace: true,
            },
            Layout::SingleColumn,
        ),
        "minimal" => (
            Palette {
                header_bg: "#ffffff",
                header_text: "#111111",
                header_tagline: "#555555",
                header_contact: "#555555",
                accent: "#111111",
                body_bg: "#ffffff",
                body_text: "#222222",
                body_muted: "#555555",
                body_faint: "#888888",
                divider: "#dddddd",
                font_family: "Georgia, 'Times New Roman', serif",
                monospace: false,
            },
            Layout::SingleColumn,
        ),
        _ => (
            Palette {
                header_bg: "#1e3a5f",
                header_text: "#ffffff",
                header_tagline: "#b8c7d9",
                header_contact: "#d6e0eb",
                accent: "#1e3a5f",
                body_bg: "#ffffff",
                body_text: "#2d2d2d",
                body_muted: "#555555",
                body_faint: "#888888",
                divider: "#d0d7de",
                font_family: "Helvetica, Arial, sans-serif",
                monospace: false,
            },
            Layout::TwoColumn,
        ),
    }
}

/// Renders the resume document for the PDF pipeline.
pub fn generate(bundle: &Bundle, template_key: &str, options: &ExportOptions) -> String {
    let (palette, layout) = resolve_template(template_key);
    let name = resolve_display_name(bundle);

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    html.push_str(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n",
    );
    html.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\">\n<head>\n");
    let _ = writeln!(html, "<title>{} - Resume</title>", esc(&name));
    html.push_str("<style type=\"text/css\">\n");
    push_css(&mut html, &palette);
    html.push_str("</style>\n</head>\n<body>\n");

    push_header(&mut html, bundle, &name, options, &palette);

    match layout {
        Layout::TwoColumn => push_two_column_body(&mut html, bundle),
        Layout::SingleColumn => push_single_column_body(&mut html, bundle, palette.monospace),
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn push_css(html: &mut String, p: &Palette) {
    let _ = write!(
        html,
        "body{{margin:0;padding:0;background:{body_bg};color:{body_text};\
         font-family:{font};font-size:10pt;line-height:1.5;}}\n\
         table{{border-collapse:collapse;width:100%;}}\n\
         td{{vertical-align:top;}}\n\
         .banner{{background:{header_bg};color:{header_text};padding:22pt 28pt;}}\n\
         .name{{font-size:20pt;font-weight:bold;letter-spacing:1pt;color:{header_text};margin:0;}}\n\
         .tagline{{color:{header_tagline};font-size:10pt;margin:4pt 0 0 0;}}\n\
         .contact{{color:{header_contact};font-size:8pt;text-align:right;}}\n\
         .photo{{width:54pt;height:54pt;}}\n\
         .body-pad{{padding:18pt 28pt;}}\n\
         .left-col{{width:62%;padding-right:16pt;}}\n\
         .right-col{{width:38%;padding-left:12pt;border-left:1pt solid {divider};}}\n\
         h2{{font-size:10pt;font-weight:bold;color:{accent};letter-spacing:1pt;\
         border-bottom:1pt solid {divider};padding-bottom:3pt;margin:14pt 0 7pt 0;}}\n\
         .entry{{margin:0 0 9pt 0;}}\n\
         .entry-title{{font-weight:bold;color:{body_text};}}\n\
         .entry-sub{{color:{body_muted};}}\n\
         .entry-dates{{color:{body_faint};font-size:8pt;}}\n\
         .bullets{{margin:3pt 0 0 12pt;padding:0;}}\n\
         .bullets li{{margin:0 0 2pt 0;}}\n\
         .tag{{color:{body_text};}}\n\
         .meta{{color:{body_faint};font-size:8pt;}}\n\
         p{{margin:3pt 0;}}\n",
        body_bg = p.body_bg,
        body_text = p.body_text,
        font = p.font_family,
        header_bg = p.header_bg,
        header_text = p.header_text,
        header_tagline = p.header_tagline,
        header_contact = p.header_contact,
        divider = p.divider,
        accent = p.accent,
        body_muted = p.body_muted,
        body_faint = p.body_faint,
    );
}

fn push_header(
    html: &mut String,
    bundle: &Bundle,
    name: &str,
    options: &ExportOptions,
    palette: &Palette,
) {
    let display_name = if palette.monospace {
        format!("$ {}", name.to_lowercase())
    } else {
        name.to_uppercase()
    };
    let tagline = bundle
        .portfolio
        .tagline
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(|t| {
            if palette.monospace {
                format!("// {t}")
            } else {
                t.to_string()
            }
        });

    html.push_str("<table class=\"banner\">\n<tr>\n<td>\n");
    let _ = writeln!(html, "<p class=\"name\">{}</p>", esc(&display_name));
    if let Some(tagline) = tagline {
        let _ = writeln!(html, "<p class=\"tagline\">{}</p>", esc(&tagline));
    }
    html.push_str("</td>\n<td class=\"contact\">\n");
    for part in contact_parts(&bundle.user.email, bundle.user.github_username.as_deref(), options) {
        let _ = writeln!(html, "<p>{part}</p>");
    }
    html.push_str("</td>\n");
    if options.include_photo {
        if let Some(photo) = options
            .photo_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or(bundle.user.avatar_url.as_deref())
        {
            let _ = writeln!(
                html,
                "<td style=\"width:60pt;\"><img class=\"photo\" src=\"{}\" alt=\"\"/></td>",
                esc(photo)
            );
        }
    }
    html.push_str("</tr>\n</table>\n");
}

fn push_two_column_body(html: &mut String, bundle: &Bundle) {
    html.push_str("<table class=\"body-pad\">\n<tr>\n<td class=\"left-col\">\n");

    if let Some(about) = bundle.about.as_deref() {
        html.push_str("<h2>SUMMARY</h2>\n");
        let _ = writeln!(html, "<p>{}</p>", esc(&clean_summary(about)));
    }
    push_experience_blocks(html, bundle);
    push_project_blocks(html, bundle);

    html.push_str("</td>\n<td class=\"right-col\">\n");

    let groups = group_skills(&bundle.skills);
    if !groups.is_empty() {
        html.push_str("<h2>SKILLS</h2>\n");
        for (tier, skills) in groups {
            let names: Vec<String> = skills.iter().map(|s| esc(&s.name)).collect();
            let _ = writeln!(
                html,
                "<p><span class=\"entry-title\">{}</span><br/><span class=\"tag\">{}</span></p>",
                tier.label(),
                names.join(", ")
            );
        }
    }
    push_education_blocks(html, bundle, "EDUCATION");
    push_certification_blocks(html, bundle, "CERTIFICATIONS");
    push_github_stats(html, bundle);

    html.push_str("</td>\n</tr>\n</table>\n");
}

fn push_single_column_body(html: &mut String, bundle: &Bundle, monospace: bool) {
    let titles = if monospace {
        ["README.md", "tech_stack", "work_history", "repositories", "education", "certifications"]
    } else {
        ["SUMMARY", "SKILLS", "EXPERIENCE", "PROJECTS", "EDUCATION", "CERTIFICATIONS"]
    };

    html.push_str("<div class=\"body-pad\">\n");

    if let Some(about) = bundle.about.as_deref() {
        let _ = writeln!(html, "<h2>{}</h2>", titles[0]);
        let _ = writeln!(html, "<p>{}</p>", esc(&clean_summary(about)));
    }

    let groups = group_skills(&bundle.skills);
    if !groups.is_empty() {
        let _ = writeln!(html, "<h2>{}</h2>", titles[1]);
        let lines: Vec<String> = groups
            .iter()
            .map(|(tier, skills)| {
                let names: Vec<String> = skills.iter().map(|s| esc(&s.name)).collect();
                format!("{}: {}", strength_label(*tier), names.join(", "))
            })
            .collect();
        let _ = writeln!(html, "<p class=\"tag\">{}</p>", lines.join("  |  "));
    }

    if !bundle.experiences.is_empty() {
        let _ = writeln!(html, "<h2>{}</h2>", titles[2]);
        push_experience_entries(html, bundle);
    }

    let projects = top_projects(&bundle.projects, PRINT_PROJECT_CAP);
    if !projects.is_empty() {
        let _ = writeln!(html, "<h2>{}</h2>", titles[3]);
        for project in projects {
            push_project_entry(html, project);
        }
    }

    if !bundle.education.is_empty() {
        let _ = writeln!(html, "<h2>{}</h2>", titles[4]);
        push_education_entries(html, bundle);
    }
    if !bundle.certifications.is_empty() {
        let _ = writeln!(html, "<h2>{}</h2>", titles[5]);
        push_certification_entries(html, bundle);
    }

    html.push_str("</div>\n");
}

fn push_experience_blocks(html: &mut String, bundle: &Bundle) {
    if bundle.experiences.is_empty() {
        return;
    }
    html.push_str("<h2>EXPERIENCE</h2>\n");
    push_experience_entries(html, bundle);
}

fn push_experience_entries(html: &mut String, bundle: &Bundle) {
    for exp in &bundle.experiences {
        html.push_str("<div class=\"entry\">\n");
        let _ = writeln!(
            html,
            "<p><span class=\"entry-title\">{}</span> <span class=\"entry-sub\">{}</span></p>",
            esc(&exp.title),
            esc(&exp.company)
        );
        let dates = date_span(exp.start_date, exp.end_date, exp.is_current, fmt_mm_yyyy);
        if !dates.is_empty() {
            let _ = writeln!(html, "<p class=\"entry-dates\">{dates}</p>");
        }
        if let Some(desc) = exp.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let bullets = split_bullets(desc);
            html.push_str("<ul class=\"bullets\">\n");
            for bullet in bullets {
                let _ = writeln!(html, "<li>{}</li>", esc(&bullet));
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</div>\n");
    }
}

fn push_project_blocks(html: &mut String, bundle: &Bundle) {
    let projects = top_projects(&bundle.projects, PRINT_PROJECT_CAP);
    if projects.is_empty() {
        return;
    }
    html.push_str("<h2>MY PROJECTS</h2>\n");
    for project in projects {
        push_project_entry(html, project);
    }
}

fn push_project_entry(html: &mut String, project: &crate::models::portfolio::ProjectRow) {
    html.push_str("<div class=\"entry\">\n");
    let mut title = format!("<span class=\"entry-title\">{}</span>", esc(&project.name));
    if !project.languages.0.is_empty() {
        let _ = write!(
            title,
            " <span class=\"entry-sub\">{}</span>",
            esc(&project.languages.0.join(", "))
        );
    }
    let _ = writeln!(html, "<p>{title}</p>");
    let _ = writeln!(
        html,
        "<p class=\"meta\">{} stars / {} forks</p>",
        project.stars, project.forks
    );
    if let Some(desc) = project.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let bullets = split_bullets(desc);
        if bullets.len() > 1 {
            html.push_str("<ul class=\"bullets\">\n");
            for bullet in bullets {
                let _ = writeln!(html, "<li>{}</li>", esc(&bullet));
            }
            html.push_str("</ul>\n");
        } else if let Some(only) = bullets.first() {
            let _ = writeln!(html, "<p>{}</p>", esc(only));
        }
    }
    if let Some(url) = project.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let _ = writeln!(html, "<p class=\"meta\">GitHub: {}</p>", esc(url));
    }
    html.push_str("</div>\n");
}

fn push_education_blocks(html: &mut String, bundle: &Bundle, title: &str) {
    if bundle.education.is_empty() {
        return;
    }
    let _ = writeln!(html, "<h2>{title}</h2>");
    push_education_entries(html, bundle);
}

fn push_education_entries(html: &mut String, bundle: &Bundle) {
    for edu in &bundle.education {
        html.push_str("<div class=\"entry\">\n");
        let _ = writeln!(html, "<p class=\"entry-title\">{}</p>", esc(&edu.institution));
        if let Some(line) = degree_line(edu.degree.as_deref(), edu.field.as_deref()) {
            let _ = writeln!(html, "<p class=\"entry-sub\">{}</p>", esc(&line));
        }
        if let Some(years) = year_range(edu.start_year, edu.end_year) {
            let _ = writeln!(html, "<p class=\"entry-dates\">{years}</p>");
        }
        html.push_str("</div>\n");
    }
}

fn push_certification_blocks(html: &mut String, bundle: &Bundle, title: &str) {
    if bundle.certifications.is_empty() {
        return;
    }
    let _ = writeln!(html, "<h2>{title}</h2>");
    push_certification_entries(html, bundle);
}

fn push_certification_entries(html: &mut String, bundle: &Bundle) {
    for cert in &bundle.certifications {
        html.push_str("<div class=\"entry\">\n");
        let _ = writeln!(html, "<p class=\"entry-title\">{}</p>", esc(&cert.name));
        if let Some(org) = cert.issuing_organization.as_deref().filter(|o| !o.trim().is_empty()) {
            let _ = writeln!(html, "<p class=\"entry-sub\">{}</p>", esc(org));
        }
        if let Some(issued) = cert.issue_date {
            let _ = writeln!(html, "<p class=\"entry-dates\">{}</p>", fmt_mm_yyyy(issued));
        }
        if let Some(cred) = cert.credential_id.as_deref().filter(|c| !c.trim().is_empty()) {
            let _ = writeln!(html, "<p class=\"meta\">Credential ID: {}</p>", esc(cred));
        }
        html.push_str("</div>\n");
    }
}

fn push_github_stats(html: &mut String, bundle: &Bundle) {
    if bundle.projects.is_empty() {
        return;
    }
    let stars: i64 = bundle.projects.iter().map(|p| p.stars as i64).sum();
    let forks: i64 = bundle.projects.iter().map(|p| p.forks as i64).sum();
    let languages: BTreeSet<&str> = bundle
        .projects
        .iter()
        .flat_map(|p| p.languages.0.iter().map(String::as_str))
        .collect();
    let langs: Vec<String> = languages.into_iter().take(SIDEBAR_LANG_CAP).map(esc).collect();

    html.push_str("<h2>GITHUB</h2>\n");
    let _ = writeln!(html, "<p class=\"tag\">{} public repos</p>", bundle.projects.len());
    let _ = writeln!(html, "<p class=\"tag\">{stars} stars / {forks} forks</p>");
    if !langs.is_empty() {
        let _ = writeln!(html, "<p class=\"meta\">{}</p>", langs.join(", "));
    }
}

/// Casual wording for the single-column skill line, keyed by the tier
/// itself so a portfolio with no EXPERT skills is not inflated.
fn strength_label(tier: Proficiency) -> &'static str {
    match tier {
        Proficiency::Expert => "Strong",
        Proficiency::Advanced => "Proficient",
        Proficiency::Intermediate => "Familiar",
        Proficiency::Beginner => "Exposure",
    }
}

fn clean_summary(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::models::portfolio::{ExperienceRow, PortfolioRow, ProjectRow, SkillRow};
    use crate::models::user::UserRow;

    fn bundle(theme: &str) -> Bundle {
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
                theme_key: theme.to_string(),
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
            about: Some("Writes   fast\n\ncode.".to_string()),
            projects: vec![ProjectRow {
                id: Uuid::new_v4(),
                portfolio_id,
                github_repo_id: Some("1".to_string()),
                name: "rusty".to_string(),
                description: Some("Parses. Lexes quickly. Emits IR.".to_string()),
                ai_enhanced_description: None,
                ai_enhanced_at: None,
                url: Some("https://github.com/alice-dev/rusty".to_string()),
                languages: Json(vec!["Rust".to_string(), "C".to_string()]),
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
            experiences: vec![ExperienceRow {
                id: Uuid::new_v4(),
                portfolio_id,
                company: "Acme".to_string(),
                title: "Engineer".to_string(),
                description: Some("- Built pipelines\n- Ran them".to_string()),
                start_date: chrono::NaiveDate::from_ymd_opt(2022, 3, 1),
                end_date: None,
                is_current: true,
                display_order: 0,
            }],
            education: vec![],
            certifications: vec![],
        }
    }

    #[test]
    fn test_print_emits_xhtml_strict_prologue() {
        let html = generate(&bundle("pdf"), "pdf", &ExportOptions::default());
        assert!(html.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(html.contains("XHTML 1.0 Strict"));
        assert!(html.contains("<title>Alice Dev - Resume</title>"));
    }

    #[test]
    fn test_print_two_column_sections() {
        let html = generate(&bundle("pdf"), "pdf", &ExportOptions::default());
        assert!(html.contains("<h2>SUMMARY</h2>"));
        assert!(html.contains("<h2>SKILLS</h2>"));
        assert!(html.contains("<h2>MY PROJECTS</h2>"));
        assert!(html.contains("<h2>GITHUB</h2>"));
        assert!(html.contains("ALICE DEV"));
        assert!(html.contains("03/2022"));
        assert!(html.contains("Present"));
    }

    #[test]
    fn test_print_summary_whitespace_collapsed() {
        let html = generate(&bundle("pdf"), "pdf", &ExportOptions::default());
        assert!(html.contains("Writes fast code."));
    }

    #[test]
    fn test_print_hacker_single_column_labels() {
        let html = generate(&bundle("hacker"), "hacker", &ExportOptions::default());
        assert!(html.contains("$ alice dev"));
        assert!(html.contains("// Builds compilers"));
        assert!(html.contains("<h2>README.md</h2>"));
        assert!(html.contains("<h2>tech_stack</h2>"));
        assert!(html.contains("Strong: Rust"));
        assert!(!html.contains("<h2>GITHUB</h2>"));
    }

    #[test]
    fn test_print_skill_labels_follow_tier_not_position() {
        let mut b = bundle("hacker");
        b.skills[0].proficiency = "INTERMEDIATE".to_string();
        let html = generate(&b, "hacker", &ExportOptions::default());
        assert!(html.contains("Familiar: Rust"));
        assert!(!html.contains("Strong: Rust"));
    }

    #[test]
    fn test_print_minimal_single_column_uppercase_labels() {
        let html = generate(&bundle("minimal"), "minimal", &ExportOptions::default());
        assert!(html.contains("<h2>SUMMARY</h2>"));
        assert!(html.contains("<h2>EXPERIENCE</h2>"));
        assert!(!html.contains("right-col\">"));
    }

    #[test]
    fn test_print_contact_line_respects_options() {
        let options = ExportOptions {
            include_phone: true,
            phone: Some("+1 555 0100".to_string()),
            ..Default::default()
        };
        let html = generate(&bundle("pdf"), "pdf", &options);
        assert!(html.contains("+1 555 0100"));
        assert!(html.contains("github.com/alice-dev"));
        assert!(!html.contains("linkedin.com"));
    }

    #[test]
    fn test_print_project_sentences_become_bullets() {
        let html = generate(&bundle("pdf"), "pdf", &ExportOptions::default());
        assert!(html.contains("<li>Parses.</li>"));
        assert!(html.contains("<li>Emits IR.</li>"));
    }
}
