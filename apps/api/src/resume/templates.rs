//! Resume HTML in four templates (classic, modern, minimal, bold), each
//! with a WebView preview build and an XHTML/CSS2 build for the PDF
//! renderer.

use std::fmt::Write as _;

use crate::models::portfolio::{EducationRow, ExperienceRow, ProjectRow, SkillRow};
use crate::render::{esc, group_skills, initials};
use crate::resume::bundle::ResumeBundle;

const PROJECT_CAP: usize = 6;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub accent: &'static str,
    pub icon: &'static str,
}

pub fn catalog() -> Vec<TemplateInfo> {
    vec![
        TemplateInfo {
            key: "classic",
            name: "Classic",
            description: "Clean single-column layout inspired by top tech resumes. ATS-friendly, print-optimised.",
            accent: "#7C3AED",
            icon: "\u{1F4C4}",
        },
        TemplateInfo {
            key: "modern",
            name: "Modern",
            description: "Contemporary two-tone header with skill bars and timeline-style experience.",
            accent: "#2563EB",
            icon: "\u{2728}",
        },
        TemplateInfo {
            key: "minimal",
            name: "Minimal",
            description: "Elegant whitespace-focused design. Maximum readability, zero distractions.",
            accent: "#0D9488",
            icon: "\u{25FB}\u{FE0F}",
        },
        TemplateInfo {
            key: "bold",
            name: "Bold",
            description: "High-contrast dark header with vivid accent colors. Makes a strong first impression.",
            accent: "#DC2626",
            icon: "\u{1F525}",
        },
    ]
}

/// Preview HTML (WebView, modern CSS). Unknown keys fall back to classic.
pub fn generate(bundle: &ResumeBundle, template_key: &str) -> String {
    match template_key.to_lowercase().as_str() {
        "modern" => preview_modern(bundle),
        "minimal" => preview_minimal(bundle),
        "bold" => preview_bold(bundle),
        _ => preview_classic(bundle),
    }
}

/// PDF HTML (XHTML strict, CSS2, tables).
pub fn generate_for_pdf(bundle: &ResumeBundle, template_key: &str) -> String {
    match template_key.to_lowercase().as_str() {
        "modern" => pdf_modern(bundle),
        "minimal" => pdf_minimal(bundle),
        "bold" => pdf_bold(bundle),
        _ => pdf_classic(bundle),
    }
}

// ---- preview builders ----

fn preview_classic(b: &ResumeBundle) -> String {
    let mut html = preview_head(&b.name(), &classic_preview_css());
    html.push_str("<div class=\"header\">\n");
    let _ = writeln!(html, "<h1 class=\"name\">{}</h1>", esc(&b.name()));
    if let Some(jt) = b.job_title() {
        let _ = writeln!(html, "<div class=\"job-title\">{}</div>", esc(&jt));
    }
    push_contacts(&mut html, b);
    html.push_str("</div>\n");

    if let Some(summary) = b.summary() {
        push_section_title(&mut html, "PROFESSIONAL SUMMARY");
        let _ = writeln!(html, "<p class=\"summary\">{}</p></div>", esc(&summary));
    }
    if !b.skills.is_empty() {
        push_section_title(&mut html, "TECHNICAL SKILLS");
        push_preview_skills_grouped(&mut html, &b.skills);
    }
    if !b.experiences.is_empty() {
        push_section_title(&mut html, "WORK EXPERIENCE");
        push_preview_experience(&mut html, &b.experiences);
    }
    if !b.projects.is_empty() {
        push_section_title(&mut html, "NOTABLE PROJECTS");
        push_preview_projects(&mut html, &b.projects);
    }
    if !b.education.is_empty() {
        push_section_title(&mut html, "EDUCATION");
        push_preview_education(&mut html, &b.education);
    }
    html.push_str("</div>\n</body>\n</html>");
    html
}

fn preview_modern(b: &ResumeBundle) -> String {
    let mut html = preview_head(&b.name(), &modern_preview_css());
    html.push_str("<div class=\"header-modern\">\n<div class=\"header-bar\"></div>\n");
    html.push_str("<div class=\"header-content\">\n");
    let _ = writeln!(html, "<div class=\"avatar-circle\">{}</div>", esc(&initials(&b.name())));
    html.push_str("<div class=\"header-text\">\n");
    let _ = writeln!(html, "<h1 class=\"name\">{}</h1>", esc(&b.name()));
    if let Some(jt) = b.job_title() {
        let _ = writeln!(html, "<div class=\"job-title\">{}</div>", esc(&jt));
    }
    html.push_str("</div>\n</div>\n");
    push_contacts(&mut html, b);
    html.push_str("</div>\n");

    if let Some(summary) = b.summary() {
        push_section_title(&mut html, "About Me");
        let _ = writeln!(html, "<p class=\"summary\">{}</p></div>", esc(&summary));
    }
    if !b.skills.is_empty() {
        push_section_title(&mut html, "Skills");
        html.push_str("<div class=\"skill-chips\">\n");
        for skill in &b.skills {
            let _ = write!(
                html,
                "<span class=\"chip chip-{}\">{}</span>",
                skill.proficiency.to_lowercase(),
                esc(&skill.name)
            );
        }
        html.push_str("\n</div></div>\n");
    }
    if !b.experiences.is_empty() {
        push_section_title(&mut html, "Experience");
        push_preview_experience(&mut html, &b.experiences);
    }
    if !b.projects.is_empty() {
        push_section_title(&mut html, "Projects");
        push_preview_projects(&mut html, &b.projects);
    }
    if !b.education.is_empty() {
        push_section_title(&mut html, "Education");
        push_preview_education(&mut html, &b.education);
    }
    html.push_str("</div>\n</body>\n</html>");
    html
}

fn preview_minimal(b: &ResumeBundle) -> String {
    let mut html = preview_head(&b.name(), &minimal_preview_css());
    html.push_str("<div class=\"header-minimal\">\n");
    let _ = writeln!(html, "<h1 class=\"name\">{}</h1>", esc(&b.name()));
    if let Some(jt) = b.job_title() {
        let _ = writeln!(html, "<div class=\"job-title\">{}</div>", esc(&jt));
    }
    push_contacts(&mut html, b);
    html.push_str("</div>\n<hr class=\"divider\"/>\n");

    if let Some(summary) = b.summary() {
        push_section_title(&mut html, "Summary");
        let _ = writeln!(html, "<p class=\"summary\">{}</p></div>", esc(&summary));
    }
    if !b.skills.is_empty() {
        push_section_title(&mut html, "Skills");
        let names: Vec<String> = b.skills.iter().map(|s| esc(&s.name)).collect();
        let _ = writeln!(html, "<div class=\"skill-list\">{}</div></div>", names.join("  \u{b7}  "));
    }
    if !b.experiences.is_empty() {
        push_section_title(&mut html, "Experience");
        push_preview_experience(&mut html, &b.experiences);
    }
    if !b.projects.is_empty() {
        push_section_title(&mut html, "Projects");
        push_preview_projects(&mut html, &b.projects);
    }
    if !b.education.is_empty() {
        push_section_title(&mut html, "Education");
        push_preview_education(&mut html, &b.education);
    }
    html.push_str("</div>\n</body>\n</html>");
    html
}

fn preview_bold(b: &ResumeBundle) -> String {
    let mut html = preview_head(&b.name(), &bold_preview_css());
    html.push_str("<div class=\"header-bold\">\n<div class=\"header-bg\"></div>\n<div class=\"header-fg\">\n");
    let _ = writeln!(html, "<h1 class=\"name\">{}</h1>", esc(&b.name()));
    if let Some(jt) = b.job_title() {
        let _ = writeln!(html, "<div class=\"job-title\">{}</div>", esc(&jt));
    }
    push_contacts(&mut html, b);
    html.push_str("</div>\n</div>\n");

    if let Some(summary) = b.summary() {
        push_section_title(&mut html, "PROFILE");
        let _ = writeln!(html, "<p class=\"summary\">{}</p></div>", esc(&summary));
    }
    if !b.skills.is_empty() {
        push_section_title(&mut html, "SKILLS");
        html.push_str("<div class=\"skill-tags\">\n");
        for skill in &b.skills {
            let _ = write!(html, "<span class=\"tag\">{}</span>", esc(&skill.name));
        }
        html.push_str("\n</div></div>\n");
    }
    if !b.experiences.is_empty() {
        push_section_title(&mut html, "EXPERIENCE");
        push_preview_experience(&mut html, &b.experiences);
    }
    if !b.projects.is_empty() {
        push_section_title(&mut html, "PROJECTS");
        push_preview_projects(&mut html, &b.projects);
    }
    if !b.education.is_empty() {
        push_section_title(&mut html, "EDUCATION");
        push_preview_education(&mut html, &b.education);
    }
    html.push_str("</div>\n</body>\n</html>");
    html
}

// ---- shared preview fragments ----

fn preview_head(title: &str, css: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\"/>\n\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\"/>\n\
         <title>{} \u{2014} Resume</title>\n<style>{css}</style>\n</head>\n<body>\n<div class=\"page\">\n",
        esc(title)
    )
}

fn push_section_title(html: &mut String, title: &str) {
    let _ = writeln!(html, "<div class=\"section\"><h2 class=\"sec-title\">{}</h2>", esc(title));
}

fn push_contacts(html: &mut String, b: &ResumeBundle) {
    html.push_str("<div class=\"contacts\">");
    for line in b.contact_lines() {
        let _ = write!(html, "<span class=\"contact\">{}</span>", esc(&line));
    }
    html.push_str("</div>\n");
}

fn push_preview_skills_grouped(html: &mut String, skills: &[SkillRow]) {
    html.push_str("<div class=\"skills-grid\">\n");
    for (tier, group) in group_skills(skills) {
        let names: Vec<String> = group.iter().map(|s| esc(&s.name)).collect();
        let _ = writeln!(
            html,
            "<div class=\"skill-row\"><span class=\"skill-level\">{}</span><span class=\"skill-names\">{}</span></div>",
            tier.label(),
            names.join("  \u{b7}  ")
        );
    }
    html.push_str("</div></div>\n");
}

fn push_preview_experience(html: &mut String, experiences: &[ExperienceRow]) {
    html.push_str("<div class=\"exp-list\">\n");
    for exp in experiences {
        html.push_str("<div class=\"exp-item\">\n<div class=\"exp-top\">\n<div class=\"exp-left\">\n");
        let _ = writeln!(html, "<div class=\"exp-role\">{}</div>", esc(&exp.title));
        let _ = writeln!(html, "<div class=\"exp-company\">{}</div>", esc(&exp.company));
        html.push_str("</div>\n");
        let dates = format_dates(exp);
        if !dates.is_empty() {
            let _ = writeln!(html, "<div class=\"exp-dates\">{}</div>", esc(&dates));
        }
        html.push_str("</div>\n");
        if let Some(desc) = exp.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(html, "<p class=\"exp-desc\">{}</p>", esc(desc));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div></div>\n");
}

fn push_preview_projects(html: &mut String, projects: &[ProjectRow]) {
    html.push_str("<div class=\"proj-list\">\n");
    for project in projects.iter().take(PROJECT_CAP) {
        html.push_str("<div class=\"proj-item\">\n<div class=\"proj-top\">\n");
        let _ = writeln!(html, "<span class=\"proj-name\">{}</span>", esc(&project.name));
        if project.stars > 0 {
            let _ = writeln!(html, "<span class=\"proj-stars\">\u{2b50} {}</span>", project.stars);
        }
        html.push_str("</div>\n");
        if !project.languages.0.is_empty() {
            html.push_str("<div class=\"proj-langs\">");
            for lang in &project.languages.0 {
                let _ = write!(html, "<span class=\"lang-pill\">{}</span>", esc(lang));
            }
            html.push_str("</div>\n");
        }
        if let Some(desc) = project.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(html, "<p class=\"proj-desc\">{}</p>", esc(desc));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div></div>\n");
}

fn push_preview_education(html: &mut String, education: &[EducationRow]) {
    html.push_str("<div class=\"edu-list\">\n");
    for edu in education {
        html.push_str("<div class=\"edu-item\">\n");
        if let Some(deg) = degree_line(edu) {
            let _ = writeln!(html, "<div class=\"edu-degree\">{}</div>", esc(&deg));
        }
        let _ = writeln!(html, "<div class=\"edu-inst\">{}</div>", esc(&edu.institution));
        let years = format_edu_years(edu);
        if !years.is_empty() {
            let _ = writeln!(html, "<div class=\"edu-dates\">{}</div>", esc(&years));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div></div>\n");
}

// ---- pdf builders ----

fn pdf_doc_start(title: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"en\">\n<head>\n\
         <meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\"/>\n\
         <title>{} \u{2014} Resume</title>\n",
        esc(title)
    )
}

fn pdf_classic(b: &ResumeBundle) -> String {
    let accent = "#7C3AED";
    let mut html = pdf_doc_start(&b.name());
    let _ = write!(
        html,
        "<style>\n\
         body{{margin:30px 44px;font-family:'Helvetica Neue',Arial,sans-serif;font-size:10.5pt;color:#111827;line-height:1.5}}\
         .hdr{{text-align:center;padding-bottom:14px;border-bottom:2.5px solid {accent};margin-bottom:18px}}\
         .hdr-name{{font-size:24pt;font-weight:bold;color:#111827;letter-spacing:-0.5px;line-height:1.15}}\
         .hdr-title{{font-size:11pt;color:{accent};margin-top:4px;font-weight:600}}\
         .hdr-contacts{{font-size:8.5pt;color:#6B7280;margin-top:6px}}\
         .hdr-sep{{color:#E5E7EB}}\
         {body_css}\
         .sk-tbl{{margin-bottom:6px}}\
         .sk-lvl{{width:92pt;font-size:8.5pt;font-weight:bold;color:#6B7280;text-transform:uppercase;letter-spacing:0.8px;padding:3px 0;vertical-align:top}}\
         .sk-val{{font-size:10pt;color:#374151;padding:3px 0;vertical-align:top}}\
         \n</style>\n</head>\n<body>\n",
        body_css = pdf_body_css(accent, "#E5E7EB", "")
    );

    html.push_str("<div class=\"hdr\">\n");
    let _ = writeln!(html, "<div class=\"hdr-name\">{}</div>", esc(&b.name()));
    if let Some(jt) = b.job_title() {
        let _ = writeln!(html, "<div class=\"hdr-title\">{}</div>", esc(&jt));
    }
    push_pdf_contact_line(&mut html, b, "  <span class=\"hdr-sep\">|</span>  ");
    html.push_str("</div>\n");

    push_pdf_body(&mut html, b, true);
    html.push_str("</body>\n</html>");
    html
}

fn pdf_modern(b: &ResumeBundle) -> String {
    let accent = "#2563EB";
    let mut html = pdf_doc_start(&b.name());
    let _ = write!(
        html,
        "<style>\n\
         body{{margin:0;font-family:'Helvetica Neue',Arial,sans-serif;font-size:10.5pt;color:#1E293B;line-height:1.5}}\
         .hdr-bar{{background-color:{accent};height:4px;margin:0}}\
         .hdr{{padding:22px 44px 16px;margin-bottom:4px}}\
         .hdr-inner td{{vertical-align:middle}}\
         .avatar{{width:50pt;height:50pt;background-color:{accent};color:#FFFFFF;font-size:18pt;font-weight:bold;text-align:center;line-height:50pt}}\
         .hdr-name{{font-size:22pt;font-weight:bold;color:#1E293B;letter-spacing:-0.3px}}\
         .hdr-title{{font-size:10.5pt;color:{accent};font-weight:600;margin-top:2px}}\
         .hdr-contacts{{font-size:8.5pt;color:#64748B;margin-top:6px}}\
         .c-pill{{background-color:#F1F5F9;padding:2px 6px;font-size:8pt;color:#64748B}}\
         .content{{padding:0 44px 28px}}\
         {body_css}\
         .chip{{display:inline;font-size:9pt;font-weight:600;padding:3px 8px;margin-right:4px;border:1px solid #E2E8F0;background-color:#F8FAFC;color:#475569}}\
         \n</style>\n</head>\n<body>\n",
        body_css = pdf_body_css(accent, "#E2E8F0", "")
    );

    html.push_str("<div class=\"hdr-bar\"> </div>\n<div class=\"hdr\">\n");
    html.push_str(
        "<table class=\"hdr-inner\" width=\"100%\" cellspacing=\"0\" cellpadding=\"0\" border=\"0\"><tr>\n",
    );
    let _ = writeln!(
        html,
        "<td style=\"width:60pt;vertical-align:middle\"><div class=\"avatar\">{}</div></td>",
        esc(&initials(&b.name()))
    );
    html.push_str("<td style=\"padding-left:12px\">\n");
    let _ = writeln!(html, "<div class=\"hdr-name\">{}</div>", esc(&b.name()));
    if let Some(jt) = b.job_title() {
        let _ = writeln!(html, "<div class=\"hdr-title\">{}</div>", esc(&jt));
    }
    html.push_str("</td>\n</tr></table>\n");
    let contacts = b.contact_lines();
    if !contacts.is_empty() {
        html.push_str("<div class=\"hdr-contacts\" style=\"margin-top:10px\">");
        for line in contacts {
            let _ = write!(html, "<span class=\"c-pill\">{}</span>  ", esc(&line));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n<div class=\"content\">\n");
    push_pdf_body(&mut html, b, false);
    html.push_str("</div>\n</body>\n</html>");
    html
}

fn pdf_minimal(b: &ResumeBundle) -> String {
    let accent = "#0D9488";
    let mut html = pdf_doc_start(&b.name());
    let _ = write!(
        html,
        "<style>\n\
         body{{margin:40px 50px;font-family:Georgia,'Times New Roman',serif;font-size:10.5pt;color:#111827;line-height:1.6}}\
         .hdr{{margin-bottom:6px}}\
         .hdr-name{{font-size:26pt;font-weight:normal;color:#111827;letter-spacing:-0.3px;line-height:1.15}}\
         .hdr-title{{font-size:11pt;color:{accent};font-weight:normal;margin-top:3px;font-style:italic}}\
         .hdr-contacts{{font-size:8.5pt;color:#6B7280;margin-top:8px}}\
         .hr{{border:none;border-top:0.5px solid #E5E7EB;margin:14px 0}}\
         .sk-text{{font-size:10pt;color:#374151;line-height:1.8}}\
         {body_css}\
         \n</style>\n</head>\n<body>\n",
        body_css = pdf_body_css(accent, "#E5E7EB", "font-style:italic;")
    );

    html.push_str("<div class=\"hdr\">\n");
    let _ = writeln!(html, "<div class=\"hdr-name\">{}</div>", esc(&b.name()));
    if let Some(jt) = b.job_title() {
        let _ = writeln!(html, "<div class=\"hdr-title\">{}</div>", esc(&jt));
    }
    push_pdf_contact_line(&mut html, b, "  \u{b7}  ");
    html.push_str("</div>\n<hr class=\"hr\"/>\n");

    if let Some(summary) = b.summary() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">Summary</div></div>\n");
        let _ = writeln!(html, "<p class=\"sum\">{}</p>", esc(&summary));
    }
    if !b.skills.is_empty() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">Skills</div></div>\n");
        let names: Vec<String> = b.skills.iter().map(|s| esc(&s.name)).collect();
        let _ = writeln!(html, "<p class=\"sk-text\">{}</p>", names.join("  \u{b7}  "));
    }
    if !b.experiences.is_empty() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">Experience</div></div>\n");
        push_pdf_experience(&mut html, &b.experiences);
    }
    if !b.projects.is_empty() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">Projects</div></div>\n");
        push_pdf_projects(&mut html, &b.projects);
    }
    if !b.education.is_empty() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">Education</div></div>\n");
        push_pdf_education(&mut html, &b.education);
    }
    html.push_str("</body>\n</html>");
    html
}

fn pdf_bold(b: &ResumeBundle) -> String {
    let accent = "#DC2626";
    let mut html = pdf_doc_start(&b.name());
    let _ = write!(
        html,
        "<style>\n\
         body{{margin:0;font-family:'Helvetica Neue',Arial,sans-serif;font-size:10.5pt;color:#111827;line-height:1.5}}\
         .hdr{{background-color:#1E1E2E;padding:28px 44px 22px;margin-bottom:4px}}\
         .hdr-name{{font-size:26pt;font-weight:bold;color:#FFFFFF;letter-spacing:-0.5px;line-height:1.15}}\
         .hdr-title{{font-size:11pt;color:{accent};margin-top:4px;font-weight:600}}\
         .hdr-contacts{{font-size:8.5pt;color:rgba(255,255,255,0.65);margin-top:8px}}\
         .hdr-sep{{color:rgba(255,255,255,0.25)}}\
         .content{{padding:4px 44px 28px}}\
         .tag{{display:inline;font-size:9pt;font-weight:bold;padding:3px 8px;margin-right:4px;background-color:#FEF2F2;color:{accent};border:1px solid #FECACA}}\
         {body_css}\
         .blk{{margin-bottom:12px;page-break-inside:avoid;padding-left:10px;border-left:3px solid {accent}}}\
         \n</style>\n</head>\n<body>\n",
        body_css = pdf_body_css(accent, accent, "")
    );

    html.push_str("<div class=\"hdr\">\n");
    let _ = writeln!(html, "<div class=\"hdr-name\">{}</div>", esc(&b.name()));
    if let Some(jt) = b.job_title() {
        let _ = writeln!(html, "<div class=\"hdr-title\">{}</div>", esc(&jt));
    }
    push_pdf_contact_line(&mut html, b, "  <span class=\"hdr-sep\">|</span>  ");
    html.push_str("</div>\n<div class=\"content\">\n");

    if let Some(summary) = b.summary() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">PROFILE</div></div>\n");
        let _ = writeln!(html, "<p class=\"sum\">{}</p>", esc(&summary));
    }
    if !b.skills.is_empty() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">SKILLS</div></div>\n<p>");
        for skill in &b.skills {
            let _ = write!(html, "<span class=\"tag\">{}</span> ", esc(&skill.name));
        }
        html.push_str("</p>\n");
    }
    if !b.experiences.is_empty() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">EXPERIENCE</div></div>\n");
        push_pdf_experience(&mut html, &b.experiences);
    }
    if !b.projects.is_empty() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">PROJECTS</div></div>\n");
        push_pdf_projects(&mut html, &b.projects);
    }
    if !b.education.is_empty() {
        html.push_str("<div class=\"sec\"><div class=\"sec-t\">EDUCATION</div></div>\n");
        push_pdf_education(&mut html, &b.education);
    }
    html.push_str("</div>\n</body>\n</html>");
    html
}

// ---- shared pdf fragments ----

/// Section, block, and typography rules common to all four PDF styles.
fn pdf_body_css(accent: &str, divider: &str, co_extra: &str) -> String {
    format!(
        ".sec{{border-bottom:1px solid {divider};margin:16px 0 10px;padding-bottom:4px}}\
         .sec-t{{font-size:8pt;font-weight:bold;letter-spacing:2px;text-transform:uppercase;color:{accent}}}\
         .sum{{font-size:10.5pt;color:#374151;line-height:1.7;margin-bottom:6px}}\
         .blk{{margin-bottom:12px;page-break-inside:avoid}}\
         .role{{font-size:10.5pt;font-weight:bold;color:#111827}}\
         .co{{font-weight:normal;color:{accent};{co_extra}}}\
         .dt{{font-size:8.5pt;color:#6B7280;text-align:right;white-space:nowrap;vertical-align:middle}}\
         .desc{{font-size:9.5pt;color:#374151;margin:3px 0 0;line-height:1.6}}\
         .pj-lang{{font-size:9pt;color:#6B7280;font-weight:normal}}\
         .edu-inst{{font-size:9.5pt;color:{accent};margin-top:2px}}"
    )
}

fn push_pdf_contact_line(html: &mut String, b: &ResumeBundle, separator: &str) {
    let contacts = b.contact_lines();
    if contacts.is_empty() {
        return;
    }
    let escaped: Vec<String> = contacts.iter().map(|c| esc(c)).collect();
    let _ = writeln!(html, "<div class=\"hdr-contacts\">{}</div>", escaped.join(separator));
}

fn push_pdf_body(html: &mut String, b: &ResumeBundle, classic: bool) {
    if let Some(summary) = b.summary() {
        let title = if classic { "PROFESSIONAL SUMMARY" } else { "About Me" };
        let _ = writeln!(html, "<div class=\"sec\"><div class=\"sec-t\">{title}</div></div>");
        let _ = writeln!(html, "<p class=\"sum\">{}</p>", esc(&summary));
    }

    if !b.skills.is_empty() {
        let title = if classic { "TECHNICAL SKILLS" } else { "Skills" };
        let _ = writeln!(html, "<div class=\"sec\"><div class=\"sec-t\">{title}</div></div>");
        if classic {
            html.push_str(
                "<table class=\"sk-tbl\" width=\"100%\" cellspacing=\"0\" cellpadding=\"0\" border=\"0\">\n",
            );
            for (tier, group) in group_skills(&b.skills) {
                let names: Vec<String> = group.iter().map(|s| esc(&s.name)).collect();
                let _ = writeln!(
                    html,
                    "<tr><td class=\"sk-lvl\">{}</td><td class=\"sk-val\">{}</td></tr>",
                    tier.label(),
                    names.join("  \u{b7}  ")
                );
            }
            html.push_str("</table>\n");
        } else {
            html.push_str("<p>");
            for skill in &b.skills {
                let _ = write!(html, "<span class=\"chip\">{}</span> ", esc(&skill.name));
            }
            html.push_str("</p>\n");
        }
    }

    if !b.experiences.is_empty() {
        let title = if classic { "WORK EXPERIENCE" } else { "Experience" };
        let _ = writeln!(html, "<div class=\"sec\"><div class=\"sec-t\">{title}</div></div>");
        push_pdf_experience(html, &b.experiences);
    }
    if !b.projects.is_empty() {
        let title = if classic { "NOTABLE PROJECTS" } else { "Projects" };
        let _ = writeln!(html, "<div class=\"sec\"><div class=\"sec-t\">{title}</div></div>");
        push_pdf_projects(html, &b.projects);
    }
    if !b.education.is_empty() {
        let title = if classic { "EDUCATION" } else { "Education" };
        let _ = writeln!(html, "<div class=\"sec\"><div class=\"sec-t\">{title}</div></div>");
        push_pdf_education(html, &b.education);
    }
}

fn push_pdf_experience(html: &mut String, experiences: &[ExperienceRow]) {
    for exp in experiences {
        html.push_str("<div class=\"blk\">\n");
        html.push_str("<table width=\"100%\" cellspacing=\"0\" cellpadding=\"0\" border=\"0\"><tr>\n");
        let _ = writeln!(
            html,
            "<td class=\"role\"><span>{}</span>  \u{2014}  <span class=\"co\">{}</span></td>",
            esc(&exp.title),
            esc(&exp.company)
        );
        let _ = writeln!(html, "<td class=\"dt\">{}</td>", esc(&format_dates(exp)));
        html.push_str("</tr></table>\n");
        if let Some(desc) = exp.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(html, "<p class=\"desc\">{}</p>", esc(desc));
        }
        html.push_str("</div>\n");
    }
}

fn push_pdf_projects(html: &mut String, projects: &[ProjectRow]) {
    for project in projects.iter().take(PROJECT_CAP) {
        html.push_str("<div class=\"blk\">\n");
        html.push_str("<table width=\"100%\" cellspacing=\"0\" cellpadding=\"0\" border=\"0\"><tr>\n");
        let mut role = esc(&project.name);
        if !project.languages.0.is_empty() {
            let _ = write!(
                role,
                "  <span class=\"pj-lang\">{}</span>",
                esc(&project.languages.0.join(", "))
            );
        }
        let _ = writeln!(html, "<td class=\"role\">{role}</td>");
        if project.stars > 0 {
            let _ = writeln!(html, "<td class=\"dt\">{} \u{2605}</td>", project.stars);
        } else {
            html.push_str("<td class=\"dt\"></td>\n");
        }
        html.push_str("</tr></table>\n");
        if let Some(desc) = project.description.as_deref().filter(|d| !d.trim().is_empty()) {
            let _ = writeln!(html, "<p class=\"desc\">{}</p>", esc(desc));
        }
        html.push_str("</div>\n");
    }
}

fn push_pdf_education(html: &mut String, education: &[EducationRow]) {
    for edu in education {
        html.push_str("<div class=\"blk\">\n");
        html.push_str("<table width=\"100%\" cellspacing=\"0\" cellpadding=\"0\" border=\"0\"><tr>\n");
        let deg = degree_line(edu);
        let headline = deg.clone().unwrap_or_else(|| edu.institution.clone());
        let _ = writeln!(html, "<td class=\"role\">{}</td>", esc(&headline));
        let _ = writeln!(html, "<td class=\"dt\">{}</td>", esc(&format_edu_years(edu)));
        html.push_str("</tr></table>\n");
        if deg.is_some() {
            let _ = writeln!(html, "<div class=\"edu-inst\">{}</div>", esc(&edu.institution));
        }
        html.push_str("</div>\n");
    }
}

// ---- preview css ----

fn base_css() -> &'static str {
    "*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}\
     body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;font-size:15px;line-height:1.6}"
}

fn sec_css(accent: &str) -> String {
    format!(
        ".section{{margin-bottom:22px}}\
         .sec-title{{font-size:11px;font-weight:800;letter-spacing:2px;text-transform:uppercase;color:{accent};margin:0 0 14px;padding-bottom:6px;border-bottom:1px solid #E5E7EB}}"
    )
}

fn exp_css(accent: &str) -> String {
    format!(
        ".exp-list{{display:flex;flex-direction:column;gap:18px}}\
         .exp-item{{padding-left:14px;border-left:2px solid {accent}40}}\
         .exp-top{{display:flex;justify-content:space-between;align-items:flex-start;margin-bottom:4px}}\
         .exp-left{{flex:1}}\
         .exp-role{{font-size:15px;font-weight:700;color:#111827}}\
         .exp-company{{font-size:13px;color:{accent};font-weight:500}}\
         .exp-dates{{font-size:12px;color:#9CA3AF;white-space:nowrap;margin-left:12px}}\
         .exp-desc{{font-size:13px;color:#4B5563;line-height:1.7}}"
    )
}

fn proj_css(accent: &str, bg: &str) -> String {
    format!(
        ".proj-list{{display:flex;flex-direction:column;gap:12px}}\
         .proj-item{{background:{bg};border:1px solid #E5E7EB;border-radius:10px;padding:14px 16px}}\
         .proj-top{{display:flex;justify-content:space-between;align-items:center;margin-bottom:6px}}\
         .proj-name{{font-size:15px;font-weight:700;color:#111827}}\
         .proj-stars{{font-size:12px;color:#9CA3AF}}\
         .proj-langs{{display:flex;flex-wrap:wrap;gap:5px;margin-bottom:6px}}\
         .lang-pill{{font-size:11px;font-weight:600;padding:2px 8px;border-radius:20px;background:{accent}15;color:{accent};border:1px solid {accent}30}}\
         .proj-desc{{font-size:13px;color:#4B5563;line-height:1.6}}"
    )
}

fn edu_css(accent: &str) -> String {
    format!(
        ".edu-list{{display:flex;flex-direction:column;gap:10px}}\
         .edu-item{{padding:12px 14px;border-radius:8px;border:1px solid #E5E7EB}}\
         .edu-degree{{font-size:15px;font-weight:700;color:#111827}}\
         .edu-inst{{font-size:13px;color:{accent}}}\
         .edu-dates{{font-size:12px;color:#9CA3AF;margin-top:2px}}"
    )
}

fn classic_preview_css() -> String {
    format!(
        "{base}\
         body{{background:#FFFFFF;color:#111827}}\
         .page{{max-width:720px;margin:0 auto;padding:32px 28px}}\
         .header{{text-align:center;padding-bottom:20px;border-bottom:2px solid #7C3AED;margin-bottom:24px}}\
         .name{{font-size:32px;font-weight:800;color:#111827;letter-spacing:-0.5px;margin:0 0 4px}}\
         .job-title{{font-size:16px;color:#7C3AED;font-weight:600;margin-bottom:10px}}\
         .contacts{{display:flex;justify-content:center;flex-wrap:wrap;gap:14px}}\
         .contact{{font-size:12px;color:#6B7280}}\
         {sec}\
         .summary{{font-size:14px;color:#374151;line-height:1.8}}\
         .skills-grid{{display:flex;flex-direction:column;gap:8px}}\
         .skill-row{{display:flex;gap:14px}}\
         .skill-level{{width:95px;font-size:11px;font-weight:700;text-transform:uppercase;letter-spacing:.5px;color:#9CA3AF;padding-top:2px;flex-shrink:0}}\
         .skill-names{{font-size:14px;color:#374151}}\
         {exp}{proj}{edu}",
        base = base_css(),
        sec = sec_css("#7C3AED"),
        exp = exp_css("#7C3AED"),
        proj = proj_css("#7C3AED", "#F5F3FF"),
        edu = edu_css("#7C3AED"),
    )
}

fn modern_preview_css() -> String {
    format!(
        "{base}\
         body{{background:#F8FAFC;color:#1E293B}}\
         .page{{max-width:720px;margin:0 auto;padding:0 28px 40px}}\
         .header-modern{{background:#FFFFFF;border-radius:0 0 20px 20px;padding:28px;margin-bottom:24px;box-shadow:0 2px 12px rgba(0,0,0,0.05)}}\
         .header-bar{{height:4px;background:linear-gradient(90deg,#2563EB,#7C3AED);border-radius:2px;margin-bottom:20px}}\
         .header-content{{display:flex;align-items:center;gap:16px;margin-bottom:14px}}\
         .avatar-circle{{width:56px;height:56px;border-radius:50%;background:linear-gradient(135deg,#2563EB,#7C3AED);display:flex;align-items:center;justify-content:center;color:#fff;font-size:20px;font-weight:800;flex-shrink:0}}\
         .header-text{{flex:1}}\
         .name{{font-size:28px;font-weight:800;color:#1E293B;letter-spacing:-0.3px;margin:0 0 2px}}\
         .job-title{{font-size:15px;color:#2563EB;font-weight:600}}\
         .contacts{{display:flex;flex-wrap:wrap;gap:12px}}\
         .contact{{font-size:12px;color:#64748B;background:#F1F5F9;padding:3px 10px;border-radius:20px}}\
         {sec}\
         .summary{{font-size:14px;color:#475569;line-height:1.8}}\
         .skill-chips{{display:flex;flex-wrap:wrap;gap:8px}}\
         .chip{{font-size:13px;font-weight:600;padding:6px 14px;border-radius:20px;border:1px solid}}\
         .chip-expert{{background:rgba(245,158,11,0.1);color:#D97706;border-color:rgba(245,158,11,0.3)}}\
         .chip-advanced{{background:rgba(139,92,246,0.1);color:#7C3AED;border-color:rgba(139,92,246,0.3)}}\
         .chip-intermediate{{background:rgba(16,185,129,0.1);color:#059669;border-color:rgba(16,185,129,0.3)}}\
         .chip-beginner{{background:rgba(59,130,246,0.1);color:#2563EB;border-color:rgba(59,130,246,0.3)}}\
         {exp}{proj}{edu}",
        base = base_css(),
        sec = sec_css("#2563EB"),
        exp = exp_css("#2563EB"),
        proj = proj_css("#2563EB", "#EFF6FF"),
        edu = edu_css("#2563EB"),
    )
}

fn minimal_preview_css() -> String {
    format!(
        "{base}\
         body{{background:#FFFFFF;color:#111827}}\
         .page{{max-width:680px;margin:0 auto;padding:40px 28px}}\
         .header-minimal{{padding-bottom:16px}}\
         .name{{font-size:30px;font-weight:700;color:#111827;letter-spacing:-0.3px;margin:0 0 4px}}\
         .job-title{{font-size:15px;color:#0D9488;font-weight:500;margin-bottom:10px}}\
         .contacts{{display:flex;flex-wrap:wrap;gap:10px}}\
         .contact{{font-size:12px;color:#6B7280}}\
         .divider{{border:none;border-top:1px solid #E5E7EB;margin:0 0 24px}}\
         .section{{margin-bottom:20px}}\
         .sec-title{{font-size:12px;font-weight:700;letter-spacing:1.5px;color:#0D9488;text-transform:uppercase;margin:0 0 12px;border-bottom:none}}\
         .summary{{font-size:14px;color:#374151;line-height:1.8}}\
         .skill-list{{font-size:14px;color:#374151;line-height:2}}\
         {exp}{proj}{edu}",
        base = base_css(),
        exp = exp_css("#0D9488"),
        proj = proj_css("#0D9488", "#F0FDFA"),
        edu = edu_css("#0D9488"),
    )
}

fn bold_preview_css() -> String {
    format!(
        "{base}\
         body{{background:#FAFAFA;color:#111827}}\
         .page{{max-width:720px;margin:0 auto;padding:0 28px 40px}}\
         .header-bold{{position:relative;overflow:hidden;border-radius:0 0 20px 20px;margin-bottom:24px}}\
         .header-bg{{position:absolute;top:0;left:0;right:0;bottom:0;background:linear-gradient(135deg,#1E1E2E 0%,#2D1B3D 100%)}}\
         .header-fg{{position:relative;padding:32px 28px 24px;z-index:1}}\
         .name{{font-size:32px;font-weight:900;color:#FFFFFF;letter-spacing:-0.5px;margin:0 0 4px}}\
         .job-title{{font-size:16px;color:#F87171;font-weight:600;margin-bottom:12px}}\
         .contacts{{display:flex;flex-wrap:wrap;gap:12px}}\
         .contact{{font-size:12px;color:rgba(255,255,255,0.7)}}\
         {sec}\
         .summary{{font-size:14px;color:#374151;line-height:1.8}}\
         .skill-tags{{display:flex;flex-wrap:wrap;gap:8px}}\
         .tag{{font-size:13px;font-weight:600;padding:6px 14px;border-radius:8px;background:#FEF2F2;color:#DC2626;border:1px solid #FECACA}}\
         {exp}{proj}{edu}",
        base = base_css(),
        sec = sec_css("#DC2626"),
        exp = exp_css("#DC2626"),
        proj = proj_css("#DC2626", "#FEF2F2"),
        edu = edu_css("#DC2626"),
    )
}

// ---- date helpers ----

fn format_dates(exp: &ExperienceRow) -> String {
    let start = exp.start_date.map(|d| d.format("%b %Y").to_string()).unwrap_or_default();
    let end = if exp.is_current {
        "Present".to_string()
    } else {
        exp.end_date.map(|d| d.format("%b %Y").to_string()).unwrap_or_default()
    };
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => start,
        _ => format!("{start} \u{2013} {end}"),
    }
}

fn format_edu_years(edu: &EducationRow) -> String {
    let start = edu.start_year.map(|y| y.to_string()).unwrap_or_default();
    let end = edu.end_year.map(|y| y.to_string()).unwrap_or_default();
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => start,
        _ => format!("{start} \u{2013} {end}"),
    }
}

fn degree_line(edu: &EducationRow) -> Option<String> {
    let degree = edu.degree.as_deref().filter(|d| !d.trim().is_empty());
    let field = edu.field.as_deref().filter(|f| !f.trim().is_empty());
    match (degree, field) {
        (Some(d), Some(f)) => Some(format!("{d} in {f}")),
        (Some(d), None) => Some(d.to_string()),
        (None, Some(f)) => Some(f.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::models::resume::ResumeRow;
    use crate::models::user::UserRow;

    fn bundle() -> ResumeBundle {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let portfolio_id = Uuid::new_v4();
        ResumeBundle {
            resume: ResumeRow {
                id: Uuid::new_v4(),
                user_id,
                portfolio_id,
                title: "My Resume".to_string(),
                template_key: "classic".to_string(),
                full_name: Some("Alice Dev".to_string()),
                job_title: Some("Backend Engineer".to_string()),
                email: None,
                phone: Some("+1 555 0100".to_string()),
                location: Some("Berlin".to_string()),
                website: None,
                linkedin_url: None,
                github_url: None,
                summary: Some("Writes <fast> services.".to_string()),
                selected_project_ids: Json(vec![]),
                selected_skill_ids: Json(vec![]),
                selected_experience_ids: Json(vec![]),
                selected_education_ids: Json(vec![]),
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
            projects: vec![],
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
                description: None,
                start_date: NaiveDate::from_ymd_opt(2021, 6, 1),
                end_date: None,
                is_current: true,
                display_order: 0,
            }],
            education: vec![],
        }
    }

    #[test]
    fn test_classic_preview_sections_and_escaping() {
        let html = generate(&bundle(), "classic");
        assert!(html.contains("PROFESSIONAL SUMMARY"));
        assert!(html.contains("TECHNICAL SKILLS"));
        assert!(html.contains("Writes &lt;fast&gt; services."));
        assert!(html.contains("Backend Engineer"));
        assert!(html.contains("github.com/alice-dev"));
    }

    #[test]
    fn test_unknown_template_falls_back_to_classic() {
        let html = generate(&bundle(), "no-such-template");
        assert!(html.contains("PROFESSIONAL SUMMARY"));
    }

    #[test]
    fn test_pdf_builds_are_xhtml() {
        for key in ["classic", "modern", "minimal", "bold"] {
            let html = generate_for_pdf(&bundle(), key);
            assert!(html.starts_with("<?xml version=\"1.0\""), "{key}");
            assert!(html.contains("XHTML 1.0 Strict"), "{key}");
        }
    }

    #[test]
    fn test_modern_preview_has_initials_avatar_and_chips() {
        let html = generate(&bundle(), "modern");
        assert!(html.contains(">AD</div>"));
        assert!(html.contains("chip-expert"));
        assert!(html.contains("About Me"));
    }

    #[test]
    fn test_bold_pdf_uses_dark_header() {
        let html = generate_for_pdf(&bundle(), "bold");
        assert!(html.contains("#1E1E2E"));
        assert!(html.contains("PROFILE"));
    }

    #[test]
    fn test_experience_dates_with_present() {
        let html = generate(&bundle(), "minimal");
        assert!(html.contains("Jun 2021 \u{2013} Present"));
    }

    #[test]
    fn test_catalog_has_four_templates() {
        let keys: Vec<&str> = catalog().iter().map(|t| t.key).collect();
        assert_eq!(keys, vec!["classic", "modern", "minimal", "bold"]);
    }
}
