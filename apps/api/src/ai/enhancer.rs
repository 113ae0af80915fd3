//! Wraps the Ollama client with the two resume-writing prompts and cleans
//! up model output before it is persisted or rendered.

use regex::Regex;
use tracing::{debug, info};

use super::{prompts, OllamaClient};

const README_TRUNCATE_CHARS: usize = 2000;

/// Generates a professional summary paragraph. `None` when the model is
/// unavailable or produced nothing usable.
pub async fn enhance_summary(
    ollama: &OllamaClient,
    name: &str,
    raw_readme: &str,
    top_languages: &[String],
) -> Option<String> {
    let user = format!(
        "Developer name: {}\nTop programming languages: {}\nGitHub profile data:\n{}\n\nWrite the professional summary now.",
        name,
        top_languages.join(", "),
        truncate_chars(raw_readme, README_TRUNCATE_CHARS),
    );

    let result = ollama.chat(prompts::SUMMARY_SYSTEM, &user, 350).await?;
    let result = postprocess_summary(&result, name);
    if result.is_empty() {
        return None;
    }
    info!("AI summary: {} chars for {name}", result.len());
    Some(result)
}

/// Generates newline-separated bullet sentences for one project.
pub async fn enhance_project_description(
    ollama: &OllamaClient,
    project_name: &str,
    raw_description: &str,
    languages: &[String],
    stars: i32,
) -> Option<String> {
    let desc = if raw_description.trim().is_empty() {
        "No description provided"
    } else {
        raw_description
    };
    let langs = if languages.is_empty() {
        "unknown".to_string()
    } else {
        languages.join(", ")
    };

    let user = format!(
        "Project name: {project_name}\nProgramming languages: {langs}\nGitHub stars: {stars}\nOriginal description: {desc}\n\nWrite the resume bullet points now.",
    );

    let result = ollama.chat(prompts::PROJECT_SYSTEM, &user, 400).await?;
    let result = postprocess_bullets(&result);
    if result.is_empty() {
        return None;
    }
    debug!(
        "AI project desc: {} lines for {project_name}",
        result.lines().count()
    );
    Some(result)
}

/// Strips a leading "<name> is/has " the model sometimes adds despite the
/// prompt, plus surrounding quotes.
fn postprocess_summary(text: &str, name: &str) -> String {
    let mut result = text.trim().to_string();
    if let Ok(re) = Regex::new(&format!(r"(?i)^{}\s+(is|has)\s+", regex::escape(name))) {
        result = re.replace(&result, "").to_string();
    }
    strip_surrounding_quotes(&result)
}

/// Removes numbering, bullet markers, and markdown emphasis from each line,
/// drops blank lines, and rejoins.
fn postprocess_bullets(text: &str) -> String {
    let numbering = Regex::new(r"^\d+[.)\s]+");
    let markers = Regex::new(r"^[-•*>]+\s*");
    let joined = text
        .lines()
        .map(|line| {
            let mut line = line.to_string();
            if let Ok(re) = &numbering {
                line = re.replace(&line, "").to_string();
            }
            if let Ok(re) = &markers {
                line = re.replace(&line, "").to_string();
            }
            line.replace('*', "").trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    strip_surrounding_quotes(&joined)
}

fn strip_surrounding_quotes(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postprocess_summary_strips_name_prefix() {
        let out = postprocess_summary("Alice is a systems engineer with deep Rust expertise.", "Alice");
        assert_eq!(out, "a systems engineer with deep Rust expertise.");
    }

    #[test]
    fn test_postprocess_summary_name_prefix_case_insensitive() {
        let out = postprocess_summary("alice has shipped several compilers.", "Alice");
        assert_eq!(out, "shipped several compilers.");
    }

    #[test]
    fn test_postprocess_summary_strips_quotes() {
        let out = postprocess_summary("\"Backend engineer focused on storage systems.\"", "Bob");
        assert_eq!(out, "Backend engineer focused on storage systems.");
    }

    #[test]
    fn test_postprocess_bullets_removes_markers_and_numbering() {
        let input = "1. Built a parser in Rust.\n- Deployed it to production.\n• Optimized hot paths.\n\n* Maintained CI.";
        let out = postprocess_bullets(input);
        assert_eq!(
            out,
            "Built a parser in Rust.\nDeployed it to production.\nOptimized hot paths.\nMaintained CI."
        );
    }

    #[test]
    fn test_postprocess_bullets_strips_asterisks() {
        let out = postprocess_bullets("Engineered **fast** ingest pipeline.");
        assert_eq!(out, "Engineered fast ingest pipeline.");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 5), "abcde...");
    }
}
