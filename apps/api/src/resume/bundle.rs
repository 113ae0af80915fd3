//! Resume bundle: the resume row, its owner, and the selected portfolio
//! items. An empty selection list means "include everything".

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::{EducationRow, ExperienceRow, ProjectRow, SkillRow};
use crate::models::resume::ResumeRow;
use crate::models::user::UserRow;

#[derive(Debug, Clone)]
pub struct ResumeBundle {
    pub resume: ResumeRow,
    pub user: UserRow,
    pub projects: Vec<ProjectRow>,
    pub skills: Vec<SkillRow>,
    pub experiences: Vec<ExperienceRow>,
    pub education: Vec<EducationRow>,
}

impl ResumeBundle {
    /// Header name: resume override, then the account display name.
    pub fn name(&self) -> String {
        non_blank(self.resume.full_name.as_deref())
            .or_else(|| non_blank(self.user.display_name.as_deref()))
            .unwrap_or_else(|| "Developer".to_string())
    }

    pub fn job_title(&self) -> Option<String> {
        non_blank(self.resume.job_title.as_deref())
    }

    pub fn summary(&self) -> Option<String> {
        non_blank(self.resume.summary.as_deref())
    }

    pub fn email(&self) -> Option<String> {
        non_blank(self.resume.email.as_deref())
            .or_else(|| non_blank(Some(self.user.email.as_str())))
    }

    fn github_line(&self) -> Option<String> {
        non_blank(self.resume.github_url.as_deref())
            .map(|url| strip_scheme(&url))
            .or_else(|| {
                non_blank(self.user.github_username.as_deref())
                    .map(|login| format!("github.com/{login}"))
            })
    }

    /// Contact header lines in display order: email, phone, location,
    /// website, GitHub, LinkedIn. Blank fields are skipped.
    pub fn contact_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(email) = self.email() {
            lines.push(email);
        }
        if let Some(phone) = non_blank(self.resume.phone.as_deref()) {
            lines.push(phone);
        }
        if let Some(location) = non_blank(self.resume.location.as_deref()) {
            lines.push(location);
        }
        if let Some(website) = non_blank(self.resume.website.as_deref()) {
            lines.push(strip_scheme(&website));
        }
        if let Some(github) = self.github_line() {
            lines.push(github);
        }
        if let Some(linkedin) = non_blank(self.resume.linkedin_url.as_deref()) {
            lines.push(strip_scheme(&linkedin));
        }
        lines
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn strip_scheme(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

/// Loads the bundle for a resume the caller already owns.
pub async fn load(db: &PgPool, resume: ResumeRow) -> Result<ResumeBundle, AppError> {
    let user: UserRow = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(resume.user_id)
        .fetch_one(db)
        .await?;

    let projects: Vec<ProjectRow> = sqlx::query_as(
        "SELECT * FROM projects WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(resume.portfolio_id)
    .fetch_all(db)
    .await?;
    let skills: Vec<SkillRow> = sqlx::query_as(
        "SELECT * FROM skills WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(resume.portfolio_id)
    .fetch_all(db)
    .await?;
    let experiences: Vec<ExperienceRow> = sqlx::query_as(
        "SELECT * FROM experiences WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(resume.portfolio_id)
    .fetch_all(db)
    .await?;
    let education: Vec<EducationRow> = sqlx::query_as(
        "SELECT * FROM education WHERE portfolio_id = $1 ORDER BY display_order",
    )
    .bind(resume.portfolio_id)
    .fetch_all(db)
    .await?;

    let projects = select_items(projects, &resume.selected_project_ids.0, |p| p.id);
    let skills = select_items(skills, &resume.selected_skill_ids.0, |s| s.id);
    let experiences = select_items(experiences, &resume.selected_experience_ids.0, |e| e.id);
    let education = select_items(education, &resume.selected_education_ids.0, |e| e.id);

    Ok(ResumeBundle { resume, user, projects, skills, experiences, education })
}

fn select_items<T>(items: Vec<T>, selected: &[Uuid], id_of: fn(&T) -> Uuid) -> Vec<T> {
    if selected.is_empty() {
        return items;
    }
    items.into_iter().filter(|item| selected.contains(&id_of(item))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;

    fn row() -> (ResumeRow, UserRow) {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let resume = ResumeRow {
            id: Uuid::new_v4(),
            user_id,
            portfolio_id: Uuid::new_v4(),
            title: "My Resume".to_string(),
            template_key: "classic".to_string(),
            full_name: None,
            job_title: None,
            email: None,
            phone: None,
            location: Some("Pune".to_string()),
            website: Some("https://alice.dev/".to_string()),
            linkedin_url: Some("https://linkedin.com/in/alice".to_string()),
            github_url: None,
            summary: None,
            selected_project_ids: Json(vec![]),
            selected_skill_ids: Json(vec![]),
            selected_experience_ids: Json(vec![]),
            selected_education_ids: Json(vec![]),
            created_at: now,
            updated_at: now,
        };
        let user = UserRow {
            id: user_id,
            email: "alice@example.com".to_string(),
            display_name: Some("Alice Dev".to_string()),
            github_username: Some("alice-dev".to_string()),
            avatar_url: None,
            created_at: now,
        };
        (resume, user)
    }

    fn bundle() -> ResumeBundle {
        let (resume, user) = row();
        ResumeBundle {
            resume,
            user,
            projects: vec![],
            skills: vec![],
            experiences: vec![],
            education: vec![],
        }
    }

    #[test]
    fn test_name_falls_back_to_display_name() {
        let mut b = bundle();
        assert_eq!(b.name(), "Alice Dev");
        b.resume.full_name = Some("A. Developer".to_string());
        assert_eq!(b.name(), "A. Developer");
        b.resume.full_name = Some("   ".to_string());
        b.user.display_name = None;
        assert_eq!(b.name(), "Developer");
    }

    #[test]
    fn test_contact_lines_order_and_scheme_stripping() {
        let b = bundle();
        assert_eq!(
            b.contact_lines(),
            vec![
                "alice@example.com",
                "Pune",
                "alice.dev",
                "github.com/alice-dev",
                "linkedin.com/in/alice"
            ]
        );
    }

    #[test]
    fn test_select_items_empty_selection_keeps_all() {
        let keep = Uuid::new_v4();
        let drop = Uuid::new_v4();
        let all = vec![keep, drop];
        assert_eq!(select_items(all.clone(), &[], |id| *id).len(), 2);
        assert_eq!(select_items(all, &[keep], |id| *id), vec![keep]);
    }
}
