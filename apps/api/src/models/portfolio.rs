use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub theme_key: String,
    pub is_published: bool,
    pub ai_enhanced_summary: Option<String>,
    pub ai_enhanced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The closed set of section types a portfolio can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionType {
    About,
    Projects,
    Skills,
    Experience,
    Education,
    Contact,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::About => "ABOUT",
            SectionType::Projects => "PROJECTS",
            SectionType::Skills => "SKILLS",
            SectionType::Experience => "EXPERIENCE",
            SectionType::Education => "EDUCATION",
            SectionType::Contact => "CONTACT",
        }
    }

    /// Default sections created for every portfolio, in display order.
    pub fn defaults() -> [(SectionType, &'static str); 6] {
        [
            (SectionType::About, "About"),
            (SectionType::Projects, "Projects"),
            (SectionType::Skills, "Skills"),
            (SectionType::Experience, "Experience"),
            (SectionType::Education, "Education"),
            (SectionType::Contact, "Contact"),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SectionRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub section_type: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub enabled: bool,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub github_repo_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub ai_enhanced_description: Option<String>,
    pub ai_enhanced_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
    pub languages: Json<Vec<String>>,
    pub stars: i32,
    pub forks: i32,
    pub is_highlighted: bool,
    pub display_order: i32,
}

/// Proficiency tiers ordered strongest first, the order skills are
/// grouped in on a rendered resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proficiency {
    Expert,
    Advanced,
    Intermediate,
    Beginner,
}

impl Proficiency {
    pub const ALL: [Proficiency; 4] = [
        Proficiency::Expert,
        Proficiency::Advanced,
        Proficiency::Intermediate,
        Proficiency::Beginner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Proficiency::Expert => "EXPERT",
            Proficiency::Advanced => "ADVANCED",
            Proficiency::Intermediate => "INTERMEDIATE",
            Proficiency::Beginner => "BEGINNER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Proficiency::Expert => "Expert",
            Proficiency::Advanced => "Advanced",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Beginner => "Beginner",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub name: String,
    pub category: String,
    pub proficiency: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub company: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub institution: String,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CertificationRow {
    pub id: Uuid,
    pub portfolio_id: Uuid,
    pub name: String,
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub display_order: i32,
}
