//! The `Cv` schema: the canonical document every normalization call returns.
//!
//! Field order on each struct is the serialization order, so the struct
//! definitions double as the ordered schema template. `Cv::default()` is the
//! fully defaulted template.

use serde::{Deserialize, Serialize};

/// Sentinel emitted for ongoing date ranges.
pub const PRESENT: &str = "Present";

/// Type tag of a top-level schema field.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Location,
    TextList,
    Records,
    Integer,
}

/// Ordered top-level keys of the schema template with their type tags.
#[cfg(test)]
pub const SCHEMA: &[(&str, FieldKind)] = &[
    ("avatarUrl", FieldKind::Text),
    ("fullname", FieldKind::Text),
    ("preferredName", FieldKind::Text),
    ("email", FieldKind::Text),
    ("phone", FieldKind::Text),
    ("location", FieldKind::Location),
    ("headline", FieldKind::Text),
    ("summary", FieldKind::Text),
    ("targetRole", FieldKind::Text),
    ("employmentType", FieldKind::TextList),
    ("salaryExpectation", FieldKind::Text),
    ("availability", FieldKind::Text),
    ("skills", FieldKind::Records),
    ("experiences", FieldKind::Records),
    ("education", FieldKind::Records),
    ("projects", FieldKind::Records),
    ("certifications", FieldKind::Records),
    ("languages", FieldKind::Records),
    ("portfolio", FieldKind::Records),
    ("references", FieldKind::Records),
    ("status", FieldKind::Text),
    ("tags", FieldKind::TextList),
    ("version", FieldKind::Integer),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv {
    pub avatar_url: String,
    pub fullname: String,
    pub preferred_name: String,
    pub email: String,
    pub phone: String,
    pub location: Location,
    pub headline: String,
    pub summary: String,
    pub target_role: String,
    pub employment_type: Vec<String>,
    pub salary_expectation: String,
    pub availability: String,
    pub skills: Vec<Skill>,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub languages: Vec<Language>,
    pub portfolio: Vec<Portfolio>,
    pub references: Vec<Reference>,
    pub status: String,
    pub tags: Vec<String>,
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: String,
    pub category: String,
    pub years: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    pub company_website: String,
    pub location: String,
    pub from: String,
    pub to: String,
    pub is_current: bool,
    pub employment_type: String,
    pub team_size: i64,
    pub responsibilities: Vec<String>,
    pub achievements: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub major: String,
    pub school: String,
    pub from: String,
    pub to: String,
    pub gpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub description: String,
    pub role: String,
    pub from: String,
    pub to: String,
    pub tech_stack: Vec<String>,
    pub url: String,
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub issue_date: String,
    pub expiry_date: String,
    pub credential_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub media_type: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub relation: String,
    pub contact: String,
    pub note: String,
}
