//! Section normalizers: one per record-array key of the `Cv` schema.
//!
//! Each takes whatever the producer put under the section key and returns a
//! list of conformant records. Non-object elements are skipped, except for
//! `languages`, where a bare string such as `"English - C1"` is accepted.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::cv::coerce::{
    bool_or_default, int_or_default, is_blank, scalar_or_wrap, string_list, string_or_default,
};
use crate::cv::dates::normalize_date;
use crate::cv::schema::{
    Certification, Education, Experience, Language, Portfolio, Project, Reference, Skill,
};

static LANGUAGE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-–—,]").unwrap());

/// Read-only view over one producer record.
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.get(key)
    }

    fn text(&self, key: &str) -> String {
        string_or_default(self.get(key))
    }

    fn int(&self, key: &str) -> i64 {
        int_or_default(self.get(key))
    }

    fn flag(&self, key: &str) -> bool {
        bool_or_default(self.get(key))
    }

    fn date(&self, key: &str) -> String {
        normalize_date(&self.text(key))
    }

    /// Bullet-style list: newline-delimited when given as a string.
    fn lines(&self, key: &str) -> Vec<String> {
        string_list(self.get(key), '\n')
    }

    /// Keyword-style list: comma-delimited when given as a string.
    fn words(&self, key: &str) -> Vec<String> {
        string_list(self.get(key), ',')
    }
}

/// Object elements of a section, bare objects wrapped, everything else dropped.
fn records(raw: Option<&Value>) -> impl Iterator<Item = Fields<'_>> {
    scalar_or_wrap(raw)
        .iter()
        .filter_map(|element| element.as_object().map(Fields))
}

pub fn normalize_skills(raw: Option<&Value>) -> Vec<Skill> {
    records(raw)
        .map(|f| Skill {
            name: f.text("name"),
            level: f.text("level"),
            category: f.text("category"),
            years: f.int("years"),
        })
        .filter(|skill| !skill.name.is_empty())
        .collect()
}

pub fn normalize_experiences(raw: Option<&Value>) -> Vec<Experience> {
    records(raw)
        .map(|f| Experience {
            id: f.text("id"),
            title: f.text("title"),
            company: f.text("company"),
            company_website: f.text("companyWebsite"),
            location: f.text("location"),
            from: f.date("from"),
            to: f.date("to"),
            is_current: f.flag("isCurrent"),
            employment_type: f.text("employmentType"),
            team_size: f.int("teamSize"),
            responsibilities: f.lines("responsibilities"),
            achievements: f.lines("achievements"),
            tags: f.words("tags"),
        })
        .collect()
}

pub fn normalize_education(raw: Option<&Value>) -> Vec<Education> {
    records(raw)
        .map(|f| Education {
            degree: f.text("degree"),
            major: f.text("major"),
            school: f.text("school"),
            from: f.date("from"),
            to: f.date("to"),
            gpa: f.text("gpa"),
        })
        .collect()
}

pub fn normalize_projects(raw: Option<&Value>) -> Vec<Project> {
    records(raw)
        .map(|f| Project {
            name: f.text("name"),
            description: f.text("description"),
            role: f.text("role"),
            from: f.date("from"),
            to: f.date("to"),
            tech_stack: f.words("techStack"),
            url: f.text("url"),
            metrics: f.lines("metrics"),
        })
        .collect()
}

pub fn normalize_certifications(raw: Option<&Value>) -> Vec<Certification> {
    records(raw)
        .map(|f| {
            // older producer output carried the issue year under `year`
            let issued = f
                .get("issueDate")
                .filter(|v| !is_blank(v))
                .or_else(|| f.get("year"));
            Certification {
                name: f.text("name"),
                issuer: f.text("issuer"),
                issue_date: normalize_date(&string_or_default(issued)),
                expiry_date: f.date("expiryDate"),
                credential_url: f.text("credentialUrl"),
            }
        })
        .collect()
}

pub fn normalize_languages(raw: Option<&Value>) -> Vec<Language> {
    scalar_or_wrap(raw)
        .iter()
        .filter_map(|element| match element {
            Value::Object(map) => {
                let f = Fields(map);
                Some(Language {
                    name: f.text("name"),
                    level: f.text("level"),
                })
            }
            Value::String(s) => Some(split_language(s)),
            _ => None,
        })
        .filter(|language| !language.name.is_empty())
        .collect()
}

/// `"English - C1"` → name `English`, level `C1`.
fn split_language(s: &str) -> Language {
    let mut parts = LANGUAGE_SEPARATOR
        .split(s)
        .map(str::trim)
        .filter(|part| !part.is_empty());
    Language {
        name: parts.next().unwrap_or_default().to_string(),
        level: parts.next().unwrap_or_default().to_string(),
    }
}

pub fn normalize_portfolio(raw: Option<&Value>) -> Vec<Portfolio> {
    records(raw)
        .map(|f| Portfolio {
            media_type: f.text("mediaType"),
            url: f.text("url"),
            description: f.text("description"),
        })
        .collect()
}

pub fn normalize_references(raw: Option<&Value>) -> Vec<Reference> {
    records(raw)
        .map(|f| Reference {
            name: f.text("name"),
            relation: f.text("relation"),
            contact: f.text("contact"),
            note: f.text("note"),
        })
        .collect()
}
