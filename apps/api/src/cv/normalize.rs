//! Document normalizer: coerces any producer output into a canonical [`Cv`].
//!
//! This is the only thing standing between an untrusted LLM answer and the
//! caller, so it is total: whatever `raw` looks like, a complete `Cv` comes
//! back. Unknown keys are dropped and missing keys take schema defaults.

use serde_json::{Map, Value};

use crate::cv::coerce::{int_or_default, string_list, string_or_default};
use crate::cv::schema::{Cv, Location};
use crate::cv::sections::{
    normalize_certifications, normalize_education, normalize_experiences, normalize_languages,
    normalize_portfolio, normalize_projects, normalize_references, normalize_skills,
};

pub fn normalize(raw: &Value) -> Cv {
    let Some(data) = raw.as_object() else {
        return Cv::default();
    };
    let text = |key: &str| string_or_default(data.get(key));

    Cv {
        avatar_url: text("avatarUrl"),
        fullname: text("fullname"),
        preferred_name: text("preferredName"),
        email: text("email"),
        phone: text("phone"),
        location: normalize_location(data.get("location")),
        headline: text("headline"),
        summary: text("summary"),
        target_role: text("targetRole"),
        employment_type: string_list(data.get("employmentType"), ','),
        salary_expectation: text("salaryExpectation"),
        availability: text("availability"),
        skills: normalize_skills(data.get("skills")),
        experiences: normalize_experiences(data.get("experiences")),
        education: normalize_education(data.get("education")),
        projects: normalize_projects(data.get("projects")),
        certifications: normalize_certifications(data.get("certifications")),
        languages: normalize_languages(data.get("languages")),
        portfolio: normalize_portfolio(data.get("portfolio")),
        references: normalize_references(data.get("references")),
        status: text("status"),
        tags: string_list(data.get("tags"), ','),
        version: int_or_default(data.get("version")),
    }
}

fn normalize_location(raw: Option<&Value>) -> Location {
    let empty = Map::new();
    let loc = raw.and_then(Value::as_object).unwrap_or(&empty);
    Location {
        city: string_or_default(loc.get("city")),
        state: string_or_default(loc.get("state")),
        country: string_or_default(loc.get("country")),
    }
}
