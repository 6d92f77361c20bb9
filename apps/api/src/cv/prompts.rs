// CV extraction prompt templates.
// `{resume_text}` is substituted with `str::replace`, so the JSON braces below
// need no escaping.

pub const CV_EXTRACT_SYSTEM: &str = "\
You are a STRICT resume-to-CV-schema extractor. \
You MUST respond with a single valid JSON object only, with no markdown fences and no explanations. \
Extract ONLY information explicitly present in the resume text. Never infer or guess.";

pub const CV_EXTRACT_PROMPT: &str = r#"Extract the resume below into a single JSON object matching the Cv schema exactly (no extra keys, no missing keys).

TYPES AND DEFAULTS:
- string fields: "" when missing
- boolean fields: false when missing
- numeric fields: 0 when missing
- arrays: [] when missing
- date fields: YYYY-MM-DD, YYYY-MM or YYYY if present, otherwise ""

CV SCHEMA (output exactly this structure, in this order):
{
  "avatarUrl": "",
  "fullname": "",
  "preferredName": "",
  "email": "",
  "phone": "",
  "location": {"city": "", "state": "", "country": ""},
  "headline": "",
  "summary": "",
  "targetRole": "",
  "employmentType": [],
  "salaryExpectation": "",
  "availability": "",
  "skills": [
    {"name": "", "level": "", "category": "", "years": 0}
  ],
  "experiences": [
    {
      "id": "",
      "title": "",
      "company": "",
      "companyWebsite": "",
      "location": "",
      "from": "",
      "to": "",
      "isCurrent": false,
      "employmentType": "",
      "teamSize": 0,
      "responsibilities": [],
      "achievements": [],
      "tags": []
    }
  ],
  "education": [
    {"degree": "", "major": "", "school": "", "from": "", "to": "", "gpa": ""}
  ],
  "projects": [
    {"name": "", "description": "", "role": "", "from": "", "to": "", "techStack": [], "url": "", "metrics": []}
  ],
  "certifications": [
    {"name": "", "issuer": "", "issueDate": "", "expiryDate": "", "credentialUrl": ""}
  ],
  "languages": [
    {"name": "", "level": ""}
  ],
  "portfolio": [
    {"mediaType": "", "url": "", "description": ""}
  ],
  "references": [
    {"name": "", "relation": "", "contact": "", "note": ""}
  ],
  "status": "",
  "tags": [],
  "version": 0
}

RULES:
1. Dates: if the resume says "Present" or "Now", set `to` to "Present".
2. Booleans: true/false only if explicitly stated, otherwise false.
3. `years`, `teamSize` and `version` must be numbers (0 when missing).
4. `skills`: skill name in `name`; put an explicit proficiency ("Advanced", "C1") in `level`; `years` only when written as a number.
5. `responsibilities` and `achievements`: one short string per bullet point, no commentary.
6. `companyWebsite`, `email`, `phone`, `avatarUrl`, `credentialUrl`, `url`: only if explicitly present.
7. `tags`: only tags explicitly listed in the resume.
8. Remove duplicates within arrays.
9. Languages: do not translate; keep the level if present (e.g. "English - C1").
10. Omit `createdBy`.

RESUME TEXT:
{resume_text}"#;

/// Renders the extraction prompt for one resume.
pub fn render_extract_prompt(resume_text: &str) -> String {
    CV_EXTRACT_PROMPT.replace("{resume_text}", resume_text)
}
