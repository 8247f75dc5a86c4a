use serde::{Deserialize, Serialize};

use crate::models::null_as_default;

/// Caller-supplied description of an open role. Missing lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qualifications: Vec<String>,
}

impl JobPosting {
    /// Free-text query used to look up candidates for this role:
    /// title, required skills, then description.
    pub fn search_query(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(title) = self.title.as_deref() {
            parts.push(title);
        }
        parts.extend(self.required_skills.iter().map(String::as_str));
        if let Some(description) = self.description.as_deref() {
            parts.push(description);
        }
        parts.join(" ")
    }
}
