use thiserror::Error;

/// Input rejected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both job role and location.")]
    MissingSearchInput,
    #[error("Please paste a job description to score against.")]
    MissingJobDescription,
    #[error("Unknown profile field `{0}`.")]
    UnknownProfileField(String),
    #[error("Profile field `{0}` is a list; add or remove items instead.")]
    NotAScalarField(String),
    #[error("Profile field `{0}` is not a list.")]
    NotAListField(String),
    #[error("No item at index {index} in `{field}`.")]
    NoSuchItem { field: String, index: usize },
    #[error("Please provide an identity token.")]
    MissingIdToken,
}

/// A validated search: both parts are non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    role_keywords: String,
    location: String,
}

impl SearchQuery {
    pub fn new(role_keywords: &str, location: &str) -> Result<Self, ValidationError> {
        let role_keywords = role_keywords.trim();
        let location = location.trim();
        if role_keywords.is_empty() || location.is_empty() {
            return Err(ValidationError::MissingSearchInput);
        }
        Ok(Self {
            role_keywords: role_keywords.to_string(),
            location: location.to_string(),
        })
    }

    pub fn role_keywords(&self) -> &str {
        &self.role_keywords
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

pub fn validate_job_description(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingJobDescription)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn validate_id_token(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingIdToken)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_requires_both_parts() {
        assert_eq!(
            SearchQuery::new("", "NYC"),
            Err(ValidationError::MissingSearchInput)
        );
        assert_eq!(
            SearchQuery::new("Engineer", "   "),
            Err(ValidationError::MissingSearchInput)
        );
    }

    #[test]
    fn search_query_trims_input() {
        let query = SearchQuery::new("  Rust Developer ", " Remote").unwrap();
        assert_eq!(query.role_keywords(), "Rust Developer");
        assert_eq!(query.location(), "Remote");
    }

    #[test]
    fn blank_job_description_is_rejected() {
        assert_eq!(
            validate_job_description(" \n\t"),
            Err(ValidationError::MissingJobDescription)
        );
        assert_eq!(validate_job_description(" JD ").unwrap(), "JD");
    }
}
