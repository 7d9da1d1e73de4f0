use std::fmt;

use url::Url;

/// Which generator the submission targets.
///
/// Brochure mode needs a company name; summary mode sends the URL alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    #[default]
    Brochure,
    Summary,
}

/// One submission, immutable once handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub target_url: String,
    pub company_name: String,
    pub streaming: bool,
    pub mode: GenerationMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The URL does not parse as an absolute URL.
    InvalidUrl,
    /// The URL parses but is not http or https.
    UnsupportedScheme(String),
    /// Brochure mode requires a non-empty company name.
    MissingCompanyName,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUrl => {
                write!(f, "enter a valid URL starting with http:// or https://")
            }
            ValidationError::UnsupportedScheme(scheme) => {
                write!(f, "unsupported URL scheme {scheme}")
            }
            ValidationError::MissingCompanyName => write!(f, "company name is required"),
        }
    }
}

/// Pure precondition check. Runs before any effect is emitted, so a bad
/// submission never reaches the network.
pub fn validate(request: &GenerationRequest) -> Result<(), ValidationError> {
    let parsed = Url::parse(&request.target_url).map_err(|_| ValidationError::InvalidUrl)?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }
    if request.mode == GenerationMode::Brochure && request.company_name.trim().is_empty() {
        return Err(ValidationError::MissingCompanyName);
    }
    Ok(())
}
