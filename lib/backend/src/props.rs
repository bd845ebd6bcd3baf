//! Backend API connection properties.
//!
//! The backend is usually reached through a gateway whose base URL already
//! carries the API path prefix (e.g. `https://api.example.com/api/v1`). Some
//! deployments configure the bare host instead; for those, the prefix
//! configured separately must be injected ahead of every admin API path.
//! [`ApiProps::missing_prefix_segments`] captures exactly the segments that
//! still need injecting.

use std::fmt;

/// Connection properties for the Saerok backend API.
#[derive(Debug, Clone)]
pub struct ApiProps {
    base_url: String,
    prefix: String,
    missing_prefix: Vec<String>,
}

impl ApiProps {
    /// Creates validated connection properties.
    ///
    /// The prefix is normalized: a leading slash is added, trailing slashes
    /// are stripped, and a bare `/` (or nothing) means no prefix.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidApiProps`] if the base URL is blank or not a valid
    /// absolute URL.
    pub fn new(base_url: impl Into<String>, prefix: Option<&str>) -> Result<Self, InvalidApiProps> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(InvalidApiProps {
                details: "base URL must not be empty".to_string(),
            });
        }
        let parsed = reqwest::Url::parse(&base_url).map_err(|e| InvalidApiProps {
            details: format!("base URL is not a valid URL: {e}"),
        })?;

        let prefix = normalize_prefix(prefix.unwrap_or_default());
        let prefix_segments = split_segments(&prefix);
        let base_segments = split_segments(parsed.path());
        let missing_prefix = if prefix_segments.is_empty() || ends_with(&base_segments, &prefix_segments)
        {
            Vec::new()
        } else {
            prefix_segments
        };

        Ok(Self {
            base_url,
            prefix,
            missing_prefix,
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the normalized API path prefix (`""` when none).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the prefix segments that must be injected ahead of admin API
    /// paths because the base URL's path does not already end with them.
    #[must_use]
    pub fn missing_prefix_segments(&self) -> &[String] {
        &self.missing_prefix
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return String::new();
    }
    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn ends_with(base: &[String], suffix: &[String]) -> bool {
    if suffix.len() > base.len() {
        return false;
    }
    base[base.len() - suffix.len()..] == *suffix
}

/// Error returned for unusable backend connection properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidApiProps {
    /// What was wrong with the configuration.
    pub details: String,
}

impl fmt::Display for InvalidApiProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid backend API properties: {}", self.details)
    }
}

impl std::error::Error for InvalidApiProps {}
