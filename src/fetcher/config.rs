use crate::error::{Error, Result};
use crate::models::Language;

/// Who the fetch coordinator fetches for.
///
/// The main e-mail is always part of [`FetcherConfig::emails`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    main_email: String,
    emails: Vec<String>,
    organizations: Vec<i64>,
    branches: Vec<i64>,
    language: Language,
}

impl FetcherConfig {
    pub fn new(main_email: impl Into<String>) -> Self {
        let main_email = main_email.into().trim().to_string();
        Self {
            emails: vec![main_email.clone()],
            main_email,
            organizations: Vec::new(),
            branches: Vec::new(),
            language: Language::default(),
        }
    }

    /// Load configuration from environment variables:
    /// - `PROJECT_GRAPH_EMAIL` - main user key (required)
    /// - `PROJECT_GRAPH_EMAILS` - further user keys, comma-separated
    /// - `PROJECT_GRAPH_LANGUAGE` - `en` or `es`
    pub fn from_env() -> Result<Self> {
        let main_email = std::env::var("PROJECT_GRAPH_EMAIL")
            .map_err(|_| Error::Config("PROJECT_GRAPH_EMAIL is not set".to_string()))?;

        let emails: Vec<String> = std::env::var("PROJECT_GRAPH_EMAILS")
            .ok()
            .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();

        let language = match std::env::var("PROJECT_GRAPH_LANGUAGE") {
            Ok(value) => Language::from_str(&value).ok_or_else(|| {
                Error::Config(format!("unsupported PROJECT_GRAPH_LANGUAGE {:?}", value))
            })?,
            Err(_) => Language::default(),
        };

        let config = Self::new(main_email)
            .with_emails(emails)
            .with_language(language);
        config.validate()?;
        Ok(config)
    }

    pub fn with_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for email in emails {
            let email = email.into().trim().to_string();
            if !email.is_empty() && !self.emails.contains(&email) {
                self.emails.push(email);
            }
        }
        self
    }

    pub fn with_organizations(mut self, organizations: Vec<i64>) -> Self {
        self.organizations = organizations;
        self
    }

    pub fn with_branches(mut self, branches: Vec<i64>) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn main_email(&self) -> &str {
        &self.main_email
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn organizations(&self) -> &[i64] {
        &self.organizations
    }

    pub fn branches(&self) -> &[i64] {
        &self.branches
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.main_email.is_empty() {
            return Err(Error::Config("main e-mail must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_email_is_always_included() {
        let config = FetcherConfig::new("ana@example.com").with_emails(["bo@example.com"]);
        assert_eq!(config.emails(), ["ana@example.com", "bo@example.com"]);
    }

    #[test]
    fn duplicate_and_blank_emails_are_ignored() {
        let config = FetcherConfig::new("ana@example.com")
            .with_emails(["ana@example.com", "  ", "bo@example.com", "bo@example.com"]);
        assert_eq!(config.emails().len(), 2);
    }

    #[test]
    fn blank_main_email_fails_validation() {
        let config = FetcherConfig::new("   ");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
