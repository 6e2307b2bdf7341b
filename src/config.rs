//! Client configuration parsed from the build profile and environment.

use thiserror::Error;

pub const DEFAULT_DEVELOPMENT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_PRODUCTION_BASE_URL: &str = "/api";

pub const API_BASE_URL_VAR: &str = "NOTES_API_BASE_URL";
pub const BUILD_PROFILE_VAR: &str = "NOTES_BUILD_PROFILE";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown NOTES_BUILD_PROFILE: {0} (expected 'development' or 'production')")]
    UnknownProfile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProfile {
    Development,
    Production,
}

impl BuildProfile {
    /// Profile implied by how this binary was compiled.
    #[must_use]
    pub fn compiled() -> Self {
        if cfg!(debug_assertions) { Self::Development } else { Self::Production }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Development => DEFAULT_DEVELOPMENT_BASE_URL,
            Self::Production => DEFAULT_PRODUCTION_BASE_URL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub profile: BuildProfile,
    pub api_base_url: String,
}

impl ClientConfig {
    /// Config with the profile's default API origin.
    #[must_use]
    pub fn for_profile(profile: BuildProfile) -> Self {
        Self { profile, api_base_url: profile.default_base_url().to_owned() }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `NOTES_BUILD_PROFILE`: `development` or `production`; defaults to the
    ///   compiled profile
    /// - `NOTES_API_BASE_URL`: overrides the profile's API origin
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfile`] for an unrecognized profile name.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfile`] for an unrecognized profile name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = parse_profile(lookup(BUILD_PROFILE_VAR).as_deref())?;
        let config = Self::for_profile(profile);
        Ok(match lookup(API_BASE_URL_VAR) {
            Some(url) => config.with_base_url(&url),
            None => config,
        })
    }

    /// Override the API origin. Blank values keep the current origin.
    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        let url = url.trim();
        if !url.is_empty() {
            url.clone_into(&mut self.api_base_url);
        }
        self
    }
}

fn parse_profile(raw: Option<&str>) -> Result<BuildProfile, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(BuildProfile::compiled()),
        Some("development" | "dev") => Ok(BuildProfile::Development),
        Some("production" | "prod") => Ok(BuildProfile::Production),
        Some(other) => Err(ConfigError::UnknownProfile(other.to_owned())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
