// crates/eshop-core/src/config.rs

//! Process settings read from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, SeedError};
use crate::seed::passwords::PasswordConfig;

/// Profiles in which seeding may run.
pub const DEFAULT_ALLOWED_PROFILES: [&str; 3] = ["dev", "test", "local"];

/// Profiles in which a failed startup seed aborts the process.
pub const FATAL_PROFILES: [&str; 2] = ["dev", "test"];

pub const DEFAULT_MAX_CATEGORY_DEPTH: usize = 10;

/// Where seed data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The catalog compiled into the crate.
    #[default]
    Code,
    /// The seed properties file.
    Properties,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Code => "code",
            DataSource::Properties => "properties",
        }
    }
}

impl FromStr for DataSource {
    type Err = SeedError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "code" => Ok(DataSource::Code),
            "properties" => Ok(DataSource::Properties),
            other => Err(SeedError::Configuration(format!(
                "unknown seed data source '{other}' (expected 'code' or 'properties')"
            ))),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub active_profiles: Vec<String>,
    pub allowed_profiles: Vec<String>,
    pub seed_enabled: bool,
    pub data_source: DataSource,
    pub seed_file: Option<PathBuf>,
    pub max_category_depth: usize,
    /// Argon2id cost for seeded user passwords.
    pub password_config: PasswordConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            active_profiles: vec!["default".to_string()],
            allowed_profiles: DEFAULT_ALLOWED_PROFILES.iter().map(|p| p.to_string()).collect(),
            seed_enabled: true,
            data_source: DataSource::Code,
            seed_file: None,
            max_category_depth: DEFAULT_MAX_CATEGORY_DEPTH,
            password_config: PasswordConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        settings.database_url = lookup("DATABASE_URL").or_else(|| lookup("ESHOP_DATABASE_URL"));

        if let Some(profiles) = lookup("ESHOP_PROFILES") {
            let profiles = split_list(&profiles);
            if !profiles.is_empty() {
                settings.active_profiles = profiles;
            }
        }

        if let Some(allowed) = lookup("ESHOP_SEED_ALLOWED_PROFILES") {
            let allowed = split_list(&allowed);
            if !allowed.is_empty() {
                settings.allowed_profiles = allowed;
            }
        }

        if let Some(enabled) = lookup("ESHOP_SEED_ENABLED") {
            settings.seed_enabled = parse_bool("ESHOP_SEED_ENABLED", &enabled)?;
        }

        if let Some(source) = lookup("ESHOP_SEED_DATA_SOURCE") {
            settings.data_source = source.parse()?;
        }

        settings.seed_file = lookup("ESHOP_SEED_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        if let Some(depth) = lookup("ESHOP_SEED_MAX_CATEGORY_DEPTH") {
            settings.max_category_depth = depth.trim().parse().map_err(|_| {
                SeedError::Configuration(format!(
                    "ESHOP_SEED_MAX_CATEGORY_DEPTH must be a non-negative integer, got '{depth}'"
                ))
            })?;
        }

        Ok(settings)
    }

    pub fn with_profiles(mut self, profiles: &[&str]) -> Self {
        self.active_profiles = profiles.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn is_profile_active(&self, profile: &str) -> bool {
        self.active_profiles
            .iter()
            .any(|active| active.eq_ignore_ascii_case(profile))
    }

    /// True when at least one active profile is in the allowed set.
    pub fn seeding_allowed(&self) -> bool {
        self.allowed_profiles
            .iter()
            .any(|allowed| self.is_profile_active(allowed))
    }

    /// True when a startup seeding failure must stop the process.
    pub fn fail_fast(&self) -> bool {
        FATAL_PROFILES.iter().any(|p| self.is_profile_active(p))
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            SeedError::Configuration(
                "DATABASE_URL (or ESHOP_DATABASE_URL) must be set".to_string(),
            )
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(SeedError::Configuration(format!(
            "{key} must be a boolean, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.active_profiles, vec!["default".to_string()]);
        assert!(settings.seed_enabled);
        assert_eq!(settings.data_source, DataSource::Code);
        assert_eq!(settings.max_category_depth, 10);
        assert!(!settings.seeding_allowed());
    }

    #[test]
    fn profiles_and_source_are_read() {
        let settings = Settings::from_lookup(lookup(&[
            ("ESHOP_DATABASE_URL", "postgres://localhost/eshop"),
            ("ESHOP_PROFILES", "local, metrics"),
            ("ESHOP_SEED_DATA_SOURCE", "Properties"),
            ("ESHOP_SEED_ENABLED", "no"),
        ]))
        .unwrap();

        assert_eq!(settings.require_database_url().unwrap(), "postgres://localhost/eshop");
        assert!(settings.seeding_allowed());
        assert!(!settings.fail_fast());
        assert_eq!(settings.data_source, DataSource::Properties);
        assert!(!settings.seed_enabled);
    }

    #[test]
    fn invalid_values_are_configuration_errors() {
        assert!(Settings::from_lookup(lookup(&[("ESHOP_SEED_ENABLED", "maybe")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("ESHOP_SEED_DATA_SOURCE", "yaml")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("ESHOP_SEED_MAX_CATEGORY_DEPTH", "-1")])).is_err());
    }

    #[test]
    fn dev_and_test_fail_fast() {
        let settings = Settings::default().with_profiles(&["TEST"]);
        assert!(settings.seeding_allowed());
        assert!(settings.fail_fast());
    }
}
