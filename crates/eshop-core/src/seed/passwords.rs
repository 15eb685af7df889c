// crates/eshop-core/src/seed/passwords.rs

//! Passwords for seeded users: resolution, generation and Argon2id hashing.

use std::collections::BTreeMap;
use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::prelude::*;
use rand::seq::SliceRandom;
use rand::{rng, Rng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use crate::error::RepositoryError;

pub const GENERATED_PASSWORD_LENGTH: usize = 20;
pub const MIN_PASSWORD_LENGTH: usize = 12;

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_=+?";

/// Argon2id cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
    pub hash_length: u32,
    pub salt_length: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 15360,
            time_cost: 3,
            parallelism: 2,
            hash_length: 32,
            salt_length: 16,
        }
    }
}

impl PasswordConfig {
    fn argon2(&self) -> Result<Argon2<'static>, RepositoryError> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.hash_length as usize),
        )
        .map_err(|e| RepositoryError::Password(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hashes into `$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`.
pub fn hash_password(password: &SecretString, config: &PasswordConfig) -> Result<String, RepositoryError> {
    let mut salt = vec![0u8; config.salt_length as usize];
    rng().fill_bytes(&mut salt);

    let mut output = vec![0u8; config.hash_length as usize];
    config
        .argon2()?
        .hash_password_into(password.expose_secret().as_bytes(), &salt, &mut output)
        .map_err(|e| RepositoryError::Password(e.to_string()))?;

    Ok(format!(
        "$argon2id$v=19$m={},t={},p={}${}${}",
        config.memory_cost,
        config.time_cost,
        config.parallelism,
        BASE64_STANDARD_NO_PAD.encode(&salt),
        BASE64_STANDARD_NO_PAD.encode(&output)
    ))
}

pub fn verify_password(password: &SecretString, encoded: &str) -> Result<bool, RepositoryError> {
    let invalid = || RepositoryError::Password("invalid hash format".to_string());

    // ["", "argon2id", "v=19", "m=..,t=..,p=..", salt, hash]
    let parts: Vec<&str> = encoded.split('$').collect();
    if parts.len() != 6 || parts[1] != "argon2id" || parts[2] != "v=19" {
        return Err(invalid());
    }

    let mut config = PasswordConfig::default();
    for param in parts[3].split(',') {
        let (key, value) = param.split_once('=').ok_or_else(invalid)?;
        let value: u32 = value.parse().map_err(|_| invalid())?;
        match key {
            "m" => config.memory_cost = value,
            "t" => config.time_cost = value,
            "p" => config.parallelism = value,
            _ => return Err(invalid()),
        }
    }

    let salt = BASE64_STANDARD_NO_PAD.decode(parts[4]).map_err(|_| invalid())?;
    let expected = BASE64_STANDARD_NO_PAD.decode(parts[5]).map_err(|_| invalid())?;
    config.hash_length = expected.len() as u32;

    let mut actual = vec![0u8; expected.len()];
    config
        .argon2()?
        .hash_password_into(password.expose_secret().as_bytes(), &salt, &mut actual)
        .map_err(|e| RepositoryError::Password(e.to_string()))?;

    let diff = actual
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    Ok(diff == 0)
}

/// A random password with at least one upper-case letter, lower-case
/// letter, digit and symbol. Lengths below the minimum are raised to it.
pub fn generate_password(length: usize) -> SecretString {
    let length = length.max(MIN_PASSWORD_LENGTH);
    let mut rng = rng();
    let classes = [UPPER, LOWER, DIGITS, SYMBOLS];

    let mut chars: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.random_range(0..class.len())])
        .collect();

    while chars.len() < length {
        let class = classes[rng.random_range(0..classes.len())];
        chars.push(class[rng.random_range(0..class.len())]);
    }
    chars.shuffle(&mut rng);

    SecretString::from(String::from_utf8_lossy(&chars).into_owned())
}

/// Where a seeded user's password came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordSource {
    SeedEntry,
    Environment,
    Properties,
    Generated,
}

impl fmt::Display for PasswordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PasswordSource::SeedEntry => "seed entry",
            PasswordSource::Environment => "environment",
            PasswordSource::Properties => "properties",
            PasswordSource::Generated => "generated",
        })
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Picks a password per user: the seed entry, then `SEED_PASS_<USERNAME>`,
/// then the configured password map, then a generated one.
pub struct PasswordResolver {
    configured: BTreeMap<String, String>,
    env: EnvLookup,
}

impl PasswordResolver {
    pub fn new(configured: BTreeMap<String, String>) -> Self {
        Self::with_lookup(configured, |key| std::env::var(key).ok())
    }

    pub fn with_lookup<F>(configured: BTreeMap<String, String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            configured,
            env: Box::new(lookup),
        }
    }

    pub fn env_key(username: &str) -> String {
        let normalized: String = username
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("SEED_PASS_{normalized}")
    }

    pub fn resolve(&self, username: &str, explicit: Option<&str>) -> (SecretString, PasswordSource) {
        if let Some(password) = non_blank(explicit) {
            return (SecretString::from(password.to_string()), PasswordSource::SeedEntry);
        }

        if let Some(password) = (self.env)(&Self::env_key(username)).filter(|p| !p.trim().is_empty()) {
            warn_if_short(username, &password, PasswordSource::Environment);
            return (SecretString::from(password), PasswordSource::Environment);
        }

        let configured = self
            .configured
            .get(username)
            .or_else(|| self.configured.get(&username.to_ascii_lowercase()));
        if let Some(password) = non_blank(configured.map(String::as_str)) {
            warn_if_short(username, password, PasswordSource::Properties);
            return (SecretString::from(password.to_string()), PasswordSource::Properties);
        }

        (generate_password(GENERATED_PASSWORD_LENGTH), PasswordSource::Generated)
    }
}

/// True when `password` has at least `MIN_PASSWORD_LENGTH` characters.
pub fn meets_minimum_length(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

fn warn_if_short(username: &str, password: &str, source: PasswordSource) {
    if !meets_minimum_length(password) {
        warn!(
            username = %username,
            %source,
            min_length = MIN_PASSWORD_LENGTH,
            "Configured seed password is shorter than the recommended minimum"
        );
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordConfig {
        PasswordConfig {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            ..PasswordConfig::default()
        }
    }

    #[test]
    fn hash_round_trips() {
        let password = SecretString::from("correct horse".to_string());
        let hash = hash_password(&password, &cheap()).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=1024,t=1,p=1$"));
        assert!(verify_password(&password, &hash).unwrap());

        let wrong = SecretString::from("battery staple".to_string());
        assert!(!verify_password(&wrong, &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let password = SecretString::from("x".to_string());
        assert!(verify_password(&password, "plaintext").is_err());
    }

    #[test]
    fn generated_passwords_cover_every_class() {
        for _ in 0..50 {
            let password = generate_password(GENERATED_PASSWORD_LENGTH);
            let value = password.expose_secret();
            assert_eq!(value.len(), GENERATED_PASSWORD_LENGTH);
            assert!(value.bytes().any(|b| UPPER.contains(&b)));
            assert!(value.bytes().any(|b| LOWER.contains(&b)));
            assert!(value.bytes().any(|b| DIGITS.contains(&b)));
            assert!(value.bytes().any(|b| SYMBOLS.contains(&b)));
        }
        assert_eq!(generate_password(4).expose_secret().len(), MIN_PASSWORD_LENGTH);
    }

    #[test]
    fn resolution_order() {
        let configured = BTreeMap::from([
            ("admin".to_string(), "from-properties".to_string()),
            ("shop1".to_string(), "shop-properties".to_string()),
        ]);
        let resolver = PasswordResolver::with_lookup(configured, |key| {
            (key == "SEED_PASS_ADMIN").then(|| "from-env".to_string())
        });

        let (password, source) = resolver.resolve("admin", Some("explicit"));
        assert_eq!((password.expose_secret(), source), ("explicit", PasswordSource::SeedEntry));

        let (password, source) = resolver.resolve("admin", None);
        assert_eq!((password.expose_secret(), source), ("from-env", PasswordSource::Environment));

        let (password, source) = resolver.resolve("shop1", Some("  "));
        assert_eq!(
            (password.expose_secret(), source),
            ("shop-properties", PasswordSource::Properties)
        );

        let (_, source) = resolver.resolve("customer1", None);
        assert_eq!(source, PasswordSource::Generated);
    }

    #[test]
    fn short_configured_passwords_are_flagged() {
        assert!(!meets_minimum_length("short-pass"));
        assert!(meets_minimum_length("twelve-chars"));
        assert!(meets_minimum_length(generate_password(GENERATED_PASSWORD_LENGTH).expose_secret()));

        // Short passwords are still used, only warned about.
        let resolver = PasswordResolver::with_lookup(BTreeMap::new(), |key| {
            (key == "SEED_PASS_FARMER1").then(|| "abc".to_string())
        });
        let (password, source) = resolver.resolve("farmer1", None);
        assert_eq!((password.expose_secret(), source), ("abc", PasswordSource::Environment));
    }

    #[test]
    fn env_key_is_upper_snake() {
        assert_eq!(PasswordResolver::env_key("retail.1"), "SEED_PASS_RETAIL_1");
    }
}
