// crates/eshop-core/src/error.rs

use std::fmt;

use serde::Serialize;
use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::db::EntityKind;

/// The stage of a seeding run an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPhase {
    Configuration,
    Users,
    Categories,
    Brands,
    Tags,
    Stores,
    Products,
    Carts,
    Orchestration,
}

impl SeedPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeedPhase::Configuration => "configuration",
            SeedPhase::Users => "users",
            SeedPhase::Categories => "categories",
            SeedPhase::Brands => "brands",
            SeedPhase::Tags => "tags",
            SeedPhase::Stores => "stores",
            SeedPhase::Products => "products",
            SeedPhase::Carts => "carts",
            SeedPhase::Orchestration => "orchestration",
        }
    }

    /// The phase that seeds rows of the given kind.
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Users => SeedPhase::Users,
            EntityKind::Categories => SeedPhase::Categories,
            EntityKind::Brands => SeedPhase::Brands,
            EntityKind::Tags => SeedPhase::Tags,
            EntityKind::Stores => SeedPhase::Stores,
            EntityKind::Products => SeedPhase::Products,
            EntityKind::Carts => SeedPhase::Carts,
        }
    }
}

impl fmt::Display for SeedPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("{kind} row references missing {target} '{id}'")]
    ForeignKey {
        kind: EntityKind,
        target: EntityKind,
        id: uuid::Uuid,
    },

    #[error("duplicate {kind} key '{key}'")]
    Duplicate { kind: EntityKind, key: String },

    #[error("invalid {column} value '{value}'")]
    InvalidValue { column: &'static str, value: String },

    #[error("password hashing failed: {0}")]
    Password(String),
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seed configuration: {0}")]
    Configuration(String),

    #[error("data seeding not allowed in profiles {active:?}; only allowed in {allowed:?}")]
    Security {
        active: Vec<String>,
        allowed: Vec<String>,
    },

    #[error("{phase} seeding failed: {message}")]
    Seeding {
        phase: SeedPhase,
        message: String,
        #[source]
        source: Option<RepositoryError>,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SeedError {
    pub fn seeding(phase: SeedPhase, message: impl Into<String>) -> Self {
        SeedError::Seeding {
            phase,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a persistence failure with the phase it happened in.
    pub fn in_phase(phase: SeedPhase, source: RepositoryError) -> Self {
        SeedError::Seeding {
            phase,
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn phase(&self) -> SeedPhase {
        match self {
            SeedError::Configuration(_) => SeedPhase::Configuration,
            SeedError::Security { .. } => SeedPhase::Configuration,
            SeedError::Seeding { phase, .. } => *phase,
            SeedError::Repository(_) => SeedPhase::Orchestration,
        }
    }
}

pub type Result<T> = std::result::Result<T, SeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_is_reported_for_each_variant() {
        assert_eq!(
            SeedError::Configuration("x".into()).phase(),
            SeedPhase::Configuration
        );
        assert_eq!(
            SeedError::seeding(SeedPhase::Products, "boom").phase(),
            SeedPhase::Products
        );
        let wrapped = SeedError::in_phase(
            SeedPhase::Stores,
            RepositoryError::Duplicate {
                kind: EntityKind::Stores,
                key: "FlexiMart".into(),
            },
        );
        assert_eq!(wrapped.phase(), SeedPhase::Stores);
        assert!(wrapped.to_string().contains("FlexiMart"));
    }

    #[test]
    fn security_error_lists_profiles() {
        let err = SeedError::Security {
            active: vec!["prod".into()],
            allowed: vec!["dev".into(), "test".into(), "local".into()],
        };
        let message = err.to_string();
        assert!(message.contains("prod"));
        assert!(message.contains("local"));
    }
}
