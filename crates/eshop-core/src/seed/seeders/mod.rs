// crates/eshop-core/src/seed/seeders/mod.rs

mod brands;
mod carts;
mod categories;
mod products;
mod stores;
mod tags;
mod users;

pub use brands::BrandSeeder;
pub use carts::CartSeeder;
pub use categories::CategorySeeder;
pub use products::{ProductSeeder, DEFAULT_STOCK_QUANTITY};
pub use stores::StoreSeeder;
pub use tags::TagSeeder;
pub use users::UserSeeder;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::context::SeederContext;
use super::passwords::PasswordResolver;
use super::properties::SeedProperties;
use super::providers::Providers;
use super::validation::CategoryValidator;
use crate::config::Settings;
use crate::db::{EntityKind, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};

/// A row written by a seeder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeededEntity {
    pub kind: EntityKind,
    pub id: Uuid,
    pub name: String,
}

impl SeededEntity {
    pub fn new(kind: EntityKind, id: Uuid, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
        }
    }
}

/// Populates the rows of one entity kind.
#[async_trait]
pub trait Seeder: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> EntityKind;

    /// Kinds that must be seeded before this one.
    fn depends_on(&self) -> &'static [EntityKind] {
        &[]
    }

    /// Tie-breaker between seeders whose dependencies are all met.
    fn order(&self) -> i32;

    /// False when the seeder keeps the existing rows of its kind.
    fn replaces_existing(&self) -> bool {
        true
    }

    /// Removes existing rows of this kind and of the kinds referencing it.
    async fn cleanup(&self, tx: &mut dyn SeedTransaction) -> Result<()> {
        tx.delete_all(self.kind())
            .await
            .map_err(|e| SeedError::in_phase(SeedPhase::for_kind(self.kind()), e))
    }

    async fn seed(
        &self,
        tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> Result<Vec<SeededEntity>>;
}

/// The standard seeder set, reading from `providers` and `properties`.
pub fn default_seeders(
    settings: &Settings,
    properties: Arc<SeedProperties>,
    providers: &Providers,
) -> Vec<Box<dyn Seeder>> {
    let passwords = PasswordResolver::new(properties.passwords.clone());

    vec![
        Box::new(UserSeeder::new(properties, passwords, settings.password_config.clone())),
        Box::new(CategorySeeder::new(
            providers.categories.clone(),
            CategoryValidator::new(settings.max_category_depth),
        )),
        Box::new(BrandSeeder::new(providers.brands.clone())),
        Box::new(TagSeeder::new(providers.tags.clone())),
        Box::new(StoreSeeder::new(providers.stores.clone())),
        Box::new(ProductSeeder::new(providers.products.clone())),
        Box::new(CartSeeder),
    ]
}
