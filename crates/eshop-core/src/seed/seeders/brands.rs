// crates/eshop-core/src/seed/seeders/brands.rs

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{SeededEntity, Seeder};
use crate::db::{EntityKind, NewBrand, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};
use crate::seed::context::SeederContext;
use crate::seed::providers::BrandDataProvider;

pub struct BrandSeeder {
    provider: Arc<dyn BrandDataProvider>,
}

impl BrandSeeder {
    pub fn new(provider: Arc<dyn BrandDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Seeder for BrandSeeder {
    fn name(&self) -> &'static str {
        "BrandSeeder"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Brands
    }

    fn order(&self) -> i32 {
        3
    }

    async fn seed(
        &self,
        tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> Result<Vec<SeededEntity>> {
        context.mark_populated(EntityKind::Brands);

        let mut names = HashSet::new();
        let mut seeded = Vec::new();
        for brand in self.provider.brands() {
            if !names.insert(brand.name.clone()) {
                warn!(brand = %brand.name, "Duplicate brand name, keeping first");
                continue;
            }

            let record = tx
                .insert_brand(&NewBrand {
                    name: brand.name,
                    description: brand.description,
                    logo_url: brand.logo_url,
                })
                .await
                .map_err(|e| SeedError::in_phase(SeedPhase::Brands, e))?;

            seeded.push(SeededEntity::new(EntityKind::Brands, record.id, &record.name));
            context.add_brand(record);
        }

        info!(provider = self.provider.provider_name(), count = seeded.len(), "Seeded brands");
        Ok(seeded)
    }
}
