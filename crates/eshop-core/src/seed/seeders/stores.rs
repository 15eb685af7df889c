// crates/eshop-core/src/seed/seeders/stores.rs

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{SeededEntity, Seeder};
use crate::db::{EntityKind, NewStore, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};
use crate::seed::context::SeederContext;
use crate::seed::model::SellerType;
use crate::seed::providers::StoreDataProvider;

pub struct StoreSeeder {
    provider: Arc<dyn StoreDataProvider>,
}

impl StoreSeeder {
    pub fn new(provider: Arc<dyn StoreDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Seeder for StoreSeeder {
    fn name(&self) -> &'static str {
        "StoreSeeder"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Stores
    }

    fn depends_on(&self) -> &'static [EntityKind] {
        &[EntityKind::Users]
    }

    fn order(&self) -> i32 {
        5
    }

    async fn seed(
        &self,
        tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> Result<Vec<SeededEntity>> {
        context.mark_populated(EntityKind::Stores);

        let mut seeded = Vec::new();
        for store in self.provider.stores() {
            if context.stores()?.contains_key(&store.store_name) {
                warn!(store = %store.store_name, "Duplicate store name, keeping first");
                continue;
            }

            let Some(seller) = context.users()?.get(store.seller_username.trim()) else {
                warn!(
                    store = %store.store_name,
                    seller = %store.seller_username,
                    "Seller not found, skipping store"
                );
                continue;
            };

            let seller_type = match store.seller_type.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => SellerType::parse(raw).or_else(|| {
                    warn!(store = %store.store_name, seller_type = raw, "Unknown seller type, using the seller's");
                    seller.seller_type
                }),
                _ => seller.seller_type,
            };

            let new_store = NewStore {
                name: store.store_name,
                seller_id: seller.id,
                description: store.description,
                seller_type,
                address: store.address,
                phone: store.phone,
                email: store.email,
                logo_url: store.logo_url,
            };

            let record = tx
                .insert_store(&new_store)
                .await
                .map_err(|e| SeedError::in_phase(SeedPhase::Stores, e))?;

            seeded.push(SeededEntity::new(EntityKind::Stores, record.id, &record.name));
            context.add_store(record);
        }

        info!(provider = self.provider.provider_name(), count = seeded.len(), "Seeded stores");
        Ok(seeded)
    }
}
