// crates/eshop-core/src/seed/seeders/products.rs

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{SeededEntity, Seeder};
use crate::db::{EntityKind, NewProduct, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};
use crate::seed::context::SeederContext;
use crate::seed::model::ProductData;
use crate::seed::providers::ProductDataProvider;

pub const DEFAULT_STOCK_QUANTITY: i32 = 100;

pub struct ProductSeeder {
    provider: Arc<dyn ProductDataProvider>,
}

impl ProductSeeder {
    pub fn new(provider: Arc<dyn ProductDataProvider>) -> Self {
        Self { provider }
    }

    /// Resolves names to ids. `None` when the category or store is unknown.
    fn resolve(&self, product: ProductData, context: &SeederContext) -> Result<Option<NewProduct>> {
        let Some(category) = context.categories()?.get(&product.category_name) else {
            warn!(
                product = %product.name,
                category = %product.category_name,
                "Category not found, skipping product"
            );
            return Ok(None);
        };

        let Some(store) = context.stores()?.get(&product.store_name) else {
            warn!(
                product = %product.name,
                store = %product.store_name,
                "Store not found, skipping product"
            );
            return Ok(None);
        };

        let brand_id = match product.brand_name.as_deref().filter(|b| !b.trim().is_empty()) {
            Some(name) => {
                let brand = context.brands()?.get(name).map(|b| b.id);
                if brand.is_none() {
                    warn!(product = %product.name, brand = name, "Brand not found, leaving unset");
                }
                brand
            }
            None => None,
        };

        let tags = context.tags()?;
        let mut tag_ids = Vec::with_capacity(product.tags.len());
        for name in &product.tags {
            match tags.get(name) {
                Some(tag) if !tag_ids.contains(&tag.id) => tag_ids.push(tag.id),
                Some(_) => {}
                None => warn!(product = %product.name, tag = %name, "Tag not found, dropping"),
            }
        }

        Ok(Some(NewProduct {
            name: product.name,
            sku: product.sku,
            description: product.description,
            price: product.price,
            discount_price: product.discount_price,
            stock_quantity: product.stock_quantity.unwrap_or(DEFAULT_STOCK_QUANTITY),
            category_id: category.id,
            store_id: store.id,
            brand_id,
            tag_ids,
            featured: product.featured,
            active: product.active,
        }))
    }
}

#[async_trait]
impl Seeder for ProductSeeder {
    fn name(&self) -> &'static str {
        "ProductSeeder"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Products
    }

    fn depends_on(&self) -> &'static [EntityKind] {
        &[
            EntityKind::Categories,
            EntityKind::Brands,
            EntityKind::Tags,
            EntityKind::Stores,
        ]
    }

    fn order(&self) -> i32 {
        6
    }

    async fn seed(
        &self,
        tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> Result<Vec<SeededEntity>> {
        let mut skus = HashSet::new();
        let mut seeded = Vec::new();

        for product in self.provider.products() {
            if skus.contains(&product.sku) {
                warn!(product = %product.name, sku = %product.sku, "Duplicate SKU, keeping first");
                continue;
            }

            let Some(new_product) = self.resolve(product, context)? else {
                continue;
            };
            skus.insert(new_product.sku.clone());

            let record = tx
                .insert_product(&new_product)
                .await
                .map_err(|e| SeedError::in_phase(SeedPhase::Products, e))?;

            seeded.push(SeededEntity::new(EntityKind::Products, record.id, &record.name));
        }

        info!(provider = self.provider.provider_name(), count = seeded.len(), "Seeded products");
        Ok(seeded)
    }
}
