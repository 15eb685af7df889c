// crates/eshop-core/src/seed/seeders/categories.rs

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{SeededEntity, Seeder};
use crate::db::{EntityKind, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};
use crate::seed::context::SeederContext;
use crate::seed::providers::CategoryDataProvider;
use crate::seed::taxonomy::materialize;
use crate::seed::validation::CategoryValidator;

pub struct CategorySeeder {
    provider: Arc<dyn CategoryDataProvider>,
    validator: CategoryValidator,
}

impl CategorySeeder {
    pub fn new(provider: Arc<dyn CategoryDataProvider>, validator: CategoryValidator) -> Self {
        Self { provider, validator }
    }
}

#[async_trait]
impl Seeder for CategorySeeder {
    fn name(&self) -> &'static str {
        "CategorySeeder"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Categories
    }

    fn order(&self) -> i32 {
        2
    }

    async fn seed(
        &self,
        tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> Result<Vec<SeededEntity>> {
        context.mark_populated(EntityKind::Categories);

        let roots = self.provider.category_hierarchy();
        for root in &roots {
            self.validator.validate(root).map_err(|e| match e {
                SeedError::Configuration(message) => SeedError::seeding(SeedPhase::Categories, message),
                other => other,
            })?;
        }

        let mut display_order = 0;
        let mut leaves = 0;
        let mut seeded = Vec::new();

        for root in &roots {
            let tree = materialize(tx, root, &mut display_order)
                .await
                .map_err(|e| SeedError::in_phase(SeedPhase::Categories, e))?;
            debug!(root = root.name(), rows = tree.rows.len(), leaves = tree.leaves, "Materialized category tree");

            leaves += tree.leaves;
            for row in tree.rows {
                seeded.push(SeededEntity::new(EntityKind::Categories, row.id, &row.name));
                context.add_category(row);
            }
        }

        info!(
            provider = self.provider.provider_name(),
            roots = roots.len(),
            count = seeded.len(),
            leaves,
            "Seeded categories"
        );
        Ok(seeded)
    }
}
