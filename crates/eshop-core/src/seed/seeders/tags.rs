// crates/eshop-core/src/seed/seeders/tags.rs

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{SeededEntity, Seeder};
use crate::db::{EntityKind, NewTag, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};
use crate::seed::context::SeederContext;
use crate::seed::providers::TagDataProvider;

pub struct TagSeeder {
    provider: Arc<dyn TagDataProvider>,
}

impl TagSeeder {
    pub fn new(provider: Arc<dyn TagDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Seeder for TagSeeder {
    fn name(&self) -> &'static str {
        "TagSeeder"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Tags
    }

    fn order(&self) -> i32 {
        4
    }

    async fn seed(
        &self,
        tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> Result<Vec<SeededEntity>> {
        context.mark_populated(EntityKind::Tags);

        let mut slugs = HashSet::new();
        let mut seeded = Vec::new();
        for tag in self.provider.tags() {
            let slug = slug::slugify(&tag.name);
            if !slugs.insert(slug.clone()) {
                warn!(tag = %tag.name, %slug, "Duplicate tag, keeping first");
                continue;
            }

            let record = tx
                .insert_tag(&NewTag {
                    name: tag.name,
                    slug,
                })
                .await
                .map_err(|e| SeedError::in_phase(SeedPhase::Tags, e))?;

            seeded.push(SeededEntity::new(EntityKind::Tags, record.id, &record.name));
            context.add_tag(record);
        }

        info!(provider = self.provider.provider_name(), count = seeded.len(), "Seeded tags");
        Ok(seeded)
    }
}
