// crates/eshop-core/src/seed/seeders/carts.rs

use async_trait::async_trait;
use tracing::info;

use super::{SeededEntity, Seeder};
use crate::db::{EntityKind, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};
use crate::seed::context::SeederContext;
use crate::seed::model::UserRole;

/// One empty cart per customer.
#[derive(Debug, Default, Clone, Copy)]
pub struct CartSeeder;

#[async_trait]
impl Seeder for CartSeeder {
    fn name(&self) -> &'static str {
        "CartSeeder"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Carts
    }

    fn depends_on(&self) -> &'static [EntityKind] {
        &[EntityKind::Users]
    }

    fn order(&self) -> i32 {
        7
    }

    async fn seed(
        &self,
        tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> Result<Vec<SeededEntity>> {
        let mut customers: Vec<(String, uuid::Uuid)> = context
            .users()?
            .values()
            .filter(|user| user.role == UserRole::Customer)
            .map(|user| (user.username.clone(), user.id))
            .collect();
        customers.sort();

        let mut seeded = Vec::with_capacity(customers.len());
        for (username, user_id) in customers {
            let cart = tx
                .insert_cart(user_id)
                .await
                .map_err(|e| SeedError::in_phase(SeedPhase::Carts, e))?;
            seeded.push(SeededEntity::new(EntityKind::Carts, cart.id, username));
        }

        info!(count = seeded.len(), "Seeded carts");
        Ok(seeded)
    }
}
