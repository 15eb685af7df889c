// crates/eshop-core/src/seed/seeders/users.rs

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{SeededEntity, Seeder};
use crate::db::{EntityKind, NewUser, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};
use crate::seed::context::SeederContext;
use crate::seed::model::{SellerType, UserRole};
use crate::seed::passwords::{hash_password, PasswordConfig, PasswordResolver, PasswordSource};
use crate::seed::properties::{SeedProperties, UserSeed};

pub struct UserSeeder {
    properties: Arc<SeedProperties>,
    passwords: PasswordResolver,
    password_config: PasswordConfig,
}

impl UserSeeder {
    pub fn new(
        properties: Arc<SeedProperties>,
        passwords: PasswordResolver,
        password_config: PasswordConfig,
    ) -> Self {
        Self {
            properties,
            passwords,
            password_config,
        }
    }

    /// False when user seeding is disabled or no users are configured; the
    /// existing users are then kept and loaded instead.
    fn writes_users(&self) -> bool {
        self.properties.users_enabled && !self.properties.users.is_empty()
    }

    fn build_user(&self, seed: &UserSeed) -> Result<NewUser> {
        let username = seed.username.trim().to_string();

        let role = match seed.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(raw) => UserRole::parse(raw).unwrap_or_else(|| {
                warn!(username = %username, role = raw, "Unknown role, defaulting to CUSTOMER");
                UserRole::Customer
            }),
            None => UserRole::Customer,
        };

        let seller_type = seed
            .seller_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .and_then(|raw| {
                let parsed = SellerType::parse(raw);
                if parsed.is_none() {
                    warn!(username = %username, seller_type = raw, "Unknown seller type, ignoring");
                }
                parsed
            });

        let (password, source) = self.passwords.resolve(&username, seed.password.as_deref());
        if source == PasswordSource::Generated {
            warn!(username = %username, "No password configured, generated a random one");
        } else {
            debug!(username = %username, %source, "Resolved seed password");
        }
        let password_hash = hash_password(&password, &self.password_config)
            .map_err(|e| SeedError::in_phase(SeedPhase::Users, e))?;

        Ok(NewUser {
            email: seed
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            username,
            password_hash,
            first_name: seed.first_name.clone(),
            last_name: seed.last_name.clone(),
            phone: seed.phone.clone(),
            address: seed.address.clone(),
            role,
            seller_type,
        })
    }
}

#[async_trait]
impl Seeder for UserSeeder {
    fn name(&self) -> &'static str {
        "UserSeeder"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Users
    }

    fn order(&self) -> i32 {
        1
    }

    fn replaces_existing(&self) -> bool {
        self.writes_users()
    }

    async fn cleanup(&self, tx: &mut dyn SeedTransaction) -> Result<()> {
        if !self.writes_users() {
            debug!(
                enabled = self.properties.users_enabled,
                "No users to seed, keeping existing users"
            );
            return Ok(());
        }
        tx.delete_all(EntityKind::Users)
            .await
            .map_err(|e| SeedError::in_phase(SeedPhase::Users, e))
    }

    async fn seed(
        &self,
        tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> Result<Vec<SeededEntity>> {
        context.mark_populated(EntityKind::Users);

        if !self.writes_users() {
            let existing = tx
                .load_users()
                .await
                .map_err(|e| SeedError::in_phase(SeedPhase::Users, e))?;
            info!(count = existing.len(), "Loaded existing users into seed context");
            for user in existing {
                context.add_user(user);
            }
            return Ok(Vec::new());
        }

        let mut seeded = Vec::with_capacity(self.properties.users.len());
        for seed in &self.properties.users {
            let new_user = self.build_user(seed)?;
            let user = tx
                .insert_user(&new_user)
                .await
                .map_err(|e| SeedError::in_phase(SeedPhase::Users, e))?;

            seeded.push(SeededEntity::new(EntityKind::Users, user.id, &user.username));
            context.add_user(user);
        }

        info!(count = seeded.len(), "Seeded users");
        Ok(seeded)
    }
}
