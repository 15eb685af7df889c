//! In-process seed store used for dry runs and tests.
//!
//! Mirrors the constraints of the Postgres schema that matter to seeding:
//! unique keys, foreign keys and `TRUNCATE ... CASCADE` semantics.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    BrandRecord, CartRecord, CategoryRecord, EntityKind, NewBrand, NewCategory, NewProduct,
    NewStore, NewTag, NewUser, ProductRecord, SeedStore, SeedTransaction, StoreRecord,
    TagRecord, UserRecord,
};
use crate::error::RepositoryError;

#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub users: Vec<UserRecord>,
    pub categories: Vec<CategoryRecord>,
    pub brands: Vec<BrandRecord>,
    pub tags: Vec<TagRecord>,
    pub stores: Vec<StoreRecord>,
    pub products: Vec<ProductRecord>,
    pub product_tags: Vec<(Uuid, Uuid)>,
    pub carts: Vec<CartRecord>,
}

impl MemoryTables {
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Users => self.users.len(),
            EntityKind::Categories => self.categories.len(),
            EntityKind::Brands => self.brands.len(),
            EntityKind::Tags => self.tags.len(),
            EntityKind::Stores => self.stores.len(),
            EntityKind::Products => self.products.len(),
            EntityKind::Carts => self.carts.len(),
        }
    }

    fn clear(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Users => self.users.clear(),
            EntityKind::Categories => self.categories.clear(),
            EntityKind::Brands => self.brands.clear(),
            EntityKind::Tags => {
                self.tags.clear();
                self.product_tags.clear();
            }
            EntityKind::Stores => self.stores.clear(),
            EntityKind::Products => {
                self.products.clear();
                self.product_tags.clear();
            }
            EntityKind::Carts => self.carts.clear(),
        }
    }

    fn truncate_cascade(&mut self, kind: EntityKind) {
        let mut pending = vec![kind];
        let mut seen = BTreeSet::new();
        while let Some(next) = pending.pop() {
            if !seen.insert(next) {
                continue;
            }
            self.clear(next);
            pending.extend_from_slice(next.referenced_by());
        }
    }

    fn require(&self, kind: EntityKind, target: EntityKind, id: Uuid) -> Result<(), RepositoryError> {
        let exists = match target {
            EntityKind::Users => self.users.iter().any(|r| r.id == id),
            EntityKind::Categories => self.categories.iter().any(|r| r.id == id),
            EntityKind::Brands => self.brands.iter().any(|r| r.id == id),
            EntityKind::Tags => self.tags.iter().any(|r| r.id == id),
            EntityKind::Stores => self.stores.iter().any(|r| r.id == id),
            EntityKind::Products => self.products.iter().any(|r| r.id == id),
            EntityKind::Carts => self.carts.iter().any(|r| r.id == id),
        };
        if exists {
            Ok(())
        } else {
            Err(RepositoryError::ForeignKey { kind, target, id })
        }
    }
}

fn unique(kind: EntityKind, taken: bool, key: &str) -> Result<(), RepositoryError> {
    if taken {
        Err(RepositoryError::Duplicate {
            kind,
            key: key.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Shared handle; clones see the same committed tables.
#[derive(Debug, Clone, Default)]
pub struct MemorySeedStore {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemorySeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> MemoryTables {
        self.tables.lock().await.clone()
    }
}

#[async_trait]
impl SeedStore for MemorySeedStore {
    async fn count(&self, kind: EntityKind) -> Result<i64, RepositoryError> {
        Ok(self.tables.lock().await.count(kind) as i64)
    }

    async fn begin(&self) -> Result<Box<dyn SeedTransaction>, RepositoryError> {
        let working = self.tables.lock().await.clone();
        Ok(Box::new(MemorySeedTransaction {
            committed: Arc::clone(&self.tables),
            working,
        }))
    }
}

pub struct MemorySeedTransaction {
    committed: Arc<Mutex<MemoryTables>>,
    working: MemoryTables,
}

#[async_trait]
impl SeedTransaction for MemorySeedTransaction {
    async fn delete_all(&mut self, kind: EntityKind) -> Result<(), RepositoryError> {
        self.working.truncate_cascade(kind);
        Ok(())
    }

    async fn load_users(&mut self) -> Result<Vec<UserRecord>, RepositoryError> {
        let mut users = self.working.users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn insert_user(&mut self, user: &NewUser) -> Result<UserRecord, RepositoryError> {
        let tables = &mut self.working;
        unique(
            EntityKind::Users,
            tables.users.iter().any(|u| u.username == user.username),
            &user.username,
        )?;
        if let Some(email) = &user.email {
            unique(
                EntityKind::Users,
                tables.users.iter().any(|u| u.email.as_ref() == Some(email)),
                email,
            )?;
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            seller_type: user.seller_type,
        };
        tables.users.push(record.clone());
        Ok(record)
    }

    async fn insert_category(
        &mut self,
        category: &NewCategory,
    ) -> Result<CategoryRecord, RepositoryError> {
        let tables = &mut self.working;
        unique(
            EntityKind::Categories,
            tables.categories.iter().any(|c| c.slug == category.slug),
            &category.slug,
        )?;
        if let Some(parent_id) = category.parent_id {
            tables.require(EntityKind::Categories, EntityKind::Categories, parent_id)?;
        }

        let record = CategoryRecord {
            id: Uuid::new_v4(),
            name: category.name.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone(),
            slug: category.slug.clone(),
            path: category.path.clone(),
            depth: category.depth,
            display_order: category.display_order,
            parent_id: category.parent_id,
        };
        tables.categories.push(record.clone());
        Ok(record)
    }

    async fn insert_brand(&mut self, brand: &NewBrand) -> Result<BrandRecord, RepositoryError> {
        let tables = &mut self.working;
        unique(
            EntityKind::Brands,
            tables.brands.iter().any(|b| b.name == brand.name),
            &brand.name,
        )?;

        let record = BrandRecord {
            id: Uuid::new_v4(),
            name: brand.name.clone(),
        };
        tables.brands.push(record.clone());
        Ok(record)
    }

    async fn insert_tag(&mut self, tag: &NewTag) -> Result<TagRecord, RepositoryError> {
        let tables = &mut self.working;
        unique(
            EntityKind::Tags,
            tables.tags.iter().any(|t| t.name == tag.name),
            &tag.name,
        )?;

        let record = TagRecord {
            id: Uuid::new_v4(),
            name: tag.name.clone(),
        };
        tables.tags.push(record.clone());
        Ok(record)
    }

    async fn insert_store(&mut self, store: &NewStore) -> Result<StoreRecord, RepositoryError> {
        let tables = &mut self.working;
        unique(
            EntityKind::Stores,
            tables.stores.iter().any(|s| s.name == store.name),
            &store.name,
        )?;
        tables.require(EntityKind::Stores, EntityKind::Users, store.seller_id)?;

        let record = StoreRecord {
            id: Uuid::new_v4(),
            name: store.name.clone(),
            seller_id: store.seller_id,
        };
        tables.stores.push(record.clone());
        Ok(record)
    }

    async fn insert_product(
        &mut self,
        product: &NewProduct,
    ) -> Result<ProductRecord, RepositoryError> {
        let tables = &mut self.working;
        unique(
            EntityKind::Products,
            tables.products.iter().any(|p| p.sku == product.sku),
            &product.sku,
        )?;
        tables.require(EntityKind::Products, EntityKind::Categories, product.category_id)?;
        tables.require(EntityKind::Products, EntityKind::Stores, product.store_id)?;
        if let Some(brand_id) = product.brand_id {
            tables.require(EntityKind::Products, EntityKind::Brands, brand_id)?;
        }
        for tag_id in &product.tag_ids {
            tables.require(EntityKind::Products, EntityKind::Tags, *tag_id)?;
        }

        let record = ProductRecord {
            id: Uuid::new_v4(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            category_id: product.category_id,
            store_id: product.store_id,
            brand_id: product.brand_id,
        };
        for tag_id in &product.tag_ids {
            if !tables.product_tags.contains(&(record.id, *tag_id)) {
                tables.product_tags.push((record.id, *tag_id));
            }
        }
        tables.products.push(record.clone());
        Ok(record)
    }

    async fn insert_cart(&mut self, user_id: Uuid) -> Result<CartRecord, RepositoryError> {
        let tables = &mut self.working;
        tables.require(EntityKind::Carts, EntityKind::Users, user_id)?;
        unique(
            EntityKind::Carts,
            tables.carts.iter().any(|c| c.user_id == user_id),
            &user_id.to_string(),
        )?;

        let record = CartRecord {
            id: Uuid::new_v4(),
            user_id,
        };
        tables.carts.push(record.clone());
        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let this = *self;
        *this.committed.lock().await = this.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::model::UserRole;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: Some(format!("{username}@example.com")),
            password_hash: "hash".into(),
            first_name: None,
            last_name: None,
            phone: None,
            address: None,
            role: UserRole::Seller,
            seller_type: None,
        }
    }

    #[tokio::test]
    async fn uncommitted_writes_are_invisible() {
        let store = MemorySeedStore::new();
        let mut tx = store.begin().await.expect("begin");
        tx.insert_user(&new_user("retail1")).await.expect("insert");
        assert_eq!(store.count(EntityKind::Users).await.expect("count"), 0);

        tx.rollback().await.expect("rollback");
        assert_eq!(store.count(EntityKind::Users).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn truncating_users_cascades_to_stores() {
        let store = MemorySeedStore::new();
        let mut tx = store.begin().await.expect("begin");
        let seller = tx.insert_user(&new_user("retail1")).await.expect("insert");
        tx.insert_store(&NewStore {
            name: "Tech Retail Store".into(),
            seller_id: seller.id,
            description: None,
            seller_type: None,
            address: None,
            phone: None,
            email: None,
            logo_url: None,
        })
        .await
        .expect("store");
        tx.commit().await.expect("commit");

        let mut tx = store.begin().await.expect("begin");
        tx.delete_all(EntityKind::Users).await.expect("truncate");
        tx.commit().await.expect("commit");

        let tables = store.snapshot().await;
        assert!(tables.users.is_empty());
        assert!(tables.stores.is_empty());
    }

    #[tokio::test]
    async fn store_requires_existing_seller() {
        let store = MemorySeedStore::new();
        let mut tx = store.begin().await.expect("begin");
        let err = tx
            .insert_store(&NewStore {
                name: "Orphan".into(),
                seller_id: Uuid::new_v4(),
                description: None,
                seller_type: None,
                address: None,
                phone: None,
                email: None,
                logo_url: None,
            })
            .await
            .expect_err("missing seller must be rejected");
        assert!(matches!(err, RepositoryError::ForeignKey { .. }));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemorySeedStore::new();
        let mut tx = store.begin().await.expect("begin");
        tx.insert_user(&new_user("admin")).await.expect("first");
        let err = tx
            .insert_user(&new_user("admin"))
            .await
            .expect_err("duplicate username");
        assert!(matches!(err, RepositoryError::Duplicate { .. }));
    }
}
