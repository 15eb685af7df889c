use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::seed::model::{SellerType, UserRole};

pub mod memory;
pub mod postgres;

pub use memory::{MemorySeedStore, MemoryTables};
pub use postgres::PgSeedStore;

pub type DbPool = Pool<Postgres>;

/// Establish a new Postgres connection pool using sensible defaults for the
/// seeding tools.
pub async fn connect(database_url: &str) -> Result<DbPool, RepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run database migrations embedded at compile-time.
pub async fn run_migrations(pool: &DbPool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Every table the seeders write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Categories,
    Brands,
    Tags,
    Stores,
    Products,
    Carts,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Users,
        EntityKind::Categories,
        EntityKind::Brands,
        EntityKind::Tags,
        EntityKind::Stores,
        EntityKind::Products,
        EntityKind::Carts,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Categories => "categories",
            EntityKind::Brands => "brands",
            EntityKind::Tags => "tags",
            EntityKind::Stores => "stores",
            EntityKind::Products => "products",
            EntityKind::Carts => "carts",
        }
    }

    /// Kinds holding a foreign key to this one. Truncating this kind empties
    /// them as well.
    pub fn referenced_by(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Users => &[EntityKind::Stores, EntityKind::Carts],
            EntityKind::Categories => &[EntityKind::Products],
            EntityKind::Brands => &[EntityKind::Products],
            EntityKind::Stores => &[EntityKind::Products],
            EntityKind::Tags | EntityKind::Products | EntityKind::Carts => &[],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub seller_type: Option<SellerType>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub seller_type: Option<SellerType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub slug: String,
    pub path: String,
    pub depth: i32,
    pub display_order: i32,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub slug: String,
    pub path: String,
    pub depth: i32,
    pub display_order: i32,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandRecord {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewBrand {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreRecord {
    pub id: Uuid,
    pub name: String,
    pub seller_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub seller_id: Uuid,
    pub description: Option<String>,
    pub seller_type: Option<SellerType>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category_id: Uuid,
    pub store_id: Uuid,
    pub brand_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock_quantity: i32,
    pub category_id: Uuid,
    pub store_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub tag_ids: Vec<Uuid>,
    pub featured: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartRecord {
    pub id: Uuid,
    pub user_id: Uuid,
}

/// Entry point to the database the seeders write to.
#[async_trait]
pub trait SeedStore: Send + Sync {
    async fn count(&self, kind: EntityKind) -> Result<i64, RepositoryError>;

    /// Opens the single transaction a seeding run writes through.
    async fn begin(&self) -> Result<Box<dyn SeedTransaction>, RepositoryError>;
}

/// Writes performed by seeders. Nothing is visible outside the transaction
/// until `commit`; dropping it without committing discards every write.
#[async_trait]
pub trait SeedTransaction: Send {
    /// Removes every row of `kind` and of the kinds referencing it.
    async fn delete_all(&mut self, kind: EntityKind) -> Result<(), RepositoryError>;

    async fn load_users(&mut self) -> Result<Vec<UserRecord>, RepositoryError>;

    async fn insert_user(&mut self, user: &NewUser) -> Result<UserRecord, RepositoryError>;

    async fn insert_category(
        &mut self,
        category: &NewCategory,
    ) -> Result<CategoryRecord, RepositoryError>;

    async fn insert_brand(&mut self, brand: &NewBrand) -> Result<BrandRecord, RepositoryError>;

    async fn insert_tag(&mut self, tag: &NewTag) -> Result<TagRecord, RepositoryError>;

    async fn insert_store(&mut self, store: &NewStore) -> Result<StoreRecord, RepositoryError>;

    async fn insert_product(
        &mut self,
        product: &NewProduct,
    ) -> Result<ProductRecord, RepositoryError>;

    async fn insert_cart(&mut self, user_id: Uuid) -> Result<CartRecord, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
