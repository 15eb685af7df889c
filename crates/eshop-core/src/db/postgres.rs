//! Postgres-backed seed store.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Postgres, Row, Transaction};
use uuid::Uuid;

use super::{
    BrandRecord, CartRecord, CategoryRecord, DbPool, EntityKind, NewBrand, NewCategory,
    NewProduct, NewStore, NewTag, NewUser, ProductRecord, SeedStore, SeedTransaction,
    StoreRecord, TagRecord, UserRecord,
};
use crate::error::RepositoryError;
use crate::seed::model::{SellerType, UserRole};

#[derive(Clone)]
pub struct PgSeedStore {
    pool: DbPool,
}

impl PgSeedStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SeedStore for PgSeedStore {
    async fn count(&self, kind: EntityKind) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn begin(&self) -> Result<Box<dyn SeedTransaction>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSeedTransaction { tx }))
    }
}

pub struct PgSeedTransaction {
    tx: Transaction<'static, Postgres>,
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, RepositoryError> {
    let role: String = row.try_get("role")?;
    let role = UserRole::parse(&role).ok_or(RepositoryError::InvalidValue {
        column: "users.role",
        value: role,
    })?;
    let seller_type: Option<String> = row.try_get("seller_type")?;
    let seller_type = match seller_type {
        Some(value) => Some(SellerType::parse(&value).ok_or(RepositoryError::InvalidValue {
            column: "users.seller_type",
            value,
        })?),
        None => None,
    };

    Ok(UserRecord {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        role,
        seller_type,
    })
}

#[async_trait]
impl SeedTransaction for PgSeedTransaction {
    async fn delete_all(&mut self, kind: EntityKind) -> Result<(), RepositoryError> {
        let sql = format!("TRUNCATE TABLE {} CASCADE", kind.table());
        sqlx::query(&sql).execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn load_users(&mut self) -> Result<Vec<UserRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, username, email, role, seller_type FROM users ORDER BY username",
        )
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn insert_user(&mut self, user: &NewUser) -> Result<UserRecord, RepositoryError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, first_name, last_name,
                phone, address, role, seller_type, active, email_verified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, TRUE)
            "#,
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.role.as_str())
        .bind(user.seller_type.map(|t| t.as_str()))
        .execute(&mut *self.tx)
        .await?;

        Ok(UserRecord {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            seller_type: user.seller_type,
        })
    }

    async fn insert_category(
        &mut self,
        category: &NewCategory,
    ) -> Result<CategoryRecord, RepositoryError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO categories (
                id, name, description, image_url, slug, path, depth, display_order,
                parent_id, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
            "#,
        )
        .bind(id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.image_url)
        .bind(&category.slug)
        .bind(&category.path)
        .bind(category.depth)
        .bind(category.display_order)
        .bind(category.parent_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(CategoryRecord {
            id,
            name: category.name.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone(),
            slug: category.slug.clone(),
            path: category.path.clone(),
            depth: category.depth,
            display_order: category.display_order,
            parent_id: category.parent_id,
        })
    }

    async fn insert_brand(&mut self, brand: &NewBrand) -> Result<BrandRecord, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO brands (id, name, description, logo_url, active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&brand.name)
        .bind(&brand.description)
        .bind(&brand.logo_url)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(BrandRecord {
            id,
            name: brand.name.clone(),
        })
    }

    async fn insert_tag(&mut self, tag: &NewTag) -> Result<TagRecord, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO tags (id, name, slug) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&tag.name)
        .bind(&tag.slug)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(TagRecord {
            id,
            name: tag.name.clone(),
        })
    }

    async fn insert_store(&mut self, store: &NewStore) -> Result<StoreRecord, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO stores (
                id, name, seller_id, description, seller_type, address, phone, email, logo_url, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&store.name)
        .bind(store.seller_id)
        .bind(&store.description)
        .bind(store.seller_type.map(|t| t.as_str()))
        .bind(&store.address)
        .bind(&store.phone)
        .bind(&store.email)
        .bind(&store.logo_url)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(StoreRecord {
            id,
            name: store.name.clone(),
            seller_id: store.seller_id,
        })
    }

    async fn insert_product(
        &mut self,
        product: &NewProduct,
    ) -> Result<ProductRecord, RepositoryError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO products (
                id, name, sku, description, price, discount_price, stock_quantity,
                category_id, store_id, brand_id, featured, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.discount_price)
        .bind(product.stock_quantity)
        .bind(product.category_id)
        .bind(product.store_id)
        .bind(product.brand_id)
        .bind(product.featured)
        .bind(if product.active { "ACTIVE" } else { "INACTIVE" })
        .fetch_one(&mut *self.tx)
        .await?;

        for tag_id in &product.tag_ids {
            sqlx::query(
                r#"
                INSERT INTO product_tags (product_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(tag_id)
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(ProductRecord {
            id,
            name: product.name.clone(),
            sku: product.sku.clone(),
            category_id: product.category_id,
            store_id: product.store_id,
            brand_id: product.brand_id,
        })
    }

    async fn insert_cart(&mut self, user_id: Uuid) -> Result<CartRecord, RepositoryError> {
        let id: Uuid =
            sqlx::query_scalar("INSERT INTO carts (id, user_id) VALUES ($1, $2) RETURNING id")
                .bind(Uuid::new_v4())
                .bind(user_id)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(CartRecord { id, user_id })
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}
