use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use eshop_core::config::{DataSource, Settings};
use eshop_core::db::{
    EntityKind, MemorySeedStore, MemoryTables, NewUser, SeedStore, SeedTransaction,
};
use eshop_core::error::{SeedError, SeedPhase};
use eshop_core::seed::passwords::PasswordConfig;
use eshop_core::seed::providers::CategoryDataProvider;
use eshop_core::seed::taxonomy::materialize;
use eshop_core::seed::{
    default_seeders, CategoryNode, CodeBasedCatalog, OrchestratorState, Providers, SeedOrchestrator,
    SeedProperties, SeededEntity, Seeder, SeederContext, UserRole,
};
use eshop_core::startup::run_on_startup;

/// Test profile with a cheap password hash.
fn test_settings() -> Settings {
    let mut settings = Settings::default().with_profiles(&["test"]);
    settings.password_config = PasswordConfig {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
        ..PasswordConfig::default()
    };
    settings
}

fn builtin() -> Arc<SeedProperties> {
    Arc::new(SeedProperties::builtin().expect("bundled seed file"))
}

fn total_rows(tables: &MemoryTables) -> usize {
    EntityKind::ALL.iter().map(|kind| tables.count(*kind)).sum()
}

async fn insert_existing_user(store: &MemorySeedStore, username: &str, role: UserRole) -> Result<()> {
    let mut tx = store.begin().await?;
    tx.insert_user(&NewUser {
        username: username.to_string(),
        email: None,
        password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string(),
        first_name: None,
        last_name: None,
        phone: None,
        address: None,
        role,
        seller_type: None,
    })
    .await?;
    tx.commit().await?;
    Ok(())
}

/// Records whether `seed` was ever called.
struct SpySeeder {
    kind: EntityKind,
    invoked: Arc<AtomicBool>,
}

#[async_trait]
impl Seeder for SpySeeder {
    fn name(&self) -> &'static str {
        "SpySeeder"
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn order(&self) -> i32 {
        1
    }

    async fn seed(
        &self,
        _tx: &mut dyn SeedTransaction,
        _context: &mut SeederContext,
    ) -> eshop_core::error::Result<Vec<SeededEntity>> {
        self.invoked.store(true, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

/// Stands in for the product seeder and always fails.
struct FailingProductSeeder;

#[async_trait]
impl Seeder for FailingProductSeeder {
    fn name(&self) -> &'static str {
        "ProductSeeder"
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Products
    }

    fn depends_on(&self) -> &'static [EntityKind] {
        &[EntityKind::Categories, EntityKind::Stores]
    }

    fn order(&self) -> i32 {
        6
    }

    async fn seed(
        &self,
        _tx: &mut dyn SeedTransaction,
        context: &mut SeederContext,
    ) -> eshop_core::error::Result<Vec<SeededEntity>> {
        assert!(!context.stores()?.is_empty());
        Err(SeedError::seeding(SeedPhase::Products, "simulated product failure"))
    }
}

#[tokio::test]
async fn fresh_database_is_fully_seeded() -> Result<()> {
    let store = MemorySeedStore::new();
    let mut orchestrator =
        SeedOrchestrator::with_default_seeders(Arc::new(store.clone()), test_settings(), builtin());

    let result = orchestrator.orchestrate().await?;
    assert!(result.successful);
    assert!(!result.skipped);
    assert_eq!(orchestrator.state(), OrchestratorState::Succeeded);

    let tables = store.snapshot().await;
    assert_eq!(result.total_seeded(), total_rows(&tables));
    assert_eq!(result.users_seeded(), 7);
    assert_eq!(result.categories_seeded(), tables.categories.len());
    assert_eq!(result.products_seeded(), 2);

    let expected_categories: usize = CodeBasedCatalog
        .category_hierarchy()
        .iter()
        .map(CategoryNode::total_node_count)
        .sum();
    assert_eq!(tables.categories.len(), expected_categories);
    assert_eq!(tables.stores.len(), 4);
    assert_eq!(tables.carts.len(), 2);
    assert_eq!(tables.product_tags.len(), 3);
    Ok(())
}

#[tokio::test]
async fn second_run_is_skipped() -> Result<()> {
    let store = Arc::new(MemorySeedStore::new());

    let first = SeedOrchestrator::with_default_seeders(store.clone(), test_settings(), builtin())
        .orchestrate()
        .await?;
    assert!(!first.skipped);
    let before = store.snapshot().await;

    let mut second = SeedOrchestrator::with_default_seeders(store.clone(), test_settings(), builtin());
    let result = second.orchestrate().await?;
    assert!(result.skipped);
    assert!(result.successful);
    assert_eq!(result.duration_ms, 0);
    assert_eq!(result.total_seeded(), 0);
    assert_eq!(second.state(), OrchestratorState::Skipped);

    let after = store.snapshot().await;
    assert_eq!(total_rows(&before), total_rows(&after));
    assert_eq!(before.users, after.users);
    Ok(())
}

#[tokio::test]
async fn populated_database_never_invokes_seeders() -> Result<()> {
    let store = MemorySeedStore::new();
    insert_existing_user(&store, "someone", UserRole::Customer).await?;

    let invoked = Arc::new(AtomicBool::new(false));
    let seeders: Vec<Box<dyn Seeder>> = vec![Box::new(SpySeeder {
        kind: EntityKind::Users,
        invoked: invoked.clone(),
    })];

    let result = SeedOrchestrator::new(Arc::new(store.clone()), test_settings(), builtin(), seeders)
        .orchestrate()
        .await?;

    assert!(result.skipped);
    assert!(!invoked.load(Ordering::SeqCst));
    assert_eq!(store.snapshot().await.users.len(), 1);
    Ok(())
}

#[tokio::test]
async fn anchor_covers_every_kind_without_a_user_seeder() -> Result<()> {
    let store = MemorySeedStore::new();
    let invoked = Arc::new(AtomicBool::new(false));

    // Seed one brand, then try again with only a spy on brands.
    let mut tx = store.begin().await?;
    tx.insert_brand(&eshop_core::db::NewBrand {
        name: "Acme".into(),
        description: None,
        logo_url: None,
    })
    .await?;
    tx.commit().await?;

    let seeders: Vec<Box<dyn Seeder>> = vec![Box::new(SpySeeder {
        kind: EntityKind::Brands,
        invoked: invoked.clone(),
    })];
    let result = SeedOrchestrator::new(Arc::new(store.clone()), test_settings(), builtin(), seeders)
        .orchestrate()
        .await?;

    assert!(result.skipped);
    assert!(!invoked.load(Ordering::SeqCst));
    Ok(())
}

#[tokio::test]
async fn product_failure_rolls_back_everything() -> Result<()> {
    let store = MemorySeedStore::new();
    let settings = test_settings();
    let properties = builtin();
    let providers = Providers::select(DataSource::Code, properties.clone());

    let mut seeders: Vec<Box<dyn Seeder>> = default_seeders(&settings, properties.clone(), &providers)
        .into_iter()
        .filter(|s| s.kind() != EntityKind::Products)
        .collect();
    seeders.push(Box::new(FailingProductSeeder));

    let mut orchestrator = SeedOrchestrator::new(Arc::new(store.clone()), settings, properties, seeders);
    let err = orchestrator.orchestrate().await.unwrap_err();

    assert_eq!(err.phase(), SeedPhase::Products);
    assert_eq!(orchestrator.state(), OrchestratorState::Failed);

    let tables = store.snapshot().await;
    assert_eq!(total_rows(&tables), 0);
    assert!(tables.categories.is_empty());
    assert!(tables.stores.is_empty());
    assert!(tables.products.is_empty());
    Ok(())
}

#[tokio::test]
async fn production_profile_is_refused_before_any_write() -> Result<()> {
    let store = MemorySeedStore::new();
    let settings = Settings::default().with_profiles(&["prod"]);

    let mut orchestrator = SeedOrchestrator::with_default_seeders(Arc::new(store.clone()), settings, builtin());
    let err = orchestrator.orchestrate().await.unwrap_err();

    assert!(matches!(err, SeedError::Security { ref active, .. } if active == &["prod".to_string()]));
    assert_eq!(err.phase(), SeedPhase::Configuration);
    assert_eq!(orchestrator.state(), OrchestratorState::Failed);
    assert_eq!(total_rows(&store.snapshot().await), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_properties_fail_before_the_transaction() -> Result<()> {
    let store = MemorySeedStore::new();
    let properties = SeedProperties::from_toml_str(
        r#"
        [[users]]
        username = "admin"
        [[users]]
        username = "admin"
        "#,
    )?;

    let mut orchestrator =
        SeedOrchestrator::with_default_seeders(Arc::new(store.clone()), test_settings(), Arc::new(properties));
    let err = orchestrator.orchestrate().await.unwrap_err();

    assert!(matches!(err, SeedError::Configuration(_)));
    assert_eq!(total_rows(&store.snapshot().await), 0);
    Ok(())
}

#[tokio::test]
async fn properties_source_seeds_the_configured_catalog() -> Result<()> {
    let store = MemorySeedStore::new();
    let mut settings = test_settings();
    settings.data_source = DataSource::Properties;

    let result = SeedOrchestrator::with_default_seeders(Arc::new(store.clone()), settings, builtin())
        .orchestrate()
        .await?;

    let tables = store.snapshot().await;
    assert_eq!(result.products_seeded(), 4);
    assert_eq!(tables.stores.len(), 3);
    assert!(tables.products.iter().any(|p| p.sku == "ORGANIC-APPLES"));

    let sports_shoes = tables
        .categories
        .iter()
        .find(|c| c.name == "Sports Shoes")
        .expect("nested category");
    assert_eq!(sports_shoes.slug, "fashion-footwear-sports-shoes");
    assert_eq!(sports_shoes.path, "Fashion > Footwear > Sports Shoes");
    assert_eq!(sports_shoes.depth, 2);
    Ok(())
}

#[tokio::test]
async fn disabled_user_seeding_reuses_existing_users() -> Result<()> {
    let store = MemorySeedStore::new();
    insert_existing_user(&store, "retail1", UserRole::Seller).await?;

    let mut properties = SeedProperties::builtin()?;
    properties.users_enabled = false;

    let result = SeedOrchestrator::with_default_seeders(Arc::new(store.clone()), test_settings(), Arc::new(properties))
        .orchestrate()
        .await?;
    assert!(!result.skipped);
    assert_eq!(result.users_seeded(), 0);

    let tables = store.snapshot().await;
    assert_eq!(tables.users.len(), 1);
    // Only the store whose seller exists is created.
    assert_eq!(tables.stores.len(), 1);
    assert_eq!(tables.stores[0].name, "Tech Retail Store");
    assert_eq!(tables.stores[0].seller_id, tables.users[0].id);
    assert!(tables.carts.is_empty());
    Ok(())
}

#[tokio::test]
async fn materialization_writes_parents_before_children() -> Result<()> {
    let store = MemorySeedStore::new();
    let root = CategoryNode::with_children("Electronics", &["Mobiles", "Laptops"]);

    let mut tx = store.begin().await?;
    let mut display_order = 0;
    let tree = materialize(tx.as_mut(), &root, &mut display_order).await?;
    tx.commit().await?;

    assert_eq!(tree.rows.len(), 3);
    assert_eq!(tree.leaves, 2);
    assert_eq!(display_order, 3);

    let electronics = &tree.rows[0];
    assert_eq!(electronics.parent_id, None);
    assert_eq!(electronics.slug, "electronics");
    assert_eq!(electronics.depth, 0);

    for (row, name) in tree.rows[1..].iter().zip(["Mobiles", "Laptops"]) {
        assert_eq!(row.name, name);
        assert_eq!(row.parent_id, Some(electronics.id));
        assert_eq!(row.depth, 1);
        assert_eq!(row.path, format!("Electronics > {name}"));
    }
    assert_eq!(tree.rows[1].slug, "electronics-mobiles");
    assert_eq!(tree.rows[2].display_order, 2);

    assert_eq!(store.snapshot().await.categories.len(), 3);
    Ok(())
}

#[tokio::test]
async fn category_cleanup_cascades_to_products() -> Result<()> {
    let store = MemorySeedStore::new();
    SeedOrchestrator::with_default_seeders(Arc::new(store.clone()), test_settings(), builtin())
        .orchestrate()
        .await?;

    let mut tx = store.begin().await?;
    tx.delete_all(EntityKind::Categories).await?;
    tx.commit().await?;

    let tables = store.snapshot().await;
    assert!(tables.categories.is_empty());
    assert!(tables.products.is_empty());
    assert!(tables.product_tags.is_empty());
    assert_eq!(tables.stores.len(), 4);
    Ok(())
}

#[tokio::test]
async fn startup_hook_respects_flag_and_profile() -> Result<()> {
    let store = MemorySeedStore::new();

    let mut disabled = test_settings();
    disabled.seed_enabled = false;
    assert!(run_on_startup(Arc::new(store.clone()), disabled, builtin()).await?.is_none());

    let prod = Settings::default().with_profiles(&["prod"]);
    assert!(run_on_startup(Arc::new(store.clone()), prod, builtin()).await?.is_none());
    assert_eq!(total_rows(&store.snapshot().await), 0);

    let seeded = run_on_startup(Arc::new(store.clone()), test_settings(), builtin()).await?;
    assert!(seeded.is_some_and(|r| r.successful && !r.skipped));
    Ok(())
}

#[tokio::test]
async fn startup_failure_is_fatal_only_in_dev_and_test() -> Result<()> {
    let invalid = Arc::new(SeedProperties::from_toml_str(
        r#"
        [[users]]
        username = "dup"
        [[users]]
        username = "dup"
        "#,
    )?);

    let local = Settings { active_profiles: vec!["local".into()], ..test_settings() };
    let outcome = run_on_startup(Arc::new(MemorySeedStore::new()), local, invalid.clone()).await?;
    assert!(outcome.is_none());

    let dev = test_settings().with_profiles(&["dev"]);
    let err = run_on_startup(Arc::new(MemorySeedStore::new()), dev, invalid).await.unwrap_err();
    assert!(matches!(err, SeedError::Configuration(_)));
    Ok(())
}

fn properties_settings() -> Settings {
    let mut settings = test_settings();
    settings.data_source = DataSource::Properties;
    settings
}

#[tokio::test]
async fn skipped_product_does_not_claim_its_sku() -> Result<()> {
    let properties = Arc::new(SeedProperties::from_toml_str(
        r#"
        [[users]]
        username = "retail1"
        role = "SELLER"

        [[categories]]
        name = "Electronics"

        [[shops]]
        shop_name = "Tech Retail Store"
        seller_username = "retail1"

        [[products]]
        name = "Phone typo"
        sku = "PHONE-1"
        price = "10.00"
        category_name = "Electronix"
        shop_name = "Tech Retail Store"

        [[products]]
        name = "Phone"
        sku = "PHONE-1"
        price = "10.00"
        category_name = "Electronics"
        shop_name = "Tech Retail Store"

        [[products]]
        name = "Phone again"
        sku = "PHONE-1"
        price = "12.00"
        category_name = "Electronics"
        shop_name = "Tech Retail Store"
        "#,
    )?);

    let store = MemorySeedStore::new();
    let result = SeedOrchestrator::with_default_seeders(Arc::new(store.clone()), properties_settings(), properties)
        .orchestrate()
        .await?;

    assert_eq!(result.products_seeded(), 1);
    let tables = store.snapshot().await;
    assert_eq!(tables.products.len(), 1);
    assert_eq!(tables.products[0].name, "Phone");
    Ok(())
}

#[tokio::test]
async fn catalog_without_users_is_seeded_once() -> Result<()> {
    let properties = Arc::new(SeedProperties::from_toml_str(
        r#"
        [[categories]]
        name = "Electronics"
        "#,
    )?);
    let store = Arc::new(MemorySeedStore::new());

    let first = SeedOrchestrator::with_default_seeders(store.clone(), properties_settings(), properties.clone())
        .orchestrate()
        .await?;
    assert!(!first.skipped);
    assert_eq!(first.users_seeded(), 0);
    let before = store.snapshot().await;
    assert_eq!(before.categories.len(), 1);

    let second = SeedOrchestrator::with_default_seeders(store.clone(), properties_settings(), properties)
        .orchestrate()
        .await?;
    assert!(second.skipped);
    assert_eq!(store.snapshot().await.categories, before.categories);
    Ok(())
}

#[tokio::test]
async fn category_details_reach_the_rows() -> Result<()> {
    let properties = Arc::new(SeedProperties::from_toml_str(
        r#"
        [[categories]]
        name = "Electronics"
        description = "Phones, computers and gadgets"
        image_url = "https://cdn.example.com/electronics.png"

        [[categories.children]]
        name = "Laptops"
        "#,
    )?);
    let store = MemorySeedStore::new();
    SeedOrchestrator::with_default_seeders(Arc::new(store.clone()), properties_settings(), properties)
        .orchestrate()
        .await?;

    let tables = store.snapshot().await;
    let electronics = tables.categories.iter().find(|c| c.name == "Electronics").expect("root");
    assert_eq!(electronics.description.as_deref(), Some("Phones, computers and gadgets"));
    assert_eq!(
        electronics.image_url.as_deref(),
        Some("https://cdn.example.com/electronics.png")
    );

    let laptops = tables.categories.iter().find(|c| c.name == "Laptops").expect("child");
    assert_eq!(laptops.description.as_deref(), Some("Laptops"));
    assert_eq!(laptops.image_url, None);
    Ok(())
}
