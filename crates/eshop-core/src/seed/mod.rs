// crates/eshop-core/src/seed/mod.rs

pub mod context;
pub mod model;
pub mod orchestrator;
pub mod passwords;
pub mod plan;
pub mod properties;
pub mod providers;
pub mod seeders;
pub mod taxonomy;
pub mod validation;

pub use context::SeederContext;
pub use model::{BrandData, CategoryNode, ProductData, SellerType, StoreData, TagData, UserRole};
pub use orchestrator::{OrchestratorState, SeedOrchestrator, SeedingResult};
pub use properties::SeedProperties;
pub use providers::{CodeBasedCatalog, PropertiesCatalog, Providers};
pub use seeders::{default_seeders, SeededEntity, Seeder};
