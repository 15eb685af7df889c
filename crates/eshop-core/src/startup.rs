// crates/eshop-core/src/startup.rs

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Settings;
use crate::db::SeedStore;
use crate::error::Result;
use crate::seed::{SeedOrchestrator, SeedProperties, SeedingResult};

/// Seeds the database when the process starts.
///
/// Returns `Ok(None)` without touching the store when seeding is disabled or
/// no active profile allows it. A failed run is returned as an error when a
/// `dev` or `test` profile is active and only logged otherwise.
pub async fn run_on_startup(
    store: Arc<dyn SeedStore>,
    settings: Settings,
    properties: Arc<SeedProperties>,
) -> Result<Option<SeedingResult>> {
    if !settings.seed_enabled {
        info!("Startup seeding disabled");
        return Ok(None);
    }
    if !settings.seeding_allowed() {
        info!(profiles = ?settings.active_profiles, "No seeding profile active, skipping startup seeding");
        return Ok(None);
    }

    let fail_fast = settings.fail_fast();
    let mut orchestrator = SeedOrchestrator::with_default_seeders(store, settings, properties);

    match orchestrator.orchestrate().await {
        Ok(result) => {
            info!(%result, "Startup seeding finished");
            Ok(Some(result))
        }
        Err(err) if fail_fast => {
            error!(phase = %err.phase(), error = %err, "Startup seeding failed");
            Err(err)
        }
        Err(err) => {
            warn!(phase = %err.phase(), error = %err, "Startup seeding failed, continuing");
            Ok(None)
        }
    }
}
