// crates/eshop-core/src/seed/orchestrator.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use super::context::SeederContext;
use super::plan::SeedPlan;
use super::properties::SeedProperties;
use super::providers::Providers;
use super::seeders::{default_seeders, Seeder};
use super::validation::SeedPropertiesValidator;
use crate::config::Settings;
use crate::db::{EntityKind, SeedStore, SeedTransaction};
use crate::error::{Result, SeedError, SeedPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    NotStarted,
    ValidatingEnvironment,
    ValidatingConfig,
    CheckingIdempotency,
    Skipped,
    Seeding,
    Succeeded,
    Failed,
}

/// Outcome of one seeding run.
#[derive(Debug, Clone, Serialize)]
pub struct SeedingResult {
    pub run_id: Uuid,
    pub successful: bool,
    pub skipped: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    /// Rows inserted, keyed by seeder name.
    pub seeder_counts: BTreeMap<String, usize>,
    pub failure_reason: Option<String>,
}

impl SeedingResult {
    fn skipped(run_id: Uuid, start_time: DateTime<Utc>) -> Self {
        Self {
            run_id,
            successful: true,
            skipped: true,
            start_time,
            end_time: start_time,
            duration_ms: 0,
            seeder_counts: BTreeMap::new(),
            failure_reason: None,
        }
    }

    fn finished(
        run_id: Uuid,
        start_time: DateTime<Utc>,
        started: Instant,
        seeder_counts: BTreeMap<String, usize>,
        failure: Option<&SeedError>,
    ) -> Self {
        Self {
            run_id,
            successful: failure.is_none(),
            skipped: false,
            start_time,
            end_time: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
            seeder_counts,
            failure_reason: failure.map(ToString::to_string),
        }
    }

    pub fn count_for(&self, seeder: &str) -> usize {
        self.seeder_counts.get(seeder).copied().unwrap_or(0)
    }

    pub fn users_seeded(&self) -> usize {
        self.count_for("UserSeeder")
    }

    pub fn categories_seeded(&self) -> usize {
        self.count_for("CategorySeeder")
    }

    pub fn products_seeded(&self) -> usize {
        self.count_for("ProductSeeder")
    }

    pub fn total_seeded(&self) -> usize {
        self.seeder_counts.values().sum()
    }
}

impl fmt::Display for SeedingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped {
            return write!(f, "seeding run {} skipped: database already populated", self.run_id);
        }
        if let Some(reason) = &self.failure_reason {
            return write!(
                f,
                "seeding run {} failed after {} ms: {reason}",
                self.run_id, self.duration_ms
            );
        }
        write!(
            f,
            "seeding run {} succeeded in {} ms: {} rows",
            self.run_id,
            self.duration_ms,
            self.total_seeded()
        )?;
        for (seeder, count) in &self.seeder_counts {
            write!(f, ", {seeder}={count}")?;
        }
        Ok(())
    }
}

/// Runs the seeders against a store: environment guard, validation,
/// idempotency check, then every seeder inside one transaction.
pub struct SeedOrchestrator {
    store: Arc<dyn SeedStore>,
    settings: Settings,
    properties: Arc<SeedProperties>,
    seeders: Vec<Box<dyn Seeder>>,
    state: OrchestratorState,
}

impl SeedOrchestrator {
    pub fn new(
        store: Arc<dyn SeedStore>,
        settings: Settings,
        properties: Arc<SeedProperties>,
        seeders: Vec<Box<dyn Seeder>>,
    ) -> Self {
        Self {
            store,
            settings,
            properties,
            seeders,
            state: OrchestratorState::NotStarted,
        }
    }

    /// The standard seeders, reading from the data source in `settings`.
    pub fn with_default_seeders(
        store: Arc<dyn SeedStore>,
        settings: Settings,
        properties: Arc<SeedProperties>,
    ) -> Self {
        let providers = Providers::select(settings.data_source, properties.clone());
        let seeders = default_seeders(&settings, properties.clone(), &providers);
        Self::new(store, settings, properties, seeders)
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub async fn orchestrate(&mut self) -> Result<SeedingResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("seed_run", %run_id);
        self.run(run_id).instrument(span).await
    }

    async fn run(&mut self, run_id: Uuid) -> Result<SeedingResult> {
        let start_time = Utc::now();
        let started = Instant::now();
        let state = &mut self.state;

        transition(state, OrchestratorState::ValidatingEnvironment);
        if !self.settings.seeding_allowed() {
            transition(state, OrchestratorState::Failed);
            let err = SeedError::Security {
                active: self.settings.active_profiles.clone(),
                allowed: self.settings.allowed_profiles.clone(),
            };
            error!(error = %err, "Refusing to seed");
            return Err(err);
        }

        transition(state, OrchestratorState::ValidatingConfig);
        let plan = match SeedPropertiesValidator
            .validate(&self.properties)
            .and_then(|_| SeedPlan::build(&self.seeders))
        {
            Ok(plan) => plan,
            Err(err) => {
                transition(state, OrchestratorState::Failed);
                error!(phase = %err.phase(), error = %err, "Seed configuration invalid");
                return Err(err);
            }
        };
        debug!(plan = ?plan.names(), "Seed plan built");

        transition(state, OrchestratorState::CheckingIdempotency);
        for kind in idempotency_anchor(plan.steps()) {
            let count = match self.store.count(kind).await {
                Ok(count) => count,
                Err(err) => {
                    transition(state, OrchestratorState::Failed);
                    return Err(err.into());
                }
            };
            if count > 0 {
                transition(state, OrchestratorState::Skipped);
                info!(%kind, count, "Database already populated, skipping seeding");
                return Ok(SeedingResult::skipped(run_id, start_time));
            }
        }

        transition(state, OrchestratorState::Seeding);
        info!(plan = ?plan.names(), "Starting database seeding");

        let mut tx = match self.store.begin().await {
            Ok(tx) => tx,
            Err(err) => {
                transition(state, OrchestratorState::Failed);
                return Err(err.into());
            }
        };

        let mut counts = BTreeMap::new();
        let outcome = execute(&plan, tx.as_mut(), &mut counts).await;

        match outcome {
            Ok(()) => {
                if let Err(err) = tx.commit().await {
                    transition(state, OrchestratorState::Failed);
                    return Err(err.into());
                }
                transition(state, OrchestratorState::Succeeded);
                let result = SeedingResult::finished(run_id, start_time, started, counts, None);
                info!(
                    duration_ms = result.duration_ms,
                    total = result.total_seeded(),
                    counts = ?result.seeder_counts,
                    "Database seeding completed"
                );
                Ok(result)
            }
            Err(err) => {
                transition(state, OrchestratorState::Failed);
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Rollback after seeding failure failed");
                }
                let result = SeedingResult::finished(run_id, start_time, started, counts, Some(&err));
                error!(phase = %err.phase(), result = %result, "Database seeding failed, rolled back");
                Err(err)
            }
        }
    }
}

fn transition(state: &mut OrchestratorState, next: OrchestratorState) {
    debug!(from = ?*state, to = ?next, "Orchestrator state change");
    *state = next;
}

/// Kinds whose presence means the database was already seeded: users when a
/// seeder replaces them, otherwise every kind the plan replaces.
fn idempotency_anchor(steps: &[&dyn Seeder]) -> Vec<EntityKind> {
    let replaces_users = steps
        .iter()
        .any(|s| s.kind() == EntityKind::Users && s.replaces_existing());
    if replaces_users {
        return vec![EntityKind::Users];
    }
    steps
        .iter()
        .filter(|s| s.replaces_existing())
        .map(|s| s.kind())
        .collect()
}

async fn execute(
    plan: &SeedPlan<'_>,
    tx: &mut dyn SeedTransaction,
    counts: &mut BTreeMap<String, usize>,
) -> Result<()> {
    let mut context = SeederContext::new();

    for seeder in plan.steps() {
        let phase = SeedPhase::for_kind(seeder.kind());
        debug!(seeder = seeder.name(), "Cleaning up");
        seeder.cleanup(tx).await.map_err(|e| tag(e, phase))?;

        let seeded = seeder.seed(tx, &mut context).await.map_err(|e| tag(e, phase))?;
        context.mark_populated(seeder.kind());
        info!(seeder = seeder.name(), count = seeded.len(), "Seeder finished");
        counts.insert(seeder.name().to_string(), seeded.len());
    }

    Ok(())
}

/// Attaches the running phase to persistence errors a seeder did not tag.
fn tag(err: SeedError, phase: SeedPhase) -> SeedError {
    match err {
        SeedError::Repository(source) => SeedError::in_phase(phase, source),
        other => other,
    }
}
