// crates/eshop-core/src/seed/plan.rs

use std::collections::{BTreeSet, HashMap};

use crate::db::EntityKind;
use crate::error::{Result, SeedError};

use super::seeders::Seeder;

/// Seeders in execution order: every seeder runs after the seeders of the
/// kinds it depends on. Among ready seeders the lower `order()` goes first,
/// then the name.
pub struct SeedPlan<'a> {
    steps: Vec<&'a dyn Seeder>,
}

impl<'a> SeedPlan<'a> {
    pub fn build(seeders: &'a [Box<dyn Seeder>]) -> Result<Self> {
        let mut providers: HashMap<EntityKind, usize> = HashMap::new();
        for (index, seeder) in seeders.iter().enumerate() {
            if let Some(previous) = providers.insert(seeder.kind(), index) {
                return Err(SeedError::Configuration(format!(
                    "seeders '{}' and '{}' both seed {}",
                    seeders[previous].name(),
                    seeder.name(),
                    seeder.kind()
                )));
            }
        }

        let mut in_degree = vec![0usize; seeders.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); seeders.len()];
        for (index, seeder) in seeders.iter().enumerate() {
            for dependency in seeder.depends_on() {
                let Some(&provider) = providers.get(dependency) else {
                    return Err(SeedError::Configuration(format!(
                        "seeder '{}' depends on {dependency} but no seeder provides it",
                        seeder.name()
                    )));
                };
                dependents[provider].push(index);
                in_degree[index] += 1;
            }
        }

        let key = |index: usize| (seeders[index].order(), seeders[index].name(), index);
        let mut ready: BTreeSet<(i32, &str, usize)> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(index, _)| key(index))
            .collect();

        let mut steps = Vec::with_capacity(seeders.len());
        while let Some((_, _, index)) = ready.pop_first() {
            steps.push(seeders[index].as_ref());
            for &dependent in &dependents[index] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(key(dependent));
                }
            }
        }

        if steps.len() < seeders.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .enumerate()
                .filter(|(_, degree)| **degree > 0)
                .map(|(index, _)| seeders[index].name())
                .collect();
            return Err(SeedError::Configuration(format!(
                "seeder dependency cycle among: {}",
                stuck.join(", ")
            )));
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[&'a dyn Seeder] {
        &self.steps
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn kinds(&self) -> Vec<EntityKind> {
        self.steps.iter().map(|s| s.kind()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SeedTransaction;
    use crate::seed::context::SeederContext;
    use crate::seed::seeders::SeededEntity;
    use async_trait::async_trait;

    struct Fake {
        name: &'static str,
        kind: EntityKind,
        deps: &'static [EntityKind],
        order: i32,
    }

    #[async_trait]
    impl Seeder for Fake {
        fn name(&self) -> &'static str {
            self.name
        }
        fn kind(&self) -> EntityKind {
            self.kind
        }
        fn depends_on(&self) -> &'static [EntityKind] {
            self.deps
        }
        fn order(&self) -> i32 {
            self.order
        }
        async fn seed(
            &self,
            _tx: &mut dyn SeedTransaction,
            _context: &mut SeederContext,
        ) -> Result<Vec<SeededEntity>> {
            Ok(Vec::new())
        }
    }

    fn fake(
        name: &'static str,
        kind: EntityKind,
        deps: &'static [EntityKind],
        order: i32,
    ) -> Box<dyn Seeder> {
        Box::new(Fake { name, kind, deps, order })
    }

    #[test]
    fn dependencies_win_over_priority() {
        let seeders = vec![
            fake("products", EntityKind::Products, &[EntityKind::Stores, EntityKind::Categories], 0),
            fake("stores", EntityKind::Stores, &[EntityKind::Users], 1),
            fake("categories", EntityKind::Categories, &[], 5),
            fake("users", EntityKind::Users, &[], 9),
        ];
        let plan = SeedPlan::build(&seeders).unwrap();
        assert_eq!(plan.names(), vec!["categories", "users", "stores", "products"]);
    }

    #[test]
    fn missing_dependency_is_rejected() {
        let seeders = vec![fake("stores", EntityKind::Stores, &[EntityKind::Users], 1)];
        let err = SeedPlan::build(&seeders).err().unwrap();
        assert!(matches!(err, SeedError::Configuration(ref m) if m.contains("users")));
    }

    #[test]
    fn cycles_are_rejected() {
        let seeders = vec![
            fake("a", EntityKind::Brands, &[EntityKind::Tags], 1),
            fake("b", EntityKind::Tags, &[EntityKind::Brands], 2),
            fake("c", EntityKind::Users, &[], 3),
        ];
        let err = SeedPlan::build(&seeders).err().unwrap();
        assert!(matches!(err, SeedError::Configuration(ref m) if m.contains("cycle")));
    }

    #[test]
    fn two_seeders_for_one_kind_are_rejected() {
        let seeders = vec![
            fake("a", EntityKind::Users, &[], 1),
            fake("b", EntityKind::Users, &[], 2),
        ];
        assert!(SeedPlan::build(&seeders).is_err());
    }
}
