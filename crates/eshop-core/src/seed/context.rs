// crates/eshop-core/src/seed/context.rs

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::warn;

use crate::db::{BrandRecord, CategoryRecord, EntityKind, StoreRecord, TagRecord, UserRecord};
use crate::error::{Result, SeedError, SeedPhase};

/// Name-keyed records of one kind.
#[derive(Debug)]
struct Registry<T> {
    kind: EntityKind,
    entries: HashMap<String, T>,
    populated: bool,
}

impl<T> Registry<T> {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
            populated: false,
        }
    }

    fn insert(&mut self, name: &str, record: T) -> bool {
        self.populated = true;
        match self.entries.entry(name.to_string()) {
            Entry::Occupied(_) => {
                warn!(kind = %self.kind, name, "Duplicate name, keeping first");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    fn entries(&self) -> Result<&HashMap<String, T>> {
        if !self.populated {
            return Err(SeedError::seeding(
                SeedPhase::Orchestration,
                format!("{} requested before they were seeded", self.kind),
            ));
        }
        Ok(&self.entries)
    }
}

/// Entities created so far in one seeding run, so later seeders can resolve
/// references by name.
#[derive(Debug)]
pub struct SeederContext {
    users: Registry<UserRecord>,
    categories: Registry<CategoryRecord>,
    brands: Registry<BrandRecord>,
    tags: Registry<TagRecord>,
    stores: Registry<StoreRecord>,
}

impl Default for SeederContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SeederContext {
    pub fn new() -> Self {
        Self {
            users: Registry::new(EntityKind::Users),
            categories: Registry::new(EntityKind::Categories),
            brands: Registry::new(EntityKind::Brands),
            tags: Registry::new(EntityKind::Tags),
            stores: Registry::new(EntityKind::Stores),
        }
    }

    /// Marks `kind` as seeded even if nothing was registered for it.
    pub fn mark_populated(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Users => self.users.populated = true,
            EntityKind::Categories => self.categories.populated = true,
            EntityKind::Brands => self.brands.populated = true,
            EntityKind::Tags => self.tags.populated = true,
            EntityKind::Stores => self.stores.populated = true,
            EntityKind::Products | EntityKind::Carts => {}
        }
    }

    pub fn is_populated(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Users => self.users.populated,
            EntityKind::Categories => self.categories.populated,
            EntityKind::Brands => self.brands.populated,
            EntityKind::Tags => self.tags.populated,
            EntityKind::Stores => self.stores.populated,
            EntityKind::Products | EntityKind::Carts => false,
        }
    }

    /// Returns false when a user with the same name was already registered.
    pub fn add_user(&mut self, user: UserRecord) -> bool {
        let name = user.username.clone();
        self.users.insert(&name, user)
    }

    pub fn add_category(&mut self, category: CategoryRecord) -> bool {
        let name = category.name.clone();
        self.categories.insert(&name, category)
    }

    pub fn add_brand(&mut self, brand: BrandRecord) -> bool {
        let name = brand.name.clone();
        self.brands.insert(&name, brand)
    }

    pub fn add_tag(&mut self, tag: TagRecord) -> bool {
        let name = tag.name.clone();
        self.tags.insert(&name, tag)
    }

    pub fn add_store(&mut self, store: StoreRecord) -> bool {
        let name = store.name.clone();
        self.stores.insert(&name, store)
    }

    pub fn users(&self) -> Result<&HashMap<String, UserRecord>> {
        self.users.entries()
    }

    pub fn categories(&self) -> Result<&HashMap<String, CategoryRecord>> {
        self.categories.entries()
    }

    pub fn brands(&self) -> Result<&HashMap<String, BrandRecord>> {
        self.brands.entries()
    }

    pub fn tags(&self) -> Result<&HashMap<String, TagRecord>> {
        self.tags.entries()
    }

    pub fn stores(&self) -> Result<&HashMap<String, StoreRecord>> {
        self.stores.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn brand(name: &str) -> BrandRecord {
        BrandRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn reading_an_unpopulated_kind_fails() {
        let context = SeederContext::new();
        let err = context.stores().unwrap_err();
        assert_eq!(err.phase(), SeedPhase::Orchestration);
    }

    #[test]
    fn marked_kind_is_readable_when_empty() {
        let mut context = SeederContext::new();
        context.mark_populated(EntityKind::Tags);
        assert!(context.tags().unwrap().is_empty());
    }

    #[test]
    fn first_registration_wins() {
        let mut context = SeederContext::new();
        let first = brand("Nike");
        assert!(context.add_brand(first.clone()));
        assert!(!context.add_brand(brand("Nike")));
        assert_eq!(context.brands().unwrap()["Nike"].id, first.id);
    }
}
