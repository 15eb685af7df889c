// crates/eshop-core/src/seed/properties.rs

//! Seed data configuration, read from TOML.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidateEmail, ValidationError};

use super::model::CategoryNode;
use crate::error::{Result, SeedError};

const BUILTIN_SEED_FILE: &str = include_str!("../../seed-data/seed.toml");

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct SeedProperties {
    /// When false, existing users are kept and loaded instead of re-created.
    pub users_enabled: bool,
    /// Plain-text passwords keyed by lower-case username.
    pub passwords: BTreeMap<String, String>,
    #[validate(nested)]
    pub users: Vec<UserSeed>,
    #[validate(nested)]
    pub categories: Vec<CategorySeed>,
    #[validate(nested)]
    pub brands: Vec<BrandSeed>,
    #[validate(nested)]
    pub tags: Vec<TagSeed>,
    #[validate(nested)]
    pub shops: Vec<ShopSeed>,
    #[validate(nested)]
    pub products: Vec<ProductSeed>,
}

impl Default for SeedProperties {
    fn default() -> Self {
        Self {
            users_enabled: true,
            passwords: BTreeMap::new(),
            users: Vec::new(),
            categories: Vec::new(),
            brands: Vec::new(),
            tags: Vec::new(),
            shops: Vec::new(),
            products: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserSeed {
    #[validate(
        length(max = 100, message = "username is too long"),
        custom(function = "not_blank")
    )]
    pub username: String,
    #[validate(custom(function = "email_if_present"))]
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub seller_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategorySeed {
    #[validate(
        length(min = 2, max = 100, message = "category name must be 2-100 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub children: Vec<CategorySeed>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BrandSeed {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TagSeed {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShopSeed {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub shop_name: String,
    pub seller_username: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(custom(function = "email_if_present"))]
    pub email: Option<String>,
    pub logo_url: Option<String>,
    pub seller_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "discount_not_above_price"))]
pub struct ProductSeed {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub name: String,
    pub description: Option<String>,
    pub sku: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub discount_price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(custom(function = "not_blank"))]
    pub category_name: String,
    pub brand_name: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub shop_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::from("must not be blank")));
    }
    Ok(())
}

fn email_if_present(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message(Cow::from("must be a valid email address")))
    }
}

fn non_negative(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative").with_message(Cow::from("must not be negative")));
    }
    Ok(())
}

fn discount_not_above_price(product: &ProductSeed) -> std::result::Result<(), ValidationError> {
    match product.discount_price {
        Some(discount) if discount > product.price => Err(ValidationError::new("discount")
            .with_message(Cow::from("discount price must not exceed price"))),
        _ => Ok(()),
    }
}

impl SeedProperties {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SeedError::Configuration(format!("failed to parse seed properties: {e}")))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SeedError::Configuration(format!(
                "failed to read seed properties at '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// The seed file bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_SEED_FILE)
    }

    /// Loads `path` when given, the bundled file otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    /// Every category name configured, at any level of nesting.
    pub fn category_names(&self) -> HashSet<&str> {
        let mut names = HashSet::new();
        let mut stack: Vec<&CategorySeed> = self.categories.iter().collect();
        while let Some(category) = stack.pop() {
            names.insert(category.name.as_str());
            stack.extend(category.children.iter());
        }
        names
    }

    pub fn category_nodes(&self) -> Vec<CategoryNode> {
        self.categories.iter().map(CategorySeed::to_node).collect()
    }
}

impl CategorySeed {
    /// Names are checked by the validators, not here.
    pub fn to_node(&self) -> CategoryNode {
        let children = self.children.iter().map(CategorySeed::to_node).collect();
        CategoryNode::of(self.name.clone(), children)
            .with_details(self.description.clone(), self.image_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_seed_file_parses_and_validates() {
        let properties = SeedProperties::builtin().expect("bundled seed file");
        assert!(properties.users_enabled);
        assert!(!properties.users.is_empty());
        assert!(properties.validate().is_ok());
    }

    #[test]
    fn nested_categories_are_read_as_a_tree() {
        let properties = SeedProperties::from_toml_str(
            r#"
            [[categories]]
            name = "Electronics"

            [[categories.children]]
            name = "Mobiles"

            [[categories.children]]
            name = "Laptops"
            "#,
        )
        .expect("parse");

        let nodes = properties.category_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].total_node_count(), 3);
        assert!(properties.category_names().contains("Laptops"));
    }

    #[test]
    fn field_rules_reject_blank_username_and_bad_email() {
        let properties = SeedProperties::from_toml_str(
            r#"
            [[users]]
            username = "  "
            email = "not-an-email"
            "#,
        )
        .expect("parse");

        let errors = properties.validate().expect_err("invalid users");
        let message = errors.to_string();
        assert!(message.contains("username"));
        assert!(message.contains("email"));
    }

    #[test]
    fn blank_email_is_allowed() {
        let properties = SeedProperties::from_toml_str(
            r#"
            [[users]]
            username = "customer1"
            email = ""
            "#,
        )
        .expect("parse");
        assert!(properties.validate().is_ok());
    }

    #[test]
    fn discount_above_price_is_rejected() {
        let properties = SeedProperties::from_toml_str(
            r#"
            [[products]]
            name = "Nike Air Max"
            price = "120.00"
            discount_price = "150.00"
            category_name = "Sports Shoes"
            shop_name = "Tech Retail Store"
            "#,
        )
        .expect("parse");
        assert!(properties.validate().is_err());
    }
}
