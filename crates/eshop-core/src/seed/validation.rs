// crates/eshop-core/src/seed/validation.rs

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::warn;
use validator::Validate;

use super::model::CategoryNode;
use super::properties::SeedProperties;
use crate::config::DEFAULT_MAX_CATEGORY_DEPTH;
use crate::error::{Result, SeedError};

/// A cross-record reference that does not resolve. Reported, never fatal:
/// the seeder that consumes the record skips or drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceWarning {
    MissingSeller { shop: String },
    UnknownSeller { shop: String, seller: String },
    UnknownCategory { product: String, category: String },
    UnknownShop { product: String, shop: String },
    UnknownBrand { product: String, brand: String },
    UnknownTag { product: String, tag: String },
}

impl fmt::Display for ReferenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceWarning::MissingSeller { shop } => {
                write!(f, "shop '{shop}' has no seller username")
            }
            ReferenceWarning::UnknownSeller { shop, seller } => {
                write!(f, "shop '{shop}' references unknown seller '{seller}'")
            }
            ReferenceWarning::UnknownCategory { product, category } => {
                write!(f, "product '{product}' references unknown category '{category}'")
            }
            ReferenceWarning::UnknownShop { product, shop } => {
                write!(f, "product '{product}' references unknown shop '{shop}'")
            }
            ReferenceWarning::UnknownBrand { product, brand } => {
                write!(f, "product '{product}' references unknown brand '{brand}'")
            }
            ReferenceWarning::UnknownTag { product, tag } => {
                write!(f, "product '{product}' references unknown tag '{tag}'")
            }
        }
    }
}

/// Structural and cross-record checks on seed properties, run before any write.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeedPropertiesValidator;

impl SeedPropertiesValidator {
    pub fn validate(&self, properties: &SeedProperties) -> Result<()> {
        properties.validate().map_err(|errors| {
            SeedError::Configuration(format!("seed properties failed validation: {errors}"))
        })?;

        let usernames = duplicates(properties.users.iter().map(|u| u.username.trim().to_string()));
        if !usernames.is_empty() {
            return Err(SeedError::Configuration(format!(
                "duplicate usernames in seed properties: {}",
                usernames.join(", ")
            )));
        }

        let emails = duplicates(
            properties
                .users
                .iter()
                .filter_map(|u| u.email.as_deref())
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_ascii_lowercase),
        );
        if !emails.is_empty() {
            return Err(SeedError::Configuration(format!(
                "duplicate emails in seed properties: {}",
                emails.join(", ")
            )));
        }

        for warning in self.check_references(properties) {
            warn!(%warning, "Seed properties reference check");
        }

        Ok(())
    }

    pub fn check_references(&self, properties: &SeedProperties) -> Vec<ReferenceWarning> {
        let usernames: HashSet<&str> = properties.users.iter().map(|u| u.username.trim()).collect();
        let categories = properties.category_names();
        let shops: HashSet<&str> = properties.shops.iter().map(|s| s.shop_name.as_str()).collect();
        let brands: HashSet<&str> = properties.brands.iter().map(|b| b.name.as_str()).collect();
        let tags: HashSet<&str> = properties.tags.iter().map(|t| t.name.as_str()).collect();

        let mut warnings = Vec::new();

        for shop in &properties.shops {
            match shop.seller_username.as_deref().map(str::trim) {
                None | Some("") => warnings.push(ReferenceWarning::MissingSeller {
                    shop: shop.shop_name.clone(),
                }),
                Some(seller) if !usernames.contains(seller) => {
                    warnings.push(ReferenceWarning::UnknownSeller {
                        shop: shop.shop_name.clone(),
                        seller: seller.to_string(),
                    })
                }
                Some(_) => {}
            }
        }

        for product in &properties.products {
            if !categories.contains(product.category_name.as_str()) {
                warnings.push(ReferenceWarning::UnknownCategory {
                    product: product.name.clone(),
                    category: product.category_name.clone(),
                });
            }
            if !shops.contains(product.shop_name.as_str()) {
                warnings.push(ReferenceWarning::UnknownShop {
                    product: product.name.clone(),
                    shop: product.shop_name.clone(),
                });
            }
            if let Some(brand) = product.brand_name.as_deref().filter(|b| !b.trim().is_empty()) {
                if !brands.contains(brand) {
                    warnings.push(ReferenceWarning::UnknownBrand {
                        product: product.name.clone(),
                        brand: brand.to_string(),
                    });
                }
            }
            for tag in &product.tags {
                if !tags.contains(tag.as_str()) {
                    warnings.push(ReferenceWarning::UnknownTag {
                        product: product.name.clone(),
                        tag: tag.clone(),
                    });
                }
            }
        }

        warnings
    }
}

/// Values seen more than once, sorted.
fn duplicates(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for value in values {
        *seen.entry(value).or_default() += 1;
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(value, _)| value)
        .collect()
}

/// Shape rules for a category tree: bounded depth and well-formed names.
#[derive(Debug, Clone, Copy)]
pub struct CategoryValidator {
    max_depth: usize,
}

impl Default for CategoryValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CATEGORY_DEPTH)
    }
}

impl CategoryValidator {
    pub const MIN_NAME_LENGTH: usize = 2;
    pub const MAX_NAME_LENGTH: usize = 100;

    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn validate(&self, root: &CategoryNode) -> Result<()> {
        let mut stack = vec![(root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if depth > self.max_depth {
                return Err(SeedError::Configuration(format!(
                    "category '{}' is at depth {depth}, maximum is {}",
                    node.name(),
                    self.max_depth
                )));
            }
            Self::validate_name(node.name())?;
            stack.extend(node.children().iter().map(|child| (child, depth + 1)));
        }
        Ok(())
    }

    pub fn validate_name(name: &str) -> Result<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SeedError::Configuration(
                "category name cannot be blank".to_string(),
            ));
        }

        let length = trimmed.chars().count();
        if !(Self::MIN_NAME_LENGTH..=Self::MAX_NAME_LENGTH).contains(&length) {
            return Err(SeedError::Configuration(format!(
                "category name '{trimmed}' must be between {} and {} characters",
                Self::MIN_NAME_LENGTH,
                Self::MAX_NAME_LENGTH
            )));
        }

        if let Some(bad) = trimmed.chars().find(|c| !is_name_char(*c)) {
            return Err(SeedError::Configuration(format!(
                "category name '{trimmed}' contains invalid character '{bad}'"
            )));
        }

        Ok(())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit() || c.is_whitespace() || "&',.-".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(toml: &str) -> SeedProperties {
        SeedProperties::from_toml_str(toml).expect("parse")
    }

    #[test]
    fn duplicate_usernames_fail() {
        let props = properties(
            r#"
            [[users]]
            username = "admin"
            [[users]]
            username = "admin"
            "#,
        );
        let err = SeedPropertiesValidator.validate(&props).unwrap_err();
        assert!(matches!(err, SeedError::Configuration(ref m) if m.contains("admin")));
    }

    #[test]
    fn duplicate_emails_fail_but_blank_emails_do_not() {
        let props = properties(
            r#"
            [[users]]
            username = "a"
            email = "Same@example.com"
            [[users]]
            username = "b"
            email = "same@example.com"
            "#,
        );
        assert!(SeedPropertiesValidator.validate(&props).is_err());

        let props = properties(
            r#"
            [[users]]
            username = "a"
            email = ""
            [[users]]
            username = "b"
            email = ""
            "#,
        );
        assert!(SeedPropertiesValidator.validate(&props).is_ok());
    }

    #[test]
    fn unresolved_references_are_warnings_only() {
        let props = properties(
            r#"
            [[users]]
            username = "retail1"

            [[categories]]
            name = "Electronics"
            [[categories.children]]
            name = "Laptops"

            [[shops]]
            shop_name = "Tech Retail Store"
            seller_username = "ghost"

            [[products]]
            name = "Laptop"
            price = "10.00"
            category_name = "Laptops"
            shop_name = "Nowhere"
            brand_name = "Acme"
            tags = ["new"]
            "#,
        );

        let warnings = SeedPropertiesValidator.check_references(&props);
        assert_eq!(warnings.len(), 4);
        assert!(warnings.contains(&ReferenceWarning::UnknownSeller {
            shop: "Tech Retail Store".into(),
            seller: "ghost".into(),
        }));
        assert!(!warnings
            .iter()
            .any(|w| matches!(w, ReferenceWarning::UnknownCategory { .. })));
        assert!(SeedPropertiesValidator.validate(&props).is_ok());
    }

    #[test]
    fn padded_usernames_still_resolve_shop_sellers() {
        let props = properties(
            r#"
            [[users]]
            username = "  retail1 "

            [[shops]]
            shop_name = "Tech Retail Store"
            seller_username = "retail1"
            "#,
        );
        assert!(SeedPropertiesValidator.check_references(&props).is_empty());
    }

    #[test]
    fn category_depth_is_bounded() {
        let mut node = CategoryNode::leaf("Bottom");
        for level in 0..3 {
            node = CategoryNode::of(format!("Level {level}"), vec![node]);
        }
        assert!(CategoryValidator::new(3).validate(&node).is_ok());
        assert!(CategoryValidator::new(2).validate(&node).is_err());
    }

    #[test]
    fn category_names_are_checked() {
        assert!(CategoryValidator::validate_name("Rice, Wheat & Pulses").is_ok());
        assert!(CategoryValidator::validate_name("Kid's Corner").is_ok());
        assert!(CategoryValidator::validate_name("Épicerie").is_ok());
        assert!(CategoryValidator::validate_name("X").is_err());
        assert!(CategoryValidator::validate_name("Phones / Tablets").is_err());
        assert!(CategoryValidator::validate_name(&"a".repeat(101)).is_err());
    }
}
