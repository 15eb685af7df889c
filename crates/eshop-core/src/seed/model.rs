// crates/eshop-core/src/seed/model.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeedError};

/// A node in a category hierarchy: a name and its ordered children.
///
/// Children are fixed at construction. Trees of any depth are supported and
/// every query below walks the tree with an explicit stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Builds a node from untrusted input, rejecting a blank name.
    pub fn try_new(name: impl Into<String>, children: Vec<CategoryNode>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SeedError::Configuration(
                "category name cannot be blank".to_string(),
            ));
        }
        Ok(Self::of(name, children))
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        Self::of(name, Vec::new())
    }

    pub fn of(name: impl Into<String>, children: Vec<CategoryNode>) -> Self {
        Self {
            name: name.into(),
            description: None,
            image_url: None,
            children,
        }
    }

    /// A node whose children are all leaves.
    pub fn with_children(name: impl Into<String>, child_names: &[&str]) -> Self {
        Self::of(name, child_names.iter().map(|c| CategoryNode::leaf(*c)).collect())
    }

    pub fn with_details(mut self, description: Option<String>, image_url: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self.image_url = image_url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn children(&self) -> &[CategoryNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of nodes in this subtree, this node included.
    pub fn total_node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    pub fn leaf_count(&self) -> usize {
        let mut leaves = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                leaves += 1;
            }
            stack.extend(node.children.iter());
        }
        leaves
    }

    /// Length of the longest path from this node down to a leaf.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Every name in the subtree, in pre-order.
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.total_node_count());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            names.push(node.name.as_str());
            stack.extend(node.children.iter().rev());
        }
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Seller,
    Customer,
    DeliveryAgent,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Seller => "SELLER",
            UserRole::Customer => "CUSTOMER",
            UserRole::DeliveryAgent => "DELIVERY_AGENT",
        }
    }

    /// Case-insensitive parse of the stored or configured name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(UserRole::Admin),
            "SELLER" => Some(UserRole::Seller),
            "CUSTOMER" => Some(UserRole::Customer),
            "DELIVERY_AGENT" => Some(UserRole::DeliveryAgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SellerType {
    Individual,
    Business,
    Farmer,
    Wholesaler,
    Retailer,
}

impl SellerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerType::Individual => "INDIVIDUAL",
            SellerType::Business => "BUSINESS",
            SellerType::Farmer => "FARMER",
            SellerType::Wholesaler => "WHOLESALER",
            SellerType::Retailer => "RETAILER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INDIVIDUAL" => Some(SellerType::Individual),
            "BUSINESS" => Some(SellerType::Business),
            "FARMER" => Some(SellerType::Farmer),
            "WHOLESALER" => Some(SellerType::Wholesaler),
            "RETAILER" => Some(SellerType::Retailer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandData {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

impl BrandData {
    pub fn of(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            logo_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagData {
    pub name: String,
}

impl TagData {
    pub fn of(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreData {
    pub store_name: String,
    pub seller_username: String,
    pub description: Option<String>,
    /// Raw seller type name; parsed by the store seeder.
    pub seller_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub logo_url: Option<String>,
}

impl StoreData {
    pub fn full(store_name: &str, seller_username: &str, description: &str, seller_type: &str) -> Self {
        Self {
            store_name: store_name.to_string(),
            seller_username: seller_username.to_string(),
            description: Some(description.to_string()),
            seller_type: Some(seller_type.to_string()),
            address: None,
            phone: None,
            email: None,
            logo_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductData {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub category_name: String,
    pub brand_name: Option<String>,
    pub store_name: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub active: bool,
}

impl ProductData {
    #[allow(clippy::too_many_arguments)]
    pub fn of(
        name: &str,
        sku: &str,
        price: Decimal,
        discount_price: Decimal,
        category_name: &str,
        brand_name: &str,
        store_name: &str,
        tags: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            sku: sku.to_string(),
            description: None,
            price,
            discount_price: Some(discount_price),
            stock_quantity: None,
            category_name: category_name.to_string(),
            brand_name: Some(brand_name.to_string()),
            store_name: store_name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            featured: false,
            active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_tree(depth: usize, label: &str) -> CategoryNode {
        if depth == 0 {
            return CategoryNode::leaf(label);
        }
        CategoryNode::of(
            label,
            vec![
                binary_tree(depth - 1, &format!("{label}.0")),
                binary_tree(depth - 1, &format!("{label}.1")),
            ],
        )
    }

    #[test]
    fn total_node_count_of_depth_three_binary_tree_is_fifteen() {
        let tree = binary_tree(3, "root");
        assert_eq!(tree.total_node_count(), 15);
        assert_eq!(tree.leaf_count(), 8);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn with_children_builds_leaves_in_order() {
        let node = CategoryNode::with_children("Cameras", &["DSLR", "Mirrorless", "Action Cameras"]);
        assert_eq!(node.child_count(), 3);
        assert!(node.children().iter().all(CategoryNode::is_leaf));
        assert_eq!(node.names(), vec!["Cameras", "DSLR", "Mirrorless", "Action Cameras"]);
    }

    #[test]
    fn try_new_rejects_blank_names() {
        assert!(CategoryNode::try_new("   ", Vec::new()).is_err());
        assert!(CategoryNode::try_new("Dairy", Vec::new()).is_ok());
    }

    #[test]
    fn very_deep_chain_does_not_overflow() {
        let mut node = CategoryNode::leaf("bottom");
        for level in 0..50_000 {
            node = CategoryNode::of(format!("level {level}"), vec![node]);
        }
        assert_eq!(node.total_node_count(), 50_001);
        assert_eq!(node.depth(), 50_000);
        // Drop iteratively too; the derived drop glue would recurse.
        let mut current = Some(node);
        while let Some(mut n) = current {
            current = n.children.pop();
        }
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!(UserRole::parse("seller"), Some(UserRole::Seller));
        assert_eq!(UserRole::parse("Delivery_Agent"), Some(UserRole::DeliveryAgent));
        assert_eq!(UserRole::parse("owner"), None);
        assert_eq!(SellerType::parse("farmer"), Some(SellerType::Farmer));
    }
}
