// crates/eshop-core/src/seed/taxonomy.rs

//! Turns a `CategoryNode` tree into category rows.

use crate::db::{CategoryRecord, NewCategory, SeedTransaction};
use crate::error::RepositoryError;

use super::model::CategoryNode;

pub const PATH_SEPARATOR: &str = " > ";

/// Rows written for one root, in pre-order.
#[derive(Debug, Clone, Default)]
pub struct MaterializedTree {
    pub rows: Vec<CategoryRecord>,
    pub leaves: usize,
}

pub fn slug_for(parent_slug: Option<&str>, name: &str) -> String {
    let own = slug::slugify(name);
    match parent_slug {
        Some(parent) => format!("{parent}-{own}"),
        None => own,
    }
}

pub fn path_for(parent_path: Option<&str>, name: &str) -> String {
    match parent_path {
        Some(parent) => format!("{parent}{PATH_SEPARATOR}{name}"),
        None => name.to_string(),
    }
}

/// Inserts `root` and every descendant. A node without a description is
/// described by its name. A parent row is always written
/// before its children; siblings keep provider order. `display_order` is
/// shared across roots and advanced once per row.
pub async fn materialize(
    tx: &mut dyn SeedTransaction,
    root: &CategoryNode,
    display_order: &mut i32,
) -> Result<MaterializedTree, RepositoryError> {
    let mut tree = MaterializedTree::default();
    // (node, index of the parent row in `tree.rows`)
    let mut stack: Vec<(&CategoryNode, Option<usize>)> = vec![(root, None)];

    while let Some((node, parent)) = stack.pop() {
        let parent_row = parent.map(|index| &tree.rows[index]);
        let new_category = NewCategory {
            name: node.name().to_string(),
            description: Some(node.description().unwrap_or(node.name()).to_string()),
            image_url: node.image_url().map(str::to_string),
            slug: slug_for(parent_row.map(|p| p.slug.as_str()), node.name()),
            path: path_for(parent_row.map(|p| p.path.as_str()), node.name()),
            depth: parent_row.map_or(0, |p| p.depth + 1),
            display_order: *display_order,
            parent_id: parent_row.map(|p| p.id),
        };

        let row = tx.insert_category(&new_category).await?;
        *display_order += 1;

        if node.is_leaf() {
            tree.leaves += 1;
        }

        let index = tree.rows.len();
        tree.rows.push(row);
        stack.extend(node.children().iter().rev().map(|child| (child, Some(index))));
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_and_paths_extend_the_parent() {
        assert_eq!(slug_for(None, "Fashion & Apparel"), "fashion-apparel");
        assert_eq!(slug_for(Some("electronics"), "TV & Appliances"), "electronics-tv-appliances");
        assert_eq!(path_for(Some("Electronics"), "Laptops"), "Electronics > Laptops");
        assert_eq!(path_for(None, "Dairy"), "Dairy");
    }
}
