//! Pure helpers over the resource-library category hierarchy.
//!
//! Categories form a forest: each row has an optional `parent_id`. The
//! database guarantees referential integrity but not acyclicity, so every
//! reparent goes through [`would_create_cycle`] first.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::DbId;

/// Minimal view of a category row needed to reason about the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub sort_order: i32,
}

/// A category with its children, ready for JSON rendering.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: DbId,
    pub name: String,
    pub sort_order: i32,
    pub children: Vec<CategoryNode>,
}

/// Maximum depth walked before a chain is treated as corrupt.
const MAX_DEPTH: usize = 64;

fn parent_map(categories: &[CategoryRef]) -> HashMap<DbId, Option<DbId>> {
    categories.iter().map(|c| (c.id, c.parent_id)).collect()
}

/// Returns `true` if moving `id` under `new_parent` would make `id` its own
/// ancestor.
pub fn would_create_cycle(categories: &[CategoryRef], id: DbId, new_parent: Option<DbId>) -> bool {
    let parents = parent_map(categories);
    let mut cursor = new_parent;
    let mut steps = 0;
    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        steps += 1;
        if steps > MAX_DEPTH {
            return true;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    false
}

/// Ids of `root` and every category below it.
pub fn descendants_of(categories: &[CategoryRef], root: DbId) -> Vec<DbId> {
    let mut children: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for c in categories {
        if let Some(parent) = c.parent_id {
            children.entry(parent).or_default().push(c.id);
        }
    }

    let mut seen = HashSet::new();
    let mut stack = vec![root];
    let mut out = Vec::new();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().copied());
        }
    }
    out
}

/// Names from the root down to `id`, e.g. `["Furniture", "Seating", "Sofas"]`.
pub fn path_to_root(categories: &[CategoryRef], id: DbId) -> Vec<String> {
    let by_id: HashMap<DbId, &CategoryRef> = categories.iter().map(|c| (c.id, c)).collect();
    let mut path = Vec::new();
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let Some(cat) = by_id.get(&current) else {
            break;
        };
        path.push(cat.name.clone());
        if path.len() > MAX_DEPTH {
            break;
        }
        cursor = cat.parent_id;
    }
    path.reverse();
    path
}

/// Build the nested tree. Siblings are ordered by `sort_order`, then name.
///
/// Categories whose parent is missing from the input are promoted to roots.
pub fn build_tree(categories: &[CategoryRef]) -> Vec<CategoryNode> {
    let known: HashSet<DbId> = categories.iter().map(|c| c.id).collect();
    let mut children: HashMap<Option<DbId>, Vec<&CategoryRef>> = HashMap::new();
    for c in categories {
        let parent = c.parent_id.filter(|p| known.contains(p));
        children.entry(parent).or_default().push(c);
    }
    for kids in children.values_mut() {
        kids.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
    }

    fn attach(
        parent: Option<DbId>,
        children: &HashMap<Option<DbId>, Vec<&CategoryRef>>,
        depth: usize,
    ) -> Vec<CategoryNode> {
        if depth > MAX_DEPTH {
            return Vec::new();
        }
        children
            .get(&parent)
            .map(|kids| {
                kids.iter()
                    .map(|c| CategoryNode {
                        id: c.id,
                        name: c.name.clone(),
                        sort_order: c.sort_order,
                        children: attach(Some(c.id), children, depth + 1),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    attach(None, &children, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: DbId, parent_id: Option<DbId>, name: &str, sort_order: i32) -> CategoryRef {
        CategoryRef {
            id,
            parent_id,
            name: name.to_string(),
            sort_order,
        }
    }

    fn sample() -> Vec<CategoryRef> {
        vec![
            cat(1, None, "Furniture", 0),
            cat(2, Some(1), "Seating", 1),
            cat(3, Some(2), "Sofas", 0),
            cat(4, Some(1), "Tables", 0),
            cat(5, None, "Lighting", 1),
        ]
    }

    #[test]
    fn reparent_under_descendant_is_a_cycle() {
        let cats = sample();
        assert!(would_create_cycle(&cats, 1, Some(3)));
        assert!(would_create_cycle(&cats, 2, Some(2)));
    }

    #[test]
    fn reparent_elsewhere_is_fine() {
        let cats = sample();
        assert!(!would_create_cycle(&cats, 3, Some(4)));
        assert!(!would_create_cycle(&cats, 2, None));
        assert!(!would_create_cycle(&cats, 5, Some(1)));
    }

    #[test]
    fn descendants_include_root_and_all_levels() {
        let mut ids = descendants_of(&sample(), 1);
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(descendants_of(&sample(), 5), vec![5]);
    }

    #[test]
    fn path_walks_to_root() {
        assert_eq!(
            path_to_root(&sample(), 3),
            vec!["Furniture", "Seating", "Sofas"]
        );
    }

    #[test]
    fn tree_orders_siblings() {
        let tree = build_tree(&sample());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "Furniture");
        assert_eq!(tree[1].name, "Lighting");
        let furniture_children: Vec<_> = tree[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(furniture_children, vec!["Tables", "Seating"]);
        assert_eq!(tree[0].children[1].children[0].name, "Sofas");
    }

    #[test]
    fn orphaned_rows_become_roots() {
        let cats = vec![cat(10, Some(99), "Orphan", 0)];
        let tree = build_tree(&cats);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 10);
    }
}
