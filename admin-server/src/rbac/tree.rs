//! Permission Tree Builder
//!
//! Converts a flat permission collection into a forest of
//! [`PermissionNode`]s using `parent_id` links. Children (and roots) are
//! ordered by ascending `sort`; ties keep input order.

use std::collections::{HashMap, HashSet};

use shared::models::{Permission, PermissionNode};

/// Build the permission forest from a flat sequence.
///
/// Permissions whose `parent_id` does not resolve within the input set
/// become roots. This is intentional: a filtered subset (e.g. only `menu`
/// permissions) keeps its sub-trees instead of losing them.
///
/// Never fails; malformed input degrades, it does not panic.
pub fn build_tree(permissions: &[Permission]) -> Vec<PermissionNode> {
    let ids: HashSet<&str> = permissions.iter().map(|p| p.id.as_str()).collect();

    let mut children: HashMap<&str, Vec<&Permission>> = HashMap::new();
    let mut roots: Vec<&Permission> = Vec::new();
    for permission in permissions {
        match permission
            .parent_id
            .as_deref()
            .filter(|parent| ids.contains(parent))
        {
            Some(parent) => children.entry(parent).or_default().push(permission),
            None => roots.push(permission),
        }
    }

    build_level(&roots, &children)
}

fn build_level(
    level: &[&Permission],
    children: &HashMap<&str, Vec<&Permission>>,
) -> Vec<PermissionNode> {
    let mut ordered: Vec<&Permission> = level.to_vec();
    // Vec::sort_by_key is stable, so equal sort values keep input order
    ordered.sort_by_key(|p| p.sort);

    ordered
        .into_iter()
        .map(|permission| PermissionNode {
            permission: permission.clone(),
            children: children
                .get(permission.id.as_str())
                .map(|nested| build_level(nested, children))
                .unwrap_or_default(),
        })
        .collect()
}

/// Check whether assigning `proposed_parent_id` as the parent of
/// `permission_id` would create a cycle.
///
/// Walks upward from the proposed parent following `parent_id` links. The
/// walk is bounded by the collection size so it terminates even when the
/// existing data already contains a cycle; hitting the bound is reported as
/// a cycle.
pub fn would_create_cycle(
    permission_id: &str,
    proposed_parent_id: &str,
    permissions: &[Permission],
) -> bool {
    let parent_of: HashMap<&str, Option<&str>> = permissions
        .iter()
        .map(|p| (p.id.as_str(), p.parent_id.as_deref()))
        .collect();

    let mut current = Some(proposed_parent_id);
    for _ in 0..=permissions.len() {
        match current {
            Some(id) if id == permission_id => return true,
            Some(id) => current = parent_of.get(id).copied().flatten(),
            None => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::{PermissionStatus, PermissionType};

    fn perm(id: &str, parent: Option<&str>, sort: i32) -> Permission {
        let now = Utc::now();
        Permission {
            id: id.to_string(),
            name: format!("perm {id}"),
            code: format!("perm:{id}"),
            kind: PermissionType::Menu,
            parent_id: parent.map(str::to_string),
            path: None,
            component: None,
            icon: None,
            sort,
            status: PermissionStatus::Active,
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn shape(nodes: &[PermissionNode]) -> Vec<(String, Vec<String>)> {
        nodes
            .iter()
            .map(|n| {
                (
                    n.permission.id.clone(),
                    n.children.iter().map(|c| c.permission.id.clone()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn builds_forest_with_children_sorted_by_sort() {
        let perms = vec![
            perm("1", None, 2),
            perm("2", Some("1"), 1),
            perm("3", Some("1"), 2),
        ];

        let tree = build_tree(&perms);
        assert_eq!(
            shape(&tree),
            vec![("1".to_string(), vec!["2".to_string(), "3".to_string()])]
        );
    }

    #[test]
    fn roots_are_sorted_by_sort_too() {
        let perms = vec![perm("a", None, 5), perm("b", None, 1), perm("c", None, 3)];
        let tree = build_tree(&perms);
        let roots: Vec<_> = tree.iter().map(|n| n.permission.id.clone()).collect();
        assert_eq!(roots, vec!["b", "c", "a"]);
    }

    #[test]
    fn dangling_parent_becomes_root() {
        // "2" references a parent missing from the input set; it must become
        // a root rather than be dropped or error out
        let perms = vec![perm("2", Some("missing"), 1), perm("3", Some("2"), 1)];
        let tree = build_tree(&perms);
        assert_eq!(
            shape(&tree),
            vec![("2".to_string(), vec!["3".to_string()])]
        );
    }

    #[test]
    fn tree_is_stable_under_input_reordering() {
        let perms = vec![
            perm("1", None, 2),
            perm("2", Some("1"), 1),
            perm("3", Some("1"), 2),
            perm("4", Some("3"), 1),
            perm("5", None, 1),
        ];
        let mut reversed = perms.clone();
        reversed.reverse();

        assert_eq!(
            serde_json::to_value(build_tree(&perms)).unwrap(),
            serde_json::to_value(build_tree(&reversed)).unwrap()
        );
    }

    #[test]
    fn equal_sort_keeps_input_order() {
        let perms = vec![
            perm("1", None, 1),
            perm("x", Some("1"), 7),
            perm("y", Some("1"), 7),
        ];
        let tree = build_tree(&perms);
        assert_eq!(
            shape(&tree),
            vec![("1".to_string(), vec!["x".to_string(), "y".to_string()])]
        );
    }

    #[test]
    fn self_parent_is_always_a_cycle() {
        let perms = vec![perm("1", None, 1)];
        assert!(would_create_cycle("1", "1", &perms));
        // Even for ids absent from the collection
        assert!(would_create_cycle("ghost", "ghost", &perms));
    }

    #[test]
    fn reparenting_onto_own_descendant_is_a_cycle() {
        // 3's parent is 2; making 3 the parent of 2 closes a loop
        let perms = vec![perm("1", None, 1), perm("2", None, 2), perm("3", Some("2"), 1)];
        assert!(would_create_cycle("2", "3", &perms));
        // While reparenting 3 under 1 stays acyclic
        assert!(!would_create_cycle("3", "1", &perms));
    }

    #[test]
    fn cycle_walk_terminates_on_corrupt_data() {
        // a <-> b is already corrupt; the walk must still terminate
        let perms = vec![perm("a", Some("b"), 1), perm("b", Some("a"), 1)];
        assert!(would_create_cycle("x", "a", &perms));
    }
}
