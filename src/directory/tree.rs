//! Department forest assembly

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, warn};
use serde::Serialize;

/// A record that knows its own id and its parent's id
pub trait TreeRecord {
    type Key: Eq + Hash + Clone + Debug;

    fn key(&self) -> Self::Key;
    fn parent_key(&self) -> Self::Key;
}

/// One department with its sub-departments and directly assigned users
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentNode<D, U> {
    pub department: D,
    /// Resolved display name of the department leader, empty when unknown
    #[serde(skip_serializing_if = "String::is_empty")]
    pub leader_name: String,
    /// Display name of the parent department, empty for roots
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent_name: String,
    pub users: Vec<U>,
    pub children: Vec<DepartmentNode<D, U>>,
}

impl<D, U> DepartmentNode<D, U> {
    pub fn new(department: D) -> Self {
        Self {
            department,
            leader_name: String::new(),
            parent_name: String::new(),
            users: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Number of departments in this subtree, including self
    pub fn department_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(DepartmentNode::department_count)
            .sum::<usize>()
    }

    /// Number of attached user entries in this subtree
    pub fn user_count(&self) -> usize {
        self.users.len()
            + self
                .children
                .iter()
                .map(DepartmentNode::user_count)
                .sum::<usize>()
    }
}

/// Total departments in a forest
pub fn count_departments<D, U>(forest: &[DepartmentNode<D, U>]) -> usize {
    forest.iter().map(DepartmentNode::department_count).sum()
}

/// Total attached user entries in a forest
pub fn count_users<D, U>(forest: &[DepartmentNode<D, U>]) -> usize {
    forest.iter().map(DepartmentNode::user_count).sum()
}

/// Pre-order listing of every node with its depth (roots are depth 0)
pub fn flatten<D, U>(forest: &[DepartmentNode<D, U>]) -> Vec<(usize, &DepartmentNode<D, U>)> {
    fn visit<'a, D, U>(
        nodes: &'a [DepartmentNode<D, U>],
        depth: usize,
        out: &mut Vec<(usize, &'a DepartmentNode<D, U>)>,
    ) {
        for node in nodes {
            out.push((depth, node));
            visit(&node.children, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    visit(forest, 0, &mut out);
    out
}

/// Link a flat department list into a forest.
///
/// A department becomes a child of the record whose key equals its parent
/// key; otherwise (root sentinel, dangling parent, or itself) it becomes a
/// root. Children and roots keep input order. When two records share a key
/// the later one wins and the earlier one is dropped. Records caught in a
/// parent cycle are promoted to roots instead of being lost.
pub fn build_tree<D, U>(departments: Vec<D>) -> Vec<DepartmentNode<D, U>>
where
    D: TreeRecord,
{
    build_tree_by(departments, D::key, D::parent_key)
}

/// [`build_tree`] with the id and parent id taken from `key` and `parent_key`.
///
/// For records whose id space is chosen at request time.
pub fn build_tree_by<D, U, K, F, P>(
    departments: Vec<D>,
    key: F,
    parent_key: P,
) -> Vec<DepartmentNode<D, U>>
where
    K: Eq + Hash + Clone + Debug,
    F: Fn(&D) -> K,
    P: Fn(&D) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::with_capacity(departments.len());
    for (i, dept) in departments.iter().enumerate() {
        if let Some(previous) = index.insert(key(dept), i) {
            debug!(
                "Duplicate department id {:?}: record {} replaces record {}",
                key(dept),
                i,
                previous
            );
        }
    }

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); departments.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, dept) in departments.iter().enumerate() {
        if index.get(&key(dept)) != Some(&i) {
            continue;
        }
        match index.get(&parent_key(dept)) {
            Some(&parent) if parent != i => children_of[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut slots: Vec<Option<D>> = departments.into_iter().map(Some).collect();

    fn assemble<D, U>(
        i: usize,
        slots: &mut [Option<D>],
        children_of: &[Vec<usize>],
    ) -> Option<DepartmentNode<D, U>> {
        let department = slots[i].take()?;
        let mut node = DepartmentNode::new(department);
        for &child in &children_of[i] {
            if let Some(child_node) = assemble(child, slots, children_of) {
                node.children.push(child_node);
            }
        }
        Some(node)
    }

    let mut forest: Vec<DepartmentNode<D, U>> = roots
        .iter()
        .filter_map(|&i| assemble(i, &mut slots, &children_of))
        .collect();

    for i in 0..slots.len() {
        let Some(cycle_key) = slots[i].as_ref().map(&key) else {
            continue;
        };
        if index.get(&cycle_key) != Some(&i) {
            continue;
        }
        warn!(
            "Department {:?} is part of a parent cycle, promoting it to a root",
            cycle_key
        );
        if let Some(node) = assemble(i, &mut slots, &children_of) {
            forest.push(node);
        }
    }

    forest
}

/// Attach `user` to the node whose department key is `key`.
///
/// Returns false when no such department is in the forest. A user listed in
/// several departments is attached once per call, so once per department.
pub fn attach_user<D, U>(forest: &mut [DepartmentNode<D, U>], key: &D::Key, user: U) -> bool
where
    D: TreeRecord,
{
    fn find<'a, D: TreeRecord, U>(
        nodes: &'a mut [DepartmentNode<D, U>],
        key: &D::Key,
    ) -> Option<&'a mut DepartmentNode<D, U>> {
        for node in nodes.iter_mut() {
            if node.department.key() == *key {
                return Some(node);
            }
            if let Some(found) = find(&mut node.children, key) {
                return Some(found);
            }
        }
        None
    }

    match find(forest, key) {
        Some(node) => {
            node.users.push(user);
            true
        }
        None => {
            debug!("Department {:?} not in tree, user not attached", key);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Dept {
        id: u64,
        parent: u64,
        name: &'static str,
    }

    impl TreeRecord for Dept {
        type Key = u64;

        fn key(&self) -> u64 {
            self.id
        }

        fn parent_key(&self) -> u64 {
            self.parent
        }
    }

    fn dept(id: u64, parent: u64, name: &'static str) -> Dept {
        Dept { id, parent, name }
    }

    fn ids(nodes: &[DepartmentNode<Dept, String>]) -> Vec<u64> {
        nodes.iter().map(|n| n.department.id).collect()
    }

    #[test]
    fn test_root_with_two_children_in_input_order() {
        let forest: Vec<DepartmentNode<Dept, String>> = build_tree(vec![
            dept(1, 0, "Root"),
            dept(2, 1, "Eng"),
            dept(3, 1, "Sales"),
        ]);

        assert_eq!(ids(&forest), vec![1]);
        assert_eq!(forest[0].department.name, "Root");
        assert_eq!(ids(&forest[0].children), vec![2, 3]);
    }

    #[test]
    fn test_every_record_placed_once() {
        let input = vec![
            dept(5, 2, "Platform"),
            dept(1, 0, "Root"),
            dept(2, 1, "Eng"),
            dept(3, 1, "Sales"),
            dept(4, 2, "Infra"),
            dept(6, 3, "EMEA"),
        ];
        let expected = input.len();
        let forest: Vec<DepartmentNode<Dept, String>> = build_tree(input);

        assert_eq!(count_departments(&forest), expected);
        let flat = flatten(&forest);
        for (_, node) in &flat {
            for child in &node.children {
                assert_eq!(child.department.parent, node.department.id);
            }
        }
        let mut seen: Vec<u64> = flat.iter().map(|(_, n)| n.department.id).collect();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6]);
        // Child declared before its parent still lands under it
        assert_eq!(ids(&forest[0].children[0].children), vec![5, 4]);
    }

    #[test]
    fn test_missing_parent_promotes_to_root() {
        let forest: Vec<DepartmentNode<Dept, String>> =
            build_tree(vec![dept(10, 7, "Orphan"), dept(11, 10, "Child")]);

        assert_eq!(ids(&forest), vec![10]);
        assert_eq!(ids(&forest[0].children), vec![11]);
    }

    #[test]
    fn test_multiple_roots_keep_order() {
        let forest: Vec<DepartmentNode<Dept, String>> =
            build_tree(vec![dept(3, 99, "C"), dept(1, 0, "A"), dept(2, 42, "B")]);
        assert_eq!(ids(&forest), vec![3, 1, 2]);
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let forest: Vec<DepartmentNode<Dept, String>> =
            build_tree(vec![dept(4, 4, "Loop"), dept(5, 4, "Child")]);
        assert_eq!(ids(&forest), vec![4]);
        assert_eq!(ids(&forest[0].children), vec![5]);
    }

    #[test]
    fn test_parent_cycle_is_not_lost() {
        let forest: Vec<DepartmentNode<Dept, String>> =
            build_tree(vec![dept(1, 2, "A"), dept(2, 1, "B"), dept(3, 0, "C")]);

        assert_eq!(count_departments(&forest), 3);
        assert_eq!(ids(&forest), vec![3, 1]);
        assert_eq!(ids(&forest[1].children), vec![2]);
    }

    #[test]
    fn test_duplicate_id_last_record_wins() {
        let forest: Vec<DepartmentNode<Dept, String>> = build_tree(vec![
            dept(1, 0, "Root"),
            dept(2, 1, "Old"),
            dept(2, 1, "New"),
        ]);

        assert_eq!(count_departments(&forest), 2);
        assert_eq!(forest[0].children[0].department.name, "New");
    }

    #[test]
    fn test_empty_input() {
        let forest: Vec<DepartmentNode<Dept, String>> = build_tree(Vec::new());
        assert!(forest.is_empty());
    }

    #[test]
    fn test_attach_user_to_multiple_departments() {
        let mut forest: Vec<DepartmentNode<Dept, String>> = build_tree(vec![
            dept(1, 0, "Root"),
            dept(2, 1, "Eng"),
            dept(3, 1, "Sales"),
        ]);

        for dept_id in [2, 3] {
            assert!(attach_user(&mut forest, &dept_id, "alice".to_string()));
        }

        assert_eq!(forest[0].children[0].users, vec!["alice".to_string()]);
        assert_eq!(forest[0].children[1].users, vec!["alice".to_string()]);
        assert!(forest[0].users.is_empty());
        assert_eq!(count_users(&forest), 2);
    }

    #[test]
    fn test_attach_user_unknown_department() {
        let mut forest: Vec<DepartmentNode<Dept, String>> = build_tree(vec![dept(1, 0, "Root")]);
        assert!(!attach_user(&mut forest, &42, "bob".to_string()));
        assert_eq!(count_users(&forest), 0);
    }

    #[test]
    fn test_flatten_depths() {
        let forest: Vec<DepartmentNode<Dept, String>> = build_tree(vec![
            dept(1, 0, "Root"),
            dept(2, 1, "Eng"),
            dept(4, 2, "Infra"),
            dept(3, 1, "Sales"),
        ]);
        let depths: Vec<(usize, u64)> = flatten(&forest)
            .into_iter()
            .map(|(d, n)| (d, n.department.id))
            .collect();
        assert_eq!(depths, vec![(0, 1), (1, 2), (2, 4), (1, 3)]);
    }

    #[test]
    fn test_build_tree_by_custom_keys() {
        // Link on names instead of numeric ids
        let records = vec![("Root", ""), ("Eng", "Root"), ("Infra", "Eng"), ("Sales", "Root")];
        let forest: Vec<DepartmentNode<(&str, &str), String>> =
            build_tree_by(records, |r| r.0, |r| r.1);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].department.0, "Root");
        let children: Vec<&str> = forest[0].children.iter().map(|n| n.department.0).collect();
        assert_eq!(children, vec!["Eng", "Sales"]);
        assert_eq!(forest[0].children[0].children[0].department.0, "Infra");
    }
}
