// src/store/hierarchy.rs

//! Walks over the subject tree, computed from a materialized subject list.

use std::collections::{HashMap, HashSet};

use crate::{error::AppError, models::subject::Subject};

/// Maps each parent id to its direct children, in list order.
pub fn children_index(subjects: &[Subject]) -> HashMap<&str, Vec<&str>> {
    let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
    for s in subjects {
        if let Some(parent) = s.parent_id.as_deref() {
            index.entry(parent).or_default().push(s.id.as_str());
        }
    }
    index
}

/// `root` followed by all of its transitive descendants, depth-first, each once.
///
/// A parent cycle below `root` ends the walk where it closes instead of looping.
pub fn descendant_closure(subjects: &[Subject], root: &str) -> Vec<String> {
    let children = children_index(subjects);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            tracing::warn!("Subject {} reached twice below {}; parent cycle ignored", id, root);
            continue;
        }
        order.push(id.to_string());
        if let Some(kids) = children.get(id) {
            stack.extend(kids.iter().rev());
        }
    }

    order
}

/// Ids to delete for removing `root` and its subtree, every child before its parent.
///
/// Fails without side effects if any subject is reachable twice, which with
/// single-parent links can only mean a parent cycle.
pub fn deletion_order(subjects: &[Subject], root: &str) -> Result<Vec<String>, AppError> {
    let children = children_index(subjects);
    let mut seen: HashSet<&str> = HashSet::from([root]);
    let mut preorder = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        preorder.push(id.to_string());
        if let Some(kids) = children.get(id) {
            for &kid in kids.iter().rev() {
                if !seen.insert(kid) {
                    return Err(AppError::Integrity(format!(
                        "subject {} is its own ancestor; refusing to delete {}",
                        kid, root
                    )));
                }
                stack.push(kid);
            }
        }
    }

    preorder.reverse();
    Ok(preorder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str, parent: Option<&str>) -> Subject {
        let mut s = Subject::new(id);
        s.id = id.to_string();
        s.parent_id = parent.map(str::to_string);
        s
    }

    fn tree() -> Vec<Subject> {
        // a
        // ├── b
        // │   └── d
        // └── c
        // e (separate root)
        vec![
            subject("a", None),
            subject("b", Some("a")),
            subject("c", Some("a")),
            subject("d", Some("b")),
            subject("e", None),
        ]
    }

    #[test]
    fn closure_is_preorder_and_complete() {
        assert_eq!(descendant_closure(&tree(), "a"), ["a", "b", "d", "c"]);
        assert_eq!(descendant_closure(&tree(), "b"), ["b", "d"]);
        assert_eq!(descendant_closure(&tree(), "e"), ["e"]);
    }

    #[test]
    fn closure_of_unknown_id_is_itself() {
        assert_eq!(descendant_closure(&tree(), "zzz"), ["zzz"]);
    }

    #[test]
    fn closure_stops_at_cycle() {
        let subjects = vec![subject("x", Some("y")), subject("y", Some("x"))];
        assert_eq!(descendant_closure(&subjects, "x"), ["x", "y"]);
    }

    #[test]
    fn deletion_order_puts_children_first() {
        let order = deletion_order(&tree(), "a").unwrap();
        let pos = |id: &str| order.iter().position(|o| o == id).unwrap();
        assert_eq!(order.len(), 4);
        assert!(pos("d") < pos("b"));
        assert!(pos("b") < pos("a"));
        assert!(pos("c") < pos("a"));
        assert_eq!(order.last().map(String::as_str), Some("a"));
    }

    #[test]
    fn deletion_order_rejects_cycle() {
        let subjects = vec![
            subject("x", Some("z")),
            subject("y", Some("x")),
            subject("z", Some("y")),
        ];
        let err = deletion_order(&subjects, "x").unwrap_err();
        assert!(matches!(err, AppError::Integrity(_)));
    }
}
