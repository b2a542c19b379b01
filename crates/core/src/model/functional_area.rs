//! Functional areas form a tree through an optional parent link.
//!
//! # Invariants
//! - No functional area may be its own ancestor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{DomainError, DomainResult, FunctionalAreaId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalArea {
    pub id: FunctionalAreaId,
    pub parent_id: Option<FunctionalAreaId>,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFunctionalArea {
    pub parent_id: Option<FunctionalAreaId>,
    pub description: String,
    pub category: String,
}

/// Partial update.
///
/// `parent_id` is doubly optional: `None` keeps the parent, `Some(None)`
/// detaches the area to a root, `Some(Some(p))` reparents it under `p`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionalAreaPatch {
    pub parent_id: Option<Option<FunctionalAreaId>>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl FunctionalAreaPatch {
    pub fn apply_to(&self, area: &mut FunctionalArea) {
        if let Some(parent) = self.parent_id {
            area.parent_id = parent;
        }
        if let Some(v) = &self.description {
            area.description = v.clone();
        }
        if let Some(v) = &self.category {
            area.category = v.clone();
        }
    }
}

/// Check that placing `area` under `new_parent` keeps the hierarchy acyclic.
///
/// `parents` maps every existing area to its current parent. The walk starts
/// at `new_parent` and follows parent links upward; reaching `area` means the
/// move would make `area` its own ancestor. The walk is bounded by the number
/// of known areas so an already-corrupt chain cannot loop forever.
pub fn ensure_acyclic(
    parents: &HashMap<FunctionalAreaId, Option<FunctionalAreaId>>,
    area: FunctionalAreaId,
    new_parent: FunctionalAreaId,
) -> DomainResult<()> {
    let cycle = || DomainError::invariant("Functional area cannot be its own ancestor");

    let mut cursor = Some(new_parent);
    let mut steps = 0usize;
    while let Some(current) = cursor {
        if current == area {
            return Err(cycle());
        }
        steps += 1;
        if steps > parents.len() {
            return Err(cycle());
        }
        cursor = parents.get(&current).copied().flatten();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: i64) -> FunctionalAreaId {
        FunctionalAreaId::new(raw)
    }

    // 1 (root) <- 2 <- 3
    fn chain() -> HashMap<FunctionalAreaId, Option<FunctionalAreaId>> {
        HashMap::from([(id(1), None), (id(2), Some(id(1))), (id(3), Some(id(2)))])
    }

    #[test]
    fn reparenting_under_unrelated_branch_is_allowed() {
        let mut parents = chain();
        parents.insert(id(4), None);
        assert!(ensure_acyclic(&parents, id(4), id(3)).is_ok());
    }

    #[test]
    fn area_cannot_be_its_own_parent() {
        let err = ensure_acyclic(&chain(), id(2), id(2)).unwrap_err();
        assert!(err.to_string().contains("own ancestor"));
    }

    #[test]
    fn area_cannot_move_under_its_descendant() {
        assert!(ensure_acyclic(&chain(), id(1), id(3)).is_err());
    }

    #[test]
    fn corrupt_existing_cycle_terminates() {
        let parents = HashMap::from([(id(1), Some(id(2))), (id(2), Some(id(1)))]);
        assert!(ensure_acyclic(&parents, id(9), id(1)).is_err());
    }

    #[test]
    fn patch_can_detach_parent() {
        let mut area = FunctionalArea {
            id: id(3),
            parent_id: Some(id(2)),
            description: "Payroll".to_string(),
            category: "Finance".to_string(),
        };
        let patch = FunctionalAreaPatch {
            parent_id: Some(None),
            ..Default::default()
        };
        patch.apply_to(&mut area);
        assert_eq!(area.parent_id, None);
        assert_eq!(area.description, "Payroll");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// In a linear chain an area may only move under a node above it.
            #[test]
            fn chain_reparent_matches_depth(len in 2i64..40, area in 1i64..40, target in 1i64..40) {
                prop_assume!(area <= len && target <= len);
                let parents: HashMap<_, _> = (1..=len)
                    .map(|n| (id(n), if n == 1 { None } else { Some(id(n - 1)) }))
                    .collect();

                let result = ensure_acyclic(&parents, id(area), id(target));
                prop_assert_eq!(result.is_ok(), target < area);
            }
        }
    }
}
