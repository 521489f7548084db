use crate::types::{Role, Stage};

/// Returns true iff `role` is the unique owner of `stage`.
///
/// Pure and total over the closed role/stage sets: BD owns the requirement
/// stage, BA analysis, PM approval, DEV delivery, and nothing else.
pub fn can_edit(role: Role, stage: Stage) -> bool {
    stage.owner() == role
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_role_owns_exactly_one_stage() {
        for &role in Role::all() {
            let owned: Vec<Stage> = Stage::all()
                .iter()
                .copied()
                .filter(|&s| can_edit(role, s))
                .collect();
            assert_eq!(owned, vec![role.stage()], "role {role}");
        }
    }

    #[test]
    fn each_stage_has_exactly_one_owner() {
        for &stage in Stage::all() {
            let owners: Vec<Role> = Role::all()
                .iter()
                .copied()
                .filter(|&r| can_edit(r, stage))
                .collect();
            assert_eq!(owners, vec![stage.owner()], "stage {stage}");
        }
    }

    #[test]
    fn cross_pairings_rejected() {
        assert!(can_edit(Role::Bd, Stage::Requirement));
        assert!(!can_edit(Role::Bd, Stage::Approval));
        assert!(!can_edit(Role::Dev, Stage::Requirement));
        assert!(can_edit(Role::Dev, Stage::Delivery));
    }
}
