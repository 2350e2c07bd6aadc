//! Authorization rules for teammates acting inside an organization.
//!
//! Handlers load the acting teammate (the signed-in person's membership in
//! the organization being addressed) and the management hierarchy, then ask
//! these functions whether an action is allowed. A refusal is a
//! [`CoreError::Forbidden`] that the API layer turns into a 403.

use std::collections::{HashMap, HashSet};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// A person's membership in one organization, with capability flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub teammate_id: DbId,
    pub person_id: DbId,
    pub organization_id: DbId,
    /// Root company of `organization_id`.
    pub company_id: DbId,
    pub can_manage_employment: bool,
    pub can_create_employment: bool,
    pub can_manage_maap: bool,
    pub first_employed_at: Option<Timestamp>,
    pub last_terminated_at: Option<Timestamp>,
}

impl Membership {
    /// Employed at some point and not terminated since.
    pub fn actively_employed(&self) -> bool {
        self.first_employed_at.is_some() && self.last_terminated_at.is_none()
    }
}

/* --------------------------------------------------------------------------
Management hierarchy
-------------------------------------------------------------------------- */

/// Direct-manager relationships, used to walk the management chain.
#[derive(Debug, Clone, Default)]
pub struct ManagerIndex {
    direct: HashMap<DbId, DbId>,
}

impl ManagerIndex {
    /// Build from `(teammate_id, manager_teammate_id)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (DbId, DbId)>) -> Self {
        Self {
            direct: pairs.into_iter().collect(),
        }
    }

    pub fn direct_manager(&self, teammate_id: DbId) -> Option<DbId> {
        self.direct.get(&teammate_id).copied()
    }

    /// All managers above `teammate_id`, nearest first. Stops on cycles.
    pub fn chain(&self, teammate_id: DbId) -> Vec<DbId> {
        let mut seen = HashSet::from([teammate_id]);
        let mut chain = Vec::new();
        let mut current = teammate_id;
        while let Some(manager) = self.direct_manager(current) {
            if !seen.insert(manager) {
                break;
            }
            chain.push(manager);
            current = manager;
        }
        chain
    }

    /// `manager_id` sits somewhere above `teammate_id`.
    pub fn manages(&self, manager_id: DbId, teammate_id: DbId) -> bool {
        self.chain(teammate_id).contains(&manager_id)
    }
}

/* --------------------------------------------------------------------------
Rules
-------------------------------------------------------------------------- */

fn forbidden(message: &str) -> CoreError {
    CoreError::Forbidden(message.to_string())
}

fn require_active(actor: &Membership) -> Result<(), CoreError> {
    if actor.actively_employed() {
        Ok(())
    } else {
        Err(forbidden("You must be an active teammate of this organization"))
    }
}

fn require_same_company(actor: &Membership, target: &Membership) -> Result<(), CoreError> {
    if actor.company_id == target.company_id {
        Ok(())
    } else {
        Err(forbidden("Teammate belongs to a different organization"))
    }
}

/// Read organization records (abilities, observations feed). Any active
/// teammate may.
pub fn authorize_member(actor: &Membership) -> Result<(), CoreError> {
    require_active(actor)
}

/// Create or edit abilities, assignments, and positions.
pub fn authorize_manage_maap(actor: &Membership) -> Result<(), CoreError> {
    require_active(actor)?;
    if actor.can_manage_maap {
        Ok(())
    } else {
        Err(forbidden("You are not permitted to manage MAAP records"))
    }
}

/// Write the employee side of a check-in. Only the teammate themselves.
pub fn authorize_employee_side(actor: &Membership, target: &Membership) -> Result<(), CoreError> {
    require_active(actor)?;
    if actor.teammate_id == target.teammate_id {
        Ok(())
    } else {
        Err(forbidden("Only the teammate can complete their side of a check-in"))
    }
}

fn is_manager_or_employment_admin(
    actor: &Membership,
    target: &Membership,
    managers: &ManagerIndex,
) -> bool {
    actor.can_manage_employment || managers.manages(actor.teammate_id, target.teammate_id)
}

/// Write the manager side of a check-in.
pub fn authorize_manager_side(
    actor: &Membership,
    target: &Membership,
    managers: &ManagerIndex,
) -> Result<(), CoreError> {
    require_active(actor)?;
    require_same_company(actor, target)?;
    if actor.teammate_id != target.teammate_id && is_manager_or_employment_admin(actor, target, managers)
    {
        Ok(())
    } else {
        Err(forbidden("Only a manager can complete the manager side of a check-in"))
    }
}

/// Finalize a teammate's check-ins.
pub fn authorize_finalize(
    actor: &Membership,
    target: &Membership,
    managers: &ManagerIndex,
) -> Result<(), CoreError> {
    require_active(actor)?;
    require_same_company(actor, target)?;
    if actor.teammate_id == target.teammate_id {
        return Err(forbidden("You cannot finalize your own check-ins"));
    }
    if is_manager_or_employment_admin(actor, target, managers) {
        Ok(())
    } else {
        Err(forbidden("You are not permitted to finalize check-ins for this teammate"))
    }
}

/// Open a new check-in for a teammate: the teammate, their managers, or an
/// employment admin.
pub fn authorize_start_check_in(
    actor: &Membership,
    target: &Membership,
    managers: &ManagerIndex,
) -> Result<(), CoreError> {
    require_active(actor)?;
    require_same_company(actor, target)?;
    if actor.teammate_id == target.teammate_id
        || is_manager_or_employment_admin(actor, target, managers)
    {
        Ok(())
    } else {
        Err(forbidden("You are not permitted to start check-ins for this teammate"))
    }
}

/// Publish, delete, or restore an observation. Observer only.
pub fn authorize_observer(actor_person_id: DbId, observer_person_id: DbId) -> Result<(), CoreError> {
    if actor_person_id == observer_person_id {
        Ok(())
    } else {
        Err(forbidden("Only the observer can change this observation"))
    }
}

/// View a teammate's check-ins and MAAP snapshots.
pub fn authorize_view_maap(
    actor: &Membership,
    target: &Membership,
    managers: &ManagerIndex,
) -> Result<(), CoreError> {
    require_active(actor)?;
    require_same_company(actor, target)?;
    if actor.teammate_id == target.teammate_id
        || is_manager_or_employment_admin(actor, target, managers)
    {
        Ok(())
    } else {
        Err(forbidden("You are not permitted to view this teammate's MAAP"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn member(teammate_id: DbId) -> Membership {
        Membership {
            teammate_id,
            person_id: teammate_id * 100,
            organization_id: 1,
            company_id: 1,
            can_manage_employment: false,
            can_create_employment: false,
            can_manage_maap: false,
            first_employed_at: Some(Utc::now()),
            last_terminated_at: None,
        }
    }

    /// 3 manages 2 manages 1.
    fn hierarchy() -> ManagerIndex {
        ManagerIndex::new([(1, 2), (2, 3)])
    }

    #[test]
    fn chain_walks_upwards_and_stops_on_cycles() {
        assert_eq!(hierarchy().chain(1), vec![2, 3]);
        let looped = ManagerIndex::new([(1, 2), (2, 1)]);
        assert_eq!(looped.chain(1), vec![2]);
        assert!(hierarchy().manages(3, 1));
        assert!(!hierarchy().manages(1, 3));
    }

    #[test]
    fn active_employment_requires_start_and_no_termination() {
        let mut m = member(1);
        assert!(m.actively_employed());
        m.last_terminated_at = Some(Utc::now());
        assert!(!m.actively_employed());
        m.last_terminated_at = None;
        m.first_employed_at = None;
        assert!(!m.actively_employed());
    }

    #[test]
    fn skip_level_manager_may_finalize() {
        assert!(authorize_finalize(&member(3), &member(1), &hierarchy()).is_ok());
    }

    #[test]
    fn teammate_cannot_finalize_self() {
        let mut me = member(1);
        me.can_manage_employment = true;
        assert_matches!(
            authorize_finalize(&me, &member(1), &hierarchy()),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn peer_cannot_finalize_but_employment_admin_can() {
        let peer = member(9);
        assert!(authorize_finalize(&peer, &member(1), &hierarchy()).is_err());
        let mut admin = member(9);
        admin.can_manage_employment = true;
        assert!(authorize_finalize(&admin, &member(1), &hierarchy()).is_ok());
    }

    #[test]
    fn other_company_is_refused() {
        let mut outsider = member(3);
        outsider.company_id = 2;
        assert!(authorize_view_maap(&outsider, &member(1), &hierarchy()).is_err());
    }

    #[test]
    fn employee_side_is_self_only() {
        assert!(authorize_employee_side(&member(1), &member(1)).is_ok());
        assert!(authorize_employee_side(&member(2), &member(1)).is_err());
    }

    #[test]
    fn manager_side_requires_hierarchy() {
        assert!(authorize_manager_side(&member(2), &member(1), &hierarchy()).is_ok());
        assert!(authorize_manager_side(&member(1), &member(2), &hierarchy()).is_err());
    }

    #[test]
    fn terminated_member_cannot_read() {
        let mut m = member(1);
        assert!(authorize_member(&m).is_ok());
        m.last_terminated_at = Some(Utc::now());
        assert_matches!(authorize_member(&m), Err(CoreError::Forbidden(_)));
    }

    #[test]
    fn check_in_start_allows_self_and_managers() {
        assert!(authorize_start_check_in(&member(1), &member(1), &hierarchy()).is_ok());
        assert!(authorize_start_check_in(&member(3), &member(1), &hierarchy()).is_ok());
        assert!(authorize_start_check_in(&member(1), &member(3), &hierarchy()).is_err());
    }

    #[test]
    fn only_observer_changes_observation() {
        assert!(authorize_observer(100, 100).is_ok());
        assert!(authorize_observer(101, 100).is_err());
    }

    #[test]
    fn maap_management_requires_flag() {
        let mut m = member(1);
        assert!(authorize_manage_maap(&m).is_err());
        m.can_manage_maap = true;
        assert!(authorize_manage_maap(&m).is_ok());
        m.last_terminated_at = Some(Utc::now());
        assert!(authorize_manage_maap(&m).is_err());
    }
}
