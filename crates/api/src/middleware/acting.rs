//! The signed-in person acting inside one organization.

use maap_core::error::CoreError;
use maap_core::policy::{ManagerIndex, Membership};
use maap_core::types::DbId;
use maap_core::visibility::Viewer;
use maap_db::repositories::{OrganizationRepo, TeammateRepo};
use maap_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Membership of the signed-in person in the organization named by the
/// route, with the company's management hierarchy loaded for policy checks.
#[derive(Debug, Clone)]
pub struct ActingTeammate {
    pub person_id: DbId,
    /// Organization from the route.
    pub organization_id: DbId,
    /// Root company of `organization_id`.
    pub company_id: DbId,
    pub membership: Membership,
    pub managers: ManagerIndex,
}

impl ActingTeammate {
    /// Resolve the acting membership. 404 for an unknown organization, 403
    /// when the person has no membership in its company.
    pub async fn load(pool: &DbPool, user: &AuthUser, organization_id: DbId) -> AppResult<Self> {
        let company_id = OrganizationRepo::root_company_id(pool, organization_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Organization",
                id: organization_id,
            }))?;

        let membership: Membership =
            TeammateRepo::acting_membership(pool, user.person_id, organization_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Forbidden(
                        "You are not a member of this organization".into(),
                    ))
                })?
                .into();

        let managers = ManagerIndex::new(TeammateRepo::manager_pairs(pool, company_id).await?);

        Ok(Self {
            person_id: user.person_id,
            organization_id,
            company_id,
            membership,
            managers,
        })
    }

    pub fn teammate_id(&self) -> DbId {
        self.membership.teammate_id
    }

    /// Another teammate of the same company, as a policy target. Teammates
    /// of other companies read as missing.
    pub async fn target(&self, pool: &DbPool, teammate_id: DbId) -> AppResult<Membership> {
        TeammateRepo::membership(pool, teammate_id)
            .await?
            .map(Membership::from)
            .filter(|m| m.company_id == self.company_id)
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Teammate",
                id: teammate_id,
            }))
    }
}

/// The visibility context of a person, or of an anonymous visitor.
pub async fn load_viewer(pool: &DbPool, user: Option<&AuthUser>) -> AppResult<Viewer> {
    match user {
        None => Ok(Viewer::anonymous()),
        Some(user) => {
            let memberships = TeammateRepo::memberships_for_person(pool, user.person_id)
                .await?
                .into_iter()
                .map(Membership::from)
                .collect();
            Ok(Viewer::person(user.person_id, memberships))
        }
    }
}
