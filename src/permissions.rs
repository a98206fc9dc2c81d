//! Organization permissions.
//!
//! - `can_edit`: sysadmins and organization admins.
//! - `can_view`: sysadmins and any organization member; grants access to
//!   private and deleted content.

use crate::{
    models::organization::{MemberRole, Organization},
    request_user::RequestUser,
};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrgPermissions {
    pub can_edit: bool,
    pub can_view: bool,
}

impl OrgPermissions {
    pub fn evaluate(current: &RequestUser, org: &Organization) -> Self {
        let Some(user) = current.user.as_ref() else {
            return Self::default();
        };
        if user.sysadmin {
            return Self {
                can_edit: true,
                can_view: true,
            };
        }

        let role = current
            .organizations
            .iter()
            .find(|membership| membership.organization_id == org.id)
            .map(|membership| membership.role);

        Self {
            can_edit: role == Some(MemberRole::Admin),
            can_view: role.is_some(),
        }
    }
}
