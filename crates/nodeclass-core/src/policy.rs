//! Per-operation role requirements.

use std::fmt::{self, Display, Formatter};

use crate::error::{EncError, EncResult};
use crate::model::Role;

const READERS: &[Role] = &[Role::Admin, Role::User, Role::Viewer];
const EDITORS: &[Role] = &[Role::Admin, Role::User];
const ADMINS: &[Role] = &[Role::Admin];

/// Operations exposed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// List host fqdns.
    ListHosts,
    /// Resolve an fqdn.
    GetHost,
    /// Create or replace a host.
    CreateHost,
    /// Apply directives to a host.
    UpdateHost,
    /// Remove a host.
    DeleteHost,
    /// List group names.
    ListGroups,
    /// Read a group.
    GetGroup,
    /// Create or replace a group.
    CreateGroup,
    /// Apply directives to a group.
    UpdateGroup,
    /// Remove a group.
    DeleteGroup,
    /// List usernames.
    ListUsers,
    /// Read a user record.
    GetUser,
    /// Create a user.
    CreateUser,
    /// Change a user's password or roles.
    UpdateUser,
    /// Remove a user.
    DeleteUser,
}

impl Operation {
    /// Stable snake-case name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListHosts => "list_hosts",
            Self::GetHost => "get_host",
            Self::CreateHost => "create_host",
            Self::UpdateHost => "update_host",
            Self::DeleteHost => "delete_host",
            Self::ListGroups => "list_groups",
            Self::GetGroup => "get_group",
            Self::CreateGroup => "create_group",
            Self::UpdateGroup => "update_group",
            Self::DeleteGroup => "delete_group",
            Self::ListUsers => "list_users",
            Self::GetUser => "get_user",
            Self::CreateUser => "create_user",
            Self::UpdateUser => "update_user",
            Self::DeleteUser => "delete_user",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Role requirement of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The principal must hold one of the roles.
    AnyOf(&'static [Role]),
    /// The principal must be the subject, or hold one of the roles.
    SelfOrAnyOf(&'static [Role]),
}

impl Requirement {
    /// Roles that satisfy the requirement regardless of subject.
    #[must_use]
    pub const fn roles(self) -> &'static [Role] {
        match self {
            Self::AnyOf(roles) | Self::SelfOrAnyOf(roles) => roles,
        }
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Username the caller authenticated as.
    pub username: String,
    /// Roles held by the caller.
    pub roles: Vec<Role>,
}

impl Principal {
    /// Construct a principal.
    #[must_use]
    pub fn new(username: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }

    /// Whether the principal holds any of `roles`.
    #[must_use]
    pub fn holds_any(&self, roles: &[Role]) -> bool {
        self.roles.iter().any(|role| roles.contains(role))
    }
}

/// Static operation to role table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Requirement for `operation`.
    #[must_use]
    pub const fn requirement(operation: Operation) -> Requirement {
        match operation {
            Operation::ListHosts
            | Operation::GetHost
            | Operation::ListGroups
            | Operation::GetGroup => Requirement::AnyOf(READERS),
            Operation::CreateHost | Operation::UpdateHost => Requirement::AnyOf(EDITORS),
            Operation::DeleteHost
            | Operation::CreateGroup
            | Operation::UpdateGroup
            | Operation::DeleteGroup
            | Operation::ListUsers
            | Operation::CreateUser
            | Operation::UpdateUser
            | Operation::DeleteUser => Requirement::AnyOf(ADMINS),
            Operation::GetUser => Requirement::SelfOrAnyOf(ADMINS),
        }
    }

    /// Check whether `principal` may perform `operation` on `subject` (the
    /// record key, when the operation targets one).
    ///
    /// # Errors
    ///
    /// Returns [`EncError::Forbidden`] when the requirement is not met.
    pub fn authorize(
        operation: Operation,
        principal: &Principal,
        subject: Option<&str>,
    ) -> EncResult<()> {
        let allowed = match Self::requirement(operation) {
            Requirement::AnyOf(roles) => principal.holds_any(roles),
            Requirement::SelfOrAnyOf(roles) => {
                subject == Some(principal.username.as_str()) || principal.holds_any(roles)
            }
        };
        if allowed {
            Ok(())
        } else {
            Err(EncError::Forbidden {
                operation: operation.as_str(),
                reason: "principal lacks a required role",
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Operation; 15] = [
        Operation::ListHosts,
        Operation::GetHost,
        Operation::CreateHost,
        Operation::UpdateHost,
        Operation::DeleteHost,
        Operation::ListGroups,
        Operation::GetGroup,
        Operation::CreateGroup,
        Operation::UpdateGroup,
        Operation::DeleteGroup,
        Operation::ListUsers,
        Operation::GetUser,
        Operation::CreateUser,
        Operation::UpdateUser,
        Operation::DeleteUser,
    ];

    fn allowed(role: Role, operation: Operation) -> bool {
        let principal = Principal::new("alice", vec![role]);
        AccessPolicy::authorize(operation, &principal, Some("someone-else")).is_ok()
    }

    #[test]
    fn admin_may_do_everything() {
        for operation in ALL {
            assert!(allowed(Role::Admin, operation), "{operation}");
        }
    }

    #[test]
    fn user_may_read_and_edit_hosts_only() {
        let permitted: Vec<_> = ALL
            .into_iter()
            .filter(|operation| allowed(Role::User, *operation))
            .collect();
        assert_eq!(
            permitted,
            [
                Operation::ListHosts,
                Operation::GetHost,
                Operation::CreateHost,
                Operation::UpdateHost,
                Operation::ListGroups,
                Operation::GetGroup,
            ]
        );
    }

    #[test]
    fn viewer_may_only_read_hosts_and_groups() {
        let permitted: Vec<_> = ALL
            .into_iter()
            .filter(|operation| allowed(Role::Viewer, *operation))
            .collect();
        assert_eq!(
            permitted,
            [
                Operation::ListHosts,
                Operation::GetHost,
                Operation::ListGroups,
                Operation::GetGroup,
            ]
        );
    }

    #[test]
    fn users_may_read_their_own_record() {
        let viewer = Principal::new("bob", vec![Role::Viewer]);
        assert!(AccessPolicy::authorize(Operation::GetUser, &viewer, Some("bob")).is_ok());
        let err = AccessPolicy::authorize(Operation::GetUser, &viewer, Some("alice"))
            .expect_err("other user");
        assert!(matches!(
            err,
            EncError::Forbidden {
                operation: "get_user",
                ..
            }
        ));

        let roleless = Principal::new("carol", Vec::new());
        assert!(AccessPolicy::authorize(Operation::GetUser, &roleless, Some("carol")).is_ok());
        assert!(AccessPolicy::authorize(Operation::ListHosts, &roleless, None).is_err());
    }
}
