use accessctl_auth::{Principal, Role};

/// Principal context for a request (authenticated login + role).
///
/// Inserted into request extensions by the role guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    subject: String,
    role: Role,
}

impl PrincipalContext {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

impl From<Principal> for PrincipalContext {
    fn from(principal: Principal) -> Self {
        Self::new(principal.subject, principal.role)
    }
}
