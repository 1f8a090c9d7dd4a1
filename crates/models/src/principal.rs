use std::collections::HashSet;

/// Role that may review requests and approves its own submissions immediately
pub const ROLE_SEKRETARIAT: &str = "sekretariat";
/// Role that may submit requests for review
pub const ROLE_ORGA: &str = "orga";

/// An authenticated user as seen by the catalogue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub roles: HashSet<String>,
}

impl Principal {
    pub fn new<I, S>(name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_secretariat(&self) -> bool {
        self.has_role(ROLE_SEKRETARIAT)
    }

    /// Whether this user may submit change requests at all
    pub fn can_submit(&self) -> bool {
        self.is_secretariat() || self.has_role(ROLE_ORGA)
    }
}
