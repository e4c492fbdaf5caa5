//! Tagged directory identifiers
//!
//! Feishu exposes two id spaces for every department and user: a stable
//! tenant-wide id and an app-scoped "open" id. Every API boundary takes an
//! [`Identifier`] so the value and the id-type query parameter cannot drift
//! apart.

use std::fmt;

use crate::error::{OrgError, Result};

/// Which id space an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdKind {
    /// Tenant-wide id (`department_id` / `user_id`)
    #[default]
    Stable,
    /// App-scoped open id (`open_department_id` / `open_id`)
    Scoped,
}

impl IdKind {
    /// Value for the `department_id_type` query parameter
    pub fn department_id_type(self) -> &'static str {
        match self {
            IdKind::Stable => "department_id",
            IdKind::Scoped => "open_department_id",
        }
    }

    /// Value for the `user_id_type` query parameter
    pub fn user_id_type(self) -> &'static str {
        match self {
            IdKind::Stable => "user_id",
            IdKind::Scoped => "open_id",
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Stable => write!(f, "id"),
            IdKind::Scoped => write!(f, "openid"),
        }
    }
}

/// Id spaces requested for departments and users in one command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdSelectors {
    pub department: IdKind,
    pub user: IdKind,
}

impl IdSelectors {
    pub fn new(department: IdKind, user: IdKind) -> Self {
        Self { department, user }
    }
}

/// A department or user id together with its id space
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub kind: IdKind,
    pub value: String,
}

impl Identifier {
    pub fn new(kind: IdKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn stable(value: impl Into<String>) -> Self {
        Self::new(IdKind::Stable, value)
    }

    pub fn scoped(value: impl Into<String>) -> Self {
        Self::new(IdKind::Scoped, value)
    }

    /// Return the trimmed value, or a validation error naming `what` when empty.
    pub fn require(&self, what: &str) -> Result<&str> {
        let value = self.value.trim();
        if value.is_empty() {
            return Err(OrgError::Validation(format!("{} must not be empty", what)));
        }
        Ok(value)
    }

    /// URL-encoded value for use as a path segment
    pub fn encoded(&self) -> String {
        urlencoding::encode(self.value.trim()).into_owned()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.kind)
    }
}
