use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User {user} lacks permission {permission:?}")]
    Forbidden { user: String, permission: Permission },
    #[error("Malformed credential entry: {0}")]
    MalformedEntry(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    View,
    Add,
    Remove,
    Export,
    Archive,
    ManageUsers,
    ManageAccounts,
}

impl Role {
    pub fn has_permission(self, permission: Permission) -> bool {
        match self {
            Role::Admin => true,
            Role::Viewer => permission == Permission::View,
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            other => Err(AuthError::MalformedEntry(format!("unknown role '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub username: String,
    pub role: Role,
}

impl User {
    pub fn require(&self, permission: Permission) -> Result<(), AuthError> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                user: self.username.clone(),
                permission,
            })
        }
    }
}

pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> Option<User>;

    fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.verify(username, password)
            .ok_or(AuthError::InvalidCredentials)
    }
}

struct Entry {
    username: String,
    password: String,
    role: Role,
}

/// Credentials supplied through configuration.
pub struct StaticCredentials {
    entries: Vec<Entry>,
}

impl StaticCredentials {
    /// Parses `name:password:role` entries separated by commas.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let mut entries = Vec::new();

        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            // passwords may contain ':', the role is always last
            let (rest, role) = item
                .rsplit_once(':')
                .ok_or_else(|| AuthError::MalformedEntry(item.to_string()))?;
            let (username, password) = rest
                .split_once(':')
                .ok_or_else(|| AuthError::MalformedEntry(item.to_string()))?;

            if username.is_empty() || password.is_empty() {
                return Err(AuthError::MalformedEntry(item.to_string()));
            }

            entries.push(Entry {
                username: username.to_string(),
                password: password.to_string(),
                role: role.parse()?,
            });
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<User> {
        self.entries
            .iter()
            .find(|e| e.username == username && e.password == password)
            .map(|e| User {
                username: e.username.clone(),
                role: e.role,
            })
    }
}
