//! In-memory user directory.
//!
//! Stands in for a real credential store: a fixed list of users is seeded
//! at process start and never mutated. The lookup surface (`find_by_email`,
//! `find_by_id`) is deliberately narrow so a persistent store can be
//! substituted without touching call sites.

use serde::{Deserialize, Serialize};

use crate::auth::password;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Tutor,
    Tutee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Tutor => "tutor",
            UserRole::Tutee => "tutee",
        }
    }
}

/// A directory user, password hash included. Never serialized.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub password_hash: String,
}

/// User projection with the password hash stripped. This is the only user
/// shape that crosses the API boundary.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Immutable in-memory user directory.
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    /// Build a directory from an explicit user list.
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Build the default seeded directory. Passwords are bcrypt-hashed at
    /// startup; the hashing cost makes this a one-time expense per process.
    pub fn seeded() -> Self {
        let seed = [
            ("1", "Demo Tutor", "tutor@example.com", UserRole::Tutor),
            ("2", "Demo Tutee", "tutee@example.com", UserRole::Tutee),
            ("3", "Second Tutee", "tutee2@example.com", UserRole::Tutee),
        ];

        let users = seed
            .into_iter()
            .map(|(id, name, email, role)| User {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                role,
                password_hash: password::hash("password")
                    .expect("Failed to hash seed password"),
            })
            .collect();

        Self { users }
    }

    /// Case-insensitive lookup by email.
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Lookup by user id. Absence is not an error.
    pub fn find_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Verify an email/password pair. Returns the matching user only when
    /// both the lookup and the hash comparison succeed; unknown email and
    /// wrong password are indistinguishable to the caller.
    pub fn authenticate(&self, email: &str, plain: &str) -> Option<&User> {
        let user = self.find_by_email(email)?;
        if password::verify(plain, &user.password_hash) {
            Some(user)
        } else {
            None
        }
    }
}
