//! Discourse Users
//!
//! Lookup by email or username, account creation and deletion.

use super::http::{params, DiscourseHttpClient, Params};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Discourse user account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub username: String,
    pub external_id: Option<String>,
}

impl NewUser {
    fn to_payload(&self) -> Params {
        let mut payload = params([
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("username", self.username.clone()),
            ("active", "true".to_string()),
        ]);
        if let Some(external_id) = self.external_id.as_deref().filter(|id| !id.is_empty()) {
            payload.insert("external_id".to_string(), external_id.to_string());
        }
        payload
    }
}

/// Case-insensitive exact comparison of a stored email against a query
pub fn email_matches(stored: &str, query: &str) -> bool {
    stored.to_lowercase() == query.to_lowercase()
}

/// Client for user-related actions
#[derive(Clone)]
pub struct UserClient {
    http: DiscourseHttpClient,
}

impl UserClient {
    pub fn new(http: DiscourseHttpClient) -> Self {
        Self { http }
    }

    /// Find the active user with the given email
    ///
    /// The server-side filter is a superset match, so results are narrowed
    /// to an exact, case-insensitive email match.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = params([
            ("filter", email.to_string()),
            ("show_emails", "true".to_string()),
        ]);
        let response = self
            .http
            .get("admin/users/list/active.json", Some(query))
            .await?;
        let users: Vec<User> = serde_json::from_value(response)?;

        Ok(users.into_iter().find(|user| {
            user.email
                .as_deref()
                .is_some_and(|stored| email_matches(stored, email))
        }))
    }

    /// Find a user by username; a 404 from the API means no such user
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let path = format!("admin/users/{}.json", urlencoding::encode(username));
        match self.http.get(&path, None).await {
            Ok(response) => Ok(Some(serde_json::from_value(response)?)),
            Err(e) if e.status() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create an account; uniqueness is enforced by the server
    pub async fn create(&self, user: &NewUser) -> Result<Value> {
        tracing::info!("Creating user {}", user.username);
        self.http.post("users", user.to_payload()).await
    }

    /// Delete the account with the given email
    ///
    /// Returns `Ok(None)` without deleting anything when the user does not
    /// exist and `strict` is false.
    pub async fn delete(&self, email: &str, strict: bool) -> Result<Option<Value>> {
        let Some(user) = self.find_by_email(email).await? else {
            if strict {
                return Err(Error::NotFound(format!("user with email {email}")));
            }
            tracing::info!("No user with email {}, nothing to delete", email);
            return Ok(None);
        };

        let response = self
            .http
            .delete(&format!("admin/users/{}.json", user.id), None)
            .await?;
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peyton() -> NewUser {
        NewUser {
            name: "Peyton Manning".to_string(),
            email: "peyton18@example.com".to_string(),
            password: "omahaomaha".to_string(),
            username: "peyton18".to_string(),
            external_id: None,
        }
    }

    #[test]
    fn test_payload_omits_missing_external_id() {
        let payload = peyton().to_payload();
        assert_eq!(payload.get("username").unwrap(), "peyton18");
        assert_eq!(payload.get("active").unwrap(), "true");
        assert!(!payload.contains_key("external_id"));
    }

    #[test]
    fn test_payload_includes_external_id() {
        let user = NewUser {
            external_id: Some("u-18".to_string()),
            ..peyton()
        };
        assert_eq!(user.to_payload().get("external_id").unwrap(), "u-18");
    }

    #[test]
    fn test_email_matches_is_case_insensitive_and_exact() {
        assert!(email_matches("peyton@example.com", "Peyton@Example.com"));
        assert!(!email_matches("peyton@example.com", "peyton@example"));
        assert!(!email_matches("peyton@example.com.au", "peyton@example.com"));
    }

    #[test]
    fn test_user_keeps_unknown_fields() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 18,
            "username": "peyton18",
            "email": "peyton18@example.com",
            "trust_level": 2
        }))
        .unwrap();
        assert_eq!(user.extra.get("trust_level"), Some(&Value::from(2)));
        assert_eq!(user.name, None);
    }
}
