//! Discourse Groups
//!
//! Group lookup, creation and deletion, plus membership management. Adding
//! by username is the cheap path since the members endpoint is keyed by
//! username; adding by email costs one extra user lookup.

use super::http::{params, DiscourseHttpClient, Params};
use super::users::UserClient;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page size used by [`GroupClient::get_members`] callers that have no preference
pub const DEFAULT_MEMBERS_LIMIT: u32 = 50;

/// A Discourse group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of group members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupMembers {
    #[serde(default)]
    pub members: Vec<GroupMember>,
    #[serde(default)]
    pub meta: MembersMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupMember {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paging information for a member listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MembersMeta {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Client for group-related actions
#[derive(Clone)]
pub struct GroupClient {
    http: DiscourseHttpClient,
    users: UserClient,
}

impl GroupClient {
    pub fn new(http: DiscourseHttpClient, users: UserClient) -> Self {
        Self { http, users }
    }

    /// List all groups
    pub async fn list(&self) -> Result<Vec<Group>> {
        let response = self.http.get("admin/groups.json", None).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Find the group with the given name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Group>> {
        let groups = self.list().await?;
        Ok(groups.into_iter().find(|g| g.name == name))
    }

    /// Create a group; an existing group is a no-op unless `strict`
    pub async fn create(
        &self,
        name: &str,
        strict: bool,
        extra_fields: &Params,
    ) -> Result<Option<Value>> {
        if self.find_by_name(name).await?.is_some() {
            if strict {
                return Err(Error::Duplicate(format!("group named {name}")));
            }
            tracing::info!("Group {} already exists, skipping create", name);
            return Ok(None);
        }

        let mut payload = params([("name", name.to_string())]);
        payload.extend(extra_fields.iter().map(|(k, v)| (k.clone(), v.clone())));

        tracing::info!("Creating group {}", name);
        let response = self.http.post("admin/groups", payload).await?;
        Ok(Some(response))
    }

    /// Delete a group; a missing group is a no-op unless `strict`
    pub async fn delete(&self, name: &str, strict: bool) -> Result<Option<Value>> {
        let Some(group) = self.find_by_name(name).await? else {
            if strict {
                return Err(Error::NotFound(format!("group named {name}")));
            }
            tracing::info!("Group {} not found, nothing to delete", name);
            return Ok(None);
        };

        let response = self
            .http
            .delete(&format!("admin/groups/{}", group.id), None)
            .await?;
        Ok(Some(response))
    }

    pub async fn add_member_by_username(&self, username: &str, group_name: &str) -> Result<Value> {
        let group = self.require(group_name).await?;

        tracing::info!("Adding {} to group {}", username, group_name);
        self.http
            .put(
                &format!("admin/groups/{}/members.json", group.id),
                params([("usernames", username.to_string())]),
            )
            .await
    }

    /// Slower than [`GroupClient::add_member_by_username`]: resolves the user first
    pub async fn add_member_by_email(&self, email: &str, group_name: &str) -> Result<Value> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user with email {email}")))?;

        self.add_member_by_username(&user.username, group_name)
            .await
    }

    pub async fn remove_member_by_id(&self, user_id: u64, group_name: &str) -> Result<Value> {
        let group = self.require(group_name).await?;

        tracing::info!("Removing user {} from group {}", user_id, group_name);
        self.http
            .delete(
                &format!("admin/groups/{}/members.json", group.id),
                Some(params([("user_id", user_id.to_string())])),
            )
            .await
    }

    pub async fn remove_member_by_username(
        &self,
        username: &str,
        group_name: &str,
    ) -> Result<Value> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user named {username}")))?;

        self.remove_member_by_id(user.id, group_name).await
    }

    pub async fn remove_member_by_email(&self, email: &str, group_name: &str) -> Result<Value> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user with email {email}")))?;

        self.remove_member_by_id(user.id, group_name).await
    }

    /// Fetch one page of members; no aggregation across pages
    pub async fn get_members(
        &self,
        group_name: &str,
        limit: u32,
        offset: u32,
    ) -> Result<GroupMembers> {
        let path = format!("groups/{}/members.json", urlencoding::encode(group_name));
        let query = params([
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ]);
        let response = self.http.get(&path, Some(query)).await?;
        Ok(serde_json::from_value(response)?)
    }

    async fn require(&self, name: &str) -> Result<Group> {
        self.find_by_name(name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("group named {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_meta_defaults_when_absent() {
        let page: GroupMembers = serde_json::from_value(serde_json::json!({
            "members": [{"id": 18, "username": "peyton18", "name": "Peyton Manning"}]
        }))
        .unwrap();
        assert_eq!(page.members.len(), 1);
        assert_eq!(page.meta, MembersMeta::default());
    }
}
