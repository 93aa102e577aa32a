//! Discourse Client
//!
//! Builds one gateway and wires the resource clients to it. Construct it
//! once and pass it around by reference (or clone it; clones share the
//! underlying connection pool).

use super::categories::CategoryClient;
use super::content::ContentClient;
use super::groups::GroupClient;
use super::http::DiscourseHttpClient;
use super::users::UserClient;
use crate::config::ClientConfig;
use crate::error::Result;

/// Entry point for all Discourse operations
#[derive(Clone)]
pub struct DiscourseClient {
    pub http: DiscourseHttpClient,
    pub users: UserClient,
    pub groups: GroupClient,
    pub categories: CategoryClient,
    pub content: ContentClient,
}

impl DiscourseClient {
    /// Create a new client for the configured site
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = DiscourseHttpClient::new(config)?;
        Ok(Self::from_http(http))
    }

    /// Wire the resource clients around an existing gateway
    pub fn from_http(http: DiscourseHttpClient) -> Self {
        let users = UserClient::new(http.clone());
        let groups = GroupClient::new(http.clone(), users.clone());
        let categories = CategoryClient::new(http.clone());
        let content = ContentClient::new(http.clone(), categories.clone());

        tracing::debug!("Discourse client ready for {}", http.config().base_url());

        Self {
            http,
            users,
            groups,
            categories,
            content,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.http.config()
    }
}
