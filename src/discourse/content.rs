//! Discourse Content
//!
//! Topic listings and topic/post retrieval. Categories are addressed by
//! numeric id; listings return the contents of the `topic_list` envelope.

use super::categories::CategoryClient;
use super::http::{params, DiscourseHttpClient, Params};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page of topics (30 per page, decided by the server)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicList {
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_topics_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A topic with its post stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicDetail {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub post_stream: PostStream,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostStream {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooked: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct TopicListResponse {
    topic_list: TopicList,
}

/// Listing path for the category selection
///
/// A parent id without a category id selects nothing and falls back to the
/// latest feed.
pub fn topics_path(category_id: Option<u64>, parent_category_id: Option<u64>) -> String {
    match (category_id, parent_category_id) {
        (Some(category), Some(parent)) => format!("c/{parent}/{category}.json"),
        (Some(category), None) => format!("c/{category}.json"),
        (None, _) => "latest.json".to_string(),
    }
}

/// Client for content-related actions
#[derive(Clone)]
pub struct ContentClient {
    http: DiscourseHttpClient,
    categories: CategoryClient,
}

impl ContentClient {
    pub fn new(http: DiscourseHttpClient, categories: CategoryClient) -> Self {
        Self { http, categories }
    }

    pub async fn list_topics(
        &self,
        category_id: Option<u64>,
        parent_category_id: Option<u64>,
        page: u32,
    ) -> Result<TopicList> {
        let path = topics_path(category_id, parent_category_id);
        let response = self
            .http
            .get(&path, Some(params([("page", page.to_string())])))
            .await?;
        let listing: TopicListResponse = serde_json::from_value(response)?;
        Ok(listing.topic_list)
    }

    pub async fn get_topic(&self, topic_id: u64) -> Result<TopicDetail> {
        let response = self.http.get(&format!("t/{topic_id}.json"), None).await?;
        Ok(serde_json::from_value(response)?)
    }

    pub async fn get_topic_last_post(&self, topic_id: u64) -> Result<Post> {
        let response = self
            .http
            .get(&format!("t/{topic_id}/last.json"), None)
            .await?;
        let topic: TopicDetail = serde_json::from_value(response)?;

        topic
            .post_stream
            .posts
            .into_iter()
            .last()
            .ok_or_else(|| Error::NotFound(format!("posts in topic {topic_id}")))
    }

    /// Open a new topic in the named top-level category
    pub async fn create_topic(
        &self,
        title: &str,
        raw: &str,
        category_name: &str,
        extra_fields: &Params,
    ) -> Result<Value> {
        let category = self
            .categories
            .find_by_name(category_name, None)
            .await?
            .ok_or_else(|| Error::NotFound(format!("category named {category_name}")))?;

        let mut payload = params([
            ("title", title.to_string()),
            ("raw", raw.to_string()),
            ("category", category.id.to_string()),
        ]);
        payload.extend(extra_fields.iter().map(|(k, v)| (k.clone(), v.clone())));

        tracing::info!("Creating topic {:?} in {}", title, category_name);
        self.http.post("posts", payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_path_branches() {
        assert_eq!(topics_path(Some(17), Some(4)), "c/4/17.json");
        assert_eq!(topics_path(Some(17), None), "c/17.json");
        assert_eq!(topics_path(None, None), "latest.json");
        assert_eq!(topics_path(None, Some(4)), "latest.json");
    }
}
