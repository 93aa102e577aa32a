//! Discourse Categories
//!
//! Categories are identified by `(name, parent name)`. Names are not unique
//! on the server, so the first match in listing order wins.

use super::http::{params, DiscourseHttpClient, Params};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Discourse category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_category_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    category_list: CategoryList,
}

#[derive(Deserialize)]
struct CategoryList {
    #[serde(default)]
    categories: Vec<Category>,
}

/// Payload fields sent with every new category unless overridden
fn default_payload(name: &str) -> Params {
    params([
        ("name", name.to_string()),
        ("allow_badges", "true".to_string()),
        ("color", "FFFFFF".to_string()),
        ("text_color", "000000".to_string()),
    ])
}

/// Client for category-related actions
#[derive(Clone)]
pub struct CategoryClient {
    http: DiscourseHttpClient,
}

impl CategoryClient {
    pub fn new(http: DiscourseHttpClient) -> Self {
        Self { http }
    }

    /// List categories, top-level or under the named parent
    pub async fn list(&self, parent_name: Option<&str>) -> Result<Vec<Category>> {
        let parent = match parent_name {
            Some(parent_name) => Some(self.require(parent_name, None).await?),
            None => None,
        };
        self.list_under(parent.as_ref()).await
    }

    /// Find a category by name, optionally under a named parent
    ///
    /// Returns `Ok(None)` if either the parent or the category is missing.
    pub async fn find_by_name(
        &self,
        name: &str,
        parent_name: Option<&str>,
    ) -> Result<Option<Category>> {
        let parent = match parent_name {
            Some(parent_name) => match self.find_under(parent_name, None).await? {
                Some(parent) => Some(parent),
                None => return Ok(None),
            },
            None => None,
        };
        self.find_under(name, parent.as_ref()).await
    }

    /// Create a category
    ///
    /// If it already exists this is a no-op returning `Ok(None)`, or
    /// [`Error::Duplicate`] when `strict`. A named parent that does not exist
    /// is always [`Error::NotFound`]. `extra_fields` override the defaults.
    pub async fn create(
        &self,
        name: &str,
        parent_name: Option<&str>,
        strict: bool,
        extra_fields: &Params,
    ) -> Result<Option<Value>> {
        // Resolved once and reused for the duplicate check and the payload
        let parent = match parent_name {
            Some(parent_name) => Some(self.require(parent_name, None).await?),
            None => None,
        };

        if self.find_under(name, parent.as_ref()).await?.is_some() {
            if strict {
                return Err(Error::Duplicate(format!("category named {name}")));
            }
            tracing::info!("Category {} already exists, skipping create", name);
            return Ok(None);
        }

        let mut payload = default_payload(name);
        payload.extend(extra_fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(parent) = &parent {
            payload.insert("parent_category_id".to_string(), parent.id.to_string());
        }

        tracing::info!("Creating category {}", name);
        let response = self.http.post("categories", payload).await?;
        Ok(Some(response))
    }

    /// Delete a category by name
    ///
    /// A missing category is a no-op returning `Ok(None)`, or
    /// [`Error::NotFound`] when `strict`.
    pub async fn delete(
        &self,
        name: &str,
        parent_name: Option<&str>,
        strict: bool,
    ) -> Result<Option<Value>> {
        let Some(category) = self.find_by_name(name, parent_name).await? else {
            if strict {
                return Err(Error::NotFound(format!("category named {name}")));
            }
            tracing::info!("Category {} not found, nothing to delete", name);
            return Ok(None);
        };

        // Listings without slugs still accept the numeric id
        let key = if category.slug.is_empty() {
            category.id.to_string()
        } else {
            urlencoding::encode(&category.slug).into_owned()
        };
        let path = format!("categories/{key}");
        let response = self.http.delete(&path, None).await?;
        Ok(Some(response))
    }

    async fn require(&self, name: &str, parent: Option<&Category>) -> Result<Category> {
        self.find_under(name, parent)
            .await?
            .ok_or_else(|| Error::NotFound(format!("category named {name}")))
    }

    async fn find_under(&self, name: &str, parent: Option<&Category>) -> Result<Option<Category>> {
        let categories = self.list_under(parent).await?;
        Ok(categories.into_iter().find(|c| c.name == name))
    }

    async fn list_under(&self, parent: Option<&Category>) -> Result<Vec<Category>> {
        let query = parent.map(|p| params([("parent_category_id", p.id.to_string())]));
        let response = self.http.get("categories.json", query).await?;
        let listing: CategoriesResponse = serde_json::from_value(response)?;
        Ok(listing.category_list.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_payload() {
        let payload = default_payload("Broncos");
        assert_eq!(payload.get("name").unwrap(), "Broncos");
        assert_eq!(payload.get("allow_badges").unwrap(), "true");
        assert_eq!(payload.get("color").unwrap(), "FFFFFF");
        assert_eq!(payload.get("text_color").unwrap(), "000000");
    }

    #[test]
    fn test_category_without_slug_parses() {
        let listing: CategoriesResponse = serde_json::from_value(serde_json::json!({
            "category_list": {"categories": [{"name": "Football Players", "id": 55}]}
        }))
        .unwrap();
        let category = &listing.category_list.categories[0];
        assert_eq!(category.id, 55);
        assert_eq!(category.slug, "");
        assert_eq!(category.parent_category_id, None);
    }
}
