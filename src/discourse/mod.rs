//! Discourse API interaction module
//!
//! # Module Structure
//!
//! - [`http`] - Authenticated request gateway
//! - [`client`] - [`DiscourseClient`], which wires the resource clients together
//! - [`users`] - User lookup, creation and deletion
//! - [`groups`] - Groups and group membership
//! - [`categories`] - Category lookup, creation and deletion
//! - [`content`] - Topic listings and posts
//!
//! # Example
//!
//! ```no_run
//! use discourse_client::{ClientConfig, DiscourseClient};
//!
//! async fn example() -> discourse_client::Result<()> {
//!     let config = ClientConfig::new("https://forum.example.com", "api-key")?;
//!     let client = DiscourseClient::new(config)?;
//!     client.groups.add_member_by_email("peyton@example.com", "quarterbacks").await?;
//!     Ok(())
//! }
//! ```

pub mod categories;
pub mod client;
pub mod content;
pub mod groups;
pub mod http;
pub mod users;

pub use client::DiscourseClient;
