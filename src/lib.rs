//! Async admin client for the Discourse forum API.
//!
//! Operations on users, groups, categories and topics are translated into
//! authenticated, form-encoded HTTP calls. Create and delete operations are
//! idempotent by default: creating something that exists, or deleting
//! something that does not, returns `Ok(None)` without a mutating request.
//! Pass `strict = true` to get [`Error::Duplicate`] / [`Error::NotFound`]
//! instead.

pub mod config;
pub mod discourse;
pub mod error;

pub use config::{ClientConfig, Config, DEFAULT_API_USERNAME};
pub use discourse::categories::{Category, CategoryClient};
pub use discourse::content::{ContentClient, Post, Topic, TopicDetail, TopicList};
pub use discourse::groups::{
    Group, GroupClient, GroupMember, GroupMembers, MembersMeta, DEFAULT_MEMBERS_LIMIT,
};
pub use discourse::http::{DiscourseHttpClient, Params};
pub use discourse::users::{NewUser, User, UserClient};
pub use discourse::DiscourseClient;
pub use error::{Error, Result};
