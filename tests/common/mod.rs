//! Shared fixtures for the wiremock-backed integration tests

#![allow(dead_code)]

use discourse_client::{ClientConfig, DiscourseClient};
use serde_json::{json, Value};
use std::collections::HashMap;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const API_KEY: &str = "super-secret-key";
pub const API_USERNAME: &str = "system";

/// Start a mock forum and a client pointed at it
pub async fn setup() -> (MockServer, DiscourseClient) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(&server.uri(), API_KEY)
        .expect("mock server URI is valid")
        .with_api_username(API_USERNAME);
    let client = DiscourseClient::new(config).expect("client should build");
    (server, client)
}

/// Decoded query string of a received request
pub fn query_map(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

/// Decoded form body of a received request
pub fn form_map(request: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

pub async fn received(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
}

/// Respond to any request with the given verb with 200 but expect none
pub async fn forbid(server: &MockServer, verb: &str) {
    Mock::given(method(verb))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .named(format!("no {verb} requests"))
        .mount(server)
        .await;
}

pub fn category_list(categories: Value) -> Value {
    json!({"category_list": {"categories": categories}})
}

/// Top-level categories listing (no parent filter)
pub async fn mount_top_level_categories(server: &MockServer, categories: Value) {
    Mock::given(method("GET"))
        .and(path("/categories.json"))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(category_list(categories)))
        .with_priority(10)
        .mount(server)
        .await;
}

pub async fn mount_active_users(server: &MockServer, email: &str, users: Value) {
    Mock::given(method("GET"))
        .and(path("/admin/users/list/active.json"))
        .and(query_param("filter", email))
        .and(query_param("show_emails", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users))
        .mount(server)
        .await;
}

pub async fn mount_groups(server: &MockServer, groups: Value) {
    Mock::given(method("GET"))
        .and(path("/admin/groups.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(groups))
        .mount(server)
        .await;
}
