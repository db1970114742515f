//! Loading, merging and validating YAML entity declarations

use axum::http::StatusCode;
use axum_test::TestServer;
use halo::prelude::*;
use serde_json::{Value, json};
use std::io::Write;
use tempfile::NamedTempFile;

const AUTHORS: &str = r#"
entities:
  - name: author
    properties:
      - { name: name, kind: string, rules: [required] }
      - { name: email, kind: string, rules: [{ format: email }] }
    relationships:
      - { name: books, cardinality: to_many, target: book }
"#;

const BOOKS: &str = r#"
server:
  default_limit: 2
  max_limit: 5
entities:
  - name: book
    properties:
      - { name: title, kind: string, rules: [required, { max_length: 40 }] }
      - { name: genre, kind: string, rules: [{ one_of: [fiction, poetry] }] }
    relationships:
      - { name: author, cardinality: to_one, target: author }
"#;

fn write_yaml(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_yaml(AUTHORS);
    let config = HaloConfig::from_yaml_file(file.path()).unwrap();

    assert_eq!(config.entities.len(), 1);
    assert_eq!(config.entities[0].name, "author");
    assert_eq!(config.server.default_limit, 30);
}

#[test]
fn test_missing_file_error_names_path() {
    let err = HaloConfig::from_yaml_file("/nonexistent/schema.yaml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/schema.yaml"));
}

#[test]
fn test_unknown_rule_rejected() {
    let yaml = r#"
entities:
  - name: book
    properties:
      - { name: title, kind: string, rules: [mandatory] }
"#;
    assert!(HaloConfig::from_yaml_str(yaml).is_err());
}

#[test]
fn test_unknown_target_rejected_at_registry_build() {
    let yaml = r#"
entities:
  - name: book
    relationships:
      - { name: publisher, cardinality: to_one, target: publisher }
"#;
    let config = HaloConfig::from_yaml_str(yaml).unwrap();
    let err = config.build_registry().unwrap_err();
    assert!(matches!(err, ConfigError::UnknownTarget { .. }));
}

#[test]
fn test_merge_resolves_cross_file_relationships() {
    let merged = HaloConfig::merge(vec![
        HaloConfig::from_yaml_str(AUTHORS).unwrap(),
        HaloConfig::from_yaml_str(BOOKS).unwrap(),
    ]);
    let registry = merged.build_registry().unwrap();

    assert_eq!(registry.entity_types(), vec!["author", "book"]);
    assert_eq!(merged.server.max_limit, 5);
    assert!(registry.resolve("books").is_ok());
}

#[tokio::test]
async fn test_builder_serves_config_files() {
    let authors = write_yaml(AUTHORS);
    let books = write_yaml(BOOKS);
    let router = ServerBuilder::new()
        .with_config_file(authors.path())
        .unwrap()
        .with_config_file(books.path())
        .unwrap()
        .build()
        .unwrap();
    let server = TestServer::try_new(router).unwrap();

    let response = server
        .post("/authors")
        .json(&json!({ "name": "Ursula", "email": "not-an-address" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body, json!({ "errors": ["email is invalid"] }));

    let response = server
        .post("/books")
        .json(&json!({ "title": "Earthsea", "genre": "cookbook" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    for title in ["A", "B", "C"] {
        server
            .post("/books")
            .json(&json!({ "title": title, "genre": "fiction" }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = server.get("/books").await.json();
    assert_eq!(body["limit"], 2);
    assert_eq!(body["size"], 2);

    let body: Value = server.get("/books").add_query_param("limit", "50").await.json();
    assert_eq!(body["limit"], 5);
    assert_eq!(body["size"], 3);
}
