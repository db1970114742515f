//! Bookstore demo: authors and books served as HAL JSON
//!
//! ```text
//! cargo run --example bookstore
//! curl -X POST localhost:3000/authors -d '{"name":"Frank Herbert"}'
//! curl -X POST localhost:3000/authors/1/books -d '{"title":"Dune","pages":412}'
//! curl 'localhost:3000/books?order=title%20desc&limit=10'
//! ```

use halo::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let schema = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/bookstore/schema.yaml");

    ServerBuilder::new()
        .with_config_file(schema)?
        .register_type(
            EntityTypeDescriptor::new("tag")
                .with_property(
                    PropertyDescriptor::new("label", PropertyKind::String)
                        .with_rule(PropertyRule::Required),
                ),
        )
        .serve("127.0.0.1:3000")
        .await
}
