//! Lytics SDK for Rust.
//!
//! A client library for the Lytics customer data platform REST API: accounts,
//! data streams and schemas, LQL queries, entities, data collection, campaigns,
//! content classification, subscriptions, access tokens and segments.
//!
//! # What This SDK Provides
//!
//! - High-level workflow client: [`LyticsClient`]
//! - Typed REST API access: [`api::LyticsApi`]
//! - Response envelope classification: [`envelope::normalize`]
//! - Entity fragment hashing and graphs: [`fragments`]
//! - Backend-compatible identifier hashing: [`siphash`]
//! - CSV/JSON record readers for query testing: [`readers`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lytics_sdk::{LyticsClient, LyticsConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lytics_sdk::LyticsError> {
//!     let client = LyticsClient::new(LyticsConfig::new("my-api-key"))?;
//!
//!     for account in client.api.get_accounts().await? {
//!         println!("{} {:?}", account.aid, account.name);
//!     }
//!
//!     // Lookups of objects that may not exist return Option.
//!     if let Some(schema) = client.api.get_table_schema("user").await? {
//!         println!("{} columns", schema.columns.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Common Tasks
//!
//! ## Testing LQL
//!
//! ```rust,no_run
//! use lytics_sdk::{LyticsClient, Record};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lytics_sdk::LyticsError> {
//!     let client = LyticsClient::from_env()?;
//!
//!     let lql = "SELECT email AS email FROM data INTO user BY email ALIAS test_email";
//!     if client.api.validate_query(lql).await? {
//!         let mut record = Record::new();
//!         record.insert("email".into(), json!("jane@example.com"));
//!         println!("{:?}", client.api.test_query(lql, &record).await?);
//!     }
//!
//!     println!("{:?}", client.test_function("todate", &["2024-01-01"]).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Whitelisted Fields
//!
//! ```rust,no_run
//! use lytics_sdk::LyticsClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lytics_sdk::LyticsError> {
//!     let client = LyticsClient::from_env()?;
//!     let changed = client.set_whitelist_field_status(1234, "email", true).await?;
//!     println!("changed: {changed}");
//!     println!("{:?}", client.api.get_whitelist_fields(1234).await?);
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! This crate emits debug-level logs through the [`log`](https://docs.rs/log/) facade
//! for API and client calls. Configure any compatible logger in your binary, then set
//! `RUST_LOG=debug` to inspect request flow. Errors are returned, never logged.
//!
//! # Errors
//!
//! All fallible operations return [`LyticsError`]:
//!
//! - Argument validation failures (`InvalidArgument`), raised before any request
//! - Remote failures with the HTTP status and envelope (`RemoteOperation`)
//! - Transport/serialization failures (`HttpError`, `JsonError`, etc.)
//!
//! See [`guides::error_handling`] for recovery patterns.
//!
//! # Guides
//!
//! - [`guides::error_handling`] — Error types, absent objects and failures
//! - [`guides::entity_fragments`] — Fragment hashing and graph rendering
pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod fragments;
pub mod guides;
pub mod models;
pub mod readers;
pub mod siphash;
pub mod transport;

// Re-export primary types for convenience.
pub use api::{LyticsApi, Reply};
pub use client::LyticsClient;
pub use config::LyticsConfig;
pub use errors::LyticsError;
pub use fragments::{Fragment, FragmentGraph, FragmentHash, FragmentKey};
pub use models::*;
pub use transport::{HttpTransport, RawResponse, Request, Transport};
