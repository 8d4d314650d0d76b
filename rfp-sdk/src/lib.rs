//! # RFP SDK
//!
//! Typed async clients for the two services behind the RFP workflow: the
//! *portal*, which stores categories, documents, versions and review records,
//! and the *model service*, which predicts categories, generates answers and
//! looks up precedents.
//!
//! The workflow core only depends on the traits in [`client`]; the
//! reqwest-backed [`http::RfpHttpClient`] implements all of them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rfp_sdk::{client::GenerationService, http::RfpHttpClient, types::GenerateRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RfpHttpClient::new("http://localhost:8085", "http://localhost:8000")?;
//!     let generated = client
//!         .generate_response(GenerateRequest {
//!             query: "Describe your data retention policy".to_string(),
//!             label: "Compliance".to_string(),
//!         })
//!         .await?;
//!
//!     println!("Response: {}", generated.response);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{CategorizationService, GenerationService, PersistenceService};
pub use error::SdkError;
pub use http::RfpHttpClient;
