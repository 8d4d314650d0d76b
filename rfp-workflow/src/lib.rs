//! # RFP Workflow
//!
//! Carries a single RFP question from raw text to a reviewed answer:
//! category prediction, response generation with precedent lookup, optional
//! human edit, and an accept/reject review gate. Alongside the question flow
//! it uploads RFP spreadsheets and tracks the versions the portal stores for
//! them.
//!
//! [`Workflow`] is the entry point. It talks to the services only through
//! the traits in [`rfp_sdk::client`], so tests can substitute in-memory
//! collaborators.

pub mod category;
pub mod config;
pub mod diff;
pub mod documents;
pub mod error;
pub mod events;
pub mod generator;
pub mod orchestrator;
pub mod review;
pub mod session;
pub mod spreadsheet;

pub use category::{CategoryResolver, Taxonomy};
pub use config::WorkflowConfig;
pub use diff::{diff, DiffSpan, DiffTag};
pub use documents::{DocumentVersionCoordinator, RfpDocument, RfpVersion, SourceDocument};
pub use error::{Result, WorkflowError};
pub use events::WorkflowEvent;
pub use generator::{GeneratedResponse, ResponseGenerator, SimilarPrecedent};
pub use orchestrator::Workflow;
pub use review::{ReviewDiff, ReviewItem, ReviewStateMachine, ReviewStatus};
pub use session::{SessionContext, SessionState};
