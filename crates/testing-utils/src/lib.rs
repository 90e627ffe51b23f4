//! # Paperboy Testing Utils
//!
//! Shared testing utilities for the paperboy workspace.
//!
//! - **Mocks**: in-memory `SummaryRepository`, `ContentSource` and `Transformer`
//!   with call counters and scripted failures
//! - **Builders**: `ArticleBuilder` and `SummaryBuilder` with sensible defaults
//!
//! Add this crate as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! paperboy-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod mocks;

pub use builders::*;
pub use mocks::*;
