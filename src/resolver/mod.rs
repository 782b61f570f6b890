//! Lyrics resolution - finds the best lyrics match across external sources.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`lrclib/dto.rs`, `ovh/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Matcher** (`matcher.rs`) - Similarity scoring and deterministic selection
//! - **Engine** (`engine.rs`) - Concurrent fan-out with timeouts and a deadline
//!
//! This decoupling means:
//! 1. API changes don't ripple through our codebase
//! 2. We can test API contracts independently
//! 3. New sources add a module and a `LyricsSource` impl without touching
//!    the engine

pub mod domain;
pub mod engine;
pub mod lrclib;
pub mod matcher;
pub mod ovh;
pub mod traits;

pub use domain::{Candidate, LyricsResolution, LyricsResult, Query, SourceError, SourceId};
pub use engine::Resolver;
pub use matcher::Matcher;
pub use traits::LyricsSource;
