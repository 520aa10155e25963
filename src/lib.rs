//! # jtbd-insight: Theme Extraction and Clustering for JTBD Interviews
//!
//! A deterministic rule engine that maps free-text interview notes onto a
//! fixed 13-dimension "core theme" space, followed by a cosine k-means
//! clusterer with silhouette-based model selection.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         API Layer                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Core           │  Extraction        │  Clustering           │
//! │ • Themes        │ • Cue lexicon      │ • Vector builder      │
//! │ • Matrix        │ • Segmenter        │ • Cosine k-means      │
//! │ • Config        │ • Rule stages      │ • Silhouette selector │
//! │ • Errors        │ • Quantizer        │ • Cluster describer   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The interview matrix (`[[id, {theme: weight}], ...]`) is the contract
//! between the two halves: extraction produces it, clustering consumes it,
//! and external callers may supply their own.
//!
//! ## Quick Start
//!
//! ```rust
//! use jtbd_insight::{JtbdConfig, JtbdEngine};
//!
//! let engine = JtbdEngine::new(JtbdConfig::default()).unwrap();
//! let report = engine.run(
//!     "We wait forever for support and it costs too much.\n\nThe price is way too high every month.",
//!     &["cost".to_string()],
//!     None,
//! );
//! println!("{} cluster(s): {}", report.clustering.k_selected, report.clustering.note);
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Shared data model, configuration and errors
pub mod core {
    //! Core data model and configuration.

    pub mod config;
    pub mod errors;
    pub mod matrix;
    pub mod themes;
}

// Text -> interview matrix
pub mod extraction;

// Interview matrix -> clusters
pub mod clustering;

// Public API and engine interface
pub mod api {
    //! High-level API and engine interface.

    pub mod engine;
    pub mod requests;
}

// Re-export primary types for convenience
pub use api::engine::{InsightReport, JtbdEngine};
pub use api::requests::ClusterRequest;
pub use clustering::{ClusterInput, ClusterSummary, ClusteringOutput, ThemeClusterer};
pub use core::config::{JtbdConfig, KRange};
pub use core::errors::{JtbdError, Result};
pub use core::matrix::{InterviewMatrix, RawWeight, ThemeWeightMap};
pub use core::themes::{CoreTheme, Magnitude};
pub use extraction::{ExtractionOutput, ThemeExtractor};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
