//! # colchart-feed
//!
//! Live column charts. A chart observes a [`BatchFeed`], recomputes its full
//! geometry on every batch and keeps the latest [`ChartSnapshot`] for a
//! renderer to pick up.
//!
//! ## Modules
//!
//! - `feed` - Hot in-process batch source and cancellable subscriptions
//! - `pipeline` - Normalize + layout strategies for plain, grouped and stacked charts
//! - `chart` - Chart instances holding at most one subscription
//! - `config` - Serializable chart configuration
//! - `pump` - Forward async streams into a feed

pub mod chart;
pub mod config;
pub mod feed;
pub mod pipeline;
pub mod pump;

pub use chart::*;
pub use config::*;
pub use feed::*;
pub use pipeline::*;
pub use pump::*;

pub use colchart_core::{ChartError, Result};
