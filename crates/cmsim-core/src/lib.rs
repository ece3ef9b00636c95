//! Browsing logic between `cmsim-api` and UI consumers (CLI).
//!
//! One generic controller backs the instance, device and station screens:
//!
//! - **[`BrowserController`]**: Synchronous state machine over selection,
//!   page and generation. Every user intent returns the [`Effect`]s (network
//!   work) it requires; completions are fed back through
//!   [`master_loaded`](BrowserController::master_loaded) and
//!   [`page_loaded`](BrowserController::page_loaded).
//!
//! - **[`Browser`]**: Async driver that runs each effect on its own tokio
//!   task and applies completions one at a time, so newer intents can be
//!   issued while older requests are still in flight.
//!
//! - **[`MasterListStore`]**: The unpaginated instance list with its load
//!   state, plus the filtered view produced by [`filter_by_display_key`].
//!
//! - **[`DependentPageFetcher`]**: Issues one page query per call and tags
//!   the result as applied or stale by comparing generations at resolution
//!   time.
//!
//! - **[`Gateway`]**: The request seam. Implemented for
//!   [`SimulatorClient`]; tests substitute their own.
//!
//! - **[`instances`]**: Instance lookup and the validated add/edit pair.

pub mod browser;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod gateway;
pub mod instances;
pub mod master;
pub mod model;
pub mod screen;

// ── Primary re-exports ──────────────────────────────────────────────
pub use browser::Browser;
pub use config::{ClientConfig, TlsVerification};
pub use controller::{BrowserController, DependentState, Effect};
pub use error::CoreError;
pub use fetcher::{DependentPageFetcher, FetchOutcome, PageRequest};
pub use filter::filter_by_display_key;
pub use gateway::Gateway;
pub use master::{LoadStatus, MasterListStore};
pub use model::{DependentItem, MasterItem, OwnerScope, PageWindow};
pub use screen::ScreenConfig;

// Wire types are part of the public surface.
pub use cmsim_api::{
    DEFAULT_BASE_URL, Device, DeviceState, Instance, InstanceDraft, Page, PageQuery,
    SimulatorClient, Station,
};
