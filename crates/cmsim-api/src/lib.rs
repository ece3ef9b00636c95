// cmsim-api: Async Rust client for the cm-simulator management API

pub mod client;
pub mod error;
pub mod instances;
pub mod models;
pub mod transport;

pub use client::SimulatorClient;
pub use error::Error;
pub use models::{
    ApiResponse, Device, DeviceState, Instance, InstanceDraft, OwnerFilter, Page, PageQuery,
    SUCCESS_CODE, Station,
};
pub use reqwest::Method;
pub use transport::{TlsMode, TransportConfig};

/// Default backend root used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9527/cm-simulator/api/v1";
