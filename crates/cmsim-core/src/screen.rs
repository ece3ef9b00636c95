// ── Screen presets ──
//
// Everything that differs between the instance, device and station screens.
// The controller, store and fetcher are generic over these values.

use crate::error::CoreError;

/// Rows per page on every dashboard screen.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Endpoint and labelling parameters for one browser screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenConfig {
    /// Plural resource name, used in fallback error messages.
    pub resource_label: &'static str,
    /// Plural master name, used in the master fallback message.
    pub master_label: &'static str,
    /// `GET` path returning the full master list.
    pub master_path: &'static str,
    /// `POST` path accepting `{ pageNum, pageSize, <owner_field>? }`.
    pub page_path: &'static str,
    /// Body field carrying the selected owner id. `None` means the selection
    /// never constrains the query.
    pub owner_field: Option<&'static str>,
    pub page_size: u32,
}

impl ScreenConfig {
    /// Master-station boards, filtered by instance.
    pub fn devices() -> Self {
        Self {
            resource_label: "devices",
            page_path: "/device/queryPage",
            owner_field: Some("instanceId"),
            ..Self::base()
        }
    }

    /// Remote terminal stations, filtered by instance.
    pub fn stations() -> Self {
        Self {
            resource_label: "stations",
            page_path: "/rcstInfo/queryPage",
            owner_field: Some("instanceId"),
            ..Self::base()
        }
    }

    /// The paginated instance table.
    pub fn instances() -> Self {
        Self {
            resource_label: "instances",
            page_path: "/instance/queryPage",
            owner_field: None,
            ..Self::base()
        }
    }

    fn base() -> Self {
        Self {
            resource_label: "",
            master_label: "instances",
            master_path: "/instance/list",
            page_path: "",
            owner_field: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size for the session.
    pub fn with_page_size(mut self, page_size: u32) -> Result<Self, CoreError> {
        if page_size == 0 {
            return Err(CoreError::ValidationFailed {
                message: "page size must be at least 1".into(),
            });
        }
        self.page_size = page_size;
        Ok(self)
    }

    /// Message shown when a page fetch fails without a server message.
    pub fn page_fallback(&self) -> String {
        format!("failed to load {}", self.resource_label)
    }

    /// Message shown when the master load fails without a server message.
    pub fn master_fallback(&self) -> String {
        format!("failed to load {}", self.master_label)
    }
}
