// ── Master list store ──
//
// Holds the full, unpaginated master collection for a session. Loaded on
// mount and replaced wholesale on refresh; a failed load clears it so the
// UI never shows rows next to an error.

use std::sync::Arc;

use cmsim_api::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::filter::filter_by_display_key;
use crate::gateway::{Gateway, call_decoded};
use crate::model::MasterItem;
use crate::screen::ScreenConfig;

/// Lifecycle of an asynchronously loaded panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// The master collection plus its load state.
#[derive(Debug)]
pub struct MasterListStore<M> {
    status: LoadStatus,
    items: Arc<Vec<Arc<M>>>,
    error_message: Option<String>,
}

impl<M> Default for MasterListStore<M> {
    fn default() -> Self {
        Self {
            status: LoadStatus::Idle,
            items: Arc::new(Vec::new()),
            error_message: None,
        }
    }
}

impl<M: MasterItem> MasterListStore<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_failed(&self) -> bool {
        self.status == LoadStatus::Failed
    }

    /// Current snapshot, in server order.
    pub fn items(&self) -> &Arc<Vec<Arc<M>>> {
        &self.items
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub fn begin_load(&mut self) {
        self.status = LoadStatus::Loading;
        self.error_message = None;
    }

    /// Apply a finished load. The last call wins.
    pub fn apply(&mut self, result: Result<Vec<M>, CoreError>) {
        match result {
            Ok(items) => {
                debug!(count = items.len(), "master list loaded");
                self.items = Arc::new(items.into_iter().map(Arc::new).collect());
                self.status = LoadStatus::Ready;
                self.error_message = None;
            }
            Err(e) => {
                warn!(error = %e, "master list load failed");
                self.items = Arc::new(Vec::new());
                self.status = LoadStatus::Failed;
                self.error_message = Some(e.to_string());
            }
        }
    }

    /// Load the master list in place: `begin_load`, one request, `apply`.
    pub async fn load<G: Gateway>(&mut self, gateway: &G, screen: &ScreenConfig) -> LoadStatus
    where
        M: DeserializeOwned,
    {
        self.begin_load();
        let result = fetch_master(gateway, screen).await;
        self.apply(result);
        self.status
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Items whose display key matches `query`. Same snapshot for a blank
    /// query.
    pub fn filtered_view(&self, query: &str) -> Arc<Vec<Arc<M>>> {
        filter_by_display_key(&self.items, query)
    }

    pub fn find(&self, id: i64) -> Option<&Arc<M>> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Display key of the item with `id`, if loaded and non-empty.
    pub fn display_key_for(&self, id: i64) -> Option<&str> {
        self.find(id)
            .map(|item| item.display_key())
            .filter(|key| !key.is_empty())
    }
}

/// One `GET` of the screen's master path, decoded.
pub async fn fetch_master<G, M>(gateway: &G, screen: &ScreenConfig) -> Result<Vec<M>, CoreError>
where
    G: Gateway,
    M: MasterItem + DeserializeOwned,
{
    debug!(path = screen.master_path, "loading master list");
    call_decoded(gateway, Method::GET, screen.master_path, None, || {
        screen.master_fallback()
    })
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cmsim_api::Instance;

    fn instance(id: i64, ip: &str) -> Instance {
        Instance {
            id,
            http_port: Some(80),
            http_ip: ip.into(),
            enable: true,
            remark: None,
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn starts_idle_and_empty() {
        let store = MasterListStore::<Instance>::new();
        assert_eq!(store.status(), LoadStatus::Idle);
        assert!(store.items().is_empty());
        assert!(store.error_message().is_none());
    }

    #[test]
    fn success_replaces_items() {
        let mut store = MasterListStore::new();
        store.begin_load();
        assert_eq!(store.status(), LoadStatus::Loading);

        store.apply(Ok(vec![instance(1, "10.0.0.1"), instance(2, "10.0.0.2")]));
        assert_eq!(store.status(), LoadStatus::Ready);
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.display_key_for(2), Some("10.0.0.2"));
        assert_eq!(store.display_key_for(9), None);
    }

    #[test]
    fn failure_clears_items_and_keeps_message() {
        let mut store = MasterListStore::new();
        store.apply(Ok(vec![instance(1, "10.0.0.1")]));

        store.begin_load();
        store.apply(Err(CoreError::Upstream {
            code: "500".into(),
            message: "failed to load instances".into(),
        }));

        assert!(store.is_failed());
        assert!(store.items().is_empty());
        assert_eq!(store.error_message(), Some("failed to load instances"));
    }

    #[test]
    fn begin_load_clears_error() {
        let mut store = MasterListStore::<Instance>::new();
        store.apply(Err(CoreError::Timeout));
        store.begin_load();
        assert_eq!(store.status(), LoadStatus::Loading);
        assert!(store.error_message().is_none());
    }

    #[test]
    fn filtered_view_reads_current_items() {
        let mut store = MasterListStore::new();
        store.apply(Ok(vec![instance(1, "10.0.0.1"), instance(2, "172.16.0.1")]));

        let view = store.filtered_view("172");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, 2);
        assert!(Arc::ptr_eq(&store.filtered_view(""), store.items()));
    }

    #[test]
    fn empty_display_key_is_not_a_label() {
        let mut store = MasterListStore::new();
        store.apply(Ok(vec![instance(4, "")]));
        assert!(store.find(4).is_some());
        assert_eq!(store.display_key_for(4), None);
    }
}
