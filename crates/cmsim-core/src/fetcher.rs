// ── Dependent page fetcher ──
//
// Issues exactly one page query per call and never retries. Whether the
// result still matters is decided when it resolves, by comparing its
// generation against the latest one published on the watch channel.

use std::sync::Arc;

use cmsim_api::{Method, Page, PageQuery};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::gateway::{Gateway, call_decoded};
use crate::model::{DependentItem, OwnerScope};
use crate::screen::ScreenConfig;

/// Everything needed to fetch one dependent page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub scope: OwnerScope,
    pub page_num: u32,
    pub page_size: u32,
    /// Generation minted for the intent that issued this request.
    pub generation: u64,
}

/// How a page fetch ended.
#[derive(Debug)]
pub enum FetchOutcome<D> {
    /// Still current when it resolved; `result` should be applied.
    Applied {
        generation: u64,
        result: Result<Page<D>, CoreError>,
    },
    /// Superseded by a newer intent before it resolved.
    Stale { generation: u64 },
}

/// The `queryPage` query for `request`.
///
/// The owner field is only present for `OwnerScope::Owner` on screens that
/// have one; `All` omits it rather than sending `null` or `0`.
pub fn page_query(screen: &ScreenConfig, request: &PageRequest) -> PageQuery {
    let query = PageQuery::new(request.page_num, request.page_size);
    match (screen.owner_field, request.scope) {
        (Some(field), OwnerScope::Owner(id)) => query.for_owner(field, id),
        _ => query,
    }
}

/// Fetches dependent pages for one screen.
pub struct DependentPageFetcher<G> {
    gateway: Arc<G>,
    screen: Arc<ScreenConfig>,
    latest: watch::Receiver<u64>,
}

impl<G> Clone for DependentPageFetcher<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            screen: Arc::clone(&self.screen),
            latest: self.latest.clone(),
        }
    }
}

impl<G: Gateway> DependentPageFetcher<G> {
    /// `latest` must be subscribed to the controller's generation channel.
    pub fn new(gateway: Arc<G>, screen: Arc<ScreenConfig>, latest: watch::Receiver<u64>) -> Self {
        Self {
            gateway,
            screen,
            latest,
        }
    }

    /// The latest generation as of now.
    pub fn latest_generation(&self) -> u64 {
        *self.latest.borrow()
    }

    /// One `POST` to the screen's page path.
    pub async fn fetch_page<D>(&self, request: PageRequest) -> FetchOutcome<D>
    where
        D: DependentItem + DeserializeOwned,
    {
        let query = page_query(&self.screen, &request);
        debug!(
            path = self.screen.page_path,
            generation = request.generation,
            scope = %request.scope,
            page = request.page_num,
            "fetching page"
        );

        let result: Result<Page<D>, CoreError> = call_decoded(
            self.gateway.as_ref(),
            Method::POST,
            self.screen.page_path,
            Some(query.into()),
            || self.screen.page_fallback(),
        )
        .await;

        let latest = self.latest_generation();
        if request.generation != latest {
            debug!(
                generation = request.generation,
                latest, "page resolved after a newer intent"
            );
            return FetchOutcome::Stale {
                generation: request.generation,
            };
        }

        FetchOutcome::Applied {
            generation: request.generation,
            result,
        }
    }
}
