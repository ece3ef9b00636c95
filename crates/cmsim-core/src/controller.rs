// ── Browser controller ──
//
// Synchronous state machine behind every browse screen. User intents and
// network completions are transitions; each transition returns the network
// work it needs as `Effect`s and never performs I/O itself. The async
// `Browser` driver (or a test) runs the effects and feeds results back.
//
// Every navigational, refresh or retry intent mints a new generation and
// publishes it on a watch channel. A page result is applied only when its
// generation is still the latest, so the most recent intent always wins no
// matter in which order responses arrive.

use std::sync::Arc;

use cmsim_api::Page;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::fetcher::{FetchOutcome, PageRequest};
use crate::master::{LoadStatus, MasterListStore};
use crate::model::{DependentItem, MasterItem, OwnerScope, PageWindow};
use crate::screen::ScreenConfig;

/// Network work requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Reload the full master list.
    LoadMaster,
    /// Fetch one dependent page.
    FetchPage(PageRequest),
}

// ── Dependent panel state ────────────────────────────────────────────

/// The visible dependent page. `Loading` and `Failed` are exclusive: issuing
/// a fetch clears the error, and a failure ends the loading state.
#[derive(Debug)]
pub struct DependentState<D> {
    status: LoadStatus,
    list: Vec<D>,
    total: u64,
    error_message: Option<String>,
}

impl<D> Default for DependentState<D> {
    fn default() -> Self {
        Self {
            status: LoadStatus::Idle,
            list: Vec::new(),
            total: 0,
            error_message: None,
        }
    }
}

impl<D> DependentState<D> {
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn list(&self) -> &[D] {
        &self.list
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    // The previous page stays visible while the next one loads.
    fn begin(&mut self) {
        self.status = LoadStatus::Loading;
        self.error_message = None;
    }

    fn apply_page(&mut self, page: Page<D>) {
        self.list = page.list;
        self.total = page.total;
        self.status = LoadStatus::Ready;
        self.error_message = None;
    }

    fn apply_error(&mut self, message: String) {
        self.list.clear();
        self.total = 0;
        self.status = LoadStatus::Failed;
        self.error_message = Some(message);
    }
}

// ── Controller ───────────────────────────────────────────────────────

/// Coordinates the master list, the selection and the dependent page for one
/// screen.
#[derive(Debug)]
pub struct BrowserController<M, D> {
    screen: Arc<ScreenConfig>,
    master: MasterListStore<M>,
    query: String,
    selection: OwnerScope,
    page_num: u32,
    generation: watch::Sender<u64>,
    dependent: DependentState<D>,
    /// Generation of the in-flight corrective fetch, if any.
    correction: Option<u64>,
}

impl<M: MasterItem, D: DependentItem> BrowserController<M, D> {
    pub fn new(screen: ScreenConfig) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            screen: Arc::new(screen),
            master: MasterListStore::new(),
            query: String::new(),
            selection: OwnerScope::All,
            page_num: 1,
            generation,
            dependent: DependentState::default(),
            correction: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn screen(&self) -> &Arc<ScreenConfig> {
        &self.screen
    }

    pub fn master(&self) -> &MasterListStore<M> {
        &self.master
    }

    pub fn dependent(&self) -> &DependentState<D> {
        &self.dependent
    }

    pub fn selection(&self) -> OwnerScope {
        self.selection
    }

    pub fn page_num(&self) -> u32 {
        self.page_num
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Latest minted generation.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// A receiver that observes every generation this controller mints.
    pub fn subscribe_generation(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            page_num: self.page_num,
            page_size: self.screen.page_size,
            total: self.dependent.total,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.window().total_pages()
    }

    /// Master items matching the current search text.
    pub fn filtered_masters(&self) -> Arc<Vec<Arc<M>>> {
        self.master.filtered_view(&self.query)
    }

    /// Label for an owner id: its display key, else `#id`.
    pub fn owner_label(&self, owner_id: i64) -> String {
        self.master
            .display_key_for(owner_id)
            .map_or_else(|| format!("#{owner_id}"), str::to_owned)
    }

    // ── User intents ─────────────────────────────────────────────────

    /// First activation: load the master list and page 1 of everything.
    pub fn mount(&mut self) -> Vec<Effect> {
        self.selection = OwnerScope::All;
        self.page_num = 1;
        debug!(screen = self.screen.resource_label, "mount");
        vec![self.load_master(), self.fetch_current()]
    }

    /// Change the owner constraint. Resets to page 1.
    pub fn select(&mut self, scope: OwnerScope) -> Vec<Effect> {
        if scope == self.selection {
            debug!(%scope, "selection unchanged");
            return Vec::new();
        }
        if matches!(scope, OwnerScope::Owner(_)) && self.master.is_failed() {
            warn!(%scope, "master list unavailable, selection rejected");
            return Vec::new();
        }
        self.selection = scope;
        self.page_num = 1;
        vec![self.fetch_current()]
    }

    /// Move to page `page_num` if it exists and differs from the current one.
    pub fn change_page(&mut self, page_num: u32) -> Vec<Effect> {
        if page_num == self.page_num || !self.window().contains(page_num) {
            debug!(
                page_num,
                current = self.page_num,
                total_pages = self.total_pages(),
                "page change rejected"
            );
            return Vec::new();
        }
        self.page_num = page_num;
        vec![self.fetch_current()]
    }

    /// Reload both panels. Selection and page are kept.
    pub fn refresh(&mut self) -> Vec<Effect> {
        debug!(scope = %self.selection, page = self.page_num, "refresh");
        vec![self.load_master(), self.fetch_current()]
    }

    /// Retry the master panel alone.
    pub fn retry_master(&mut self) -> Vec<Effect> {
        vec![self.load_master()]
    }

    /// Re-issue the current page.
    pub fn retry_page(&mut self) -> Vec<Effect> {
        vec![self.fetch_current()]
    }

    /// Update the search text. Filtering is local; no effects.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    // ── Completions ──────────────────────────────────────────────────

    pub fn master_loaded(&mut self, result: Result<Vec<M>, CoreError>) {
        self.master.apply(result);
    }

    /// Apply a finished page fetch. May return one corrective fetch when the
    /// new total leaves the current page out of range.
    pub fn page_loaded(&mut self, outcome: FetchOutcome<D>) -> Vec<Effect> {
        let latest = self.generation();
        let (generation, result) = match outcome {
            FetchOutcome::Stale { generation } => {
                debug!(generation, latest, "stale page discarded");
                return Vec::new();
            }
            FetchOutcome::Applied { generation, .. } if generation != latest => {
                debug!(generation, latest, "superseded page discarded");
                return Vec::new();
            }
            FetchOutcome::Applied { generation, result } => (generation, result),
        };

        let was_correction = self.correction.take() == Some(generation);

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    screen = self.screen.resource_label,
                    error = %e,
                    "page load failed"
                );
                self.dependent.apply_error(e.to_string());
                return Vec::new();
            }
        };

        self.dependent.apply_page(page);

        let total_pages = self.total_pages();
        if self.page_num <= total_pages {
            return Vec::new();
        }
        if was_correction {
            warn!(
                page = self.page_num,
                total_pages, "page still out of range after correction"
            );
            return Vec::new();
        }

        info!(from = self.page_num, to = total_pages, "clamping page");
        self.page_num = total_pages;
        let effect = self.fetch_current();
        if let Effect::FetchPage(request) = &effect {
            self.correction = Some(request.generation);
        }
        vec![effect]
    }

    // ── Internals ────────────────────────────────────────────────────

    fn mint(&mut self) -> u64 {
        self.generation.send_modify(|g| *g += 1);
        self.generation()
    }

    fn load_master(&mut self) -> Effect {
        self.master.begin_load();
        Effect::LoadMaster
    }

    fn fetch_current(&mut self) -> Effect {
        let generation = self.mint();
        self.dependent.begin();
        Effect::FetchPage(PageRequest {
            scope: self.selection,
            page_num: self.page_num,
            page_size: self.screen.page_size,
            generation,
        })
    }
}
