// ── Async browser driver ──
//
// Runs the controller's effects on tokio tasks and applies completions one
// at a time. Requests are never cancelled: a superseded request runs to
// completion and its result is discarded by generation.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::controller::{BrowserController, Effect};
use crate::error::CoreError;
use crate::fetcher::{DependentPageFetcher, FetchOutcome};
use crate::gateway::Gateway;
use crate::master::fetch_master;
use crate::model::{DependentItem, MasterItem, OwnerScope};
use crate::screen::ScreenConfig;

enum Completion<M, D> {
    Master(Result<Vec<M>, CoreError>),
    Page(FetchOutcome<D>),
}

fn aborted() -> CoreError {
    CoreError::Transport {
        message: "request aborted".into(),
    }
}

/// Guarantees each spawned request reports exactly once. If the task
/// unwinds before [`finish`](Self::finish), the fallback is sent on drop so
/// `in_flight` still reaches zero.
struct CompletionGuard<M, D> {
    tx: mpsc::UnboundedSender<Completion<M, D>>,
    fallback: Option<Completion<M, D>>,
}

impl<M, D> CompletionGuard<M, D> {
    fn new(tx: mpsc::UnboundedSender<Completion<M, D>>, fallback: Completion<M, D>) -> Self {
        Self {
            tx,
            fallback: Some(fallback),
        }
    }

    fn finish(mut self, completion: Completion<M, D>) {
        self.fallback = None;
        let _ = self.tx.send(completion);
    }
}

impl<M, D> Drop for CompletionGuard<M, D> {
    fn drop(&mut self) {
        if let Some(fallback) = self.fallback.take() {
            warn!("request task ended without a result");
            let _ = self.tx.send(fallback);
        }
    }
}

/// One browse screen bound to a gateway.
///
/// Intent methods return immediately after spawning their requests; call
/// [`next_completion`](Self::next_completion) or [`settle`](Self::settle)
/// to apply results.
pub struct Browser<G, M, D> {
    gateway: Arc<G>,
    controller: BrowserController<M, D>,
    fetcher: DependentPageFetcher<G>,
    completions_tx: mpsc::UnboundedSender<Completion<M, D>>,
    completions_rx: mpsc::UnboundedReceiver<Completion<M, D>>,
    in_flight: usize,
}

impl<G, M, D> Browser<G, M, D>
where
    G: Gateway,
    M: MasterItem + DeserializeOwned,
    D: DependentItem + DeserializeOwned,
{
    pub fn new(gateway: Arc<G>, screen: ScreenConfig) -> Self {
        let controller = BrowserController::new(screen);
        let fetcher = DependentPageFetcher::new(
            Arc::clone(&gateway),
            Arc::clone(controller.screen()),
            controller.subscribe_generation(),
        );
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            controller,
            fetcher,
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    /// Read access to the screen state.
    pub fn controller(&self) -> &BrowserController<M, D> {
        &self.controller
    }

    /// Requests spawned but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    // ── Intents ──────────────────────────────────────────────────────

    pub fn mount(&mut self) {
        let effects = self.controller.mount();
        self.dispatch(effects);
    }

    /// Returns `false` when the selection was unchanged or rejected.
    pub fn select(&mut self, scope: OwnerScope) -> bool {
        let effects = self.controller.select(scope);
        self.dispatch(effects)
    }

    /// Returns `false` when the page is out of range or already current.
    pub fn change_page(&mut self, page_num: u32) -> bool {
        let effects = self.controller.change_page(page_num);
        self.dispatch(effects)
    }

    pub fn refresh(&mut self) {
        let effects = self.controller.refresh();
        self.dispatch(effects);
    }

    pub fn retry_master(&mut self) {
        let effects = self.controller.retry_master();
        self.dispatch(effects);
    }

    pub fn retry_page(&mut self) {
        let effects = self.controller.retry_page();
        self.dispatch(effects);
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.controller.set_query(query);
    }

    // ── Completions ──────────────────────────────────────────────────

    /// Wait for one request to finish and apply it. Returns `false` when
    /// nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        // The browser holds a sender, so the channel never closes.
        let Some(completion) = self.completions_rx.recv().await else {
            return false;
        };
        self.in_flight -= 1;

        match completion {
            Completion::Master(result) => self.controller.master_loaded(result),
            Completion::Page(outcome) => {
                let effects = self.controller.page_loaded(outcome);
                self.dispatch(effects);
            }
        }
        true
    }

    /// Apply completions until no request is in flight, including any
    /// corrective fetch a completion triggers.
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    // ── Effect execution ─────────────────────────────────────────────

    fn dispatch(&mut self, effects: Vec<Effect>) -> bool {
        let issued = !effects.is_empty();
        for effect in effects {
            self.spawn(effect);
        }
        issued
    }

    fn spawn(&mut self, effect: Effect) {
        let tx = self.completions_tx.clone();
        match effect {
            Effect::LoadMaster => {
                let gateway = Arc::clone(&self.gateway);
                let screen = Arc::clone(self.controller.screen());
                let guard = CompletionGuard::new(tx, Completion::Master(Err(aborted())));
                tokio::spawn(async move {
                    let result = fetch_master::<G, M>(gateway.as_ref(), &screen).await;
                    guard.finish(Completion::Master(result));
                });
            }
            Effect::FetchPage(request) => {
                let fetcher = self.fetcher.clone();
                let fallback = Completion::Page(FetchOutcome::Applied {
                    generation: request.generation,
                    result: Err(aborted()),
                });
                let guard = CompletionGuard::new(tx, fallback);
                tokio::spawn(async move {
                    let outcome = fetcher.fetch_page::<D>(request).await;
                    guard.finish(Completion::Page(outcome));
                });
            }
        }
        self.in_flight += 1;
        debug!(in_flight = self.in_flight, "request spawned");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use cmsim_api::{ApiResponse, Device, Instance, Method};
    use serde_json::{Value, json};

    use crate::master::LoadStatus;

    // Answers page queries after a per-owner delay. With paused time the
    // delays fix the completion order.
    #[derive(Default)]
    struct DelayedGateway {
        delays: Vec<(Option<i64>, Duration)>,
        master_fails: bool,
        calls: Mutex<Vec<Value>>,
    }

    impl DelayedGateway {
        fn delay_for(&self, owner: Option<i64>) -> Duration {
            self.delays
                .iter()
                .find(|(o, _)| *o == owner)
                .map_or(Duration::from_millis(10), |(_, d)| *d)
        }
    }

    impl Gateway for DelayedGateway {
        async fn call(
            &self,
            method: Method,
            _path: &str,
            body: Option<Value>,
        ) -> Result<ApiResponse<Value>, cmsim_api::Error> {
            if method == Method::GET {
                let envelope = if self.master_fails {
                    json!({ "code": "500", "msg": null, "data": null })
                } else {
                    json!({ "code": "200", "data": [
                        { "id": 2, "httpIp": "10.0.0.2", "enable": true },
                        { "id": 3, "httpIp": "10.0.0.3", "enable": true }
                    ]})
                };
                return Ok(serde_json::from_value(envelope).unwrap());
            }

            let body = body.unwrap();
            self.calls.lock().unwrap().push(body.clone());
            let owner = body.get("instanceId").and_then(Value::as_i64);
            tokio::time::sleep(self.delay_for(owner)).await;

            let list: Vec<Value> = match owner {
                Some(id) => vec![json!({ "id": id * 10, "instanceId": id })],
                None => vec![
                    json!({ "id": 20, "instanceId": 2 }),
                    json!({ "id": 30, "instanceId": 3 }),
                ],
            };
            let total = list.len();
            Ok(serde_json::from_value(json!({
                "code": "200",
                "data": { "total": total, "list": list }
            }))
            .unwrap())
        }
    }

    // Panics on every page query; the master list loads normally.
    struct PanickingGateway;

    impl Gateway for PanickingGateway {
        async fn call(
            &self,
            method: Method,
            _path: &str,
            _body: Option<Value>,
        ) -> Result<ApiResponse<Value>, cmsim_api::Error> {
            assert_eq!(method, Method::GET, "page query reached the gateway");
            Ok(serde_json::from_value(json!({
                "code": "200",
                "data": [{ "id": 2, "httpIp": "10.0.0.2", "enable": true }]
            }))
            .unwrap())
        }
    }

    fn browser(gateway: DelayedGateway) -> Browser<DelayedGateway, Instance, Device> {
        Browser::new(Arc::new(gateway), ScreenConfig::devices())
    }

    #[tokio::test(start_paused = true)]
    async fn mount_then_settle_loads_both_panels() {
        let mut b = browser(DelayedGateway::default());
        b.mount();
        assert_eq!(b.in_flight(), 2);

        b.settle().await;

        let c = b.controller();
        assert_eq!(b.in_flight(), 0);
        assert_eq!(c.master().status(), LoadStatus::Ready);
        assert_eq!(c.dependent().status(), LoadStatus::Ready);
        assert_eq!(c.dependent().total(), 2);
        assert_eq!(c.owner_label(3), "10.0.0.3");
    }

    #[tokio::test(start_paused = true)]
    async fn slower_older_selection_is_discarded() {
        let mut b = browser(DelayedGateway {
            delays: vec![
                (Some(2), Duration::from_millis(500)),
                (Some(3), Duration::from_millis(50)),
            ],
            ..DelayedGateway::default()
        });
        b.mount();
        b.settle().await;

        assert!(b.select(OwnerScope::Owner(2)));
        assert!(b.select(OwnerScope::Owner(3)));
        b.settle().await;

        let c = b.controller();
        assert_eq!(c.selection(), OwnerScope::Owner(3));
        assert_eq!(c.dependent().list().len(), 1);
        assert_eq!(c.dependent().list()[0].instance_id, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_intents_spawn_nothing() {
        let mut b = browser(DelayedGateway {
            master_fails: true,
            ..DelayedGateway::default()
        });
        b.mount();
        b.settle().await;

        assert_eq!(
            b.controller().master().error_message(),
            Some("failed to load instances")
        );
        assert!(!b.select(OwnerScope::Owner(2)));
        assert!(!b.change_page(2));
        assert_eq!(b.in_flight(), 0);
        assert!(!b.next_completion().await);
    }

    #[tokio::test(start_paused = true)]
    async fn every_fetch_hits_the_gateway_once() {
        let gateway = Arc::new(DelayedGateway::default());
        let mut b: Browser<_, Instance, Device> =
            Browser::new(Arc::clone(&gateway), ScreenConfig::devices());
        b.mount();
        b.settle().await;
        b.select(OwnerScope::Owner(2));
        b.retry_page();
        b.settle().await;

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].get("instanceId").is_none());
        assert_eq!(
            calls[2],
            json!({ "pageNum": 1, "pageSize": 10, "instanceId": 2 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_request_still_settles() {
        let mut b: Browser<_, Instance, Device> =
            Browser::new(Arc::new(PanickingGateway), ScreenConfig::devices());
        b.mount();
        b.settle().await;

        let c = b.controller();
        assert_eq!(b.in_flight(), 0);
        assert_eq!(c.master().status(), LoadStatus::Ready);
        assert_eq!(c.dependent().status(), LoadStatus::Failed);
        assert_eq!(
            c.dependent().error_message(),
            Some("Network request failed: request aborted")
        );
    }
}
