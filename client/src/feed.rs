use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_net::http::Request;
use gloo_timers::callback::Interval;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{EventSource, MessageEvent};

use resultmap_shared::{ResultSnapshot, snapshot_from_json};

pub const POLL_INTERVAL_MS: u32 = 5_000;

const CONFIG_URL: &str = "feed_config.json";
const POLL_URL: &str = "live_results.json";
const PLACEHOLDER_EVENTS_URL: &str = "YOUR_EVENTS_URL";

/// Delivery mode, selected once at startup. The only transition is the
/// one-way fall-through from push to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Connecting,
    Push,
    Polling,
}

impl FeedStatus {
    pub fn label(self) -> &'static str {
        match self {
            FeedStatus::Connecting => "connecting",
            FeedStatus::Push => "live push",
            FeedStatus::Polling => "polling",
        }
    }
}

/// Optional push-channel configuration fetched at startup. Absent,
/// empty, or placeholder values mean "poll only".
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub events_url: String,
}

pub fn push_configured(config: &FeedConfig) -> bool {
    !config.events_url.is_empty() && config.events_url != PLACEHOLDER_EVENTS_URL
}

/// Poll endpoint with a cache-busting timestamp.
pub fn poll_url(now_ms: f64) -> String {
    format!("{POLL_URL}?t={}", now_ms as u64)
}

/// Outcome of one poll attempt: success replaces the snapshot
/// wholesale, failure keeps the prior snapshot and reports the error.
pub fn apply_poll_outcome(
    current: ResultSnapshot,
    outcome: Result<ResultSnapshot, String>,
) -> (ResultSnapshot, Option<String>) {
    match outcome {
        Ok(next) => (next, None),
        Err(e) => (current, Some(e)),
    }
}

struct PushConnection {
    es: EventSource,
    on_open: Closure<dyn Fn()>,
    on_error: Closure<dyn Fn()>,
    on_message: Closure<dyn Fn(MessageEvent)>,
}

impl PushConnection {
    fn close(self) {
        let _ = self.on_open.as_ref();
        let _ = self.on_error.as_ref();
        let _ = self.on_message.as_ref();
        self.es.set_onopen(None);
        self.es.set_onerror(None);
        self.es.set_onmessage(None);
        self.es.close();
    }
}

enum FeedConnection {
    Push(PushConnection),
    Poll(Interval),
}

impl FeedConnection {
    fn close(self) {
        match self {
            FeedConnection::Push(push) => push.close(),
            FeedConnection::Poll(interval) => {
                let _ = interval.cancel();
            }
        }
    }
}

thread_local! {
    static FEED_CONNECTION: RefCell<Option<FeedConnection>> = const { RefCell::new(None) };
}

/// Tear down whichever delivery mode is active (page teardown).
/// In-flight fetches may still complete; their results are ignored by
/// virtue of nothing re-arming the timer.
pub fn disconnect() {
    FEED_CONNECTION.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(connection) = slot.take() {
            connection.close();
        }
    });
}

fn replace_connection(connection: FeedConnection) {
    FEED_CONNECTION.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(old) = slot.take() {
            old.close();
        }
        *slot = Some(connection);
    });
}

fn apply_snapshot(
    snapshot: RwSignal<ResultSnapshot>,
    last_update: RwSignal<Option<String>>,
    next: ResultSnapshot,
) {
    snapshot.set(next);
    last_update.set(Some(chrono::Utc::now().format("%H:%M:%S UTC").to_string()));
}

/// Start the feed: push when a real events URL is configured, poll
/// otherwise. Called once after startup; every later snapshot reaches
/// the pipeline through the same signal regardless of origin.
pub fn start(
    snapshot: RwSignal<ResultSnapshot>,
    status: RwSignal<FeedStatus>,
    last_update: RwSignal<Option<String>>,
) {
    status.set(FeedStatus::Connecting);
    spawn_local(async move {
        let config = fetch_config().await.unwrap_or_default();
        if push_configured(&config) {
            connect_push(&config.events_url, snapshot, status, last_update);
        } else {
            web_sys::console::info_1(
                &format!("Push feed not configured; polling every {POLL_INTERVAL_MS}ms.").into(),
            );
            start_poll(snapshot, status, last_update);
        }
    });
}

async fn fetch_config() -> Result<FeedConfig, String> {
    let resp = Request::get(CONFIG_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<FeedConfig>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

fn connect_push(
    url: &str,
    snapshot: RwSignal<ResultSnapshot>,
    status: RwSignal<FeedStatus>,
    last_update: RwSignal<Option<String>>,
) {
    let es = match EventSource::new(url) {
        Ok(es) => es,
        Err(_) => {
            web_sys::console::warn_1(&"Push feed rejected the events URL; polling instead.".into());
            start_poll(snapshot, status, last_update);
            return;
        }
    };

    let opened = Rc::new(Cell::new(false));
    let fell_back = Rc::new(Cell::new(false));

    let opened_on_open = opened.clone();
    let on_open = Closure::<dyn Fn()>::new(move || {
        opened_on_open.set(true);
        status.set(FeedStatus::Push);
    });
    es.set_onopen(Some(on_open.as_ref().unchecked_ref()));

    // Every push message carries a complete snapshot, never a delta.
    let on_message = Closure::<dyn Fn(MessageEvent)>::new(move |e: MessageEvent| {
        let Some(data) = e.data().as_string() else {
            return;
        };
        match snapshot_from_json(&data) {
            Ok(next) => apply_snapshot(snapshot, last_update, next),
            Err(err) => {
                web_sys::console::warn_1(&format!("Push snapshot parse failed: {err}").into());
            }
        }
    });
    es.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

    // Failure before the stream ever opens counts as initialization
    // failure: fall through to poll mode for the rest of the session.
    // Post-open blips are left to EventSource's native reconnect.
    let on_error = Closure::<dyn Fn()>::new(move || {
        if opened.get() || fell_back.replace(true) {
            return;
        }
        web_sys::console::warn_1(&"Push feed failed to initialize; falling back to polling.".into());
        // Deferred so tearing down the EventSource doesn't drop this
        // closure while it is still executing.
        spawn_local(async move {
            start_poll(snapshot, status, last_update);
        });
    });
    es.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    replace_connection(FeedConnection::Push(PushConnection {
        es,
        on_open,
        on_error,
        on_message,
    }));
}

fn start_poll(
    snapshot: RwSignal<ResultSnapshot>,
    status: RwSignal<FeedStatus>,
    last_update: RwSignal<Option<String>>,
) {
    status.set(FeedStatus::Polling);
    poll_once(snapshot, last_update);

    let interval = Interval::new(POLL_INTERVAL_MS, move || {
        poll_once(snapshot, last_update);
    });
    replace_connection(FeedConnection::Poll(interval));
}

fn poll_once(snapshot: RwSignal<ResultSnapshot>, last_update: RwSignal<Option<String>>) {
    spawn_local(async move {
        let outcome = fetch_results().await;
        let (next, error) = apply_poll_outcome(snapshot.get_untracked(), outcome);
        if let Some(e) = error {
            // Keep the prior snapshot on screen; the next tick retries.
            web_sys::console::warn_1(&format!("Live results fetch failed: {e}").into());
            return;
        }
        apply_snapshot(snapshot, last_update, next);
    });
}

async fn fetch_results() -> Result<ResultSnapshot, String> {
    let url = poll_url(js_sys::Date::now());
    let resp = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let body = resp.text().await.map_err(|e| format!("read error: {e}"))?;
    snapshot_from_json(&body).map_err(|e| format!("parse error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::{FeedConfig, apply_poll_outcome, poll_url, push_configured};
    use resultmap_shared::snapshot_from_json;

    #[test]
    fn placeholder_or_empty_config_means_poll_only() {
        assert!(!push_configured(&FeedConfig::default()));
        assert!(!push_configured(&FeedConfig {
            events_url: "YOUR_EVENTS_URL".into()
        }));
        assert!(push_configured(&FeedConfig {
            events_url: "/api/events".into()
        }));
    }

    #[test]
    fn poll_url_carries_cache_buster() {
        assert_eq!(
            poll_url(1_700_000_000_123.0),
            "live_results.json?t=1700000000123"
        );
    }

    #[test]
    fn failed_poll_keeps_prior_snapshot() {
        let current = snapshot_from_json(
            r##"{"Dhaka-1": {"candidate": "A", "party": "P", "color": "#ff0000", "timestamp": 1}}"##,
        )
        .unwrap();
        let (kept, error) = apply_poll_outcome(current.clone(), Err("HTTP 500".into()));
        assert_eq!(kept, current);
        assert_eq!(error.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn successful_poll_replaces_wholesale() {
        let current = snapshot_from_json(r#"{"Dhaka-1": {"timestamp": 1}}"#).unwrap();
        let next = snapshot_from_json(r#"{"Khulna-2": {"timestamp": 2}}"#).unwrap();
        let (replaced, error) = apply_poll_outcome(current, Ok(next.clone()));
        assert_eq!(replaced, next);
        assert!(error.is_none());
        assert!(!replaced.contains_key("Dhaka-1"));
    }
}
