use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use resultmap_shared::{ResultSnapshot, SeatIndex, TooltipDetail, resolve};

use crate::assets;
use crate::feed::{self, FeedStatus};
use crate::region::{self, MapContext};
use crate::render;
use crate::ticker::Ticker;

/// Tooltip offset from the pointer so it never obscures it.
pub(crate) const TOOLTIP_OFFSET_X: f64 = 10.0;
pub(crate) const TOOLTIP_OFFSET_Y: f64 = -10.0;

const CANDIDATE_WINDOW_NAME: &str = "CandidateWindow";
const CANDIDATE_WINDOW_FEATURES: &str = "width=900,height=800,scrollbars=yes";

/// Newtype wrappers give same-shaped signals distinct types for Leptos
/// context. (All three are `RwSignal<Option<String>>` — without
/// wrappers, `provide_context` overwrites one with another.)
#[derive(Clone, Copy)]
pub(crate) struct Hovered(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct FatalError(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct LastUpdate(pub RwSignal<Option<String>>);

struct PointerBinding {
    target: Element,
    over: Closure<dyn Fn(web_sys::MouseEvent)>,
    out: Closure<dyn Fn(web_sys::MouseEvent)>,
    moved: Closure<dyn Fn(web_sys::MouseEvent)>,
    click: Closure<dyn Fn(web_sys::MouseEvent)>,
}

impl PointerBinding {
    fn detach(self) {
        for (name, handler) in [
            ("mouseover", self.over.as_ref()),
            ("mouseout", self.out.as_ref()),
            ("mousemove", self.moved.as_ref()),
            ("click", self.click.as_ref()),
        ] {
            let _ = self
                .target
                .remove_event_listener_with_callback(name, handler.unchecked_ref());
        }
    }
}

thread_local! {
    static POINTER_BINDING: RefCell<Option<PointerBinding>> = const { RefCell::new(None) };
}

fn unbind_pointer_events() {
    POINTER_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            old.detach();
        }
    });
}

/// Percent-encode a label for use in a query string (the
/// `encodeURIComponent` character set).
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Detail-view URL opened when a constituency is clicked.
pub(crate) fn candidate_url(label: &str) -> String {
    format!(
        "candidate_view.html?district={}&type=constituency",
        percent_encode(label)
    )
}

/// Resolve the region label under an event target, if the event landed
/// on (or inside) a constituency shape with a label.
fn event_region_label(e: &web_sys::MouseEvent) -> Option<String> {
    let target: Element = e.target()?.dyn_into().ok()?;
    let shape = target.closest(".constituency-area").ok().flatten()?;
    shape.get_attribute("data-name").filter(|name| !name.is_empty())
}

/// Load both assets, build the startup context, wire interactivity.
/// Any `Err` here is a fatal startup error: the page stays visible but
/// non-interactive.
async fn init(
    container: Element,
    snapshot: RwSignal<ResultSnapshot>,
    hovered: RwSignal<Option<String>>,
    mouse_pos: RwSignal<(f64, f64)>,
    loading_step: RwSignal<&'static str>,
) -> Result<(), String> {
    loading_step.set("Loading map assets");
    let svg_text = assets::fetch_map_document().await?;
    let data = assets::fetch_election_data().await?;

    loading_step.set("Preparing constituencies");
    assets::inject_map(&container, &svg_text)?;
    let regions = assets::discover_regions(&container)?;
    let seats = SeatIndex::build(&data);
    web_sys::console::info_1(
        &format!(
            "Map ready: {} regions, {} indexed seats.",
            regions.len(),
            seats.len()
        )
        .into(),
    );

    for region in &regions {
        render::prime(region);
    }
    region::install(MapContext { regions, seats });
    snapshot.with_untracked(render::repaint_all);
    wire_pointer_events(&container, snapshot, hovered, mouse_pos);
    Ok(())
}

fn wire_pointer_events(
    container: &Element,
    snapshot: RwSignal<ResultSnapshot>,
    hovered: RwSignal<Option<String>>,
    mouse_pos: RwSignal<(f64, f64)>,
) {
    let over = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
        let Some(label) = event_region_label(&e) else {
            return;
        };
        mouse_pos.set((e.client_x() as f64, e.client_y() as f64));
        snapshot.with_untracked(|snap| render::paint_hover(&label, snap));
        hovered.set(Some(label));
    });

    let out = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
        let Some(label) = event_region_label(&e) else {
            return;
        };
        snapshot.with_untracked(|snap| render::paint_resolved(&label, snap));
        hovered.set(None);
    });

    let moved = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
        mouse_pos.set((e.client_x() as f64, e.client_y() as f64));
    });

    let click = Closure::<dyn Fn(web_sys::MouseEvent)>::new(move |e: web_sys::MouseEvent| {
        let Some(label) = event_region_label(&e) else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        let _ = window.open_with_url_and_target_and_features(
            &candidate_url(&label),
            CANDIDATE_WINDOW_NAME,
            CANDIDATE_WINDOW_FEATURES,
        );
    });

    let mut attached = true;
    for (name, handler) in [
        ("mouseover", over.as_ref()),
        ("mouseout", out.as_ref()),
        ("mousemove", moved.as_ref()),
        ("click", click.as_ref()),
    ] {
        if container
            .add_event_listener_with_callback(name, handler.unchecked_ref())
            .is_err()
        {
            attached = false;
        }
    }
    if !attached {
        web_sys::console::warn_1(&"Failed to attach some pointer handlers.".into());
    }

    POINTER_BINDING.with(|slot| {
        let mut slot = slot.borrow_mut();
        if let Some(old) = slot.take() {
            old.detach();
        }
        *slot = Some(PointerBinding {
            target: container.clone(),
            over,
            out,
            moved,
            click,
        });
    });
}

/// Root application component: the map surface, winner ticker, status
/// line, tooltip, and startup/fatal overlays.
#[component]
pub fn App() -> impl IntoView {
    let snapshot: RwSignal<ResultSnapshot> = RwSignal::new(Default::default());
    let feed_status: RwSignal<FeedStatus> = RwSignal::new(FeedStatus::Connecting);
    let mouse_pos: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));
    let hovered: RwSignal<Option<String>> = RwSignal::new(None);
    let fatal: RwSignal<Option<String>> = RwSignal::new(None);
    let last_update: RwSignal<Option<String>> = RwSignal::new(None);
    let regions_ready: RwSignal<bool> = RwSignal::new(false);
    let init_started: RwSignal<bool> = RwSignal::new(false);
    let loading_step: RwSignal<&'static str> = RwSignal::new("Loading map assets");

    provide_context(snapshot);
    provide_context(feed_status);
    provide_context(mouse_pos);
    provide_context(Hovered(hovered));
    provide_context(FatalError(fatal));
    provide_context(LastUpdate(last_update));

    let map_ref = NodeRef::<leptos::html::Div>::new();

    // Startup: assets → registry + seat index → interactivity → feed.
    Effect::new(move || {
        let Some(container) = map_ref.get() else {
            return;
        };
        if init_started.get_untracked() {
            return;
        }
        init_started.set(true);

        let container: Element = container.unchecked_into();
        spawn_local(async move {
            match init(container, snapshot, hovered, mouse_pos, loading_step).await {
                Ok(()) => {
                    regions_ready.set(true);
                    feed::start(snapshot, feed_status, last_update);
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("Startup failed: {e}").into());
                    fatal.set(Some(e));
                }
            }
        });

        on_cleanup(|| {
            feed::disconnect();
            unbind_pointer_events();
            region::clear();
        });
    });

    // Each snapshot replacement re-reconciles and repaints every region.
    // The registry is immutable after startup, so repaint order is
    // irrelevant and repeats are idempotent.
    Effect::new(move || {
        snapshot.with(|snap| {
            if regions_ready.get_untracked() {
                render::repaint_all(snap);
            }
        });
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #0c0e17;">
            <div node_ref=map_ref style="width: 100%; height: 100%;"></div>
            {move || {
                fatal.get().map(|msg| view! {
                    <div style="position: absolute; inset: 0; z-index: 20; display: flex; align-items: center; justify-content: center; background: rgba(12, 14, 23, 0.85); color: #e2e0d8; font-size: 0.9rem; text-align: center; padding: 24px;">
                        {format!("Map unavailable: {msg}")}
                    </div>
                })
            }}
            {move || {
                (!regions_ready.get() && fatal.get().is_none()).then(|| view! {
                    <div style="position: absolute; inset: 0; z-index: 15; display: flex; align-items: center; justify-content: center; color: #9a9590; font-size: 0.85rem;">
                        {loading_step.get()}
                    </div>
                })
            }}
            <StatusLine />
            <Ticker />
        </div>
        <Tooltip />
    }
}

/// Feed mode and last-update clock. Staleness is this system's only
/// failure mode, so it stays visible.
#[component]
fn StatusLine() -> impl IntoView {
    let feed_status: RwSignal<FeedStatus> = expect_context();
    let LastUpdate(last_update) = expect_context();

    view! {
        <div style="position: absolute; top: 10px; right: 12px; z-index: 10; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; padding: 4px 10px; font-size: 0.7rem; color: #9a9590;">
            {move || feed_status.get().label()}
            {move || last_update.get().map(|t| format!(" \u{00B7} updated {t}"))}
        </div>
    }
}

/// Tooltip that follows the pointer over a constituency: label, then
/// the live winner if one is declared, else district/division from the
/// seat metadata.
#[component]
fn Tooltip() -> impl IntoView {
    let snapshot: RwSignal<ResultSnapshot> = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();
    let Hovered(hovered) = expect_context();

    let content = Memo::new(move |_| {
        let label = hovered.get()?;
        let state = snapshot.with(|snap| {
            region::with_context(|ctx| {
                let special = ctx
                    .regions
                    .iter()
                    .find(|r| r.label == label)
                    .map(|r| r.special)
                    .unwrap_or(false);
                resolve(&label, special, snap, &ctx.seats)
            })
        })?;
        Some((label, state.tooltip))
    });

    view! {
        {move || {
            let Some((label, detail)) = content.get() else {
                return view! { <div style="position: fixed; opacity: 0; pointer-events: none;" /> }
                    .into_any();
            };
            let (x, y) = mouse_pos.get();
            view! {
                <div
                    style="position: fixed; pointer-events: none; z-index: 100; background: #161921; border: 1px solid #282c3e; border-radius: 6px; padding: 8px 10px; max-width: 240px; color: #e2e0d8; font-size: 0.8rem; box-shadow: 0 4px 16px rgba(0,0,0,0.5);"
                    style:left=format!("{}px", x + TOOLTIP_OFFSET_X)
                    style:top=format!("{}px", y + TOOLTIP_OFFSET_Y)
                >
                    <div style="font-weight: 700;">{label}</div>
                    {match detail {
                        TooltipDetail::Winner { candidate, party } => view! {
                            <div>
                                <span style="color: #fbbf24; font-weight: 700;">
                                    {format!("WINNER: {candidate}")}
                                </span>
                                <div>{party}</div>
                            </div>
                        }
                        .into_any(),
                        TooltipDetail::Seat { district, division } => view! {
                            <div style="color: #9a9590;">
                                <div>{format!("District: {district}")}</div>
                                <div>{format!("Division: {division}")}</div>
                            </div>
                        }
                        .into_any(),
                        TooltipDetail::None => ().into_any(),
                    }}
                </div>
            }
            .into_any()
        }}
    }
}
