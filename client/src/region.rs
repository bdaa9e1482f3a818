use std::cell::RefCell;
use std::collections::HashSet;

use web_sys::SvgElement;

use resultmap_shared::{SeatIndex, canonical_key};

/// A drawable map region discovered from the loaded document. The raw
/// label is its only persistent identity; `special` marks inset and
/// overview frames and never changes after discovery.
pub struct Region {
    pub element: SvgElement,
    pub label: String,
    pub special: bool,
}

/// Everything built once at startup and consulted by every repaint:
/// the region registry and the seat index. Regions are never created
/// or destroyed afterward; only their visual attributes mutate.
pub struct MapContext {
    pub regions: Vec<Region>,
    pub seats: SeatIndex,
}

thread_local! {
    static MAP_CONTEXT: RefCell<Option<MapContext>> = const { RefCell::new(None) };
}

/// Install the startup context. Replaces any prior one (re-init after
/// hot reload) and notes labels that collapse onto a shared canonical
/// key, since those regions will all mirror the same result.
pub fn install(ctx: MapContext) {
    let mut seen = HashSet::new();
    let mut shared = Vec::new();
    for region in &ctx.regions {
        let key = canonical_key(&region.label);
        if !key.is_empty() && !seen.insert(key) {
            shared.push(region.label.clone());
        }
    }
    if !shared.is_empty() {
        web_sys::console::warn_1(
            &format!(
                "{} region label(s) share a canonical key and will mirror results: {shared:?}",
                shared.len()
            )
            .into(),
        );
    }

    MAP_CONTEXT.with(|slot| {
        *slot.borrow_mut() = Some(ctx);
    });
}

/// Run `f` against the installed context, if any. Returns None before
/// startup completes (or after teardown).
pub fn with_context<R>(f: impl FnOnce(&MapContext) -> R) -> Option<R> {
    MAP_CONTEXT.with(|slot| slot.borrow().as_ref().map(f))
}

pub fn clear() {
    MAP_CONTEXT.with(|slot| {
        slot.borrow_mut().take();
    });
}
