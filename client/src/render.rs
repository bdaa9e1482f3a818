use resultmap_shared::{ResultSnapshot, VisualState, hover_visual, resolve};

use crate::region::{Region, with_context};

/// One transition duration for every paint path (hover, unhover, data
/// update) so overlapping repaints stay visually coherent.
pub const TRANSITION_MS: u32 = 150;

pub fn transition_css() -> String {
    format!(
        "fill {TRANSITION_MS}ms linear, stroke {TRANSITION_MS}ms linear, \
         stroke-width {TRANSITION_MS}ms linear"
    )
}

/// Install the shared transition on a region once, at discovery.
pub fn prime(region: &Region) {
    region
        .element
        .style()
        .set_property("transition", &transition_css())
        .ok();
}

/// Apply a visual state to a region. All three style channels plus the
/// winner attribute are written together, so a repaint is all-or-nothing
/// per region.
pub fn paint(region: &Region, visual: &VisualState) {
    let style = region.element.style();
    style.set_property("fill", &visual.fill).ok();
    style.set_property("stroke", &visual.stroke).ok();
    style.set_property("stroke-width", &visual.stroke_width).ok();
    if visual.winner {
        region.element.set_attribute("data-has-winner", "true").ok();
    } else {
        region.element.remove_attribute("data-has-winner").ok();
    }
}

/// Re-reconcile and repaint every region against the current snapshot.
/// Driven by each wholesale snapshot replacement.
pub fn repaint_all(snapshot: &ResultSnapshot) {
    with_context(|ctx| {
        for region in &ctx.regions {
            let state = resolve(&region.label, region.special, snapshot, &ctx.seats);
            paint(region, &state.visual);
        }
    });
}

/// Hover emphasis for every region carrying this label (duplicate
/// labels highlight together, mirroring how they resolve together).
pub fn paint_hover(label: &str, snapshot: &ResultSnapshot) {
    with_context(|ctx| {
        for region in ctx.regions.iter().filter(|r| r.label == label) {
            let state = resolve(&region.label, region.special, snapshot, &ctx.seats);
            paint(region, &hover_visual(&state.visual));
        }
    });
}

/// Restore the resolved (non-hover) state after the pointer leaves.
pub fn paint_resolved(label: &str, snapshot: &ResultSnapshot) {
    with_context(|ctx| {
        for region in ctx.regions.iter().filter(|r| r.label == label) {
            let state = resolve(&region.label, region.special, snapshot, &ctx.seats);
            paint(region, &state.visual);
        }
    });
}
