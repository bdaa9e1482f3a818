use gloo_net::http::Request;
use wasm_bindgen::JsCast;
use web_sys::{Element, SvgElement};

use resultmap_shared::{
    ACCENT_STROKE, ElectionData, IDLE_FILL, IDLE_STROKE, IDLE_STROKE_WIDTH, INSET_MARKER_STROKE,
};

use crate::region::Region;

const MAP_URL: &str = "map_constituencies.svg";
const DATA_URL: &str = "election_data.json";

/// Stroke width for inset/overview frames in their base (non-result)
/// presentation.
const FRAME_STROKE_WIDTH: &str = "2.5px";

/// Fetch the vector map document once.
pub async fn fetch_map_document() -> Result<String, String> {
    let resp = Request::get(MAP_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {} loading {MAP_URL}", resp.status()));
    }
    resp.text().await.map_err(|e| format!("read error: {e}"))
}

/// Fetch the seat metadata document once.
pub async fn fetch_election_data() -> Result<ElectionData, String> {
    let resp = Request::get(DATA_URL)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {} loading {DATA_URL}", resp.status()));
    }
    resp.json::<ElectionData>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// True when a shape's `fill` attribute is a paintable color rather
/// than absent/none/transparent. Only such shapes get the idle theme.
pub fn has_real_fill(fill: Option<&str>) -> bool {
    matches!(fill, Some(f) if !f.is_empty() && f != "none" && f != "transparent")
}

/// Identity captured for a discovered region: its raw label and whether
/// its original stroke marks it as an inset/overview frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFacts {
    pub label: String,
    pub special: bool,
}

pub fn classify_region(data_name: Option<&str>, stroke: Option<&str>) -> RegionFacts {
    RegionFacts {
        label: data_name.unwrap_or_default().to_string(),
        special: stroke == Some(INSET_MARKER_STROKE),
    }
}

/// Startup must fail loudly when the document exposes no drawable
/// regions; a silent empty map would look like "no results yet".
pub fn require_regions(count: usize) -> Result<usize, String> {
    if count == 0 {
        Err("no constituency-area shapes found in the map document".to_string())
    } else {
        Ok(count)
    }
}

/// Inject the fetched SVG into the map container, make it responsive,
/// and apply the base theme.
pub fn inject_map(container: &Element, svg_text: &str) -> Result<(), String> {
    container.set_inner_html(svg_text);

    let svg = container
        .query_selector("svg")
        .ok()
        .flatten()
        .ok_or_else(|| "map document contains no <svg> root".to_string())?;
    svg.set_attribute("width", "100%").ok();
    svg.set_attribute("height", "100%").ok();
    svg.set_attribute("preserveAspectRatio", "xMidYMid meet").ok();

    apply_base_theme(&svg);
    Ok(())
}

/// Base presentation pass over the raw document: shapes with a real
/// fill take the idle theme; rects, circles, and marker-stroked shapes
/// become accent-stroked frames with no fill of their own.
fn apply_base_theme(svg: &Element) {
    if let Ok(shapes) = svg.query_selector_all("path, polygon, rect, circle, ellipse, polyline") {
        for i in 0..shapes.length() {
            let Some(el) = shapes.item(i).and_then(|n| n.dyn_into::<SvgElement>().ok()) else {
                continue;
            };
            if has_real_fill(el.get_attribute("fill").as_deref()) {
                let style = el.style();
                style.set_property("fill", IDLE_FILL).ok();
                style.set_property("stroke", IDLE_STROKE).ok();
                style.set_property("stroke-width", IDLE_STROKE_WIDTH).ok();
            }
        }
    }

    let frame_selector = format!("rect, circle, [stroke='{INSET_MARKER_STROKE}']");
    if let Ok(frames) = svg.query_selector_all(&frame_selector) {
        for i in 0..frames.length() {
            let Some(el) = frames.item(i).and_then(|n| n.dyn_into::<SvgElement>().ok()) else {
                continue;
            };
            let style = el.style();
            style.set_property("stroke", ACCENT_STROKE).ok();
            style.set_property("stroke-width", FRAME_STROKE_WIDTH).ok();
        }
    }

    if let Ok(frames) = svg.query_selector_all("rect, circle") {
        for i in 0..frames.length() {
            let Some(el) = frames.item(i).and_then(|n| n.dyn_into::<SvgElement>().ok()) else {
                continue;
            };
            el.style().set_property("fill", "none").ok();
        }
    }
}

/// Discover the drawable regions once. Elements without a `data-name`
/// keep an empty label (they still paint, but never match a result).
pub fn discover_regions(container: &Element) -> Result<Vec<Region>, String> {
    let nodes = container
        .query_selector_all(".constituency-area")
        .map_err(|_| "constituency selector query failed".to_string())?;

    let mut regions = Vec::with_capacity(nodes.length() as usize);
    for i in 0..nodes.length() {
        let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<SvgElement>().ok()) else {
            continue;
        };
        let facts = classify_region(
            el.get_attribute("data-name").as_deref(),
            el.get_attribute("stroke").as_deref(),
        );
        regions.push(Region {
            element: el,
            label: facts.label,
            special: facts.special,
        });
    }

    require_regions(regions.len())?;
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::{RegionFacts, classify_region, has_real_fill, require_regions};

    #[test]
    fn real_fill_detection() {
        assert!(has_real_fill(Some("#d8e3dc")));
        assert!(!has_real_fill(Some("none")));
        assert!(!has_real_fill(Some("transparent")));
        assert!(!has_real_fill(Some("")));
        assert!(!has_real_fill(None));
    }

    #[test]
    fn inset_marker_stroke_flags_special() {
        assert_eq!(
            classify_region(Some("Dhaka-8"), Some("#fcb92d")),
            RegionFacts {
                label: "Dhaka-8".into(),
                special: true
            }
        );
        assert_eq!(
            classify_region(Some("Dhaka-8"), Some("#333333")),
            RegionFacts {
                label: "Dhaka-8".into(),
                special: false
            }
        );
    }

    #[test]
    fn missing_label_becomes_empty_not_dropped() {
        assert_eq!(classify_region(None, None).label, "");
    }

    #[test]
    fn zero_regions_is_a_fatal_startup_error() {
        assert!(require_regions(0).is_err());
        assert_eq!(require_regions(300), Ok(300));
    }
}
