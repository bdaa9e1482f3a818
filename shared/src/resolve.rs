use crate::colors::{party_color, rgb_css};
use crate::normalize::canonical_key;
use crate::results::{ResultRecord, ResultSnapshot};
use crate::seats::SeatIndex;

/// Stroke attribute value that marks inset/overview boundary frames in
/// the source map document. Captured at discovery time; such regions
/// keep the accent stroke regardless of live results.
pub const INSET_MARKER_STROKE: &str = "#fcb92d";

/// Idle / themed style values. These reference the page's CSS custom
/// properties so the map follows the document theme.
pub const IDLE_FILL: &str = "var(--map-fill)";
pub const IDLE_STROKE: &str = "var(--map-stroke)";
pub const IDLE_STROKE_WIDTH: &str = "0.5px";
pub const ACCENT_STROKE: &str = "var(--accent)";
pub const ACCENT_STROKE_WIDTH: &str = "2px";
pub const HOVER_FILL: &str = "var(--map-hover)";
pub const HOVER_STROKE: &str = "var(--text-primary)";
pub const HOVER_STROKE_WIDTH: &str = "2px";
pub const WINNER_STROKE: &str = "#ffffff";
pub const WINNER_STROKE_WIDTH: &str = "1px";

/// Concrete style channels applied to a region in one paint.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualState {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: String,
    pub winner: bool,
}

/// What the tooltip shows for a region, beyond its title label.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipDetail {
    /// A live result is known: declared winner and party.
    Winner { candidate: String, party: String },
    /// Static metadata only: district and division.
    Seat { district: String, division: String },
    /// Nothing known beyond the label.
    None,
}

/// The reconciler's output for one region: the style to paint and the
/// tooltip content to show on hover.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedState {
    pub visual: VisualState,
    pub tooltip: TooltipDetail,
}

/// Live-result lookup for a region label: the raw display name is tried
/// first, then the canonical key. Raw match takes priority so feed
/// operators can override canonical collisions explicitly.
pub fn lookup_result<'a>(snapshot: &'a ResultSnapshot, label: &str) -> Option<&'a ResultRecord> {
    snapshot
        .get(label)
        .or_else(|| snapshot.get(&canonical_key(label)))
}

/// Fill color for a live result. Colors from the feed pass through
/// verbatim; a record without one gets a deterministic party color so
/// the win stays visible.
pub fn result_fill(record: &ResultRecord) -> String {
    if record.color.is_empty() {
        let (r, g, b) = party_color(&record.party);
        rgb_css(r, g, b)
    } else {
        record.color.clone()
    }
}

/// Resolve a region's visual state and tooltip content from its raw
/// label, its immutable inset flag, the current snapshot, and the seat
/// index. Pure: the same inputs always produce the same state, so
/// pointer-driven and feed-driven repaints can race freely.
pub fn resolve(
    label: &str,
    special: bool,
    snapshot: &ResultSnapshot,
    seats: &SeatIndex,
) -> ResolvedState {
    if let Some(record) = lookup_result(snapshot, label) {
        let visual = VisualState {
            fill: result_fill(record),
            stroke: if special { ACCENT_STROKE } else { WINNER_STROKE }.to_string(),
            stroke_width: if special {
                ACCENT_STROKE_WIDTH
            } else {
                WINNER_STROKE_WIDTH
            }
            .to_string(),
            winner: true,
        };
        return ResolvedState {
            visual,
            tooltip: TooltipDetail::Winner {
                candidate: record.candidate.clone(),
                party: record.party.clone(),
            },
        };
    }

    let visual = VisualState {
        fill: IDLE_FILL.to_string(),
        stroke: if special { ACCENT_STROKE } else { IDLE_STROKE }.to_string(),
        stroke_width: if special {
            ACCENT_STROKE_WIDTH
        } else {
            IDLE_STROKE_WIDTH
        }
        .to_string(),
        winner: false,
    };

    let tooltip = match seats.lookup(&canonical_key(label)) {
        Some(seat) => TooltipDetail::Seat {
            district: seat.district_name.clone(),
            division: seat.division_name.clone(),
        },
        None => TooltipDetail::None,
    };

    ResolvedState { visual, tooltip }
}

/// Hover emphasis for a region. The hover fill applies only when no
/// live result is painted (a winner's color stays visible under the
/// pointer); the emphasized stroke applies either way.
pub fn hover_visual(current: &VisualState) -> VisualState {
    VisualState {
        fill: if current.winner {
            current.fill.clone()
        } else {
            HOVER_FILL.to_string()
        },
        stroke: HOVER_STROKE.to_string(),
        stroke_width: HOVER_STROKE_WIDTH.to_string(),
        winner: current.winner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::snapshot_from_json;
    use crate::seats::ElectionData;

    fn seats() -> SeatIndex {
        SeatIndex::build(
            &ElectionData::from_json(
                r#"{"divisions": {"Dhaka": [
                    {"seat_name": "Dhaka-1", "district_name": "Dhaka", "division_name": "Dhaka"}
                ]}}"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn canonical_match_paints_winner() {
        let snap = snapshot_from_json(
            r##"{"dhaka1": {"candidate": "A", "party": "P", "color": "#ff0000", "timestamp": 100}}"##,
        )
        .unwrap();
        let state = resolve("Dhaka-1", false, &snap, &seats());
        assert_eq!(state.visual.fill, "#ff0000");
        assert!(state.visual.winner);
        assert_eq!(state.visual.stroke, WINNER_STROKE);
        assert_eq!(state.visual.stroke_width, "1px");
        assert_eq!(
            state.tooltip,
            TooltipDetail::Winner {
                candidate: "A".into(),
                party: "P".into()
            }
        );
    }

    #[test]
    fn raw_key_takes_priority_over_canonical() {
        let snap = snapshot_from_json(
            r##"{
                "Dhaka-1": {"candidate": "Raw", "party": "P", "color": "#00ff00"},
                "dhaka1": {"candidate": "Canon", "party": "P", "color": "#0000ff"}
            }"##,
        )
        .unwrap();
        let state = resolve("Dhaka-1", false, &snap, &seats());
        assert_eq!(state.visual.fill, "#00ff00");
    }

    #[test]
    fn no_result_falls_back_to_seat_metadata() {
        let state = resolve("Dhaka-1", false, &ResultSnapshot::new(), &seats());
        assert!(!state.visual.winner);
        assert_eq!(state.visual.fill, IDLE_FILL);
        assert_eq!(state.visual.stroke_width, IDLE_STROKE_WIDTH);
        assert_eq!(
            state.tooltip,
            TooltipDetail::Seat {
                district: "Dhaka".into(),
                division: "Dhaka".into()
            }
        );
    }

    #[test]
    fn unknown_label_resolves_to_idle_default() {
        let state = resolve("Atlantis-9", false, &ResultSnapshot::new(), &seats());
        assert_eq!(state.visual.fill, IDLE_FILL);
        assert_eq!(state.tooltip, TooltipDetail::None);
    }

    #[test]
    fn inset_frames_keep_accent_stroke_with_and_without_result() {
        let snap = snapshot_from_json(r##"{"dhaka1": {"color": "#ff0000"}}"##).unwrap();
        let with = resolve("Dhaka-1", true, &snap, &seats());
        assert_eq!(with.visual.stroke, ACCENT_STROKE);
        assert_eq!(with.visual.stroke_width, "2px");

        let without = resolve("Dhaka-1", true, &ResultSnapshot::new(), &seats());
        assert_eq!(without.visual.stroke, ACCENT_STROKE);
        assert_eq!(without.visual.stroke_width, "2px");
    }

    #[test]
    fn colorless_record_gets_deterministic_party_fallback() {
        let snap =
            snapshot_from_json(r#"{"dhaka1": {"candidate": "A", "party": "P"}}"#).unwrap();
        let a = resolve("Dhaka-1", false, &snap, &seats());
        let b = resolve("Dhaka-1", false, &snap, &seats());
        assert_eq!(a.visual.fill, b.visual.fill);
        assert!(a.visual.fill.starts_with('#'));
    }

    #[test]
    fn duplicate_canonical_labels_resolve_identically() {
        let snap = snapshot_from_json(r##"{"dhaka1": {"color": "#abcdef"}}"##).unwrap();
        let a = resolve("Dhaka-1", false, &snap, &seats());
        let b = resolve("DHAKA 1", false, &snap, &seats());
        assert_eq!(a.visual, b.visual);
    }

    #[test]
    fn hover_keeps_winner_fill_but_highlights_idle_fill() {
        let winner = VisualState {
            fill: "#ff0000".into(),
            stroke: WINNER_STROKE.into(),
            stroke_width: WINNER_STROKE_WIDTH.into(),
            winner: true,
        };
        let hovered = hover_visual(&winner);
        assert_eq!(hovered.fill, "#ff0000");
        assert_eq!(hovered.stroke, HOVER_STROKE);

        let idle = VisualState {
            fill: IDLE_FILL.into(),
            stroke: IDLE_STROKE.into(),
            stroke_width: IDLE_STROKE_WIDTH.into(),
            winner: false,
        };
        let hovered = hover_visual(&idle);
        assert_eq!(hovered.fill, HOVER_FILL);
        assert_eq!(hovered.stroke_width, HOVER_STROKE_WIDTH);
    }

    #[test]
    fn resolve_is_idempotent_across_repeated_snapshots() {
        let snap = snapshot_from_json(r##"{"dhaka1": {"color": "#ff0000"}}"##).unwrap();
        let first = resolve("Dhaka-1", false, &snap, &seats());
        let second = resolve("Dhaka-1", false, &snap, &seats());
        assert_eq!(first, second);
    }
}
