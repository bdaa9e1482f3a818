use leptos::prelude::*;

use resultmap_shared::{ResultSnapshot, TickerEntry, ticker_entries};

pub const WAITING_PLACEHOLDER: &str = "Waiting for results...";

pub fn winner_line(entry: &TickerEntry) -> String {
    format!("{} ({})", entry.candidate, entry.party)
}

/// Scrolling list of declared winners, newest first. Rebuilt from
/// scratch on every snapshot replacement.
#[component]
pub fn Ticker() -> impl IntoView {
    let snapshot: RwSignal<ResultSnapshot> = expect_context();
    let entries = Memo::new(move |_| snapshot.with(ticker_entries));

    view! {
        <div style="position: absolute; left: 0; right: 0; bottom: 0; z-index: 10; background: #13161f; border-top: 1px solid #282c3e; padding: 6px 12px; white-space: nowrap; overflow-x: auto; font-size: 0.78rem; color: #e2e0d8;">
            {move || {
                let entries = entries.get();
                if entries.is_empty() {
                    return view! {
                        <span style="color: #9a9590;">{WAITING_PLACEHOLDER}</span>
                    }
                    .into_any();
                }
                entries
                    .into_iter()
                    .map(|entry| {
                        let line = winner_line(&entry);
                        view! {
                            <div style="display: inline-flex; align-items: center; gap: 6px; margin-right: 18px;">
                                <span style=format!(
                                    "width: 8px; height: 8px; border-radius: 50%; display: inline-block; background: {};",
                                    entry.color
                                ) />
                                <span style="font-weight: 700;">{entry.constituency.clone()} ":"</span>
                                <span>{line}</span>
                            </div>
                        }
                    })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}
