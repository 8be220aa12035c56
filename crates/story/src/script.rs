use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context as _;
use blockzone_core::{
    Action, BlockConfig, BlockRegistry, Document, Layer, PersistedDocument, ZoneKey,
};
use blockzone_dnd::{
    DropOutcome, EditorConfig, EditorController, GestureEvent, ResolverConfig, ZoneState,
};
use serde::{Deserialize, Serialize};
use web_time::Instant;

/// A recorded editing session: a starting document, the block types on offer
/// and the events to replay against them.
#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub document: Document,
    #[serde(default)]
    pub blocks: BTreeMap<String, BlockConfig>,
    #[serde(default)]
    pub hover_debounce_ms: u64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Gesture(GestureEvent),
    Hover(Option<ZoneKey>),
    Enter(ZoneKey),
    Leave(ZoneKey),
    /// Advance the replay clock by this many milliseconds.
    Wait(u64),
    Dispatch(Action),
    /// Print enablement of these zones at this point of the replay.
    Inspect(Vec<ZoneKey>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum StepReport {
    Dropped { action: Action },
    Rejected { zone: ZoneKey },
    Cancelled,
    Dispatched { blocks: usize },
    Zones { zones: BTreeMap<ZoneKey, ZoneReport> },
}

#[derive(Debug, Serialize)]
pub struct ZoneReport {
    pub enabled: bool,
    pub highlighted: bool,
    pub hovered: bool,
}

impl From<ZoneState> for ZoneReport {
    fn from(state: ZoneState) -> Self {
        Self {
            enabled: state.enabled,
            highlighted: state.highlighted,
            hovered: state.hovered,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Replay {
    pub reports: Vec<StepReport>,
    pub outline: Vec<Layer>,
    pub document: PersistedDocument,
}

impl Script {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("failed to parse replay script")
    }

    pub fn replay(self) -> anyhow::Result<Replay> {
        let mut registry = BlockRegistry::new();
        for (block_type, config) in self.blocks {
            registry.insert(block_type, config);
        }
        let config = EditorConfig::default().resolver(
            ResolverConfig::default().hover_debounce(Duration::from_millis(self.hover_debounce_ms)),
        );
        let mut editor = EditorController::with_config(self.document, registry, config);

        // Steps take no time unless a `wait` says otherwise, so debounced
        // hovers settle exactly when the script allows.
        let mut now = Instant::now();
        let mut reports = Vec::new();
        for (ix, step) in self.steps.into_iter().enumerate() {
            tracing::debug!(step = ix, ?step, "replaying step");
            match step {
                Step::Gesture(event) => {
                    let outcome = editor
                        .handle_gesture(event)
                        .with_context(|| format!("gesture at step {ix} failed"))?;
                    match outcome {
                        Some(DropOutcome::Dropped(action)) => {
                            reports.push(StepReport::Dropped { action })
                        }
                        Some(DropOutcome::Rejected(location)) => {
                            reports.push(StepReport::Rejected {
                                zone: location.zone,
                            })
                        }
                        Some(DropOutcome::Cancelled) => reports.push(StepReport::Cancelled),
                        Some(DropOutcome::Ignored) | None => {}
                    }
                }
                Step::Hover(zone) => {
                    editor.report_hover_at(zone, now);
                    editor.tick_at(now);
                }
                Step::Enter(zone) => {
                    editor.zone_enter_at(zone, now);
                    editor.tick_at(now);
                }
                Step::Leave(zone) => {
                    editor.zone_leave_at(&zone, now);
                    editor.tick_at(now);
                }
                Step::Wait(ms) => {
                    now += Duration::from_millis(ms);
                    editor.tick_at(now);
                }
                Step::Dispatch(action) => {
                    let doc = editor
                        .dispatch(action)
                        .with_context(|| format!("dispatch at step {ix} failed"))?;
                    reports.push(StepReport::Dispatched {
                        blocks: doc.block_count(),
                    });
                }
                Step::Inspect(zones) => {
                    let zones = zones
                        .into_iter()
                        .map(|zone| {
                            let state = editor.zone_state(&zone);
                            (zone, state.into())
                        })
                        .collect();
                    reports.push(StepReport::Zones { zones });
                }
            }
        }

        let document = editor.into_document();
        Ok(Replay {
            reports,
            outline: document.outline(),
            document: PersistedDocument::from_document(document),
        })
    }
}
