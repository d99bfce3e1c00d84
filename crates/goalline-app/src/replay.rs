//! Headless replay of goal-line sessions.
//!
//! A script describes the viewport, the arrangement the server sends and a
//! sequence of local input and inbound updates. Replaying it drives a
//! [`GoalLineView`] over a [`RecordingSurface`] and reports what each step
//! sent to the other participants.

use crate::error::{AppError, AppResult};
use goalline_core::{
    ASSET_NAMES, GoalEntry, GoalLineConfig, ImageCache, LocalChannel, Orientation, PointerEvent, UPDATE_GOALLINE,
    asset_name,
};
use goalline_render::{DrawCommand, GoalLineView, RecordingSurface};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Cube slots on the board.
const SLOTS: usize = ASSET_NAMES.len();

type ReplayView = GoalLineView<RecordingSurface<String>, LocalChannel>;

fn default_viewport() -> Size {
    Size::new(1280.0, 720.0)
}

fn default_true() -> bool {
    true
}

/// A scripted session.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    #[serde(default = "default_viewport")]
    pub viewport: Size,
    #[serde(default)]
    pub canvas_origin: Point,
    #[serde(default)]
    pub config: GoalLineConfig,
    /// Face value of every cube slot. Empty means all zero.
    #[serde(default)]
    pub cube_index: Vec<i32>,
    /// Whether the local player sets the goal (input enabled from the start).
    #[serde(default = "default_true")]
    pub goal_setter: bool,
    pub steps: Vec<Step>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> AppResult<Self> {
        let script: Self = serde_json::from_str(json)?;
        script.config.validate()?;
        Ok(script)
    }
}

/// One scripted action. Pointer positions are in client coordinates.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Initialize {
        entries: Vec<GoalEntry>,
    },
    Pointer {
        event: PointerEvent,
    },
    AddToken {
        source_index: usize,
    },
    Clear,
    /// Inbound `update_goalline` payload from another participant.
    Remote {
        payload: serde_json::Value,
    },
    Resize {
        viewport: Size,
        #[serde(default)]
        canvas_origin: Point,
    },
    RegisterInput,
    DeregisterInput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentEvent {
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub sent: Vec<SentEvent>,
    pub redrawn: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSnapshot {
    pub order: usize,
    pub source_index: usize,
    pub image: String,
    pub x: f64,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepOutcome>,
    pub tokens: Vec<TokenSnapshot>,
}

impl ReplayReport {
    /// Every event sent during the replay, in order.
    pub fn sent(&self) -> impl Iterator<Item = &SentEvent> {
        self.steps.iter().flat_map(|s| s.sent.iter())
    }
}

/// Asset cache whose images are their own file names.
fn named_assets() -> ImageCache<String> {
    let mut cache = ImageCache::new();
    for name in ASSET_NAMES {
        cache.insert(name, name.to_string());
    }
    cache
}

/// Run a script to completion.
pub fn replay(script: &ReplayScript) -> AppResult<ReplayReport> {
    let cube_index = if script.cube_index.is_empty() {
        vec![0; SLOTS]
    } else if script.cube_index.len() == SLOTS {
        script.cube_index.clone()
    } else {
        return Err(AppError::Script(format!(
            "cube_index must have {} entries, got {}",
            SLOTS,
            script.cube_index.len()
        )));
    };
    let assets = named_assets();

    let mut view: ReplayView = GoalLineView::new(
        RecordingSurface::new(Size::ZERO),
        script.viewport,
        script.canvas_origin,
        script.config.clone(),
        LocalChannel::new(),
    )?;
    if script.goal_setter {
        view.register_input_handlers();
    }
    view.surface_mut().take_commands();

    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        log::debug!("Step {}: {:?}", index, step);
        run_step(&mut view, step, &assets, &cube_index)
            .map_err(|e| AppError::Script(format!("step {}: {}", index, e)))?;

        let sent = view
            .widget_mut()
            .channel_mut()
            .take_outgoing()
            .into_iter()
            .map(|(event, payload)| SentEvent { event, payload })
            .collect();
        let redrawn = view
            .surface_mut()
            .take_commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Clear(_)));
        steps.push(StepOutcome {
            step: index,
            sent,
            redrawn,
        });
    }

    let tokens = view
        .widget()
        .tokens()
        .iter()
        .map(|t| TokenSnapshot {
            order: t.order(),
            source_index: t.source_index(),
            image: t.image().clone(),
            x: t.position_x(),
            orientation: t.orientation(),
        })
        .collect();
    Ok(ReplayReport { steps, tokens })
}

fn run_step(view: &mut ReplayView, step: &Step, assets: &ImageCache<String>, cube_index: &[i32]) -> AppResult<()> {
    match step {
        Step::Initialize { entries } => view.initialize(entries, assets, cube_index)?,
        Step::Pointer { event } => {
            view.handle_pointer_event(*event);
        }
        Step::AddToken { source_index } => {
            let face = cube_index
                .get(*source_index)
                .copied()
                .ok_or_else(|| AppError::Script(format!("no cube slot {}", source_index)))?;
            let image = asset_name(*source_index, face)
                .ok_or_else(|| AppError::Script(format!("no image for slot {} face {}", source_index, face)))?;
            view.add_token(*source_index, image);
        }
        Step::Clear => view.clear(),
        Step::Remote { payload } => {
            view.widget_mut().channel_mut().dispatch(UPDATE_GOALLINE, payload);
            view.sync_remote();
        }
        Step::Resize { viewport, canvas_origin } => view.resize(*viewport, *canvas_origin)?,
        Step::RegisterInput => view.register_input_handlers(),
        Step::DeregisterInput => view.deregister_input_handlers(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// 1000 x 1000 viewport: 330 x 90 canvas at the client origin, row at 11.25.
    fn script(steps: serde_json::Value) -> ReplayScript {
        let json = json!({
            "viewport": {"width": 1000.0, "height": 1000.0},
            "steps": steps,
        });
        ReplayScript::from_json(&json.to_string()).unwrap()
    }

    #[test]
    fn test_drag_session() {
        let script = script(json!([
            {"op": "initialize", "entries": [{"idx": 0, "x": 10.0}, {"idx": 7, "x": 150.0, "orientation": 270}]},
            {"op": "pointer", "event": {"kind": "down", "position": {"x": 12.0, "y": 20.0}, "button": "left"}},
            {"op": "pointer", "event": {"kind": "move", "position": {"x": 62.0, "y": 20.0}}},
            {"op": "pointer", "event": {"kind": "up", "position": {"x": 62.0, "y": 20.0}, "button": "left"}},
            {"op": "pointer", "event": {"kind": "down", "position": {"x": 160.0, "y": 20.0}, "button": "right"}},
        ]));
        let report = replay(&script).unwrap();

        let sent: Vec<&SentEvent> = report.sent().collect();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].event, "x_pos_update");
        assert_eq!(sent[0].payload, json!({"order": 0, "x_pos": 60.0}));
        assert_eq!(sent[1].payload, json!({"order": 1, "orientation": 0}));

        assert!(report.steps[0].redrawn);
        assert!(!report.steps[1].redrawn);
        assert!(report.steps[2].redrawn);
        assert_eq!(report.tokens[1].image, "b0.png");
        assert_eq!(report.tokens[1].orientation, Orientation::Up);
    }

    #[test]
    fn test_add_and_remote_updates() {
        let mut script = script(json!([
            {"op": "add_token", "source_index": 19},
            {"op": "add_token", "source_index": 2},
            {"op": "remote", "payload": {"type": "orientation", "order": 0, "new_val": 90}},
            {"op": "remote", "payload": {"type": "x_pos", "order": 5, "new_val": 10.0}},
        ]));
        script.cube_index = (0..24).map(|i| i % 6).collect();
        let report = replay(&script).unwrap();

        assert_eq!(report.tokens.len(), 2);
        assert_eq!(report.tokens[0].image, "bk1.png");
        assert_eq!(report.tokens[1].image, "r2.png");
        assert_eq!(report.tokens[0].orientation, Orientation::Right);
        assert!(report.tokens[0].x < report.tokens[1].x);

        assert!(report.steps[2].redrawn);
        // Update for an order not on the goal line.
        assert!(!report.steps[3].redrawn);
        assert!(report.steps[2].sent.is_empty());
    }

    #[test]
    fn test_spectator_input_ignored() {
        let mut script = script(json!([
            {"op": "initialize", "entries": [{"idx": 0, "x": 10.0}]},
            {"op": "pointer", "event": {"kind": "down", "position": {"x": 20.0, "y": 20.0}, "button": "right"}},
            {"op": "register_input"},
            {"op": "pointer", "event": {"kind": "down", "position": {"x": 20.0, "y": 20.0}, "button": "right"}},
        ]));
        script.goal_setter = false;
        let report = replay(&script).unwrap();

        assert!(report.steps[1].sent.is_empty());
        assert_eq!(report.steps[3].sent.len(), 1);
    }

    #[test]
    fn test_bad_cube_index_rejected() {
        let mut script = script(json!([]));
        script.cube_index = vec![1, 2, 3];
        assert!(matches!(replay(&script), Err(AppError::Script(_))));
    }

    #[test]
    fn test_missing_asset_fails_step() {
        let mut script = script(json!([
            {"op": "initialize", "entries": [{"idx": 3, "x": 10.0}]},
        ]));
        script.cube_index = vec![9; 24];
        let err = replay(&script).unwrap_err();
        assert!(err.to_string().contains("step 0"));
    }
}
