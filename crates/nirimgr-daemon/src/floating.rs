//! Moving floating windows to the edges of their output

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use tracing::info;

use crate::engine::{binder, Action, ActionRegistry, PossibleKeys};
use crate::niri_ipc::{ActionSink, NiriClient, Output, Window};

/// Logical pixels between niri's tile position and the working area
///
/// Covers a bar at the top of the output.
pub const DEFAULT_TOP_OFFSET: f64 = 34.0;

/// Gap left between the window and the edge
pub const DEFAULT_BORDER: f64 = 1.0;

/// Edge of the output to move a window to
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Edge {
    Left,
    Right,
    Up,
    Down,
}

/// A `floating move` request
#[derive(Debug, Clone, Copy)]
pub struct EdgeMove {
    pub edge: Edge,
    pub border: f64,
    pub top_offset: f64,
}

impl EdgeMove {
    pub fn new(edge: Edge) -> Self {
        Self {
            edge,
            border: DEFAULT_BORDER,
            top_offset: DEFAULT_TOP_OFFSET,
        }
    }

    /// Move the focused floating window to the edge
    pub async fn perform<S: ActionSink>(
        &self,
        actions: &ActionRegistry,
        client: &mut NiriClient,
        sink: &S,
    ) -> Result<()> {
        let windows = client.get_windows().await?;
        let window = windows
            .iter()
            .find(|w| w.is_focused && w.is_floating)
            .ok_or_else(|| anyhow!("no focused floating window"))?;

        let workspaces = client.get_workspaces().await?;
        let workspace = workspaces
            .iter()
            .find(|w| w.is_focused)
            .ok_or_else(|| anyhow!("no workspace is focused"))?;

        let outputs = client.get_outputs().await?;
        let output = outputs
            .iter()
            .find(|o| o.name == workspace.output)
            .ok_or_else(|| anyhow!("output {} not found", workspace.output))?;

        let action = self.plan(actions, window, output)?;
        info!(id = window.id, edge = ?self.edge, "Moving floating window");
        let request = action.to_request()?;
        sink.send_action(&request)
            .await
            .context("failed to move floating window")
    }

    /// The `MoveFloatingWindow` action placing `window` on `output`
    pub fn plan(&self, actions: &ActionRegistry, window: &Window, output: &Output) -> Result<Action> {
        let (screen_width, screen_height) = output
            .logical_size
            .ok_or_else(|| anyhow!("output {} is disabled", output.name))?;
        let (x, y) = window
            .layout
            .tile_pos_in_workspace_view
            .ok_or_else(|| anyhow!("window {} has no position on screen", window.id))?;
        let (width, height) = window.layout.window_size;
        let (width, height) = (f64::from(width), f64::from(height));
        let (screen_width, screen_height) = (f64::from(screen_width), f64::from(screen_height));

        let (new_x, new_y) = match self.edge {
            Edge::Left => (self.border, y - self.top_offset),
            Edge::Right => (screen_width - width - self.border, y - self.top_offset),
            Edge::Up => (x, self.border),
            Edge::Down => (x, screen_height - height - self.border - self.top_offset),
        };

        let params = json!({
            "x": {"SetFixed": new_x},
            "y": {"SetFixed": new_y},
        });
        let action = actions
            .resolve("MoveFloatingWindow", params.as_object().cloned().unwrap_or_default())
            .ok_or_else(|| anyhow!("unknown action MoveFloatingWindow"))?;
        Ok(binder::bind(action, &PossibleKeys::for_window(window.id)))
    }
}
