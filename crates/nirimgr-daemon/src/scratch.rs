//! Scratchpad helpers
//!
//! The scratchpad is an ordinary named niri workspace. `move` parks the
//! focused window there as a floating window; `show` brings a parked window
//! back to the focused workspace and runs the configured
//! `showScratchpadActions` on it. With several parked windows, the configured
//! launcher picks one; without a launcher the last one is shown.
//!
//! `spawn-or-focus` focuses a running window matching the `spawnOrFocus`
//! rules, or spawns its command when there is none.

use std::process::Stdio;

use anyhow::{anyhow, bail, Context, Result};
use nirimgr_config::Config;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::engine::{
    binder, matcher, Action, ActionRegistry, ConditionEvaluator, PossibleKeys, ReferenceKeys,
};
use crate::niri_ipc::{ActionSink, NiriClient, Window, Workspace};

/// Builds and sends scratchpad actions
pub struct Scratchpad<'a> {
    config: &'a Config,
    actions: &'a ActionRegistry,
    conditions: ConditionEvaluator,
}

impl<'a> Scratchpad<'a> {
    pub fn new(config: &'a Config, actions: &'a ActionRegistry) -> Self {
        Self {
            config,
            actions,
            conditions: ConditionEvaluator::new(),
        }
    }

    /// Move the focused window to the scratchpad workspace
    pub async fn move_focused<S: ActionSink>(&self, client: &mut NiriClient, sink: &S) -> Result<()> {
        let workspaces = client.get_workspaces().await?;
        let scratchpad = self.find_scratchpad(&workspaces)?;
        let window = client
            .get_focused_window()
            .await?
            .ok_or_else(|| anyhow!("no window is focused"))?;

        info!(id = window.id, app_id = %window.app_id, "Moving window to scratchpad");
        let plan = self.move_plan(&window, scratchpad)?;
        perform(sink, &plan).await
    }

    /// Bring a scratchpad window to the focused workspace
    ///
    /// Does nothing when the scratchpad is empty. Several parked windows go
    /// through the launcher, or the last one is taken when none is set.
    pub async fn show<S: ActionSink>(&self, client: &mut NiriClient, sink: &S) -> Result<()> {
        let workspaces = client.get_workspaces().await?;
        let scratchpad = self.find_scratchpad(&workspaces)?;
        let focused = workspaces
            .iter()
            .find(|w| w.is_focused)
            .ok_or_else(|| anyhow!("no workspace is focused"))?;
        let windows = client.get_windows().await?;

        let window = match windows_on(&windows, scratchpad.id).as_slice() {
            [] => {
                info!(workspace = %scratchpad.name, "Scratchpad is empty");
                return Ok(());
            }
            [.., last] if self.config.launcher.is_empty() => *last,
            [only] => *only,
            parked => self.pick(parked).await?,
        };

        info!(id = window.id, app_id = %window.app_id, "Showing scratchpad window");
        let plan = self.show_plan(window, focused)?;
        perform(sink, &plan).await
    }

    /// Focus the running window for `app_id`, or spawn it
    ///
    /// A focused match hands focus back to the previous window instead.
    pub async fn spawn_or_focus<S: ActionSink>(
        &self,
        client: &mut NiriClient,
        sink: &S,
        app_id: &str,
    ) -> Result<()> {
        let windows = client.get_windows().await?;
        let plan = self.spawn_or_focus_plan(&windows, app_id)?;
        perform(sink, &plan).await
    }

    /// Action for `spawn-or-focus` given the open windows
    pub fn spawn_or_focus_plan(&self, windows: &[Window], app_id: &str) -> Result<Vec<Action>> {
        let spawn = &self.config.spawn_or_focus;
        let command = spawn
            .command(app_id)
            .ok_or_else(|| anyhow!("no spawnOrFocus command for {}", app_id))?;

        let running = windows.iter().rev().find(|window| {
            window.app_id.contains(app_id)
                && spawn.rules.iter().any(|rule| matcher::rule_matches(rule, *window))
        });

        let action = match running {
            Some(window) if window.is_focused => {
                debug!(id = window.id, "Window already focused, going back");
                self.template("FocusWindowPrevious", json!({}), &PossibleKeys::default())?
            }
            Some(window) => {
                debug!(id = window.id, title = %window.title, "Focusing running window");
                self.template("FocusWindow", json!({}), &PossibleKeys::for_window(window.id))?
            }
            None => {
                debug!(?command, "No running window, spawning");
                self.template("Spawn", json!({ "command": command }), &PossibleKeys::default())?
            }
        };
        Ok(vec![action])
    }

    /// Let the launcher pick one of `windows`
    ///
    /// The launcher reads `<index> - <title>` lines on stdin and prints the
    /// chosen line; only its leading index is used.
    async fn pick<'w>(&self, windows: &[&'w Window]) -> Result<&'w Window> {
        let menu: String = windows
            .iter()
            .enumerate()
            .map(|(index, window)| format!("{} - {}\n", index, window.title))
            .collect();

        let launcher = &self.config.launcher;
        let mut child = Command::new(launcher)
            .args(self.config.launcher_options.split_whitespace())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to run launcher {}", launcher))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(menu.as_bytes())
                .await
                .with_context(|| format!("failed to write to launcher {}", launcher))?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            bail!("launcher {} exited with {}", launcher, output.status);
        }

        let choice = String::from_utf8_lossy(&output.stdout);
        let index: usize = choice
            .split_whitespace()
            .next()
            .ok_or_else(|| anyhow!("nothing was picked"))?
            .parse()
            .with_context(|| format!("launcher returned {:?}", choice.trim()))?;

        windows
            .get(index)
            .copied()
            .ok_or_else(|| anyhow!("launcher picked unknown entry {}", index))
    }

    fn find_scratchpad<'w>(&self, workspaces: &'w [Workspace]) -> Result<&'w Workspace> {
        let name = &self.config.scratchpad_workspace;
        workspaces
            .iter()
            .find(|w| &w.name == name)
            .ok_or_else(|| anyhow!("no workspace named '{}' - add it to the niri config", name))
    }

    /// Actions parking `window` on `scratchpad`
    pub fn move_plan(&self, window: &Window, scratchpad: &Workspace) -> Result<Vec<Action>> {
        Ok(vec![
            self.template(
                "MoveWindowToWorkspace",
                json!({"focus": false}),
                &move_keys(window.id, scratchpad.id),
            )?,
            self.template("MoveWindowToFloating", json!({}), &PossibleKeys::for_window(window.id))?,
        ])
    }

    /// Actions bringing `window` to the `focused` workspace
    pub fn show_plan(&self, window: &Window, focused: &Workspace) -> Result<Vec<Action>> {
        let window_keys = PossibleKeys::for_window(window.id);
        let mut plan = vec![
            self.template(
                "MoveWindowToWorkspace",
                json!({"focus": true}),
                &move_keys(window.id, focused.id),
            )?,
            // The move's focus flag doesn't focus the window itself.
            self.template("FocusWindow", json!({}), &window_keys)?,
        ];

        for configured in &self.config.show_scratchpad_actions {
            let Some(action) = self.actions.resolve(&configured.name, configured.params.clone()) else {
                warn!(action = %configured.name, "Unknown action in showScratchpadActions, skipping");
                continue;
            };
            match self.conditions.evaluate(&configured.when, window) {
                Ok(true) => plan.push(binder::bind(action, &window_keys)),
                Ok(false) => debug!(action = %configured.name, "Condition not met, skipping action"),
                Err(e) => warn!(action = %configured.name, error = %e, "Could not evaluate condition, skipping action"),
            }
        }

        Ok(plan)
    }

    fn template(&self, name: &str, params: Value, keys: &PossibleKeys) -> Result<Action> {
        let params = match params {
            Value::Object(params) => params,
            _ => serde_json::Map::new(),
        };
        let action = self
            .actions
            .resolve(name, params)
            .ok_or_else(|| anyhow!("unknown action {}", name))?;
        Ok(binder::bind(action, keys))
    }
}

fn move_keys(window_id: u64, workspace_id: u64) -> PossibleKeys {
    PossibleKeys {
        window_id,
        reference: ReferenceKeys {
            id: workspace_id,
            ..ReferenceKeys::default()
        },
        ..PossibleKeys::default()
    }
}

/// Windows on the given workspace, in niri's order
pub fn windows_on(windows: &[Window], workspace_id: u64) -> Vec<&Window> {
    windows
        .iter()
        .filter(|w| w.workspace_id == Some(workspace_id))
        .collect()
}

async fn perform<S: ActionSink>(sink: &S, plan: &[Action]) -> Result<()> {
    for action in plan {
        let request = action.to_request()?;
        debug!(action = action.name(), %request, "Sending action");
        sink.send_action(&request)
            .await
            .with_context(|| format!("failed to perform {}", action.name()))?;
    }
    Ok(())
}
