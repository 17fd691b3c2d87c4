//! Internal types for niri IPC data
//!
//! The engine works on these instead of the `niri-ipc` structs directly.
//! Optional strings are flattened to empty strings so match patterns can be
//! applied without unwrapping, and every entity carries a `matched` flag
//! that remembers the outcome of the last rule evaluation.
//!
//! Both types deserialize through their `niri_ipc` counterpart, so the JSON
//! niri puts on the wire decodes straight into them.

use serde::{Deserialize, Serialize};

/// A window as tracked by the engine
///
/// # Example
///
/// ```ignore
/// let windows = client.get_windows().await?;
/// for window in windows {
///     println!("{}: {} (workspace {:?})", window.app_id, window.title, window.workspace_id);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "niri_ipc::Window")]
pub struct Window {
    /// Unique window identifier assigned by niri
    pub id: u64,

    /// The window title, empty if the client never set one
    pub title: String,

    /// The Wayland application identifier (e.g., "firefox")
    pub app_id: String,

    /// Process ID of the client, if known
    pub pid: Option<i32>,

    /// The workspace this window is on, if any
    pub workspace_id: Option<u64>,

    pub is_focused: bool,
    pub is_floating: bool,
    pub is_urgent: bool,

    /// When the window last got focus, if niri tracks it
    pub focus_timestamp: Option<Timestamp>,

    /// Position and size of the window
    pub layout: WindowLayout,

    /// Outcome of the last rule evaluation for this window
    ///
    /// Never part of what niri sends; starts out `false`.
    pub matched: bool,
}

/// Layout of a window, as reported by niri
///
/// Sizes and positions are in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowLayout {
    /// Column and tile index, 1-based, for tiled windows
    pub pos_in_scrolling_layout: Option<(usize, usize)>,
    pub tile_size: (f64, f64),
    pub window_size: (i32, i32),
    pub tile_pos_in_workspace_view: Option<(f64, f64)>,
    pub window_offset_in_tile: (f64, f64),
}

/// Monotonic timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub secs: u64,
    pub nanos: u32,
}

/// A workspace as tracked by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "niri_ipc::Workspace")]
pub struct Workspace {
    /// Unique workspace identifier, stable across moves between outputs
    pub id: u64,

    /// Index of the workspace on its monitor, 1-based
    pub idx: u8,

    /// Workspace name, empty for unnamed workspaces
    pub name: String,

    /// Output the workspace is on, empty if none
    pub output: String,

    pub is_urgent: bool,
    pub is_active: bool,
    pub is_focused: bool,

    /// Window focused on this workspace, if any
    pub active_window_id: Option<u64>,

    /// Outcome of the last rule evaluation for this workspace
    pub matched: bool,
}

/// A monitor as far as window placement is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    /// Connector name, e.g. "eDP-1"
    pub name: String,

    /// Logical width and height, `None` while the output is disabled
    pub logical_size: Option<(u32, u32)>,
}

/// Configured keyboard layouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardLayouts {
    /// XKB names of the configured layouts
    pub names: Vec<String>,
    /// Index of the currently active layout in `names`
    pub current_idx: u8,
}

impl From<niri_ipc::Window> for Window {
    fn from(window: niri_ipc::Window) -> Self {
        Self {
            id: window.id,
            title: window.title.unwrap_or_default(),
            app_id: window.app_id.unwrap_or_default(),
            pid: window.pid,
            workspace_id: window.workspace_id,
            is_focused: window.is_focused,
            is_floating: window.is_floating,
            is_urgent: window.is_urgent,
            focus_timestamp: window.focus_timestamp.map(Timestamp::from),
            layout: window.layout.into(),
            matched: false,
        }
    }
}

impl From<niri_ipc::WindowLayout> for WindowLayout {
    fn from(layout: niri_ipc::WindowLayout) -> Self {
        Self {
            pos_in_scrolling_layout: layout.pos_in_scrolling_layout,
            tile_size: layout.tile_size,
            window_size: layout.window_size,
            tile_pos_in_workspace_view: layout.tile_pos_in_workspace_view,
            window_offset_in_tile: layout.window_offset_in_tile,
        }
    }
}

impl From<niri_ipc::Timestamp> for Timestamp {
    fn from(timestamp: niri_ipc::Timestamp) -> Self {
        Self {
            secs: timestamp.secs,
            nanos: timestamp.nanos,
        }
    }
}

impl From<niri_ipc::Output> for Output {
    fn from(output: niri_ipc::Output) -> Self {
        Self {
            name: output.name,
            logical_size: output.logical.map(|logical| (logical.width, logical.height)),
        }
    }
}

impl From<niri_ipc::Workspace> for Workspace {
    fn from(workspace: niri_ipc::Workspace) -> Self {
        Self {
            id: workspace.id,
            idx: workspace.idx,
            name: workspace.name.unwrap_or_default(),
            output: workspace.output.unwrap_or_default(),
            is_urgent: workspace.is_urgent,
            is_active: workspace.is_active,
            is_focused: workspace.is_focused,
            active_window_id: workspace.active_window_id,
            matched: false,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders for `niri_ipc` structs shared by the tests of several modules

    pub fn niri_window(id: u64, app_id: Option<&str>, title: Option<&str>) -> niri_ipc::Window {
        niri_ipc::Window {
            id,
            title: title.map(String::from),
            app_id: app_id.map(String::from),
            pid: Some(4242),
            workspace_id: Some(1),
            is_focused: false,
            is_urgent: false,
            is_floating: false,
            focus_timestamp: None,
            layout: niri_ipc::WindowLayout {
                pos_in_scrolling_layout: None,
                tile_size: (800.0, 600.0),
                window_size: (800, 600),
                tile_pos_in_workspace_view: None,
                window_offset_in_tile: (0.0, 0.0),
            },
        }
    }

    pub fn niri_workspace(id: u64, idx: u8, name: Option<&str>) -> niri_ipc::Workspace {
        niri_ipc::Workspace {
            id,
            idx,
            name: name.map(String::from),
            output: Some("eDP-1".to_string()),
            is_urgent: false,
            is_active: true,
            is_focused: false,
            active_window_id: None,
        }
    }
}
