//! Catalog of compositor actions
//!
//! Every action niri accepts is listed here by name, together with the
//! parameters that can be filled in at dispatch time from the triggering
//! notification or entity. A configured action is resolved against this
//! catalog into an [`Action`]: a known kind plus a parameter template.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::niri_ipc::NiriError;

/// A parameter that can be bound from runtime identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicField {
    Id,
    WindowId,
    ActiveWindowId,
    WorkspaceId,
    Index,
    /// Workspace reference, written as `{"Id": n}`, `{"Index": n}` or `{"Name": s}`
    Reference,
}

impl DynamicField {
    /// Parameter key as niri names it
    pub fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::WindowId => "window_id",
            Self::ActiveWindowId => "active_window_id",
            Self::WorkspaceId => "workspace_id",
            Self::Index => "index",
            Self::Reference => "reference",
        }
    }
}

/// A named action and the parameters it can have bound
#[derive(Debug, PartialEq, Eq)]
pub struct ActionKind {
    pub name: &'static str,
    pub fields: &'static [DynamicField],
}

impl ActionKind {
    pub fn has_field(&self, field: DynamicField) -> bool {
        self.fields.contains(&field)
    }
}

const NONE: &[DynamicField] = &[];
const ID: &[DynamicField] = &[DynamicField::Id];
const INDEX: &[DynamicField] = &[DynamicField::Index];
const REFERENCE: &[DynamicField] = &[DynamicField::Reference];
const WINDOW_AND_REFERENCE: &[DynamicField] = &[DynamicField::WindowId, DynamicField::Reference];
const INDEX_AND_REFERENCE: &[DynamicField] = &[DynamicField::Index, DynamicField::Reference];

macro_rules! catalog {
    ($($name:ident => $fields:expr),* $(,)?) => {
        &[$(ActionKind { name: stringify!($name), fields: $fields },)*]
    };
}

static CATALOG: &[ActionKind] = catalog! {
    CenterColumn => NONE,
    CenterVisibleColumns => NONE,
    CenterWindow => ID,
    ClearDynamicCastTarget => NONE,
    CloseOverview => NONE,
    CloseWindow => ID,
    ConsumeOrExpelWindowLeft => ID,
    ConsumeOrExpelWindowRight => ID,
    ConsumeWindowIntoColumn => NONE,
    DebugToggleDamage => NONE,
    DebugToggleOpaqueRegions => NONE,
    DoScreenTransition => NONE,
    ExpandColumnToAvailableWidth => NONE,
    ExpelWindowFromColumn => NONE,
    FocusColumn => INDEX,
    FocusColumnFirst => NONE,
    FocusColumnLast => NONE,
    FocusColumnLeft => NONE,
    FocusColumnLeftOrLast => NONE,
    FocusColumnOrMonitorLeft => NONE,
    FocusColumnOrMonitorRight => NONE,
    FocusColumnRight => NONE,
    FocusColumnRightOrFirst => NONE,
    FocusFloating => NONE,
    FocusMonitor => NONE,
    FocusMonitorDown => NONE,
    FocusMonitorLeft => NONE,
    FocusMonitorNext => NONE,
    FocusMonitorPrevious => NONE,
    FocusMonitorRight => NONE,
    FocusMonitorUp => NONE,
    FocusTiling => NONE,
    FocusWindow => ID,
    FocusWindowBottom => NONE,
    FocusWindowDown => NONE,
    FocusWindowDownOrColumnLeft => NONE,
    FocusWindowDownOrColumnRight => NONE,
    FocusWindowDownOrTop => NONE,
    FocusWindowInColumn => INDEX,
    FocusWindowOrMonitorDown => NONE,
    FocusWindowOrMonitorUp => NONE,
    FocusWindowOrWorkspaceDown => NONE,
    FocusWindowOrWorkspaceUp => NONE,
    FocusWindowPrevious => NONE,
    FocusWindowTop => NONE,
    FocusWindowUp => NONE,
    FocusWindowUpOrBottom => NONE,
    FocusWindowUpOrColumnLeft => NONE,
    FocusWindowUpOrColumnRight => NONE,
    FocusWorkspace => REFERENCE,
    FocusWorkspaceDown => NONE,
    FocusWorkspacePrevious => NONE,
    FocusWorkspaceUp => NONE,
    FullscreenWindow => ID,
    LoadConfigFile => NONE,
    MaximizeColumn => NONE,
    MaximizeWindowToEdges => ID,
    MoveColumnLeft => NONE,
    MoveColumnLeftOrToMonitorLeft => NONE,
    MoveColumnRight => NONE,
    MoveColumnRightOrToMonitorRight => NONE,
    MoveColumnToFirst => NONE,
    MoveColumnToIndex => INDEX,
    MoveColumnToLast => NONE,
    MoveColumnToMonitor => NONE,
    MoveColumnToMonitorDown => NONE,
    MoveColumnToMonitorLeft => NONE,
    MoveColumnToMonitorNext => NONE,
    MoveColumnToMonitorPrevious => NONE,
    MoveColumnToMonitorRight => NONE,
    MoveColumnToMonitorUp => NONE,
    MoveColumnToWorkspace => REFERENCE,
    MoveColumnToWorkspaceDown => NONE,
    MoveColumnToWorkspaceUp => NONE,
    MoveFloatingWindow => ID,
    MoveWindowDown => NONE,
    MoveWindowDownOrToWorkspaceDown => NONE,
    MoveWindowToFloating => ID,
    MoveWindowToMonitor => ID,
    MoveWindowToMonitorDown => NONE,
    MoveWindowToMonitorLeft => NONE,
    MoveWindowToMonitorNext => NONE,
    MoveWindowToMonitorPrevious => NONE,
    MoveWindowToMonitorRight => NONE,
    MoveWindowToMonitorUp => NONE,
    MoveWindowToTiling => ID,
    MoveWindowToWorkspace => WINDOW_AND_REFERENCE,
    MoveWindowToWorkspaceDown => NONE,
    MoveWindowToWorkspaceUp => NONE,
    MoveWindowUp => NONE,
    MoveWindowUpOrToWorkspaceUp => NONE,
    MoveWorkspaceDown => NONE,
    MoveWorkspaceToIndex => INDEX_AND_REFERENCE,
    MoveWorkspaceToMonitor => REFERENCE,
    MoveWorkspaceToMonitorDown => NONE,
    MoveWorkspaceToMonitorLeft => NONE,
    MoveWorkspaceToMonitorNext => NONE,
    MoveWorkspaceToMonitorPrevious => NONE,
    MoveWorkspaceToMonitorRight => NONE,
    MoveWorkspaceToMonitorUp => NONE,
    MoveWorkspaceUp => NONE,
    OpenOverview => NONE,
    PowerOffMonitors => NONE,
    PowerOnMonitors => NONE,
    Quit => NONE,
    ResetWindowHeight => ID,
    Screenshot => NONE,
    ScreenshotScreen => NONE,
    ScreenshotWindow => ID,
    SetColumnDisplay => NONE,
    SetColumnWidth => NONE,
    SetDynamicCastMonitor => NONE,
    SetDynamicCastWindow => ID,
    SetWindowHeight => ID,
    SetWindowUrgent => ID,
    SetWindowWidth => ID,
    SetWorkspaceName => NONE,
    ShowHotkeyOverlay => NONE,
    Spawn => NONE,
    SpawnSh => NONE,
    SwapWindowLeft => NONE,
    SwapWindowRight => NONE,
    SwitchFocusBetweenFloatingAndTiling => NONE,
    SwitchLayout => NONE,
    SwitchPresetColumnWidth => NONE,
    SwitchPresetColumnWidthBack => NONE,
    SwitchPresetWindowHeight => ID,
    SwitchPresetWindowHeightBack => ID,
    SwitchPresetWindowWidth => ID,
    SwitchPresetWindowWidthBack => ID,
    ToggleColumnTabbedDisplay => NONE,
    ToggleDebugTint => NONE,
    ToggleKeyboardShortcutsInhibit => NONE,
    ToggleOverview => NONE,
    ToggleWindowFloating => ID,
    ToggleWindowRuleOpacity => ID,
    ToggleWindowUrgent => ID,
    ToggleWindowedFullscreen => ID,
    UnsetWindowUrgent => ID,
    UnsetWorkspaceName => REFERENCE,
};

/// Name lookup over the action catalog
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    kinds: HashMap<&'static str, &'static ActionKind>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            kinds: CATALOG.iter().map(|kind| (kind.name, kind)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'static ActionKind> {
        self.kinds.get(name).copied()
    }

    /// Instantiate a named action with a parameter template
    ///
    /// Returns `None` when the name isn't in the catalog.
    pub fn resolve(&self, name: &str, params: Map<String, Value>) -> Option<Action> {
        self.get(name).map(|kind| Action { kind, params })
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// An action ready for binding and sending
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    kind: &'static ActionKind,
    params: Map<String, Value>,
}

impl Action {
    pub fn name(&self) -> &'static str {
        self.kind.name
    }

    pub fn kind(&self) -> &'static ActionKind {
        self.kind
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.params
    }

    /// Serialize as a niri action request line
    ///
    /// The parameters are checked by decoding them into `niri_ipc::Action`,
    /// so a template that niri would reject fails here instead.
    pub fn to_request(&self) -> Result<String, NiriError> {
        let mut wrapped = Map::new();
        wrapped.insert(self.name().to_string(), Value::Object(self.params.clone()));

        let action: niri_ipc::Action =
            serde_json::from_value(Value::Object(wrapped)).map_err(|source| {
                NiriError::InvalidAction {
                    name: self.name().to_string(),
                    source,
                }
            })?;

        serde_json::to_string(&niri_ipc::Request::Action(action))
            .map_err(NiriError::SerializeFailed)
    }
}
