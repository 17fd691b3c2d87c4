//! Identifiers a notification or entity can lend to action parameters

use crate::niri_ipc::{Notification, Window, Workspace};

/// Runtime values available for filling in action templates
///
/// A zero (or empty name) means "not available" and is never bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PossibleKeys {
    pub id: u64,
    pub window_id: u64,
    pub active_window_id: u64,
    pub workspace_id: u64,
    pub index: u64,
    pub reference: ReferenceKeys,
}

/// Candidates for a workspace reference, in precedence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceKeys {
    pub id: u64,
    pub index: u8,
    pub name: String,
}

impl PossibleKeys {
    /// Keys for a window: its id, both as `id` and `window_id`
    pub fn for_window(id: u64) -> Self {
        Self {
            id,
            window_id: id,
            ..Self::default()
        }
    }
}

impl From<&Window> for PossibleKeys {
    fn from(window: &Window) -> Self {
        Self::for_window(window.id)
    }
}

impl From<&Workspace> for PossibleKeys {
    fn from(workspace: &Workspace) -> Self {
        Self {
            id: workspace.id,
            active_window_id: workspace.active_window_id.unwrap_or_default(),
            reference: ReferenceKeys {
                id: workspace.id,
                index: workspace.idx,
                name: workspace.name.clone(),
            },
            ..Self::default()
        }
    }
}

impl Notification {
    /// Keys this notification can contribute to its event actions
    pub fn possible_keys(&self) -> PossibleKeys {
        match self {
            Self::WindowFocusChanged(event) => {
                event.id.map(PossibleKeys::for_window).unwrap_or_default()
            }
            Self::WindowFocusTimestampChanged(event) => PossibleKeys::for_window(event.id),
            Self::WindowUrgencyChanged(event) => PossibleKeys::for_window(event.id),
            Self::WindowClosed(event) => PossibleKeys::for_window(event.id),
            Self::WindowOpenedOrChanged(event) => PossibleKeys::from(&event.window),
            Self::WorkspaceActivated(event) => workspace_keys(event.id),
            Self::WorkspaceUrgencyChanged(event) => workspace_keys(event.id),
            Self::WorkspaceActiveWindowChanged(event) => {
                let window_id = event.active_window_id.unwrap_or_default();
                PossibleKeys {
                    id: window_id,
                    window_id,
                    active_window_id: window_id,
                    ..workspace_keys(event.workspace_id)
                }
            }
            Self::KeyboardLayoutSwitched(event) => PossibleKeys {
                index: u64::from(event.idx),
                ..PossibleKeys::default()
            },
            _ => PossibleKeys::default(),
        }
    }
}

fn workspace_keys(id: u64) -> PossibleKeys {
    PossibleKeys {
        workspace_id: id,
        reference: ReferenceKeys {
            id,
            ..ReferenceKeys::default()
        },
        ..PossibleKeys::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::niri_ipc::fixtures::niri_workspace;
    use crate::niri_ipc::{
        KeyboardLayoutSwitched, OverviewOpenedOrClosed, WindowFocusChanged, WindowUrgencyChanged,
        WorkspaceActivated, WorkspaceActiveWindowChanged,
    };

    #[test]
    fn test_window_notification_keys() {
        let keys = Notification::WindowUrgencyChanged(WindowUrgencyChanged { id: 8, urgent: true })
            .possible_keys();
        assert_eq!(keys, PossibleKeys::for_window(8));
        assert_eq!(keys.window_id, 8);
    }

    #[test]
    fn test_focus_lost_has_no_keys() {
        let keys = Notification::WindowFocusChanged(WindowFocusChanged { id: None }).possible_keys();
        assert_eq!(keys, PossibleKeys::default());
    }

    #[test]
    fn test_workspace_activated_keys() {
        let keys = Notification::WorkspaceActivated(WorkspaceActivated { id: 3, focused: true })
            .possible_keys();
        assert_eq!(keys.workspace_id, 3);
        assert_eq!(keys.reference.id, 3);
        assert_eq!(keys.id, 0);
    }

    #[test]
    fn test_active_window_changed_keys() {
        let keys = Notification::WorkspaceActiveWindowChanged(WorkspaceActiveWindowChanged {
            workspace_id: 2,
            active_window_id: Some(11),
        })
        .possible_keys();
        assert_eq!(keys.workspace_id, 2);
        assert_eq!(keys.reference.id, 2);
        assert_eq!(keys.id, 11);
        assert_eq!(keys.window_id, 11);
        assert_eq!(keys.active_window_id, 11);
    }

    #[test]
    fn test_layout_switch_keys() {
        let keys = Notification::KeyboardLayoutSwitched(KeyboardLayoutSwitched { idx: 1 }).possible_keys();
        assert_eq!(keys.index, 1);
    }

    #[test]
    fn test_notification_without_identifiers() {
        let keys = Notification::OverviewOpenedOrClosed(OverviewOpenedOrClosed { is_open: true })
            .possible_keys();
        assert_eq!(keys, PossibleKeys::default());
    }

    #[test]
    fn test_workspace_entity_keys() {
        let mut workspace: Workspace = niri_workspace(6, 2, Some("chat")).into();
        workspace.active_window_id = Some(30);

        let keys = PossibleKeys::from(&workspace);
        assert_eq!(keys.id, 6);
        assert_eq!(keys.active_window_id, 30);
        assert_eq!(
            keys.reference,
            ReferenceKeys {
                id: 6,
                index: 2,
                name: "chat".to_string()
            }
        );
    }
}
