//! Notifications from the niri event stream
//!
//! Each line niri writes to an event stream is a JSON object with a single
//! key, the notification name, wrapping the payload. Names are looked up in
//! an [`EventRegistry`] built once at startup; names it doesn't know are
//! skipped so that newer compositors don't break the daemon.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::error::NiriError;
use super::types::{KeyboardLayouts, Window, Workspace};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspacesChanged {
    pub workspaces: Vec<Workspace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceUrgencyChanged {
    pub id: u64,
    pub urgent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceActivated {
    pub id: u64,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceActiveWindowChanged {
    pub workspace_id: u64,
    pub active_window_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowsChanged {
    pub windows: Vec<Window>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowOpenedOrChanged {
    pub window: Window,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowClosed {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFocusChanged {
    /// `None` when no window has focus
    pub id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFocusTimestampChanged {
    pub id: u64,
    #[serde(default)]
    pub focus_timestamp: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowUrgencyChanged {
    pub id: u64,
    pub urgent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowLayoutsChanged {
    /// Pairs of window id and its new layout, kept as raw JSON
    pub changes: Vec<(u64, Value)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardLayoutsChanged {
    pub keyboard_layouts: KeyboardLayouts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardLayoutSwitched {
    pub idx: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewOpenedOrClosed {
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigLoaded {
    #[serde(default)]
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotCaptured {
    #[serde(default)]
    pub path: Option<String>,
}

type Decoder = fn(Value) -> serde_json::Result<Notification>;

fn decode<T>(raw: Value) -> serde_json::Result<Notification>
where
    T: DeserializeOwned + Into<Notification>,
{
    serde_json::from_value::<T>(raw).map(Into::into)
}

macro_rules! notifications {
    ($($name:ident),* $(,)?) => {
        /// A decoded notification
        ///
        /// Serializes as its bare payload, which is what action guards see
        /// as `model`.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum Notification {
            $($name($name),)*
        }

        impl Notification {
            /// Name of the notification as it appears on the wire
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$name(_) => stringify!($name),)*
                }
            }
        }

        $(
            impl From<$name> for Notification {
                fn from(payload: $name) -> Self {
                    Self::$name(payload)
                }
            }
        )*

        impl EventRegistry {
            /// Build the registry of every notification the daemon understands
            pub fn new() -> Self {
                let mut decoders: HashMap<&'static str, Decoder> = HashMap::new();
                $(decoders.insert(stringify!($name), decode::<$name> as Decoder);)*
                Self { decoders }
            }
        }
    };
}

notifications! {
    WorkspacesChanged,
    WorkspaceUrgencyChanged,
    WorkspaceActivated,
    WorkspaceActiveWindowChanged,
    WindowsChanged,
    WindowOpenedOrChanged,
    WindowClosed,
    WindowFocusChanged,
    WindowFocusTimestampChanged,
    WindowUrgencyChanged,
    WindowLayoutsChanged,
    KeyboardLayoutsChanged,
    KeyboardLayoutSwitched,
    OverviewOpenedOrClosed,
    ConfigLoaded,
    ScreenshotCaptured,
}

/// Lookup table from notification name to decoder
pub struct EventRegistry {
    decoders: HashMap<&'static str, Decoder>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode a payload for a known name
    ///
    /// Returns `Ok(None)` for names the registry doesn't know.
    pub fn decode(&self, name: &str, payload: Value) -> Result<Option<Notification>, NiriError> {
        let Some(decoder) = self.decoders.get(name) else {
            return Ok(None);
        };
        decoder(payload)
            .map(Some)
            .map_err(|source| NiriError::DecodeFailed {
                name: name.to_string(),
                source,
            })
    }

    /// Decode one line of the event stream
    ///
    /// The first key the registry knows decides the notification. Lines
    /// without any known key yield `Ok(None)`.
    pub fn decode_line(&self, line: &str) -> Result<Option<Notification>, NiriError> {
        let object: Map<String, Value> =
            serde_json::from_str(line).map_err(NiriError::DeserializeFailed)?;

        for (name, payload) in object {
            if self.contains(&name) {
                return self.decode(&name, payload);
            }
            debug!(name = %name, "Skipping unknown notification");
        }

        Ok(None)
    }
}
