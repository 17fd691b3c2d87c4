//! Filling action templates with runtime identifiers
//!
//! A parameter is only filled when the template leaves it unset: absent,
//! `null`, zero or an empty string. Values written in the config always win.
//! An `id` falls back to the window id when the trigger has no id of its own.
//! A workspace reference is handled as a unit; if the template sets any of
//! `Id`, `Index` or `Name`, it is kept as is. Otherwise the first available
//! of the id, the index and the name is used.

use serde_json::{json, Map, Value};

use super::actions::{Action, DynamicField};
use super::keys::{PossibleKeys, ReferenceKeys};

/// Bind the action's dynamic parameters from `keys`
pub fn bind(mut action: Action, keys: &PossibleKeys) -> Action {
    let fields = action.kind().fields;
    let params = action.params_mut();

    for &field in fields {
        match field {
            DynamicField::Reference => bind_reference(params, &keys.reference),
            direct => {
                let value = direct_value(direct, keys);
                if value != 0 && is_unset(params.get(direct.key())) {
                    params.insert(direct.key().to_string(), Value::from(value));
                }
            }
        }
    }

    action
}

fn direct_value(field: DynamicField, keys: &PossibleKeys) -> u64 {
    match field {
        DynamicField::Id if keys.id == 0 => keys.window_id,
        DynamicField::Id => keys.id,
        DynamicField::WindowId => keys.window_id,
        DynamicField::ActiveWindowId => keys.active_window_id,
        DynamicField::WorkspaceId => keys.workspace_id,
        DynamicField::Index => keys.index,
        DynamicField::Reference => 0,
    }
}

fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn reference_is_unset(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Object(reference)) => reference.values().all(|v| is_unset(Some(v))),
        other => is_unset(other),
    }
}

fn bind_reference(params: &mut Map<String, Value>, keys: &ReferenceKeys) {
    if !reference_is_unset(params.get("reference")) {
        return;
    }

    let reference = if keys.id != 0 {
        json!({ "Id": keys.id })
    } else if keys.index != 0 {
        json!({ "Index": keys.index })
    } else if !keys.name.is_empty() {
        json!({ "Name": keys.name })
    } else {
        return;
    };

    params.insert("reference".to_string(), reference);
}
