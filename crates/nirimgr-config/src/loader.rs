//! JSON configuration loader

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::*;

/// Config file name looked up in the default locations
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Convert a 1-indexed line and column into a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut current_line = 1;
    let mut line_start = 0;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            break;
        }
        if ch == '\n' {
            current_line += 1;
            line_start = i + ch.len_utf8();
        }
    }

    (line_start + column.saturating_sub(1)).min(source.len())
}

/// Default locations, in lookup order
///
/// A `config/config.json` relative to the working directory wins over the
/// per-user `~/.config/nirimgr/config.json`.
pub fn default_config_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("config").join(CONFIG_FILE_NAME),
        PathBuf::from(shellexpand::tilde("~/.config/nirimgr").into_owned()).join(CONFIG_FILE_NAME),
    ]
}

/// Resolve the config path from an explicit argument or the default locations
pub fn find_config(explicit: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(shellexpand::tilde(path).into_owned().into());
    }

    let searched = default_config_paths();
    match searched.iter().find(|path| path.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(ConfigError::NotFound { searched }),
    }
}

/// Load a configuration file from the given path
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_str(&content)
}

/// Load configuration from a string
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content).map_err(|e| {
        let offset = line_col_to_offset(content, e.line(), e.column());
        ConfigError::ParseError {
            src: content.to_string(),
            span: miette::SourceSpan::from((offset, 0)),
            source: e,
        }
    })?;

    if config.scratchpad_workspace.trim().is_empty() {
        return Err(ConfigError::Invalid {
            message: "scratchpadWorkspace must not be empty".to_string(),
        });
    }

    if let Some((app_id, _)) = config
        .spawn_or_focus
        .commands
        .iter()
        .find(|(_, command)| command.is_empty())
    {
        return Err(ConfigError::Invalid {
            message: format!("spawnOrFocus command for {} is empty", app_id),
        });
    }

    tracing::debug!(
        rules = config.rules.len(),
        events = config.events.len(),
        "Parsed configuration"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_basic_config() {
        let config = load_config_str(
            r#"{
                "logLevel": "debug",
                "rules": [
                    {
                        "match": [{"appId": "^firefox$"}],
                        "exclude": [{"title": "Private"}],
                        "actions": {"FocusWindow": {}}
                    },
                    {
                        "type": "workspace",
                        "match": [{"name": "^chat$"}],
                        "actions": {"FocusWorkspace": {"when": "model.is_urgent"}}
                    }
                ],
                "events": {
                    "WindowUrgencyChanged": {"FocusWindow": {}}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].excludes.len(), 1);
        assert_eq!(config.rules[1].rule_type, RuleType::Workspace);
        assert_eq!(
            config.rules[1].actions.iter().next().unwrap().when,
            "model.is_urgent"
        );
        assert!(config.event_actions("WindowUrgencyChanged").is_some());
    }

    #[test]
    fn test_syntax_error_points_at_location() {
        let source = "{\n  \"rules\": [\n    {\"match\": }\n  ]\n}";
        let err = load_config_str(source).unwrap_err();
        match err {
            ConfigError::ParseError { span, .. } => {
                let offset = span.offset();
                assert!(offset > source.find("match").unwrap());
                assert!(offset <= source.len());
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_scratchpad_name_is_invalid() {
        let err = load_config_str(r#"{"scratchpadWorkspace": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_empty_spawn_command_is_invalid() {
        let err = load_config_str(r#"{"spawnOrFocus": {"commands": {"kitty": []}}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref message } if message.contains("kitty")));
    }

    #[test]
    fn test_rule_without_match_still_loads() {
        let config = load_config_str(r#"{"rules": [{"actions": {"FocusWindow": {}}}]}"#).unwrap();
        assert!(config.rules[0].matches.is_empty());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"scratchpadWorkspace": "scratch"}}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.scratchpad_workspace, "scratch");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/nirimgr/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_explicit_path_has_tilde_expanded() {
        let path = find_config(Some("~/nirimgr-test.json")).unwrap();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("nirimgr-test.json"));
    }

    #[test]
    fn test_absolute_explicit_path_unchanged() {
        let path = find_config(Some("/etc/nirimgr/config.json")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/nirimgr/config.json"));
    }

    #[test]
    fn test_default_paths_order() {
        let paths = default_config_paths();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], PathBuf::from("config/config.json"));
        assert!(paths[1].ends_with(".config/nirimgr/config.json"));
    }

    #[test]
    fn test_line_col_to_offset() {
        let source = "ab\ncd\nef";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 2), 4);
        assert_eq!(line_col_to_offset(source, 3, 1), 6);
        assert_eq!(line_col_to_offset(source, 9, 9), source.len());
    }
}
