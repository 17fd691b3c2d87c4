//! Configuration data model

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Name of the scratchpad workspace when the config doesn't set one
pub const DEFAULT_SCRATCHPAD_WORKSPACE: &str = "scratchpad";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub log_level: LogLevel,
    /// Window and workspace rules, evaluated in declaration order
    pub rules: Vec<Rule>,
    /// Action blocks run whenever the named notification arrives
    pub events: HashMap<String, ActionSet>,
    /// Name of the niri workspace used as the scratchpad
    pub scratchpad_workspace: String,
    /// Extra actions run on the window brought back by `scratch show`
    pub show_scratchpad_actions: ActionSet,
    /// Windows and commands for `scratch spawn-or-focus`
    pub spawn_or_focus: SpawnOrFocus,
    /// Menu program `scratch show` uses to pick one of several parked
    /// windows; empty means the last one is shown
    pub launcher: String,
    /// Arguments for `launcher`, split on whitespace
    pub launcher_options: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            rules: Vec::new(),
            events: HashMap::new(),
            scratchpad_workspace: DEFAULT_SCRATCHPAD_WORKSPACE.to_string(),
            show_scratchpad_actions: ActionSet::default(),
            spawn_or_focus: SpawnOrFocus::default(),
            launcher: String::new(),
            launcher_options: String::new(),
        }
    }
}

impl Config {
    /// Action block configured for a notification name, if any
    pub fn event_actions(&self, name: &str) -> Option<&ActionSet> {
        self.events.get(name).filter(|set| !set.is_empty())
    }

    /// Rules and match entries that can never fire
    ///
    /// These are not errors; callers log them once logging is set up.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        rule_warnings(&mut warnings, "rule", &self.rules);
        rule_warnings(&mut warnings, "spawnOrFocus rule", &self.spawn_or_focus.rules);
        warnings
    }
}

fn rule_warnings(warnings: &mut Vec<String>, label: &str, rules: &[Rule]) {
    for (index, rule) in rules.iter().enumerate() {
        if rule.matches.is_empty() {
            warnings.push(format!("{} {}: no match entries, it will never match", label, index));
            continue;
        }
        for (entry, m) in rule.matches.iter().enumerate() {
            if !m.targets(rule.rule_type) {
                warnings.push(format!(
                    "{} {}, match entry {}: sets no {} field, it will never match",
                    label, index, entry, rule.rule_type
                ));
            }
        }
    }
}

/// Configuration of `scratch spawn-or-focus`
///
/// A running window is looked up with `rules` (and must have the requested
/// app id in its own); if none is found, the command under that app id is
/// spawned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpawnOrFocus {
    pub rules: Vec<Rule>,
    /// App id to command line
    pub commands: HashMap<String, Vec<String>>,
}

impl SpawnOrFocus {
    pub fn command(&self, app_id: &str) -> Option<&[String]> {
        self.commands.get(app_id).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive usable as a default `EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

/// Kind of entity a rule targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum RuleType {
    #[default]
    #[serde(rename = "window", alias = "")]
    Window,
    #[serde(rename = "workspace")]
    Workspace,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window => f.write_str("window"),
            Self::Workspace => f.write_str("workspace"),
        }
    }
}

/// A match/exclude/actions record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rule {
    #[serde(rename = "type", default)]
    pub rule_type: RuleType,
    /// Any entry matching is sufficient. An empty list never matches.
    #[serde(rename = "match", default)]
    pub matches: Vec<Match>,
    /// Any entry matching vetoes the rule
    #[serde(rename = "exclude", default)]
    pub excludes: Vec<Match>,
    #[serde(default)]
    pub actions: ActionSet,
}

/// A single match predicate
///
/// Every field that is set must match (regex search, not a full match).
/// `title`/`app_id` apply to windows, `name`/`output` to workspaces.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(default, deserialize_with = "optional_pattern")]
    pub title: Option<Pattern>,
    #[serde(default, deserialize_with = "optional_pattern")]
    pub app_id: Option<Pattern>,
    #[serde(default, deserialize_with = "optional_pattern")]
    pub name: Option<Pattern>,
    #[serde(default, deserialize_with = "optional_pattern")]
    pub output: Option<Pattern>,
}

impl Match {
    /// Whether this entry sets any field that applies to the given rule type
    pub fn targets(&self, rule_type: RuleType) -> bool {
        match rule_type {
            RuleType::Window => self.title.is_some() || self.app_id.is_some(),
            RuleType::Workspace => self.name.is_some() || self.output.is_some(),
        }
    }

    pub fn matches_window(&self, title: &str, app_id: &str) -> bool {
        self.targets(RuleType::Window)
            && field_matches(&self.title, title)
            && field_matches(&self.app_id, app_id)
    }

    pub fn matches_workspace(&self, name: &str, output: &str) -> bool {
        self.targets(RuleType::Workspace)
            && field_matches(&self.name, name)
            && field_matches(&self.output, output)
    }
}

fn field_matches(pattern: &Option<Pattern>, value: &str) -> bool {
    pattern.as_ref().map_or(true, |p| p.is_match(value))
}

/// A regular expression compiled when the config is loaded
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({:?})", self.0.as_str())
    }
}

/// Empty strings mean "unset", same as an absent field.
fn optional_pattern<'de, D>(deserializer: D) -> Result<Option<Pattern>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(source) if source.is_empty() => Ok(None),
        Some(source) => Pattern::new(&source)
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid regex {:?}: {}", source, e))),
    }
}

/// One configured action: its compositor name, parameter template and guard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionConfig {
    pub name: String,
    /// Partially filled parameters; runtime identifiers are bound at dispatch
    pub params: Map<String, Value>,
    /// Guard expression, empty when the action is unconditional
    pub when: String,
}

/// Ordered action block, in the order the config file declares it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionSet(Vec<ActionConfig>);

impl ActionSet {
    pub fn new(actions: Vec<ActionConfig>) -> Self {
        Self(actions)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActionConfig> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a ActionConfig;
    type IntoIter = std::slice::Iter<'a, ActionConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for ActionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ActionSetVisitor;

        impl<'de> Visitor<'de> for ActionSetVisitor {
            type Value = ActionSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of action names to action parameters")
            }

            fn visit_map<A>(self, mut map: A) -> Result<ActionSet, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut actions = Vec::new();
                while let Some((name, body)) = map.next_entry::<String, ActionBody>()? {
                    actions.push(ActionConfig {
                        name,
                        params: body.params,
                        when: body.when,
                    });
                }
                Ok(ActionSet(actions))
            }

            fn visit_unit<E>(self) -> Result<ActionSet, E>
            where
                E: de::Error,
            {
                Ok(ActionSet::default())
            }
        }

        deserializer.deserialize_any(ActionSetVisitor)
    }
}

/// Value side of an action entry
///
/// Either `{"params": {...}, "when": "..."}` or a bare parameter object.
#[derive(Deserialize)]
#[serde(try_from = "Option<Map<String, Value>>")]
struct ActionBody {
    params: Map<String, Value>,
    when: String,
}

impl TryFrom<Option<Map<String, Value>>> for ActionBody {
    type Error = String;

    fn try_from(raw: Option<Map<String, Value>>) -> Result<Self, Self::Error> {
        let mut raw = raw.unwrap_or_default();
        let structured =
            !raw.is_empty() && raw.keys().all(|key| key == "params" || key == "when");
        if !structured {
            return Ok(Self {
                params: raw,
                when: String::new(),
            });
        }

        let params = match raw.remove("params") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(params)) => params,
            Some(other) => return Err(format!("action params must be an object, got {}", other)),
        };
        let when = match raw.remove("when") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(when)) => when.trim().to_string(),
            Some(other) => return Err(format!("action condition must be a string, got {}", other)),
        };

        Ok(Self { params, when })
    }
}
