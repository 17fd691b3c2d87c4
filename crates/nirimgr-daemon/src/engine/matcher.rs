//! Rule matching with transition detection
//!
//! A rule matches an entity when the rule targets the entity's kind, at least
//! one of its match entries applies and none of its exclude entries does.
//! Rules are tried in declaration order and the first one that matches wins.
//!
//! Actions only fire on the edge: the entity must have been unmatched after
//! the previous evaluation and be matched now. An entity that keeps matching
//! across updates fires once.

use nirimgr_config::Rule;

use super::entity::Entity;

/// Whether a single rule matches the entity
pub fn rule_matches<E: Entity>(rule: &Rule, entity: &E) -> bool {
    rule.rule_type == E::KIND
        && rule.matches.iter().any(|entry| entity.matches(entry))
        && !rule.excludes.iter().any(|entry| entity.matches(entry))
}

/// First rule in `rules` that matches the entity
pub fn first_match<'r, E: Entity>(rules: &'r [Rule], entity: &E) -> Option<&'r Rule> {
    rules.iter().find(|rule| rule_matches(rule, entity))
}

/// Evaluate `rules` against a fresh entity state
///
/// Records the outcome on the entity and returns the rule whose actions
/// should run, which is only the case when `previously_matched` was `false`
/// and a rule matches now.
pub fn match_transition<'r, E: Entity>(
    rules: &'r [Rule],
    entity: &mut E,
    previously_matched: bool,
) -> Option<&'r Rule> {
    let rule = first_match(rules, entity);
    entity.set_matched(rule.is_some());

    if previously_matched {
        return None;
    }
    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::niri_ipc::fixtures::{niri_window, niri_workspace};
    use crate::niri_ipc::{Window, Workspace};
    use nirimgr_config::{load_config_str, Config};

    fn config(json: &str) -> Config {
        load_config_str(json).unwrap()
    }

    fn window(app_id: &str, title: &str) -> Window {
        niri_window(1, Some(app_id), Some(title)).into()
    }

    #[test]
    fn test_match_any_entry() {
        let config = config(
            r#"{"rules": [{"match": [{"appId": "^firefox$"}, {"appId": "^chromium$"}]}]}"#,
        );

        assert!(rule_matches(&config.rules[0], &window("chromium", "")));
        assert!(!rule_matches(&config.rules[0], &window("kitty", "")));
    }

    #[test]
    fn test_exclude_vetoes_match() {
        let config = config(
            r#"{"rules": [{"match": [{"appId": "^firefox$"}], "exclude": [{"title": "Private"}]}]}"#,
        );

        assert!(rule_matches(&config.rules[0], &window("firefox", "GitHub")));
        assert!(!rule_matches(&config.rules[0], &window("firefox", "Private Browsing")));
    }

    #[test]
    fn test_empty_match_list_never_matches() {
        let config = config(r#"{"rules": [{"exclude": [{"title": "x"}]}]}"#);
        assert!(!rule_matches(&config.rules[0], &window("anything", "at all")));
    }

    #[test]
    fn test_rule_type_must_agree() {
        let config = config(
            r#"{"rules": [{"type": "workspace", "match": [{"name": "firefox"}]}, {"match": [{"title": "dev"}]}]}"#,
        );
        let workspace: Workspace = niri_workspace(1, 1, Some("dev")).into();

        assert!(!rule_matches(&config.rules[0], &window("firefox", "firefox")));
        assert!(!rule_matches(&config.rules[1], &workspace));
    }

    #[test]
    fn test_workspace_rule_matches_name_and_output() {
        let config = config(
            r#"{"rules": [{"type": "workspace", "match": [{"name": "^chat$", "output": "eDP"}]}]}"#,
        );
        let workspace: Workspace = niri_workspace(1, 1, Some("chat")).into();

        assert!(rule_matches(&config.rules[0], &workspace));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let config = config(
            r#"{"rules": [
                {"match": [{"appId": "kitty"}], "actions": {"CloseWindow": {}}},
                {"match": [{"appId": "kit"}], "actions": {"FocusWindow": {}}}
            ]}"#,
        );

        let rule = first_match(&config.rules, &window("kitty", "")).unwrap();
        assert_eq!(rule.actions.iter().next().unwrap().name, "CloseWindow");
    }

    #[test]
    fn test_fires_only_on_rising_edge() {
        let config = config(r#"{"rules": [{"match": [{"title": "^match$"}]}]}"#);
        let titles = ["other", "match", "match", "other", "match"];

        let mut previously_matched = false;
        let mut fired = 0;
        for title in titles {
            let mut entity = window("app", title);
            if match_transition(&config.rules, &mut entity, previously_matched).is_some() {
                fired += 1;
            }
            previously_matched = entity.matched;
        }

        assert_eq!(fired, 2);
    }

    #[test]
    fn test_transition_records_outcome() {
        let config = config(r#"{"rules": [{"match": [{"appId": "mpv"}]}]}"#);

        let mut matching = window("mpv", "");
        let mut other = window("kitty", "");
        assert!(match_transition(&config.rules, &mut matching, true).is_none());
        match_transition(&config.rules, &mut other, true);

        assert!(matching.matched);
        assert!(!other.matched);
    }
}
