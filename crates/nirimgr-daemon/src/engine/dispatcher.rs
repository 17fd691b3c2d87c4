//! The notification loop
//!
//! Notifications are handled strictly one at a time, in arrival order, and
//! the actions of one notification are sent sequentially before the next
//! notification is looked at. Failures never stop the loop: an action that
//! can't be resolved, whose guard errors, or that niri rejects is logged and
//! skipped.

use std::collections::HashSet;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use nirimgr_config::{ActionConfig, ActionSet, Config};
use serde::Serialize;
use tracing::{debug, error, info, trace};

use super::actions::ActionRegistry;
use super::binder;
use super::cache::EntityCache;
use super::condition::ConditionEvaluator;
use super::entity::Entity;
use super::keys::PossibleKeys;
use super::matcher;
use crate::niri_ipc::{ActionSink, Notification, Window, Workspace};

/// Applies rules and event actions to incoming notifications
pub struct Dispatcher<T> {
    config: Arc<Config>,
    actions: ActionRegistry,
    conditions: ConditionEvaluator,
    cache: EntityCache,
    transport: T,
}

impl<T: ActionSink> Dispatcher<T> {
    pub fn new(config: Arc<Config>, actions: ActionRegistry, transport: T) -> Self {
        Self {
            config,
            actions,
            conditions: ConditionEvaluator::new(),
            cache: EntityCache::new(),
            transport,
        }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Handle notifications until the stream ends
    pub async fn run<S>(&mut self, mut notifications: S)
    where
        S: Stream<Item = Notification> + Unpin,
    {
        info!(
            rules = self.config.rules.len(),
            events = self.config.events.len(),
            "Dispatcher started"
        );

        while let Some(notification) = notifications.next().await {
            self.handle(notification).await;
        }

        info!(
            windows = self.cache.windows.len(),
            workspaces = self.cache.workspaces.len(),
            "Notification stream ended, dispatcher stopping"
        );
    }

    /// Handle a single notification
    pub async fn handle(&mut self, notification: Notification) {
        trace!(name = notification.name(), "Handling notification");

        match notification {
            Notification::WindowsChanged(event) => {
                debug!(
                    windows = event.windows.len(),
                    cached = self.cache.windows.len(),
                    "Window snapshot"
                );
                for window in event.windows {
                    self.observe_window(window).await;
                }
            }
            Notification::WindowOpenedOrChanged(event) => {
                self.observe_window(event.window).await;
            }
            Notification::WindowClosed(event) => {
                if self.cache.windows.remove(event.id).is_some() {
                    debug!(id = event.id, "Window closed, removed from cache");
                }
            }
            Notification::WorkspacesChanged(event) => {
                let present: HashSet<u64> = event.workspaces.iter().map(|w| w.id).collect();
                for id in self.cache.workspaces.retain_ids(&present) {
                    debug!(id, "Workspace gone, removed from cache");
                }
                for workspace in event.workspaces {
                    self.observe_workspace(workspace).await;
                }
                debug!(cached = self.cache.workspaces.len(), "Workspace snapshot applied");
            }
            other => self.run_event_actions(&other).await,
        }
    }

    async fn observe_window(&mut self, mut window: Window) {
        if !self.cache.windows.contains(window.id) {
            debug!(id = window.id, app_id = %window.app_id, "New window");
        }
        let previously_matched = self.cache.windows.was_matched(window.id);
        self.apply_rules(&mut window, previously_matched).await;
        self.cache.windows.insert(window);
    }

    async fn observe_workspace(&mut self, mut workspace: Workspace) {
        if !self.cache.workspaces.contains(workspace.id) {
            debug!(id = workspace.id, name = %workspace.name, "New workspace");
        }
        let previously_matched = self.cache.workspaces.was_matched(workspace.id);
        self.apply_rules(&mut workspace, previously_matched).await;
        self.cache.workspaces.insert(workspace);
    }

    async fn apply_rules<E: Entity>(&self, entity: &mut E, previously_matched: bool) {
        let Some(rule) = matcher::match_transition(&self.config.rules, entity, previously_matched)
        else {
            return;
        };

        debug!(
            kind = %E::KIND,
            id = entity.id(),
            actions = rule.actions.len(),
            "Rule matched"
        );
        let keys = entity.possible_keys();
        self.dispatch_all(&rule.actions, &*entity, &keys).await;
    }

    async fn run_event_actions(&self, notification: &Notification) {
        let Some(actions) = self.config.event_actions(notification.name()) else {
            return;
        };

        debug!(
            name = notification.name(),
            actions = actions.len(),
            "Running event actions"
        );
        let keys = notification.possible_keys();
        self.dispatch_all(actions, notification, &keys).await;
    }

    async fn dispatch_all<C>(&self, actions: &ActionSet, context: &C, keys: &PossibleKeys)
    where
        C: Serialize + Sync + ?Sized,
    {
        for action in actions {
            self.dispatch(action, context, keys).await;
        }
    }

    async fn dispatch<C>(&self, configured: &ActionConfig, context: &C, keys: &PossibleKeys)
    where
        C: Serialize + Sync + ?Sized,
    {
        let name = configured.name.as_str();
        let Some(action) = self.actions.resolve(name, configured.params.clone()) else {
            error!(action = name, "Unknown action in configuration, skipping");
            return;
        };

        match self.conditions.evaluate(&configured.when, context) {
            Ok(true) => {}
            Ok(false) => {
                debug!(action = name, condition = %configured.when, "Condition not met, skipping action");
                return;
            }
            Err(e) => {
                error!(action = name, error = %e, "Could not evaluate condition, skipping action");
                return;
            }
        }

        let action = binder::bind(action, keys);
        let request = match action.to_request() {
            Ok(request) => request,
            Err(e) => {
                error!(action = name, error = %e, "Invalid action, skipping");
                return;
            }
        };

        debug!(action = name, %request, "Sending action");
        if let Err(e) = self.transport.send_action(&request).await {
            error!(action = name, error = %e, "Failed to perform action");
        }
    }
}
