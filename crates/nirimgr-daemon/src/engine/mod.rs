//! Rule and event-action engine
//!
//! The [`Dispatcher`] consumes decoded notifications. Window and workspace
//! updates go through the [`EntityCache`] and the rule matcher; every other
//! notification runs the action block configured for its name. Actions are
//! looked up in the [`ActionRegistry`], guarded by a [`ConditionEvaluator`],
//! bound with identifiers from the trigger and handed to an `ActionSink`.

pub mod actions;
pub mod binder;
pub mod cache;
pub mod condition;
pub mod dispatcher;
pub mod entity;
pub mod keys;
pub mod matcher;

pub use actions::{Action, ActionKind, ActionRegistry, DynamicField};
pub use cache::{EntityCache, EntityStore};
pub use condition::{ConditionError, ConditionEvaluator};
pub use dispatcher::Dispatcher;
pub use entity::Entity;
pub use keys::{PossibleKeys, ReferenceKeys};
