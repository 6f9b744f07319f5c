//! Seams between a take and the world it animates.
//!
//! The core never walks a scene graph. Hosts implement [`PropertyResolver`]
//! over their own root (scene, ECS world, editor model) and pass it into
//! `Take::apply_tracks`; nothing resolved is cached across calls.

use keytake_api_core::{Locator, Value};

use crate::track::Track;

/// Resolves locators against a live scene.
pub trait PropertyResolver {
    /// Whatever events are delivered to (a node, a component, ...).
    type Target;

    /// Resolve an event target. `None` skips the event.
    fn resolve(&mut self, locator: &Locator) -> Option<Self::Target>;

    /// Current value of the property, used for weighted blending.
    fn get(&mut self, locator: &Locator) -> Option<Value>;

    /// Write a value. Returns `false` when the locator does not resolve.
    fn set(&mut self, locator: &Locator, value: Value) -> bool;
}

/// Delivers event keyframes.
pub trait Dispatcher<T> {
    /// Invoke `method` on `target` with `arg`.
    fn call_method(&mut self, target: &T, method: &str, arg: &serde_json::Value);

    /// Trigger a named event on `target`.
    fn trigger_event(&mut self, target: &T, event: &str, param: &serde_json::Value);
}

/// A dispatcher that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDispatch;

impl<T> Dispatcher<T> for NoDispatch {
    fn call_method(&mut self, _target: &T, _method: &str, _arg: &serde_json::Value) {}
    fn trigger_event(&mut self, _target: &T, _event: &str, _param: &serde_json::Value) {}
}

/// Per-track interception points during `apply_tracks`.
pub trait ApplyHooks {
    /// Return `false` to skip `track` this tick.
    fn pre_apply(&mut self, _index: usize, _track: &Track) -> bool {
        true
    }

    /// Inspect or rewrite the value about to be written; `false` skips the write.
    fn apply_sample(&mut self, _index: usize, _track: &Track, _value: &mut Value) -> bool {
        true
    }
}

impl ApplyHooks for () {}
