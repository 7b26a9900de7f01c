use std::fmt;

use bevy::prelude::Entity;
use glam::Vec2;

/// A value passed to a script callback.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptArg {
    Entity(Entity),
    Float(f64),
    Bool(bool),
    Str(String),
    Vec2(Vec2),
    /// A table with named fields, for example a shape description.
    Table(Vec<(String, ScriptArg)>),
}

impl From<Entity> for ScriptArg {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

impl From<f32> for ScriptArg {
    fn from(value: f32) -> Self {
        Self::Float(value.into())
    }
}

impl From<f64> for ScriptArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ScriptArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ScriptArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<Vec2> for ScriptArg {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

/// Invocation of function `function` of script object `object` (the script
/// of an entity, see [`se_core::entity::EntityScript`]).
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptCall {
    object: String,
    function: String,
    args: Vec<ScriptArg>,
}

impl ScriptCall {
    pub fn new<O, F>(object: O, function: F, args: Vec<ScriptArg>) -> Self
    where
        O: Into<String>,
        F: Into<String>,
    {
        Self {
            object: object.into(),
            function: function.into(),
            args,
        }
    }

    pub fn object(&self) -> &str {
        self.object.as_str()
    }

    pub fn function(&self) -> &str {
        self.function.as_str()
    }

    pub fn args(&self) -> &[ScriptArg] {
        self.args.as_slice()
    }
}

impl fmt::Display for ScriptCall {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.object, self.function)
    }
}

/// The way simulation code invokes script callbacks.
pub trait ScriptCalls {
    /// Evaluates a scripted predicate. Any failure (missing function, script
    /// error, no answer in time) is a rejection.
    fn filter(&self, call: ScriptCall) -> bool;

    /// Delivers all queued calls and then `call` before returning.
    fn call_now(&mut self, call: ScriptCall);

    /// Schedules a call for delivery at the end of the current tick.
    fn queue(&mut self, call: ScriptCall);
}
