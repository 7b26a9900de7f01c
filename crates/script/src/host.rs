use thiserror::Error;

use crate::call::ScriptCall;

/// Owner of the script state executing calls. It is created on, and never
/// leaves, the script service thread.
pub trait ScriptHost {
    fn call(&mut self, call: &ScriptCall) -> Result<(), ScriptError>;

    fn call_with_return(&mut self, call: &ScriptCall) -> Result<bool, ScriptError>;
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("script object {0:?} does not exist")]
    MissingObject(String),
    #[error("script object {object:?} has no function {function:?}")]
    MissingFunction { object: String, function: String },
    #[error(transparent)]
    Lua(#[from] mlua::Error),
    #[error("failed to read a script")]
    Io(#[from] std::io::Error),
    #[error("script service failed to start: {0}")]
    Startup(String),
}
