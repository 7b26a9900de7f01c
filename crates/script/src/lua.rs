use std::{fs, path::Path};

use mlua::{Function, IntoLua, Lua, MultiValue, Table, Value};

use crate::{
    call::{ScriptArg, ScriptCall},
    host::{ScriptError, ScriptHost},
};

/// [`ScriptHost`] running Lua 5.4.
///
/// Script objects are global tables, calls are method calls, thus
/// `ScriptCall::new("door", "on_enter", args)` runs `door:on_enter(args...)`.
pub struct LuaHost {
    lua: Lua,
}

impl LuaHost {
    pub fn new() -> Self {
        Self { lua: Lua::new() }
    }

    /// Creates a host and executes a Lua file in it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let host = Self::new();
        host.exec(&source, &path.to_string_lossy())?;
        Ok(host)
    }

    /// Executes a chunk of Lua code, usually defining script objects.
    pub fn exec(&self, source: &str, name: &str) -> Result<(), ScriptError> {
        self.lua.load(source).set_name(name).exec()?;
        Ok(())
    }

    fn method(&self, call: &ScriptCall) -> Result<(Table, Function), ScriptError> {
        let object: Option<Table> = self.lua.globals().get(call.object())?;
        let object = object.ok_or_else(|| ScriptError::MissingObject(call.object().to_owned()))?;
        let function: Option<Function> = object.get(call.function())?;
        let function = function.ok_or_else(|| ScriptError::MissingFunction {
            object: call.object().to_owned(),
            function: call.function().to_owned(),
        })?;
        Ok((object, function))
    }

    fn invoke<'lua>(
        &'lua self,
        call: &ScriptCall,
    ) -> Result<(Function<'lua>, MultiValue<'lua>), ScriptError> {
        let (object, function) = self.method(call)?;
        let mut values = Vec::with_capacity(call.args().len() + 1);
        values.push(Value::Table(object));
        for arg in call.args() {
            values.push(arg.clone().into_lua(&self.lua)?);
        }
        Ok((function, MultiValue::from_vec(values)))
    }
}

impl Default for LuaHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptHost for LuaHost {
    fn call(&mut self, call: &ScriptCall) -> Result<(), ScriptError> {
        let (function, args) = self.invoke(call)?;
        function.call::<_, ()>(args)?;
        Ok(())
    }

    fn call_with_return(&mut self, call: &ScriptCall) -> Result<bool, ScriptError> {
        let (function, args) = self.invoke(call)?;
        Ok(function.call::<_, bool>(args)?)
    }
}

impl<'lua> IntoLua<'lua> for ScriptArg {
    fn into_lua(self, lua: &'lua Lua) -> mlua::Result<Value<'lua>> {
        match self {
            // Entities are passed as their bit representation.
            Self::Entity(entity) => Ok(Value::Integer(entity.to_bits() as i64)),
            Self::Float(value) => Ok(Value::Number(value)),
            Self::Bool(value) => Ok(Value::Boolean(value)),
            Self::Str(value) => value.into_lua(lua),
            Self::Vec2(value) => {
                let table = lua.create_table()?;
                table.set("x", value.x)?;
                table.set("y", value.y)?;
                Ok(Value::Table(table))
            }
            Self::Table(fields) => {
                let table = lua.create_table()?;
                for (key, value) in fields {
                    table.set(key, value)?;
                }
                Ok(Value::Table(table))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::Entity;
    use glam::Vec2;

    use super::*;

    const SCRIPT: &str = r#"
        guard = { seen = {} }

        function guard:on_filter(target)
            return target % 2 == 1
        end

        function guard:on_enter(target, distance)
            table.insert(self.seen, target)
            self.last_distance = distance
        end

        function guard:describe(shape)
            self.shape = shape.type .. ":" .. shape.position.x
        end
    "#;

    fn host() -> LuaHost {
        let host = LuaHost::new();
        host.exec(SCRIPT, "guard").unwrap();
        host
    }

    #[test]
    fn test_calls() {
        let mut host = host();
        let odd = Entity::from_raw(5);
        let even = Entity::from_raw(6);

        assert!(host
            .call_with_return(&ScriptCall::new("guard", "on_filter", vec![odd.into()]))
            .unwrap());
        assert!(!host
            .call_with_return(&ScriptCall::new("guard", "on_filter", vec![even.into()]))
            .unwrap());

        host.call(&ScriptCall::new(
            "guard",
            "on_enter",
            vec![odd.into(), 2.5f32.into()],
        ))
        .unwrap();
        let guard: Table = host.lua.globals().get("guard").unwrap();
        let seen: Vec<i64> = guard.get("seen").unwrap();
        assert_eq!(seen, vec![5]);
        let distance: f64 = guard.get("last_distance").unwrap();
        assert_eq!(distance, 2.5);
    }

    #[test]
    fn test_table_args() {
        let mut host = host();
        let shape = ScriptArg::Table(vec![
            ("type".to_owned(), "circle".into()),
            ("position".to_owned(), Vec2::new(3., 4.).into()),
        ]);
        host.call(&ScriptCall::new("guard", "describe", vec![shape]))
            .unwrap();
        let guard: Table = host.lua.globals().get("guard").unwrap();
        let shape: String = guard.get("shape").unwrap();
        assert_eq!(shape, "circle:3.0");
    }

    #[test]
    fn test_missing() {
        let mut host = host();
        assert!(matches!(
            host.call(&ScriptCall::new("nobody", "on_enter", vec![])),
            Err(ScriptError::MissingObject(_))
        ));
        assert!(matches!(
            host.call_with_return(&ScriptCall::new("guard", "on_exit", vec![])),
            Err(ScriptError::MissingFunction { .. })
        ));
        assert!(matches!(
            host.exec("this is not lua", "broken"),
            Err(ScriptError::Lua(_))
        ));
    }
}
