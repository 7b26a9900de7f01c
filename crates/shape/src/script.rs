//! Read-only shape descriptions handed to scripts.
//!
//! A shape becomes a table with a `type` field (`circle`, `box`, `cone` or
//! `ray`), the world `position` and kind specific fields.

use se_script::ScriptArg;

use crate::shape::Shape;

impl From<&Shape> for ScriptArg {
    fn from(shape: &Shape) -> Self {
        let mut fields = vec![field("position", shape.position().into())];

        let kind = match shape {
            Shape::Circle(circle) => {
                fields.push(field("min_radius", circle.min_radius().into()));
                fields.push(field("max_radius", circle.max_radius().into()));
                "circle"
            }
            Shape::Box(shape) => {
                fields.push(field("width", shape.width().into()));
                fields.push(field("height", shape.height().into()));
                fields.push(field("use_intersects", shape.use_intersects().into()));
                "box"
            }
            Shape::Cone(cone) => {
                fields.push(field("min_radius", cone.circle().min_radius().into()));
                fields.push(field("max_radius", cone.circle().max_radius().into()));
                fields.push(field("start_angle", cone.start_angle().into()));
                fields.push(field("end_angle", cone.end_angle().into()));
                "cone"
            }
            Shape::Ray(ray) => {
                fields.push(field("end", ray.end().into()));
                fields.push(field("hit", ray.hit().into()));
                if let Some(target) = ray.target() {
                    fields.push(field("target", target.into()));
                }
                "ray"
            }
        };

        fields.insert(0, field("type", kind.into()));
        ScriptArg::Table(fields)
    }
}

fn field(name: &str, value: ScriptArg) -> (String, ScriptArg) {
    (name.to_owned(), value)
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use se_script::{LuaHost, ScriptCall, ScriptHost};

    use super::*;
    use crate::{CircleShape, RayShape};

    #[test]
    fn test_table() {
        let shape: Shape = CircleShape::new(0.5, 2.).into();
        let arg = ScriptArg::from(&shape);
        let ScriptArg::Table(fields) = arg else {
            panic!("Shape must convert to a table.");
        };
        assert_eq!(fields[0], field("type", "circle".into()));
        assert_eq!(fields[1], field("position", Vec2::ZERO.into()));
        assert_eq!(fields[3], field("max_radius", 2f32.into()));
    }

    #[test]
    fn test_lua() {
        let mut host = LuaHost::new();
        host.exec(
            r#"
            inspector = {}
            function inspector:is_long_ray(shape)
                return shape.type == "ray" and shape.hit.y > 5
            end
            "#,
            "inspector",
        )
        .unwrap();

        let short: Shape = RayShape::new(Vec2::new(0., 2.)).into();
        let long: Shape = RayShape::new(Vec2::new(0., 8.)).into();
        let circle: Shape = CircleShape::new(0., 8.).into();

        for (shape, expected) in [(short, false), (long, true), (circle, false)] {
            let call = ScriptCall::new("inspector", "is_long_ray", vec![(&shape).into()]);
            assert_eq!(host.call_with_return(&call).unwrap(), expected);
        }
    }
}
