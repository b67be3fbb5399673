use crate::ir_map::{Color, PropertyValue};

/// Runtime function that builds a color from four 0..=255 channels.
pub const MAKE_COLOR: &str = "make_color";

/// Renders a property value as a TaffyScript expression.
///
/// Colors become a `make_color(r, g, b, a)` call. Every other kind is printed
/// as-is: strings and file paths without added quotes, so a string property
/// can carry a script expression.
pub fn serialize(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Color(color) => color_call(*color),
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::Int(v) => v.to_string(),
        PropertyValue::Float(v) => v.to_string(),
        PropertyValue::Object(id) => id.to_string(),
        PropertyValue::String(s) | PropertyValue::File(s) => s.clone(),
        PropertyValue::Other(json) => match json {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

fn color_call(c: Color) -> String {
    format!("{MAKE_COLOR}({}, {}, {}, {})", c.red, c.green, c.blue, c.alpha)
}
