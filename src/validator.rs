use regex::Regex;
use std::sync::OnceLock;

/// Primitive value types accepted by [`Validator::Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Boolean,
}

/// Attribute value check. Empty values always pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Enum(&'static [&'static str]),
    Color,
    Unit {
        units: &'static [&'static str],
        multiple: bool,
    },
    Type(ValueType),
}

pub const STRING: Validator = Validator::Type(ValueType::String);
pub const BOOLEAN: Validator = Validator::Type(ValueType::Boolean);
pub const NUMBER: Validator = Validator::Type(ValueType::Number);
pub const COLOR: Validator = Validator::Color;

pub const PX: Validator = Validator::Unit {
    units: &["px"],
    multiple: false,
};
pub const PX_AUTO: Validator = Validator::Unit {
    units: &["px", "auto"],
    multiple: false,
};
pub const PX_PERCENT: Validator = Validator::Unit {
    units: &["px", "%"],
    multiple: false,
};
pub const PX_PERCENT_AUTO: Validator = Validator::Unit {
    units: &["px", "%", "auto"],
    multiple: false,
};
pub const PX_PERCENT_MULTI: Validator = Validator::Unit {
    units: &["px", "%"],
    multiple: true,
};
/// Line heights may also be unitless.
pub const LINE_HEIGHT: Validator = Validator::Unit {
    units: &["px", "%", ""],
    multiple: false,
};

pub const ALIGN: Validator = Validator::Enum(&["left", "center", "right"]);
pub const TEXT_ALIGN: Validator = Validator::Enum(&["left", "right", "center", "justify"]);
pub const VERTICAL_ALIGN: Validator = Validator::Enum(&["top", "bottom", "middle"]);
pub const DIRECTION: Validator = Validator::Enum(&["ltr", "rtl"]);

const CSS_COLOR_NAMES: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan", "darkblue", "darkcyan",
    "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki", "darkmagenta",
    "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon", "darkseagreen",
    "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise", "darkviolet", "deeppink",
    "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick", "floralwhite", "forestgreen",
    "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod", "gray", "green", "greenyellow",
    "grey", "honeydew", "hotpink", "indianred", "indigo", "ivory", "khaki", "lavender",
    "lavenderblush", "lawngreen", "lemonchiffon", "lightblue", "lightcoral", "lightcyan",
    "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey", "lightpink", "lightsalmon",
    "lightseagreen", "lightskyblue", "lightslategray", "lightslategrey", "lightsteelblue",
    "lightyellow", "lime", "limegreen", "linen", "magenta", "maroon", "mediumaquamarine",
    "mediumblue", "mediumorchid", "mediumpurple", "mediumseagreen", "mediumslateblue",
    "mediumspringgreen", "mediumturquoise", "mediumvioletred", "midnightblue", "mintcream",
    "mistyrose", "moccasin", "navajowhite", "navy", "oldlace", "olive", "olivedrab", "orange",
    "orangered", "orchid", "palegoldenrod", "palegreen", "paleturquoise", "palevioletred",
    "papayawhip", "peachpuff", "peru", "pink", "plum", "powderblue", "purple", "rebeccapurple",
    "red", "rosybrown", "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen",
    "seashell", "sienna", "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow",
    "springgreen", "steelblue", "tan", "teal", "thistle", "tomato", "turquoise", "violet",
    "wheat", "white", "whitesmoke", "yellow", "yellowgreen", "transparent",
];

/// Matches a CSS length into its numeric part and its unit.
pub(crate) fn value_and_unit_regex() -> &'static Regex {
    static VALUE_AND_UNIT_REGEX: OnceLock<Regex> = OnceLock::new();
    VALUE_AND_UNIT_REGEX.get_or_init(|| Regex::new(r"^([\d.,]*)(\D*)$").unwrap())
}

impl Validator {
    /// Check `value`, returning the failure reason.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Ok(());
        }
        match self {
            Validator::Enum(allowed) => validate_enum(value, allowed),
            Validator::Color => validate_color(value),
            Validator::Unit { units, multiple } => validate_unit(value, units, *multiple),
            Validator::Type(expected) => validate_type(value, *expected),
        }
    }
}

pub fn validate_enum(value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!("'{}' is not one of [{}]", value, allowed.join(", ")))
    }
}

/// Accepts `rgb()`, `rgba()`, 3/6 digit hex and CSS named colors.
pub fn validate_color(color: &str) -> Result<(), String> {
    static RGBA_REGEX: OnceLock<Regex> = OnceLock::new();
    static RGB_REGEX: OnceLock<Regex> = OnceLock::new();
    static HEX_REGEX: OnceLock<Regex> = OnceLock::new();

    let rgba = RGBA_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^rgba\(\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d(\.\d+)?\s*\)$")
            .unwrap()
    });
    let rgb = RGB_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^rgb\(\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*\)$").unwrap()
    });
    let hex = HEX_REGEX.get_or_init(|| Regex::new(r"^#([0-9a-fA-F]{3}){1,2}$").unwrap());

    if rgba.is_match(color) || rgb.is_match(color) || hex.is_match(color) {
        return Ok(());
    }
    if CSS_COLOR_NAMES.contains(&color.to_lowercase().as_str()) {
        return Ok(());
    }
    Err(format!("'{}' is not a valid color", color))
}

pub fn validate_unit(value: &str, units: &[&str], multiple: bool) -> Result<(), String> {
    let parts: Vec<&str> = if multiple {
        value.split_whitespace().collect()
    } else {
        if value.trim().contains(' ') {
            return Err(format!("'{}' must be a single value", value));
        }
        vec![value.trim()]
    };

    for part in parts {
        if part == "0" {
            continue;
        }
        let caps = value_and_unit_regex()
            .captures(part)
            .ok_or_else(|| format!("unable to parse a CSS unit from '{}'", part))?;
        let unit = caps.get(2).map_or("", |m| m.as_str());
        if !units.contains(&unit) {
            return Err(format!(
                "unit '{}' in '{}' is not one of [{}]",
                unit,
                part,
                units.join(", ")
            ));
        }
    }
    Ok(())
}

pub fn validate_type(value: &str, expected: ValueType) -> Result<(), String> {
    match expected {
        ValueType::String => Ok(()),
        ValueType::Number => value
            .parse::<f64>()
            .map(|_| ())
            .map_err(|_| format!("'{}' is not a valid number", value)),
        ValueType::Boolean => match value {
            "true" | "false" => Ok(()),
            _ => Err(format!("'{}' is not a boolean", value)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_always_passes() {
        assert!(Validator::Color.validate("").is_ok());
        assert!(Validator::Enum(&["left"]).validate("").is_ok());
        assert!(PX_PERCENT.validate("").is_ok());
        assert!(Validator::Type(ValueType::Boolean).validate("").is_ok());
    }

    #[test]
    fn test_validate_color() {
        for color in ["#fff", "#A1b2C3", "rgb(0, 10, 255)", "RGBA(1,2,3,0.5)", "Red", "transparent"] {
            assert!(validate_color(color).is_ok(), "{} should be valid", color);
        }
        for color in ["#ffff", "rgb(1,2)", "notacolor", "#ggg"] {
            assert!(validate_color(color).is_err(), "{} should be invalid", color);
        }
    }

    #[test]
    fn test_validate_unit_single() {
        assert!(PX_PERCENT.validate("10px").is_ok());
        assert!(PX_PERCENT.validate("50%").is_ok());
        assert!(PX_PERCENT.validate("0").is_ok());
        assert!(PX_PERCENT.validate("10em").is_err());
        assert!(PX_PERCENT.validate("10px 20px").is_err());
    }

    #[test]
    fn test_validate_unit_multiple() {
        assert!(PX_PERCENT_MULTI.validate("10px 0 5% 2px").is_ok());
        assert!(PX_PERCENT_MULTI.validate("10px 2em").is_err());
    }

    #[test]
    fn test_keyword_and_unitless_units() {
        assert!(PX_PERCENT_AUTO.validate("auto").is_ok());
        assert!(PX_AUTO.validate("auto").is_ok());
        assert!(PX_AUTO.validate("50%").is_err());
        assert!(LINE_HEIGHT.validate("1.5").is_ok());
        assert!(LINE_HEIGHT.validate("22px").is_ok());
        assert!(LINE_HEIGHT.validate("normal").is_err());
    }

    #[test]
    fn test_validate_enum_and_type() {
        let align = Validator::Enum(&["left", "center", "right"]);
        assert!(align.validate("center").is_ok());
        let err = align.validate("middle").unwrap_err();
        assert!(err.contains("middle"));

        assert!(Validator::Type(ValueType::Number).validate("1.5").is_ok());
        assert!(Validator::Type(ValueType::Number).validate("abc").is_err());
        assert!(Validator::Type(ValueType::Boolean).validate("true").is_ok());
        assert!(Validator::Type(ValueType::Boolean).validate("yes").is_err());
        assert!(Validator::Type(ValueType::String).validate("anything").is_ok());
    }
}
