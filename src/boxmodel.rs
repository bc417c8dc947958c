//! Width, padding and border arithmetic shared by the layout elements.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::context::RenderContext;
use crate::error::{CompileError, CompileResult};
use crate::node::{Node, NodeId, Tree};
use crate::validator::value_and_unit_regex;

/// Attribute name and value a group puts on its columns so they stack by percentage on mobile.
pub const MOBILE_WIDTH_MARKER: &str = "mobileWidth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Right => "right",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
        }
    }
}

/// A length split into its truncated magnitude and unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWidth {
    pub value: i64,
    pub unit: String,
}

impl ParsedWidth {
    pub fn is_percent(&self) -> bool {
        self.unit == "%"
    }
}

impl fmt::Display for ParsedWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// Split `width` into magnitude and unit. The magnitude is truncated toward zero and a
/// missing unit means `px`.
pub fn parse_width(width: &str) -> CompileResult<ParsedWidth> {
    let width = width.trim();
    let caps = value_and_unit_regex()
        .captures(width)
        .ok_or_else(|| CompileError::invalid_width(width, "expected a number followed by a unit"))?;

    let number = caps.get(1).map_or("", |m| m.as_str());
    let unit = caps.get(2).map_or("", |m| m.as_str());

    let value = if number.is_empty() {
        0.0
    } else {
        number
            .parse::<f64>()
            .map_err(|_| CompileError::invalid_width(width, format!("'{}' is not a number", number)))?
    };

    Ok(ParsedWidth {
        value: value.trunc() as i64,
        unit: if unit.is_empty() { "px" } else { unit }.to_string(),
    })
}

/// Resolve one side of a CSS shorthand such as `padding`.
///
/// `{attribute}-{direction}` wins when set; otherwise the shorthand is expanded with the
/// usual 1/2/3/4 value rules. Returns 0 when neither attribute is set.
pub fn shorthand(node: &Node, attribute: &str, direction: Direction) -> CompileResult<i64> {
    let specific = node.attribute_or_empty(&format!("{}-{}", attribute, direction.as_str()));
    if !specific.trim().is_empty() {
        return Ok(parse_width(specific)?.value);
    }

    let value = node.attribute_or_empty(attribute);
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.is_empty() {
        return Ok(0);
    }

    use Direction::*;
    let index = match (parts.len(), direction) {
        (1, _) => 0,
        (2, Top | Bottom) => 0,
        (2, Left | Right) => 1,
        (3, Top) => 0,
        (3, Left | Right) => 1,
        (3, Bottom) => 2,
        (_, Top) => 0,
        (_, Right) => 1,
        (_, Bottom) => 2,
        (_, Left) => 3,
    };
    Ok(parse_width(parts[index])?.value)
}

fn border_regex() -> &'static Regex {
    static BORDER_REGEX: OnceLock<Regex> = OnceLock::new();
    BORDER_REGEX.get_or_init(|| Regex::new(r"(?:^|\s)(\d+)").unwrap())
}

/// First integer token of a border shorthand, e.g. `1px solid black` gives 1.
pub fn parse_border(border: &str) -> i64 {
    border_regex()
        .captures(border)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Border width on one side; `{attribute}-{direction}` takes precedence over `attribute`.
pub fn border_width(node: &Node, attribute: &str, direction: Direction) -> i64 {
    let specific = node.attribute_or_empty(&format!("{}-{}", attribute, direction.as_str()));
    if !specific.is_empty() {
        return parse_border(specific);
    }
    let generic = node.attribute_or_empty(attribute);
    if !generic.is_empty() {
        return parse_border(generic);
    }
    0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxWidths {
    pub total: i64,
    pub borders: i64,
    pub paddings: i64,
    pub box_width: i64,
}

pub fn box_widths(container_width: &str, node: &Node) -> CompileResult<BoxWidths> {
    let total = parse_width(container_width)?.value;
    let paddings = shorthand(node, "padding", Direction::Left)?
        + shorthand(node, "padding", Direction::Right)?;
    let borders = border_width(node, "border", Direction::Left)
        + border_width(node, "border", Direction::Right);

    Ok(BoxWidths {
        total,
        borders,
        paddings,
        box_width: total - paddings - borders,
    })
}

/// Explicit `width` capped by the box width.
pub fn content_width(container_width: &str, node: &Node) -> CompileResult<i64> {
    let box_width = box_widths(container_width, node)?.box_width;
    match node.attribute("width").filter(|width| !width.is_empty()) {
        Some(width) => Ok(parse_width(width)?.value.min(box_width)),
        None => Ok(box_width),
    }
}

/// Declared width of a layout node, or an even percentage split among its non-raw siblings.
///
/// The implicit split is always a whole percentage, whatever the container's unit.
pub fn column_width(tree: &Tree, id: NodeId) -> CompileResult<ParsedWidth> {
    match tree[id].attribute("width").filter(|width| !width.is_empty()) {
        Some(width) => parse_width(width),
        None => Ok(ParsedWidth {
            value: 100 / tree.non_raw_siblings(id) as i64,
            unit: "%".to_string(),
        }),
    }
}

/// Class name for the node's resolved width; the matching rule is registered once.
pub fn column_class(ctx: &mut RenderContext, tree: &Tree, id: NodeId) -> CompileResult<String> {
    let width = column_width(tree, id)?;
    let formatted = width.value.to_string().replace('.', "-");
    let class = if width.is_percent() {
        format!("mj-column-per-{}", formatted)
    } else {
        format!("mj-column-px-{}", formatted)
    };

    ctx.register_class(
        &class,
        vec![
            format!("width: {}{} !important", formatted, width.unit),
            format!("max-width: {}{}", formatted, width.unit),
        ],
    );
    Ok(class)
}

/// Two decimals, without a trailing `.00`.
pub fn format_decimal(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    match formatted.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

/// Resolved width of a layout node in pixels, against the given container.
pub fn width_as_pixel(container_width: &str, tree: &Tree, id: NodeId) -> CompileResult<String> {
    let width = column_width(tree, id)?;
    if width.is_percent() {
        let container = parse_width(container_width)?.value as f64;
        return Ok(format!(
            "{}px",
            format_decimal(container * width.value as f64 / 100.0)
        ));
    }
    Ok(format!("{}px", width.value))
}

/// Width used when stacking on mobile. Only nodes carrying [`MOBILE_WIDTH_MARKER`] get
/// anything other than `100%`.
pub fn mobile_width(container_width: &str, tree: &Tree, id: NodeId) -> CompileResult<String> {
    let node = &tree[id];
    if node.attribute(MOBILE_WIDTH_MARKER) != Some(MOBILE_WIDTH_MARKER) {
        return Ok("100%".to_string());
    }

    let Some(width) = node.attribute("width").filter(|width| !width.is_empty()) else {
        return Ok(format!("{}%", 100 / tree.non_raw_siblings(id)));
    };

    let parsed = parse_width(width)?;
    if parsed.is_percent() {
        return Ok(width.to_string());
    }

    let container = parse_width(container_width)?.value;
    if container == 0 {
        return Err(CompileError::invalid_width(
            container_width,
            "container width must not be zero",
        ));
    }
    Ok(format!(
        "{:.2}%",
        parsed.value as f64 / container as f64 * 100.0
    ))
}

fn percentage_regex() -> &'static Regex {
    static PERCENTAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    PERCENTAGE_REGEX.get_or_init(|| Regex::new(r"^\d+(\.\d+)?%$").unwrap())
}

pub fn is_percentage(value: &str) -> bool {
    percentage_regex().is_match(value)
}

/// Split a `background-position` value into `(x, y)`.
pub fn parse_background_position(position: &str) -> (String, String) {
    let parts: Vec<&str> = position.split_whitespace().collect();
    match parts.as_slice() {
        [] => ("center".to_string(), "center".to_string()),
        [single] => {
            if matches!(*single, "top" | "bottom") {
                ("center".to_string(), single.to_string())
            } else {
                (single.to_string(), "center".to_string())
            }
        }
        [first, second] => {
            let swap = matches!(*first, "top" | "bottom")
                || (*first == "center" && matches!(*second, "left" | "right"));
            if swap {
                (second.to_string(), first.to_string())
            } else {
                (first.to_string(), second.to_string())
            }
        }
        _ => ("center".to_string(), "top".to_string()),
    }
}

/// Background position of a node, honoring the per-axis overrides.
pub fn background_position(node: &Node) -> (String, String) {
    let (mut x, mut y) = parse_background_position(node.attribute_or_empty("background-position"));
    if let Some(value) = node.attribute("background-position-x").filter(|v| !v.is_empty()) {
        x = value.to_string();
    }
    if let Some(value) = node.attribute("background-position-y").filter(|v| !v.is_empty()) {
        y = value.to_string();
    }
    (x, y)
}

pub fn background_position_string(node: &Node) -> String {
    let (x, y) = background_position(node);
    format!("{} {}", x, y)
}

/// Append `-{suffix}` to every class in a space separated list.
pub fn suffix_classes(classes: &str, suffix: &str) -> String {
    classes
        .split_whitespace()
        .map(|class| format!("{}-{}", class, suffix))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::RAW_TAG;
    use crate::options::CompileOptions;
    use pretty_assertions::assert_eq;

    fn node(attributes: &[(&str, &str)]) -> Node {
        Node::new("mj-section").with_attributes(attributes)
    }

    fn columns(count: usize, attributes: &[(&str, &str)]) -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new();
        let section = tree.create(Node::new("mj-section"));
        tree.set_root(section);
        let ids = (0..count)
            .map(|_| {
                let id = tree.create(Node::new("mj-column").with_attributes(attributes));
                tree.append_child(section, id);
                id
            })
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_parse_width_truncates() {
        assert_eq!(
            parse_width("10.9px").unwrap(),
            ParsedWidth {
                value: 10,
                unit: "px".into()
            }
        );
        assert_eq!(parse_width("100").unwrap().to_string(), "100px");
        assert_eq!(parse_width("33.33%").unwrap().to_string(), "33%");
    }

    #[test]
    fn test_parse_width_rejects_garbage() {
        assert!(matches!(
            parse_width("10px 20px"),
            Err(CompileError::InvalidWidth { .. })
        ));
        assert!(parse_width("1.2.3px").is_err());
    }

    #[test]
    fn test_shorthand_expansion() {
        let one = node(&[("padding", "10px")]);
        assert_eq!(shorthand(&one, "padding", Direction::Top).unwrap(), 10);
        assert_eq!(shorthand(&one, "padding", Direction::Left).unwrap(), 10);

        let two = node(&[("padding", "20px 5px")]);
        assert_eq!(shorthand(&two, "padding", Direction::Bottom).unwrap(), 20);
        assert_eq!(shorthand(&two, "padding", Direction::Right).unwrap(), 5);

        let three = node(&[("padding", "1px 2px 3px")]);
        assert_eq!(shorthand(&three, "padding", Direction::Left).unwrap(), 2);
        assert_eq!(shorthand(&three, "padding", Direction::Bottom).unwrap(), 3);

        let four = node(&[("padding", "1px 2px 3px 4px")]);
        assert_eq!(shorthand(&four, "padding", Direction::Right).unwrap(), 2);
        assert_eq!(shorthand(&four, "padding", Direction::Left).unwrap(), 4);

        assert_eq!(shorthand(&node(&[]), "padding", Direction::Top).unwrap(), 0);
    }

    #[test]
    fn test_direction_specific_wins() {
        let n = node(&[("padding", "10px"), ("padding-left", "5px")]);
        assert_eq!(shorthand(&n, "padding", Direction::Left).unwrap(), 5);
        assert_eq!(shorthand(&n, "padding", Direction::Right).unwrap(), 10);
    }

    #[test]
    fn test_border_width() {
        assert_eq!(parse_border("1px solid black"), 1);
        assert_eq!(parse_border("solid 3px red"), 3);
        assert_eq!(parse_border("none"), 0);

        let n = node(&[("border", "2px solid red"), ("border-left", "4px dashed blue")]);
        assert_eq!(border_width(&n, "border", Direction::Left), 4);
        assert_eq!(border_width(&n, "border", Direction::Right), 2);
        assert_eq!(border_width(&node(&[]), "border", Direction::Top), 0);
    }

    #[test]
    fn test_box_and_content_width() {
        let n = node(&[("padding", "0 25px"), ("border", "1px solid"), ("width", "700px")]);
        assert_eq!(
            box_widths("600px", &n).unwrap(),
            BoxWidths {
                total: 600,
                borders: 2,
                paddings: 50,
                box_width: 548,
            }
        );
        assert_eq!(content_width("600px", &n).unwrap(), 548);

        let narrow = node(&[("width", "100px")]);
        assert_eq!(content_width("600px", &narrow).unwrap(), 100);
    }

    #[test]
    fn test_column_class_splits_siblings() {
        let (tree, ids) = columns(2, &[]);
        let mut ctx = RenderContext::new(&CompileOptions::default());

        let first = column_class(&mut ctx, &tree, ids[0]).unwrap();
        let second = column_class(&mut ctx, &tree, ids[1]).unwrap();

        assert_eq!(first, "mj-column-per-50");
        assert_eq!(second, first);
        assert_eq!(ctx.column_styles.len(), 1);
        assert_eq!(
            ctx.column_styles["mj-column-per-50"],
            vec![
                "width: 50% !important".to_string(),
                "max-width: 50%".to_string()
            ]
        );
    }

    #[test]
    fn test_column_class_three_way_split_truncates() {
        let (mut tree, ids) = columns(3, &[]);
        let section = tree.root().unwrap();
        let raw = tree.create(Node::new(RAW_TAG));
        tree.append_child(section, raw);
        let mut ctx = RenderContext::new(&CompileOptions::default());

        assert_eq!(column_class(&mut ctx, &tree, ids[2]).unwrap(), "mj-column-per-33");
        assert_eq!(
            ctx.column_styles["mj-column-per-33"],
            vec![
                "width: 33% !important".to_string(),
                "max-width: 33%".to_string()
            ]
        );
    }

    #[test]
    fn test_column_class_pixel_width() {
        let (tree, ids) = columns(1, &[("width", "150px")]);
        let mut ctx = RenderContext::new(&CompileOptions::default());
        assert_eq!(
            column_class(&mut ctx, &tree, ids[0]).unwrap(),
            "mj-column-px-150"
        );
        assert_eq!(
            ctx.column_styles["mj-column-px-150"],
            vec![
                "width: 150px !important".to_string(),
                "max-width: 150px".to_string()
            ]
        );
    }

    #[test]
    fn test_width_as_pixel() {
        let (tree, ids) = columns(3, &[]);
        assert_eq!(width_as_pixel("600px", &tree, ids[0]).unwrap(), "198px");

        let (tree, ids) = columns(2, &[("width", "25%")]);
        assert_eq!(width_as_pixel("550px", &tree, ids[0]).unwrap(), "137.50px");
    }

    #[test]
    fn test_mobile_width_requires_marker() {
        let (tree, ids) = columns(2, &[("width", "150px")]);
        assert_eq!(mobile_width("600px", &tree, ids[0]).unwrap(), "100%");

        let (tree, ids) = columns(2, &[("width", "150px"), (MOBILE_WIDTH_MARKER, MOBILE_WIDTH_MARKER)]);
        assert_eq!(mobile_width("600px", &tree, ids[0]).unwrap(), "25.00%");

        let (tree, ids) = columns(4, &[(MOBILE_WIDTH_MARKER, MOBILE_WIDTH_MARKER)]);
        assert_eq!(mobile_width("600px", &tree, ids[0]).unwrap(), "25%");

        let (tree, ids) = columns(1, &[("width", "40%"), (MOBILE_WIDTH_MARKER, MOBILE_WIDTH_MARKER)]);
        assert_eq!(mobile_width("600px", &tree, ids[0]).unwrap(), "40%");
    }

    #[test]
    fn test_background_position() {
        assert_eq!(parse_background_position(""), ("center".into(), "center".into()));
        assert_eq!(parse_background_position("top"), ("center".into(), "top".into()));
        assert_eq!(parse_background_position("left"), ("left".into(), "center".into()));
        assert_eq!(parse_background_position("top left"), ("left".into(), "top".into()));
        assert_eq!(parse_background_position("center right"), ("right".into(), "center".into()));
        assert_eq!(parse_background_position("10% 20%"), ("10%".into(), "20%".into()));
        assert_eq!(parse_background_position("1 2 3"), ("center".into(), "top".into()));

        let n = node(&[("background-position", "top center"), ("background-position-x", "30%")]);
        assert_eq!(background_position_string(&n), "30% top");
    }

    #[test]
    fn test_suffix_classes() {
        assert_eq!(suffix_classes("a b", "outlook"), "a-outlook b-outlook");
        assert_eq!(suffix_classes("", "outlook"), "");
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(300.0), "300");
        assert_eq!(format_decimal(137.5), "137.50");
        assert!(is_percentage("12.5%"));
        assert!(!is_percentage("left"));
    }
}
