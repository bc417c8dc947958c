use std::fmt::Write;

use super::{
    allowed_element, conditional, defaults, init_component, skip_child, AttributeRules, Component,
    Element, END_CONDITIONAL, START_CONDITIONAL,
};
use crate::boxmodel::{
    background_position, background_position_string, box_widths, is_percentage, parse_width,
    suffix_classes, width_as_pixel,
};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{Node, NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{Validator, COLOR, DIRECTION, PX_PERCENT, PX_PERCENT_MULTI, STRING};

const CHILDREN: &[Element] = &[Element::Column, Element::Group, Element::Raw];

pub(super) const SECTION_ATTRIBUTES: AttributeRules = &[
    ("background-color", COLOR),
    ("background-url", STRING),
    ("background-repeat", Validator::Enum(&["repeat", "no-repeat"])),
    ("background-size", STRING),
    ("background-position", STRING),
    ("background-position-x", STRING),
    ("background-position-y", STRING),
    ("border", STRING),
    ("border-bottom", STRING),
    ("border-left", STRING),
    ("border-radius", STRING),
    ("border-right", STRING),
    ("border-top", STRING),
    ("direction", DIRECTION),
    ("full-width", Validator::Enum(&["full-width", "false"])),
    ("padding", PX_PERCENT_MULTI),
    ("padding-top", PX_PERCENT),
    ("padding-bottom", PX_PERCENT),
    ("padding-left", PX_PERCENT),
    ("padding-right", PX_PERCENT),
    ("text-align", Validator::Enum(&["left", "center", "right"])),
    ("text-padding", PX_PERCENT_MULTI),
    ("css-class", STRING),
];

pub(super) fn section_defaults() -> Vec<(&'static str, String)> {
    defaults(&[
        ("background-repeat", "repeat"),
        ("background-size", "auto"),
        ("background-position", "top center"),
        ("direction", "ltr"),
        ("padding", "20px 0"),
        ("text-align", "center"),
        ("text-padding", "4px 4px 4px 0"),
    ])
}

/// Renders the children of a section body, measured against the section's box width.
pub(super) type ChildRenderer =
    fn(&mut RenderContext, &mut Tree, NodeId, &mut String) -> CompileResult<()>;

pub struct Section;

impl Component for Section {
    fn name(&self) -> &'static str {
        "mj-section"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        SECTION_ATTRIBUTES
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        section_defaults()
    }

    fn render(
        &self,
        ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()> {
        render_section(ctx, tree, id, out, render_columns)
    }
}

/// Shared by sections and wrappers: the Outlook table, optional VML background and the
/// inner table hosting `render_children`.
pub(super) fn render_section(
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    out: &mut String,
    render_children: ChildRenderer,
) -> CompileResult<()> {
    let node = tree[id].clone();
    let full_width = node.attribute("full-width") == Some("full-width");
    let has_background = !node.attribute_or_empty("background-url").is_empty();
    let container = ctx.container_width.clone();
    let box_width = box_widths(&container, &node)?.box_width;

    let mut section = String::new();
    render_before(&node, &container, &mut section)?;
    render_content(
        ctx,
        tree,
        id,
        &node,
        box_width,
        render_children,
        &mut section,
    )?;
    section.push_str(&conditional("</td></tr></table>"));

    let section = if has_background {
        with_vml_background(&node, &container, full_width, &section)
    } else {
        section
    };

    if !full_width {
        out.push_str(&section);
        return Ok(());
    }

    let table_style = background_style(&node)
        .add("width", "100%")
        .add("border-radius", node.attribute_or_empty("border-radius"));
    let table = HtmlAttributes::new()
        .add("align", "center")
        .add("class", node.attribute_or_empty("css-class"))
        .add("background", node.attribute_or_empty("background-url"))
        .add("border", "0")
        .add("cellpadding", "0")
        .add("cellspacing", "0")
        .add("role", "presentation")
        .style(&table_style);
    write!(out, "<table{}><tbody><tr><td>{}</td></tr></tbody></table>", table, section)?;
    Ok(())
}

fn render_before(node: &Node, container: &str, out: &mut String) -> CompileResult<()> {
    let table = HtmlAttributes::new()
        .add("align", "center")
        .add("border", "0")
        .add("cellpadding", "0")
        .add("cellspacing", "0")
        .add("class", suffix_classes(node.attribute_or_empty("css-class"), "outlook"))
        .add("role", "presentation")
        .style(&InlineStyle::new().add("width", container))
        .add("width", parse_width(container)?.value.to_string())
        .add("bgcolor", node.attribute_or_empty("background-color"));
    out.push_str(&conditional(&format!(
        "<table{}><tr><td style=\"line-height:0px;font-size:0px;mso-line-height-rule:exactly;\">",
        table
    )));
    Ok(())
}

fn render_content(
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    node: &Node,
    box_width: i64,
    render_children: ChildRenderer,
    out: &mut String,
) -> CompileResult<()> {
    let full_width = node.attribute("full-width") == Some("full-width");
    let has_background = !node.attribute_or_empty("background-url").is_empty();
    let border_radius = node.attribute_or_empty("border-radius");
    let inline_background = if full_width {
        InlineStyle::new()
    } else {
        background_style(node)
    };

    let div_style = inline_background
        .clone()
        .add("margin", "0px auto")
        .add("border-radius", border_radius)
        .add("max-width", ctx.container_width.clone());
    let div = HtmlAttributes::new()
        .add(
            "class",
            if full_width {
                ""
            } else {
                node.attribute_or_empty("css-class")
            },
        )
        .style(&div_style);
    write!(out, "<div{}>", div)?;
    if has_background {
        out.push_str(r#"<div style="line-height:0;font-size:0;">"#);
    }

    let table_style = inline_background
        .add("width", "100%")
        .add("border-radius", border_radius);
    let table = HtmlAttributes::new()
        .add("align", "center")
        .add(
            "background",
            if full_width {
                ""
            } else {
                node.attribute_or_empty("background-url")
            },
        )
        .add("border", "0")
        .add("cellpadding", "0")
        .add("cellspacing", "0")
        .add("role", "presentation")
        .style(&table_style);
    let td_style = InlineStyle::new()
        .add("border", node.attribute_or_empty("border"))
        .add("border-bottom", node.attribute_or_empty("border-bottom"))
        .add("border-left", node.attribute_or_empty("border-left"))
        .add("border-right", node.attribute_or_empty("border-right"))
        .add("border-top", node.attribute_or_empty("border-top"))
        .add("direction", node.attribute_or_empty("direction"))
        .add("font-size", "0px")
        .add("padding", node.attribute_or_empty("padding"))
        .add("padding-bottom", node.attribute_or_empty("padding-bottom"))
        .add("padding-left", node.attribute_or_empty("padding-left"))
        .add("padding-right", node.attribute_or_empty("padding-right"))
        .add("padding-top", node.attribute_or_empty("padding-top"))
        .add("text-align", node.attribute_or_empty("text-align"));
    write!(
        out,
        "<table{}><tbody><tr><td{}>",
        table,
        HtmlAttributes::new().style(&td_style)
    )?;

    out.push_str(&conditional(
        r#"<table role="presentation" border="0" cellpadding="0" cellspacing="0">"#,
    ));
    ctx.with_container_width(format!("{}px", box_width), |ctx| {
        render_children(ctx, tree, id, out)
    })?;
    out.push_str(&conditional("</table>"));

    out.push_str("</td></tr></tbody></table>");
    if has_background {
        out.push_str("</div>");
    }
    out.push_str("</div>");
    Ok(())
}

/// Columns and groups, each in its own Outlook cell.
fn render_columns(
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    out: &mut String,
) -> CompileResult<()> {
    out.push_str(&conditional("<tr>"));
    for child in tree.child_ids(id) {
        let Some(element) = allowed_element(tree, child, CHILDREN) else {
            skip_child(tree, id, child);
            continue;
        };
        let component = element.component();
        init_component(ctx, component, tree, child)?;
        if element == Element::Raw {
            component.render(ctx, tree, child, out)?;
            continue;
        }

        let node = &tree[child];
        let cell = HtmlAttributes::new()
            .add("class", suffix_classes(node.attribute_or_empty("css-class"), "outlook"))
            .style(
                &InlineStyle::new()
                    .add("vertical-align", node.attribute_or_empty("vertical-align"))
                    .add("width", width_as_pixel(&ctx.container_width, tree, child)?),
            );
        write!(out, "{}<td{}>{}", START_CONDITIONAL, cell, END_CONDITIONAL)?;
        component.render(ctx, tree, child, out)?;
        out.push_str(&conditional("</td>"));
    }
    out.push_str(&conditional("</tr>"));
    Ok(())
}

/// CSS background for the section: a plain color, or the combined shorthand when an image
/// is set.
fn background_style(node: &Node) -> InlineStyle {
    let color = node.attribute_or_empty("background-color");
    let url = node.attribute_or_empty("background-url");
    if url.is_empty() {
        return InlineStyle::new()
            .add("background", color)
            .add("background-color", color);
    }

    let position = background_position_string(node);
    let size = node.attribute_or_empty("background-size");
    let repeat = node.attribute_or_empty("background-repeat");
    let background = [
        color.to_string(),
        format!("url('{}')", url),
        position.clone(),
        format!("/ {}", size),
        repeat.to_string(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    InlineStyle::new()
        .add("background", background)
        .add("background-position", position)
        .add("background-repeat", repeat)
        .add("background-size", size)
}

fn keyword_to_percent(value: &str, horizontal: bool) -> String {
    match (value, horizontal) {
        ("left", true) | ("top", false) => "0%".to_string(),
        ("center", _) => "50%".to_string(),
        ("right", true) | ("bottom", false) => "100%".to_string(),
        _ if is_percentage(value) => value.to_string(),
        (_, true) => "50%".to_string(),
        (_, false) => "0%".to_string(),
    }
}

/// VML origin and position for one axis, as `(origin, position)`.
fn vml_axis(value: &str, horizontal: bool, repeat: bool) -> (String, String) {
    let decimal = value
        .strip_suffix('%')
        .and_then(|number| number.parse::<f64>().ok())
        .map(|percent| percent.trunc() / 100.0);

    match (decimal, repeat) {
        (Some(decimal), true) => (decimal.to_string(), decimal.to_string()),
        (Some(decimal), false) => {
            let shifted = ((-50.0 + decimal * 100.0) / 100.0).to_string();
            (shifted.clone(), shifted)
        }
        (None, true) => {
            let value = if horizontal { "0.5" } else { "0" };
            (value.to_string(), value.to_string())
        }
        (None, false) => {
            let value = if horizontal { "0" } else { "-0.5" };
            (value.to_string(), value.to_string())
        }
    }
}

/// Wrap `content` in an Outlook-only VML rectangle painting the background image.
fn with_vml_background(node: &Node, container: &str, full_width: bool, content: &str) -> String {
    let repeat = node.attribute("background-repeat") == Some("repeat");
    let size = node.attribute_or_empty("background-size");
    let (x, y) = background_position(node);
    let x = keyword_to_percent(&x, true);
    let y = keyword_to_percent(&y, false);

    let (mut origin_x, mut position_x) = vml_axis(&x, true, repeat);
    let (mut origin_y, mut position_y) = vml_axis(&y, false, repeat);

    let mut fill_type = if repeat { "tile" } else { "frame" };
    let mut fill_size = String::new();
    let mut aspect = "";
    match size {
        "cover" | "contain" => {
            fill_size = "1,1".to_string();
            aspect = if size == "cover" { "atleast" } else { "atmost" };
        }
        "auto" | "" => {
            fill_type = "tile";
            origin_x = "0.5".to_string();
            position_x = "0.5".to_string();
            origin_y = "0".to_string();
            position_y = "0".to_string();
        }
        _ => {
            let parts: Vec<&str> = size.split_whitespace().collect();
            if parts.len() == 1 {
                fill_size = size.to_string();
                aspect = "atmost";
            } else {
                fill_size = parts.join(",");
            }
        }
    }

    let rect_style = if full_width {
        InlineStyle::new().add("mso-width-percent", "1000")
    } else {
        InlineStyle::new().add("width", container)
    };
    let rect = HtmlAttributes::new()
        .style(&rect_style)
        .add("xmlns:v", "urn:schemas-microsoft-com:vml")
        .add("fill", "true")
        .add("stroke", "false");
    let fill = HtmlAttributes::new()
        .add("origin", format!("{}, {}", origin_x, origin_y))
        .add("position", format!("{}, {}", position_x, position_y))
        .add("src", node.attribute_or_empty("background-url"))
        .add("color", node.attribute_or_empty("background-color"))
        .add("type", fill_type)
        .add("size", fill_size)
        .add("aspect", aspect);

    format!(
        "{}{}{}",
        conditional(&format!(
            r#"<v:rect{}><v:fill{} /><v:textbox style="mso-fit-shape-to-text:true" inset="0,0,0,0">"#,
            rect, fill
        )),
        content,
        conditional("</v:textbox></v:rect>")
    )
}
