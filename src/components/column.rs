use std::fmt::Write;

use super::{
    allowed_element, defaults, invalid_child, render_content_row, AttributeRules, Component,
    Element,
};
use crate::boxmodel::{border_width, box_widths, column_class, mobile_width, parse_width, Direction};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{Node, NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{COLOR, DIRECTION, PX_PERCENT, PX_PERCENT_MULTI, STRING, VERTICAL_ALIGN};

const CHILDREN: &[Element] = &[
    Element::Spacer,
    Element::Image,
    Element::Text,
    Element::Social,
    Element::Divider,
    Element::Table,
    Element::Button,
    Element::Raw,
];

const PADDING_ATTRIBUTES: &[&str] = &[
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
];

pub struct Column;

impl Component for Column {
    fn name(&self) -> &'static str {
        "mj-column"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("background-color", COLOR),
            ("border", STRING),
            ("border-bottom", STRING),
            ("border-left", STRING),
            ("border-radius", STRING),
            ("border-right", STRING),
            ("border-top", STRING),
            ("direction", DIRECTION),
            ("inner-background-color", COLOR),
            ("inner-border", STRING),
            ("inner-border-bottom", STRING),
            ("inner-border-left", STRING),
            ("inner-border-radius", STRING),
            ("inner-border-right", STRING),
            ("inner-border-top", STRING),
            ("padding", PX_PERCENT_MULTI),
            ("padding-top", PX_PERCENT),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("vertical-align", VERTICAL_ALIGN),
            ("width", PX_PERCENT),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, ctx: &RenderContext) -> Vec<(&'static str, String)> {
        let mut attributes = defaults(&[("vertical-align", "top")]);
        attributes.push(("direction", ctx.direction.clone()));
        attributes
    }

    fn render(
        &self,
        ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()> {
        let node = tree[id].clone();
        let class = column_class(ctx, tree, id)?;
        let classes = [
            class.as_str(),
            "mj-outlook-group-fix",
            node.attribute_or_empty("css-class"),
        ]
        .into_iter()
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        let div_style = InlineStyle::new()
            .add("font-size", "0px")
            .add("text-align", "left")
            .add("direction", node.attribute_or_empty("direction"))
            .add("display", "inline-block")
            .add("vertical-align", node.attribute_or_empty("vertical-align"))
            .add("width", mobile_width(&ctx.container_width, tree, id)?);
        write!(
            out,
            "<div{}>",
            HtmlAttributes::new().add("class", classes).style(&div_style)
        )?;

        let child_width = child_container_width(&ctx.container_width, tree, id, &node)?;
        ctx.with_container_width(child_width, |ctx| -> CompileResult<()> {
            if has_gutter(&node) {
                render_gutter(ctx, tree, id, &node, out)
            } else {
                render_column(ctx, tree, id, &node, out)
            }
        })?;

        out.push_str("</div>");
        Ok(())
    }
}

fn has_gutter(node: &Node) -> bool {
    PADDING_ATTRIBUTES
        .iter()
        .any(|name| !node.attribute_or_empty(name).is_empty())
}

/// Width available to the column's content: its own pixel width minus paddings, borders
/// and inner borders.
fn child_container_width(
    container: &str,
    tree: &Tree,
    id: NodeId,
    node: &Node,
) -> CompileResult<String> {
    let parent = parse_width(container)?.value;
    let widths = box_widths(container, node)?;
    let inner_borders = border_width(node, "inner-border", Direction::Left)
        + border_width(node, "inner-border", Direction::Right);
    let spacing = widths.paddings + widths.borders + inner_borders;

    let width = match node.attribute("width").filter(|width| !width.is_empty()) {
        Some(width) => {
            let parsed = parse_width(width)?;
            if parsed.is_percent() {
                parent * parsed.value / 100
            } else {
                parsed.value
            }
        }
        None => parent / tree.non_raw_siblings(id) as i64,
    };
    Ok(format!("{}px", width - spacing))
}

fn table_style(node: &Node) -> InlineStyle {
    InlineStyle::new()
        .add("background-color", node.attribute_or_empty("background-color"))
        .add("border", node.attribute_or_empty("border"))
        .add("border-bottom", node.attribute_or_empty("border-bottom"))
        .add("border-left", node.attribute_or_empty("border-left"))
        .add("border-radius", node.attribute_or_empty("border-radius"))
        .add("border-right", node.attribute_or_empty("border-right"))
        .add("border-top", node.attribute_or_empty("border-top"))
        .add("vertical-align", node.attribute_or_empty("vertical-align"))
}

/// Outer table carrying the column padding, so borders and background paint the padded box.
fn render_gutter(
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    node: &Node,
    out: &mut String,
) -> CompileResult<()> {
    let gutter_style = table_style(node)
        .add("padding", node.attribute_or_empty("padding"))
        .add("padding-top", node.attribute_or_empty("padding-top"))
        .add("padding-right", node.attribute_or_empty("padding-right"))
        .add("padding-bottom", node.attribute_or_empty("padding-bottom"))
        .add("padding-left", node.attribute_or_empty("padding-left"));
    write!(
        out,
        r#"<table border="0" cellpadding="0" cellspacing="0" role="presentation" width="100%"><tbody><tr><td{}>"#,
        HtmlAttributes::new().style(&gutter_style)
    )?;
    render_column(ctx, tree, id, node, out)?;
    out.push_str("</td></tr></tbody></table>");
    Ok(())
}

fn render_column(
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    node: &Node,
    out: &mut String,
) -> CompileResult<()> {
    let style = if has_gutter(node) {
        InlineStyle::new()
            .add("background-color", node.attribute_or_empty("inner-background-color"))
            .add("border", node.attribute_or_empty("inner-border"))
            .add("border-bottom", node.attribute_or_empty("inner-border-bottom"))
            .add("border-left", node.attribute_or_empty("inner-border-left"))
            .add("border-radius", node.attribute_or_empty("inner-border-radius"))
            .add("border-right", node.attribute_or_empty("inner-border-right"))
            .add("border-top", node.attribute_or_empty("inner-border-top"))
    } else {
        table_style(node)
    };
    write!(
        out,
        r#"<table border="0" cellpadding="0" cellspacing="0" role="presentation"{} width="100%"><tbody>"#,
        HtmlAttributes::new().style(&style)
    )?;

    for &child in &node.children {
        let Some(element) = allowed_element(tree, child, CHILDREN) else {
            return Err(invalid_child(tree, id, child, CHILDREN));
        };
        render_content_row(element, ctx, tree, child, out)?;
    }

    out.push_str("</tbody></table>");
    Ok(())
}
