use std::fmt::Write;

use super::{defaults, AttributeRules, Component, DEFAULT_FONT_FAMILY};
use crate::boxmodel::{box_widths, parse_width, shorthand, Direction};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{Node, NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{
    ALIGN, COLOR, LINE_HEIGHT, PX, PX_PERCENT, PX_PERCENT_MULTI, STRING, TEXT_ALIGN,
    VERTICAL_ALIGN,
};

pub struct Button;

impl Component for Button {
    fn name(&self) -> &'static str {
        "mj-button"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("align", ALIGN),
            ("background-color", COLOR),
            ("border", STRING),
            ("border-bottom", STRING),
            ("border-left", STRING),
            ("border-radius", STRING),
            ("border-right", STRING),
            ("border-top", STRING),
            ("color", COLOR),
            ("container-background-color", COLOR),
            ("font-family", STRING),
            ("font-size", PX),
            ("font-style", STRING),
            ("font-weight", STRING),
            ("height", PX_PERCENT),
            ("href", STRING),
            ("name", STRING),
            ("title", STRING),
            ("inner-padding", PX_PERCENT_MULTI),
            ("letter-spacing", STRING),
            ("line-height", LINE_HEIGHT),
            ("padding", PX_PERCENT_MULTI),
            ("padding-top", PX_PERCENT),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("rel", STRING),
            ("target", STRING),
            ("text-decoration", STRING),
            ("text-transform", STRING),
            ("vertical-align", VERTICAL_ALIGN),
            ("text-align", TEXT_ALIGN),
            ("width", PX_PERCENT),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[
            ("align", "center"),
            ("background-color", "#414141"),
            ("border", "none"),
            ("border-radius", "3px"),
            ("color", "#ffffff"),
            ("font-family", DEFAULT_FONT_FAMILY),
            ("font-size", "13px"),
            ("font-weight", "normal"),
            ("inner-padding", "10px 25px"),
            ("line-height", "120%"),
            ("padding", "10px 25px"),
            ("target", "_blank"),
            ("text-decoration", "none"),
            ("text-transform", "none"),
            ("vertical-align", "middle"),
        ])
    }

    fn render(
        &self,
        ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()> {
        let node = &tree[id];
        let background = node.attribute_or_empty("background-color");
        let inner_padding = node.attribute_or_empty("inner-padding");

        let table_style = InlineStyle::new()
            .add("border-collapse", "separate")
            .add("width", node.attribute_or_empty("width"))
            .add("line-height", "100%");
        let td_style = InlineStyle::new()
            .add("border", node.attribute_or_empty("border"))
            .add("border-bottom", node.attribute_or_empty("border-bottom"))
            .add("border-left", node.attribute_or_empty("border-left"))
            .add("border-radius", node.attribute_or_empty("border-radius"))
            .add("border-right", node.attribute_or_empty("border-right"))
            .add("border-top", node.attribute_or_empty("border-top"))
            .add("cursor", "auto")
            .add("font-style", node.attribute_or_empty("font-style"))
            .add("height", node.attribute_or_empty("height"))
            .add("mso-padding-alt", inner_padding)
            .add("text-align", node.attribute_or_empty("text-align"))
            .add("background", background);
        let content_style = InlineStyle::new()
            .add("display", "inline-block")
            .add("width", link_width(&ctx.container_width, node)?)
            .add("background", background)
            .add("color", node.attribute_or_empty("color"))
            .add("font-family", node.attribute_or_empty("font-family"))
            .add("font-size", node.attribute_or_empty("font-size"))
            .add("font-style", node.attribute_or_empty("font-style"))
            .add("font-weight", node.attribute_or_empty("font-weight"))
            .add("line-height", node.attribute_or_empty("line-height"))
            .add("letter-spacing", node.attribute_or_empty("letter-spacing"))
            .add("margin", "0")
            .add("text-decoration", node.attribute_or_empty("text-decoration"))
            .add("text-transform", node.attribute_or_empty("text-transform"))
            .add("padding", inner_padding)
            .add("mso-padding-alt", "0px")
            .add("border-radius", node.attribute_or_empty("border-radius"));

        let table = HtmlAttributes::new()
            .add("border", "0")
            .add("cellpadding", "0")
            .add("cellspacing", "0")
            .add("role", "presentation")
            .style(&table_style);
        let td = HtmlAttributes::new()
            .add("align", "center")
            .add("bgcolor", if background == "none" { "" } else { background })
            .add("role", "presentation")
            .style(&td_style)
            .add("valign", node.attribute_or_empty("vertical-align"));

        let href = node.attribute_or_empty("href");
        let (tag, link) = if href.is_empty() {
            ("p", HtmlAttributes::new().style(&content_style))
        } else {
            (
                "a",
                HtmlAttributes::new()
                    .add("href", href)
                    .add("rel", node.attribute_or_empty("rel"))
                    .add("name", node.attribute_or_empty("name"))
                    .add("title", node.attribute_or_empty("title"))
                    .style(&content_style)
                    .add("target", node.attribute_or_empty("target")),
            )
        };

        write!(
            out,
            "<table{}><tbody><tr><td{}><{}{}>{}</{}></td></tr></tbody></table>",
            table, td, tag, link, node.content, tag
        )?;
        Ok(())
    }
}

/// Pixel width of the link inside a fixed width button, or empty when the width is relative.
fn link_width(container: &str, node: &Node) -> CompileResult<String> {
    let Some(width) = node.attribute("width").filter(|width| !width.is_empty()) else {
        return Ok(String::new());
    };
    let parsed = parse_width(width)?;
    if parsed.unit != "px" {
        return Ok(String::new());
    }
    let borders = box_widths(container, node)?.borders;
    let inner_paddings = shorthand(node, "inner-padding", Direction::Left)?
        + shorthand(node, "inner-padding", Direction::Right)?;
    Ok(format!("{}px", parsed.value - inner_paddings - borders))
}
