use std::fmt::Write;

use super::{defaults, AttributeRules, Component, DEFAULT_FONT_FAMILY};
use crate::boxmodel::parse_width;
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{
    Validator, ALIGN, COLOR, LINE_HEIGHT, NUMBER, PX, PX_PERCENT, PX_PERCENT_AUTO,
    PX_PERCENT_MULTI, STRING,
};

/// Author supplied table rows inside a styled `<table>`.
pub struct Table;

impl Component for Table {
    fn name(&self) -> &'static str {
        "mj-table"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("align", ALIGN),
            ("border", STRING),
            ("cellpadding", NUMBER),
            ("cellspacing", NUMBER),
            ("color", COLOR),
            ("container-background-color", COLOR),
            ("font-family", STRING),
            ("font-size", PX),
            ("font-weight", STRING),
            ("line-height", LINE_HEIGHT),
            ("padding", PX_PERCENT_MULTI),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("padding-top", PX_PERCENT),
            ("role", Validator::Enum(&["none", "presentation"])),
            (
                "table-layout",
                Validator::Enum(&["auto", "fixed", "initial", "inherit"]),
            ),
            ("width", PX_PERCENT_AUTO),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[
            ("align", "left"),
            ("border", "none"),
            ("cellpadding", "0"),
            ("cellspacing", "0"),
            ("color", "#000000"),
            ("font-family", DEFAULT_FONT_FAMILY),
            ("font-size", "13px"),
            ("line-height", "22px"),
            ("padding", "10px 25px"),
            ("table-layout", "auto"),
            ("width", "100%"),
        ])
    }

    fn render(
        &self,
        _ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()> {
        let node = &tree[id];
        let width = match node.attribute_or_empty("width") {
            "auto" => "auto".to_string(),
            width => {
                let parsed = parse_width(width)?;
                if parsed.is_percent() {
                    parsed.to_string()
                } else {
                    parsed.value.to_string()
                }
            }
        };

        let style = InlineStyle::new()
            .add("color", node.attribute_or_empty("color"))
            .add("font-family", node.attribute_or_empty("font-family"))
            .add("font-size", node.attribute_or_empty("font-size"))
            .add("font-weight", node.attribute_or_empty("font-weight"))
            .add("line-height", node.attribute_or_empty("line-height"))
            .add("table-layout", node.attribute_or_empty("table-layout"))
            .add("width", node.attribute_or_empty("width"))
            .add("border", node.attribute_or_empty("border"));
        let table = HtmlAttributes::new()
            .add("cellpadding", node.attribute_or_empty("cellpadding"))
            .add("cellspacing", node.attribute_or_empty("cellspacing"))
            .add("role", node.attribute_or_empty("role"))
            .add("width", width)
            .add("border", "0")
            .style(&style);

        write!(out, "<table{}>{}</table>", table, node.content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{render_element, Element};
    use crate::node::Node;
    use crate::options::CompileOptions;
    use pretty_assertions::assert_eq;

    fn render(attributes: &[(&str, &str)]) -> String {
        let mut tree = Tree::new();
        let id = tree.create(
            Node::new("mj-table")
                .with_attributes(attributes)
                .with_content("<tr><td>1</td></tr>"),
        );
        tree.set_root(id);
        let mut ctx = RenderContext::new(&CompileOptions::default());
        let mut out = String::new();
        render_element(Element::Table, &mut ctx, &mut tree, id, &mut out).unwrap();
        out
    }

    #[test]
    fn test_table_width_attribute() {
        let html = render(&[]);
        assert!(html.starts_with(r#"<table cellpadding="0" cellspacing="0" width="100%" border="0" style="#));
        assert!(html.ends_with("><tr><td>1</td></tr></table>"));

        let html = render(&[("width", "300px")]);
        assert!(html.contains(r#" width="300" "#));
    }

    #[test]
    fn test_invalid_table_layout() {
        let mut tree = Tree::new();
        let id = tree.create(Node::new("mj-table").with_attributes(&[("table-layout", "grid")]));
        tree.set_root(id);
        let mut ctx = RenderContext::new(&CompileOptions::default());
        let mut out = String::new();
        let err = render_element(Element::Table, &mut ctx, &mut tree, id, &mut out).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to validate field 'table-layout' in <mj-table>: 'grid' is not one of [auto, fixed, initial, inherit]"
        );
    }
}
