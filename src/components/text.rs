use std::fmt::Write;

use super::{conditional, defaults, AttributeRules, Component, DEFAULT_FONT_FAMILY};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{
    COLOR, LINE_HEIGHT, PX, PX_PERCENT, PX_PERCENT_MULTI, STRING, TEXT_ALIGN,
};

pub struct Text;

impl Component for Text {
    fn name(&self) -> &'static str {
        "mj-text"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("align", TEXT_ALIGN),
            ("color", COLOR),
            ("container-background-color", COLOR),
            ("font-family", STRING),
            ("font-size", PX),
            ("font-style", STRING),
            ("font-weight", STRING),
            ("height", PX_PERCENT),
            ("letter-spacing", STRING),
            ("line-height", LINE_HEIGHT),
            ("padding", PX_PERCENT_MULTI),
            ("padding-top", PX_PERCENT),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("text-decoration", STRING),
            ("text-transform", STRING),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[
            ("align", "left"),
            ("color", "#000000"),
            ("font-family", DEFAULT_FONT_FAMILY),
            ("font-size", "13px"),
            ("line-height", "1"),
            ("padding", "10px 25px"),
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
        let height = node.attribute_or_empty("height");
        let style = InlineStyle::new()
            .add("font-family", node.attribute_or_empty("font-family"))
            .add("font-size", node.attribute_or_empty("font-size"))
            .add("font-style", node.attribute_or_empty("font-style"))
            .add("font-weight", node.attribute_or_empty("font-weight"))
            .add("letter-spacing", node.attribute_or_empty("letter-spacing"))
            .add("line-height", node.attribute_or_empty("line-height"))
            .add("text-align", node.attribute_or_empty("align"))
            .add("text-decoration", node.attribute_or_empty("text-decoration"))
            .add("text-transform", node.attribute_or_empty("text-transform"))
            .add("color", node.attribute_or_empty("color"))
            .add("height", height);
        let content = format!(
            "<div{}>{}</div>",
            HtmlAttributes::new().style(&style),
            node.content
        );

        if height.is_empty() {
            out.push_str(&content);
            return Ok(());
        }

        let cell = HtmlAttributes::new().add("height", height).style(
            &InlineStyle::new()
                .add("vertical-align", "top")
                .add("height", height),
        );
        write!(
            out,
            "{}{}{}",
            conditional(&format!(
                r#"<table role="presentation" border="0" cellpadding="0" cellspacing="0"><tr><td{}>"#,
                cell
            )),
            content,
            conditional("</td></tr></table>")
        )?;
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
            Node::new("mj-text")
                .with_attributes(attributes)
                .with_content("Hello <i>world</i>"),
        );
        tree.set_root(id);
        let mut ctx = RenderContext::new(&CompileOptions::default());
        let mut out = String::new();
        render_element(Element::Text, &mut ctx, &mut tree, id, &mut out).unwrap();
        out
    }

    #[test]
    fn test_text_renders_content_verbatim() {
        assert_eq!(
            render(&[("align", "center")]),
            r#"<div style="font-family:Ubuntu, Helvetica, Arial, sans-serif;font-size:13px;line-height:1;text-align:center;color:#000000;">Hello <i>world</i></div>"#
        );
    }

    #[test]
    fn test_fixed_height_adds_outlook_table() {
        let html = render(&[("height", "40px")]);
        assert!(html.starts_with(
            r#"<!--[if mso | IE]><table role="presentation" border="0" cellpadding="0" cellspacing="0"><tr><td height="40px" style="vertical-align:top;height:40px;"><![endif]-->"#
        ));
        assert!(html.ends_with("<!--[if mso | IE]></td></tr></table><![endif]-->"));
    }
}
