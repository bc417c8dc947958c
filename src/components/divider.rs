use std::fmt::Write;

use super::{conditional, defaults, AttributeRules, Component};
use crate::boxmodel::{parse_width, shorthand, Direction};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{Node, NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{ALIGN, COLOR, PX, PX_PERCENT, PX_PERCENT_MULTI, STRING};

pub struct Divider;

impl Component for Divider {
    fn name(&self) -> &'static str {
        "mj-divider"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("border-color", COLOR),
            ("border-style", STRING),
            ("border-width", PX),
            ("container-background-color", COLOR),
            ("padding", PX_PERCENT_MULTI),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("padding-top", PX_PERCENT),
            ("width", PX_PERCENT),
            ("align", ALIGN),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[
            ("border-color", "#000000"),
            ("border-style", "solid"),
            ("border-width", "4px"),
            ("padding", "10px 25px"),
            ("width", "100%"),
            ("align", "center"),
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
        let align = node.attribute_or_empty("align");
        let border_top = [
            node.attribute_or_empty("border-style"),
            node.attribute_or_empty("border-width"),
            node.attribute_or_empty("border-color"),
        ]
        .join(" ");
        let margin = match align {
            "left" => "0px",
            "right" => "0px 0px 0px auto",
            _ => "0px auto",
        };
        let outlook_width = outlook_width(&ctx.container_width, node)?;

        let line = InlineStyle::new()
            .add("border-top", border_top.as_str())
            .add("font-size", "1px")
            .add("margin", margin);
        let p_style = line.clone().add("width", node.attribute_or_empty("width"));
        let outlook_style = line.add("width", outlook_width.as_str());

        write!(out, "<p{}></p>", HtmlAttributes::new().style(&p_style))?;
        let table = HtmlAttributes::new()
            .add("align", align)
            .add("border", "0")
            .add("cellpadding", "0")
            .add("cellspacing", "0")
            .style(&outlook_style)
            .add("role", "presentation")
            .add("width", outlook_width);
        out.push_str(&conditional(&format!(
            r#"<table{}><tr><td style="height:0;line-height:0;">&nbsp;</td></tr></table>"#,
            table
        )));
        Ok(())
    }
}

/// Fixed pixel width for Outlook, which ignores percentage widths on the line.
fn outlook_width(container: &str, node: &Node) -> CompileResult<String> {
    let container = parse_width(container)?.value;
    let paddings = shorthand(node, "padding", Direction::Left)?
        + shorthand(node, "padding", Direction::Right)?;
    let width = parse_width(node.attribute_or_empty("width"))?;
    Ok(match width.unit.as_str() {
        "%" => format!("{}px", (container - paddings) * width.value / 100),
        "px" => format!("{}px", width.value),
        _ => format!("{}px", container - paddings),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{render_element, Element};
    use crate::options::CompileOptions;
    use pretty_assertions::assert_eq;

    fn node(attributes: &[(&str, &str)]) -> Node {
        Node::new("mj-divider").with_attributes(attributes)
    }

    #[test]
    fn test_outlook_width() {
        assert_eq!(
            outlook_width("600px", &node(&[("width", "50%"), ("padding", "0")])).unwrap(),
            "300px"
        );
        assert_eq!(
            outlook_width("600px", &node(&[("width", "50%"), ("padding", "0 50px")])).unwrap(),
            "250px"
        );
        assert_eq!(
            outlook_width("600px", &node(&[("width", "120px")])).unwrap(),
            "120px"
        );
    }

    #[test]
    fn test_render() {
        let mut tree = Tree::new();
        let id = tree.create(node(&[("width", "50%"), ("padding", "0"), ("align", "right")]));
        tree.set_root(id);
        let mut ctx = RenderContext::new(&CompileOptions::default());
        let mut out = String::new();
        render_element(Element::Divider, &mut ctx, &mut tree, id, &mut out).unwrap();

        assert_eq!(
            out,
            "<p style=\"border-top:solid 4px #000000;font-size:1px;margin:0px 0px 0px auto;width:50%;\"></p>\
             <!--[if mso | IE]><table align=\"right\" border=\"0\" cellpadding=\"0\" cellspacing=\"0\" \
             style=\"border-top:solid 4px #000000;font-size:1px;margin:0px 0px 0px auto;width:300px;\" \
             role=\"presentation\" width=\"300px\"><tr><td style=\"height:0;line-height:0;\">&nbsp;</td></tr></table><![endif]-->"
        );
    }
}
