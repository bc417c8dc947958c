use std::fmt::Write;

use super::{defaults, AttributeRules, Component};
use crate::boxmodel::{content_width, parse_width};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{
    Validator, ALIGN, COLOR, PX, PX_AUTO, PX_PERCENT, PX_PERCENT_MULTI, STRING,
};

const FULL_WIDTH_MOBILE_CLASS: &str = "mj-full-width-mobile";

pub struct Image;

impl Component for Image {
    fn name(&self) -> &'static str {
        "mj-image"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("alt", STRING),
            ("href", STRING),
            ("name", STRING),
            ("src", STRING),
            ("srcset", STRING),
            ("sizes", STRING),
            ("title", STRING),
            ("rel", STRING),
            ("align", ALIGN),
            ("border", STRING),
            ("border-bottom", STRING),
            ("border-left", STRING),
            ("border-right", STRING),
            ("border-top", STRING),
            ("border-radius", STRING),
            ("container-background-color", COLOR),
            ("fluid-on-mobile", Validator::Enum(&["true", "false"])),
            ("padding", PX_PERCENT_MULTI),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("padding-top", PX_PERCENT),
            ("target", STRING),
            ("width", PX),
            ("height", PX_AUTO),
            ("max-height", PX_PERCENT),
            ("font-size", PX),
            ("usemap", STRING),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[
            ("align", "center"),
            ("border", "0"),
            ("height", "auto"),
            ("padding", "10px 25px"),
            ("target", "_blank"),
            ("font-size", "13px"),
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
        let width = content_width(&ctx.container_width, node)?;
        let fluid = node.attribute("fluid-on-mobile") == Some("true");
        if fluid {
            ctx.mobile_full_width = true;
        }
        let fluid_class = if fluid { FULL_WIDTH_MOBILE_CLASS } else { "" };

        let height = match node.attribute_or_empty("height") {
            "auto" => "auto".to_string(),
            "" => String::new(),
            height => parse_width(height)?.value.to_string(),
        };
        let img_style = InlineStyle::new()
            .add("border", node.attribute_or_empty("border"))
            .add("border-left", node.attribute_or_empty("border-left"))
            .add("border-right", node.attribute_or_empty("border-right"))
            .add("border-top", node.attribute_or_empty("border-top"))
            .add("border-bottom", node.attribute_or_empty("border-bottom"))
            .add("border-radius", node.attribute_or_empty("border-radius"))
            .add("display", "block")
            .add("outline", "none")
            .add("text-decoration", "none")
            .add("height", node.attribute_or_empty("height"))
            .add("max-height", node.attribute_or_empty("max-height"))
            .add("width", "100%")
            .add("font-size", node.attribute_or_empty("font-size"));
        let img = HtmlAttributes::new()
            .add("alt", node.attribute_or_empty("alt"))
            .add("src", node.attribute_or_empty("src"))
            .add("srcset", node.attribute_or_empty("srcset"))
            .add("sizes", node.attribute_or_empty("sizes"))
            .style(&img_style)
            .add("title", node.attribute_or_empty("title"))
            .add("width", width.to_string())
            .add("usemap", node.attribute_or_empty("usemap"))
            .add("height", height);

        let table = HtmlAttributes::new()
            .add("border", "0")
            .add("cellpadding", "0")
            .add("cellspacing", "0")
            .add("role", "presentation")
            .style(
                &InlineStyle::new()
                    .add("border-collapse", "collapse")
                    .add("border-spacing", "0px"),
            )
            .add("class", fluid_class);
        let td = HtmlAttributes::new()
            .style(&InlineStyle::new().add("width", format!("{}px", width)))
            .add("class", fluid_class);

        write!(out, "<table{}><tbody><tr><td{}>", table, td)?;
        let href = node.attribute_or_empty("href");
        if href.is_empty() {
            write!(out, "<img{} />", img)?;
        } else {
            let link = HtmlAttributes::new()
                .add("href", href)
                .add("target", node.attribute_or_empty("target"))
                .add("rel", node.attribute_or_empty("rel"))
                .add("name", node.attribute_or_empty("name"))
                .add("title", node.attribute_or_empty("title"));
            write!(out, "<a{}><img{} /></a>", link, img)?;
        }
        out.push_str("</td></tr></tbody></table>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{render_element, Element};
    use crate::node::Node;
    use crate::options::CompileOptions;

    fn render(attributes: &[(&str, &str)]) -> (String, RenderContext) {
        let mut tree = Tree::new();
        let id = tree.create(Node::new("mj-image").with_attributes(attributes));
        tree.set_root(id);
        let mut ctx = RenderContext::new(&CompileOptions::default());
        let mut out = String::new();
        render_element(Element::Image, &mut ctx, &mut tree, id, &mut out).unwrap();
        (out, ctx)
    }

    #[test]
    fn test_width_is_capped_by_box() {
        let (html, _) = render(&[("src", "a.png"), ("width", "800px")]);
        assert!(html.contains(r#"width="550""#));
        assert!(html.contains(r#"<td style="width:550px;">"#));

        let (html, _) = render(&[("src", "a.png"), ("width", "120px")]);
        assert!(html.contains(r#"width="120""#));
    }

    #[test]
    fn test_fluid_on_mobile_flags_context() {
        let (html, ctx) = render(&[("src", "a.png"), ("fluid-on-mobile", "true")]);
        assert!(ctx.mobile_full_width);
        assert_eq!(html.matches(r#"class="mj-full-width-mobile""#).count(), 2);

        let (_, ctx) = render(&[("src", "a.png")]);
        assert!(!ctx.mobile_full_width);
    }

    #[test]
    fn test_link_wraps_image() {
        let (html, _) = render(&[("src", "a.png"), ("href", "https://example.com"), ("height", "40px")]);
        assert!(html.contains(r#"<a href="https://example.com" target="_blank"><img src="a.png""#));
        assert!(html.contains(r#" height="40" />"#));
    }
}
