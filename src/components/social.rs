use std::fmt::Write;

use super::{
    allowed_element, conditional, defaults, init_component, skip_child, AttributeRules, Component,
    Element, DEFAULT_FONT_FAMILY,
};
use crate::boxmodel::parse_width;
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{Node, NodeId, Tree};
use crate::social::lookup;
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{
    Validator, ALIGN, COLOR, LINE_HEIGHT, PX, PX_PERCENT, PX_PERCENT_MULTI, STRING,
    VERTICAL_ALIGN,
};

const CHILDREN: &[Element] = &[Element::SocialElement, Element::Raw];

/// Attributes a social row hands down to its elements.
const INHERITED_ATTRIBUTES: &[&str] = &[
    "border-radius",
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "icon-size",
    "icon-height",
    "icon-padding",
    "text-padding",
    "line-height",
    "text-decoration",
];

/// A row (or column) of social network links.
pub struct Social;

impl Component for Social {
    fn name(&self) -> &'static str {
        "mj-social"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("align", ALIGN),
            ("border-radius", STRING),
            ("container-background-color", COLOR),
            ("color", COLOR),
            ("font-family", STRING),
            ("font-size", PX),
            ("font-style", STRING),
            ("font-weight", STRING),
            ("icon-size", PX_PERCENT),
            ("icon-height", PX_PERCENT),
            ("icon-padding", PX_PERCENT_MULTI),
            ("inner-padding", PX_PERCENT_MULTI),
            ("line-height", LINE_HEIGHT),
            ("mode", Validator::Enum(&["horizontal", "vertical"])),
            ("padding", PX_PERCENT_MULTI),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("padding-top", PX_PERCENT),
            ("text-decoration", STRING),
            ("text-padding", PX_PERCENT_MULTI),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[
            ("align", "center"),
            ("border-radius", "3px"),
            ("color", "#333333"),
            ("font-family", DEFAULT_FONT_FAMILY),
            ("font-size", "13px"),
            ("icon-size", "20px"),
            ("line-height", "22px"),
            ("mode", "horizontal"),
            ("padding", "10px 25px"),
            ("text-decoration", "none"),
        ])
    }

    fn render(
        &self,
        ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()> {
        let node = tree[id].clone();
        let inherited = inherited_attributes(&node);
        let align = node.attribute_or_empty("align");
        let vertical = node.attribute("mode") == Some("vertical");

        if vertical {
            out.push_str(
                r#"<table border="0" cellpadding="0" cellspacing="0" role="presentation" style="margin:0px;"><tbody>"#,
            );
        } else {
            let table = HtmlAttributes::new()
                .add("align", align)
                .add("border", "0")
                .add("cellpadding", "0")
                .add("cellspacing", "0")
                .add("role", "presentation");
            out.push_str(&conditional(&format!("<table{}><tr>", table)));
        }

        for &child in &node.children {
            let Some(element) = allowed_element(tree, child, CHILDREN) else {
                skip_child(tree, id, child);
                continue;
            };
            if element == Element::SocialElement {
                let child_node = tree.get_mut(child);
                for (name, value) in &inherited {
                    if !child_node.has_attribute(name) {
                        child_node.set_attribute(name, value.clone());
                    }
                }
            }
            let component = element.component();
            init_component(ctx, component, tree, child)?;

            if vertical || element == Element::Raw {
                component.render(ctx, tree, child, out)?;
                continue;
            }

            let table = HtmlAttributes::new()
                .add("align", align)
                .add("border", "0")
                .add("cellpadding", "0")
                .add("cellspacing", "0")
                .add("role", "presentation")
                .style(
                    &InlineStyle::new()
                        .add("float", "none")
                        .add("display", "inline-table"),
                );
            write!(out, "{}<table{}><tbody>", conditional("<td>"), table)?;
            component.render(ctx, tree, child, out)?;
            write!(out, "</tbody></table>{}", conditional("</td>"))?;
        }

        if vertical {
            out.push_str("</tbody></table>");
        } else {
            out.push_str(&conditional("</tr></table>"));
        }
        Ok(())
    }
}

fn inherited_attributes(node: &Node) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let inner_padding = node.attribute_or_empty("inner-padding");
    if !inner_padding.is_empty() {
        attributes.push(("padding".to_string(), inner_padding.to_string()));
    }
    for name in INHERITED_ATTRIBUTES {
        let value = node.attribute_or_empty(name);
        if !value.is_empty() {
            attributes.push((name.to_string(), value.to_string()));
        }
    }
    attributes
}

/// One network link: an icon plus optional label.
pub struct SocialElement;

impl Component for SocialElement {
    fn name(&self) -> &'static str {
        "mj-social-element"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("align", ALIGN),
            ("alt", STRING),
            ("background-color", COLOR),
            ("border-radius", STRING),
            ("color", COLOR),
            ("font-family", STRING),
            ("font-size", PX),
            ("font-style", STRING),
            ("font-weight", STRING),
            ("href", STRING),
            ("icon-size", PX_PERCENT),
            ("icon-height", PX_PERCENT),
            ("icon-padding", PX_PERCENT_MULTI),
            ("icon-position", Validator::Enum(&["left", "right"])),
            ("line-height", LINE_HEIGHT),
            ("name", STRING),
            ("padding", PX_PERCENT_MULTI),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("padding-top", PX_PERCENT),
            ("rel", STRING),
            ("sizes", STRING),
            ("src", STRING),
            ("srcset", STRING),
            ("target", STRING),
            ("text-decoration", STRING),
            ("text-padding", PX_PERCENT_MULTI),
            ("title", STRING),
            ("vertical-align", VERTICAL_ALIGN),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[
            ("align", "left"),
            ("color", "#000"),
            ("border-radius", "3px"),
            ("font-family", DEFAULT_FONT_FAMILY),
            ("font-size", "13px"),
            ("icon-position", "left"),
            ("icon-size", "20px"),
            ("line-height", "1"),
            ("padding", "4px"),
            ("text-padding", "4px 4px 4px 0"),
            ("target", "_blank"),
            ("text-decoration", "none"),
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
        let network = lookup(node.attribute_or_empty("name"));

        let explicit_href = node.attribute_or_empty("href");
        let href = match network {
            Some(network) if !explicit_href.is_empty() => network.link(explicit_href),
            _ => explicit_href.to_string(),
        };
        let src = match (node.attribute_or_empty("src"), network) {
            ("", Some(network)) => network.icon_src(&ctx.social_icon_base_url),
            (src, _) => src.to_string(),
        };
        let background = match (node.attribute_or_empty("background-color"), network) {
            ("", Some(network)) => network.background_color.to_string(),
            (color, _) => color.to_string(),
        };
        let icon_size = node.attribute_or_empty("icon-size");
        let icon_height = match node.attribute_or_empty("icon-height") {
            "" => icon_size,
            height => height,
        };

        let td_style = InlineStyle::new()
            .add("padding", node.attribute_or_empty("padding"))
            .add("padding-top", node.attribute_or_empty("padding-top"))
            .add("padding-right", node.attribute_or_empty("padding-right"))
            .add("padding-bottom", node.attribute_or_empty("padding-bottom"))
            .add("padding-left", node.attribute_or_empty("padding-left"))
            .add("vertical-align", node.attribute_or_empty("vertical-align"));
        let table_style = InlineStyle::new()
            .add("background", background)
            .add("border-radius", node.attribute_or_empty("border-radius"))
            .add("width", icon_size);
        let icon_style = InlineStyle::new()
            .add("padding", node.attribute_or_empty("icon-padding"))
            .add("font-size", "0")
            .add("height", icon_height)
            .add("vertical-align", "middle")
            .add("width", icon_size);
        let img_style = InlineStyle::new()
            .add("border-radius", node.attribute_or_empty("border-radius"))
            .add("display", "block");

        let link = HtmlAttributes::new()
            .add("href", href.as_str())
            .add("rel", node.attribute_or_empty("rel"))
            .add("target", node.attribute_or_empty("target"));
        let img = HtmlAttributes::new()
            .add("alt", node.attribute_or_empty("alt"))
            .add("title", node.attribute_or_empty("title"))
            .add("height", pixels(icon_height)?)
            .add("src", src)
            .style(&img_style)
            .add("width", pixels(icon_size)?)
            .add("sizes", node.attribute_or_empty("sizes"))
            .add("srcset", node.attribute_or_empty("srcset"));
        let has_link = !explicit_href.is_empty();

        let mut icon = String::new();
        write!(
            icon,
            r#"<td{}><table border="0" cellpadding="0" cellspacing="0" role="presentation"{}><tbody><tr><td{}>"#,
            HtmlAttributes::new().style(&td_style),
            HtmlAttributes::new().style(&table_style),
            HtmlAttributes::new().style(&icon_style)
        )?;
        if has_link {
            write!(icon, "<a{}><img{} /></a>", link, img)?;
        } else {
            write!(icon, "<img{} />", img)?;
        }
        icon.push_str("</td></tr></tbody></table></td>");

        let mut label = String::new();
        if !node.content.is_empty() {
            let cell_style = InlineStyle::new()
                .add("vertical-align", "middle")
                .add("padding", node.attribute_or_empty("text-padding"))
                .add("text-align", node.attribute_or_empty("align"));
            let text_style = InlineStyle::new()
                .add("color", node.attribute_or_empty("color"))
                .add("font-size", node.attribute_or_empty("font-size"))
                .add("font-weight", node.attribute_or_empty("font-weight"))
                .add("font-style", node.attribute_or_empty("font-style"))
                .add("font-family", node.attribute_or_empty("font-family"))
                .add("line-height", node.attribute_or_empty("line-height"))
                .add("text-decoration", node.attribute_or_empty("text-decoration"));
            write!(label, "<td{}>", HtmlAttributes::new().style(&cell_style))?;
            if has_link {
                let text_link = HtmlAttributes::new()
                    .add("href", href.as_str())
                    .style(&text_style)
                    .add("rel", node.attribute_or_empty("rel"))
                    .add("target", node.attribute_or_empty("target"));
                write!(label, "<a{}>{}</a>", text_link, node.content)?;
            } else {
                write!(
                    label,
                    "<span{}>{}</span>",
                    HtmlAttributes::new().style(&text_style),
                    node.content
                )?;
            }
            label.push_str("</td>");
        }

        let row = HtmlAttributes::new().add("class", node.attribute_or_empty("css-class"));
        if node.attribute("icon-position") == Some("right") {
            write!(out, "<tr{}>{}{}</tr>", row, label, icon)?;
        } else {
            write!(out, "<tr{}>{}{}</tr>", row, icon, label)?;
        }
        Ok(())
    }
}

fn pixels(value: &str) -> CompileResult<String> {
    if value.is_empty() {
        return Ok(String::new());
    }
    Ok(parse_width(value)?.value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::render_element;
    use crate::options::CompileOptions;

    fn social(attributes: &[(&str, &str)], elements: &[&[(&str, &str)]]) -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let social = tree.create(Node::new("mj-social").with_attributes(attributes));
        tree.set_root(social);
        for element in elements {
            let child = tree.create(
                Node::new("mj-social-element")
                    .with_attributes(element)
                    .with_content("Share"),
            );
            tree.append_child(social, child);
        }
        (tree, social)
    }

    fn render(tree: &mut Tree, id: NodeId) -> String {
        let mut ctx = RenderContext::new(&CompileOptions::default());
        let mut out = String::new();
        render_element(Element::Social, &mut ctx, tree, id, &mut out).unwrap();
        out
    }

    #[test]
    fn test_registry_fills_href_icon_and_color() {
        let (mut tree, id) = social(&[], &[&[("name", "facebook"), ("href", "https://example.com")]]);
        let html = render(&mut tree, id);

        assert!(html.contains(
            r#"href="https://www.facebook.com/sharer/sharer.php?u=https://example.com""#
        ));
        assert!(html.contains(
            r#"src="https://www.mailjet.com/images/theme/v1/icons/ico-social/facebook.png""#
        ));
        assert!(html.contains("background:#3b5998;"));
        assert!(html.contains(r#"height="20""#));
        assert!(html.contains("</a></td></tr></tbody></table></td><td"));
    }

    #[test]
    fn test_parent_attributes_do_not_override_element() {
        let (mut tree, id) = social(
            &[("color", "#111111"), ("inner-padding", "8px")],
            &[&[("name", "github")], &[("name", "x"), ("color", "#222222")]],
        );
        render(&mut tree, id);

        let children = tree.child_ids(id);
        assert_eq!(tree[children[0]].attribute("color"), Some("#111111"));
        assert_eq!(tree[children[0]].attribute("padding"), Some("8px"));
        assert_eq!(tree[children[1]].attribute("color"), Some("#222222"));
    }

    #[test]
    fn test_icon_position_right() {
        let (mut tree, id) = social(
            &[("mode", "vertical")],
            &[&[("name", "web"), ("icon-position", "right")]],
        );
        let html = render(&mut tree, id);
        let label = html.find("<span").unwrap();
        let icon = html.find("<img").unwrap();
        assert!(label < icon);
        assert!(!html.contains("<!--[if mso | IE]>"));
    }
}
