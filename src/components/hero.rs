use std::fmt::Write;

use super::{
    allowed_element, conditional, defaults, invalid_child, render_content_row, AttributeRules,
    Component, Element, END_CONDITIONAL, START_CONDITIONAL,
};
use crate::boxmodel::{background_position_string, parse_width, shorthand, Direction};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{Node, NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{
    Validator, ALIGN, COLOR, PX_PERCENT, PX_PERCENT_MULTI, STRING, VERTICAL_ALIGN,
};

const CHILDREN: &[Element] = &[
    Element::Text,
    Element::Image,
    Element::Button,
    Element::Divider,
    Element::Spacer,
    Element::Social,
    Element::Table,
    Element::Raw,
];

/// Full width block with a background image, either fluid (keeps the image ratio) or of a
/// fixed height.
pub struct Hero;

impl Component for Hero {
    fn name(&self) -> &'static str {
        "mj-hero"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("mode", Validator::Enum(&["fixed-height", "fluid-height"])),
            ("height", PX_PERCENT),
            ("align", ALIGN),
            ("background-url", STRING),
            ("background-width", PX_PERCENT),
            ("background-height", PX_PERCENT),
            ("background-position", STRING),
            ("background-color", COLOR),
            ("border-radius", STRING),
            ("container-background-color", COLOR),
            ("inner-background-color", COLOR),
            ("inner-padding", PX_PERCENT_MULTI),
            ("inner-padding-top", PX_PERCENT),
            ("inner-padding-left", PX_PERCENT),
            ("inner-padding-right", PX_PERCENT),
            ("inner-padding-bottom", PX_PERCENT),
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

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[
            ("mode", "fluid-height"),
            ("height", "0px"),
            ("align", "center"),
            ("background-position", "center center"),
            ("padding", "0px"),
            ("background-color", "#ffffff"),
            ("vertical-align", "top"),
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
        let container = ctx.container_width.clone();
        let container_px = parse_width(&container)?.value;
        let background_url = node.attribute_or_empty("background-url");

        let outlook_image_style = InlineStyle::new()
            .add("border", "0")
            .add("height", node.attribute_or_empty("background-height"))
            .add("mso-position-horizontal", "center")
            .add("position", "absolute")
            .add("top", "0")
            .add(
                "width",
                match node.attribute_or_empty("background-width") {
                    "" => container.clone(),
                    width => width.to_string(),
                },
            )
            .add("z-index", "-3");
        let outlook_table = HtmlAttributes::new()
            .add("align", "center")
            .add("border", "0")
            .add("cellpadding", "0")
            .add("cellspacing", "0")
            .add("role", "presentation")
            .style(&InlineStyle::new().add("width", container.clone()))
            .add("width", container_px.to_string());
        let outlook_image = HtmlAttributes::new()
            .style(&outlook_image_style)
            .add("src", background_url)
            .add("xmlns:v", "urn:schemas-microsoft-com:vml");
        out.push_str(&conditional(&format!(
            r#"<table{}><tr><td style="line-height:0;font-size:0;mso-line-height-rule:exactly;"><v:image{} />"#,
            outlook_table, outlook_image
        )));

        let div = HtmlAttributes::new()
            .add("align", node.attribute_or_empty("align"))
            .add("class", node.attribute_or_empty("css-class"))
            .style(
                &InlineStyle::new()
                    .add("margin", "0 auto")
                    .add("max-width", container.clone()),
            );
        write!(
            out,
            r#"<div{}><table border="0" cellpadding="0" cellspacing="0" role="presentation" style="width:100%;"><tbody><tr style="vertical-align:top;">"#,
            div
        )?;

        let hero_cell = HtmlAttributes::new()
            .add("background", background_url)
            .style(&hero_style(&node));
        let inner_width = container_px
            - shorthand(&node, "padding", Direction::Left)?
            - shorthand(&node, "padding", Direction::Right)?;

        let mut content = String::new();
        ctx.with_container_width(format!("{}px", inner_width), |ctx| {
            render_content(ctx, tree, id, &node, &mut content)
        })?;

        if node.attribute("mode") == Some("fixed-height") {
            let height = parse_width(node.attribute_or_empty("height"))?.value
                - shorthand(&node, "padding", Direction::Top)?
                - shorthand(&node, "padding", Direction::Bottom)?;
            write!(
                out,
                "<td{}>{}</td>",
                hero_cell.add("height", height.to_string()),
                content
            )?;
        } else {
            let spacer = format!(
                r#"<td style="width:0.01%;padding-bottom:{}%;mso-padding-bottom-alt:0;"></td>"#,
                background_ratio(&node)?
            );
            write!(out, "{}<td{}>{}</td>{}", spacer, hero_cell, content, spacer)?;
        }

        out.push_str("</tr></tbody></table></div>");
        out.push_str(&conditional("</td></tr></table>"));
        Ok(())
    }
}

/// Background height over width as a rounded percentage, 0 when either is unknown.
fn background_ratio(node: &Node) -> CompileResult<i64> {
    let width = node.attribute_or_empty("background-width");
    let height = node.attribute_or_empty("background-height");
    if width.is_empty() || height.is_empty() {
        return Ok(0);
    }
    let width = parse_width(width)?.value;
    let height = parse_width(height)?.value;
    if width == 0 {
        return Ok(0);
    }
    Ok((height as f64 / width as f64 * 100.0).round() as i64)
}

fn hero_style(node: &Node) -> InlineStyle {
    let color = node.attribute_or_empty("background-color");
    let url = node.attribute_or_empty("background-url");
    let position = background_position_string(node);
    let background = if url.is_empty() {
        color.to_string()
    } else {
        [
            color.to_string(),
            format!("url('{}')", url),
            "no-repeat".to_string(),
            format!("{} / cover", position),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    };

    InlineStyle::new()
        .add("background", background)
        .add("background-position", position)
        .add("background-repeat", "no-repeat")
        .add("border-radius", node.attribute_or_empty("border-radius"))
        .add("padding", node.attribute_or_empty("padding"))
        .add("padding-top", node.attribute_or_empty("padding-top"))
        .add("padding-right", node.attribute_or_empty("padding-right"))
        .add("padding-bottom", node.attribute_or_empty("padding-bottom"))
        .add("padding-left", node.attribute_or_empty("padding-left"))
        .add("vertical-align", node.attribute_or_empty("vertical-align"))
}

fn render_content(
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    node: &Node,
    out: &mut String,
) -> CompileResult<()> {
    let inner_background = node.attribute_or_empty("inner-background-color");
    let outlook_inner_td = InlineStyle::new()
        .add("background-color", inner_background)
        .add("padding", node.attribute_or_empty("inner-padding"))
        .add("padding-top", node.attribute_or_empty("inner-padding-top"))
        .add("padding-right", node.attribute_or_empty("inner-padding-right"))
        .add("padding-bottom", node.attribute_or_empty("inner-padding-bottom"))
        .add("padding-left", node.attribute_or_empty("inner-padding-left"));
    let outlook_inner_table = HtmlAttributes::new()
        .add("align", node.attribute_or_empty("align"))
        .add("border", "0")
        .add("cellpadding", "0")
        .add("cellspacing", "0")
        .style(&InlineStyle::new().add("width", ctx.container_width.clone()))
        .add("width", parse_width(&ctx.container_width)?.value.to_string());
    write!(
        out,
        "{}<table{}><tr><td{}>{}",
        START_CONDITIONAL,
        outlook_inner_table,
        HtmlAttributes::new().style(&outlook_inner_td),
        END_CONDITIONAL
    )?;

    let inner_div = InlineStyle::new()
        .add("background-color", inner_background)
        .add("float", node.attribute_or_empty("align"))
        .add("margin", "0px auto")
        .add("width", node.attribute_or_empty("width"));
    write!(
        out,
        r#"<div{}><table border="0" cellpadding="0" cellspacing="0" role="presentation" style="width:100%;margin:0px;"><tbody><tr><td>"#,
        HtmlAttributes::new()
            .add("align", node.attribute_or_empty("align"))
            .add("class", "mj-hero-content")
            .style(&inner_div)
    )?;
    out.push_str(
        r#"<table border="0" cellpadding="0" cellspacing="0" role="presentation" style="width:100%;margin:0px;"><tbody>"#,
    );

    for &child in &node.children {
        let Some(element) = allowed_element(tree, child, CHILDREN) else {
            return Err(invalid_child(tree, id, child, CHILDREN));
        };
        render_content_row(element, ctx, tree, child, out)?;
    }

    out.push_str("</tbody></table></td></tr></tbody></table></div>");
    out.push_str(&conditional("</td></tr></table>"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::render_element;
    use crate::error::CompileError;
    use crate::options::CompileOptions;

    fn render(attributes: &[(&str, &str)], child: Option<&str>) -> CompileResult<String> {
        let mut tree = Tree::new();
        let hero = tree.create(Node::new("mj-hero").with_attributes(attributes));
        tree.set_root(hero);
        if let Some(tag) = child {
            let child = tree.create(Node::new(tag));
            tree.append_child(hero, child);
        }
        let mut ctx = RenderContext::new(&CompileOptions::default());
        let mut out = String::new();
        render_element(Element::Hero, &mut ctx, &mut tree, hero, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_fluid_height_uses_background_ratio() {
        let html = render(
            &[
                ("background-url", "hero.jpg"),
                ("background-width", "600px"),
                ("background-height", "300px"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(html.matches("padding-bottom:50%;").count(), 2);
    }

    #[test]
    fn test_background_ratio_ignores_units() {
        let html = render(
            &[
                ("background-url", "hero.jpg"),
                ("background-width", "200px"),
                ("background-height", "50%"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(html.matches("padding-bottom:25%;").count(), 2);
    }

    #[test]
    fn test_fluid_height_without_dimensions() {
        let html = render(&[], None).unwrap();
        assert!(html.contains("padding-bottom:0%;"));
    }

    #[test]
    fn test_fixed_height_subtracts_vertical_padding() {
        let html = render(
            &[
                ("mode", "fixed-height"),
                ("height", "400px"),
                ("padding", "50px 0"),
            ],
            None,
        )
        .unwrap();
        assert!(html.contains(r#" height="300">"#));
    }

    #[test]
    fn test_content_width_excludes_padding() {
        let html = render(&[("padding", "0 100px")], Some("mj-divider")).unwrap();
        assert!(html.contains(r#"style="width:400px;" width="400""#));
    }

    #[test]
    fn test_unknown_child_is_an_error() {
        let err = render(&[], Some("mj-column")).unwrap_err();
        assert!(matches!(err, CompileError::InvalidChild { .. }));
    }
}
