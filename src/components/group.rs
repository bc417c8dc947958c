use std::fmt::Write;

use super::{
    allowed_element, conditional, defaults, init_component, invalid_child, AttributeRules,
    Component, Element, END_CONDITIONAL, START_CONDITIONAL,
};
use crate::boxmodel::{
    column_class, parse_width, shorthand, width_as_pixel, Direction, MOBILE_WIDTH_MARKER,
};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{Node, NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{COLOR, DIRECTION, PX_PERCENT, STRING, VERTICAL_ALIGN};

const CHILDREN: &[Element] = &[Element::Column, Element::Raw];

/// Columns that stay side by side on mobile.
pub struct Group;

impl Component for Group {
    fn name(&self) -> &'static str {
        "mj-group"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("background-color", COLOR),
            ("direction", DIRECTION),
            ("vertical-align", VERTICAL_ALIGN),
            ("width", PX_PERCENT),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, ctx: &RenderContext) -> Vec<(&'static str, String)> {
        let mut attributes = defaults(&[]);
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
            .add("font-size", "0")
            .add("line-height", "0")
            .add("text-align", "left")
            .add("display", "inline-block")
            .add("width", "100%")
            .add("direction", node.attribute_or_empty("direction"))
            .add("vertical-align", node.attribute_or_empty("vertical-align"))
            .add("background-color", node.attribute_or_empty("background-color"));
        write!(
            out,
            "<div{}>",
            HtmlAttributes::new().add("class", classes).style(&div_style)
        )?;

        let table = HtmlAttributes::new()
            .add("bgcolor", node.attribute_or_empty("background-color"))
            .add("border", "0")
            .add("cellpadding", "0")
            .add("cellspacing", "0")
            .add("role", "presentation");
        out.push_str(&conditional(&format!("<table{}><tr>", table)));

        let width = child_container_width(&ctx.container_width, tree, id, &node)?;
        ctx.with_container_width(width, |ctx| render_columns(ctx, tree, id, &node, out))?;

        out.push_str(&conditional("</tr></table>"));
        out.push_str("</div>");
        Ok(())
    }
}

/// Pixel width shared by the grouped columns.
fn child_container_width(
    container: &str,
    tree: &Tree,
    id: NodeId,
    node: &Node,
) -> CompileResult<String> {
    let parent = parse_width(container)?.value;
    let paddings = shorthand(node, "padding", Direction::Left)?
        + shorthand(node, "padding", Direction::Right)?;

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
    Ok(format!("{}px", width - paddings))
}

fn render_columns(
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    node: &Node,
    out: &mut String,
) -> CompileResult<()> {
    for &child in &node.children {
        let Some(element) = allowed_element(tree, child, CHILDREN) else {
            return Err(invalid_child(tree, id, child, CHILDREN));
        };
        let component = element.component();
        if element == Element::Column {
            tree.get_mut(child)
                .set_attribute(MOBILE_WIDTH_MARKER, MOBILE_WIDTH_MARKER);
        }
        init_component(ctx, component, tree, child)?;
        if element == Element::Raw {
            component.render(ctx, tree, child, out)?;
            continue;
        }

        let cell_style = InlineStyle::new()
            .add("vertical-align", tree[child].attribute_or_empty("vertical-align"))
            .add("width", width_as_pixel(&ctx.container_width, tree, child)?);
        write!(
            out,
            "{}<td{}>{}",
            START_CONDITIONAL,
            HtmlAttributes::new().style(&cell_style),
            END_CONDITIONAL
        )?;
        component.render(ctx, tree, child, out)?;
        out.push_str(&conditional("</td>"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::render_element;
    use crate::options::CompileOptions;

    #[test]
    fn test_grouped_columns_keep_percentage_on_mobile() {
        let mut tree = Tree::new();
        let group = tree.create(Node::new("mj-group"));
        tree.set_root(group);
        for width in ["100px", "200px"] {
            let column = tree.create(Node::new("mj-column").with_attributes(&[("width", width)]));
            tree.append_child(group, column);
        }

        let mut ctx = RenderContext::new(&CompileOptions::default());
        ctx.container_width = "400px".into();
        let mut out = String::new();
        render_element(Element::Group, &mut ctx, &mut tree, group, &mut out).unwrap();

        assert!(out.contains(r#"class="mj-column-per-100 mj-outlook-group-fix""#));
        assert!(out.contains("width:25.00%;"));
        assert!(out.contains("width:50.00%;"));
        assert!(out.contains(r#"<td style="vertical-align:top;width:100px;">"#));
        assert!(ctx.column_styles.contains_key("mj-column-px-200"));
        assert_eq!(ctx.container_width, "400px");
    }
}
