use std::fmt::Write;

use super::section::{render_section, section_defaults, SECTION_ATTRIBUTES};
use super::{
    allowed_element, conditional, init_component, skip_child, AttributeRules, Component, Element,
    END_CONDITIONAL, START_CONDITIONAL,
};
use crate::boxmodel::suffix_classes;
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{NodeId, Tree};
use crate::style::HtmlAttributes;

const CHILDREN: &[Element] = &[Element::Section, Element::Hero, Element::Raw];

/// A section whose children are whole sections, one Outlook row each.
pub struct Wrapper;

impl Component for Wrapper {
    fn name(&self) -> &'static str {
        "mj-wrapper"
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
        render_section(ctx, tree, id, out, render_rows)
    }
}

fn render_rows(
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    out: &mut String,
) -> CompileResult<()> {
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
            .add("align", node.attribute_or_empty("align"))
            .add("class", suffix_classes(node.attribute_or_empty("css-class"), "outlook"))
            .add("width", ctx.container_width.clone());
        write!(out, "{}<tr><td{}>{}", START_CONDITIONAL, cell, END_CONDITIONAL)?;
        component.render(ctx, tree, child, out)?;
        out.push_str(&conditional("</td></tr>"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::render_element;
    use crate::node::Node;
    use crate::options::CompileOptions;

    #[test]
    fn test_nested_sections_measure_against_wrapper_box() {
        let mut tree = Tree::new();
        let wrapper = tree.create(Node::new("mj-wrapper").with_attributes(&[("padding", "0 50px")]));
        tree.set_root(wrapper);
        let section = tree.create(Node::new("mj-section").with_attributes(&[("padding", "0")]));
        tree.append_child(wrapper, section);
        let column = tree.create(Node::new("mj-column"));
        tree.append_child(section, column);

        let mut ctx = RenderContext::new(&CompileOptions::default());
        let mut out = String::new();
        render_element(Element::Wrapper, &mut ctx, &mut tree, wrapper, &mut out).unwrap();

        assert!(out.contains(r#"<!--[if mso | IE]><tr><td width="500px"><![endif]-->"#));
        assert!(out.contains(r#"style="width:500px;" width="500""#));
        assert!(out.contains(r#"<td style="vertical-align:top;width:500px;">"#));
        assert_eq!(ctx.container_width, "600px");
    }
}
