use std::fmt::Write;

use super::{allowed_element, defaults, render_element, skip_child, AttributeRules, Component, Element};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::templates::{self, PREVIEW};
use crate::validator::{COLOR, PX, STRING};

const CHILDREN: &[Element] = &[Element::Raw, Element::Section, Element::Wrapper, Element::Hero];

pub struct Body;

impl Component for Body {
    fn name(&self) -> &'static str {
        "mj-body"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("background-color", COLOR),
            ("width", PX),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[("width", "600px")])
    }

    fn render(
        &self,
        ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()> {
        let node = tree[id].clone();
        let background = node.attribute_or_empty("background-color");

        let body_style = InlineStyle::new()
            .add("word-spacing", "normal")
            .add("background-color", background);
        write!(out, "<body{}>", HtmlAttributes::new().style(&body_style))?;

        if !ctx.head.preview.is_empty() {
            let preview = ctx.head.preview.as_str();
            out.push_str(&templates::render(PREVIEW, &[("preview", preview)])?);
        }

        let wrapper = HtmlAttributes::new()
            .add("lang", ctx.language.clone())
            .add("dir", ctx.direction.clone())
            .add("class", node.attribute_or_empty("css-class"))
            .style(&InlineStyle::new().add("background-color", background));
        write!(out, "<div{}>", wrapper)?;

        ctx.with_container_width(node.attribute_or_empty("width"), |ctx| -> CompileResult<()> {
            for &child in &node.children {
                match allowed_element(tree, child, CHILDREN) {
                    Some(element) => render_element(element, ctx, tree, child, out)?,
                    None => skip_child(tree, id, child),
                }
            }
            Ok(())
        })?;

        out.push_str("</div></body>");
        Ok(())
    }
}
