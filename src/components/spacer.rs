use std::fmt::Write;

use super::{defaults, AttributeRules, Component};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::{COLOR, PX_PERCENT, PX_PERCENT_MULTI, STRING};

pub struct Spacer;

impl Component for Spacer {
    fn name(&self) -> &'static str {
        "mj-spacer"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[
            ("border", STRING),
            ("border-bottom", STRING),
            ("border-left", STRING),
            ("border-right", STRING),
            ("border-top", STRING),
            ("container-background-color", COLOR),
            ("padding", PX_PERCENT_MULTI),
            ("padding-bottom", PX_PERCENT),
            ("padding-left", PX_PERCENT),
            ("padding-right", PX_PERCENT),
            ("padding-top", PX_PERCENT),
            ("height", PX_PERCENT),
            ("css-class", STRING),
        ]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        defaults(&[("height", "20px")])
    }

    fn render(
        &self,
        _ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()> {
        let height = tree[id].attribute_or_empty("height");
        let style = InlineStyle::new()
            .add("height", height)
            .add("line-height", height);
        write!(out, "<div{}>&#8202;</div>", HtmlAttributes::new().style(&style))?;
        Ok(())
    }
}
