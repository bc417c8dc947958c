use super::{AttributeRules, Component};
use crate::context::RenderContext;
use crate::error::CompileResult;
use crate::node::{NodeId, Tree};

/// Verbatim markup, emitted as written.
pub struct Raw;

impl Component for Raw {
    fn name(&self) -> &'static str {
        "mj-raw"
    }

    fn allowed_attributes(&self) -> AttributeRules {
        &[]
    }

    fn default_attributes(&self, _ctx: &RenderContext) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn render(
        &self,
        _ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()> {
        out.push_str(&tree[id].content);
        Ok(())
    }
}
