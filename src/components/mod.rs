//! Body elements.
//!
//! Every element implements [`Component`]: a name, the attributes it validates, the
//! defaults it fills in and a render operation. [`Element`] is the closed set of kinds a
//! container can dispatch to; each container lists the kinds it accepts as children.

mod body;
mod button;
mod column;
mod divider;
mod group;
mod hero;
mod image;
mod raw;
mod section;
mod social;
mod spacer;
mod table;
mod text;
mod wrapper;

use std::fmt::Write;

use tracing::warn;

use crate::context::RenderContext;
use crate::error::{CompileError, CompileResult};
use crate::node::{Node, NodeId, Tree};
use crate::style::{HtmlAttributes, InlineStyle};
use crate::validator::Validator;

pub const MJML_TAG: &str = "mjml";
pub const HEAD_TAG: &str = "mj-head";
pub const BODY_TAG: &str = "mj-body";
pub const RAW_TAG: &str = "mj-raw";

pub(crate) const START_CONDITIONAL: &str = "<!--[if mso | IE]>";
pub(crate) const END_CONDITIONAL: &str = "<![endif]-->";
pub(crate) const START_NEGATION_CONDITIONAL: &str = "<!--[if !mso | IE]><!-->";
pub(crate) const END_NEGATION_CONDITIONAL: &str = "<!--<![endif]-->";

pub(crate) const DEFAULT_FONT_FAMILY: &str = "Ubuntu, Helvetica, Arial, sans-serif";

pub type AttributeRules = &'static [(&'static str, Validator)];

/// Contract shared by every body element.
pub trait Component: Sync {
    /// Tag name, used in diagnostics.
    fn name(&self) -> &'static str;

    fn allowed_attributes(&self) -> AttributeRules;

    fn default_attributes(&self, ctx: &RenderContext) -> Vec<(&'static str, String)>;

    /// Append the element's HTML to `out`. Attributes are initialized by then.
    fn render(
        &self,
        ctx: &mut RenderContext,
        tree: &mut Tree,
        id: NodeId,
        out: &mut String,
    ) -> CompileResult<()>;
}

/// Fill in inherited and default attributes, then validate the allowed ones.
///
/// Explicit attributes always win. Below them, in order: `mj-class` entries (a later class
/// in the list beats an earlier one), per-tag `mj-attributes`, `mj-all`, component defaults.
pub fn init_component(
    ctx: &RenderContext,
    component: &dyn Component,
    tree: &mut Tree,
    id: NodeId,
) -> CompileResult<()> {
    let node = tree.get_mut(id);

    let classes: Vec<String> = node
        .attribute_or_empty("mj-class")
        .split_whitespace()
        .map(str::to_string)
        .collect();
    for class in classes.iter().rev() {
        if let Some(attributes) = ctx.head.class_attributes.get(class) {
            set_missing(node, attributes);
        }
    }
    if let Some(attributes) = ctx.head.tag_attributes.get(&node.tag) {
        set_missing(node, attributes);
    }
    set_missing(node, &ctx.head.all_attributes);
    for (name, value) in component.default_attributes(ctx) {
        if !node.has_attribute(name) {
            node.set_attribute(name, value);
        }
    }

    for (field, validator) in component.allowed_attributes() {
        validator
            .validate(node.attribute_or_empty(field))
            .map_err(|reason| CompileError::Validation {
                component: component.name().to_string(),
                field: field.to_string(),
                reason,
            })?;
    }
    Ok(())
}

fn set_missing(node: &mut Node, attributes: &[(String, String)]) {
    for (name, value) in attributes {
        if !node.has_attribute(name) {
            node.set_attribute(name, value.clone());
        }
    }
}

/// Default attribute list from literal pairs.
pub(crate) fn defaults(pairs: &[(&'static str, &str)]) -> Vec<(&'static str, String)> {
    pairs
        .iter()
        .map(|(name, value)| (*name, value.to_string()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Body,
    Raw,
    Section,
    Wrapper,
    Column,
    Group,
    Hero,
    Button,
    Image,
    Text,
    Divider,
    Spacer,
    Table,
    Social,
    SocialElement,
}

impl Element {
    pub const ALL: [Element; 15] = [
        Element::Body,
        Element::Raw,
        Element::Section,
        Element::Wrapper,
        Element::Column,
        Element::Group,
        Element::Hero,
        Element::Button,
        Element::Image,
        Element::Text,
        Element::Divider,
        Element::Spacer,
        Element::Table,
        Element::Social,
        Element::SocialElement,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|element| element.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            Element::Body => BODY_TAG,
            Element::Raw => RAW_TAG,
            Element::Section => "mj-section",
            Element::Wrapper => "mj-wrapper",
            Element::Column => "mj-column",
            Element::Group => "mj-group",
            Element::Hero => "mj-hero",
            Element::Button => "mj-button",
            Element::Image => "mj-image",
            Element::Text => "mj-text",
            Element::Divider => "mj-divider",
            Element::Spacer => "mj-spacer",
            Element::Table => "mj-table",
            Element::Social => "mj-social",
            Element::SocialElement => "mj-social-element",
        }
    }

    pub fn component(self) -> &'static dyn Component {
        match self {
            Element::Body => &body::Body,
            Element::Raw => &raw::Raw,
            Element::Section => &section::Section,
            Element::Wrapper => &wrapper::Wrapper,
            Element::Column => &column::Column,
            Element::Group => &group::Group,
            Element::Hero => &hero::Hero,
            Element::Button => &button::Button,
            Element::Image => &image::Image,
            Element::Text => &text::Text,
            Element::Divider => &divider::Divider,
            Element::Spacer => &spacer::Spacer,
            Element::Table => &table::Table,
            Element::Social => &social::Social,
            Element::SocialElement => &social::SocialElement,
        }
    }
}

/// Initialize then render one element.
pub fn render_element(
    element: Element,
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    out: &mut String,
) -> CompileResult<()> {
    let component = element.component();
    init_component(ctx, component, tree, id)?;
    component.render(ctx, tree, id, out)
}

/// Kind of `child` if it is one of `allowed`.
pub(crate) fn allowed_element(tree: &Tree, child: NodeId, allowed: &[Element]) -> Option<Element> {
    Element::from_tag(tree.tag(child)).filter(|element| allowed.contains(element))
}

pub(crate) fn invalid_child(
    tree: &Tree,
    parent: NodeId,
    child: NodeId,
    allowed: &[Element],
) -> CompileError {
    CompileError::InvalidChild {
        parent: tree.tag(parent).to_string(),
        child: tree.tag(child).to_string(),
        allowed: allowed
            .iter()
            .map(|element| element.tag())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

pub(crate) fn skip_child(tree: &Tree, parent: NodeId, child: NodeId) {
    warn!(
        parent = tree.tag(parent),
        child = tree.tag(child),
        "ignoring unsupported child element"
    );
}

/// Wrap `content` so only Outlook sees it.
pub(crate) fn conditional(content: &str) -> String {
    format!("{}{}{}", START_CONDITIONAL, content, END_CONDITIONAL)
}

/// Render a content element in its own table row; raw content goes out unwrapped.
///
/// The cell carries the element's padding and container background.
pub(crate) fn render_content_row(
    element: Element,
    ctx: &mut RenderContext,
    tree: &mut Tree,
    id: NodeId,
    out: &mut String,
) -> CompileResult<()> {
    let component = element.component();
    init_component(ctx, component, tree, id)?;
    if element == Element::Raw {
        return component.render(ctx, tree, id, out);
    }

    let node = &tree[id];
    let background = node.attribute_or_empty("container-background-color");
    let cell = HtmlAttributes::new()
        .add("align", node.attribute_or_empty("align"))
        .add("background", background)
        .add("class", node.attribute_or_empty("css-class"))
        .style(
            &InlineStyle::new()
                .add("background", background)
                .add("font-size", "0px")
                .add("padding", node.attribute_or_empty("padding"))
                .add("padding-top", node.attribute_or_empty("padding-top"))
                .add("padding-right", node.attribute_or_empty("padding-right"))
                .add("padding-bottom", node.attribute_or_empty("padding-bottom"))
                .add("padding-left", node.attribute_or_empty("padding-left"))
                .add("word-break", "break-word"),
        );
    write!(out, "<tr><td{}>", cell)?;
    component.render(ctx, tree, id, out)?;
    out.push_str("</td></tr>");
    Ok(())
}
