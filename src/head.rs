//! `mj-head` handling: declarations are collected into the render context before the body
//! renders, and the `<head>` markup is produced afterwards from what the body used.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::components::RAW_TAG;
use crate::context::RenderContext;
use crate::css::parse_stylesheet;
use crate::error::CompileResult;
use crate::node::{Node, NodeId, Tree};
use crate::templates::{self, FONTS, HEAD, MEDIA_QUERIES, MOBILE_FULL_WIDTH, USER_STYLES};

const ATTRIBUTES_TAG: &str = "mj-attributes";
const ALL_TAG: &str = "mj-all";
const CLASS_TAG: &str = "mj-class";

fn font_family_regex() -> &'static Regex {
    static FONT_FAMILY_REGEX: OnceLock<Regex> = OnceLock::new();
    FONT_FAMILY_REGEX.get_or_init(|| Regex::new(r#"font-family:([^;"]+)"#).unwrap())
}

/// Record every head declaration on `ctx`.
pub fn collect_head(ctx: &mut RenderContext, tree: &Tree, head: NodeId) -> CompileResult<()> {
    for &child in tree.children(head) {
        let node = &tree[child];
        match node.tag.as_str() {
            ATTRIBUTES_TAG => collect_attributes(ctx, tree, child),
            "mj-breakpoint" => {
                if let Some(width) = node.attribute("width") {
                    ctx.breakpoint = width.to_string();
                }
            }
            "mj-font" => {
                if let (Some(name), Some(href)) = (node.attribute("name"), node.attribute("href")) {
                    ctx.fonts.insert(name.to_string(), href.to_string());
                }
            }
            "mj-title" => ctx.head.title = node.content.clone(),
            "mj-preview" => ctx.head.preview = node.content.clone(),
            "mj-style" => {
                if node.attribute("inline") == Some("inline") {
                    let sheet = parse_stylesheet(&node.content)?;
                    for media in &sheet.media_rules {
                        ctx.head.user_styles.push(media.to_string());
                    }
                    ctx.inline_styles.push(sheet);
                } else {
                    ctx.head.user_styles.push(node.content.clone());
                }
            }
            RAW_TAG => ctx.head.raw.push(node.content.clone()),
            tag => warn!(tag, "ignoring unsupported head element"),
        }
    }

    debug!(
        inline_stylesheets = ctx.inline_styles.len(),
        user_styles = ctx.head.user_styles.len(),
        "collected head"
    );
    Ok(())
}

fn collect_attributes(ctx: &mut RenderContext, tree: &Tree, id: NodeId) {
    for &child in tree.children(id) {
        let node = &tree[child];
        match node.tag.as_str() {
            ALL_TAG => merge(&mut ctx.head.all_attributes, node, None),
            CLASS_TAG => {
                let Some(name) = node.attribute("name") else {
                    warn!("ignoring mj-class without a name");
                    continue;
                };
                let entry = ctx.head.class_attributes.entry(name.to_string()).or_default();
                merge(entry, node, Some("name"));
            }
            tag => {
                let entry = ctx.head.tag_attributes.entry(tag.to_string()).or_default();
                merge(entry, node, None);
            }
        }
    }
}

/// Later declarations replace earlier ones.
fn merge(target: &mut Vec<(String, String)>, node: &Node, skip: Option<&str>) {
    for (name, value) in &node.attributes {
        if Some(name.as_str()) == skip {
            continue;
        }
        match target.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value.clone(),
            None => target.push((name.clone(), value.clone())),
        }
    }
}

/// Write `<head>…</head>` for a rendered body.
pub fn render_head(ctx: &RenderContext, body: &str, out: &mut String) -> CompileResult<()> {
    out.push_str("<head>");
    write!(out, "<title>{}</title>", ctx.head.title)?;
    for raw in &ctx.head.raw {
        out.push_str(raw);
    }
    out.push_str(&templates::render(HEAD, &[])?);

    let fonts = used_fonts(ctx, body);
    if !fonts.is_empty() {
        let mut links = String::new();
        let mut imports = String::new();
        for href in &fonts {
            writeln!(links, r#"<link href="{}" rel="stylesheet" type="text/css">"#, href)?;
            writeln!(imports, "@import url({});", href)?;
        }
        out.push_str(&templates::render(
            FONTS,
            &[("links", links.as_str()), ("imports", imports.as_str())],
        )?);
    }

    if !ctx.column_styles.is_empty() {
        let mut column_rules = String::new();
        let mut moz_rules = String::new();
        for (class, declarations) in &ctx.column_styles {
            let rule = declarations.join("; ");
            writeln!(column_rules, ".{} {{ {}; }}", class, rule)?;
            writeln!(moz_rules, ".moz-text-html .{} {{ {}; }}", class, rule)?;
        }
        out.push_str(&templates::render(
            MEDIA_QUERIES,
            &[
                ("breakpoint", ctx.breakpoint.as_str()),
                ("column_rules", column_rules.as_str()),
                ("moz_rules", moz_rules.as_str()),
            ],
        )?);
    }

    if ctx.mobile_full_width {
        let lower = ctx.lower_breakpoint()?;
        out.push_str(&templates::render(
            MOBILE_FULL_WIDTH,
            &[("lower_breakpoint", lower.as_str())],
        )?);
    }

    if !ctx.head.user_styles.is_empty() {
        let styles = ctx.head.user_styles.join("\n");
        out.push_str(&templates::render(USER_STYLES, &[("styles", styles.as_str())])?);
    }

    out.push_str("</head>");
    Ok(())
}

/// Hrefs of registered fonts named in a `font-family` declaration of `body`.
fn used_fonts<'a>(ctx: &'a RenderContext, body: &str) -> BTreeSet<&'a str> {
    let mut families = BTreeSet::new();
    for caps in font_family_regex().captures_iter(body) {
        for family in caps[1].split(',') {
            families.insert(family.trim().trim_matches(|c: char| c == '\'' || c == '"').to_string());
        }
    }
    ctx.fonts
        .iter()
        .filter(|(name, _)| families.contains(name.as_str()))
        .map(|(_, href)| href.as_str())
        .collect()
}
