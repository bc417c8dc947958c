//! Applies `mj-style inline="inline"` rules to the rendered document.

use std::sync::OnceLock;

use kuchiki::traits::TendrilSink;
use kuchiki::{Attributes, ElementData, NodeDataRef};
use regex::Regex;
use tracing::{debug, warn};

use crate::css::{parse_inline_style, Rule, Style, Stylesheet};
use crate::error::{CompileError, CompileResult};

/// Elements that also get a legacy `width` attribute.
const WIDTH_ELEMENTS: &[&str] = &["table", "td", "div"];

/// Style properties mirrored onto presentational attributes, as (property, attribute).
const LEGACY_ATTRIBUTES: &[(&str, &str)] = &[
    ("text-align", "align"),
    ("vertical-align", "valign"),
    ("background-color", "bgcolor"),
];

fn conditional_boundary_regex() -> &'static Regex {
    static BOUNDARY_REGEX: OnceLock<Regex> = OnceLock::new();
    BOUNDARY_REGEX.get_or_init(|| Regex::new(r"<!\[endif\]-->\s*<!--\[if mso \| IE\]>").unwrap())
}

/// Merge every rule of `sheets` into the `style` attribute of the elements it selects.
///
/// `!important` declarations replace existing values unless those are `!important`
/// themselves; others only fill in missing properties. Priorities are kept on write-back. A selector that does not parse drops its rule with a warning.
pub fn inline_css(html: &str, sheets: &[Stylesheet]) -> CompileResult<String> {
    if sheets.iter().all(|sheet| sheet.rules.is_empty()) {
        return Ok(html.to_string());
    }

    let document = kuchiki::parse_html().one(html);
    let mut matched = 0usize;

    for rule in sheets.iter().flat_map(|sheet| &sheet.rules) {
        let Ok(selection) = document.select(&rule.selector) else {
            warn!(selector = %rule.selector, "skipping rule with unparsable selector");
            continue;
        };
        let elements: Vec<NodeDataRef<ElementData>> = selection.collect();
        for element in &elements {
            apply_rule(element, rule)?;
        }
        matched += elements.len();
    }

    let mut bytes = Vec::new();
    document.serialize(&mut bytes)?;
    let inlined = String::from_utf8(bytes).map_err(|err| CompileError::Serialize(err.to_string()))?;

    debug!(matched, "inlined css");
    Ok(inlined)
}

/// Remove back-to-back Outlook conditional boundaries left by nested wrapping.
pub fn collapse_conditionals(html: &str) -> String {
    conditional_boundary_regex().replace_all(html, "").into_owned()
}

fn apply_rule(element: &NodeDataRef<ElementData>, rule: &Rule) -> CompileResult<()> {
    let mut attributes = element.attributes.borrow_mut();
    let mut styles = parse_inline_style(attributes.get("style").unwrap_or(""))?;

    for declaration in &rule.declarations {
        match styles
            .iter_mut()
            .find(|style| style.property == declaration.property)
        {
            Some(existing) if declaration.important && !existing.important => {
                existing.value = declaration.value.clone();
                existing.important = true;
            }
            Some(_) => {}
            None => styles.push(declaration.clone()),
        }
    }

    if WIDTH_ELEMENTS.contains(&&*element.name.local) {
        if let Some(width) = style_value(&styles, "width") {
            let width = width.strip_suffix("px").unwrap_or(width).to_string();
            set_missing(&mut attributes, "width", width);
        }
    }
    for (property, attribute) in LEGACY_ATTRIBUTES {
        if let Some(value) = style_value(&styles, property) {
            let value = value.to_string();
            set_missing(&mut attributes, attribute, value);
        }
    }

    let style: String = styles
        .iter()
        .map(|style| {
            let priority = if style.important { " !important" } else { "" };
            format!("{}:{}{};", style.property, style.value, priority)
        })
        .collect();
    attributes.insert("style", style);
    Ok(())
}

fn style_value<'a>(styles: &'a [Style], property: &str) -> Option<&'a str> {
    styles
        .iter()
        .find(|style| style.property == property)
        .map(|style| style.value.as_str())
}

fn set_missing(attributes: &mut Attributes, name: &str, value: String) {
    if !attributes.contains(name) {
        attributes.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse_stylesheet;
    use pretty_assertions::assert_eq;

    fn inline(html: &str, css: &str) -> String {
        inline_css(html, &[parse_stylesheet(css).unwrap()]).unwrap()
    }

    #[test]
    fn test_existing_inline_style_wins_over_plain_rule() {
        let html = inline(
            r#"<p class="a" style="color:blue;">x</p>"#,
            ".a { color: red; font-size: 12px; }",
        );
        assert!(html.contains(r#"style="color:blue;font-size:12px;""#));
    }

    #[test]
    fn test_important_rule_overwrites() {
        let html = inline(
            r#"<p class="a" style="color:blue;">x</p>"#,
            ".a { color: red !important; }",
        );
        assert!(html.contains(r#"style="color:red !important;""#));
    }

    #[test]
    fn test_inline_important_survives_rule_merge() {
        let html = inline(
            r#"<p class="x" style="color:red !important">x</p>"#,
            ".x { margin: 0; color: blue !important; }",
        );
        assert!(html.contains(r#"style="color:red !important;margin:0;""#));
    }

    #[test]
    fn test_legacy_attributes() {
        let html = inline(
            r#"<table class="t"><tbody><tr><td class="c" align="left">x</td></tr></tbody></table>"#,
            ".t { width: 300px; background-color: #fff; } .c { text-align: center; vertical-align: top; width: 50%; }",
        );
        assert!(html.contains(r##"bgcolor="#fff""##));
        assert!(html.contains(r#"width="300""#));
        assert!(html.contains(r#"align="left""#));
        assert!(!html.contains(r#"align="center""#));
        assert!(html.contains(r#"valign="top""#));
        assert!(html.contains(r#"width="50%""#));
    }

    #[test]
    fn test_bad_selector_is_skipped() {
        let html = inline(
            r#"<p class="a">x</p>"#,
            ".a:::nope { color: red; } .a { margin: 0; }",
        );
        assert!(html.contains(r#"style="margin:0;""#));
        assert!(!html.contains("color:red"));
    }

    #[test]
    fn test_malformed_style_attribute_fails() {
        let err = inline_css(
            r#"<p class="a" style="color">x</p>"#,
            &[parse_stylesheet(".a { margin: 0; }").unwrap()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidInlineStyle {
                declaration: "color".to_string()
            }
        );
    }

    #[test]
    fn test_no_rules_leaves_markup_untouched() {
        let html = "<!doctype html><p>x</p>";
        assert_eq!(inline_css(html, &[Stylesheet::default()]).unwrap(), html);
    }

    #[test]
    fn test_collapse_conditionals() {
        assert_eq!(
            collapse_conditionals("<!--[if mso | IE]><td><![endif]-->\n<!--[if mso | IE]></td><![endif]-->"),
            "<!--[if mso | IE]><td></td><![endif]-->"
        );
    }
}
