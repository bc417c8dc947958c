//! Stylesheet model for `mj-style` blocks, plus the declaration splitter shared with the
//! inliner's `style` attribute handling.

use std::fmt;

use cssparser::{Delimiter, ParseError, Parser, ParserInput, Token};

use crate::error::{CompileError, CompileResult};

/// A single `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub property: String,
    pub value: String,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Style>,
}

/// A media block; `condition` keeps the full prelude, e.g. `@media (max-width:480px)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRule {
    pub condition: String,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
    pub media_rules: Vec<MediaRule>,
}

impl Style {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important: false,
        }
    }

    /// Parse `prop: value [!important]`. Returns `None` when the property or value is missing.
    pub fn parse(declaration: &str) -> Option<Self> {
        let (property, value) = declaration.split_once(':')?;
        let property = property.trim();
        let mut value = value.trim();
        let mut important = false;

        if let Some(bang) = value.rfind('!') {
            if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
                value = value[..bang].trim_end();
                important = true;
            }
        }

        if property.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self {
            property: property.to_string(),
            value: value.to_string(),
            important,
        })
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.selector)?;
        for declaration in &self.declarations {
            write!(f, " {};", declaration)?;
        }
        f.write_str(" }")
    }
}

impl fmt::Display for MediaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.condition)?;
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        f.write_str("}")
    }
}

impl Stylesheet {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.media_rules.is_empty()
    }
}

/// Parse a stylesheet into plain rules and media blocks.
///
/// Other at-rules (`@import`, `@font-face`, ...) are dropped.
pub fn parse_stylesheet(css: &str) -> CompileResult<Stylesheet> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut sheet = Stylesheet::default();

    let mut raw_rules = Vec::new();
    parse_rule_list(&mut parser, &mut raw_rules, true).map_err(|err| CompileError::Css {
        message: format!("{:?} at line {}", err.kind, err.location.line + 1),
    })?;

    for raw in raw_rules {
        match raw {
            RawRule::Style { selector, body } => sheet.rules.push(Rule {
                selector,
                declarations: declarations_from(&body)?,
            }),
            RawRule::Media { condition, rules } => {
                let mut media = MediaRule {
                    condition,
                    rules: Vec::new(),
                };
                for nested in rules {
                    if let RawRule::Style { selector, body } = nested {
                        media.rules.push(Rule {
                            selector,
                            declarations: declarations_from(&body)?,
                        });
                    }
                }
                sheet.media_rules.push(media);
            }
        }
    }

    Ok(sheet)
}

/// Parse the content of a `style` attribute.
///
/// A declaration without a property or a value is an error.
pub fn parse_inline_style(style: &str) -> CompileResult<Vec<Style>> {
    split_declarations(style)
        .into_iter()
        .map(|declaration| {
            Style::parse(&declaration).ok_or(CompileError::InvalidInlineStyle { declaration })
        })
        .collect()
}

fn declarations_from(body: &str) -> CompileResult<Vec<Style>> {
    split_declarations(body)
        .into_iter()
        .map(|declaration| {
            Style::parse(&declaration).ok_or_else(|| CompileError::Css {
                message: format!("invalid declaration '{}'", declaration),
            })
        })
        .collect()
}

enum RawRule {
    Style { selector: String, body: String },
    Media { condition: String, rules: Vec<RawRule> },
}

fn consume_all<'i, 't>(parser: &mut Parser<'i, 't>) -> Result<(), ParseError<'i, ()>> {
    while parser.next().is_ok() {}
    Ok(())
}

fn parse_rule_list<'i, 't>(
    parser: &mut Parser<'i, 't>,
    rules: &mut Vec<RawRule>,
    allow_media: bool,
) -> Result<(), ParseError<'i, ()>> {
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            return Ok(());
        }

        let start = parser.position();
        parser.parse_until_before(
            Delimiter::CurlyBracketBlock | Delimiter::Semicolon,
            consume_all,
        )?;
        let prelude = parser.slice_from(start).trim().to_string();

        let has_block = match parser.next() {
            Ok(Token::CurlyBracketBlock) => true,
            Ok(_) => false,
            Err(_) => return Ok(()),
        };
        if !has_block {
            continue;
        }

        if prelude.starts_with('@') {
            if allow_media && prelude.starts_with("@media") {
                let nested = parser.parse_nested_block(
                    |block| -> Result<Vec<RawRule>, ParseError<'i, ()>> {
                        let mut nested = Vec::new();
                        parse_rule_list(block, &mut nested, false)?;
                        Ok(nested)
                    },
                )?;
                rules.push(RawRule::Media {
                    condition: prelude,
                    rules: nested,
                });
            } else {
                parser.parse_nested_block(consume_all)?;
            }
            continue;
        }

        let body = parser.parse_nested_block(|block| -> Result<String, ParseError<'i, ()>> {
            let start = block.position();
            consume_all(block)?;
            Ok(block.slice_from(start).to_string())
        })?;
        rules.push(RawRule::Style {
            selector: prelude,
            body,
        });
    }
}

/// Split a declaration list on top-level semicolons, keeping parenthesized and quoted
/// values intact.
fn split_declarations(body: &str) -> Vec<String> {
    let mut input = ParserInput::new(body);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }
        let start = parser.position();
        if parser
            .parse_until_after(Delimiter::Semicolon, consume_all)
            .is_err()
        {
            break;
        }
        let declaration = parser.slice_from(start).trim().trim_end_matches(';').trim();
        if !declaration.is_empty() {
            declarations.push(declaration.to_string());
        }
    }

    declarations
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_rules_and_important() {
        let sheet = parse_stylesheet(
            ".red { color: red !important; font-size: 12px }\n/* note */\np a { background: url(data:x;y) }",
        )
        .unwrap();

        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].selector, ".red");
        assert_eq!(
            sheet.rules[0].declarations,
            vec![
                Style {
                    property: "color".into(),
                    value: "red".into(),
                    important: true
                },
                Style::new("font-size", "12px"),
            ]
        );
        assert_eq!(sheet.rules[1].selector, "p a");
        assert_eq!(
            sheet.rules[1].declarations,
            vec![Style::new("background", "url(data:x;y)")]
        );
    }

    #[test]
    fn test_parse_media_rules() {
        let sheet = parse_stylesheet(
            "@import url(foo.css);\n@media (max-width:480px) { .a { width: 100% } .b { color: blue } }",
        )
        .unwrap();

        assert!(sheet.rules.is_empty());
        assert_eq!(sheet.media_rules.len(), 1);
        let media = &sheet.media_rules[0];
        assert_eq!(media.condition, "@media (max-width:480px)");
        assert_eq!(media.rules.len(), 2);
        assert_eq!(
            media.to_string(),
            "@media (max-width:480px) {\n.a { width: 100%; }\n.b { color: blue; }\n}"
        );
    }

    #[test]
    fn test_invalid_declaration_in_stylesheet() {
        let err = parse_stylesheet(".a { nocolon }").unwrap_err();
        assert!(matches!(err, CompileError::Css { .. }));
    }

    #[test]
    fn test_parse_inline_style() {
        let styles = parse_inline_style("width:100%; color : red ;").unwrap();
        assert_eq!(
            styles,
            vec![Style::new("width", "100%"), Style::new("color", "red")]
        );

        assert_eq!(
            parse_inline_style("width:100%;broken").unwrap_err(),
            CompileError::InvalidInlineStyle {
                declaration: "broken".into()
            }
        );
        assert!(parse_inline_style("color:;").is_err());
    }
}
