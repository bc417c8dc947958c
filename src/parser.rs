use std::borrow::Cow;
use std::sync::OnceLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::{Captures, Regex};
use tracing::debug;

use crate::components::{HEAD_TAG, RAW_TAG};
use crate::error::{CompileError, CompileResult};
use crate::node::{Node, NodeId, Tree};

/// Prefix of the comment that stands in for an extracted raw block.
const RAW_PLACEHOLDER_PREFIX: &str = "mj-raw-placeholder:";

/// Tags whose inner markup is captured verbatim as content instead of being parsed into children.
const LEAF_TAGS: &[&str] = &[
    "mj-text",
    "mj-button",
    "mj-table",
    "mj-navbar-link",
    "mj-accordion-text",
    "mj-accordion-title",
    "mj-social-element",
];

fn raw_block_regex() -> &'static Regex {
    static RAW_BLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
    RAW_BLOCK_REGEX
        .get_or_init(|| Regex::new(r"(?s)<mj-raw(?:\s[^>]*)?>(.*?)</mj-raw\s*>").unwrap())
}

pub fn is_leaf_tag(tag: &str) -> bool {
    LEAF_TAGS.contains(&tag)
}

/// Parse markup into a node tree.
///
/// Every root ends up with an `mj-head` child; an empty one is inserted first when absent.
pub fn parse(markup: &str) -> CompileResult<Tree> {
    let mut tree = parse_tree(markup)?;
    ensure_head(&mut tree);
    Ok(tree)
}

/// Parse markup without the head post-processing.
pub(crate) fn parse_tree(markup: &str) -> CompileResult<Tree> {
    let (substituted, raw_blocks) = extract_raw_blocks(markup);

    let mut reader = Reader::from_str(&substituted);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;

    let mut tree = Tree::new();
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let node = start_node(&start);
                let is_leaf = is_leaf_tag(&node.tag);
                let id = attach(&mut tree, &stack, node);
                if is_leaf {
                    let content = read_leaf_content(&mut reader, &tree[id].tag, &raw_blocks)?;
                    tree.get_mut(id).content = content;
                } else {
                    stack.push(id);
                }
            }
            Event::Empty(start) => {
                let node = start_node(&start);
                attach(&mut tree, &stack, node);
            }
            Event::Text(text) => {
                if let Some(&top) = stack.last() {
                    let decoded = match text.unescape() {
                        Ok(value) => value,
                        Err(_) => lossy(&text),
                    };
                    tree.get_mut(top).content.push_str(decoded.trim());
                }
            }
            Event::CData(data) => {
                if let Some(&top) = stack.last() {
                    tree.get_mut(top).content.push_str(lossy(&data).trim());
                }
            }
            Event::Comment(comment) => {
                let comment = lossy(&comment);
                let Some(raw) = resolve_placeholder(&comment, &raw_blocks) else {
                    continue;
                };
                if let Some(&top) = stack.last() {
                    let id = tree.create(Node::new(RAW_TAG).with_content(raw));
                    tree.append_child(top, id);
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if tree.root().is_none() {
        return Err(CompileError::EmptyDocument);
    }

    debug!(nodes = tree.len(), raw_blocks = raw_blocks.len(), "parsed markup");
    Ok(tree)
}

/// Replace each raw block with an indexed placeholder comment, returning the extracted bodies in order.
fn extract_raw_blocks(markup: &str) -> (String, Vec<String>) {
    let mut blocks = Vec::new();
    let substituted = raw_block_regex().replace_all(markup, |caps: &Captures| {
        blocks.push(caps[1].to_string());
        format!("<!--{}{}-->", RAW_PLACEHOLDER_PREFIX, blocks.len() - 1)
    });
    (substituted.into_owned(), blocks)
}

/// Original raw text for a placeholder comment, or `None` for ordinary comments and unknown indices.
fn resolve_placeholder<'a>(comment: &str, raw_blocks: &'a [String]) -> Option<&'a str> {
    let index = comment.strip_prefix(RAW_PLACEHOLDER_PREFIX)?;
    let index: usize = index.trim().parse().ok()?;
    raw_blocks.get(index).map(String::as_str)
}

fn start_node(start: &BytesStart) -> Node {
    let mut node = Node::new(String::from_utf8_lossy(start.local_name().as_ref()));
    for attribute in start.html_attributes().with_checks(false).flatten() {
        let name = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = match attribute.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attribute.value).into_owned(),
        };
        // Duplicates keep the first occurrence.
        if !node.has_attribute(&name) {
            node.attributes.push((name, value));
        }
    }
    node
}

fn attach(tree: &mut Tree, stack: &[NodeId], node: Node) -> NodeId {
    let id = tree.create(node);
    match stack.last() {
        Some(&parent) => tree.append_child(parent, id),
        None => {
            if tree.root().is_none() {
                tree.set_root(id);
            }
        }
    }
    id
}

/// Re-serialize every token up to the end tag closing `tag`, tracking nested tags of the same name.
fn read_leaf_content(
    reader: &mut Reader<&[u8]>,
    tag: &str,
    raw_blocks: &[String],
) -> CompileResult<String> {
    let mut content = String::new();
    let mut depth = 1usize;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if start.local_name().as_ref() == tag.as_bytes() {
                    depth += 1;
                }
                content.push('<');
                content.push_str(&lossy(&start));
                content.push('>');
            }
            Event::Empty(start) => {
                content.push('<');
                content.push_str(&lossy(&start));
                content.push_str("/>");
            }
            Event::End(end) => {
                if end.local_name().as_ref() == tag.as_bytes() {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(content);
                    }
                }
                content.push_str("</");
                content.push_str(&lossy(&end));
                content.push('>');
            }
            Event::Text(text) => content.push_str(&lossy(&text)),
            Event::CData(data) => {
                content.push_str("<![CDATA[");
                content.push_str(&lossy(&data));
                content.push_str("]]>");
            }
            Event::Comment(comment) => {
                let comment = lossy(&comment);
                match resolve_placeholder(&comment, raw_blocks) {
                    Some(raw) => content.push_str(raw),
                    None => {
                        content.push_str("<!--");
                        content.push_str(&comment);
                        content.push_str("-->");
                    }
                }
            }
            Event::Eof => {
                return Err(CompileError::Parse {
                    message: format!("unexpected end of input while reading <{}>", tag),
                })
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn ensure_head(tree: &mut Tree) {
    let Some(root) = tree.root() else {
        return;
    };
    if tree.find_child(root, HEAD_TAG).is_none() {
        let head = tree.create(Node::new(HEAD_TAG));
        tree.insert_child(root, 0, head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn child_tags(tree: &Tree, id: NodeId) -> Vec<String> {
        tree.children(id)
            .iter()
            .map(|child| tree.tag(*child).to_string())
            .collect()
    }

    #[test]
    fn test_parse_builds_tree_and_synthesizes_head() {
        let tree = parse(
            r#"<mjml><mj-body><mj-section><mj-column></mj-column></mj-section></mj-body></mjml>"#,
        )
        .unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.tag(root), "mjml");
        assert_eq!(child_tags(&tree, root), vec!["mj-head", "mj-body"]);

        let body = tree.find_child(root, "mj-body").unwrap();
        let section = tree.find_child(body, "mj-section").unwrap();
        assert_eq!(tree.parent(section), Some(body));
        assert_eq!(child_tags(&tree, section), vec!["mj-column"]);
    }

    #[test]
    fn test_existing_head_is_kept() {
        let tree = parse("<mjml><mj-body/><mj-head><mj-title>Hi</mj-title></mj-head></mjml>").unwrap();
        let root = tree.root().unwrap();
        assert_eq!(child_tags(&tree, root), vec!["mj-body", "mj-head"]);
    }

    #[test]
    fn test_leaf_content_is_verbatim() {
        let tree = parse(
            r#"<mjml><mj-body><mj-text align="left">Hello <b class="x">bold</b><br/> &amp; <!-- note --></mj-text></mj-body></mjml>"#,
        )
        .unwrap();
        let body = tree.find_child(tree.root().unwrap(), "mj-body").unwrap();
        let text = tree.find_child(body, "mj-text").unwrap();

        assert_eq!(
            tree[text].content,
            r#"Hello <b class="x">bold</b><br/> &amp; <!-- note -->"#
        );
        assert!(tree.children(text).is_empty());
        assert_eq!(tree[text].attribute("align"), Some("left"));
    }

    #[test]
    fn test_leaf_tracks_nested_same_name() {
        let tree = parse_tree("<mj-text>a<mj-text>b</mj-text>c</mj-text>").unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree[root].content, "a<mj-text>b</mj-text>c");
    }

    #[test]
    fn test_char_data_is_trimmed() {
        let tree = parse_tree("<mj-title>\n   My title \n</mj-title>").unwrap();
        assert_eq!(tree[tree.root().unwrap()].content, "My title");
    }

    #[test]
    fn test_raw_block_becomes_raw_node() {
        let tree = parse(
            "<mjml><mj-body><mj-raw><p>unclosed <br> & stuff</mj-raw><mj-section/></mj-body></mjml>",
        )
        .unwrap();
        let body = tree.find_child(tree.root().unwrap(), "mj-body").unwrap();
        assert_eq!(child_tags(&tree, body), vec!["mj-raw", "mj-section"]);

        let raw = tree.find_child(body, "mj-raw").unwrap();
        assert_eq!(tree[raw].content, "<p>unclosed <br> & stuff");
    }

    #[test]
    fn test_raw_block_containing_comment_terminator() {
        let tree = parse(
            "<mjml><mj-body><mj-raw><!--[if mso]><b>x</b><![endif]--> --></mj-raw></mj-body></mjml>",
        )
        .unwrap();
        let body = tree.find_child(tree.root().unwrap(), "mj-body").unwrap();
        let raw = tree.find_child(body, "mj-raw").unwrap();
        assert_eq!(tree[raw].content, "<!--[if mso]><b>x</b><![endif]--> -->");
    }

    #[test]
    fn test_unknown_placeholder_index_is_ignored() {
        let tree = parse_tree("<mj-body><!--mj-raw-placeholder:7--></mj-body>").unwrap();
        assert!(tree.children(tree.root().unwrap()).is_empty());
    }

    #[test]
    fn test_duplicate_attributes_first_wins() {
        let tree = parse_tree(r#"<mj-section padding="1px" padding="2px"/>"#).unwrap();
        assert_eq!(tree[tree.root().unwrap()].attribute("padding"), Some("1px"));
    }

    #[test]
    fn test_empty_document_fails() {
        assert_eq!(parse("   ").unwrap_err(), CompileError::EmptyDocument);
        assert_eq!(parse("<!-- only a comment -->").unwrap_err(), CompileError::EmptyDocument);
    }

    #[test]
    fn test_unterminated_leaf_fails() {
        let err = parse("<mjml><mj-body><mj-text>never closed").unwrap_err();
        assert!(matches!(err, CompileError::Parse { .. }));
    }
}
