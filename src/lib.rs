//! # MJML Compiler
//!
//! Compiles MJML email markup into table-based HTML that renders in legacy email
//! clients, including the Word-based Outlook engine.
//!
//! ## Features
//! - Tolerant parsing: `mj-raw` blocks may contain markup that is not well-formed XML
//! - Attribute defaulting and validation per element, with `mj-attributes` inheritance
//! - Responsive column layout with Outlook conditional and VML fallbacks
//! - Inlining of `mj-style inline="inline"` rules into `style` attributes
//!
//! ## Example
//! ```ignore
//! use mjml_compiler::compile;
//!
//! let mjml = r#"
//! <mjml>
//!   <mj-body>
//!     <mj-section>
//!       <mj-column>
//!         <mj-text>Hello World</mj-text>
//!       </mj-column>
//!     </mj-section>
//!   </mj-body>
//! </mjml>
//! "#;
//!
//! let html = compile(mjml).expect("Failed to compile MJML");
//! ```

pub mod boxmodel;
pub mod components;
pub mod context;
pub mod css;
pub mod error;
pub mod head;
pub mod inliner;
pub mod node;
pub mod options;
pub mod parser;
pub mod social;
pub mod style;
pub mod templates;
pub mod validator;

use std::fmt::Write;

use tracing::debug;

use components::{render_element, Element, BODY_TAG, HEAD_TAG, MJML_TAG};

// --- Core types ---
pub use context::RenderContext;
pub use css::{parse_stylesheet, Stylesheet};
pub use error::{CompileError, CompileResult};
pub use node::{Node, NodeId, Tree};
pub use options::CompileOptions;

/// Compile an MJML document with the default options.
pub fn compile(markup: &str) -> CompileResult<String> {
    compile_with_options(markup, &CompileOptions::default())
}

/// Compile an MJML document with custom options
pub fn compile_with_options(markup: &str, options: &CompileOptions) -> CompileResult<String> {
    let mut tree = parser::parse(markup)?;
    let root = tree.root().ok_or(CompileError::EmptyDocument)?;
    if tree.tag(root) != MJML_TAG {
        return Err(CompileError::UnknownRootTag {
            tag: tree.tag(root).to_string(),
        });
    }
    let body = tree
        .find_child(root, BODY_TAG)
        .ok_or_else(|| CompileError::BadlyFormatted {
            reason: format!("missing <{}> in <{}>", BODY_TAG, MJML_TAG),
        })?;

    let mut ctx = RenderContext::new(options);
    if let Some(lang) = tree[root].attribute("lang") {
        ctx.language = lang.to_string();
    }
    if let Some(dir) = tree[root].attribute("dir") {
        ctx.direction = dir.to_string();
    }
    if let Some(head) = tree.find_child(root, HEAD_TAG) {
        head::collect_head(&mut ctx, &tree, head)?;
    }

    let mut body_html = String::new();
    render_element(Element::Body, &mut ctx, &mut tree, body, &mut body_html)?;
    debug!(
        bytes = body_html.len(),
        classes = ctx.column_styles.len(),
        "rendered body"
    );

    let mut document = String::with_capacity(body_html.len() + 4096);
    write!(
        document,
        r#"<!doctype html><html lang="{}" dir="{}" xmlns="http://www.w3.org/1999/xhtml" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office">"#,
        ctx.language, ctx.direction
    )?;
    head::render_head(&ctx, &body_html, &mut document)?;
    document.push_str(&body_html);
    document.push_str("</html>");

    let inlined = inliner::inline_css(&document, &ctx.inline_styles)?;
    Ok(inliner::collapse_conditionals(&inlined))
}

/// Parse MJML markup into a node tree without rendering it.
pub fn parse(markup: &str) -> CompileResult<Tree> {
    parser::parse(markup)
}

/// Inline stylesheet rules into an HTML document.
pub fn inline_css(html: &str, sheets: &[Stylesheet]) -> CompileResult<String> {
    inliner::inline_css(html, sheets)
}
