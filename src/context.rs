use std::collections::{BTreeMap, HashMap};
use std::mem;

use crate::boxmodel::parse_width;
use crate::css::Stylesheet;
use crate::error::CompileResult;
use crate::options::CompileOptions;

/// Declarations gathered from `mj-head` before the body renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadDeclarations {
    pub title: String,
    pub preview: String,
    /// CSS emitted verbatim after the boilerplate, in document order.
    pub user_styles: Vec<String>,
    /// Content of `mj-raw` blocks in the head.
    pub raw: Vec<String>,
    pub all_attributes: Vec<(String, String)>,
    pub tag_attributes: HashMap<String, Vec<(String, String)>>,
    pub class_attributes: HashMap<String, Vec<(String, String)>>,
}

/// State shared by every element of one render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Width the element being rendered measures against.
    pub container_width: String,
    pub breakpoint: String,
    pub direction: String,
    pub language: String,
    /// Generated class name to its declarations.
    pub column_styles: BTreeMap<String, Vec<String>>,
    /// Stylesheets applied by the inliner after rendering.
    pub inline_styles: Vec<Stylesheet>,
    pub head: HeadDeclarations,
    pub fonts: BTreeMap<String, String>,
    pub social_icon_base_url: String,
    /// Set once an image asks for full width on mobile.
    pub mobile_full_width: bool,
}

impl RenderContext {
    pub fn new(options: &CompileOptions) -> Self {
        Self {
            container_width: "600px".to_string(),
            breakpoint: options.breakpoint.clone(),
            direction: "ltr".to_string(),
            language: "und".to_string(),
            column_styles: BTreeMap::new(),
            inline_styles: Vec::new(),
            head: HeadDeclarations::default(),
            fonts: options.fonts.clone(),
            social_icon_base_url: options.social_icon_base_url.clone(),
            mobile_full_width: false,
        }
    }

    /// Register declarations for a generated class. Returns false when the class is
    /// already known; the first registration is kept.
    pub fn register_class(&mut self, class: &str, declarations: Vec<String>) -> bool {
        if self.column_styles.contains_key(class) {
            return false;
        }
        self.column_styles.insert(class.to_string(), declarations);
        true
    }

    /// Run `f` with `width` as the container width, restoring the previous width afterwards.
    pub fn with_container_width<T>(
        &mut self,
        width: impl Into<String>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = mem::replace(&mut self.container_width, width.into());
        let result = f(self);
        self.container_width = saved;
        result
    }

    /// One pixel below the breakpoint, used by max-width media queries.
    pub fn lower_breakpoint(&self) -> CompileResult<String> {
        let breakpoint = parse_width(&self.breakpoint)?;
        Ok(format!("{}px", breakpoint.value - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use pretty_assertions::assert_eq;

    fn context() -> RenderContext {
        RenderContext::new(&CompileOptions::default())
    }

    #[test]
    fn test_register_class_is_idempotent() {
        let mut ctx = context();
        assert!(ctx.register_class("mj-column-per-50", vec!["width: 50% !important".into()]));
        assert!(!ctx.register_class("mj-column-per-50", vec!["ignored".into()]));
        assert_eq!(ctx.column_styles.len(), 1);
        assert_eq!(
            ctx.column_styles["mj-column-per-50"],
            vec!["width: 50% !important".to_string()]
        );
    }

    #[test]
    fn test_container_width_is_restored() {
        let mut ctx = context();
        let inner = ctx.with_container_width("300px", |ctx| {
            let nested = ctx.with_container_width("100px", |ctx| ctx.container_width.clone());
            assert_eq!(nested, "100px");
            ctx.container_width.clone()
        });
        assert_eq!(inner, "300px");
        assert_eq!(ctx.container_width, "600px");
    }

    #[test]
    fn test_container_width_restored_on_error() {
        let mut ctx = context();
        let result: CompileResult<()> = ctx.with_container_width("10px", |_| {
            Err(CompileError::BadlyFormatted {
                reason: "boom".into(),
            })
        });
        assert!(result.is_err());
        assert_eq!(ctx.container_width, "600px");
    }

    #[test]
    fn test_lower_breakpoint() {
        let mut ctx = context();
        assert_eq!(ctx.lower_breakpoint().unwrap(), "479px");
        ctx.breakpoint = "320px".into();
        assert_eq!(ctx.lower_breakpoint().unwrap(), "319px");
    }
}
