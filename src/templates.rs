//! Static head and preview markup, registered once with a shared [`Tera`] instance and
//! rendered with per-document values.

use std::sync::OnceLock;

use tera::{Context, Tera};

use crate::error::CompileResult;

pub const HEAD: &str = "head";
pub const FONTS: &str = "fonts";
pub const MEDIA_QUERIES: &str = "media_queries";
pub const MOBILE_FULL_WIDTH: &str = "mobile_full_width";
pub const USER_STYLES: &str = "user_styles";
pub const PREVIEW: &str = "preview";

const HEAD_BOILERPLATE: &str = r#"<!--[if !mso]><!-->
<meta http-equiv="X-UA-Compatible" content="IE=edge">
<!--<![endif]-->
<meta http-equiv="Content-Type" content="text/html; charset=UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<style type="text/css">
#outlook a { padding:0; }
body { margin:0;padding:0;-webkit-text-size-adjust:100%;-ms-text-size-adjust:100%; }
table, td { border-collapse:collapse;mso-table-lspace:0pt;mso-table-rspace:0pt; }
img { border:0;height:auto;line-height:100%; outline:none;text-decoration:none;-ms-interpolation-mode:bicubic; }
p { display:block;margin:13px 0; }
</style>
<!--[if mso]>
<noscript>
<xml>
<o:OfficeDocumentSettings>
<o:AllowPNG/>
<o:PixelsPerInch>96</o:PixelsPerInch>
</o:OfficeDocumentSettings>
</xml>
</noscript>
<![endif]-->
<!--[if lte mso 11]>
<style type="text/css">
.mj-outlook-group-fix { width:100% !important; }
</style>
<![endif]-->
"#;

const FONTS_SOURCE: &str = r#"<!--[if !mso]><!-->
{{links}}<style type="text/css">
{{imports}}</style>
<!--<![endif]-->
"#;

const MEDIA_QUERIES_SOURCE: &str = r#"<style type="text/css">
@media only screen and (min-width:{{breakpoint}}) {
{{column_rules}}}
</style>
<style media="screen and (min-width:{{breakpoint}})">
{{moz_rules}}</style>
"#;

const MOBILE_FULL_WIDTH_SOURCE: &str = r#"<style type="text/css">
@media only screen and (max-width:{{lower_breakpoint}}) {
table.mj-full-width-mobile { width: 100% !important; }
td.mj-full-width-mobile { width: auto !important; }
}
</style>
"#;

const USER_STYLES_SOURCE: &str = r#"<style type="text/css">{{styles}}</style>
"#;

const PREVIEW_SOURCE: &str = r#"<div style="display:none;font-size:1px;color:#ffffff;line-height:1px;max-height:0px;max-width:0px;opacity:0;overflow:hidden;">{{preview}}</div>"#;

fn engine() -> &'static Tera {
    static ENGINE: OnceLock<Tera> = OnceLock::new();
    ENGINE.get_or_init(|| {
        let mut tera = Tera::default();
        // Values are markup and CSS written by the compiler.
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(vec![
            (HEAD, HEAD_BOILERPLATE),
            (FONTS, FONTS_SOURCE),
            (MEDIA_QUERIES, MEDIA_QUERIES_SOURCE),
            (MOBILE_FULL_WIDTH, MOBILE_FULL_WIDTH_SOURCE),
            (USER_STYLES, USER_STYLES_SOURCE),
            (PREVIEW, PREVIEW_SOURCE),
        ])
        .expect("Failed to add built-in templates");
        tera
    })
}

/// Render the built-in template `name` with `values` bound as template variables.
pub fn render(name: &str, values: &[(&str, &str)]) -> CompileResult<String> {
    let mut context = Context::new();
    for (key, value) in values {
        context.insert(*key, value);
    }
    Ok(engine().render(name, &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_substitutes_every_occurrence() {
        let rendered = render(
            MEDIA_QUERIES,
            &[
                ("breakpoint", "480px"),
                ("column_rules", ".a { width: 50%; }\n"),
                ("moz_rules", ".moz-text-html .a { width: 50%; }\n"),
            ],
        )
        .unwrap();
        assert_eq!(rendered.matches("min-width:480px").count(), 2);
        assert!(rendered.contains("@media only screen and (min-width:480px) {\n.a { width: 50%; }\n}"));
    }

    #[test]
    fn test_values_are_not_escaped() {
        let rendered = render(PREVIEW, &[("preview", "Tom & <b>Jerry</b>")]).unwrap();
        assert!(rendered.ends_with(">Tom & <b>Jerry</b></div>"));
    }

    #[test]
    fn test_head_renders_without_values() {
        let rendered = render(HEAD, &[]).unwrap();
        assert!(rendered.starts_with("<!--[if !mso]><!-->"));
        assert!(rendered.contains(".mj-outlook-group-fix { width:100% !important; }"));
    }

    #[test]
    fn test_unknown_template_is_an_error() {
        let err = render("missing", &[]).unwrap_err();
        assert!(matches!(err, CompileError::Template { .. }));
    }
}
