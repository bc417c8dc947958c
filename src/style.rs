use std::fmt;

/// Ordered declarations rendered into a `style` attribute.
///
/// Declarations with an empty value are dropped at render time, so callers can push
/// attribute lookups unconditionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle(Vec<(&'static str, String)>);

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.push(property, value);
        self
    }

    pub fn push(&mut self, property: &'static str, value: impl Into<String>) {
        self.0.push((property, value.into()));
    }

    /// Append every declaration of `other`.
    pub fn extend(mut self, other: InlineStyle) -> Self {
        self.0.extend(other.0);
        self
    }

    /// True when rendering would produce an empty string.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, value)| value.is_empty())
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (property, value) in &self.0 {
            if value.is_empty() {
                continue;
            }
            write!(f, "{}:{};", property, value)?;
        }
        Ok(())
    }
}

/// Ordered HTML attributes. Renders as ` name="value"` pairs, skipping empty values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlAttributes(Vec<(&'static str, String)>);

impl HtmlAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.push((name, value.into()));
        self
    }

    pub fn style(self, style: &InlineStyle) -> Self {
        self.add("style", style.to_string())
    }

    /// Set `name`, replacing an earlier value.
    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }
}

impl fmt::Display for HtmlAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.0 {
            if value.is_empty() {
                continue;
            }
            write!(f, " {}=\"{}\"", name, value.replace('"', "&quot;"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inline_style_skips_empty_values() {
        let style = InlineStyle::new()
            .add("width", "100%")
            .add("border", "")
            .add("font-size", "0px");
        assert_eq!(style.to_string(), "width:100%;font-size:0px;");
        assert!(InlineStyle::new().add("color", "").is_empty());
    }

    #[test]
    fn test_attributes_keep_insertion_order() {
        let attrs = HtmlAttributes::new()
            .add("border", "0")
            .add("class", "")
            .add("role", "presentation")
            .style(&InlineStyle::new().add("width", "600px"));
        assert_eq!(
            attrs.to_string(),
            r#" border="0" role="presentation" style="width:600px;""#
        );
    }

    #[test]
    fn test_attribute_quotes_are_escaped() {
        let attrs = HtmlAttributes::new().add("alt", r#"say "hi""#);
        assert_eq!(attrs.to_string(), r#" alt="say &quot;hi&quot;""#);
    }

    #[test]
    fn test_set_replaces_value() {
        let mut attrs = HtmlAttributes::new().add("width", "100%");
        attrs.set("width", "600");
        attrs.set("align", "center");
        assert_eq!(attrs.to_string(), r#" width="600" align="center""#);
    }
}
