//! Built-in social networks known to `mj-social-element`.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Placeholder in share URLs replaced by the element's `href`.
pub const URL_PLACEHOLDER: &str = "[[URL]]";

const NOSHARE_SUFFIX: &str = "-noshare";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialNetwork {
    /// Share URL containing [`URL_PLACEHOLDER`], or `None` when `href` is used as is.
    pub share_url: Option<String>,
    pub background_color: &'static str,
    /// Icon file name relative to the icon base URL.
    pub icon: &'static str,
}

impl SocialNetwork {
    pub fn icon_src(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.icon)
    }

    /// Final link target for `href`.
    pub fn link(&self, href: &str) -> String {
        match &self.share_url {
            Some(share) => share.replace(URL_PLACEHOLDER, href),
            None => href.to_string(),
        }
    }
}

struct NetworkEntry {
    name: &'static str,
    share_url: Option<&'static str>,
    background_color: &'static str,
    icon: &'static str,
}

impl NetworkEntry {
    const fn new(name: &'static str, background_color: &'static str, icon: &'static str) -> Self {
        Self {
            name,
            share_url: None,
            background_color,
            icon,
        }
    }

    const fn share_url(self, share_url: &'static str) -> Self {
        Self {
            share_url: Some(share_url),
            ..self
        }
    }
}

const NETWORKS: &[NetworkEntry] = &[
    NetworkEntry::new("facebook", "#3b5998", "facebook.png")
        .share_url("https://www.facebook.com/sharer/sharer.php?u=[[URL]]"),
    NetworkEntry::new("twitter", "#55acee", "twitter.png")
        .share_url("https://twitter.com/intent/tweet?url=[[URL]]"),
    NetworkEntry::new("x", "#000000", "twitter-x.png")
        .share_url("https://twitter.com/intent/tweet?url=[[URL]]"),
    NetworkEntry::new("google", "#dc4e41", "google-plus.png")
        .share_url("https://plus.google.com/share?url=[[URL]]"),
    NetworkEntry::new("pinterest", "#bd081c", "pinterest.png")
        .share_url("https://pinterest.com/pin/create/button/?url=[[URL]]&media=&description="),
    NetworkEntry::new("linkedin", "#0077b5", "linkedin.png")
        .share_url("https://www.linkedin.com/shareArticle?mini=true&url=[[URL]]&title=&summary=&source="),
    NetworkEntry::new("instagram", "#3f729b", "instagram.png"),
    NetworkEntry::new("web", "#4BADE9", "web.png"),
    NetworkEntry::new("snapchat", "#FFFA54", "snapchat.png"),
    NetworkEntry::new("youtube", "#EB3323", "youtube.png"),
    NetworkEntry::new("tumblr", "#344356", "tumblr.png")
        .share_url("https://www.tumblr.com/widgets/share/tool?canonicalUrl=[[URL]]"),
    NetworkEntry::new("github", "#000000", "github.png"),
    NetworkEntry::new("xing", "#296366", "xing.png")
        .share_url("https://www.xing.com/app/user?op=share&url=[[URL]]"),
    NetworkEntry::new("vimeo", "#53B4E7", "vimeo.png"),
    NetworkEntry::new("medium", "#000000", "medium.png"),
    NetworkEntry::new("soundcloud", "#EF7F31", "soundcloud.png"),
    NetworkEntry::new("dribbble", "#D95988", "dribbble.png"),
];

fn registry() -> &'static HashMap<String, SocialNetwork> {
    static REGISTRY: OnceLock<HashMap<String, SocialNetwork>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = HashMap::with_capacity(NETWORKS.len() * 2);
        for entry in NETWORKS {
            registry.insert(
                entry.name.to_string(),
                SocialNetwork {
                    share_url: entry.share_url.map(str::to_string),
                    background_color: entry.background_color,
                    icon: entry.icon,
                },
            );
            registry.insert(
                format!("{}{}", entry.name, NOSHARE_SUFFIX),
                SocialNetwork {
                    share_url: Some(URL_PLACEHOLDER.to_string()),
                    background_color: entry.background_color,
                    icon: entry.icon,
                },
            );
        }
        registry
    })
}

pub fn lookup(name: &str) -> Option<&'static SocialNetwork> {
    registry().get(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_share_link() {
        let facebook = lookup("facebook").unwrap();
        assert_eq!(
            facebook.link("https://example.com"),
            "https://www.facebook.com/sharer/sharer.php?u=https://example.com"
        );
        assert_eq!(facebook.background_color, "#3b5998");
    }

    #[test]
    fn test_noshare_variant_passes_href_through() {
        let noshare = lookup("facebook-noshare").unwrap();
        assert_eq!(noshare.link("https://example.com"), "https://example.com");
        assert_eq!(noshare.icon, lookup("facebook").unwrap().icon);
    }

    #[test]
    fn test_network_without_share_url() {
        let github = lookup("github").unwrap();
        assert_eq!(github.link("https://github.com/x"), "https://github.com/x");
        assert_eq!(
            github.icon_src("https://icons.example/"),
            "https://icons.example/github.png"
        );
        assert!(lookup("myspace").is_none());
    }

    #[test]
    fn test_every_network_has_both_variants() {
        for entry in NETWORKS {
            let network = lookup(entry.name).unwrap();
            assert_eq!(network.background_color, entry.background_color);
            assert_eq!(network.link("https://a.example"), match entry.share_url {
                Some(share) => share.replace(URL_PLACEHOLDER, "https://a.example"),
                None => "https://a.example".to_string(),
            });

            let noshare = lookup(&format!("{}{}", entry.name, NOSHARE_SUFFIX)).unwrap();
            assert_eq!(noshare.icon, entry.icon);
            assert_eq!(noshare.link("https://a.example"), "https://a.example");
        }
        assert_eq!(registry().len(), NETWORKS.len() * 2);
    }
}
