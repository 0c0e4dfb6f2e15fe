//! Registry of supported boards.
//!
//! Each variant carries its own link pattern, link rewrite and filename rule,
//! so call sites never branch on a site name.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::filename::{last_path_segment, numeric_file_name, sanitize_file_name};
use crate::CoreError;

static FOURCHAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]+href="(//i\.4cdn\.org[^"]+)""#).expect("valid 4chan regex")
});
static FOURCHANNEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]+\bsrc=["']([^"']+)["']"#).expect("valid 4channel regex")
});
static TWOCHEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https?://sturdychan\.help/assets/images/src/[a-zA-Z0-9]+\.(?:png|jpg))")
        .expect("valid twochen regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteProfile {
    /// `boards.4chan.org`: full-size links are anchors to `i.4cdn.org`.
    FourChan,
    /// `boards.4channel.org`: only thumbnails are exposed, the real media
    /// type has to be guessed.
    FourChannel,
    /// `sturdychan.help`: absolute asset links with their true extension.
    Twochen,
}

impl SiteProfile {
    pub const ALL: [SiteProfile; 3] = [
        SiteProfile::FourChan,
        SiteProfile::FourChannel,
        SiteProfile::Twochen,
    ];

    /// Exact host match against each registered base url.
    pub fn resolve(host: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.host().eq_ignore_ascii_case(host))
            .ok_or_else(|| CoreError::UnsupportedSite {
                host: host.to_string(),
            })
    }

    pub fn id(self) -> &'static str {
        match self {
            SiteProfile::FourChan => "4chan",
            SiteProfile::FourChannel => "4channel",
            SiteProfile::Twochen => "twochen",
        }
    }

    pub fn host(self) -> &'static str {
        match self {
            SiteProfile::FourChan => "boards.4chan.org",
            SiteProfile::FourChannel => "boards.4channel.org",
            SiteProfile::Twochen => "sturdychan.help",
        }
    }

    pub fn base_url(self) -> String {
        format!("https://{}", self.host())
    }

    /// Example thread url, used in usage messages.
    pub fn example_thread_url(self) -> String {
        match self {
            SiteProfile::FourChan | SiteProfile::FourChannel => {
                format!("{}/w/thread/1234567/title", self.base_url())
            }
            SiteProfile::Twochen => format!("{}/b/1234", self.base_url()),
        }
    }

    pub fn extraction_pattern(self) -> &'static Regex {
        match self {
            SiteProfile::FourChan => &FOURCHAN_RE,
            SiteProfile::FourChannel => &FOURCHANNEL_RE,
            SiteProfile::Twochen => &TWOCHEN_RE,
        }
    }

    /// Zero-based index of the thread id in the thread url's path.
    pub(crate) fn thread_segment(self) -> usize {
        match self {
            SiteProfile::FourChan | SiteProfile::FourChannel => 2,
            SiteProfile::Twochen => 1,
        }
    }

    /// Whether derived filenames are a `.jpg` guess that may need fallback.
    pub fn uses_extension_fallback(self) -> bool {
        matches!(self, SiteProfile::FourChannel)
    }

    /// Host every asset link of this profile must point at.
    pub fn media_host(self) -> &'static str {
        match self {
            SiteProfile::FourChan | SiteProfile::FourChannel => "i.4cdn.org",
            SiteProfile::Twochen => "sturdychan.help",
        }
    }

    /// Canonical absolute url for a raw capture, or `None` for links that are
    /// not thread content or live on another host.
    pub fn transform_link(self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        let absolute = match self {
            SiteProfile::FourChan => raw.replacen("//i.4cdn.org", "https://i.4cdn.org", 1),
            SiteProfile::FourChannel => {
                let absolute = if raw.starts_with("//") {
                    format!("https:{raw}")
                } else if raw.starts_with("http://") || raw.starts_with("https://") {
                    raw.to_string()
                } else {
                    return None;
                };
                absolute.replacen("s.jpg", ".jpg", 1)
            }
            SiteProfile::Twochen => raw.to_string(),
        };
        self.is_media_url(&absolute).then_some(absolute)
    }

    fn is_media_url(self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|parsed| {
            matches!(parsed.scheme(), "http" | "https")
                && parsed
                    .host_str()
                    .is_some_and(|host| host.eq_ignore_ascii_case(self.media_host()))
        })
    }

    /// Local filename for an already-transformed link.
    pub fn derive_file_name(self, url: &str) -> Option<String> {
        match self {
            SiteProfile::FourChan | SiteProfile::Twochen => {
                last_path_segment(url).and_then(sanitize_file_name)
            }
            SiteProfile::FourChannel => numeric_file_name(url),
        }
    }
}

impl fmt::Display for SiteProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
