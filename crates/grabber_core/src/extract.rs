use std::collections::HashSet;

use crate::SiteProfile;

/// One downloadable asset discovered on a thread page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLink {
    pub url: String,
    pub file_name: String,
    /// The filename's `.jpg` is a guess; other extensions may be tried on 404.
    pub extension_fallback: bool,
}

/// Asset links in `page` for `profile`, in first-seen order and without
/// duplicate urls. Links the profile rejects, or that yield no usable
/// filename, are dropped.
pub fn extract_links(page: &str, profile: SiteProfile) -> Vec<AssetLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for captures in profile.extraction_pattern().captures_iter(page) {
        let Some(raw) = captures.get(1) else {
            continue;
        };
        let Some(url) = profile.transform_link(raw.as_str()) else {
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }
        let Some(file_name) = profile.derive_file_name(&url) else {
            continue;
        };
        links.push(AssetLink {
            url,
            file_name,
            extension_fallback: profile.uses_extension_fallback(),
        });
    }

    links
}
