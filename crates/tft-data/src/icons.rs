use regex::Regex;
use std::sync::LazyLock;

const ASSET_URL: &str = "https://raw.communitydragon.org";

static TEXTURE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(tex|dds)$").expect("extension pattern is valid"));

/// Turn a raw game asset path into the URL of its exported PNG.
///
/// Community Dragon serves game assets lower-cased, with textures converted to PNG.
pub fn icon_url(community_dragon: &str, path: &str) -> String {
    let path = path.to_lowercase();
    let path = TEXTURE_EXTENSION.replace(&path, ".png");
    format!("{ASSET_URL}/{community_dragon}/game/{path}")
}
