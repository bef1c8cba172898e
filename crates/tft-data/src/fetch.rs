//! Feed retrieval.
//!
//! Fusion needs two feeds per language: the release manifest (Data Dragon, one
//! file per entity kind) and the detail catalog (Community Dragon). The
//! [`FeedSource`] trait abstracts where they come from so `fuse` and
//! `fuse-local` share one pipeline.

use crate::errors::CliError;
use crate::utils::data_dragon_locale;
use camino::{Utf8Path, Utf8PathBuf};
use ltk_tft_data::Allowlist;
use serde_json::Value;
use std::fs;
use std::time::Duration;

const COMMUNITY_DRAGON_URL: &str = "https://raw.communitydragon.org";
const DATA_DRAGON_URL: &str = "https://ddragon.leagueoflegends.com";

/// Release manifest feeds, one per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Augments,
    Items,
    Traits,
    Champions,
}

impl Feed {
    /// File stem as published by Data Dragon.
    pub fn file_stem(self) -> &'static str {
        match self {
            Feed::Augments => "tft-augments",
            Feed::Items => "tft-item",
            Feed::Traits => "tft-trait",
            Feed::Champions => "tft-champion",
        }
    }
}

/// Provides the raw feed documents for a language.
pub trait FeedSource: Sync {
    /// Detail catalog document for `language`.
    fn catalog(&self, language: &str) -> Result<Value, CliError>;

    /// One release manifest feed for `language`.
    fn manifest(&self, language: &str, feed: Feed) -> Result<Value, CliError>;

    /// Release identifier the feeds belong to.
    fn release(&self) -> &str;

    fn allowlist(&self, language: &str) -> Result<Allowlist, CliError> {
        let augments = self.manifest(language, Feed::Augments)?;
        let items = self.manifest(language, Feed::Items)?;
        let traits = self.manifest(language, Feed::Traits)?;
        let champions = self.manifest(language, Feed::Champions)?;

        Allowlist::from_manifests(&augments, &items, &traits, &champions)
            .map_err(|e| CliError::fusion_failed(language, e))
    }
}

/// Fetches feeds over HTTP.
pub struct HttpFeeds {
    client: reqwest::blocking::Client,
    community_dragon: String,
    data_dragon: String,
}

impl HttpFeeds {
    /// Create a fetcher. Without a Data Dragon release the newest one is looked up.
    pub fn new(community_dragon: &str, data_dragon: Option<&str>) -> Result<Self, CliError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!(
                "tft-data/{} (+https://github.com/LeagueToolkit/league-mod)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| CliError::fetch_failed("client", e))?;

        let data_dragon = match data_dragon {
            Some(version) => version.to_string(),
            None => latest_data_dragon(&client)?,
        };

        Ok(Self {
            client,
            community_dragon: community_dragon.to_string(),
            data_dragon,
        })
    }

    pub fn catalog_url(&self, language: &str) -> String {
        format!(
            "{}/{}/cdragon/tft/{}.json",
            COMMUNITY_DRAGON_URL,
            self.community_dragon,
            language.to_lowercase()
        )
    }

    pub fn manifest_url(&self, language: &str, feed: Feed) -> String {
        format!(
            "{}/cdn/{}/data/{}/{}.json",
            DATA_DRAGON_URL,
            self.data_dragon,
            data_dragon_locale(language),
            feed.file_stem()
        )
    }
}

impl FeedSource for HttpFeeds {
    fn catalog(&self, language: &str) -> Result<Value, CliError> {
        get_json(&self.client, &self.catalog_url(language))
    }

    fn manifest(&self, language: &str, feed: Feed) -> Result<Value, CliError> {
        get_json(&self.client, &self.manifest_url(language, feed))
    }

    fn release(&self) -> &str {
        &self.data_dragon
    }
}

fn get_json(client: &reqwest::blocking::Client, url: &str) -> Result<Value, CliError> {
    tracing::info!("Fetching {}", url);

    client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.json::<Value>())
        .map_err(|e| CliError::fetch_failed(url, e))
}

fn latest_data_dragon(client: &reqwest::blocking::Client) -> Result<String, CliError> {
    let url = format!("{DATA_DRAGON_URL}/api/versions.json");
    let versions = get_json(client, &url)?;

    versions
        .as_array()
        .and_then(|versions| versions.first())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(CliError::MissingSetting {
            name: "data_dragon",
        })
}

/// Reads previously downloaded feeds laid out as:
///
/// ```text
/// input/
///   en_us.json               # Detail catalog
///   en_us/
///     tft-augments.json      # Release manifests
///     tft-item.json
///     tft-trait.json
///     tft-champion.json
/// ```
pub struct LocalFeeds {
    root: Utf8PathBuf,
    release: String,
}

impl LocalFeeds {
    pub fn new(root: impl Into<Utf8PathBuf>, release: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            release: release.into(),
        }
    }
}

impl FeedSource for LocalFeeds {
    fn catalog(&self, language: &str) -> Result<Value, CliError> {
        read_json(&self.root.join(format!("{language}.json")))
    }

    fn manifest(&self, language: &str, feed: Feed) -> Result<Value, CliError> {
        read_json(
            &self
                .root
                .join(language)
                .join(format!("{}.json", feed.file_stem())),
        )
    }

    fn release(&self) -> &str {
        &self.release
    }
}

fn read_json(path: &Utf8Path) -> Result<Value, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::FeedFileMissing {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| CliError::feed_parse_error(path.as_str(), e))
}
