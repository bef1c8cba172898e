use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Configuration file error: {path}")]
    #[diagnostic(
        code(config::parse_error),
        help("Check your tft-data.toml file for syntax errors")
    )]
    ConfigParseError {
        path: Utf8PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No {name} configured")]
    #[diagnostic(
        code(config::missing_setting),
        help("Set `{name}` in tft-data.toml or pass it on the command line")
    )]
    MissingSetting { name: &'static str },

    #[error("Request failed: {url}")]
    #[diagnostic(
        code(fetch::request_failed),
        help("Check your network connection and that the requested version exists")
    )]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not read feed file: {path}")]
    #[diagnostic(
        code(file::not_found),
        help("fuse-local expects <input>/<language>.json and <input>/<language>/tft-<feed>.json")
    )]
    FeedFileMissing {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Feed is not valid JSON: {name}")]
    #[diagnostic(code(feed::invalid_json))]
    FeedParseError {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Fusion failed for {language}")]
    #[diagnostic(code(fusion::failed))]
    FusionFailed {
        language: String,
        #[source]
        source: ltk_tft_data::Error,
    },

    #[error("Could not write dataset to {path}")]
    #[diagnostic(
        code(fs::write_failed),
        help("Check file permissions and available disk space")
    )]
    WriteFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} language pass(es) failed")]
    #[diagnostic(
        code(fusion::passes_failed),
        help("Run again with --verbose for details on each failure")
    )]
    PassesFailed { failed: usize, total: usize },

    #[error("IO operation failed")]
    #[diagnostic(code(io::operation_failed))]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_parse_error(path: Utf8PathBuf, source: toml::de::Error) -> Self {
        Self::ConfigParseError { path, source }
    }

    pub fn fetch_failed(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::FetchFailed {
            url: url.into(),
            source,
        }
    }

    pub fn feed_parse_error(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::FeedParseError {
            name: name.into(),
            source,
        }
    }

    pub fn fusion_failed(language: impl Into<String>, source: ltk_tft_data::Error) -> Self {
        Self::FusionFailed {
            language: language.into(),
            source,
        }
    }

    pub fn write_failed(path: Utf8PathBuf, source: std::io::Error) -> Self {
        Self::WriteFailed { path, source }
    }
}
