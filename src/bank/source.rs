use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "assets/bank/"]
struct BankAssets;

pub const EMBEDDED_BANK: &str = "questions.json";

/// Where raw question data comes from.
pub trait BankSource: Send + Sync {
    fn fetch(&self) -> Result<String>;
    fn describe(&self) -> String;
}

/// The bank compiled into the binary.
pub struct EmbeddedSource;

impl BankSource for EmbeddedSource {
    fn fetch(&self) -> Result<String> {
        let file = BankAssets::get(EMBEDDED_BANK)
            .ok_or_else(|| anyhow!("embedded {EMBEDDED_BANK} is missing"))?;
        Ok(String::from_utf8(file.data.into_owned())?)
    }

    fn describe(&self) -> String {
        format!("embedded:{EMBEDDED_BANK}")
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BankSource for FileSource {
    fn fetch(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct UrlSource {
    url: String,
}

impl UrlSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

#[cfg(feature = "network")]
impl BankSource for UrlSource {
    fn fetch(&self) -> Result<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        let response = client.get(&self.url).send()?;
        if !response.status().is_success() {
            return Err(anyhow!("{} returned {}", self.url, response.status()));
        }
        Ok(response.text()?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(not(feature = "network"))]
impl BankSource for UrlSource {
    fn fetch(&self) -> Result<String> {
        Err(anyhow!("built without network support, cannot fetch {}", self.url))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// `embedded`, an `http(s)://` URL, or a filesystem path.
pub fn from_location(location: &str) -> Box<dyn BankSource> {
    let location = location.trim();
    if location.is_empty() || location.eq_ignore_ascii_case("embedded") {
        Box::new(EmbeddedSource)
    } else if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(UrlSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}
