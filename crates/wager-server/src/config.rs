use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wager_types::Page;

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// JSON data file. `None` keeps everything in memory.
    pub data_path: Option<PathBuf>,
    pub default_page_limit: usize,
    pub max_page_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            data_path: None,
            default_page_limit: Page::DEFAULT_LIMIT,
            max_page_limit: 100,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Resolve optional query parameters into a bounded [`Page`].
    pub fn page(&self, limit: Option<usize>, offset: Option<usize>) -> ServerResult<Page> {
        let page = Page::new(
            limit.unwrap_or(self.default_page_limit),
            offset.unwrap_or(0),
        );
        page.validated(self.max_page_limit)
            .map_err(|e| ServerError::BadRequest(e.to_string()))
    }
}
