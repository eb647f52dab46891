use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use url::Url;

use crate::err::Error;
use crate::storage::{FileTokenStore, StaticToken, TokenStore};

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";
pub const DEFAULT_TOKEN_FILE: &str = ".schooldesk/token";

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Base URL of the portal API
    #[arg(long, env = "PORTAL_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
    /// Bearer token; takes precedence over the token file
    #[arg(long, env = "PORTAL_TOKEN")]
    pub token: Option<String>,
    /// File holding the bearer token
    #[arg(long, env = "PORTAL_TOKEN_FILE", default_value = DEFAULT_TOKEN_FILE)]
    pub token_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: Url,
    pub token: Option<String>,
    pub token_file: PathBuf,
}

impl Config {
    pub fn from_args(args: ConfigArgs) -> Result<Self, Error> {
        let api_base = Url::parse(args.api_base.trim_end_matches('/'))?;
        if api_base.cannot_be_a_base() {
            return Err(Error::InternalError {
                kind: "ConfigError",
                message: format!("`{}` cannot be used as an API base", args.api_base),
            });
        }
        Ok(Self {
            api_base,
            token: args.token.filter(|token| !token.trim().is_empty()),
            token_file: args.token_file,
        })
    }

    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        match &self.token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(FileTokenStore::new(self.token_file.clone())),
        }
    }
}
