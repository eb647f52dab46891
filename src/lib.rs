pub mod actions;
pub mod api;
pub mod config;
pub mod countdown;
pub mod dialog;
pub mod err;
pub mod markup;
pub mod models;
pub mod page;
pub mod prescriptions;
pub mod profile;
pub mod storage;
pub mod tabs;
pub mod users;
pub mod views;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use std::sync::Arc;

use crate::api::{HttpApi, PortalApi};
use crate::config::Config;
use crate::err::{Error, Reply};

/// Outcome of the enveloped user-management calls.
pub type Payload<T> = Result<Reply<T>, Error>;

/// API client for the configured base URL and token source.
pub fn connect(config: &Config) -> Result<Arc<dyn PortalApi>, Error> {
    let api = HttpApi::new(config.api_base.clone(), config.token_store())?;
    Ok(Arc::new(api))
}
