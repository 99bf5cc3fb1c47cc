use crate::{
    config::{Env, TrackerConfigError, TrackerConfigResult},
    defaults,
};
use serde::Deserialize;

/// Limits applied to every paginated connection.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Largest `first` or `last` value a caller may request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

fn default_max_page_size() -> u64 {
    defaults::MAX_PAGE_SIZE
}

impl PaginationConfig {
    pub fn validate(&self) -> TrackerConfigResult<()> {
        if self.max_page_size == 0 || self.max_page_size > defaults::MAX_PAGE_SIZE_CEILING
        {
            return Err(TrackerConfigError::InvalidPageSize(self.max_page_size));
        }
        Ok(())
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_page_size: defaults::MAX_PAGE_SIZE,
        }
    }
}

impl Env for PaginationConfig {
    fn inject_opt_env_vars(&mut self) -> TrackerConfigResult<()> {
        Ok(())
    }
}
