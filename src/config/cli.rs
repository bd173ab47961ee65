use crate::config::{BASE_URL_CRUD, BASE_URL_QUERY};
use crate::core::smoke::{SMOKE_BASE_URL_CRUD, SMOKE_BASE_URL_QUERY};
use clap::Parser;
use std::collections::HashMap;

/// Arguments of the `opendata` smoke-check binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "opendata")]
#[command(about = "Verify the opendata OpenGIN client wires up correctly", version)]
pub struct CliArgs {
    #[arg(long, default_value = SMOKE_BASE_URL_CRUD)]
    pub base_url_crud: String,

    #[arg(long, default_value = SMOKE_BASE_URL_QUERY)]
    pub base_url_query: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliArgs {
    /// The literal configuration mapping handed to the services.
    pub fn config_map(&self) -> HashMap<String, String> {
        HashMap::from([
            (BASE_URL_CRUD.to_string(), self.base_url_crud.clone()),
            (BASE_URL_QUERY.to_string(), self.base_url_query.clone()),
        ])
    }
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            base_url_crud: SMOKE_BASE_URL_CRUD.to_string(),
            base_url_query: SMOKE_BASE_URL_QUERY.to_string(),
            verbose: false,
            json_logs: false,
        }
    }
}
