//! Installation smoke check: touches every public symbol and constructs each
//! service against a throwaway configuration. No network I/O happens here.

use crate::config::{Config, BASE_URL_CRUD, BASE_URL_QUERY};
use crate::utils::error::Result;
use crate::{
    get_config, IncomingServiceAttributes, IncomingServiceOrgchart, WriteAttributes,
    ATTRIBUTE_PAYLOAD, AUTHOR, ENTITY_PAYLOAD, VERSION, WRITE_PAYLOAD,
};
use std::collections::HashMap;
use std::io::Write;

pub const SMOKE_BASE_URL_CRUD: &str = "http://test:8080";
pub const SMOKE_BASE_URL_QUERY: &str = "http://test:8081";

const RULE_WIDTH: usize = 60;

pub fn smoke_config_map() -> HashMap<String, String> {
    HashMap::from([
        (BASE_URL_CRUD.to_string(), SMOKE_BASE_URL_CRUD.to_string()),
        (BASE_URL_QUERY.to_string(), SMOKE_BASE_URL_QUERY.to_string()),
    ])
}

/// Runs the check, narrating each step to `out`. Stops at the first failure.
pub fn run_smoke_check<W: Write>(out: &mut W, config_map: &HashMap<String, String>) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "Testing opendata package imports...")?;
    writeln!(out, "{}", rule)?;

    writeln!(out, "✅ Successfully imported opendata")?;
    writeln!(out, "   Version: {}", VERSION)?;
    writeln!(out, "   Author: {}", AUTHOR)?;

    let _models = (
        ENTITY_PAYLOAD::default(),
        ATTRIBUTE_PAYLOAD::default(),
        WRITE_PAYLOAD::default(),
    );
    writeln!(out, "✅ Successfully imported models")?;

    let _services: (
        fn(Config) -> Result<IncomingServiceAttributes>,
        fn(Config) -> Result<IncomingServiceOrgchart>,
        fn() -> Result<WriteAttributes>,
    ) = (
        IncomingServiceAttributes::new,
        IncomingServiceOrgchart::new,
        WriteAttributes::new,
    );
    writeln!(out, "✅ Successfully imported services")?;

    let _accessor: fn() -> Result<Config> = get_config;
    writeln!(out, "✅ Successfully imported dependencies")?;

    let config = Config::from_map(config_map)?;
    tracing::debug!("smoke config: {:?}", config);

    let _attr_service = IncomingServiceAttributes::new(config.clone())?;
    writeln!(out, "✅ Successfully instantiated IncomingServiceAttributes")?;

    let _org_service = IncomingServiceOrgchart::new(config)?;
    writeln!(out, "✅ Successfully instantiated IncomingServiceOrgchart")?;

    let _write_service = WriteAttributes::new()?;
    writeln!(out, "✅ Successfully instantiated WriteAttributes")?;

    writeln!(out, "{}", rule)?;
    writeln!(out, "🎉 All imports successful! Package is working correctly.")?;
    Ok(())
}
