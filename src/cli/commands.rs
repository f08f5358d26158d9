//! CLI command implementations
//!
//! Every command follows the same sequence: load configuration, wire the
//! tenants (seeding in-memory stores), run one operation, print, exit.

use serde_json::Value as JsonValue;

use crate::config::FacadeConfig;
use crate::facade::DocumentFacade;
use crate::memory::QueryRules;
use crate::model::{CollectionPath, DocumentId};
use crate::query::ExplainQuery;
use crate::tenant::Tenants;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_response, write_text, QueryRequest};

/// Main CLI entry point
pub async fn run() -> CliResult<()> {
    run_command(Cli::parse_args()).await
}

/// Dispatch a parsed command line
pub async fn run_command(cli: Cli) -> CliResult<()> {
    let config = match &cli.config {
        Some(path) => FacadeConfig::load(path)?,
        None => FacadeConfig::default(),
    };
    let tenants = Tenants::from_config(&config)?;

    match cli.command {
        Command::Fetch { tenant, collection } => {
            let request = read_request()?;
            write_response(fetch(&tenants, &tenant, &collection, &request).await?)
        }
        Command::Get {
            tenant,
            collection,
            id,
        } => write_response(get(&tenants, &tenant, &collection, &id).await?),
        Command::Explain { tenant, collection } => {
            let request = read_request()?;
            write_text(&explain(&config, &tenant, &collection, &request)?.to_string())
        }
    }
}

fn facade<'a>(tenants: &'a Tenants, name: &str) -> CliResult<&'a DocumentFacade> {
    tenants
        .get(name)
        .ok_or_else(|| CliError::UnknownTenant(name.to_string()))
}

/// Run a query once; returns the documents as a JSON array
pub async fn fetch(
    tenants: &Tenants,
    tenant: &str,
    collection: &str,
    request: &QueryRequest,
) -> CliResult<JsonValue> {
    let facade = facade(tenants, tenant)?;
    let query = request.to_descriptor()?;
    let results = facade.fetch(collection, &query).await?;
    Ok(JsonValue::Array(results.iter().map(|doc| doc.to_json()).collect()))
}

/// Read one document; absent documents fail with `DUO_NOT_FOUND`
pub async fn get(
    tenants: &Tenants,
    tenant: &str,
    collection: &str,
    id: &str,
) -> CliResult<JsonValue> {
    let facade = facade(tenants, tenant)?;
    let document = facade
        .documents()
        .get(&CollectionPath::new(collection), &DocumentId::new(id))
        .await?;
    Ok(document.to_json())
}

/// Describe a request without executing it, applying the tenant's rules
pub fn explain(
    config: &FacadeConfig,
    tenant: &str,
    collection: &str,
    request: &QueryRequest,
) -> CliResult<ExplainQuery> {
    let tenant_config = config
        .tenants
        .iter()
        .find(|t| t.name == tenant)
        .ok_or_else(|| CliError::UnknownTenant(tenant.to_string()))?;
    let collection = CollectionPath::new(collection);

    let checked = request.to_descriptor().and_then(|query| {
        QueryRules::new(tenant_config.enforce_index_rules)
            .validate(&query)
            .map(|()| query)
            .map_err(CliError::from)
    });

    Ok(match checked {
        Ok(query) => ExplainQuery::from_descriptor(&collection, &query),
        Err(CliError::Store(err)) => ExplainQuery::from_error(&collection, &err),
        Err(err) => return Err(err),
    })
}
