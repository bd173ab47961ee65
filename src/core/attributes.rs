use crate::adapters::http::ApiClient;
use crate::adapters::query::QueryClient;
use crate::config::{Config, BASE_URL_QUERY};
use crate::domain::model::{
    AttributePayload, AttributeSummary, AttributeValue, Entity, EntityPayload, Relation,
    RelationFilter, TabularData,
};
use crate::domain::ports::QueryApi;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Relation linking an entity to the datasets that describe it.
pub const IS_ATTRIBUTE: &str = "IS_ATTRIBUTE";

/// Reads entities and their attributes from the OpenGIN query service.
#[derive(Debug, Clone)]
pub struct IncomingServiceAttributes {
    config: Config,
    query: QueryClient,
}

impl IncomingServiceAttributes {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let api = ApiClient::new(BASE_URL_QUERY, &config.base_url_query, config.timeout())?;
        tracing::debug!("IncomingServiceAttributes -> {}", config.base_url_query);
        Ok(Self {
            config,
            query: QueryClient::new(api),
        })
    }

    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        Self::new(Config::from_map(map)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn search_entities(&self, payload: &EntityPayload) -> Result<Vec<Entity>> {
        self.query.search_entities(payload).await
    }

    pub async fn fetch_relations(
        &self,
        entity_id: &str,
        filter: &RelationFilter,
    ) -> Result<Vec<Relation>> {
        validate_non_empty_string("entity_id", entity_id)?;
        self.query.fetch_relations(entity_id, filter).await
    }

    pub async fn fetch_metadata(&self, entity_id: &str) -> Result<Map<String, Value>> {
        validate_non_empty_string("entity_id", entity_id)?;
        self.query.fetch_metadata(entity_id).await
    }

    pub async fn fetch_attribute(&self, payload: &AttributePayload) -> Result<AttributeValue> {
        self.query.fetch_attribute(payload).await
    }

    pub async fn attributes_for_entity(&self, entity_id: &str) -> Result<Vec<AttributeSummary>> {
        validate_non_empty_string("entity_id", entity_id)?;
        collect_attributes(&self.query, entity_id).await
    }

    /// Fetches an attribute and reads its value as a table.
    pub async fn attribute_table(&self, payload: &AttributePayload) -> Result<TabularData> {
        let attribute = self.fetch_attribute(payload).await?;
        TabularData::from_value(&attribute.value)
    }
}

/// Follows outgoing `IS_ATTRIBUTE` relations and resolves each dataset entity.
pub async fn collect_attributes<Q>(api: &Q, entity_id: &str) -> Result<Vec<AttributeSummary>>
where
    Q: QueryApi + ?Sized,
{
    let relations = api
        .fetch_relations(entity_id, &RelationFilter::named(IS_ATTRIBUTE).outgoing())
        .await?;

    let mut summaries = Vec::with_capacity(relations.len());
    for relation in relations {
        match api.find_entity(&relation.related_entity_id).await? {
            Some(entity) => summaries.push(AttributeSummary {
                id: entity.id,
                name: entity.name,
                kind: entity.kind,
                start_time: relation.start_time,
                end_time: relation.end_time,
            }),
            None => tracing::warn!(
                "attribute {} linked from {} was not found",
                relation.related_entity_id,
                entity_id
            ),
        }
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FakeQuery;
    use crate::domain::model::Kind;

    fn test_config() -> Config {
        Config::new("http://test:8080", "http://test:8081")
    }

    #[test]
    fn test_new_with_smoke_config() {
        let service = IncomingServiceAttributes::new(test_config()).unwrap();
        assert_eq!(service.config().base_url_query, "http://test:8081");
    }

    #[test]
    fn test_new_rejects_invalid_query_url() {
        let config = Config::new("http://test:8080", "not a url");
        assert!(IncomingServiceAttributes::new(config).is_err());
    }

    #[tokio::test]
    async fn test_collect_attributes_skips_missing_entities() {
        let fake = FakeQuery::default()
            .with_entity("dept_01", Kind::new("Organisation", "department"), "Treasury")
            .with_entity("ds_budget", Kind::new("Dataset", "tabular"), "Budget 2024")
            .with_relation("dept_01", IS_ATTRIBUTE, "ds_budget")
            .with_relation("dept_01", IS_ATTRIBUTE, "ds_gone");

        let summaries = collect_attributes(&fake, "dept_01").await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "ds_budget");
        assert_eq!(summaries[0].name, "Budget 2024");
        assert_eq!(summaries[0].kind.minor, "tabular");
    }

    #[tokio::test]
    async fn test_blank_entity_id_is_rejected_before_io() {
        let service = IncomingServiceAttributes::new(test_config()).unwrap();
        assert!(service.attributes_for_entity("  ").await.is_err());
        assert!(service.fetch_metadata("").await.is_err());
    }
}
