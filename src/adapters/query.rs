use crate::adapters::http::ApiClient;
use crate::domain::model::{
    AttributePayload, AttributeValue, Entity, EntityPayload, Relation, RelationFilter,
};
use crate::domain::ports::QueryApi;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    body: Vec<Entity>,
}

/// `QueryApi` over the OpenGIN query service (`/v1/entities/...`).
#[derive(Debug, Clone)]
pub struct QueryClient {
    api: ApiClient,
}

impl QueryClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url()
    }
}

#[async_trait]
impl QueryApi for QueryClient {
    async fn search_entities(&self, payload: &EntityPayload) -> Result<Vec<Entity>> {
        payload.validate()?;
        let response: SearchResponse = self
            .api
            .post_json(&["v1", "entities", "search"], payload)
            .await?;
        tracing::debug!("search returned {} entities", response.body.len());
        Ok(response.body)
    }

    async fn fetch_relations(
        &self,
        entity_id: &str,
        filter: &RelationFilter,
    ) -> Result<Vec<Relation>> {
        let relations: Option<Vec<Relation>> = self
            .api
            .post_json(&["v1", "entities", entity_id, "relations"], filter)
            .await?;
        Ok(relations.unwrap_or_default())
    }

    async fn fetch_metadata(&self, entity_id: &str) -> Result<Map<String, Value>> {
        let metadata: Option<Map<String, Value>> = self
            .api
            .get_json(&["v1", "entities", entity_id, "metadata"], &[])
            .await?;
        Ok(metadata.unwrap_or_default())
    }

    async fn fetch_attribute(&self, payload: &AttributePayload) -> Result<AttributeValue> {
        payload.validate()?;
        self.api
            .get_json(
                &[
                    "v1",
                    "entities",
                    payload.entity_id.as_str(),
                    "attributes",
                    payload.attribute_name.as_str(),
                ],
                &payload.query_params(),
            )
            .await
    }
}
