use crate::domain::model::{
    AttributePayload, AttributeValue, Entity, EntityPayload, Relation, RelationFilter,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Read side of OpenGIN: the operations the query service exposes.
#[async_trait]
pub trait QueryApi: Send + Sync {
    async fn search_entities(&self, payload: &EntityPayload) -> Result<Vec<Entity>>;
    async fn fetch_relations(&self, entity_id: &str, filter: &RelationFilter)
        -> Result<Vec<Relation>>;
    async fn fetch_metadata(&self, entity_id: &str) -> Result<Map<String, Value>>;
    async fn fetch_attribute(&self, payload: &AttributePayload) -> Result<AttributeValue>;

    /// Resolves a single entity by id; `None` when the search comes back empty.
    async fn find_entity(&self, entity_id: &str) -> Result<Option<Entity>> {
        let mut found = self
            .search_entities(&EntityPayload::by_id(entity_id))
            .await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }
}
