use crate::domain::model::{
    AttributePayload, AttributeValue, Direction, Entity, EntityPayload, Kind, Relation,
    RelationFilter,
};
use crate::domain::ports::QueryApi;
use crate::utils::error::{OpenGinError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// In-memory query backend for exercising graph walks without HTTP.
#[derive(Debug, Default)]
pub struct FakeQuery {
    entities: HashMap<String, Entity>,
    relations: Vec<(String, Relation)>,
}

impl FakeQuery {
    pub fn with_entity(mut self, id: &str, kind: Kind, name: &str) -> Self {
        self.entities.insert(
            id.to_string(),
            Entity {
                id: id.to_string(),
                kind,
                name: name.to_string(),
                ..Entity::default()
            },
        );
        self
    }

    pub fn with_lifetime(
        mut self,
        id: &str,
        created: Option<DateTime<Utc>>,
        terminated: Option<DateTime<Utc>>,
    ) -> Self {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.created = created;
            entity.terminated = terminated;
        }
        self
    }

    pub fn with_relation(self, from: &str, name: &str, to: &str) -> Self {
        self.with_relation_during(from, name, to, None, None)
    }

    pub fn with_relation_during(
        mut self,
        from: &str,
        name: &str,
        to: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        let id = format!("{}-{}-{}", from, name, to);
        self.relations.push((
            from.to_string(),
            Relation {
                id,
                related_entity_id: to.to_string(),
                name: name.to_string(),
                start_time: start,
                end_time: end,
                direction: Some(Direction::Outgoing),
            },
        ));
        self
    }
}

#[async_trait]
impl QueryApi for FakeQuery {
    async fn search_entities(&self, payload: &EntityPayload) -> Result<Vec<Entity>> {
        payload.validate()?;
        if !payload.id.is_empty() {
            return Ok(self.entities.get(&payload.id).cloned().into_iter().collect());
        }
        Ok(self
            .entities
            .values()
            .filter(|e| e.kind.major == payload.kind.major)
            .filter(|e| payload.kind.minor.is_empty() || e.kind.minor == payload.kind.minor)
            .cloned()
            .collect())
    }

    async fn fetch_relations(
        &self,
        entity_id: &str,
        filter: &RelationFilter,
    ) -> Result<Vec<Relation>> {
        Ok(self
            .relations
            .iter()
            .filter(|(from, _)| from == entity_id)
            .map(|(_, relation)| relation)
            .filter(|r| filter.name.is_empty() || r.name == filter.name)
            .filter(|r| match filter.active_at {
                Some(at) => {
                    r.start_time.map_or(true, |s| s <= at) && r.end_time.map_or(true, |e| e > at)
                }
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn fetch_metadata(&self, _entity_id: &str) -> Result<Map<String, Value>> {
        Ok(Map::new())
    }

    async fn fetch_attribute(&self, payload: &AttributePayload) -> Result<AttributeValue> {
        Err(OpenGinError::NotFound {
            path: format!(
                "/v1/entities/{}/attributes/{}",
                payload.entity_id, payload.attribute_name
            ),
        })
    }
}
