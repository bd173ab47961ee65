use crate::adapters::http::ApiClient;
use crate::adapters::query::QueryClient;
use crate::config::{Config, BASE_URL_QUERY};
use crate::domain::model::{Entity, MinisterNode, OrgChart, RelationFilter};
use crate::domain::ports::QueryApi;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

pub const AS_MINISTER: &str = "AS_MINISTER";
pub const AS_DEPARTMENT: &str = "AS_DEPARTMENT";
pub const DEFAULT_GOVERNMENT_ID: &str = "gov_01";

/// Walks the government → minister → department structure as of a date.
#[derive(Debug, Clone)]
pub struct IncomingServiceOrgchart {
    config: Config,
    query: QueryClient,
}

impl IncomingServiceOrgchart {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let api = ApiClient::new(BASE_URL_QUERY, &config.base_url_query, config.timeout())?;
        tracing::debug!("IncomingServiceOrgchart -> {}", config.base_url_query);
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

    pub async fn ministers(
        &self,
        government_id: &str,
        active_at: DateTime<Utc>,
    ) -> Result<Vec<Entity>> {
        validate_non_empty_string("government_id", government_id)?;
        related_entities(&self.query, government_id, AS_MINISTER, active_at).await
    }

    pub async fn departments(
        &self,
        minister_id: &str,
        active_at: DateTime<Utc>,
    ) -> Result<Vec<Entity>> {
        validate_non_empty_string("minister_id", minister_id)?;
        related_entities(&self.query, minister_id, AS_DEPARTMENT, active_at).await
    }

    pub async fn orgchart(&self, government_id: &str, active_at: DateTime<Utc>) -> Result<OrgChart> {
        validate_non_empty_string("government_id", government_id)?;
        build_orgchart(&self.query, government_id, active_at).await
    }
}

/// Entities reached from `entity_id` over outgoing `relation_name` edges that
/// are active at `active_at`, sorted by name. Targets created after or
/// terminated by `active_at` are left out even when the edge is still open.
/// Duplicate edges to the same target collapse into one entry.
pub async fn related_entities<Q>(
    api: &Q,
    entity_id: &str,
    relation_name: &str,
    active_at: DateTime<Utc>,
) -> Result<Vec<Entity>>
where
    Q: QueryApi + ?Sized,
{
    let filter = RelationFilter::named(relation_name)
        .active_at(active_at)
        .outgoing();
    let relations = api.fetch_relations(entity_id, &filter).await?;

    let mut seen = HashSet::new();
    let mut entities = Vec::with_capacity(relations.len());
    for relation in relations {
        if !seen.insert(relation.related_entity_id.clone()) {
            continue;
        }
        match api.find_entity(&relation.related_entity_id).await? {
            Some(entity) if entity.is_active_at(active_at) => entities.push(entity),
            Some(entity) => tracing::debug!(
                "skipping {} target {}: not active at {}",
                relation_name,
                entity.id,
                active_at
            ),
            None => tracing::warn!(
                "{} target {} of {} was not found",
                relation_name,
                relation.related_entity_id,
                entity_id
            ),
        }
    }

    entities.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(entities)
}

pub async fn build_orgchart<Q>(
    api: &Q,
    government_id: &str,
    active_at: DateTime<Utc>,
) -> Result<OrgChart>
where
    Q: QueryApi + ?Sized,
{
    let ministers = related_entities(api, government_id, AS_MINISTER, active_at).await?;

    let mut nodes = Vec::with_capacity(ministers.len());
    for minister in ministers {
        let departments = related_entities(api, &minister.id, AS_DEPARTMENT, active_at).await?;
        nodes.push(MinisterNode {
            minister,
            departments,
        });
    }

    let chart = OrgChart {
        government_id: government_id.to_string(),
        active_at,
        ministers: nodes,
    };
    tracing::info!(
        "orgchart for {} at {}: {} ministers, {} departments",
        government_id,
        active_at,
        chart.ministers.len(),
        chart.department_count()
    );
    Ok(chart)
}
