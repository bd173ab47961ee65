use crate::adapters::http::{build_client, ApiClient};
use crate::config::DEFAULT_TIMEOUT_SECONDS;
use crate::domain::model::{
    AttributeEntry, AttributeValues, EntityRecord, TabularData, TimeBasedValue, WritePayload,
};
use crate::utils::error::{OpenGinError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::io::Read;
use std::time::Duration;

/// Creates, updates and removes entities through the OpenGIN CRUD service.
///
/// Built without configuration: every call names its CRUD base URL, either
/// through the `WritePayload` or as an argument.
#[derive(Debug, Clone)]
pub struct WriteAttributes {
    client: Client,
}

impl WriteAttributes {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    fn api(&self, base_url: &str) -> Result<ApiClient> {
        ApiClient::with_client(self.client.clone(), "base_url", base_url)
    }

    pub async fn create_entity(&self, payload: &WritePayload) -> Result<EntityRecord> {
        payload.validate()?;
        tracing::info!("creating entity {}", payload.entity.id);
        let created: Option<EntityRecord> = self
            .api(&payload.base_url)?
            .post_json(&["entities"], &payload.entity)
            .await?;
        Ok(created.unwrap_or_else(|| payload.entity.clone()))
    }

    pub async fn read_entity(&self, base_url: &str, entity_id: &str) -> Result<EntityRecord> {
        validate_non_empty_string("entity_id", entity_id)?;
        let record: Option<EntityRecord> = self
            .api(base_url)?
            .get_json(&["entities", entity_id], &[])
            .await?;
        record.ok_or_else(|| OpenGinError::NotFound {
            path: format!("/entities/{}", entity_id),
        })
    }

    pub async fn update_entity(&self, payload: &WritePayload) -> Result<EntityRecord> {
        payload.validate()?;
        tracing::info!("updating entity {}", payload.entity.id);
        let updated: Option<EntityRecord> = self
            .api(&payload.base_url)?
            .put_json(&["entities", payload.entity.id.as_str()], &payload.entity)
            .await?;
        Ok(updated.unwrap_or_else(|| payload.entity.clone()))
    }

    pub async fn delete_entity(&self, base_url: &str, entity_id: &str) -> Result<()> {
        validate_non_empty_string("entity_id", entity_id)?;
        tracing::info!("deleting entity {}", entity_id);
        self.api(base_url)?.delete(&["entities", entity_id]).await
    }

    /// Turns CSV data into a tabular attribute entry valid from `start` to `end`.
    pub fn attribute_from_csv<R: Read>(
        &self,
        key: &str,
        reader: R,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<AttributeEntry> {
        validate_non_empty_string("key", key)?;
        let table = TabularData::from_csv_reader(reader)?;
        if table.columns.is_empty() {
            return Err(OpenGinError::invalid_payload(format!(
                "CSV for attribute {} has no header row",
                key
            )));
        }
        tracing::debug!(
            "attribute {}: {} columns, {} rows",
            key,
            table.columns.len(),
            table.rows.len()
        );

        Ok(AttributeEntry {
            key: key.to_string(),
            value: AttributeValues {
                values: vec![TimeBasedValue {
                    start_time: start,
                    end_time: end,
                    value: serde_json::to_value(table)?,
                }],
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Kind;
    use serde_json::json;

    #[test]
    fn test_attribute_from_csv() {
        let writer = WriteAttributes::new().unwrap();
        let entry = writer
            .attribute_from_csv("budget", "year,amount\n2024,100\n".as_bytes(), None, None)
            .unwrap();

        assert_eq!(entry.key, "budget");
        assert_eq!(
            entry.value.values[0].value,
            json!({ "columns": ["year", "amount"], "rows": [[2024, 100]] })
        );
    }

    #[test]
    fn test_attribute_from_empty_csv_is_rejected() {
        let writer = WriteAttributes::new().unwrap();
        assert!(writer
            .attribute_from_csv("budget", "".as_bytes(), None, None)
            .is_err());
    }

    #[test]
    fn test_invalid_payloads_fail_before_io() {
        let writer = WriteAttributes::new().unwrap();
        let entity = EntityRecord::new("", Kind::new("Organisation", "department"), "Treasury");
        let payload = WritePayload::new("http://test:8080", entity);
        let err = tokio_test::block_on(writer.create_entity(&payload)).unwrap_err();
        assert!(matches!(err, OpenGinError::InvalidPayloadError { .. }));

        let entity = EntityRecord::new("dept_01", Kind::new("Organisation", "department"), "Treasury");
        let payload = WritePayload::new("ftp://test", entity);
        let err = tokio_test::block_on(writer.update_entity(&payload)).unwrap_err();
        assert!(err.is_config_error());
    }
}
