use crate::domain::codec::{deserialize_name, optional_timestamp};
use crate::utils::error::{OpenGinError, Result};
use crate::utils::validation::{validate_url, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Read;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind {
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub minor: String,
}

impl Kind {
    pub fn new(major: impl Into<String>, minor: impl Into<String>) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.major.is_empty() && self.minor.is_empty()
    }
}

/// Search filter sent to `POST /v1/entities/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPayload {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Kind::is_empty")]
    pub kind: Kind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub terminated: Option<DateTime<Utc>>,
}

impl EntityPayload {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn by_kind(major: impl Into<String>, minor: impl Into<String>) -> Self {
        Self {
            kind: Kind::new(major, minor),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn created_at(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }
}

/// The query service rejects searches that pin neither an id nor a major kind.
impl Validate for EntityPayload {
    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() && self.kind.major.trim().is_empty() {
            return Err(OpenGinError::invalid_payload(
                "entity search needs an id or a kind.major",
            ));
        }
        Ok(())
    }
}

/// Addresses one attribute of one entity, optionally within a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributePayload {
    pub entity_id: String,
    pub attribute_name: String,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl AttributePayload {
    pub fn new(entity_id: impl Into<String>, attribute_name: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            attribute_name: attribute_name.into(),
            ..Self::default()
        }
    }

    pub fn with_window(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Query string for `GET /v1/entities/{id}/attributes/{name}`.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(start) = self.start_time {
            params.push(("startTime", to_wire_time(&start)));
        }
        if let Some(end) = self.end_time {
            params.push(("endTime", to_wire_time(&end)));
        }
        if !self.fields.is_empty() {
            params.push(("fields", self.fields.join(",")));
        }
        params
    }
}

impl Validate for AttributePayload {
    fn validate(&self) -> Result<()> {
        if self.entity_id.trim().is_empty() {
            return Err(OpenGinError::invalid_payload("attribute entity_id is empty"));
        }
        if self.attribute_name.trim().is_empty() {
            return Err(OpenGinError::invalid_payload("attribute_name is empty"));
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(OpenGinError::invalid_payload(format!(
                    "attribute window ends ({}) before it starts ({})",
                    end, start
                )));
            }
        }
        Ok(())
    }
}

/// Entity write request for the CRUD service. The base URL travels with the
/// payload since the writer is built without configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WritePayload {
    pub base_url: String,
    pub entity: EntityRecord,
}

impl WritePayload {
    pub fn new(base_url: impl Into<String>, entity: EntityRecord) -> Self {
        Self {
            base_url: base_url.into(),
            entity,
        }
    }
}

impl Validate for WritePayload {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        if self.entity.id.trim().is_empty() {
            return Err(OpenGinError::invalid_payload("entity id is empty"));
        }
        Ok(())
    }
}

/// Entity as returned by the query service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(default)]
    pub kind: Kind,
    #[serde(default, deserialize_with = "deserialize_name")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub terminated: Option<DateTime<Utc>>,
}

impl Entity {
    /// Active at `at`: created on or before it and not yet terminated.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        let started = self.created.map_or(true, |c| c <= at);
        let running = self.terminated.map_or(true, |t| t > at);
        started && running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub related_entity_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// Body of `POST /v1/entities/{id}/relations`. Empty fields are left out so the
/// server treats them as wildcards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationFilter {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub related_entity_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl RelationFilter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn active_at(mut self, at: DateTime<Utc>) -> Self {
        self.active_at = Some(at);
        self
    }

    pub fn outgoing(mut self) -> Self {
        self.direction = Some(Direction::Outgoing);
        self
    }

    pub fn incoming(mut self) -> Self {
        self.direction = Some(Direction::Incoming);
        self
    }
}

/// Response of `GET /v1/entities/{id}/attributes/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub start: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub value: Value,
}

/// Tabular attribute data: `{"columns": [...], "rows": [[...], ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularData {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl TabularData {
    /// Accepts the table either as an object or as a JSON-encoded string.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => serde_json::from_str(s)
                .map_err(|e| OpenGinError::decode(format!("attribute is not a table: {}", e))),
            Value::Object(_) => serde_json::from_value(value.clone())
                .map_err(|e| OpenGinError::decode(format!("attribute is not a table: {}", e))),
            other => Err(OpenGinError::decode(format!(
                "attribute is not a table: {}",
                other
            ))),
        }
    }

    /// Reads CSV with a header row. Integer and float cells become numbers,
    /// empty cells become null, everything else stays a string.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(parse_cell).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rows as column-keyed maps.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }
}

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = cell.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(cell.to_string())
}

/// An attribute entity linked to its parent through `IS_ATTRIBUTE`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSummary {
    pub id: String,
    pub name: String,
    pub kind: Kind,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinisterNode {
    pub minister: Entity,
    pub departments: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrgChart {
    pub government_id: String,
    pub active_at: DateTime<Utc>,
    pub ministers: Vec<MinisterNode>,
}

impl OrgChart {
    pub fn department_count(&self) -> usize {
        self.ministers.iter().map(|m| m.departments.len()).sum()
    }
}

// CRUD service shapes

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBasedValue {
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeValues {
    #[serde(default)]
    pub values: Vec<TimeBasedValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeEntry {
    pub key: String,
    pub value: AttributeValues,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipValue {
    pub related_entity_id: String,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEntry {
    pub key: String,
    pub value: RelationshipValue,
}

/// Full entity document accepted and returned by the CRUD service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub id: String,
    #[serde(default)]
    pub kind: Kind,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub terminated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub name: TimeBasedValue,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<RelationshipEntry>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, kind: Kind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: TimeBasedValue {
                value: Value::String(name.into()),
                ..TimeBasedValue::default()
            },
            ..Self::default()
        }
    }

    pub fn created_at(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self.name.start_time = Some(created);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.push(MetadataEntry {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeEntry) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_relationship(mut self, key: impl Into<String>, value: RelationshipValue) -> Self {
        self.relationships.push(RelationshipEntry {
            key: key.into(),
            value,
        });
        self
    }

    /// Plain name, decoding the protobuf wrapper the CRUD service echoes back.
    pub fn display_name(&self) -> Result<String> {
        crate::domain::codec::decode_name(&self.name.value)
    }
}

/// Timestamps on the wire use second precision with a `Z` suffix.
pub fn to_wire_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
