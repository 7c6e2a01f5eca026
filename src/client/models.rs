//! Wire models and row normalization for Carbon service payloads
//!
//! Service objects come back from the API with nested `network` and
//! `network.headend` sub-objects. Records are flattened into prefixed
//! top-level fields (`network_*`, `headend_*`) so a table of services can
//! be queried uniformly by field name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Envelope of the service list endpoints (`{"data": [...]}`)
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceListResponse {
    pub data: Vec<Value>,
}

/// One service, flattened into a single level of fields.
///
/// Payloads are heterogeneous across service types, so fields are kept as
/// a JSON map rather than a rigid struct; the identifying attributes have
/// typed accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceRecord {
    fields: Map<String, Value>,
}

impl ServiceRecord {
    /// Normalize a raw API service object: `network` is flattened to
    /// `network_*` fields, then `network_headend` to `headend_*`. The
    /// nested keys themselves do not survive.
    pub(crate) fn from_raw(raw: Value) -> std::result::Result<Self, ApiError> {
        let Value::Object(mut fields) = raw else {
            return Err(ApiError::InvalidResponse(
                "Service entry is not a JSON object".to_string(),
            ));
        };
        flatten_into(&mut fields, "network", "network_");
        flatten_into(&mut fields, "network_headend", "headend_");
        Ok(Self { fields })
    }

    /// Primary identifier
    pub fn id(&self) -> Option<i64> {
        self.fields.get("id").and_then(Value::as_i64)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Case-insensitive exact match on a string field
    pub(crate) fn field_matches(&self, name: &str, value: &str) -> bool {
        self.field_str(name)
            .is_some_and(|v| v.eq_ignore_ascii_case(value))
    }
}

/// Move a nested object's fields up into the parent with a prefix. The
/// source key is removed whether or not it held an object.
fn flatten_into(fields: &mut Map<String, Value>, source: &str, prefix: &str) {
    if let Some(Value::Object(nested)) = fields.remove(source) {
        for (name, value) in nested {
            fields.insert(format!("{prefix}{name}"), value);
        }
    }
}

/// Ordered collection of normalized service records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTable {
    records: Vec<ServiceRecord>,
}

impl ServiceTable {
    pub(crate) fn from_raw(data: Vec<Value>) -> std::result::Result<Self, ApiError> {
        let records = data
            .into_iter()
            .map(ServiceRecord::from_raw)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceRecord> {
        self.records.iter()
    }

    pub fn find_by_id(&self, id: i64) -> Option<&ServiceRecord> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    /// First record whose `field` equals `value` case-insensitively.
    /// Uniqueness of secondary attributes is assumed, not enforced; with
    /// duplicates the first in table order wins.
    pub fn find_by_field(&self, field: &str, value: &str) -> Option<&ServiceRecord> {
        self.records.iter().find(|r| r.field_matches(field, value))
    }

    /// Append another table's rows, preserving both orders
    pub(crate) fn extend(&mut self, other: ServiceTable) {
        self.records.extend(other.records);
    }
}

impl IntoIterator for ServiceTable {
    type Item = ServiceRecord;
    type IntoIter = std::vec::IntoIter<ServiceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ServiceTable {
    type Item = &'a ServiceRecord;
    type IntoIter = std::slice::Iter<'a, ServiceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
