//! Service catalog: list, lookup, and tag-filtered fetches

use serde_json::Value;

use crate::cache::keys;
use crate::client::http::{check_status, reason_phrase};
use crate::client::models::{ServiceListResponse, ServiceRecord, ServiceTable};
use crate::client::{CachePolicy, CarbonClient};
use crate::error::{ApiError, Result};

impl CarbonClient {
    /// Full service list, normalized into a flat table
    /// (`GET carbon/services`)
    pub async fn all_services(&self, policy: CachePolicy) -> Result<ServiceTable> {
        if policy.use_cache
            && let Some(table) = self
                .store
                .get_json::<ServiceTable>(keys::SERVICES, policy.max_age)?
        {
            return Ok(table);
        }

        let table = self.fetch_service_list(&[]).await?;
        self.store.store_json(keys::SERVICES, &table)?;
        Ok(table)
    }

    /// Service detail by primary id, looked up within the full table
    pub async fn service(&self, id: i64, policy: CachePolicy) -> Result<ServiceRecord> {
        let table = self.all_services(policy).await?;
        table
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("service {id}")).into())
    }

    /// Service detail by a named secondary attribute, matched
    /// case-insensitively. With duplicate values the first record in
    /// table order is returned.
    pub async fn service_by_field(
        &self,
        field: &str,
        value: &str,
        policy: CachePolicy,
    ) -> Result<ServiceRecord> {
        let table = self.all_services(policy).await?;
        table
            .find_by_field(field, value)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("service with {field} '{value}'")).into())
    }

    /// Service detail by NBN AVC identifier
    pub async fn service_by_avc(&self, avc_id: &str, policy: CachePolicy) -> Result<ServiceRecord> {
        self.service_by_field("service_identifier", avc_id, policy)
            .await
    }

    /// Service detail by NBN location identifier
    pub async fn service_by_location_id(
        &self,
        loc_id: &str,
        policy: CachePolicy,
    ) -> Result<ServiceRecord> {
        self.service_by_field("location_id", loc_id, policy).await
    }

    /// Services carrying one tag
    /// (`GET carbon/services?filter[tags]={tag}`).
    ///
    /// An empty result is returned but never cached: a transient empty
    /// response must not read as "this tag has no members" for the rest
    /// of the session. Repeated empty calls re-fetch.
    pub async fn services_by_tag(&self, tag: &str, policy: CachePolicy) -> Result<ServiceTable> {
        let key = keys::services_tag(tag);
        if policy.use_cache
            && let Some(table) = self.store.get_json::<ServiceTable>(&key, policy.max_age)?
        {
            return Ok(table);
        }

        let table = self.fetch_service_list(&[("filter[tags]", tag)]).await?;
        if table.is_empty() {
            log::debug!("tag '{tag}' returned no services; result not cached");
        } else {
            self.store.store_json(&key, &table)?;
        }
        Ok(table)
    }

    /// Services for several tags, fetched per tag in the given order and
    /// concatenated. Records shared by multiple tags appear once per tag;
    /// only a non-empty concatenation is cached.
    pub async fn services_by_tags(
        &self,
        tags: &[&str],
        policy: CachePolicy,
    ) -> Result<ServiceTable> {
        if tags.is_empty() {
            return Ok(ServiceTable::default());
        }

        let key = keys::services_tags(tags);
        if policy.use_cache
            && let Some(table) = self.store.get_json::<ServiceTable>(&key, policy.max_age)?
        {
            return Ok(table);
        }

        let mut combined = ServiceTable::default();
        for tag in tags {
            combined.extend(self.services_by_tag(tag, policy).await?);
        }

        if !combined.is_empty() {
            self.store.store_json(&key, &combined)?;
        }
        Ok(combined)
    }

    /// Single service fetched directly by id
    /// (`GET carbon/services/{id}`), normalized like a table row.
    /// Any 4xx response maps to `NotFound`.
    pub async fn fetch_service(&self, id: i64, policy: CachePolicy) -> Result<ServiceRecord> {
        let key = keys::service(id);
        if policy.use_cache
            && let Some(record) = self.store.get_json::<ServiceRecord>(&key, policy.max_age)?
        {
            return Ok(record);
        }

        let token = self.auth.token().await?;
        let endpoint = format!("carbon/services/{id}");
        let response = self.http.get(&endpoint, Some(&token), &[]).await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(ApiError::NotFound(format!(
                "service {id} (HTTP {}: {})",
                status.as_u16(),
                reason_phrase(status)
            ))
            .into());
        }
        check_status(&response)?;

        let raw: Value = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to decode service response: {e}"))
        })?;
        let record = ServiceRecord::from_raw(raw)?;
        self.store.store_json(&key, &record)?;
        Ok(record)
    }

    /// IP assignments of a service, as the raw `network_ips` entries.
    /// Address and subnet parsing is left to the caller.
    pub async fn service_ip_addresses(
        &self,
        id: i64,
        policy: CachePolicy,
    ) -> Result<Vec<Value>> {
        let record = self.service(id, policy).await?;
        Ok(record
            .field("network_ips")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_service_list(&self, query: &[(&str, &str)]) -> Result<ServiceTable> {
        let token = self.auth.token().await?;
        let response = self.http.get("carbon/services", Some(&token), query).await?;
        check_status(&response)?;

        let body: ServiceListResponse = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to decode service list: {e}"))
        })?;
        Ok(ServiceTable::from_raw(body.data)?)
    }
}
