//! Wholesale customer operation

use serde_json::Value;

use crate::cache::keys;
use crate::client::http::check_status;
use crate::client::{CachePolicy, CarbonClient};
use crate::error::{ApiError, Result};

impl CarbonClient {
    /// Wholesale customer record (`GET customer?v=2`)
    pub async fn customer(&self, policy: CachePolicy) -> Result<Value> {
        if policy.use_cache
            && let Some(customer) = self
                .store
                .get_json::<Value>(keys::CUSTOMER, policy.max_age)?
        {
            return Ok(customer);
        }

        let token = self.auth.token().await?;
        let response = self.http.get("customer", Some(&token), &[("v", "2")]).await?;
        check_status(&response)?;

        let customer: Value = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to decode customer response: {e}"))
        })?;
        self.store.store_json(keys::CUSTOMER, &customer)?;
        Ok(customer)
    }
}
