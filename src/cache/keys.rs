//! Cache key layout
//!
//! One entry per logical key. Parameterised keys embed their parameters
//! directly, so the persisted store stays inspectable with plain SQL.

/// Raw login response body (`{accessToken, expiresIn}`)
pub const LOGIN_RESPONSE: &str = "login_response";

/// Epoch second after which the session has lapsed. This entry gates every
/// other read in the store.
pub const LOGIN_EXPIRY: &str = "login_expiry";

/// Wholesale customer record
pub const CUSTOMER: &str = "customer";

/// Full normalized service table
pub const SERVICES: &str = "services";

/// Single service fetched directly by id
pub fn service(id: i64) -> String {
    format!("service_{id}")
}

/// Service table for one tag-filtered fetch
pub fn services_tag(tag: &str) -> String {
    format!("services_tag_{tag}")
}

/// Concatenated service table for an ordered tag set
pub fn services_tags(tags: &[&str]) -> String {
    format!("services_tags_{}", tags.join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_key_embeds_id() {
        assert_eq!(service(42), "service_42");
    }

    #[test]
    fn test_tag_key_embeds_tag() {
        assert_eq!(services_tag("voip"), "services_tag_voip");
    }

    #[test]
    fn test_tags_key_preserves_order() {
        assert_eq!(services_tags(&["a", "b"]), "services_tags_a_b");
        assert_eq!(services_tags(&["b", "a"]), "services_tags_b_a");
    }
}
