/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// New GuidFixed: a v4 UUID without hyphens
pub fn new_guid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Parses a `%Y-%m-%dT%H:%M:%S` UTC timestamp into milliseconds
pub fn parse_last_update(raw: &str) -> Option<i64> {
    chrono::NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_guid_shape() {
        let a = new_guid();
        let b = new_guid();
        assert_eq!(a.len(), 32);
        assert!(!a.contains('-'));
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_last_update() {
        assert_eq!(parse_last_update("1970-01-01T00:00:01"), Some(1000));
        assert_eq!(parse_last_update("2024-01-01"), None);
        assert_eq!(parse_last_update("2024-01-01 00:00:00"), None);
    }
}
