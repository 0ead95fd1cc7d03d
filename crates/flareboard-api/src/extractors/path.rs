//! Typed path parameter helpers.

use std::str::FromStr;

use flareboard_core::error::AppError;

/// Parses a typed identifier from a path segment.
pub fn parse_id<T: FromStr>(s: &str) -> Result<T, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid identifier: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flareboard_core::types::id::NotificationId;

    #[test]
    fn test_parse_id() {
        let id = NotificationId::new();
        assert_eq!(parse_id::<NotificationId>(&id.to_string()).unwrap(), id);
        assert!(parse_id::<NotificationId>("not-a-uuid").is_err());
    }
}
