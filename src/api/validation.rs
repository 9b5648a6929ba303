use super::ApiError;
use crate::models::{FavoriteAction, WatchStatus};

pub fn validate_watch_status(status: &str) -> Result<WatchStatus, ApiError> {
    WatchStatus::parse(status).ok_or_else(|| ApiError::unprocessable("Invalid status value"))
}

pub fn validate_favorite_action(action: &str) -> Result<FavoriteAction, ApiError> {
    FavoriteAction::parse(action).ok_or_else(|| {
        ApiError::unprocessable(format!(
            "Invalid action: {}. Action must be 'add' or 'remove'",
            action
        ))
    })
}

pub fn validate_role(role: &str) -> Result<&str, ApiError> {
    if role == "user" || role == "admin" {
        Ok(role)
    } else {
        Err(ApiError::unprocessable(format!(
            "Invalid role: {}. Role must be 'user' or 'admin'",
            role
        )))
    }
}

pub fn require_non_empty<'a>(value: &'a str, message: &str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(message));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_watch_status() {
        assert!(validate_watch_status("planned").is_ok());
        assert!(validate_watch_status("watching").is_ok());
        assert!(validate_watch_status("completed").is_ok());
        assert!(validate_watch_status("dropped").is_ok());
        assert!(validate_watch_status("paused").is_err());
        assert!(validate_watch_status("").is_err());
        assert!(validate_watch_status("Watching").is_err());
    }

    #[test]
    fn test_validate_favorite_action() {
        assert!(validate_favorite_action("add").is_ok());
        assert!(validate_favorite_action("remove").is_ok());
        assert!(validate_favorite_action("toggle").is_err());
        assert!(validate_favorite_action("").is_err());
    }

    #[test]
    fn test_validate_role() {
        assert!(validate_role("user").is_ok());
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("moderator").is_err());
        assert!(validate_role("").is_err());
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("title", "required").is_ok());
        assert!(require_non_empty("", "required").is_err());
        assert!(require_non_empty("   ", "required").is_err());
    }
}
