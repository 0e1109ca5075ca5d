use gerbil_core::AppError;
use uuid::Uuid;

pub mod audit;
pub mod dashboard;
pub mod governance;
pub mod health;
pub mod projects;
pub mod reports;
pub mod resources;
pub mod tasks;
pub mod worker;

/// Parses a storage id taken from the path. Ids that cannot exist are reported
/// as missing rather than malformed.
fn parse_path_id(kind: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::NotFound(format!("{kind} '{raw}' does not exist")))
}

#[cfg(test)]
mod tests {
    use gerbil_core::AppError;
    use uuid::Uuid;

    use super::parse_path_id;

    #[test]
    fn malformed_path_ids_are_not_found() {
        assert!(matches!(
            parse_path_id("project", "PRJ-1"),
            Err(AppError::NotFound(_))
        ));

        let id = Uuid::new_v4();
        assert_eq!(parse_path_id("project", &id.to_string()).ok(), Some(id));
    }
}
