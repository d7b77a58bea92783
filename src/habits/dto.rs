use serde::Deserialize;

use super::repo::{Category, Frequency};
use crate::error::ApiError;

pub const NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHabitRequest {
    pub name: Option<String>,
    /// Absent leaves the description untouched; an empty string clears it.
    pub description: Option<String>,
    pub category: Option<Category>,
    pub frequency: Option<Frequency>,
}

fn validate_name(name: &mut String) -> Result<(), ApiError> {
    *name = name.trim().to_string();
    if name.is_empty() || name.chars().count() > NAME_MAX {
        return Err(ApiError::Validation {
            field: "name",
            message: "habit name is required and must be at most 100 characters",
        });
    }
    Ok(())
}

fn validate_description(description: &mut String) -> Result<(), ApiError> {
    *description = description.trim().to_string();
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(ApiError::Validation {
            field: "description",
            message: "description must be at most 500 characters",
        });
    }
    Ok(())
}

impl CreateHabitRequest {
    pub fn validate(&mut self) -> Result<(), ApiError> {
        validate_name(&mut self.name)?;
        if let Some(d) = self.description.as_mut() {
            validate_description(d)?;
        }
        Ok(())
    }
}

impl UpdateHabitRequest {
    pub fn validate(&mut self) -> Result<(), ApiError> {
        if let Some(n) = self.name.as_mut() {
            validate_name(n)?;
        }
        if let Some(d) = self.description.as_mut() {
            validate_description(d)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_req(name: &str) -> CreateHabitRequest {
        CreateHabitRequest {
            name: name.into(),
            description: None,
            category: Category::Health,
            frequency: None,
        }
    }

    #[test]
    fn name_is_trimmed() {
        let mut req = create_req("  Drink water  ");
        req.validate().expect("valid");
        assert_eq!(req.name, "Drink water");
    }

    #[test]
    fn empty_or_whitespace_name_is_rejected() {
        assert!(create_req("").validate().is_err());
        assert!(create_req("   ").validate().is_err());
    }

    #[test]
    fn name_boundary_lengths() {
        assert!(create_req(&"x".repeat(100)).validate().is_ok());
        let err = create_req(&"x".repeat(101)).validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "name", .. }));
    }

    #[test]
    fn description_boundary_lengths() {
        let mut req = create_req("Read");
        req.description = Some("d".repeat(500));
        assert!(req.validate().is_ok());

        let mut req = create_req("Read");
        req.description = Some("d".repeat(501));
        let err = req.validate().unwrap_err();
        assert!(matches!(err, ApiError::Validation { field: "description", .. }));
    }

    #[test]
    fn update_leaves_absent_fields_alone() {
        let mut req = UpdateHabitRequest {
            name: None,
            description: None,
            category: None,
            frequency: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_rejects_blank_name() {
        let mut req = UpdateHabitRequest {
            name: Some("   ".into()),
            description: None,
            category: None,
            frequency: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn category_deserializes_from_lowercase_only_known_values() {
        let cat: Category = serde_json::from_str("\"mindfulness\"").expect("known category");
        assert_eq!(cat, Category::Mindfulness);
        assert!(serde_json::from_str::<Category>("\"sleep\"").is_err());
    }

    #[test]
    fn frequency_defaults_to_daily() {
        assert_eq!(Frequency::default(), Frequency::Daily);
    }
}
