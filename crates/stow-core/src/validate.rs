//! Field-level validation, applied before anything reaches a store.

use crate::entity::ItemDraft;

/// A single invalid or missing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field '{}': {}", self.field, self.message)
    }
}

impl ValidationError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate an item draft. Returns every violation, not just the first.
pub fn validate_draft(draft: &ItemDraft) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "name is required"));
    }
    if draft.quantity < 0 {
        errors.push(ValidationError::new("quantity", "quantity must not be negative"));
    }
    if draft.price < 0.0 || draft.price.is_nan() {
        errors.push(ValidationError::new("price", "price must not be negative"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a category or location name (used by the create paths).
pub fn validate_entity_name(field: &str, name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new(field, "name cannot be empty"));
    }
    Ok(())
}

/// Join validation errors into a single display string.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn draft() -> ItemDraft {
        ItemDraft {
            name: "Multimeter".into(),
            description: String::new(),
            quantity: 1,
            price: 39.90,
            category: Uuid::new_v4(),
            location: None,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(validate_draft(&draft()).is_ok());
    }

    #[test]
    fn negative_quantity_rejected() {
        let mut d = draft();
        d.quantity = -1;
        let errors = validate_draft(&d).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "quantity");
    }

    #[test]
    fn nan_price_rejected() {
        let mut d = draft();
        d.price = f64::NAN;
        assert!(validate_draft(&d).is_err());
    }

    #[test]
    fn all_violations_reported() {
        let mut d = draft();
        d.name = "   ".into();
        d.quantity = -3;
        d.price = -0.5;
        let errors = validate_draft(&d).unwrap_err();
        assert_eq!(errors.len(), 3);
        let joined = join_errors(&errors);
        assert!(joined.contains("name"));
        assert!(joined.contains("quantity"));
        assert!(joined.contains("price"));
    }

    #[test]
    fn blank_entity_name_rejected() {
        assert!(validate_entity_name("location", "").is_err());
        assert!(validate_entity_name("location", "Garage").is_ok());
    }
}
