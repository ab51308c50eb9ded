//! Validated JSON extractor.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use common::AppError;
use domain::ValidationErrors;

/// JSON extractor that automatically validates the payload.
///
/// Every failing field is reported, not only the first one.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        value.validate().map_err(into_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

fn into_validation_errors(errors: validator::ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut result = ValidationErrors::new();
    for (field, field_errors) in fields {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "is invalid".to_string());
            result.add(field.to_string(), message);
        }
    }
    AppError::Validation(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "can't be blank"))]
        name: String,
        #[validate(email(message = "is invalid"))]
        email: String,
    }

    #[test]
    fn test_all_field_errors_reported() {
        let payload = Payload {
            name: String::new(),
            email: "nope".to_string(),
        };
        let error = into_validation_errors(payload.validate().unwrap_err());

        match error {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.has_field("name"));
                assert!(errors.has_field("email"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
