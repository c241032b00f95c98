/// Request validation layer
///
/// Runs once per request, before any authorization or business logic:
/// a pure function from (schema, raw input) to validated data or a
/// field-keyed error map. The schema side is declarative: request DTOs
/// derive `validator::Validate` for per-field constraints and use
/// `#[serde(deny_unknown_fields)]` for strict input. The coercions and
/// cross-field refinements that the derive cannot express live here.
///
/// On success the handler proceeds with coerced values (date strings become
/// `DateTime<Utc>`); on failure the response is a 400 with
/// `errors: {field: [messages]}`, distinct from authorization/not-found
/// failures.

use chrono::{DateTime, NaiveDate, Utc};
use validator::Validate;

use crate::error::{ApiError, FieldErrors};

/// Validates a request DTO, mapping failures to the field-error shape
///
/// # Errors
///
/// Returns `ApiError::Validation` with one entry per failing field.
pub fn validate<T: Validate>(input: &T) -> Result<(), ApiError> {
    input.validate().map_err(|e| {
        let mut fields = FieldErrors::new();

        for (field, errors) in e.field_errors() {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }

        ApiError::Validation(fields)
    })
}

/// Builds a validation error for a single field
pub fn field_error(field: &str, message: &str) -> ApiError {
    let mut fields = FieldErrors::new();
    fields.insert(field.to_string(), vec![message.to_string()]);
    ApiError::Validation(fields)
}

/// Coerces a textual date into a `DateTime<Utc>`
///
/// Accepts a plain date (`"2024-03-01"`, coerced to midnight UTC) or a full
/// RFC 3339 timestamp. Anything else is a validation failure keyed to
/// `field`.
pub fn parse_date(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc());
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.with_timezone(&Utc));
    }

    Err(field_error(
        field,
        &format!("Invalid date: {:?} (expected YYYY-MM-DD)", raw),
    ))
}

/// Coerces an optional textual date, passing absence through
pub fn parse_date_opt(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    raw.map(|value| parse_date(field, value)).transpose()
}

/// Cross-field refinement: the end date must not precede the start date
///
/// Only enforced when both are present in the same request; a partial
/// update that touches one side is checked against what it supplies.
pub fn check_date_order(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ApiError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(field_error("endDate", "End date must not precede start date"));
        }
    }

    Ok(())
}

/// Requires a string to be non-empty after trimming
///
/// Use for required name/title fields where `""` or `"   "` must fail even
/// though the field was present.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(field_error(field, "Must not be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use validator::Validate;

    #[derive(Validate)]
    struct SampleRequest {
        #[validate(email(message = "Invalid email format"))]
        email: String,

        #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
        priority: i32,
    }

    #[test]
    fn test_validate_collects_field_errors() {
        let request = SampleRequest {
            email: "not-an-email".to_string(),
            priority: 9,
        };

        let err = validate(&request).unwrap_err();
        match err {
            ApiError::Validation(fields) => {
                assert_eq!(fields["email"], vec!["Invalid email format"]);
                assert_eq!(fields["priority"], vec!["Priority must be between 1 and 5"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_passes_clean_input() {
        let request = SampleRequest {
            email: "pat@example.com".to_string(),
            priority: 3,
        };

        assert!(validate(&request).is_ok());
    }

    #[test]
    fn test_parse_date_coerces_to_midnight_utc() {
        let parsed = parse_date("startDate", "2024-03-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_accepts_rfc3339() {
        let parsed = parse_date("startDate", "2024-03-01T09:30:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_garbage_keyed_to_field() {
        let err = parse_date("startDate", "not-a-date").unwrap_err();
        match err {
            ApiError::Validation(fields) => {
                assert!(fields.contains_key("startDate"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_date_opt_passes_absence() {
        assert_eq!(parse_date_opt("endDate", None).unwrap(), None);
        assert!(parse_date_opt("endDate", Some("2024-12-31")).unwrap().is_some());
    }

    #[test]
    fn test_date_order_refinement() {
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        assert!(check_date_order(Some(early), Some(late)).is_ok());
        assert!(check_date_order(Some(early), Some(early)).is_ok());
        assert!(check_date_order(Some(late), Some(early)).is_err());

        // One side absent: nothing to refine
        assert!(check_date_order(Some(late), None).is_ok());
        assert!(check_date_order(None, Some(early)).is_ok());
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("name", "Acme").is_ok());
        assert!(require_non_blank("name", "").is_err());
        assert!(require_non_blank("name", "   ").is_err());
    }
}
