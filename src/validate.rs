//! Submission validation at the write boundary.
//!
//! The store itself enforces nothing, so nothing invalid may ever be
//! appended: every draft passes through [`validate_submission`] first.

use crate::error::ValidationError;
use crate::record::{Category, ComplaintRecord, GeoPoint};

/// A drafted complaint as received from the form, before it becomes a
/// [`ComplaintRecord`].
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub author: String,
    pub content: String,
    /// Submission date in `YYYY-MM-DD` form.
    pub date: String,
    pub category: Option<Category>,
    pub attachment: Option<String>,
}

impl NewSubmission {
    /// Attach the picked location and produce the record to append.
    pub fn into_record(self, point: GeoPoint) -> ComplaintRecord {
        ComplaintRecord {
            author: self.author,
            content: self.content,
            latitude: point.lat,
            longitude: point.lon,
            date: self.date,
            category: self.category,
            attachment: self.attachment,
        }
    }
}

/// Check a draft before it is persisted.
///
/// The location check runs first: without a picked point nothing else is
/// even considered, so the user is told to fix the map before the form.
/// `category` is `None` for form versions without a category field; when
/// the field exists it must not be blank.
pub fn validate_submission(
    point: Option<GeoPoint>,
    author: &str,
    content: &str,
    category: Option<&str>,
) -> Result<GeoPoint, ValidationError> {
    let point = point.ok_or(ValidationError::MissingLocation)?;

    let blank = |s: &str| s.trim().is_empty();
    if blank(author) || blank(content) || category.is_some_and(blank) {
        return Err(ValidationError::MissingFields);
    }

    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> GeoPoint {
        GeoPoint::new(37.5665, 126.978).unwrap()
    }

    #[test]
    fn missing_location_wins_over_everything() {
        // Even a fully blank form reports the location first.
        assert_eq!(
            validate_submission(None, "", "", None),
            Err(ValidationError::MissingLocation)
        );
        assert_eq!(
            validate_submission(None, "Kim", "Pothole", Some("Road")),
            Err(ValidationError::MissingLocation)
        );
    }

    #[test]
    fn blank_author_or_content_is_missing_fields() {
        assert_eq!(
            validate_submission(Some(point()), "", "x", None),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            validate_submission(Some(point()), "Kim", "   ", None),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn blank_category_counts_only_when_the_field_exists() {
        assert_eq!(
            validate_submission(Some(point()), "Kim", "x", Some("")),
            Err(ValidationError::MissingFields)
        );
        assert!(validate_submission(Some(point()), "Kim", "x", None).is_ok());
        assert!(validate_submission(Some(point()), "Kim", "x", Some("Road")).is_ok());
    }
}
