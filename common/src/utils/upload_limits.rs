use super::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadValidationError {
    PayloadTooLarge(String),
    BadRequest(String),
}

/// An upload that passed validation and may be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidUpload {
    pub name: String,
    pub content: String,
}

/// Check an upload before anything is written.
pub fn validate_upload_input(
    config: &AppConfig,
    name: Option<String>,
    content: Option<String>,
) -> Result<ValidUpload, UploadValidationError> {
    let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
        return Err(UploadValidationError::BadRequest(
            "Missing 'name' query parameter, x-document-name header or JSON field".to_string(),
        ));
    };

    let Some(content) = content.filter(|c| !c.is_empty()) else {
        return Err(UploadValidationError::BadRequest(
            "Missing document content in body (raw text or JSON content field)".to_string(),
        ));
    };

    if content.len() > config.upload_max_bytes {
        return Err(UploadValidationError::PayloadTooLarge(format!(
            "Content is too large. Maximum allowed is {} bytes",
            config.upload_max_bytes
        )));
    }

    Ok(ValidUpload { name, content })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn rejects_missing_name() {
        let config = AppConfig::default();
        let result = validate_upload_input(&config, None, some("body"));
        assert!(matches!(result, Err(UploadValidationError::BadRequest(_))));

        let result = validate_upload_input(&config, some("  "), some("body"));
        assert!(matches!(result, Err(UploadValidationError::BadRequest(_))));
    }

    #[test]
    fn rejects_empty_content() {
        let config = AppConfig::default();
        let result = validate_upload_input(&config, some("Doc.txt"), some(""));
        assert!(matches!(result, Err(UploadValidationError::BadRequest(_))));

        let result = validate_upload_input(&config, some("Doc.txt"), None);
        assert!(matches!(result, Err(UploadValidationError::BadRequest(_))));
    }

    #[test]
    fn rejects_oversized_content() {
        let config = AppConfig {
            upload_max_bytes: 4,
            ..Default::default()
        };
        let result = validate_upload_input(&config, some("Doc.txt"), some("12345"));
        assert!(matches!(
            result,
            Err(UploadValidationError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn accepts_content_at_the_limit() {
        let config = AppConfig {
            upload_max_bytes: 5,
            ..Default::default()
        };
        assert_eq!(
            validate_upload_input(&config, some("Doc.txt"), some("12345")),
            Ok(ValidUpload {
                name: "Doc.txt".to_string(),
                content: "12345".to_string()
            })
        );
    }
}
