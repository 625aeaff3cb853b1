pub const APPLICATION_JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const MULTIPART_FORM: &str = "multipart/form-data";
pub const URLENCODED_FORM: &str = "application/x-www-form-urlencoded";

/// Whether a content type is submitted as form fields rather than a single body.
pub fn is_form_content(content_type: &str) -> bool {
    content_type == MULTIPART_FORM || content_type == URLENCODED_FORM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_content_types() {
        assert!(is_form_content(MULTIPART_FORM));
        assert!(is_form_content(URLENCODED_FORM));
        assert!(!is_form_content(APPLICATION_JSON));
        assert!(!is_form_content(OCTET_STREAM));
    }
}
