use super::error::UploadError;
use super::naming::extension_of;

/// Extensions and MIME subtypes the gate lets through.
pub const ALLOWED_TYPES: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

fn is_allowed(token: &str) -> bool {
    ALLOWED_TYPES.contains(&token)
}

fn extension_allowed(original_name: &str) -> bool {
    let ext = extension_of(original_name)
        .trim_start_matches('.')
        .to_ascii_lowercase();
    is_allowed(&ext)
}

/// `image/<allowed>`, ignoring parameters and case.
fn mime_allowed(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.split_once('/') {
        Some(("image", subtype)) => is_allowed(subtype),
        _ => false,
    }
}

/// Both the declared extension and the MIME type must name an allowed
/// image format.
pub fn check_file_type(original_name: &str, mime_type: &str) -> Result<(), UploadError> {
    if extension_allowed(original_name) && mime_allowed(mime_type) {
        Ok(())
    } else {
        Err(UploadError::InvalidFileType)
    }
}
