use std::path::Path;

/// Content type used when the extension is missing or unrecognized.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Infer a content type from the last dot-segment of the file name.
///
/// Matching is exact and case-sensitive: `logo.PNG` is not `image/png`.
pub fn content_type_for(path: impl AsRef<Path>) -> &'static str {
    let Some(name) = path.as_ref().file_name().and_then(|n| n.to_str()) else {
        return DEFAULT_CONTENT_TYPE;
    };
    let Some((_, ext)) = name.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext {
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "html" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
