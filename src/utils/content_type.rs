/// Extension-to-MIME table used for the upload PUT. Matching is a
/// case-insensitive suffix check on the whole filename, no content sniffing.
const EXTENSION_MIME_TYPES: &[(&[&str], &str)] = &[
    (&[".jpg", ".jpeg"], "image/jpeg"),
    (&[".png"], "image/png"),
    (&[".tif", ".tiff"], "image/tiff"),
    (&[".webp"], "image/webp"),
    (&[".heic", ".heif"], "image/heif"),
    (&[".mp4"], "video/mp4"),
    (&[".pdf"], "application/pdf"),
];

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub fn infer_content_type(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    EXTENSION_MIME_TYPES
        .iter()
        .find(|(exts, _)| exts.iter().any(|ext| lower.ends_with(ext)))
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// Inserts `-signed` before the last extension, or appends it when the
/// name has no dot.
pub fn suggest_signed_name(filename: &str) -> String {
    match filename.rfind('.') {
        Some(dot) => format!("{}-signed{}", &filename[..dot], &filename[dot..]),
        None => format!("{}-signed", filename),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_known_types() {
        assert_eq!(infer_content_type("photo.jpg"), "image/jpeg");
        assert_eq!(infer_content_type("photo.jpeg"), "image/jpeg");
        assert_eq!(infer_content_type("scan.png"), "image/png");
        assert_eq!(infer_content_type("scan.TIF"), "image/tiff");
        assert_eq!(infer_content_type("scan.tiff"), "image/tiff");
        assert_eq!(infer_content_type("img.webp"), "image/webp");
        assert_eq!(infer_content_type("IMG_0001.HEIC"), "image/heif");
        assert_eq!(infer_content_type("img.heif"), "image/heif");
        assert_eq!(infer_content_type("clip.mp4"), "video/mp4");
        assert_eq!(infer_content_type("doc.pdf"), "application/pdf");
    }

    #[test]
    fn test_infer_case_insensitive() {
        assert_eq!(infer_content_type("photo.JPG"), "image/jpeg");
    }

    #[test]
    fn test_infer_unknown_defaults_to_octet_stream() {
        assert_eq!(infer_content_type("file.unknown"), "application/octet-stream");
        assert_eq!(infer_content_type("jpg"), "application/octet-stream");
        assert_eq!(infer_content_type(""), "application/octet-stream");
    }

    #[test]
    fn test_suggest_signed_name() {
        assert_eq!(suggest_signed_name("a.b.png"), "a.b-signed.png");
        assert_eq!(suggest_signed_name("noext"), "noext-signed");
        assert_eq!(suggest_signed_name("photo.jpg"), "photo-signed.jpg");
    }
}
