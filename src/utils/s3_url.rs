use crate::error::{Result, SignerError};
use std::fmt;
use url::Url;

/// Bucket and key of an object in S3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

impl fmt::Display for S3Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// Extracts the bucket name from a presigned URL.
///
/// Virtual-hosted style (`<bucket>.s3.<region>.amazonaws.com`) is tried first,
/// then path style (`s3.<region>.amazonaws.com/<bucket>/...`).
pub fn bucket_from_presigned_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| SignerError::Parse(format!("Invalid presigned URL '{}': {}", url, e)))?;

    if let Some(host) = parsed.host_str() {
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() >= 4 && labels[1] == "s3" {
            return Ok(labels[0].to_string());
        }
    }

    parsed
        .path_segments()
        .and_then(|mut segs| segs.find(|s| !s.is_empty()))
        .map(|s| s.to_string())
        .ok_or_else(|| {
            SignerError::Parse("Unable to parse S3 bucket from presigned URL.".to_string())
        })
}

/// Splits an `s3://bucket/key` URI. The key may contain further slashes.
pub fn parse_s3_uri(uri: &str) -> Result<S3Location> {
    let rest = uri.strip_prefix("s3://").unwrap_or(uri);
    let mut parts = rest.split('/');
    let bucket = parts.next().unwrap_or_default();
    if bucket.is_empty() {
        return Err(SignerError::Parse(format!(
            "Unable to parse S3 bucket from URI '{}'",
            uri
        )));
    }
    let key = parts.collect::<Vec<_>>().join("/");

    Ok(S3Location {
        bucket: bucket.to_string(),
        key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_hosted_style() {
        let bucket = bucket_from_presigned_url(
            "https://bucket-x.s3.us-east-2.amazonaws.com/uploads/a.png?X-Amz-Signature=abc",
        )
        .unwrap();
        assert_eq!(bucket, "bucket-x");
    }

    #[test]
    fn test_path_style() {
        let bucket =
            bucket_from_presigned_url("https://s3.us-east-2.amazonaws.com/bucket-y/key").unwrap();
        assert_eq!(bucket, "bucket-y");
    }

    #[test]
    fn test_path_style_skips_empty_segments() {
        let bucket = bucket_from_presigned_url("http://localhost:9000//uploads/obj").unwrap();
        assert_eq!(bucket, "uploads");
    }

    #[test]
    fn test_short_host_falls_back_to_path() {
        // Only three labels, so the host is not treated as virtual-hosted.
        let bucket = bucket_from_presigned_url("https://s3.amazonaws.com/other/key");
        assert_eq!(bucket.unwrap(), "other");

        // Four labels but the second one is not "s3".
        let bucket = bucket_from_presigned_url("https://cdn.storage.example.com/media/key");
        assert_eq!(bucket.unwrap(), "media");
    }

    #[test]
    fn test_no_bucket_is_parse_error() {
        let err = bucket_from_presigned_url("https://s3.us-east-2.amazonaws.com/").unwrap_err();
        assert!(matches!(err, SignerError::Parse(_)));
    }

    #[test]
    fn test_garbage_url_is_parse_error() {
        let err = bucket_from_presigned_url("not a url").unwrap_err();
        assert!(matches!(err, SignerError::Parse(_)));
    }

    #[test]
    fn test_parse_s3_uri_nested_key() {
        let loc = parse_s3_uri("s3://b/k1/k2").unwrap();
        assert_eq!(loc.bucket, "b");
        assert_eq!(loc.key, "k1/k2");
    }

    #[test]
    fn test_parse_s3_uri_round_trip() {
        for (bucket, key) in [
            ("assets", "signed/photo-signed.jpg"),
            ("b", "k"),
            ("que-assets-dev", "a/b/c/d.bin"),
        ] {
            let loc = S3Location {
                bucket: bucket.to_string(),
                key: key.to_string(),
            };
            assert_eq!(parse_s3_uri(&loc.to_string()).unwrap(), loc);
        }
    }

    #[test]
    fn test_parse_s3_uri_bucket_only() {
        let loc = parse_s3_uri("s3://only-bucket").unwrap();
        assert_eq!(loc.bucket, "only-bucket");
        assert_eq!(loc.key, "");
    }

    #[test]
    fn test_parse_s3_uri_empty_bucket() {
        assert!(matches!(
            parse_s3_uri("s3:///key").unwrap_err(),
            SignerError::Parse(_)
        ));
    }
}
