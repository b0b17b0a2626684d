pub mod content_type;
pub mod hash;
pub mod s3_url;
pub mod validation;
