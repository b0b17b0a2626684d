pub mod pipeline;
pub mod signing_client;
