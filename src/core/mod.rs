pub mod aggregate;
pub mod extract;
pub mod ingest;
pub mod metrics;
pub mod sampler;
pub mod sink;
