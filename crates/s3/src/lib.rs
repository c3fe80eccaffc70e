//! ossadm-s3: S3 SDK adapter for ossadm
//!
//! Implements the `ObjectStore` trait from ossadm-core on top of aws-sdk-s3.

mod client;

pub use client::S3Client;
