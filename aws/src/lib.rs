//! AWS adapters for the KYC gateway.
//!
//! Rekognition, Textract and DynamoDB all speak the AWS JSON protocol: a
//! signed `POST /` with an `X-Amz-Target` header naming the operation. This
//! crate implements that protocol once ([`AwsJsonClient`]) and builds the
//! vision service and attempt ledger on top of it.

pub mod client;
pub mod credentials;
pub mod dynamodb;
pub mod error;
pub mod rekognition;
pub mod sigv4;
pub mod textract;
pub mod vision;

pub use client::{AwsJsonClient, AwsService};
pub use credentials::{AwsConfig, AwsCredentials};
pub use dynamodb::DynamoAttemptLedger;
pub use error::AwsError;
pub use vision::AwsVisionService;
