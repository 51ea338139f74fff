//! DynamoDB implementation of [`AttemptLedger`].
//!
//! Item layout: `{email: S, attempted_at: S (RFC 3339), processed: BOOL}`
//! keyed by `email`. The write policy is expressed as a condition on
//! `PutItem` so the check and the write are one atomic operation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kyc_store::{AttemptLedger, AttemptRecord, StoreError};
use kyc_types::{Clock, Email, SystemClock, Timestamp};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::DEFAULT_TIMEOUT;
use crate::{AwsConfig, AwsError, AwsJsonClient, AwsService};

const OVERWRITE_CONDITION: &str = "attribute_not_exists(email) OR processed = :f";
const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailedException";

type Item = Map<String, Value>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct GetItemResponse {
    item: Option<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct DeleteItemResponse {
    attributes: Option<Item>,
}

pub struct DynamoAttemptLedger {
    client: AwsJsonClient,
    table: String,
    clock: Arc<dyn Clock>,
}

impl DynamoAttemptLedger {
    pub fn new(config: &AwsConfig, table: impl Into<String>) -> Result<Self, AwsError> {
        Self::with_timeout(config, table, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        config: &AwsConfig,
        table: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AwsError> {
        Ok(Self {
            client: AwsJsonClient::with_timeout(config, AwsService::DynamoDb, timeout)?,
            table: table.into(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn key(email: &Email) -> Value {
        json!({ "email": { "S": email.as_str() } })
    }
}

fn string_attr<'a>(item: &'a Item, name: &str) -> Result<&'a str, StoreError> {
    item.get(name)
        .and_then(|v| v.get("S"))
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Serialization(format!("item attribute {name} is not a string")))
}

fn bool_attr(item: &Item, name: &str) -> Result<bool, StoreError> {
    item.get(name)
        .and_then(|v| v.get("BOOL"))
        .and_then(Value::as_bool)
        .ok_or_else(|| StoreError::Serialization(format!("item attribute {name} is not a bool")))
}

fn decode_item(item: &Item) -> Result<AttemptRecord, StoreError> {
    let email = Email::parse(string_attr(item, "email")?)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    let attempted_at = Timestamp::from_rfc3339(string_attr(item, "attempted_at")?)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(AttemptRecord {
        email,
        attempted_at,
        processed: bool_attr(item, "processed")?,
    })
}

fn encode_item(record: &AttemptRecord) -> Value {
    json!({
        "email": { "S": record.email.as_str() },
        "attempted_at": { "S": record.attempted_at.to_rfc3339() },
        "processed": { "BOOL": record.processed },
    })
}

#[async_trait]
impl AttemptLedger for DynamoAttemptLedger {
    async fn get_record(&self, email: &Email) -> Result<AttemptRecord, StoreError> {
        let request = json!({
            "TableName": self.table,
            "Key": Self::key(email),
            "ConsistentRead": true,
        });
        let resp: GetItemResponse = self.client.call("GetItem", &request).await?;
        match resp.item {
            Some(item) => decode_item(&item),
            None => Err(StoreError::NotFound(email.to_string())),
        }
    }

    async fn record_attempt(
        &self,
        email: &Email,
        success: bool,
    ) -> Result<AttemptRecord, StoreError> {
        let record = AttemptRecord {
            email: email.clone(),
            attempted_at: self.clock.now(),
            processed: success,
        };
        let request = json!({
            "TableName": self.table,
            "Item": encode_item(&record),
            "ConditionExpression": OVERWRITE_CONDITION,
            "ExpressionAttributeValues": { ":f": { "BOOL": false } },
        });

        match self.client.call::<_, Value>("PutItem", &request).await {
            Ok(_) => {
                tracing::debug!(%email, processed = success, table = %self.table, "attempt recorded");
                Ok(record)
            }
            Err(e) if e.code() == Some(CONDITIONAL_CHECK_FAILED) => {
                Err(StoreError::AlreadyRecorded(email.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_record(&self, email: &Email) -> Result<bool, StoreError> {
        let request = json!({
            "TableName": self.table,
            "Key": Self::key(email),
            "ReturnValues": "ALL_OLD",
        });
        let resp: DeleteItemResponse = self.client.call("DeleteItem", &request).await?;
        Ok(resp.attributes.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_roundtrip() {
        let record = AttemptRecord {
            email: Email::parse("a@x.com").unwrap(),
            attempted_at: Timestamp::new(1_700_000_000),
            processed: true,
        };
        let value = encode_item(&record);
        assert_eq!(value["attempted_at"]["S"], "2023-11-14T22:13:20Z");
        let item = value.as_object().unwrap();
        assert_eq!(decode_item(item).unwrap(), record);
    }

    #[test]
    fn wrong_attribute_type_is_serialization_error() {
        let value = json!({
            "email": { "S": "a@x.com" },
            "attempted_at": { "S": "2023-11-14T22:13:20Z" },
            "processed": { "S": "true" },
        });
        let err = decode_item(value.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
