use std::collections::HashMap;
use std::time::Duration;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_get_item::BatchGetItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeDefinition, AttributeValue, KeySchemaElement, KeysAndAttributes, KeyType, ProvisionedThroughput, ReturnValue, ScalarAttributeType, TableStatus};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use crate::core::domain::{Configuration, Identifiable};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;
use crate::utils::date::DATE_FMT;

pub const BOOKS_TABLE: &str = "books";
pub const PERSONS_TABLE: &str = "persons";
pub const CATALOGS_TABLE: &str = "catalogs";
pub const SEQUENCES_TABLE: &str = "sequences";

pub(crate) const BOOK_PK: &str = "book_id";
pub(crate) const PERSON_PK: &str = "person_id";
pub(crate) const CATALOG_PK: &str = "catalog_id";
const SEQUENCE_PK: &str = "sequence_name";
const SEQUENCE_VALUE: &str = "current_value";
const BATCH_GET_LIMIT: usize = 100;
const BATCH_GET_ATTEMPTS: u64 = 5;

pub(crate) async fn create_table(client: &Client,
                                 table_name: &str, pk: &str,
                                 pk_type: ScalarAttributeType) -> LibraryResult<()> {
    match client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(pk)
                .key_type(KeyType::Hash)
                .build(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(pk)
                .attribute_type(pk_type)
                .build(),
        )
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(10)
                .write_capacity_units(10)
                .build(),
        )
        .send()
        .await
    {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Creating).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to create {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

// creates all catalog tables, tables that already exist are left untouched
pub(crate) async fn create_library_tables(client: &Client, config: &Configuration) {
    let tables = [
        (BOOKS_TABLE, BOOK_PK, ScalarAttributeType::N),
        (PERSONS_TABLE, PERSON_PK, ScalarAttributeType::N),
        (CATALOGS_TABLE, CATALOG_PK, ScalarAttributeType::N),
        (SEQUENCES_TABLE, SEQUENCE_PK, ScalarAttributeType::S),
    ];
    for (table, pk, pk_type) in tables {
        if let Err(err) = create_table(client, config.table_name(table).as_str(), pk, pk_type).await {
            warn!("skipped creating table {}: {}", config.table_name(table), err);
        }
    }
}

async fn wait_until_table_status_is_not(client: &Client, table_name: &str, other_status: TableStatus) {
    for _i in 0..30 {
        match describe_table(client, table_name).await {
            Ok(status) => {
                if status != other_status {
                    return;
                }
            }
            Err(_err) => {}
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn describe_table(client: &Client, table_name: &str) -> LibraryResult<TableStatus> {
    match client
        .describe_table()
        .table_name(table_name)
        .send()
        .await
    {
        Ok(out) => {
            if let Some(table) = out.table() {
                if let Some(status) = table.table_status() {
                    return Ok(status.clone());
                }
            }
            Err(LibraryError::runtime(format!("failed to describe {} table",
                                              table_name).as_str(), None))
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to describe {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

// Atomically increments the named counter in the sequences table and returns the new value.
pub(crate) async fn next_id(client: &Client, sequences_table: &str, name: &str) -> LibraryResult<i64> {
    let out = client
        .update_item()
        .table_name(sequences_table)
        .key(SEQUENCE_PK, AttributeValue::S(name.to_string()))
        .update_expression(format!("ADD {} :one", SEQUENCE_VALUE))
        .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
        .return_values(ReturnValue::UpdatedNew)
        .send()
        .await?;
    match out.attributes().map(|map| parse_number_attribute(SEQUENCE_VALUE, map)) {
        Some(id) if id > 0 => Ok(id),
        _ => Err(LibraryError::runtime(format!("sequence {} returned no value", name).as_str(), None)),
    }
}

// Writes an entity keyed by pk, assigning the next sequence id to new entities. An
// entity at version 0 is created only if the key is free, any other entity only
// replaces the item stored at its version, so a deleted item is never written back.
pub(crate) async fn put_versioned<E>(client: &Client, table_name: &str, pk: &str,
                                     sequences_table: &str, entity: &E) -> LibraryResult<E>
    where E: Identifiable + Serialize + Clone {
    let id = match entity.id() {
        Some(id) => id,
        None => next_id(client, sequences_table, E::KIND.to_string().as_str()).await?,
    };
    let mut stored = entity.clone();
    stored.assign(id, entity.version() + 1, Utc::now().naive_utc());
    let val = serde_json::to_value(&stored)?;
    let request = client
        .put_item()
        .table_name(table_name)
        .set_item(Some(parse_item(val)?));
    let request = if entity.version() == 0 {
        request.condition_expression(format!("attribute_not_exists({})", pk))
    } else {
        request
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version().to_string()))
    };
    request
        .send()
        .await
        .map_err(|err| {
            if is_conditional_check_failed(&err) {
                LibraryError::stale_version(E::KIND, id, entity.version())
            } else {
                LibraryError::from(err)
            }
        })?;
    Ok(stored)
}

pub(crate) async fn get_by_id(client: &Client, table_name: &str, pk: &str,
                              id: i64) -> LibraryResult<Option<HashMap<String, AttributeValue>>> {
    let out = client
        .get_item()
        .table_name(table_name)
        .key(pk, AttributeValue::N(id.to_string()))
        .consistent_read(true)
        .send()
        .await?;
    Ok(out.item().cloned())
}

pub(crate) async fn delete_by_id(client: &Client, table_name: &str, pk: &str, id: i64) -> LibraryResult<usize> {
    let out = client
        .delete_item()
        .table_name(table_name)
        .key(pk, AttributeValue::N(id.to_string()))
        .return_values(ReturnValue::AllOld)
        .send()
        .await?;
    Ok(if out.attributes().is_some() { 1 } else { 0 })
}

// Loads the items of the given ids, BATCH_GET_LIMIT keys per request. Ids without
// an item are skipped and the order of the returned items is unspecified.
pub(crate) async fn batch_get_by_ids(client: &Client, table_name: &str, pk: &str,
                                     ids: &[i64]) -> LibraryResult<Vec<HashMap<String, AttributeValue>>> {
    let mut items = vec![];
    for chunk in ids.chunks(BATCH_GET_LIMIT) {
        let mut pending: Vec<HashMap<String, AttributeValue>> = chunk.iter()
            .map(|id| HashMap::from([(pk.to_string(), AttributeValue::N(id.to_string()))]))
            .collect();
        for attempt in 0..BATCH_GET_ATTEMPTS {
            if pending.is_empty() {
                break;
            }
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(50 * attempt)).await;
            }
            let out = client
                .batch_get_item()
                .request_items(table_name, KeysAndAttributes::builder()
                    .set_keys(Some(pending))
                    .consistent_read(true)
                    .build())
                .send()
                .await?;
            if let Some(found) = out.responses().and_then(|responses| responses.get(table_name)) {
                items.extend(found.iter().cloned());
            }
            pending = out.unprocessed_keys()
                .and_then(|unprocessed| unprocessed.get(table_name))
                .and_then(|keys| keys.keys())
                .map(|keys| keys.to_vec())
                .unwrap_or_default();
        }
        if !pending.is_empty() {
            return Err(LibraryError::unavailable(
                format!("{} keys of {} were left unprocessed", pending.len(), table_name).as_str(),
                Some("BatchGetItem".to_string()), true));
        }
    }
    Ok(items)
}

// Returns the id of some book whose list attribute contains id.
pub(crate) async fn find_referencing_book(client: &Client, books_table: &str, list_attribute: &str,
                                          id: i64) -> LibraryResult<Option<i64>> {
    let mut start_key: Option<HashMap<String, AttributeValue>> = None;
    loop {
        let out = client
            .scan()
            .table_name(books_table)
            .consistent_read(true)
            .projection_expression(BOOK_PK)
            .filter_expression("contains(#ids, :id)")
            .expression_attribute_names("#ids", list_attribute)
            .expression_attribute_values(":id", AttributeValue::N(id.to_string()))
            .set_exclusive_start_key(start_key)
            .send()
            .await?;
        let found = out.items().unwrap_or(&[]).iter()
            .find_map(|item| parse_opt_number_attribute(BOOK_PK, item));
        if found.is_some() {
            return Ok(found);
        }
        match out.last_evaluated_key() {
            Some(key) if !key.is_empty() => start_key = Some(key.clone()),
            _ => return Ok(None),
        }
    }
}

pub(crate) fn parse_item(value: Value) -> Result<HashMap<String, AttributeValue>, String> {
    match value_to_item(value) {
        AttributeValue::M(map) => Ok(map),
        other => Err(format!("failed to parse{:?}", other)),
    }
}

pub(crate) fn parse_string_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<String> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        return Some(str.clone());
    }
    None
}

pub(crate) fn parse_date_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<NaiveDateTime> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        // e.g. 2022-09-24T04:40:35.726029
        if let Ok(date) = NaiveDateTime::parse_from_str(str, DATE_FMT) {
            return Some(date);
        }
    }
    None
}

pub(crate) fn parse_number_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> i64 {
    parse_opt_number_attribute(name, map).unwrap_or(0)
}

pub(crate) fn parse_opt_number_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<i64> {
    if let Some(AttributeValue::N(str)) = map.get(name) {
        return str.parse::<i64>().ok();
    }
    None
}

pub(crate) fn parse_number_list_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Vec<i64> {
    match map.get(name) {
        Some(AttributeValue::L(list)) => list.iter().filter_map(|v| {
            if let AttributeValue::N(str) = v {
                str.parse::<i64>().ok()
            } else {
                None
            }
        }).collect(),
        Some(AttributeValue::Ns(list)) => list.iter().filter_map(|str| str.parse::<i64>().ok()).collect(),
        _ => vec![],
    }
}

fn value_to_item(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(a) => AttributeValue::L(a.into_iter().map(value_to_item).collect()),
        Value::Object(o) => {
            AttributeValue::M(o.into_iter().map(|(k, v)| (k, value_to_item(v))).collect())
        }
    }
}

// helper method to build db-client for the configured store
pub(crate) async fn build_db_client(config: &Configuration) -> Client {
    match config.store {
        RepositoryStore::LocalDynamoDB => {
            // See https://docs.aws.amazon.com/sdk-for-rust/latest/dg/dynamodb-local.html
            let dynamodb_local_config = aws_sdk_dynamodb::Config::builder()
                .region(Region::new("local"))
                .credentials_provider(
                    Credentials::new("AKIDLOCALSTACK", "localstacksecret", None, None, "faked"))
                .endpoint_url(config.dynamodb_endpoint.as_str())
                .build();
            Client::from_conf(dynamodb_local_config)
        }
        _ => {
            //Get config from environment.
            let sdk_config = aws_config::load_from_env().await;
            Client::new(&sdk_config)
        }
    }
}

impl From<SdkError<UpdateItemError>> for LibraryError {
    fn from(err: SdkError<UpdateItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<PutItemError>> for LibraryError {
    fn from(err: SdkError<PutItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<GetItemError>> for LibraryError {
    fn from(err: SdkError<GetItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<BatchGetItemError>> for LibraryError {
    fn from(err: SdkError<BatchGetItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<ScanError>> for LibraryError {
    fn from(err: SdkError<ScanError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<DeleteItemError>> for LibraryError {
    fn from(err: SdkError<DeleteItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

fn is_conditional_check_failed(err: &SdkError<PutItemError>) -> bool {
    match err {
        SdkError::ServiceError(ctx) => ctx.err().is_conditional_check_failed_exception(),
        _ => false,
    }
}

fn retryable_sdk_error<T>(err: &SdkError<T>) -> (bool, Option<String>) {
    match err {
        SdkError::ConstructionFailure(_) => { (false, Some("ConstructionFailure".to_string())) }
        SdkError::TimeoutError(_) => { (true, Some("TimeoutError".to_string())) }
        SdkError::DispatchFailure(_) => { (true, Some("DispatchFailure".to_string())) }
        SdkError::ResponseError { .. } => { (true, Some("ResponseError".to_string())) }
        SdkError::ServiceError(ctx) => {
            (ctx.raw().http().status().is_server_error() || has_exceeded_limit(ctx.raw().http().body().bytes()), Some(ctx.raw().http().status().to_string()))
        }
        _ => { (true, Some("Unknown".to_string())) }
    }
}

// throttling responses mention an exceeded throughput or request limit
fn has_exceeded_limit(opts: Option<&[u8]>) -> bool {
    if let Some(b) = opts {
        return b.windows(6).any(|w| w == b"ceeded");
    }
    false
}
