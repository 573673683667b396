use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::{Map, Value, json};

use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};
use crate::store::item::{AttrValue, Item};
use crate::store::sigv4::{SigningParams, authorization_header};
use crate::store::{RecordStore, ScanFilter, Table};

const TARGET_PREFIX: &str = "DynamoDB_20120810";
const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// 托管文档存储的HTTP客户端，走DynamoDB JSON协议
pub struct DynamoStore {
    client: Client,
    config: StoreConfig,
    host: String,
}

impl DynamoStore {
    pub fn new(config: StoreConfig) -> AppResult<Self> {
        let url = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| AppError::ConfigError(format!("invalid store endpoint: {e}")))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            _ => {
                return Err(AppError::ConfigError(
                    "store endpoint has no host".to_string(),
                ));
            }
        };

        Ok(Self {
            client: Client::new(),
            config,
            host,
        })
    }

    async fn call(&self, operation: &str, body: Value) -> AppResult<Value> {
        let payload = body.to_string();
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let amz_target = format!("{TARGET_PREFIX}.{operation}");

        let authorization = authorization_header(&SigningParams {
            access_key_id: &self.config.access_key_id,
            secret_access_key: &self.config.secret_access_key,
            region: &self.config.region,
            service: "dynamodb",
            host: &self.host,
            amz_date: &amz_date,
            amz_target: &amz_target,
            content_type: CONTENT_TYPE,
            payload: &payload,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-date", amz_date)
            .header("x-amz-target", amz_target)
            .header("authorization", authorization)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let value: Value = response.json().await?;

        if !status.is_success() {
            let kind = value
                .get("__type")
                .and_then(Value::as_str)
                .unwrap_or("UnknownError");
            let message = value
                .get("message")
                .or_else(|| value.get("Message"))
                .and_then(Value::as_str)
                .unwrap_or("");
            return Err(AppError::StoreError(format!(
                "{operation} failed: {kind} {message}"
            )));
        }

        Ok(value)
    }

    fn encode_attr(value: &AttrValue) -> Value {
        match value {
            AttrValue::S(s) => json!({ "S": s }),
            // 数值按字符串传输，保留十进制精度
            AttrValue::N(n) => json!({ "N": n.to_string() }),
            AttrValue::Bool(b) => json!({ "BOOL": b }),
        }
    }

    fn decode_attr(value: &Value) -> AppResult<AttrValue> {
        if let Some(s) = value.get("S").and_then(Value::as_str) {
            return Ok(AttrValue::S(s.to_string()));
        }
        if let Some(n) = value.get("N").and_then(Value::as_str) {
            let decimal = Decimal::from_str(n)
                .map_err(|e| AppError::StoreError(format!("bad numeric attribute `{n}`: {e}")))?;
            return Ok(AttrValue::N(decimal));
        }
        if let Some(b) = value.get("BOOL").and_then(Value::as_bool) {
            return Ok(AttrValue::Bool(b));
        }
        Err(AppError::StoreError(format!(
            "unsupported attribute value: {value}"
        )))
    }

    fn encode_item(item: &Item) -> Value {
        let mut map = Map::new();
        for (field, value) in item {
            map.insert(field.clone(), Self::encode_attr(value));
        }
        Value::Object(map)
    }

    fn decode_item(value: &Value) -> AppResult<Item> {
        let object = value
            .as_object()
            .ok_or_else(|| AppError::StoreError("item is not an object".to_string()))?;

        let mut item = Item::new();
        for (field, attr) in object {
            item.insert(field.clone(), Self::decode_attr(attr)?);
        }
        Ok(item)
    }

    fn key_of(key: &str) -> Value {
        json!({ "id": { "S": key } })
    }

    /// 过滤条件转FilterExpression。属性名一律走别名，避开保留字。
    fn filter_expression(filter: &ScanFilter) -> (String, Value, Value) {
        let conditions: Vec<(String, AttrValue)> = match filter {
            ScanFilter::Eq(field, value) => vec![(field.clone(), value.clone())],
            ScanFilter::AnyEq(conditions) => conditions.clone(),
        };

        let mut clauses = Vec::new();
        let mut names = Map::new();
        let mut values = Map::new();
        for (index, (field, value)) in conditions.iter().enumerate() {
            clauses.push(format!("#f{index} = :v{index}"));
            names.insert(format!("#f{index}"), Value::String(field.clone()));
            values.insert(format!(":v{index}"), Self::encode_attr(value));
        }

        (
            clauses.join(" OR "),
            Value::Object(names),
            Value::Object(values),
        )
    }

    async fn table_exists(&self, table: Table) -> AppResult<bool> {
        match self
            .call("DescribeTable", json!({ "TableName": table.name() }))
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.to_string().contains("ResourceNotFoundException") => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// 开发模式引导：缺失的逻辑表按需建表
    pub async fn create_tables_if_missing(&self) -> AppResult<()> {
        for table in Table::ALL {
            if self.table_exists(table).await? {
                log::info!("Table `{}` already exists", table.name());
                continue;
            }

            self.call(
                "CreateTable",
                json!({
                    "TableName": table.name(),
                    "KeySchema": [{ "AttributeName": "id", "KeyType": "HASH" }],
                    "AttributeDefinitions": [{ "AttributeName": "id", "AttributeType": "S" }],
                    "BillingMode": "PAY_PER_REQUEST",
                }),
            )
            .await?;
            log::info!("Table `{}` created", table.name());
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn get(&self, table: Table, key: &str) -> AppResult<Option<Item>> {
        let response = self
            .call(
                "GetItem",
                json!({
                    "TableName": table.name(),
                    "Key": Self::key_of(key),
                }),
            )
            .await?;

        match response.get("Item") {
            Some(item) => Ok(Some(Self::decode_item(item)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, table: Table, item: Item) -> AppResult<()> {
        if !item.contains_key("id") {
            return Err(AppError::StoreError("item has no `id` attribute".to_string()));
        }

        self.call(
            "PutItem",
            json!({
                "TableName": table.name(),
                "Item": Self::encode_item(&item),
            }),
        )
        .await?;
        Ok(())
    }

    async fn update(
        &self,
        table: Table,
        key: &str,
        assignments: Vec<(String, AttrValue)>,
    ) -> AppResult<Item> {
        let mut clauses = Vec::new();
        let mut names = Map::new();
        let mut values = Map::new();
        for (index, (field, value)) in assignments.iter().enumerate() {
            clauses.push(format!("#f{index} = :v{index}"));
            names.insert(format!("#f{index}"), Value::String(field.clone()));
            values.insert(format!(":v{index}"), Self::encode_attr(value));
        }

        let response = self
            .call(
                "UpdateItem",
                json!({
                    "TableName": table.name(),
                    "Key": Self::key_of(key),
                    "UpdateExpression": format!("SET {}", clauses.join(", ")),
                    "ExpressionAttributeNames": Value::Object(names),
                    "ExpressionAttributeValues": Value::Object(values),
                    "ReturnValues": "ALL_NEW",
                }),
            )
            .await?;

        let attributes = response
            .get("Attributes")
            .ok_or_else(|| AppError::StoreError("UpdateItem returned no attributes".to_string()))?;
        Self::decode_item(attributes)
    }

    async fn scan(&self, table: Table, filter: Option<ScanFilter>) -> AppResult<Vec<Item>> {
        let mut body = json!({ "TableName": table.name() });

        if let Some(filter) = &filter {
            let (expression, names, values) = Self::filter_expression(filter);
            body["FilterExpression"] = Value::String(expression);
            body["ExpressionAttributeNames"] = names;
            body["ExpressionAttributeValues"] = values;
        }

        let response = self.call("Scan", body).await?;
        let raw_items = response
            .get("Items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut items = Vec::with_capacity(raw_items.len());
        for raw in &raw_items {
            items.push(Self::decode_item(raw)?);
        }
        Ok(items)
    }
}
