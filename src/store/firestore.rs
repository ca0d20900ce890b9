// src/store/firestore.rs

use super::{Collection, Document, DocumentStore, Fields, StoreError, StoreResult};
use crate::config::FirestoreSettings;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::time::Duration;
use tracing::{debug, warn};

const PAGE_SIZE: &str = "300";

/// Hosted document store reached through the Firestore REST API.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Client,
    documents_url: Url,
    api_key: Option<String>,
    auth_token: Option<String>,
}

// ─── Wire Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct WriteDocumentRequest {
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl FirestoreDocument {
    fn into_document(self) -> StoreResult<Document> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::Decode(format!("document name '{}' has no id", self.name)))?
            .to_string();
        Ok(Document::new(id, decode_fields(self.fields)?))
    }
}

impl FirestoreStore {
    pub fn new(settings: &FirestoreSettings, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut documents_url = Url::parse(&settings.base_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid FIRESTORE_BASE_URL: {}", e)))?;
        documents_url
            .path_segments_mut()
            .map_err(|_| StoreError::Unavailable("FIRESTORE_BASE_URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([
                "projects",
                settings.project_id.as_str(),
                "databases",
                settings.database.as_str(),
                "documents",
            ]);

        Ok(Self {
            client,
            documents_url,
            api_key: settings.api_key.clone(),
            auth_token: settings.auth_token.clone(),
        })
    }

    fn url(&self, collection: Collection, id: Option<&str>) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(collection.name());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    /// Attaches whichever credentials are configured.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        };
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn read_json<T: for<'de> Deserialize<'de>>(resp: Response) -> StoreResult<T> {
        resp.json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// PATCH of an existing document. With `masked` only the given fields are
    /// written; otherwise the body replaces the whole document.
    fn patch_request(
        &self,
        collection: Collection,
        id: &str,
        fields: &Fields,
        masked: bool,
    ) -> RequestBuilder {
        let mut request = self
            .client
            .patch(self.url(collection, Some(id)))
            .query(&[("currentDocument.exists", "true")]);
        if masked {
            for key in fields.keys() {
                request = request.query(&[("updateMask.fieldPaths", key.as_str())]);
            }
        }
        request.json(&WriteDocumentRequest {
            fields: encode_fields(fields),
        })
    }

    async fn patch(
        &self,
        collection: Collection,
        id: &str,
        request: RequestBuilder,
    ) -> StoreResult<()> {
        let resp = self.send(request).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(StoreError::Missing {
                collection,
                id: id.to_string(),
            }),
            s if s.is_success() => Ok(()),
            _ => Err(Self::failure(resp).await),
        }
    }

    async fn failure(resp: Response) -> StoreError {
        let status = resp.status();
        let detail = match resp.json::<ErrorEnvelope>().await {
            Ok(envelope) => format!("{} {}", envelope.error.status, envelope.error.message),
            Err(_) => String::new(),
        };
        warn!("Firestore request failed with {}: {}", status, detail);
        StoreError::Unavailable(format!("{}: {}", status, detail.trim()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let resp = self
            .send(self.client.get(self.url(collection, Some(id))))
            .await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let doc: FirestoreDocument = Self::read_json(resp).await?;
                doc.into_document().map(Some)
            }
            _ => Err(Self::failure(resp).await),
        }
    }

    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.url(collection, None))
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let resp = self.send(request).await?;
            if !resp.status().is_success() {
                return Err(Self::failure(resp).await);
            }

            let page: ListDocumentsResponse = Self::read_json(resp).await?;
            for doc in page.documents {
                documents.push(doc.into_document()?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Listed {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn add(&self, collection: Collection, fields: Fields) -> StoreResult<String> {
        let body = WriteDocumentRequest {
            fields: encode_fields(&fields),
        };
        let resp = self
            .send(self.client.post(self.url(collection, None)).json(&body))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }

        let doc: FirestoreDocument = Self::read_json(resp).await?;
        Ok(doc.into_document()?.id)
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> StoreResult<()> {
        self.patch(collection, id, self.patch_request(collection, id, &fields, false))
            .await
    }

    async fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
    ) -> StoreResult<()> {
        self.patch(collection, id, self.patch_request(collection, id, &fields, true))
            .await
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let resp = self
            .send(self.client.delete(self.url(collection, Some(id))))
            .await?;
        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }
        Ok(())
    }

    async fn probe(&self) -> StoreResult<()> {
        let request = self
            .client
            .get(self.url(Collection::Clients, None))
            .query(&[("pageSize", "1")]);
        let resp = self.send(request).await?;
        if !resp.status().is_success() {
            return Err(Self::failure(resp).await);
        }
        Ok(())
    }
}

// ─── Value Codec ──────────────────────────────────────────────────────────────
//
// Firestore wraps every value in a single-key object naming its type
// (`{"stringValue": "x"}`, `{"integerValue": "3"}`, ...). The rest of the
// application only ever sees plain JSON.

pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

pub fn encode_value(value: &Value) -> Value {
    let mut wrapped = Map::new();
    match value {
        Value::Null => {
            wrapped.insert("nullValue".into(), Value::Null);
        }
        Value::Bool(b) => {
            wrapped.insert("booleanValue".into(), Value::Bool(*b));
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                wrapped.insert("integerValue".into(), Value::String(i.to_string()));
            }
            None => {
                wrapped.insert("doubleValue".into(), Value::Number(n.clone()));
            }
        },
        Value::String(s) => {
            wrapped.insert("stringValue".into(), Value::String(s.clone()));
        }
        Value::Array(items) => {
            let values = items.iter().map(encode_value).collect();
            let mut array = Map::new();
            array.insert("values".into(), Value::Array(values));
            wrapped.insert("arrayValue".into(), Value::Object(array));
        }
        Value::Object(map) => {
            let mut inner = Map::new();
            inner.insert("fields".into(), Value::Object(encode_fields(map)));
            wrapped.insert("mapValue".into(), Value::Object(inner));
        }
    }
    Value::Object(wrapped)
}

pub fn decode_fields(fields: Map<String, Value>) -> StoreResult<Fields> {
    fields
        .into_iter()
        .map(|(k, v)| decode_value(&v).map(|v| (k, v)))
        .collect()
}

pub fn decode_value(value: &Value) -> StoreResult<Value> {
    let (kind, inner) = value
        .as_object()
        .and_then(|m| m.iter().next())
        .ok_or_else(|| StoreError::Decode(format!("expected a typed value, got {}", value)))?;

    let decoded = match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or(false)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| StoreError::Decode(format!("bad integerValue {}", inner)))?
        }
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            // NaN and the infinities have no JSON form.
            .unwrap_or(Value::Null),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => {
            let items = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<StoreResult<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Value::Array(items)
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            Value::Object(decode_fields(fields)?)
        }
        other => return Err(StoreError::Decode(format!("unknown value type '{}'", other))),
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> FirestoreSettings {
        FirestoreSettings {
            project_id: "acme-admin".to_string(),
            database: "(default)".to_string(),
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            api_key: None,
            auth_token: None,
        }
    }

    #[test]
    fn document_urls_are_built_under_the_project_database() {
        let store = FirestoreStore::new(&settings(), Duration::from_secs(1)).unwrap();
        let url = store.url(Collection::Incomes, Some("abc123"));
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/acme-admin/databases/(default)/documents/IncomeData/abc123"
        );
    }

    #[test]
    fn field_update_masks_only_the_given_fields() {
        let store = FirestoreStore::new(&settings(), Duration::from_secs(1)).unwrap();
        let fields = json!({"assignedEmployees": ["e2"]}).as_object().cloned().unwrap();

        let masked = store
            .patch_request(Collection::Clients, "c1", &fields, true)
            .build()
            .unwrap();
        assert_eq!(
            masked.url().query(),
            Some("currentDocument.exists=true&updateMask.fieldPaths=assignedEmployees")
        );

        let full = store
            .patch_request(Collection::Clients, "c1", &fields, false)
            .build()
            .unwrap();
        assert_eq!(full.url().query(), Some("currentDocument.exists=true"));
    }

    #[test]
    fn client_document_encodes_to_typed_values() {
        let fields = json!({
            "name": "Acme",
            "totalPayment": 10000,
            "subServices": ["CMS Development"],
            "notes": null,
        });
        let encoded = encode_fields(fields.as_object().unwrap());
        assert_eq!(encoded["name"], json!({"stringValue": "Acme"}));
        assert_eq!(encoded["totalPayment"], json!({"integerValue": "10000"}));
        assert_eq!(
            encoded["subServices"],
            json!({"arrayValue": {"values": [{"stringValue": "CMS Development"}]}})
        );
        assert_eq!(encoded["notes"], json!({"nullValue": null}));
    }

    #[test]
    fn typed_values_decode_to_plain_json() {
        let wire = json!({
            "amount": {"doubleValue": 2500.5},
            "count": {"integerValue": "3"},
            "empty": {"arrayValue": {}},
            "nested": {"mapValue": {"fields": {"flag": {"booleanValue": true}}}},
            "when": {"timestampValue": "2024-03-01T00:00:00Z"},
        });
        let decoded = decode_fields(wire.as_object().cloned().unwrap()).unwrap();
        assert_eq!(decoded["amount"], json!(2500.5));
        assert_eq!(decoded["count"], json!(3));
        assert_eq!(decoded["empty"], json!([]));
        assert_eq!(decoded["nested"], json!({"flag": true}));
        assert_eq!(decoded["when"], json!("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn unknown_value_type_is_a_decode_error() {
        let err = decode_value(&json!({"vectorValue": {}})).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn document_id_is_the_last_name_segment() {
        let doc = FirestoreDocument {
            name: "projects/p/databases/(default)/documents/ClientData/XyZ".to_string(),
            fields: Map::new(),
        };
        assert_eq!(doc.into_document().unwrap().id, "XyZ");
    }
}
