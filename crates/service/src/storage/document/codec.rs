//! Firestore REST value encoding.
//!
//! Values are single-key JSON objects (`{"stringValue": "x"}`); 64-bit
//! integers travel as strings, empty arrays and maps may omit their body.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::{DocFields, DocValue, RemoteDocument};

pub fn encode_value(value: &DocValue) -> Value {
    match value {
        DocValue::Null => json!({ "nullValue": null }),
        DocValue::Bool(b) => json!({ "booleanValue": b }),
        DocValue::Integer(n) => json!({ "integerValue": n.to_string() }),
        DocValue::Double(d) => json!({ "doubleValue": d }),
        DocValue::String(s) => json!({ "stringValue": s }),
        DocValue::Timestamp(t) => json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Millis, true) }),
        DocValue::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        DocValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn encode_fields(fields: &DocFields) -> Value {
    Value::Object(fields.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect::<Map<_, _>>())
}

pub fn decode_value(value: &Value) -> Result<DocValue> {
    let obj = value.as_object().ok_or_else(|| anyhow!("value is not an object"))?;
    let (kind, inner) = obj.iter().next().ok_or_else(|| anyhow!("empty value object"))?;
    Ok(match kind.as_str() {
        "nullValue" => DocValue::Null,
        "booleanValue" => DocValue::Bool(inner.as_bool().ok_or_else(|| anyhow!("bad booleanValue"))?),
        "integerValue" => {
            let n = match inner {
                Value::String(s) => s.parse::<i64>()?,
                Value::Number(n) => n.as_i64().ok_or_else(|| anyhow!("bad integerValue"))?,
                _ => bail!("bad integerValue"),
            };
            DocValue::Integer(n)
        }
        "doubleValue" => DocValue::Double(inner.as_f64().ok_or_else(|| anyhow!("bad doubleValue"))?),
        "stringValue" => DocValue::String(inner.as_str().ok_or_else(|| anyhow!("bad stringValue"))?.to_string()),
        "timestampValue" => {
            let raw = inner.as_str().ok_or_else(|| anyhow!("bad timestampValue"))?;
            DocValue::Timestamp(parse_timestamp(raw)?)
        }
        "arrayValue" => {
            let values = inner.get("values").and_then(Value::as_array);
            DocValue::Array(
                values
                    .map(|vs| vs.iter().map(decode_value).collect::<Result<Vec<_>>>())
                    .transpose()?
                    .unwrap_or_default(),
            )
        }
        "mapValue" => DocValue::Map(match inner.get("fields") {
            Some(fields) => decode_fields(fields)?,
            None => DocFields::new(),
        }),
        other => bail!("unsupported value type `{other}`"),
    })
}

pub fn decode_fields(fields: &Value) -> Result<DocFields> {
    let obj = fields.as_object().ok_or_else(|| anyhow!("fields is not an object"))?;
    obj.iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v).map_err(|e| anyhow!("field `{k}`: {e}"))?)))
        .collect()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Decode a REST document resource. The id is the last segment of `name`.
pub fn decode_document(doc: &Value) -> Result<RemoteDocument> {
    let name = doc.get("name").and_then(Value::as_str).ok_or_else(|| anyhow!("document without name"))?;
    let id = name.rsplit('/').next().filter(|s| !s.is_empty()).ok_or_else(|| anyhow!("bad document name `{name}`"))?;
    let fields = match doc.get("fields") {
        Some(f) => decode_fields(f)?,
        None => DocFields::new(),
    };
    let create_time = doc.get("createTime").and_then(Value::as_str).map(parse_timestamp).transpose()?;
    Ok(RemoteDocument { id: id.to_string(), fields, create_time })
}

/// Decode one page of a listing, skipping documents that cannot be decoded.
pub fn decode_page(items: &[Value]) -> Vec<RemoteDocument> {
    items
        .iter()
        .filter_map(|item| match decode_document(item) {
            Ok(doc) => Some(doc),
            Err(e) => {
                let name = item.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
                warn!(document = name, error = %e, "skipping undecodable document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn integers_are_string_encoded() -> anyhow::Result<()> {
        assert_eq!(encode_value(&DocValue::Integer(3)), json!({"integerValue": "3"}));
        assert_eq!(decode_value(&json!({"integerValue": "42"}))?, DocValue::Integer(42));
        assert_eq!(decode_value(&json!({"integerValue": 7}))?, DocValue::Integer(7));
        Ok(())
    }

    #[test]
    fn empty_containers_may_omit_body() -> anyhow::Result<()> {
        assert_eq!(decode_value(&json!({"arrayValue": {}}))?, DocValue::Array(vec![]));
        assert_eq!(decode_value(&json!({"mapValue": {}}))?, DocValue::Map(DocFields::new()));
        Ok(())
    }

    #[test]
    fn decodes_a_rest_document() -> anyhow::Result<()> {
        let raw = json!({
            "name": "projects/p/databases/(default)/documents/services/abc123",
            "fields": {
                "slug": {"stringValue": "roofing"},
                "tags": {"arrayValue": {"values": [{"stringValue": "a"}, {"nullValue": null}]}},
                "seo": {"mapValue": {"fields": {"title": {"stringValue": "T"}}}},
                "lastUpdated": {"timestampValue": "2024-01-25T00:00:00.000Z"}
            },
            "createTime": "2024-01-25T00:00:01.5Z"
        });
        let doc = decode_document(&raw)?;
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.fields.get("slug"), Some(&DocValue::String("roofing".into())));
        assert_eq!(
            doc.fields.get("tags"),
            Some(&DocValue::Array(vec![DocValue::String("a".into()), DocValue::Null]))
        );
        assert_eq!(
            doc.fields.get("lastUpdated"),
            Some(&DocValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 25, 0, 0, 0).unwrap()))
        );
        assert!(doc.create_time.is_some());
        Ok(())
    }

    #[test]
    fn unknown_value_kinds_are_rejected() {
        assert!(decode_value(&json!({"geoPointValue": {"latitude": 1.0}})).is_err());
        assert!(decode_document(&json!({"fields": {}})).is_err());
    }

    #[test]
    fn encoded_fields_decode_back() -> anyhow::Result<()> {
        let mut fields = DocFields::new();
        fields.insert("n".into(), DocValue::Integer(-5));
        fields.insert("ok".into(), DocValue::Bool(true));
        let inner = fields.clone();
        fields.insert("nested".into(), DocValue::Map(inner));
        assert_eq!(decode_fields(&encode_fields(&fields))?, fields);
        Ok(())
    }

    #[test]
    fn listing_page_skips_unsupported_documents() {
        let page = vec![
            json!({"name": "projects/p/databases/(default)/documents/services/a", "fields": {"slug": {"stringValue": "a"}}}),
            json!({"name": "projects/p/databases/(default)/documents/services/b", "fields": {"site": {"geoPointValue": {"latitude": 1.0, "longitude": 2.0}}}}),
            json!({"fields": {}}),
            json!({"name": "projects/p/databases/(default)/documents/services/c", "fields": {"slug": {"stringValue": "c"}}}),
        ];
        let ids: Vec<String> = decode_page(&page).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "c".to_string()]);
    }
}
