//! Conversion between [`Service`] records and document fields.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};

use models::{Faq, NewService, Seo, Service, ServicePatch};

use super::{DocFields, DocValue, RemoteDocument};

pub const LAST_UPDATED: &str = "lastUpdated";

fn strings(items: &[String]) -> DocValue {
    DocValue::Array(items.iter().cloned().map(DocValue::String).collect())
}

fn faqs(items: &[Faq]) -> DocValue {
    DocValue::Array(
        items
            .iter()
            .map(|f| {
                let mut m = DocFields::new();
                m.insert("question".into(), DocValue::String(f.question.clone()));
                m.insert("answer".into(), DocValue::String(f.answer.clone()));
                DocValue::Map(m)
            })
            .collect(),
    )
}

fn seo(seo: &Seo) -> DocValue {
    let mut m = DocFields::new();
    if let Some(t) = &seo.title { m.insert("title".into(), DocValue::String(t.clone())); }
    if let Some(d) = &seo.description { m.insert("description".into(), DocValue::String(d.clone())); }
    m.insert("keywords".into(), strings(&seo.keywords));
    DocValue::Map(m)
}

/// Every field of a new record, stamped with `now`.
pub fn fields_for_new(new: &NewService, now: DateTime<Utc>) -> DocFields {
    let mut f = DocFields::new();
    f.insert("slug".into(), DocValue::String(new.slug.clone()));
    f.insert("name".into(), DocValue::String(new.name.clone()));
    f.insert("shortDescription".into(), DocValue::String(new.short_description.clone()));
    f.insert("description".into(), DocValue::String(new.description.clone()));
    f.insert("features".into(), strings(&new.features));
    f.insert("highlights".into(), strings(&new.highlights));
    f.insert("faqs".into(), faqs(&new.faqs));
    f.insert("images".into(), strings(&new.images));
    f.insert("order".into(), DocValue::Integer(new.order.into()));
    if let Some(s) = &new.seo { f.insert("seo".into(), seo(s)); }
    f.insert("active".into(), DocValue::Bool(new.active));
    f.insert(LAST_UPDATED.into(), DocValue::Timestamp(now));
    f
}

/// Fields and update mask for a partial update. `lastUpdated` is always set.
///
/// A cleared SEO block is masked but omitted, which removes it remotely.
pub fn fields_for_patch(patch: &ServicePatch, now: DateTime<Utc>) -> (DocFields, Vec<String>) {
    let mut f = DocFields::new();
    if let Some(v) = &patch.name { f.insert("name".into(), DocValue::String(v.clone())); }
    if let Some(v) = &patch.short_description { f.insert("shortDescription".into(), DocValue::String(v.clone())); }
    if let Some(v) = &patch.description { f.insert("description".into(), DocValue::String(v.clone())); }
    if let Some(v) = &patch.features { f.insert("features".into(), strings(v)); }
    if let Some(v) = &patch.highlights { f.insert("highlights".into(), strings(v)); }
    if let Some(v) = &patch.faqs { f.insert("faqs".into(), faqs(v)); }
    if let Some(v) = &patch.images { f.insert("images".into(), strings(v)); }
    if let Some(v) = patch.order { f.insert("order".into(), DocValue::Integer(v.into())); }
    if let Some(Some(v)) = &patch.seo { f.insert("seo".into(), seo(v)); }
    if let Some(v) = patch.active { f.insert("active".into(), DocValue::Bool(v)); }
    f.insert(LAST_UPDATED.into(), DocValue::Timestamp(now));

    let mut mask: Vec<String> = patch.field_names().into_iter().map(String::from).collect();
    mask.push(LAST_UPDATED.into());
    (f, mask)
}

fn text(fields: &DocFields, key: &str) -> Result<String> {
    match fields.get(key) {
        Some(DocValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(anyhow!("field `{key}`: expected string, got {other:?}")),
        None => Err(anyhow!("field `{key}` missing")),
    }
}

fn opt_text(fields: &DocFields, key: &str) -> Result<Option<String>> {
    match fields.get(key) {
        None | Some(DocValue::Null) => Ok(None),
        Some(DocValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(anyhow!("field `{key}`: expected string, got {other:?}")),
    }
}

fn text_list(fields: &DocFields, key: &str) -> Result<Vec<String>> {
    match fields.get(key) {
        None | Some(DocValue::Null) => Ok(Vec::new()),
        Some(DocValue::Array(items)) => items
            .iter()
            .map(|v| match v {
                DocValue::String(s) => Ok(s.clone()),
                other => Err(anyhow!("field `{key}`: expected string item, got {other:?}")),
            })
            .collect(),
        Some(other) => Err(anyhow!("field `{key}`: expected array, got {other:?}")),
    }
}

fn faq_list(fields: &DocFields) -> Result<Vec<Faq>> {
    let Some(value) = fields.get("faqs") else { return Ok(Vec::new()) };
    let DocValue::Array(items) = value else { bail!("field `faqs`: expected array") };
    items
        .iter()
        .map(|item| match item {
            DocValue::Map(m) => Ok(Faq { question: text(m, "question")?, answer: text(m, "answer")? }),
            other => Err(anyhow!("field `faqs`: expected map item, got {other:?}")),
        })
        .collect()
}

fn order(fields: &DocFields) -> Result<u32> {
    match fields.get("order") {
        None | Some(DocValue::Null) => Ok(0),
        Some(DocValue::Integer(n)) => u32::try_from(*n).map_err(|_| anyhow!("field `order` out of range: {n}")),
        Some(DocValue::Double(d)) if d.fract() == 0.0 && *d >= 0.0 && *d <= u32::MAX as f64 => Ok(*d as u32),
        Some(other) => Err(anyhow!("field `order`: expected integer, got {other:?}")),
    }
}

fn seo_block(fields: &DocFields) -> Result<Option<Seo>> {
    match fields.get("seo") {
        None | Some(DocValue::Null) => Ok(None),
        Some(DocValue::Map(m)) => Ok(Some(Seo {
            title: opt_text(m, "title")?,
            description: opt_text(m, "description")?,
            keywords: text_list(m, "keywords")?,
        })),
        Some(other) => Err(anyhow!("field `seo`: expected map, got {other:?}")),
    }
}

fn timestamp(fields: &DocFields) -> Result<DateTime<Utc>> {
    match fields.get(LAST_UPDATED) {
        None | Some(DocValue::Null) => Ok(DateTime::<Utc>::UNIX_EPOCH),
        Some(DocValue::Timestamp(t)) => Ok(*t),
        Some(DocValue::String(s)) => Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc)),
        Some(other) => Err(anyhow!("field `{LAST_UPDATED}`: expected timestamp, got {other:?}")),
    }
}

/// Decode a stored document. The document id becomes `Service::id`.
pub fn service_from_document(doc: &RemoteDocument) -> Result<Service> {
    let f = &doc.fields;
    let active = match f.get("active") {
        None | Some(DocValue::Null) => true,
        Some(DocValue::Bool(b)) => *b,
        Some(other) => bail!("field `active`: expected bool, got {other:?}"),
    };
    Ok(Service {
        id: Some(doc.id.clone()),
        slug: text(f, "slug")?,
        name: text(f, "name")?,
        short_description: text(f, "shortDescription")?,
        description: text(f, "description")?,
        features: text_list(f, "features")?,
        highlights: text_list(f, "highlights")?,
        faqs: faq_list(f)?,
        images: text_list(f, "images")?,
        order: order(f)?,
        seo: seo_block(f)?,
        active,
        last_updated: timestamp(f)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn seed_records_survive_document_mapping() -> anyhow::Result<()> {
        for svc in models::seed::default_services() {
            let doc = RemoteDocument {
                id: "doc-1".into(),
                fields: fields_for_new(&svc.to_new(), svc.last_updated),
                create_time: None,
            };
            let back = service_from_document(&doc)?;
            assert_eq!(back, Service { id: Some("doc-1".into()), ..svc });
        }
        Ok(())
    }

    #[test]
    fn patch_mask_lists_present_fields_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let patch = ServicePatch { name: Some("N".into()), seo: Some(None), ..Default::default() };
        let (fields, mask) = fields_for_patch(&patch, now);
        assert_eq!(mask, vec!["name", "seo", "lastUpdated"]);
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("seo"));
        assert_eq!(fields.get("lastUpdated"), Some(&DocValue::Timestamp(now)));
    }

    #[test]
    fn sparse_documents_take_defaults() -> anyhow::Result<()> {
        let mut fields = DocFields::new();
        for key in ["slug", "name", "shortDescription", "description"] {
            fields.insert(key.into(), DocValue::String("x".into()));
        }
        let svc = service_from_document(&RemoteDocument { id: "d".into(), fields, create_time: None })?;
        assert!(svc.active);
        assert_eq!(svc.order, 0);
        assert_eq!(svc.seo, None);
        Ok(())
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let doc = RemoteDocument { id: "d".into(), fields: DocFields::new(), create_time: None };
        assert!(service_from_document(&doc).is_err());
    }
}
