//! Payload validation for catalog writes.
//!
//! Both entry points take the raw JSON payload so that every problem can be
//! reported at once, keyed by field path, instead of stopping at the first
//! deserialization error. Validation is all-or-nothing: either a complete
//! normalized value or the full set of field errors comes back.
//!
//! A JSON `null` is treated like an absent field, except for `seo` in an
//! update where it clears the SEO block.

use serde_json::{Map, Value};

use crate::errors::FieldErrors;
use crate::service::{Faq, NewService, Seo, ServicePatch};

pub const SHORT_DESCRIPTION_MAX: usize = 160;

/// Check a slug: non-empty, lowercase ASCII letters, digits and hyphens only.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err("Slug is required".into());
    }
    if !slug.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
        return Err("Slug must contain only lowercase letters, numbers, and hyphens".into());
    }
    Ok(())
}

/// Validate a create payload and fill defaults.
pub fn validate_create(payload: &Value) -> Result<NewService, FieldErrors> {
    let Some(obj) = payload.as_object() else {
        return Err(FieldErrors::single("payload", "Expected a JSON object"));
    };
    let mut errs = FieldErrors::new();

    let slug = match present(obj, "slug") {
        None => { errs.insert("slug", "Slug is required"); None }
        Some(v) => string_at("slug", v, &mut errs).and_then(|s| match validate_slug(&s) {
            Ok(()) => Some(s),
            Err(msg) => { errs.insert("slug", msg); None }
        }),
    };
    let name = required_text(obj, "name", "Service name is required", &mut errs);
    let short_description = required_text(obj, "shortDescription", "Short description is required", &mut errs)
        .and_then(|s| short_description_ok(s, &mut errs));
    let description = required_text(obj, "description", "Description is required", &mut errs);

    let features = present(obj, "features").map_or(Some(Vec::new()), |v| string_list("features", v, &mut errs));
    let highlights = present(obj, "highlights").map_or(Some(Vec::new()), |v| string_list("highlights", v, &mut errs));
    let faqs = present(obj, "faqs").map_or(Some(Vec::new()), |v| faq_list(v, &mut errs));
    let images = present(obj, "images").map_or(Some(Vec::new()), |v| image_list(v, &mut errs));
    let order = present(obj, "order").map_or(Some(0), |v| order_at(v, &mut errs));
    let seo = present(obj, "seo").map_or(Some(None), |v| seo_at(v, &mut errs).map(Some));
    let active = present(obj, "active").map_or(Some(true), |v| bool_at("active", v, &mut errs));

    match (slug, name, short_description, description, features, highlights, faqs, images, order, seo, active) {
        (Some(slug), Some(name), Some(short_description), Some(description), Some(features), Some(highlights), Some(faqs), Some(images), Some(order), Some(seo), Some(active))
            if errs.is_empty() =>
        {
            Ok(NewService { slug, name, short_description, description, features, highlights, faqs, images, order, seo, active })
        }
        _ => Err(errs),
    }
}

/// Validate an update payload. Every field is optional; present fields obey the
/// same rules as on create. `slug`, `id` and `lastUpdated` are ignored.
pub fn validate_patch(payload: &Value) -> Result<ServicePatch, FieldErrors> {
    let Some(obj) = payload.as_object() else {
        return Err(FieldErrors::single("payload", "Expected a JSON object"));
    };
    let mut errs = FieldErrors::new();
    let mut patch = ServicePatch::default();

    // `slug`, `id` and `lastUpdated` are never read here; rename is the only way to change a slug.
    if let Some(v) = present(obj, "name") {
        patch.name = non_empty_text("name", v, "Service name is required", &mut errs);
    }
    if let Some(v) = present(obj, "shortDescription") {
        patch.short_description = non_empty_text("shortDescription", v, "Short description is required", &mut errs)
            .and_then(|s| short_description_ok(s, &mut errs));
    }
    if let Some(v) = present(obj, "description") {
        patch.description = non_empty_text("description", v, "Description is required", &mut errs);
    }
    if let Some(v) = present(obj, "features") { patch.features = string_list("features", v, &mut errs); }
    if let Some(v) = present(obj, "highlights") { patch.highlights = string_list("highlights", v, &mut errs); }
    if let Some(v) = present(obj, "faqs") { patch.faqs = faq_list(v, &mut errs); }
    if let Some(v) = present(obj, "images") { patch.images = image_list(v, &mut errs); }
    if let Some(v) = present(obj, "order") { patch.order = order_at(v, &mut errs); }
    if let Some(v) = obj.get("seo") {
        patch.seo = if v.is_null() { Some(None) } else { seo_at(v, &mut errs).map(Some) };
    }
    if let Some(v) = present(obj, "active") { patch.active = bool_at("active", v, &mut errs); }

    errs.finish(patch)
}

/// Field value if present and not `null`.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn string_at(path: &str, v: &Value, errs: &mut FieldErrors) -> Option<String> {
    match v.as_str() {
        Some(s) => Some(s.to_string()),
        None => { errs.insert(path, "Expected string"); None }
    }
}

fn non_empty_text(path: &str, v: &Value, missing: &str, errs: &mut FieldErrors) -> Option<String> {
    let s = string_at(path, v, errs)?;
    if s.trim().is_empty() {
        errs.insert(path, missing);
        return None;
    }
    Some(s)
}

fn required_text(obj: &Map<String, Value>, key: &str, missing: &str, errs: &mut FieldErrors) -> Option<String> {
    required_text_at(obj, key, key, missing, errs)
}

fn required_text_at(obj: &Map<String, Value>, key: &str, path: &str, missing: &str, errs: &mut FieldErrors) -> Option<String> {
    match present(obj, key) {
        Some(v) => non_empty_text(path, v, missing, errs),
        None => { errs.insert(path, missing); None }
    }
}

fn short_description_ok(s: String, errs: &mut FieldErrors) -> Option<String> {
    if s.chars().count() > SHORT_DESCRIPTION_MAX {
        errs.insert("shortDescription", "Short description must be 160 characters or less");
        return None;
    }
    Some(s)
}

fn string_list(path: &str, v: &Value, errs: &mut FieldErrors) -> Option<Vec<String>> {
    let Some(items) = v.as_array() else {
        errs.insert(path, "Expected array of strings");
        return None;
    };
    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        match string_at(&format!("{path}.{i}"), item, errs) {
            Some(s) => out.push(s),
            None => ok = false,
        }
    }
    ok.then_some(out)
}

/// Deduplicate while keeping first-seen order.
fn dedup_ordered(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn image_list(v: &Value, errs: &mut FieldErrors) -> Option<Vec<String>> {
    let items = string_list("images", v, errs)?;
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        if url::Url::parse(item).is_err() {
            errs.insert(format!("images.{i}"), "Invalid url");
            ok = false;
        }
    }
    ok.then(|| dedup_ordered(items))
}

fn faq_list(v: &Value, errs: &mut FieldErrors) -> Option<Vec<Faq>> {
    let Some(items) = v.as_array() else {
        errs.insert("faqs", "Expected array of {question, answer}");
        return None;
    };
    let mut out = Vec::with_capacity(items.len());
    let mut ok = true;
    for (i, item) in items.iter().enumerate() {
        let Some(faq) = item.as_object() else {
            errs.insert(format!("faqs.{i}"), "Expected object");
            ok = false;
            continue;
        };
        let question = required_text_at(faq, "question", &format!("faqs.{i}.question"), "Question is required", errs);
        let answer = required_text_at(faq, "answer", &format!("faqs.{i}.answer"), "Answer is required", errs);
        match (question, answer) {
            (Some(question), Some(answer)) => out.push(Faq { question, answer }),
            _ => ok = false,
        }
    }
    ok.then_some(out)
}

fn order_at(v: &Value, errs: &mut FieldErrors) -> Option<u32> {
    match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
        Some(n) => Some(n),
        None => { errs.insert("order", "Order must be a non-negative integer"); None }
    }
}

fn bool_at(path: &str, v: &Value, errs: &mut FieldErrors) -> Option<bool> {
    match v.as_bool() {
        Some(b) => Some(b),
        None => { errs.insert(path, "Expected boolean"); None }
    }
}

fn seo_at(v: &Value, errs: &mut FieldErrors) -> Option<Seo> {
    let Some(obj) = v.as_object() else {
        errs.insert("seo", "Expected object");
        return None;
    };
    let before = errs.len();
    let title = present(obj, "title").and_then(|v| string_at("seo.title", v, errs));
    let description = present(obj, "description").and_then(|v| string_at("seo.description", v, errs));
    let keywords = present(obj, "keywords").map_or(Some(Vec::new()), |v| string_list("seo.keywords", v, errs));
    if errs.len() != before {
        return None;
    }
    Some(Seo { title, description, keywords: dedup_ordered(keywords?) })
}
