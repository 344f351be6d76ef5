use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Question/answer pair shown on a service page.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Search-engine metadata for a service page.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A catalog entry describing one offered construction service.
///
/// Serialized in camelCase; `lastUpdated` is an RFC 3339 string on disk.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Document id assigned by a remote document store; absent for file/memory storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub slug: String,
    pub name: String,
    pub short_description: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "epoch")]
    pub last_updated: DateTime<Utc>,
}

fn default_active() -> bool { true }
fn epoch() -> DateTime<Utc> { DateTime::<Utc>::UNIX_EPOCH }

impl Service {
    /// Record a mutation at `now`, never moving `last_updated` backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = self.last_updated.max(now);
    }

    /// The create payload that would reproduce this record.
    pub fn to_new(&self) -> NewService {
        NewService {
            slug: self.slug.clone(),
            name: self.name.clone(),
            short_description: self.short_description.clone(),
            description: self.description.clone(),
            features: self.features.clone(),
            highlights: self.highlights.clone(),
            faqs: self.faqs.clone(),
            images: self.images.clone(),
            order: self.order,
            seo: self.seo.clone(),
            active: self.active,
        }
    }
}

/// A validated create payload. Carries no `id` or `lastUpdated`; the backend assigns both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewService {
    pub slug: String,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub features: Vec<String>,
    pub highlights: Vec<String>,
    pub faqs: Vec<Faq>,
    pub images: Vec<String>,
    pub order: u32,
    pub seo: Option<Seo>,
    pub active: bool,
}

impl NewService {
    pub fn into_service(self, id: Option<String>, now: DateTime<Utc>) -> Service {
        Service {
            id,
            slug: self.slug,
            name: self.name,
            short_description: self.short_description,
            description: self.description,
            features: self.features,
            highlights: self.highlights,
            faqs: self.faqs,
            images: self.images,
            order: self.order,
            seo: self.seo,
            active: self.active,
            last_updated: now,
        }
    }
}

/// A validated partial update.
///
/// Lists exactly the updatable fields: `slug`, `id` and `lastUpdated` cannot be
/// expressed here. Slug changes go through an explicit rename.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub highlights: Option<Vec<String>>,
    pub faqs: Option<Vec<Faq>>,
    pub images: Option<Vec<String>>,
    pub order: Option<u32>,
    /// `Some(None)` clears the SEO block.
    pub seo: Option<Option<Seo>>,
    pub active: Option<bool>,
}

impl ServicePatch {
    /// Patch that only toggles visibility.
    pub fn active(active: bool) -> Self {
        Self { active: Some(active), ..Self::default() }
    }

    /// Merge the present fields onto `target`. Does not touch `last_updated`.
    pub fn apply_to(&self, target: &mut Service) {
        if let Some(v) = &self.name { target.name = v.clone(); }
        if let Some(v) = &self.short_description { target.short_description = v.clone(); }
        if let Some(v) = &self.description { target.description = v.clone(); }
        if let Some(v) = &self.features { target.features = v.clone(); }
        if let Some(v) = &self.highlights { target.highlights = v.clone(); }
        if let Some(v) = &self.faqs { target.faqs = v.clone(); }
        if let Some(v) = &self.images { target.images = v.clone(); }
        if let Some(v) = self.order { target.order = v; }
        if let Some(v) = &self.seo { target.seo = v.clone(); }
        if let Some(v) = self.active { target.active = v; }
    }

    /// Serialized (camelCase) names of the fields this patch sets.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.name.is_some() { names.push("name"); }
        if self.short_description.is_some() { names.push("shortDescription"); }
        if self.description.is_some() { names.push("description"); }
        if self.features.is_some() { names.push("features"); }
        if self.highlights.is_some() { names.push("highlights"); }
        if self.faqs.is_some() { names.push("faqs"); }
        if self.images.is_some() { names.push("images"); }
        if self.order.is_some() { names.push("order"); }
        if self.seo.is_some() { names.push("seo"); }
        if self.active.is_some() { names.push("active"); }
        names
    }

    pub fn is_empty(&self) -> bool { self.field_names().is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Service {
        NewService {
            slug: "roofing".into(),
            name: "Roofing".into(),
            short_description: "x".into(),
            description: "y".into(),
            features: vec![],
            highlights: vec![],
            faqs: vec![],
            images: vec![],
            order: 1,
            seo: None,
            active: true,
        }
        .into_service(None, Utc.with_ymd_and_hms(2024, 1, 25, 0, 0, 0).unwrap())
    }

    #[test]
    fn touch_is_monotonic() {
        let mut svc = sample();
        let before = svc.last_updated;
        svc.touch(before - chrono::Duration::hours(1));
        assert_eq!(svc.last_updated, before);
        svc.touch(before + chrono::Duration::hours(1));
        assert!(svc.last_updated > before);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut svc = sample();
        let patch = ServicePatch { order: Some(7), seo: Some(None), ..ServicePatch::active(false) };
        patch.apply_to(&mut svc);
        assert_eq!(svc.order, 7);
        assert!(!svc.active);
        assert_eq!(svc.name, "Roofing");
        assert_eq!(patch.field_names(), vec!["order", "seo", "active"]);
    }

    #[test]
    fn camel_case_wire_format() -> anyhow::Result<()> {
        let json = serde_json::to_value(sample())?;
        assert_eq!(json["shortDescription"], "x");
        assert_eq!(json["lastUpdated"], "2024-01-25T00:00:00Z");
        assert!(json.get("id").is_none());
        assert!(json.get("seo").is_none());

        let back: Service = serde_json::from_value(json)?;
        assert_eq!(back, sample());
        Ok(())
    }

    #[test]
    fn missing_optional_fields_take_defaults() -> anyhow::Result<()> {
        let svc: Service = serde_json::from_value(serde_json::json!({
            "slug": "a", "name": "A", "shortDescription": "s", "description": "d",
            "lastUpdated": "2024-01-25T00:00:00.000Z"
        }))?;
        assert!(svc.active);
        assert_eq!(svc.order, 0);
        assert!(svc.features.is_empty());
        Ok(())
    }
}
