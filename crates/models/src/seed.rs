//! The default service collection.
//!
//! Used to initialize a missing data file, to bootstrap the in-memory store
//! when no snapshot is supplied, as the read fallback when a backend cannot be
//! reached, and as the import source for a fresh document store.

use chrono::{DateTime, TimeZone, Utc};

use crate::service::{Faq, Seo, Service};

struct SeedEntry {
    slug: &'static str,
    name: &'static str,
    short_description: &'static str,
    description: &'static str,
    features: &'static [&'static str],
    faqs: &'static [(&'static str, &'static str)],
    images: &'static [&'static str],
    highlights: &'static [&'static str],
    order: u32,
    seo_title: &'static str,
    seo_description: &'static str,
    seo_keywords: &'static [&'static str],
}

const SEED: &[SeedEntry] = &[
    SeedEntry {
        slug: "roofing-services",
        name: "Expert Roofing Services",
        short_description: "Professional roofing installation, repair, and maintenance for residential and commercial properties.",
        description: "Our expert roofing services provide comprehensive solutions for all your roofing needs. From new installations to emergency repairs, we use only the highest quality materials and proven techniques to ensure your roof provides lasting protection for your property.",
        features: &[
            "New roof installation and replacement",
            "Roof repair and maintenance",
            "Emergency roofing services",
            "Gutter installation and cleaning",
            "Roof inspections and assessments",
            "Insurance claim assistance",
        ],
        faqs: &[
            (
                "How long does a typical roof installation take?",
                "Most residential roof installations take 1-3 days depending on the size and complexity of the project. Weather conditions may affect the timeline.",
            ),
            (
                "Do you provide warranties on your roofing work?",
                "Yes, we provide comprehensive warranties on both materials and workmanship. Material warranties vary by manufacturer, and our workmanship is guaranteed for 10 years.",
            ),
        ],
        images: &[
            "https://images.unsplash.com/photo-1581858726788-75bc0f6a952d?w=800",
            "https://images.unsplash.com/photo-1504307651254-35680f356dfd?w=800",
        ],
        highlights: &[
            "Licensed and insured contractors",
            "10-year workmanship warranty",
            "Emergency repair services",
            "Free estimates",
        ],
        order: 1,
        seo_title: "Expert Roofing Services | Installation, Repair & Maintenance",
        seo_description: "Professional roofing services for residential and commercial properties. Expert installation, repairs, and maintenance with 10-year warranty.",
        seo_keywords: &["roofing services", "roof installation", "roof repair", "roofing contractor", "roof replacement"],
    },
    SeedEntry {
        slug: "waterproofing-solutions",
        name: "Waterproofing Solutions",
        short_description: "Comprehensive waterproofing services to protect your property from water damage and moisture issues.",
        description: "Protect your investment with our professional waterproofing solutions. We specialize in basement waterproofing, foundation sealing, and moisture control systems to keep your property dry and secure.",
        features: &[
            "Basement waterproofing",
            "Foundation sealing and repair",
            "Exterior waterproofing systems",
            "Moisture control and ventilation",
            "Drainage system installation",
            "Waterproof coating application",
        ],
        faqs: &[
            (
                "How do I know if I need waterproofing?",
                "Signs include water stains, musty odors, visible mold, efflorescence on walls, or actual water seepage. We offer free inspections to assess your needs.",
            ),
            (
                "How long do waterproofing solutions last?",
                "Our waterproofing systems are designed to last 15-25 years with proper maintenance. We provide warranties on all our waterproofing work.",
            ),
        ],
        images: &[
            "https://images.unsplash.com/photo-1516156008625-3a9d6067fab5?w=800",
            "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=800",
        ],
        highlights: &[
            "Free moisture inspections",
            "15-year system warranty",
            "Advanced waterproofing technology",
            "Emergency water damage response",
        ],
        order: 2,
        seo_title: "Professional Waterproofing Solutions | Basement & Foundation",
        seo_description: "Expert waterproofing services for basements and foundations. Advanced moisture control systems with 15-year warranty.",
        seo_keywords: &["waterproofing", "basement waterproofing", "foundation sealing", "moisture control", "water damage prevention"],
    },
    SeedEntry {
        slug: "kitchen-bathroom-renovations",
        name: "Kitchen & Bathroom Renovations",
        short_description: "Complete kitchen and bathroom renovation services with custom design and professional installation.",
        description: "Transform your living spaces with our comprehensive renovation services. From modern kitchen upgrades to luxury bathroom remodels, we handle every aspect of your renovation project with attention to detail and quality craftsmanship.",
        features: &[
            "Custom kitchen design and installation",
            "Bathroom remodeling and upgrades",
            "Countertop and cabinet installation",
            "Tile and flooring services",
            "Plumbing and electrical work",
            "Project management and coordination",
        ],
        faqs: &[
            (
                "How long does a typical renovation take?",
                "Kitchen renovations typically take 3-6 weeks, while bathroom renovations take 2-4 weeks. Timeline depends on the scope of work and material availability.",
            ),
            (
                "Do you handle permits and inspections?",
                "Yes, we handle all necessary permits and coordinate inspections as required by local building codes.",
            ),
        ],
        images: &[
            "https://images.unsplash.com/photo-1556909114-f6e7ad7d3136?w=800",
            "https://images.unsplash.com/photo-1504307651254-35680f6a952d?w=800",
        ],
        highlights: &[
            "Custom design services",
            "Licensed contractors",
            "Quality materials and fixtures",
            "Permit and inspection handling",
        ],
        order: 3,
        seo_title: "Kitchen & Bathroom Renovation | Complete Home Remodeling",
        seo_description: "Expert kitchen and bathroom renovations. Custom designs, quality materials, full-service remodeling from planning to completion.",
        seo_keywords: &["kitchen renovation", "bathroom remodeling", "home renovation", "custom kitchen", "bathroom renovation"],
    },
];

/// Timestamp carried by every seed record.
pub fn seed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 25, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A fresh copy of the default collection, in display order.
pub fn default_services() -> Vec<Service> {
    let ts = seed_timestamp();
    SEED.iter()
        .map(|e| Service {
            id: None,
            slug: e.slug.into(),
            name: e.name.into(),
            short_description: e.short_description.into(),
            description: e.description.into(),
            features: owned(e.features),
            highlights: owned(e.highlights),
            faqs: e
                .faqs
                .iter()
                .map(|(q, a)| Faq { question: q.to_string(), answer: a.to_string() })
                .collect(),
            images: owned(e.images),
            order: e.order,
            seo: Some(Seo {
                title: Some(e.seo_title.into()),
                description: Some(e.seo_description.into()),
                keywords: owned(e.seo_keywords),
            }),
            active: true,
            last_updated: ts,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_create;

    #[test]
    fn seed_records_pass_validation() -> anyhow::Result<()> {
        for svc in default_services() {
            let payload = serde_json::to_value(&svc)?;
            let validated = validate_create(&payload).map_err(|e| anyhow::anyhow!("{}: {e}", svc.slug))?;
            assert_eq!(validated, svc.to_new());
        }
        Ok(())
    }

    #[test]
    fn seed_slugs_are_unique() {
        let services = default_services();
        let mut slugs: Vec<_> = services.iter().map(|s| s.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), services.len());
    }
}
