//! Pure views over a fetched collection. No I/O, deterministic output.

use models::Service;

/// Records visible to the public.
pub fn active_only(services: &[Service]) -> Vec<Service> {
    services.iter().filter(|s| s.active).cloned().collect()
}

/// Ascending `order`; records with equal `order` keep their relative position.
pub fn sort_by_order(mut services: Vec<Service>) -> Vec<Service> {
    services.sort_by_key(|s| s.order);
    services
}

/// Active records in display order.
pub fn public_listing(services: &[Service]) -> Vec<Service> {
    sort_by_order(active_only(services))
}

fn matches(service: &Service, needle: &str) -> bool {
    service.name.to_lowercase().contains(needle)
        || service.short_description.to_lowercase().contains(needle)
        || service.description.to_lowercase().contains(needle)
}

/// Case-insensitive substring search over name, short description and
/// description of active records, in display order.
///
/// A blank term matches every active record.
pub fn search(services: &[Service], term: &str) -> Vec<Service> {
    let needle = term.trim().to_lowercase();
    let hits = services
        .iter()
        .filter(|s| s.active)
        .filter(|s| needle.is_empty() || matches(s, &needle))
        .cloned()
        .collect();
    sort_by_order(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::seed::default_services;

    fn svc(slug: &str, order: u32, active: bool) -> Service {
        let mut s = default_services().remove(0);
        s.slug = slug.into();
        s.order = order;
        s.active = active;
        s
    }

    fn slugs(services: &[Service]) -> Vec<&str> {
        services.iter().map(|s| s.slug.as_str()).collect()
    }

    #[test]
    fn listing_drops_inactive_and_sorts_stably() {
        let all = vec![svc("c", 2, true), svc("a", 1, true), svc("hidden", 0, false), svc("b", 2, true)];
        assert_eq!(slugs(&public_listing(&all)), vec!["a", "c", "b"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let services = default_services();
        assert_eq!(slugs(&search(&services, "EMERGENCY")), vec!["roofing-services"]);
        assert_eq!(slugs(&search(&services, "basement")), vec!["waterproofing-solutions"]);
        assert!(search(&services, "swimming pool").is_empty());
    }

    #[test]
    fn features_are_not_searched() {
        assert!(search(&default_services(), "gutter").is_empty());
    }

    #[test]
    fn blank_search_returns_every_active_record() {
        let mut services = default_services();
        services[1].active = false;
        assert_eq!(slugs(&search(&services, "   ")), vec!["roofing-services", "kitchen-bathroom-renovations"]);
    }

    #[test]
    fn inactive_records_never_match() {
        let mut services = default_services();
        services[0].active = false;
        assert!(search(&services, "roof").iter().all(|s| s.slug != "roofing-services"));
    }
}
