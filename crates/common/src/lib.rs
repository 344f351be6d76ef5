//! Shared plumbing for the site workspace: logging setup, runtime checks,
//! Prometheus metrics and small response types.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }
}
