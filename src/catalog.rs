//! Fixed catalog of deployable services.
//!
//! The catalog is a statically defined table constructed once at startup.
//! Lookups of unknown names return `None`; callers treat that as a warned
//! no-op rather than a failure.

/// Immutable description of one deployable service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceDescriptor {
    /// Unique service identifier used for CLI selection and lookups.
    pub name: &'static str,
    /// Image tag built and loaded into the cluster's image store.
    pub image_tag: &'static str,
    /// Build context directory, relative to the configured repository root.
    pub build_dir: &'static str,
    /// Manifest filenames applied in exactly this order.
    pub manifests: &'static [&'static str],
    /// Workload names that must each reach rollout readiness.
    pub workloads: &'static [&'static str],
}

const SERVICES: &[ServiceDescriptor] = &[
    ServiceDescriptor {
        name: "auth",
        image_tag: "auth-app:latest",
        build_dir: "auth_service",
        manifests: &["secrets.yaml", "auth.yaml"],
        workloads: &["auth-app", "auth-postgres"],
    },
    ServiceDescriptor {
        name: "game",
        image_tag: "game-app:latest",
        build_dir: "game_service",
        manifests: &["secrets.yaml", "game.yaml"],
        workloads: &["game-app", "game-postgres"],
    },
];

/// The set of services known to the orchestrator, in deployment order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Catalog {
    services: Vec<ServiceDescriptor>,
}

impl Catalog {
    /// Builds the standard two-service catalog (`auth`, `game`).
    #[must_use]
    pub fn standard() -> Self {
        Self {
            services: SERVICES.to_vec(),
        }
    }

    /// Builds a catalog from explicit descriptors, primarily for tests.
    #[must_use]
    pub const fn from_services(services: Vec<ServiceDescriptor>) -> Self {
        Self { services }
    }

    /// Looks up a service by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|service| service.name == name)
    }

    /// Returns the services in declared deployment order.
    #[must_use]
    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_lists_auth_before_game() {
        let catalog = Catalog::standard();
        let names: Vec<&str> = catalog
            .services()
            .iter()
            .map(|service| service.name)
            .collect();
        assert_eq!(names, ["auth", "game"]);
    }

    #[test]
    fn manifest_order_places_secrets_first() {
        let catalog = Catalog::standard();
        let auth = catalog.get("auth").expect("auth should exist");
        assert_eq!(auth.manifests, ["secrets.yaml", "auth.yaml"]);
    }

    #[test]
    fn unknown_service_lookup_returns_none() {
        let catalog = Catalog::standard();
        assert!(catalog.get("billing").is_none());
    }
}
