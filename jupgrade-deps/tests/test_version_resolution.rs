//! Resolver against a mocked Maven Central

mod common;

use std::sync::Arc;

use common::*;
use jupgrade_core::config::MavenCentralConfig;
use jupgrade_core::domain::project::DependencyCoordinate;
use jupgrade_core::infrastructure::MavenCentralClient;
use jupgrade_core::infrastructure::registries::RegistryError;
use jupgrade_deps::{
    DependencyResolver, DependencyResolverService, ResolutionConstraints, VersionConstraint,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn resolver_for(server: &MockServer) -> DependencyResolver {
    let client = MavenCentralClient::new(&MavenCentralConfig::default())
        .unwrap()
        .with_base_url(server.uri());
    DependencyResolver::new(Arc::new(client))
}

#[tokio::test]
async fn test_resolves_newest_stable_release() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solrsearch/select"))
        .respond_with(ResponseTemplate::new(200).set_body_json(maven_search_body(&[
            "6.1.0-RC1",
            "5.3.31",
            "6.0.14",
            "6.0.9",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let coordinate = DependencyCoordinate::new("org.springframework", "spring-core", "5.3.20");
    let latest = resolver_for(&server)
        .await
        .resolve_latest_version(&coordinate, &ResolutionConstraints::default())
        .await
        .unwrap();

    assert_eq!(latest.unwrap().as_str(), "6.0.14");
}

#[tokio::test]
async fn test_resolves_within_major_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solrsearch/select"))
        .respond_with(ResponseTemplate::new(200).set_body_json(maven_search_body(&[
            "5.3.31", "6.0.14",
        ])))
        .mount(&server)
        .await;

    let coordinate = DependencyCoordinate::new("org.springframework", "spring-core", "5.3.20");
    let constraints = ResolutionConstraints::default()
        .with_constraint(VersionConstraint::parse("[5.3.20,6.0)").unwrap());
    let latest = resolver_for(&server)
        .await
        .resolve_latest_version(&coordinate, &constraints)
        .await
        .unwrap();

    assert_eq!(latest.unwrap().as_str(), "5.3.31");
}

#[tokio::test]
async fn test_registry_failure_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solrsearch/select"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let coordinate = DependencyCoordinate::new("g", "a", "1.0");
    let err = resolver_for(&server)
        .await
        .resolve_latest_version(&coordinate, &ResolutionConstraints::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::RateLimited));
}
