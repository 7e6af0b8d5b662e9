//! Test data fixtures for jupgrade-deps

use std::path::Path;

use jupgrade_core::domain::project::{BuildSystem, DependencyCoordinate, ProjectInfo};

pub const GRADLE_KTS: &str = r#"plugins {
    java
    id("org.springframework.boot") version "3.1.5"
}

val jacksonVersion = "2.15.0"

dependencies {
    implementation("com.fasterxml.jackson.core:jackson-databind:$jacksonVersion")
    implementation("org.apache.commons:commons-lang3:3.12.0")
    testImplementation("org.junit.jupiter:junit-jupiter:5.9.3")
}
"#;

pub const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project>
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>billing</artifactId>
  <version>2.3.0</version>
  <properties>
    <maven.compiler.release>11</maven.compiler.release>
    <slf4j.version>1.7.36</slf4j.version>
  </properties>
  <dependencies>
    <!-- logging -->
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
      <version>${slf4j.version}</version>
    </dependency>
    <dependency>
      <groupId>org.apache.commons</groupId>
      <artifactId>commons-text</artifactId>
      <version>1.9</version>
    </dependency>
  </dependencies>
</project>
"#;

pub fn project(root: &Path, build_system: BuildSystem, manifest: &str) -> ProjectInfo {
    ProjectInfo {
        root: root.to_path_buf(),
        build_system,
        manifest_path: root.join(manifest),
        current_java_version: "11".into(),
        dependencies: Vec::<DependencyCoordinate>::new(),
        framework_version: None,
    }
}
