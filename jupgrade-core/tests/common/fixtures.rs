//! Test data fixtures for jupgrade-core

/// Java 8 Spring Boot project with a property-managed version
pub fn sample_pom_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.springframework.boot</groupId>
    <artifactId>spring-boot-starter-parent</artifactId>
    <version>2.5.6</version>
  </parent>
  <groupId>com.example</groupId>
  <artifactId>orders</artifactId>
  <version>1.0.0</version>
  <properties>
    <java.version>1.8</java.version>
    <guava.version>30.1-jre</guava.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>com.google.guava</groupId>
      <artifactId>guava</artifactId>
      <version>${guava.version}</version>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.12</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>
"#
}

/// Groovy DSL build with a variable-managed version
pub fn sample_build_gradle() -> &'static str {
    r#"plugins {
    id 'java'
    id 'org.springframework.boot' version '2.7.5'
}

def jacksonVersion = '2.13.4'

sourceCompatibility = '11'

dependencies {
    implementation "com.fasterxml.jackson.core:jackson-databind:$jacksonVersion"
    implementation 'org.apache.commons:commons-lang3:3.12.0'
    testImplementation group: 'junit', name: 'junit', version: '4.13.1'
}
"#
}
