//! Unit test skeleton generation for main sources

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument};

use jupgrade_core::application::errors::UpgradeError;
use jupgrade_core::domain::project::ProjectInfo;

use crate::infrastructure::project_detection::find_main_sources;

static PACKAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").unwrap());

static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:public\s+)?((?:abstract|final|sealed)\s+)*(class|interface|enum|record|@interface)\s+(\w+)")
        .unwrap()
});

static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*public\s+(?:static\s+)?(?:final\s+)?(?:synchronized\s+)?(?:<[^>]+>\s+)?[\w<>\[\],.?\s]+?\s+(\w+)\s*\(")
        .unwrap()
});

/// Which JUnit generation the skeletons are written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestFramework {
    JUnit4,
    JUnit5,
}

impl TestFramework {
    /// JUnit 5 when the project declares any `org.junit.jupiter` artifact
    pub fn detect(project: &ProjectInfo) -> Self {
        if project
            .dependencies
            .iter()
            .any(|d| d.group_id == "org.junit.jupiter")
        {
            TestFramework::JUnit5
        } else {
            TestFramework::JUnit4
        }
    }
}

/// Files written and skipped by one generation run, relative to the project root
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneratedTests {
    pub written: Vec<PathBuf>,
    /// Test class already present and `overwrite` not set
    pub skipped: Vec<PathBuf>,
}

/// A class that gets a test skeleton
#[derive(Debug, Clone, PartialEq, Eq)]
struct TestTarget {
    package: Option<String>,
    class_name: String,
    methods: Vec<String>,
}

fn parse_source(source: &str) -> Option<TestTarget> {
    let package = PACKAGE_RE.captures(source).map(|c| c[1].to_string());
    let declaration = TYPE_RE.captures(source)?;

    let modifiers = declaration.get(1).map(|m| m.as_str()).unwrap_or_default();
    if &declaration[2] != "class" || modifiers.contains("abstract") {
        return None;
    }
    let class_name = declaration[3].to_string();

    let mut methods: Vec<String> = Vec::new();
    for captures in METHOD_RE.captures_iter(source) {
        let name = captures[1].to_string();
        if name != class_name && !methods.contains(&name) {
            methods.push(name);
        }
    }

    Some(TestTarget {
        package,
        class_name,
        methods,
    })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render(target: &TestTarget, framework: TestFramework) -> String {
    let mut out = String::new();
    if let Some(package) = &target.package {
        out.push_str(&format!("package {};\n\n", package));
    }

    match framework {
        TestFramework::JUnit5 => {
            out.push_str("import org.junit.jupiter.api.BeforeEach;\n");
            out.push_str("import org.junit.jupiter.api.Test;\n\n");
            out.push_str("import static org.junit.jupiter.api.Assertions.*;\n\n");
        }
        TestFramework::JUnit4 => {
            out.push_str("import org.junit.Before;\n");
            out.push_str("import org.junit.Test;\n\n");
            out.push_str("import static org.junit.Assert.*;\n\n");
        }
    }

    let visibility = match framework {
        TestFramework::JUnit5 => "",
        TestFramework::JUnit4 => "public ",
    };
    let before = match framework {
        TestFramework::JUnit5 => "@BeforeEach",
        TestFramework::JUnit4 => "@Before",
    };

    out.push_str(&format!("{}class {}Test {{\n\n", visibility, target.class_name));
    out.push_str(&format!("    private {} subject;\n\n", target.class_name));
    out.push_str(&format!("    {}\n", before));
    out.push_str(&format!("    {}void setUp() {{\n", visibility));
    out.push_str(&format!("        subject = new {}();\n", target.class_name));
    out.push_str("    }\n");

    if target.methods.is_empty() {
        out.push_str("\n    @Test\n");
        out.push_str(&format!("    {}void createsInstance() {{\n", visibility));
        out.push_str("        assertNotNull(subject);\n");
        out.push_str("    }\n");
    }
    for method in &target.methods {
        out.push_str("\n    @Test\n");
        out.push_str(&format!("    {}void test{}() {{\n", visibility, capitalize(method)));
        out.push_str(&format!("        // TODO: exercise {}\n", method));
        out.push_str("        assertNotNull(subject);\n");
        out.push_str("    }\n");
    }

    out.push_str("}\n");
    out
}

/// Writes `<Class>Test.java` skeletons under `src/test/java`
pub struct TestGenerator {
    overwrite: bool,
}

impl TestGenerator {
    pub fn new(overwrite: bool) -> Self {
        Self { overwrite }
    }

    #[instrument(skip(self, project), fields(root = %project.root.display()))]
    pub async fn generate(&self, project: &ProjectInfo) -> Result<GeneratedTests, UpgradeError> {
        let framework = TestFramework::detect(project);
        let main_root = project.root.join("src").join("main").join("java");
        let test_root = project.root.join("src").join("test").join("java");
        let mut generated = GeneratedTests::default();

        for relative in find_main_sources(&project.root) {
            let source = tokio::fs::read_to_string(main_root.join(&relative)).await?;
            let Some(target) = parse_source(&source) else {
                debug!(file = %relative.display(), "No concrete class; skipping");
                continue;
            };

            let test_relative = relative
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(format!("{}Test.java", target.class_name));
            let test_path = test_root.join(&test_relative);
            let reported = Path::new("src/test/java").join(&test_relative);

            if !self.overwrite && tokio::fs::try_exists(&test_path).await? {
                generated.skipped.push(reported);
                continue;
            }

            if let Some(parent) = test_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&test_path, render(&target, framework)).await?;
            generated.written.push(reported);
        }

        info!(
            written = generated.written.len(),
            skipped = generated.skipped.len(),
            framework = ?framework,
            "Generated test skeletons"
        );
        Ok(generated)
    }
}
