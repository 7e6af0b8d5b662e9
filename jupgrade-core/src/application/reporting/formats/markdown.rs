//! Markdown report format implementation

use crate::application::reporting::UpgradeReport;

fn yes_no(value: bool) -> &'static str {
    if value { "passed" } else { "failed" }
}

/// Generate a human-readable Markdown report
pub fn generate_markdown_report(report: &UpgradeReport) -> String {
    let mut out = String::new();

    out.push_str("# Java Upgrade Report\n\n");
    out.push_str(&format!(
        "Generated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Run ID: {}\n", report.id));
    out.push_str(&format!("Project: {}\n", report.project_root.display()));
    out.push_str(&format!("Build tool: {}\n", report.build_system));
    out.push_str(&format!("Status: {}\n\n", report.status));

    out.push_str("## Versions\n\n");
    out.push_str(&format!(
        "- Java: {} -> {}\n",
        report.from_java_version, report.to_java_version
    ));
    if let (Some(from), Some(to)) = (&report.from_framework_version, &report.to_framework_version) {
        out.push_str(&format!("- Spring Boot: {} -> {}\n", from, to));
    }
    out.push('\n');

    if !report.recipes.is_empty() {
        out.push_str("## Recipes Applied\n\n");
        for recipe in &report.recipes {
            out.push_str(&format!("- `{}`\n", recipe));
        }
        out.push('\n');
    }

    if !report.dependency_updates.is_empty() {
        out.push_str("## Dependency Updates\n\n");
        out.push_str("| Dependency | From | To |\n|---|---|---|\n");
        for update in &report.dependency_updates {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                update.key(),
                update.from_version,
                update.to_version
            ));
        }
        out.push('\n');
    }

    out.push_str("## Validation\n\n");
    out.push_str(&format!("- Build: {}\n", yes_no(report.result.build_success)));
    if report.result.tests_skipped {
        out.push_str("- Tests: skipped\n");
    } else {
        out.push_str(&format!("- Tests: {}\n", yes_no(report.result.tests_passing)));
    }
    let breakdown = &report.severity_breakdown;
    out.push_str(&format!(
        "- Vulnerabilities: {} (critical {}, high {}, medium {}, low {})\n\n",
        breakdown.total(),
        breakdown.critical,
        breakdown.high,
        breakdown.medium,
        breakdown.low
    ));

    if !report.result.vulnerability_issues.is_empty() {
        out.push_str("### Vulnerabilities\n\n");
        for issue in &report.result.vulnerability_issues {
            out.push_str(&format!(
                "- **{}** ({}) in `{}`\n",
                issue.id, issue.severity, issue.dependency
            ));
            if !issue.description.is_empty() {
                out.push_str(&format!("  {}\n", issue.description));
            }
        }
        out.push('\n');
    }

    if !report.result.changed_files.is_empty() {
        out.push_str("## Changed Files\n\n");
        for file in &report.result.changed_files {
            out.push_str(&format!("- {}\n", file.display()));
        }
        out.push('\n');
    }

    if !report.checkpoints.is_empty() || report.backup_id.is_some() {
        out.push_str("## Restore Points\n\n");
        for tag in &report.checkpoints {
            out.push_str(&format!("- checkpoint `{}`\n", tag));
        }
        if let Some(id) = &report.backup_id {
            out.push_str(&format!("- backup `{}`\n", id));
        }
        out.push('\n');
    }

    out
}
