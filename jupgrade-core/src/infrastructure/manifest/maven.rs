//! Structural pom.xml version rewriting

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{ManifestError, splice};
use crate::infrastructure::parsers::maven::property_reference;

/// A `<dependency>` seen while scanning, with the byte span of its version text
#[derive(Debug, Default)]
struct DependencySpan {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<(String, (usize, usize))>,
}

/// Trim surrounding whitespace from a text span
fn trimmed_span(content: &str, start: usize, end: usize) -> (usize, usize) {
    let raw = &content[start..end];
    let leading = raw.len() - raw.trim_start().len();
    let trailing = raw.len() - raw.trim_end().len();
    (start + leading, end - trailing)
}

/// Set the version of every `<dependency>` matching `group_id:artifact_id` that
/// declares one. When the declared version is a `${property}`, the property in
/// `<properties>` is rewritten instead.
pub fn rewrite_maven_dependency(
    content: &str,
    group_id: &str,
    artifact_id: &str,
    new_version: &str,
) -> Result<String, ManifestError> {
    let key = format!("{}:{}", group_id, artifact_id);
    let mut reader = Reader::from_str(content);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<DependencySpan> = None;
    let mut matched: Vec<(String, (usize, usize))> = Vec::new();
    let mut properties: HashMap<String, (usize, usize)> = HashMap::new();

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ManifestError::Xml {
                position: reader.buffer_position() as usize,
                message: e.to_string(),
            })?;
        let end = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "dependency" {
                    current = Some(DependencySpan::default());
                }
                path.push(name);
            }
            Event::End(_) => {
                if path.pop().as_deref() == Some("dependency") {
                    if let Some(dep) = current.take() {
                        let is_match = dep.group_id.as_deref() == Some(group_id)
                            && dep.artifact_id.as_deref() == Some(artifact_id);
                        if let (true, Some(version)) = (is_match, dep.version) {
                            matched.push(version);
                        }
                    }
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default();
                if !text.is_empty() {
                    let span = trimmed_span(content, start, end);
                    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                    match segments.as_slice() {
                        ["project", "properties", name] => {
                            properties.insert((*name).to_string(), span);
                        }
                        [.., "dependency", field] => {
                            if let Some(dep) = current.as_mut() {
                                match *field {
                                    "groupId" => dep.group_id = Some(text),
                                    "artifactId" => dep.artifact_id = Some(text),
                                    "version" => dep.version = Some((text, span)),
                                    _ => {}
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if matched.is_empty() {
        return Err(ManifestError::DependencyNotFound { key });
    }

    let mut spans = Vec::with_capacity(matched.len());
    for (declared, span) in matched {
        match property_reference(&declared) {
            Some(property) => {
                let property_span =
                    properties
                        .get(property)
                        .copied()
                        .ok_or_else(|| ManifestError::PropertyNotFound {
                            key: key.clone(),
                            property: property.to_string(),
                        })?;
                spans.push(property_span);
            }
            None => spans.push(span),
        }
    }

    tracing::debug!(dependency = %key, edits = spans.len(), "Rewriting pom.xml version");
    Ok(splice(content, spans, new_version))
}
