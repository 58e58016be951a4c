//! Single-file component extraction
//!
//! A component file is split into top-level blocks, each script block is
//! analyzed on its own in local line numbers, and the sections are moved
//! back to file lines.

/// Top-level block parsing
pub mod descriptor;
/// Component option lookup for units inside `export default { ... }`
pub mod options;

use super::language::ScriptLang;
use super::safety::run_blocking;
use super::script::{NamingContext, ScriptExtractor};
use crate::config::AnalysisConfig;
use crate::diff::AddedLines;
use crate::error::ExtractError;
use crate::types::{ComponentMetadata, Section};
use descriptor::{ComponentDescriptor, RegionKind};

/// Sections in file lines, sorted by start line
#[derive(Debug, Default)]
pub struct ComponentOutcome {
    pub sections: Vec<Section>,
    pub issues: Vec<ExtractError>,
    /// Absent when the descriptor could not be parsed
    pub metadata: Option<ComponentMetadata>,
}

pub struct ComponentExtractor<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> ComponentExtractor<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub async fn extract(&self, source: &str, added: &AddedLines) -> ComponentOutcome {
        let mut outcome = ComponentOutcome::default();

        let text = source.to_string();
        let parsed = run_blocking(self.config.timeout(), "component descriptor", move || {
            ComponentDescriptor::parse(&text)
        })
        .await;

        let descriptor = match parsed {
            Ok(Ok(descriptor)) => descriptor,
            Ok(Err(e)) => {
                tracing::warn!("Failed to parse component blocks: {}", e);
                outcome.issues.push(e.into());
                return outcome;
            }
            Err(e) => {
                tracing::warn!("Component block parsing did not finish: {}", e);
                outcome.issues.push(e);
                return outcome;
            }
        };
        outcome.metadata = Some(descriptor.metadata());

        for region in descriptor.scripts() {
            let Some(lang) = ScriptLang::from_lang_attr(region.lang.as_deref()) else {
                tracing::warn!(
                    "Skipping script block on line {} with unsupported lang {:?}",
                    region.start_line,
                    region.lang
                );
                continue;
            };

            let local = added.localize(region.start_line);
            if local.is_empty() {
                continue;
            }

            let naming = match region.kind {
                RegionKind::Script => NamingContext::ComponentOptions,
                _ => NamingContext::Plain,
            };
            tracing::debug!(
                "Analyzing {:?} block at line {} ({}, {} added line(s))",
                region.kind,
                region.start_line,
                lang.name(),
                local.len()
            );

            let script = ScriptExtractor::new(self.config, lang)
                .with_naming(naming)
                .with_first_line(region.start_line)
                .extract(&region.content, &local)
                .await;

            outcome.sections.extend(
                script
                    .sections
                    .iter()
                    .map(|section| section.shifted(region.start_line)),
            );
            outcome.issues.extend(script.issues);
        }

        outcome
            .sections
            .sort_by(|a, b| a.start_line.cmp(&b.start_line).then(a.end_line.cmp(&b.end_line)));
        outcome
    }
}
