//! Top-level block structure of a single-file component

use crate::error::DescriptorError;
use crate::types::ComponentMetadata;
use regex::Regex;
use std::sync::LazyLock;

/// A top-level comment or opening tag. Quoted attribute values may hold `>`.
static TOP_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<([A-Za-z][A-Za-z0-9-]*)((?:\s(?:"[^"]*"|'[^']*'|[^>"'])*?)?)(/?)>"#,
    )
    .expect("valid regex")
});

/// Comments and nested `<template>` openers and closers, for matching the
/// outer one
static TEMPLATE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<!--.*?-->|<(/?)template(?:\s(?:"[^"]*"|'[^']*'|[^>"'])*?)?(/?)>"#)
        .expect("valid regex")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionKind {
    Template,
    Script,
    ScriptSetup,
    Style,
    /// Any other top-level block (`<i18n>`, `<docs>`, ...)
    Custom(String),
}

impl RegionKind {
    pub fn is_script(&self) -> bool {
        matches!(self, RegionKind::Script | RegionKind::ScriptSetup)
    }
}

/// One top-level block.
///
/// `content` is everything between the opening and closing tag. Its line 1
/// is the rest of the opening tag's line, which sits on `start_line` of the
/// file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub kind: RegionKind,
    /// `lang` attribute, if any
    pub lang: Option<String>,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Parsed block layout of a component file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub regions: Vec<Region>,
}

impl ComponentDescriptor {
    /// Split a component file into its top-level blocks.
    ///
    /// Top-level comments are skipped and self-closing blocks yield empty
    /// regions. A second `<template>`, `<script>` or `<script setup>` and any
    /// unclosed block are errors.
    pub fn parse(source: &str) -> Result<Self, DescriptorError> {
        let lower = source.to_ascii_lowercase();
        let mut regions: Vec<Region> = Vec::new();
        let mut pos = 0;

        while let Some(caps) = TOP_LEVEL.captures_at(source, pos) {
            let Some(whole) = caps.get(0) else {
                break;
            };
            let Some(name) = caps.get(1) else {
                // comment
                pos = whole.end();
                continue;
            };

            let tag = name.as_str().to_ascii_lowercase();
            let attrs = parse_attributes(caps.get(2).map_or("", |m| m.as_str()));
            let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
            let open_end = whole.end();
            let start_line = line_of(source, open_end);

            let (content_end, close_end) = if self_closing {
                (open_end, open_end)
            } else if tag == "template" {
                find_template_close(source, open_end)
                    .ok_or_else(|| DescriptorError::Unclosed {
                        tag: tag.clone(),
                        line: line_of(source, whole.start()),
                    })?
            } else {
                find_close(&lower, &tag, open_end).ok_or_else(|| DescriptorError::Unclosed {
                    tag: tag.clone(),
                    line: line_of(source, whole.start()),
                })?
            };

            let kind = match tag.as_str() {
                "template" => RegionKind::Template,
                "script" if attrs.iter().any(|(k, _)| k == "setup") => RegionKind::ScriptSetup,
                "script" => RegionKind::Script,
                "style" => RegionKind::Style,
                _ => RegionKind::Custom(tag.clone()),
            };

            let unique = matches!(
                kind,
                RegionKind::Template | RegionKind::Script | RegionKind::ScriptSetup
            );
            if unique && regions.iter().any(|r| r.kind == kind) {
                return Err(DescriptorError::Duplicate {
                    tag: if kind == RegionKind::ScriptSetup {
                        "script setup".to_string()
                    } else {
                        tag
                    },
                    line: line_of(source, whole.start()),
                });
            }

            let lang = attrs
                .into_iter()
                .find(|(k, _)| k == "lang")
                .and_then(|(_, v)| v);

            regions.push(Region {
                kind,
                lang,
                content: source[open_end..content_end].to_string(),
                start_line,
                end_line: line_of(source, content_end),
            });
            pos = close_end;
        }

        Ok(Self { regions })
    }

    pub fn scripts(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.kind.is_script())
    }

    pub fn metadata(&self) -> ComponentMetadata {
        let count = |pred: fn(&RegionKind) -> bool| self.regions.iter().filter(|r| pred(&r.kind)).count();

        ComponentMetadata {
            has_template: count(|k| *k == RegionKind::Template) > 0,
            has_script: count(|k| *k == RegionKind::Script) > 0,
            has_script_setup: count(|k| *k == RegionKind::ScriptSetup) > 0,
            style_count: count(|k| *k == RegionKind::Style),
            custom_block_count: count(|k| matches!(k, RegionKind::Custom(_))),
        }
    }
}

/// 1-based line of a byte offset
fn line_of(source: &str, offset: usize) -> usize {
    source.as_bytes()[..offset.min(source.len())]
        .iter()
        .filter(|b| **b == b'\n')
        .count()
        + 1
}

/// `(content_end, close_end)` of `</tag>` at or after `from`.
/// `lower` is the ASCII-lowercased source, so offsets carry over.
fn find_close(lower: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let needle = format!("</{}", tag);
    let mut search = from;

    while let Some(found) = lower.get(search..)?.find(&needle) {
        let start = search + found;
        let rest = &lower[start + needle.len()..];
        let trimmed = rest.trim_start();
        if trimmed.starts_with('>') {
            let close_end = start + needle.len() + (rest.len() - trimmed.len()) + 1;
            return Some((start, close_end));
        }
        search = start + needle.len();
    }
    None
}

/// Matching close of a `<template>` whose opening tag ends at `from`
fn find_template_close(source: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;

    for caps in TEMPLATE_TAG.captures_iter(&source[from..]) {
        let whole = caps.get(0)?;
        let Some(slash) = caps.get(1) else {
            // comment
            continue;
        };
        let closing = !slash.as_str().is_empty();
        let self_closing = caps.get(2).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            depth -= 1;
            if depth == 0 {
                return Some((from + whole.start(), from + whole.end()));
            }
        } else if !self_closing {
            depth += 1;
        }
    }
    None
}

/// Attribute names (lowercased) with their optional values
fn parse_attributes(raw: &str) -> Vec<(String, Option<String>)> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string());
            Some((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"<!-- Card component -->
<template>
  <div class="card">
    <template v-if="open"><slot /></template>
  </div>
</template>

<script lang="ts">
export default {
  methods: {
    toggle() {
      this.open = !this.open;
    },
  },
};
</script>

<style scoped>
.card { color: red; }
</style>
<style lang="scss">
.x { y: z; }
</style>
<i18n>{ "en": {} }</i18n>
"#;

    #[test]
    fn test_parse_regions() {
        let descriptor = ComponentDescriptor::parse(CARD).unwrap();
        let kinds: Vec<_> = descriptor.regions.iter().map(|r| r.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                RegionKind::Template,
                RegionKind::Script,
                RegionKind::Style,
                RegionKind::Style,
                RegionKind::Custom("i18n".to_string()),
            ]
        );
    }

    #[test]
    fn test_script_offset_and_lang() {
        let descriptor = ComponentDescriptor::parse(CARD).unwrap();
        let script = descriptor.scripts().next().unwrap();

        assert_eq!(script.start_line, 8);
        assert_eq!(script.end_line, 16);
        assert_eq!(script.lang.as_deref(), Some("ts"));
        // Local line 2 is the first line after the opening tag
        assert_eq!(script.content.lines().nth(1), Some("export default {"));
    }

    #[test]
    fn test_nested_template() {
        let descriptor = ComponentDescriptor::parse(CARD).unwrap();
        let template = &descriptor.regions[0];
        assert!(template.content.contains("<slot />"));
        assert!(template.content.trim_end().ends_with("</div>"));
    }

    #[test]
    fn test_commented_template_tag_inside_template() {
        let source = "<template>\n  <div>\n    <!-- <template v-if=\"old\"> -->\n  </div>\n</template>\n<script>\nexport default {};\n</script>\n";
        let descriptor = ComponentDescriptor::parse(source).unwrap();

        assert_eq!(descriptor.regions.len(), 2);
        assert!(descriptor.regions[0].content.contains("<!-- <template v-if=\"old\"> -->"));
        assert_eq!(descriptor.regions[0].end_line, 5);
        let script = descriptor.scripts().next().unwrap();
        assert_eq!(script.start_line, 6);
        assert_eq!(script.content, "\nexport default {};\n");
    }

    #[test]
    fn test_quoted_attribute_with_angle_brackets() {
        let source = "<script setup lang=\"ts\" generic=\"T extends Record<string, unknown>\">\nconst a = 1;\n</script>\n";
        let descriptor = ComponentDescriptor::parse(source).unwrap();
        let script = &descriptor.regions[0];

        assert_eq!(script.kind, RegionKind::ScriptSetup);
        assert_eq!(script.lang.as_deref(), Some("ts"));
        assert_eq!(script.content, "\nconst a = 1;\n");
        assert_eq!(script.start_line, 1);
    }

    #[test]
    fn test_metadata() {
        let metadata = ComponentDescriptor::parse(CARD).unwrap().metadata();
        assert_eq!(
            metadata,
            ComponentMetadata {
                has_template: true,
                has_script: true,
                has_script_setup: false,
                style_count: 2,
                custom_block_count: 1,
            }
        );
    }

    #[test]
    fn test_script_and_script_setup() {
        let source = "<script>\nexport default { name: 'A' };\n</script>\n<script setup lang=\"ts\">\nconst a = 1;\n</script>\n";
        let descriptor = ComponentDescriptor::parse(source).unwrap();
        let scripts: Vec<_> = descriptor.scripts().collect();

        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[1].kind, RegionKind::ScriptSetup);
        assert_eq!(scripts[1].start_line, 4);
        assert_eq!(scripts[1].lang.as_deref(), Some("ts"));
    }

    #[test]
    fn test_self_closing_block() {
        let descriptor = ComponentDescriptor::parse("<docs/>\n<script>\nlet a;\n</script>\n").unwrap();
        assert_eq!(descriptor.regions[0].kind, RegionKind::Custom("docs".to_string()));
        assert!(descriptor.regions[0].content.is_empty());
        assert_eq!(descriptor.regions[1].start_line, 2);
    }

    #[test]
    fn test_commented_block_ignored() {
        let source = "<!--\n<script>\nold();\n</script>\n-->\n<script>\nnow();\n</script>\n";
        let descriptor = ComponentDescriptor::parse(source).unwrap();
        assert_eq!(descriptor.regions.len(), 1);
        assert_eq!(descriptor.regions[0].start_line, 6);
    }

    #[test]
    fn test_close_tag_case_and_space() {
        let descriptor = ComponentDescriptor::parse("<script>\nlet a;\n</SCRIPT >\n").unwrap();
        assert_eq!(descriptor.regions[0].content, "\nlet a;\n");
    }

    #[test]
    fn test_unclosed_block() {
        let err = ComponentDescriptor::parse("<template>\n<div/>\n\n<script>\nlet a;\n").unwrap_err();
        assert_eq!(
            err,
            DescriptorError::Unclosed {
                tag: "template".to_string(),
                line: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_script() {
        let err = ComponentDescriptor::parse("<script>\n</script>\n<script>\n</script>\n").unwrap_err();
        assert_eq!(
            err,
            DescriptorError::Duplicate {
                tag: "script".to_string(),
                line: 3,
            }
        );
    }

    #[test]
    fn test_multiple_styles_allowed() {
        let descriptor =
            ComponentDescriptor::parse("<style>\n</style>\n<style>\n</style>\n<style>\n</style>\n").unwrap();
        assert_eq!(descriptor.metadata().style_count, 3);
    }

    #[test]
    fn test_line_of() {
        assert_eq!(line_of("a\nb\nc", 0), 1);
        assert_eq!(line_of("a\nb\nc", 2), 2);
        assert_eq!(line_of("a\nb\nc", 99), 3);
    }
}
