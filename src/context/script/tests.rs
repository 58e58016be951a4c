use super::*;
use crate::context::truncate::char_limit_marker;
use crate::types::{TruncationReason, UnitKind};

fn config() -> AnalysisConfig {
    AnalysisConfig::default()
}

fn added(lines: &[usize]) -> AddedLines {
    lines.iter().copied().collect()
}

/// A class on lines 1-30 holding a method on lines 8-20
fn service_class() -> String {
    let mut lines = vec!["class Service {".to_string()];
    for i in 2..=7 {
        lines.push(format!("  field{} = {};", i, i));
    }
    lines.push("  handle(req) {".to_string());
    for i in 9..=19 {
        lines.push(format!("    const v{} = req.a + {};", i, i));
    }
    lines.push("  }".to_string());
    for _ in 21..=29 {
        lines.push("  // filler".to_string());
    }
    lines.push("}".to_string());
    lines.join("\n") + "\n"
}

#[tokio::test]
async fn test_method_preferred_over_class() {
    let config = config();
    let source = service_class();
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(&source, &added(&[11, 12]))
        .await;

    assert!(outcome.issues.is_empty(), "{:?}", outcome.issues);
    assert_eq!(outcome.sections.len(), 1);
    let section = &outcome.sections[0];
    assert_eq!(section.kind, UnitKind::ClassMethod);
    assert_eq!(section.name, "handle");
    assert_eq!((section.start_line, section.end_line), (8, 20));
    assert_eq!(section.added_lines, vec![11, 12]);
    assert!(section.snippet.starts_with("handle(req) {"));
    assert!(!section.truncated);
}

#[tokio::test]
async fn test_class_kept_for_field_change() {
    let config = config();
    let source = service_class();
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(&source, &added(&[3, 12]))
        .await;

    let names: Vec<_> = outcome.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Service", "handle"]);
    assert_eq!(outcome.sections[0].added_lines, vec![3]);
}

#[tokio::test]
async fn test_no_enclosing_unit() {
    let config = config();
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract("const a = 1;\nconst b = 2;\n", &added(&[2]))
        .await;

    assert!(outcome.sections.is_empty());
    assert!(outcome.issues.is_empty());
}

#[tokio::test]
async fn test_empty_added_lines() {
    let config = config();
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract("function f() {}\n", &AddedLines::new())
        .await;

    assert!(outcome.sections.is_empty());
    assert!(outcome.issues.is_empty());
}

#[tokio::test]
async fn test_extraction_is_idempotent() {
    let config = config();
    let source = service_class();
    let extractor = ScriptExtractor::new(&config, ScriptLang::JavaScript);
    let lines = added(&[3, 11, 25]);

    let first = extractor.extract(&source, &lines).await;
    let second = extractor.extract(&source, &lines).await;
    assert_eq!(first.sections, second.sections);
}

#[tokio::test]
async fn test_arrow_named_by_variable() {
    let config = config();
    let source = "import x from 'x';\n\nexport const total = (items) => {\n  return items.reduce((a, b) => a + b, 0);\n};\n";
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(source, &added(&[4]))
        .await;

    // The reducer callback is the tightest unit
    assert_eq!(outcome.sections.len(), 1);
    assert_eq!(outcome.sections[0].name, "<anonymous>");
    assert_eq!(outcome.sections[0].kind, UnitKind::ArrowFunction);
    assert_eq!(outcome.sections[0].component_option, None);

    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(source, &added(&[3, 4]))
        .await;
    let names: Vec<_> = outcome.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["total", "<anonymous>"]);
}

#[tokio::test]
async fn test_char_limit_truncation() {
    let config = AnalysisConfig {
        max_snippet_chars: 40,
        ..config()
    };
    let source = "function long() {\n  const message = 'aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa';\n  return message;\n}\n";
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(source, &added(&[2]))
        .await;

    let section = &outcome.sections[0];
    let raw_len = source.trim_end().chars().count();
    assert_eq!(section.truncation_reason, TruncationReason::CharLimit);
    assert!(section.truncated);
    assert_eq!(
        section.snippet.chars().count(),
        40 + char_limit_marker(raw_len).chars().count()
    );
}

#[tokio::test]
async fn test_line_limit_windowing() {
    let config = AnalysisConfig {
        max_block_lines: 20,
        window_radius: 2,
        ..config()
    };
    let mut lines = vec!["function big() {".to_string()];
    for i in 2..60 {
        lines.push(format!("  step({});", i));
    }
    lines.push("}".to_string());
    let source = lines.join("\n");

    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(&source, &added(&[30]))
        .await;

    let section = &outcome.sections[0];
    assert_eq!(section.truncation_reason, TruncationReason::LineLimit);
    assert_eq!((section.start_line, section.end_line), (1, 60));
    assert!(section.snippet.contains("+   30 |   step(30);"));
    assert!(section.snippet.contains("    28 |   step(28);"));
    assert!(!section.snippet.contains("step(27)"));
    assert!(section.summary.as_deref().unwrap().starts_with("60 lines"));
}

#[tokio::test]
async fn test_windowed_arrow_shows_whole_declaration_line() {
    let config = AnalysisConfig {
        max_block_lines: 10,
        window_radius: 1,
        ..config()
    };
    let mut lines = vec!["export const total = (items) => {".to_string()];
    for i in 2..30 {
        lines.push(format!("  step({});", i));
    }
    lines.push("};".to_string());
    let source = lines.join("\n") + "\n";

    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(&source, &added(&[2]))
        .await;

    let section = &outcome.sections[0];
    assert_eq!(section.name, "total");
    assert_eq!(section.truncation_reason, TruncationReason::LineLimit);
    assert_eq!(
        section.snippet,
        "     1 | export const total = (items) => {\n+    2 |   step(2);\n     3 |   step(3);"
    );
}

#[tokio::test]
async fn test_window_labels_use_first_line() {
    let config = AnalysisConfig {
        max_block_lines: 3,
        window_radius: 0,
        ..config()
    };
    let source = "function f() {\n  a();\n  b();\n  c();\n}\n";
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .with_first_line(10)
        .extract(source, &added(&[3]))
        .await;

    let section = &outcome.sections[0];
    // Line numbers stay text-relative; only the window labels move
    assert_eq!(section.start_line, 1);
    assert_eq!(section.snippet, "+   12 |   b();");
}

#[tokio::test]
async fn test_depth_exceeded_keeps_partial_candidates() {
    let config = AnalysisConfig {
        max_depth: 3,
        ..config()
    };
    let source = "function outer() {\n  return () => {\n    return () => {\n      return 1;\n    };\n  };\n}\n";
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(source, &added(&[4]))
        .await;

    assert_eq!(outcome.issues, vec![ExtractError::DepthExceeded { max_depth: 3 }]);
    assert_eq!(outcome.sections.len(), 1);
    assert_eq!(outcome.sections[0].name, "outer");

    let deep = ScriptExtractor::new(&AnalysisConfig::default(), ScriptLang::JavaScript)
        .extract(source, &added(&[4]))
        .await;
    assert!(deep.issues.is_empty());
    assert_eq!((deep.sections[0].start_line, deep.sections[0].end_line), (3, 5));
}

#[tokio::test]
async fn test_recovered_syntax_errors_warn() {
    let config = config();
    let source = "function ok() {\n  return 1;\n}\n\nconst broken = (;\n";
    let outcome = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(source, &added(&[2]))
        .await;

    assert!(outcome.issues.iter().all(|i| i.is_warning()));
    assert!(
        outcome
            .issues
            .iter()
            .any(|i| matches!(i, ExtractError::SyntaxRecovered(_)))
    );
    assert_eq!(outcome.sections[0].name, "ok");
}

#[tokio::test]
async fn test_component_option_naming() {
    let config = config();
    let source = "export default {\n  methods: {\n    save() {\n      this.dirty = false;\n    },\n  },\n};\n";

    let named = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .with_naming(NamingContext::ComponentOptions)
        .extract(source, &added(&[4]))
        .await;
    assert_eq!(named.sections[0].kind, UnitKind::ObjectMethod);
    assert_eq!(named.sections[0].name, "save");
    assert_eq!(named.sections[0].component_option.as_deref(), Some("methods"));

    let plain = ScriptExtractor::new(&config, ScriptLang::JavaScript)
        .extract(source, &added(&[4]))
        .await;
    assert_eq!(plain.sections[0].component_option, None);
}

#[tokio::test]
async fn test_typescript_source() {
    let config = config();
    let source = "export class Cache<K, V> {\n  private items = new Map<K, V>();\n\n  get(key: K): V | undefined {\n    return this.items.get(key);\n  }\n}\n";
    let outcome = ScriptExtractor::new(&config, ScriptLang::TypeScript)
        .extract(source, &added(&[5]))
        .await;

    assert!(outcome.issues.is_empty(), "{:?}", outcome.issues);
    assert_eq!(outcome.sections[0].name, "get");
    assert_eq!(outcome.sections[0].kind, UnitKind::ClassMethod);
}
