//! File kind detection from file extensions

use crate::paths::extension_of;
use tree_sitter::Language;

/// Grammar used for a script source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLang {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl ScriptLang {
    /// Map a file extension to a script grammar
    pub fn from_extension(extension: &str) -> Option<Self> {
        let lang = match extension.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => ScriptLang::JavaScript,
            "jsx" => ScriptLang::Jsx,
            "ts" | "mts" | "cts" => ScriptLang::TypeScript,
            "tsx" => ScriptLang::Tsx,
            _ => return None,
        };
        Some(lang)
    }

    /// Map a component `<script lang="...">` attribute. No attribute means
    /// plain JavaScript.
    pub fn from_lang_attr(lang: Option<&str>) -> Option<Self> {
        match lang.map(|l| l.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("js") | Some("javascript") => Some(ScriptLang::JavaScript),
            Some("jsx") => Some(ScriptLang::Jsx),
            Some("ts") | Some("typescript") => Some(ScriptLang::TypeScript),
            Some("tsx") => Some(ScriptLang::Tsx),
            Some(_) => None,
        }
    }

    pub fn tree_sitter_language(&self) -> Language {
        match self {
            // The JavaScript grammar covers JSX
            ScriptLang::JavaScript | ScriptLang::Jsx => tree_sitter_javascript::LANGUAGE.into(),
            ScriptLang::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            ScriptLang::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScriptLang::JavaScript => "JavaScript",
            ScriptLang::Jsx => "JavaScript (JSX)",
            ScriptLang::TypeScript => "TypeScript",
            ScriptLang::Tsx => "TypeScript (TSX)",
        }
    }
}

/// How a changed file is analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// One self-contained script text
    Script(ScriptLang),
    /// Single-file component with template/script/style regions
    Component,
    Unsupported,
}

/// Classify a path by extension only; contents are never sniffed
pub fn detect_file_kind(file_path: &str) -> FileKind {
    match extension_of(file_path).as_deref() {
        Some("vue") => FileKind::Component,
        Some(ext) => ScriptLang::from_extension(ext)
            .map(FileKind::Script)
            .unwrap_or(FileKind::Unsupported),
        None => FileKind::Unsupported,
    }
}
