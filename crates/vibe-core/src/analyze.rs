// ABOUTME: Local repository statistics: file counts, total size, extensions, and languages.
// ABOUTME: Walks a directory tree and skips anything it cannot stat.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use walkdir::WalkDir;

/// Aggregate statistics for a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryAnalysis {
    pub total_files: u64,
    pub total_size: u64,
    pub file_types: BTreeMap<String, u64>,
    pub languages: BTreeMap<String, u64>,
    /// Reserved for a directory outline; currently always empty.
    pub structure: Map<String, Value>,
}

/// Map a lowercased extension (with leading dot) to a language label.
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    let language = match ext {
        ".py" => "Python",
        ".js" => "JavaScript",
        ".jsx" => "React",
        ".ts" => "TypeScript",
        ".tsx" => "React TypeScript",
        ".java" => "Java",
        ".cpp" => "C++",
        ".c" => "C",
        ".html" => "HTML",
        ".css" => "CSS",
        ".json" => "JSON",
        ".rs" => "Rust",
        ".go" => "Go",
        _ => return None,
    };
    Some(language)
}

/// Walk `root` recursively and count every regular file.
pub fn analyze_repository(root: &Path) -> RepositoryAnalysis {
    let mut analysis = RepositoryAnalysis::default();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        analysis.total_files += 1;
        analysis.total_size += metadata.len();

        let Some(ext) = entry
            .path()
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        else {
            continue;
        };

        if let Some(language) = language_for_extension(&ext) {
            *analysis.languages.entry(language.to_string()).or_insert(0) += 1;
        }
        *analysis.file_types.entry(ext).or_insert(0) += 1;
    }

    analysis
}
