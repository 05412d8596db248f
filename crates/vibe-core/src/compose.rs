// ABOUTME: Deterministic prompt assembly from persona, task, requirements, and local file context.
// ABOUTME: Also holds the offline enhancement used when the model cannot be reached.

use std::fs;
use std::path::Path;

use crate::model::{ComposedPrompt, EnhancedPrompt, FileSelection, PromptBuildRequest};
use crate::store::ConfigStore;
use crate::task::TaskType;

/// Default cap on the size of a single inlined file.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024;

/// The offline path only ever inlines this many stored requirements.
pub const FALLBACK_REQUIREMENT_LIMIT: usize = 5;

/// Builds context-enriched prompts. Holds the per-file size cap.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    max_file_size: u64,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl PromptComposer {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Build a prompt, loading requirements for the task type from `store`.
    ///
    /// A store that cannot be read is treated as having no requirements.
    pub fn build(&self, request: &PromptBuildRequest, store: &ConfigStore) -> ComposedPrompt {
        let requirements = if request.include_requirements {
            store
                .requirements_for(&request.task_type)
                .unwrap_or_else(|e| {
                    tracing::warn!("could not load non-functional requirements: {}", e);
                    Vec::new()
                })
        } else {
            Vec::new()
        };

        self.compose(request, &requirements)
    }

    /// Assemble the final prompt from an already-resolved requirement list.
    pub fn compose(&self, request: &PromptBuildRequest, requirements: &[String]) -> ComposedPrompt {
        let context_text = if request.include_context && !request.selected_files.is_empty() {
            self.collect_file_context(&request.selected_files)
        } else {
            String::new()
        };

        let mut sections: Vec<String> = Vec::new();

        if let Some(task) = TaskType::parse(&request.task_type) {
            sections.push(task.persona().to_string());
        }

        sections.push(format!("Task: {}", request.prompt));

        if !requirements.is_empty() {
            sections.push(format_requirements(&request.task_type, requirements));
        }

        if !context_text.is_empty() {
            sections.push(format!("Context from selected files:\n{}", context_text));
        }

        ComposedPrompt {
            final_prompt: sections.join("\n\n"),
            context_included: request.include_context && !context_text.is_empty(),
            requirements_included: request.include_requirements && !requirements.is_empty(),
            files_processed: if request.include_context {
                request.selected_files.len()
            } else {
                0
            },
            requirements_applied: requirements.len(),
        }
    }

    /// Read each selected file from local disk and label it.
    /// Missing, oversized, or unreadable files are skipped.
    pub fn collect_file_context(&self, files: &[FileSelection]) -> String {
        files
            .iter()
            .filter_map(|file| {
                let content = self.read_capped(Path::new(&file.path))?;
                Some(format!("File: {}\n{}\n", file.path, content))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn read_capped(&self, path: &Path) -> Option<String> {
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() || metadata.len() > self.max_file_size {
            tracing::debug!(path = %path.display(), size = metadata.len(), "skipping file");
            return None;
        }
        let bytes = fs::read(path).ok()?;
        Some(decode_utf8_skipping_invalid(&bytes))
    }
}

/// Decode UTF-8, dropping invalid byte sequences instead of substituting them.
fn decode_utf8_skipping_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Render a requirement list as a titled bullet block.
pub fn format_requirements(task_type: &str, requirements: &[String]) -> String {
    let bullets: Vec<String> = requirements.iter().map(|r| format!("- {}", r)).collect();
    format!(
        "Non-functional requirements for {}:\n{}",
        task_type,
        bullets.join("\n")
    )
}

/// One-line note telling the model how many files the user selected.
pub fn selected_files_note(count: usize) -> String {
    format!(
        "Context: This request relates to {} selected file(s). Please consider the file structure and content when providing your response.",
        count
    )
}

/// Offline enhancement: original prompt plus task guidance and the first
/// few stored requirements, unfiltered.
pub fn fallback_enhance(prompt: &str, task_type: &str, requirements: &[String]) -> EnhancedPrompt {
    let mut enhanced = prompt.to_string();

    let guidance = TaskType::parse(task_type)
        .map(|t| t.fallback_guidance())
        .unwrap_or_default();
    if !guidance.is_empty() {
        let bullets: Vec<String> = guidance.iter().map(|g| format!("- {}", g)).collect();
        enhanced.push_str("\n\nAdditional considerations:\n");
        enhanced.push_str(&bullets.join("\n"));
    }

    let applied = &requirements[..requirements.len().min(FALLBACK_REQUIREMENT_LIMIT)];
    if !applied.is_empty() {
        enhanced.push_str("\n\n");
        enhanced.push_str(&format_requirements(task_type, applied));
    }

    EnhancedPrompt {
        enhanced_prompt: enhanced,
        original_prompt: prompt.to_string(),
        task_type: task_type.to_string(),
        requirements_applied: applied.len(),
        ai_enhanced: false,
        fallback_used: true,
    }
}
