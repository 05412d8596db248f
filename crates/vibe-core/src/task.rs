// ABOUTME: Recognized task types with their persona sentences and fallback guidance bullets.
// ABOUTME: Task types arrive as free text; anything unrecognized simply contributes nothing.

use serde::{Deserialize, Serialize};

/// The task categories the prompt builder knows how to frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Development,
    Refactoring,
    Testing,
    Documentation,
    Review,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Development,
        TaskType::Refactoring,
        TaskType::Testing,
        TaskType::Documentation,
        TaskType::Review,
    ];

    /// Labels the task classifier is allowed to return.
    pub const CLASSIFIABLE: [TaskType; 3] = [
        TaskType::Development,
        TaskType::Refactoring,
        TaskType::Testing,
    ];

    /// Parse a task type name. Matching is exact and lowercase.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Development => "development",
            TaskType::Refactoring => "refactoring",
            TaskType::Testing => "testing",
            TaskType::Documentation => "documentation",
            TaskType::Review => "review",
        }
    }

    /// Persona sentence that opens a composed prompt.
    pub fn persona(&self) -> &'static str {
        match self {
            TaskType::Development => {
                "You are a senior software developer. Focus on writing clean, maintainable, and efficient code."
            }
            TaskType::Refactoring => {
                "You are a code refactoring expert. Focus on improving code structure, readability, and performance."
            }
            TaskType::Testing => {
                "You are a testing specialist. Focus on comprehensive test coverage and quality assurance."
            }
            TaskType::Documentation => {
                "You are a technical writer. Focus on clear, comprehensive documentation."
            }
            TaskType::Review => {
                "You are a code reviewer. Focus on identifying issues, improvements, and best practices."
            }
        }
    }

    /// Guidance bullets appended by the offline enhancement path.
    /// Only development, refactoring and testing carry any.
    pub fn fallback_guidance(&self) -> &'static [&'static str] {
        match self {
            TaskType::Development => &[
                "Consider error handling and edge cases",
                "Follow coding best practices and design patterns",
                "Include appropriate comments and documentation",
                "Consider performance and scalability",
            ],
            TaskType::Refactoring => &[
                "Identify code smells and anti-patterns",
                "Improve code organization and modularity",
                "Enhance readability and maintainability",
                "Optimize performance where possible",
            ],
            TaskType::Testing => &[
                "Create comprehensive test cases including edge cases",
                "Follow testing best practices (AAA pattern, etc.)",
                "Include both unit and integration tests",
                "Consider test coverage and quality metrics",
            ],
            TaskType::Documentation | TaskType::Review => &[],
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
