// ABOUTME: Model-backed prompt operations: enhancement, requirement filtering, classification, chat.
// ABOUTME: enhance() absorbs every model failure and returns the deterministic fallback instead.

use vibe_core::{
    EnhanceRequest, EnhancedPrompt, FileSelection, TaskType, fallback_enhance,
    format_requirements, selected_files_note,
};

use crate::credentials::AwsSettings;
use crate::runtime::{InvokeRequest, ModelClient, ModelClientFactory, ModelError};

/// Chat lists at most this many selected files in its system prompt.
pub const CHAT_FILE_LIMIT: usize = 5;

const ENHANCE_SYSTEM_PROMPT: &str = "You are a prompt engineer for AI coding assistants. \
Rewrite the user's request into a detailed, actionable specification that a coding assistant \
can execute well. Keep the user's intent. Add the technical context, constraints, expected \
deliverables, and quality criteria the request implies. Use clear sections. \
Consider performance, security, maintainability, and scalability where relevant. \
For development tasks stress architecture and testing strategy; for refactoring stress \
structure, migration, and performance; for testing stress coverage, edge cases, and CI. \
Return only the enhanced prompt.";

const CLASSIFY_SYSTEM_PROMPT: &str = "Classify the coding request into exactly one task type:\n\
- development: building new features, applications, or components\n\
- refactoring: improving the structure, performance, or maintainability of existing code\n\
- testing: writing tests, debugging, or troubleshooting\n\
Answer with the task type name only.";

/// Ask the model to rewrite `prompt` as a fuller specification.
pub async fn enhance_prompt(
    client: &dyn ModelClient,
    prompt: &str,
    task_type: &str,
) -> Result<String, ModelError> {
    let request = InvokeRequest::new(format!(
        "TASK TYPE: {}\n\nORIGINAL USER PROMPT:\n{}\n\n\
         Rewrite this as a detailed, specific specification while preserving the original intent.",
        task_type, prompt
    ))
    .with_system(ENHANCE_SYSTEM_PROMPT)
    .with_max_tokens(3000)
    .with_temperature(0.3);

    Ok(client.invoke(&request).await?.trim().to_string())
}

/// Ask the model which stored requirements apply to `prompt`.
///
/// A failed call is an error. Output that is not a JSON array of strings
/// yields the full input list unchanged.
pub async fn extract_relevant_requirements(
    client: &dyn ModelClient,
    prompt: &str,
    requirements: &[String],
    task_type: &str,
) -> Result<Vec<String>, ModelError> {
    let system = format!(
        "You select which non-functional requirements for {} tasks apply to a coding prompt. \
         Only include requirements that are directly relevant. \
         Respond with a JSON array of the selected requirement strings, for example \
         [\"requirement 1\", \"requirement 2\"].",
        task_type
    );
    let listed: Vec<String> = requirements.iter().map(|r| format!("- {}", r)).collect();
    let request = InvokeRequest::new(format!(
        "Task Type: {}\n\nUser Prompt:\n{}\n\nAvailable Requirements:\n{}\n\n\
         Which requirements are relevant to this specific prompt?",
        task_type,
        prompt,
        listed.join("\n")
    ))
    .with_system(system)
    .with_max_tokens(1000)
    .with_temperature(0.2);

    let output = client.invoke(&request).await?;

    match serde_json::from_str::<Vec<String>>(output.trim()) {
        Ok(selected) => Ok(selected),
        Err(e) => {
            tracing::warn!("requirement filter output was not a JSON array: {}", e);
            Ok(requirements.to_vec())
        }
    }
}

/// Classify a prompt. Anything other than a recognized label, including a
/// failed call, becomes `development`.
pub async fn analyze_task_type(client: &dyn ModelClient, prompt: &str) -> TaskType {
    let request = InvokeRequest::new(format!(
        "Prompt to analyze:\n{}\n\nWhat task type is this?",
        prompt
    ))
    .with_system(CLASSIFY_SYSTEM_PROMPT)
    .with_max_tokens(50)
    .with_temperature(0.1);

    match client.invoke(&request).await {
        Ok(label) => {
            let label = label.trim().to_lowercase();
            TaskType::CLASSIFIABLE
                .into_iter()
                .find(|t| t.as_str() == label)
                .unwrap_or(TaskType::Development)
        }
        Err(e) => {
            tracing::error!("task type analysis failed: {}", e);
            TaskType::Development
        }
    }
}

/// Model-backed enhancement. Any error aborts the whole path.
pub async fn ai_enhance(
    client: &dyn ModelClient,
    request: &EnhanceRequest,
    requirements: &[String],
) -> Result<EnhancedPrompt, ModelError> {
    let mut enhanced = enhance_prompt(client, &request.prompt, &request.task_type).await?;

    let relevant = if requirements.is_empty() {
        Vec::new()
    } else {
        extract_relevant_requirements(client, &request.prompt, requirements, &request.task_type)
            .await?
    };

    if !relevant.is_empty() {
        enhanced.push_str("\n\n");
        enhanced.push_str(&format_requirements(&request.task_type, &relevant));
    }

    if !request.selected_files.is_empty() {
        enhanced.push_str("\n\n");
        enhanced.push_str(&selected_files_note(request.selected_files.len()));
    }

    Ok(EnhancedPrompt {
        enhanced_prompt: enhanced,
        original_prompt: request.prompt.clone(),
        task_type: request.task_type.clone(),
        requirements_applied: relevant.len(),
        ai_enhanced: true,
        fallback_used: false,
    })
}

/// Enhance a prompt with the model, or fall back to the offline path when
/// the client cannot be built or any model call fails. Never errors.
pub async fn enhance(
    factory: &dyn ModelClientFactory,
    settings: &AwsSettings,
    request: &EnhanceRequest,
    requirements: &[String],
) -> EnhancedPrompt {
    let attempt = match factory.connect(settings) {
        Ok(client) => ai_enhance(client.as_ref(), request, requirements).await,
        Err(e) => Err(e),
    };

    attempt.unwrap_or_else(|e| {
        tracing::warn!("model enhancement failed, using fallback: {}", e);
        fallback_enhance(&request.prompt, &request.task_type, requirements)
    })
}

/// Build the request for a chat turn about the prompt being edited.
pub fn chat_request(message: &str, current_prompt: &str, files: &[FileSelection]) -> InvokeRequest {
    let mut file_context = String::new();
    if !files.is_empty() {
        file_context.push_str("Selected files context:\n");
        for file in files.iter().take(CHAT_FILE_LIMIT) {
            file_context.push_str(&format!("- {} ({})\n", file.path, file.file_type));
        }
    }

    let system = format!(
        "You are an AI assistant helping with prompt engineering and code analysis.\n\n\
         Current prompt being worked on:\n{}\n\n{}\n\
         Please provide helpful, concise responses to assist with prompt improvement and code understanding.",
        current_prompt, file_context
    );

    InvokeRequest::new(message)
        .with_system(system)
        .with_max_tokens(1000)
}

/// One chat turn.
pub async fn chat(
    client: &dyn ModelClient,
    message: &str,
    current_prompt: &str,
    files: &[FileSelection],
) -> Result<String, ModelError> {
    client
        .invoke(&chat_request(message, current_prompt, files))
        .await
}

/// Minimal round-trip proving credentials and model id are usable.
pub async fn test_connection(client: &dyn ModelClient) -> Result<(), ModelError> {
    client
        .invoke(&InvokeRequest::new("Hello").with_max_tokens(10))
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubModelClient, StubModelFactory};

    fn reqs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn enhance_request(prompt: &str, task_type: &str, files: usize) -> EnhanceRequest {
        EnhanceRequest {
            prompt: prompt.to_string(),
            task_type: task_type.to_string(),
            selected_files: (0..files)
                .map(|i| FileSelection::new(format!("src/f{}.rs", i), "file"))
                .collect(),
        }
    }

    #[tokio::test]
    async fn extraction_returns_parsed_subset() {
        let client = StubModelClient::new(r#"["must be fast"]"#);
        let all = reqs(&["must be fast", "must be secure"]);

        let selected = extract_relevant_requirements(&client, "cache it", &all, "development")
            .await
            .unwrap();
        assert_eq!(selected, reqs(&["must be fast"]));

        let sent = client.requests();
        assert!((sent[0].temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(sent[0].max_tokens, 1000);
        assert!(sent[0].prompt.contains("- must be secure"));
    }

    #[tokio::test]
    async fn extraction_returns_input_when_output_is_not_json() {
        let client = StubModelClient::new("Both requirements apply.");
        let all = reqs(&["a", "b"]);

        let selected = extract_relevant_requirements(&client, "p", &all, "testing")
            .await
            .unwrap();
        assert_eq!(selected, all);
    }

    #[tokio::test]
    async fn extraction_returns_input_when_output_is_not_an_array() {
        let client = StubModelClient::new(r#"{"requirements": ["a"]}"#);
        let all = reqs(&["a", "b"]);

        let selected = extract_relevant_requirements(&client, "p", &all, "testing")
            .await
            .unwrap();
        assert_eq!(selected, all);
    }

    #[tokio::test]
    async fn extraction_propagates_call_failures() {
        let client = StubModelClient::failing("throttled");
        let result = extract_relevant_requirements(&client, "p", &reqs(&["a"]), "testing").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn classification_accepts_known_labels() {
        let client = StubModelClient::new("  Refactoring\n");
        assert_eq!(analyze_task_type(&client, "tidy this").await, TaskType::Refactoring);

        let sent = client.requests();
        assert_eq!(sent[0].max_tokens, 50);
    }

    #[tokio::test]
    async fn classification_coerces_unknown_labels_and_failures() {
        let client = StubModelClient::new("documentation");
        assert_eq!(analyze_task_type(&client, "x").await, TaskType::Development);

        let client = StubModelClient::failing("down");
        assert_eq!(analyze_task_type(&client, "x").await, TaskType::Development);
    }

    #[tokio::test]
    async fn ai_path_appends_filtered_requirements_and_file_note() {
        let client = StubModelClient::sequence(vec![
            Ok("  Enhanced spec  ".to_string()),
            Ok(r#"["r2"]"#.to_string()),
        ]);
        let result = ai_enhance(
            &client,
            &enhance_request("add caching", "development", 2),
            &reqs(&["r1", "r2"]),
        )
        .await
        .unwrap();

        assert_eq!(
            result.enhanced_prompt,
            format!(
                "Enhanced spec\n\nNon-functional requirements for development:\n- r2\n\n{}",
                selected_files_note(2)
            )
        );
        assert!(result.ai_enhanced);
        assert!(!result.fallback_used);
        assert_eq!(result.requirements_applied, 1);

        let sent = client.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].max_tokens, 3000);
        assert!((sent[0].temperature - 0.3).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn ai_path_skips_filter_without_requirements() {
        let client = StubModelClient::new("Better prompt");
        let result = ai_enhance(&client, &enhance_request("x", "review", 0), &[])
            .await
            .unwrap();

        assert_eq!(result.enhanced_prompt, "Better prompt");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn enhance_falls_back_without_credentials() {
        let factory = StubModelFactory::unavailable();
        let all = reqs(&["r1", "r2", "r3", "r4", "r5", "r6"]);

        let result = enhance(
            &factory,
            &AwsSettings::default(),
            &enhance_request("add tests", "testing", 0),
            &all,
        )
        .await;

        assert!(!result.ai_enhanced);
        assert!(result.fallback_used);
        assert!(result.requirements_applied <= 5);
        assert_eq!(result.requirements_applied, 5);
        assert!(result.enhanced_prompt.starts_with("add tests\n\nAdditional considerations:"));
    }

    #[tokio::test]
    async fn enhance_falls_back_when_second_call_fails() {
        let client = StubModelClient::sequence(vec![
            Ok("Enhanced".to_string()),
            Err(ModelError::Provider {
                code: Some("ThrottlingException".to_string()),
                message: "slow down".to_string(),
            }),
        ]);
        let factory = StubModelFactory::with_client(client);

        let result = enhance(
            &factory,
            &AwsSettings::default(),
            &enhance_request("p", "review", 1),
            &reqs(&["a"]),
        )
        .await;

        assert!(result.fallback_used);
        assert_eq!(result.enhanced_prompt, "p\n\nNon-functional requirements for review:\n- a");
    }

    #[test]
    fn chat_request_lists_at_most_five_files() {
        let files: Vec<FileSelection> = (0..7)
            .map(|i| FileSelection::new(format!("f{}.rs", i), "file"))
            .collect();
        let request = chat_request("why?", "current", &files);
        let system = request.system.unwrap();

        assert!(system.contains("Current prompt being worked on:\ncurrent"));
        assert!(system.contains("- f4.rs (file)"));
        assert!(!system.contains("f5.rs"));
        assert_eq!(request.max_tokens, 1000);
        assert_eq!(request.prompt, "why?");
    }

    #[tokio::test]
    async fn connection_test_uses_tiny_request() {
        let client = StubModelClient::new("Hi");
        test_connection(&client).await.unwrap();
        assert_eq!(client.requests()[0].max_tokens, 10);
    }
}
