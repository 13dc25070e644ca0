use crate::core::{ConfigProvider, Generator, ProjectRequest};
use crate::utils::error::{Result, SdlcError};
use reqwest::Client;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are an expert software project manager and SDLC \
consultant with deep knowledge of software development methodologies, project \
planning, and time estimation. You provide detailed, structured, and practical \
SDLC breakdowns.";

/// Canned generator reply used by the `demo` subcommand; shaped like a real
/// backend response with the JSON wrapped in a tagged fence.
pub const SAMPLE_RESPONSE: &str = r#"Here is the requested breakdown:

```json
{
    "project_summary": {
        "name": "Task Management App",
        "total_duration_weeks": 12,
        "methodology": "Agile",
        "complexity_assessment": "Medium"
    },
    "phases": [
        {
            "name": "Sprint 0: Planning & Setup",
            "duration_weeks": 2,
            "description": "Backlog creation, team setup, and architecture spikes",
            "deliverables": ["Product backlog", "Architecture outline"],
            "activities": ["Story mapping", "Tool setup"],
            "team_focus": "Whole team"
        },
        {
            "name": "Development Sprints",
            "duration_weeks": 7,
            "description": "Iterative feature development with sprint reviews",
            "deliverables": ["Working increments", "Sprint reports"],
            "activities": ["Coding", "Daily standups", "Retrospectives"],
            "team_focus": "Development team"
        },
        {
            "name": "Hardening & Testing",
            "duration_weeks": 2,
            "description": "Integration testing, bug fixing, and performance checks",
            "deliverables": ["Test reports", "Release candidate"],
            "activities": ["Test execution", "Bug fixing"],
            "team_focus": "QA and development"
        },
        {
            "name": "Release & Handover",
            "duration_weeks": 1,
            "description": "Production deployment and user onboarding",
            "deliverables": ["Production release", "User guide"],
            "activities": ["Deployment", "Training"],
            "team_focus": "DevOps and support"
        }
    ],
    "recommendations": [
        "Keep sprint scope small for the first two sprints",
        "Automate the deployment pipeline early"
    ]
}
```"#;

/// Text-generation backend client. Posts a prompt to the configured
/// endpoint and extracts the generated text from the reply.
pub struct HttpGenerator<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> HttpGenerator<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

impl<C: ConfigProvider> Generator for HttpGenerator<C> {
    fn is_configured(&self) -> bool {
        !self.config.api_key().is_empty() && self.config.api_key() != "YOUR_API_KEY"
    }

    async fn generate(&self, request: &ProjectRequest) -> Result<String> {
        if !self.is_configured() {
            return Err(SdlcError::ConfigError {
                message: "Generator not configured; set SDLC_API_KEY and SDLC_API_ENDPOINT"
                    .to_string(),
            });
        }

        let prompt = format!("{}\n\n{}", SYSTEM_PROMPT, build_prompt(request));
        let body = serde_json::json!({
            "model_id": self.config.model_id(),
            "input": prompt,
            "parameters": {
                "decoding_method": "greedy",
                "max_new_tokens": 2000,
                "temperature": 0.3,
                "top_p": 0.9
            }
        });

        tracing::debug!("POST {} (model {})", self.config.api_endpoint(), self.config.model_id());
        let response = self
            .client
            .post(self.config.api_endpoint())
            .bearer_auth(self.config.api_key())
            .timeout(Duration::from_secs(self.config.timeout_secs()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdlcError::GeneratorError {
                message: format!("Generator endpoint returned status {}", status),
            });
        }

        let reply: serde_json::Value = response.json().await?;
        reply["results"][0]["generated_text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| SdlcError::GeneratorError {
                message: "Reply is missing results[0].generated_text".to_string(),
            })
    }
}

/// No-network generator for `--offline` runs. Returns an empty reply,
/// which the normalizer turns into the default template.
pub struct OfflineGenerator;

impl Generator for OfflineGenerator {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, _request: &ProjectRequest) -> Result<String> {
        Ok(String::new())
    }
}

fn build_prompt(request: &ProjectRequest) -> String {
    format!(
        r#"As an expert software project manager, analyze the following project and create a detailed Software Development Lifecycle (SDLC) breakdown:

PROJECT DETAILS:
- Project Name: {name}
- Description: {description}
- Total Duration: {duration} weeks
- Team Size: {team_size}
- Project Type: {project_type}
- Methodology: {methodology}

REQUIREMENTS:
1. Break down the project into appropriate SDLC phases based on the methodology
2. Allocate time (in weeks and percentages) for each phase
3. Ensure the total time equals exactly {duration} weeks
4. Consider the project complexity, team size, and project type
5. Provide realistic time distributions based on industry best practices

RESPONSE FORMAT (JSON):
{{
    "project_summary": {{
        "name": "{name}",
        "total_duration_weeks": {duration},
        "methodology": "{methodology}",
        "complexity_assessment": "High/Medium/Low based on description"
    }},
    "phases": [
        {{
            "name": "Phase Name",
            "duration_weeks": number,
            "percentage": percentage_of_total,
            "description": "Detailed description of what happens in this phase",
            "deliverables": ["List", "of", "key", "deliverables"],
            "activities": ["Main", "activities", "and", "tasks"],
            "team_focus": "Primary team focus area"
        }}
    ],
    "recommendations": [
        "Key recommendation 1",
        "Key recommendation 2"
    ]
}}

GUIDELINES:
- For Agile: Include Sprint Planning, Development Sprints, Testing, Deployment phases
- For Waterfall: Include Requirements, Design, Implementation, Testing, Deployment, Maintenance
- For Hybrid: Combine elements appropriately
- Consider project type complexity (Web apps need more frontend work, APIs need more backend focus)
- Adjust phase durations based on team size (larger teams may need more coordination time)
- Include buffer time for complex projects
- Make recommendations specific to the project context

Please provide ONLY the JSON response, no additional text or formatting."#,
        name = request.name,
        description = request.description,
        duration = request.duration_weeks,
        team_size = request.team_size,
        project_type = request.project_type,
        methodology = request.methodology,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::domain::model::Methodology;
    use httpmock::prelude::*;

    fn request() -> ProjectRequest {
        ProjectRequest {
            name: "Task Manager".to_string(),
            description: "Web-based task tracking".to_string(),
            duration_weeks: 10,
            team_size: "4-10 (Medium)".to_string(),
            project_type: "Web Application".to_string(),
            methodology: Methodology::Agile,
        }
    }

    fn config(endpoint: String, key: &str) -> BackendConfig {
        BackendConfig {
            api_endpoint: endpoint,
            api_key: key.to_string(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn placeholder_key_counts_as_unconfigured() {
        let generator = HttpGenerator::new(config("http://localhost".to_string(), "YOUR_API_KEY"));
        assert!(!generator.is_configured());
        let generator = HttpGenerator::new(config("http://localhost".to_string(), ""));
        assert!(!generator.is_configured());
    }

    #[test]
    fn prompt_carries_every_request_field() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("Project Name: Task Manager"));
        assert!(prompt.contains("Total Duration: 10 weeks"));
        assert!(prompt.contains("equals exactly 10 weeks"));
        assert!(prompt.contains("Methodology: Agile"));
        assert!(prompt.contains("Team Size: 4-10 (Medium)"));
    }

    #[tokio::test]
    async fn generate_extracts_generated_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/generation");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [{"generated_text": "the breakdown text"}]
                }));
        });

        let generator = HttpGenerator::new(config(server.url("/generation"), "test-key"));
        let text = generator.generate(&request()).await.unwrap();
        assert_eq!(text, "the breakdown text");
        mock.assert();
    }

    #[tokio::test]
    async fn generate_reports_non_success_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/generation");
            then.status(503);
        });

        let generator = HttpGenerator::new(config(server.url("/generation"), "test-key"));
        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, SdlcError::GeneratorError { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn generate_reports_missing_text_field() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/generation");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"results": []}));
        });

        let generator = HttpGenerator::new(config(server.url("/generation"), "test-key"));
        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, SdlcError::GeneratorError { .. }));
    }

    #[tokio::test]
    async fn unconfigured_generator_fails_before_any_request() {
        let generator = HttpGenerator::new(config("http://localhost:9".to_string(), ""));
        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, SdlcError::ConfigError { .. }));
    }

    #[tokio::test]
    async fn offline_generator_returns_empty_reply() {
        let text = OfflineGenerator.generate(&request()).await.unwrap();
        assert!(text.is_empty());
    }
}
