use anyhow::Result;
use dbapp_core::api::WorkspaceApi;
use dbapp_core::error::classify;
use dbapp_core::models::{ChatMessage, ChatRequest, ChatResponse};
use dbapp_core::{AppContext, Error};

#[derive(Debug, Clone)]
pub struct ServingArgs {
    pub endpoint: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ServingArgs {
    fn request(&self) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user(&self.prompt)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(classify(err), Some(Error::Http { status, .. }) if status.as_u16() == 404)
}

fn render_answer(response: &ChatResponse) -> String {
    match response.answer() {
        Some(answer) => format!("Answer: {}", answer),
        None => format!(
            "Full response: {}",
            serde_json::to_string_pretty(&response.0).unwrap_or_else(|_| response.0.to_string())
        ),
    }
}

async fn list_available(workspace: &WorkspaceApi) {
    println!("\nAvailable endpoints:");
    match workspace.list_serving_endpoints().await {
        Ok(endpoints) => {
            for endpoint in endpoints {
                println!("  - {} ({})", endpoint.name, endpoint.state_display());
            }
        }
        Err(e) => println!("  Could not list endpoints: {}", e),
    }
}

pub async fn run(ctx: &AppContext, args: ServingArgs) -> Result<()> {
    let workspace = ctx.workspace()?;

    println!("Testing {} endpoint...", args.endpoint);
    println!("{}", "=".repeat(50));

    let endpoint = match workspace.get_serving_endpoint(&args.endpoint).await {
        Ok(endpoint) => endpoint,
        Err(e) if is_not_found(&e) => {
            println!("Endpoint '{}' not found", args.endpoint);
            list_available(&workspace).await;
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    println!("Endpoint found: {}", endpoint.name);
    println!("  State: {}", endpoint.state_display());
    if !endpoint.is_ready() {
        println!("Endpoint not ready. Current state: {}", endpoint.state_display());
        return Ok(());
    }
    println!("Endpoint is ready");

    let request = args.request();
    println!("\nSending query: {}", args.prompt);
    let response = workspace
        .query_serving_endpoint(&args.endpoint, &request)
        .await?;

    println!("\nResponse received:");
    println!("{}", render_answer(&response));
    Ok(())
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_carries_prompt_and_sampling() {
        let args = ServingArgs {
            endpoint: "databricks-claude-sonnet-4".into(),
            prompt: "How tall is the eiffel tower?".into(),
            max_tokens: 150,
            temperature: 0.7,
        };
        let body = serde_json::to_value(args.request()).unwrap();
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "How tall is the eiffel tower?");
        assert_eq!(body["max_tokens"], 150);
    }

    #[test]
    fn answer_or_full_body() {
        let chat = ChatResponse(json!({"choices": [{"message": {"content": "330 m"}}]}));
        assert_eq!(render_answer(&chat), "Answer: 330 m");

        let other = ChatResponse(json!({"predictions": [1]}));
        assert!(render_answer(&other).starts_with("Full response: {"));
    }

    #[test]
    fn only_http_404_counts_as_not_found() {
        let missing = anyhow::Error::from(Error::from_status(
            StatusCode::NOT_FOUND,
            "RESOURCE_DOES_NOT_EXIST",
        ));
        let denied = anyhow::Error::from(Error::from_status(StatusCode::FORBIDDEN, "no"));
        assert!(is_not_found(&missing));
        assert!(!is_not_found(&denied));
        assert!(!is_not_found(&anyhow::anyhow!("offline")));
    }
}
