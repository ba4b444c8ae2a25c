//! Agent loop
//!
//! A bounded tool-use loop: the model either picks a tool to run or
//! emits a final answer, as a small JSON action. Observations from tool
//! calls are appended to the scratchpad and fed back on the next step.

use crate::error::QueryServiceError;
use crate::gemini::{strip_fences, GeminiClient};
use crate::tools::ToolRegistry;
use crate::Result;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Hard cap on reasoning steps per question.
pub const MAX_ITERATIONS: usize = 5;

const SYSTEM_PROMPT: &str = r#"You are a financial analyst assistant for a wealth management firm.
You answer questions about clients, portfolios and market data by calling tools.

Respond with exactly one JSON object per turn, no prose:
  {"action": "tool", "tool_name": "<name>", "query": "<input for the tool>"}
or, once you can answer:
  {"action": "final", "answer": "<your answer>"}
"#;

/// One parsed model action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum AgentAction {
    Tool { tool_name: String, query: String },
    Final { answer: String },
}

pub struct QueryAgent {
    client: GeminiClient,
    registry: Arc<ToolRegistry>,
}

impl QueryAgent {
    pub fn new(client: GeminiClient, registry: Arc<ToolRegistry>) -> Self {
        Self { client, registry }
    }

    /// Answer a question, running at most [`MAX_ITERATIONS`] tool steps.
    pub async fn run(&self, question: &str) -> Result<String> {
        let mut scratchpad = String::new();

        for iteration in 1..=MAX_ITERATIONS {
            let prompt = self.build_prompt(question, &scratchpad);
            let raw = self.client.generate(SYSTEM_PROMPT, &prompt).await?;

            let action: AgentAction =
                serde_json::from_str(strip_fences(&raw)).map_err(|e| {
                    warn!(iteration, error = %e, "unparseable agent action");
                    QueryServiceError::AgentOutputFormat(raw.clone())
                })?;

            match action {
                AgentAction::Final { answer } => {
                    info!(iteration, "agent produced final answer");
                    return Ok(answer);
                }
                AgentAction::Tool { tool_name, query } => {
                    info!(iteration, tool = %tool_name, "agent requested tool");
                    let observation = self.run_tool(&tool_name, &query).await;
                    scratchpad.push_str(&format!(
                        "Step {iteration}: called {tool_name} with {query:?}\nObservation:\n{observation}\n\n"
                    ));
                }
            }
        }

        Err(QueryServiceError::AgentIterationLimit(format!(
            "no final answer after {MAX_ITERATIONS} steps"
        )))
    }

    /// Tool failures become observations so the model can route around
    /// them on the next step.
    async fn run_tool(&self, name: &str, query: &str) -> String {
        let Some(tool) = self.registry.get(name) else {
            return format!("Error: no tool named {name:?}. Available: {:?}", self.registry.list());
        };
        match tool.call(query).await {
            Ok(output) => output,
            Err(e) => format!("Error from {name}: {e}"),
        }
    }

    fn build_prompt(&self, question: &str, scratchpad: &str) -> String {
        let tools: Vec<String> = self
            .registry
            .list()
            .into_iter()
            .filter_map(|name| self.registry.get(name))
            .map(|tool| format!("- {}: {}", tool.name(), tool.description()))
            .collect();

        if scratchpad.is_empty() {
            format!("Available tools:\n{}\n\nQuestion: {question}", tools.join("\n"))
        } else {
            format!(
                "Available tools:\n{}\n\nQuestion: {question}\n\nPrevious steps:\n{scratchpad}",
                tools.join("\n")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_action_parses() {
        let raw = r#"{"action": "tool", "tool_name": "document_query", "query": "clients in boston"}"#;
        let action: AgentAction = serde_json::from_str(raw).unwrap();
        assert!(matches!(action, AgentAction::Tool { tool_name, .. } if tool_name == "document_query"));
    }

    #[test]
    fn test_final_action_parses() {
        let raw = r#"{"action": "final", "answer": "Three clients match."}"#;
        let action: AgentAction = serde_json::from_str(raw).unwrap();
        assert!(matches!(action, AgentAction::Final { answer } if answer == "Three clients match."));
    }

    #[test]
    fn test_fenced_action_parses() {
        let raw = "```json\n{\"action\": \"final\", \"answer\": \"ok\"}\n```";
        let action: AgentAction = serde_json::from_str(strip_fences(raw)).unwrap();
        assert!(matches!(action, AgentAction::Final { .. }));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let raw = "I think the answer is probably Boston.";
        assert!(serde_json::from_str::<AgentAction>(strip_fences(raw)).is_err());
    }
}
