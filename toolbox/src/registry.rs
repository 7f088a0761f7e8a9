use std::collections::BTreeMap;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use toolbox_types::{ArgError, ParserEvent, ToolDefinition, ToolResponse, ToolboxError};

type SyncFn = Box<dyn Fn(Map<String, Value>) -> anyhow::Result<Value> + Send + Sync>;
type AsyncFn =
    Box<dyn Fn(Map<String, Value>) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

/// A registered handler: plain function or future-returning function,
/// dispatched by lookup.
enum ToolHandler {
    Sync(SyncFn),
    Async(AsyncFn),
}

struct ToolEntry {
    definition: ToolDefinition,
    handler: ToolHandler,
}

/// Registry of callable tools keyed by name.
///
/// Consumes completed tool events from the parsers, coerces arguments
/// against the declared schema, and invokes the registered handler.
/// Failures are returned inside [`ToolResponse`] so one bad call never
/// aborts a batch of otherwise-valid events.
#[derive(Default)]
pub struct Toolbox {
    tools: BTreeMap<String, ToolEntry>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous tool. Rejects duplicate names.
    pub fn add_tool<F>(&mut self, definition: ToolDefinition, f: F) -> Result<(), ToolboxError>
    where
        F: Fn(Map<String, Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.insert(definition, ToolHandler::Sync(Box::new(f)))
    }

    /// Register an asynchronous tool. Rejects duplicate names.
    pub fn add_async_tool<F, Fut>(
        &mut self,
        definition: ToolDefinition,
        f: F,
    ) -> Result<(), ToolboxError>
    where
        F: Fn(Map<String, Value>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.insert(
            definition,
            ToolHandler::Async(Box::new(move |args| Box::pin(f(args)))),
        )
    }

    /// Definitions of every registered tool, for prompt formatting.
    pub fn definitions(&self) -> Vec<&ToolDefinition> {
        self.tools.values().map(|entry| &entry.definition).collect()
    }

    /// Dispatch one parser event.
    ///
    /// Returns `None` for anything that is not a completed tool call.
    /// Unknown tools, validation failures, and handler errors all come
    /// back as a `ToolResponse` with its `error` set.
    pub async fn use_event(&self, event: &ParserEvent) -> Option<ToolResponse> {
        if !event.is_tool_call {
            return None;
        }
        let tool = event.tool.as_ref()?;

        let Some(entry) = self.tools.get(&tool.name) else {
            tracing::debug!(tool_name = %tool.name, "tool not registered");
            return Some(ToolResponse::failed(
                tool.clone(),
                ToolboxError::UnknownTool(tool.name.clone()),
            ));
        };

        let coerced = match coerce_args(&entry.definition, tool) {
            Ok(coerced) => coerced,
            Err(error) => return Some(ToolResponse::failed(tool.clone(), error)),
        };

        tracing::debug!(tool_name = %tool.name, "dispatching tool");
        let outcome = match &entry.handler {
            ToolHandler::Sync(f) => f(coerced),
            ToolHandler::Async(f) => f(coerced).await,
        };

        Some(match outcome {
            Ok(value) => ToolResponse::ok(tool.clone(), value),
            Err(e) => ToolResponse::failed(tool.clone(), ToolboxError::Execution(e.to_string())),
        })
    }

    fn insert(
        &mut self,
        definition: ToolDefinition,
        handler: ToolHandler,
    ) -> Result<(), ToolboxError> {
        let name = definition.name.clone();
        if self.tools.contains_key(&name) {
            return Err(ToolboxError::Conflict(name));
        }
        self.tools.insert(
            name,
            ToolEntry {
                definition,
                handler,
            },
        );
        Ok(())
    }
}

/// Coerce the parsed string arguments against the declared schema,
/// collecting failures per argument rather than stopping at the first.
fn coerce_args(
    definition: &ToolDefinition,
    tool: &toolbox_types::ToolUse,
) -> Result<Map<String, Value>, ToolboxError> {
    let mut coerced = Map::new();
    let mut errors = Vec::new();

    for (arg_name, spec) in &definition.args {
        match tool.args.get(arg_name) {
            None => errors.push(ArgError {
                name: arg_name.clone(),
                message: "missing required argument".to_string(),
            }),
            Some(raw) => match spec.arg_type.coerce(raw) {
                Ok(value) => {
                    coerced.insert(arg_name.clone(), value);
                }
                Err(message) => errors.push(ArgError {
                    name: arg_name.clone(),
                    message,
                }),
            },
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(ToolboxError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;
    use toolbox_types::{ArgSpec, ArgType, ParserEvent, ToolUse};

    use super::*;

    fn definition(name: &str, args: &[(&str, ArgType)]) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: format!("{name} test tool"),
            args: args
                .iter()
                .map(|(arg, arg_type)| {
                    (
                        arg.to_string(),
                        ArgSpec {
                            arg_type: *arg_type,
                            description: String::new(),
                        },
                    )
                })
                .collect(),
        }
    }

    fn close_event(name: &str, args: &[(&str, &str)]) -> ParserEvent {
        let args: BTreeMap<String, String> = args
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ParserEvent::tool_close(
            "test-id",
            Some(ToolUse {
                name: name.to_string(),
                args,
            }),
        )
    }

    #[tokio::test]
    async fn dispatches_with_coerced_args() {
        let mut toolbox = Toolbox::new();
        toolbox
            .add_tool(
                definition("search", &[("query", ArgType::String), ("limit", ArgType::Integer)]),
                |args| Ok(json!({ "echo": args })),
            )
            .unwrap();

        let event = close_event("search", &[("query", "rust parsers"), ("limit", "5")]);
        let response = toolbox.use_event(&event).await.expect("tool call");

        assert!(response.error.is_none());
        let echoed = &response.result.unwrap()["echo"];
        assert_eq!(echoed["query"], "rust parsers");
        assert_eq!(echoed["limit"], 5);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_not_thrown() {
        let toolbox = Toolbox::new();
        let event = close_event("missing_tool", &[("arg", "val")]);

        let response = toolbox.use_event(&event).await.expect("still a response");
        assert!(response.result.is_none());
        assert_eq!(
            response.error,
            Some(ToolboxError::UnknownTool("missing_tool".to_string()))
        );
    }

    #[tokio::test]
    async fn non_tool_event_is_ignored() {
        let toolbox = Toolbox::new();
        let event = ParserEvent::text_close("text-id");
        assert!(toolbox.use_event(&event).await.is_none());
    }

    #[tokio::test]
    async fn validation_errors_collect_per_argument() {
        let mut toolbox = Toolbox::new();
        toolbox
            .add_tool(
                definition(
                    "calc",
                    &[("lhs", ArgType::Integer), ("rhs", ArgType::Integer)],
                ),
                |_| Ok(Value::Null),
            )
            .unwrap();

        // One unparsable argument and one missing one: both must show up.
        let event = close_event("calc", &[("lhs", "not a number")]);
        let response = toolbox.use_event(&event).await.expect("tool call");

        match response.error {
            Some(ToolboxError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().any(|e| e.name == "lhs"));
                assert!(errors.iter().any(|e| e.name == "rhs"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let mut toolbox = Toolbox::new();
        toolbox
            .add_tool(definition("dup", &[]), |_| Ok(Value::Null))
            .unwrap();
        let result = toolbox.add_tool(definition("dup", &[]), |_| Ok(Value::Null));
        assert_eq!(result, Err(ToolboxError::Conflict("dup".to_string())));
    }

    #[tokio::test]
    async fn async_handler_is_awaited() {
        let mut toolbox = Toolbox::new();
        toolbox
            .add_async_tool(definition("fetch", &[("url", ArgType::String)]), |args| async move {
                Ok(json!({ "fetched": args["url"] }))
            })
            .unwrap();

        let event = close_event("fetch", &[("url", "https://example.com")]);
        let response = toolbox.use_event(&event).await.expect("tool call");
        assert_eq!(response.result.unwrap()["fetched"], "https://example.com");
    }

    #[tokio::test]
    async fn handler_error_becomes_execution_error() {
        let mut toolbox = Toolbox::new();
        toolbox
            .add_tool(definition("flaky", &[]), |_| {
                Err(anyhow::anyhow!("simulated tool error"))
            })
            .unwrap();

        let event = close_event("flaky", &[]);
        let response = toolbox.use_event(&event).await.expect("tool call");
        assert_eq!(
            response.error,
            Some(ToolboxError::Execution("simulated tool error".to_string()))
        );
    }

    #[tokio::test]
    async fn boolean_coercion_is_lenient() {
        let mut toolbox = Toolbox::new();
        toolbox
            .add_tool(definition("toggle", &[("on", ArgType::Boolean)]), |args| {
                Ok(args["on"].clone())
            })
            .unwrap();

        for (raw, expected) in [("true", true), ("YES", true), ("1", true), ("nope", false)] {
            let event = close_event("toggle", &[("on", raw)]);
            let response = toolbox.use_event(&event).await.expect("tool call");
            assert_eq!(response.result, Some(Value::Bool(expected)), "raw {raw}");
        }
    }

    #[tokio::test]
    async fn parser_events_flow_into_the_toolbox() {
        use toolbox_parsers::XmlParser;

        let mut toolbox = Toolbox::new();
        toolbox
            .add_tool(definition("thinking", &[("thoughts", ArgType::String)]), |args| {
                Ok(args["thoughts"].clone())
            })
            .unwrap();

        let mut parser = XmlParser::new("use_tool");
        let events = parser
            .parse("<use_tool><name>thinking</name><thoughts>Cogito, ergo sum</thoughts></use_tool>")
            .unwrap();

        let mut responses = Vec::new();
        for event in &events {
            if let Some(response) = toolbox.use_event(event).await {
                responses.push(response);
            }
        }
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].result, Some(json!("Cogito, ergo sum")));
    }
}
