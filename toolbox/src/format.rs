use toolbox_types::ToolDefinition;

use crate::Toolbox;

/// Renders human-readable usage instructions for the upstream LLM from
/// tool metadata. Formatters never touch the parsers; they only read
/// definitions.
pub trait PromptFormatter {
    fn format_prompt(&self, tools: &[&ToolDefinition]) -> String;

    fn usage_prompt(&self, toolbox: &Toolbox) -> String {
        self.format_prompt(&toolbox.definitions())
    }
}

/// Usage instructions for the `<use_tool>`/`<name>`/`<argName>`
/// convention understood by `XmlParser`.
pub struct XmlPromptFormatter {
    tag: String,
}

impl XmlPromptFormatter {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
        }
    }
}

impl PromptFormatter for XmlPromptFormatter {
    fn format_prompt(&self, tools: &[&ToolDefinition]) -> String {
        let mut out = format!("You can invoke the following tools using <{}>:\n", self.tag);

        for tool in tools {
            out.push_str(&format!(
                "Tool name: {}\nDescription: {}\nArguments:\n",
                tool.name, tool.description
            ));
            for (arg_name, spec) in &tool.args {
                out.push_str(&format!(
                    "  {} ({}): {}\n",
                    arg_name,
                    spec.arg_type.as_str(),
                    spec.description
                ));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "Example:\n<{tag}>\n    <name>tool_name</name>\n    <arg1>value1</arg1>\n    <arg2>value2</arg2>\n</{tag}>",
            tag = self.tag
        ));
        out
    }
}

/// Usage instructions for the flat convention recognized by
/// `FlatXmlParser`: one whole-content tag per tool, no argument
/// structure.
pub struct FlatXmlPromptFormatter;

impl PromptFormatter for FlatXmlPromptFormatter {
    fn format_prompt(&self, tools: &[&ToolDefinition]) -> String {
        let mut out = String::from("Respond using the following tags:\n");
        for tool in tools {
            out.push_str(&format!(
                "<{name}>...</{name}>: {}\n",
                tool.description,
                name = tool.name
            ));
        }
        out
    }
}
