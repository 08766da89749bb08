//! Definitions for the built-in node kinds.

use flowcore::{
    NodeCategory, NodeDefinition, NodeType, ParameterSpec, ParameterType, PortSpec, PortType,
};
use serde_json::json;

pub const WEBHOOK_TRIGGER: &str = "webhook-trigger";
pub const CRON_TRIGGER: &str = "cron-trigger";
pub const MANUAL_TRIGGER: &str = "manual-trigger";
pub const HTTP_REQUEST: &str = "http-request";
pub const DELAY: &str = "delay";
pub const IF_CONDITION: &str = "if-condition";
pub const SWITCH: &str = "switch";
pub const MERGE: &str = "merge";
pub const SET_DATA: &str = "set-data";
pub const CODE: &str = "code";
pub const AI_CHAT: &str = "ai-chat";
pub const SEND_EMAIL: &str = "send-email";
pub const SLACK_MESSAGE: &str = "slack-message";
pub const TELEGRAM_MESSAGE: &str = "telegram-message";
pub const GOOGLE_SHEETS: &str = "google-sheets";

pub const DEFAULT_CODE: &str = "// Access input data via `data` and return the output\n\
let out = if type_of(data) == \"map\" { data } else { #{} };\n\
out.processed = true;\n\
out";

fn data_in() -> PortSpec {
    PortSpec::new("data", "Data", PortType::Any)
}

fn http_methods(extra: &[&'static str]) -> Vec<(&'static str, &'static str)> {
    ["GET", "POST", "PUT"]
        .iter()
        .chain(extra)
        .chain(["DELETE"].iter())
        .map(|m| (*m, *m))
        .collect()
}

/// Every built-in definition, in palette order.
pub fn builtin_definitions() -> Vec<NodeDefinition> {
    vec![
        // Triggers
        NodeDefinition::new(WEBHOOK_TRIGGER, "webhook", "Webhook", NodeCategory::Triggers, NodeType::Trigger)
            .with_description("Trigger workflow via HTTP webhook")
            .with_icon("Webhook")
            .with_output(PortSpec::new("data", "Data", PortType::Object))
            .with_parameter(
                ParameterSpec::new("method", "HTTP Method", ParameterType::Select)
                    .required()
                    .with_default("POST")
                    .with_options(http_methods(&[])),
            )
            .with_parameter(
                ParameterSpec::new("path", "Path", ParameterType::String)
                    .required()
                    .with_placeholder("/my-webhook")
                    .with_description("The webhook path (will be appended to base URL)"),
            )
            .with_parameter(
                ParameterSpec::new("authentication", "Authentication", ParameterType::Select)
                    .with_default("none")
                    .with_options([("None", "none"), ("Basic Auth", "basic"), ("Header Auth", "header")]),
            )
            .with_tags(["trigger", "http", "api"]),
        NodeDefinition::new(CRON_TRIGGER, "cron", "Schedule", NodeCategory::Triggers, NodeType::Trigger)
            .with_description("Trigger workflow on a schedule")
            .with_icon("Clock")
            .with_output(PortSpec::new("timestamp", "Timestamp", PortType::String))
            .with_parameter(
                ParameterSpec::new("mode", "Mode", ParameterType::Select)
                    .required()
                    .with_default("interval")
                    .with_options([("Every X Minutes", "interval"), ("Cron Expression", "cron")]),
            )
            .with_parameter(
                ParameterSpec::new("interval", "Interval (minutes)", ParameterType::Number)
                    .with_default(15)
                    .show_when("mode", "interval"),
            )
            .with_parameter(
                ParameterSpec::new("cronExpression", "Cron Expression", ParameterType::String)
                    .with_placeholder("0 */15 * * *")
                    .show_when("mode", "cron"),
            )
            .with_tags(["trigger", "schedule", "cron", "timer"]),
        NodeDefinition::new(MANUAL_TRIGGER, "manual", "Manual Trigger", NodeCategory::Triggers, NodeType::Trigger)
            .with_description("Manually trigger workflow execution")
            .with_icon("Play")
            .with_output(PortSpec::new("data", "Data", PortType::Object))
            .with_tags(["trigger", "manual", "test"]),
        // Actions
        NodeDefinition::new(HTTP_REQUEST, "httpRequest", "HTTP Request", NodeCategory::Actions, NodeType::Action)
            .with_description("Make HTTP requests to external APIs")
            .with_icon("Globe")
            .with_input(data_in())
            .with_output(PortSpec::new("response", "Response", PortType::Object))
            .with_parameter(
                ParameterSpec::new("method", "Method", ParameterType::Select)
                    .required()
                    .with_default("GET")
                    .with_options(http_methods(&["PATCH"])),
            )
            .with_parameter(
                ParameterSpec::new("url", "URL", ParameterType::String)
                    .required()
                    .with_placeholder("https://api.example.com/endpoint"),
            )
            .with_parameter(ParameterSpec::new("headers", "Headers", ParameterType::Json).with_default(json!({})))
            .with_parameter(ParameterSpec::new("body", "Body", ParameterType::Json))
            .with_parameter(
                ParameterSpec::new("authentication", "Authentication", ParameterType::Select)
                    .with_default("none")
                    .with_options([
                        ("None", "none"),
                        ("Bearer Token", "bearer"),
                        ("Basic Auth", "basic"),
                        ("API Key", "apiKey"),
                    ]),
            )
            .with_tags(["http", "api", "request", "fetch"]),
        NodeDefinition::new(DELAY, "delay", "Delay", NodeCategory::Utilities, NodeType::Action)
            .with_description("Wait for a specified amount of time")
            .with_icon("Timer")
            .with_input(data_in())
            .with_output(PortSpec::new("data", "Data", PortType::Any))
            .with_parameter(
                ParameterSpec::new("duration", "Duration", ParameterType::Number)
                    .required()
                    .with_default(1000)
                    .with_description("Delay in milliseconds"),
            )
            .with_tags(["delay", "wait", "timer", "pause"]),
        // Flow control
        NodeDefinition::new(IF_CONDITION, "if", "IF", NodeCategory::FlowControl, NodeType::Logic)
            .with_description("Route workflow based on conditions")
            .with_icon("GitBranch")
            .with_input(data_in().required())
            .with_output(PortSpec::new("true", "True", PortType::Any))
            .with_output(PortSpec::new("false", "False", PortType::Any))
            .with_parameter(
                ParameterSpec::new("condition", "Condition", ParameterType::Code)
                    .required()
                    .with_placeholder("data.value > 10")
                    .with_description("Expression evaluated against `data` that yields true or false"),
            )
            .with_tags(["condition", "if", "branch", "logic"]),
        NodeDefinition::new(SWITCH, "switch", "Switch", NodeCategory::FlowControl, NodeType::Logic)
            .with_description("Route to multiple branches based on value")
            .with_icon("GitMerge")
            .with_input(data_in().required())
            .with_output(PortSpec::new("case1", "Case 1", PortType::Any))
            .with_output(PortSpec::new("case2", "Case 2", PortType::Any))
            .with_output(PortSpec::new("default", "Default", PortType::Any))
            .with_parameter(
                ParameterSpec::new("property", "Property to Check", ParameterType::String)
                    .required()
                    .with_placeholder("data.status"),
            )
            .with_parameter(
                ParameterSpec::new("cases", "Cases", ParameterType::Json)
                    .required()
                    .with_default(json!([
                        {"value": "case1", "output": "case1"},
                        {"value": "case2", "output": "case2"}
                    ])),
            )
            .with_tags(["switch", "case", "routing", "logic"]),
        NodeDefinition::new(MERGE, "merge", "Merge", NodeCategory::FlowControl, NodeType::Logic)
            .with_description("Merge multiple inputs into one")
            .with_icon("Merge")
            .with_input(PortSpec::new("input1", "Input 1", PortType::Any).required())
            .with_input(PortSpec::new("input2", "Input 2", PortType::Any).required())
            .with_output(PortSpec::new("merged", "Merged", PortType::Array))
            .with_parameter(
                ParameterSpec::new("mode", "Mode", ParameterType::Select)
                    .required()
                    .with_default("append")
                    .with_options([
                        ("Append", "append"),
                        ("Merge by Key", "mergeByKey"),
                        ("Wait for All", "waitAll"),
                    ]),
            )
            .with_tags(["merge", "combine", "join"]),
        // Data
        NodeDefinition::new(SET_DATA, "set", "Set", NodeCategory::Data, NodeType::Transform)
            .with_description("Set or modify data values")
            .with_icon("Edit")
            .with_input(data_in())
            .with_output(PortSpec::new("data", "Data", PortType::Object))
            .with_parameter(
                ParameterSpec::new("values", "Values to Set", ParameterType::Json)
                    .required()
                    .with_default(json!({}))
                    .with_description("Key-value pairs to set"),
            )
            .with_parameter(
                ParameterSpec::new("keepOnlySet", "Keep Only Set Values", ParameterType::Boolean)
                    .with_default(false),
            )
            .with_tags(["set", "data", "transform", "modify"]),
        NodeDefinition::new(CODE, "code", "Code", NodeCategory::Data, NodeType::Transform)
            .with_description("Execute a custom script")
            .with_icon("Code")
            .with_input(data_in())
            .with_output(PortSpec::new("data", "Data", PortType::Any))
            .with_parameter(
                ParameterSpec::new("code", "Script", ParameterType::Code)
                    .required()
                    .with_default(DEFAULT_CODE),
            )
            .with_tags(["code", "script", "custom", "transform"]),
        // AI
        NodeDefinition::new(AI_CHAT, "aiChat", "AI Chat", NodeCategory::Ai, NodeType::Action)
            .with_description("Send messages to AI models")
            .with_icon("Bot")
            .with_input(data_in())
            .with_output(PortSpec::new("response", "Response", PortType::Object))
            .with_parameter(
                ParameterSpec::new("model", "Model", ParameterType::Select)
                    .required()
                    .with_default("openai/gpt-4o-mini")
                    .with_options([
                        ("GPT-4o Mini", "openai/gpt-4o-mini"),
                        ("GPT-4o", "openai/gpt-4o"),
                        ("Claude 3.5 Sonnet", "anthropic/claude-3.5-sonnet"),
                        ("Llama 3.1 70B", "meta/llama-3.1-70b"),
                    ]),
            )
            .with_parameter(
                ParameterSpec::new("systemPrompt", "System Prompt", ParameterType::String)
                    .with_placeholder("You are a helpful assistant..."),
            )
            .with_parameter(
                ParameterSpec::new("prompt", "Prompt", ParameterType::String)
                    .required()
                    .with_placeholder("Enter your prompt or use {{data.field}}"),
            )
            .with_parameter(ParameterSpec::new("temperature", "Temperature", ParameterType::Number).with_default(0.7))
            .with_credential("openai")
            .with_tags(["ai", "llm", "chat", "gpt", "claude"]),
        // Communication
        NodeDefinition::new(SEND_EMAIL, "email", "Send Email", NodeCategory::Communication, NodeType::Action)
            .with_description("Send emails via SMTP")
            .with_icon("Mail")
            .with_input(data_in())
            .with_output(PortSpec::new("result", "Result", PortType::Object))
            .with_parameter(
                ParameterSpec::new("to", "To", ParameterType::String)
                    .required()
                    .with_placeholder("recipient@example.com"),
            )
            .with_parameter(ParameterSpec::new("subject", "Subject", ParameterType::String).required())
            .with_parameter(ParameterSpec::new("body", "Body", ParameterType::String).required())
            .with_parameter(ParameterSpec::new("isHtml", "HTML Email", ParameterType::Boolean).with_default(false))
            .with_credential("smtp")
            .with_tags(["email", "smtp", "send", "notification"]),
        NodeDefinition::new(SLACK_MESSAGE, "slack", "Slack", NodeCategory::Communication, NodeType::Action)
            .with_description("Send messages to Slack")
            .with_icon("MessageSquare")
            .with_input(data_in())
            .with_output(PortSpec::new("result", "Result", PortType::Object))
            .with_parameter(
                ParameterSpec::new("channel", "Channel", ParameterType::String)
                    .required()
                    .with_placeholder("#general"),
            )
            .with_parameter(ParameterSpec::new("message", "Message", ParameterType::String).required())
            .with_credential("slack")
            .with_tags(["slack", "message", "notification", "chat"]),
        NodeDefinition::new(TELEGRAM_MESSAGE, "telegram", "Telegram", NodeCategory::Communication, NodeType::Action)
            .with_description("Send messages via Telegram")
            .with_icon("Send")
            .with_input(data_in())
            .with_output(PortSpec::new("result", "Result", PortType::Object))
            .with_parameter(ParameterSpec::new("chatId", "Chat ID", ParameterType::String).required())
            .with_parameter(ParameterSpec::new("message", "Message", ParameterType::String).required())
            .with_credential("telegram")
            .with_tags(["telegram", "message", "notification", "chat"]),
        // Integrations
        NodeDefinition::new(GOOGLE_SHEETS, "googleSheets", "Google Sheets", NodeCategory::Integrations, NodeType::Integration)
            .with_description("Read/write data to Google Sheets")
            .with_icon("Sheet")
            .with_input(data_in())
            .with_output(PortSpec::new("data", "Data", PortType::Array))
            .with_parameter(
                ParameterSpec::new("operation", "Operation", ParameterType::Select)
                    .required()
                    .with_default("read")
                    .with_options([
                        ("Read", "read"),
                        ("Append", "append"),
                        ("Update", "update"),
                        ("Clear", "clear"),
                    ]),
            )
            .with_parameter(ParameterSpec::new("spreadsheetId", "Spreadsheet ID", ParameterType::String).required())
            .with_parameter(
                ParameterSpec::new("range", "Range", ParameterType::String)
                    .required()
                    .with_placeholder("Sheet1!A1:D10"),
            )
            .with_credential("googleSheets")
            .with_tags(["google", "sheets", "spreadsheet", "data"]),
    ]
}
