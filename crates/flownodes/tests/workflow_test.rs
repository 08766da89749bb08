// crates/flownodes/tests/workflow_test.rs

use async_trait::async_trait;
use flowcore::{
    ExecutionStatus, Map, NodeError, SaveExecutions, Value, Workflow, WorkflowNode,
    WorkflowSettings,
};
use flownodes::{
    definitions, runtime_with, CompletionClient, CompletionError, CompletionRequest, HttpRelay,
    HttpRequest, HttpResponse, NodeServices,
};
use flowruntime::{validate_workflow, FlowRuntime, RunOptions, RuntimeConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct StubRelay;

#[async_trait]
impl HttpRelay for StubRelay {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, NodeError> {
        Ok(HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: Map::new(),
            data: json!({"echo": request.url}),
        })
    }
}

struct StubCompletion;

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError> {
        Ok(json!({
            "choices": [{"message": {"content": format!("echo: {}", request.prompt)}}]
        }))
    }
}

fn runtime() -> FlowRuntime {
    runtime_with(
        RuntimeConfig::default(),
        NodeServices {
            http: Arc::new(StubRelay),
            completion: Arc::new(StubCompletion),
        },
    )
}

fn output<'a>(execution: &'a flowcore::WorkflowExecution, node_id: &str) -> &'a Value {
    &execution
        .last_attempt(node_id)
        .unwrap_or_else(|| panic!("{} never ran", node_id))
        .output
}

#[tokio::test]
async fn test_manual_trigger_into_set_data() {
    let mut wf = Workflow::new("set");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    wf.add_node(
        WorkflowNode::new("set", definitions::SET_DATA)
            .with_parameter("values", json!({"x": 1}))
            .with_parameter("keepOnlySet", true),
    );
    wf.connect("start", "set");

    let execution = runtime().execute(&wf, RunOptions::default()).await;

    assert_eq!(execution.status, ExecutionStatus::Success);
    assert_eq!(execution.visited(), vec!["start", "set"]);
    assert_eq!(output(&execution, "start"), &json!({}));
    assert_eq!(output(&execution, "set"), &json!({"x": 1}));
}

#[tokio::test]
async fn test_condition_routes_on_input_value() {
    let mut wf = Workflow::new("branch");
    wf.add_node(
        WorkflowNode::new("start", definitions::MANUAL_TRIGGER)
            .with_parameter("testData", json!({"value": 20})),
    );
    wf.add_node(
        WorkflowNode::new("check", definitions::IF_CONDITION)
            .with_parameter("condition", "data.value > 10"),
    );
    wf.add_node(
        WorkflowNode::new("big", definitions::SET_DATA).with_parameter("values", json!({"size": "big"})),
    );
    wf.add_node(
        WorkflowNode::new("small", definitions::SET_DATA)
            .with_parameter("values", json!({"size": "small"})),
    );
    wf.connect("start", "check");
    wf.connect_handle("check", "true", "big");
    wf.connect_handle("check", "false", "small");

    let execution = runtime().execute(&wf, RunOptions::default()).await;

    assert_eq!(execution.status, ExecutionStatus::Success);
    assert_eq!(execution.visited(), vec!["start", "check", "big"]);
    assert_eq!(
        output(&execution, "check"),
        &json!({"result": true, "data": {"value": 20}})
    );
    // The true branch receives the condition node's whole output.
    assert_eq!(output(&execution, "big")["data"], json!({"value": 20}));
    assert_eq!(output(&execution, "big")["size"], "big");
}

#[tokio::test]
async fn test_switch_falls_back_to_default() {
    let mut wf = Workflow::new("switch");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    wf.add_node(
        WorkflowNode::new("route", definitions::SWITCH)
            .with_parameter("property", "kind")
            .with_parameter(
                "cases",
                json!([{"value": "a", "output": "A"}, {"value": "b", "output": "B"}]),
            ),
    );
    wf.add_node(WorkflowNode::new("on_a", definitions::MERGE));
    wf.add_node(WorkflowNode::new("on_b", definitions::MERGE));
    wf.add_node(WorkflowNode::new("other", definitions::MERGE));
    wf.connect("start", "route");
    wf.connect_handle("route", "A", "on_a");
    wf.connect_handle("route", "B", "on_b");
    wf.connect_handle("route", "default", "other");

    let rt = runtime();

    let execution = rt
        .execute(&wf, RunOptions::default().with_input(json!({"kind": "b"})))
        .await;
    assert_eq!(execution.visited(), vec!["start", "route", "on_b"]);

    let execution = rt
        .execute(&wf, RunOptions::default().with_input(json!({"kind": "z"})))
        .await;
    assert_eq!(execution.visited(), vec!["start", "route", "other"]);
    assert_eq!(output(&execution, "route")["matchedOutput"], "default");
}

#[tokio::test]
async fn test_unmatched_switch_without_default_stops() {
    let mut wf = Workflow::new("switch without default");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    wf.add_node(
        WorkflowNode::new("route", definitions::SWITCH)
            .with_parameter("property", "kind")
            .with_parameter(
                "cases",
                json!([{"value": "A", "output": "case1"}, {"value": "B", "output": "case2"}]),
            ),
    );
    wf.add_node(WorkflowNode::new("first", definitions::MERGE));
    wf.add_node(WorkflowNode::new("second", definitions::MERGE));
    wf.connect("start", "route");
    wf.connect_handle("route", "case1", "first");
    wf.connect_handle("route", "case2", "second");

    let execution = runtime()
        .execute(&wf, RunOptions::default().with_input(json!({"kind": "C"})))
        .await;

    assert_eq!(execution.status, ExecutionStatus::Success);
    assert_eq!(execution.visited(), vec!["start", "route"]);
    assert_eq!(output(&execution, "route")["matchedOutput"], "default");
}

#[tokio::test]
async fn test_switch_matches_numeric_case_by_value() {
    let mut wf = Workflow::new("numeric switch");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    wf.add_node(
        WorkflowNode::new("route", definitions::SWITCH)
            .with_parameter("property", "n")
            .with_parameter("cases", json!([{"value": 1, "output": "one"}])),
    );
    wf.add_node(WorkflowNode::new("on_one", definitions::MERGE));
    wf.connect("start", "route");
    wf.connect_handle("route", "one", "on_one");

    let execution = runtime()
        .execute(&wf, RunOptions::default().with_input(json!({"n": 1.0})))
        .await;

    assert_eq!(execution.visited(), vec!["start", "route", "on_one"]);
}

#[tokio::test]
async fn test_code_node_runs_default_script() {
    let mut wf = Workflow::new("code");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    wf.add_node(WorkflowNode::new("script", definitions::CODE));
    wf.connect("start", "script");

    let execution = runtime()
        .execute(&wf, RunOptions::default().with_input(json!({"n": 3})))
        .await;

    assert_eq!(execution.status, ExecutionStatus::Success);
    assert_eq!(output(&execution, "script"), &json!({"n": 3, "processed": true}));
}

#[tokio::test]
async fn test_network_nodes_use_services() {
    let mut wf = Workflow::new("network");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    wf.add_node(
        WorkflowNode::new("fetch", definitions::HTTP_REQUEST)
            .with_parameter("url", "https://api.example.com/status"),
    );
    wf.add_node(
        WorkflowNode::new("ask", definitions::AI_CHAT)
            .with_parameter("prompt", "Status is {{ data.echo }}"),
    );
    wf.connect("start", "fetch");
    wf.connect("fetch", "ask");

    let execution = runtime().execute(&wf, RunOptions::default()).await;

    assert_eq!(execution.status, ExecutionStatus::Success);
    assert_eq!(output(&execution, "fetch")["status"], 200);
    assert_eq!(
        output(&execution, "ask")["response"],
        "echo: Status is https://api.example.com/status"
    );
    // Defaults from the definition fill unset parameters.
    assert_eq!(output(&execution, "ask")["model"], "openai/gpt-4o-mini");
}

#[tokio::test]
async fn test_http_without_url_fails_run() {
    let mut wf = Workflow::new("no url");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    wf.add_node(WorkflowNode::new("fetch", definitions::HTTP_REQUEST));
    wf.connect("start", "fetch");

    let execution = runtime().execute(&wf, RunOptions::default()).await;

    assert_eq!(execution.status, ExecutionStatus::Error);
    assert_eq!(
        execution.error.as_deref(),
        Some("Missing required parameter: url")
    );
}

#[tokio::test]
async fn test_history_follows_save_policy() {
    let rt = runtime();

    let mut saved = Workflow::new("saved");
    saved.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    let mut skipped = Workflow::new("skipped").with_settings(WorkflowSettings {
        save_executions: SaveExecutions::None,
        ..WorkflowSettings::default()
    });
    skipped.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));

    let first = rt.execute(&saved, RunOptions::default()).await;
    rt.execute(&skipped, RunOptions::default()).await;

    let history = rt.executions().list().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, first.id);
}

#[tokio::test]
async fn test_stored_workflow_by_id() {
    let rt = runtime();
    let mut wf = Workflow::new("stored");
    wf.add_node(WorkflowNode::new("start", definitions::CRON_TRIGGER));
    let id = wf.id.clone();
    rt.register_workflow(wf).await;

    let execution = rt.execute_workflow(&id, RunOptions::default()).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Success);
    assert!(output(&execution, "start")["timestamp"].is_string());

    assert!(rt
        .execute_workflow("missing", RunOptions::default())
        .await
        .is_err());
}

#[tokio::test]
async fn test_cancel_in_flight_run() {
    let rt = Arc::new(runtime());
    let mut wf = Workflow::new("slow");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    wf.add_node(
        WorkflowNode::new("wait", definitions::DELAY).with_parameter("duration", 60_000),
    );
    wf.connect("start", "wait");

    let handle = {
        let rt = rt.clone();
        tokio::spawn(async move {
            rt.execute(&wf, RunOptions::default().with_execution_id("run-1"))
                .await
        })
    };

    while rt.active_executions().await.is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(rt.cancel("run-1").await);

    let execution = handle.await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Cancelled);
    assert_eq!(
        execution.last_attempt("wait").map(|n| n.status),
        Some(ExecutionStatus::Cancelled)
    );
    assert!(rt.active_executions().await.is_empty());
    assert!(!rt.cancel("run-1").await);
}

#[tokio::test]
async fn test_event_subscribers_see_progress() {
    let rt = runtime();
    let mut events = rt.subscribe_events();

    let mut wf = Workflow::new("events");
    wf.add_node(WorkflowNode::new("start", definitions::MANUAL_TRIGGER));
    rt.execute(&wf, RunOptions::default()).await;

    let mut statuses = Vec::new();
    while let Ok(snapshot) = events.try_recv() {
        statuses.push(snapshot.status);
    }
    assert_eq!(statuses.first(), Some(&ExecutionStatus::Running));
    assert_eq!(statuses.last(), Some(&ExecutionStatus::Success));
    assert_eq!(statuses.len(), 4);
}

#[tokio::test]
async fn test_builtin_workflow_validates() {
    let rt = runtime();
    let mut wf = Workflow::new("valid");
    wf.add_node(
        WorkflowNode::new("start", definitions::WEBHOOK_TRIGGER).with_parameter("path", "/hook"),
    );
    wf.add_node(
        WorkflowNode::new("notify", definitions::SLACK_MESSAGE)
            .with_parameter("channel", "#ops")
            .with_parameter("message", "hook fired"),
    );
    wf.connect("start", "notify");

    let report = validate_workflow(&wf, rt.catalog(), rt.registry());
    assert!(report.is_valid(), "{:?}", report.issues);

    wf.add_node(WorkflowNode::new("mail", definitions::SEND_EMAIL));
    wf.connect("notify", "mail");
    let report = validate_workflow(&wf, rt.catalog(), rt.registry());
    assert!(!report.is_valid());
}
