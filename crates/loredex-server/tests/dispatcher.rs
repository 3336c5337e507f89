//! Protocol tests driven over in-memory streams

use loredex_index::{IndexBuilder, ResourceScanner, ScanRoots};
use loredex_server::Dispatcher;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tokio::io::BufReader;

fn write_fixture_tree(root: &Path) {
    fs::create_dir_all(root.join("skills/alarm")).unwrap();
    fs::write(
        root.join("skills/alarm/SKILL.md"),
        "---\nname: alarm\ndescription: The base alarm skill\ntags: alarms\n---\n\nBody.\n",
    )
    .unwrap();
    fs::create_dir_all(root.join("agents")).unwrap();
    fs::write(
        root.join("agents/reviewer.agent.md"),
        "---\nname: reviewer\ndescription: Reviews alarm changes\n---\n\nAgent body.\n",
    )
    .unwrap();
    fs::write(root.join("SYSTEM_RULES.md"), "Always rebuild first.\n").unwrap();
}

fn build_index(root: &Path) {
    let roots = ScanRoots::under(root, "skills", "agents", "prompts", "instructions");
    IndexBuilder::new(ResourceScanner::new(roots), root.join("indexes"))
        .build()
        .unwrap();
}

fn dispatcher(root: &Path) -> Dispatcher {
    Dispatcher::new(root.join("indexes"), root, root.join("SYSTEM_RULES.md"))
}

/// Drive the dispatcher with raw request lines, returning all emitted
/// frames (the server/info notification first).
async fn drive(dispatcher: &Dispatcher, requests: &[Value]) -> Vec<Value> {
    let mut input = String::new();
    for request in requests {
        input.push_str(&request.to_string());
        input.push('\n');
    }

    let mut output: Vec<u8> = Vec::new();
    dispatcher
        .run(BufReader::new(input.as_bytes()), &mut output)
        .await
        .unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn call(id: u64, tool: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": arguments }
    })
}

#[tokio::test]
async fn test_server_info_emitted_first() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());

    let frames = drive(&dispatcher(tmp.path()), &[]).await;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["method"], "server/info");
    assert_eq!(frames[0]["params"]["name"], "loredex");
    assert_eq!(frames[0]["params"]["tools"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_tools_list_echoes_id() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());

    let request = json!({ "jsonrpc": "2.0", "id": 7, "method": "tools/list" });
    let frames = drive(&dispatcher(tmp.path()), &[request]).await;
    assert_eq!(frames[1]["id"], 7);
    assert_eq!(
        frames[1]["result"]["tools"][0]["name"],
        "search_resources"
    );
}

#[tokio::test]
async fn test_search_call_ranks_and_wraps() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());

    let frames = drive(
        &dispatcher(tmp.path()),
        &[call(1, "search_resources", json!({ "query": "alarm" }))],
    )
    .await;

    let result = &frames[1]["result"];
    assert_eq!(result["success"], true);
    assert_eq!(result["count"], 2);
    // Exact name match outranks the description-only match.
    assert_eq!(result["results"][0]["name"], "alarm");
    assert_eq!(result["results"][1]["name"], "reviewer");
    assert!(result["message"]
        .as_str()
        .unwrap()
        .contains("get_resource"));
}

#[tokio::test]
async fn test_get_resource_attaches_content() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());

    let frames = drive(
        &dispatcher(tmp.path()),
        &[call(2, "get_resource", json!({ "name": "alarm", "kind": "skill" }))],
    )
    .await;

    let resource = &frames[1]["result"]["resource"];
    assert_eq!(resource["name"], "alarm");
    assert_eq!(resource["kind"], "skill");
    assert!(resource["content"].as_str().unwrap().contains("Body."));
}

#[tokio::test]
async fn test_operation_errors_stay_in_envelope() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());

    let frames = drive(
        &dispatcher(tmp.path()),
        &[
            call(3, "get_resource", json!({ "name": "no-such-resource" })),
            call(4, "not_a_tool", json!({})),
        ],
    )
    .await;

    // Lookup failure: protocol-level success, result-level failure.
    assert!(frames[1].get("error").is_none());
    assert_eq!(frames[1]["result"]["success"], false);
    assert!(frames[1]["result"]["error"]
        .as_str()
        .unwrap()
        .contains("no-such-resource"));

    // Unknown tool routes the same way.
    assert_eq!(frames[2]["result"]["success"], false);
    assert!(frames[2]["result"]["error"]
        .as_str()
        .unwrap()
        .contains("not_a_tool"));
}

#[tokio::test]
async fn test_missing_index_reported_not_crashed() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    // No build on purpose.

    let frames = drive(
        &dispatcher(tmp.path()),
        &[call(5, "list_resources", json!({}))],
    )
    .await;

    assert_eq!(frames[1]["result"]["success"], false);
    assert!(frames[1]["result"]["error"]
        .as_str()
        .unwrap()
        .contains("Index not found"));
}

#[tokio::test]
async fn test_malformed_json_is_protocol_error() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());

    let mut output: Vec<u8> = Vec::new();
    dispatcher(tmp.path())
        .run(BufReader::new(&b"this is not json\n"[..]), &mut output)
        .await
        .unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines[1]["error"]["code"], -32700);
    assert_eq!(lines[1]["id"], Value::Null);
}

#[tokio::test]
async fn test_unknown_method_is_protocol_error() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());

    let request = json!({ "jsonrpc": "2.0", "id": 9, "method": "resources/read" });
    let frames = drive(&dispatcher(tmp.path()), &[request]).await;
    assert_eq!(frames[1]["error"]["code"], -32601);
    assert_eq!(frames[1]["id"], 9);
}

#[tokio::test]
async fn test_responses_are_fifo() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());

    let frames = drive(
        &dispatcher(tmp.path()),
        &[
            call(10, "get_resource_stats", json!({})),
            call(11, "list_resources", json!({ "kind": "agent" })),
            call(12, "get_system_rules", json!({})),
        ],
    )
    .await;

    assert_eq!(frames[1]["id"], 10);
    assert_eq!(frames[1]["result"]["stats"]["totalResources"], 2);
    assert_eq!(frames[2]["id"], 11);
    assert_eq!(frames[2]["result"]["count"], 1);
    assert_eq!(frames[3]["id"], 12);
    assert_eq!(
        frames[3]["result"]["systemRules"],
        "Always rebuild first.\n"
    );
}

#[tokio::test]
async fn test_system_rules_failure_names_path() {
    let tmp = tempfile::tempdir().unwrap();
    write_fixture_tree(tmp.path());
    build_index(tmp.path());
    fs::remove_file(tmp.path().join("SYSTEM_RULES.md")).unwrap();

    let frames = drive(
        &dispatcher(tmp.path()),
        &[call(13, "get_system_rules", json!({}))],
    )
    .await;

    let result = &frames[1]["result"];
    assert_eq!(result["success"], false);
    assert!(result["path"]
        .as_str()
        .unwrap()
        .contains("SYSTEM_RULES.md"));
}
