mod common;

use common::Server;
use std::collections::HashSet;

#[test]
fn documents_server_lists_read_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::documents()?;

    let response = server.request(serde_json::json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/list",
        "params": {}
    }))?;
    let tools = response
        .get("result")
        .and_then(|value| value.get("tools"))
        .and_then(|value| value.as_array())
        .expect("tools array present");

    let names: HashSet<&str> = tools
        .iter()
        .filter_map(|tool| tool.get("name").and_then(|value| value.as_str()))
        .collect();
    assert_eq!(names, HashSet::from(["read_file"]));

    let read_file = &tools[0];
    assert_eq!(
        read_file["inputSchema"]["required"],
        serde_json::json!(["file_path"])
    );
    assert!(read_file["outputSchema"]["properties"].get("type").is_some());
    Ok(())
}
