use assert_cmd::Command;
use heterograph::{
    HeteroGraph,
    cli::{CommandLineConfig, handle_command},
    document::GraphDocument,
};
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_graph(dir: &TempDir, name: &str, num_nodes: usize, pairs: &[(usize, usize)]) -> PathBuf {
    let path = dir.path().join(name);
    let text = GraphDocument::homogeneous(num_nodes, pairs)
        .to_json_pretty()
        .unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

fn run_json(path: &PathBuf, args: &[&str]) -> Value {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heterograph"));
    cmd.arg("--input").arg(path).args(args);
    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    serde_json::from_str(stdout.trim()).expect("json")
}

#[test]
fn help_lists_commands() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heterograph"));
    let assert = cmd.arg("--help").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(stdout.contains("khop --k N"));
    assert!(stdout.contains("partition --parts IDS"));
}

#[test]
fn inspect_is_the_default_command() {
    let dir = TempDir::new().unwrap();
    let path = write_graph(&dir, "g.json", 4, &[(0, 1), (0, 1), (2, 2)]);
    let value = run_json(&path, &[]);
    assert_eq!(value["command"], Value::from("inspect"));
    assert_eq!(value["node_counts"], serde_json::json!([4]));
    assert_eq!(value["is_multigraph"], Value::Bool(true));
    assert_eq!(value["report"]["parallel_edges"], Value::from(1));
    assert_eq!(value["report"]["self_loops"], Value::from(1));
    assert_eq!(value["report"]["isolated_nodes"], Value::from(1));
}

#[test]
fn simple_reports_multiplicities() {
    let dir = TempDir::new().unwrap();
    let path = write_graph(&dir, "g.json", 3, &[(1, 2), (0, 1), (0, 1)]);
    let value = run_json(&path, &["--command", "simple"]);
    let edges = &value["graph"]["edge_types"][0];
    assert_eq!(edges["src"], serde_json::json!([0, 1]));
    assert_eq!(edges["dst"], serde_json::json!([1, 2]));
    assert_eq!(edges["features"]["count"]["values"], serde_json::json!([2, 1]));
}

#[test]
fn khop_takes_hop_count() {
    let dir = TempDir::new().unwrap();
    let path = write_graph(&dir, "g.json", 3, &[(0, 1), (1, 2)]);
    let value = run_json(&path, &["khop", "--k", "2"]);
    let edges = &value["graph"]["edge_types"][0];
    assert_eq!(edges["src"], serde_json::json!([0]));
    assert_eq!(edges["dst"], serde_json::json!([2]));
}

#[test]
fn partition_emits_one_graph_per_label() {
    let dir = TempDir::new().unwrap();
    let path = write_graph(&dir, "g.json", 4, &[(0, 1), (1, 2), (2, 3), (3, 0), (1, 0)]);
    let value = run_json(&path, &["partition", "--parts", "0,0,1,1", "--hops", "1"]);
    let p0 = &value["partitions"]["0"];
    assert_eq!(p0["node_types"][0]["num_nodes"], Value::from(3));
    assert_eq!(
        p0["node_types"][0]["features"]["_ID"]["values"],
        serde_json::json!([0, 1, 3])
    );
    assert!(value["partitions"]["1"].is_object());
}

#[test]
fn missing_input_exits_with_usage_error() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heterograph"));
    cmd.args(["--command", "inspect"]).assert().code(2);
}

#[test]
fn unknown_command_exits_with_usage_error() {
    let dir = TempDir::new().unwrap();
    let path = write_graph(&dir, "g.json", 2, &[(0, 1)]);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heterograph"));
    cmd.arg("--input").arg(&path).arg("frobnicate").assert().code(2);
}

#[test]
fn strict_check_fails_on_multigraph() {
    let dir = TempDir::new().unwrap();
    let path = write_graph(&dir, "g.json", 2, &[(0, 1), (0, 1)]);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heterograph"));
    cmd.arg("--input").arg(&path).args(["--command", "check"]).assert().code(1);

    let simple = write_graph(&dir, "simple.json", 2, &[(0, 1)]);
    let value = run_json(&simple, &["check"]);
    assert_eq!(value["report"]["parallel_edges"], Value::from(0));
}

#[test]
fn malformed_document_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_heterograph"));
    cmd.arg("--input").arg(&path).assert().code(1);
}

#[test]
fn arguments_after_the_command_belong_to_it() {
    let args = ["heterograph", "--input", "g.json", "khop", "--k", "3"];
    let config = CommandLineConfig::from_args(&args).unwrap();
    assert_eq!(config.input.as_deref(), Some("g.json"));
    assert_eq!(config.command, "khop");
    assert_eq!(config.command_args, vec!["--k".to_string(), "3".to_string()]);
    assert!(CommandLineConfig::from_args(&["heterograph", "--bogus"]).is_err());
}

#[test]
fn handle_command_validates_flags() {
    let g = HeteroGraph::homogeneous(3, &[(0, 1)]).unwrap();
    assert!(handle_command(&g, "khop", &[]).is_err());
    assert!(handle_command(&g, "in-subgraph", &["--nodes".into(), "0,x".into()]).is_err());
    assert_eq!(handle_command(&g, "nope", &[]).unwrap(), None);
    let out = handle_command(&g, "in-subgraph", &["--nodes".into(), "1".into()])
        .unwrap()
        .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["graph"]["edge_types"][0]["src"], serde_json::json!([0]));
}

#[test]
fn metapath_steps_accept_canonical_triples() {
    let g = HeteroGraph::bipartite("user", "plays", "game", (2, 2), &[(0, 1)]).unwrap();
    let out = handle_command(&g, "metapath", &["--path".into(), "user:plays:game".into()])
        .unwrap()
        .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["graph"]["edge_types"][0]["src"], serde_json::json!([0]));
    assert_eq!(value["graph"]["edge_types"][0]["dst"], serde_json::json!([1]));
    assert!(handle_command(&g, "metapath", &["--path".into(), "user:plays".into()]).is_err());
}
