use serde_json::{Map, Value, json};

use crate::{
    bidirected::to_bidirected,
    compact::compact_graphs,
    config::TransformConfig,
    document::GraphDocument,
    errors::GraphIndexError,
    frame::FrameSharing,
    graph::{HeteroGraph, NodeSelection},
    khop::{khop_adj, khop_graph},
    line_graph::line_graph,
    metapath::metapath_reachable_graph,
    partition::partition_graph_with_halo,
    reverse::reverse,
    safety::{IndexReport, inspect_index, run_strict_checks},
    schema::{CanonicalEdgeType, EdgeTypeKey},
    self_loop::{add_self_loop, remove_self_loop},
    simple::to_simple,
    subgraph::{in_subgraph, node_subgraph, out_subgraph},
};

/// Key under which `simple` stores edge multiplicities.
pub const COUNT_KEY: &str = "count";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub input: Option<String>,
    pub command: String,
    pub command_args: Vec<String>,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut input = None;
        let mut command = String::from("inspect");
        let mut command_args = Vec::new();
        let mut command_set = false;
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            if command_set && *arg != "--input" {
                command_args.push(arg.to_string());
                continue;
            }
            match *arg {
                "--input" => {
                    input = Some(
                        iter.next()
                            .ok_or_else(|| "--input requires a value".to_string())?
                            .to_string(),
                    );
                }
                "--command" => {
                    command = iter
                        .next()
                        .ok_or_else(|| "--command requires a value".to_string())?
                        .to_string();
                    command_set = true;
                }
                other if other.starts_with('-') => {
                    return Err(format!("unknown flag {other}"));
                }
                _ => {
                    command = arg.to_string();
                    command_set = true;
                }
            }
        }
        Ok(Self {
            input,
            command,
            command_args,
        })
    }

    pub fn help() -> &'static str {
        "Usage: heterograph --input PATH [--command NAME] [command flags]\n\
         Commands:\n\
         \x20 inspect | check\n\
         \x20 khop --k N | khop-adj --k N\n\
         \x20 simple | bidirect | reverse | add-self-loop | remove-self-loop\n\
         \x20 compact [--preserve IDS]\n\
         \x20 in-subgraph --nodes IDS | out-subgraph --nodes IDS | node-subgraph --nodes IDS\n\
         \x20 partition --parts IDS [--hops N]\n\
         \x20 line-graph [--backtracking true|false]\n\
         \x20 metapath --path STEP,STEP,... (STEP is REL or SRC:REL:DST)\n\
         IDS is a comma separated list of node ids; RUST_LOG controls logging on stderr.\n"
    }
}

/// Runs `command` on `graph` and returns its JSON output, or `None` for an
/// unknown command.
pub fn handle_command(
    graph: &HeteroGraph,
    command: &str,
    args: &[String],
) -> Result<Option<String>, GraphIndexError> {
    let config = TransformConfig::from_env();
    let object = match command {
        "inspect" => run_inspect(graph)?,
        "check" => run_check(graph)?,
        "khop" => {
            let k = parse_required_u32(args, "--k")?;
            graph_output(command, &khop_graph(graph, k)?)?
        }
        "khop-adj" => run_khop_adj(graph, &config, args)?,
        "simple" => graph_output(command, &to_simple(graph, Some(COUNT_KEY), None)?)?,
        "bidirect" => graph_output(command, &to_bidirected(graph, config.readonly())?)?,
        "reverse" => graph_output(command, &reverse(graph, FrameSharing::none())?)?,
        "add-self-loop" => graph_output(command, &add_self_loop(graph)?)?,
        "remove-self-loop" => graph_output(command, &remove_self_loop(graph)?)?,
        "compact" => run_compact(graph, args)?,
        "in-subgraph" => {
            let nodes = NodeSelection::from(parse_required_ids(args, "--nodes")?);
            graph_output(command, &in_subgraph(graph, &nodes)?)?
        }
        "out-subgraph" => {
            let nodes = NodeSelection::from(parse_required_ids(args, "--nodes")?);
            graph_output(command, &out_subgraph(graph, &nodes)?)?
        }
        "node-subgraph" => {
            let nodes = NodeSelection::from(parse_required_ids(args, "--nodes")?);
            graph_output(command, &node_subgraph(graph, &nodes)?)?
        }
        "partition" => run_partition(graph, args)?,
        "line-graph" => {
            let backtracking = parse_optional_bool(args, "--backtracking")?.unwrap_or(true);
            graph_output(command, &line_graph(graph, backtracking, false)?)?
        }
        "metapath" => run_metapath(graph, args)?,
        _ => return Ok(None),
    };
    encode(object).map(Some)
}

fn run_inspect(graph: &HeteroGraph) -> Result<Map<String, Value>, GraphIndexError> {
    let report = inspect_index(graph.index())?;
    let mut object = Map::new();
    object.insert("command".into(), Value::String("inspect".into()));
    object.insert("ntypes".into(), json!(graph.ntypes()));
    object.insert(
        "etypes".into(),
        json!(
            graph
                .canonical_etypes()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        ),
    );
    object.insert("node_counts".into(), json!(graph.index().node_counts()));
    object.insert("readonly".into(), json!(graph.is_readonly()));
    object.insert("is_multigraph".into(), json!(graph.index().is_multigraph()));
    object.insert("report".into(), report_to_value(&report));
    Ok(object)
}

fn run_check(graph: &HeteroGraph) -> Result<Map<String, Value>, GraphIndexError> {
    let report = run_strict_checks(graph.index()).map_err(|err| match err.source {
        Some(source) => source,
        None => invalid(err.to_string()),
    })?;
    let mut object = Map::new();
    object.insert("command".into(), Value::String("check".into()));
    object.insert("report".into(), report_to_value(&report));
    Ok(object)
}

fn run_khop_adj(
    graph: &HeteroGraph,
    config: &TransformConfig,
    args: &[String],
) -> Result<Map<String, Value>, GraphIndexError> {
    let k = parse_required_u32(args, "--k")?;
    let backend = config.create_backend()?;
    let dense = khop_adj(backend.as_ref(), graph, k)?;
    let rows: Vec<&[f32]> = (0..dense.rows()).map(|row| dense.row(row)).collect();
    let mut object = Map::new();
    object.insert("command".into(), Value::String("khop-adj".into()));
    object.insert("backend".into(), Value::String(backend.name().into()));
    object.insert("k".into(), json!(k));
    object.insert("matrix".into(), json!(rows));
    Ok(object)
}

fn run_compact(graph: &HeteroGraph, args: &[String]) -> Result<Map<String, Value>, GraphIndexError> {
    let preserve = match value(args, "--preserve") {
        Some(raw) => Some(NodeSelection::from(parse_ids(&raw, "--preserve")?)),
        None => None,
    };
    let mut compacted = compact_graphs(std::slice::from_ref(graph), preserve.as_ref())?;
    let result = compacted
        .pop()
        .ok_or_else(|| invalid("compaction produced no graph"))?;
    graph_output("compact", &result)
}

fn run_partition(graph: &HeteroGraph, args: &[String]) -> Result<Map<String, Value>, GraphIndexError> {
    let parts = parse_required_ids(args, "--parts")?;
    let hops = parse_optional_usize(args, "--hops")?.unwrap_or(1);
    let partitions = partition_graph_with_halo(graph, &parts, hops)?;
    let mut encoded = Map::new();
    for (part, subgraph) in &partitions {
        encoded.insert(part.to_string(), document_value(subgraph)?);
    }
    let mut object = Map::new();
    object.insert("command".into(), Value::String("partition".into()));
    object.insert("hops".into(), json!(hops));
    object.insert("partitions".into(), Value::Object(encoded));
    Ok(object)
}

/// Steps are relation names or `src:relation:dst` triples.
fn run_metapath(graph: &HeteroGraph, args: &[String]) -> Result<Map<String, Value>, GraphIndexError> {
    let path = required_value(args, "--path")?;
    let steps: Vec<&str> = path.split(',').map(str::trim).collect();
    let canonical = steps
        .iter()
        .map(|step| parse_canonical(step))
        .collect::<Result<Vec<_>, _>>()?;
    let keys: Vec<EdgeTypeKey<'_>> = steps
        .iter()
        .zip(&canonical)
        .map(|(&step, etype)| match etype {
            Some(etype) => EdgeTypeKey::Canonical(etype),
            None => EdgeTypeKey::Relation(step),
        })
        .collect();
    graph_output("metapath", &metapath_reachable_graph(graph, &keys)?)
}

fn parse_canonical(step: &str) -> Result<Option<CanonicalEdgeType>, GraphIndexError> {
    if !step.contains(':') {
        return Ok(None);
    }
    match step.split(':').collect::<Vec<_>>().as_slice() {
        [src, relation, dst] => Ok(Some(CanonicalEdgeType::new(*src, *relation, *dst))),
        _ => Err(invalid(format!("--path step {step} is not src:relation:dst"))),
    }
}

fn graph_output(command: &str, graph: &HeteroGraph) -> Result<Map<String, Value>, GraphIndexError> {
    let mut object = Map::new();
    object.insert("command".into(), Value::String(command.into()));
    object.insert("graph".into(), document_value(graph)?);
    Ok(object)
}

fn document_value(graph: &HeteroGraph) -> Result<Value, GraphIndexError> {
    let document = GraphDocument::from_graph(graph)?;
    serde_json::to_value(document).map_err(|e| GraphIndexError::serialization(e.to_string()))
}

fn report_to_value(report: &IndexReport) -> Value {
    let mut inner = Map::new();
    inner.insert("total_nodes".into(), json!(report.total_nodes));
    inner.insert("total_edges".into(), json!(report.total_edges));
    inner.insert("parallel_edges".into(), json!(report.parallel_edges));
    inner.insert("self_loops".into(), json!(report.self_loops));
    inner.insert("isolated_nodes".into(), json!(report.isolated_nodes));
    Value::Object(inner)
}

fn parse_required_u32(args: &[String], flag: &str) -> Result<u32, GraphIndexError> {
    let value = required_value(args, flag)?;
    value
        .parse::<u32>()
        .map_err(|_| invalid(format!("{flag} expects a non-negative integer")))
}

fn parse_optional_usize(args: &[String], flag: &str) -> Result<Option<usize>, GraphIndexError> {
    value(args, flag)
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| invalid(format!("{flag} expects a non-negative integer")))
        })
        .transpose()
}

fn parse_optional_bool(args: &[String], flag: &str) -> Result<Option<bool>, GraphIndexError> {
    value(args, flag)
        .map(|raw| {
            raw.parse::<bool>()
                .map_err(|_| invalid(format!("{flag} expects true or false")))
        })
        .transpose()
}

fn parse_required_ids(args: &[String], flag: &str) -> Result<Vec<usize>, GraphIndexError> {
    parse_ids(&required_value(args, flag)?, flag)
}

fn parse_ids(raw: &str, flag: &str) -> Result<Vec<usize>, GraphIndexError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| invalid(format!("{flag} expects comma separated ids, got {part}")))
        })
        .collect()
}

fn required_value(args: &[String], flag: &str) -> Result<String, GraphIndexError> {
    value(args, flag).ok_or_else(|| invalid(format!("missing {flag}")))
}

fn value(args: &[String], flag: &str) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == flag {
            return iter.next().cloned();
        }
    }
    None
}

fn encode(object: Map<String, Value>) -> Result<String, GraphIndexError> {
    serde_json::to_string(&Value::Object(object))
        .map_err(|e| GraphIndexError::serialization(format!("cli output: {e}")))
}

fn invalid<T: Into<String>>(message: T) -> GraphIndexError {
    GraphIndexError::invalid_argument(message)
}
