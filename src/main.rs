use std::collections::HashSet;
use std::env;

use pathq_core::{
    BfsResult, Cfg, CfpqAlgorithm, LabeledGraph, MatrixBackend, RpqMode, Value, cfpq, rpq_bfs,
    rpq_tensor,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let constraint = match args.next() {
        Some(s) => s,
        None => {
            eprintln!("Usage: pathq <regex | @grammar-file> <edge>...");
            eprintln!("  edge format: from,label,to (empty label = ε)");
            eprintln!("  with @grammar-file the constraint is a CFG evaluated from S");
            return;
        }
    };

    let mut graph = LabeledGraph::new();
    for edge in args {
        let parts: Vec<&str> = edge.splitn(3, ',').collect();
        let [from, label, to] = parts.as_slice() else {
            eprintln!("Bad edge {edge:?}, expected from,label,to");
            return;
        };
        graph.add_edge(vertex(from), *label, vertex(to));
    }

    let info = graph.info();
    println!(
        "Graph: nodes={} edges={} labels={:?}",
        info.node_count, info.edge_count, info.labels
    );

    if let Some(path) = constraint.strip_prefix('@') {
        run_cfpq(path, &graph);
    } else {
        run_rpq(&constraint, &graph);
    }
}

fn run_cfpq(path: &str, graph: &LabeledGraph) {
    let grammar = match Cfg::from_file(path, "S") {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("Grammar error: {e}");
            return;
        }
    };
    for algo in [
        CfpqAlgorithm::Hellings,
        CfpqAlgorithm::Matrix,
        CfpqAlgorithm::Tensor,
    ] {
        match cfpq(algo, graph, &grammar, None, None, "S") {
            Ok(pairs) => println!("{algo:?}: {}", render_pairs(&pairs)),
            Err(e) => eprintln!("{algo:?} failed: {e}"),
        }
    }
}

fn run_rpq(pattern: &str, graph: &LabeledGraph) {
    match rpq_tensor(graph, pattern, None, None, MatrixBackend::Cpu) {
        Ok(pairs) => println!("Tensor RPQ: {}", render_pairs(&pairs)),
        Err(e) => {
            eprintln!("Query error: {e}");
            return;
        }
    }
    match rpq_bfs(
        graph,
        pattern,
        None,
        None,
        RpqMode::FindAllReachable,
        MatrixBackend::Cpu,
    ) {
        Ok(BfsResult::All(reached)) => {
            let mut reached: Vec<String> = reached.iter().map(ToString::to_string).collect();
            reached.sort();
            println!("BFS RPQ reachable: {{{}}}", reached.join(", "));
        }
        Ok(BfsResult::PerSource(_)) => unreachable!("aggregate mode requested"),
        Err(e) => eprintln!("Query error: {e}"),
    }
}

fn vertex(token: &str) -> Value {
    match token.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => Value::Str(token.to_owned()),
    }
}

fn render_pairs(pairs: &HashSet<(Value, Value)>) -> String {
    let mut rendered: Vec<String> = pairs.iter().map(|(u, v)| format!("({u}, {v})")).collect();
    rendered.sort();
    format!("{{{}}}", rendered.join(", "))
}
