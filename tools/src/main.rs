//! sim-runner: headless runner for the two-player resource race.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 500 --grid 40x40 --spacing 50 --stops 97
//!   sim-runner --graph city.json --policy policy.json --narrative "..."
//!   sim-runner --grid 20x20 --ipc-mode

use anyhow::{Context, Result};
use faithsim_core::{
    config::SimConfig,
    engine::SimEngine,
    entity::PlayerName,
    graph::SpatialGraph,
    policy::PolicyParameters,
    provider::{FixedPolicy, JsonFilePolicy, PolicyProvider},
    snapshot::SimSnapshot,
    types::NodeId,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    #[serde(flatten)]
    snapshot: SimSnapshot,
    stats:    faithsim_core::engine::RunStats,
    narrative: &'a str,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 500u64);
    let spacing = parse_arg(&args, "--spacing", 50.0f64);
    let stop_every = parse_arg(&args, "--stops", 0u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let graph_path = flag_value(&args, "--graph");
    let grid = flag_value(&args, "--grid").unwrap_or("30x30");
    let policy_path = flag_value(&args, "--policy");
    let config_path = flag_value(&args, "--config");
    let narrative = flag_value(&args, "--narrative").unwrap_or("");

    let started_at = chrono::Utc::now();
    let run_id = format!("run-{seed}-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);

    let graph = match graph_path {
        Some(path) => SpatialGraph::load(path)?,
        None => build_grid(grid, spacing, stop_every)?,
    };

    let provider: Box<dyn PolicyProvider> = match policy_path {
        Some(path) => Box::new(JsonFilePolicy::new(path)),
        None => Box::new(FixedPolicy(PolicyParameters::default())),
    };
    let policy = provider.resolve(narrative)?;

    let config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if !ipc_mode {
        println!("Resource race: sim-runner");
        println!("  run_id:     {run_id}");
        println!("  started:    {}", started_at.to_rfc3339());
        println!("  seed:       {seed}");
        println!("  ticks:      {ticks}");
        println!("  nodes:      {}", graph.node_count());
        println!("  stops:      {}", graph.transit_stops().len());
        if !narrative.is_empty() {
            println!("  narrative:  {narrative}");
        }
        println!();
    }

    let mut engine = SimEngine::build(run_id.clone(), seed, Arc::new(graph), policy, config)?;

    if ipc_mode {
        run_ipc_loop(&mut engine, narrative)?;
    } else {
        let interval = engine.config().snapshot_interval;
        for _ in 0..ticks {
            engine.step()?;
            if engine.current_tick().is_multiple_of(interval) {
                print_progress(&engine);
            }
        }
        print_summary(&engine, started_at)?;
    }

    Ok(())
}

/// `--grid 40x30` → 40 columns, 30 rows. Every `stop_every`-th node
/// becomes a transit stop (0 = none).
fn build_grid(spec: &str, spacing: f64, stop_every: u64) -> Result<SpatialGraph> {
    let (cols, rows) = spec
        .split_once('x')
        .and_then(|(c, r)| Some((c.parse::<u64>().ok()?, r.parse::<u64>().ok()?)))
        .with_context(|| format!("--grid expects <cols>x<rows>, got {spec}"))?;
    let graph = SpatialGraph::grid(cols, rows, spacing)?;
    if stop_every == 0 {
        return Ok(graph);
    }
    let stops: Vec<NodeId> = graph
        .nodes()
        .iter()
        .copied()
        .filter(|n| n.0 % stop_every == 0)
        .collect();
    Ok(graph.with_transit_stops(stops)?)
}

fn run_ipc_loop(engine: &mut SimEngine, narrative: &str) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::Tick { count } => {
                engine.run_ticks(count)?;
                write_state(&mut stdout, engine, narrative)?;
            }
            IpcCommand::GetState => {
                write_state(&mut stdout, engine, narrative)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_state(out: &mut impl Write, engine: &SimEngine, narrative: &str) -> Result<()> {
    let state = UiState {
        snapshot: engine.snapshot(),
        stats: engine.stats(),
        narrative,
    };
    writeln!(out, "{}", serde_json::to_string(&state)?)?;
    Ok(())
}

fn print_progress(engine: &SimEngine) {
    let a = engine.player(PlayerName::A);
    let b = engine.player(PlayerName::B);
    println!(
        "  tick {:>6} | A {:>6} w={:<5} | B {:>6} w={:<5} | live {}",
        engine.current_tick(),
        a.node.to_string(),
        a.wealth,
        b.node.to_string(),
        b.wealth,
        engine.resources().len()
    );
}

fn print_summary(engine: &SimEngine, started_at: chrono::DateTime<chrono::Utc>) -> Result<()> {
    let stats = engine.stats();
    let elapsed = chrono::Utc::now() - started_at;

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:      {}", engine.run_id);
    println!("  final tick:  {}", engine.current_tick());
    println!("  elapsed:     {} ms", elapsed.num_milliseconds());
    for name in PlayerName::ALL {
        let p = engine.player(name);
        println!("  player {name}:    wealth={} at {} vision={:?}", p.wealth, p.node, p.vision);
    }
    println!("  spawned:     {}", stats.spawned);
    println!("  consumed:    {}", stats.consumed);
    println!("  live:        {}", engine.resources().len());
    println!("  teleports:   {}", stats.teleports);
    println!("  stalls:      {}", stats.stalls);
    Ok(())
}

/// Malformed values fall back to `default` with a warning.
fn parse_arg<T: std::str::FromStr + Copy + std::fmt::Display>(
    args: &[String],
    flag: &str,
    default: T,
) -> T {
    match flag_value(args, flag) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("{flag}: cannot parse {raw:?}, using {default}");
            default
        }),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
