//! case-runner: headless driver for the case desk.
//!
//! Usage:
//!   case-runner --seed 12345 --count 500 --step-minutes 2
//!   case-runner --config desk.json --ipc-mode

use anyhow::Result;
use casedesk_core::{
    audit::{AuditSink, LogAuditSink},
    clock::{Clock, ManualClock, SystemClock},
    command::DeskCommand,
    config::DeskConfig,
    engine::{CaseEngine, CommandResult},
    stream::TransactionStream,
};
use chrono::{Duration, Utc};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Command { command: DeskCommand },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let count = parse_arg(&args, "--count", 500usize);
    let step_minutes = parse_arg(&args, "--step-minutes", 2i64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => DeskConfig::load(path)?,
        None => DeskConfig::default(),
    };

    let audit: Arc<dyn AuditSink> = Arc::new(LogAuditSink);
    let (engine, _roster) = CaseEngine::build(&config, audit)?;

    if ipc_mode {
        run_ipc_loop(&engine, &SystemClock)?;
    } else {
        println!("Case desk: case-runner");
        println!("  seed:        {seed}");
        println!("  count:       {count}");
        println!("  step:        {step_minutes} min");
        println!(
            "  thresholds:  orange={} red={}",
            config.thresholds.orange(),
            config.thresholds.red()
        );
        println!("  analysts:    {}", config.roster.len());
        println!();
        run_stream(&engine, seed, count, step_minutes)?;
    }

    Ok(())
}

fn run_stream(engine: &CaseEngine, seed: u64, count: usize, step_minutes: i64) -> Result<()> {
    let start = Utc::now();
    let clock = ManualClock::new(start);
    let stream = TransactionStream::new(seed, start)
        .with_step(Duration::minutes(step_minutes))
        .with_resubmit_probability(0.1);

    let mut at_red = 0usize;
    for tx in stream.take(count) {
        clock.set(tx.timestamp);
        if engine.ingest(&tx, clock.now())?.is_some() {
            at_red += 1;
        }
        engine.assign_pending(clock.now())?;
    }

    print_summary(engine, &clock, count, at_red)
}

fn run_ipc_loop(engine: &CaseEngine, clock: &dyn Clock) -> Result<()> {
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
        if buffer.trim().is_empty() {
            continue;
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match request {
            IpcRequest::Quit => break,
            IpcRequest::GetState => {
                let snapshot = engine.snapshot(clock.now())?;
                writeln!(stdout, "{}", serde_json::to_string(&snapshot)?)?;
            }
            IpcRequest::Command { command } => match engine.apply(command, clock.now()) {
                Ok(result) => {
                    let body = result_json(result)?;
                    writeln!(stdout, "{body}")?;
                }
                Err(e) => {
                    log::warn!("ipc command failed: {e}");
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            },
        }
        stdout.flush()?;
    }
    Ok(())
}

fn result_json(result: CommandResult) -> Result<serde_json::Value> {
    let value = match result {
        CommandResult::Case(case) => serde_json::json!({ "case": case }),
        CommandResult::Note(note) => serde_json::json!({ "note": note }),
        CommandResult::Thresholds(t) => serde_json::json!({ "thresholds": t }),
        CommandResult::Assigned(cases) => serde_json::json!({ "assigned": cases }),
    };
    Ok(value)
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    writeln!(out, "{}", serde_json::json!({ "error": message }))?;
    out.flush()?;
    Ok(())
}

fn print_summary(engine: &CaseEngine, clock: &ManualClock, count: usize, at_red: usize) -> Result<()> {
    let now = clock.now();
    let summary = engine.queue_summary(now)?;
    let total_cases = engine.list_cases()?.len();

    println!("=== RUN SUMMARY ===");
    println!("  transactions:   {count}");
    println!("  RED evaluations: {at_red}");
    println!("  cases on desk:  {total_cases}");
    println!("  open:           {}", summary.open);
    println!("  unassigned:     {}", summary.unassigned);
    println!("  due soon:       {}", summary.due_soon);
    println!("  overdue:        {}", summary.overdue);
    println!("  avg SLA left:   {} min", summary.avg_sla_minutes);

    println!();
    println!("=== ANALYST WORKLOAD ===");
    for w in engine.analyst_workload(now)? {
        println!(
            "  {} ({}) | active: {} | due soon: {} | overdue: {} | cost: {}",
            w.analyst_id,
            w.tier,
            w.active,
            w.due_soon,
            w.overdue,
            w.cost()
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
