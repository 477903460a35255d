//! Outbreak Sim - Entry Point
//!
//! Terminal host for the simulation engine: picks a scenario and difficulty,
//! forwards typed commands as tool uses, and prints the final score report.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::runtime::Runtime;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use outbreak_sim::core::error::Result;
use outbreak_sim::session::AutoAdvance;
use outbreak_sim::{
    DayReport, GameConfig, HealthState, PersonId, ScoreReport, SessionController, Target, ToolId,
    ToolOutcome,
};

/// Contain an outbreak on a simulated contact network
#[derive(Parser, Debug)]
#[command(name = "outbreak-sim")]
#[command(about = "Contain an outbreak on a simulated contact network")]
struct Args {
    /// Scenario id (urban, school, festival, care, global)
    #[arg(long, default_value = "urban")]
    scenario: String,

    /// Difficulty id (easy, medium, hard)
    #[arg(long, default_value = "medium")]
    difficulty: String,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file replacing the built-in scenario tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the population size
    #[arg(long)]
    population: Option<u32>,

    /// Advance automatically every N milliseconds instead of reading commands
    #[arg(long)]
    auto: Option<u64>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// List scenarios and difficulties, then exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("outbreak_sim=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load_from_toml(path)?,
        None => GameConfig::default(),
    };
    if let Some(population) = args.population {
        config.engine.population_size = population;
    }

    if args.list {
        print_catalog(&config);
        return Ok(());
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!("Using seed {}", seed);

    let session = SessionController::new_seeded(config, &args.scenario, &args.difficulty, seed)?;
    print_briefing(&session);

    let results = match args.auto {
        Some(ms) => run_auto(session, Duration::from_millis(ms))?,
        None => run_interactive(session)?,
    };

    if args.json {
        println!("{}", results.to_json());
    } else {
        println!("\n{}", results.summary());
    }

    Ok(())
}

fn run_auto(session: SessionController, period: Duration) -> Result<ScoreReport> {
    let rt = Runtime::new()?;
    rt.block_on(async move {
        let shared = Arc::new(Mutex::new(session));
        let (auto, mut reports) = AutoAdvance::spawn(shared.clone(), period);

        while let Some(report) = reports.recv().await {
            print_day(&report);
        }
        auto.join().await;

        let session = shared.lock().await;
        session.compute_results()
    })
}

fn run_interactive(mut session: SessionController) -> Result<ScoreReport> {
    print_help();

    loop {
        display_status(&session);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();
        let Some((&command, rest)) = parts.split_first() else {
            continue;
        };

        match command {
            "quit" | "q" => break,
            "help" | "h" => print_help(),
            "briefing" => print_briefing(&session),
            "status" | "s" => display_detailed_status(&session),
            "tools" => display_tools(&session)?,
            "log" => {
                let n = rest.first().and_then(|s| s.parse().ok()).unwrap_or(10);
                for entry in session.state().action_log().tail(n) {
                    let marker = if entry.important { "*" } else { " " };
                    println!("{} Day {:>2}  {}", marker, entry.day, entry.message);
                }
            }
            "next" | "n" => {
                if advance(&mut session)? {
                    break;
                }
            }
            "run" => match rest.first().and_then(|s| s.parse::<u32>().ok()) {
                Some(n) => {
                    for _ in 0..n {
                        if advance(&mut session)? {
                            break;
                        }
                    }
                    if session.is_game_over() {
                        break;
                    }
                }
                None => println!("Usage: run <days>"),
            },
            "restart" => {
                session.restart()?;
                println!("New game started.");
                print_briefing(&session);
            }
            "vaccinate" | "v" => use_on_person(&mut session, ToolId::Vaccinate, "vaccinate", rest),
            "quarantine" | "qu" => use_on_person(&mut session, ToolId::Quarantine, "quarantine", rest),
            "test" | "t" => use_on_person(&mut session, ToolId::Test, "test", rest),
            "trace" => use_on_person(&mut session, ToolId::ContactTrace, "trace", rest),
            "sever" => match parse_ids(rest) {
                Some([a, b]) => report_outcome(
                    &mut session,
                    ToolId::SeverLink,
                    Target::Contact(PersonId(a), PersonId(b)),
                ),
                None => println!("Usage: sever <person> <person>"),
            },
            other => println!("Unknown command '{}'. Type 'help' for commands.", other),
        }
    }

    session.compute_results()
}

/// Advance one day; true when the game is over
fn advance(session: &mut SessionController) -> Result<bool> {
    let report = session.advance_day()?;
    tracing::debug!("Cues: {:?}", session.take_cues());
    print_day(&report);
    Ok(report.game_over)
}

fn use_on_person(session: &mut SessionController, tool: ToolId, command: &str, args: &[&str]) {
    match args.first().and_then(|s| s.parse::<u32>().ok()) {
        Some(id) => report_outcome(session, tool, Target::Person(PersonId(id))),
        None => println!("Usage: {} <person>", command),
    }
}

fn parse_ids(args: &[&str]) -> Option<[u32; 2]> {
    match args {
        [a, b] => Some([a.parse().ok()?, b.parse().ok()?]),
        _ => None,
    }
}

fn report_outcome(session: &mut SessionController, tool: ToolId, target: Target) {
    match session.apply_tool(tool, target) {
        Ok(ToolOutcome::Applied { message, .. }) => println!("{}", message),
        Ok(ToolOutcome::Denied(denial)) => println!("Denied: {}", denial),
        Err(e) => println!("Error: {}", e),
    }
    tracing::debug!("Cues: {:?}", session.take_cues());
}

fn print_day(report: &DayReport) {
    println!(
        "Day {}: {} new infections, {} recoveries, {} active infected{}",
        report.day,
        report.new_infections,
        report.new_recoveries,
        report.active_infected,
        if report.game_over { " - game over" } else { "" }
    );
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  next / n              - Advance to the next day");
    println!("  run <n>               - Advance n days");
    println!("  vaccinate / v <id>    - Vaccinate a healthy person");
    println!("  quarantine / qu <id>  - Quarantine a person");
    println!("  sever <a> <b>         - Sever the connection between two people");
    println!("  test / t <id>         - Test a person for infection");
    println!("  trace <id>            - List a person's active contacts");
    println!("  tools                 - Show tool availability");
    println!("  status / s            - Show detailed status");
    println!("  log [n]               - Show the last n log entries");
    println!("  briefing              - Show the scenario briefing");
    println!("  restart               - Start the scenario over");
    println!("  quit / q              - End the game and show results");
    println!();
}

fn print_catalog(config: &GameConfig) {
    println!("Scenarios:");
    for s in &config.scenarios {
        println!(
            "  {:<10} {} ({}, {} days, base rate {:.2})",
            s.id, s.name, s.topology, s.duration, s.base_transmission_rate
        );
    }
    println!("Difficulties:");
    for d in &config.difficulties {
        println!("  {:<10} {} - {}", d.id, d.name, d.description);
    }
}

fn print_briefing(session: &SessionController) {
    let scenario = &session.state().scenario;
    println!("\n=== {} ===", scenario.name.to_uppercase());
    if !scenario.role.is_empty() {
        println!("Role: {}", scenario.role);
    }
    if !scenario.description.is_empty() {
        println!("{}", scenario.description);
    }
    println!(
        "Difficulty: {} | Network: {} | Duration: {} days",
        session.state().difficulty.name,
        scenario.topology,
        scenario.duration
    );
}

fn display_status(session: &SessionController) {
    let state = session.state();
    println!(
        "[Day {}/{}] infected: {} | protected: {} | population: {}",
        state.day(),
        state.scenario.duration,
        session.active_infected(),
        state.stats().total_protected,
        session.active_population()
    );
}

fn display_detailed_status(session: &SessionController) {
    let network = session.network();
    let stats = session.state().stats();
    println!("\n=== STATUS ===");
    for health in [
        HealthState::Susceptible,
        HealthState::Exposed,
        HealthState::Infected,
        HealthState::Recovered,
        HealthState::Vaccinated,
        HealthState::Quarantined,
    ] {
        println!("  {:<12} {}", health.label(), network.count(health));
    }
    println!(
        "  Connections: {} active of {}",
        network.active_edge_count(),
        network.connections().len()
    );
    println!("  Ever infected: {}", stats.total_infected);
    println!("  Links severed: {}", stats.links_severed);
    println!("  Tests run: {}, traces run: {}", stats.tests_run, stats.traces_run);

    let infected: Vec<String> = network
        .people()
        .iter()
        .filter(|p| p.is_active() && p.health == HealthState::Infected)
        .map(|p| p.id.to_string())
        .collect();
    println!("  Known infected: {}", infected.join(", "));
    println!();
}

fn display_tools(session: &SessionController) -> Result<()> {
    for status in session.tool_status()? {
        let note = if status.available {
            String::new()
        } else if session.state().day() < status.available_day {
            format!(" (from day {})", status.available_day)
        } else {
            " (unavailable)".to_string()
        };
        println!(
            "  {:<14} {}/{}{}",
            status.tool.name(),
            status.used_today,
            status.daily_limit,
            note
        );
    }
    Ok(())
}
