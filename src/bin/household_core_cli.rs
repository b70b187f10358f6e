use std::{env, fs, path::PathBuf, process};

use chrono::{DateTime, Utc};
use colored::Colorize;

use household_core::{
    config::{ConfigManager, EngineConfig},
    core::services::{BalanceService, HouseholdSummary, SummaryService},
    currency::{format_amount, format_pimpers},
    domain::{Displayable, Household, MemberId},
    errors::EngineError,
    init,
};

const USAGE: &str = "usage: household_core_cli <report|settle> <snapshot.json> [--config <file>] [--at <rfc3339>]";
const CONFIG_ENV: &str = "HOUSEHOLD_CORE_CONFIG";

struct Args {
    command: String,
    snapshot: PathBuf,
    config: Option<PathBuf>,
    at: Option<DateTime<Utc>>,
}

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), EngineError> {
    let args = parse_args(env::args().skip(1).collect())?;
    let config = load_config(args.config.as_ref())?;
    let data = fs::read_to_string(&args.snapshot)?;
    let household: Household = serde_json::from_str(&data)?;
    household.validate()?;
    tracing::debug!(
        members = household.members.len(),
        tasks = household.tasks.len(),
        "snapshot loaded"
    );

    match args.command.as_str() {
        "report" => {
            let now = args.at.unwrap_or_else(Utc::now);
            let summary = SummaryService::summarize(&household, &config, now);
            print_report(&household, &config, &summary);
        }
        "settle" => {
            let plan = BalanceService::settlement(&household);
            print_transfers(&household, &config, &plan.transfers);
        }
        other => {
            return Err(EngineError::Usage(format!(
                "unknown command `{other}`\n{USAGE}"
            )))
        }
    }
    Ok(())
}

fn parse_args(raw: Vec<String>) -> Result<Args, EngineError> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut at = None;
    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or_else(|| missing_value("--config"))?;
                config = Some(PathBuf::from(value));
            }
            "--at" => {
                let value = iter.next().ok_or_else(|| missing_value("--at"))?;
                let parsed = DateTime::parse_from_rfc3339(&value).map_err(|err| {
                    EngineError::Usage(format!("invalid --at timestamp `{value}`: {err}"))
                })?;
                at = Some(parsed.with_timezone(&Utc));
            }
            _ => positional.push(arg),
        }
    }
    let mut positional = positional.into_iter();
    let (Some(command), Some(snapshot)) = (positional.next(), positional.next()) else {
        return Err(EngineError::Usage(USAGE.to_string()));
    };
    Ok(Args {
        command,
        snapshot: PathBuf::from(snapshot),
        config,
        at,
    })
}

fn missing_value(flag: &str) -> EngineError {
    EngineError::Usage(format!("{flag} expects a value\n{USAGE}"))
}

fn load_config(explicit: Option<&PathBuf>) -> Result<EngineConfig, EngineError> {
    let manager = match explicit {
        Some(path) => ConfigManager::with_path(path),
        None => match env::var_os(CONFIG_ENV) {
            Some(path) => ConfigManager::with_path(PathBuf::from(path)),
            None => ConfigManager::new(),
        },
    };
    manager.load()
}

fn display_name(household: &Household, id: &MemberId) -> String {
    household.label_for(id)
}

fn print_report(household: &Household, config: &EngineConfig, summary: &HouseholdSummary) {
    let title = if household.name.is_empty() {
        "Household".to_string()
    } else {
        household.name.clone()
    };
    println!("{}", title.bold());

    println!("\n{}", "Balances".underline());
    for (id, balance) in &summary.balances {
        let rendered = format_amount(*balance, &config.currency, &config.locale);
        let rendered = if *balance > 0.0 {
            rendered.green()
        } else if *balance < 0.0 {
            rendered.red()
        } else {
            rendered.normal()
        };
        println!("  {:<16} {}", display_name(household, id), rendered);
    }
    if !summary.unresolved_members.is_empty() {
        println!(
            "  ({} entries reference former members)",
            summary.unresolved_members.len()
        );
    }

    println!("\n{}", "Settlement".underline());
    print_transfers(household, config, &summary.settlement.transfers);

    println!("\n{}", "Effort".underline());
    for (id, score) in &summary.effort {
        println!(
            "  {:<16} raw {:>8}  scaled {:>8}",
            display_name(household, id),
            format_pimpers(score.raw, &config.locale),
            format_pimpers(score.scaled, &config.locale)
        );
    }

    println!("\n{}", "Rotations".underline());
    for task in &summary.rotations {
        let assignee = task
            .assignee_id
            .as_ref()
            .map(|id| display_name(household, id))
            .unwrap_or_else(|| "-".into());
        let next = task
            .preview
            .next_assignee_id
            .as_ref()
            .map(|id| display_name(household, id))
            .unwrap_or_else(|| "-".into());
        let label = household
            .task(task.task_id)
            .map(Displayable::display_label)
            .unwrap_or_else(|| task.name.clone());
        println!(
            "  {} [{:?}] assignee {}, next {}",
            label.bold(),
            task.phase,
            assignee,
            next
        );
        for (mode, order) in &task.preview.order_by_mode {
            let names: Vec<String> = order.iter().map(|id| display_name(household, id)).collect();
            println!("    {:<10} {}", mode.to_string(), names.join(", "));
        }
    }
}

fn print_transfers(
    household: &Household,
    config: &EngineConfig,
    transfers: &[household_core::ledger::Transfer],
) {
    if transfers.is_empty() {
        println!("  All settled.");
        return;
    }
    for transfer in transfers {
        println!(
            "  {} -> {}  {}",
            display_name(household, &transfer.from),
            display_name(household, &transfer.to),
            format_amount(transfer.amount, &config.currency, &config.locale)
        );
    }
}
