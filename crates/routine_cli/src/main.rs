use clap::Parser;
use routine_cli::cli::{Cli, Command, collect_overrides, frequency_from_flags, parse_today};
use routine_core::config::{Config, Palette, load_config_with_fallback, merge_overrides};
use routine_core::error::AppError;
use routine_core::format::{completion_label, format_duration, frequency_label, parse_duration};
use routine_core::model::{Frequency, Routine};
use routine_core::routine_api::{self, NewRoutine, RoutineEdit, RoutineOverview};
use tabled::{Table, Tabled};
use time::Date;
use tracing_subscriber::EnvFilter;

#[derive(Tabled)]
struct RoutineRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "SCHEDULE")]
    schedule: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PROGRESS")]
    progress: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_label(percent: f64) -> String {
    format!("{}%", percent.round() as i64)
}

fn routine_json(routine: &Routine) -> serde_json::Value {
    serde_json::json!({
        "id": routine.id,
        "name": routine.name,
        "frequency": routine.frequency,
        "color": routine.color,
        "completions": routine.completions,
    })
}

fn overview_json(overview: &RoutineOverview) -> serde_json::Value {
    let mut value = routine_json(&overview.routine);
    value["next_due_date"] = serde_json::json!(
        overview
            .status
            .next_due_date
            .map(|date| date.to_string())
    );
    value["progress_percent"] = serde_json::json!(overview.status.progress_percent);
    value["is_completed_today"] = serde_json::json!(overview.status.is_completed_today);
    value["status"] = serde_json::json!(overview.due.code());
    value["status_label"] = serde_json::json!(overview.due.to_string());
    value
}

fn print_overview_plain(overview: &RoutineOverview, palette: &Palette) {
    let routine = &overview.routine;
    println!("{} ({})", routine.name, routine.id);
    println!("  schedule: {}", frequency_label(&routine.frequency));
    println!("  status:   {}", palette.paint_status(overview.due));
    println!(
        "  progress: {}",
        progress_label(overview.status.progress_percent)
    );
    let next_due = overview
        .status
        .next_due_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("  next due: {next_due}");

    if routine.completions.is_empty() {
        println!("  history:  none");
        return;
    }

    let tracked: u64 = routine
        .completions
        .iter()
        .filter_map(|completion| completion.duration)
        .sum();
    println!(
        "  history:  {} completions, {} tracked",
        routine.completions.len(),
        format_duration(tracked)
    );
    for completion in &routine.completions {
        println!("    {}", completion_label(completion));
    }
}

fn print_list_plain(overviews: &[RoutineOverview]) {
    if overviews.is_empty() {
        println!("No routines yet. Add one with `routine add`.");
        return;
    }

    let rows = overviews.iter().map(|overview| RoutineRow {
        id: overview.routine.id.clone(),
        name: overview.routine.name.clone(),
        schedule: frequency_label(&overview.routine.frequency),
        status: overview.due.to_string(),
        progress: progress_label(overview.status.progress_percent),
    });
    println!("{}", Table::new(rows));
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn resolve_config(cli: &Cli) -> Result<Config, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: config ignored: {err}");
    }
    let overrides = collect_overrides(&cli.config_override)?;
    Ok(merge_overrides(&loaded.config, &overrides))
}

fn resolve_today(cli: &Cli) -> Result<Date, AppError> {
    match cli.today.as_deref() {
        Some(raw) => parse_today(raw),
        None => Ok(routine_api::today_local()),
    }
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli)?;
    let palette = config.theme.palette();
    let today = resolve_today(&cli)?;
    tracing::debug!(%today, theme = ?config.theme, "resolved reference day");

    match &cli.command {
        Command::Add {
            name,
            days,
            every,
            color,
        } => {
            let name = match name {
                Some(value) if !value.trim().is_empty() => value.clone(),
                _ => return Err(AppError::invalid_input("name is required")),
            };
            let frequency = frequency_from_flags(days, *every)?.unwrap_or(Frequency::Interval {
                days: config.default_interval_days(),
            });
            let routine = routine_api::add_routine(NewRoutine {
                name,
                frequency,
                color: Some(
                    color
                        .clone()
                        .unwrap_or_else(|| config.default_color().to_string()),
                ),
            })?;
            if cli.json {
                println!("{}", routine_json(&routine));
            } else {
                println!("Added routine: {} ({})", routine.name, routine.id);
            }
        }
        Command::Edit {
            id,
            name,
            days,
            every,
            color,
        } => {
            let routine = routine_api::edit_routine(
                id,
                RoutineEdit {
                    name: name.clone(),
                    frequency: frequency_from_flags(days, *every)?,
                    color: color.clone(),
                },
            )?;
            if cli.json {
                println!("{}", routine_json(&routine));
            } else {
                println!("Updated routine: {} ({})", routine.name, routine.id);
            }
        }
        Command::Delete { id } => {
            let routine = routine_api::delete_routine(id)?;
            if cli.json {
                println!("{}", routine_json(&routine));
            } else {
                println!("Deleted routine: {} ({})", routine.name, routine.id);
            }
        }
        Command::Show { id } => {
            let overview = routine_api::get_routine(id, today)?;
            if cli.json {
                println!("{}", overview_json(&overview));
            } else {
                print_overview_plain(&overview, &palette);
            }
        }
        Command::Done { id, duration } => {
            let duration = duration.as_deref().map(parse_duration).transpose()?;
            match routine_api::complete_routine(id, today, duration) {
                Ok(overview) => {
                    if cli.json {
                        println!("{}", overview_json(&overview));
                    } else {
                        let routine = &overview.routine;
                        let next_due = overview
                            .status
                            .next_due_date
                            .map(|date| date.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        println!(
                            "Completed routine: {} ({}), next due {}",
                            routine.name, routine.id, next_due
                        );
                    }
                }
                Err(AppError::AlreadyCompleted { date }) => {
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::json!({
                                "id": id.trim(),
                                "already_completed": true,
                                "date": date.to_string(),
                            })
                        );
                    } else {
                        println!("Already completed on {date}: {}", id.trim());
                    }
                }
                Err(err) => return Err(err),
            }
        }
        Command::List => {
            let overviews = routine_api::list_routines(today)?;
            if cli.json {
                let payload: Vec<serde_json::Value> = overviews.iter().map(overview_json).collect();
                println!("{}", serde_json::Value::Array(payload));
            } else {
                print_list_plain(&overviews);
            }
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
