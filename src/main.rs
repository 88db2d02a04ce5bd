//! Life Planner - command line front end
//!
//! Every invocation loads stored state, applies one command and writes the
//! changed slices back.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use life_planner::events::EntityType;
use life_planner::persistence::ImportPlan;
use life_planner::planner::dashboard::{self, StepUrgency};
use life_planner::planner::defaults;
use life_planner::planner::manager::today;
use life_planner::planner::{
    AddStepRequest, CommandOutcome, CreateGoalRequest, CreateTaskRequest, Frequency, Goal,
    PlannerCommand, Priority, Tab, Task, UpdateStepRequest,
};
use life_planner::{AppState, Config};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Personal life planner: goals, steps and tasks")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true, env = "PLANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    yes: bool,

    /// Print change events to stderr as JSON lines; `--events=goal,task`
    /// narrows them to entity types (goal, step, task, vision, preferences, planner)
    #[arg(long, global = true, num_args = 0.., require_equals = true, value_delimiter = ',')]
    events: Option<Vec<EntityType>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dashboard summary for the selected month
    Show,

    /// List goals with their steps
    Goals,

    /// List tasks for a month, grouped by goal
    Tasks {
        /// Zero-based month (defaults to the selected month)
        #[arg(short, long)]
        month: Option<u32>,

        /// Restrict to one area id
        #[arg(short, long)]
        area: Option<String>,
    },

    /// Create a goal; its first step is generated from the goal
    AddGoal {
        title: String,
        #[arg(short, long, default_value = "1")]
        area: String,
        #[arg(short, long)]
        deadline: NaiveDate,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        why: Option<String>,
        #[arg(long)]
        success: Option<String>,
        #[arg(short, long)]
        frequency: Option<Frequency>,
    },

    /// Append a step to a goal
    AddStep {
        goal_id: String,
        description: String,
        #[arg(short, long)]
        deadline: NaiveDate,
        #[arg(short, long)]
        priority: Option<Priority>,
    },

    /// Edit a step; omitted fields keep their value
    UpdateStep {
        goal_id: String,
        step_id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        deadline: Option<NaiveDate>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(long)]
        completed: Option<bool>,
    },

    /// Remove a step and its task
    DeleteStep { goal_id: String, step_id: String },

    /// Remove a goal and every task filed under it
    DeleteGoal { goal_id: String },

    /// Flip a goal's completion
    ToggleGoal { goal_id: String },

    /// Flip a step's completion and its task's status
    ToggleStep { goal_id: String, step_id: String },

    /// Flip a task's status and any step sharing its id
    ToggleTask { task_id: String },

    /// Create a task, standalone unless --goal is given
    AddTask {
        title: String,
        #[arg(short, long, default_value = "1")]
        area: String,
        #[arg(short, long)]
        deadline: NaiveDate,
        #[arg(short, long)]
        goal: Option<String>,
        #[arg(short, long)]
        frequency: Option<Frequency>,
    },

    /// Copy a goal and paste it as a new goal with fresh ids
    DuplicateGoal { goal_id: String },

    /// Copy a step and paste it into a goal
    DuplicateStep {
        step_id: String,
        /// Target goal (defaults to the step's own goal)
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Write a JSON backup of all stored data
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all data with a JSON backup
    Import { file: PathBuf },

    /// Delete all data and restore defaults
    Reset,

    /// Append sample goals and tasks
    Seed,

    /// Report steps and tasks that are out of sync
    Check,

    /// Set the selected month (0-11)
    Month { month: u32 },

    /// Set the current tab
    Tab { tab: Tab },

    /// Edit the vision board header
    Vision {
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        statement: Option<String>,
        #[arg(long)]
        theme_id: Option<String>,
    },

    /// Apply a JSON array of commands from a file ("-" for stdin)
    Apply { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,life_planner=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    // Load configuration
    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let mut state = AppState::new(config)?;

    let printer = cli.events.as_deref().map(|entity_types| {
        let mut stream = state.events.subscribe_to(entity_types);
        tokio::spawn(async move {
            while let Some(event) = stream.recv().await {
                if let Ok(line) = serde_json::to_string(&event) {
                    eprintln!("{}", line);
                }
            }
        })
    });

    let result = run(&mut state, cli.command, cli.yes);

    // Closing the bus lets the printer drain and finish
    drop(state);
    if let Some(handle) = printer {
        handle.await.ok();
    }
    result
}

fn run(state: &mut AppState, command: Commands, assume_yes: bool) -> Result<()> {
    let planner = &mut state.planner;
    match command {
        Commands::Show => print_dashboard(state),
        Commands::Goals => print_goals(planner.goals()),
        Commands::Tasks { month, area } => {
            let month = month.unwrap_or_else(|| planner.selected_month());
            check_month(month)?;
            print_tasks(planner.goals(), planner.tasks(), month, area.as_deref());
        }
        Commands::AddGoal {
            title,
            area,
            deadline,
            description,
            why,
            success,
            frequency,
        } => {
            let goal = planner.add_goal(CreateGoalRequest {
                area_id: area,
                title,
                description,
                deadline,
                why_important: why,
                success_criteria: success,
                frequency,
            });
            println!("Created goal {} (first step {})", goal.id, goal.steps[0].id);
        }
        Commands::AddStep {
            goal_id,
            description,
            deadline,
            priority,
        } => {
            let step = planner.add_step(
                &goal_id,
                AddStepRequest {
                    description,
                    deadline,
                    priority,
                    is_completed: false,
                },
            );
            match step {
                Some(step) => println!("Created step {}", step.id),
                None => bail!("Goal not found: {}", goal_id),
            }
        }
        Commands::UpdateStep {
            goal_id,
            step_id,
            description,
            deadline,
            priority,
            completed,
        } => {
            let changed = planner.update_step(
                &goal_id,
                UpdateStepRequest {
                    step_id: step_id.clone(),
                    description,
                    deadline,
                    priority,
                    is_completed: completed,
                },
            );
            report(changed, &format!("Updated step {}", step_id));
        }
        Commands::DeleteStep { goal_id, step_id } => {
            let Some(step) = planner.store().goal(&goal_id).and_then(|g| g.step(&step_id)) else {
                bail!("Step {} not found in goal {}", step_id, goal_id);
            };
            let prompt = format!("Delete step \"{}\"?", step.description);
            if confirm(&prompt, assume_yes)? {
                planner.delete_step(&goal_id, &step_id);
                println!("Deleted step {}", step_id);
            }
        }
        Commands::DeleteGoal { goal_id } => {
            let Some(goal) = planner.store().goal(&goal_id) else {
                bail!("Goal not found: {}", goal_id);
            };
            let prompt = format!(
                "Delete goal \"{}\" and {} task(s)?",
                goal.title,
                planner.store().tasks_for_goal(&goal_id).count()
            );
            if confirm(&prompt, assume_yes)? {
                planner.delete_goal(&goal_id);
                println!("Deleted goal {}", goal_id);
            }
        }
        Commands::ToggleGoal { goal_id } => {
            let changed = planner.toggle_goal(&goal_id);
            report(changed, &format!("Toggled goal {}", goal_id));
        }
        Commands::ToggleStep { goal_id, step_id } => {
            let changed = planner.toggle_step(&goal_id, &step_id);
            report(changed, &format!("Toggled step {}", step_id));
        }
        Commands::ToggleTask { task_id } => {
            let changed = planner.toggle_task(&task_id);
            report(changed, &format!("Toggled task {}", task_id));
        }
        Commands::AddTask {
            title,
            area,
            deadline,
            goal,
            frequency,
        } => {
            let task = planner.add_task(CreateTaskRequest {
                area_id: area,
                title,
                deadline,
                goal_id: goal,
                frequency,
            });
            println!("Created task {}", task.id);
        }
        Commands::DuplicateGoal { goal_id } => {
            if !planner.copy_goal(&goal_id) {
                bail!("Goal not found: {}", goal_id);
            }
            if let Some(goal) = planner.paste_goal() {
                println!("Created goal {} \"{}\"", goal.id, goal.title);
            }
        }
        Commands::DuplicateStep { step_id, target } => {
            let Some((source_goal, _)) = planner.store().find_step(&step_id) else {
                bail!("Step not found: {}", step_id);
            };
            let target = target.unwrap_or_else(|| source_goal.id.clone());
            planner.copy_step(&step_id);
            match planner.paste_step(&target) {
                Some(step) => println!("Created step {} in goal {}", step.id, target),
                None => bail!("Goal not found: {}", target),
            }
        }
        Commands::Export { output } => {
            let backup = state.export_backup()?;
            let json = serde_json::to_string_pretty(&backup)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported {} key(s) to {}", backup.data.len(), path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Import { file } => {
            let plan = ImportPlan::parse(&read_input(&file)?)?;
            let summary = plan.summary();
            let prompt = format!(
                "Replace all data with {} goal(s), {} task(s){}?",
                summary.goal_count,
                summary.task_count,
                if summary.has_vision { " and a vision board" } else { "" }
            );
            if confirm(&prompt, assume_yes)? {
                let summary = state.import_backup(&plan)?;
                println!(
                    "Imported {} goal(s), {} task(s), {} extra key(s)",
                    summary.goal_count,
                    summary.task_count,
                    summary.extra_keys.len()
                );
            }
        }
        Commands::Reset => {
            if confirm("Delete ALL planner data?", assume_yes)? {
                planner.reset();
                println!("Planner reset");
            }
        }
        Commands::Seed => {
            let (goals, tasks) = planner.seed_sample_data(today());
            println!("Added {} sample goal(s) and {} task(s)", goals, tasks);
        }
        Commands::Check => {
            let report = planner.consistency_report();
            if report.is_consistent() {
                println!("All steps and tasks are in sync");
            } else {
                println!("{}", serde_json::to_string_pretty(&report)?);
                bail!("{} consistency issue(s) found", report.issue_count());
            }
        }
        Commands::Month { month } => {
            check_month(month)?;
            planner.set_selected_month(month);
            println!("Selected month {}", month);
        }
        Commands::Tab { tab } => {
            let changed = planner.set_current_tab(tab);
            report(changed, &format!("Current tab {}", tab));
        }
        Commands::Vision {
            year,
            statement,
            theme_id,
        } => {
            let mut vision = planner.vision().clone();
            if let Some(year) = year {
                vision.year = year;
            }
            if let Some(statement) = statement {
                vision.vision_statement = statement;
            }
            if let Some(theme_id) = theme_id {
                vision.theme_id = theme_id;
            }
            let changed = planner.update_vision(vision);
            report(changed, "Vision board updated");
        }
        Commands::Apply { file } => {
            let commands = PlannerCommand::parse_batch(&read_input(&file)?)
                .context("Invalid command batch")?;
            for outcome in planner.dispatch_all(commands) {
                match outcome {
                    CommandOutcome::Created { entity_id } => println!("created {}", entity_id),
                    CommandOutcome::Applied => println!("applied"),
                    CommandOutcome::Unchanged => println!("unchanged"),
                }
            }
        }
    }
    Ok(())
}

fn check_month(month: u32) -> Result<()> {
    if month > 11 {
        bail!("Month must be between 0 and 11, got {}", month);
    }
    Ok(())
}

fn report(changed: bool, message: &str) {
    if changed {
        println!("{}", message);
    } else {
        println!("Nothing changed");
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        for line in std::io::stdin().lock().lines() {
            input.push_str(&line?);
            input.push('\n');
        }
        return Ok(input);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Ask a y/N question on the terminal
fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    let accepted = matches!(answer.trim().to_lowercase().as_str(), "y" | "yes");
    if !accepted {
        println!("Cancelled");
    }
    Ok(accepted)
}

// ============================================================================
// Output
// ============================================================================

fn area_name(area_id: &str) -> String {
    defaults::area(area_id)
        .map(|a| a.name)
        .unwrap_or_else(|| format!("area {}", area_id))
}

fn print_dashboard(state: &AppState) {
    let planner = &state.planner;
    let month = planner.selected_month();
    let stats = dashboard::month_stats(planner.tasks(), month, None);
    let goals = dashboard::goal_summary(planner.goals());
    let plan = dashboard::action_plan(planner.goals(), month);
    let routines = dashboard::routine_breakdown(planner.tasks());

    println!("Vision {}: {}", planner.vision().year, planner.vision().vision_statement);
    println!("Month {} ({})", month, planner.current_tab());
    println!(
        "  Tasks: {}/{} done ({}%), {} pending, {} scheduled",
        stats.completed, stats.total, stats.percent, stats.pending, stats.scheduled
    );
    println!("  Goals achieved: {}/{}", goals.achieved, goals.total);
    println!(
        "  Action plan: {} goal(s), {}/{} steps ({}%)",
        plan.goals.len(),
        plan.completed_steps,
        plan.total_steps,
        plan.percent
    );
    println!(
        "  Routines: daily {}%, weekly {}%, monthly/one-time {}%",
        routines.daily.percent, routines.weekly.percent, routines.monthly_and_one_time.percent
    );
    println!(
        "  Undo: {} / Redo: {}",
        planner.history().undo_depth(),
        planner.history().redo_depth()
    );
}

fn print_goals(goals: &[Goal]) {
    if goals.is_empty() {
        println!("No goals yet");
        return;
    }
    let today = today();
    for goal in goals {
        println!(
            "[{}] {} {} ({}, due {}, {}%)",
            if goal.is_completed { "x" } else { " " },
            goal.id,
            goal.title,
            area_name(&goal.area_id),
            goal.deadline,
            dashboard::goal_progress(goal)
        );
        for step in &goal.steps {
            let urgency = match dashboard::step_urgency(step, today) {
                StepUrgency::Done => "",
                StepUrgency::Overdue => " OVERDUE",
                StepUrgency::DueSoon => " due soon",
                StepUrgency::OnTrack => "",
            };
            println!(
                "    [{}] {} {} ({}, {}){}",
                if step.is_completed { "x" } else { " " },
                step.id,
                step.description,
                step.priority,
                step.deadline,
                urgency
            );
        }
    }
}

fn print_task(task: &Task) {
    println!(
        "    [{}] {} {} ({}, {}, {})",
        if task.is_completed() { "x" } else { " " },
        task.id,
        task.title,
        task.status,
        task.frequency,
        task.deadline
    );
}

fn print_tasks(goals: &[Goal], tasks: &[Task], month: u32, area: Option<&str>) {
    let grouped = dashboard::group_tasks(dashboard::tasks_in_month(tasks, month, None, area));
    if grouped.groups.is_empty() && grouped.standalone.is_empty() {
        println!("No tasks in month {}", month);
        return;
    }
    for group in &grouped.groups {
        let title = goals
            .iter()
            .find(|g| g.id == group.goal_id)
            .map_or(group.goal_id.as_str(), |g| g.title.as_str());
        println!("{} ({}%)", title, group.progress());
        group.tasks.iter().for_each(|t| print_task(t));
    }
    if !grouped.standalone.is_empty() {
        println!("Other tasks");
        grouped.standalone.iter().for_each(|t| print_task(t));
    }
}
