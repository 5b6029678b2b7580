//! Revboard CLI: sign in and render the dashboard, or seed demo data.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use revboard_lib::auth::{self, Session};
use revboard_lib::dashboard::{self, DashboardSnapshot};
use revboard_lib::db::{DbError, WorkspaceDb};
use revboard_lib::seed;

#[derive(Parser, Debug)]
#[command(
    name = "revboard",
    version,
    about = "Recurring-revenue and delivery dashboard"
)]
struct Cli {
    /// Database file (defaults to ~/.revboard/revboard.db)
    #[arg(long = "db", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and print the dashboard for a user
    Show {
        /// Email of the signed-in user
        email: String,

        /// Print the snapshot as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Populate the database with demo data
    Seed,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let db = match open_db(cli.db) {
        Ok(db) => db,
        Err(e) => {
            log::error!("Failed to open database: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Seed => match seed::seed_demo_data(&db) {
            Ok(user) => {
                println!("Seeded demo data for {}", user.email);
                println!("Run `revboard show {}` to see the dashboard.", user.email);
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("Seeding failed: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Show { email, json } => show(&db, &email, json),
    }
}

fn open_db(path: Option<PathBuf>) -> Result<WorkspaceDb, DbError> {
    match path {
        Some(path) => WorkspaceDb::open_at(path),
        None => WorkspaceDb::open(),
    }
}

fn show(db: &WorkspaceDb, email: &str, json: bool) -> ExitCode {
    let session = match auth::sign_in(db, email) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Sign-in failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let today = chrono::Local::now().date_naive();
    let snapshot = match dashboard::load_dashboard(db, &session.user_id, today) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            // Fail the whole batch: nothing partial is rendered.
            log::error!("Dashboard load failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).expect("snapshot serializes")
        );
    } else {
        render_text(&session, today, &snapshot);
    }
    ExitCode::SUCCESS
}

fn render_text(session: &Session, today: chrono::NaiveDate, snapshot: &DashboardSnapshot) {
    println!("Revboard — {}", today.format("%A, %B %-d"));
    println!("Signed in as {} <{}>", session.name, session.email);
    println!();
    println!(
        "Today        {} scheduled · {} completed",
        snapshot.tasks_scheduled_today, snapshot.tasks_completed_today
    );
    println!(
        "This week    {} tasks completed",
        snapshot.tasks_completed_this_week
    );
    println!(
        "Prospects    {} new this month · {} converted ({}%)",
        snapshot.prospects_this_month, snapshot.prospects_converted, snapshot.conversion_rate
    );
    println!(
        "Recurring    ${:.2} billing this month",
        snapshot.monthly_recurring_total
    );
    println!(
        "Delivery     {} engagement(s) awaiting delivery",
        snapshot.delivery_pending
    );

    println!();
    println!("Completions, last 7 days");
    for point in &snapshot.completions_7d {
        println!("  {}  {:>3}  {}", point.label, point.count, "#".repeat(point.count as usize));
    }

    println!();
    println!("Recurring revenue, last 6 months");
    for point in &snapshot.recurring_trend_6m {
        println!("  {}  ${:>10.2}", point.label, point.total);
    }
}
