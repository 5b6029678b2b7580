//! Demo data seeding.
//!
//! Populates the store with a demo user and a spread of tasks, prospects,
//! and implementations dated relative to the current day, so a fresh
//! database renders a dashboard with every panel populated. Child rows get
//! fresh ids on every run; rerunning against the same database adds another
//! batch for the same user.

use chrono::{Days, Months, NaiveDate, Utc};
use uuid::Uuid;

use crate::db::{DbError, DbImplementation, DbProspect, DbTask, DbUser, WorkspaceDb};

/// Email of the demo user created by [`seed_demo_data`].
pub const DEMO_EMAIL: &str = "demo@revboard.dev";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn day(date: NaiveDate) -> String {
    date.to_string()
}

/// Seed the store with demo data and return the demo user.
pub fn seed_demo_data(db: &WorkspaceDb) -> Result<DbUser, DbError> {
    let now = Utc::now();
    let today = now.date_naive();
    let stamp = now.to_rfc3339();

    let user = match db.get_user_by_email(DEMO_EMAIL)? {
        Some(existing) => existing,
        None => {
            let user = DbUser {
                id: new_id(),
                email: DEMO_EMAIL.to_string(),
                name: "Demo User".to_string(),
                created_at: stamp.clone(),
            };
            db.upsert_user(&user)?;
            user
        }
    };

    // Tasks: a few due today, completions spread over the trailing week.
    let task_plan: &[(u64, &str)] = &[
        (0, "pending"),
        (0, "pending"),
        (0, "completed"),
        (1, "completed"),
        (2, "completed"),
        (2, "completed"),
        (4, "completed"),
        (6, "completed"),
    ];
    for (index, (days_back, status)) in task_plan.iter().enumerate() {
        let scheduled = today - Days::new(*days_back);
        db.upsert_task(&DbTask {
            id: new_id(),
            user_id: user.id.clone(),
            title: format!("Follow-up #{}", index + 1),
            scheduled_date: day(scheduled),
            status: (*status).to_string(),
            created_at: stamp.clone(),
            updated_at: stamp.clone(),
            completed_at: (*status == "completed").then(|| stamp.clone()),
        })?;
    }

    // Prospects: four created this month, two of them converted.
    for (name, status) in [
        ("Northwind Traders", "new"),
        ("Fabrikam", "contacted"),
        ("Contoso", "converted"),
        ("Adventure Works", "converted"),
    ] {
        db.upsert_prospect(&DbProspect {
            id: new_id(),
            user_id: user.id.clone(),
            name: name.to_string(),
            status: status.to_string(),
            created_at: stamp.clone(),
            updated_at: stamp.clone(),
        })?;
    }

    // Implementations: staggered starts so the 6-month trend has a slope,
    // one ended engagement, one awaiting delivery, one paused.
    let implementations = [
        ("Acme Corp", Some(1200.0), "active", today - Months::new(5), None, true),
        ("Globex", Some(800.0), "active", today - Months::new(3), None, true),
        ("Initech", Some(450.0), "active", today - Months::new(1), None, false),
        (
            "Umbrella",
            Some(600.0),
            "active",
            today - Months::new(6),
            Some(today - Months::new(2)),
            true,
        ),
        ("Hooli", Some(950.0), "paused", today - Months::new(4), None, false),
        ("Stark Industries", None, "active", today - Months::new(2), None, false),
    ];
    for (client, amount, status, start, end, delivered) in implementations {
        db.upsert_implementation(&DbImplementation {
            id: new_id(),
            user_id: user.id.clone(),
            client_name: client.to_string(),
            recurring_amount: amount,
            status: status.to_string(),
            start_date: Some(day(start)),
            end_date: end.map(day),
            delivered,
            created_at: stamp.clone(),
            updated_at: stamp.clone(),
        })?;
    }

    Ok(user)
}
