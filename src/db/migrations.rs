//! Ordered, idempotent schema migration steps.
//!
//! Every step checks its own precondition against the live table and
//! only then acts, so the whole pipeline replays safely on every open.
//! A failed step is reported and skipped rather than propagated:
//! opening the database never crashes the application over migration
//! state. The worst case is a table missing an optional column, which
//! the row reader tolerates (the field reads as absent).

use super::schema;
use rusqlite::Connection;
use tracing::{debug, warn};

/// Outcome of a single migration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The step changed the schema.
    Applied,
    /// The precondition showed nothing to do.
    Skipped,
    /// The step failed; startup continues without it.
    Failed { reason: String },
}

/// A named step with its outcome, for logging and inspection.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub step: &'static str,
    pub outcome: MigrationOutcome,
}

/// A single migration step.
struct MigrationStep {
    name: &'static str,
    run: fn(&Connection) -> rusqlite::Result<MigrationOutcome>,
}

/// The pipeline, in the order the schema generations appeared.
const STEPS: &[MigrationStep] = &[
    MigrationStep {
        name: "create tasks table",
        run: create_tasks_table,
    },
    MigrationStep {
        name: "rename due_date to expected_date",
        run: rename_due_date,
    },
    MigrationStep {
        name: "add pending_reason",
        run: |conn| add_column(conn, "pending_reason", "TEXT"),
    },
    MigrationStep {
        name: "add pending_reason_type",
        run: |conn| add_column(conn, "pending_reason_type", "TEXT"),
    },
    MigrationStep {
        name: "add related_task_id",
        run: |conn| add_column(conn, "related_task_id", "INTEGER"),
    },
];

/// Run every step in order and collect the outcomes.
pub fn run(conn: &Connection) -> Vec<MigrationReport> {
    STEPS
        .iter()
        .map(|step| {
            let outcome = match (step.run)(conn) {
                Ok(outcome) => outcome,
                Err(err) => MigrationOutcome::Failed {
                    reason: err.to_string(),
                },
            };
            match &outcome {
                MigrationOutcome::Applied => debug!(step = step.name, "migration applied"),
                MigrationOutcome::Skipped => debug!(step = step.name, "migration skipped"),
                MigrationOutcome::Failed { reason } => {
                    warn!(step = step.name, %reason, "migration failed, continuing");
                }
            }
            MigrationReport {
                step: step.name,
                outcome,
            }
        })
        .collect()
}

/// Current-generation table. Earlier generations are caught up by the
/// steps that follow.
fn create_tasks_table(conn: &Connection) -> rusqlite::Result<MigrationOutcome> {
    if schema::table_exists(conn, "tasks")? {
        return Ok(MigrationOutcome::Skipped);
    }

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            status INTEGER DEFAULT -1,
            expected_date TEXT,
            pending_reason TEXT,
            pending_reason_type TEXT,
            related_task_id INTEGER,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );",
    )?;

    Ok(MigrationOutcome::Applied)
}

/// The first schema generation called the target date `due_date`.
/// Rename in place; the rows are untouched.
fn rename_due_date(conn: &Connection) -> rusqlite::Result<MigrationOutcome> {
    let has_old = schema::has_column(conn, "tasks", "due_date")?;
    let has_new = schema::has_column(conn, "tasks", "expected_date")?;

    if has_old && !has_new {
        conn.execute_batch("ALTER TABLE tasks RENAME COLUMN due_date TO expected_date;")?;
        return Ok(MigrationOutcome::Applied);
    }

    Ok(MigrationOutcome::Skipped)
}

/// Additive nullable column; old rows read the new field as absent.
fn add_column(conn: &Connection, column: &str, decl: &str) -> rusqlite::Result<MigrationOutcome> {
    if schema::has_column(conn, "tasks", column)? {
        return Ok(MigrationOutcome::Skipped);
    }

    conn.execute_batch(&format!("ALTER TABLE tasks ADD COLUMN {} {};", column, decl))?;

    Ok(MigrationOutcome::Applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_conn() -> Connection {
        Connection::open_in_memory().expect("Failed to open in-memory database")
    }

    /// The first schema generation: due_date naming, binary status
    /// with a pending default, no reason columns.
    fn create_legacy_table(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                status INTEGER NOT NULL DEFAULT 0,
                due_date TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );",
        )
        .expect("Failed to create legacy table");
    }

    #[test]
    fn fresh_database_applies_create_and_skips_the_rest() {
        let conn = fresh_conn();

        let reports = run(&conn);

        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].outcome, MigrationOutcome::Applied);
        for report in &reports[1..] {
            assert_eq!(
                report.outcome,
                MigrationOutcome::Skipped,
                "step '{}' should have nothing to do on a fresh table",
                report.step
            );
        }
    }

    #[test]
    fn second_run_is_all_skips() {
        let conn = fresh_conn();
        run(&conn);

        let reports = run(&conn);

        assert!(
            reports
                .iter()
                .all(|r| r.outcome == MigrationOutcome::Skipped)
        );
    }

    #[test]
    fn legacy_table_is_upgraded_in_place() {
        let conn = fresh_conn();
        create_legacy_table(&conn);
        conn.execute(
            "INSERT INTO tasks (title, due_date) VALUES ('old row', '2023-06-01')",
            [],
        )
        .expect("Failed to insert legacy row");

        let reports = run(&conn);

        // Create skipped, rename + three additions applied.
        assert_eq!(reports[0].outcome, MigrationOutcome::Skipped);
        for report in &reports[1..] {
            assert_eq!(report.outcome, MigrationOutcome::Applied, "{}", report.step);
        }

        assert!(schema::has_column(&conn, "tasks", "expected_date").unwrap());
        assert!(!schema::has_column(&conn, "tasks", "due_date").unwrap());
        assert!(schema::has_column(&conn, "tasks", "pending_reason").unwrap());
        assert!(schema::has_column(&conn, "tasks", "pending_reason_type").unwrap());
        assert!(schema::has_column(&conn, "tasks", "related_task_id").unwrap());

        // The renamed column kept its data.
        let date: Option<String> = conn
            .query_row("SELECT expected_date FROM tasks WHERE title = 'old row'", [], |row| {
                row.get(0)
            })
            .expect("Failed to read migrated row");
        assert_eq!(date.as_deref(), Some("2023-06-01"));
    }

    #[test]
    fn upgrade_produces_no_duplicate_columns_when_replayed() {
        let conn = fresh_conn();
        create_legacy_table(&conn);

        run(&conn);
        run(&conn);

        let names: Vec<String> = schema::columns(&conn, "tasks")
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        let reason_columns = names.iter().filter(|n| *n == "pending_reason").count();
        assert_eq!(reason_columns, 1);
    }

    #[test]
    fn failed_step_reports_and_does_not_halt_the_pipeline() {
        let conn = fresh_conn();
        // A tasks *view* makes ALTER TABLE fail while the existence
        // and column checks still pass.
        conn.execute_batch(
            "CREATE TABLE real_tasks (id INTEGER PRIMARY KEY, title TEXT, due_date TEXT);
             CREATE VIEW tasks AS SELECT * FROM real_tasks;",
        )
        .expect("Failed to create view");

        let reports = run(&conn);

        assert_eq!(reports.len(), 5, "every step still ran");
        assert!(
            reports
                .iter()
                .any(|r| matches!(r.outcome, MigrationOutcome::Failed { .. })),
            "ALTER against a view should fail non-fatally"
        );
    }
}
