//! The single SQLite connection behind every repository.
//!
//! Scheduling a collection checks each item's owner and reservation and then
//! reserves it; an item edit racing with that must see either the reserved or
//! the free row, never something in between. Each such write runs as one task
//! on the worker thread, inside its own transaction when it spans several rows.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

use super::migrations::run_migrations;

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Run(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to ask recoza-db to stop: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join recoza-db: {join_err:?}");
            }
        }
    }
}

/// Handle to the Recoza store (profiles, logged items, prices and collections),
/// owned by the `recoza-db` worker thread.
///
/// Every service holds a clone; all clones feed the same worker, so tasks from
/// the household and collector sides run one at a time in submission order.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    /// Open `db_path` and bring it to the current schema.
    ///
    /// Returns once migrations have run, so the seeded `recyclable_prices`
    /// rows are readable by the first caller.
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("recoza-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open the Recoza database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let migrated =
                    run_migrations(&mut conn).context("failed to migrate the Recoza schema");
                if ready_tx.send(migrated).is_err() {
                    error!("Nobody waiting for recoza-db to become ready");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Run(task) => task(&mut conn),
                        DbCommand::Shutdown => break,
                    }
                }

                info!("recoza-db stopped");
            })
            .with_context(|| "failed to spawn the recoza-db thread")?;

        ready_rx
            .recv()
            .context("recoza-db exited before the schema was ready")??;

        info!("Recoza database ready at {}", db_path.display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Run `task` on the worker and await its result.
    ///
    /// A task sees no other task's writes half-done. Multi-row writes such as
    /// reserving items for a collection open a transaction inside the task.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Run(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("recoza-db finished a task whose caller went away");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("recoza-db is not accepting work: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("recoza-db stopped before replying"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("nested").join("recoza.sqlite3")).unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn prices_are_seeded_before_new_returns() {
        let (_dir, db) = open();
        let count: i64 = db
            .execute(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM recyclable_prices", [], |row| {
                    row.get(0)
                })?)
            })
            .await
            .unwrap();
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn clones_share_one_worker() {
        let (_dir, db) = open();
        let other = db.clone();
        db.execute(|conn| {
            conn.execute_batch("CREATE TABLE journal (step INTEGER NOT NULL)")?;
            Ok(())
        })
        .await
        .unwrap();

        let first = db.execute(|conn| {
            conn.execute("INSERT INTO journal (step) VALUES (1)", [])?;
            Ok(())
        });
        let second = other.execute(|conn| {
            conn.execute("INSERT INTO journal (step) VALUES (2)", [])?;
            Ok(())
        });
        let (first, second) = tokio::join!(first, second);
        first.unwrap();
        second.unwrap();

        let steps: Vec<i64> = db
            .execute(|conn| {
                let mut stmt = conn.prepare("SELECT step FROM journal ORDER BY step")?;
                let steps = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<i64>>>()?;
                Ok(steps)
            })
            .await
            .unwrap();
        assert_eq!(steps, vec![1, 2]);
    }

    #[tokio::test]
    async fn task_errors_reach_the_caller() {
        let (_dir, db) = open();
        let err = db
            .execute(|_conn| -> Result<()> { bail!("collection already completed") })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "collection already completed");

        // The worker keeps serving after a failed task.
        assert!(db.execute(|_conn| Ok(1)).await.is_ok());
    }

    #[tokio::test]
    async fn reopening_keeps_existing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recoza.sqlite3");
        {
            let db = Database::new(path.clone()).unwrap();
            db.execute(|conn| {
                conn.execute(
                    "UPDATE recyclable_prices SET price_per_kg = 9.0 WHERE type = 'plastic'",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();
        }

        let db = Database::new(path).unwrap();
        assert_eq!(db.path().file_name().unwrap(), "recoza.sqlite3");
        let price: f64 = db
            .execute(|conn| {
                Ok(conn.query_row(
                    "SELECT price_per_kg FROM recyclable_prices WHERE type = 'plastic'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .await
            .unwrap();
        assert_eq!(price, 9.0);
    }
}
