use std::sync::Arc;
use tempfile::{tempdir, TempDir};

use crate::db::{create_pool, init, run_migrations, spawn_writer, DbPool, WriteHandle};

/// Fresh migrated database in a temp dir. Keep the `TempDir` alive for the
/// duration of the test.
pub(crate) fn test_db() -> (Arc<DbPool>, WriteHandle, TempDir) {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("watson-test.db");
    let db_path = init(&path.to_string_lossy()).expect("init db");
    let pool = create_pool(&db_path).expect("pool");
    run_migrations(&pool).expect("migrations");
    let writer = spawn_writer((*pool).clone());
    (pool, writer, dir)
}
