use rusqlite::Connection;
use shelfwise_db::open_memory;
use shelfwise_db::schema::{CURRENT_VERSION, create_schema, get_schema_version, migrate};
use tempfile::TempDir;

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    // Creating again should not error
    create_schema(&conn).unwrap();
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let tables = [
        "schema_version",
        "catalog_books",
        "genres",
        "organization_selections",
        "import_log",
    ];
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table '{}' should exist", table);
    }
}

#[test]
fn open_database_creates_parent_dirs() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("catalog.db");
    let conn = shelfwise_db::open_database(&path).unwrap();
    assert!(path.exists());
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn migrate_at_current_version_is_a_no_op() {
    let conn = open_memory().unwrap();
    migrate(&conn, CURRENT_VERSION).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn open_database_rejects_newer_schema() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.db");
    {
        let conn = Connection::open(&path).unwrap();
        create_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_VERSION + 1],
        )
        .unwrap();
    }
    assert!(shelfwise_db::open_database(&path).is_err());
}

#[test]
fn migrate_rejects_future_versions() {
    let conn = open_memory().unwrap();
    assert!(migrate(&conn, CURRENT_VERSION + 1).is_err());
}
