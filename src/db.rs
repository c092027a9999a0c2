use rusqlite::Connection;
use std::path::Path;

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("routine.sqlite3");
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schedule_entries(
            id TEXT PRIMARY KEY,
            semester INTEGER NOT NULL,
            section INTEGER NOT NULL,
            day TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            course TEXT NOT NULL,
            section_code TEXT NOT NULL,
            room TEXT,
            faculty TEXT NOT NULL,
            class_type TEXT NOT NULL DEFAULT 'lecture'
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_schedule_semester_section
         ON schedule_entries(semester, section)",
        [],
    )?;
    // Early workspaces predate the class_type column.
    ensure_schedule_class_type(&conn)?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS faculty(
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            email TEXT,
            mobile TEXT,
            designation TEXT,
            concentration TEXT,
            school TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_faculty_code ON faculty(code)",
        [],
    )?;
    Ok(conn)
}

fn ensure_schedule_class_type(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "schedule_entries", "class_type")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE schedule_entries ADD COLUMN class_type TEXT NOT NULL DEFAULT 'lecture'",
        [],
    )?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
