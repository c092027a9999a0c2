use crate::import;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

fn handle_schedule_import_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let path = match req.params.get("path").and_then(|v| v.as_str()) {
        Some(v) => PathBuf::from(v),
        None => return err(&req.id, "bad_params", "missing params.path", None),
    };
    let clear_existing = req
        .params
        .get("clearExisting")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let parsed = match import::read_schedule_csv(&path) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "import_read_failed",
                e.to_string(),
                Some(json!({ "path": path.to_string_lossy() })),
            )
        }
    };

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };

    if clear_existing {
        if let Err(e) = tx.execute("DELETE FROM schedule_entries", []) {
            let _ = tx.rollback();
            return err(&req.id, "db_delete_failed", e.to_string(), None);
        }
    }

    for row in &parsed.rows {
        let entry_id = Uuid::new_v4().to_string();
        if let Err(e) = tx.execute(
            "INSERT INTO schedule_entries(
                id, semester, section, day, start_time, end_time,
                course, section_code, room, faculty, class_type
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                &entry_id,
                row.semester,
                row.section,
                &row.entry.day,
                &row.entry.start_time,
                &row.entry.end_time,
                &row.entry.course,
                &row.entry.section_code,
                &row.entry.room,
                &row.entry.faculty,
                &row.entry.class_type,
            ),
        ) {
            let _ = tx.rollback();
            return err(
                &req.id,
                "db_insert_failed",
                e.to_string(),
                Some(json!({ "table": "schedule_entries" })),
            );
        }
    }

    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "imported": parsed.rows.len(),
            "skipped": parsed.skipped,
            "cleared": clear_existing,
        }),
    )
}

fn handle_faculty_import_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let path = match req.params.get("path").and_then(|v| v.as_str()) {
        Some(v) => PathBuf::from(v),
        None => return err(&req.id, "bad_params", "missing params.path", None),
    };

    let parsed = match import::read_faculty_csv(&path) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "import_read_failed",
                e.to_string(),
                Some(json!({ "path": path.to_string_lossy() })),
            )
        }
    };

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };

    for row in &parsed.rows {
        // Re-importing the sheet refreshes existing codes in place.
        if let Err(e) = tx.execute(
            "INSERT INTO faculty(
                id, code, full_name, email, mobile, designation, concentration, school
             ) VALUES(?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(code) DO UPDATE SET
                full_name = excluded.full_name,
                email = excluded.email,
                mobile = excluded.mobile,
                designation = excluded.designation,
                concentration = excluded.concentration,
                school = excluded.school",
            (
                Uuid::new_v4().to_string(),
                &row.code,
                &row.full_name,
                &row.email,
                &row.mobile,
                &row.designation,
                &row.concentration,
                &row.school,
            ),
        ) {
            let _ = tx.rollback();
            return err(
                &req.id,
                "db_insert_failed",
                e.to_string(),
                Some(json!({ "table": "faculty" })),
            );
        }
    }

    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "imported": parsed.rows.len(),
            "skipped": parsed.skipped,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedule.importCsv" => Some(handle_schedule_import_csv(state, req)),
        "faculty.importCsv" => Some(handle_faculty_import_csv(state, req)),
        _ => None,
    }
}
