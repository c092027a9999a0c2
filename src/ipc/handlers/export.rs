use crate::ipc::error::{err, ok};
use crate::ipc::handlers::schedule::load_raw_entries;
use crate::ipc::types::{AppState, Request};
use crate::timetable;
use serde_json::json;
use std::path::PathBuf;

fn handle_export_rows(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let semester = match req.params.get("semester").and_then(|v| v.as_i64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing semester", None),
    };
    let section = match req.params.get("section").and_then(|v| v.as_i64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing section", None),
    };

    let raw = match load_raw_entries(conn, semester, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let out = timetable::consolidate(raw);
    let rows = timetable::flat_rows(&out.entries);

    ok(
        &req.id,
        json!({
            "title": "Class Routine",
            "semester": semester,
            "section": section,
            "generatedAt": chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            "rows": rows,
            "diagnostics": out.diagnostics,
        }),
    )
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let semester = match req.params.get("semester").and_then(|v| v.as_i64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing semester", None),
    };
    let section = match req.params.get("section").and_then(|v| v.as_i64()) {
        Some(v) => v,
        None => return err(&req.id, "bad_params", "missing section", None),
    };
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) => PathBuf::from(v),
        None => return err(&req.id, "bad_params", "missing params.outPath", None),
    };

    let raw = match load_raw_entries(conn, semester, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let out = timetable::consolidate(raw);
    let rows = timetable::flat_rows(&out.entries);

    let mut writer = match csv::Writer::from_path(&out_path) {
        Ok(w) => w,
        Err(e) => {
            return err(
                &req.id,
                "export_write_failed",
                e.to_string(),
                Some(json!({ "path": out_path.to_string_lossy() })),
            )
        }
    };

    let header = ["day", "time", "course", "room", "faculty", "type"];
    if let Err(e) = writer.write_record(header) {
        return err(&req.id, "export_write_failed", e.to_string(), None);
    }
    for row in &rows {
        if let Err(e) = writer.write_record([
            row.day.as_str(),
            row.time_label.as_str(),
            row.course.as_str(),
            row.room.as_str(),
            row.faculty.as_str(),
            row.class_type.as_str(),
        ]) {
            return err(&req.id, "export_write_failed", e.to_string(), None);
        }
    }
    if let Err(e) = writer.flush() {
        return err(&req.id, "export_write_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "outPath": out_path.to_string_lossy(),
            "rows": rows.len(),
            "diagnostics": out.diagnostics,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.rows" => Some(handle_export_rows(state, req)),
        "export.csv" => Some(handle_export_csv(state, req)),
        _ => None,
    }
}
