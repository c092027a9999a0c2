use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use rusqlite::OptionalExtension;
use serde_json::json;

fn faculty_json(row: &rusqlite::Row) -> rusqlite::Result<serde_json::Value> {
    let id: String = row.get(0)?;
    let code: String = row.get(1)?;
    let full_name: String = row.get(2)?;
    let email: Option<String> = row.get(3)?;
    let mobile: Option<String> = row.get(4)?;
    let designation: Option<String> = row.get(5)?;
    let concentration: Option<String> = row.get(6)?;
    let school: Option<String> = row.get(7)?;
    Ok(json!({
        "id": id,
        "code": code,
        "fullName": full_name,
        "email": email,
        "mobile": mobile,
        "designation": designation,
        "concentration": concentration,
        "school": school,
    }))
}

fn handle_faculty_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let mut stmt = match conn.prepare(
        "SELECT id, code, full_name, email, mobile, designation, concentration, school
         FROM faculty
         ORDER BY code",
    ) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let rows = stmt
        .query_map([], |row| faculty_json(row))
        .and_then(|it| it.collect::<Result<Vec<_>, _>>());

    match rows {
        Ok(faculty) => ok(&req.id, json!({ "faculty": faculty })),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_faculty_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let code = match req.params.get("code").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing code", None),
    };
    if code.is_empty() {
        return err(&req.id, "bad_params", "code must not be empty", None);
    }

    let found = match conn
        .query_row(
            "SELECT id, code, full_name, email, mobile, designation, concentration, school
             FROM faculty
             WHERE code = ? COLLATE NOCASE",
            [&code],
            |row| faculty_json(row),
        )
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    match found {
        Some(faculty) => ok(&req.id, json!({ "faculty": faculty })),
        None => err(
            &req.id,
            "not_found",
            format!("no faculty with code '{}'", code),
            None,
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "faculty.list" => Some(handle_faculty_list(state, req)),
        "faculty.search" => Some(handle_faculty_search(state, req)),
        _ => None,
    }
}
