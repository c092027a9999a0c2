use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::timetable::{self, RawEntry, SlotPolicy};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

/// Snapshot one group's rows in insertion order. The room sentinel is
/// applied here so nothing downstream sees a missing room.
pub fn load_raw_entries(
    conn: &Connection,
    semester: i64,
    section: i64,
) -> rusqlite::Result<Vec<RawEntry>> {
    let mut stmt = conn.prepare(
        "SELECT day, start_time, end_time, course, section_code, room, faculty, class_type
         FROM schedule_entries
         WHERE semester = ? AND section = ?
         ORDER BY rowid",
    )?;
    let rows = stmt.query_map((semester, section), |row| {
        let room: Option<String> = row.get(5)?;
        Ok(RawEntry {
            day: row.get(0)?,
            start_time: row.get(1)?,
            end_time: row.get(2)?,
            course: row.get(3)?,
            section_code: row.get(4)?,
            room: match room {
                Some(r) if !r.trim().is_empty() => r,
                _ => timetable::ROOM_TBD.to_string(),
            },
            faculty: row.get(6)?,
            class_type: row.get(7)?,
        })
    })?;
    rows.collect()
}

fn group_params(req: &Request) -> Result<(i64, i64), serde_json::Value> {
    let semester = match req.params.get("semester").and_then(|v| v.as_i64()) {
        Some(v) => v,
        None => return Err(err(&req.id, "bad_params", "missing semester", None)),
    };
    let section = match req.params.get("section").and_then(|v| v.as_i64()) {
        Some(v) => v,
        None => return Err(err(&req.id, "bad_params", "missing section", None)),
    };
    Ok((semester, section))
}

fn handle_schedule_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (semester, section) = match group_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let raw = match load_raw_entries(conn, semester, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let out = timetable::consolidate(raw);
    ok(
        &req.id,
        json!({
            "semester": semester,
            "section": section,
            "entries": out.entries,
            "diagnostics": out.diagnostics,
        }),
    )
}

fn handle_schedule_grid(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (semester, section) = match group_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let policy = match req.params.get("policy").and_then(|v| v.as_str()) {
        None => SlotPolicy::Exact,
        Some(raw) => match SlotPolicy::parse(raw) {
            Some(p) => p,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("unknown policy '{}'", raw),
                    None,
                )
            }
        },
    };

    let raw = match load_raw_entries(conn, semester, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let out = timetable::consolidate(raw);
    match timetable::assemble_grid(&out.entries, policy) {
        Ok(days) => ok(
            &req.id,
            json!({
                "semester": semester,
                "section": section,
                "policy": policy.as_str(),
                "days": days,
                "diagnostics": out.diagnostics,
            }),
        ),
        Err(e) => err(&req.id, &e.code, e.message, e.details),
    }
}

fn handle_schedule_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (semester, section) = match group_params(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(entry) = req.params.get("entry") else {
        return err(&req.id, "bad_params", "missing entry", None);
    };

    let field = |name: &str| -> Option<String> {
        entry
            .get(name)
            .and_then(|v| v.as_str())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let Some(day) = field("day") else {
        return err(&req.id, "bad_params", "missing entry.day", None);
    };
    // Writes are strict: the lenient sentinel is only for data already on disk.
    if timetable::day_index(&day) == timetable::UNKNOWN_DAY_INDEX {
        return err(
            &req.id,
            "bad_params",
            format!("'{}' is not a recognized weekday", day),
            None,
        );
    }

    let Some(start_time) = field("startTime") else {
        return err(&req.id, "bad_params", "missing entry.startTime", None);
    };
    let Some(end_time) = field("endTime") else {
        return err(&req.id, "bad_params", "missing entry.endTime", None);
    };
    let start = match timetable::parse_minutes(&start_time) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", e.message, None),
    };
    let end = match timetable::parse_minutes(&end_time) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "bad_params", e.message, None),
    };
    if start >= end {
        return err(
            &req.id,
            "bad_params",
            "startTime must be before endTime",
            None,
        );
    }

    let Some(course) = field("course") else {
        return err(&req.id, "bad_params", "missing entry.course", None);
    };
    let Some(faculty) = field("faculty") else {
        return err(&req.id, "bad_params", "missing entry.faculty", None);
    };
    let section_code = field("sectionCode").unwrap_or_else(|| section.to_string());
    let room = field("room");
    let class_type = match field("classType") {
        None => timetable::ClassType::Lecture,
        Some(raw) => match timetable::ClassType::parse(&raw) {
            Some(t) => t,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("unknown classType '{}'", raw),
                    None,
                )
            }
        },
    };

    let entry_id = Uuid::new_v4().to_string();
    if let Err(e) = conn.execute(
        "INSERT INTO schedule_entries(
            id, semester, section, day, start_time, end_time,
            course, section_code, room, faculty, class_type
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &entry_id,
            semester,
            section,
            &day,
            &start_time,
            &end_time,
            &course,
            &section_code,
            &room,
            &faculty,
            class_type.as_str(),
        ),
    ) {
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "schedule_entries" })),
        );
    }

    ok(&req.id, json!({ "entryId": entry_id }))
}

fn handle_schedule_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let semester = req.params.get("semester").and_then(|v| v.as_i64());
    let section = req.params.get("section").and_then(|v| v.as_i64());

    let deleted = match (semester, section) {
        (Some(sem), Some(sec)) => conn.execute(
            "DELETE FROM schedule_entries WHERE semester = ? AND section = ?",
            (sem, sec),
        ),
        (Some(sem), None) => conn.execute("DELETE FROM schedule_entries WHERE semester = ?", [sem]),
        (None, None) => conn.execute("DELETE FROM schedule_entries", []),
        (None, Some(_)) => {
            return err(
                &req.id,
                "bad_params",
                "section filter requires semester",
                None,
            )
        }
    };

    match deleted {
        Ok(count) => ok(&req.id, json!({ "deleted": count })),
        Err(e) => err(&req.id, "db_delete_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedule.get" => Some(handle_schedule_get(state, req)),
        "schedule.grid" => Some(handle_schedule_grid(state, req)),
        "schedule.add" => Some(handle_schedule_add(state, req)),
        "schedule.clear" => Some(handle_schedule_clear(state, req)),
        _ => None,
    }
}
