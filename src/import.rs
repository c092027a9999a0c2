use csv::Reader;
use std::path::Path;

use crate::timetable::{RawEntry, ROOM_TBD};

/// One schedule row lifted out of a CSV sheet, keyed to its group.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub semester: i64,
    pub section: i64,
    pub entry: RawEntry,
}

/// A line the importer could not use, with the 1-based file line and why.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ScheduleImport {
    pub rows: Vec<ParsedRow>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone)]
pub struct FacultyRow {
    pub code: String,
    pub full_name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub designation: Option<String>,
    pub concentration: Option<String>,
    pub school: Option<String>,
}

#[derive(Debug, Default)]
pub struct FacultyImport {
    pub rows: Vec<FacultyRow>,
    pub skipped: Vec<SkippedRow>,
}

fn find_col(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim();
        names.iter().any(|n| h.eq_ignore_ascii_case(n))
    })
}

fn cell<'a>(record: &'a csv::StringRecord, col: Option<usize>) -> &'a str {
    col.and_then(|i| record.get(i)).unwrap_or("").trim()
}

fn opt_cell(record: &csv::StringRecord, col: Option<usize>) -> Option<String> {
    let v = cell(record, col);
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

/// Read a schedule sheet. Two column shapes are tolerated: a single `time`
/// column holding `"start-end"`, or separate `start_time`/`end_time`
/// columns. Course and faculty columns accept either naming
/// (`course_code`/`course`, `instructor`/`faculty`). Room and class type
/// are optional. Unusable lines are collected, never silently dropped.
pub fn read_schedule_csv(path: &Path) -> anyhow::Result<ScheduleImport> {
    let mut reader = Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let semester_col = find_col(&headers, &["semester"]);
    let section_col = find_col(&headers, &["section"]);
    let day_col = find_col(&headers, &["day"]);
    let time_col = find_col(&headers, &["time"]);
    let start_col = find_col(&headers, &["start_time", "start"]);
    let end_col = find_col(&headers, &["end_time", "end"]);
    let course_col = find_col(&headers, &["course_code", "course"]);
    let section_code_col = find_col(&headers, &["section_code"]);
    let room_col = find_col(&headers, &["room"]);
    let faculty_col = find_col(&headers, &["instructor", "faculty"]);
    let type_col = find_col(&headers, &["class_type", "type"]);

    let mut out = ScheduleImport::default();

    for (idx, result) in reader.records().enumerate() {
        // Header occupies line 1.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.skipped.push(SkippedRow {
                    line,
                    reason: format!("unreadable record: {}", e),
                });
                continue;
            }
        };

        let semester: i64 = match cell(&record, semester_col).parse() {
            Ok(v) => v,
            Err(_) => {
                out.skipped.push(SkippedRow {
                    line,
                    reason: "semester is not an integer".to_string(),
                });
                continue;
            }
        };
        let section: i64 = match cell(&record, section_col).parse() {
            Ok(v) => v,
            Err(_) => {
                out.skipped.push(SkippedRow {
                    line,
                    reason: "section is not an integer".to_string(),
                });
                continue;
            }
        };

        let (start_time, end_time) = if start_col.is_some() && end_col.is_some() {
            (
                cell(&record, start_col).to_string(),
                cell(&record, end_col).to_string(),
            )
        } else {
            let raw = cell(&record, time_col);
            let mut parts = raw.splitn(2, '-');
            match (parts.next(), parts.next()) {
                (Some(s), Some(e)) => (s.trim().to_string(), e.trim().to_string()),
                _ => {
                    out.skipped.push(SkippedRow {
                        line,
                        reason: format!("time '{}' is not a start-end range", raw),
                    });
                    continue;
                }
            }
        };

        let day = cell(&record, day_col).to_string();
        let course = cell(&record, course_col).to_string();
        let faculty = cell(&record, faculty_col).to_string();
        if day.is_empty() || course.is_empty() || faculty.is_empty() {
            out.skipped.push(SkippedRow {
                line,
                reason: "missing day, course, or faculty".to_string(),
            });
            continue;
        }

        let section_code = match opt_cell(&record, section_code_col) {
            Some(v) => v,
            None => section.to_string(),
        };
        let room = opt_cell(&record, room_col).unwrap_or_else(|| ROOM_TBD.to_string());
        let class_type = opt_cell(&record, type_col).unwrap_or_else(|| "lecture".to_string());

        out.rows.push(ParsedRow {
            semester,
            section,
            entry: RawEntry {
                day,
                start_time,
                end_time,
                course,
                section_code,
                room,
                faculty,
                class_type,
            },
        });
    }

    Ok(out)
}

/// Read a faculty directory sheet (code, name, and optional contact
/// columns). Rows without a code or name are reported.
pub fn read_faculty_csv(path: &Path) -> anyhow::Result<FacultyImport> {
    let mut reader = Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let code_col = find_col(&headers, &["code", "initial", "faculty_code"]);
    let name_col = find_col(&headers, &["name", "full_name", "faculty_name"]);
    let email_col = find_col(&headers, &["email"]);
    let mobile_col = find_col(&headers, &["mobile", "phone"]);
    let designation_col = find_col(&headers, &["designation"]);
    let concentration_col = find_col(&headers, &["concentration"]);
    let school_col = find_col(&headers, &["school", "department"]);

    let mut out = FacultyImport::default();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.skipped.push(SkippedRow {
                    line,
                    reason: format!("unreadable record: {}", e),
                });
                continue;
            }
        };

        let code = cell(&record, code_col).to_string();
        let full_name = cell(&record, name_col).to_string();
        if code.is_empty() || full_name.is_empty() {
            out.skipped.push(SkippedRow {
                line,
                reason: "missing code or name".to_string(),
            });
            continue;
        }

        out.rows.push(FacultyRow {
            code,
            full_name,
            email: opt_cell(&record, email_col),
            mobile: opt_cell(&record, mobile_col),
            designation: opt_cell(&record, designation_col),
            concentration: opt_cell(&record, concentration_col),
            school: opt_cell(&record, school_col),
        });
    }

    Ok(out)
}
