use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_routined");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn routined");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("routined-router-smoke");
    let schedule_csv = workspace.join("smoke-schedule.csv");
    let faculty_csv = workspace.join("smoke-faculty.csv");
    let csv_out = workspace.join("smoke-export.csv");

    std::fs::write(
        &schedule_csv,
        "semester,section,day,time,course_code,section_code,room,instructor\n\
         1,1,Sunday,8:30-9:30,CSE101,1A,101,UDD\n",
    )
    .expect("write schedule csv");
    std::fs::write(&faculty_csv, "code,name\nUDD,Dr. Example Person\n")
        .expect("write faculty csv");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(&mut stdin, &mut reader, "1", "health", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "3",
        "schedule.importCsv",
        json!({ "path": schedule_csv.to_string_lossy() }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "4",
        "schedule.add",
        json!({
            "semester": 1,
            "section": 1,
            "entry": {
                "day": "Monday",
                "startTime": "10:00",
                "endTime": "11:00",
                "course": "CSE102",
                "faculty": "RHM"
            }
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "5",
        "schedule.get",
        json!({ "semester": 1, "section": 1 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "6",
        "schedule.grid",
        json!({ "semester": 1, "section": 1 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "7",
        "schedule.grid",
        json!({ "semester": 1, "section": 1, "policy": "overlap" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "8",
        "export.rows",
        json!({ "semester": 1, "section": 1 }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "9",
        "export.csv",
        json!({
            "semester": 1,
            "section": 1,
            "outPath": csv_out.to_string_lossy()
        }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "10",
        "faculty.importCsv",
        json!({ "path": faculty_csv.to_string_lossy() }),
    );
    let _ = request(&mut stdin, &mut reader, "11", "faculty.list", json!({}));
    let _ = request(
        &mut stdin,
        &mut reader,
        "12",
        "faculty.search",
        json!({ "code": "udd" }),
    );
    let _ = request(
        &mut stdin,
        &mut reader,
        "13",
        "schedule.clear",
        json!({ "semester": 1, "section": 1 }),
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
