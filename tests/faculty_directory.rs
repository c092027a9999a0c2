mod test_support;

use serde_json::json;
use test_support::{request, request_ok, spawn_sidecar, temp_dir, write_file};

#[test]
fn faculty_import_list_and_search() {
    let workspace = temp_dir("routined-faculty");
    let csv = workspace.join("faculty.csv");
    write_file(
        &csv,
        "code,name,email,designation\n\
         UDD,Dr. Example Person,udd@example.edu,Professor\n\
         ABC,Another Teacher,,Lecturer\n\
         ,Nameless,,\n",
    );

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "faculty.importCsv",
        json!({ "path": csv.to_string_lossy() }),
    );
    assert_eq!(imported.get("imported").and_then(|v| v.as_i64()), Some(2));
    assert_eq!(
        imported
            .get("skipped")
            .and_then(|v| v.as_array())
            .expect("skipped")
            .len(),
        1
    );

    let listed = request_ok(&mut stdin, &mut reader, "3", "faculty.list", json!({}));
    let faculty = listed
        .get("faculty")
        .and_then(|v| v.as_array())
        .expect("faculty");
    let codes: Vec<&str> = faculty
        .iter()
        .map(|f| f.get("code").and_then(|v| v.as_str()).expect("code"))
        .collect();
    assert_eq!(codes, ["ABC", "UDD"]);

    // Code match is case-insensitive.
    let found = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "faculty.search",
        json!({ "code": "udd" }),
    );
    assert_eq!(
        found["faculty"]["fullName"].as_str(),
        Some("Dr. Example Person")
    );
    assert_eq!(
        found["faculty"]["designation"].as_str(),
        Some("Professor")
    );

    let missing = request(
        &mut stdin,
        &mut reader,
        "5",
        "faculty.search",
        json!({ "code": "XYZ" }),
    );
    assert_eq!(missing.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        missing
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_found")
    );

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn faculty_methods_require_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    for (id, method, params) in [
        ("1", "faculty.list", json!({})),
        ("2", "faculty.search", json!({ "code": "UDD" })),
    ] {
        let resp = request(&mut stdin, &mut reader, id, method, params);
        assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(
            resp.get("error")
                .and_then(|e| e.get("code"))
                .and_then(|v| v.as_str()),
            Some("no_workspace"),
            "{} without a workspace",
            method
        );
    }
}

#[test]
fn reimport_refreshes_existing_codes() {
    let workspace = temp_dir("routined-faculty-refresh");
    let first = workspace.join("first.csv");
    let second = workspace.join("second.csv");
    write_file(&first, "code,name\nUDD,Old Name\n");
    write_file(&second, "code,name,email\nUDD,New Name,udd@example.edu\n");

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "faculty.importCsv",
        json!({ "path": first.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "faculty.importCsv",
        json!({ "path": second.to_string_lossy() }),
    );

    let listed = request_ok(&mut stdin, &mut reader, "4", "faculty.list", json!({}));
    let faculty = listed
        .get("faculty")
        .and_then(|v| v.as_array())
        .expect("faculty");
    assert_eq!(faculty.len(), 1);
    assert_eq!(faculty[0]["fullName"].as_str(), Some("New Name"));
    assert_eq!(faculty[0]["email"].as_str(), Some("udd@example.edu"));

    let _ = std::fs::remove_dir_all(workspace);
}
