use serde::{Deserialize, Serialize};
use serde_json::json;

/// Canonical week ordering used everywhere a day is compared.
pub const DAY_ORDER: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Sort position for a day outside DAY_ORDER: one past Saturday, so
/// unrecognized days land after every valid day instead of breaking the sort.
pub const UNKNOWN_DAY_INDEX: usize = 7;

/// Sentinel materialized for entries without a room assignment.
pub const ROOM_TBD: &str = "TBD";

pub fn day_index(day: &str) -> usize {
    DAY_ORDER
        .iter()
        .position(|d| *d == day)
        .unwrap_or(UNKNOWN_DAY_INDEX)
}

#[derive(Debug, Clone, Serialize)]
pub struct TimetableError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl TimetableError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn conflict(day: &str, room: &str, slot: Slot, first: &Entry, second: &Entry) -> Self {
        Self {
            code: "slot_conflict".to_string(),
            message: format!(
                "two entries claim {} {} on {}: {} and {}",
                room,
                slot.label(),
                day,
                first.course,
                second.course
            ),
            details: Some(json!({ "first": first, "second": second })),
        }
    }
}

/// Parse a `"H:MM"` / `"HH:MM"` time-of-day string into minutes since
/// midnight. Digit widths are lenient (`"8:5"` is 08:05); the two parts must
/// be integers with hour 0-23 and minute 0-59.
pub fn parse_minutes(raw: &str) -> Result<u16, TimetableError> {
    let mut parts = raw.trim().splitn(2, ':');
    let (Some(hour_raw), Some(minute_raw)) = (parts.next(), parts.next()) else {
        return Err(TimetableError::new(
            "bad_time",
            format!("time '{}' is not in H:MM form", raw),
        ));
    };

    let hour: u16 = hour_raw
        .trim()
        .parse()
        .map_err(|_| TimetableError::new("bad_time", format!("bad hour in '{}'", raw)))?;
    let minute: u16 = minute_raw
        .trim()
        .parse()
        .map_err(|_| TimetableError::new("bad_time", format!("bad minute in '{}'", raw)))?;

    if hour > 23 {
        return Err(TimetableError::new(
            "bad_time",
            format!("hour out of range in '{}'", raw),
        ));
    }
    if minute > 59 {
        return Err(TimetableError::new(
            "bad_time",
            format!("minute out of range in '{}'", raw),
        ));
    }

    Ok(hour * 60 + minute)
}

pub fn format_minutes(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn time_label(start: u16, end: u16) -> String {
    format!("{} - {}", format_minutes(start), format_minutes(end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassType {
    Lecture,
    Tutorial,
    Lab,
    Exam,
    Free,
}

impl ClassType {
    pub fn parse(raw: &str) -> Option<ClassType> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lecture" => Some(ClassType::Lecture),
            "tutorial" => Some(ClassType::Tutorial),
            "lab" => Some(ClassType::Lab),
            "exam" => Some(ClassType::Exam),
            "free" => Some(ClassType::Free),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Lecture => "lecture",
            ClassType::Tutorial => "tutorial",
            ClassType::Lab => "lab",
            ClassType::Exam => "exam",
            ClassType::Free => "free",
        }
    }
}

/// One stored timetable row, before time/day validation. Room carries the
/// TBD sentinel already; the engine never sees a missing room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub course: String,
    pub section_code: String,
    pub room: String,
    pub faculty: String,
    pub class_type: String,
}

/// A validated entry: times normalized to minute-of-day, day resolved to its
/// canonical index (or the unknown sentinel).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub day: String,
    pub day_index: usize,
    pub start: u16,
    pub end: u16,
    pub time_label: String,
    pub course: String,
    pub section_code: String,
    pub room: String,
    pub faculty: String,
    pub class_type: ClassType,
    pub color_index: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub entry: RawEntry,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Consolidated {
    pub entries: Vec<Entry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate and order a raw snapshot.
///
/// Entries with unparseable times (or start >= end) are excluded from the
/// output and reported. Entries with an unrecognized day keep their place in
/// the flat list (sentinel-sorted after Saturday) and are reported; the grid
/// assembler skips them. The sort is stable: equal (day, start) keys keep
/// snapshot order.
pub fn consolidate(raw: Vec<RawEntry>) -> Consolidated {
    let mut entries = Vec::with_capacity(raw.len());
    let mut diagnostics = Vec::new();

    for item in raw {
        let start = match parse_minutes(&item.start_time) {
            Ok(v) => v,
            Err(e) => {
                diagnostics.push(Diagnostic {
                    code: e.code,
                    message: e.message,
                    entry: item,
                });
                continue;
            }
        };
        let end = match parse_minutes(&item.end_time) {
            Ok(v) => v,
            Err(e) => {
                diagnostics.push(Diagnostic {
                    code: e.code,
                    message: e.message,
                    entry: item,
                });
                continue;
            }
        };
        if start >= end {
            diagnostics.push(Diagnostic {
                code: "bad_time_range".to_string(),
                message: format!(
                    "start {} is not before end {}",
                    item.start_time, item.end_time
                ),
                entry: item,
            });
            continue;
        }

        let idx = day_index(&item.day);
        if idx == UNKNOWN_DAY_INDEX {
            diagnostics.push(Diagnostic {
                code: "unknown_day".to_string(),
                message: format!("'{}' is not a recognized weekday", item.day),
                entry: item.clone(),
            });
        }

        let class_type = match ClassType::parse(&item.class_type) {
            Some(t) => t,
            None => {
                diagnostics.push(Diagnostic {
                    code: "unknown_class_type".to_string(),
                    message: format!("'{}' is not a recognized class type", item.class_type),
                    entry: item.clone(),
                });
                ClassType::Lecture
            }
        };
        entries.push(Entry {
            day_index: idx,
            start,
            end,
            time_label: time_label(start, end),
            color_index: color_index(&item.course),
            class_type,
            day: item.day,
            course: item.course,
            section_code: item.section_code,
            room: item.room,
            faculty: item.faculty,
        });
    }

    entries.sort_by_key(|e| (e.day_index, e.start));

    Consolidated {
        entries,
        diagnostics,
    }
}

/// A grid column: one (start, end) interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub start: u16,
    pub end: u16,
}

impl Slot {
    pub fn label(&self) -> String {
        time_label(self.start, self.end)
    }
}

/// Distinct (start, end) pairs of one day's entries, ascending by start and
/// then end. Output never holds duplicates.
pub fn extract_slots(entries: &[Entry]) -> Vec<Slot> {
    let mut slots: Vec<Slot> = entries
        .iter()
        .map(|e| Slot {
            start: e.start,
            end: e.end,
        })
        .collect();
    slots.sort();
    slots.dedup();
    slots
}

/// The fixed display axis the interactive grid uses when columns are not
/// derived from the data: hourly slots from 08:30 to 17:30.
pub fn fixed_slots() -> Vec<Slot> {
    (0..9)
        .map(|i| Slot {
            start: 510 + i * 60,
            end: 570 + i * 60,
        })
        .collect()
}

/// How an entry claims a slot. One policy per assembled matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPolicy {
    /// Entry occupies a slot iff the intervals are identical. Used with
    /// slots extracted from the entries themselves.
    Exact,
    /// Entry occupies every slot its interval overlaps. Used with the fixed
    /// display axis, where an entry may span multiple columns.
    Overlap,
}

impl SlotPolicy {
    pub fn parse(raw: &str) -> Option<SlotPolicy> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(SlotPolicy::Exact),
            "overlap" => Some(SlotPolicy::Overlap),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotPolicy::Exact => "exact",
            SlotPolicy::Overlap => "overlap",
        }
    }

    pub fn occupies(&self, entry: &Entry, slot: Slot) -> bool {
        match self {
            SlotPolicy::Exact => entry.start == slot.start && entry.end == slot.end,
            SlotPolicy::Overlap => entry.start < slot.end && entry.end > slot.start,
        }
    }
}

/// One day's room x slot matrix. `cells[r][s]` is the entry in room `r`
/// during slot `s`, if any. Rooms are in first-seen order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGrid {
    pub day: String,
    pub slots: Vec<Slot>,
    pub rooms: Vec<String>,
    pub cells: Vec<Vec<Option<Entry>>>,
}

impl DayGrid {
    /// Room-major, slot-minor walk of the occupied cells. For a
    /// conflict-free exact-policy grid this reproduces the day's entry set.
    pub fn flatten(&self) -> Vec<&Entry> {
        self.cells
            .iter()
            .flat_map(|row| row.iter().filter_map(|c| c.as_ref()))
            .collect()
    }
}

/// Place one day's entries into a room x slot matrix under the given policy.
/// Two entries sharing a room and a start time are a data conflict whatever
/// the policy; so is a second entry mapping to an occupied cell. The
/// conflict carries both entries and the first is never overwritten.
pub fn assemble_day(
    day: &str,
    entries: &[Entry],
    policy: SlotPolicy,
) -> Result<DayGrid, TimetableError> {
    let mut seen: Vec<&Entry> = Vec::new();
    for entry in entries {
        if let Some(existing) = seen
            .iter()
            .find(|e| e.room == entry.room && e.start == entry.start)
        {
            let slot = Slot {
                start: existing.start,
                end: existing.end,
            };
            return Err(TimetableError::conflict(
                day,
                &entry.room,
                slot,
                existing,
                entry,
            ));
        }
        seen.push(entry);
    }

    let slots = match policy {
        SlotPolicy::Exact => extract_slots(entries),
        SlotPolicy::Overlap => fixed_slots(),
    };

    // Assign each entry its room row as the room list is built, so the
    // placement loop never has to look a room up again.
    let mut rooms: Vec<String> = Vec::new();
    let mut row_of: Vec<usize> = Vec::with_capacity(entries.len());
    for entry in entries {
        let row = match rooms.iter().position(|r| *r == entry.room) {
            Some(i) => i,
            None => {
                rooms.push(entry.room.clone());
                rooms.len() - 1
            }
        };
        row_of.push(row);
    }

    let mut cells: Vec<Vec<Option<Entry>>> = vec![vec![None; slots.len()]; rooms.len()];

    for (entry, &row) in entries.iter().zip(&row_of) {
        for (col, slot) in slots.iter().enumerate() {
            if !policy.occupies(entry, *slot) {
                continue;
            }
            if let Some(existing) = &cells[row][col] {
                return Err(TimetableError::conflict(
                    day,
                    &entry.room,
                    *slot,
                    existing,
                    entry,
                ));
            }
            cells[row][col] = Some(entry.clone());
        }
    }

    Ok(DayGrid {
        day: day.to_string(),
        slots,
        rooms,
        cells,
    })
}

/// Build per-day grids in canonical day order. Days without entries are
/// omitted; entries with an unrecognized day never reach a grid.
pub fn assemble_grid(
    entries: &[Entry],
    policy: SlotPolicy,
) -> Result<Vec<DayGrid>, TimetableError> {
    let mut days = Vec::new();
    for (idx, day) in DAY_ORDER.iter().enumerate() {
        let day_entries: Vec<Entry> = entries
            .iter()
            .filter(|e| e.day_index == idx)
            .cloned()
            .collect();
        if day_entries.is_empty() {
            continue;
        }
        days.push(assemble_day(day, &day_entries, policy)?);
    }
    Ok(days)
}

/// One row of the flat chronological listing handed to the document
/// exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRow {
    pub day: String,
    pub time_label: String,
    pub course: String,
    pub room: String,
    pub faculty: String,
    #[serde(rename = "type")]
    pub class_type: ClassType,
}

pub fn flat_rows(entries: &[Entry]) -> Vec<FlatRow> {
    entries
        .iter()
        .map(|e| FlatRow {
            day: e.day.clone(),
            time_label: e.time_label.clone(),
            course: e.course.clone(),
            room: e.room.clone(),
            faculty: e.faculty.clone(),
            class_type: e.class_type,
        })
        .collect()
}

/// Presentation palette for course chips. Index is a stable hash of the
/// course code; purely cosmetic, never a business decision.
pub const COURSE_PALETTE: [&str; 8] = [
    "#2563eb", "#16a34a", "#d97706", "#dc2626", "#7c3aed", "#0d9488", "#db2777", "#4b5563",
];

pub fn color_index(course: &str) -> usize {
    // djb2
    let mut hash: u32 = 5381;
    for b in course.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as u32);
    }
    (hash as usize) % COURSE_PALETTE.len()
}

pub fn course_color(course: &str) -> &'static str {
    COURSE_PALETTE[color_index(course)]
}
