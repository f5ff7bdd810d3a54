use std::path::Path;

use booth_allocation::Voter;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

// Spreadsheets exported by different offices name the same column in many ways.
const NAME_KEYS: &[&str] = &["name", "studentname", "candidate", "nameofstudent"];
const GENDER_KEYS: &[&str] = &["gender", "sex"];
const DEPARTMENT_KEYS: &[&str] = &["dept", "department", "course", "branch"];
const YEAR_KEYS: &[&str] = &["year", "yr", "class", "semester", "sem"];
const STREAM_KEYS: &[&str] = &["stream", "degree", "ugpg"];
const ADMISSION_KEYS: &[&str] = &[
    "admno",
    "admnno",
    "admissionno",
    "admissionnumber",
    "rollno",
    "rollnumber",
    "regno",
    "enrollment",
    "id",
];

/// Lowercase, alphanumeric characters only: `Adm. No` becomes `admno`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// The first column whose normalized header equals or contains one of the keys,
/// trying the keys in order.
fn find_column(headers: &[String], keys: &[&str]) -> Option<usize> {
    keys.iter().find_map(|key| {
        headers
            .iter()
            .position(|h| h == key || h.contains(key))
    })
}

/// The positions of the nominal roll fields in a header row.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RollColumns {
    pub name: Option<usize>,
    pub gender: Option<usize>,
    pub department: Option<usize>,
    pub year: Option<usize>,
    pub stream: Option<usize>,
    pub admission_number: Option<usize>,
}

impl RollColumns {
    pub fn from_headers(headers: &[String]) -> RollColumns {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        RollColumns {
            name: find_column(&normalized, NAME_KEYS),
            gender: find_column(&normalized, GENDER_KEYS),
            department: find_column(&normalized, DEPARTMENT_KEYS),
            year: find_column(&normalized, YEAR_KEYS),
            stream: find_column(&normalized, STREAM_KEYS),
            admission_number: find_column(&normalized, ADMISSION_KEYS),
        }
    }

    /// Builds a voter out of one row. Missing or blank cells fall back to defaults.
    pub fn voter(&self, row: &[String], default_id: impl Fn() -> String) -> Voter {
        let get = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| row.get(i))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Voter {
            admission_number: get(self.admission_number).unwrap_or_else(default_id),
            name: get(self.name).unwrap_or_else(|| "Unknown".to_string()),
            gender: get(self.gender),
            department: get(self.department).unwrap_or_default(),
            year: get(self.year).unwrap_or_default(),
            stream: get(self.stream).unwrap_or_else(|| "UG".to_string()),
            booth_id: None,
            booth_name: None,
        }
    }
}
