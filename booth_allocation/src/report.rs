use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::*;

/// One printed line of a booth roster.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RosterRow {
    pub serial: usize,
    #[serde(rename = "admissionNumber")]
    pub admission_number: String,
    pub name: String,
    pub department: String,
    pub year: String,
    pub stream: String,
}

/// The roster of one booth, ready to be rendered.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BoothReport {
    #[serde(rename = "boothId")]
    pub booth_id: String,
    #[serde(rename = "boothName")]
    pub booth_name: String,
    pub room: Option<String>,
    pub location: Option<String>,
    pub rows: Vec<RosterRow>,
}

// Years are usually small integers but the roll may hold labels such as "I" or "PG1".
fn compare_years(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u32>(), b.trim().parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.trim().cmp(b.trim()),
    }
}

fn roster_order(a: &Voter, b: &Voter) -> Ordering {
    a.department
        .trim()
        .to_uppercase()
        .cmp(&b.department.trim().to_uppercase())
        .then_with(|| compare_years(&a.year, &b.year))
        .then_with(|| a.name.cmp(&b.name))
}

/// Builds the roster of the voters currently referencing the booth,
/// sorted by department, year and name.
pub fn booth_report(booth: &Booth, voters: &[Voter]) -> Result<BoothReport, AllocationErrors> {
    let mut assigned: Vec<&Voter> = voters
        .iter()
        .filter(|v| v.booth_id.as_deref() == Some(booth.id.as_str()))
        .collect();
    debug!(
        "booth_report: booth {}: {} voters",
        booth.id,
        assigned.len()
    );
    if assigned.is_empty() {
        return Err(AllocationErrors::NoVotersAssigned {
            booth_id: booth.id.clone(),
        });
    }
    assigned.sort_by(|a, b| roster_order(a, b));

    let rows = assigned
        .iter()
        .enumerate()
        .map(|(idx, v)| RosterRow {
            serial: idx + 1,
            admission_number: v.admission_number.clone(),
            name: v.name.clone(),
            department: v.department.clone(),
            year: v.year.clone(),
            stream: v.stream.clone(),
        })
        .collect();

    Ok(BoothReport {
        booth_id: booth.id.clone(),
        booth_name: booth.name.clone(),
        room: booth.room.clone(),
        location: booth.location.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assigned(adm: &str, name: &str, dept: &str, year: &str, booth: &str) -> Voter {
        let mut v = Voter::new(adm, name, dept, year, "UG");
        v.booth_id = Some(booth.to_string());
        v
    }

    #[test]
    fn sorts_by_department_year_name() {
        let voters = vec![
            assigned("1", "Zara", "physics", "1", "b1"),
            assigned("2", "Amal", "Chemistry", "10", "b1"),
            assigned("3", "Binu", "chemistry", "2", "b1"),
            assigned("4", "Anu", "Chemistry", "2", "b1"),
            assigned("5", "Other", "Chemistry", "1", "b2"),
        ];
        let report = booth_report(&Booth::new("b1", "Booth 1"), &voters).unwrap();
        let names: Vec<&str> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Anu", "Binu", "Amal", "Zara"]);
        assert_eq!(report.rows[3].serial, 4);
    }

    #[test]
    fn empty_booth_has_no_report() {
        let voters = vec![assigned("1", "Zara", "PHYSICS", "1", "b2")];
        assert_eq!(
            booth_report(&Booth::new("b1", "Booth 1"), &voters),
            Err(AllocationErrors::NoVotersAssigned {
                booth_id: "b1".to_string()
            })
        );
    }
}
