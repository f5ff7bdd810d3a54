// Printable forms of a booth roster.

use crate::election::*;

const SIGNATURE: &str = "Signature";
const SIGNATURE_WIDTH: usize = 20;

fn booth_title(report: &BoothReport) -> String {
    let mut title = report.booth_name.clone();
    match (&report.room, &report.location) {
        (Some(room), Some(loc)) => title.push_str(&format!(" (Room {}, {})", room, loc)),
        (Some(room), None) => title.push_str(&format!(" (Room {})", room)),
        _ => {}
    }
    title
}

/// A fixed-width table with an empty signature column, ready to print.
pub fn render_text(report: &BoothReport) -> String {
    let header = ["#", "Adm No", "Name", "Department", "Year", "Stream"];
    let rows: Vec<[String; 6]> = report
        .rows
        .iter()
        .map(|r| {
            [
                r.serial.to_string(),
                r.admission_number.clone(),
                r.name.clone(),
                r.department.clone(),
                r.year.clone(),
                r.stream.clone(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows.iter() {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let format_line = |cells: &[&str]| -> String {
        let mut line = String::new();
        for (idx, cell) in cells.iter().enumerate() {
            line.push_str(&format!("{:<width$}  ", cell, width = widths[idx]));
        }
        line
    };

    let mut out = String::new();
    out.push_str(&booth_title(report));
    out.push('\n');
    out.push_str(&format!("Voters: {}\n\n", report.rows.len()));

    let mut head = format_line(&header[..]);
    head.push_str(SIGNATURE);
    out.push_str(&head);
    out.push('\n');
    out.push_str(&"-".repeat(head.chars().count()));
    out.push('\n');
    for row in rows.iter() {
        let cells: Vec<&str> = row.iter().map(|s| s.as_str()).collect();
        let mut line = format_line(&cells[..]);
        line.push_str(&"_".repeat(SIGNATURE_WIDTH));
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("\nPresiding Officer\n");
    out
}

pub fn render_csv(report: &BoothReport) -> ElectionResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Sl No", "Admission Number", "Name", "Department", "Year", "Stream", SIGNATURE])
        .context(CsvWriteSnafu {})?;
    for r in report.rows.iter() {
        wtr.write_record([
            r.serial.to_string().as_str(),
            r.admission_number.as_str(),
            r.name.as_str(),
            r.department.as_str(),
            r.year.as_str(),
            r.stream.as_str(),
            "",
        ])
        .context(CsvWriteSnafu {})?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(WritingFileSnafu { path: "csv" })?;
    Ok(String::from_utf8_lossy(&bytes).to_string())
}
