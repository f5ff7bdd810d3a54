// Primitives for reading nominal rolls in CSV files.

use crate::election::{
    io_common::{make_default_id, RollColumns},
    *,
};

pub fn read_csv_roll(path: &str) -> ElectionResult<Vec<Voter>> {
    let default_id = make_default_id(path);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    ensure!(
        headers.iter().any(|h| !h.is_empty()),
        MissingHeaderSnafu { path }
    );
    let columns = RollColumns::from_headers(&headers);
    debug!("read_csv_roll: headers: {:?} columns: {:?}", headers, columns);

    let mut res: Vec<Voter> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if row.iter().all(|s| s.is_empty()) {
            debug!("read_csv_roll: skipping empty line {}", lineno);
            continue;
        }
        let v = columns.voter(&row, || default_id(lineno));
        debug!("read_csv_roll: lineno: {:?} voter: {:?}", lineno, v);
        res.push(v);
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_roll_with_loose_headers() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("roll.csv");
        fs::write(
            &p,
            "Sl No,Name,Gender,Dept,Year,Stream,Adm No\n\
             1,Sample,Male,Botany,1,UG,12345\n\
             ,,,,,,\n\
             2,Other,Female,Zoology,2,PG,\n",
        )
        .unwrap();
        let voters = read_csv_roll(&p.display().to_string()).unwrap();
        assert_eq!(voters.len(), 2);
        assert_eq!(voters[0].admission_number, "12345");
        assert_eq!(voters[0].department, "Botany");
        assert_eq!(voters[0].gender.as_deref(), Some("Male"));
        assert_eq!(voters[1].stream, "PG");
        assert_eq!(voters[1].admission_number, "roll.csv-00000004");
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_csv_roll("/nonexistent/roll.csv"),
            Err(ElectionError::CsvOpen { .. })
        ));
    }
}
