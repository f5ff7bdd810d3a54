use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::election::{
    io_common::{make_default_id, RollColumns},
    *,
};

pub fn read_excel_roll(path: &str, worksheet_name: Option<&str>) -> ElectionResult<Vec<Voter>> {
    let default_id = make_default_id(path);

    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet_name {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .context(MissingWorksheetSnafu {
        path,
        worksheet: worksheet_name.unwrap_or("#1"),
    })?
    .context(OpeningExcelSnafu { path })?;

    let mut iter = wrange.rows();
    let header = iter.next().context(MissingHeaderSnafu { path })?;
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, c)| read_cell(c, 1, idx))
        .collect::<ElectionResult<Vec<String>>>()?;
    let columns = RollColumns::from_headers(&headers);
    debug!(
        "read_excel_roll: header: {:?} columns: {:?}",
        headers, columns
    );

    let mut res: Vec<Voter> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // Spreadsheet line numbers: the header is line 1.
        let lineno = idx + 2;
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, c)| read_cell(c, lineno, col))
            .collect::<ElectionResult<Vec<String>>>()?;
        if cells.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        let v = columns.voter(&cells, || default_id(lineno));
        debug!("read_excel_roll: lineno: {:?} voter: {:?}", lineno, v);
        res.push(v);
    }
    Ok(res)
}

fn read_cell(cell: &DataType, lineno: usize, col: usize) -> ElectionResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        // Admission numbers and years are often typed as numbers.
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("column {}: {:?}", col + 1, cell),
        }
        .fail(),
    }
}
