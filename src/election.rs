use log::{debug, info, warn};

use booth_allocation::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::election::config_reader::*;
use crate::election::store::JsonStore;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_json;
mod render;
pub mod store;

#[derive(Debug, Snafu)]
pub enum ElectionError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing CSV"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} has no worksheet {worksheet}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("Unexpected cell type at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("File {path} has no header row"))]
    MissingHeader { path: String },
    #[snafu(display("No nominal roll given: use --input or rollSources in the configuration"))]
    MissingInput {},
    #[snafu(display("Unknown input type {input_type}"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Unknown report format {format}"))]
    UnknownFormat { format: String },
    #[snafu(display("Unknown booth {booth_id}"))]
    UnknownBooth { booth_id: String },
    #[snafu(display("{source}"))]
    Allocation { source: AllocationErrors },
    #[snafu(display("Allocation cancelled, nothing was written"))]
    Cancelled {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type ElectionResult<T> = Result<T, ElectionError>;

// Later rows replace earlier rows with the same admission number.
fn dedup_voters(voters: Vec<Voter>) -> Vec<Voter> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<Voter> = Vec::new();
    for v in voters {
        if let Some(idx) = index.get(&v.admission_number) {
            warn!(
                "dedup_voters: admission number {} appears more than once, keeping the last entry",
                v.admission_number
            );
            res[*idx] = v;
        } else {
            index.insert(v.admission_number.clone(), res.len());
            res.push(v);
        }
    }
    res
}

fn read_roll_source(root_path: &Path, source: &RollSource) -> ElectionResult<Vec<Voter>> {
    let p: PathBuf = root_path.join(&source.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read nominal roll {:?}", p2);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_roll(&p2),
        "xlsx" | "excel" => io_excel::read_excel_roll(&p2, source.excel_worksheet_name.as_deref()),
        "json" => io_json::read_json_roll(&p2),
        x => UnknownInputTypeSnafu { input_type: x }.fail(),
    }
}

pub fn run_import(
    store_dir: &str,
    input: Option<String>,
    input_type: Option<String>,
    excel_worksheet_name: Option<String>,
    config_path: Option<String>,
) -> ElectionResult<usize> {
    let config = match config_path.as_deref() {
        Some(p) => Some(read_config(p)?),
        None => None,
    };

    // The command line takes precedence over the sources of the configuration.
    let (root, sources): (PathBuf, Vec<RollSource>) = match (input, &config) {
        (Some(path), _) => (
            PathBuf::new(),
            vec![RollSource {
                provider: input_type.unwrap_or_else(|| "csv".to_string()),
                file_path: path,
                excel_worksheet_name,
            }],
        ),
        (None, Some(c)) if !c.roll_sources.is_empty() => {
            let config_p = Path::new(config_path.as_deref().unwrap_or("."));
            let root = config_p
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (root, c.roll_sources.clone())
        }
        _ => return MissingInputSnafu {}.fail(),
    };

    let mut data: Vec<Voter> = Vec::new();
    for source in sources.iter() {
        let mut file_data = read_roll_source(&root, source)?;
        debug!("run_import: {} voters in {}", file_data.len(), source.file_path);
        data.append(&mut file_data);
    }
    let voters = dedup_voters(data);

    let mut store = JsonStore::open(store_dir)?;
    store.replace_voters(voters);
    store.save()?;
    info!("Imported {} voters into {}", store.voters().len(), store_dir);
    Ok(store.voters().len())
}

pub fn run_generate_booths(store_dir: &str, count: usize) -> ElectionResult<Vec<Booth>> {
    let booths = generate_booths(count).context(AllocationSnafu {})?;
    let mut store = JsonStore::open(store_dir)?;
    if store.voters().iter().any(|v| v.booth_id.is_some()) {
        warn!("The booths were replaced: clearing the booth of every voter, run the allocation again");
        let voters = store
            .voters()
            .iter()
            .cloned()
            .map(|mut v| {
                v.booth_id = None;
                v.booth_name = None;
                v
            })
            .collect();
        store.replace_voters(voters);
    }
    store.replace_booths(booths);
    store.save()?;
    info!("Created {} booths in {}", count, store_dir);
    Ok(store.booths().to_vec())
}

pub fn run_assign_room(
    store_dir: &str,
    booth_id: &str,
    room: &str,
    location: Option<&str>,
) -> ElectionResult<Booth> {
    let mut store = JsonStore::open(store_dir)?;
    let booth = store
        .booth_mut(booth_id)
        .context(UnknownBoothSnafu { booth_id })?;
    booth.assign_room(room, location);
    let res = booth.clone();
    store.save()?;
    info!("Booth {} placed in room {}", booth_id, room);
    Ok(res)
}

fn build_summary_js(config: &ElectionConfig, plan: &AllocationPlan) -> JSValue {
    let c = OutputConfig {
        election: config.output_settings.election_name.clone(),
        date: config.output_settings.election_date.clone(),
    };
    json!({
        "config": c,
        "results": plan })
}

pub fn read_summary(path: &str) -> ElectionResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}

fn confirm(question: &str, input: &mut dyn BufRead) -> ElectionResult<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout()
        .flush()
        .context(WritingFileSnafu { path: "stdout" })?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context(OpeningFileSnafu { path: "stdin" })?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn write_output(out: &str, content: &str) -> ElectionResult<()> {
    if out == "stdout" {
        println!("{}", content);
        Ok(())
    } else {
        fs::write(out, content).context(WritingFileSnafu { path: out })
    }
}

pub fn run_allocate(
    store_dir: &str,
    config_path: Option<String>,
    yes: bool,
    out: Option<String>,
    check_summary_path: Option<String>,
    answers: &mut dyn BufRead,
) -> ElectionResult<AllocationPlan> {
    let config = match config_path.as_deref() {
        Some(p) => read_config(p)?,
        None => ElectionConfig::default(),
    };
    info!("config: {:?}", config);
    let rules = validate_rules(&config.rules)?;

    let mut store = JsonStore::open(store_dir)?;
    let voters = store.voters().to_vec();
    let booths = store.booths().to_vec();

    // Preconditions are checked before asking anything.
    let run = AllocationRun::new(&voters, &booths, &rules).context(AllocationSnafu {})?;

    if !yes {
        let question = format!(
            "Allocate {} voters across {} booths? Existing assignments will be overwritten.",
            voters.len(),
            booths.len()
        );
        if !confirm(&question, answers)? {
            return CancelledSnafu {}.fail();
        }
    }

    let plan = run.execute(&mut store).context(AllocationSnafu {})?;

    let result_js = build_summary_js(&config, &plan);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(SerializingJsonSnafu {})?;
    match out.or_else(|| config.output_settings.output_file.clone()) {
        Some(o) => write_output(&o, &pretty_js_stats)?,
        None => {
            for b in plan.booths.iter() {
                println!(
                    "{}: {} voters ({})",
                    b.booth_name,
                    b.voter_count,
                    b.assigned_groups.join(", ")
                );
            }
            if !plan.unassigned.is_empty() {
                println!("{} voters without department were not allocated", plan.unassigned.len());
            }
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(plan)
}

pub fn run_report(
    store_dir: &str,
    booth_id: &str,
    format: Option<String>,
    out: Option<String>,
) -> ElectionResult<String> {
    let store = JsonStore::open(store_dir)?;
    let booth = store
        .booths()
        .iter()
        .find(|b| b.id == booth_id)
        .context(UnknownBoothSnafu { booth_id })?;
    let report = booth_report(booth, store.voters()).context(AllocationSnafu {})?;

    let rendered = match format.as_deref().unwrap_or("text") {
        "text" => render::render_text(&report),
        "csv" => render::render_csv(&report)?,
        x => return UnknownFormatSnafu { format: x }.fail(),
    };
    write_output(out.as_deref().unwrap_or("stdout"), &rendered)?;
    Ok(rendered)
}
