use clap::{Parser, Subcommand};

/// This is a booth allocation program for college union elections.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replace the nominal roll of the store with the content of one or more files.
    Import {
        /// (directory) The directory holding the voter and booth documents.
        #[clap(short, long, value_parser)]
        store: String,
        /// (file path, optional) The file containing the nominal roll. Setting this option overrides
        /// the roll sources that may be specified with the --config option.
        #[clap(short, long, value_parser)]
        input: Option<String>,
        /// (default csv) The type of the input: csv, xlsx or json.
        #[clap(long, value_parser)]
        input_type: Option<String>,
        /// (default: first worksheet) When using an Excel file, the name of the worksheet to use.
        #[clap(long, value_parser)]
        excel_worksheet_name: Option<String>,
        /// (file path, optional) The election configuration in JSON format.
        #[clap(short, long, value_parser)]
        config: Option<String>,
    },
    /// Replace the booths of the store with a number of empty booths.
    Booths {
        #[clap(short, long, value_parser)]
        store: String,
        /// The number of booths to create.
        #[clap(long, value_parser)]
        count: usize,
    },
    /// Assign a room to a booth.
    Room {
        #[clap(short, long, value_parser)]
        store: String,
        /// The id of the booth.
        #[clap(short, long, value_parser)]
        booth: String,
        /// The room number.
        #[clap(short, long, value_parser)]
        room: String,
        /// (optional) A description of where the room is.
        #[clap(short, long, value_parser)]
        location: Option<String>,
    },
    /// Allocate every voter of the store to a booth.
    Allocate {
        #[clap(short, long, value_parser)]
        store: String,
        /// (file path, optional) The election configuration in JSON format, with the allocation rules.
        #[clap(short, long, value_parser)]
        config: Option<String>,
        /// Do not ask for a confirmation before writing the allocation.
        #[clap(short, long, takes_value = false)]
        yes: bool,
        /// (file path, 'stdout' or empty) If specified, the summary of the allocation will be written in
        /// JSON format to the given location. Setting this option overrides the output file that may be
        /// specified with the --config option.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference file containing the summary of an allocation in JSON format. If provided,
        /// boothalloc will check that the computed summary matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Print the roster of a booth.
    Report {
        #[clap(short, long, value_parser)]
        store: String,
        /// The id of the booth.
        #[clap(short, long, value_parser)]
        booth: String,
        /// (default text) The output format: text or csv.
        #[clap(short, long, value_parser)]
        format: Option<String>,
        /// (file path or empty) If specified, the roster is written to this file instead of the standard output.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },
}
