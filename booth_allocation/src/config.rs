// ********* Input data structures ***********

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// One entry of the nominal roll.
///
/// The booth fields are only ever written by the allocator.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "admissionNumber")]
    pub admission_number: String,
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub stream: String,
    #[serde(rename = "boothId", default)]
    pub booth_id: Option<String>,
    #[serde(rename = "boothName", default)]
    pub booth_name: Option<String>,
}

impl Voter {
    pub fn new(
        admission_number: &str,
        name: &str,
        department: &str,
        year: &str,
        stream: &str,
    ) -> Voter {
        Voter {
            admission_number: admission_number.to_string(),
            name: name.to_string(),
            gender: None,
            department: department.to_string(),
            year: year.to_string(),
            stream: stream.to_string(),
            booth_id: None,
            booth_name: None,
        }
    }
}

/// A physical polling station.
///
/// There is no declared capacity: the allocator only balances the relative load.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Booth {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "voterCount", default)]
    pub voter_count: u64,
    #[serde(rename = "assignedGroups", default)]
    pub assigned_groups: Vec<String>,
}

impl Booth {
    pub fn new(id: &str, name: &str) -> Booth {
        Booth {
            id: id.to_string(),
            name: name.to_string(),
            room: None,
            location: None,
            voter_count: 0,
            assigned_groups: Vec::new(),
        }
    }

    /// Places the booth in a room. This does not touch the voter load.
    pub fn assign_room(&mut self, room: &str, location: Option<&str>) {
        self.room = Some(room.to_string());
        self.location = location.map(|s| s.to_string());
    }
}

/// A unit of work for the packer: a whole department, or one class
/// (department, year, stream) of the largest department.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AllocationGroup {
    pub name: String,
    pub members: Vec<Voter>,
}

impl AllocationGroup {
    pub fn size(&self) -> u64 {
        self.members.len() as u64
    }
}

// ******** Output data structures *********

/// The final state of one booth after packing.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct BoothLoad {
    #[serde(rename = "boothId")]
    pub booth_id: String,
    #[serde(rename = "boothName")]
    pub booth_name: String,
    #[serde(rename = "voterCount")]
    pub voter_count: u64,
    #[serde(rename = "assignedGroups")]
    pub assigned_groups: Vec<String>,
    /// Admission numbers of the voters placed in this booth, in placement order.
    #[serde(skip)]
    pub members: Vec<String>,
}

/// One step of the packer: a group and the booth that received it.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub group: String,
    pub size: u64,
    #[serde(rename = "boothId")]
    pub booth_id: String,
}

/// In-memory summary of an allocation run, in booth-list order.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub booths: Vec<BoothLoad>,
    /// The packing steps, in the order they were made.
    pub placements: Vec<Placement>,
    /// Voters left out of the allocation because their department is empty.
    pub unassigned: Vec<String>,
}

impl AllocationPlan {
    pub fn total_assigned(&self) -> u64 {
        self.booths.iter().map(|b| b.voter_count).sum()
    }
}

/// Errors that prevent an allocation run from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AllocationErrors {
    NoVoters,
    NoBooths,
    NoVotersAssigned { booth_id: String },
    InvalidChunkSize,
    /// A department carries the name of the catch-all group.
    ReservedDepartmentName { department: String },
    /// A chunk could not be committed. The chunks before it remain written.
    ChunkCommitFailed { chunk_index: usize, message: String },
}

impl Error for AllocationErrors {}

impl Display for AllocationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationErrors::NoVoters => write!(f, "no voters found"),
            AllocationErrors::NoBooths => write!(f, "no booths found, create booths first"),
            AllocationErrors::NoVotersAssigned { booth_id } => {
                write!(f, "no voters assigned to booth {}", booth_id)
            }
            AllocationErrors::InvalidChunkSize => write!(f, "the chunk size must be at least 1"),
            AllocationErrors::ReservedDepartmentName { department } => write!(
                f,
                "department {} has the name of the group of voters without department",
                department
            ),
            AllocationErrors::ChunkCommitFailed {
                chunk_index,
                message,
            } => write!(f, "failed to commit chunk {}: {}", chunk_index, message),
        }
    }
}

// ********* Configuration **********

/// How to pick the department to split when several share the largest size.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SplitTieBreak {
    /// The smallest normalized department name wins.
    Alphabetical,
    /// The department that appears first in the nominal roll wins.
    FirstEncountered,
}

/// What happens to voters whose department is empty.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum MissingDepartmentPolicy {
    /// Left without a booth and listed in the plan.
    LeaveUnassigned,
    /// Allocated together in a group named [`CATCH_ALL_GROUP`]. No department
    /// may then have that name.
    CatchAllGroup,
}

pub const CATCH_ALL_GROUP: &str = "UNASSIGNED";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AllocationRules {
    pub split_tie_break: SplitTieBreak,
    pub missing_department: MissingDepartmentPolicy,
    /// Split the single largest department into classes before packing.
    pub split_largest: bool,
    /// Maximum number of writes per committed chunk.
    pub chunk_size: usize,
}

impl AllocationRules {
    pub const DEFAULT_RULES: AllocationRules = AllocationRules {
        split_tie_break: SplitTieBreak::Alphabetical,
        missing_department: MissingDepartmentPolicy::LeaveUnassigned,
        split_largest: true,
        chunk_size: 500,
    };
}
