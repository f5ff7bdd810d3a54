use log::{debug, info};
use std::collections::HashMap;

use crate::config::*;

/// One write against the voter or booth collections.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum WriteOp {
    UpdateBooth {
        booth_id: String,
        voter_count: u64,
        assigned_groups: Vec<String>,
    },
    UpdateVoter {
        admission_number: String,
        booth_id: String,
        booth_name: String,
    },
    /// Removes a stale booth reference from a voter left out of the run.
    ClearVoter { admission_number: String },
}

/// The error reported by a storage backend when a chunk cannot be committed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct WriteError {
    pub message: String,
}

impl WriteError {
    pub fn new(message: impl Into<String>) -> WriteError {
        WriteError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WriteError {}

/// A storage backend that accepts writes in bounded batches.
///
/// Each call commits one chunk atomically or not at all. Chunks are always
/// presented in order and the caller stops at the first failure.
pub trait BulkWriter {
    fn commit_chunk(&mut self, chunk_index: usize, ops: &[WriteOp]) -> Result<(), WriteError>;
}

/// Translates a plan into the writes that persist it: booth updates first,
/// then assigned voters, then the voters left out of the run.
pub fn plan_writes(plan: &AllocationPlan) -> Vec<WriteOp> {
    let mut ops: Vec<WriteOp> = Vec::new();
    for b in plan.booths.iter() {
        ops.push(WriteOp::UpdateBooth {
            booth_id: b.booth_id.clone(),
            voter_count: b.voter_count,
            assigned_groups: b.assigned_groups.clone(),
        });
    }
    for b in plan.booths.iter() {
        for adm in b.members.iter() {
            ops.push(WriteOp::UpdateVoter {
                admission_number: adm.clone(),
                booth_id: b.booth_id.clone(),
                booth_name: b.booth_name.clone(),
            });
        }
    }
    for adm in plan.unassigned.iter() {
        ops.push(WriteOp::ClearVoter {
            admission_number: adm.clone(),
        });
    }
    ops
}

/// Persists the plan through the writer, `chunk_size` writes at a time.
///
/// Returns the number of chunks committed. On failure, the chunks before the
/// failing one stay committed and nothing is rolled back.
pub fn write_plan(
    plan: &AllocationPlan,
    writer: &mut dyn BulkWriter,
    chunk_size: usize,
) -> Result<usize, AllocationErrors> {
    if chunk_size == 0 {
        return Err(AllocationErrors::InvalidChunkSize);
    }
    let ops = plan_writes(plan);
    info!(
        "write_plan: {} writes in chunks of {}",
        ops.len(),
        chunk_size
    );
    let mut committed = 0;
    for (chunk_index, chunk) in ops.chunks(chunk_size).enumerate() {
        debug!(
            "write_plan: committing chunk {} ({} writes)",
            chunk_index,
            chunk.len()
        );
        writer
            .commit_chunk(chunk_index, chunk)
            .map_err(|e| AllocationErrors::ChunkCommitFailed {
                chunk_index,
                message: e.message,
            })?;
        committed += 1;
    }
    Ok(committed)
}

/// A document store held in memory.
///
/// Applies the writes of each chunk to its voters and booths. A chunk that
/// references an unknown document is rejected as a whole.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemoryStore {
    pub voters: Vec<Voter>,
    pub booths: Vec<Booth>,
}

impl MemoryStore {
    pub fn new(voters: Vec<Voter>, booths: Vec<Booth>) -> MemoryStore {
        MemoryStore { voters, booths }
    }

    fn check_chunk(&self, ops: &[WriteOp]) -> Result<(), WriteError> {
        for op in ops {
            match op {
                WriteOp::UpdateBooth { booth_id, .. } => {
                    if !self.booths.iter().any(|b| b.id == *booth_id) {
                        return Err(WriteError::new(format!("unknown booth {}", booth_id)));
                    }
                }
                WriteOp::UpdateVoter {
                    admission_number, ..
                }
                | WriteOp::ClearVoter { admission_number } => {
                    if !self
                        .voters
                        .iter()
                        .any(|v| v.admission_number == *admission_number)
                    {
                        return Err(WriteError::new(format!(
                            "unknown voter {}",
                            admission_number
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl BulkWriter for MemoryStore {
    fn commit_chunk(&mut self, chunk_index: usize, ops: &[WriteOp]) -> Result<(), WriteError> {
        self.check_chunk(ops)?;
        let voter_idx: HashMap<String, usize> = self
            .voters
            .iter()
            .enumerate()
            .map(|(idx, v)| (v.admission_number.clone(), idx))
            .collect();
        for op in ops {
            match op {
                WriteOp::UpdateBooth {
                    booth_id,
                    voter_count,
                    assigned_groups,
                } => {
                    for b in self.booths.iter_mut().filter(|b| b.id == *booth_id) {
                        b.voter_count = *voter_count;
                        b.assigned_groups = assigned_groups.clone();
                    }
                }
                WriteOp::UpdateVoter {
                    admission_number,
                    booth_id,
                    booth_name,
                } => {
                    if let Some(idx) = voter_idx.get(admission_number) {
                        let v = &mut self.voters[*idx];
                        v.booth_id = Some(booth_id.clone());
                        v.booth_name = Some(booth_name.clone());
                    }
                }
                WriteOp::ClearVoter { admission_number } => {
                    if let Some(idx) = voter_idx.get(admission_number) {
                        let v = &mut self.voters[*idx];
                        v.booth_id = None;
                        v.booth_name = None;
                    }
                }
            }
        }
        debug!("MemoryStore: chunk {} applied ({} writes)", chunk_index, ops.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter {
        fail_at: usize,
        committed: Vec<usize>,
    }

    impl BulkWriter for FailingWriter {
        fn commit_chunk(&mut self, chunk_index: usize, _ops: &[WriteOp]) -> Result<(), WriteError> {
            if chunk_index == self.fail_at {
                return Err(WriteError::new("quota exceeded"));
            }
            self.committed.push(chunk_index);
            Ok(())
        }
    }

    fn plan_with(members: &[&str]) -> AllocationPlan {
        AllocationPlan {
            booths: vec![BoothLoad {
                booth_id: "1".to_string(),
                booth_name: "Booth 1".to_string(),
                voter_count: members.len() as u64,
                assigned_groups: vec!["CS".to_string()],
                members: members.iter().map(|s| s.to_string()).collect(),
            }],
            placements: vec![],
            unassigned: vec![],
        }
    }

    #[test]
    fn writes_booths_before_voters() {
        let ops = plan_writes(&plan_with(&["a", "b"]));
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[0], WriteOp::UpdateBooth { voter_count: 2, .. }));
        assert!(matches!(ops[2], WriteOp::UpdateVoter { .. }));
    }

    #[test]
    fn splits_into_chunks() {
        let plan = plan_with(&["a", "b", "c", "d", "e", "f"]);
        let mut w = FailingWriter {
            fail_at: usize::MAX,
            committed: vec![],
        };
        // 7 writes in chunks of 3
        assert_eq!(write_plan(&plan, &mut w, 3), Ok(3));
        assert_eq!(w.committed, vec![0, 1, 2]);
    }

    #[test]
    fn stops_at_failing_chunk() {
        let plan = plan_with(&["a", "b", "c", "d", "e", "f"]);
        let mut w = FailingWriter {
            fail_at: 1,
            committed: vec![],
        };
        let res = write_plan(&plan, &mut w, 2);
        assert_eq!(
            res,
            Err(AllocationErrors::ChunkCommitFailed {
                chunk_index: 1,
                message: "quota exceeded".to_string()
            })
        );
        assert_eq!(w.committed, vec![0]);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let mut store = MemoryStore::default();
        assert_eq!(
            write_plan(&plan_with(&["a"]), &mut store, 0),
            Err(AllocationErrors::InvalidChunkSize)
        );
    }

    #[test]
    fn memory_store_rejects_unknown_documents() {
        let mut store = MemoryStore::new(vec![], vec![Booth::new("1", "Booth 1")]);
        let res = write_plan(&plan_with(&["ghost"]), &mut store, 10);
        assert!(matches!(
            res,
            Err(AllocationErrors::ChunkCommitFailed { chunk_index: 0, .. })
        ));
        // The whole chunk was rejected, including the booth update.
        assert_eq!(store.booths[0].voter_count, 0);
    }
}
