pub use crate::config::*;
use crate::{generate_booths, AllocationRun, BulkWriter};

/// A builder for assembling a nominal roll and its booths.
///
/// ```
/// pub use booth_allocation::builder::Builder;
/// pub use booth_allocation::AllocationRules;
/// # use booth_allocation::AllocationErrors;
///
/// let mut builder = Builder::new(&AllocationRules::DEFAULT_RULES)?
///     .booths(&["Main Hall".to_string(), "Library".to_string()])?;
///
/// builder.add_voter_simple("1001", "Anna", "Physics", "1", "UG")?;
/// builder.add_voter_simple("1002", "Bob", "History", "2", "PG")?;
///
/// let plan = builder.plan()?;
/// assert_eq!(plan.booths[0].booth_name, "Main Hall");
///
/// # Ok::<(), AllocationErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AllocationRules,
    pub(crate) _booths: Vec<Booth>,
    pub(crate) _voters: Vec<Voter>,
}

impl Builder {
    pub fn new(rules: &AllocationRules) -> Result<Builder, AllocationErrors> {
        if rules.chunk_size == 0 {
            return Err(AllocationErrors::InvalidChunkSize);
        }
        Ok(Builder {
            _rules: rules.clone(),
            _booths: Vec::new(),
            _voters: Vec::new(),
        })
    }

    /// Replaces the booths with booths of the given names, identified by position.
    pub fn booths(self, names: &[String]) -> Result<Builder, AllocationErrors> {
        if names.is_empty() {
            return Err(AllocationErrors::NoBooths);
        }
        Ok(Builder {
            _rules: self._rules,
            _booths: names
                .iter()
                .enumerate()
                .map(|(idx, name)| Booth::new(&(idx + 1).to_string(), name))
                .collect(),
            _voters: self._voters,
        })
    }

    /// Replaces the booths with `count` generated booths.
    pub fn generated_booths(self, count: usize) -> Result<Builder, AllocationErrors> {
        Ok(Builder {
            _rules: self._rules,
            _booths: generate_booths(count)?,
            _voters: self._voters,
        })
    }

    /// Adds a voter from its roll fields.
    pub fn add_voter_simple(
        &mut self,
        admission_number: &str,
        name: &str,
        department: &str,
        year: &str,
        stream: &str,
    ) -> Result<(), AllocationErrors> {
        self.add_voter(&Voter::new(admission_number, name, department, year, stream))
    }

    /// Adds a voter. A voter with the same admission number replaces the previous one.
    pub fn add_voter(&mut self, voter: &Voter) -> Result<(), AllocationErrors> {
        match self
            ._voters
            .iter_mut()
            .find(|v| v.admission_number == voter.admission_number)
        {
            Some(existing) => *existing = voter.clone(),
            None => self._voters.push(voter.clone()),
        }
        Ok(())
    }

    pub fn voters(&self) -> &[Voter] {
        &self._voters
    }

    /// Computes the allocation of the voters added so far.
    pub fn plan(&self) -> Result<AllocationPlan, AllocationErrors> {
        AllocationRun::new(&self._voters, &self._booths, &self._rules)?.plan()
    }

    /// Computes the allocation and persists it through the writer.
    pub fn execute(&self, writer: &mut dyn BulkWriter) -> Result<AllocationPlan, AllocationErrors> {
        AllocationRun::new(&self._voters, &self._booths, &self._rules)?.execute(writer)
    }
}
