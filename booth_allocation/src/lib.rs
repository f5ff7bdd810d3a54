pub mod builder;
mod config;
pub mod manual;
mod report;
mod writer;

use log::{debug, info, warn};

pub use crate::config::*;
pub use crate::report::*;
pub use crate::writer::*;

// **** Grouping ****

/// The nominal roll partitioned by department.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Grouping {
    /// Normalized department name and its voters, in order of first appearance.
    pub departments: Vec<(String, Vec<Voter>)>,
    /// Voters without a department.
    pub missing: Vec<Voter>,
}

fn normalize_key(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Partitions the voters by department (trimmed and upper-cased).
///
/// Voters with an empty department are kept apart in [`Grouping::missing`].
pub fn group_by_department(voters: &[Voter]) -> Result<Grouping, AllocationErrors> {
    if voters.is_empty() {
        return Err(AllocationErrors::NoVoters);
    }
    let mut departments: Vec<(String, Vec<Voter>)> = Vec::new();
    let mut missing: Vec<Voter> = Vec::new();
    for v in voters.iter() {
        let dept = normalize_key(&v.department);
        if dept.is_empty() {
            warn!(
                "group_by_department: voter {} has no department",
                v.admission_number
            );
            missing.push(v.clone());
            continue;
        }
        match departments.iter_mut().find(|(name, _)| *name == dept) {
            Some((_, members)) => members.push(v.clone()),
            None => departments.push((dept, vec![v.clone()])),
        }
    }
    debug!(
        "group_by_department: {} departments, {} voters without department",
        departments.len(),
        missing.len()
    );
    Ok(Grouping {
        departments,
        missing,
    })
}

// **** Splitting ****

/// The index of the department to split, following the tie-break rule.
fn largest_department(
    departments: &[(String, Vec<Voter>)],
    tie_break: SplitTieBreak,
) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, (name, members)) in departments.iter().enumerate() {
        best = match best {
            None => Some(idx),
            Some(b) => {
                let (best_name, best_members) = &departments[b];
                let replace = members.len() > best_members.len()
                    || (members.len() == best_members.len()
                        && tie_break == SplitTieBreak::Alphabetical
                        && name < best_name);
                if replace {
                    Some(idx)
                } else {
                    Some(b)
                }
            }
        };
    }
    best
}

fn class_name(dept: &str, voter: &Voter) -> String {
    let year = normalize_key(&voter.year);
    let stream = normalize_key(&voter.stream);
    [dept, year.as_str(), stream.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect::<Vec<&str>>()
        .join(" ")
}

fn split_by_class(dept: &str, members: &[Voter]) -> Vec<AllocationGroup> {
    let mut groups: Vec<AllocationGroup> = Vec::new();
    for v in members.iter() {
        let name = class_name(dept, v);
        match groups.iter_mut().find(|g| g.name == name) {
            Some(g) => g.members.push(v.clone()),
            None => groups.push(AllocationGroup {
                name,
                members: vec![v.clone()],
            }),
        }
    }
    groups
}

/// Turns the grouping into the flat list of groups handed to the packer.
///
/// The largest department is replaced, in place, by one group per
/// (department, year, stream) class. All the other departments stay whole.
pub fn split_largest_group(grouping: &Grouping, rules: &AllocationRules) -> Vec<AllocationGroup> {
    let giant = if rules.split_largest {
        largest_department(&grouping.departments, rules.split_tie_break)
    } else {
        None
    };

    let mut groups: Vec<AllocationGroup> = Vec::new();
    for (idx, (dept, members)) in grouping.departments.iter().enumerate() {
        if Some(idx) == giant {
            let classes = split_by_class(dept, members);
            info!(
                "split_largest_group: splitting {} ({} voters) into {} classes",
                dept,
                members.len(),
                classes.len()
            );
            groups.extend(classes);
        } else {
            groups.push(AllocationGroup {
                name: dept.clone(),
                members: members.clone(),
            });
        }
    }

    if rules.missing_department == MissingDepartmentPolicy::CatchAllGroup
        && !grouping.missing.is_empty()
    {
        groups.push(AllocationGroup {
            name: CATCH_ALL_GROUP.to_string(),
            members: grouping.missing.clone(),
        });
    }
    groups
}

// **** Packing ****

/// Places the groups on the booths, largest group first, each onto the
/// booth with the lowest load so far.
///
/// Every booth starts empty. Ties between booths go to the first one in
/// the list. Groups of equal size keep their relative order.
pub fn pack_groups(
    groups: &[AllocationGroup],
    booths: &[Booth],
) -> Result<AllocationPlan, AllocationErrors> {
    if booths.is_empty() {
        return Err(AllocationErrors::NoBooths);
    }
    let mut loads: Vec<BoothLoad> = booths
        .iter()
        .map(|b| BoothLoad {
            booth_id: b.id.clone(),
            booth_name: b.name.clone(),
            voter_count: 0,
            assigned_groups: Vec::new(),
            members: Vec::new(),
        })
        .collect();

    let mut sorted: Vec<&AllocationGroup> = groups.iter().collect();
    // sort_by_key is stable
    sorted.sort_by_key(|g| std::cmp::Reverse(g.size()));

    let mut placements: Vec<Placement> = Vec::new();
    for group in sorted {
        let mut target = 0;
        for (idx, load) in loads.iter().enumerate() {
            if load.voter_count < loads[target].voter_count {
                target = idx;
            }
        }
        let load = &mut loads[target];
        debug!(
            "pack_groups: {} ({}) -> {} (load {})",
            group.name,
            group.size(),
            load.booth_name,
            load.voter_count
        );
        load.voter_count += group.size();
        load.assigned_groups.push(group.name.clone());
        load.members
            .extend(group.members.iter().map(|v| v.admission_number.clone()));
        placements.push(Placement {
            group: group.name.clone(),
            size: group.size(),
            booth_id: load.booth_id.clone(),
        });
    }

    Ok(AllocationPlan {
        booths: loads,
        placements,
        unassigned: Vec::new(),
    })
}

// **** Allocation run ****

/// The context of one allocation run.
///
/// It holds everything the pipeline needs: grouping, splitting, packing and
/// writing read from it instead of from shared state.
pub struct AllocationRun<'a> {
    voters: &'a [Voter],
    booths: &'a [Booth],
    rules: &'a AllocationRules,
}

impl<'a> AllocationRun<'a> {
    /// Checks the preconditions of a run. Nothing is written if they fail.
    pub fn new(
        voters: &'a [Voter],
        booths: &'a [Booth],
        rules: &'a AllocationRules,
    ) -> Result<AllocationRun<'a>, AllocationErrors> {
        if voters.is_empty() {
            return Err(AllocationErrors::NoVoters);
        }
        if booths.is_empty() {
            return Err(AllocationErrors::NoBooths);
        }
        if rules.chunk_size == 0 {
            return Err(AllocationErrors::InvalidChunkSize);
        }
        Ok(AllocationRun {
            voters,
            booths,
            rules,
        })
    }

    /// Computes the allocation without writing anything.
    pub fn plan(&self) -> Result<AllocationPlan, AllocationErrors> {
        info!(
            "Allocating {} voters across {} booths, rules: {:?}",
            self.voters.len(),
            self.booths.len(),
            self.rules
        );
        let grouping = group_by_department(self.voters)?;
        if self.rules.missing_department == MissingDepartmentPolicy::CatchAllGroup {
            if let Some((dept, _)) = grouping
                .departments
                .iter()
                .find(|(dept, _)| dept == CATCH_ALL_GROUP)
            {
                return Err(AllocationErrors::ReservedDepartmentName {
                    department: dept.clone(),
                });
            }
        }
        let groups = split_largest_group(&grouping, self.rules);
        let mut plan = pack_groups(&groups, self.booths)?;
        if self.rules.missing_department == MissingDepartmentPolicy::LeaveUnassigned {
            plan.unassigned = grouping
                .missing
                .iter()
                .map(|v| v.admission_number.clone())
                .collect();
        }
        for b in plan.booths.iter() {
            info!(
                "{:>6} {} <- {}",
                b.voter_count,
                b.booth_name,
                b.assigned_groups.join(", ")
            );
        }
        if !plan.unassigned.is_empty() {
            warn!(
                "{} voters without department were not allocated",
                plan.unassigned.len()
            );
        }
        Ok(plan)
    }

    /// Computes the allocation and persists it through the writer.
    pub fn execute(&self, writer: &mut dyn BulkWriter) -> Result<AllocationPlan, AllocationErrors> {
        let plan = self.plan()?;
        let chunks = write_plan(&plan, writer, self.rules.chunk_size)?;
        info!("Allocation written in {} chunks", chunks);
        Ok(plan)
    }
}

/// Runs the allocation with the given rules and returns the plan, without writing it.
///
/// ```
/// use booth_allocation::*;
///
/// let voters = vec![
///     Voter::new("1", "Anu", "Physics", "1", "UG"),
///     Voter::new("2", "Binu", "History", "2", "UG"),
/// ];
/// let booths = generate_booths(2)?;
/// let plan = run_allocation(&voters, &booths, &AllocationRules::DEFAULT_RULES)?;
/// assert_eq!(plan.total_assigned(), 2);
/// # Ok::<(), AllocationErrors>(())
/// ```
pub fn run_allocation(
    voters: &[Voter],
    booths: &[Booth],
    rules: &AllocationRules,
) -> Result<AllocationPlan, AllocationErrors> {
    AllocationRun::new(voters, booths, rules)?.plan()
}

/// Creates `count` empty booths, identified `1..=count`.
pub fn generate_booths(count: usize) -> Result<Vec<Booth>, AllocationErrors> {
    if count == 0 {
        return Err(AllocationErrors::NoBooths);
    }
    Ok((1..=count)
        .map(|i| Booth::new(&i.to_string(), &format!("Booth {}", i)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn voters(dept: &str, year: &str, stream: &str, count: usize, prefix: &str) -> Vec<Voter> {
        (0..count)
            .map(|i| {
                Voter::new(
                    &format!("{}-{}", prefix, i),
                    &format!("{} {}", prefix, i),
                    dept,
                    year,
                    stream,
                )
            })
            .collect()
    }

    // CS is the largest department: 20 + 20 + 10.
    fn college_roll() -> Vec<Voter> {
        let mut roll = Vec::new();
        roll.extend(voters("CS", "1", "UG", 20, "cs1"));
        roll.extend(voters("CS", "2", "UG", 20, "cs2"));
        roll.extend(voters("CS", "3", "UG", 10, "cs3"));
        roll.extend(voters("History", "1", "UG", 15, "his"));
        roll.extend(voters("Botany", "2", "UG", 10, "bot"));
        roll
    }

    #[test]
    fn college_scenario() {
        init();
        let booths = generate_booths(3).unwrap();
        let plan = run_allocation(&college_roll(), &booths, &AllocationRules::DEFAULT_RULES).unwrap();

        let order: Vec<&str> = plan.placements.iter().map(|p| p.group.as_str()).collect();
        assert_eq!(
            order,
            vec!["CS 1 UG", "CS 2 UG", "HISTORY", "CS 3 UG", "BOTANY"]
        );
        let loads: Vec<u64> = plan.booths.iter().map(|b| b.voter_count).collect();
        assert_eq!(loads, vec![30, 20, 25]);
        assert_eq!(plan.booths[0].assigned_groups, vec!["CS 1 UG", "BOTANY"]);
        assert_eq!(plan.booths[1].assigned_groups, vec!["CS 2 UG"]);
        assert_eq!(plan.booths[2].assigned_groups, vec!["HISTORY", "CS 3 UG"]);
    }

    #[test]
    fn grouping_is_case_insensitive() {
        let roll = vec![
            Voter::new("1", "A", " physics", "1", "UG"),
            Voter::new("2", "B", "PHYSICS ", "1", "UG"),
            Voter::new("3", "C", "", "1", "UG"),
            Voter::new("4", "D", "Chemistry", "1", "UG"),
        ];
        let g = group_by_department(&roll).unwrap();
        assert_eq!(g.departments.len(), 2);
        assert_eq!(g.departments[0].0, "PHYSICS");
        assert_eq!(g.departments[0].1.len(), 2);
        assert_eq!(g.missing.len(), 1);
    }

    #[test]
    fn no_voters() {
        let booths = generate_booths(2).unwrap();
        assert_eq!(
            run_allocation(&[], &booths, &AllocationRules::DEFAULT_RULES),
            Err(AllocationErrors::NoVoters)
        );
    }

    #[test]
    fn no_booths() {
        assert_eq!(
            run_allocation(&college_roll(), &[], &AllocationRules::DEFAULT_RULES),
            Err(AllocationErrors::NoBooths)
        );
        assert_eq!(generate_booths(0), Err(AllocationErrors::NoBooths));
    }

    #[test]
    fn largest_department_split_into_classes() {
        let g = group_by_department(&college_roll()).unwrap();
        let groups = split_largest_group(&g, &AllocationRules::DEFAULT_RULES);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert!(!names.contains(&"CS"));
        assert_eq!(names, vec!["CS 1 UG", "CS 2 UG", "CS 3 UG", "HISTORY", "BOTANY"]);
        let cs_members: usize = groups
            .iter()
            .filter(|g| g.name.starts_with("CS "))
            .map(|g| g.members.len())
            .sum();
        assert_eq!(cs_members, 50);
    }

    #[test]
    fn split_can_be_disabled() {
        let g = group_by_department(&college_roll()).unwrap();
        let mut rules = AllocationRules::DEFAULT_RULES;
        rules.split_largest = false;
        let groups = split_largest_group(&g, &rules);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].name, "CS");
    }

    #[test]
    fn split_tie_break() {
        let mut roll = voters("Zoology", "1", "UG", 5, "zoo");
        roll.extend(voters("Botany", "1", "PG", 5, "bot"));
        let g = group_by_department(&roll).unwrap();

        let groups = split_largest_group(&g, &AllocationRules::DEFAULT_RULES);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["ZOOLOGY", "BOTANY 1 PG"]);

        let mut rules = AllocationRules::DEFAULT_RULES;
        rules.split_tie_break = SplitTieBreak::FirstEncountered;
        let groups = split_largest_group(&g, &rules);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["ZOOLOGY 1 UG", "BOTANY"]);
    }

    #[test]
    fn missing_departments_left_unassigned() {
        let mut roll = college_roll();
        roll.push(Voter::new("x1", "No Dept", "  ", "1", "UG"));
        let booths = generate_booths(3).unwrap();
        let plan = run_allocation(&roll, &booths, &AllocationRules::DEFAULT_RULES).unwrap();
        assert_eq!(plan.unassigned, vec!["x1".to_string()]);
        assert_eq!(plan.total_assigned(), 75);
    }

    #[test]
    fn missing_departments_in_catch_all_group() {
        let mut roll = college_roll();
        roll.push(Voter::new("x1", "No Dept", "", "1", "UG"));
        let booths = generate_booths(3).unwrap();
        let mut rules = AllocationRules::DEFAULT_RULES;
        rules.missing_department = MissingDepartmentPolicy::CatchAllGroup;
        let plan = run_allocation(&roll, &booths, &rules).unwrap();
        assert!(plan.unassigned.is_empty());
        assert_eq!(plan.total_assigned(), 76);
        assert!(plan
            .booths
            .iter()
            .any(|b| b.assigned_groups.contains(&CATCH_ALL_GROUP.to_string())));
    }

    #[test]
    fn department_named_like_catch_all_group() {
        let mut roll = college_roll();
        roll.push(Voter::new("u1", "Real Dept", "Unassigned", "1", "UG"));
        roll.push(Voter::new("x1", "No Dept", "", "1", "UG"));
        let booths = generate_booths(3).unwrap();

        // Without a catch-all group the name is free.
        let plan = run_allocation(&roll, &booths, &AllocationRules::DEFAULT_RULES).unwrap();
        assert_eq!(plan.total_assigned(), 76);

        let mut rules = AllocationRules::DEFAULT_RULES;
        rules.missing_department = MissingDepartmentPolicy::CatchAllGroup;
        assert_eq!(
            run_allocation(&roll, &booths, &rules),
            Err(AllocationErrors::ReservedDepartmentName {
                department: "UNASSIGNED".to_string()
            })
        );
    }

    #[test]
    fn every_voter_placed_exactly_once() {
        let roll = college_roll();
        let booths = generate_booths(4).unwrap();
        let plan = run_allocation(&roll, &booths, &AllocationRules::DEFAULT_RULES).unwrap();
        let mut seen: HashSet<String> = HashSet::new();
        for b in plan.booths.iter() {
            assert_eq!(b.voter_count, b.members.len() as u64);
            for adm in b.members.iter() {
                assert!(seen.insert(adm.clone()), "{} placed twice", adm);
            }
        }
        assert_eq!(seen.len(), roll.len());
    }

    #[test]
    fn greedy_choice_is_least_loaded_booth() {
        let mut roll = college_roll();
        roll.extend(voters("Maths", "1", "PG", 7, "mat"));
        roll.extend(voters("English", "2", "UG", 7, "eng"));
        roll.extend(voters("Commerce", "3", "UG", 3, "com"));
        let booths = generate_booths(4).unwrap();
        let plan = run_allocation(&roll, &booths, &AllocationRules::DEFAULT_RULES).unwrap();

        let mut loads: Vec<u64> = vec![0; booths.len()];
        for p in plan.placements.iter() {
            let chosen = booths.iter().position(|b| b.id == p.booth_id).unwrap();
            for (idx, l) in loads.iter().enumerate() {
                assert!(loads[chosen] <= *l);
                if idx < chosen {
                    // Ties go to the first booth.
                    assert!(loads[chosen] < *l);
                }
            }
            loads[chosen] += p.size;
        }
        let final_loads: Vec<u64> = plan.booths.iter().map(|b| b.voter_count).collect();
        assert_eq!(loads, final_loads);
    }

    #[test]
    fn rerun_is_stable() {
        let roll = college_roll();
        let booths = generate_booths(3).unwrap();
        let mut store = MemoryStore::new(roll.clone(), booths.clone());
        let first = AllocationRun::new(&roll, &booths, &AllocationRules::DEFAULT_RULES)
            .unwrap()
            .execute(&mut store)
            .unwrap();

        // Second run from the persisted state.
        let voters2 = store.voters.clone();
        let booths2 = store.booths.clone();
        let second = AllocationRun::new(&voters2, &booths2, &AllocationRules::DEFAULT_RULES)
            .unwrap()
            .execute(&mut store)
            .unwrap();
        let c1: Vec<u64> = first.booths.iter().map(|b| b.voter_count).collect();
        let c2: Vec<u64> = second.booths.iter().map(|b| b.voter_count).collect();
        assert_eq!(c1, c2);
    }

    #[test]
    fn persisted_allocation_matches_reports() {
        let mut roll = college_roll();
        roll.push(Voter::new("x1", "No Dept", "", "1", "UG"));
        // A stale assignment from an earlier run.
        roll.last_mut().unwrap().booth_id = Some("2".to_string());
        let booths = generate_booths(3).unwrap();
        let mut store = MemoryStore::new(roll.clone(), booths.clone());
        let mut rules = AllocationRules::DEFAULT_RULES;
        rules.chunk_size = 7;
        AllocationRun::new(&roll, &booths, &rules)
            .unwrap()
            .execute(&mut store)
            .unwrap();

        for booth in store.booths.iter() {
            let report = booth_report(booth, &store.voters).unwrap();
            let from_report: HashSet<String> = report
                .rows
                .iter()
                .map(|r| r.admission_number.clone())
                .collect();
            let from_voters: HashSet<String> = store
                .voters
                .iter()
                .filter(|v| v.booth_id.as_deref() == Some(booth.id.as_str()))
                .map(|v| v.admission_number.clone())
                .collect();
            assert_eq!(from_report, from_voters);
            assert_eq!(booth.voter_count, from_voters.len() as u64);
        }
        let stale = store.voters.iter().find(|v| v.admission_number == "x1").unwrap();
        assert_eq!(stale.booth_id, None);
        assert!(store
            .voters
            .iter()
            .filter(|v| !v.department.is_empty())
            .all(|v| v.booth_id.is_some()));
    }
}
