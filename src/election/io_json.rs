use crate::election::*;

/// Reads an array of voter documents, as written by the store.
pub fn read_json_roll(path: &str) -> ElectionResult<Vec<Voter>> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let voters: Vec<Voter> = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    debug!("read_json_roll: {} voters in {}", voters.len(), path);
    Ok(voters)
}
