use crate::election::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "electionName")]
    pub election_name: Option<String>,
    #[serde(rename = "electionDate")]
    pub election_date: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub election: Option<String>,
    pub date: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RollSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "splitTieBreak")]
    pub split_tie_break: Option<String>,
    #[serde(rename = "missingDepartment")]
    pub missing_department: Option<String>,
    #[serde(rename = "splitLargest")]
    pub split_largest: Option<bool>,
    #[serde(rename = "chunkSize")]
    pub chunk_size: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElectionConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "rollSources", default)]
    pub roll_sources: Vec<RollSource>,
    #[serde(default)]
    pub rules: RulesConfig,
}

pub fn read_config(path: &str) -> ElectionResult<ElectionConfig> {
    let config_str = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: ElectionConfig =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

pub fn validate_rules(rules: &RulesConfig) -> ElectionResult<AllocationRules> {
    let defaults = AllocationRules::DEFAULT_RULES;
    let res = AllocationRules {
        split_tie_break: match rules.split_tie_break.as_deref() {
            None | Some("alphabetical") => SplitTieBreak::Alphabetical,
            Some("firstEncountered") => SplitTieBreak::FirstEncountered,
            Some(x) => {
                whatever!("Cannot use split tie break {:?}", x)
            }
        },
        missing_department: match rules.missing_department.as_deref() {
            None | Some("leaveUnassigned") => MissingDepartmentPolicy::LeaveUnassigned,
            Some("catchAllGroup") => MissingDepartmentPolicy::CatchAllGroup,
            Some(x) => {
                whatever!("Cannot use missing department policy {:?}", x)
            }
        },
        split_largest: rules.split_largest.unwrap_or(defaults.split_largest),
        chunk_size: match &rules.chunk_size {
            None => defaults.chunk_size,
            x => match read_js_int(x) {
                Some(n) if n > 0 => n,
                _ => {
                    whatever!("Failed to understand chunkSize option: {:?}", x)
                }
            },
        },
    };
    Ok(res)
}

fn read_js_int(x: &Option<JSValue>) -> Option<usize> {
    match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules_from(js: &str) -> ElectionResult<AllocationRules> {
        let c: ElectionConfig = serde_json::from_str(js).unwrap();
        validate_rules(&c.rules)
    }

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(rules_from("{}").unwrap(), AllocationRules::DEFAULT_RULES);
    }

    #[test]
    fn reads_all_rules() {
        let rules = rules_from(
            r#"{"rules": {"splitTieBreak": "firstEncountered", "missingDepartment": "catchAllGroup",
                "splitLargest": false, "chunkSize": "250"}}"#,
        )
        .unwrap();
        assert_eq!(rules.split_tie_break, SplitTieBreak::FirstEncountered);
        assert_eq!(rules.missing_department, MissingDepartmentPolicy::CatchAllGroup);
        assert!(!rules.split_largest);
        assert_eq!(rules.chunk_size, 250);
    }

    #[test]
    fn rejects_bad_rules() {
        assert!(rules_from(r#"{"rules": {"splitTieBreak": "random"}}"#).is_err());
        assert!(rules_from(r#"{"rules": {"chunkSize": 0}}"#).is_err());
    }

    #[test]
    fn reads_roll_sources() {
        let c: ElectionConfig = serde_json::from_str(
            r#"{"outputSettings": {"electionName": "Union 2024"},
                "rollSources": [{"provider": "xlsx", "filePath": "roll.xlsx", "excelWorksheetName": "Sheet1"}]}"#,
        )
        .unwrap();
        assert_eq!(c.output_settings.election_name.as_deref(), Some("Union 2024"));
        assert_eq!(c.roll_sources[0].excel_worksheet_name.as_deref(), Some("Sheet1"));
    }
}
