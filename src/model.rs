//! Value objects for the entity graph: races, candidates, reporting units
//! and per-unit vote results, plus the fixed coercions the wire formats use.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::decode::InitRow;

/// FIPS code the feed uses for the statewide aggregate unit.
pub const STATEWIDE_FIPS: &str = "00000";

/// A choice for voters in a race.
///
/// In a presidential race, a person. In a ballot measure, a direction,
/// like Yes or No.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The feed's per-race candidate identifier, unique across one
    /// election's candidate universe.
    pub polra_number: String,
    pub pol_number: String,
    pub national_number: String,
    /// Key of the race this candidate runs in.
    pub race_key: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub abbrev_name: String,
    pub suffix: String,
    pub party: Option<String>,
    pub is_winner: bool,
    pub is_runoff: bool,
    pub is_incumbent: bool,
    /// Race-wide vote total. Only meaningful once a state-level results
    /// row has been merged; county rows never touch it.
    pub vote_total: u64,
    /// Share of the race-wide votes cast, 0-100. `None` until a
    /// denominator is known.
    pub vote_total_percent: Option<f64>,
    pub delegates: u64,
}

impl Candidate {
    pub(crate) fn from_init_row(row: &InitRow, race_key: String) -> Self {
        Self {
            polra_number: field(row, "polra_number"),
            pol_number: field(row, "pol_number"),
            national_number: field(row, "pol_nat_id"),
            race_key,
            first_name: field(row, "pol_first_name"),
            middle_name: field(row, "pol_middle_name"),
            last_name: field(row, "pol_last_name"),
            abbrev_name: field(row, "pol_abbrv"),
            suffix: field(row, "pol_junior"),
            party: normalize_party(&field(row, "polra_party")),
            is_winner: false,
            is_runoff: false,
            is_incumbent: false,
            vote_total: 0,
            vote_total_percent: None,
            delegates: 0,
        }
    }

    /// Display name: first and last name joined, except for ballot-measure
    /// directions, which use the surname alone.
    pub fn name(&self) -> String {
        if self.last_name == "Yes" || self.last_name == "No" {
            return self.last_name.clone();
        }
        [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A contest being decided by voters choosing between candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    /// Race number, composed with the state postal code for multi-state
    /// feeds (`{number}-{ST}`).
    pub key: String,
    pub race_number: String,
    pub state_postal: Option<String>,
    pub office_id: String,
    pub office_name: String,
    pub office_description: String,
    pub seat_name: String,
    pub seat_number: String,
    /// `L` for local races, statewide otherwise.
    pub scope: String,
    pub race_type_id: String,
    pub party: Option<String>,
    pub election_date: Option<NaiveDate>,
    pub num_winners: u64,
    pub uncontested: bool,
    pub national: bool,
    /// Precinct and vote aggregates mirror the statewide reporting unit's
    /// numbers, set directly from state-level rows.
    pub precincts_total: u64,
    pub precincts_reporting: u64,
    pub precincts_reporting_percent: f64,
    pub votes_cast: u64,
    pub(crate) candidates: HashMap<String, Candidate>,
    pub(crate) reporting_units: HashMap<String, ReportingUnit>,
}

impl Race {
    pub(crate) fn from_init_row(row: &InitRow, key: String) -> Self {
        let state_postal = match field(row, "st_postal") {
            ref postal if postal.is_empty() => None,
            postal => Some(postal),
        };
        Self {
            key,
            race_number: field(row, "ra_number"),
            state_postal,
            office_id: field(row, "office_id"),
            office_name: field(row, "ot_name"),
            office_description: field(row, "of_description"),
            seat_name: field(row, "se_name"),
            seat_number: field(row, "se_number"),
            scope: field(row, "of_scope"),
            race_type_id: field(row, "race_id"),
            party: normalize_party(&field(row, "rt_party_name")),
            election_date: parse_date(&field(row, "el_date")),
            num_winners: parse_count(&field(row, "ra_num_winners")),
            uncontested: parse_flag(&field(row, "ra_uncontested")),
            national: parse_flag(&field(row, "ra_national_b")),
            precincts_total: 0,
            precincts_reporting: 0,
            precincts_reporting_percent: 0.0,
            votes_cast: 0,
            candidates: HashMap::new(),
            reporting_units: HashMap::new(),
        }
    }

    /// Display label for the race type code, when the code is known.
    pub fn race_type(&self) -> Option<&'static str> {
        race_type_label(&self.race_type_id)
    }

    pub fn is_general(&self) -> bool {
        self.race_type_id == "G"
    }

    /// Composed display name for the race.
    pub fn name(&self) -> String {
        if self.scope == "L" {
            if self.office_description.is_empty() {
                format!("{} {}", self.office_name, self.seat_name)
            } else {
                format!(
                    "{} {} - {}",
                    self.office_name, self.seat_name, self.office_description
                )
            }
        } else if self.office_name == "Proposition" {
            let num = self.seat_name.split('-').next().unwrap_or("").trim();
            format!("{} {}", self.office_name, num)
        } else {
            self.office_name.clone()
        }
    }

    /// Candidates in this race, ordered by surname for determinism.
    pub fn candidates(&self) -> Vec<&Candidate> {
        let mut list: Vec<&Candidate> = self.candidates.values().collect();
        list.sort_by(|a, b| {
            (&a.last_name, &a.polra_number).cmp(&(&b.last_name, &b.polra_number))
        });
        list
    }

    pub fn candidate(&self, polra_number: &str) -> Option<&Candidate> {
        self.candidates.get(polra_number)
    }

    /// Reporting units in this race, ordered by their composite key.
    pub fn reporting_units(&self) -> Vec<&ReportingUnit> {
        let mut list: Vec<&ReportingUnit> = self.reporting_units.values().collect();
        list.sort_by_key(|unit| unit.key());
        list
    }

    /// Look up a unit by its `{name}{number}` composite key.
    pub fn reporting_unit(&self, key: &str) -> Option<&ReportingUnit> {
        self.reporting_units.get(key)
    }

    /// The statewide aggregate unit for this race, if the feed defined one.
    pub fn state_unit(&self) -> Option<&ReportingUnit> {
        self.reporting_units.values().find(|unit| unit.is_state())
    }
}

/// An area whose votes are tallied into one total: a state, a county, or a
/// sub-county township.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingUnit {
    pub name: String,
    pub ap_number: String,
    pub fips: String,
    pub abbrev: String,
    pub precincts_total: u64,
    pub precincts_reporting: u64,
    pub precincts_reporting_percent: f64,
    pub num_reg_voters: u64,
    pub votes_cast: u64,
    pub(crate) results: HashMap<String, VoteResult>,
}

impl ReportingUnit {
    pub(crate) fn from_init_row(row: &InitRow) -> Self {
        Self {
            name: field(row, "ru_name"),
            ap_number: field(row, "ru_number"),
            fips: field(row, "ru_fip"),
            abbrev: field(row, "ru_abbrv"),
            precincts_total: parse_count(&field(row, "ru_precincts")),
            precincts_reporting: 0,
            precincts_reporting_percent: 0.0,
            num_reg_voters: parse_count(&field(row, "ru_reg_voters")),
            votes_cast: 0,
            results: HashMap::new(),
        }
    }

    /// Composite key used to resolve this unit from flat-file rows.
    pub fn key(&self) -> String {
        format!("{}{}", self.name, self.ap_number)
    }

    /// Whether this is the statewide aggregate unit.
    pub fn is_state(&self) -> bool {
        self.fips == STATEWIDE_FIPS
    }

    /// Results for this unit, ordered by descending vote total once any
    /// votes have been recorded, and by candidate surname before then.
    pub fn results(&self) -> Vec<&VoteResult> {
        let mut list: Vec<&VoteResult> = self.results.values().collect();
        if list.iter().any(|result| result.vote_total > 0) {
            list.sort_by(|a, b| {
                b.vote_total
                    .cmp(&a.vote_total)
                    .then_with(|| a.last_name.cmp(&b.last_name))
                    .then_with(|| a.candidate_number.cmp(&b.candidate_number))
            });
        } else {
            list.sort_by(|a, b| {
                (&a.last_name, &a.candidate_name, &a.candidate_number).cmp(&(
                    &b.last_name,
                    &b.candidate_name,
                    &b.candidate_number,
                ))
            });
        }
        list
    }

    pub fn result(&self, polra_number: &str) -> Option<&VoteResult> {
        self.results.get(polra_number)
    }
}

/// The vote count for one candidate in one reporting unit. Replaced
/// wholesale on every merge pass for its (candidate, unit) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteResult {
    pub candidate_number: String,
    pub candidate_name: String,
    pub last_name: String,
    pub vote_total: u64,
    /// Share of the unit's votes cast, 0-100.
    pub vote_total_percent: f64,
}

//
// Wire coercions
//

/// Percentage with the feed's zero-guard: an empty denominator is 0, never
/// an error or NaN.
pub(crate) fn percentage(value: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        value as f64 / total as f64 * 100.0
    }
}

/// Counts arrive as decimal strings; anything unparseable coerces to 0.
pub(crate) fn parse_count(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

/// Boolean flags arrive as `'1'`.
pub(crate) fn parse_flag(raw: &str) -> bool {
    raw.trim() == "1"
}

/// Election dates arrive as 8-digit `YYYYMMDD` strings.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d").ok()
}

/// Normalize the feed's party strings to single-letter codes. Unknown
/// strings pass through unchanged; no-party markers map to `None`.
pub(crate) fn normalize_party(raw: &str) -> Option<String> {
    match raw.trim() {
        "" | "NP" => None,
        "Lib" => Some("L".to_string()),
        "Dem" => Some("D".to_string()),
        "GOP" => Some("R".to_string()),
        "Ind" => Some("I".to_string()),
        other => Some(other.to_string()),
    }
}

/// Display label for a race type code.
pub(crate) fn race_type_label(code: &str) -> Option<&'static str> {
    match code {
        "D" => Some("Dem Primary"),
        "R" => Some("GOP Primary"),
        "E" => Some("Dem Caucus"),
        "S" => Some("GOP Caucus"),
        "G" => Some("General Election"),
        _ => None,
    }
}

/// Restore the county FIPS dropped by some source files: states on the
/// leading-zero list ship 4-digit codes, and a bare `0` marks the
/// statewide unit.
pub(crate) fn normalize_fips(raw: &str, leading_zero: bool) -> String {
    let raw = raw.trim();
    if raw == "0" {
        return STATEWIDE_FIPS.to_string();
    }
    if leading_zero && raw.len() == 4 {
        return format!("0{}", raw);
    }
    raw.to_string()
}

fn field(row: &InitRow, name: &str) -> String {
    row.get(name).cloned().unwrap_or_default()
}
