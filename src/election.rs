//! The entity graph for one election session, and the read-only query
//! facade over it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::client::FeedPaths;
use crate::crosswalk;
use crate::model::{percentage, Candidate, Race, ReportingUnit, VoteResult};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no race in this election for key: {0}")]
    RaceNotFound(String),
    #[error("no reporting unit in this election for FIPS: {0}")]
    ReportingUnitNotFound(String),
    #[error("no candidate in this election for number: {0}")]
    CandidateNotFound(String),
}

pub type Result<T> = std::result::Result<T, LookupError>;

/// A closed set of race attributes callers can filter on. A filter list
/// matches a race only when every entry matches (logical AND).
#[derive(Debug, Clone, PartialEq)]
pub enum RaceFilter {
    OfficeId(String),
    OfficeName(String),
    Party(String),
    Scope(String),
    SeatName(String),
    RaceTypeId(String),
    IsGeneral(bool),
    Uncontested(bool),
    National(bool),
}

impl RaceFilter {
    pub fn matches(&self, race: &Race) -> bool {
        match self {
            RaceFilter::OfficeId(value) => race.office_id == *value,
            RaceFilter::OfficeName(value) => race.office_name == *value,
            RaceFilter::Party(value) => race.party.as_deref() == Some(value.as_str()),
            RaceFilter::Scope(value) => race.scope == *value,
            RaceFilter::SeatName(value) => race.seat_name == *value,
            RaceFilter::RaceTypeId(value) => race.race_type_id == *value,
            RaceFilter::IsGeneral(value) => race.is_general() == *value,
            RaceFilter::Uncontested(value) => race.uncontested == *value,
            RaceFilter::National(value) => race.national == *value,
        }
    }
}

/// The in-memory graph for one election: all races, with an election-wide
/// index of reporting units (by FIPS) and candidates for direct lookup
/// across races. One `Election` is exclusively owned by its session; the
/// merge pass is the single writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Election {
    /// Postal code for state feeds, `YYYYMMDD` for national feeds.
    pub name: String,
    /// Whether the last merged snapshot was flagged as test data.
    pub is_test: bool,
    pub(crate) multi_state: bool,
    pub(crate) leading_zero_fips: bool,
    pub(crate) paths: FeedPaths,
    pub(crate) races: HashMap<String, Race>,
    pub(crate) reporting_units: HashMap<String, ReportingUnit>,
    pub(crate) candidate_index: HashMap<String, String>,
}

impl Election {
    pub(crate) fn new(
        name: String,
        paths: FeedPaths,
        multi_state: bool,
        leading_zero_fips: bool,
    ) -> Self {
        Self {
            name,
            is_test: false,
            multi_state,
            leading_zero_fips,
            paths,
            races: HashMap::new(),
            reporting_units: HashMap::new(),
            candidate_index: HashMap::new(),
        }
    }

    /// Race key for a flat-file row: the bare race number, composed with
    /// the row's state postal code on multi-state feeds.
    pub(crate) fn race_key(&self, number: &str, postal: &str) -> String {
        if self.multi_state {
            format!("{}-{}", number, postal)
        } else {
            number.to_string()
        }
    }

    /// Key for the election-wide unit index. County-level units key by
    /// their (normalized) FIPS code; sub-county states and units without a
    /// FIPS key by the `{name}{number}` composite, since townships share
    /// their county's FIPS.
    pub(crate) fn unit_index_key(&self, name: &str, number: &str, fips: &str) -> String {
        // Multi-state feeds repeat the statewide sentinel FIPS once per
        // state, so those units also need the composite key.
        let sentinel_collision = self.multi_state && fips == crate::model::STATEWIDE_FIPS;
        if fips.is_empty() || sentinel_collision || crosswalk::for_state(&self.name).is_some() {
            format!("{}{}", name, number)
        } else {
            fips.to_string()
        }
    }

    /// All races, ordered by key.
    pub fn races(&self) -> Vec<&Race> {
        let mut list: Vec<&Race> = self.races.values().collect();
        list.sort_by(|a, b| a.key.cmp(&b.key));
        list
    }

    pub fn get_race(&self, key: &str) -> Result<&Race> {
        self.races
            .get(key)
            .ok_or_else(|| LookupError::RaceNotFound(key.to_string()))
    }

    /// Races matching every given filter.
    pub fn filter_races(&self, filters: &[RaceFilter]) -> Vec<&Race> {
        self.races()
            .into_iter()
            .filter(|race| filters.iter().all(|filter| filter.matches(race)))
            .collect()
    }

    /// All candidates across all races, ordered by candidate number.
    pub fn candidates(&self) -> Vec<&Candidate> {
        let mut list: Vec<&Candidate> = self
            .races
            .values()
            .flat_map(|race| race.candidates.values())
            .collect();
        list.sort_by(|a, b| a.polra_number.cmp(&b.polra_number));
        list
    }

    pub fn get_candidate(&self, polra_number: &str) -> Result<&Candidate> {
        let race_key = self
            .candidate_index
            .get(polra_number)
            .ok_or_else(|| LookupError::CandidateNotFound(polra_number.to_string()))?;
        self.races
            .get(race_key)
            .and_then(|race| race.candidates.get(polra_number))
            .ok_or_else(|| LookupError::CandidateNotFound(polra_number.to_string()))
    }

    /// The race-independent reporting units, ordered by FIPS.
    pub fn reporting_units(&self) -> Vec<&ReportingUnit> {
        let mut list: Vec<&ReportingUnit> = self.reporting_units.values().collect();
        list.sort_by(|a, b| {
            (&a.fips, &a.name, &a.ap_number).cmp(&(&b.fips, &b.name, &b.ap_number))
        });
        list
    }

    pub fn get_reporting_unit(&self, fips: &str) -> Result<&ReportingUnit> {
        self.reporting_units
            .get(fips)
            .ok_or_else(|| LookupError::ReportingUnitNotFound(fips.to_string()))
    }

    /// All non-state reporting units, with sub-county townships rolled up
    /// into synthesized county views for the states that report below the
    /// county level. A pure read: the underlying units are never mutated.
    pub fn counties(&self) -> Vec<ReportingUnit> {
        let units: Vec<&ReportingUnit> = self
            .reporting_units()
            .into_iter()
            .filter(|unit| !unit.fips.is_empty() && !unit.is_state())
            .collect();

        let table = match crosswalk::for_state(&self.name) {
            Some(table) => table,
            None => return units.into_iter().cloned().collect(),
        };

        let mut grouped: BTreeMap<String, Vec<&ReportingUnit>> = BTreeMap::new();
        for unit in units {
            grouped.entry(unit.fips.clone()).or_default().push(unit);
        }

        grouped
            .into_iter()
            .map(|(fips, towns)| aggregate_county(&self.name, table, fips, &towns))
            .collect()
    }
}

/// Sum a group of sub-county units into one synthesized county unit.
fn aggregate_county(
    state: &str,
    table: &HashMap<&'static str, &'static str>,
    fips: String,
    towns: &[&ReportingUnit],
) -> ReportingUnit {
    let mut county = ReportingUnit {
        name: table
            .get(fips.as_str())
            .map(|name| (*name).to_string())
            .unwrap_or_else(|| fips.clone()),
        ap_number: String::new(),
        fips,
        abbrev: state.to_string(),
        precincts_total: 0,
        precincts_reporting: 0,
        precincts_reporting_percent: 0.0,
        num_reg_voters: 0,
        votes_cast: 0,
        results: HashMap::new(),
    };

    for town in towns {
        county.precincts_total += town.precincts_total;
        county.precincts_reporting += town.precincts_reporting;
        county.num_reg_voters += town.num_reg_voters;
        county.votes_cast += town.votes_cast;
        for result in town.results.values() {
            let entry = county
                .results
                .entry(result.candidate_number.clone())
                .or_insert_with(|| VoteResult {
                    candidate_number: result.candidate_number.clone(),
                    candidate_name: result.candidate_name.clone(),
                    last_name: result.last_name.clone(),
                    vote_total: 0,
                    vote_total_percent: 0.0,
                });
            entry.vote_total += result.vote_total;
        }
    }

    county.precincts_reporting_percent =
        percentage(county.precincts_reporting, county.precincts_total);
    for result in county.results.values_mut() {
        result.vote_total_percent = percentage(result.vote_total, county.votes_cast);
    }
    county
}
