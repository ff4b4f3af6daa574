//! The pull-based feed session: remote path conventions, the one-time init
//! pass that lays out the entity graph, and the results/delegates refresh
//! calls that re-poll the same graph.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::decode::{
    decode_flat, decode_init, DELEGATES_CANDIDATE_FIELDS, DELEGATES_HEADER_FIELDS,
    RESULTS_CANDIDATE_FIELDS, RESULTS_HEADER_FIELDS,
};
use crate::election::{Election, RaceFilter};
use crate::merge::{self, MergeStats};
use crate::model::{parse_date, Candidate, Race, ReportingUnit};
use crate::transport::{FileTransport, TransportError};

/// States whose results files drop the leading zero from county FIPS codes.
pub const LEADING_ZERO_FIPS_STATES: [&str; 7] = ["AL", "AK", "AZ", "AR", "CA", "CO", "CT"];

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("election date must be an 8-digit YYYYMMDD string: {0:?}")]
    BadDate(String),
    #[error("this feed has no delegate file")]
    NoDelegateFeed,
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Remote paths for one election's files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPaths {
    pub race_init: String,
    pub reporting_unit_init: String,
    pub candidate_init: String,
    pub results: String,
    pub delegates: Option<String>,
}

impl FeedPaths {
    /// Paths for a single-state feed, keyed by postal code.
    pub fn state(postal: &str) -> Self {
        Self {
            race_init: format!("/inits/{0}/{0}_race.txt", postal),
            reporting_unit_init: format!("/inits/{0}/{0}_ru.txt", postal),
            candidate_init: format!("/inits/{0}/{0}_pol.txt", postal),
            results: format!("/{0}/flat/{0}.txt", postal),
            delegates: Some(format!("/{0}/flat/{0}_D.txt", postal)),
        }
    }

    /// Paths for the national top-of-ticket feed, keyed by election date.
    pub fn election_day(date: &str) -> Self {
        Self {
            race_init: format!("/inits/US/US_{}_race.txt", date),
            reporting_unit_init: format!("/inits/US/US_{}_ru.txt", date),
            candidate_init: format!("/inits/US/US_{}_pol.txt", date),
            results: format!("/Delegate_Tracking/US/flat/US_{}.txt", date),
            delegates: None,
        }
    }
}

/// Which dynamic files to fetch when building an election.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub results: bool,
    pub delegates: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            results: true,
            delegates: true,
        }
    }
}

/// The public client for the feed. Fetching is pull-based: each call fully
/// retrieves and parses one file before touching the graph, and re-polling
/// folds the fresh snapshot into the same graph in place.
pub struct Client<T: FileTransport> {
    transport: T,
}

impl<T: FileTransport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Build the full graph for one state's feed: races, reporting units
    /// and candidates from the init files, then the current results, then
    /// delegate totals when the state has any primary or caucus races.
    pub fn get_state(&mut self, postal: &str) -> Result<Election> {
        self.get_state_with(postal, FetchOptions::default())
    }

    pub fn get_state_with(&mut self, postal: &str, options: FetchOptions) -> Result<Election> {
        let postal = postal.to_uppercase();
        let leading_zero = LEADING_ZERO_FIPS_STATES.contains(&postal.as_str());
        let mut election =
            self.init_graph(postal.clone(), FeedPaths::state(&postal), false, leading_zero)?;
        self.fetch_dynamic(&mut election, options)?;
        Ok(election)
    }

    /// Build the graph for the national top-of-ticket feed for one
    /// election day. Race keys compose the race number with each race's
    /// state postal code.
    pub fn get_election_day(&mut self, date: &str) -> Result<Election> {
        self.get_election_day_with(date, FetchOptions::default())
    }

    pub fn get_election_day_with(&mut self, date: &str, options: FetchOptions) -> Result<Election> {
        if parse_date(date).is_none() {
            return Err(FeedError::BadDate(date.to_string()));
        }
        let mut election =
            self.init_graph(date.to_string(), FeedPaths::election_day(date), true, false)?;
        self.fetch_dynamic(&mut election, options)?;
        Ok(election)
    }

    /// Re-fetch the results file and fold the fresh snapshot into the
    /// graph.
    pub fn update_results(&mut self, election: &mut Election) -> Result<MergeStats> {
        let data = self.transport.fetch(&election.paths.results)?;
        let rows = decode_flat(&data, &RESULTS_HEADER_FIELDS, &RESULTS_CANDIDATE_FIELDS);
        Ok(merge::apply_results(election, &rows))
    }

    /// Re-fetch the delegates file and fold the statewide delegate totals
    /// into the graph's candidates.
    pub fn update_delegates(&mut self, election: &mut Election) -> Result<MergeStats> {
        let path = election
            .paths
            .delegates
            .clone()
            .ok_or(FeedError::NoDelegateFeed)?;
        let data = self.transport.fetch(&path)?;
        let rows = decode_flat(&data, &DELEGATES_HEADER_FIELDS, &DELEGATES_CANDIDATE_FIELDS);
        Ok(merge::apply_delegates(election, &rows))
    }

    /// End the session, releasing the underlying transport connection.
    pub fn close(&mut self) -> Result<()> {
        self.transport.close().map_err(FeedError::from)
    }

    fn fetch_dynamic(&mut self, election: &mut Election, options: FetchOptions) -> Result<()> {
        if options.results {
            self.update_results(election)?;
        }
        let has_delegate_races =
            !election.filter_races(&[RaceFilter::IsGeneral(false)]).is_empty();
        if options.delegates && election.paths.delegates.is_some() && has_delegate_races {
            self.update_delegates(election)?;
        }
        Ok(())
    }

    /// Run the init pass in its fixed dependency order: races, then
    /// reporting units fanned out per race, then candidates attached to
    /// their owning race.
    fn init_graph(
        &mut self,
        name: String,
        paths: FeedPaths,
        multi_state: bool,
        leading_zero_fips: bool,
    ) -> Result<Election> {
        let mut election = Election::new(name, paths, multi_state, leading_zero_fips);

        let race_rows = decode_init(&self.transport.fetch(&election.paths.race_init)?);
        for row in &race_rows {
            let number = match row.get("ra_number") {
                Some(number) if !number.is_empty() => number,
                _ => continue,
            };
            let postal = row.get("st_postal").map(String::as_str).unwrap_or("");
            let key = election.race_key(number, postal);
            election.races.insert(key.clone(), Race::from_init_row(row, key));
        }

        let unit_rows = decode_init(&self.transport.fetch(&election.paths.reporting_unit_init)?);
        for row in &unit_rows {
            let unit = ReportingUnit::from_init_row(row);
            if unit.name.is_empty() && unit.ap_number.is_empty() {
                continue;
            }
            let row_postal = row.get("st_postal").map(String::as_str).unwrap_or("");
            // Fan the unit out into an independent mutable copy per race,
            // since each race accumulates its own results. National files
            // carry a postal code restricting the unit to one state's races.
            for race in election.races.values_mut() {
                if !row_postal.is_empty() && race.state_postal.as_deref() != Some(row_postal) {
                    continue;
                }
                race.reporting_units.insert(unit.key(), unit.clone());
            }
            let index_key = election.unit_index_key(&unit.name, &unit.ap_number, &unit.fips);
            election.reporting_units.insert(index_key, unit);
        }

        let candidate_rows = decode_init(&self.transport.fetch(&election.paths.candidate_init)?);
        for row in &candidate_rows {
            let race_number = row.get("ra_number").map(String::as_str).unwrap_or("");
            let postal = row.get("st_postal").map(String::as_str).unwrap_or("");
            let race_key = election.race_key(race_number, postal);
            let candidate = Candidate::from_init_row(row, race_key.clone());
            if candidate.polra_number.is_empty() {
                continue;
            }
            match election.races.get_mut(&race_key) {
                Some(race) => {
                    election
                        .candidate_index
                        .insert(candidate.polra_number.clone(), race_key);
                    race.candidates
                        .insert(candidate.polra_number.clone(), candidate);
                }
                // A candidate whose race is unknown gets dropped, never a
                // build failure.
                None => debug!(
                    "dropping candidate {} for unknown race {}",
                    candidate.polra_number, race_key
                ),
            }
        }

        Ok(election)
    }
}
