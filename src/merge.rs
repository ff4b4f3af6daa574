//! The result merger: folds one decoded flat-file snapshot into the entity
//! graph in a single pass. Each row's effect is self-contained and
//! replayable, so merging the same snapshot twice is a no-op and a newer
//! snapshot fully supersedes the flags and per-unit results it touches.

use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;

use crate::decode::FlatRow;
use crate::election::Election;
use crate::model::{normalize_fips, parse_count, percentage, ReportingUnit, VoteResult};

/// County/district-number value marking the statewide row.
const STATEWIDE_SENTINEL: &str = "1";

/// Diagnostic counters for one merge pass. Unresolved references and
/// malformed rows are skipped rather than failing the merge; the counters
/// make the skips observable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeStats {
    pub rows_merged: u64,
    pub rows_skipped_malformed: u64,
    pub rows_skipped_unknown_race: u64,
    pub rows_skipped_unknown_unit: u64,
    pub groups_skipped_blank: u64,
    pub groups_skipped_unknown_candidate: u64,
}

/// Fold a decoded results snapshot into the graph.
pub fn apply_results(election: &mut Election, rows: &[FlatRow]) -> MergeStats {
    let mut stats = MergeStats::default();
    if let Some(first) = rows.first() {
        election.is_test = first.field("test") == "t";
    }
    for row in rows {
        merge_results_row(election, row, &mut stats);
    }
    debug!("results merge for {}: {:?}", election.name, stats);
    stats
}

/// Fold a decoded delegates snapshot into the graph. Only the state-level
/// district rows carry delegate totals; other rows are passed over.
pub fn apply_delegates(election: &mut Election, rows: &[FlatRow]) -> MergeStats {
    let mut stats = MergeStats::default();
    for row in rows {
        if row.field("district_number") != STATEWIDE_SENTINEL {
            continue;
        }
        let race_number = row.field("race_number");
        if race_number.is_empty() {
            stats.rows_skipped_malformed += 1;
            continue;
        }
        let race_key = election.race_key(race_number, row.field("state_postal"));
        let race = match election.races.get_mut(&race_key) {
            Some(race) => race,
            None => {
                stats.rows_skipped_unknown_race += 1;
                warn!("delegate row for unknown race {}", race_key);
                continue;
            }
        };
        for group in &row.candidates {
            let number = group_field(group, "candidate_number");
            if number.is_empty() {
                stats.groups_skipped_blank += 1;
                continue;
            }
            match race.candidates.get_mut(number) {
                Some(candidate) => {
                    candidate.delegates = parse_count(group_field(group, "delegates"));
                }
                None => {
                    stats.groups_skipped_unknown_candidate += 1;
                    warn!("delegate row for unknown candidate {} in race {}", number, race_key);
                }
            }
        }
        stats.rows_merged += 1;
    }
    debug!("delegate merge for {}: {:?}", election.name, stats);
    stats
}

fn merge_results_row(election: &mut Election, row: &FlatRow, stats: &mut MergeStats) {
    let race_number = row.field("race_number");
    if race_number.is_empty() {
        stats.rows_skipped_malformed += 1;
        warn!("skipping results row with no race number");
        return;
    }

    let race_key = election.race_key(race_number, row.field("state_postal"));
    let is_state = row.field("county_number") == STATEWIDE_SENTINEL;
    let unit_key = format!("{}{}", row.field("county_name"), row.field("county_number"));
    let fips = normalize_fips(row.field("fips"), election.leading_zero_fips);
    let index_key =
        election.unit_index_key(row.field("county_name"), row.field("county_number"), &fips);

    let race = match election.races.get_mut(&race_key) {
        Some(race) => race,
        None => {
            stats.rows_skipped_unknown_race += 1;
            warn!("results row for unknown race {}", race_key);
            return;
        }
    };
    if !race.reporting_units.contains_key(&unit_key) {
        stats.rows_skipped_unknown_unit += 1;
        warn!("results row for unknown unit {} in race {}", unit_key, race_key);
        return;
    }

    // Votes cast in this unit, always recomputed from the current row.
    let mut votes_cast = 0;
    for group in &row.candidates {
        if !group_field(group, "candidate_number").is_empty() {
            votes_cast += parse_count(group_field(group, "vote_count"));
        }
    }

    let precincts_total = parse_count(row.field("total_precincts"));
    let precincts_reporting = parse_count(row.field("precincts_reporting"));

    let mut new_results = Vec::with_capacity(row.candidates.len());
    for group in &row.candidates {
        let number = group_field(group, "candidate_number");
        if number.is_empty() {
            stats.groups_skipped_blank += 1;
            continue;
        }
        let candidate = match race.candidates.get_mut(number) {
            Some(candidate) => candidate,
            None => {
                stats.groups_skipped_unknown_candidate += 1;
                warn!("results row for unknown candidate {} in race {}", number, race_key);
                continue;
            }
        };

        let vote_count = parse_count(group_field(group, "vote_count"));
        // State-level rows are the authoritative source for the race-wide
        // total; county rows never touch it.
        if is_state {
            candidate.vote_total = vote_count;
        }

        let winner_code = group_field(group, "is_winner");
        candidate.is_winner = winner_code == "X";
        candidate.is_runoff = winner_code == "R";
        candidate.is_incumbent = group_field(group, "incumbent") == "1";

        new_results.push(VoteResult {
            candidate_number: number.to_string(),
            candidate_name: candidate.name(),
            last_name: candidate.last_name.clone(),
            vote_total: vote_count,
            vote_total_percent: 0.0,
        });
    }

    if let Some(unit) = race.reporting_units.get_mut(&unit_key) {
        apply_unit_update(unit, &new_results, precincts_total, precincts_reporting, votes_cast);
    }

    if is_state {
        race.precincts_total = precincts_total;
        race.precincts_reporting = precincts_reporting;
        race.precincts_reporting_percent = percentage(precincts_reporting, precincts_total);
        race.votes_cast = votes_cast;
        for candidate in race.candidates.values_mut() {
            candidate.vote_total_percent =
                Some(percentage(candidate.vote_total, votes_cast));
        }
    }

    // Keep the election-wide convenience index in step with the per-race
    // copy.
    if let Some(unit) = election.reporting_units.get_mut(&index_key) {
        apply_unit_update(unit, &new_results, precincts_total, precincts_reporting, votes_cast);
    }

    stats.rows_merged += 1;
}

/// Replace a unit's results for the row's candidates, update its precinct
/// status, and recompute every result's share of the new votes-cast
/// denominator.
fn apply_unit_update(
    unit: &mut ReportingUnit,
    new_results: &[VoteResult],
    precincts_total: u64,
    precincts_reporting: u64,
    votes_cast: u64,
) {
    for result in new_results {
        unit.results
            .insert(result.candidate_number.clone(), result.clone());
    }
    unit.precincts_total = precincts_total;
    unit.precincts_reporting = precincts_reporting;
    unit.precincts_reporting_percent = percentage(precincts_reporting, precincts_total);
    unit.votes_cast = votes_cast;
    for result in unit.results.values_mut() {
        result.vote_total_percent = percentage(result.vote_total, votes_cast);
    }
}

fn group_field<'a>(group: &'a HashMap<String, String>, name: &str) -> &'a str {
    group.get(name).map(String::as_str).unwrap_or("")
}
