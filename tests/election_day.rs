//! End-to-end coverage for the national top-of-ticket feed: multi-state
//! race keys, per-state reporting unit fan-out, and resolution of result
//! rows against the state each one belongs to.

use election_wire::{Client, FeedError, LookupError, MemoryTransport};

fn init_file(rows: &[&[&str]]) -> String {
    rows.iter()
        .map(|fields| format!("|{}|", fields.join("|")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn flat_file(rows: &[(Vec<&str>, Vec<Vec<&str>>)]) -> String {
    rows.iter()
        .map(|(header, groups)| {
            let mut bits = header.clone();
            for group in groups {
                bits.extend(group.iter().cloned());
            }
            format!("{};", bits.join(";"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn results_header<'a>(
    postal: &'a str,
    county_number: &'a str,
    fips: &'a str,
    county_name: &'a str,
) -> Vec<&'a str> {
    vec![
        "l",
        "20121106",
        postal,
        county_number,
        fips,
        county_name,
        "1",
        "P",
        "G",
        "",
        "President",
        "",
        "",
        "General Election",
        "",
        "1",
        "0",
        "900",
        "1774",
    ]
}

fn national_transport() -> MemoryTransport {
    let mut transport = MemoryTransport::new();
    transport.insert(
        "/inits/US/US_20121106_race.txt",
        init_file(&[
            &[
                "ra_number",
                "st_postal",
                "race_id",
                "el_date",
                "office_id",
                "ot_name",
                "of_scope",
                "ra_national_b",
            ],
            &["1", "IA", "G", "20121106", "P", "President", "S", "1"],
            &["1", "NH", "G", "20121106", "P", "President", "S", "1"],
        ]),
    );
    transport.insert(
        "/inits/US/US_20121106_ru.txt",
        init_file(&[
            &[
                "ru_name",
                "ru_number",
                "ru_fip",
                "ru_abbrv",
                "ru_precincts",
                "ru_reg_voters",
                "st_postal",
            ],
            &["Iowa", "1", "00000", "IA", "1774", "2000000", "IA"],
            &["Adair", "2", "19001", "AD", "12", "5000", "IA"],
            &["New Hampshire", "1", "00000", "NH", "301", "900000", "NH"],
            &["Belknap", "2", "33001", "BE", "18", "40000", "NH"],
        ]),
    );
    transport.insert(
        "/inits/US/US_20121106_pol.txt",
        init_file(&[
            &[
                "polra_number",
                "pol_first_name",
                "pol_last_name",
                "pol_abbrv",
                "polra_party",
                "ra_number",
                "pol_nat_id",
                "pol_number",
                "st_postal",
            ],
            &["201", "Barack", "Obama", "Obama", "Dem", "1", "1101", "8001", "IA"],
            &["202", "Mitt", "Romney", "Romney", "GOP", "1", "1102", "8002", "IA"],
            &["301", "Barack", "Obama", "Obama", "Dem", "1", "1101", "8001", "NH"],
            &["302", "Mitt", "Romney", "Romney", "GOP", "1", "1102", "8002", "NH"],
        ]),
    );
    transport.insert(
        "/Delegate_Tracking/US/flat/US_20121106.txt",
        flat_file(&[
            (
                results_header("IA", "1", "0", "Iowa"),
                vec![
                    vec!["201", "1", "Dem", "Barack", "", "Obama", "", "", "0", "800000", "X", "1101"],
                    vec!["202", "2", "GOP", "Mitt", "", "Romney", "", "", "0", "700000", "", "1102"],
                ],
            ),
            (
                results_header("IA", "2", "19001", "Adair"),
                vec![
                    vec!["201", "1", "Dem", "Barack", "", "Obama", "", "", "0", "3000", "X", "1101"],
                    vec!["202", "2", "GOP", "Mitt", "", "Romney", "", "", "0", "2500", "", "1102"],
                ],
            ),
            (
                results_header("NH", "1", "0", "New Hampshire"),
                vec![
                    vec!["301", "1", "Dem", "Barack", "", "Obama", "", "", "0", "350000", "X", "1101"],
                    vec!["302", "2", "GOP", "Mitt", "", "Romney", "", "", "0", "320000", "", "1102"],
                ],
            ),
            (
                results_header("NH", "2", "33001", "Belknap"),
                vec![
                    vec!["301", "1", "Dem", "Barack", "", "Obama", "", "", "0", "9000", "X", "1101"],
                    vec!["302", "2", "GOP", "Mitt", "", "Romney", "", "", "0", "8000", "", "1102"],
                ],
            ),
        ]),
    );
    transport
}

#[test]
fn race_keys_compose_number_and_state() {
    let national = Client::new(national_transport())
        .get_election_day("20121106")
        .unwrap();

    let keys: Vec<&str> = national.races().iter().map(|race| race.key.as_str()).collect();
    assert_eq!(keys, ["1-IA", "1-NH"]);

    let iowa = national.get_race("1-IA").unwrap();
    assert_eq!(iowa.state_postal.as_deref(), Some("IA"));
    assert!(iowa.national);
    assert!(iowa.is_general());

    // The bare race number never resolves on a national feed.
    assert!(matches!(
        national.get_race("1"),
        Err(LookupError::RaceNotFound(_))
    ));
}

#[test]
fn reporting_units_fan_out_only_to_their_own_state() {
    let national = Client::new(national_transport())
        .get_election_day("20121106")
        .unwrap();

    let iowa = national.get_race("1-IA").unwrap();
    let unit_keys: Vec<String> = iowa
        .reporting_units()
        .iter()
        .map(|unit| unit.key())
        .collect();
    assert_eq!(unit_keys, ["Adair2", "Iowa1"]);
    assert!(iowa.reporting_unit("Belknap2").is_none());

    let new_hampshire = national.get_race("1-NH").unwrap();
    assert!(new_hampshire.reporting_unit("Belknap2").is_some());
    assert!(new_hampshire.reporting_unit("Adair2").is_none());
}

#[test]
fn result_rows_resolve_against_their_own_state_race() {
    let national = Client::new(national_transport())
        .get_election_day("20121106")
        .unwrap();

    let iowa = national.get_race("1-IA").unwrap();
    assert_eq!(iowa.votes_cast, 1_500_000);
    let obama_ia = iowa.candidate("201").unwrap();
    assert_eq!(obama_ia.vote_total, 800_000);
    assert!(obama_ia.is_winner);
    let romney_ia = iowa.candidate("202").unwrap();
    assert_eq!(romney_ia.vote_total, 700_000);
    assert!(!romney_ia.is_winner);
    assert_eq!(romney_ia.vote_total_percent, Some(700_000.0 / 1_500_000.0 * 100.0));

    let new_hampshire = national.get_race("1-NH").unwrap();
    assert_eq!(new_hampshire.votes_cast, 670_000);
    assert_eq!(new_hampshire.candidate("301").unwrap().vote_total, 350_000);
    assert_eq!(new_hampshire.candidate("302").unwrap().vote_total, 320_000);

    let adair = iowa.reporting_unit("Adair2").unwrap();
    assert_eq!(adair.votes_cast, 5_500);
    assert_eq!(adair.result("201").unwrap().vote_total, 3_000);
}

#[test]
fn statewide_units_index_by_composite_key() {
    let national = Client::new(national_transport())
        .get_election_day("20121106")
        .unwrap();

    // Every state's top unit carries the same statewide FIPS, so the
    // election-wide index falls back to name and number for them.
    let iowa_state = national.get_reporting_unit("Iowa1").unwrap();
    assert_eq!(iowa_state.votes_cast, 1_500_000);
    let nh_state = national.get_reporting_unit("New Hampshire1").unwrap();
    assert_eq!(nh_state.votes_cast, 670_000);
    assert!(matches!(
        national.get_reporting_unit("00000"),
        Err(LookupError::ReportingUnitNotFound(_))
    ));

    // Counties keep their FIPS keys and span both states.
    let county_fips: Vec<String> = national
        .counties()
        .into_iter()
        .map(|county| county.fips)
        .collect();
    assert_eq!(county_fips, ["19001", "33001"]);
    let belknap = national.get_reporting_unit("33001").unwrap();
    assert_eq!(belknap.votes_cast, 17_000);
}

#[test]
fn national_feeds_carry_no_delegate_file() {
    let mut client = Client::new(national_transport());
    let mut national = client.get_election_day("20121106").unwrap();
    match client.update_delegates(&mut national) {
        Err(FeedError::NoDelegateFeed) => {}
        other => panic!("expected NoDelegateFeed, got {:?}", other),
    }
}
