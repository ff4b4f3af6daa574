//! Town-to-county crosswalk for the states whose feed reports results
//! below the county level. Sub-county units carry their county's FIPS
//! code, so grouping by FIPS and naming the group from these tables
//! yields the county view.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref COUNTY_CROSSWALK: HashMap<&'static str, HashMap<&'static str, &'static str>> = {
        let mut map = HashMap::new();
        map.insert(
            "MA",
            vec![
                ("25001", "Barnstable"),
                ("25003", "Berkshire"),
                ("25005", "Bristol"),
                ("25007", "Dukes"),
                ("25009", "Essex"),
                ("25011", "Franklin"),
                ("25013", "Hampden"),
                ("25015", "Hampshire"),
                ("25017", "Middlesex"),
                ("25019", "Nantucket"),
                ("25021", "Norfolk"),
                ("25023", "Plymouth"),
                ("25025", "Suffolk"),
                ("25027", "Worcester"),
            ]
            .into_iter()
            .collect(),
        );
        map.insert(
            "NH",
            vec![
                ("33001", "Belknap"),
                ("33003", "Carroll"),
                ("33005", "Chesire"),
                ("33007", "Coos"),
                ("33009", "Grafton"),
                ("33011", "Hillborough"),
                ("33013", "Merrimack"),
                ("33015", "Rockingham"),
                ("33017", "Strafford"),
                ("33019", "Sullivan"),
            ]
            .into_iter()
            .collect(),
        );
        map.insert(
            "VT",
            vec![
                ("50001", "Addison"),
                ("50003", "Bennington"),
                ("50005", "Caledonia"),
                ("50007", "Chittenden"),
                ("50009", "Essex"),
                ("50011", "Franklin"),
                ("50013", "Grand Isle"),
                ("50015", "Lamoille"),
                ("50017", "Orange"),
                ("50019", "Orleans"),
                ("50021", "Rutland"),
                ("50023", "Washington"),
                ("50025", "Windham"),
                ("50027", "Windsor"),
            ]
            .into_iter()
            .collect(),
        );
        map
    };
}

/// The county table for a state, when that state reports sub-county units.
pub fn for_state(postal: &str) -> Option<&'static HashMap<&'static str, &'static str>> {
    COUNTY_CROSSWALK.get(postal)
}
