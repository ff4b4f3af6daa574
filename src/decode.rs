//! Decoders for the two wire formats: pipe-delimited "init" files with a
//! header row, and headerless semicolon-delimited "flat" files whose trailing
//! fields repeat in fixed-width candidate groups.

use itertools::{EitherOrBoth, Itertools};
use std::collections::HashMap;

/// Header fields shared by every row of a results flat file.
pub const RESULTS_HEADER_FIELDS: [&str; 19] = [
    "test",
    "election_date",
    "state_postal",
    "county_number",
    "fips",
    "county_name",
    "race_number",
    "office_id",
    "race_type_id",
    "seat_number",
    "office_name",
    "seat_name",
    "race_type_party",
    "race_type",
    "office_description",
    "number_of_winners",
    "number_in_runoff",
    "precincts_reporting",
    "total_precincts",
];

/// Candidate group fields repeated across a results row.
pub const RESULTS_CANDIDATE_FIELDS: [&str; 12] = [
    "candidate_number",
    "order",
    "party",
    "first_name",
    "middle_name",
    "last_name",
    "junior",
    "use_junior",
    "incumbent",
    "vote_count",
    "is_winner",
    "national_politician_id",
];

/// Header fields shared by every row of a delegates flat file. The county
/// triple of the results format becomes a district triple here.
pub const DELEGATES_HEADER_FIELDS: [&str; 19] = [
    "test",
    "election_date",
    "state_postal",
    "district_type",
    "district_number",
    "district_name",
    "race_number",
    "office_id",
    "race_type_id",
    "seat_number",
    "office_name",
    "seat_name",
    "race_type_party",
    "race_type",
    "office_description",
    "number_of_winners",
    "number_in_runoff",
    "precincts_reporting",
    "total_precincts",
];

/// Candidate group fields for a delegates row: the results group with
/// `delegates` inserted ahead of the vote count.
pub const DELEGATES_CANDIDATE_FIELDS: [&str; 13] = [
    "candidate_number",
    "order",
    "party",
    "first_name",
    "middle_name",
    "last_name",
    "junior",
    "use_junior",
    "incumbent",
    "delegates",
    "vote_count",
    "is_winner",
    "national_politician_id",
];

/// One record from an init file, keyed by the file's own header names.
pub type InitRow = HashMap<String, String>;

/// One record from a flat file: the fixed header segment plus the repeating
/// candidate groups, both keyed by the caller-supplied field names.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub fields: HashMap<String, String>,
    pub candidates: Vec<HashMap<String, String>>,
}

impl FlatRow {
    /// Look up a header field, treating absent fields as empty.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Decode a pipe-delimited init file into one field map per record.
///
/// The first non-blank line is the header. Rows are delimited with a
/// leading and trailing pipe, so the first and last column of every line
/// are padding and get discarded. Blank lines are skipped, as is the
/// occasional literal header row repeated in the data, recognised by its
/// first field matching the header's own first field name.
pub fn decode_init(data: &[u8]) -> Vec<InitRow> {
    let text = String::from_utf8_lossy(data);
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let header = match lines.next() {
        Some(line) => split_init_line(line),
        None => return Vec::new(),
    };
    let sentinel = header.first().map(String::as_str);

    let mut rows = Vec::new();
    for line in lines {
        let fields = split_init_line(line);
        if fields.first().map(String::as_str) == sentinel {
            continue;
        }
        rows.push(zip_fields(&header, &fields));
    }
    rows
}

/// Decode a semicolon-delimited flat file.
///
/// Every line ends with a dangling delimiter, so the final empty field is
/// dropped. The first `header_fields.len()` fields map positionally; the
/// remainder split into consecutive groups of `candidate_fields.len()`,
/// with a short final group filled out with empty values.
pub fn decode_flat(data: &[u8], header_fields: &[&str], candidate_fields: &[&str]) -> Vec<FlatRow> {
    let text = String::from_utf8_lossy(data);
    let mut rows = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let mut bits: Vec<&str> = line.split(';').collect();
        bits.pop();

        let split_at = header_fields.len().min(bits.len());
        let (header_bits, candidate_bits) = bits.split_at(split_at);

        let fields = zip_named(header_fields, header_bits);
        let candidates = split_groups(candidate_bits, candidate_fields.len())
            .into_iter()
            .map(|group| zip_named(candidate_fields, &group))
            .collect();

        rows.push(FlatRow { fields, candidates });
    }
    rows
}

/// Split a slice into consecutive groups of `n`, keeping a short final group.
fn split_groups<'a>(fields: &[&'a str], n: usize) -> Vec<Vec<&'a str>> {
    if n == 0 {
        return Vec::new();
    }
    fields.chunks(n).map(|chunk| chunk.to_vec()).collect()
}

fn split_init_line(line: &str) -> Vec<String> {
    let mut bits: Vec<String> = line.split('|').map(|bit| bit.trim().to_string()).collect();
    // The leading and trailing pipe produce empty padding columns.
    if bits.len() >= 2 {
        bits.remove(0);
        bits.pop();
    }
    bits
}

/// Pair names with values positionally; names beyond the available values
/// map to empty strings, surplus values are dropped.
fn zip_named(names: &[&str], values: &[&str]) -> HashMap<String, String> {
    names
        .iter()
        .zip_longest(values.iter())
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(name, value) => {
                Some(((*name).to_string(), value.trim().to_string()))
            }
            EitherOrBoth::Left(name) => Some(((*name).to_string(), String::new())),
            EitherOrBoth::Right(_) => None,
        })
        .collect()
}

fn zip_fields(names: &[String], values: &[String]) -> InitRow {
    names
        .iter()
        .zip_longest(values.iter())
        .filter_map(|pair| match pair {
            EitherOrBoth::Both(name, value) => Some((name.clone(), value.clone())),
            EitherOrBoth::Left(name) => Some((name.clone(), String::new())),
            EitherOrBoth::Right(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn init_rows_map_header_names_to_trimmed_values() {
        let data = b"|ru_name|ru_number|ru_fip|\n| Adair |2|19001|\n";
        let rows = decode_init(data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["ru_name"], "Adair");
        assert_eq!(rows[0]["ru_number"], "2");
        assert_eq!(rows[0]["ru_fip"], "19001");
    }

    #[test]
    fn init_skips_blank_lines_and_repeated_headers() {
        let data = b"|ru_name|ru_number|\n\n|ru_name|ru_number|\n|Adair|2|\n   \n";
        let rows = decode_init(data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["ru_name"], "Adair");
    }

    #[test]
    fn init_short_rows_fill_missing_columns_with_empty() {
        let data = b"|a|b|c|\n|1|2|\n";
        let rows = decode_init(data);
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2");
        assert_eq!(rows[0]["c"], "");
    }

    #[test]
    fn flat_rows_split_header_and_candidate_groups() {
        let line = "t;20120103;IA;x;y;z;1;101;900;X;103;50;\n";
        let rows = decode_flat(
            line.as_bytes(),
            &["test", "date", "state", "f1", "f2", "f3", "race"],
            &["number", "votes", "winner"],
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.field("state"), "IA");
        assert_eq!(row.field("race"), "1");
        assert_eq!(row.candidates.len(), 2);
        assert_eq!(row.candidates[0]["number"], "101");
        assert_eq!(row.candidates[0]["winner"], "X");
        assert_eq!(row.candidates[1]["votes"], "50");
        // The short trailing group decodes with empty fills.
        assert_eq!(row.candidates[1]["winner"], "");
    }

    #[test]
    fn flat_discards_the_dangling_empty_field() {
        let rows = decode_flat(b"a;b;", &["one", "two"], &["n"]);
        assert_eq!(rows[0].field("two"), "b");
        assert!(rows[0].candidates.is_empty());
    }

    #[rstest]
    #[case(&["1", "2", "3", "4"], 2, vec![vec!["1", "2"], vec!["3", "4"]])]
    #[case(&["1", "2", "3"], 2, vec![vec!["1", "2"], vec!["3"]])]
    #[case(&[], 2, vec![])]
    fn split_groups_uses_a_fixed_stride(
        #[case] fields: &[&str],
        #[case] n: usize,
        #[case] expected: Vec<Vec<&str>>,
    ) {
        assert_eq!(split_groups(fields, n), expected);
    }
}
