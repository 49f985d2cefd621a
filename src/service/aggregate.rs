//! Keyword frequency aggregation over collected records.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{Channel, MasterRecord, Topic, TrendRow};

/// Payload fields scanned for keyword candidates.
const TEXT_FIELDS: [&str; 2] = ["title", "description"];

/// Tokens that carry no trend signal on their own.
const STOPWORDS: [&str; 18] = [
    "the", "and", "with", "this", "that", "for", "you", "your", "from", "have", "what", "how",
    "video", "shorts", "vlog", "review", "best", "top",
];

const MIN_TOKEN_CHARS: usize = 2;
const MAX_TOKEN_CHARS: usize = 15;

/// Count keyword mentions across `records` and emit one [`TrendRow`] per
/// keyword for the reference `date`.
///
/// Tokens come from the title and description payload fields, lowercased,
/// split on non-alphanumeric boundaries, bounded in length, and filtered
/// through a stopword list. A keyword is counted at most once per record, so
/// the frequency is "number of items mentioning it", not raw occurrences.
/// Rows come back sorted by frequency descending, keyword ascending.
#[must_use]
pub fn keyword_frequencies(
    records: &[MasterRecord],
    topic: &Topic,
    channel: &Channel,
    date: NaiveDate,
) -> Vec<TrendRow> {
    let mut counts: HashMap<String, i64> = HashMap::new();

    for record in records {
        let mut seen: Vec<String> = Vec::new();
        for field in TEXT_FIELDS {
            let Some(text) = record.payload_text(field) else {
                continue;
            };
            for token in tokenize(text) {
                if !seen.contains(&token) {
                    seen.push(token);
                }
            }
        }
        for token in seen {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<TrendRow> = counts
        .into_iter()
        .map(|(keyword, frequency)| TrendRow {
            topic: topic.clone(),
            channel: channel.clone(),
            keyword,
            frequency,
            date,
        })
        .collect();
    rows.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.keyword.cmp(&b.keyword)));
    rows
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|token| {
            let len = token.chars().count();
            (MIN_TOKEN_CHARS..=MAX_TOKEN_CHARS).contains(&len)
                && !STOPWORDS.contains(&token.as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use chrono::Utc;
    use serde_json::json;

    fn record(id: &str, title: &str, description: &str) -> MasterRecord {
        MasterRecord::new(
            RecordId::new(id),
            Utc::now(),
            json!({"title": title, "description": description}),
        )
    }

    fn aggregate(records: &[MasterRecord]) -> Vec<TrendRow> {
        keyword_frequencies(
            records,
            &Topic::new("food"),
            &Channel::new("youtube"),
            "2024-06-01".parse().unwrap(),
        )
    }

    #[test]
    fn counts_each_keyword_once_per_record() {
        let records = vec![record("1", "tanghulu tanghulu tanghulu", "making tanghulu")];
        let rows = aggregate(&records);
        let tanghulu = rows.iter().find(|r| r.keyword == "tanghulu").unwrap();
        assert_eq!(tanghulu.frequency, 1);
    }

    #[test]
    fn frequency_reflects_number_of_mentioning_records() {
        let records = vec![
            record("1", "tanghulu street food", ""),
            record("2", "tanghulu at home", ""),
            record("3", "bagel cafe tour", ""),
        ];
        let rows = aggregate(&records);
        assert_eq!(rows[0].keyword, "tanghulu");
        assert_eq!(rows[0].frequency, 2);
        let bagel = rows.iter().find(|r| r.keyword == "bagel").unwrap();
        assert_eq!(bagel.frequency, 1);
    }

    #[test]
    fn stopwords_and_short_tokens_are_dropped() {
        let records = vec![record("1", "the best top 5 a", "")];
        let rows = aggregate(&records);
        assert!(rows.iter().all(|r| r.keyword != "the"));
        assert!(rows.iter().all(|r| r.keyword != "best"));
        assert!(rows.iter().all(|r| r.keyword != "a"));
    }

    #[test]
    fn tokens_are_lowercased() {
        let records = vec![record("1", "Tanghulu", ""), record("2", "TANGHULU", "")];
        let rows = aggregate(&records);
        assert_eq!(rows[0].keyword, "tanghulu");
        assert_eq!(rows[0].frequency, 2);
    }

    #[test]
    fn empty_records_produce_no_rows() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn non_ascii_keywords_survive() {
        let records = vec![record("1", "요즘 탕후루 맛집", "")];
        let rows = aggregate(&records);
        assert!(rows.iter().any(|r| r.keyword == "탕후루"));
    }
}
