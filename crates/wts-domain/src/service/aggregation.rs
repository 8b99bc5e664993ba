//! Aggregation engine
//!
//! Pure functions over a slice of records. Nothing here mutates its input
//! or keeps state between calls, so a reload only has to hand in the new
//! slice.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::model::{
    DailyWeight, DashboardStats, GroupKey, Record, StationFilter, StationOption, StationSummary,
    StatusCount, WeightGroup, ALL_STATIONS, UNKNOWN,
};

/// Per-station totals, heaviest station first
///
/// Stations with equal total weight keep the order in which they first
/// appear in `records`.
pub fn summarize_by_station(records: &[Record]) -> Vec<StationSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<StationSummary> = Vec::new();

    for record in records {
        let i = *index.entry(record.station.as_str()).or_insert_with(|| {
            summaries.push(StationSummary {
                station: record.station.clone(),
                total_records: 0,
                total_weight: 0.0,
                avg_weight: 0.0,
                completed_count: 0,
                latest_date: None,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[i];
        summary.total_records += 1;
        summary.total_weight += record.weight;
        if record.is_completed() {
            summary.completed_count += 1;
        }
        if record.date > summary.latest_date {
            summary.latest_date = record.date;
        }
    }

    for summary in &mut summaries {
        summary.avg_weight = ratio(summary.total_weight, summary.total_records);
    }

    summaries.sort_by(|a, b| b.total_weight.total_cmp(&a.total_weight));
    summaries
}

/// Records belonging to the selected station, in their original order
pub fn filter_by_station(records: &[Record], filter: &StationFilter) -> Vec<Record> {
    match filter {
        StationFilter::All => records.to_vec(),
        StationFilter::Station(_) => records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect(),
    }
}

/// Headline numbers for the stat cards
pub fn compute_stats(records: &[Record]) -> DashboardStats {
    let total_entries = records.len();
    let total_weight: f64 = records.iter().map(|r| r.weight).sum();
    let completed_count = records.iter().filter(|r| r.is_completed()).count();

    let days: HashSet<_> = records.iter().filter_map(|r| r.date).collect();

    DashboardStats {
        total_weight,
        total_entries,
        completed_count,
        completion_rate_percent: ratio(completed_count as f64, total_entries) * 100.0,
        avg_daily_weight: ratio(total_weight, days.len()),
    }
}

/// Heaviest `n` groups by the given key
pub fn top_n_by_weight(records: &[Record], key: GroupKey, n: usize) -> Vec<WeightGroup> {
    top_n_by(records, n, |r| key.select(r))
}

/// Heaviest `n` groups by an arbitrary key selector
///
/// Records for which the selector yields nothing (or an empty key) fall
/// into a single catch-all group. Ties keep first-seen order.
pub fn top_n_by<F>(records: &[Record], n: usize, selector: F) -> Vec<WeightGroup>
where
    F: Fn(&Record) -> Option<&str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<WeightGroup> = Vec::new();

    for record in records {
        let key = selector(record).filter(|k| !k.is_empty()).unwrap_or(UNKNOWN);
        let i = match index.get(key) {
            Some(&i) => i,
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push(WeightGroup {
                    key: key.to_string(),
                    total_weight: 0.0,
                    count: 0,
                });
                groups.len() - 1
            }
        };
        groups[i].total_weight += record.weight;
        groups[i].count += 1;
    }

    groups.sort_by(|a, b| b.total_weight.total_cmp(&a.total_weight));
    groups.truncate(n);
    groups
}

/// Latest `n` transactions, newest date and time first
///
/// Time is compared as raw text. Undated records and records without a
/// time sort after the others; equal keys keep their input order.
pub fn recent_transactions(records: &[Record], n: usize) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.time_key().cmp(&a.time_key()))
    });
    sorted.truncate(n);
    sorted
}

/// Total weight per calendar day, oldest first
pub fn daily_weight(records: &[Record]) -> Vec<DailyWeight> {
    let mut days: BTreeMap<_, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date {
            let day = days.entry(date).or_insert((0.0, 0));
            day.0 += record.weight;
            day.1 += 1;
        }
    }

    days.into_iter()
        .map(|(date, (total_weight, count))| DailyWeight {
            date,
            total_weight,
            count,
        })
        .collect()
}

/// Record count per status label, in first-seen order
pub fn status_breakdown(records: &[Record]) -> Vec<StatusCount> {
    let mut counts: Vec<StatusCount> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|c| c.label == record.status_label) {
            Some(count) => count.count += 1,
            None => counts.push(StatusCount {
                label: record.status_label.clone(),
                status: record.status,
                count: 1,
            }),
        }
    }
    counts
}

/// Station selector entries: "All Stations" followed by one per summary
pub fn station_options(summaries: &[StationSummary]) -> Vec<StationOption> {
    let mut options = Vec::with_capacity(summaries.len() + 1);
    options.push(StationOption {
        value: ALL_STATIONS.to_string(),
        label: "All Stations".to_string(),
    });

    for summary in summaries {
        let records = if summary.total_records > 0 {
            format!("({} records)", group_thousands(summary.total_records))
        } else {
            "(No data)".to_string()
        };
        options.push(StationOption {
            value: summary.station.clone(),
            label: format!("{} {}", summary.station, records),
        });
    }
    options
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
