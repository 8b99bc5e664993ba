//! Generated demo data
//!
//! Produces the same shape as the BigQuery detail query so the rest of the
//! pipeline cannot tell the difference. Seeded, so a given seed and
//! reference day always yield the same table.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use wts_domain::model::{RawTable, RawValue};
use wts_domain::DataSource;
use wts_types::Result;

pub const MOCK_STATIONS: [&str; 7] = [
    "Kwai Chung",
    "Tseung Kwan O",
    "Tuen Mun",
    "Yuen Long",
    "North District",
    "Shatin",
    "Outlying Islands",
];

pub const MOCK_STATUSES: [&str; 3] = ["Completed", "In Progress", "Pending"];

pub const MOCK_TASKS: [&str; 7] = [
    "C31 Food and Environmental Hygiene Department",
    "A45 Construction Waste Collection",
    "B22 Municipal Solid Waste",
    "D15 Recycling Materials",
    "E08 Special Waste",
    "F12 Commercial Waste",
    "G07 Industrial Waste",
];

const MOCK_HEADERS: [&str; 7] = [
    "date",
    "status",
    "vehicle_task",
    "time",
    "weight",
    "source",
    "station",
];

/// Days back from the reference day that generated dates may fall on
const MOCK_WINDOW_DAYS: u64 = 30;

#[derive(Debug, Clone)]
pub struct MockSource {
    rows: usize,
    seed: u64,
    today: NaiveDate,
}

impl MockSource {
    pub fn new(rows: usize, seed: u64, today: NaiveDate) -> Self {
        Self { rows, seed, today }
    }

    pub fn generate(&self) -> RawTable {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut entries: Vec<(NaiveDate, Vec<RawValue>)> = (0..self.rows)
            .map(|_| {
                let back = rng.gen_range(0..MOCK_WINDOW_DAYS);
                let date = self
                    .today
                    .checked_sub_days(Days::new(back))
                    .unwrap_or(self.today);
                let status = MOCK_STATUSES[rng.gen_range(0..MOCK_STATUSES.len())];
                let task = MOCK_TASKS[rng.gen_range(0..MOCK_TASKS.len())];
                let time = format!(
                    "{:02}:{:02}:{:02}",
                    rng.gen_range(7..19),
                    rng.gen_range(0..60),
                    rng.gen_range(0..60)
                );
                let weight = (rng.gen_range(5.0..10.0_f64) * 100.0).round() / 100.0;
                let source = rng.gen_range(1..=30).to_string();
                let station = MOCK_STATIONS[rng.gen_range(0..MOCK_STATIONS.len())];

                let cells = vec![
                    RawValue::Text(date.format("%Y-%m-%d").to_string()),
                    status.into(),
                    task.into(),
                    time.into(),
                    RawValue::Number(weight),
                    source.into(),
                    station.into(),
                ];
                (date, cells)
            })
            .collect();

        // newest first, like the detail query
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        let mut table = RawTable::new(MOCK_HEADERS.iter().map(|h| h.to_string()).collect());
        for (_, cells) in entries {
            table.push_row(cells);
        }
        table
    }
}

impl DataSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self) -> Result<RawTable> {
        let table = self.generate();
        info!(rows = table.len(), seed = self.seed, "generated mock data");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wts_domain::service::parse_date;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn test_generate_shape() {
        let table = MockSource::new(200, 7, today()).generate();
        assert_eq!(table.len(), 200);
        assert_eq!(table.headers.len(), 7);

        let earliest = today().checked_sub_days(Days::new(29)).unwrap();
        for row in &table.rows {
            let date = parse_date(&row[0].as_text().unwrap()).unwrap();
            assert!(date <= today() && date >= earliest);
            match row[4] {
                RawValue::Number(w) => assert!((5.0..=10.0).contains(&w)),
                ref other => panic!("unexpected weight {:?}", other),
            }
            let station = row[6].as_text().unwrap();
            assert!(MOCK_STATIONS.contains(&&*station));
        }
    }

    #[test]
    fn test_generate_sorted_newest_first() {
        let table = MockSource::new(100, 1, today()).generate();
        let dates: Vec<_> = table
            .rows
            .iter()
            .map(|r| parse_date(&r[0].as_text().unwrap()).unwrap())
            .collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_generate_is_reproducible() {
        let a = MockSource::new(50, 42, today()).generate();
        let b = MockSource::new(50, 42, today()).generate();
        let c = MockSource::new(50, 43, today()).generate();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
