//! Output formatting module

use serde::Serialize;
use wts_app::DashboardView;
use wts_domain::model::{
    DailyWeight, DashboardStats, Record, StationOption, StationSummary, StatusCount, WeightGroup,
};
use wts_types::{OutputFormat, Result};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    } else {
        s.to_string()
    }
}

fn date_cell(record: &Record) -> String {
    record
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn output_view(format: OutputFormat, view: &DashboardView) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(view);
    }

    println!("\nTransfer Station Dashboard");
    println!("==========================");
    println!("Station:         {}", view.station);
    if !view.source.is_empty() {
        println!("Source:          {}", view.source);
    }
    if let Some(loaded_at) = view.loaded_at {
        println!("Loaded at:       {}", loaded_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if view.rejected_rows > 0 {
        println!("Rejected rows:   {}", view.rejected_rows);
    }

    print_stats_table(&view.stats);

    println!("\n--- Top Vehicle Tasks ---");
    print_groups_table(&view.top_tasks);

    println!("\n--- Status Breakdown ---");
    print_statuses_table(&view.status_breakdown);

    println!("\n--- Stations ---");
    print_summaries_table(&view.stations);

    println!("\n--- Recent Transactions ---");
    print_recent_table(&view.recent);

    Ok(())
}

pub fn output_stats(format: OutputFormat, station: &str, stats: &DashboardStats) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(stats);
    }
    println!("\nStation: {}", station);
    print_stats_table(stats);
    Ok(())
}

fn print_stats_table(stats: &DashboardStats) {
    println!("\nStatistics");
    println!("----------");
    println!("Total weight:     {:.2} t", stats.total_weight);
    println!("Total entries:    {}", stats.total_entries);
    println!("Completed tasks:  {}", stats.completed_count);
    println!("Completion rate:  {:.1}%", stats.completion_rate_percent);
    println!("Avg daily weight: {:.2} t", stats.avg_daily_weight);
}

pub fn output_summaries(format: OutputFormat, summaries: &[StationSummary]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(summaries);
    }
    print_summaries_table(summaries);
    Ok(())
}

fn print_summaries_table(summaries: &[StationSummary]) {
    if summaries.is_empty() {
        println!("No data.");
        return;
    }
    println!(
        "{:<20} {:>8} {:>12} {:>10} {:>10} {:>12}",
        "Station", "Records", "Weight (t)", "Avg (t)", "Completed", "Latest"
    );
    println!("{}", "-".repeat(77));
    for s in summaries {
        let latest = s
            .latest_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:<20} {:>8} {:>12.2} {:>10.2} {:>10} {:>12}",
            truncate(&s.station, 20),
            s.total_records,
            s.total_weight,
            s.avg_weight,
            s.completed_count,
            latest
        );
    }
}

pub fn output_groups(format: OutputFormat, groups: &[WeightGroup]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(groups);
    }
    print_groups_table(groups);
    Ok(())
}

fn print_groups_table(groups: &[WeightGroup]) {
    if groups.is_empty() {
        println!("No data.");
        return;
    }
    println!("{:<4} {:<45} {:>12} {:>8}", "#", "Group", "Weight (t)", "Entries");
    println!("{}", "-".repeat(72));
    for (i, g) in groups.iter().enumerate() {
        println!(
            "{:<4} {:<45} {:>12.2} {:>8}",
            i + 1,
            truncate(&g.key, 45),
            g.total_weight,
            g.count
        );
    }
}

pub fn output_recent(format: OutputFormat, records: &[Record]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(records);
    }
    print_recent_table(records);
    Ok(())
}

fn print_recent_table(records: &[Record]) {
    if records.is_empty() {
        println!("No data.");
        return;
    }
    println!(
        "{:<12} {:<10} {:<18} {:<12} {:<36} {:>8}",
        "Date", "Time", "Station", "Status", "Vehicle Task", "Weight"
    );
    println!("{}", "-".repeat(101));
    for r in records {
        println!(
            "{:<12} {:<10} {:<18} {:<12} {:<36} {:>8.2}",
            date_cell(r),
            r.time,
            truncate(&r.station, 18),
            truncate(&r.status_label, 12),
            truncate(&r.task, 36),
            r.weight
        );
    }
}

pub fn output_daily(format: OutputFormat, days: &[DailyWeight]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(days);
    }
    if days.is_empty() {
        println!("No data.");
        return Ok(());
    }
    println!("{:<12} {:>12} {:>8}", "Date", "Weight (t)", "Entries");
    println!("{}", "-".repeat(34));
    for d in days {
        println!(
            "{:<12} {:>12.2} {:>8}",
            d.date.format("%Y-%m-%d"),
            d.total_weight,
            d.count
        );
    }
    Ok(())
}

pub fn output_statuses(format: OutputFormat, statuses: &[StatusCount]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(statuses);
    }
    print_statuses_table(statuses);
    Ok(())
}

fn print_statuses_table(statuses: &[StatusCount]) {
    if statuses.is_empty() {
        println!("No data.");
        return;
    }
    for s in statuses {
        println!("{:<20} {:>8}  ({})", truncate(&s.label, 20), s.count, s.status.label());
    }
}

pub fn output_station_options(format: OutputFormat, options: &[StationOption]) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(options);
    }
    for option in options {
        println!("{:<20} {}", option.value, option.label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Shatin", 10), "Shatin");
        assert_eq!(truncate("Outlying Islands", 8), "Outlyin…");
        assert_eq!(truncate("葵涌轉運站", 3), "葵涌…");
    }

    #[test]
    fn test_date_cell_for_undated_record() {
        let record = Record::new("Shatin", 1.0);
        assert_eq!(date_cell(&record), "N/A");
    }
}
