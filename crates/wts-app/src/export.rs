//! Excel export functionality

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use wts_types::{Error, Result};

use crate::dashboard::DashboardView;

fn excel(e: XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Export a dashboard view to an Excel workbook
pub fn export_to_excel(view: &DashboardView, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let summary_sheet = workbook.add_worksheet();
    write_summary_sheet(summary_sheet, view)?;

    let stations_sheet = workbook.add_worksheet();
    write_stations_sheet(stations_sheet, view)?;

    let daily_sheet = workbook.add_worksheet();
    write_daily_sheet(daily_sheet, view)?;

    let recent_sheet = workbook.add_worksheet();
    write_recent_sheet(recent_sheet, view)?;

    workbook.save(output_path).map_err(excel)?;
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, view: &DashboardView) -> Result<()> {
    sheet.set_name("Summary").map_err(excel)?;

    let header_format = Format::new().set_bold();
    let tons_format = Format::new().set_num_format("#,##0.00");
    let percent_format = Format::new().set_num_format("0.0");

    sheet
        .write_string_with_format(0, 0, "Transfer Station Dashboard", &header_format)
        .map_err(excel)?;

    sheet.write_string(2, 0, "Station:").map_err(excel)?;
    sheet.write_string(2, 1, &view.station).map_err(excel)?;

    sheet.write_string(3, 0, "Source:").map_err(excel)?;
    sheet.write_string(3, 1, &view.source).map_err(excel)?;

    sheet.write_string(4, 0, "Loaded At:").map_err(excel)?;
    let loaded_at = view
        .loaded_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    sheet.write_string(4, 1, &loaded_at).map_err(excel)?;

    let stats = &view.stats;
    sheet.write_string(6, 0, "Total Weight (tons):").map_err(excel)?;
    sheet
        .write_number_with_format(6, 1, stats.total_weight, &tons_format)
        .map_err(excel)?;

    sheet.write_string(7, 0, "Total Entries:").map_err(excel)?;
    sheet
        .write_number(7, 1, stats.total_entries as f64)
        .map_err(excel)?;

    sheet.write_string(8, 0, "Completed Tasks:").map_err(excel)?;
    sheet
        .write_number(8, 1, stats.completed_count as f64)
        .map_err(excel)?;

    sheet.write_string(9, 0, "Completion Rate (%):").map_err(excel)?;
    sheet
        .write_number_with_format(9, 1, stats.completion_rate_percent, &percent_format)
        .map_err(excel)?;

    sheet.write_string(10, 0, "Avg Daily Weight (tons):").map_err(excel)?;
    sheet
        .write_number_with_format(10, 1, stats.avg_daily_weight, &tons_format)
        .map_err(excel)?;

    sheet
        .write_string_with_format(12, 0, "Status Breakdown", &header_format)
        .map_err(excel)?;
    for (i, status) in view.status_breakdown.iter().enumerate() {
        let row = 13 + i as u32;
        sheet.write_string(row, 0, &status.label).map_err(excel)?;
        sheet.write_number(row, 1, status.count as f64).map_err(excel)?;
    }

    let top_row = 14 + view.status_breakdown.len() as u32;
    sheet
        .write_string_with_format(top_row, 0, "Top Vehicle Tasks", &header_format)
        .map_err(excel)?;
    for (i, group) in view.top_tasks.iter().enumerate() {
        let row = top_row + 1 + i as u32;
        sheet.write_string(row, 0, &group.key).map_err(excel)?;
        sheet
            .write_number_with_format(row, 1, group.total_weight, &tons_format)
            .map_err(excel)?;
    }

    sheet.set_column_width(0, 45).map_err(excel)?;
    sheet.set_column_width(1, 28).map_err(excel)?;
    Ok(())
}

fn write_stations_sheet(sheet: &mut Worksheet, view: &DashboardView) -> Result<()> {
    sheet.set_name("Stations").map_err(excel)?;

    let header_format = Format::new().set_bold();
    let tons_format = Format::new().set_num_format("#,##0.00");

    let headers = [
        "Station",
        "Total Records",
        "Total Weight (tons)",
        "Avg Weight (tons)",
        "Completed",
        "Latest Date",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(excel)?;
    }

    for (i, summary) in view.stations.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &summary.station).map_err(excel)?;
        sheet
            .write_number(row, 1, summary.total_records as f64)
            .map_err(excel)?;
        sheet
            .write_number_with_format(row, 2, summary.total_weight, &tons_format)
            .map_err(excel)?;
        sheet
            .write_number_with_format(row, 3, summary.avg_weight, &tons_format)
            .map_err(excel)?;
        sheet
            .write_number(row, 4, summary.completed_count as f64)
            .map_err(excel)?;
        let latest = summary
            .latest_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        sheet.write_string(row, 5, &latest).map_err(excel)?;
    }

    sheet.set_column_width(0, 20).map_err(excel)?;
    Ok(())
}

fn write_daily_sheet(sheet: &mut Worksheet, view: &DashboardView) -> Result<()> {
    sheet.set_name("Daily Weight").map_err(excel)?;

    let header_format = Format::new().set_bold();
    sheet
        .write_string_with_format(0, 0, "Date", &header_format)
        .map_err(excel)?;
    sheet
        .write_string_with_format(0, 1, "Weight (tons)", &header_format)
        .map_err(excel)?;
    sheet
        .write_string_with_format(0, 2, "Entries", &header_format)
        .map_err(excel)?;

    for (i, day) in view.daily_weight.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet
            .write_string(row, 0, day.date.format("%Y-%m-%d").to_string())
            .map_err(excel)?;
        sheet.write_number(row, 1, day.total_weight).map_err(excel)?;
        sheet.write_number(row, 2, day.count as f64).map_err(excel)?;
    }
    Ok(())
}

fn write_recent_sheet(sheet: &mut Worksheet, view: &DashboardView) -> Result<()> {
    sheet.set_name("Recent Transactions").map_err(excel)?;

    let header_format = Format::new().set_bold();
    let headers = [
        "Station",
        "Date",
        "Status",
        "Vehicle Task",
        "Time",
        "Weight (tons)",
        "Source",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(excel)?;
    }

    for (i, record) in view.recent.iter().enumerate() {
        let row = (i + 1) as u32;
        let date = record
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        sheet.write_string(row, 0, &record.station).map_err(excel)?;
        sheet.write_string(row, 1, &date).map_err(excel)?;
        sheet.write_string(row, 2, &record.status_label).map_err(excel)?;
        sheet.write_string(row, 3, &record.task).map_err(excel)?;
        sheet.write_string(row, 4, &record.time).map_err(excel)?;
        sheet.write_number(row, 5, record.weight).map_err(excel)?;
        sheet.write_string(row, 6, &record.source).map_err(excel)?;
    }

    sheet.set_column_width(3, 45).map_err(excel)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Dashboard;
    use chrono::NaiveDate;
    use tempfile::tempdir;
    use wts_domain::service::Normalizer;
    use wts_infra::MockSource;

    #[test]
    fn test_export_writes_workbook() {
        let mut dashboard = Dashboard::new(Normalizer::default());
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        dashboard.reload(&MockSource::new(40, 9, today)).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.xlsx");
        export_to_excel(&dashboard.view(), &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_export_empty_view() {
        let dashboard = Dashboard::new(Normalizer::default());
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        export_to_excel(&dashboard.view(), &path).unwrap();
        assert!(path.exists());
    }
}
