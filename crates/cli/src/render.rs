//! Plain-text tables written to stdout.

use healthtrends_client::views::TrendPanel;
use healthtrends_core::models::{CatalogEntry, MonthlyTrends, Patient, TrendHistory};

pub fn patients<'a>(patients: impl IntoIterator<Item = &'a Patient>) {
    let mut any = false;
    for p in patients {
        any = true;
        println!(
            "{:<38} {:<30} {}",
            p.id,
            p.name,
            p.email.as_deref().unwrap_or("(no account)")
        );
    }
    if !any {
        println!("No patients found.");
    }
}

pub fn catalog(entries: &[CatalogEntry]) {
    if entries.is_empty() {
        println!("Catalog is empty.");
        return;
    }
    for e in entries {
        println!(
            "{:<12} {:<30} {}",
            e.code,
            e.name,
            e.unit.as_deref().unwrap_or("-")
        );
    }
}

pub fn history(history: &TrendHistory) {
    if history.history.is_empty() {
        println!("No results in this range.");
        return;
    }
    println!("{:<20} {:>10} {:>10}  unit", "date", "value", "avg(3)");
    for point in &history.history {
        let avg = point
            .moving_avg_3_points
            .map(|a| format!("{a:.2}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<20} {:>10} {:>10}  {}",
            point.test_date,
            point.value,
            avg,
            point.unit.as_deref().unwrap_or("")
        );
    }
}

fn monthly(monthly: &MonthlyTrends) {
    println!();
    println!("Monthly averages");
    println!("{:<10} {:>10} {:>10} {:>10}", "month", "average", "min", "max");
    for m in &monthly.monthly_data {
        let fmt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".into());
        println!(
            "{:<10} {:>10.2} {:>10} {:>10}",
            m.date,
            m.average,
            fmt(m.min),
            fmt(m.max)
        );
    }
}

/// Everything the trend panel has loaded for the selected test.
pub fn trend_panel(panel: &TrendPanel) {
    let codes: Vec<&str> = panel.tests().iter().map(|t| t.test_code.as_str()).collect();
    if codes.is_empty() {
        println!("No tests on file.");
        return;
    }
    println!("Tests: {}", codes.join(", "));
    println!(
        "Showing {} for {}",
        panel.selected().unwrap_or("-"),
        panel.range()
    );

    if let Some(headline) = panel.risk_headline() {
        println!("{headline}");
    }
    println!();
    if let Some(h) = panel.history() {
        history(h);
    }
    if let Some(m) = panel.monthly() {
        monthly(m);
    }
}
