//! Chart rendering with Plotters plus the printed KPI report.

use plotters::prelude::*;

use crate::data::RecordStore;
use crate::views::{
    avg_balance_by_branch, churn_by_branch, income_band_churn, overall_kpis, DerivedView, Value,
};

const CHURN_COLOR: RGBColor = RGBColor(205, 92, 92);
const BALANCE_COLOR: RGBColor = RGBColor(46, 139, 87);

/// Render a bar chart of churn rate per branch.
///
/// # Arguments
/// * `store` - Loaded record store
/// * `output_path` - Path to save the PNG plot
pub fn create_churn_chart(store: &RecordStore, output_path: &str) -> crate::Result<()> {
    let view = churn_by_branch(store.records());
    draw_bar_chart(
        &view,
        "churn_rate_pct",
        "Churn Rate by Branch",
        "Branch",
        "Churn Rate (%)",
        &CHURN_COLOR,
        output_path,
    )
    .map_err(|e| crate::Error::Chart(e.to_string()))?;
    println!("Churn chart saved to: {}", output_path);
    Ok(())
}

/// Render a bar chart of average balance per branch.
pub fn create_balance_chart(store: &RecordStore, output_path: &str) -> crate::Result<()> {
    let view = avg_balance_by_branch(store.records());
    draw_bar_chart(
        &view,
        "avg_balance",
        "Average Balance by Branch",
        "Branch",
        "Average Balance ($)",
        &BALANCE_COLOR,
        output_path,
    )
    .map_err(|e| crate::Error::Chart(e.to_string()))?;
    println!("Balance chart saved to: {}", output_path);
    Ok(())
}

/// Render a bar chart of churn rate per income band.
pub fn create_income_band_chart(store: &RecordStore, output_path: &str) -> crate::Result<()> {
    let view = income_band_churn(store.records());
    draw_bar_chart(
        &view,
        "churn_rate_pct",
        "Churn Rate by Income Band",
        "Income Band",
        "Churn Rate (%)",
        &CHURN_COLOR,
        output_path,
    )
    .map_err(|e| crate::Error::Chart(e.to_string()))?;
    println!("Income band chart saved to: {}", output_path);
    Ok(())
}

/// Print the overall KPI summary to the console.
pub fn print_kpi_report(store: &RecordStore) {
    let view = overall_kpis(store.records());

    println!("\n=== Overall KPIs ===");
    for (column, value) in view.columns.iter().zip(&view.rows[0]) {
        println!("  {:24} {}", column, display_value(value));
    }
    if store.skipped() > 0 {
        println!("  {:24} {}", "rows_skipped_on_load", store.skipped());
    }
}

/// Generate the full dashboard artifact set: churn, balance, and income-band
/// charts plus the printed KPI report.
pub fn generate_dashboard_report(store: &RecordStore, base_output_path: &str) -> crate::Result<()> {
    create_churn_chart(store, base_output_path)?;

    let balance_path = base_output_path.replace(".png", "_balance.png");
    create_balance_chart(store, &balance_path)?;

    let income_path = base_output_path.replace(".png", "_income.png");
    create_income_band_chart(store, &income_path)?;

    print_kpi_report(store);
    Ok(())
}

/// Bar chart over a view whose key sits in column 0: one bar per row from
/// `value_column`, x axis labeled with the key values.
fn draw_bar_chart(
    view: &DerivedView,
    value_column: &str,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    color: &RGBColor,
    output_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let value_idx = view
        .column_index(value_column)
        .ok_or_else(|| format!("view {} has no column {}", view.name, value_column))?;

    let labels: Vec<String> = view.rows.iter().map(|row| display_value(&row[0])).collect();
    let values: Vec<f64> = view
        .rows
        .iter()
        .map(|row| row[value_idx].as_f64().unwrap_or(0.0))
        .collect();

    let n = values.len();
    let max_value = values.iter().fold(0.0f64, |a, &b| a.max(b));
    let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n.max(1) as f64 - 0.5), 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_labels(n.max(1))
        .x_label_formatter(&|x| {
            let idx = x.round();
            if idx >= 0.0 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, &value) in values.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [(i as f64 - 0.4, 0.0), (i as f64 + 0.4, value)],
            color.filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Float(v) => format!("{v:.2}"),
        Value::Str(s) => s.clone(),
        Value::Null => "(none)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CustomerRecord;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_store() -> RecordStore {
        let records = vec![
            CustomerRecord {
                customer_id: 1,
                age: Some(30),
                income: Some(4000.0),
                account_type: Some("Savings".to_string()),
                balance: Some(1200.0),
                tenure_years: Some(2.0),
                churned: 0,
                branch: Some("Downtown".to_string()),
            },
            CustomerRecord {
                customer_id: 2,
                age: Some(55),
                income: Some(18000.0),
                account_type: Some("Checking".to_string()),
                balance: Some(9400.0),
                tenure_years: Some(7.5),
                churned: 1,
                branch: Some("Uptown".to_string()),
            },
        ];
        RecordStore::from_records(records)
    }

    #[test]
    fn test_create_churn_chart() {
        let store = test_store();
        let dir = tempdir().unwrap();
        let path = dir.path().join("churn.png");
        let path_str = path.to_str().unwrap();

        create_churn_chart(&store, path_str).unwrap();
        assert!(Path::new(path_str).exists());
    }

    #[test]
    fn test_create_balance_chart() {
        let store = test_store();
        let dir = tempdir().unwrap();
        let path = dir.path().join("balance.png");
        let path_str = path.to_str().unwrap();

        create_balance_chart(&store, path_str).unwrap();
        assert!(Path::new(path_str).exists());
    }

    #[test]
    fn test_generate_dashboard_report() {
        let store = test_store();
        let dir = tempdir().unwrap();
        let path = dir.path().join("dashboard.png");
        let path_str = path.to_str().unwrap();

        generate_dashboard_report(&store, path_str).unwrap();
        assert!(Path::new(path_str).exists());
        assert!(dir.path().join("dashboard_balance.png").exists());
        assert!(dir.path().join("dashboard_income.png").exists());
    }

    #[test]
    fn test_create_income_band_chart() {
        let store = test_store();
        let dir = tempdir().unwrap();
        let path = dir.path().join("income.png");
        let path_str = path.to_str().unwrap();

        create_income_band_chart(&store, path_str).unwrap();
        assert!(Path::new(path_str).exists());
    }

    #[test]
    fn test_charts_on_empty_store() {
        // Zero rows must still produce a (blank) chart, not an error
        let store = RecordStore::from_records(Vec::new());
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");

        create_churn_chart(&store, path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }
}
