//! CSV serialization of derived views.

use std::path::Path;

use crate::data::RecordStore;
use crate::views::{compute_view, DerivedView, Value, VIEW_NAMES};

/// Serialize a view: header row of column names, then each data row in view
/// order. Null cells become empty fields; quoting is handled by the csv
/// writer.
pub fn view_to_csv(view: &DerivedView) -> crate::Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&view.columns)?;
    for row in &view.rows {
        wtr.write_record(row.iter().map(format_value))?;
    }
    let data = wtr
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Write a single view to `<out_dir>/<view_name>.csv`, returning the row count.
pub fn export_view(view: &DerivedView, out_dir: &Path) -> crate::Result<usize> {
    let path = out_dir.join(format!("{}.csv", view.name));
    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record(&view.columns)?;
    for row in &view.rows {
        wtr.write_record(row.iter().map(format_value))?;
    }
    wtr.flush()?;
    Ok(view.rows.len())
}

/// Export every view to `out_dir`, creating it if needed.
///
/// # Returns
/// * `(view_name, row_count)` per exported view, in export order
pub fn export_all_views(store: &RecordStore, out_dir: &Path) -> crate::Result<Vec<(String, usize)>> {
    std::fs::create_dir_all(out_dir)?;

    let mut summary = Vec::with_capacity(VIEW_NAMES.len());
    for name in VIEW_NAMES {
        let view = compute_view(name, store.records())?;
        let rows = export_view(&view, out_dir)?;
        summary.push((name.to_string(), rows));
    }
    Ok(summary)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Str(s) => s.clone(),
        Value::Null => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CustomerRecord;
    use crate::views::churn_by_branch;
    use tempfile::tempdir;

    fn rec(id: i64, branch: Option<&str>, balance: Option<f64>, churned: u8) -> CustomerRecord {
        CustomerRecord {
            customer_id: id,
            age: None,
            income: None,
            account_type: None,
            balance,
            tenure_years: None,
            churned,
            branch: branch.map(str::to_string),
        }
    }

    #[test]
    fn test_view_to_csv() {
        let records = vec![
            rec(1, Some("A"), Some(100.0), 0),
            rec(2, Some("A"), Some(300.0), 1),
            rec(3, Some("B"), Some(200.0), 0),
        ];
        let csv = view_to_csv(&churn_by_branch(&records)).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("branch,num_customers,churned_customers,churn_rate_pct")
        );
        assert_eq!(lines.next(), Some("A,2,1,50"));
        assert_eq!(lines.next(), Some("B,1,0,0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_view_to_csv_quotes_commas_and_blanks_nulls() {
        let records = vec![
            rec(1, Some("Main, North"), Some(100.0), 0),
            rec(2, None, None, 1),
        ];
        let csv = view_to_csv(&churn_by_branch(&records)).unwrap();
        assert!(csv.contains("\"Main, North\""));
        // Null branch group renders as an empty leading field
        assert!(csv.lines().any(|line| line.starts_with(",1,1,")));
    }

    #[test]
    fn test_export_all_views() {
        let store = RecordStore::from_records(vec![
            rec(1, Some("A"), Some(100.0), 0),
            rec(2, Some("B"), Some(200.0), 1),
        ]);
        let dir = tempdir().unwrap();

        let summary = export_all_views(&store, dir.path()).unwrap();
        assert_eq!(summary.len(), VIEW_NAMES.len());
        for (name, _rows) in &summary {
            assert!(dir.path().join(format!("{name}.csv")).exists());
        }

        // overall_kpis always carries exactly one row
        let kpis = summary.iter().find(|(n, _)| n == "overall_kpis").unwrap();
        assert_eq!(kpis.1, 1);
    }
}
