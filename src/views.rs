//! Aggregation engine: the eleven derived views over the customer table.
//!
//! Every view is a pure function of the record slice — group-by via keyed
//! accumulation, then an explicit sort. Rows with a null grouping key form
//! their own group; they are never dropped. Rates over an empty
//! contribution set resolve to `Value::Null`, never an error.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::data::CustomerRecord;

/// All view names, in export order.
pub const VIEW_NAMES: [&str; 11] = [
    "churn_by_branch",
    "churn_by_account_type",
    "income_band_churn",
    "avg_balance_by_branch",
    "avg_balance_by_account_type",
    "balance_by_tenure",
    "account_type_distribution",
    "branch_distribution",
    "high_value_customers",
    "overall_kpis",
    "branch_performance",
];

/// A single scalar cell of a derived view.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// A named result table: ordered columns plus uniformly-shaped rows.
///
/// Views have no storage of their own; they are recomputed from the record
/// store each time they are requested.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedView {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DerivedView {
    fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell lookup by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }
}

/// Compute a view by name.
pub fn compute_view(name: &str, records: &[CustomerRecord]) -> crate::Result<DerivedView> {
    match name {
        "churn_by_branch" => Ok(churn_by_branch(records)),
        "churn_by_account_type" => Ok(churn_by_account_type(records)),
        "income_band_churn" => Ok(income_band_churn(records)),
        "avg_balance_by_branch" => Ok(avg_balance_by_branch(records)),
        "avg_balance_by_account_type" => Ok(avg_balance_by_account_type(records)),
        "balance_by_tenure" => Ok(balance_by_tenure(records)),
        "account_type_distribution" => Ok(account_type_distribution(records)),
        "branch_distribution" => Ok(branch_distribution(records)),
        "high_value_customers" => Ok(high_value_customers(records)),
        "overall_kpis" => Ok(overall_kpis(records)),
        "branch_performance" => Ok(branch_performance(records)),
        _ => Err(crate::Error::UnknownView {
            name: name.to_string(),
        }),
    }
}

/// Churn rate per branch, worst first. Null branch is its own group.
pub fn churn_by_branch(records: &[CustomerRecord]) -> DerivedView {
    churn_view(records, "churn_by_branch", "branch", |r| r.branch.clone())
}

/// Churn rate per account type, worst first.
pub fn churn_by_account_type(records: &[CustomerRecord]) -> DerivedView {
    churn_view(records, "churn_by_account_type", "account_type", |r| {
        r.account_type.clone()
    })
}

/// Churn rate and average income per income band.
///
/// Bands: income < 5000 is "Low", income <= 15000 is "Middle", everything
/// above is "High" — both boundary values belong to Middle. Rows with a
/// null income are excluded from banding.
pub fn income_band_churn(records: &[CustomerRecord]) -> DerivedView {
    let mut view = DerivedView::new(
        "income_band_churn",
        &[
            "income_band",
            "num_customers",
            "churned_customers",
            "churn_rate_pct",
            "avg_income",
        ],
    );

    let mut groups: HashMap<&'static str, Vec<&CustomerRecord>> = HashMap::new();
    for record in records {
        if let Some(income) = record.income {
            groups.entry(income_band(income)).or_default().push(record);
        }
    }

    let mut stats: Vec<(&'static str, usize, i64, Option<f64>, Option<f64>)> = groups
        .into_iter()
        .map(|(band, members)| {
            let count = members.len();
            let churned: i64 = members.iter().map(|r| i64::from(r.churned)).sum();
            let rate = churn_rate(churned, count);
            let incomes: Vec<f64> = members.iter().filter_map(|r| r.income).collect();
            let avg_income = mean(&incomes).map(round2);
            (band, count, churned, rate, avg_income)
        })
        .collect();
    stats.sort_by(|a, b| cmp_f64_desc(a.3, b.3).then_with(|| a.0.cmp(b.0)));

    for (band, count, churned, rate, avg_income) in stats {
        view.rows.push(vec![
            Value::Str(band.to_string()),
            Value::Int(count as i64),
            Value::Int(churned),
            float_or_null(rate),
            float_or_null(avg_income),
        ]);
    }
    view
}

/// Balance statistics per branch, richest first.
pub fn avg_balance_by_branch(records: &[CustomerRecord]) -> DerivedView {
    balance_view(records, "avg_balance_by_branch", "branch", |r| {
        r.branch.clone()
    })
}

/// Balance statistics per account type, richest first.
pub fn avg_balance_by_account_type(records: &[CustomerRecord]) -> DerivedView {
    balance_view(records, "avg_balance_by_account_type", "account_type", |r| {
        r.account_type.clone()
    })
}

/// Average balance per tenure band, richest band first.
///
/// Bands are checked in order New, "1-3 years", "3-5 years", "5+ years"
/// with inclusive upper bounds, so a tenure of exactly 3 lands in
/// "1-3 years" (first match wins). Null tenure rows are excluded.
pub fn balance_by_tenure(records: &[CustomerRecord]) -> DerivedView {
    let mut view = DerivedView::new(
        "balance_by_tenure",
        &["tenure_group", "num_customers", "avg_balance", "avg_tenure_years"],
    );

    let mut groups: HashMap<&'static str, Vec<&CustomerRecord>> = HashMap::new();
    for record in records {
        if let Some(tenure) = record.tenure_years {
            groups.entry(tenure_band(tenure)).or_default().push(record);
        }
    }

    let mut stats: Vec<(&'static str, usize, Option<f64>, Option<f64>)> = groups
        .into_iter()
        .map(|(band, members)| {
            let balances: Vec<f64> = members.iter().filter_map(|r| r.balance).collect();
            let tenures: Vec<f64> = members.iter().filter_map(|r| r.tenure_years).collect();
            (
                band,
                members.len(),
                mean(&balances).map(round2),
                mean(&tenures).map(round2),
            )
        })
        .collect();
    stats.sort_by(|a, b| cmp_f64_desc(a.2, b.2).then_with(|| a.0.cmp(b.0)));

    for (band, count, avg_balance, avg_tenure) in stats {
        view.rows.push(vec![
            Value::Str(band.to_string()),
            Value::Int(count as i64),
            float_or_null(avg_balance),
            float_or_null(avg_tenure),
        ]);
    }
    view
}

/// Customer counts and share of total per account type.
pub fn account_type_distribution(records: &[CustomerRecord]) -> DerivedView {
    distribution_view(records, "account_type_distribution", "account_type", |r| {
        r.account_type.clone()
    })
}

/// Customer counts and share of total per branch.
pub fn branch_distribution(records: &[CustomerRecord]) -> DerivedView {
    distribution_view(records, "branch_distribution", "branch", |r| r.branch.clone())
}

/// Customers at or above the top-decile balance threshold.
///
/// The threshold is the balance at index floor(0.1 × n) of the descending
/// balance sort (n = count of non-null balances). Selection is inclusive
/// (`>=`), so ties at the threshold can push the result past 10% of
/// records. An empty store yields an empty view, not an error.
pub fn high_value_customers(records: &[CustomerRecord]) -> DerivedView {
    let mut view = DerivedView::new(
        "high_value_customers",
        &[
            "customer_id",
            "branch",
            "account_type",
            "age",
            "income",
            "balance",
            "tenure_years",
            "churned",
        ],
    );

    let mut balances: Vec<f64> = records.iter().filter_map(|r| r.balance).collect();
    if balances.is_empty() {
        return view;
    }
    balances.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let idx = ((0.1 * balances.len() as f64).floor() as usize).min(balances.len() - 1);
    let threshold = balances[idx];

    let mut selected: Vec<&CustomerRecord> = records
        .iter()
        .filter(|r| r.balance.is_some_and(|b| b >= threshold))
        .collect();
    selected.sort_by(|a, b| cmp_f64_desc(a.balance, b.balance));

    for record in selected {
        view.rows.push(vec![
            Value::Int(record.customer_id),
            str_or_null(&record.branch),
            str_or_null(&record.account_type),
            record.age.map(Value::Int).unwrap_or(Value::Null),
            float_or_null(record.income),
            float_or_null(record.balance),
            float_or_null(record.tenure_years),
            Value::Int(i64::from(record.churned)),
        ]);
    }
    view
}

/// Whole-store summary: one row of headline numbers.
///
/// On an empty store the counts are 0 and every rate/mean field is Null.
pub fn overall_kpis(records: &[CustomerRecord]) -> DerivedView {
    let mut view = DerivedView::new(
        "overall_kpis",
        &[
            "total_customers",
            "churned_customers",
            "overall_churn_rate_pct",
            "avg_balance",
            "total_balance",
            "avg_income",
            "avg_tenure_years",
            "num_branches",
            "num_account_types",
        ],
    );

    let total = records.len();
    let churned: i64 = records.iter().map(|r| i64::from(r.churned)).sum();
    let balances: Vec<f64> = records.iter().filter_map(|r| r.balance).collect();
    let incomes: Vec<f64> = records.iter().filter_map(|r| r.income).collect();
    let tenures: Vec<f64> = records.iter().filter_map(|r| r.tenure_years).collect();

    let total_balance = if balances.is_empty() {
        None
    } else {
        Some(round2(balances.iter().sum()))
    };

    let branches: HashSet<&str> = records.iter().filter_map(|r| r.branch.as_deref()).collect();
    let account_types: HashSet<&str> = records
        .iter()
        .filter_map(|r| r.account_type.as_deref())
        .collect();

    view.rows.push(vec![
        Value::Int(total as i64),
        Value::Int(churned),
        float_or_null(churn_rate(churned, total)),
        float_or_null(mean(&balances).map(round2)),
        float_or_null(total_balance),
        float_or_null(mean(&incomes).map(round2)),
        float_or_null(mean(&tenures).map(round2)),
        Value::Int(branches.len() as i64),
        Value::Int(account_types.len() as i64),
    ]);
    view
}

/// Per-branch scoreboard: churn rate joined with balance statistics.
///
/// Hash join (inner) of `churn_by_branch` and `avg_balance_by_branch` on
/// the branch key; both derive from the same base grouping, so the branch
/// sets coincide and no rows are dropped in practice.
pub fn branch_performance(records: &[CustomerRecord]) -> DerivedView {
    let mut view = DerivedView::new(
        "branch_performance",
        &[
            "branch",
            "num_customers",
            "churn_rate_pct",
            "avg_balance",
            "total_balance",
            "balance_per_customer",
        ],
    );

    let churn = churn_by_branch(records);
    let balance = avg_balance_by_branch(records);

    // Both intermediates put the grouping key in column 0; balance stats sit
    // at avg=2, total=3 (see balance_view).
    let mut balance_by_key: HashMap<Option<&str>, &Vec<Value>> = HashMap::new();
    for row in &balance.rows {
        balance_by_key.insert(row[0].as_str(), row);
    }

    for row in &churn.rows {
        let Some(balance_row) = balance_by_key.get(&row[0].as_str()) else {
            continue;
        };
        let num_customers = row[1].as_i64().unwrap_or(0);
        let per_customer = match (balance_row[3].as_f64(), num_customers) {
            (Some(total), n) if n > 0 => Some(round2(total / n as f64)),
            _ => None,
        };
        view.rows.push(vec![
            row[0].clone(),
            row[1].clone(),
            row[3].clone(),
            balance_row[2].clone(),
            balance_row[3].clone(),
            float_or_null(per_customer),
        ]);
    }
    view
}

/// Income band per the fixed thresholds; boundaries belong to Middle.
pub fn income_band(income: f64) -> &'static str {
    if income < 5000.0 {
        "Low"
    } else if income <= 15000.0 {
        "Middle"
    } else {
        "High"
    }
}

/// Tenure band; first matching band wins at the shared boundaries.
pub fn tenure_band(tenure_years: f64) -> &'static str {
    if tenure_years < 1.0 {
        "New"
    } else if tenure_years <= 3.0 {
        "1-3 years"
    } else if tenure_years <= 5.0 {
        "3-5 years"
    } else {
        "5+ years"
    }
}

// ---- shared view shapes ----

fn churn_view(
    records: &[CustomerRecord],
    name: &str,
    key_column: &str,
    key_fn: impl Fn(&CustomerRecord) -> Option<String>,
) -> DerivedView {
    let mut view = DerivedView::new(
        name,
        &[key_column, "num_customers", "churned_customers", "churn_rate_pct"],
    );

    let mut stats: Vec<(Option<String>, usize, i64, Option<f64>)> = group_by(records, key_fn)
        .into_iter()
        .map(|(key, members)| {
            let count = members.len();
            let churned: i64 = members.iter().map(|r| i64::from(r.churned)).sum();
            let rate = churn_rate(churned, count);
            (key, count, churned, rate)
        })
        .collect();
    stats.sort_by(|a, b| cmp_f64_desc(a.3, b.3).then_with(|| cmp_keys(&a.0, &b.0)));

    for (key, count, churned, rate) in stats {
        view.rows.push(vec![
            str_or_null(&key),
            Value::Int(count as i64),
            Value::Int(churned),
            float_or_null(rate),
        ]);
    }
    view
}

fn balance_view(
    records: &[CustomerRecord],
    name: &str,
    key_column: &str,
    key_fn: impl Fn(&CustomerRecord) -> Option<String>,
) -> DerivedView {
    let mut view = DerivedView::new(
        name,
        &[
            key_column,
            "num_customers",
            "avg_balance",
            "total_balance",
            "min_balance",
            "max_balance",
        ],
    );

    type BalanceStats = (
        Option<String>,
        usize,
        Option<f64>,
        Option<f64>,
        Option<f64>,
        Option<f64>,
    );
    let mut stats: Vec<BalanceStats> = group_by(records, key_fn)
        .into_iter()
        .map(|(key, members)| {
            let count = members.len();
            let balances: Vec<f64> = members.iter().filter_map(|r| r.balance).collect();
            let avg = mean(&balances).map(round2);
            let total = if balances.is_empty() {
                None
            } else {
                Some(round2(balances.iter().sum()))
            };
            let min = balances.iter().copied().reduce(f64::min);
            let max = balances.iter().copied().reduce(f64::max);
            (key, count, avg, total, min, max)
        })
        .collect();
    stats.sort_by(|a, b| cmp_f64_desc(a.2, b.2).then_with(|| cmp_keys(&a.0, &b.0)));

    for (key, count, avg, total, min, max) in stats {
        view.rows.push(vec![
            str_or_null(&key),
            Value::Int(count as i64),
            float_or_null(avg),
            float_or_null(total),
            float_or_null(min),
            float_or_null(max),
        ]);
    }
    view
}

fn distribution_view(
    records: &[CustomerRecord],
    name: &str,
    key_column: &str,
    key_fn: impl Fn(&CustomerRecord) -> Option<String>,
) -> DerivedView {
    let mut view = DerivedView::new(name, &[key_column, "num_customers", "pct_of_total"]);
    let total = records.len();

    let mut stats: Vec<(Option<String>, usize)> = group_by(records, key_fn)
        .into_iter()
        .map(|(key, members)| (key, members.len()))
        .collect();
    stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| cmp_keys(&a.0, &b.0)));

    for (key, count) in stats {
        // total > 0 whenever a group exists
        let pct = round2(count as f64 / total as f64 * 100.0);
        view.rows.push(vec![
            str_or_null(&key),
            Value::Int(count as i64),
            Value::Float(pct),
        ]);
    }
    view
}

// ---- accumulation and numeric helpers ----

fn group_by(
    records: &[CustomerRecord],
    key_fn: impl Fn(&CustomerRecord) -> Option<String>,
) -> HashMap<Option<String>, Vec<&CustomerRecord>> {
    let mut groups: HashMap<Option<String>, Vec<&CustomerRecord>> = HashMap::new();
    for record in records {
        groups.entry(key_fn(record)).or_default().push(record);
    }
    groups
}

fn churn_rate(churned: i64, count: usize) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(round2(churned as f64 / count as f64 * 100.0))
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn float_or_null(v: Option<f64>) -> Value {
    v.map(Value::Float).unwrap_or(Value::Null)
}

fn str_or_null(v: &Option<String>) -> Value {
    v.as_ref()
        .map(|s| Value::Str(s.clone()))
        .unwrap_or(Value::Null)
}

/// Descending order with None last.
fn cmp_f64_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Named keys ascending, the null group last.
fn cmp_keys(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
