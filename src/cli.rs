//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::views::VIEW_NAMES;

/// Bank customer analytics: churn, balance, and segmentation views
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "bank.csv")]
    pub input: String,

    /// Print a single view as CSV on stdout instead of running the pipeline
    /// Example: --view churn_by_branch
    #[arg(long)]
    pub view: Option<String>,

    /// Export all views as CSV files to the output directory
    #[arg(short, long)]
    pub export: bool,

    /// Output directory for exported view CSVs
    #[arg(long, default_value = "results")]
    pub out_dir: String,

    /// Base output path for the dashboard charts
    #[arg(short, long, default_value = "dashboard.png")]
    pub chart: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Validate the `--view` name against the known views.
    pub fn resolve_view(&self) -> crate::Result<Option<&str>> {
        match self.view.as_deref() {
            None => Ok(None),
            Some(name) if VIEW_NAMES.contains(&name) => Ok(Some(name)),
            Some(name) => Err(crate::Error::UnknownView {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_view(view: Option<&str>) -> Args {
        Args {
            input: "bank.csv".to_string(),
            view: view.map(str::to_string),
            export: false,
            out_dir: "results".to_string(),
            chart: "dashboard.png".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn test_resolve_view() {
        let args = args_with_view(Some("churn_by_branch"));
        assert_eq!(args.resolve_view().unwrap(), Some("churn_by_branch"));

        let args = args_with_view(None);
        assert_eq!(args.resolve_view().unwrap(), None);

        let args = args_with_view(Some("nonsense"));
        assert!(matches!(
            args.resolve_view(),
            Err(crate::Error::UnknownView { .. })
        ));
    }
}
