//! Bankforge: bank customer analytics CLI over a single customer table
//!
//! This is the main entrypoint that orchestrates dataset loading, view
//! computation, CSV export, and chart rendering.

use anyhow::Result;
use bankforge::{compute_view, export_all_views, view_to_csv, viz, Args, RecordStore};
use clap::Parser;
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    if args.verbose {
        println!("Bankforge - Bank Customer Analytics");
        println!("===================================\n");
    }

    // Check if in single-view mode
    if let Some(view_name) = args.resolve_view()? {
        run_view_mode(&args, view_name)?;
    } else {
        run_full_pipeline(&args)?;
    }

    Ok(())
}

/// Print one view as CSV on stdout.
fn run_view_mode(args: &Args, view_name: &str) -> Result<()> {
    if args.verbose {
        println!("Loading dataset from: {}", args.input);
    }
    let store = RecordStore::load(&args.input)?;

    let view = compute_view(view_name, store.records())?;
    print!("{}", view_to_csv(&view)?);
    Ok(())
}

/// Run the full analytics pipeline: load, export, charts, KPI report.
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== Full Analytics Pipeline ===\n");

    let start_time = Instant::now();

    // Step 1: Load the dataset
    if args.verbose {
        println!("Step 1: Loading dataset");
        println!("  Input file: {}", args.input);
    }

    let load_start = Instant::now();
    let store = RecordStore::load(&args.input)?;
    let load_time = load_start.elapsed();

    println!("✓ Dataset loaded: {} customers", store.len());
    if store.skipped() > 0 {
        println!("  Skipped {} malformed or duplicate rows", store.skipped());
    }
    if args.verbose {
        println!("  Loading time: {:.2}s", load_time.as_secs_f64());
    }

    // Step 2: Export all views as CSV
    if args.export {
        if args.verbose {
            println!("\nStep 2: Exporting views");
            println!("  Output directory: {}", args.out_dir);
        }

        let export_start = Instant::now();
        let summary = export_all_views(&store, Path::new(&args.out_dir))?;
        let export_time = export_start.elapsed();

        println!("\n✓ Views exported to {}/", args.out_dir);
        for (name, rows) in &summary {
            println!("  {:30} {:4} rows", name, rows);
        }
        if args.verbose {
            println!("  Export time: {:.2}s", export_time.as_secs_f64());
        }
    }

    // Step 3: Render charts and print the KPI report
    if args.verbose {
        println!("\nStep 3: Generating dashboard charts");
        println!("  Output file: {}", args.chart);
    }

    let viz_start = Instant::now();
    viz::generate_dashboard_report(&store, &args.chart)?;
    let viz_time = viz_start.elapsed();

    println!("\n✓ Charts generated");
    if args.verbose {
        println!("  Rendering time: {:.2}s", viz_time.as_secs_f64());
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    println!("Main chart saved to: {}", args.chart);
    println!(
        "Balance chart saved to: {}",
        args.chart.replace(".png", "_balance.png")
    );
    println!(
        "Income band chart saved to: {}",
        args.chart.replace(".png", "_income.png")
    );

    Ok(())
}
