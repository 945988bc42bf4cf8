use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use handlescan::args::OutputFormat;
use handlescan::report::{self, SourcedResult};
use handlescan::utils::{export_path_for, setup_logging, validate_args};
use handlescan::{
    analyze_dataset, export, init_default_patterns, patterns, AnalysisResult, Args,
    HandleClassifier, ReportCache,
};

fn run(args: &Args) -> Result<()> {
    let total_start_time = Instant::now();

    let classifier = HandleClassifier::new(patterns::load_handle_patterns(args.patterns.as_deref())?);
    info!(
        action = "configure",
        component = "classifier",
        pattern_count = classifier.pattern_count(),
        "Handle classifier ready"
    );
    let mut cache: ReportCache<AnalysisResult> = ReportCache::new();
    let mut results: Vec<(PathBuf, Arc<AnalysisResult>)> = Vec::with_capacity(args.inputs.len());
    let multiple_inputs = args.inputs.len() > 1;

    for input in &args.inputs {
        info!(action = "start", component = "input", file_path = ?input, "Processing input file");
        let bytes =
            fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
        let result = cache
            .get_or_compute(&bytes, |bytes| analyze_dataset(bytes, &classifier, args))
            .with_context(|| format!("Failed to analyze {}", input.display()))?;

        if args.format == OutputFormat::Table {
            report::print_analysis_results(input, &result, args);
        }

        if !args.no_export {
            let output = export_path_for(&args.output, input, multiple_inputs);
            export::export_csv(&output, &result.report.entries)
                .with_context(|| format!("Failed to export {}", output.display()))?;
            if args.format == OutputFormat::Table {
                println!("\nTable saved to {}", output.display());
            }
        }

        results.push((input.clone(), result));
    }

    if args.format == OutputFormat::Json {
        let sourced: Vec<SourcedResult<'_>> = results
            .iter()
            .map(|(source, result)| SourcedResult {
                source: source.as_path(),
                result: result.as_ref(),
            })
            .collect();
        println!("{}", report::render_json(&sourced)?);
    }

    info!(
        action = "complete",
        component = "run",
        inputs = args.inputs.len(),
        cache_hits = cache.hits(),
        cache_misses = cache.misses(),
        duration_ms = total_start_time.elapsed().as_millis(),
        "All inputs processed"
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    if args.init {
        let path = init_default_patterns(Path::new("."))?;
        println!("Created {} with default patterns", path.display());
        return Ok(());
    }

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
