use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use segmetrics_rs::{
    score_annotated_segments, ActivityState, AnnotatedSegment, ClassicMetric, Metric, NcibiMetric,
    ScoringConfig, WardMetric,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FamilyChoice {
    Classic,
    Ward,
    Ncibi,
}

impl FamilyChoice {
    fn resolve(self, name: &str) -> Option<Metric> {
        let wanted = name.to_ascii_uppercase();
        let candidates: Vec<Metric> = match self {
            Self::Classic => ClassicMetric::ALL.into_iter().map(Metric::Classic).collect(),
            Self::Ward => WardMetric::ALL.into_iter().map(Metric::Ward).collect(),
            Self::Ncibi => NcibiMetric::ALL.into_iter().map(Metric::Ncibi).collect(),
        };
        candidates
            .into_iter()
            .find(|metric| metric.name() == wanted)
    }
}

/// Score annotated segments against detection-quality metrics.
#[derive(Debug, Parser)]
#[command(name = "score_report")]
struct Args {
    /// JSON file with an array of {start, end, truth, pred} segments.
    #[arg(long)]
    segments: PathBuf,
    /// Metric family; required unless --all is given.
    #[arg(long, value_enum)]
    family: Option<FamilyChoice>,
    /// Metric name within the family, e.g. ACCURACY or FRAGMENTATION.
    #[arg(long)]
    metric: Option<String>,
    /// Score every catalogue metric instead of a single one.
    #[arg(long)]
    all: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Fallback value for absent qualities and zero denominators.
    #[arg(long, default_value_t = ScoringConfig::DEFAULT_VALUE)]
    default_value: f64,
}

#[derive(Debug, Deserialize)]
struct SegmentRow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    truth: bool,
    pred: bool,
}

#[derive(Debug, Serialize)]
struct ScoreReport {
    generated_at: String,
    segment_count: usize,
    scores: BTreeMap<String, f64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let segments = load_segments(&args.segments)?;
    let metrics = select_metrics(args)?;

    let config = ScoringConfig {
        default_value: args.default_value,
        ..ScoringConfig::default()
    };

    let mut scores = BTreeMap::new();
    for metric in metrics {
        let value = score_annotated_segments(&segments, metric, &config)
            .map_err(|err| format!("{metric}: {err}"))?;
        scores.insert(metric.to_string(), value);
    }

    let report = ScoreReport {
        generated_at: Utc::now().to_rfc3339(),
        segment_count: segments.len(),
        scores,
    };

    match args.format {
        OutputFormat::Text => {
            for (metric, value) in &report.scores {
                println!("{metric} {value:.4}");
            }
        }
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&report)
                .map_err(|err| format!("failed to render report: {err}"))?;
            println!("{rendered}");
        }
    }
    Ok(())
}

fn select_metrics(args: &Args) -> Result<Vec<Metric>, String> {
    if args.all {
        return Ok(Metric::all().collect());
    }
    let (Some(family), Some(name)) = (args.family, args.metric.as_deref()) else {
        return Err("pass --family and --metric, or --all".to_string());
    };
    family
        .resolve(name)
        .map(|metric| vec![metric])
        .ok_or_else(|| format!("unknown metric '{name}' in family {family:?}"))
}

fn load_segments(path: &PathBuf) -> Result<Vec<AnnotatedSegment>, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("failed to read '{}': {err}", path.display()))?;
    let rows: Vec<SegmentRow> = serde_json::from_str(&data)
        .map_err(|err| format!("failed to parse '{}': {err}", path.display()))?;
    Ok(rows
        .into_iter()
        .map(|row| AnnotatedSegment {
            start: row.start,
            end: row.end,
            state: ActivityState {
                truth: row.truth,
                pred: row.pred,
            },
        })
        .collect())
}
