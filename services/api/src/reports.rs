use crate::infra::{build_radar_service, override_data_dir};
use clap::Args;
use radar_ali::config::AppConfig;
use radar_ali::error::AppError;
use radar_ali::radar::{CompanyId, RadarService, RegionalSummary};
use radar_ali::recommendation::{CurationReport, RecommendationOutcome, SelectionSource};
use radar_ali::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Read companies.csv, solutions.csv and scheduled.csv from this directory
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DashboardArgs {
    /// Restrict the summary to one regional (omit for all regionals)
    #[arg(long)]
    pub(crate) regional: Option<String>,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Company id or name
    pub(crate) company: String,
    /// Print the full outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CurateArgs {
    /// Restrict the analysis to one regional (omit for all regionals)
    #[arg(long)]
    pub(crate) regional: Option<String>,
    /// Ask the language model for new solutions covering the gaps
    #[arg(long)]
    pub(crate) suggest: bool,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

async fn offline_service(source: SourceArgs) -> Result<Arc<RadarService>, AppError> {
    let mut config = AppConfig::load()?;
    override_data_dir(&mut config, source.data_dir);
    telemetry::init(&config.telemetry, config.environment)?;
    build_radar_service(&config)
}

pub(crate) async fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let service = offline_service(args.source).await?;
    let summary = service.dashboard(args.regional.as_deref()).await?;
    render_summary(&summary);
    Ok(())
}

pub(crate) async fn run_recommendation(args: RecommendArgs) -> Result<(), AppError> {
    let service = offline_service(args.source).await?;
    let company_id = CompanyId::from_raw(&args.company);
    let outcome = service.recommend(&company_id).await?;

    if args.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Outcome payload unavailable: {err}"),
        }
    } else {
        render_outcome(&outcome);
    }
    Ok(())
}

pub(crate) async fn run_curation(args: CurateArgs) -> Result<(), AppError> {
    let service = offline_service(args.source).await?;
    let report = service
        .curation(args.regional.as_deref(), args.suggest)
        .await?;
    render_curation(&report, args.suggest);
    Ok(())
}

pub(crate) fn render_summary(summary: &RegionalSummary) {
    println!(
        "Radar summary: {}",
        summary.regional.as_deref().unwrap_or("all regionals")
    );
    println!(
        "- {} companies | {} scheduled solutions | {} distinct challenges | {} sectors",
        summary.total_companies,
        summary.scheduled_solutions,
        summary.unique_challenges,
        summary.unique_sectors
    );

    if let Some(top) = summary.top_challenge() {
        println!("- Most frequent challenge: {} ({})", top.label, top.count);
    }
    if let Some(top) = summary.top_sector() {
        println!("- Most frequent sector: {} ({})", top.label, top.count);
    }

    if !summary.challenges.is_empty() {
        println!("\nChallenges");
        for entry in &summary.challenges {
            println!("  - {}: {}", entry.label, entry.count);
        }
    }
    if !summary.maturity.is_empty() {
        println!("\nInnovation maturity");
        for entry in &summary.maturity {
            println!("  - {}: {}", entry.label, entry.count);
        }
    }
    if !summary.stages.is_empty() {
        println!("\nDiagnostic stages");
        for entry in &summary.stages {
            println!("  - {}: {}", entry.label, entry.count);
        }
    }
}

pub(crate) fn render_outcome(outcome: &RecommendationOutcome) {
    match outcome {
        RecommendationOutcome::NoCandidates { company_id, message } => {
            println!("Recommendations for {company_id}");
            println!("{message}");
        }
        RecommendationOutcome::Recommended {
            company_id,
            source,
            fallback,
            selections,
            candidates,
        } => {
            println!("Recommendations for {company_id}");
            match (source, fallback) {
                (SelectionSource::Model, _) => println!("Selected by the language model"),
                (SelectionSource::Fallback, Some(fallback)) => {
                    println!("Algorithmic fallback ({}): {}", fallback.reason, fallback.detail)
                }
                (SelectionSource::Fallback, None) => println!("Algorithmic fallback"),
            }

            for (index, selection) in selections.iter().enumerate() {
                println!(
                    "{}. {} [{}] score {:.2}",
                    index + 1,
                    selection.solution.title,
                    selection.solution.modality.label(),
                    selection.score
                );
                println!("   {}", selection.justification);
            }

            println!("\nRanked candidates");
            for candidate in candidates {
                println!(
                    "  - {:.2} {} ({})",
                    candidate.score, candidate.solution.title, candidate.solution.id
                );
            }
        }
    }
}

pub(crate) fn render_curation(report: &CurationReport, suggested: bool) {
    render_summary(&report.summary);

    if report.underserved.is_empty() {
        println!("\nUnderserved challenges: none");
    } else {
        println!("\nUnderserved challenges");
        for gap in &report.underserved {
            println!(
                "  - {}: {} companies | {} solutions | coverage {:.0}%",
                gap.term,
                gap.company_count,
                gap.solution_count,
                gap.coverage_ratio * 100.0
            );
        }
    }

    if !suggested {
        return;
    }
    if let Some(error) = &report.suggestion_error {
        println!("\nSolution suggestions unavailable: {error}");
    } else if report.suggestions.is_empty() {
        println!("\nSolution suggestions: none");
    } else {
        println!("\nSolution suggestions");
        for suggestion in &report.suggestions {
            println!(
                "  - {} ({}): {}",
                suggestion.name, suggestion.modality, suggestion.justification
            );
        }
    }
}
