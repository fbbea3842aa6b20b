use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use repoanalyzer::models::UserReport;
use repoanalyzer::{
    AnalysisOutcome, AnalysisPipeline, AnalysisService, Config, GatewayConfig, GitHubClient,
    PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "repoanalyzer")]
#[command(version)]
#[command(about = "Analyze a GitHub user's public repositories")]
struct Args {
    /// GitHub usernames to analyze
    #[arg(required = true)]
    usernames: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Ignore cached results
    #[arg(long)]
    refresh: bool,

    /// Maximum repositories to analyze per user (overrides MAX_REPOS)
    #[arg(long)]
    max_repos: Option<usize>,

    /// Maximum concurrent language requests, 0 for unbounded (overrides CONCURRENCY_LIMIT)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("repoanalyzer=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(max_repos) = args.max_repos {
        config.max_repos = max_repos;
    }
    if let Some(limit) = args.concurrency {
        config.concurrency_limit = (limit > 0).then_some(limit);
    }
    config.validate()?;

    let github = GitHubClient::new(&GatewayConfig::from(&config))?;
    let pipeline_config = PipelineConfig {
        show_progress: !args.quiet && args.format != OutputFormat::Json,
        ..PipelineConfig::from(&config)
    };
    let service = AnalysisService::new(
        AnalysisPipeline::new(github, pipeline_config),
        config.cache_ttl(),
    );

    let mut rendered = Vec::new();
    let mut failures = 0;

    for username in &args.usernames {
        match service.run_analysis(username, args.refresh).await {
            Ok(outcome) => rendered.push(render(&outcome, args.format)?),
            Err(e) => {
                failures += 1;
                tracing::error!("Analysis of {} failed ({}): {}", username, e.status_code(), e);
            }
        }
    }

    let output = rendered.join("\n");
    if let Some(ref path) = args.output {
        std::fs::write(path, &output)?;
        tracing::info!("Output written to: {}", path);
    } else if !output.is_empty() {
        println!("{}", output);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} analyses failed", failures, args.usernames.len());
    }
    Ok(())
}

fn render(outcome: &AnalysisOutcome, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome.response())?,
        OutputFormat::Markdown => format_markdown(&outcome.report, outcome.cached),
        OutputFormat::Text => format_text(&outcome.report, outcome.cached),
    })
}

fn format_text(report: &UserReport, cached: bool) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    output.push_str(&format!("\n=== Repository Analysis: {} ===\n\n", report.username));

    if let Some(ref name) = report.profile.name {
        output.push_str(&format!("Name: {}\n", name));
    }
    if let Some(ref bio) = report.profile.bio {
        output.push_str(&format!("Bio: {}\n", bio));
    }

    output.push_str(&format!(
        "Repositories: {} ({} original, {} forked)\n",
        summary.total_repos_analyzed, summary.original_repos, summary.forked_repos
    ));
    output.push_str(&format!("Estimated LOC: {}\n", summary.total_estimated_loc));
    output.push_str(&format!(
        "Stars: {}  Forks: {}\n",
        summary.total_stars, summary.total_forks
    ));
    output.push_str(&format!(
        "Average Quality: {:.1}/100\n",
        summary.average_quality_score
    ));
    let dist = &summary.complexity_distribution;
    output.push_str(&format!(
        "Complexity: {} beginner, {} intermediate, {} advanced\n",
        dist.beginner, dist.intermediate, dist.advanced
    ));

    if !summary.top_languages.is_empty() {
        output.push_str("\nTop Languages:\n");
        for lang in &summary.top_languages {
            output.push_str(&format!("  - {}: {:.1}%\n", lang.name, lang.percentage));
        }
    }

    output.push_str("\nRepositories:\n");
    for repo in report.repositories.iter().take(15) {
        let fork_marker = if repo.is_fork { " (fork)" } else { "" };
        output.push_str(&format!(
            "  - {}{}: {}/100, {}, ~{} lines, {} stars\n",
            repo.name,
            fork_marker,
            repo.code_quality_score,
            repo.complexity_level,
            repo.estimated_loc,
            repo.stars
        ));
    }

    output.push_str(&format!(
        "\nAnalyzed on: {}{}\n",
        report.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        if cached { " (cached)" } else { "" }
    ));

    output
}

fn format_markdown(report: &UserReport, cached: bool) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    output.push_str(&format!("# Repository Analysis: {}\n\n", report.username));

    if let Some(ref name) = report.profile.name {
        output.push_str(&format!("**Name:** {}\n\n", name));
    }
    if let Some(ref bio) = report.profile.bio {
        output.push_str(&format!("> {}\n\n", bio));
    }

    output.push_str("## Summary\n\n");
    output.push_str("| Metric | Value |\n|--------|-------|\n");
    output.push_str(&format!(
        "| Repositories | {} ({} original, {} forked) |\n",
        summary.total_repos_analyzed, summary.original_repos, summary.forked_repos
    ));
    output.push_str(&format!(
        "| Estimated LOC | {} |\n",
        summary.total_estimated_loc
    ));
    output.push_str(&format!("| Stars | {} |\n", summary.total_stars));
    output.push_str(&format!("| Forks | {} |\n", summary.total_forks));
    output.push_str(&format!(
        "| Average Quality | {:.1} |\n",
        summary.average_quality_score
    ));

    if !summary.top_languages.is_empty() {
        output.push_str("\n## Top Languages\n\n");
        output.push_str("| Language | Bytes | Share |\n|----------|-------|-------|\n");
        for lang in &summary.top_languages {
            output.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                lang.name, lang.bytes, lang.percentage
            ));
        }
    }

    output.push_str("\n## Repositories\n\n");
    output.push_str("| Repository | Quality | Complexity | LOC | Stars | Updated |\n");
    output.push_str("|------------|---------|------------|-----|-------|---------|\n");
    for repo in &report.repositories {
        output.push_str(&format!(
            "| [{}]({}) | {}/100 | {} | {} | {} | {} days ago |\n",
            repo.name,
            repo.url,
            repo.code_quality_score,
            repo.complexity_level,
            repo.estimated_loc,
            repo.stars,
            repo.days_since_update
        ));
    }

    output.push_str(&format!(
        "\n---\n*Analyzed on {}{}*\n",
        report.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        if cached { " (cached)" } else { "" }
    ));

    output
}
