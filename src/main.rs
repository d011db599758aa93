use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kubediff::config::{Config, GitHubConfig};
use kubediff::github::{CommentManager, GitHubClient};
use kubediff::pipeline::Pipeline;
use kubediff::render::KustomizeRenderer;
use kubediff_core::models::{compose_body, Marker};

#[derive(Parser)]
#[command(name = "kubediff")]
#[command(about = "Comment rendered Kubernetes manifest diffs on GitOps pull requests")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff both branches and replace this tool's comments on the pull request
    Run,
    /// Diff both branches and print the comments without posting them
    Plan,
}

/// Initialize tracing. Logs go to stderr so stdout only carries `plan` output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "kubediff=info,kubediff_core=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let github = GitHubConfig::from_env()?;
    tracing::info!("Starting kubediff: {}", config.summary());
    tracing::info!(
        "Commenting on {}/{}#{} via {}",
        github.owner,
        github.repo,
        github.pr_number,
        github.api_url
    );

    let renderer = KustomizeRenderer::new(&config.kustomize_bin);
    let client = GitHubClient::new(&github);
    let comments = CommentManager::new(&client, Marker::default(), config.template.clone());

    let report = Pipeline::new(&config, &renderer).run(&comments).await?;
    tracing::info!(
        "Done: {} apps checked, {} changed, {} comments posted",
        report.plan.apps.len(),
        report.plan.changes.len(),
        report.posted
    );
    Ok(())
}

fn plan() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing::info!("Starting kubediff: {}", config.summary());

    let renderer = KustomizeRenderer::new(&config.kustomize_bin);
    let plan = Pipeline::new(&config, &renderer).plan()?;

    let marker = Marker::default();
    let total = plan.chunks.len();
    for chunk in &plan.chunks {
        let rendered = config.template.render(chunk.app.as_str(), &chunk.text);
        print!("{}", compose_body(&marker, &rendered, chunk.ordinal, total));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Some(Commands::Plan) => plan(),
        Some(Commands::Run) | None => run().await,
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}
