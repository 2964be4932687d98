mod cli;

use anyhow::Context;
use cli::{output::Output, Cli, Commands};
use pdfrag::{
    create_app,
    utils::toml_config::LogFormat,
    AppState, ConfigManager, PdfRagConfig, RagPipeline,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let Cli {
        config,
        verbose,
        no_color,
        command,
    } = Cli::parse_args();

    let output = if no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Some(Commands::Config { full, validate }) = command {
        return show_config(&config, full, validate, &output);
    }

    let config_manager = Arc::new(
        ConfigManager::new(&config)
            .with_context(|| format!("Failed to load {}", config.display()))?,
    );
    init_tracing(&config_manager.config(), verbose);

    match command {
        None | Some(Commands::Serve) => serve(config_manager, &output).await,
        Some(Commands::Ingest { files }) => ingest(config_manager, files, &output).await,
        Some(Commands::Ask { question }) => ask(config_manager, &question, &output).await,
        Some(Commands::Config { .. }) => Ok(()),
    }
}

/// `RUST_LOG` wins over `server.log_level`; `--verbose` raises the fallback to debug.
fn init_tracing(config: &PdfRagConfig, verbose: bool) {
    let fallback = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(config_manager: Arc<ConfigManager>, output: &Output) -> anyhow::Result<()> {
    let config = config_manager.config();

    if let Err(e) = config_manager.start_watching() {
        tracing::warn!(error = %e, "Config hot reload disabled");
    }

    let pipeline = RagPipeline::from_config(Arc::clone(&config_manager))
        .await
        .context("Failed to initialise the RAG pipeline")?;
    let app = create_app(AppState::new(pipeline)).context("Failed to build router")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    output.banner();
    output.kv("Listening", &format!("http://{}", addr));
    output.kv("API prefix", config.server.stage.prefix());
    output.kv("Model", &config.llm.model);
    output.newline();

    tracing::info!(
        address = %addr,
        stage = config.server.stage.as_str(),
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

async fn ingest(
    config_manager: Arc<ConfigManager>,
    files: Vec<PathBuf>,
    output: &Output,
) -> anyhow::Result<()> {
    let pipeline = RagPipeline::from_config(config_manager).await?;
    let total = files.len();
    let mut failures = 0;
    output.info(&format!("Indexing {} file(s)", total));

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let result = match tokio::fs::read(&path).await {
            Ok(bytes) => pipeline.ingest_pdf(&name, bytes).await.map_err(anyhow::Error::from),
            Err(e) => Err(anyhow::Error::from(e)),
        };

        match result {
            Ok(report) => output.ingested(&report),
            Err(e) => {
                failures += 1;
                output.error(&format!("{}: {:#}", path.display(), e));
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed to index", failures, total);
    }
    Ok(())
}

async fn ask(
    config_manager: Arc<ConfigManager>,
    question: &str,
    output: &Output,
) -> anyhow::Result<()> {
    let pipeline = RagPipeline::from_config(config_manager).await?;
    let response = pipeline.ask(question).await?;
    output.answer(&response.answer, &response.sources);
    Ok(())
}

fn show_config(path: &Path, full: bool, validate: bool, output: &Output) -> anyhow::Result<()> {
    if validate {
        PdfRagConfig::load(path)
            .with_context(|| format!("{} is not valid", path.display()))?;
        output.success(&format!("{} is valid", path.display()));
        return Ok(());
    }

    let config = PdfRagConfig::load_or_default(path)?;

    if full {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    output.header("Configuration");
    output.kv("File", &path.display().to_string());
    if !path.exists() {
        output.warning("File not found, showing defaults");
    }

    output.header("Server");
    output.kv("Address", &format!("{}:{}", config.server.host, config.server.port));
    output.kv("Stage", config.server.stage.as_str());
    output.kv("Max upload", &format!("{} MB", config.server.max_upload_mb));

    output.header("Models");
    output.kv("LLM", &format!("{} @ {}", config.llm.model, config.llm.base_url));
    output.kv("Embeddings", &config.embeddings.model);

    output.header("RAG");
    output.kv("Upload dir", &config.rag.upload_dir.display().to_string());
    output.kv("Vector path", &config.rag.vector_path.display().to_string());
    output.kv("Collection", &config.rag.collection);
    output.kv(
        "Chunking",
        &format!("{} chars, {} overlap", config.rag.chunk_size, config.rag.chunk_overlap),
    );
    output.kv(
        "Retrieval",
        &format!(
            "top {} above {:.2}",
            config.rag.top_k, config.rag.score_threshold
        ),
    );

    output.hint("Pass --full to print the complete TOML.");
    Ok(())
}
