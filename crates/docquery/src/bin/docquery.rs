//! docquery command line front end
//!
//! Run with: cargo run -p docquery -- upload notes.pdf

use clap::{ArgAction, Parser, Subcommand};
use console::style;
use indicatif::ProgressBar;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docquery::config::WorkflowConfig;
use docquery::recipes::{IngredientList, SpoonacularClient};
use docquery::{
    AppConfig, DocumentBackend, Error, HttpBackend, Notification, Notifier, Recipe, UploadFile,
    Workflow, WorkflowStatus,
};

/// Ask questions about a PDF through a document backend
#[derive(Parser)]
#[command(name = "docquery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and DOCQUERY_BACKEND_URL)
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a PDF and index it
    Upload {
        /// PDF file to upload
        file: PathBuf,
    },

    /// Ask a question about the document the backend holds
    Query {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Interactive session: type questions, `:help` for commands
    Shell {
        /// Upload this PDF before the first question
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show backend health and uploaded files
    Status,

    /// Clear the backend index
    Reset,

    /// Suggest a recipe from ingredients
    Recipe {
        /// Ingredients (at least two)
        #[arg(required = true, num_args = 1..)]
        ingredients: Vec<String>,

        /// Print the recipe as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Prints notifications and shows a spinner while the session is busy
#[derive(Default)]
struct ConsoleNotifier {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleNotifier {
    fn start_spinner(&self, message: &'static str) {
        let mut spinner = self.spinner.lock();
        if let Some(old) = spinner.take() {
            old.finish_and_clear();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        *spinner = Some(bar);
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.lock().take() {
            bar.finish_and_clear();
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::Success { message } => {
                println!("{} {}", style("✓").green().bold(), message)
            }
            Notification::Error { kind, message } => eprintln!(
                "{} {}: {}",
                style("✗").red().bold(),
                style(kind.label()).red(),
                message
            ),
        }
    }

    fn status_changed(&self, _from: WorkflowStatus, to: WorkflowStatus) {
        match to {
            WorkflowStatus::Uploading => self.start_spinner("Uploading PDF..."),
            WorkflowStatus::Indexing => self.start_spinner("Indexing document..."),
            WorkflowStatus::Querying => self.start_spinner("Thinking..."),
            _ => self.stop_spinner(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("docquery={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.backend {
        config.backend.base_url = url;
        config.validate()?;
    }
    tracing::info!("Backend: {}", config.backend.base_url);

    let notifier = Arc::new(ConsoleNotifier::default());
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let workflow = Workflow::new(backend, notifier.clone(), config.workflow.clone());

    if restores_on_start(&cli.command, workflow.config()) {
        restore(&workflow).await;
    }

    match cli.command {
        Commands::Upload { file } => upload(&workflow, &file).await,
        Commands::Query { question } => Ok(ask(&workflow, &question.join(" ")).await),
        Commands::Shell { file } => shell(&workflow, file.as_deref()).await,
        Commands::Status => status(&workflow).await,
        Commands::Reset => Ok(exit_code(workflow.reset().await.is_ok())),
        Commands::Recipe { ingredients, json } => {
            recipe(&config, &ingredients, json, &notifier).await
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Report an error raised before the workflow saw the request
fn report(err: &Error) {
    eprintln!("{} {}", style("✗").red().bold(), err);
}

/// Whether the command should adopt the backend's current upload first
///
/// A one-shot query starts from an empty session, so it always looks the
/// document up; `restore_on_startup` only governs the shell.
fn restores_on_start(command: &Commands, config: &WorkflowConfig) -> bool {
    match command {
        Commands::Query { .. } => true,
        Commands::Shell { .. } => config.restore_on_startup,
        _ => false,
    }
}

async fn restore(workflow: &Workflow) {
    if let Err(e) = workflow.restore().await {
        tracing::warn!("Could not look up previous uploads: {}", e);
    }
}

async fn upload(workflow: &Workflow, path: &Path) -> anyhow::Result<ExitCode> {
    let file = match UploadFile::select_pdf(path).await {
        Ok(file) => file,
        Err(e) => {
            report(&e);
            return Ok(ExitCode::FAILURE);
        }
    };
    Ok(exit_code(workflow.upload(file).await.is_ok()))
}

async fn ask(workflow: &Workflow, question: &str) -> ExitCode {
    match workflow.ask(question).await {
        Ok(answer) => {
            println!("\n{}\n{}\n", style("Response").bold(), answer);
            ExitCode::SUCCESS
        }
        Err(Error::EmptyQuestion) => {
            report(&Error::EmptyQuestion);
            ExitCode::FAILURE
        }
        Err(_) => ExitCode::FAILURE,
    }
}

async fn status(workflow: &Workflow) -> anyhow::Result<ExitCode> {
    let backend = workflow.backend();
    if !backend.health_check().await? {
        eprintln!("{} backend is not reachable", style("✗").red().bold());
        return Ok(ExitCode::FAILURE);
    }
    println!("{} backend is up", style("✓").green().bold());

    match backend.check_uploads().await {
        Ok(files) if files.is_empty() => println!("No uploaded PDFs"),
        Ok(files) => {
            println!("Uploaded PDFs:");
            for file in files {
                println!("  {}", file);
            }
        }
        Err(e) => {
            report(&e);
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

const SHELL_HELP: &str = "\
Type a question and press enter.
  :upload <file.pdf>  upload and index a PDF
  :status             show the session
  :reset              clear the backend index
  :quit               leave";

async fn shell(workflow: &Workflow, file: Option<&Path>) -> anyhow::Result<ExitCode> {
    if let Some(path) = file {
        upload(workflow, path).await?;
    }

    println!("{}", style("docquery shell, :help for commands").dim());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line.split_once(char::is_whitespace).unwrap_or((line, "")) {
            ("", _) => continue,
            (":quit" | ":q" | ":exit", _) => break,
            (":help", _) => println!("{}", SHELL_HELP),
            (":upload", path) if !path.trim().is_empty() => {
                upload(workflow, Path::new(path.trim())).await?;
            }
            (":upload", _) => println!("usage: :upload <file.pdf>"),
            (":reset", _) => {
                let _ = workflow.reset().await;
            }
            (":status", _) => print_session(workflow),
            (cmd, _) if cmd.starts_with(':') => println!("unknown command {}, try :help", cmd),
            _ => {
                ask(workflow, line).await;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_session(workflow: &Workflow) {
    let session = workflow.session();
    println!("status:   {}", session.status);
    match &session.document {
        Some(doc) => println!("document: {} ({})", doc.display_name, doc.locator),
        None => println!("document: none"),
    }
    if let Some(exchange) = &session.last_exchange {
        println!("last:     {}", exchange.question);
    }
}

async fn recipe(
    config: &AppConfig,
    ingredients: &[String],
    json: bool,
    notifier: &ConsoleNotifier,
) -> anyhow::Result<ExitCode> {
    let list: IngredientList = ingredients.iter().collect();
    let client = SpoonacularClient::new(&config.recipes)?;

    notifier.start_spinner("Generating recipe...");
    let result = client.suggest(&list).await;
    notifier.stop_spinner();

    match result {
        Ok(Some(recipe)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            } else {
                print_recipe(&recipe);
            }
            notifier.notify(Notification::success("Recipe generated successfully!"));
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            notifier.notify(Notification::error(
                docquery::FailureKind::Recipe,
                "No recipes found for the given ingredients.",
            ));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            notifier.notify(Notification::from_error(&e));
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_recipe(recipe: &Recipe) {
    println!();
    println!("{}", style(&recipe.title).bold().underlined());
    println!("{}", recipe.description);
    println!(
        "{} {}m   {} {} servings   {} {}",
        style("time").dim(),
        recipe.total_time(),
        style("serves").dim(),
        recipe.servings,
        style("difficulty").dim(),
        recipe.difficulty
    );
    if !recipe.tags.is_empty() {
        println!("{}", style(recipe.tags.join(" · ")).cyan());
    }

    println!("\n{}", style("Ingredients").bold());
    for ingredient in &recipe.ingredients {
        println!("  - {}", ingredient.name);
    }

    if !recipe.instructions.is_empty() {
        println!("\n{}", style("Instructions").bold());
        for (i, step) in recipe.instructions.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }

    let n = &recipe.nutrition;
    println!(
        "\n{} {} kcal, {}g protein, {}g carbs, {}g fat, {}g fiber",
        style("Nutrition").bold(),
        n.calories,
        n.protein,
        n.carbs,
        n.fat,
        n.fiber
    );
    if !recipe.image.is_empty() {
        println!("{}", style(&recipe.image).dim());
    }
    println!("{}", style(format!("via {}", recipe.author.name)).dim());
}
