use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use natview_core::config::{DisplayStringMode, ExpansionMode};
use natview_core::definitions::ExpandRule;
use natview_core::{DefinitionStore, FileStore, SessionConfig, VisualizerRegistry, VisualizerSession};
use natview_utils::{debug, init_logging_with_level, LogFormat, LogLevel};

/// Inspect and test natvis visualization rules.
#[derive(Parser, Debug)]
#[command(name = "natview")]
#[command(version)]
#[command(about = "Inspect and test natvis visualization rules", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,

    /// Diagnostic verbosity (skipped rules are reported at `warn`)
    #[arg(long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Diagnostic output format (`pretty` or `json`)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    /// When display strings apply: always, visualized, never
    #[arg(long, global = true)]
    display_strings: Option<DisplayStringMode>,

    /// Expansion mode: on-demand or immediate
    #[arg(long, global = true)]
    expansion: Option<ExpansionMode>,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Load rule files and report what each one contributes
    Check
    {
        /// natvis files to load
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show which visualizer a type name resolves to
    Resolve
    {
        #[command(flatten)]
        rules: RuleFiles,
        /// Concrete type name, e.g. `std::vector<int>`
        type_name: String,
    },
    /// Look up the menu label of a registered UI visualizer
    UiName
    {
        #[command(flatten)]
        rules: RuleFiles,
        /// Service GUID, braces included
        service_id: String,
        /// Numeric visualizer id
        id: u32,
    },
}

#[derive(Args, Debug)]
struct RuleFiles
{
    /// natvis files to load, in search order
    #[arg(long = "rules", required = true, num_args = 1..)]
    paths: Vec<PathBuf>,
}

impl RuleFiles
{
    fn load(&self) -> Arc<VisualizerRegistry>
    {
        let registry = Arc::new(VisualizerRegistry::new());
        let loaded = registry.load_store(&FileStore::new(&self.paths));
        debug!(loaded, requested = self.paths.len(), "rule files loaded");
        registry
    }
}

fn main()
{
    let cli = Cli::parse();

    let _log_guard = match init_logging_with_level(cli.log_level, cli.log_format) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if !run_command(cli) {
        process::exit(1);
    }
}

/// Run one subcommand; `false` means nothing was found.
fn run_command(cli: Cli) -> bool
{
    let mut config = SessionConfig::from_env();
    if let Some(mode) = cli.display_strings {
        config.display_strings = mode;
    }
    if let Some(mode) = cli.expansion {
        config.expansion = mode;
    }

    match cli.command {
        Commands::Check { files } => check(&files),
        Commands::Resolve { rules, type_name } => {
            let session = VisualizerSession::new(rules.load(), config);
            resolve(&session, &type_name)
        }
        Commands::UiName { rules, service_id, id } => {
            let session = VisualizerSession::new(rules.load(), config);
            match session.ui_visualizer_name(&service_id, id) {
                Some(name) => {
                    println!("{name}");
                    true
                }
                None => {
                    println!("no UI visualizer {service_id} #{id}");
                    false
                }
            }
        }
    }
}

fn check(files: &[PathBuf]) -> bool
{
    let registry = VisualizerRegistry::new();
    let mut loaded = 0;

    for document in FileStore::new(files).documents() {
        let text = match document.contents {
            Ok(text) => text,
            Err(e) => {
                println!("{}: unreadable ({e})", document.origin);
                continue;
            }
        };
        match registry.load(&document.origin, &text) {
            Ok(file) => {
                loaded += 1;
                println!(
                    "{}: {} visualizers, {} aliases, {} UI visualizers",
                    file.origin,
                    file.visualizers.len(),
                    file.aliases.len(),
                    file.ui_visualizers.len()
                );
            }
            Err(e) => println!("{}: rejected ({e})", document.origin),
        }
    }

    println!("{loaded} of {} files loaded", files.len());
    loaded > 0
}

fn resolve(session: &VisualizerSession, type_name: &str) -> bool
{
    let Some(binding) = session.resolve_type_name(type_name) else {
        println!("{type_name}: no visualizer");
        return false;
    };

    let visualizer = binding.visualizer();
    println!("{type_name}");
    println!("  pattern:   {}", visualizer.pattern);
    println!("  matched:   {}", binding.type_name());
    for (index, arg) in binding.type_args().iter().enumerate() {
        println!("  $T{}:       {arg}", index + 1);
    }
    println!("  display:   {} rule(s)", visualizer.display_strings.len());
    if let Some(expand) = &visualizer.expand {
        let kinds: Vec<&str> = expand.items.iter().map(ExpandRule::kind).collect();
        println!("  expand:    {}", kinds.join(", "));
    }
    for reference in &visualizer.ui_visualizers {
        let label = session
            .ui_visualizer_name(&reference.service_id, reference.id)
            .unwrap_or_else(|| "(unregistered)".to_string());
        println!("  ui:        {label}");
    }
    true
}
