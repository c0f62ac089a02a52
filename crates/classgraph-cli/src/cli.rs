//! Command-line interface for the classgraph utility
//!
//! Reads a reflection snapshot, builds the class model and writes a diagram.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

use classgraph::adapters::Snapshot;
use classgraph::core::logging::init_logging;
use classgraph::model::{ApplicationModel, KlassModel, RelationshipModel};
use classgraph::plugins::Orchestrator;
use classgraph::{AttributeFilter, DiagramOptions, DiagramType, Messages};

/// classgraph - UML class diagrams from object-relational reflection snapshots
#[derive(Parser)]
#[command(name = "classgraph")]
#[command(about = "Derive UML class diagrams from object-relational reflection metadata")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Exporter choices
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum DiagramChoice {
    Graphviz,
    Debug,
    Ascii,
}

impl From<DiagramChoice> for DiagramType {
    fn from(value: DiagramChoice) -> Self {
        match value {
            DiagramChoice::Graphviz => DiagramType::Graphviz,
            DiagramChoice::Debug => DiagramType::Debug,
            DiagramChoice::Ascii => DiagramType::Ascii,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the class model of a snapshot and export a diagram
    Diagram {
        /// Reflection snapshot (JSON); use - for stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON options file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Ecosystem name, or `auto` to detect it
        #[arg(short, long)]
        model: Option<String>,

        /// Exporter to use
        #[arg(short = 't', long = "type", value_enum)]
        diagram_type: Option<DiagramChoice>,

        /// Output file base name, without extension
        #[arg(short, long)]
        file: Option<String>,

        /// Output format, e.g. dot, png, svg (non-dot formats need Graphviz)
        #[arg(long)]
        format: Option<String>,

        /// Attribute kinds to show: all, none, or a comma separated list of
        /// content, primary_key, type, foreign_key, timestamp
        #[arg(short, long)]
        attributes: Option<AttributeFilter>,

        /// Hide association names next to multiplicities
        #[arg(long)]
        no_link_names: bool,

        /// Print the diagram instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Suppress progress messages
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the supported object-relational ecosystems
    Ecosystems {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Build the class model of a snapshot and report what it contains
    Check {
        /// Reflection snapshot (JSON); use - for stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Ecosystem name, or `auto` to detect it
        #[arg(short, long)]
        model: Option<String>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Diagram { .. } => "diagram",
            Commands::Ecosystems { .. } => "ecosystems",
            Commands::Check { .. } => "check",
        }
    }
}

/// Flag overrides of the `diagram` command
#[derive(Debug, Default)]
pub struct DiagramFlags {
    pub model: Option<String>,
    pub diagram_type: Option<DiagramChoice>,
    pub file: Option<String>,
    pub format: Option<String>,
    pub attributes: Option<AttributeFilter>,
    pub no_link_names: bool,
    pub quiet: bool,
}

impl DiagramFlags {
    /// Apply the flags that were given over `options`
    pub fn apply(self, mut options: DiagramOptions) -> DiagramOptions {
        if let Some(model) = self.model {
            options.model.model_type = model;
        }
        if let Some(diagram_type) = self.diagram_type {
            options.diagram.diagram_type = diagram_type.into();
        }
        if let Some(file) = self.file {
            options.diagram.file = file;
        }
        if self.format.is_some() {
            options.diagram.format = self.format;
        }
        if let Some(attributes) = self.attributes {
            options.diagram.attributes = attributes;
        }
        if self.no_link_names {
            options.diagram.link_names = false;
        }
        if self.quiet {
            options.messages = Messages::Quiet;
        }
        options
    }
}

/// Main CLI application
pub struct ClassgraphApp {
    orchestrator: Orchestrator,
}

impl ClassgraphApp {
    /// Create a new application instance with default options
    pub fn new() -> Self {
        Self {
            orchestrator: Orchestrator::new(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over the flags
        let log_level = std::env::var("CLASSGRAPH_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("CLASSGRAPH_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("classgraph v{}", env!("CARGO_PKG_VERSION"));
        }
        debug!(command = cli.command.name(), "Dispatching command");

        match cli.command {
            Commands::Diagram {
                input,
                config,
                model,
                diagram_type,
                file,
                format,
                attributes,
                no_link_names,
                stdout,
                quiet,
            } => {
                let flags = DiagramFlags {
                    model,
                    diagram_type,
                    file,
                    format,
                    attributes,
                    no_link_names,
                    quiet,
                };
                self.diagram_command(input, config, flags, stdout, cli.verbose)
            }
            Commands::Ecosystems { json } => self.ecosystems_command(json),
            Commands::Check { input, model } => self.check_command(input, model, cli.verbose),
        }
    }

    /// Handle the diagram command
    fn diagram_command(
        &mut self,
        input: Option<PathBuf>,
        config: Option<PathBuf>,
        flags: DiagramFlags,
        stdout: bool,
        verbose: bool,
    ) -> Result<()> {
        let options = match config {
            Some(path) => DiagramOptions::from_file(&path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => DiagramOptions::default(),
        };
        let options = flags.apply(options);
        let progress = options.messages == Messages::Verbose;
        self.orchestrator = Orchestrator::with_options(options);

        let snapshot = self.read_snapshot(input)?;
        if verbose {
            eprintln!("Read snapshot with {} classes", snapshot.classes.len());
        }

        if stdout {
            let output = self.orchestrator.render(snapshot)?;
            self.write_stdout(&output)?;
            return Ok(());
        }

        if progress {
            eprint!("Generating {} diagram... ", self.orchestrator.options().diagram.diagram_type);
        }
        let path = self.orchestrator.generate(snapshot)?;
        if progress {
            eprintln!("done.");
            eprintln!("Diagram saved to '{}'", path.display());
        }
        Ok(())
    }

    /// Handle the ecosystems command
    fn ecosystems_command(&self, json: bool) -> Result<()> {
        let ecosystems = self.orchestrator.registry().ecosystems();
        if json {
            let listing = serde_json::json!({
                "ecosystems": ecosystems,
                "diagram_types": DiagramType::variants(),
                "total": ecosystems.len(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Supported ecosystems:");
            for name in &ecosystems {
                println!("  {}", name);
            }
            println!();
            println!("Diagram types: {}", DiagramType::variants().join(", "));
        }
        Ok(())
    }

    /// Handle the check command
    fn check_command(&mut self, input: Option<PathBuf>, model: Option<String>, verbose: bool) -> Result<()> {
        let flags = DiagramFlags {
            model,
            ..Default::default()
        };
        self.orchestrator = Orchestrator::with_options(flags.apply(DiagramOptions::default()));

        let snapshot = self.read_snapshot(input)?;
        let application = match self.orchestrator.build_model(snapshot) {
            Ok(application) => application,
            Err(e) => {
                println!("✗ Invalid model: {}", e);
                return Err(e);
            }
        };

        let virtual_classes = application.klasses().iter().filter(|k| k.is_virtual()).count();
        println!(
            "✓ {}: {} classes ({} virtual), {} relationships",
            application.name(),
            application.klasses().len(),
            virtual_classes,
            application.relationships().len()
        );
        if verbose {
            for relationship in application.relationships() {
                eprintln!("  {}", relationship.description()?);
            }
        }
        Ok(())
    }

    /// Read a snapshot from a file or stdin
    pub fn read_snapshot(&self, input: Option<PathBuf>) -> Result<Snapshot> {
        let content = match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e))?,
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                content
            }
        };
        Ok(Snapshot::from_json(&content)?)
    }

    fn write_stdout(&self, content: &str) -> Result<()> {
        if content.is_empty() || content.ends_with('\n') {
            print!("{}", content);
        } else {
            println!("{}", content);
        }
        io::stdout().flush()?;
        Ok(())
    }
}

impl Default for ClassgraphApp {
    fn default() -> Self {
        Self::new()
    }
}
