//! grontopi - command-line front end for the GrOntoPI core
//!
//! Loads the configured schema, then runs one lookup and prints the result
//! as JSON. `--data <file.ttl>` answers queries from a local Turtle file
//! instead of the configured SPARQL endpoint.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use grontopi_core::{AppContext, LocalStoreEndpoint, ServiceConfig};

#[derive(Parser)]
#[command(name = "grontopi")]
#[command(version = grontopi_core::VERSION)]
#[command(about = "Ontology-aware entity lookups over a SPARQL endpoint", long_about = None)]
struct Cli {
    /// Service configuration file (YAML or JSON). Defaults to $CONFIG_PATH
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Answer queries from a local Turtle file instead of the endpoint
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Disable the result cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump study-domain classes, relations, properties and catalogs
    Schema {
        /// Build catalogs rooted at this concept scheme only
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Describe entities by IRI
    Describe {
        ids: Vec<String>,

        #[arg(long, short)]
        lang: Option<String>,

        /// Expand links even when several ids are given
        #[arg(long)]
        full: bool,
    },

    /// List one page of instances of a class
    List {
        class: String,

        #[arg(long, default_value_t = 0)]
        start: usize,

        #[arg(long, default_value_t = 50)]
        count: usize,

        #[arg(long, short)]
        lang: Option<String>,

        /// Label prefix filter (ignored below three characters)
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// Print the ids that do not exist on the endpoint
    Exists { ids: Vec<String> },

    /// Linked entities of one entity, with per-class link counts
    Neighbours {
        id: String,

        #[arg(long, short)]
        lang: Option<String>,
    },

    /// Most specific class among the given classes, with level, shoulder and subclasses
    ClassOf { classes: Vec<String> },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => ServiceConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServiceConfig::from_env()?,
    };

    let mut app = AppContext::bootstrap(config).context("starting service context")?;
    if let Some(data) = &cli.data {
        let store = LocalStoreEndpoint::load_file(data)
            .with_context(|| format!("loading data {}", data.display()))?;
        app = app.with_endpoint(Arc::new(store));
    }
    if cli.no_cache {
        app = app.without_cache();
    }

    let default_lang = app.config.default_language.clone();
    let orchestrator = app.orchestrator();

    match cli.command {
        Commands::Schema { catalog } => {
            print_json(&app.ontology.schema_dump(catalog.as_deref()))?;
        }

        Commands::Describe { ids, lang, full } => {
            let lang = lang.unwrap_or_else(|| default_lang.clone());
            let descriptions = orchestrator.fetch_entities_by_ids(&ids, &lang, full).await?;
            print_json(&descriptions)?;
        }

        Commands::List {
            class,
            start,
            count,
            lang,
            prefix,
        } => {
            let lang = lang.unwrap_or_else(|| default_lang.clone());
            let page = orchestrator
                .fetch_entities_of_class(&class, start, count, &lang, &prefix)
                .await?;
            print_json(&page)?;
        }

        Commands::Exists { ids } => {
            let missing = orchestrator.check_existence(&ids).await?;
            print_json(&missing)?;
        }

        Commands::Neighbours { id, lang } => {
            let lang = lang.unwrap_or_else(|| default_lang.clone());
            let summary = orchestrator.fetch_neighbourhood(&id, &lang).await?;
            print_json(&summary)?;
        }

        Commands::ClassOf { classes } => {
            let ontology = &app.ontology;
            let class = ontology.maximal_class(&classes);
            print_json(&serde_json::json!({
                "class_id": class,
                "level": ontology.level(&class),
                "shoulder": ontology.shoulder(&class),
                "subclasses": ontology.subclasses(&class),
            }))?;
        }
    }

    Ok(())
}
