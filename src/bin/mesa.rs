//! Mesa CLI: attribution enforcement over a JSON-LD record graph.
//!
//! Usage:
//!   mesa --graph graph.json retrieve <id> [--expand supports]
//!   mesa --graph graph.json export <id>... [--format jsonld] [--out file]

use clap::{Parser, Subcommand};
use mesa::{
    classify, validate, AttributionBundle, Direction, EdgeKind, EdgeSpec, EnforcementGateway,
    ExportFormat, MemoryStore, MesaConfig, RecordId, RecordStore, RecordType, ReferenceContext,
    RenderFormat,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(
    name = "mesa",
    version,
    about = "Attribution-compliance enforcement for research records"
)]
struct Cli {
    /// JSON-LD graph document to serve records from
    #[arg(long, global = true)]
    graph: Option<PathBuf>,
    /// YAML config file (defaults to <config_dir>/mesa/config.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log enforcement decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve a record with its verified attribution
    Retrieve {
        id: String,
        /// Additional relations to bundle
        #[arg(long = "expand")]
        expand: Vec<EdgeKind>,
        /// Maximum expansion depth
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Classify a record's license and report missing attribution
    Check { id: String },
    /// Create a reference to a record from a citing context
    Reference {
        id: String,
        /// Citing context fields, e.g. creator="Jane Smith"
        #[arg(long = "context", value_parser = parse_key_value)]
        context: Vec<(String, String)>,
    },
    /// Validate every record reachable from an origin
    Query {
        origin: String,
        #[arg(long = "relation")]
        relations: Vec<EdgeKind>,
        #[arg(long, default_value = "outgoing")]
        direction: Direction,
        #[arg(long, default_value_t = 1)]
        depth: usize,
        /// Only yield records of this type
        #[arg(long = "type")]
        record_type: Option<RecordType>,
    },
    /// Render a record with its attribution footer
    Render {
        id: String,
        #[arg(long)]
        format: Option<RenderFormat>,
    },
    /// Export records; fails if any one of them is deficient
    Export {
        #[arg(required = true)]
        ids: Vec<String>,
        #[arg(long)]
        format: Option<ExportFormat>,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(graph: Option<&Path>) -> Result<Arc<MemoryStore>, String> {
    let path = graph.ok_or("--graph <file> is required")?;
    let store = MemoryStore::open(path)
        .map_err(|e| format!("Failed to load graph {}: {}", path.display(), e))?;
    tracing::debug!(records = store.len(), edges = store.edge_count(), "graph loaded");
    Ok(Arc::new(store))
}

fn print_bundle(bundle: &AttributionBundle, indent: usize) {
    let pad = "  ".repeat(indent);
    println!(
        "{pad}{} ({}) {}",
        bundle.id(),
        bundle.record_type(),
        bundle.title().unwrap_or("")
    );
    if bundle.is_encumbered() {
        println!("{pad}  license: {}", bundle.license_name().unwrap_or(""));
        for (field, value) in bundle.attribution() {
            println!("{pad}  {}: {}", field, value);
        }
    }
    for related in bundle.related() {
        println!("{pad}  -{}->", related.relation);
        print_bundle(&related.bundle, indent + 2);
    }
}

fn cmd_retrieve(
    gateway: &EnforcementGateway,
    id: &str,
    expand: Vec<EdgeKind>,
    depth: Option<usize>,
) -> i32 {
    let mut expansion = gateway.expansion().clone();
    expansion.relations.extend(expand);
    if let Some(depth) = depth {
        expansion.max_depth = depth;
    }
    match gateway.retrieve_with(&RecordId::from(id), &expansion) {
        Ok(bundle) => {
            print_bundle(&bundle, 0);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_check(store: &MemoryStore, id: &str) -> i32 {
    let record = match store.fetch(&RecordId::from(id)) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let license = record.license().license_name.as_deref();
    let decision = classify(license);
    println!("{:<12} {}", "record", record.id());
    println!("{:<12} {}", "license", license.unwrap_or("(none)"));
    println!(
        "{:<12} {}",
        "encumbered",
        if decision.is_encumbered() { "yes" } else { "no" }
    );
    match validate(&record, &decision) {
        Ok(_) => {
            println!("{:<12} ok", "attribution");
            0
        }
        Err(report) => {
            let missing: Vec<&str> = report.missing_fields.iter().map(|f| f.as_str()).collect();
            println!("{:<12} missing {}", "attribution", missing.join(", "));
            1
        }
    }
}

fn cmd_reference(gateway: &EnforcementGateway, id: &str, context: Vec<(String, String)>) -> i32 {
    let context: ReferenceContext = context.into_iter().collect();
    match gateway.create_reference(&RecordId::from(id), context) {
        Ok(reference) => match serde_json::to_string_pretty(&reference) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_query(gateway: &EnforcementGateway, spec: EdgeSpec) -> i32 {
    let mut rejected = 0;
    for result in gateway.query(spec) {
        match result {
            Ok(bundle) => println!(
                "ok    {:<24} {}",
                bundle.id().as_str(),
                bundle.title().unwrap_or("")
            ),
            Err(e) => {
                rejected += 1;
                println!("deny  {}", e);
            }
        }
    }
    if rejected > 0 {
        1
    } else {
        0
    }
}

fn cmd_render(gateway: &EnforcementGateway, id: &str, format: RenderFormat) -> i32 {
    match gateway.render(&RecordId::from(id), format) {
        Ok(output) => {
            print!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_export(
    gateway: &EnforcementGateway,
    ids: &[String],
    format: ExportFormat,
    out: Option<&Path>,
) -> i32 {
    let ids: Vec<RecordId> = ids.iter().map(|id| RecordId::from(id.as_str())).collect();
    let bytes = match gateway.export(&ids, format) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let written = match out {
        Some(path) => std::fs::write(path, &bytes),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)
        }
    };
    match written {
        Ok(()) => {
            if let Some(path) = out {
                eprintln!("Exported {} record(s) to {}", ids.len(), path.display());
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match MesaConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let store = match open_store(cli.graph.as_deref()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let gateway = config.gateway(store.clone());

    let code = match cli.command {
        Commands::Retrieve { id, expand, depth } => cmd_retrieve(&gateway, &id, expand, depth),
        Commands::Check { id } => cmd_check(&store, &id),
        Commands::Reference { id, context } => cmd_reference(&gateway, &id, context),
        Commands::Query {
            origin,
            relations,
            direction,
            depth,
            record_type,
        } => {
            let mut spec = EdgeSpec::from(origin.as_str())
                .direction(direction)
                .depth(depth);
            for relation in relations {
                spec = spec.with_relation(relation);
            }
            if let Some(record_type) = record_type {
                spec = spec.of_type(record_type);
            }
            cmd_query(&gateway, spec)
        }
        Commands::Render { id, format } => {
            cmd_render(&gateway, &id, format.unwrap_or(config.render.format))
        }
        Commands::Export { ids, format, out } => cmd_export(
            &gateway,
            &ids,
            format.unwrap_or(config.export.format),
            out.as_deref(),
        ),
    };
    std::process::exit(code);
}
