use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use doc_annotate::{
    ANONYMOUS_OWNER, AnnotationWarning, Catalog, EntitySchema, OutputFormat, SectionRegistry,
    format_annotation, format_annotations, parse_docstring_with,
};
use doc_annotate_core::{Annotation, OrderedMap};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "doc-annotate", version)]
#[command(about = "Parse structured docstrings and resolve inherited annotations")]
struct Cli {
    /// Log library activity to stderr (-v debug, -vv trace). RUST_LOG wins
    /// when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse one docstring read from stdin.
    ParseStdin(ParseStdinArgs),
    /// Parse one docstring read from a file.
    ParseFile(ParseFileArgs),
    /// Resolve entities of a YAML catalog, merging along their base chains.
    Catalog(CatalogArgs),
    /// List registered sections and the kind each is parsed as.
    Sections(SectionsArgs),
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
    /// Exit with an error when any annotation warning was produced.
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(Debug, Args)]
struct DocstringArgs {
    /// Entity name used in warnings.
    #[arg(long, default_value = ANONYMOUS_OWNER)]
    name: String,
    /// YAML file with the entity schema (input, output, envs).
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ParseStdinArgs {
    #[command(flatten)]
    docstring: DocstringArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct ParseFileArgs {
    /// Path to a file holding the docstring.
    #[arg(long)]
    input: PathBuf,
    #[command(flatten)]
    docstring: DocstringArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Path to the catalog YAML file.
    #[arg(long)]
    input: PathBuf,
    /// Entity to resolve; repeat for several. Defaults to every entity.
    #[arg(long = "entity")]
    entities: Vec<String>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct SectionsArgs {
    /// Apply the section registrations of this catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::ParseStdin(args) => run_parse_stdin(args),
        Command::ParseFile(args) => run_parse_file(args),
        Command::Catalog(args) => run_catalog(args),
        Command::Sections(args) => run_sections(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Annotation warnings are printed by the commands themselves, so the
/// default filter only lets errors through.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "error",
        1 => "doc_annotate=debug,doc_annotate_cli=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_parse_stdin(args: ParseStdinArgs) -> Result<(), String> {
    let mut docstring = String::new();
    std::io::stdin()
        .read_to_string(&mut docstring)
        .map_err(|err| format!("Failed to read stdin: {err}"))?;
    run_parse_docstring(&args.docstring, &docstring, &args.output)
}

fn run_parse_file(args: ParseFileArgs) -> Result<(), String> {
    let docstring = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    run_parse_docstring(&args.docstring, &docstring, &args.output)
}

fn run_parse_docstring(
    args: &DocstringArgs,
    docstring: &str,
    output: &OutputArgs,
) -> Result<(), String> {
    let schema = args.schema.as_deref().map(load_schema).transpose()?;
    let parsed = parse_docstring_with(
        &SectionRegistry::default(),
        &args.name,
        schema.as_ref(),
        docstring,
    )
    .map_err(|err| err.to_string())?;

    report_warnings(&parsed.warnings);
    emit(&format_annotation(&parsed.annotation, output.format)?);
    check_warnings(parsed.warnings.len(), output.deny_warnings)
}

fn run_catalog(args: CatalogArgs) -> Result<(), String> {
    let catalog = Catalog::load(&args.input)
        .map_err(|err| format!("Failed to load catalog '{}': {err}", args.input.display()))?;
    let mut annotator = catalog.into_annotator().map_err(|err| err.to_string())?;

    let names: Vec<String> = if args.entities.is_empty() {
        annotator.entity_names().map(String::from).collect()
    } else {
        args.entities
    };
    debug!(entities = names.len(), "resolving catalog entities");

    let mut resolved: OrderedMap<Annotation> = OrderedMap::new();
    let mut warning_count = 0;
    for name in &names {
        let annotated = annotator
            .annotate(name)
            .map_err(|err| format!("{name}: {err}"))?;
        report_warnings(&annotated.warnings);
        warning_count += annotated.warnings.len();
        resolved.insert(name.as_str(), annotated.annotation.clone());
    }

    emit(&format_annotations(&resolved, args.output.format)?);
    check_warnings(warning_count, args.output.deny_warnings)
}

fn run_sections(args: SectionsArgs) -> Result<(), String> {
    let registry = match &args.catalog {
        Some(path) => Catalog::load(path)
            .and_then(|catalog| catalog.registry())
            .map_err(|err| format!("Failed to load catalog '{}': {err}", path.display()))?,
        None => SectionRegistry::default(),
    };

    for (name, label) in registry.entries() {
        println!("{name:<16} {label}");
    }
    Ok(())
}

fn load_schema(path: &Path) -> Result<EntitySchema, String> {
    let file = fs::File::open(path)
        .map_err(|err| format!("Failed to read schema '{}': {err}", path.display()))?;
    serde_yaml::from_reader(BufReader::new(file))
        .map_err(|err| format!("Invalid schema '{}': {err}", path.display()))
}

fn report_warnings(warnings: &[AnnotationWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

fn check_warnings(count: usize, deny: bool) -> Result<(), String> {
    if deny && count > 0 {
        return Err(format!("{count} annotation warning(s) with --deny-warnings"));
    }
    Ok(())
}

fn emit(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}
