use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{DatasetConfig, Settings};
use core_types::{Collation, Dataset, FilterSelection, Page, Record, SortOrder, TimeRange};
use live_search::{DebouncedSearch, SearchSession, SearchState};
use query_engine::{
    DateFilter, PageItem, Query, QueryEngine, QueryResult, SearchQuery, page_window,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// The main entry point for the Finboard dashboard CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = configuration::load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = configuration::init_tracing(&settings.logging)?;

    let collation = cli.collation.unwrap_or(settings.engine.collation);
    let engine = QueryEngine::new(collation);
    tracing::info!(?collation, datasets = settings.datasets.len(), "Finboard started.");

    match cli.command {
        Commands::Datasets => handle_datasets(&settings),
        Commands::Query(args) => handle_query(&settings, engine, args),
        Commands::Facets(args) => handle_facets(&settings, engine, args),
        Commands::Interactive(args) => handle_interactive(&settings, engine, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Search, filter and page through the dashboard's company, report and news data.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `engine.collation` from the configuration.
    #[arg(long, global = true, value_enum)]
    collation: Option<Collation>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured datasets.
    Datasets,
    /// Run a single query and print one page of results.
    Query(QueryArgs),
    /// Show how many records each filter option would keep.
    Facets(FacetsArgs),
    /// Search as you type, one term per line on stdin.
    Interactive(InteractiveArgs),
}

#[derive(Parser)]
struct QueryArgs {
    /// Dataset name as declared in the configuration.
    dataset: String,

    /// Free-text search term.
    #[arg(long, default_value = "")]
    term: String,

    /// A facet selection as GROUP=OPTION. Repeat to select more.
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// A sort preset (e.g. "latest"), "relevance", or a field name.
    #[arg(long)]
    sort: Option<String>,

    #[arg(long, value_enum)]
    order: Option<SortOrder>,

    #[arg(long, default_value_t = 1)]
    page: usize,

    #[arg(long)]
    page_size: Option<usize>,

    #[arg(long, value_enum, default_value_t = TimeRange::All)]
    time_range: TimeRange,

    /// Reference day for --time-range (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Keep at most this many results before paging.
    #[arg(long)]
    limit: Option<usize>,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct FacetsArgs {
    dataset: String,

    /// Count only records matching this term.
    #[arg(long, default_value = "")]
    term: String,
}

#[derive(Parser)]
struct InteractiveArgs {
    dataset: String,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((group, option)) if !group.is_empty() && !option.is_empty() => {
            Ok((group.to_string(), option.to_string()))
        }
        _ => Err(format!("expected GROUP=OPTION, got '{raw}'")),
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_datasets(settings: &Settings) -> anyhow::Result<()> {
    let mut table = new_table(vec!["Name", "Records", "Search fields", "Sort presets", "Filter groups"]);
    for config in &settings.datasets {
        let dataset = load_dataset(settings, config)?;
        table.add_row(vec![
            config.name.clone(),
            dataset.len().to_string(),
            if config.search_fields.is_empty() {
                "(all text)".to_string()
            } else {
                config.search_fields.join(", ")
            },
            config.sort_presets.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", "),
            config.filter_groups.iter().map(|g| g.id.as_str()).collect::<Vec<_>>().join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_query(settings: &Settings, engine: QueryEngine, args: QueryArgs) -> anyhow::Result<()> {
    let config = dataset_config(settings, &args.dataset)?;
    let dataset = load_dataset(settings, config)?;
    let query = build_query(settings, config, &args)?;

    let result = engine.query(dataset.records(), &query);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(config, &result);
    }
    Ok(())
}

fn build_query(settings: &Settings, config: &DatasetConfig, args: &QueryArgs) -> anyhow::Result<Query> {
    let date_filter = match (args.time_range, &config.date_field) {
        (TimeRange::All, _) => None,
        (range, Some(field)) => Some(DateFilter::new(
            field.clone(),
            range,
            args.today.unwrap_or_else(|| Local::now().date_naive()),
        )),
        (_, None) => bail!("Dataset '{}' has no date_field; --time-range is unavailable.", config.name),
    };

    let page_size = args.page_size.unwrap_or(settings.engine.default_page_size);
    Ok(Query {
        search: search_query(config, &args.term),
        filter_groups: config.filter_groups.clone(),
        selection: FilterSelection::from_pairs(args.filters.iter().cloned()),
        date_filter,
        sort: config.sort_spec(args.sort.as_deref(), args.order),
        page: Page::new(args.page, page_size)?,
        limit: args.limit,
    })
}

fn handle_facets(settings: &Settings, engine: QueryEngine, args: FacetsArgs) -> anyhow::Result<()> {
    let config = dataset_config(settings, &args.dataset)?;
    if config.filter_groups.is_empty() {
        println!("Dataset '{}' declares no filter groups.", config.name);
        return Ok(());
    }
    let dataset = load_dataset(settings, config)?;

    let counts = engine.facet_counts(
        dataset.records(),
        &search_query(config, &args.term),
        &config.filter_groups,
    );

    let mut table = new_table(vec!["Group", "Option", "Label", "Count"]);
    for count in counts {
        table.add_row(vec![
            count.group_id,
            count.option_id,
            count.label,
            count.count.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Terms typed in quick succession are coalesced by the debouncer, so piping a
/// file of terms only renders the ones the user would have paused on.
async fn handle_interactive(
    settings: &Settings,
    engine: QueryEngine,
    args: InteractiveArgs,
) -> anyhow::Result<()> {
    let config = dataset_config(settings, &args.dataset)?;
    let records: Arc<[Record]> = load_dataset(settings, config)?.into_records().into();
    let page_size = settings.engine.default_page_size;

    let mut search = DebouncedSearch::spawn(engine, Arc::clone(&records), settings.search.debounce);
    let mut session = SearchSession::new(engine, records, settings.search.history_capacity);
    let mut updates = search.subscribe();

    println!(
        "Searching '{}'. Type a term, ':page N', ':history', ':clear' or ':quit'.",
        config.name
    );

    let build = |term: &str, page: Page| Query {
        search: search_query(config, term),
        filter_groups: config.filter_groups.clone(),
        sort: config.sort_spec(None, None),
        page,
        ..Query::default()
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current_term = String::new();
    let mut last_submitted = 0;
    let mut last_rendered = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    ":quit" => break,
                    ":history" => {
                        for (i, term) in session.history().entries().enumerate() {
                            println!("{:>2}. {term}", i + 1);
                        }
                    }
                    ":clear" => session.clear_history(),
                    command if command.starts_with(":page") => {
                        let number = command.trim_start_matches(":page").trim().parse::<usize>();
                        let page = number
                            .map_err(anyhow::Error::from)
                            .and_then(|n| Page::new(n, page_size).map_err(anyhow::Error::from));
                        match page {
                            Ok(page) => print_result(config, &session.run(build(&current_term, page))),
                            Err(e) => println!("Invalid page: {e}"),
                        }
                    }
                    term => {
                        current_term = term.to_string();
                        session.remember(term);
                        last_submitted = search.submit(build(term, Page::new(1, page_size)?))?;
                    }
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if let SearchState::Ready { generation, result } = state {
                    last_rendered = generation;
                    print_result(config, &result);
                }
            }
        }
    }

    // Input ended while a search was still settling: show its result.
    if last_submitted > last_rendered {
        let result = search.result_for(last_submitted).await?;
        print_result(config, &result);
    }

    search.shutdown().await;
    Ok(())
}

// ==============================================================================
// Helpers
// ==============================================================================

fn dataset_config<'a>(settings: &'a Settings, name: &str) -> anyhow::Result<&'a DatasetConfig> {
    settings.dataset(name).with_context(|| {
        let known: Vec<&str> = settings.datasets.iter().map(|d| d.name.as_str()).collect();
        format!("Unknown dataset '{name}'. Configured: {}", known.join(", "))
    })
}

fn load_dataset(settings: &Settings, config: &DatasetConfig) -> anyhow::Result<Dataset> {
    let path = settings.dataset_path(config);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read dataset file {}", path.display()))?;
    let dataset = Dataset::from_json_str(&config.name, &config.id_field, &text)
        .with_context(|| format!("Dataset file {} is malformed", path.display()))?;
    tracing::debug!(dataset = %config.name, records = dataset.len(), "Dataset loaded.");
    Ok(dataset)
}

fn search_query(config: &DatasetConfig, term: &str) -> SearchQuery {
    let query = if config.search_fields.is_empty() {
        SearchQuery::all_text(term)
    } else {
        SearchQuery::new(term, config.search_fields.iter().cloned())
    };
    match &config.primary_field {
        Some(field) => query.with_primary_field(field.clone()),
        None => query,
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_result(config: &DatasetConfig, result: &QueryResult) {
    let columns: Vec<&str> = if config.display_fields.is_empty() {
        std::iter::once(config.id_field.as_str())
            .chain(
                result
                    .items
                    .first()
                    .into_iter()
                    .flat_map(|r| r.fields().map(|(name, _)| name))
                    .filter(|name| *name != config.id_field),
            )
            .collect()
    } else {
        config.display_fields.iter().map(String::as_str).collect()
    };

    if !result.items.is_empty() {
        let mut table = new_table(columns.clone());
        for record in &result.items {
            table.add_row(
                columns
                    .iter()
                    .map(|field| record.get(field).map(ToString::to_string).unwrap_or_default())
                    .collect::<Vec<_>>(),
            );
        }
        println!("{table}");
    }

    println!(
        "{} results found. Page {} of {}: {}",
        result.total_count,
        result.page_number,
        result.total_pages,
        render_window(result.page_number, result.total_pages)
    );
}

fn render_window(current: usize, total: usize) -> String {
    page_window(current, total)
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == current => format!("[{n}]"),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
