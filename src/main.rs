//! Command-line bookmark manager.
//!
//! Works on the same database as `linkvault-rpc`, so bookmarks saved from
//! the browser show up here and the other way round.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use linkvault::app::App;
use linkvault::config::AppConfig;
use linkvault::logging::init_tracing;
use linkvault::managers::bookmark_manager::BookmarkCollectionTrait;
use linkvault::services::settings_engine::SettingsEngineTrait;
use linkvault::services::tag_heuristics::generate_tags;
use linkvault::types::bookmark::{parse_tag_list, Bookmark, BookmarkDraft, Category, Filter};
use linkvault::types::transfer::TransferFormat;

#[derive(Parser)]
#[command(name = "linkvault")]
#[command(about = "linkvault - save, tag, search and export your links")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to <config dir>/linkvault/config.json)
    #[arg(short = 'C', long, global = true, env = "LINKVAULT_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Recent,
    Favorites,
}

impl From<FilterArg> for Filter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Filter::All,
            FilterArg::Recent => Filter::Recent,
            FilterArg::Favorites => Filter::Favorites,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
    Html,
}

impl From<FormatArg> for TransferFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => TransferFormat::Json,
            FormatArg::Csv => TransferFormat::Csv,
            FormatArg::Html => TransferFormat::Html,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a bookmark
    Add {
        url: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Prefill missing fields from the page's metadata
        #[arg(long)]
        fetch: bool,
    },
    /// List bookmarks, newest first
    List {
        #[arg(short, long, value_enum, default_value = "all")]
        filter: FilterArg,
    },
    /// Search title, description, URL and tags
    Search {
        query: String,
        #[arg(short, long, value_enum, default_value = "all")]
        filter: FilterArg,
    },
    /// Delete a bookmark by id
    Delete { id: String },
    /// Toggle the favorite flag
    Favorite { id: String },
    /// Move a bookmark to another bookmark's position
    Move { dragged: String, target: String },
    /// Import a JSON, CSV or HTML file
    Import {
        path: PathBuf,
        /// Overrides the format guessed from the extension
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Export all bookmarks to bookmarks-<date>.<ext>
    Export {
        #[arg(value_enum)]
        format: FormatArg,
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Fetch page metadata for a URL
    Fetch { url: String },
    /// Suggest tags for a URL
    Tags {
        url: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Show collection totals
    Stats,
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print current settings
    Show,
    /// Set one value; VALUE is parsed as JSON, falling back to a plain string
    Set { key: String, value: String },
    /// Restore defaults
    Reset,
}

fn print_bookmarks(bookmarks: &[Bookmark], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(bookmarks)?);
        return Ok(());
    }
    if bookmarks.is_empty() {
        println!("No bookmarks.");
    }
    for b in bookmarks {
        let star = if b.is_favorite { "★ " } else { "" };
        println!("{}{}  [{}]", star, b.title, b.category);
        println!("    {}", b.url);
        if !b.tags.is_empty() {
            println!("    tags: {}", b.tags.join(", "));
        }
        println!("    id: {}", b.id);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log_filter);
    let mut app = App::new(config)?;

    match cli.command {
        Commands::Add { url, title, description, tags, category, fetch } => {
            let mut draft = BookmarkDraft {
                url: url.clone(),
                title: title.unwrap_or_default(),
                description,
                image: String::new(),
                tags: tags.as_deref().map(parse_tag_list).unwrap_or_default(),
                category: category.as_deref().map(Category::parse),
            };
            if fetch || draft.title.trim().is_empty() {
                let metadata = app.fetcher.fetch_metadata(&url).await;
                if draft.title.trim().is_empty() {
                    draft.title = metadata.title;
                }
                if draft.description.is_empty() {
                    draft.description = metadata.description;
                }
                draft.image = metadata.image;
                if draft.tags.is_empty() {
                    draft.tags = metadata.tags;
                }
            }
            let saved = app.save_draft(draft)?;
            print_bookmarks(std::slice::from_ref(&saved), cli.json)?;
        }
        Commands::List { filter } => {
            print_bookmarks(&app.collection.filter(filter.into()), cli.json)?;
        }
        Commands::Search { query, filter } => {
            print_bookmarks(&app.collection.view(Some(&query), filter.into()), cli.json)?;
        }
        Commands::Delete { id } => {
            let removed = app.delete_bookmark(&id)?;
            println!("Deleted \"{}\"", removed.title);
        }
        Commands::Favorite { id } => {
            let on = app.toggle_favorite(&id)?;
            println!("{}", if on { "Marked as favorite" } else { "Removed from favorites" });
        }
        Commands::Move { dragged, target } => {
            app.collection.reorder(&dragged, &target)?;
            println!("Moved");
        }
        Commands::Import { path, format } => {
            let summary = app.import_file(&path, format.map(Into::into))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Imported {} of {} ({} duplicates skipped)",
                    summary.imported, summary.total, summary.duplicates
                );
            }
        }
        Commands::Export { format, dir } => {
            let path = app.export_to(&dir, format.into())?;
            println!("Wrote {}", path.display());
        }
        Commands::Fetch { url } => {
            let metadata = app.fetcher.fetch_metadata(&url).await;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Commands::Tags { url, title, description } => {
            let tags = generate_tags(&url, title.as_deref(), description.as_deref());
            if cli.json {
                println!("{}", serde_json::to_string(&tags)?);
            } else {
                println!("{}", tags.join(", "));
            }
        }
        Commands::Stats => {
            let stats = app.collection.stats();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Bookmarks:  {}", stats.total_bookmarks);
                println!("Tags:       {}", stats.total_tags);
                println!("Categories: {}", stats.total_categories);
                println!("Favorites:  {}", stats.total_favorites);
            }
        }
        Commands::Settings { action } => {
            match action.unwrap_or(SettingsAction::Show) {
                SettingsAction::Show => {}
                SettingsAction::Set { key, value } => {
                    let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
                    app.settings_engine.set_value(&key, value)?;
                }
                SettingsAction::Reset => app.settings_engine.reset()?,
            }
            println!("{}", serde_json::to_string_pretty(app.settings())?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
