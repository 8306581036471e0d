//! linkdex CLI
//!
//! Command-line interface for the resource catalog: filtered listing and
//! search, type management, and CSV bulk transfer.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;

use linkdex_catalog::{NewResource, split_tags};
use linkdex_db::queries::ResourceFilter;
use linkdex_import::LogProgress;

#[derive(Parser)]
#[command(name = "linkdex")]
#[command(about = "Catalog links and documents with types, tags, and CSV transfer", long_about = None)]
struct Cli {
    /// Path to the catalog database
    #[arg(long, global = true, default_value = "linkdex.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List resources, optionally filtered and sorted
    List {
        /// Only resources with this type id
        #[arg(long)]
        type_id: Option<i64>,

        /// Only internal (true) or only public (false) resources
        #[arg(long)]
        internal: Option<bool>,

        /// Only obsolete (true) or only active (false) resources
        #[arg(long)]
        obsolete: Option<bool>,

        /// Substring match against the tags column
        #[arg(long)]
        tags: Option<String>,

        /// Substring match against name or description
        #[arg(long)]
        search: Option<String>,

        /// Sort column (name, url, type_name, date_created, created_at, ...)
        #[arg(long)]
        sort_by: Option<String>,

        /// ASC or DESC
        #[arg(long)]
        sort_order: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a single resource
    Add {
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        url: String,

        /// Type name, resolved case-insensitively
        #[arg(long)]
        r#type: Option<String>,

        #[arg(long)]
        internal: bool,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,

        #[arg(long)]
        obsolete: bool,
    },

    /// Delete a resource by id
    Rm { id: i64 },

    /// Manage resource types
    #[command(subcommand)]
    Types(TypeCommands),

    /// Import resources from a CSV file
    Import {
        file: PathBuf,

        /// Remove the file once the import finishes (uploaded-file semantics)
        #[arg(long)]
        delete_after: bool,
    },

    /// Export all resources as CSV (stdout when FILE is omitted)
    Export { file: Option<PathBuf> },

    /// Show catalog statistics
    Stats,
}

#[derive(Subcommand)]
enum TypeCommands {
    /// List all types
    List,

    /// Create a type
    Add { name: String },

    /// Delete a type by id (existing resources keep a dangling reference)
    Rm { id: i64 },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let conn = match linkdex_db::open_database(&cli.db) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to open database at {}: {}", cli.db.display(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::List {
            type_id,
            internal,
            obsolete,
            tags,
            search,
            sort_by,
            sort_order,
            json,
        } => {
            let filter = ResourceFilter {
                type_id,
                internal,
                obsolete,
                tags,
                search,
                sort_by,
                sort_order,
            };
            run_list(&conn, &filter, json);
        }
        Commands::Add {
            name,
            description,
            url,
            r#type,
            internal,
            tags,
            obsolete,
        } => {
            run_add(&conn, name, description, url, r#type, internal, tags, obsolete);
        }
        Commands::Rm { id } => run_rm(&conn, id),
        Commands::Types(cmd) => match cmd {
            TypeCommands::List => run_types_list(&conn),
            TypeCommands::Add { name } => run_types_add(&conn, &name),
            TypeCommands::Rm { id } => run_types_rm(&conn, id),
        },
        Commands::Import { file, delete_after } => run_import(&conn, &file, delete_after),
        Commands::Export { file } => run_export(&conn, file.as_deref()),
        Commands::Stats => run_stats(&conn),
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!(
        "{} {}",
        "\u{2718}".if_supports_color(Stdout, |t| t.red()),
        message,
    );
    std::process::exit(1);
}

fn run_list(conn: &Connection, filter: &ResourceFilter, json: bool) {
    let views = match linkdex_db::list_resources(conn, filter) {
        Ok(v) => v,
        Err(e) => fail(e),
    };

    if json {
        match serde_json::to_string_pretty(&views) {
            Ok(s) => println!("{s}"),
            Err(e) => fail(e),
        }
        return;
    }

    for view in &views {
        let r = &view.resource;
        let mut flags = String::new();
        if r.internal {
            flags.push_str(" [internal]");
        }
        if r.obsolete {
            flags.push_str(" [obsolete]");
        }
        let tags = split_tags(&r.tags)
            .iter()
            .map(|t| format!("#{t}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:>5}  {}  ({}){}  {}  {}",
            r.id,
            r.name.if_supports_color(Stdout, |t| t.bold()),
            view.type_name.as_deref().unwrap_or("-"),
            flags,
            r.url,
            tags,
        );
    }
    println!("{} resource(s)", views.len());
}

#[allow(clippy::too_many_arguments)]
fn run_add(
    conn: &Connection,
    name: String,
    description: String,
    url: String,
    type_name: Option<String>,
    internal: bool,
    tags: String,
    obsolete: bool,
) {
    let type_id = match &type_name {
        Some(t) => {
            let resolver = match linkdex_import::TypeResolver::load(conn) {
                Ok(r) => r,
                Err(e) => fail(e),
            };
            match resolver.resolve(t) {
                Some(id) => Some(id),
                None => fail(format!("Unknown type '{t}' — create it with 'linkdex types add'")),
            }
        }
        None => None,
    };

    let new = NewResource {
        name,
        description,
        url,
        type_id,
        internal,
        date_created: None,
        tags,
        obsolete,
    };
    match linkdex_db::insert_resource(conn, &new) {
        Ok(resource) => println!(
            "{} Added resource {} ('{}')",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            resource.id,
            resource.name,
        ),
        Err(e) => fail(e),
    }
}

fn run_rm(conn: &Connection, id: i64) {
    match linkdex_db::delete_resource(conn, id) {
        Ok(()) => println!(
            "{} Deleted resource {}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            id,
        ),
        Err(e) => fail(e),
    }
}

fn run_types_list(conn: &Connection) {
    let types = match linkdex_db::list_types(conn) {
        Ok(t) => t,
        Err(e) => fail(e),
    };
    for t in &types {
        println!("{:>5}  {}", t.id, t.name);
    }
    println!("{} type(s)", types.len());
}

fn run_types_add(conn: &Connection, name: &str) {
    match linkdex_db::create_type(conn, name) {
        Ok(t) => println!(
            "{} Added type {} ('{}')",
            "\u{2714}".if_supports_color(Stdout, |t_| t_.green()),
            t.id,
            t.name,
        ),
        Err(e) => fail(e),
    }
}

fn run_types_rm(conn: &Connection, id: i64) {
    match linkdex_db::delete_type(conn, id) {
        Ok(()) => println!(
            "{} Deleted type {} (resources keep their type_id)",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
            id,
        ),
        Err(e) => fail(e),
    }
}

fn run_import(conn: &Connection, file: &Path, delete_after: bool) {
    let result = if delete_after {
        linkdex_import::import_upload(conn, file, Some(&LogProgress))
    } else {
        match File::open(file) {
            Ok(f) => linkdex_import::import_resources(conn, f, Some(&LogProgress)),
            Err(e) => fail(format!("Cannot open {}: {}", file.display(), e)),
        }
    };

    // Partial failure still yields a summary; only pipeline-level failures
    // (structural CSV errors, storage loss) abort.
    match result {
        Ok(summary) => {
            println!(
                "{} Imported {} resource(s), {} error(s)",
                "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                summary.imported,
                summary.errors,
            );
            for detail in &summary.error_details {
                eprintln!("  row {}: {}", detail.row, detail.message);
            }
        }
        Err(e) => fail(format!("Import failed: {e}")),
    }
}

fn run_export(conn: &Connection, file: Option<&Path>) {
    let mut spool = match linkdex_import::export_spool(conn) {
        Ok(s) => s,
        Err(e) => fail(format!("Export failed: {e}")),
    };

    let result = match file {
        Some(path) => File::create(path).and_then(|mut out| io::copy(&mut spool, &mut out)),
        None => io::copy(&mut spool, &mut io::stdout().lock()),
    };

    // Remove the spool before any exit path below.
    drop(spool);

    match result {
        Ok(_) => {
            if let Some(path) = file {
                println!(
                    "{} Exported to {}",
                    "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                    path.display(),
                );
            }
        }
        Err(e) => fail(format!("Export delivery failed: {e}")),
    }
}

fn run_stats(conn: &Connection) {
    let stats = match linkdex_db::catalog_stats(conn) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    println!("Resources: {}", stats.resources);
    println!("  internal: {}", stats.internal);
    println!("  obsolete: {}", stats.obsolete);
    println!("Types:     {}", stats.types);
}
