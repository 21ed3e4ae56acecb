//! Catalogo CLI - movie catalog server and tools

use catalogo::config::{Environment, ServerConfig, StoreConfig};
use catalogo::controllers::movies::{MovieQuery, MovieStats};
use catalogo::controllers::{Envelope, MovieController, PageRequest};
use catalogo::models::{MovieInput, MovieRecord};
use catalogo::{demo, http, Catalog};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalogo")]
#[command(about = "A movie and comment catalog with a REST API", long_about = None)]
struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    /// Runtime environment; picks the default log filter
    #[arg(long, env = "CATALOGO_ENV", value_enum, default_value_t = Environment::Development, global = true)]
    environment: Environment,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServerConfig),

    /// Create, read, update and delete sample movies
    Demo,

    /// Start interactive shell
    Shell,

    /// Show catalog statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.environment);

    let catalog = Catalog::open(&cli.store).await?;

    let result = match cli.command {
        Commands::Serve(config) => http::serve(catalog.clone(), &config).await,
        Commands::Demo => run_demo(&catalog.movies).await,
        Commands::Shell => run_shell(&catalog.movies).await,
        Commands::Stats => show_stats(&catalog.movies).await,
    };

    catalog.close();
    result
}

fn init_logging(environment: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!environment.is_production())
        .init();
}

async fn run_demo(movies: &MovieController) -> anyhow::Result<()> {
    println!("=== Movie catalog walkthrough ===");

    for (i, step) in demo::run(movies).await?.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, step.title);
        let mark = if step.success { "ok" } else { "failed" };
        println!("[{mark}] {}", step.message);
        for line in &step.lines {
            println!("   - {line}");
        }
    }

    println!();
    println!("=== Walkthrough complete ===");
    Ok(())
}

async fn show_stats(movies: &MovieController) -> anyhow::Result<()> {
    let stats = movies.statistics().await?;
    if let Some(stats) = stats.data {
        print_stats(&stats);
    }
    Ok(())
}

fn print_stats(stats: &MovieStats) {
    println!("Movies: {}", stats.total);
    println!("Average rating: {:.1}", stats.average_rating);
    if !stats.by_genre.is_empty() {
        println!("By genre:");
        for genre in &stats.by_genre {
            println!("  {} ({})", genre.genre, genre.total);
        }
    }
}

async fn run_shell(movies: &MovieController) -> anyhow::Result<()> {
    use std::io::{self, BufRead, Write};

    println!("Catalogo Interactive Shell");
    println!("Type 'help' for commands, 'exit' to quit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("catalogo> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let outcome = match command.to_lowercase().as_str() {
            "exit" | "quit" | "\\q" => break,
            "help" | "\\h" => {
                print_help();
                continue;
            }
            "list" => {
                let query = MovieQuery {
                    page: PageRequest::parse(Some(rest).filter(|r| !r.is_empty()), None),
                    ..MovieQuery::default()
                };
                movies.list(&query).await.map(|envelope| {
                    let pagination = envelope.pagination;
                    print_movies(envelope);
                    if let Some(p) = pagination {
                        println!("(page {} of {}, {} total)", p.page, p.total_pages.max(1), p.total);
                    }
                })
            }
            "get" => movies.get(rest).await.map(|envelope| {
                println!("{}", envelope.message);
                if let Some(movie) = envelope.data {
                    print_json(&movie);
                }
            }),
            "genre" => movies.list_by_genre(rest).await.map(print_movies),
            "add" => match parse_input(rest) {
                Ok(input) => movies.create(&input).await.map(|envelope| {
                    println!("{}", envelope.message);
                    if let Some(saved) = envelope.data {
                        println!("ID: {}", saved.id);
                    }
                }),
                Err(e) => Err(e),
            },
            "update" => {
                let (id, json) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match parse_input(json) {
                    Ok(input) => movies
                        .update(id, &input)
                        .await
                        .map(|envelope| println!("{}", envelope.message)),
                    Err(e) => Err(e),
                }
            }
            "delete" => movies
                .delete(rest)
                .await
                .map(|envelope| println!("{}", envelope.message)),
            "purge" => movies
                .delete_all()
                .await
                .map(|envelope| println!("{}", envelope.message)),
            "stats" => movies.statistics().await.map(|envelope| {
                if let Some(stats) = envelope.data {
                    print_stats(&stats);
                }
            }),
            "demo" => {
                run_demo(movies).await?;
                Ok(())
            }
            other => {
                println!("Unknown command '{other}'. Type 'help' for commands.");
                continue;
            }
        };

        match outcome {
            Ok(()) => {}
            // Store failures end the session; bad input does not
            Err(e) if e.is_client_error() => println!("Error: {e}"),
            Err(e) => return Err(e.into()),
        }
        println!();
    }

    println!("Goodbye!");
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  list [page]           - List movies, 10 per page");
    println!("  get <id>              - Show one movie");
    println!("  genre <text>          - Movies whose genre contains text");
    println!("  add <json>            - Create a movie, e.g. add {{\"nome\":\"Duna\",\"genero\":\"ficção científica\",\"anolancemento\":2021}}");
    println!("  update <id> <json>    - Replace a movie's fields");
    println!("  delete <id>           - Delete a movie");
    println!("  purge                 - Delete every movie");
    println!("  stats                 - Catalog statistics");
    println!("  demo                  - Run the walkthrough");
    println!();
    println!("Special:");
    println!("  help, \\h  - Show this help");
    println!("  exit, \\q  - Exit the shell");
}

fn parse_input(json: &str) -> catalogo::Result<MovieInput> {
    serde_json::from_str(json).map_err(|e| catalogo::Error::MalformedPayload(e.to_string()))
}

fn print_movies(envelope: Envelope<Vec<MovieRecord>>) {
    println!("{}", envelope.message);
    for movie in envelope.data.iter().flatten() {
        println!("  {}  {}", movie.id, demo::summary(movie));
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => println!("Error: {e}"),
    }
}
