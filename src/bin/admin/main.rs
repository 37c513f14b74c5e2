mod commands;
mod output;

use blogpress::config::{self, ConfigUpdate};
use blogpress::{db, logging, run_migrations};
use clap::{Parser, Subcommand};
use output::{OutputConfig, OutputFormat};
use std::process;

/// Maintenance tool working directly on the blog database
#[derive(Parser, Debug)]
#[clap(name = "blogpress-admin", about = "Manage blogpress users and posts from the command line")]
struct Cli {
    /// Database URL; defaults to the server's configured database
    #[clap(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account
    CreateUser {
        #[clap(long)]
        username: String,
        #[clap(long, default_value = "")]
        email: String,
        #[clap(long)]
        password: String,
    },
    /// Publish a post as an existing user
    Post {
        /// Username of the author
        #[clap(long)]
        author: String,
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
        /// Tags, e.g. "rust, web dev"
        #[clap(long, default_value = "")]
        tags: String,
        /// Make the post visible only to its author
        #[clap(long)]
        private: bool,
    },
    /// List posts, newest first
    List {
        /// Only posts by this user
        #[clap(long)]
        author: Option<String>,
        /// List private posts instead of public ones
        #[clap(long)]
        private: bool,
    },
    /// Delete a post by id
    Delete { post_id: i32 },
    /// Delete a user and everything they posted
    DeleteUser { username: String },
    /// Show tags with their public post counts
    Tags,
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_cli_logging();
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let config = config::get_config_with(ConfigUpdate {
        database_url: cli.database_url,
        ..Default::default()
    });

    let result = db::init_pool(&config.database_url)
        .map_err(anyhow::Error::from)
        .and_then(|pool| {
            let mut conn = pool.get()?;
            run_migrations(&mut conn)?;
            drop(conn);
            commands::execute(&pool, cli.command, &output_config)
        });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
