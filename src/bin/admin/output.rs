use blogpress::models::{PostSummary, User};
use blogpress::stats::TagCount;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for admin commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: failed to encode output: {e}"),
    }
}

pub fn print_user(user: &User, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", user.get_id());
                return;
            }
            println!("ID:       {}", user.get_id());
            println!("Username: {}", user.get_username());
            println!("Email:    {}", user.get_email());
            println!("Joined:   {}", user.get_date_joined());
        }
        OutputFormat::Json => print_json(user),
    }
}

fn tag_names(summary: &PostSummary) -> String {
    summary.tags.iter().map(|t| t.get_name()).collect::<Vec<_>>().join(", ")
}

pub fn print_post(summary: &PostSummary, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            let post = &summary.post;
            if config.quiet {
                println!("{}", post.get_id());
                return;
            }
            println!("ID:         {}", post.get_id());
            println!("Title:      {}", post.get_title());
            println!("Author:     {}", summary.author);
            println!("Visibility: {}", post.get_visibility());
            println!("Posted:     {}", post.get_date_posted());
            println!("Tags:       {}", tag_names(summary));
            println!("URL:        {}", post.get_absolute_url());
        }
        OutputFormat::Json => print_json(summary),
    }
}

pub fn print_posts(posts: &[PostSummary], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if posts.is_empty() {
                if !config.quiet {
                    println!("No posts found.");
                }
                return;
            }
            if config.quiet {
                for s in posts {
                    println!("{}", s.post.get_id());
                }
                return;
            }
            let max_author = posts.iter().map(|s| s.author.len()).max().unwrap_or(6).max(6);
            println!("{:<6}  {:<10}  {:<width$}  TITLE", "ID", "DATE", "AUTHOR", width = max_author);
            for s in posts {
                println!(
                    "{:<6}  {:<10}  {:<width$}  {}",
                    s.post.get_id(),
                    s.post.get_date_posted().format("%Y-%m-%d"),
                    s.author,
                    s.post.get_title(),
                    width = max_author
                );
            }
        }
        OutputFormat::Json => print_json(posts),
    }
}

pub fn print_tag_counts(counts: &[TagCount], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if counts.is_empty() {
                if !config.quiet {
                    println!("No tags in use.");
                }
                return;
            }
            for t in counts {
                if config.quiet {
                    println!("{}", t.name);
                } else {
                    println!("{:>5}  {}", t.count, t.name);
                }
            }
        }
        OutputFormat::Json => print_json(counts),
    }
}

/// Prints a confirmation message; nothing in quiet mode
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{message}");
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "message": message })),
    }
}
