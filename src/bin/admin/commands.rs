use anyhow::{anyhow, Result};
use blogpress::db::DbPool;
use blogpress::dto::{PostForm, RegisterForm};
use blogpress::models::{NewPost, Visibility};
use blogpress::repo::{self, PostFilter};
use blogpress::stats::sort_tag_counts;

use crate::output::{self, OutputConfig};
use crate::Commands;

/// Runs one admin command against the database
pub fn execute(pool: &DbPool, cmd: Commands, config: &OutputConfig) -> Result<()> {
    match cmd {
        Commands::CreateUser { username, email, password } => {
            let form = RegisterForm {
                username,
                email,
                password1: password.clone(),
                password2: password,
            };
            let errors = form.validate();
            if !errors.is_empty() {
                return Err(anyhow!("Invalid user: {errors}"));
            }
            let username = form.username.trim();
            if repo::get_user_by_username(pool, username)?.is_some() {
                return Err(anyhow!("A user named {username:?} already exists"));
            }
            let user = repo::create_user(pool, username, form.email.trim(), &form.password1)?;
            output::print_user(&user, config);
        }
        Commands::Post { author, title, content, tags, private } => {
            let author = repo::get_user_by_username(pool, &author)?
                .ok_or_else(|| anyhow!("No user named {author:?}"))?;
            let form = PostForm { title, content, tags, ..Default::default() };
            let errors = form.validate();
            if !errors.is_empty() {
                return Err(anyhow!("Invalid post: {errors}"));
            }
            let visibility = if private { Visibility::Private } else { Visibility::Public };
            let post = repo::create_post(
                pool,
                NewPost::new(author.get_id(), visibility, form.clean_title(), form.clean_content(), None),
                &form.tag_names(),
            )?;
            let summary = repo::get_post_summary(pool, post.get_id())?
                .ok_or_else(|| anyhow!("Post {} vanished after creation", post.get_id()))?;
            output::print_post(&summary, config);
        }
        Commands::List { author, private } => {
            let mut filter = if private {
                PostFilter { visibility: Visibility::Private, author_id: None, tag_id: None }
            } else {
                PostFilter::public()
            };
            if let Some(username) = author {
                let user = repo::get_user_by_username(pool, &username)?
                    .ok_or_else(|| anyhow!("No user named {username:?}"))?;
                filter = filter.by_author(user.get_id());
            }
            let count = repo::count_posts(pool, &filter)?;
            let posts = repo::list_posts(pool, &filter, 0, count)?;
            output::print_posts(&posts, config);
        }
        Commands::Delete { post_id } => {
            if !repo::delete_post(pool, post_id)? {
                return Err(anyhow!("Post {post_id} not found"));
            }
            output::print_success(&format!("Deleted post {post_id}"), config);
        }
        Commands::DeleteUser { username } => {
            let user = repo::get_user_by_username(pool, &username)?
                .ok_or_else(|| anyhow!("No user named {username:?}"))?;
            repo::delete_user(pool, user.get_id())?;
            output::print_success(&format!("Deleted user {username}"), config);
        }
        Commands::Tags => {
            let counts = sort_tag_counts(repo::tag_counts(pool, Visibility::Public, None)?);
            output::print_tag_counts(&counts, config);
        }
    }
    Ok(())
}
