//! Command-line front end. Each invocation bootstraps the stored session,
//! performs one action and prints the resulting screen data.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, ApproveFile, Backend};
use crate::app::TranslationApp;
use crate::auth::oauth::authorize_url;
use crate::auth::{AccessToken, BootstrapOutcome};
use crate::changes::{FileStatus, LineKind};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::navigation::View;
use crate::store::{CredentialStore, KeyringStore};

#[derive(Debug, Parser)]
#[command(name = "transbranch", version, about = "Edit branch translations from the terminal")]
pub struct Cli {
    /// Config file (defaults to <config dir>/transbranch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show who is signed in and where the session would land
    Status,
    /// Print the GitHub URL to visit to obtain an authorization code
    AuthorizeUrl,
    /// Exchange an authorization code and store the session
    Login {
        #[arg(long)]
        code: String,
    },
    /// Forget the stored token and selected branch
    Logout,
    /// List branches with review progress
    Branches,
    /// Show the translatable entries of a branch
    Show { branch: String },
    /// Change one entry and save all files of the branch
    Edit {
        branch: String,
        #[arg(long)]
        file: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    /// Show the diff of a branch
    Changes { branch: String },
    /// List the commits of a branch
    Commits { branch: String },
    /// Print a file from the repository
    Content { path: String },
    /// Replace one translation across a branch (JSON values)
    AutoUpdate {
        branch: String,
        #[arg(long)]
        before: String,
        #[arg(long)]
        after: String,
    },
    /// List the reviewers of a branch
    Reviewers { branch: String },
    /// Show the comments of a pull request
    Comments {
        #[arg(long)]
        pr: u64,
    },
    /// Show whether a file in a pull request is approved
    Approval {
        branch: String,
        #[arg(long)]
        pr: u64,
        #[arg(long)]
        file: String,
    },
    /// Approve a file in a pull request
    Approve {
        #[arg(long)]
        pr: u64,
        #[arg(long)]
        file: String,
        #[arg(long)]
        sha: String,
        #[arg(long)]
        lang: String,
        #[arg(long)]
        label: String,
    },
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let store: Arc<dyn CredentialStore> = Arc::new(KeyringStore::new(config.keyring_service.clone()));
    let client = Arc::new(
        ApiClient::new(config.api_base_url.clone(), config.repo.clone()).map_err(notice)?,
    );
    let backend: Arc<dyn Backend> = client.clone();
    let mut app = TranslationApp::new(store, backend);

    if let Some(message) = startup_notice(&app.start().await) {
        eprintln!("{}", message);
    }

    match cli.command {
        Command::AuthorizeUrl => print_authorize_url(&config)?,
        Command::Status => print_status(&app),
        Command::Login { code } => {
            if app.session().is_authenticated() {
                println!("Already signed in.");
                return Ok(());
            }
            app.login_with_code(&code, &config.redirect_uri)
                .await
                .map_err(notice)?;
            print_status(&app);
        }
        Command::Logout => {
            app.logout().map_err(notice)?;
            println!("Signed out.");
        }
        Command::Branches => {
            require_signed_in(&app)?;
            let branches = app.load_branches().await.map_err(notice)?;
            if branches.is_empty() {
                println!("No branches available");
            }
            for branch in branches {
                match branch.stats {
                    Some(stats) => println!(
                        "{:<40} {:>3}%  total {:>4}  approved {:>4}  pending {:>4}",
                        branch.name,
                        stats.progress_percent(),
                        stats.total,
                        stats.approved,
                        stats.pending()
                    ),
                    None => println!("{}", branch.name),
                }
            }
        }
        Command::Show { branch } => {
            require_signed_in(&app)?;
            app.select_branch(&branch).map_err(notice)?;
            app.load_translations().await.map_err(notice)?;
            print_translations(&app);
        }
        Command::Edit {
            branch,
            file,
            key,
            value,
        } => {
            require_signed_in(&app)?;
            app.select_branch(&branch).map_err(notice)?;
            app.load_translations().await.map_err(notice)?;
            app.edit_entry(&file, &key, &value).map_err(notice)?;
            let saved = app.save_all().await.map_err(notice)?;
            println!("Saved {} file(s) to {}", saved, branch);
        }
        Command::Changes { branch } => {
            require_signed_in(&app)?;
            app.select_branch(&branch).map_err(notice)?;
            app.view_changes().await.map_err(notice)?;
            print_changes(&app);
        }
        Command::Commits { branch } => {
            let token = require_signed_in(&app)?;
            print_json(client.commits(&token, &branch).await.map_err(notice)?)?;
        }
        Command::Content { path } => {
            let token = require_signed_in(&app)?;
            print_json(client.content(&token, &path).await.map_err(notice)?)?;
        }
        Command::AutoUpdate {
            branch,
            before,
            after,
        } => {
            let token = require_signed_in(&app)?;
            let before: Value = serde_json::from_str(&before).context("--before is not valid JSON")?;
            let after: Value = serde_json::from_str(&after).context("--after is not valid JSON")?;
            client
                .auto_update(&token, &branch, &before, &after)
                .await
                .map_err(notice)?;
            println!("Update requested on {}", branch);
        }
        Command::Reviewers { branch } => {
            let token = require_signed_in(&app)?;
            print_json(client.reviewers(&token, &branch).await.map_err(notice)?)?;
        }
        Command::Comments { pr } => {
            let token = require_signed_in(&app)?;
            print_json(client.pr_comments(&token, pr).await.map_err(notice)?)?;
        }
        Command::Approval { branch, pr, file } => {
            let token = require_signed_in(&app)?;
            print_json(
                client
                    .file_approval_status(&token, &branch, pr, &file)
                    .await
                    .map_err(notice)?,
            )?;
        }
        Command::Approve {
            pr,
            file,
            sha,
            lang,
            label,
        } => {
            let token = require_signed_in(&app)?;
            let approval = ApproveFile {
                sha,
                lang,
                label_name: label,
            };
            client
                .approve_file(&token, pr, &file, &approval)
                .await
                .map_err(notice)?;
            println!("Approved {} in PR #{}", file, pr);
        }
    }

    Ok(())
}

/// What to tell the user after startup. A rejected stored token only asks
/// for a fresh login.
fn startup_notice(result: &Result<BootstrapOutcome, AppError>) -> Option<String> {
    match result {
        Ok(BootstrapOutcome::TokenRejected(_)) => Some("Please log in again.".to_string()),
        Ok(_) => None,
        Err(e) => Some(e.user_message()),
    }
}

/// Turn a core error into the notice shown to the user; details go to the log.
fn notice(err: impl Into<AppError>) -> anyhow::Error {
    let err = err.into();
    debug!("Command failed: {:?}", err);
    anyhow!(err.user_message())
}

fn print_json(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_authorize_url(config: &AppConfig) -> Result<()> {
    let Some(client_id) = config.github_client_id.as_deref() else {
        bail!("github_client_id is not configured");
    };
    println!("{}", authorize_url(client_id, &config.redirect_uri)?);
    Ok(())
}

fn require_signed_in(app: &TranslationApp) -> Result<AccessToken> {
    match app.session().token() {
        Some(token) => Ok(token.clone()),
        None => bail!("Not signed in. Run `transbranch authorize-url`, then `transbranch login --code <code>`."),
    }
}

fn print_status(app: &TranslationApp) {
    match app.view() {
        View::Placeholder => println!("Session still loading"),
        View::Login => println!("Signed out"),
        View::Screen(screen) => {
            let user = app
                .session()
                .user()
                .and_then(|u| u.login())
                .unwrap_or("<unknown user>");
            println!("Signed in as {} ({:?})", user, screen);
        }
    }
}

fn print_translations(app: &TranslationApp) {
    let drafts = app.drafts();
    for file in drafts.files() {
        println!("{}", file.filename);
        let Some(translations) = &file.translations else {
            continue;
        };
        for key in translations.keys() {
            let value = drafts.display_value(&file.filename, key).unwrap_or_default();
            println!("  {} = {}", key, value);
        }
    }
}

fn print_changes(app: &TranslationApp) {
    let changes = app.changes();
    if changes.is_empty() {
        println!("No changes to display");
        return;
    }
    for file in changes {
        let (added, removed) = file.line_counts();
        println!(
            "{} [{}] +{} -{}",
            file.filename,
            status_label(file.status),
            added,
            removed
        );
        for (kind, line) in file.lines() {
            let tag = match kind {
                LineKind::Addition => "add",
                LineKind::Deletion => "del",
                LineKind::HunkHeader => "hunk",
                LineKind::Context => "",
            };
            println!("{:>4} | {}", tag, line);
        }
    }
}

fn status_label(status: Option<FileStatus>) -> &'static str {
    match status {
        Some(FileStatus::Modified) => "modified",
        Some(FileStatus::Added) => "added",
        Some(FileStatus::Removed) => "removed",
        Some(FileStatus::Other) => "other",
        None => "unknown",
    }
}
