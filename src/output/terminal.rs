// Colored terminal output for account reports and new-post events.
//
// main.rs delegates all user-facing formatting here; logging goes through
// tracing instead.

use colored::Colorize;

use crate::classify::account::AccountReport;
use crate::classify::status::{StatusFlag, UNKNOWN_LABEL};
use crate::error::{ClassificationError, WatchError};
use crate::watch::detector::NewPostEvent;
use crate::watch::poller::WatchEvent;

/// Display the classification of an account.
pub fn display_account(report: &AccountReport) {
    let status = &report.status;

    if status.is_banned() {
        println!(
            "{}",
            format!("Account @{} has been banned", report.handle).red()
        );
        return;
    }
    if !status.exists() {
        println!("{}", format!("User @{} not found", report.handle).red());
        return;
    }

    println!(
        "\n{}",
        format!("Account Information for @{}:", report.handle).cyan()
    );
    println!("{}", format!("Status: {}", status.label()).yellow());
    println!("{}", format!("Followers: {}", status.followers()).cyan());
    println!("{}", format!("Following: {}", status.following()).cyan());
    println!("{}", format!("Tweet Count: {}", status.post_count()).cyan());

    if let Some(profile) = &report.profile {
        if !profile.withheld_in.is_empty() {
            println!(
                "{}",
                format!("Withheld in: {}", profile.withheld_in.join(", ")).dimmed()
            );
        }
        if profile.possibly_sensitive {
            println!("{}", "Profile is marked as possibly sensitive".dimmed());
        }
    }

    if status.has(StatusFlag::Sensitive) {
        display_sensitive_warning();
    }
    if status.has(StatusFlag::Private) {
        println!(
            "{}",
            "Note: This is a private account. You may not see tweets unless you're an approved follower."
                .yellow()
        );
    }
}

/// Display a classification that could not complete.
pub fn display_classification_error(handle: &str, error: &ClassificationError) {
    if error.is_transient() {
        println!("\n{}", format!("Account Information for @{handle}:").cyan());
        println!("{}", format!("Status: {UNKNOWN_LABEL}").yellow());
    }
    println!("{}", format!("Error: {error}").red());
}

/// Explain why a watch did not start.
pub fn display_watch_refused(error: &WatchError) {
    match error {
        WatchError::Banned { .. } => {
            println!("{}", "Cannot watch banned account.".red());
        }
        WatchError::NotFound { handle } => {
            println!("{}", format!("Cannot watch @{handle}: account not found.").red());
        }
        WatchError::Rejected { .. } => {
            println!("{}", format!("Error: {error}").red());
        }
    }
}

pub fn display_sensitive_warning() {
    println!(
        "{}",
        "Warning: This account has tweets marked as sensitive content".yellow()
    );
}

/// Display a newly detected post with its metrics.
pub fn display_new_post(event: &NewPostEvent) {
    let post = &event.post;

    println!("\n{}", "New tweet detected!".green());
    match post.created_at {
        Some(created_at) => println!("{}", format!("Time: {created_at}").yellow()),
        None => println!("{}", "Time: unknown".yellow()),
    }
    println!(
        "{}",
        format!(
            "Likes: {} | Retweets: {} | Replies: {}",
            post.metrics.likes, post.metrics.retweets, post.metrics.replies
        )
        .cyan()
    );
    println!("{}\n", post.text.white());
}

/// Route a watch loop event to the right display.
pub fn display_watch_event(event: &WatchEvent) {
    match event {
        WatchEvent::NewPost(event) => display_new_post(event),
        WatchEvent::SensitiveContent => display_sensitive_warning(),
    }
}
