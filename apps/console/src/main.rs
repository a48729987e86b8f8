use std::{ops::ControlFlow, path::PathBuf, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, render, AlwaysConfirm, BatchOutcome, BrowseQuery, Confirm, HttpPosterApi,
    SessionContext, WorkflowController,
};
use shared::domain::{ContentFilter, ItemId, SortOrder};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod prompt;

use commands::Command;
use prompt::{print_prompt, stdin_lines, StdinConfirm};

#[derive(Parser, Debug)]
#[command(name = "posterdesk", about = "Pick and upload posters for a Jellyfin library")]
struct Args {
    /// Poster backend base url; overrides the settings file and environment
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file (defaults to ./posterdesk.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Answer yes to every confirmation
    #[arg(long)]
    yes: bool,
    #[arg(long = "type")]
    filter: Option<ContentFilter>,
    #[arg(long)]
    sort: Option<SortOrder>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(filter) = args.filter {
        settings.default_filter = filter;
    }
    if let Some(sort) = args.sort {
        settings.default_sort = sort;
    }
    info!(server_url = %settings.server_url, "starting posterdesk");

    let api = HttpPosterApi::from_settings(&settings).context("failed to build poster client")?;
    let lines = stdin_lines();
    let confirm: Arc<dyn Confirm> = if args.yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(StdinConfirm::new(lines.clone()))
    };
    let mut controller = WorkflowController::new(
        Arc::new(api),
        confirm,
        SessionContext::from_settings(&settings),
    );

    controller.check_health().await;
    let query = controller.session().query;
    if controller.list_items(query).await {
        print_status(&controller);
    }

    let mut last_shown = 0;
    loop {
        last_shown = print_new_notifications(&mut controller, last_shown);
        print_prompt("posterdesk> ");
        let Some(line) = lines.lock().await.next_line().await? else {
            break;
        };
        match commands::parse_line(&line) {
            Ok(None) => {}
            Ok(Some(command)) => {
                if run(&mut controller, command).await.is_break() {
                    break;
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    info!(
        session_id = %controller.session().id(),
        pending = controller.session().selection_count(),
        "session ended"
    );
    Ok(())
}

async fn run(controller: &mut WorkflowController, command: Command) -> ControlFlow<()> {
    match command {
        Command::Items { filter, sort } => {
            let listed = if filter.is_none() && sort.is_none() {
                let query = controller.session().query;
                controller.list_items(query).await
            } else {
                let mut query = controller.session().query;
                if let Some(filter) = filter {
                    query = query.with_filter(filter);
                }
                if let Some(sort) = sort {
                    query = query.with_sort(sort);
                }
                controller.apply_browse_query(query).await
            };
            if listed {
                print_status(controller);
            }
        }
        Command::Browse { query } => {
            if controller
                .apply_browse_query(BrowseQuery::from_query(&query))
                .await
            {
                print_status(controller);
            }
        }
        Command::Posters { item_id } => {
            if controller
                .request_poster_candidates(&ItemId::new(item_id))
                .await
            {
                print_poster_list(controller);
            }
        }
        Command::Pick { poster_id } => {
            if !controller.choose_candidate(&poster_id).await {
                print_poster_list(controller);
            }
        }
        Command::Upload { item_id } => {
            controller.upload_one(&ItemId::new(item_id)).await;
        }
        Command::UploadAll => {
            let outcome = controller.upload_all_selected().await;
            print_batch(controller, &outcome);
        }
        Command::Auto { filter } => {
            let outcome = controller.run_automatic_batch(filter).await;
            print_batch(controller, &outcome);
        }
        Command::Direct {
            item_id,
            poster_url,
        } => {
            controller
                .upload_direct(&ItemId::new(item_id), &poster_url)
                .await;
        }
        Command::Status => print_status(controller),
        Command::Notes => {
            controller.session_mut().notifications.prune(Instant::now());
            for note in controller.session().notifications.iter() {
                println!("#{} [{}] {}", note.id, note.level.as_str(), note.message);
            }
        }
        Command::Dismiss { id } => {
            if !controller.dismiss_notification(id) {
                println!("no notification #{id}");
            }
        }
        Command::Health => {
            if let Some(report) = controller.check_health().await {
                println!(
                    "{}: {} {} ({} active sessions)",
                    report.status,
                    report.server_name.as_deref().unwrap_or("Jellyfin Server"),
                    report.server_version.as_deref().unwrap_or(""),
                    report.active_sessions
                );
            }
        }
        Command::Close => {
            controller.close_poster_modal();
        }
        Command::Results { close } => {
            if close {
                controller.close_results();
            } else {
                match controller.session().modals.results() {
                    Some(summary) => print!("{}", summary.to_text()),
                    None => println!("no batch results"),
                }
            }
        }
        Command::Html => {
            let modals = &controller.session().modals;
            if let Some(modal) = modals.posters() {
                println!("{}", modal.grid.to_html());
            } else if let Some(summary) = modals.results() {
                println!("{}", summary.to_html());
            } else {
                for view in controller.session().views.iter() {
                    println!("{}", render::status_badge_html(view));
                }
            }
        }
        Command::Quit => return ControlFlow::Break(()),
    }
    ControlFlow::Continue(())
}

fn print_status(controller: &WorkflowController) {
    let session = controller.session();
    if let Some(server) = &session.server_info {
        println!("{} ({})", server.name, session.query.to_query());
    }
    for view in session.views.iter() {
        println!("{}", render::status_line(view));
    }
    for (item_id, poster_url) in session.selections().iter() {
        println!("  pending {item_id}: {poster_url}");
    }
    let control = session.upload_all_control();
    println!(
        "{}{}",
        control.label,
        if control.enabled { "" } else { " (disabled)" }
    );
}

fn print_poster_list(controller: &WorkflowController) {
    if let Some(modal) = controller.session().modals.posters() {
        print!("{}", modal.grid.to_text());
    }
}

fn print_batch(controller: &WorkflowController, outcome: &BatchOutcome) {
    if let BatchOutcome::Completed { .. } = outcome {
        if let Some(summary) = controller.session().modals.results() {
            print!("{}", summary.to_text());
        }
    }
}

/// Prints notifications newer than `last_shown`, oldest first, and returns the newest id seen.
fn print_new_notifications(controller: &mut WorkflowController, last_shown: u64) -> u64 {
    let notifications = &mut controller.session_mut().notifications;
    notifications.prune(Instant::now());
    let fresh: Vec<_> = notifications
        .iter()
        .filter(|note| note.id > last_shown)
        .collect();
    let newest = fresh.first().map_or(last_shown, |note| note.id);
    for note in fresh.into_iter().rev() {
        println!("[{}] {}", note.level.as_str(), note.message);
    }
    newest
}
