//! docflow command-line front end
//!
//! Every invocation starts from the bundled sample dataset; state is not
//! persisted between runs.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use docflow_core::config::MAX_ARCHIVE_MIN_AGE_DAYS;
use docflow_core::stats::{department_breakdown, status_counts, type_distribution};
use docflow_core::{
    Attachment, Direction, Document, DocumentId, DocumentStore, DocumentType, NotificationInbox,
    Priority, QueryEngine, QuerySpec, RawQuery, SortField, Status, StoreConfig, Submission,
    UploadEvent, UploadOutcome, UploadSimulator,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod sample;

fn cli() -> Command {
    Command::new("docflow")
        .version(docflow_core::VERSION)
        .about("Document review workflow: queues, archive, analytics and audit")
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML store configuration"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("JSON output and JSON log lines"),
        )
        .subcommand(
            Command::new("list")
                .about("List documents")
                .args(query_args())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Reject unknown filter values instead of ignoring them"),
                ),
        )
        .subcommand(
            Command::new("archive")
                .about("List finalized documents past the archive age")
                .arg(Arg::new("search").long("search").help("Text to match"))
                .arg(
                    Arg::new("min-age-days")
                        .long("min-age-days")
                        .value_parser(
                            value_parser!(u32).range(0..=i64::from(MAX_ARCHIVE_MIN_AGE_DAYS)),
                        )
                        .help("Override the configured archive age"),
                ),
        )
        .subcommand(Command::new("stats").about("Status, department and type breakdowns"))
        .subcommand(
            Command::new("review")
                .about("Apply a workflow action to a document")
                .arg(Arg::new("id").long("id").required(true).help("Document id"))
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(value_parser!(Status))
                        .help("Target status (under-review, approved, rejected, escalated)"),
                )
                .arg(
                    Arg::new("reviewer")
                        .long("reviewer")
                        .default_value("Demo Reviewer")
                        .help("Reviewer recorded on the document"),
                ),
        )
        .subcommand(
            Command::new("audit")
                .about("Run the scripted review pass and print the audit trail")
                .arg(
                    Arg::new("reviewer")
                        .long("reviewer")
                        .default_value("Demo Reviewer")
                        .help("Reviewer for the scripted pass"),
                ),
        )
        .subcommand(
            Command::new("upload")
                .about("Simulate an upload, then submit the document")
                .arg(Arg::new("file").long("file").required(true).help("File name"))
                .arg(
                    Arg::new("size")
                        .long("size")
                        .default_value("1048576")
                        .value_parser(value_parser!(u64))
                        .help("File size in bytes"),
                )
                .arg(Arg::new("name").long("name").help("Document name (defaults to the file name)"))
                .arg(
                    Arg::new("type")
                        .long("type")
                        .default_value("other")
                        .value_parser(value_parser!(DocumentType))
                        .help("Document type"),
                )
                .arg(
                    Arg::new("department")
                        .long("department")
                        .required(true)
                        .help("Owning department"),
                )
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .value_parser(value_parser!(Priority))
                        .help("Priority (low, medium, high, urgent)"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducible progress"),
                ),
        )
}

fn query_args() -> [Arg; 6] {
    [
        Arg::new("search").long("search").help("Text to match in name, submitter or type"),
        Arg::new("status").long("status").help("Status filter or \"all\""),
        Arg::new("type").long("type").help("Type filter or \"all\""),
        Arg::new("department").long("department").help("Department filter"),
        Arg::new("sort")
            .long("sort")
            .help("submitted-at, last-updated, priority or name"),
        Arg::new("direction").long("direction").help("asc or desc"),
    ]
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let json = matches.get_flag("json");
    init_tracing(json);

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => StoreConfig::default(),
    };

    let store = DocumentStore::new(config);
    store
        .seed(sample::documents(Utc::now()))
        .context("seeding sample documents")?;
    info!(documents = store.len(), "sample dataset loaded");

    match matches.subcommand() {
        Some(("list", args)) => list(&store, args, json),
        Some(("archive", args)) => archive(&store, args, json),
        Some(("stats", _)) => stats(&store, json),
        Some(("review", args)) => review(&store, args, json),
        Some(("audit", args)) => audit(&store, args, json),
        Some(("upload", args)) => upload(&store, args, json).await,
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}

fn list(store: &DocumentStore, args: &ArgMatches, json: bool) -> Result<()> {
    let text = |key: &str| args.get_one::<String>(key).cloned();
    let raw = RawQuery {
        search: text("search"),
        status: text("status"),
        doc_type: text("type"),
        department: text("department"),
        sort: text("sort"),
        direction: text("direction"),
    };
    if args.get_flag("strict") {
        raw.validate_strict()?;
    }

    let rows = QueryEngine::query(&store.list(), &QuerySpec::from_raw(&raw));
    print_documents(&rows, json)
}

fn archive(store: &DocumentStore, args: &ArgMatches, json: bool) -> Result<()> {
    let min_age = match args.get_one::<u32>("min-age-days") {
        Some(days) => Duration::days(i64::from(*days)),
        None => store.config().archive_min_age(),
    };
    let mut spec = QuerySpec::new()
        .archived(Utc::now(), min_age)
        .with_sort(SortField::LastUpdated, Direction::Desc);
    if let Some(term) = args.get_one::<String>("search") {
        spec = spec.with_text(term);
    }

    let rows = QueryEngine::query(&store.list(), &spec);
    print_documents(&rows, json)
}

fn stats(store: &DocumentStore, json: bool) -> Result<()> {
    let snapshot = store.list();
    let counts = status_counts(&snapshot);
    let departments = department_breakdown(&snapshot);
    let types = type_distribution(&snapshot);

    if json {
        let report = serde_json::json!({
            "total": counts.total(),
            "counts": counts,
            "approvalRate": counts.approval_rate(),
            "departments": departments,
            "types": types,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Documents: {}", counts.total());
    for status in Status::ALL {
        println!("  {:<16} {}", status.label(), counts.get(status));
    }
    match counts.approval_rate() {
        Some(rate) => println!("Approval rate: {:.0}%", rate * 100.0),
        None => println!("Approval rate: n/a"),
    }
    println!();
    println!("By department:");
    for row in &departments {
        println!(
            "  {:<12} total {:>2}  approved {:>2}  pending {:>2}",
            row.department,
            row.counts.total(),
            row.counts.approved,
            row.counts.pending
        );
    }
    println!();
    println!("By type:");
    for share in &types {
        println!(
            "  {:<20} {:>2} ({}%)",
            share.doc_type.label(),
            share.count,
            share.percentage
        );
    }
    Ok(())
}

fn review(store: &DocumentStore, args: &ArgMatches, json: bool) -> Result<()> {
    let id = args
        .get_one::<String>("id")
        .map(DocumentId::new)
        .context("--id is required")?;
    let Some(target) = args.get_one::<Status>("to").copied() else {
        bail!("--to is required");
    };
    let reviewer = args.get_one::<String>("reviewer").map(String::as_str);

    let mut feed = store.subscribe();
    let mut inbox = NotificationInbox::new();

    let updated = match store.transition(&id, target, reviewer) {
        Ok(doc) => doc,
        Err(err) => {
            let current = store.get(&id)?;
            let allowed: Vec<&str> = store
                .available_transitions(&id)?
                .iter()
                .map(|s| s.as_str())
                .collect();
            bail!(
                "{err}; {} is {} (allowed: {})",
                current.id,
                current.status,
                if allowed.is_empty() { "none".to_string() } else { allowed.join(", ") }
            );
        }
    };

    for event in feed.drain() {
        inbox.ingest(&event);
    }

    if json {
        let out = serde_json::json!({
            "document": updated,
            "notifications": inbox.all(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_documents(std::slice::from_ref(&updated), false)?;
    for note in inbox.all() {
        println!("* {}: {}", note.title, note.message);
    }
    Ok(())
}

fn audit(store: &DocumentStore, args: &ArgMatches, json: bool) -> Result<()> {
    let reviewer = args
        .get_one::<String>("reviewer")
        .map_or("Demo Reviewer", String::as_str);
    let steps = sample::walkthrough(store, reviewer)?;
    info!(steps, "scripted review pass finished");

    let log = store.audit_log();
    log.verify_integrity().context("audit chain is broken")?;

    if json {
        print!("{}", log.to_json_lines()?);
        return Ok(());
    }
    for entry in log.entries() {
        let from = entry.previous.map_or("-", Status::as_str);
        println!(
            "#{:<3} {}  {:<10} {:>12} -> {:<12} {}",
            entry.sequence,
            entry.timestamp.format("%Y-%m-%d %H:%M"),
            entry.document_id,
            from,
            entry.current.as_str(),
            entry.actor.as_deref().unwrap_or("")
        );
    }
    println!("chain verified: {} entries", log.len());
    Ok(())
}

async fn upload(store: &DocumentStore, args: &ArgMatches, json: bool) -> Result<()> {
    let Some(file) = args.get_one::<String>("file").cloned() else {
        bail!("--file is required");
    };
    let size = args.get_one::<u64>("size").copied().unwrap_or_default();
    let attachment = Attachment::new(file.clone(), size);

    let mut upload_config = store.config().upload.clone();
    if let Some(seed) = args.get_one::<u64>("seed") {
        upload_config = upload_config.with_seed(*seed);
    }

    let mut handle = UploadSimulator::new(upload_config).start(attachment.clone());
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => handle.cancel(),
            event = handle.next_event() => match event {
                Some(UploadEvent::Progress { percent }) if !json => {
                    println!("uploading {file}: {percent:>5.1}%");
                }
                Some(_) => {}
                None => break,
            },
        }
    }
    if handle.wait().await? == UploadOutcome::Cancelled {
        bail!("upload of {file} cancelled");
    }

    let name = args.get_one::<String>("name").cloned().unwrap_or(file);
    let Some(doc_type) = args.get_one::<DocumentType>("type").copied() else {
        bail!("--type is required");
    };
    let department = args
        .get_one::<String>("department")
        .context("--department is required")?;
    let mut submission = Submission::new(name, doc_type, department.as_str())
        .submitted_by("docflow cli")
        .attach(attachment);
    if let Some(priority) = args.get_one::<Priority>("priority") {
        submission = submission.with_priority(*priority);
    }

    let doc = store.submit(submission)?;
    print_documents(std::slice::from_ref(&doc), json)
}

fn print_documents(rows: &[Document], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("no documents");
        return Ok(());
    }
    for doc in rows {
        println!(
            "{:<10} {:<16} {:<8} {:<36} {:<12} {:>8}  {}",
            doc.id,
            doc.status.label(),
            doc.priority,
            doc.name,
            doc.department,
            doc.display_size(),
            doc.reviewer.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn review_parses_kebab_status() {
        let matches = cli()
            .try_get_matches_from(["docflow", "review", "--id", "doc-002", "--to", "under-review"])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(args.get_one::<Status>("to"), Some(&Status::UnderReview));
    }

    #[test]
    fn archive_age_is_bounded() {
        assert!(cli()
            .try_get_matches_from(["docflow", "archive", "--min-age-days", "4294967295"])
            .is_err());
        assert!(cli()
            .try_get_matches_from(["docflow", "archive", "--min-age-days", "36500"])
            .is_ok());
    }

    #[test]
    fn global_json_flag_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["docflow", "stats", "--json"])
            .unwrap();
        assert!(matches.get_flag("json"));
    }
}
