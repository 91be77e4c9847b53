use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use lytics_sdk::readers::read_records;
use lytics_sdk::LyticsClient;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events for the same files arriving within this window are handled once.
const FILE_EVENT_DELAY: Duration = Duration::from_millis(50);

const DATA_EXTENSIONS: &[&str] = &["csv", "json"];

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Directories to watch
    #[arg(required = true)]
    dirs: Vec<PathBuf>,

    /// Maximum number of records read from a data file
    #[arg(short, long, default_value_t = 5)]
    max: usize,
}

/// Canonical, de-duplicated directories that exist; the rest are logged and skipped.
fn accessible_directories(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();
    for dir in dirs {
        match dir.canonicalize() {
            Ok(path) if path.is_dir() => {
                seen.insert(path);
            }
            Ok(path) => error!("Not a directory: {}", path.display()),
            Err(e) => error!("Directory is not accessible: {} ({})", dir.display(), e),
        }
    }
    seen.into_iter().collect()
}

/// The LQL file and data file sharing the changed file's stem, if both exist.
fn test_pair(changed: &Path) -> Option<(PathBuf, PathBuf)> {
    let dir = changed.parent()?;
    let stem = changed.file_stem()?.to_str()?;
    let lql = dir.join(format!("{stem}.lql"));
    if !lql.is_file() {
        return None;
    }
    let data = DATA_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())?;
    Some((lql, data))
}

fn is_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

async fn handle_change(client: &LyticsClient, lql_path: &Path, data_path: &Path, max: usize) {
    let lql = match tokio::fs::read_to_string(lql_path).await {
        Ok(lql) => lql,
        Err(e) => {
            error!("Unable to read {}: {}", lql_path.display(), e);
            return;
        }
    };
    let records = match read_records(data_path, max) {
        Ok(records) => records,
        Err(e) => {
            error!("Unable to read records from {}: {}", data_path.display(), e);
            return;
        }
    };
    if records.is_empty() {
        error!(
            "File has no records or is not well-formed: {}",
            data_path.display()
        );
        return;
    }

    for (i, record) in records.iter().enumerate() {
        let label = format!("Result {}/{}", i + 1, records.len());
        match client.api.test_query(&lql, record).await {
            Ok(result) => {
                info!("{}:", label);
                let pretty = serde_json::to_string_pretty(&result)
                    .unwrap_or_else(|_| format!("{result:?}"));
                println!("{pretty}");
            }
            Err(e) => error!("{} failed: {}", label, e),
        }
    }
    info!("Done handling records: {}", records.len());
}

pub async fn run(client: &LyticsClient, args: WatchArgs) -> Result<()> {
    let dirs = accessible_directories(&args.dirs);
    if dirs.is_empty() {
        bail!("At least one directory must be accessible");
    }
    info!("Maximum number of records to read: {}", args.max);

    match client.api.get_accounts().await {
        Ok(accounts) => {
            let aids: Vec<String> = accounts.iter().map(|a| a.aid.to_string()).collect();
            info!("Connected to Lytics: {}", aids.join(","));
        }
        Err(e) if e.is_unauthorized() => {
            bail!("Unable to connect to Lytics. Make sure you entered a valid API key.")
        }
        Err(e) => return Err(e).context("Unable to connect to Lytics"),
    }

    let (tx, mut rx) = mpsc::channel::<PathBuf>(256);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) if is_change(&event.kind) => {
            for path in event.paths {
                if tx.blocking_send(path).is_err() {
                    return;
                }
            }
        }
        Ok(_) => {}
        Err(e) => warn!("Watch error: {}", e),
    })
    .context("Unable to start the file watcher")?;

    for dir in &dirs {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Unable to watch {}", dir.display()))?;
        info!("Watching folder: {}", dir.display());
    }

    loop {
        let first = tokio::select! {
            path = rx.recv() => match path {
                Some(path) => path,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                break;
            }
        };

        let mut changed = BTreeSet::from([first]);
        while let Ok(Some(path)) = tokio::time::timeout(FILE_EVENT_DELAY, rx.recv()).await {
            changed.insert(path);
        }

        let pairs: BTreeSet<(PathBuf, PathBuf)> = changed
            .iter()
            .inspect(|path| info!("File changed: {}", path.display()))
            .filter_map(|path| test_pair(path))
            .collect();
        for (lql, data) in pairs {
            debug!("Testing {} with {}", lql.display(), data.display());
            handle_change(client, &lql, &data, args.max).await;
        }
    }
    Ok(())
}
