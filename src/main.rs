use std::future::pending;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shopkeeper_server::editor::EditorSessions;
use shopkeeper_server::settings::{LoadReport, SettingsStore, SnapshotReader};
use shopkeeper_server::shop::ShopRegistry;

const CONFIG_FILE: &str = "config.toml";
const SHOPS_FILE: &str = "data/shopkeepers.json";
const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

// ============================================================================
// Config File
// ============================================================================

/// Loads `path` into the store. Missing keys are filled in and the file is
/// written back whenever the loader changed the record.
fn load_config_file(path: &Path, settings: &mut SettingsStore) -> Result<LoadReport, String> {
    let mut record = if path.exists() {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        content
            .parse::<toml::Table>()
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?
    } else {
        info!("No config found at {}, writing defaults", path.display());
        toml::Table::new()
    };

    let report = settings.load_record(&mut record);

    if report.changed || !path.exists() {
        let content = toml::to_string_pretty(&record).map_err(|e| format!("Failed to serialize config: {}", e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        std::fs::write(path, content).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        info!("Saved updated config to {}", path.display());
    }

    Ok(report)
}

/// Watches the config file and sends a unit for every modification
fn start_config_watcher(path: PathBuf) -> Result<mpsc::Receiver<()>, String> {
    use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

    let (tx, rx) = mpsc::channel(32);
    let watch_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| format!("Config path {} has no file name", path.display()))?;

    std::thread::spawn(move || {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = match RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        ) {
            Ok(w) => w,
            Err(e) => {
                error!("Failed to create config watcher: {}", e);
                return;
            }
        };

        if let Err(e) = watcher.watch(&watch_dir, RecursiveMode::NonRecursive) {
            error!("Failed to watch {}: {}", watch_dir.display(), e);
            return;
        }
        info!("Config hot-reload watcher started for {}", path.display());

        while let Ok(event) = notify_rx.recv() {
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                continue;
            }
            if !event.paths.iter().any(|p| p.file_name() == Some(file_name.as_os_str())) {
                continue;
            }
            if tx.blocking_send(()).is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

async fn next_reload(watcher: &mut Option<mpsc::Receiver<()>>) {
    match watcher {
        Some(rx) => {
            if rx.recv().await.is_none() {
                warn!("Config watcher stopped, hot-reload disabled");
                *watcher = None;
                pending::<()>().await;
            }
        }
        None => pending::<()>().await,
    }
}

// ============================================================================
// Shop Storage
// ============================================================================

fn load_shop_records(path: &Path) -> Result<Vec<Value>, String> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Writes the records through a temporary file so a crash never leaves a
/// truncated save behind. Runs off the main task and reads the settings
/// through the published snapshot only.
fn write_shop_records(path: &Path, records: &[Value], snapshot: &SnapshotReader) -> Result<(), String> {
    let current = snapshot.current();
    if !current.file_encoding.eq_ignore_ascii_case("UTF-8") {
        warn!("Unsupported file encoding '{}', saving as UTF-8", current.file_encoding);
    }

    let content = serde_json::to_string_pretty(records).map_err(|e| format!("Failed to serialize shops: {}", e))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
    std::fs::rename(&tmp, path).map_err(|e| format!("Failed to replace {}: {}", path.display(), e))?;

    if current.is_debugging(None) {
        info!("Saved {} shopkeepers to {}", records.len(), path.display());
    }
    Ok(())
}

fn spawn_save_worker(
    snapshot: SnapshotReader,
    path: PathBuf,
) -> (mpsc::Sender<Vec<Value>>, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<Vec<Value>>(4);
    let handle = tokio::spawn(async move {
        while let Some(records) = rx.recv().await {
            let snapshot = snapshot.clone();
            let path = path.clone();
            let result = tokio::task::spawn_blocking(move || write_shop_records(&path, &records, &snapshot)).await;
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Failed to save shopkeepers: {}", e),
                Err(e) => error!("Save task panicked: {}", e),
            }
        }
    });
    (tx, handle)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shopkeeper_server=info")))
        .init();

    let config_path = PathBuf::from(CONFIG_FILE);
    let shops_path = PathBuf::from(SHOPS_FILE);

    let mut settings = SettingsStore::new();
    match load_config_file(&config_path, &mut settings) {
        Ok(report) if !report.warnings.is_empty() => {
            warn!("Loaded config with {} warnings", report.warnings.len())
        }
        Ok(_) => info!("Loaded config from {}", config_path.display()),
        Err(e) => error!("{}, using defaults", e),
    }

    let mut registry = ShopRegistry::with_default_types();
    match load_shop_records(&shops_path) {
        Ok(records) => {
            registry.load_all(&records, &settings);
        }
        Err(e) => error!("{}", e),
    }

    let mut sessions = EditorSessions::new();

    let mut config_watcher = match start_config_watcher(config_path.clone()) {
        Ok(rx) => Some(rx),
        Err(e) => {
            warn!("Config hot-reload disabled: {}", e);
            None
        }
    };

    let (save_tx, save_worker) = spawn_save_worker(settings.snapshot_reader(), shops_path);
    let mut autosave = tokio::time::interval(AUTOSAVE_INTERVAL);
    autosave.tick().await;

    info!("Shopkeeper server running with {} shop types", registry.shop_types().count());

    loop {
        tokio::select! {
            _ = next_reload(&mut config_watcher) => {
                match load_config_file(&config_path, &mut settings) {
                    Ok(report) => info!("Reloaded config ({} warnings)", report.warnings.len()),
                    Err(e) => error!("Config reload failed, keeping current settings: {}", e),
                }
            }
            _ = autosave.tick() => {
                if save_tx.send(registry.to_records()).await.is_err() {
                    error!("Save worker stopped");
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                break;
            }
        }
    }

    info!("Shutting down, committing {} open editors", sessions.len());
    sessions.close_all(&mut registry, &settings, |rejected| {
        warn!(
            "Dropping invalid trade on page {}, slot {}: {}",
            rejected.page + 1,
            rejected.slot + 1,
            rejected.reason
        );
    });
    if save_tx.send(registry.to_records()).await.is_err() {
        error!("Save worker stopped before the final save");
    }
    drop(save_tx);
    if let Err(e) = save_worker.await {
        error!("Save worker failed: {}", e);
    }
}
