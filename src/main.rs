mod alias;
mod catalog;
mod config;
mod error;
mod icons;
mod launch;
mod models;
mod providers;
mod refresh;
mod scanner;
mod search;

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

use anyhow::Result;
use log::{debug, info};

use crate::{
    catalog::{unix_now, Catalog},
    config::AppConfig,
    models::SearchHit,
    providers::{NoIcons, NoPackages, SystemOpener, UnresolvedShortcuts},
    refresh::{startup_scan_needed, RefreshHandle, Refresher, ScanProviders},
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    println!("kindling v0.1.0 starting...");

    let config = Arc::new(Mutex::new(AppConfig::load()));
    debug!("loaded configuration");

    let catalog = Arc::new(Catalog::new());
    let hydrated = catalog::hydrate();
    let scan_now = {
        let config = config.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        startup_scan_needed(hydrated.as_ref(), &config, unix_now())
    };
    if let Some(snapshot) = hydrated {
        info!("hydrated {} entries from catalog cache", snapshot.len());
        catalog.swap(snapshot);
    }

    let refresher = Arc::new(Refresher::new(
        Arc::clone(&catalog),
        Arc::clone(&config),
        ScanProviders {
            shortcuts: Arc::new(UnresolvedShortcuts),
            packages: Arc::new(NoPackages),
            icons: Arc::new(NoIcons),
        },
    ));
    let refresh_handle = refresher.spawn();

    if scan_now {
        println!("Building application catalog in the background...");
        refresh_handle.request();
    } else {
        info!("hydrated catalog is fresh, skipping startup rescan");
    }

    println!(
        "\nReady! Catalog currently holds {} entries.",
        catalog.current().len()
    );
    println!("Type a query to search, or 'help' for commands.\n");

    run_repl(catalog, config, refresh_handle).await?;

    Ok(())
}

async fn run_repl(
    catalog: Arc<Catalog>,
    config: Arc<Mutex<AppConfig>>,
    refresh_handle: RefreshHandle,
) -> Result<()> {
    let spawner = SystemOpener;
    let mut current_results: Vec<SearchHit> = Vec::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed.to_lowercase().as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }
            "help" | "h" => {
                print_help();
                continue;
            }
            "reload" => {
                refresh_handle.request();
                println!("Rescan requested.");
                continue;
            }
            "config" => {
                print_config(&config.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));
                continue;
            }
            "config default" => {
                print_config(&AppConfig::default());
                continue;
            }
            _ => {}
        }

        if let Some(rest) = trimmed.strip_prefix("paths add ") {
            update_paths(&config, &refresh_handle, |paths| {
                paths.push(rest.trim().to_string());
            });
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("paths remove ") {
            let target = rest.trim().to_string();
            update_paths(&config, &refresh_handle, |paths| {
                paths.retain(|path| *path != target);
            });
            continue;
        }

        if let Some(num_str) = trimmed.strip_prefix('!') {
            if let Ok(index) = num_str.parse::<usize>() {
                launch_by_index(&catalog, &spawner, &current_results, index);
                continue;
            }
        }

        current_results = search::search(trimmed, &catalog.current());
        display_results(&current_results);
    }

    Ok(())
}

fn update_paths(
    config: &Arc<Mutex<AppConfig>>,
    refresh_handle: &RefreshHandle,
    edit: impl FnOnce(&mut Vec<String>),
) {
    let mut guard = config.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = guard.fingerprint();
    edit(&mut guard.search_paths);
    let changed = guard.fingerprint() != before;

    if let Err(err) = guard.save() {
        println!("Failed to save configuration: {err}");
        return;
    }
    println!("Configuration saved.");
    drop(guard);

    // A changed search path set invalidates the catalog regardless of age.
    if changed {
        refresh_handle.request();
        println!("Search paths changed, rescan requested.");
    }
}

fn launch_by_index(
    catalog: &Catalog,
    spawner: &SystemOpener,
    results: &[SearchHit],
    index: usize,
) {
    if index == 0 || index > results.len() {
        println!("Invalid index: {index}");
        return;
    }
    let hit = &results[index - 1];
    match launch::launch(&hit.app_id, catalog, spawner) {
        Ok(()) => println!("Launched {}!", hit.name),
        Err(err) => println!("Error: {err}"),
    }
}

fn display_results(results: &[SearchHit]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    println!();
    for (index, hit) in results.iter().enumerate() {
        let icon = hit.icon_ref.as_deref().unwrap_or("-");
        println!("[{}] {} (icon: {})", index + 1, hit.name, icon);
    }
    println!();
    println!("Type !<number> to launch (e.g., !1), or another query to search again.");
}

fn print_config(config: &AppConfig) {
    println!();
    println!("Search paths:");
    for path in &config.search_paths {
        println!("  {path}");
    }
    println!("Refresh interval: {} minutes", config.refresh_interval_minutes);
    println!("Scan depth: {}", config.scan_depth);
    if config.aliases.is_empty() {
        println!("Aliases: none");
    } else {
        println!("Aliases:");
        for rule in &config.aliases {
            println!("  {} -> {}", rule.alias, rule.path);
        }
    }
    println!();
}

fn print_help() {
    println!();
    println!("kindling commands:");
    println!("  <query>              - Fuzzy search the application catalog");
    println!("  !<number>            - Launch search result by index (e.g., !1)");
    println!("  reload               - Force an immediate rescan");
    println!("  config               - Show the current configuration");
    println!("  config default       - Show the built-in default configuration");
    println!("  paths add <dir>      - Add a search directory and save");
    println!("  paths remove <dir>   - Remove a search directory and save");
    println!("  help, h              - Show this help message");
    println!("  quit, q              - Exit kindling");
    println!();
}
