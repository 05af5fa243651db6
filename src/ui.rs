// UI layer: a small interactive menu built with `dialoguer`. Each action
// collects its inputs, shows a spinner while the network call runs and
// prints the result. All storage logic lives in `sync` and `api`.

use crate::api::RemoteFileRecord;
use crate::config::Credentials;
use crate::sync::{StorageSync, SyncOutcome};
use crate::transport::Transport;
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

/// Main interactive menu. Runs until the user picks "Exit".
pub fn main_menu<T: Transport>(mut storage: StorageSync<T>) -> Result<()> {
    loop {
        let items = vec![
            "List files",
            "Upload file",
            "Sync file (upload only if changed)",
            "Check file",
            "Set credentials",
            "Exit",
        ];
        let selection = Select::new().items(&items).default(0).interact()?;
        let outcome = match selection {
            0 => handle_list(&storage),
            1 => handle_upload(&storage),
            2 => handle_sync(&storage),
            3 => handle_check(&storage),
            4 => {
                let creds = prompt_credentials()?;
                storage.client_mut().set_credentials(creds);
                Ok(())
            }
            5 => break,
            _ => Ok(()),
        };
        // A failed action is reported and the menu keeps running.
        if let Err(e) = outcome {
            println!("Error: {:#}", e);
        }
    }
    Ok(())
}

fn handle_list<T: Transport>(storage: &StorageSync<T>) -> Result<()> {
    let spinner = spinner("Listing files...");
    let files = storage.list();
    spinner.finish_and_clear();
    let files = files.context("Listing storage failed")?;
    if files.is_empty() {
        println!("No files in storage for {}.", storage.client().username());
    }
    for f in &files {
        print_record(f);
    }
    Ok(())
}

fn handle_upload<T: Transport>(storage: &StorageSync<T>) -> Result<()> {
    let (path, name) = prompt_file()?;
    let overwrite = Confirm::new()
        .with_prompt("Overwrite an existing file with the same name?")
        .default(true)
        .interact()?;

    let spinner = spinner("Uploading...");
    let result = storage.put(&path, name.as_deref(), overwrite);
    spinner.finish_and_clear();
    match result.context("Upload failed")? {
        Some(record) => {
            println!("Upload successful");
            print_record(&record);
        }
        None => println!("Upload sent, but the file does not show up in storage yet."),
    }
    Ok(())
}

fn handle_sync<T: Transport>(storage: &StorageSync<T>) -> Result<()> {
    let (path, name) = prompt_file()?;
    let spinner = spinner("Comparing with storage...");
    let result = storage.update(&path, name.as_deref());
    spinner.finish_and_clear();
    match result.context("Sync failed")? {
        SyncOutcome::AlreadyMatched(record) => {
            println!("Already up to date, nothing uploaded");
            print_record(&record);
        }
        SyncOutcome::Uploaded(record) => {
            println!("Uploaded new contents");
            print_record(&record);
        }
        SyncOutcome::Unconfirmed { name } => {
            println!("Uploaded '{}', but it does not show up in storage yet.", name)
        }
    }
    Ok(())
}

fn handle_check<T: Transport>(storage: &StorageSync<T>) -> Result<()> {
    let (path, name) = prompt_file()?;
    let spinner = spinner("Checking...");
    let result = storage.is_verified(&path, name.as_deref());
    spinner.finish_and_clear();
    if result.context("Check failed")? {
        println!("Stored copy matches {}", path.display());
    } else {
        println!("Stored copy is missing or differs from {}", path.display());
    }
    Ok(())
}

/// Ask for a local path and an optional remote name (blank = base name).
fn prompt_file() -> Result<(PathBuf, Option<String>)> {
    let path: String = Input::new().with_prompt("Local file path").interact_text()?;
    let name: String = Input::new()
        .with_prompt("Remote name (blank for file name)")
        .allow_empty(true)
        .interact_text()?;
    let name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
    Ok((PathBuf::from(path.trim()), name))
}

/// Ask for credentials and offer to save them for future runs.
pub fn prompt_credentials() -> Result<Credentials> {
    let username: String = Input::new().with_prompt("Sauce username").interact_text()?;
    // `Password` hides the access key while typing.
    let access_key: String = Password::new().with_prompt("Access key").interact()?;
    let creds = Credentials::new(username, access_key);

    let save = Confirm::new()
        .with_prompt("Save credentials to your home directory?")
        .default(false)
        .interact()?;
    if save {
        let path = Credentials::default_path();
        creds
            .persist(&path)
            .with_context(|| format!("Saving credentials to {}", path.display()))?;
        println!("Saved to {}", path.display());
    }
    Ok(creds)
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_record(record: &RemoteFileRecord) {
    println!(
        "{}  {} bytes  md5={}  {}",
        record.name,
        record.size,
        record.md5.as_deref().unwrap_or("-"),
        record.url
    );
}
