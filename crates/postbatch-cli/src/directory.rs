//! Read-only directory and store-registry inspection commands.

use postbatch_core::AppConfig;
use postbatch_directory::{build_location_map, DirectoryClient};

pub(crate) fn directory_client(config: &AppConfig) -> anyhow::Result<DirectoryClient> {
    DirectoryClient::with_base_url(
        &config.access_token,
        config.request_timeout_secs,
        &config.user_agent,
        &config.directory_base_url,
    )
    .map_err(|e| anyhow::anyhow!("failed to build directory client: {e}"))
}

pub(crate) async fn run_accounts(config: &AppConfig) -> anyhow::Result<()> {
    let client = directory_client(config)?;
    let accounts = client.list_accounts().await?;

    for account in &accounts {
        println!(
            "{}\t{}\t{}",
            account.name,
            account.account_name.as_deref().unwrap_or("-"),
            account.account_type.as_deref().unwrap_or("-")
        );
    }
    println!("{} accounts", accounts.len());
    Ok(())
}

pub(crate) async fn run_locations(config: &AppConfig, account: &str) -> anyhow::Result<()> {
    let client = directory_client(config)?;
    let map = build_location_map(&client, account, config.page_delay_ms).await?;

    let mut rows: Vec<(&str, &str)> = map.iter().collect();
    rows.sort_unstable();
    for (store_code, location) in &rows {
        println!("{store_code}\t{location}");
    }
    println!(
        "{} store codes ({} locations without a code, {} duplicate codes)",
        map.len(),
        map.missing_store_code,
        map.duplicate_store_code
    );
    Ok(())
}

pub(crate) async fn run_media(config: &AppConfig, location: &str) -> anyhow::Result<()> {
    let client = directory_client(config)?;
    let items = client.list_media(location).await?;

    for item in &items {
        println!(
            "{}\t{}\t{}",
            item.name,
            item.media_format.as_deref().unwrap_or("-"),
            item.google_url
                .as_deref()
                .or(item.source_url.as_deref())
                .unwrap_or("-")
        );
    }
    println!("{} media items", items.len());
    Ok(())
}

pub(crate) fn run_stores(config: &AppConfig) -> anyhow::Result<()> {
    let path = config.store_registry_path.as_deref().ok_or_else(|| {
        anyhow::anyhow!("POSTBATCH_STORE_REGISTRY is not set; no store registry to show")
    })?;
    let records = postbatch_core::load_store_registry(path)?;

    for record in &records {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            record.store_name,
            record.account_id,
            record.location_id,
            record
                .last_upload
                .map_or_else(|| "never".to_string(), |at| at.to_rfc3339()),
            if record.status.is_empty() { "-" } else { record.status.as_str() }
        );
    }
    println!("{} stores in {}", records.len(), path.display());
    Ok(())
}
