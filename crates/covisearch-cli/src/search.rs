//! The `search` command: resolve the filter, drive the controller to the
//! requested page, and print each lead.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::ValueEnum;

use covisearch_client::{LeadSearchClient, RetryPolicy, ScreenStatus, SearchController};
use covisearch_core::{
    format_lead, format_relative, format_timestamp, load_catalog, load_city_directory,
    load_city_locations, nearby_cities, whatsapp_link, AppConfig, Catalog, LeadRecord,
    SearchFilter, ShareMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Bold labels, as sent over WhatsApp
    Share,
    /// Plain labels for the clipboard
    Copy,
}

impl From<OutputFormat> for ShareMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Share => ShareMode::Share,
            OutputFormat::Copy => ShareMode::Copy,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SearchArgs {
    pub city: String,
    pub resource: String,
    pub subresource: Option<String>,
    pub page: u32,
    pub format: OutputFormat,
    pub share_links: bool,
}

/// Turns command-line names into a [`SearchFilter`].
///
/// Grouped resources without `--subresource` fall back to the group's "all"
/// entry.
///
/// # Errors
///
/// Returns an error naming the valid choices when the resource or
/// subresource is not in the catalog.
pub(crate) fn build_filter(
    catalog: &Catalog,
    city: &str,
    resource: &str,
    subresource: Option<&str>,
) -> anyhow::Result<SearchFilter> {
    let parent = catalog.find(resource).with_context(|| {
        let known: Vec<&str> = catalog.resources().iter().map(|r| r.value.as_str()).collect();
        format!("unknown resource '{resource}'; expected one of: {}", known.join(", "))
    })?;

    let child = match subresource {
        Some(key) => Some(parent.find_child(key).with_context(|| {
            let known: Vec<&str> = parent.children.iter().map(|c| c.value.as_str()).collect();
            if known.is_empty() {
                format!("'{}' has no subcategories", parent.display_name)
            } else {
                format!(
                    "unknown subresource '{key}' for '{}'; expected one of: {}",
                    parent.display_name,
                    known.join(", ")
                )
            }
        })?),
        None => parent.all_child(),
    };

    Ok(SearchFilter::new(city, parent.clone(), child.cloned()))
}

/// Run a search and print the requested page.
///
/// Timeouts and empty pages are reported with nearby-city suggestions and
/// are not errors.
///
/// # Errors
///
/// Returns an error if the data files or client cannot be loaded, the filter
/// is invalid, or the endpoint reports a failure.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.page >= 1, "--page starts at 1");

    let catalog = load_catalog(config.resources_path.as_deref())?;
    let directory = load_city_directory(config.cities_path.as_deref())?;

    let city = match directory.canonical(&args.city) {
        Some(name) => name.to_owned(),
        None => {
            tracing::warn!(city = %args.city, "city is not in the directory; searching anyway");
            args.city.trim().to_owned()
        }
    };
    let filter = build_filter(&catalog, &city, &args.resource, args.subresource.as_deref())?;

    let client = LeadSearchClient::from_config(config)?;
    let mut controller =
        SearchController::new(Arc::new(client), RetryPolicy::from_config(config));

    controller.submit(filter.clone()).await;
    while controller.state().status == ScreenStatus::DataFetched
        && controller.state().page_number < args.page
        && controller.state().result.has_more_data
    {
        controller.fetch_next_batch().await;
    }

    let state = controller.state();
    match state.status {
        ScreenStatus::Error => {
            anyhow::bail!(
                "search failed: {}",
                state.error.as_deref().unwrap_or("unknown error")
            );
        }
        ScreenStatus::Timeout => {
            println!(
                "Results for {} in {} are still being gathered. Try again in a minute.",
                filter.label(),
                filter.city
            );
            suggest_nearby(config, &filter.city);
        }
        ScreenStatus::DataFetched => {
            if state.page_number < args.page {
                println!(
                    "only {} page(s) available; showing page {}",
                    state.page_number, state.page_number
                );
            }
            if state.result.leads.is_empty() {
                println!("No leads for {} in {}.", filter.label(), filter.city);
                suggest_nearby(config, &filter.city);
                return Ok(());
            }
            print_page(config, &filter, &state.result.leads, args);
            if state.result.has_more_data {
                println!("More results: --page {}", state.page_number + 1);
            }
        }
        ScreenStatus::Idle | ScreenStatus::Loading | ScreenStatus::FetchingData => {
            anyhow::bail!("search ended in unexpected state '{}'", state.status);
        }
    }

    Ok(())
}

fn print_page(config: &AppConfig, filter: &SearchFilter, leads: &[LeadRecord], args: &SearchArgs) {
    let now = Utc::now();
    for (i, lead) in leads.iter().enumerate() {
        if i > 0 {
            println!("----------------------------------------");
        }
        println!(
            "{}",
            format_lead(filter, lead, args.format.into(), &config.site_url)
        );
        if let Some(line) = verified_line(lead, now) {
            println!("{line}");
        }
        if args.share_links {
            let share = format_lead(filter, lead, ShareMode::Share, &config.site_url);
            println!("Share: {}", whatsapp_link(&share));
        }
    }
}

/// "Verified 3 hours ago (2021-05-17 at 10:26 UTC)", falling back to the
/// post time when the lead was never verified. Unparsable times are shown
/// as given.
pub(crate) fn verified_line(lead: &LeadRecord, now: chrono::DateTime<Utc>) -> Option<String> {
    let (verb, raw) = match (&lead.last_verified_utc, &lead.post_time) {
        (Some(raw), _) if !raw.trim().is_empty() => ("Verified", raw),
        (_, Some(raw)) if !raw.trim().is_empty() => ("Posted", raw),
        _ => return None,
    };
    let absolute = format_timestamp(raw);
    if absolute == *raw {
        // Unparsable; both helpers hand back the raw text.
        return Some(format!("{verb} {}", raw.trim()));
    }
    Some(format!("{verb} {} ({absolute} UTC)", format_relative(raw, now)))
}

fn suggest_nearby(config: &AppConfig, city: &str) {
    let locations = match load_city_locations(config.city_locations_path.as_deref()) {
        Ok(locations) => locations,
        Err(e) => {
            tracing::warn!(error = %e, "could not load city locations for suggestions");
            return;
        }
    };
    if let Some(nearby) = nearby_cities(city, &locations) {
        if !nearby.is_empty() {
            let names: Vec<&str> = nearby.iter().map(|n| n.city.as_str()).collect();
            println!("Nearby cities you could try: {}", names.join(", "));
        }
    }
}
