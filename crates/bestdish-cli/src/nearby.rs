//! One-shot lookups: the cached nearby list and the remote term search.

use bestdish_core::{Business, Coordinate};
use bestdish_search::filter_businesses;
use bestdish_yelp::{NearbyService, NearbySource, YelpClient};

/// Prints restaurants near `coord`, narrowed by `query` when given.
///
/// # Errors
///
/// Returns an error if no cached list exists and every page fetch fails.
pub(crate) async fn run_nearby(
    service: &NearbyService,
    coord: Coordinate,
    query: Option<&str>,
) -> anyhow::Result<()> {
    let result = service.businesses_near(coord).await?;
    if result.pages_failed > 0 {
        eprintln!(
            "warning: {} page(s) failed; list may be incomplete",
            result.pages_failed
        );
    }

    let source = match result.source {
        NearbySource::Cache => "cache",
        NearbySource::Network => "network",
    };
    let shown = filter_businesses(query.unwrap_or_default(), &result.businesses);
    println!(
        "{} of {} restaurants near {} (from {source})",
        shown.len(),
        result.businesses.len(),
        result.origin
    );
    print_businesses(&shown);
    Ok(())
}

/// Prints the remote search results for `term` near `coord`.
///
/// # Errors
///
/// Returns an error if the search request fails.
pub(crate) async fn run_search(
    client: &YelpClient,
    coord: Coordinate,
    term: &str,
) -> anyhow::Result<()> {
    let businesses = client.search_businesses(term, coord).await?;
    if businesses.is_empty() {
        println!("no results for {term:?} near {coord}");
        return Ok(());
    }
    print_businesses(&businesses);
    Ok(())
}

pub(crate) fn print_businesses(businesses: &[Business]) {
    if businesses.is_empty() {
        println!("(none)");
        return;
    }
    println!("{:<24}{:<36}LOCATION", "ID", "NAME");
    for business in businesses {
        println!("{}", format_row(business));
    }
}

fn format_row(business: &Business) -> String {
    let name = if business.name.chars().count() > 34 {
        format!("{}...", business.name.chars().take(31).collect::<String>())
    } else {
        business.name.clone()
    };
    format!(
        "{:<24}{:<36}{}",
        business.id,
        name,
        business.display_location()
    )
}
