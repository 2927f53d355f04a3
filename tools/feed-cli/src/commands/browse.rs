//! Browse command: search, scroll and show the revealed grid.

use std::time::Duration;

use anyhow::{Context as _, Result};
use feed_core::{CatalogSession, ScrollPosition, SearchDebouncer};
use feed_data::SearchProvider;
use feed_fetch::FetchOutcome;
use serde_json::json;

use super::BrowseArgs;
use crate::context::Context;

/// Delay between simulated keystrokes.
const KEYSTROKE: Duration = Duration::from_millis(40);

/// Grid geometry used to turn revealed products into a scroll position.
const COLUMNS: usize = 4;
const ROW_HEIGHT: f64 = 320.0;
const VIEWPORT_HEIGHT: f64 = 900.0;

/// Longest wait for the reveal animation to finish.
const REVEAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the browse command.
pub async fn run(args: BrowseArgs, ctx: &Context) -> Result<()> {
    let provider = ctx.provider(args.offline, &args.term)?;
    let images = ctx.image_cache(args.images && !args.offline)?;
    let mut session = CatalogSession::new(provider, images, &ctx.config);

    let term = type_term(&args.term, ctx.config.search.debounce).await?;
    ctx.output.debug(&format!("Settled search term: '{term}'"));

    let spinner = ctx.output.spinner(&format!("Searching for '{term}'"));
    let first = session.apply_search(&term).await;
    spinner.finish_and_clear();
    first.with_context(|| format!("Search for '{term}' failed"))?;

    load_pages(&mut session, args.pages, ctx).await;

    if !args.no_wait {
        let spinner = ctx.output.spinner("Revealing products");
        wait_for_reveal(&session).await;
        spinner.finish_and_clear();
    }

    let visible = session.visible_products();
    let metrics = session.metrics();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "term": term,
            "products": visible,
            "metrics": metrics,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Results for '{term}'"));
    let widths = [14, 40, 10, 6];
    ctx.output.table_row(&["ID", "NAME", "PRICE", "STOCK"], &widths);
    for product in &visible {
        ctx.output.table_row(
            &[
                product.id.as_str(),
                &product.name,
                &product.price_display(),
                &product.stock.to_string(),
            ],
            &widths,
        );
    }

    ctx.output.header("Session");
    ctx.output.kv("revealed", &format!("{} of {}", metrics.revealed, metrics.available));
    ctx.output.kv("fetched", &metrics.products_accumulated.to_string());
    ctx.output.kv("pages loaded", &metrics.page.saturating_sub(1).to_string());
    ctx.output.kv("more available", &metrics.has_more.to_string());
    ctx.output.kv("requests", &metrics.fetch.requests_issued.to_string());
    ctx.output.kv(
        "image cache",
        &format!("{}/{} entries", metrics.cache_entries, metrics.cache_capacity),
    );
    if let Some(rate) = metrics.cache_hit_rate() {
        ctx.output.kv("cache hit rate", &format!("{:.0}%", rate * 100.0));
    }
    if let Some(error) = &metrics.error {
        ctx.output.warn(error);
    }

    Ok(())
}

/// Feed `term` through the debouncer one keystroke at a time.
async fn type_term(term: &str, quiet: Duration) -> Result<String> {
    let (debouncer, mut settled) = SearchDebouncer::spawn(quiet);

    let mut typed = String::new();
    for ch in term.chars() {
        typed.push(ch);
        debouncer.push(typed.clone());
        tokio::time::sleep(KEYSTROKE).await;
    }
    drop(debouncer);

    let mut last = None;
    while let Some(value) = settled.recv().await {
        last = Some(value);
    }
    last.context("No search term entered")
}

/// Scroll to the bottom of the grid until `pages` pages are loaded.
async fn load_pages<P: SearchProvider>(session: &mut CatalogSession<P>, pages: u32, ctx: &Context) {
    let progress = ctx.output.progress(u64::from(pages), "pages");
    progress.inc(1);

    let mut loaded = 1;
    while loaded < pages {
        let position = bottom_of_grid(session.available_products().len());
        if !session.should_load_more(&position) {
            break;
        }

        match session.load_more().await {
            Ok(FetchOutcome::Appended { .. }) => {
                loaded += 1;
                progress.inc(1);
            }
            Ok(_) => break,
            Err(e) => {
                ctx.output.warn(&format!("Stopped loading: {e}"));
                break;
            }
        }
    }
    progress.finish_and_clear();
}

fn bottom_of_grid(items: usize) -> ScrollPosition {
    let rows = items.div_ceil(COLUMNS);
    let content_height = rows as f64 * ROW_HEIGHT;
    let scroll_top = (content_height - VIEWPORT_HEIGHT).max(0.0);
    ScrollPosition::new(scroll_top, VIEWPORT_HEIGHT, content_height)
}

async fn wait_for_reveal<P>(session: &CatalogSession<P>) {
    let mut window = session.subscribe_reveal();
    let finished = tokio::time::timeout(REVEAL_TIMEOUT, async {
        while !window.borrow_and_update().is_complete() {
            if window.changed().await.is_err() {
                break;
            }
        }
    })
    .await;

    if finished.is_err() {
        tracing::warn!("reveal did not finish in time");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_of_grid() {
        let position = bottom_of_grid(20);
        assert_eq!(position.content_height, 5.0 * ROW_HEIGHT);
        assert_eq!(position.distance_to_end(), 0.0);

        let short = bottom_of_grid(2);
        assert_eq!(short.scroll_top, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_type_term_settles_on_full_term() {
        let term = type_term("desk", Duration::from_millis(500)).await.unwrap();
        assert_eq!(term, "desk");
    }
}
