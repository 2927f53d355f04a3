//! Cart demo command.

use anyhow::{bail, Context as _, Result};
use feed_cart::Notification;
use feed_core::{CatalogSession, FeedError};
use feed_data::SearchProvider;
use serde::Serialize;

use super::CartDemoArgs;
use crate::context::Context;

/// One step of the walkthrough.
#[derive(Debug, Serialize)]
struct Step {
    action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejected: Option<String>,
    cart_items: usize,
    available: usize,
}

/// Run the cart-demo command.
pub async fn run(args: CartDemoArgs, ctx: &Context) -> Result<()> {
    let provider = ctx.provider(args.offline, &args.term)?;
    let images = ctx.image_cache(false)?;
    let mut session = CatalogSession::new(provider, images, &ctx.config);

    session
        .apply_search(&args.term)
        .await
        .with_context(|| format!("Search for '{}' failed", args.term))?;

    let products = session.available_products();
    let (first, second) = match products.as_slice() {
        [first, second, ..] => (first.clone(), second.clone()),
        _ => bail!("Need at least two products for '{}'", args.term),
    };

    ctx.output.header(&format!("Cart walkthrough for '{}'", args.term));
    let mut steps = Vec::new();

    let result = session.add_to_cart(first.clone());
    steps.push(record(ctx, &mut session, format!("add {}", first.id), result));

    let result = session.add_to_cart(first.clone());
    steps.push(record(ctx, &mut session, format!("add {} again", first.id), result));

    let result = session.add_to_cart(second.clone());
    steps.push(record(ctx, &mut session, format!("add {}", second.id), result));

    session.remove_from_cart(&first.id);
    steps.push(record(ctx, &mut session, format!("remove {}", first.id), Ok(())));

    let result = session.add_from_json(r#"{"name":"Mystery item"}"#);
    steps.push(record(ctx, &mut session, "drop payload without id".to_string(), result));

    session.clear_cart();
    steps.push(record(ctx, &mut session, "clear".to_string(), Ok(())));

    if ctx.output.is_json() {
        ctx.output.json(&steps);
    }
    Ok(())
}

fn record<P: SearchProvider>(
    ctx: &Context,
    session: &mut CatalogSession<P>,
    action: String,
    result: Result<(), FeedError>,
) -> Step {
    let available = session.available_products().len();
    let cart_items = session.cart().len();

    let step = match result {
        Ok(()) => Step {
            action,
            notification: Some(session.notification().clone()),
            rejected: None,
            cart_items,
            available,
        },
        Err(e) => Step {
            action,
            notification: None,
            rejected: Some(e.to_string()),
            cart_items,
            available,
        },
    };

    ctx.output.info(&format!(
        "{} (cart: {}, available: {})",
        step.action, step.cart_items, step.available
    ));
    match (&step.notification, &step.rejected) {
        (Some(notification), _) => ctx.output.notification(notification),
        (None, Some(reason)) => ctx.output.warn(&format!("  rejected: {reason}")),
        (None, None) => {}
    }

    session.close_notification();
    step
}
