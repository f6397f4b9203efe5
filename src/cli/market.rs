use anyhow::Result;
use comfy_table::Cell;
use futures::future::join_all;
use tracing::debug;

use super::ui;
use crate::core::asset::{AssetRegistry, Category};
use crate::core::time::to_iso_millis;
use crate::core::{ConversionRates, HistorySeries, MarketService, NormalizedAsset, Snapshot};

pub fn catalog_table(registry: &AssetRegistry) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
    ]);
    for (category, entries) in registry.catalog() {
        for entry in entries {
            table.add_row(vec![
                Cell::new(category.to_string()),
                Cell::new(&entry.symbol),
                Cell::new(&entry.name),
            ]);
        }
    }
    table.to_string()
}

fn category_table(category: Category, assets: &[NormalizedAsset]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
        ui::header_cell("Price (USD)"),
        ui::header_cell("Price (EUR)"),
        ui::header_cell("Price (PKR)"),
        ui::header_cell("Change"),
        ui::header_cell("State"),
    ]);

    for asset in assets {
        table.add_row(vec![
            Cell::new(&asset.name),
            Cell::new(&asset.symbol),
            ui::format_optional_cell(asset.price.usd, |p| format!("{p:.2}")),
            ui::format_optional_cell(asset.price.eur, |p| format!("{p:.2}")),
            ui::format_optional_cell(asset.price.pkr, |p| format!("{p:.2}")),
            ui::change_cell(asset.market_change.percent),
            Cell::new(&asset.market_state),
        ]);
    }

    let title = category.to_string().to_uppercase();
    format!(
        "{}\n\n{}",
        ui::style_text(&title, ui::StyleType::Title),
        table
    )
}

fn rates_summary(rates: &ConversionRates) -> String {
    let fmt_rate = |rate: Option<f64>| match rate {
        Some(r) => ui::style_text(&format!("{r:.4}"), ui::StyleType::Value),
        None => ui::style_text("N/A", ui::StyleType::Error),
    };
    format!(
        "{} 1 USD = {} EUR | 1 USD = {} PKR",
        ui::style_text("Conversion:", ui::StyleType::Label),
        fmt_rate(rates.usd_to_eur),
        fmt_rate(rates.usd_to_pkr),
    )
}

pub fn snapshot_report(snapshot: &Snapshot) -> String {
    let mut output = format!(
        "{}\n{}\n",
        rates_summary(&snapshot.conversion_rates),
        ui::style_text(
            &format!("Generated at {}", to_iso_millis(&snapshot.generated_at)),
            ui::StyleType::Subtle
        ),
    );

    if snapshot.data.is_empty() {
        output.push_str("\nNo quotes returned by the provider.");
        return output;
    }

    for (category, assets) in &snapshot.data {
        output.push('\n');
        output.push_str(&category_table(*category, assets));
        output.push('\n');
    }
    output
}

pub fn history_table(series: &HistorySeries) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Time"), ui::header_cell("Close")]);
    for point in &series.points {
        table.add_row(vec![
            Cell::new(to_iso_millis(&point.time)),
            ui::format_optional_cell(Some(point.value), |v| format!("{v:.4}")),
        ]);
    }

    let title = format!(
        "{} ({}, {})",
        series.symbol, series.range, series.interval
    );
    format!(
        "{}\n\n{}\n{} points",
        ui::style_text(&title, ui::StyleType::Title),
        table,
        series.points.len()
    )
}

pub async fn show_snapshot(service: &MarketService, json: bool) -> Result<()> {
    let spinner = ui::new_spinner("Fetching quotes...");
    let result = service.snapshot().await;
    spinner.finish_and_clear();

    let snapshot = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", snapshot_report(&snapshot));
    }
    Ok(())
}

/// Fetches every symbol concurrently. A failed symbol is reported and does
/// not stop the others; the command fails if any symbol failed.
pub async fn show_history(
    service: &MarketService,
    symbols: &[String],
    range: &str,
    interval: &str,
    json: bool,
) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Fetching history for {} symbol(s)...", symbols.len()));
    let results = join_all(
        symbols
            .iter()
            .map(|symbol| service.history(symbol, range, interval)),
    )
    .await;
    spinner.finish_and_clear();

    let mut failed = Vec::new();
    for (symbol, result) in symbols.iter().zip(results) {
        match result {
            Ok(series) if json => println!("{}", serde_json::to_string_pretty(&series)?),
            Ok(series) => {
                println!("{}", history_table(&series));
                ui::print_separator();
            }
            Err(e) => {
                debug!(symbol = %symbol, error = ?e, "History fetch failed");
                eprintln!(
                    "{}",
                    ui::style_text(
                        &format!("Failed to fetch history for {symbol}: {e}"),
                        ui::StyleType::Error
                    )
                );
                failed.push(symbol.as_str());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("History fetch failed for: {}", failed.join(", "));
    }
    Ok(())
}
