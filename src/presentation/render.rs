// src/presentation/render.rs
//! Plain-text rendering of the dashboard: item cards, detail panel, price list and
//! analysis. Everything here works on snapshot data and does no I/O.

use super::analysis::{is_lowest, price_spread, savings_percent, SavingsPercent};
use super::format::{format_clp, format_countdown, format_local_time, format_percent};
use crate::catalog::{Item, ItemId};
use std::fmt::Write;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: ItemId,
    pub name: String,
    pub platform: String,
    pub selected: bool,
    pub cooldown: Option<Duration>,
}

/// Everything the renderer needs, captured at one instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub loading: bool,
    pub updating: bool,
    pub banner: Option<String>,
    pub cards: Vec<CardView>,
    pub selected: Option<Item>,
    pub selected_cooldown: Option<Duration>,
}

pub fn action_label(updating: bool, cooldown: Option<Duration>) -> String {
    if updating {
        "Updating...".to_string()
    } else if let Some(remaining) = cooldown {
        format!("Wait {}", format_countdown(remaining))
    } else {
        "Update prices".to_string()
    }
}

pub fn render_dashboard(view: &DashboardView) -> String {
    if view.loading {
        return "Loading games...\n".to_string();
    }

    let mut out = String::new();
    out.push_str("Game Price Tracker\n");
    out.push_str("Compare PS4 and PS5 game prices in Chile\n\n");

    if let Some(banner) = &view.banner {
        let _ = writeln!(out, "! {}\n", banner);
    }

    out.push_str(&render_cards(&view.cards));

    if let Some(item) = &view.selected {
        out.push('\n');
        out.push_str(&render_detail(item, view.updating, view.selected_cooldown));
    }
    out
}

pub fn render_cards(cards: &[CardView]) -> String {
    let mut out = String::from("Select a game\n");
    if cards.is_empty() {
        out.push_str("  (no games available)\n");
    }
    for card in cards {
        let marker = if card.selected { '>' } else { ' ' };
        let _ = write!(out, " {} [{}] {} ({})", marker, card.id, card.name, card.platform);
        if let Some(remaining) = card.cooldown {
            let _ = write!(out, "  [cooldown {}]", format_countdown(remaining));
        }
        out.push('\n');
    }
    out
}

pub fn render_detail(item: &Item, updating: bool, cooldown: Option<Duration>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", item.name);
    let _ = writeln!(out, "Platform: {}", item.platform);
    if !item.image.is_empty() {
        let _ = writeln!(out, "Cover: {}", item.image);
    }
    if let Some(at) = item.last_update {
        let _ = writeln!(out, "Last update: {}", format_local_time(at));
    }
    let _ = writeln!(out, "[ {} ]\n", action_label(updating, cooldown));

    if item.prices.is_empty() {
        out.push_str("No prices available yet\n");
        out.push_str("Run \"refresh\" to fetch the current prices\n");
        return out;
    }

    out.push_str(&render_prices(item));
    if let Some(analysis) = render_analysis(item) {
        out.push('\n');
        out.push_str(&analysis);
    }
    out
}

pub fn render_prices(item: &Item) -> String {
    let mut out = String::from("Current prices\n");
    for quote in &item.prices {
        let best = if is_lowest(&item.prices, quote) { "  BEST PRICE" } else { "" };
        let _ = writeln!(out, "  {:<16} {:>12}{}", quote.store, format_clp(quote.price), best);
        if !quote.url.is_empty() {
            let _ = writeln!(out, "    {}", quote.url);
        }
    }
    out
}

/// The analysis block, shown only with two or more quotes.
pub fn render_analysis(item: &Item) -> Option<String> {
    let savings = savings_percent(&item.prices)?;
    let spread = price_spread(&item.prices)?;
    let savings = match savings {
        SavingsPercent::Value(pct) => format_percent(pct),
        SavingsPercent::Undefined => "n/a".to_string(),
    };
    Some(format!(
        "Price analysis\n  Difference:        {}\n  Potential savings: {}\n",
        format_clp(spread),
        savings
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PriceQuote;
    use chrono::Utc;

    fn priced_item() -> Item {
        let mut item = Item::new("1", "Elden Ring", "PS5");
        item.prices = vec![
            PriceQuote::new("weplay", 45000.0, "https://weplay.cl/elden"),
            PriceQuote::new("zmart", 60000.0, "https://zmart.cl/elden"),
        ];
        item.last_update = Some(Utc::now());
        item
    }

    #[test]
    fn action_label_states() {
        assert_eq!(action_label(true, Some(Duration::from_secs(10))), "Updating...");
        assert_eq!(action_label(false, Some(Duration::from_secs(299))), "Wait 4:59");
        assert_eq!(action_label(false, None), "Update prices");
    }

    #[test]
    fn loading_hides_everything_else() {
        let view = DashboardView { loading: true, banner: Some("x".into()), ..Default::default() };
        assert_eq!(render_dashboard(&view), "Loading games...\n");
    }

    #[test]
    fn cards_show_selection_and_cooldown() {
        let cards = vec![
            CardView {
                id: ItemId::new("1"),
                name: "Elden Ring".into(),
                platform: "PS5".into(),
                selected: true,
                cooldown: Some(Duration::from_secs(125)),
            },
            CardView {
                id: ItemId::new("2"),
                name: "Gran Turismo 7".into(),
                platform: "PS4".into(),
                selected: false,
                cooldown: None,
            },
        ];
        let text = render_cards(&cards);
        assert!(text.contains(" > [1] Elden Ring (PS5)  [cooldown 2:05]"));
        assert!(text.contains("   [2] Gran Turismo 7 (PS4)\n"));
    }

    #[test]
    fn detail_marks_best_price_and_analysis() {
        let text = render_detail(&priced_item(), false, None);
        assert!(text.contains("[ Update prices ]"));
        assert!(text.contains("Last update: "));
        let weplay_line = text.lines().find(|l| l.contains("weplay")).unwrap();
        assert!(weplay_line.contains("$45.000") && weplay_line.ends_with("BEST PRICE"));
        assert!(text.contains("Difference:        $15.000"));
        assert!(text.contains("Potential savings: 25.0%"));
    }

    #[test]
    fn single_quote_has_no_analysis() {
        let mut item = priced_item();
        item.prices.truncate(1);
        assert!(render_analysis(&item).is_none());
        assert!(!render_detail(&item, false, None).contains("Price analysis"));
    }

    #[test]
    fn zero_prices_do_not_render_nan() {
        let mut item = priced_item();
        for quote in &mut item.prices {
            quote.price = 0.0;
        }
        let analysis = render_analysis(&item).unwrap();
        assert!(analysis.contains("Potential savings: n/a"));
        assert!(!analysis.contains("NaN"));
    }

    #[test]
    fn empty_prices_show_hint() {
        let item = Item::new("3", "Astro Bot", "PS5");
        let text = render_detail(&item, false, Some(Duration::from_secs(61)));
        assert!(text.contains("[ Wait 1:01 ]"));
        assert!(text.contains("No prices available yet"));
        assert!(!text.contains("Last update"));
    }

    #[test]
    fn banner_is_rendered_above_cards() {
        let view = DashboardView {
            banner: Some("Error while updating prices".into()),
            ..Default::default()
        };
        let text = render_dashboard(&view);
        let banner_at = text.find("! Error while updating prices").unwrap();
        assert!(banner_at < text.find("Select a game").unwrap());
    }
}
