//! Derived price figures for one item's quote list. Pure functions, no state.

use crate::catalog::PriceQuote;

/// Savings of buying at the lowest price instead of the highest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SavingsPercent {
    Value(f64),
    /// The highest price is zero, so the ratio has no meaning
    Undefined,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceAnalysis {
    pub lowest: Option<PriceQuote>,
    pub spread: Option<f64>,
    pub savings: Option<SavingsPercent>,
}

/// The cheapest quote; the first one wins on ties.
pub fn lowest_price(prices: &[PriceQuote]) -> Option<&PriceQuote> {
    prices.iter().fold(None, |min, quote| match min {
        Some(current) if current.price <= quote.price => Some(current),
        _ => Some(quote),
    })
}

fn max_price(prices: &[PriceQuote]) -> Option<f64> {
    prices.iter().map(|q| q.price).reduce(f64::max)
}

/// Highest minus lowest price; `None` for an empty list, `0.0` for a single quote.
pub fn price_spread(prices: &[PriceQuote]) -> Option<f64> {
    let min = lowest_price(prices)?.price;
    let max = max_price(prices)?;
    Some(max - min)
}

/// Only computed with at least two quotes.
pub fn savings_percent(prices: &[PriceQuote]) -> Option<SavingsPercent> {
    if prices.len() < 2 {
        return None;
    }
    let max = max_price(prices)?;
    let spread = price_spread(prices)?;
    if max <= 0.0 {
        return Some(SavingsPercent::Undefined);
    }
    Some(SavingsPercent::Value(spread / max * 100.0))
}

/// Whether `quote` is the one marked as best price. Matching is by store, so every
/// quote from the cheapest store is highlighted.
pub fn is_lowest(prices: &[PriceQuote], quote: &PriceQuote) -> bool {
    lowest_price(prices).map_or(false, |lowest| lowest.store == quote.store)
}

pub fn analyze(prices: &[PriceQuote]) -> PriceAnalysis {
    PriceAnalysis {
        lowest: lowest_price(prices).cloned(),
        spread: price_spread(prices),
        savings: savings_percent(prices),
    }
}
