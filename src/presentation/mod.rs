// src/presentation/mod.rs
//! Derived price figures, formatting and text rendering.

pub mod analysis;
pub mod format;
pub mod render;

pub use analysis::{analyze, is_lowest, lowest_price, price_spread, savings_percent, PriceAnalysis, SavingsPercent};
pub use format::{cooldown_minutes, format_clp, format_countdown, format_percent};
pub use render::{render_dashboard, CardView, DashboardView};
