//! ASCII plotting for terminal output.
//!
//! A fixed-width paired bar chart, optimized for:
//! - quick visual comparison of two series in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - first series: `#` bar
//! - second series: `=` bar

use crate::forecast::{CostPrediction, UsageForecast};
use crate::inventory::{Bestsellers, Timeline};

/// One labelled pair of bars; an absent value draws no bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPair {
    pub label: String,
    pub first: Option<f64>,
    pub second: Option<f64>,
}

/// Series names shown in the chart header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Legend {
    pub first: &'static str,
    pub second: &'static str,
}

pub const ACTUAL_VS_PREDICTED: Legend = Legend {
    first: "actual",
    second: "predicted",
};

pub const USED_VS_SHIPPED: Legend = Legend {
    first: "used",
    second: "shipped",
};

pub const SALES: Legend = Legend {
    first: "amount",
    second: "",
};

const MAX_LABEL: usize = 16;

/// Predicted vs recorded monthly totals per ingredient.
pub fn forecast_bars(forecast: &UsageForecast) -> Vec<BarPair> {
    forecast
        .targets
        .iter()
        .map(|t| BarPair {
            label: t.display_name.clone(),
            first: t.actual_total,
            second: Some(t.predicted_total),
        })
        .collect()
}

/// Held-out predicted vs actual cost per item.
pub fn cost_bars(prediction: &CostPrediction) -> Vec<BarPair> {
    prediction
        .items
        .iter()
        .map(|i| BarPair {
            label: i.item.clone(),
            first: Some(i.actual),
            second: Some(i.predicted),
        })
        .collect()
}

/// Sales amount per bestseller, in rank order.
pub fn bestseller_bars(top: &Bestsellers) -> Vec<BarPair> {
    top.items
        .iter()
        .map(|b| BarPair {
            label: b.item.clone(),
            first: Some(b.amount),
            second: None,
        })
        .collect()
}

/// Used vs shipped per month.
pub fn timeline_bars(line: &Timeline) -> Vec<BarPair> {
    line.points
        .iter()
        .map(|p| BarPair {
            label: p.month.to_string(),
            first: Some(p.used),
            second: Some(p.shipped),
        })
        .collect()
}

/// Render bars scaled so the largest value spans `width` characters.
pub fn render_bar_chart(title: &str, legend: Legend, bars: &[BarPair], width: usize) -> String {
    let width = width.max(10);
    let max = bars
        .iter()
        .flat_map(|b| b.first.into_iter().chain(b.second))
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let label_width = bars
        .iter()
        .map(|b| b.label.chars().count().min(MAX_LABEL))
        .max()
        .unwrap_or(0);

    let mut keys = Vec::new();
    if bars.iter().any(|b| b.first.is_some()) {
        keys.push(format!("# {}", legend.first));
    }
    if bars.iter().any(|b| b.second.is_some()) {
        keys.push(format!("= {}", legend.second));
    }

    let mut out = String::new();
    out.push_str(&format!("Plot: {title} | max={max:.2} | {}\n", keys.join(", ")));

    for b in bars {
        let label = clip_label(&b.label);
        let mut label_used = false;
        if let Some(first) = b.first {
            push_bar(&mut out, &label, label_width, '#', first, max, width);
            label_used = true;
        }
        if let Some(second) = b.second {
            let label = if label_used { "" } else { label.as_str() };
            push_bar(&mut out, label, label_width, '=', second, max, width);
        }
    }

    out
}

fn push_bar(out: &mut String, label: &str, label_width: usize, ch: char, value: f64, max: f64, width: usize) {
    let len = bar_len(value, max, width);
    out.push_str(&format!(
        "{label:<label_width$} |{} {value:.2}\n",
        ch.to_string().repeat(len)
    ));
}

fn bar_len(value: f64, max: f64, width: usize) -> usize {
    if !(value.is_finite() && max > 0.0) || value <= 0.0 {
        return 0;
    }
    ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize
}

fn clip_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL {
        return label.to_string();
    }
    let mut out: String = label.chars().take(MAX_LABEL - 1).collect();
    out.push('.');
    out
}
