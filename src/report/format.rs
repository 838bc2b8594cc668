//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::fit::Metrics;
use crate::forecast::{CostPrediction, UsageForecast};
use crate::inventory::{Bestsellers, InventoryReport, Timeline};

/// Forecast summary: run sizes, metrics, then one line per target.
pub fn format_forecast(forecast: &UsageForecast) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== pantry - Usage forecast for {} ===\n", forecast.month));
    out.push_str(&format!(
        "Rows: train={} | test={} | predictors={}\n",
        forecast.train_rows,
        forecast.test_rows,
        forecast.predictors.len()
    ));
    out.push_str(&format!("{}\n", forecast.note));
    out.push('\n');
    out.push_str(&format_metrics(&forecast.metrics));
    out.push('\n');

    push_line(
        &mut out,
        format!(
            "{:<18} {:>12} {:>12} {:>10} {}",
            "ingredient", "predicted", "actual", "mse", "features"
        ),
    );
    push_line(&mut out, format!("{:-<18} {:-<12} {:-<12} {:-<10} {:-<8}", "", "", "", "", ""));
    for t in &forecast.targets {
        let features = if t.used_mean_fallback() {
            "(training mean)".to_string()
        } else {
            t.selection.features.join(", ")
        };
        push_line(
            &mut out,
            format!(
                "{:<18} {:>12.2} {:>12} {:>10} {}",
                truncate(&t.display_name, 18),
                t.predicted_total,
                fmt_opt(t.actual_total, 2),
                fmt_opt(t.mse, 2),
                features
            ),
        );
    }

    out
}

/// Cost summary: metrics, top ingredients by mean coefficient, worst items.
pub fn format_costs(prediction: &CostPrediction, top_n: usize) -> String {
    let mut out = String::new();

    out.push_str("=== pantry - Item cost prediction (leave-one-item-out) ===\n");
    out.push_str(&format!(
        "Items: {} | excluded: {}\n",
        prediction.items.len(),
        prediction.excluded_items
    ));
    out.push('\n');
    out.push_str(&format_metrics(&prediction.metrics));
    out.push('\n');

    out.push_str("Ingredient importance (mean coefficient across folds):\n");
    push_line(&mut out, format!("{:<18} {:>12} {:>8}", "ingredient", "coefficient", "folds"));
    push_line(&mut out, format!("{:-<18} {:-<12} {:-<8}", "", "", ""));
    for row in prediction.coefficients.iter().take(top_n) {
        push_line(
            &mut out,
            format!(
                "{:<18} {:>12.4} {:>8}",
                truncate(&row.display_name, 18),
                row.mean_coefficient,
                row.selected_in
            ),
        );
    }
    out.push('\n');

    out.push_str("Largest errors:\n");
    push_line(
        &mut out,
        format!("{:<24} {:>10} {:>10} {:>12}", "item", "actual", "predicted", "sq_error"),
    );
    push_line(&mut out, format!("{:-<24} {:-<10} {:-<10} {:-<12}", "", "", "", ""));
    for item in prediction.ranked_by_error().into_iter().take(top_n) {
        push_line(
            &mut out,
            format!(
                "{:<24} {:>10.2} {:>10.2} {:>12.4}",
                truncate(&item.item, 24),
                item.actual,
                item.predicted,
                item.squared_error
            ),
        );
    }

    out
}

/// Usage versus shipments, one line per ingredient.
pub fn format_inventory(report: &InventoryReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== pantry - Inventory for {} ===\n", report.month));
    out.push_str(&format!("Rows in month: {}\n", report.rows_in_month));
    out.push('\n');

    push_line(
        &mut out,
        format!(
            "{:<18} {:<7} {:>10} {:>10} {}",
            "ingredient", "unit", "used", "shipped", "action"
        ),
    );
    push_line(&mut out, format!("{:-<18} {:-<7} {:-<10} {:-<10} {:-<6}", "", "", "", "", ""));
    for row in &report.rows {
        push_line(
            &mut out,
            format!(
                "{:<18} {:<7} {:>10.2} {:>10.2} {}",
                truncate(&row.display_name, 18),
                row.unit,
                row.used,
                row.shipped,
                row.action.map(|a| a.label()).unwrap_or("")
            ),
        );
    }

    out
}

/// Ranked items with their ingredients, then the ingredient frequency table.
pub fn format_bestsellers(top: &Bestsellers) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== pantry - Top {} bestsellers ({}) ===\n", top.items.len(), top.scope_label()));
    out.push('\n');

    push_line(&mut out, format!("{:>4} {:<24} {:>10} {}", "rank", "item", "amount", "ingredients"));
    push_line(&mut out, format!("{:-<4} {:-<24} {:-<10} {:-<11}", "", "", "", ""));
    for (rank, item) in top.items.iter().enumerate() {
        let ingredients = if item.ingredients.is_empty() {
            "-".to_string()
        } else {
            item.ingredients.join(", ")
        };
        push_line(
            &mut out,
            format!(
                "{:>4} {:<24} {:>10.2} {}",
                rank + 1,
                truncate(&item.item, 24),
                item.amount,
                ingredients
            ),
        );
    }
    out.push('\n');

    out.push_str("Ingredient frequency:\n");
    push_line(&mut out, format!("{:<18} {:>6}", "ingredient", "items"));
    push_line(&mut out, format!("{:-<18} {:-<6}", "", ""));
    for f in &top.frequencies {
        push_line(&mut out, format!("{:<18} {:>6}", truncate(&f.ingredient, 18), f.count));
    }

    out
}

/// Used vs shipped per month for one ingredient.
pub fn format_timeline(line: &Timeline) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== pantry - Used vs shipped: {} ===\n", line.ingredient));
    out.push_str(&format!("Columns: {} | unit: {}\n", line.columns.join(", "), line.unit));
    out.push('\n');

    push_line(&mut out, format!("{:<10} {:>10} {:>10}", "month", "used", "shipped"));
    push_line(&mut out, format!("{:-<10} {:-<10} {:-<10}", "", "", ""));
    for p in &line.points {
        push_line(
            &mut out,
            format!("{:<10} {:>10.2} {:>10.2}", p.month.name(), p.used, p.shipped),
        );
    }

    out
}

/// Metrics block; unavailable values print as N/A.
pub fn format_metrics(metrics: &Metrics) -> String {
    format!(
        "Metrics: MSE={} | variance={} | explained variance={}\n",
        fmt_opt(metrics.mse, 4),
        fmt_opt(metrics.variance, 4),
        fmt_opt(metrics.explained_variance, 4)
    )
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(x) => format!("{x:.decimals$}"),
        None => "N/A".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
