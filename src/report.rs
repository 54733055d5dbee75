//! Plain-text summary of an analysis run.

use std::fmt;

use crate::analyzer::AnalysisReport;
use crate::changes::{Direction, NumericChange};
use crate::stats::{Metric, StatisticalContext};

const RULE_WIDTH: usize = 50;

/// Render `report` as a multi-section text report.
pub fn render_summary(report: &AnalysisReport) -> String {
    Summary(report).to_string()
}

/// Display adapter over an [`AnalysisReport`].
pub struct Summary<'a>(pub &'a AnalysisReport);

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "↗",
        Direction::Down => "↘",
        Direction::Unchanged => "→",
    }
}

fn days(n: u32) -> String {
    if n == 1 { "1 day".to_string() } else { format!("{n} days") }
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let snap = &report.snapshot;
        let history = report.history.as_ref();
        let changes = history.and_then(|h| h.day_changes());

        writeln!(
            f,
            "VIX Term Structure Summary - {}",
            snap.timestamp.format("%Y-%m-%d %H:%M")
        )?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;

        writeln!(f, "\nMARKET OVERVIEW")?;
        match changes {
            Some(c) => {
                let delta = movement(&c.spot_price, "");
                writeln!(
                    f,
                    "VIX Spot: {:.2}{delta} from {} ago",
                    snap.spot_price,
                    days(c.days_since_previous)
                )?;
                if let Some(prev) = history.and_then(|h| h.previous.as_ref()) {
                    writeln!(f, "Previous VIX: {:.2} on {}", prev.spot_price, prev.date)?;
                }
            }
            None => writeln!(f, "VIX Spot: {:.2}", snap.spot_price)?,
        }
        writeln!(f, "Number of Contracts: {}", snap.num_contracts)?;
        writeln!(f, "Curve Shape: {}", snap.curve_shape)?;
        writeln!(f, "Trading Signal: {}", snap.trading_signal)?;

        if let Some(h) = history {
            writeln!(f, "\nHISTORICAL CONTEXT")?;
            writeln!(f, "{}", h.changes.summary())?;
        }

        let spreads = &snap.spreads;
        writeln!(f, "\nPOINTS ANALYSIS")?;
        writeln!(f, "Spot to Front Month: {:.2} points", spreads.spot_to_front)?;
        writeln!(f, "Front to Second Month: {:.2} points", spreads.front_to_second)?;
        if spreads.spot_to_front > 0.0 {
            writeln!(f, "Status: CONTANGO (+{:.2} pts)", spreads.spot_to_front)?;
        } else if spreads.spot_to_front < 0.0 {
            writeln!(f, "Status: BACKWARDATION ({:.2} pts)", spreads.spot_to_front)?;
        } else {
            writeln!(f, "Status: FLAT")?;
        }

        let carry = &snap.roll_carry;
        writeln!(f, "\nROLL CARRY ANALYSIS")?;
        writeln!(f, "Synthetic 30-Day Index: {:.2}", carry.synthetic_index)?;
        writeln!(f, "Roll Points: {:.4}", carry.roll_points)?;
        write!(f, "Roll Carry: {:.2}%", carry.roll_pct)?;
        if let Some(c) = changes {
            write!(f, "{}", movement(&c.roll_carry, "%"))?;
        }
        writeln!(f)?;

        if let Some(c) = changes.filter(|c| !c.contracts.is_empty()) {
            writeln!(f, "\nCONTRACT CHANGES")?;
            for cc in &c.contracts {
                writeln!(
                    f,
                    "{:<8} {:>7.2} {} {:+6.2} ({:+5.1}%) from {:.2}",
                    cc.symbol,
                    cc.current_price,
                    arrow(cc.change.direction),
                    cc.change.absolute,
                    cc.change.percentage,
                    cc.previous_price
                )?;
            }
        }

        if snap.inversions.is_empty() {
            writeln!(f, "\nINVERSIONS\nNone - Clean term structure")?;
        } else {
            writeln!(f, "\nINVERSIONS DETECTED ({})", snap.inversions.len())?;
            for (i, inv) in snap.inversions.iter().enumerate() {
                writeln!(
                    f,
                    "{}. {} ({:.2}) > {} ({:.2}) by {:.2} pts",
                    i + 1,
                    inv.contract1,
                    inv.price1,
                    inv.contract2,
                    inv.price2,
                    inv.magnitude
                )?;
            }
        }

        if let Some(ctx) = &report.statistical_context {
            write_statistics(f, ctx)?;
        }

        writeln!(f, "\nFUTURES CONTRACTS")?;
        for c in &snap.contracts {
            writeln!(
                f,
                "{:<8} {:>7.2}  ({:>3} days)",
                c.symbol, c.price, c.days_to_expiration
            )?;
        }

        writeln!(f, "\n{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "Generated by vix-term")
    }
}

/// " ↗ +1.23 (+5.1%)", or empty when nothing moved.
fn movement(change: &NumericChange, unit: &str) -> String {
    if change.direction == Direction::Unchanged {
        return String::new();
    }
    if unit.is_empty() {
        format!(
            " {} {:+.2} ({:+.1}%)",
            arrow(change.direction),
            change.absolute,
            change.percentage
        )
    } else {
        format!(
            " {} {:+.2}{unit} from previous",
            arrow(change.direction),
            change.absolute
        )
    }
}

fn write_statistics(f: &mut fmt::Formatter<'_>, ctx: &StatisticalContext) -> fmt::Result {
    let window = &ctx.one_year_stats;
    writeln!(
        f,
        "\nSTATISTICAL CONTEXT ({} samples since {})",
        window.samples, window.start
    )?;
    if window.metrics.is_empty() {
        writeln!(f, "Not enough history for percentile ranks")?;
    }
    for metric in Metric::ALL {
        if let Some(s) = window.metric(metric) {
            writeln!(
                f,
                "{:<16} {:>8.2}  {:>5.1}th pct  z {:+.2}  ({:?})",
                metric.label(),
                s.current,
                s.percentile,
                s.z_score,
                s.regime
            )?;
        }
    }
    for insight in &ctx.insights {
        writeln!(f, "- {insight}")?;
    }
    Ok(())
}
