use super::types::{Metric, PercentileRankings, WindowStats};

pub const NORMAL_RANGES: &str = "Market metrics within normal historical ranges";

/// Percentile-point gap between the two shortest ranking periods that counts
/// as a trend.
const TREND_DIVERGENCE: f64 = 20.0;

/// Turn window statistics and period rankings into short readable notes.
/// Always returns at least one line.
pub fn generate(stats: &WindowStats, rankings: &PercentileRankings) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(vix) = stats.metric(Metric::SpotPrice) {
        let p = vix.percentile;
        let level = if p >= 90.0 {
            Some("Extremely elevated volatility")
        } else if p >= 75.0 {
            Some("Above normal volatility")
        } else if p <= 10.0 {
            Some("Extremely low volatility")
        } else if p <= 25.0 {
            Some("Below normal volatility")
        } else {
            None
        };
        if let Some(level) = level {
            insights.push(format!("VIX at {p:.0}th percentile (1yr) - {level}"));
        }

        if vix.z_score.abs() >= 2.0 {
            let side = if vix.z_score > 0.0 { "above" } else { "below" };
            insights.push(format!(
                "VIX is {:.1} standard deviations {side} its mean",
                vix.z_score.abs()
            ));
        }
    }

    if let Some(contango) = stats.metric(Metric::ContangoPct) {
        let p = contango.percentile;
        if p >= 85.0 {
            insights.push(format!("Contango at {p:.0}th percentile - Steep carry costs"));
        } else if p <= 15.0 {
            insights.push(format!(
                "Contango at {p:.0}th percentile - Unusual flatness/inversion"
            ));
        }
    }

    if let Some(carry) = stats.metric(Metric::RollCarryPct) {
        let p = carry.percentile;
        if p >= 80.0 {
            insights.push(format!(
                "Roll carry at {p:.0}th percentile - High decay for long vol"
            ));
        } else if p <= 20.0 {
            insights.push(format!("Roll carry at {p:.0}th percentile - Low decay environment"));
        }
    }

    if let Some((short, long, long_days)) = trend_pair(rankings) {
        let history = history_label(long_days);
        if short > long + TREND_DIVERGENCE {
            insights.push(format!("VIX rising vs {history} history - Volatility trending up"));
        } else if short < long - TREND_DIVERGENCE {
            insights.push(format!("VIX falling vs {history} history - Volatility trending down"));
        }
    }

    if insights.is_empty() {
        insights.push(NORMAL_RANGES.to_string());
    }
    insights
}

/// Spot percentiles of the shortest and second-shortest ranked periods,
/// plus the longer one's lookback.
fn trend_pair(rankings: &PercentileRankings) -> Option<(f64, f64, u32)> {
    let mut ranked: Vec<(u32, f64)> = rankings
        .0
        .iter()
        .filter_map(|p| Some((p.lookback_days, p.metrics.get(&Metric::SpotPrice)?.percentile)))
        .collect();
    ranked.sort_by_key(|(days, _)| *days);
    ranked.dedup_by_key(|(days, _)| *days);
    match ranked.as_slice() {
        [(_, short), (long_days, long), ..] => Some((*short, *long, *long_days)),
        _ => None,
    }
}

fn history_label(days: u32) -> String {
    match days {
        30 => "1-month".to_string(),
        90 => "3-month".to_string(),
        252 => "1-year".to_string(),
        n => format!("{n}-day"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::stats::types::{MetricStats, PeriodRanking, RankEntry, Regime};

    fn metric_stats(percentile: f64, z_score: f64) -> MetricStats {
        MetricStats {
            current: 0.0,
            percentile,
            z_score,
            mean: 0.0,
            std: 1.0,
            min: 0.0,
            max: 0.0,
            moving_avg_short: 0.0,
            moving_avg_long: 0.0,
            regime: Regime::Normal,
            count: 30,
        }
    }

    fn window(metrics: &[(Metric, f64, f64)]) -> WindowStats {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        WindowStats {
            lookback_days: 252,
            start: date,
            end: date,
            samples: 30,
            metrics: metrics
                .iter()
                .map(|(m, p, z)| (*m, metric_stats(*p, *z)))
                .collect(),
            curve_shape_distribution: BTreeMap::new(),
        }
    }

    fn ranking(period: &str, days: u32, vix_percentile: f64) -> PeriodRanking {
        PeriodRanking {
            period: period.to_string(),
            lookback_days: days,
            metrics: BTreeMap::from([(
                Metric::SpotPrice,
                RankEntry {
                    percentile: vix_percentile,
                    regime: Regime::Normal,
                },
            )]),
        }
    }

    #[test]
    fn test_default_message_when_nothing_fires() {
        let stats = window(&[(Metric::SpotPrice, 50.0, 0.1)]);
        let insights = generate(&stats, &PercentileRankings::default());
        assert_eq!(insights, vec![NORMAL_RANGES.to_string()]);
    }

    #[test]
    fn test_elevated_vix_and_outlier() {
        let stats = window(&[(Metric::SpotPrice, 95.0, 2.4)]);
        let insights = generate(&stats, &PercentileRankings::default());
        assert_eq!(insights.len(), 2);
        assert!(insights[0].contains("95th percentile"));
        assert!(insights[0].contains("Extremely elevated"));
        assert_eq!(insights[1], "VIX is 2.4 standard deviations above its mean");
    }

    #[test]
    fn test_low_vix_contango_and_carry() {
        let stats = window(&[
            (Metric::SpotPrice, 8.0, -1.0),
            (Metric::ContangoPct, 90.0, 0.0),
            (Metric::RollCarryPct, 15.0, 0.0),
        ]);
        let insights = generate(&stats, &PercentileRankings::default());
        assert!(insights[0].contains("Extremely low volatility"));
        assert!(insights[1].contains("Steep carry costs"));
        assert!(insights[2].contains("Low decay environment"));
    }

    #[test]
    fn test_trend_from_period_divergence() {
        let stats = window(&[(Metric::SpotPrice, 50.0, 0.0)]);
        let up = PercentileRankings(vec![ranking("1_month", 30, 85.0), ranking("3_months", 90, 40.0)]);
        assert_eq!(
            generate(&stats, &up),
            vec!["VIX rising vs 3-month history - Volatility trending up".to_string()]
        );

        let flat = PercentileRankings(vec![ranking("1_month", 30, 55.0), ranking("3_months", 90, 40.0)]);
        assert_eq!(generate(&stats, &flat), vec![NORMAL_RANGES.to_string()]);

        let down = PercentileRankings(vec![ranking("1_month", 30, 10.0), ranking("3_months", 90, 45.0)]);
        assert!(generate(&stats, &down)[0].contains("trending down"));
    }

    #[test]
    fn test_trend_follows_configured_periods() {
        let stats = window(&[(Metric::SpotPrice, 50.0, 0.0)]);
        let rankings = PercentileRankings(vec![
            ranking("63_days", 63, 30.0),
            ranking("21_days", 21, 75.0),
            ranking("1_year", 252, 5.0),
        ]);
        assert_eq!(
            generate(&stats, &rankings),
            vec!["VIX rising vs 63-day history - Volatility trending up".to_string()]
        );

        // A single ranked period gives nothing to compare against.
        let single = PercentileRankings(vec![ranking("21_days", 21, 95.0)]);
        assert_eq!(generate(&stats, &single), vec![NORMAL_RANGES.to_string()]);
    }
}
