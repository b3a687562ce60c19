// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of ElCalc.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Output formatters for CLI results.

use std::fmt::Write;

use comfy_table::{Attribute, Cell, Color, Table, presets::UTF8_FULL};
use elcalc_core::{CheapestWindow, Interval, PriceSeries, PriceStats, SavingsOutcome, Timestamp};
use serde_json::json;

/// Everything one recalculation produced
#[derive(Debug)]
pub struct Report<'a> {
    pub now: Timestamp,
    pub series: &'a PriceSeries,
    pub window: &'a CheapestWindow,
    pub savings: &'a SavingsOutcome,
    pub spend: &'a [Interval],
}

impl Report<'_> {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "now": self.now,
            "prices": {
                "today": self.series.stats_today(),
                "tomorrow": self.series.stats_tomorrow(),
            },
            "window": self.window,
            "savings": {
                "intervals": self.savings.intervals,
                "continuity_budget": self.savings.continuity_budget,
                "longest_off_minutes": self.savings.longest_off.num_minutes(),
                "turn_on_at": self.savings.turn_on_at,
            },
            "spend": self.spend,
        })
    }
}

/// Formatter for pretty tables
#[derive(Debug)]
pub struct TableFormatter;

impl TableFormatter {
    pub fn format_report(report: &Report<'_>) -> String {
        let mut output = String::new();

        output.push_str(&Self::format_prices(report.series));
        output.push('\n');

        let _ = writeln!(output, "Calculated at {}", format_time(report.now));
        output.push_str(&Self::format_window(report.window));

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Action").add_attribute(Attribute::Bold),
            Cell::new("Start").add_attribute(Attribute::Bold),
            Cell::new("End").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
            Cell::new("Avg Price").add_attribute(Attribute::Bold),
        ]);

        let mut rows: Vec<(&Interval, bool)> = report
            .savings
            .intervals
            .iter()
            .map(|iv| (iv, true))
            .chain(report.spend.iter().map(|iv| (iv, false)))
            .collect();
        rows.sort_by_key(|(iv, _)| iv.start);

        for (interval, off) in rows {
            let action = if off {
                Cell::new("Turn off").fg(Color::Red)
            } else {
                Cell::new("Turn on").fg(Color::Green)
            };

            table.add_row(vec![
                action,
                Cell::new(format_time(interval.start)),
                Cell::new(format_time(interval.end)),
                Cell::new(format!("{} min", interval.duration.num_minutes())),
                Cell::new(
                    average_price(report.series, interval)
                        .map_or_else(|| "-".to_owned(), |p| format!("{p:.3}")),
                ),
            ]);
        }

        output.push_str(&table.to_string());
        output.push('\n');

        let _ = writeln!(
            output,
            "Continuity budget: {:.0} h | Longest off: {} min | Turn on at: {}",
            report.savings.continuity_budget,
            report.savings.longest_off.num_minutes(),
            report
                .savings
                .turn_on_at
                .map_or_else(|| "-".to_owned(), format_time),
        );

        output
    }

    fn format_prices(series: &PriceSeries) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec![
            Cell::new("Day").add_attribute(Attribute::Bold),
            Cell::new("Points").add_attribute(Attribute::Bold),
            Cell::new("Min").add_attribute(Attribute::Bold),
            Cell::new("Avg").add_attribute(Attribute::Bold),
            Cell::new("Median").add_attribute(Attribute::Bold),
            Cell::new("Max").add_attribute(Attribute::Bold),
        ]);

        let days = [
            ("Today", series.today().len(), series.stats_today()),
            ("Tomorrow", series.tomorrow().len(), series.stats_tomorrow()),
        ];

        for (name, count, stats) in days {
            let mut row = vec![Cell::new(name), Cell::new(count)];
            match stats {
                Some(PriceStats {
                    min,
                    max,
                    avg,
                    median,
                }) => row.extend(
                    [min, avg, median, max]
                        .into_iter()
                        .map(|v| Cell::new(format!("{v:.3}"))),
                ),
                None => row.extend((0..4).map(|_| Cell::new("-"))),
            }
            table.add_row(row);
        }

        table.to_string()
    }

    fn format_window(window: &CheapestWindow) -> String {
        match window {
            CheapestWindow::Window(w) => format!(
                "Cheapest window: {} - {} (avg {:.3}), start {} / run until {}\n",
                format_time(w.start),
                format_time(w.final_end),
                w.avg_price,
                format_time(w.adjusted_start),
                format_time(w.estimated_end),
            ),
            CheapestWindow::Estimate { avg_price } => {
                format!("Cheapest window: waiting for tomorrow's prices (expected avg {avg_price:.3})\n")
            }
            CheapestWindow::Unavailable => "Cheapest window: no prices left\n".to_owned(),
        }
    }
}

fn format_time(instant: Timestamp) -> String {
    instant.format("%a %d.%m %H:%M").to_string()
}

fn average_price(series: &PriceSeries, interval: &Interval) -> Option<f64> {
    let values: Vec<f64> = series
        .points()
        .iter()
        .filter(|p| interval.contains(p.start))
        .map(|p| p.value)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
