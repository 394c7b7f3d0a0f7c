//! Cell values and their text rendering per column definition.

use std::fmt;

use chrono::NaiveDate;

use crate::manifest::{ColumnDefinition, FormatKind};

/// Placeholder rendered for missing values.
pub const MISSING: &str = "-";

const DEFAULT_DECIMALS: u8 = 2;

/// A typed cell read from a data row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Missing => write!(f, "{MISSING}"),
        }
    }
}

/// Render a cell the way the column asks for it.
pub fn format_cell(column: &ColumnDefinition, value: &CellValue) -> String {
    match value {
        CellValue::Missing => MISSING.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        CellValue::Number(n) if !n.is_finite() => MISSING.to_string(),
        CellValue::Number(n) => format_number_cell(column, *n),
    }
}

fn format_number_cell(column: &ColumnDefinition, value: f64) -> String {
    if let Some(max) = column.max_display {
        if value.abs() > max {
            let bound = format_bound(max);
            return if value < 0.0 {
                format!("<-{bound}")
            } else {
                format!(">{bound}")
            };
        }
    }

    let decimals = column.decimals.unwrap_or(DEFAULT_DECIMALS) as usize;
    match column.format {
        FormatKind::Currency => {
            let body = group_thousands(value.abs(), decimals);
            if value < 0.0 {
                format!("-${body}")
            } else {
                format!("${body}")
            }
        }
        FormatKind::Percent => format!("{}%", signed(value, decimals)),
        FormatKind::LargeNumber => format_large(value, decimals),
        FormatKind::Number | FormatKind::Text | FormatKind::Date => signed(value, decimals),
    }
}

fn format_large(value: f64, decimals: usize) -> String {
    const SCALES: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

    let abs = value.abs();
    let Some(mut idx) = SCALES.iter().rposition(|(scale, _)| abs >= *scale) else {
        return signed(value, decimals);
    };
    let mut mantissa = format!("{:.*}", decimals, abs / SCALES[idx].0);
    // 999_990 at one decimal is 1.0M, not 1000.0K.
    while idx + 1 < SCALES.len() && mantissa.parse::<f64>().is_ok_and(|m| m >= 1000.0) {
        idx += 1;
        mantissa = format!("{:.*}", decimals, abs / SCALES[idx].0);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{mantissa}{}", SCALES[idx].1)
}

fn format_bound(max: f64) -> String {
    if max.fract() == 0.0 {
        group_thousands(max, 0)
    } else {
        group_thousands(max, DEFAULT_DECIMALS as usize)
    }
}

fn signed(value: f64, decimals: usize) -> String {
    let body = group_thousands(value.abs(), decimals);
    // Avoid "-0.00" after rounding.
    if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{body}")
    } else {
        body
    }
}

/// Fixed decimals with `,` thousands separators. Expects a non-negative value.
fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}
