//! CSV outputs for a completed run.
//!
//! Everything goes through polars DataFrames so the files match what the
//! loaders read back; `write_premiums_csv` in particular produces exactly
//! the `date, strike, kind, premium` layout that `load_premium_table`
//! expects.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::data::{DailyBar, PremiumTable};
use crate::portfolio::Portfolio;
use crate::strategy::CollarRecord;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn to_f64(value: Decimal) -> f64 {
    value.try_into().unwrap_or(0.0)
}

fn write_df(df: &mut DataFrame, path: &Path) -> Result<(), ReportError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Daily valuation history alongside a buy-and-hold benchmark.
///
/// The benchmark column is the close normalized by the first open, so both
/// it and the NAV column start at 1 and can be charted together.
pub fn write_history_csv(
    portfolio: &Portfolio,
    bars: &[DailyBar],
    path: &Path,
) -> Result<(), ReportError> {
    let days = portfolio.nav_history().len().min(bars.len());
    let bars = &bars[..days];

    let dates: Vec<String> = bars.iter().map(|b| b.date.to_string()).collect();
    let closes: Vec<f64> = bars.iter().map(|b| to_f64(b.close)).collect();
    let base = bars.first().map(|b| to_f64(b.open)).unwrap_or(1.0);
    let benchmark: Vec<f64> = closes.iter().map(|c| c / base).collect();

    let decimals = |history: &[Decimal]| -> Vec<f64> {
        history[..days].iter().map(|v| to_f64(*v)).collect()
    };

    let mut df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("close".into(), closes).into(),
        Series::new("value".into(), decimals(portfolio.value_history())).into(),
        Series::new("nav".into(), decimals(portfolio.nav_history())).into(),
        Series::new(
            "equity_exposure".into(),
            decimals(portfolio.equity_exposure_history()),
        )
        .into(),
        Series::new(
            "cash_exposure".into(),
            decimals(portfolio.cash_exposure_history()),
        )
        .into(),
        Series::new("benchmark".into(), benchmark).into(),
    ])?;
    write_df(&mut df, path)
}

/// Flat trade log, one row per ledger record, in calendar order.
pub fn write_transactions_csv(portfolio: &Portfolio, path: &Path) -> Result<(), ReportError> {
    let mut dates = Vec::new();
    let mut records = Vec::new();
    for date in portfolio.calendar() {
        for record in portfolio.transactions(*date) {
            dates.push(date.to_string());
            records.push(record.clone());
        }
    }

    let mut df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("record".into(), records).into(),
    ])?;
    write_df(&mut df, path)
}

/// Per-day collar legs: strikes, opening net cost, closing net payoff, and
/// the resulting option-leg P&L.
pub fn write_collar_csv(records: &[CollarRecord], path: &Path) -> Result<(), ReportError> {
    let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
    let call_strikes: Vec<f64> = records.iter().map(|r| to_f64(r.call_strike)).collect();
    let put_strikes: Vec<f64> = records.iter().map(|r| to_f64(r.put_strike)).collect();
    let net_costs: Vec<f64> = records.iter().map(|r| to_f64(r.net_cost)).collect();
    let net_payoffs: Vec<f64> = records.iter().map(|r| to_f64(r.net_payoff)).collect();
    let pnls: Vec<f64> = records.iter().map(|r| to_f64(r.pnl())).collect();

    let mut df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("call_strike".into(), call_strikes).into(),
        Series::new("put_strike".into(), put_strikes).into(),
        Series::new("net_cost".into(), net_costs).into(),
        Series::new("net_payoff".into(), net_payoffs).into(),
        Series::new("pnl".into(), pnls).into(),
    ])?;
    write_df(&mut df, path)
}

/// Fetched premiums in the layout `load_premium_table` reads.
pub fn write_premiums_csv(table: &PremiumTable, path: &Path) -> Result<(), ReportError> {
    let mut rows: Vec<_> = table.iter().collect();
    rows.sort_by(|(a, _), (b, _)| {
        (a.date, a.strike, a.kind.as_str()).cmp(&(b.date, b.strike, b.kind.as_str()))
    });

    let dates: Vec<String> = rows.iter().map(|(r, _)| r.date.to_string()).collect();
    let strikes: Vec<f64> = rows.iter().map(|(r, _)| to_f64(r.strike)).collect();
    let kinds: Vec<&str> = rows.iter().map(|(r, _)| r.kind.as_str()).collect();
    let premiums: Vec<f64> = rows.iter().map(|(_, p)| to_f64(*p)).collect();

    let mut df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("strike".into(), strikes).into(),
        Series::new("kind".into(), kinds).into(),
        Series::new("premium".into(), premiums).into(),
    ])?;
    write_df(&mut df, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{load_premium_table, OptionKind, OptionRequest};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_premiums_round_trip_through_loader() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let mut table = PremiumTable::new();
        table.insert(
            OptionRequest {
                date,
                strike: dec!(550),
                kind: OptionKind::Call,
            },
            dec!(0.55),
        );
        table.insert(
            OptionRequest {
                date,
                strike: dec!(548),
                kind: OptionKind::Put,
            },
            dec!(0.50),
        );

        let path = std::env::temp_dir().join("collar_backtest_report_premiums.csv");
        write_premiums_csv(&table, &path).unwrap();

        let loaded = load_premium_table(&path).unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_collar_csv_written() {
        let records = vec![CollarRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            call_strike: dec!(553),
            put_strike: dec!(546),
            net_cost: dec!(0.05),
            net_payoff: dec!(0),
        }];
        let path = std::env::temp_dir().join("collar_backtest_report_collar.csv");
        write_collar_csv(&records, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("date,call_strike,put_strike,net_cost,net_payoff,pnl"));
        assert!(contents.contains("2024-06-20"));
    }
}
