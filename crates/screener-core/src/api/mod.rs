//! API client for the Alpha Vantage data provider

pub mod alpha_vantage;

pub use alpha_vantage::{
    AlphaVantageClient, AnnualEarning, Earnings, EarningsEstimates, EstimateEntry, IncomeReport,
    IncomeStatement, MonthlyAdjusted, MonthlyBar, QuarterlyEarning,
};
