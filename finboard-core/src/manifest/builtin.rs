//! Built-in manifest for the company browser table.

use super::{
    Alignment, ColumnDefinition, ColumnGroup, ColumnManifest, DataType, FormatKind, PresetView,
    DEFAULT_VIEW_ID,
};

const VERSION: &str = "1.2.0";
const LAST_UPDATED: &str = "2024-06-01";

fn text(id: &str, name: &str, group: &str) -> ColumnDefinition {
    ColumnDefinition::new(id, name, group, DataType::String)
}

fn num(id: &str, name: &str, group: &str, format: FormatKind) -> ColumnDefinition {
    ColumnDefinition::new(id, name, group, DataType::Number).format(format)
}

impl ColumnManifest {
    /// The company-browser manifest shipped with the dashboard.
    pub fn builtin() -> Self {
        let groups = vec![
            ColumnGroup::new("identity", "Company"),
            ColumnGroup::new("price", "Price & Volume"),
            ColumnGroup::new("valuation", "Valuation"),
            ColumnGroup::new("fundamentals", "Fundamentals"),
            ColumnGroup::new("growth", "Growth").collapsed(),
            ColumnGroup::new("dividends", "Dividends").collapsed(),
        ];

        let columns = vec![
            text("ticker", "Ticker", "identity").pinned(),
            text("name", "Company Name", "identity").pinnable().visible(),
            text("sector", "Sector", "identity").visible(),
            text("industry", "Industry", "identity"),
            text("exchange", "Exchange", "identity").align(Alignment::Center),
            num("price_close", "Price Close", "price", FormatKind::Currency)
                .decimals(2)
                .pinnable()
                .visible()
                .field("close"),
            num("price_change_pct", "Price Change %", "price", FormatKind::Percent)
                .decimals(2)
                .visible()
                .field("change_pct"),
            num("volume", "Volume", "price", FormatKind::LargeNumber).decimals(1),
            num("avg_volume", "Avg Volume (30d)", "price", FormatKind::LargeNumber)
                .decimals(1)
                .field("avg_volume_30d"),
            num("market_cap", "Market Cap", "valuation", FormatKind::LargeNumber)
                .decimals(2)
                .pinnable()
                .visible(),
            num("pe_ratio", "P/E Ratio", "valuation", FormatKind::Number)
                .decimals(1)
                .max_display(999.0)
                .visible(),
            num("pb_ratio", "P/B Ratio", "valuation", FormatKind::Number)
                .decimals(2)
                .max_display(999.0),
            num("ev_ebitda", "EV/EBITDA", "valuation", FormatKind::Number)
                .decimals(1)
                .max_display(999.0),
            num("revenue", "Revenue (TTM)", "fundamentals", FormatKind::LargeNumber)
                .decimals(2)
                .field("revenue_ttm"),
            num("net_income", "Net Income (TTM)", "fundamentals", FormatKind::LargeNumber)
                .decimals(2)
                .field("net_income_ttm"),
            num("gross_margin", "Gross Margin", "fundamentals", FormatKind::Percent).decimals(1),
            num("roe", "Return on Equity", "fundamentals", FormatKind::Percent)
                .decimals(1)
                .max_display(1000.0),
            num("debt_to_equity", "Debt/Equity", "fundamentals", FormatKind::Number)
                .decimals(2)
                .max_display(100.0),
            num("revenue_growth", "Revenue Growth (YoY)", "growth", FormatKind::Percent)
                .decimals(1)
                .max_display(1000.0),
            num("eps_growth", "EPS Growth (YoY)", "growth", FormatKind::Percent)
                .decimals(1)
                .max_display(1000.0),
            num("dividend_yield", "Dividend Yield", "dividends", FormatKind::Percent).decimals(2),
            num("payout_ratio", "Payout Ratio", "dividends", FormatKind::Percent)
                .decimals(1)
                .max_display(500.0),
            ColumnDefinition::new("ex_dividend_date", "Ex-Dividend Date", "dividends", DataType::Date),
            ColumnDefinition::new("fiscal_year_end", "Fiscal Year End", "fundamentals", DataType::Date),
        ];

        let presets = vec![
            PresetView::new(
                DEFAULT_VIEW_ID,
                "Overview",
                [
                    "ticker",
                    "name",
                    "sector",
                    "price_close",
                    "price_change_pct",
                    "market_cap",
                    "pe_ratio",
                ],
                ["ticker"],
            )
            .describe("Identity, last price and headline valuation"),
            PresetView::new(
                "valuation",
                "Valuation",
                [
                    "ticker",
                    "name",
                    "market_cap",
                    "pe_ratio",
                    "pb_ratio",
                    "ev_ebitda",
                ],
                ["ticker", "name"],
            ),
            PresetView::new(
                "fundamentals",
                "Fundamentals",
                [
                    "ticker",
                    "revenue",
                    "net_income",
                    "gross_margin",
                    "roe",
                    "debt_to_equity",
                    "fiscal_year_end",
                ],
                ["ticker"],
            ),
            PresetView::new(
                "income",
                "Income",
                [
                    "ticker",
                    "name",
                    "price_close",
                    "dividend_yield",
                    "payout_ratio",
                    "ex_dividend_date",
                ],
                ["ticker"],
            )
            .describe("Dividend payers"),
        ];

        Self {
            version: VERSION.into(),
            last_updated: LAST_UPDATED.into(),
            groups,
            columns,
            presets,
        }
    }
}
