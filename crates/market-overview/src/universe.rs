//! The fixed symbol lists the market overview is computed over.

/// Major indices shown on the overview header, as `(symbol, name)`.
pub const MAJOR_INDICES: [(&str, &str); 6] = [
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones"),
    ("^IXIC", "NASDAQ"),
    ("^RUT", "Russell 2000"),
    ("^FTSE", "FTSE 100"),
    ("^N225", "Nikkei 225"),
];

/// The US indices plotted against each other on the comparison chart.
pub const COMPARISON_INDICES: [(&str, &str); 4] = [
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones"),
    ("^IXIC", "NASDAQ"),
    ("^RUT", "Russell 2000"),
];

/// Sector ETFs, as `(symbol, sector)`.
pub const SECTOR_ETFS: [(&str, &str); 11] = [
    ("XLF", "Financials"),
    ("XLK", "Technology"),
    ("XLV", "Healthcare"),
    ("XLE", "Energy"),
    ("XLI", "Industrials"),
    ("XLY", "Consumer Discretionary"),
    ("XLP", "Consumer Staples"),
    ("XLB", "Materials"),
    ("XLU", "Utilities"),
    ("XLRE", "Real Estate"),
    ("XLC", "Communication Services"),
];

/// Large caps scanned for the day's gainers and losers.
pub const MOVER_UNIVERSE: [&str; 40] = [
    // Tech
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "NVDA", "TSLA", "INTC", "AMD", "CRM",
    // Finance
    "JPM", "BAC", "WFC", "C", "GS", "MS", "AXP", "V", "MA", "PYPL",
    // Healthcare
    "JNJ", "PFE", "UNH", "ABBV", "MRK", "LLY", "AMGN", "BMY", "TMO", "ABT",
    // Consumer
    "PG", "KO", "PEP", "WMT", "HD", "MCD", "NKE", "SBUX", "DIS", "NFLX",
];

/// Heatmap constituents grouped by sector.
pub const HEATMAP_SECTORS: [(&str, [&str; 10]); 10] = [
    ("Technology", ["AAPL", "MSFT", "NVDA", "INTC", "AMD", "ADBE", "ORCL", "CRM", "IBM", "CSCO"]),
    ("Communication", ["GOOGL", "META", "NFLX", "DIS", "VZ", "CMCSA", "T", "TMUS", "EA", "ATVI"]),
    ("Consumer Discretionary", ["AMZN", "TSLA", "HD", "MCD", "NKE", "SBUX", "LOW", "TGT", "BKNG", "MAR"]),
    ("Consumer Staples", ["PG", "KO", "PEP", "WMT", "COST", "PM", "MO", "EL", "CL", "GIS"]),
    ("Healthcare", ["JNJ", "UNH", "PFE", "ABBV", "MRK", "LLY", "BMY", "AMGN", "TMO", "ABT"]),
    ("Financials", ["JPM", "BAC", "WFC", "C", "GS", "MS", "AXP", "V", "MA", "BLK"]),
    ("Industrials", ["HON", "UPS", "BA", "CAT", "GE", "MMM", "LMT", "RTX", "UNP", "FDX"]),
    ("Energy", ["XOM", "CVX", "COP", "EOG", "SLB", "PSX", "VLO", "OXY", "MPC", "KMI"]),
    ("Utilities", ["NEE", "DUK", "SO", "D", "AEP", "EXC", "SRE", "PCG", "XEL", "ED"]),
    ("Real Estate", ["AMT", "PLD", "CCI", "PSA", "EQIX", "O", "DLR", "WELL", "SPG", "AVB"]),
];

/// Number of entries on each side of the movers board.
pub const MOVERS_PER_SIDE: usize = 5;

/// Converts a `(symbol, name)` table into owned symbols for a batch fetch.
pub fn symbols_of(table: &[(&str, &str)]) -> Vec<String> {
    table.iter().map(|(symbol, _)| symbol.to_string()).collect()
}
