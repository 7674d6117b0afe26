/// Digit grouping convention for a currency's home locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// 12,34,567 (en-IN)
    Indian,
    /// 1,234,567
    Thousands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub code: &'static str,
    pub symbol: Option<&'static str>,
    pub grouping: Grouping,
}

const KNOWN: &[CurrencyFormat] = &[
    CurrencyFormat { code: "INR", symbol: Some("₹"), grouping: Grouping::Indian },
    CurrencyFormat { code: "USD", symbol: Some("$"), grouping: Grouping::Thousands },
    CurrencyFormat { code: "EUR", symbol: Some("€"), grouping: Grouping::Thousands },
    CurrencyFormat { code: "GBP", symbol: Some("£"), grouping: Grouping::Thousands },
];

/// Looks up the display rules for an ISO currency code, case-insensitively.
pub fn lookup(code: &str) -> Option<&'static CurrencyFormat> {
    KNOWN.iter().find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}

/// Renders an amount for display. Whole amounts carry no fraction digits;
/// anything else is shown with two.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let minor = (amount.abs() * 100.0).round() as u64;
    let major = minor / 100;
    let cents = minor % 100;

    let (prefix, grouping) = match lookup(currency) {
        Some(fmt) => (fmt.symbol.unwrap_or(fmt.code).to_string(), fmt.grouping),
        None => (format!("{} ", currency.trim().to_uppercase()), Grouping::Thousands),
    };

    let mut out = String::new();
    if amount < 0.0 && minor > 0 {
        out.push('-');
    }
    out.push_str(&prefix);
    out.push_str(&group_digits(major, grouping));
    if cents > 0 {
        out.push_str(&format!(".{:02}", cents));
    }
    out
}

fn group_digits(value: u64, grouping: Grouping) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let step = match grouping {
        Grouping::Indian => 2,
        Grouping::Thousands => 3,
    };

    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(step);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
