// src/models.rs
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use regex::Regex;

/// Funds refreshed when `FII_TICKERS` is not set, in batch order.
pub const DEFAULT_TICKERS: [&str; 17] = [
    "HGRU11", "HSML11", "BRCO11", "LVBI11", "PVBI11", "HGLG11", "TRXF11", "BTLG11", "XPML11",
    "HGCR11", "KNCR11", "MXRF11", "VRTA11", "RECR11", "CPTS11", "VGHF11", "TGAR11",
];

pub const VALUE_HEADER: &str = "VALOR";
pub const EX_DATE_HEADER: &str = "DATA COM";
pub const PAYMENT_DATE_HEADERS: [&str; 2] = ["PAGAMENTO", "DATA PAGAMENTO"];

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]+$").expect("ticker pattern is valid"))
}

/// Uppercase alphanumeric fund identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Trims and uppercases `raw`; rejects anything that is not `[A-Z0-9]+`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let code = raw.trim().to_uppercase();
        if ticker_pattern().is_match(&code) {
            Ok(Ticker(code))
        } else {
            Err(format!("Invalid ticker: '{}'", raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn default_tickers() -> Vec<Ticker> {
    DEFAULT_TICKERS.iter().map(|code| Ticker(code.to_string())).collect()
}

/// One table body row keyed by column header.
pub type RawRow = BTreeMap<String, String>;

/// Most recent distribution for a fund, keyed by the source's column headers.
///
/// Serializes as a flat JSON object (`{"VALOR": "0.85", "DATA COM": ...}`),
/// which is the format stored in the cache and read back by the API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DividendRecord {
    fields: BTreeMap<String, String>,
}

impl DividendRecord {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        DividendRecord { fields }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(String::as_str)
    }

    pub fn value(&self) -> Option<&str> {
        self.get(VALUE_HEADER)
    }

    pub fn ex_date(&self) -> Option<&str> {
        self.get(EX_DATE_HEADER)
    }

    pub fn payment_date(&self) -> Option<&str> {
        PAYMENT_DATE_HEADERS.iter().find_map(|header| self.get(header))
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field of a cached record exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividendField {
    Value,
    ExDate,
    PaymentDate,
}

impl DividendField {
    pub fn read<'a>(&self, record: &'a DividendRecord) -> Option<&'a str> {
        match self {
            DividendField::Value => record.value(),
            DividendField::ExDate => record.ex_date(),
            DividendField::PaymentDate => record.payment_date(),
        }
    }
}

impl fmt::Display for DividendField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DividendField::Value => "value",
            DividendField::ExDate => "ex-date",
            DividendField::PaymentDate => "payment date",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_is_trimmed_and_uppercased() {
        let ticker = Ticker::parse(" mxrf11 ").unwrap();
        assert_eq!(ticker.as_str(), "MXRF11");
    }

    #[test]
    fn ticker_rejects_non_alphanumeric() {
        assert!(Ticker::parse("").is_err());
        assert!(Ticker::parse("HGLG-11").is_err());
        assert!(Ticker::parse("../etc").is_err());
    }

    #[test]
    fn default_list_keeps_batch_order() {
        let tickers = default_tickers();
        assert_eq!(tickers.len(), 17);
        assert_eq!(tickers[0].as_str(), "HGRU11");
        assert_eq!(tickers[16].as_str(), "TGAR11");
    }

    #[test]
    fn payment_date_accepts_either_header() {
        let mut fields = BTreeMap::new();
        fields.insert("PAGAMENTO".to_string(), "15/02/2024".to_string());
        assert_eq!(DividendRecord::new(fields).payment_date(), Some("15/02/2024"));

        let mut fields = BTreeMap::new();
        fields.insert("DATA PAGAMENTO".to_string(), "20/01/2024".to_string());
        assert_eq!(DividendRecord::new(fields).payment_date(), Some("20/01/2024"));
    }

    #[test]
    fn record_serializes_as_flat_object() {
        let mut fields = BTreeMap::new();
        fields.insert("VALOR".to_string(), "0.85".to_string());
        fields.insert("DATA COM".to_string(), "10/01/2024".to_string());
        let json = serde_json::to_string(&DividendRecord::new(fields)).unwrap();
        assert_eq!(json, r#"{"DATA COM":"10/01/2024","VALOR":"0.85"}"#);
    }
}
