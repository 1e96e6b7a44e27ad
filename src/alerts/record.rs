use serde::Deserialize;
use serde_json::Value;

/// Row of an exported alert file
#[derive(Deserialize, Debug, Clone)]
pub struct ImportRecord {
    pub exch_code: String,
    pub mkt_name: String,
    pub price: Price,
    /// Only the string `>` is meaningful; any other value, or none, means below
    #[serde(default)]
    pub operator: Value,
}

/// Exports write the price either as a number or as a string starting with one
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl Price {
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Price::Number(value) => *value,
            Price::Text(text) => leading_number(text)?,
        };

        value.is_finite().then_some(value)
    }
}

/// Longest numeric prefix of `text`, so `"6500 USD"` reads as 6500
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();

    text.char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| text[..end].parse().ok())
}
