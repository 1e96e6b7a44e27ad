use serde::Serialize;

/// Alert as accepted by the bulk endpoint
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Alert {
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub market: String,
    pub direction: Direction,
    pub sms: bool,
    pub email: bool,
    pub kill: bool,
    pub expires: Option<u64>,
    pub cooldown: Option<u64>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    LastPrice,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    /// `>` triggers above the price, anything else below it
    pub fn from_operator(operator: Option<&str>) -> Self {
        match operator {
            Some(">") => Direction::Above,
            _ => Direction::Below,
        }
    }
}

/// Settings applied to every alert of one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertDefaults {
    pub expires: Option<u64>,
    pub cooldown: Option<u64>,
    pub kill: bool,
    pub sms: bool,
    pub email: bool,
}
