use crate::{
    alerts::{
        AlertsApi,
        model::{Alert, AlertDefaults, AlertType, Direction},
        record::ImportRecord,
    },
    error::ImportError,
    exchanges::ExchangeTable,
    host::{Host, Severity},
    metrics::{
        Status,
        import::{self, SkipReason},
    },
};
use serde_json::Value;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

/// Most alerts accepted from a single file
pub const MAX_ALERTS: usize = 1000;

pub const ALLOWED_EXTENSIONS: [&str; 2] = ["txt", "json"];

/// Alerts mapped from one file, ready to submit
#[derive(Debug, Clone)]
pub struct Batch {
    /// Rows found in the file
    pub total: usize,
    /// Rows kept after truncation
    pub considered: usize,
    pub alerts: Vec<Alert>,
}

impl Batch {
    pub fn skipped(&self) -> usize {
        self.considered - self.alerts.len()
    }

    pub fn truncated(&self) -> usize {
        self.total - self.considered
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub file: PathBuf,
    pub total: usize,
    pub considered: usize,
    pub submitted: usize,
    pub skipped: usize,
}

pub struct Importer<H: Host> {
    host: H,
    exchanges: ExchangeTable,
    api: AlertsApi,
}

impl<H: Host> Importer<H> {
    pub fn new(host: H, exchanges: ExchangeTable, api: AlertsApi) -> Self {
        Self {
            host,
            exchanges,
            api,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Import every selected file in turn; one failing file does not stop the rest
    pub async fn open(&self, paths: &[PathBuf]) -> Vec<Result<ImportSummary, ImportError>> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            results.push(self.convert(path).await);
        }

        results
    }

    /// Import a single file and report the outcome to the host
    #[tracing::instrument(skip(self))]
    pub async fn convert(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        let result = self.import(path).await;

        match &result {
            Ok(summary) => {
                import::record_import_file(Status::Success);
                import::record_alerts_imported(summary.submitted);
                import::record_successful_import();

                self.host.log(
                    Severity::Success,
                    &format!(
                        "Successfully imported {} alerts from \"{}\".",
                        summary.submitted,
                        path.display()
                    ),
                    None,
                );
            }
            Err(e) => {
                import::record_import_file(Status::Failure);

                let message = if e.is_transport() {
                    format!("Failed to create alerts from \"{}\".", path.display())
                } else {
                    format!("Could not import alerts from \"{}\".", path.display())
                };

                self.host
                    .log(Severity::Error, &message, Some(&e.to_string()));
            }
        }

        result
    }

    async fn import(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        let batch = self.prepare(path)?;

        if batch.alerts.is_empty() {
            self.host.log(
                Severity::Warn,
                &format!("No alerts to import from \"{}\".", path.display()),
                Some("None of the records matched a known market."),
            );
        }

        let token = self.host.current_token().ok_or(ImportError::MissingToken)?;
        self.api.bulk_create(&token, &batch.alerts).await?;

        Ok(ImportSummary {
            file: path.to_path_buf(),
            total: batch.total,
            considered: batch.considered,
            submitted: batch.alerts.len(),
            skipped: batch.skipped(),
        })
    }

    /// Write the alerts each file would produce as JSON; returns the number of failed files
    pub fn dry_run<W: Write>(&self, paths: &[PathBuf], out: &mut W) -> usize {
        let mut failed = 0;

        for path in paths {
            let batch = match self.prepare(path) {
                Ok(batch) => batch,
                Err(e) => {
                    failed += 1;
                    self.host.log(
                        Severity::Error,
                        &format!("Could not import alerts from \"{}\".", path.display()),
                        Some(&e.to_string()),
                    );
                    continue;
                }
            };

            tracing::info!(
                "Would import {} of {} alerts from \"{}\"",
                batch.alerts.len(),
                batch.total,
                path.display()
            );

            if let Err(e) = serde_json::to_writer_pretty(&mut *out, &batch.alerts)
                .map_err(std::io::Error::from)
                .and_then(|_| writeln!(out))
            {
                failed += 1;
                tracing::error!("Failed to write alerts: {}", e);
            }
        }

        failed
    }

    /// Read, validate and map a file without submitting anything
    pub fn prepare(&self, path: &Path) -> Result<Batch, ImportError> {
        check_extension(path)?;

        let contents = std::fs::read(path)?;
        let mut rows = parse_rows(&contents)?;
        let total = rows.len();

        self.host.log(
            Severity::Info,
            &format!("Preparing to import {} alerts.", total),
            None,
        );

        if total > MAX_ALERTS {
            import::record_alerts_truncated(total - MAX_ALERTS);
            self.host.log(
                Severity::Warn,
                "Alerts import truncated.",
                Some(&format!(
                    "Only the first {} of your {} alerts have been imported at the current time.",
                    MAX_ALERTS, total
                )),
            );

            rows.truncate(MAX_ALERTS);
        }

        let defaults = AlertDefaults::from_host(&self.host);
        let considered = rows.len();
        let alerts = rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| self.map_row(index, row, &defaults))
            .collect();

        Ok(Batch {
            total,
            considered,
            alerts,
        })
    }

    fn map_row(&self, index: usize, row: Value, defaults: &AlertDefaults) -> Option<Alert> {
        match serde_json::from_value::<ImportRecord>(row) {
            Ok(record) => self.create(&record, defaults),
            Err(e) => {
                import::record_alert_skipped(SkipReason::InvalidRecord);
                self.host.log(
                    Severity::Info,
                    &format!("Could not read alert at position {}.", index + 1),
                    Some(&e.to_string()),
                );

                None
            }
        }
    }

    /// Map one exported record onto an alert, or `None` if it has no known market
    pub fn create(&self, record: &ImportRecord, defaults: &AlertDefaults) -> Option<Alert> {
        let market = self
            .exchanges
            .market_id(&record.exch_code, &record.mkt_name)
            .filter(|id| self.host.lookup_market(id));

        let Some(market) = market else {
            import::record_alert_skipped(SkipReason::MarketNotFound);
            self.host.log(
                Severity::Info,
                &format!(
                    "Could not find market {} on {}.",
                    record.mkt_name, record.exch_code
                ),
                None,
            );

            return None;
        };

        let Some(value) = record.price.value() else {
            import::record_alert_skipped(SkipReason::InvalidRecord);
            self.host.log(
                Severity::Info,
                &format!(
                    "Could not read the price of {} on {}.",
                    record.mkt_name, record.exch_code
                ),
                None,
            );

            return None;
        };

        Some(Alert {
            value,
            kind: AlertType::LastPrice,
            market,
            direction: Direction::from_operator(record.operator.as_str()),
            sms: defaults.sms,
            email: defaults.email,
            kill: defaults.kill,
            expires: defaults.expires,
            cooldown: defaults.cooldown,
        })
    }
}

/// Only plaintext and JSON exports are accepted
pub fn check_extension(path: &Path) -> Result<(), ImportError> {
    let allowed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));

    if allowed {
        Ok(())
    } else {
        Err(ImportError::UnsupportedExtension)
    }
}

/// Extract the `aaData` rows of an export
pub fn parse_rows(contents: &[u8]) -> Result<Vec<Value>, ImportError> {
    let mut document: Value = serde_json::from_slice(contents)?;

    match document.get_mut("aaData").map(Value::take) {
        Some(Value::Array(rows)) => Ok(rows),
        _ => Err(ImportError::InvalidStructure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::{
        cell::RefCell,
        collections::{HashMap, HashSet},
    };

    #[derive(Default)]
    struct TestHost {
        config: HashMap<&'static str, Value>,
        markets: HashSet<String>,
        logs: RefCell<Vec<(Severity, String)>>,
    }

    impl Host for TestHost {
        fn log(&self, severity: Severity, message: &str, _detail: Option<&str>) {
            self.logs.borrow_mut().push((severity, message.to_string()));
        }

        fn get_config(&self, key: &str) -> Option<Value> {
            self.config.get(key).cloned()
        }

        fn current_token(&self) -> Option<String> {
            Some("token".to_string())
        }

        fn lookup_market(&self, id: &str) -> bool {
            self.markets.contains(id)
        }
    }

    fn importer(markets: &[&str]) -> Importer<TestHost> {
        let host = TestHost {
            config: HashMap::from([
                ("alerts.defaultCooldown", json!(300000)),
                ("alerts.defaultSendEmail", json!(true)),
            ]),
            markets: markets.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        };
        let exchanges = ExchangeTable::new(
            HashMap::from([
                ("PLNX".to_string(), "POLONIEX".to_string()),
                ("BITS".to_string(), "BITSTAMP".to_string()),
            ]),
            HashSet::from(["POLONIEX".to_string()]),
        );

        Importer::new(
            host,
            exchanges,
            AlertsApi::new("http://127.0.0.1:9/alerts").unwrap(),
        )
    }

    fn record(exch_code: &str, mkt_name: &str, price: f64, operator: &str) -> ImportRecord {
        serde_json::from_value(json!({
            "exch_code": exch_code,
            "mkt_name": mkt_name,
            "price": price,
            "operator": operator,
        }))
        .unwrap()
    }

    #[test]
    fn creates_alert_with_defaults() {
        let importer = importer(&["POLONIEX_SPOT_USD_BTC"]);
        let defaults = AlertDefaults::from_host(importer.host());

        let alert = importer
            .create(&record("PLNX", "BTC/USD", 7000.0, ">"), &defaults)
            .unwrap();

        assert_eq!(alert.market, "POLONIEX_SPOT_USD_BTC");
        assert_eq!(alert.value, 7000.0);
        assert_eq!(alert.kind, AlertType::LastPrice);
        assert_eq!(alert.direction, Direction::Above);
        assert_eq!(alert.cooldown, Some(300000));
        assert_eq!(alert.expires, None);
        assert!(alert.email);
        assert!(!alert.sms);
        assert!(!alert.kill);
    }

    #[test]
    fn skips_unknown_market_and_logs_it() {
        let importer = importer(&["BITSTAMP_SPOT_BTC_USD"]);
        let defaults = AlertDefaults::default();

        assert!(
            importer
                .create(&record("BITS", "ETH/USD", 300.0, "<"), &defaults)
                .is_none()
        );

        let logs = importer.host().logs.borrow();
        assert_eq!(
            logs.last().unwrap(),
            &(
                Severity::Info,
                "Could not find market ETH/USD on BITS.".to_string()
            )
        );
    }

    #[test]
    fn rejects_other_extensions_before_reading() {
        assert!(matches!(
            check_extension(Path::new("/does/not/exist/alerts.csv")),
            Err(ImportError::UnsupportedExtension)
        ));
        assert!(matches!(
            importer(&[]).prepare(Path::new("/does/not/exist/alerts.csv")),
            Err(ImportError::UnsupportedExtension)
        ));
        assert!(matches!(
            check_extension(Path::new("alerts")),
            Err(ImportError::UnsupportedExtension)
        ));
        assert!(check_extension(Path::new("alerts.txt")).is_ok());
        assert!(check_extension(Path::new("alerts.json")).is_ok());
    }

    #[test]
    fn requires_aa_data_array() {
        assert!(matches!(
            parse_rows(br#"{"foo": []}"#),
            Err(ImportError::InvalidStructure)
        ));
        assert!(matches!(
            parse_rows(br#"{"aaData": {}}"#),
            Err(ImportError::InvalidStructure)
        ));
        assert!(matches!(
            parse_rows(br#"[]"#),
            Err(ImportError::InvalidStructure)
        ));
        assert!(matches!(parse_rows(b"{not json"), Err(ImportError::Json(_))));
        assert_eq!(parse_rows(br#"{"aaData": [1, 2]}"#).unwrap().len(), 2);
    }

    #[test]
    fn null_or_missing_operator_means_below() {
        let importer = importer(&["BITSTAMP_SPOT_BTC_USD"]);
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        serde_json::to_writer(
            &mut file,
            &json!({ "aaData": [
                {"exch_code": "BITS", "mkt_name": "BTC/USD", "price": 1, "operator": null},
                {"exch_code": "BITS", "mkt_name": "BTC/USD", "price": 2},
                {"exch_code": "BITS", "mkt_name": "BTC/USD", "price": 3, "operator": "<"},
                {"exch_code": "BITS", "mkt_name": "BTC/USD", "price": 4, "operator": ">"},
            ]}),
        )
        .unwrap();

        let batch = importer.prepare(file.path()).unwrap();
        let directions: Vec<_> = batch.alerts.iter().map(|a| a.direction).collect();

        assert_eq!(batch.skipped(), 0);
        assert_eq!(
            directions,
            vec![
                Direction::Below,
                Direction::Below,
                Direction::Below,
                Direction::Above
            ]
        );
    }

    #[test]
    fn dry_run_writes_alerts_and_counts_failures() {
        let importer = importer(&["POLONIEX_SPOT_USD_BTC"]);
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        serde_json::to_writer(
            &mut file,
            &json!({ "aaData": [
                {"exch_code": "PLNX", "mkt_name": "BTC/USD", "price": "7000", "operator": ">"},
            ]}),
        )
        .unwrap();
        let paths = vec![
            file.path().to_path_buf(),
            PathBuf::from("/does/not/exist/alerts.csv"),
        ];

        let mut out = Vec::new();
        let failed = importer.dry_run(&paths, &mut out);

        assert_eq!(failed, 1);

        let written: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0]["market"], "POLONIEX_SPOT_USD_BTC");
        assert_eq!(written[0]["direction"], "above");
        assert_eq!(written[0]["cooldown"], 300000);

        let logs = importer.host().logs.borrow();
        assert!(logs.contains(&(
            Severity::Error,
            "Could not import alerts from \"/does/not/exist/alerts.csv\".".to_string()
        )));
    }

    #[test]
    fn prepare_truncates_and_skips() {
        let importer = importer(&["BITSTAMP_SPOT_BTC_USD"]);
        let mut rows: Vec<Value> = (0..1200)
            .map(|i| {
                json!({
                    "exch_code": "BITS",
                    "mkt_name": "BTC/USD",
                    "price": format!("{}", 1000 + i),
                    "operator": "<",
                })
            })
            .collect();
        rows[0] = json!({"exch_code": "BITS", "mkt_name": "XRP/USD", "price": 1, "operator": ">"});
        rows[1] = json!({"exch_code": "BITS"});

        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        serde_json::to_writer(&mut file, &json!({ "aaData": rows })).unwrap();

        let batch = importer.prepare(file.path()).unwrap();

        assert_eq!(batch.total, 1200);
        assert_eq!(batch.considered, MAX_ALERTS);
        assert_eq!(batch.truncated(), 200);
        assert_eq!(batch.alerts.len(), MAX_ALERTS - 2);
        assert_eq!(batch.skipped(), 2);
        assert!(batch.alerts.iter().all(|a| a.direction == Direction::Below));

        let logs = importer.host().logs.borrow();
        assert!(logs.contains(&(Severity::Warn, "Alerts import truncated.".to_string())));
        assert!(logs.contains(&(Severity::Info, "Preparing to import 1200 alerts.".to_string())));
    }
}
