use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::common::oracle_error::OracleError;

/// Flat key/value configuration that tracks which keys were consumed.
///
/// Every `get` removes its key; `check` fails on whatever is left over and on
/// any value that did not deserialize into the requested type.
#[derive(Debug, Default)]
pub struct ConfigWithCheck {
    conf: HashMap<String, serde_json::Value>,
    bad_values: Vec<String>,
}

impl ConfigWithCheck {
    pub fn new(conf: HashMap<String, serde_json::Value>) -> Self {
        Self {
            conf,
            bad_values: Vec::new(),
        }
    }

    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.conf.remove(key)?;
        match serde_json::from_value::<T>(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                self.bad_values.push(format!("{}={} ({})", key, value, e));
                None
            }
        }
    }

    pub fn check(self) -> Result<(), OracleError> {
        if let Some(bad) = self.bad_values.first() {
            return Err(OracleError::para(format!("invalid value for {}", bad)));
        }
        let mut unknown: Vec<&String> = self.conf.keys().collect();
        if !unknown.is_empty() {
            unknown.sort();
            let names: Vec<&str> = unknown.iter().map(|k| k.as_str()).collect();
            return Err(OracleError::para(format!(
                "unknown para = {}",
                names.join(", ")
            )));
        }
        Ok(())
    }
}
