//! Menu-file parsing.
//!
//! The input file is a human-edited list of `<label> : <value>` lines
//! grouped under decorated section banners. Booleans are `T`/`F`; numeric
//! ranges accept a space-separated list or a `start:step:end` triple; for
//! Monte-Carlo parameters only `min max` or `min:max` is allowed. Every
//! parse error names the offending line.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

/// Raw parsed menu: label -> (value text, line number).
#[derive(Debug, Clone)]
pub struct MenuFile {
    path: PathBuf,
    entries: HashMap<String, (String, usize)>,
}

impl MenuFile {
    pub fn parse(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(path, &text)
    }

    pub fn parse_str(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let mut entries = HashMap::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            // Banners, rules and blank lines carry no entry.
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with('%')
                || line.starts_with('-')
                || line.starts_with('=')
                || !line.contains(':')
            {
                continue;
            }
            let (label, value) = line.split_once(':').expect("checked above");
            let label = label.trim().to_uppercase();
            let value = value.trim().to_string();
            if label.is_empty() {
                return Err(ConfigError::Malformed {
                    path: path.to_path_buf(),
                    line: lineno + 1,
                    reason: "empty label before `:`".into(),
                });
            }
            entries.insert(label, (value, lineno + 1));
        }
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn raw(&self, label: &str) -> Result<(&str, usize), ConfigError> {
        self.entries
            .get(label)
            .map(|(v, l)| (v.as_str(), *l))
            .ok_or_else(|| ConfigError::MissingEntry {
                path: self.path.clone(),
                label: label.to_string(),
            })
    }

    fn malformed(&self, line: usize, reason: String) -> ConfigError {
        ConfigError::Malformed {
            path: self.path.clone(),
            line,
            reason,
        }
    }

    /// `T` / `F` boolean entry.
    pub fn get_bool(&self, label: &str) -> Result<bool, ConfigError> {
        let (v, line) = self.raw(label)?;
        match v {
            "T" => Ok(true),
            "F" => Ok(false),
            other => Err(self.malformed(line, format!("`{other}` is not `T` or `F`"))),
        }
    }

    pub fn get_f64(&self, label: &str) -> Result<f64, ConfigError> {
        let (v, line) = self.raw(label)?;
        v.parse()
            .map_err(|_| self.malformed(line, format!("`{v}` is not a number")))
    }

    pub fn get_usize(&self, label: &str) -> Result<usize, ConfigError> {
        let (v, line) = self.raw(label)?;
        v.parse()
            .map_err(|_| self.malformed(line, format!("`{v}` is not an integer")))
    }

    pub fn get_string(&self, label: &str) -> Result<String, ConfigError> {
        let (v, _) = self.raw(label)?;
        Ok(v.to_string())
    }

    /// Numeric range entry. Accepts a single value, a space-separated list,
    /// or a `start:step:end` triple; with `monte_carlo` set, only `min max`
    /// or `min:max` are accepted.
    pub fn get_range(&self, label: &str, monte_carlo: bool) -> Result<ParamRange, ConfigError> {
        let (v, line) = self.raw(label)?;
        let parse_num = |s: &str| -> Result<f64, ConfigError> {
            s.parse()
                .map_err(|_| self.malformed(line, format!("`{s}` is not a number")))
        };

        if monte_carlo {
            let parts: Vec<&str> = if v.contains(':') {
                v.split(':').map(str::trim).collect()
            } else {
                v.split_whitespace().collect()
            };
            if parts.len() == 1 {
                let x = parse_num(parts[0])?;
                return Ok(ParamRange::Bounds { min: x, max: x });
            }
            if parts.len() != 2 {
                return Err(self.malformed(
                    line,
                    "Monte-Carlo ranges take `min max` or `min:max`".into(),
                ));
            }
            let min = parse_num(parts[0])?;
            let max = parse_num(parts[1])?;
            if max < min {
                return Err(self.malformed(line, format!("range [{min}, {max}] is inverted")));
            }
            return Ok(ParamRange::Bounds { min, max });
        }

        if v.contains(':') {
            let parts: Vec<&str> = v.split(':').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(self.malformed(line, "colon ranges take `start:step:end`".into()));
            }
            let start = parse_num(parts[0])?;
            let step = parse_num(parts[1])?;
            let end = parse_num(parts[2])?;
            if step <= 0.0 || end < start {
                return Err(self.malformed(line, format!("bad span {start}:{step}:{end}")));
            }
            let mut values = Vec::new();
            let mut x = start;
            while x <= end + 1e-9 * step {
                values.push(x);
                x += step;
            }
            return Ok(ParamRange::List(values));
        }

        let values: Result<Vec<f64>, _> = v.split_whitespace().map(parse_num).collect();
        let values = values?;
        if values.is_empty() {
            return Err(self.malformed(line, "empty value".into()));
        }
        Ok(ParamRange::List(values))
    }
}

/// A swept parameter: an explicit value list, or Monte-Carlo bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamRange {
    List(Vec<f64>),
    Bounds { min: f64, max: f64 },
}

impl ParamRange {
    /// The deterministic value list; Monte-Carlo bounds have none.
    #[must_use]
    pub fn list(&self) -> Option<&[f64]> {
        match self {
            ParamRange::List(v) => Some(v),
            ParamRange::Bounds { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(text: &str) -> MenuFile {
        MenuFile::parse_str(Path::new("input.mnu"), text).unwrap()
    }

    #[test]
    fn parses_labels_and_booleans() {
        let m = menu("%%% TRANSPORT MENU %%%\nTransport : T\nFill Negative Values : F\n");
        assert!(m.get_bool("TRANSPORT").unwrap());
        assert!(!m.get_bool("FILL NEGATIVE VALUES").unwrap());
    }

    #[test]
    fn rejects_bad_boolean_with_line_number() {
        let m = menu("Transport : yes\n");
        match m.get_bool("TRANSPORT") {
            Err(ConfigError::Malformed { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn missing_entry_is_reported() {
        let m = menu("Transport : T\n");
        assert!(matches!(
            m.get_f64("TIMESTEP"),
            Err(ConfigError::MissingEntry { .. })
        ));
    }

    #[test]
    fn space_list_and_colon_triple_agree() {
        let m = menu("Temperature : 200 220 240\nPressure : 20000:2000:24000\n");
        assert_eq!(
            m.get_range("TEMPERATURE", false).unwrap(),
            ParamRange::List(vec![200.0, 220.0, 240.0])
        );
        assert_eq!(
            m.get_range("PRESSURE", false).unwrap(),
            ParamRange::List(vec![20000.0, 22000.0, 24000.0])
        );
    }

    #[test]
    fn monte_carlo_accepts_only_bounds() {
        let m = menu("Temperature : 200 240\nPressure : 1:2:3\n");
        assert_eq!(
            m.get_range("TEMPERATURE", true).unwrap(),
            ParamRange::Bounds {
                min: 200.0,
                max: 240.0
            }
        );
        assert!(m.get_range("PRESSURE", true).is_err());
    }
}
