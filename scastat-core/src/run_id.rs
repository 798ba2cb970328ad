//! Run and scenario identifiers
//!
//! Result files are named `<config>-<repetition>` (`Secure50_CI-3.sca`,
//! `Secure5_record-rep0.sca`); config names encode the security mode and the
//! node count (`Attack50_window3s_record`).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Config and repetition decoded from a run identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    /// Everything before the repetition tail
    pub config: String,
    /// Repetition index (0 when the id has no tail)
    pub repetition: u32,
}

impl RunId {
    /// Split on the last `-`; the tail must end in an integer (`3`, `rep3`).
    ///
    /// Identifiers without such a tail are a whole config with repetition 0.
    pub fn parse(id: &str) -> Self {
        static TAIL: OnceLock<Regex> = OnceLock::new();
        let tail = TAIL.get_or_init(|| Regex::new(r"^[A-Za-z_]*(\d+)$").expect("valid regex"));

        if let Some((config, rest)) = id.rsplit_once('-') {
            if !config.is_empty() {
                if let Some(rep) = tail
                    .captures(rest)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok())
                {
                    return Self {
                        config: config.to_string(),
                        repetition: rep,
                    };
                }
            }
        }

        Self {
            config: id.to_string(),
            repetition: 0,
        }
    }
}

/// Security mode and node count encoded in a config name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Scenario {
    /// Leading letters: `Secure`, `NoSec`, `Attack`, `AttackOnNoSec`, ...
    pub mode: String,
    /// Number of sensor nodes, when the name carries one
    pub nodes: Option<u32>,
    /// Suffix after the node count (`record`, `window3s_record`, `bloom`)
    pub variant: Option<String>,
}

impl Scenario {
    /// Decode `<Mode><Nodes>[_<variant>]`; other names become the mode itself.
    pub fn parse(config: &str) -> Self {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN
            .get_or_init(|| Regex::new(r"^([A-Za-z]+?)(\d+)(?:_(.+))?$").expect("valid regex"));

        match pattern.captures(config) {
            Some(caps) => Self {
                mode: caps[1].to_string(),
                nodes: caps[2].parse().ok(),
                variant: caps.get(3).map(|m| m.as_str().to_string()),
            },
            None => Self {
                mode: config.to_string(),
                nodes: None,
                variant: None,
            },
        }
    }

    /// Mode qualified by any variant other than the plain recording suffixes,
    /// so `Secure50_bloom` and `Secure50_record` land in different columns.
    pub fn series_label(&self) -> String {
        match self.variant.as_deref() {
            None | Some("record") | Some("CI") => self.mode.clone(),
            Some(variant) => {
                let variant = variant.strip_suffix("_record").unwrap_or(variant);
                format!("{}_{}", self.mode, variant)
            }
        }
    }
}
