use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};

/// Exchange suffix used by the candle source for IDX listings
pub const IDX_SUFFIX: &str = ".JK";

/// Built-in IDX universe (bare codes, suffix added on load)
const IDX_UNIVERSE: &[&str] = &[
    "AADI", "ACES", "ADMR", "ADRO", "AHAP", "AKRA", "AMMN", "AMRT", "ANTM", "APEX",
    "ARCI", "ARKO", "ARTO", "ASHA", "ASII", "ASLI", "ASRI", "ASSA", "ATLA", "AYAM",
    "BACA", "BBCA", "BBKP", "BBNI", "BBRI", "BBRM", "BBTN", "BBYB", "BEEF", "BELL",
    "BFIN", "BGTG", "BIPI", "BKSL", "BMRI", "BMTR", "BNBR", "BOAT", "BREN", "BRIS",
    "BRMS", "BRPT", "BSBK", "BSDE", "BUKA", "BULL", "BUMI", "BUVA", "BWPT", "CBDK",
    "CBRE", "CDIA", "CMNT", "CMRY", "COAL", "COCO", "COIN", "CPIN", "CPRO", "CTRA",
    "CUAN", "CYBR", "DAAZ", "DATA", "DEWA", "DEWI", "DKFT", "DMAS", "DOOH", "DSFI",
    "DSNG", "DSSA", "ELIT", "ELSA", "ELTY", "EMAS", "EMTK", "ENRG", "ERAA", "ERAL",
    "ESSA", "EXCL", "FAST", "FILM", "FIRE", "FOLK", "FPNI", "FUTR", "GGRM", "GIAA",
    "GMFI", "GOLF", "GOTO", "GTSI", "HATM", "HDIT", "HMSP", "HOPE", "HRTA", "HRUM",
    "HUMI", "IATA", "ICBP", "IKAN", "IMJS", "IMPC", "INCO", "INDF", "INDO", "INDY",
    "INET", "INKP", "INPC", "INTP", "IRSX", "ISAT", "ITMA", "ITMG", "JARR", "JAST",
    "JGLE", "JPFA", "JSMR", "KDTN", "KEEN", "KETR", "KIJA", "KLAS", "KLBF", "KOCI",
    "KOKA", "KPIG", "KRAS", "LEAD", "LPKR", "MAHA", "MAPA", "MAPI", "MARK", "MBMA",
    "MBSS", "MDKA", "MEDC", "MEJA", "MHKI", "MINA", "MLPL", "MMIX", "MNCN", "MORA",
    "MSIN", "MSKY", "MTEL", "MYOR", "NCKL", "NETV", "NICL", "NINE", "NRCA", "NSSS",
    "OASA", "OPMS", "PACK", "PADA", "PADI", "PANI", "PBSA", "PGAS", "PGEO", "PIPA",
    "PJHB", "PNBN", "PNLF", "PPRE", "PSAB", "PSKT", "PTBA", "PTPP", "PTRO", "PWON",
    "PYFA", "RAJA", "RATU", "REAL", "RLCO", "RMKE", "RMKO", "SCMA", "SGER", "SGRO",
    "SINI", "SLIS", "SMDR", "SMGA", "SMGR", "SMIL", "SMKM", "SMRA", "SOCI", "SOLA",
    "SRTG", "SSIA", "STRK", "SUPA", "TAPG", "TBIG", "TCPI", "TEBE", "TINS", "TKIM",
    "TLKM", "TMAS", "TOBA", "TOSK", "TOWR", "TPIA", "TRIN", "TRON", "TRUE", "UANG",
    "UDNG", "UNIQ", "UNTR", "UNVR", "VICI", "VKTR", "WIFI", "WIIM", "WIRG", "WOWS",
    "ZATA",
];

/// Scan universe organised by group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerGroups {
    #[serde(flatten)]
    pub groups: HashMap<String, Vec<String>>,
}

impl TickerGroups {
    /// Load ticker groups from a JSON file of `{group: [tickers]}`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(&content)?;
        let groups = raw
            .into_iter()
            .map(|(name, tickers)| (name, tickers.iter().map(|t| with_suffix(t)).collect()))
            .collect();
        Ok(Self { groups })
    }

    /// The built-in IDX universe as a single "IHSG" group
    pub fn builtin() -> Self {
        let mut groups = HashMap::new();
        groups.insert(
            "IHSG".to_string(),
            IDX_UNIVERSE.iter().map(|t| with_suffix(t)).collect(),
        );
        Self { groups }
    }

    /// Load from `path` when given, otherwise the built-in universe
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let groups = Self::from_file(p)?;
                if groups.ticker_count() == 0 {
                    return Err(AppError::Config(format!(
                        "Universe file {} contains no tickers",
                        p.display()
                    )));
                }
                Ok(groups)
            }
            None => Ok(Self::builtin()),
        }
    }

    /// Get all tickers across all groups (flattened, sorted, unique)
    pub fn all_tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self
            .groups
            .values()
            .flat_map(|v| v.clone())
            .collect();
        tickers.sort();
        tickers.dedup();
        tickers
    }

    /// Get the number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Get the total number of unique tickers
    pub fn ticker_count(&self) -> usize {
        self.all_tickers().len()
    }
}

/// Normalise a ticker to the upper-case ".JK" form
fn with_suffix(ticker: &str) -> String {
    let t = ticker.trim().to_uppercase();
    if t.ends_with(IDX_SUFFIX) {
        t
    } else {
        format!("{}{}", t, IDX_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_universe_is_unique_and_suffixed() {
        let groups = TickerGroups::builtin();
        let tickers = groups.all_tickers();

        assert_eq!(tickers.len(), IDX_UNIVERSE.len());
        assert!(tickers.iter().all(|t| t.ends_with(".JK")));
        assert!(tickers.contains(&"BBCA.JK".to_string()));
        assert!(tickers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ticker_groups_structure() {
        let mut groups = HashMap::new();
        groups.insert("BANK".to_string(), vec!["BBCA.JK".to_string(), "BBRI.JK".to_string()]);
        groups.insert("MINING".to_string(), vec!["ANTM.JK".to_string(), "BBCA.JK".to_string()]);

        let ticker_groups = TickerGroups { groups };

        assert_eq!(ticker_groups.group_count(), 2);
        assert_eq!(ticker_groups.ticker_count(), 3);
    }

    #[test]
    fn test_load_from_file_normalises_suffix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"BANK": ["bbca", "BBRI.JK"]}}"#).unwrap();

        let groups = TickerGroups::load(Some(file.path())).unwrap();
        assert_eq!(groups.all_tickers(), vec!["BBCA.JK", "BBRI.JK"]);
    }

    #[test]
    fn test_load_rejects_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"BANK": []}}"#).unwrap();
        assert!(TickerGroups::load(Some(file.path())).is_err());
    }
}
