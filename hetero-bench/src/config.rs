use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Named preset of measured and warmup run counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchProfile {
    pub name: String,
    pub runs: u32,
    pub warmup: u32,
}

impl BenchProfile {
    fn new(name: &str, runs: u32, warmup: u32) -> Self {
        Self {
            name: name.to_string(),
            runs,
            warmup,
        }
    }
}

/// Single-shot timing: one measured run, no warmup.
pub const DEFAULT_RUNS: u32 = 1;
pub const DEFAULT_WARMUP: u32 = 0;

pub fn get_profile(name: &str) -> Option<BenchProfile> {
    match name {
        "quick" => Some(BenchProfile::new("quick", 3, 1)),
        "standard" => Some(BenchProfile::new("standard", 10, 3)),
        "thorough" => Some(BenchProfile::new("thorough", 30, 3)),
        _ => None,
    }
}

/// Resolve run counts: explicit flags win, then the profile, then the
/// single-shot defaults.
pub fn resolve_runs(
    profile: Option<&str>,
    runs: Option<u32>,
    warmup: Option<u32>,
) -> Result<(u32, u32), BenchError> {
    let profile = match profile {
        Some(name) => {
            Some(get_profile(name).ok_or_else(|| BenchError::UnknownProfile(name.to_string()))?)
        }
        None => None,
    };
    if let Some(p) = &profile {
        tracing::debug!(profile = %p.name, runs = p.runs, warmup = p.warmup, "profile selected");
    }
    let runs = runs
        .or(profile.as_ref().map(|p| p.runs))
        .unwrap_or(DEFAULT_RUNS)
        .max(1);
    let warmup = warmup
        .or(profile.as_ref().map(|p| p.warmup))
        .unwrap_or(DEFAULT_WARMUP);
    Ok((runs, warmup))
}

/// Parse a size such as `512`, `10K`, `1.5M`, `16Mi` or `1_000_000`.
///
/// `K`/`M` are decimal multipliers, `Ki`/`Mi` binary ones. Zero is rejected.
pub fn parse_size(s: &str) -> Result<usize, BenchError> {
    let input = s.trim();
    let invalid = |reason: String| BenchError::InvalidSize {
        input: input.to_string(),
        reason,
    };

    let (digits, multiplier) = [
        ("Ki", 1024.0),
        ("ki", 1024.0),
        ("Mi", 1024.0 * 1024.0),
        ("mi", 1024.0 * 1024.0),
        ("K", 1e3),
        ("k", 1e3),
        ("M", 1e6),
        ("m", 1e6),
    ]
    .iter()
    .find_map(|&(suffix, mult)| input.strip_suffix(suffix).map(|d| (d, Some(mult))))
    .unwrap_or((input, None));

    let digits = digits.replace('_', "");
    let value = match multiplier {
        Some(mult) => {
            let num: f64 = digits.parse().map_err(|e| invalid(format!("{e}")))?;
            if !num.is_finite() || num < 0.0 {
                return Err(invalid("must be a positive number".to_string()));
            }
            (num * mult) as usize
        }
        None => digits.parse::<usize>().map_err(|e| invalid(format!("{e}")))?,
    };

    if value == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(value)
}

pub fn parse_sizes(raw: &[String]) -> Result<Vec<usize>, BenchError> {
    raw.iter().map(|s| parse_size(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_decimal_suffixes() {
        assert_eq!(parse_size("10K").unwrap(), 10_000);
        assert_eq!(parse_size("1m").unwrap(), 1_000_000);
        assert_eq!(parse_size("1.5M").unwrap(), 1_500_000);
        assert_eq!(parse_size("0.5k").unwrap(), 500);
    }

    #[test]
    fn test_parse_size_binary_suffixes() {
        assert_eq!(parse_size("16Mi").unwrap(), 16_777_216);
        assert_eq!(parse_size("4Ki").unwrap(), 4096);
    }

    #[test]
    fn test_parse_size_raw() {
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size(" 1_000_000 ").unwrap(), 1_000_000);
    }

    #[test]
    fn test_parse_size_rejects_garbage_and_zero() {
        assert!(parse_size("abc").is_err());
        assert!(parse_size("").is_err());
        assert!(parse_size("0").is_err());
        assert!(parse_size("-1M").is_err());
        match parse_size("0K") {
            Err(BenchError::InvalidSize { input, .. }) => assert_eq!(input, "0K"),
            other => panic!("expected InvalidSize, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_sizes() {
        let raw = vec!["1K".to_string(), "2K".to_string()];
        assert_eq!(parse_sizes(&raw).unwrap(), vec![1000, 2000]);
        assert!(parse_sizes(&["1K".to_string(), "x".to_string()]).is_err());
    }

    #[test]
    fn test_profiles() {
        assert_eq!(get_profile("quick").unwrap().runs, 3);
        assert_eq!(get_profile("standard").unwrap().warmup, 3);
        assert_eq!(get_profile("thorough").unwrap().runs, 30);
        assert!(get_profile("exhaustive").is_none());
    }

    #[test]
    fn test_resolve_runs_precedence() {
        assert_eq!(resolve_runs(None, None, None).unwrap(), (1, 0));
        assert_eq!(resolve_runs(Some("standard"), None, None).unwrap(), (10, 3));
        assert_eq!(resolve_runs(Some("standard"), Some(4), None).unwrap(), (4, 3));
        assert_eq!(resolve_runs(None, Some(0), Some(2)).unwrap(), (1, 2));
        assert!(matches!(
            resolve_runs(Some("nope"), None, None),
            Err(BenchError::UnknownProfile(_))
        ));
    }
}
