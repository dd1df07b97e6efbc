//! Command-line arguments of the autoplay runner.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoplayConfig {
    pub grid_size: usize,
    pub category: usize,
    pub levels: u32,
    pub seed: u32,
    /// Preference file; `None` keeps everything in memory.
    pub store: Option<PathBuf>,
    /// Continue a saved checkpoint if one exists.
    pub resume: bool,
    /// Wipe stored preferences before playing.
    pub fresh: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            grid_size: 16,
            category: 0,
            levels: 1,
            seed: 1,
            store: None,
            resume: false,
            fresh: false,
        }
    }
}

pub const USAGE: &str = "usage: concentration [--grid N] [--category N] [--levels N] [--seed N] \
[--store PATH] [--resume] [--fresh]";

pub fn parse_autoplay_args(args: &[String]) -> Result<AutoplayConfig> {
    let mut config = AutoplayConfig::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--grid" => {
                config.grid_size = parse_value(args, &mut i, "--grid")?;
            }
            "--category" => {
                config.category = parse_value(args, &mut i, "--category")?;
            }
            "--levels" => {
                config.levels = parse_value(args, &mut i, "--levels")?;
            }
            "--seed" => {
                config.seed = parse_value(args, &mut i, "--seed")?;
            }
            "--store" => {
                i += 1;
                let v = args
                    .get(i)
                    .ok_or_else(|| anyhow!("missing value for --store"))?;
                config.store = Some(PathBuf::from(v));
            }
            "--resume" => config.resume = true,
            "--fresh" => config.fresh = true,
            other => {
                return Err(anyhow!("unknown argument: {}\n{}", other, USAGE));
            }
        }
        i += 1;
    }

    if config.resume && config.fresh {
        return Err(anyhow!("--resume and --fresh are mutually exclusive"));
    }
    Ok(config)
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T> {
    *i += 1;
    let v = args
        .get(*i)
        .ok_or_else(|| anyhow!("missing value for {}", flag))?;
    v.parse::<T>()
        .map_err(|_| anyhow!("invalid {} value: {}", flag, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_uses_defaults() {
        assert_eq!(parse_autoplay_args(&[]).unwrap(), AutoplayConfig::default());
    }

    #[test]
    fn parse_all_flags() {
        let cfg = parse_autoplay_args(&args(&[
            "--grid", "12", "--category", "2", "--levels", "3", "--seed", "99", "--store",
            "prefs.json", "--resume",
        ]))
        .unwrap();
        assert_eq!(
            cfg,
            AutoplayConfig {
                grid_size: 12,
                category: 2,
                levels: 3,
                seed: 99,
                store: Some(PathBuf::from("prefs.json")),
                resume: true,
                fresh: false,
            }
        );
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse_autoplay_args(&args(&["--grid"])).is_err());
        assert!(parse_autoplay_args(&args(&["--grid", "x"])).is_err());
        assert!(parse_autoplay_args(&args(&["--bogus"])).is_err());
        assert!(parse_autoplay_args(&args(&["--resume", "--fresh"])).is_err());
    }
}
