//! Names for algorithms and caches as they appear on the command line and
//! in manifests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    Algorithm, Cache, DdMin, ElfParser, Error, HashCache, Hdd, ProbDd, TreeCache, TreeSitterParser,
    ZipMin,
};

/// `ddmin`, `zipmin`, `probdd`, `hdd-elf:<inner>` or `hdd-c:<inner>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlgorithmSpec {
    DdMin,
    ZipMin,
    ProbDd,
    HddElf(Box<AlgorithmSpec>),
    /// HDD over C source text.
    HddC(Box<AlgorithmSpec>),
}

impl AlgorithmSpec {
    pub fn build(&self) -> Box<dyn Algorithm> {
        match self {
            AlgorithmSpec::DdMin => Box::new(DdMin),
            AlgorithmSpec::ZipMin => Box::new(ZipMin),
            AlgorithmSpec::ProbDd => Box::new(ProbDd),
            AlgorithmSpec::HddElf(inner) => {
                Box::new(Hdd::new(Box::new(ElfParser::default()), inner.build()))
            }
            AlgorithmSpec::HddC(inner) => {
                Box::new(Hdd::new(Box::new(TreeSitterParser::c()), inner.build()))
            }
        }
    }

    /// The flat algorithms and each of them under HDD over ELF.
    pub fn standard() -> Vec<AlgorithmSpec> {
        let flat = [AlgorithmSpec::DdMin, AlgorithmSpec::ZipMin, AlgorithmSpec::ProbDd];
        let nested = flat
            .iter()
            .cloned()
            .map(|inner| AlgorithmSpec::HddElf(Box::new(inner)));
        flat.iter().cloned().chain(nested).collect()
    }
}

impl fmt::Display for AlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmSpec::DdMin => f.write_str("ddmin"),
            AlgorithmSpec::ZipMin => f.write_str("zipmin"),
            AlgorithmSpec::ProbDd => f.write_str("probdd"),
            AlgorithmSpec::HddElf(inner) => write!(f, "hdd-elf:{inner}"),
            AlgorithmSpec::HddC(inner) => write!(f, "hdd-c:{inner}"),
        }
    }
}

impl FromStr for AlgorithmSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "ddmin" => Ok(AlgorithmSpec::DdMin),
            "zipmin" => Ok(AlgorithmSpec::ZipMin),
            "probdd" => Ok(AlgorithmSpec::ProbDd),
            "hdd-elf" => Ok(AlgorithmSpec::HddElf(Box::new(AlgorithmSpec::DdMin))),
            "hdd-c" => Ok(AlgorithmSpec::HddC(Box::new(AlgorithmSpec::DdMin))),
            other => {
                if let Some(inner) = other.strip_prefix("hdd-elf:") {
                    Ok(AlgorithmSpec::HddElf(Box::new(inner.parse()?)))
                } else if let Some(inner) = other.strip_prefix("hdd-c:") {
                    Ok(AlgorithmSpec::HddC(Box::new(inner.parse()?)))
                } else {
                    Err(Error::Parse(format!(
                        "unknown algorithm '{s}' (expected ddmin, zipmin, probdd, hdd-elf:<inner> or hdd-c:<inner>)"
                    )))
                }
            }
        }
    }
}

impl TryFrom<String> for AlgorithmSpec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlgorithmSpec> for String {
    fn from(spec: AlgorithmSpec) -> Self {
        spec.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheSpec {
    None,
    Hash,
    Tree,
}

impl CacheSpec {
    pub fn build(self) -> Option<Box<dyn Cache>> {
        match self {
            CacheSpec::None => None,
            CacheSpec::Hash => Some(Box::new(HashCache::new())),
            CacheSpec::Tree => Some(Box::new(TreeCache::new())),
        }
    }
}

impl fmt::Display for CacheSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheSpec::None => "none",
            CacheSpec::Hash => "hash",
            CacheSpec::Tree => "tree",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_names_algorithms() {
        let spec: AlgorithmSpec = "hdd-elf:zipmin".parse().expect("spec");
        assert_eq!(spec, AlgorithmSpec::HddElf(Box::new(AlgorithmSpec::ZipMin)));
        assert_eq!(spec.to_string(), "hdd-elf:zipmin");
        assert_eq!(
            spec.build().to_string(),
            "HDD with Zipmin using ElfParser for elf (expand_bytes=true)"
        );
        assert_eq!("ProbDD".parse::<AlgorithmSpec>().expect("spec").build().to_string(), "ProbDD");
        assert!("bisect".parse::<AlgorithmSpec>().is_err());
        assert!("hdd-elf:bisect".parse::<AlgorithmSpec>().is_err());
    }

    #[test]
    fn parses_source_level_hdd() {
        let spec: AlgorithmSpec = "HDD-C:probdd".parse().expect("spec");
        assert_eq!(spec, AlgorithmSpec::HddC(Box::new(AlgorithmSpec::ProbDd)));
        assert_eq!(spec.to_string(), "hdd-c:probdd");
        assert_eq!(
            spec.build().to_string(),
            "HDD with ProbDD using TreeSitterParser for c (expand_whitespace=true)"
        );
        assert_eq!(
            "hdd-c".parse::<AlgorithmSpec>().expect("spec"),
            AlgorithmSpec::HddC(Box::new(AlgorithmSpec::DdMin))
        );
    }

    #[test]
    fn standard_set_covers_flat_and_hierarchical() {
        let names: Vec<String> = AlgorithmSpec::standard().iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["ddmin", "zipmin", "probdd", "hdd-elf:ddmin", "hdd-elf:zipmin", "hdd-elf:probdd"]
        );
    }

    #[test]
    fn specs_serialize_as_strings() {
        let json = serde_json::to_string(&vec![AlgorithmSpec::DdMin, AlgorithmSpec::HddElf(Box::new(AlgorithmSpec::ProbDd))])
            .expect("serialize");
        assert_eq!(json, r#"["ddmin","hdd-elf:probdd"]"#);
        let caches: Vec<CacheSpec> = serde_json::from_str(r#"["none","tree"]"#).expect("deserialize");
        assert_eq!(caches, [CacheSpec::None, CacheSpec::Tree]);
        assert!(CacheSpec::None.build().is_none());
        assert_eq!(CacheSpec::Hash.build().expect("cache").to_string(), "Hash Cache");
    }
}
