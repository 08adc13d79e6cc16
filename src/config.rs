//! Compiled-in settings for the two conversion flows.
//!
//! Nothing here is read from the command line: which columns get summed is a
//! property of the extract format, not of a particular run.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

use crate::transform::{aggregate::UnionPlan, classify::ColumnSelector};

/// Name of the directory bulk mode writes into when `--output` is not given.
pub const DEFAULT_OUTPUT_DIR: &str = "processed_output";

/// Ordered list of encodings to try, plus whether the lossy single-byte
/// fallback may be used when none of them match.
#[derive(Debug, Clone)]
pub struct EncodingPolicy {
    pub candidates: Vec<&'static Encoding>,
    pub lossy_fallback: bool,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self {
            candidates: vec![UTF_8, UTF_16LE, UTF_16BE, WINDOWS_1252],
            lossy_fallback: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub delimiter: u8,
    pub encodings: EncodingPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: b'|',
            encodings: EncodingPolicy::default(),
        }
    }
}

/// Exact-match column renames applied after trimming.
#[derive(Debug, Clone)]
pub struct NormalizeRules {
    pub aliases: Vec<(String, String)>,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            aliases: vec![
                ("atente".into(), "Patente".into()),
                ("patente".into(), "Patente".into()),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct BulkConfig {
    pub ingest: IngestConfig,
    pub normalize: NormalizeRules,
    pub targets: ColumnSelector,
    /// Lowercase extensions, without the dot.
    pub extensions: Vec<String>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            normalize: NormalizeRules::default(),
            targets: ColumnSelector::new(
                ["Total", "Valor", "Peso", "Importe", "Cantidad"],
                [
                    "TotalFletes",
                    "TotalSeguros",
                    "TotalEmbalajes",
                    "TotalIncrementables",
                    "TotalDeducibles",
                    "PesoBrutoMercancia",
                ],
            ),
            extensions: vec!["asc".into()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnionConfig {
    pub ingest: IngestConfig,
    pub normalize: NormalizeRules,
    pub plan: UnionPlan,
    pub extensions: Vec<String>,
}

impl Default for UnionConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig::default(),
            normalize: NormalizeRules::default(),
            plan: UnionPlan {
                key: "Pedimento".into(),
                required: vec!["Pedimento".into(), "PrecioUnitario".into()],
                targets: ColumnSelector::new(Vec::<String>::new(), ["PrecioUnitario"]),
            },
            extensions: vec!["txt".into(), "asc".into()],
        }
    }
}
