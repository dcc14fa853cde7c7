use std::path::Path;

use anyhow::{Context, Result};
use derive_getters::Getters;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{
    aligners::constants::{DEFAULT_KMER_SIZE, DEFAULT_PADDING},
    chain::Anchor,
};
use crate::util::io::{is_json_path, open_reader};

fn default_kmer_size() -> usize {
    DEFAULT_KMER_SIZE
}

fn default_padding() -> usize {
    DEFAULT_PADDING
}

/// A named anchor chain to align, with optional expectations for the result.
#[derive(Clone, Debug, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ChainCase {
    name: String,
    query: String,
    reference: String,
    anchors: Vec<Anchor>,
    #[serde(default = "default_kmer_size")]
    k: usize,
    #[serde(default = "default_padding")]
    padding: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expected_score: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expected_cigar: Option<String>,
}

impl ChainCase {
    pub fn new(
        name: String,
        query: String,
        reference: String,
        anchors: Vec<Anchor>,
        k: usize,
        padding: usize,
    ) -> Self {
        Self {
            name,
            query,
            reference,
            anchors,
            k,
            padding,
            expected_score: None,
            expected_cigar: None,
        }
    }

    pub fn query_bytes(&self) -> &[u8] {
        self.query.as_bytes()
    }

    pub fn reference_bytes(&self) -> &[u8] {
        self.reference.as_bytes()
    }
}

/// Reads a JSON array of [`ChainCase`]s from a file (gzipped or not), or standard input for `-`.
pub fn read_cases<P: AsRef<Path>>(path: &P) -> Result<Vec<ChainCase>> {
    let path = path.as_ref();
    if path.as_os_str() != "-" && !is_json_path(&path) {
        warn!("Reading {} as JSON despite its extension", path.display());
    }
    let reader = open_reader(&path)?;
    let cases: Vec<ChainCase> = serde_json::from_reader(reader)
        .with_context(|| format!("Error parsing cases from: {}", path.display()))?;
    info!("Read {} cases from {}", cases.len(), path.display());
    Ok(cases)
}

#[cfg(test)]
pub mod tests {
    use std::{fs::File, io::Write, path::PathBuf};

    use flate2::{write::GzEncoder, Compression};

    use super::{read_cases, ChainCase};
    use crate::align::{
        aligners::BioAligner,
        chain::{align_chain, Anchor},
        scoring::ScoringParameters,
    };

    const CASES: &str = r#"[
        {"name": "basic", "query": "ATC", "reference": "ATC", "anchors": [[0, 0]], "k": 3,
         "padding": 2, "expected_score": 9, "expected_cigar": "3="},
        {"name": "defaults", "query": "ATCGAT", "reference": "ATCGAT", "anchors": [[0, 0], [3, 3]]}
    ]"#;

    fn bundled_fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../fixtures/cases.json")
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("piecewise-{}-{}", std::process::id(), name))
    }

    fn check(cases: &[ChainCase]) {
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].name(), "basic");
        assert_eq!(cases[0].anchors(), &vec![Anchor::new(0, 0)]);
        assert_eq!(*cases[0].expected_score(), Some(9));
        assert_eq!(cases[0].expected_cigar().as_deref(), Some("3="));
        assert_eq!(*cases[1].k(), 3);
        assert_eq!(*cases[1].padding(), 2);
        assert_eq!(*cases[1].expected_score(), None);
        assert_eq!(cases[1].query_bytes(), b"ATCGAT");
    }

    #[test]
    fn test_read_cases() {
        let path = temp_path("cases.json");
        std::fs::write(&path, CASES).unwrap();
        let cases = read_cases(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        check(&cases);
    }

    #[test]
    fn test_read_gzipped_cases() {
        let path = temp_path("cases.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(CASES.as_bytes()).unwrap();
        encoder.finish().unwrap();
        let cases = read_cases(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        check(&cases);
    }

    #[test]
    fn test_read_bundled_fixture() {
        let cases = read_cases(&bundled_fixture()).unwrap();
        assert_eq!(cases.len(), 20);
        assert!(cases.iter().all(|case| !case.anchors().is_empty()));
    }

    #[test]
    fn test_bundled_fixture_expectations() {
        let scoring = ScoringParameters::default();
        let mut aligner = BioAligner::default();
        for case in read_cases(&bundled_fixture()).unwrap() {
            let (query, reference) = (case.query_bytes(), case.reference_bytes());
            let result = align_chain(
                &mut aligner,
                query,
                reference,
                case.anchors(),
                *case.k(),
                *case.padding(),
                &scoring,
            )
            .unwrap_or_else(|err| panic!("{}: {err}", case.name()));
            result.validate(query.len(), reference.len()).unwrap();
            assert_eq!(
                scoring.edit_script(&result.edit_script),
                result.score,
                "{}",
                case.name()
            );

            let expected_score = (*case.expected_score())
                .unwrap_or_else(|| panic!("{} has no expected score", case.name()));
            assert_eq!(result.score, expected_score, "{}: {result}", case.name());
            if let Some(cigar) = case.expected_cigar() {
                assert_eq!(&result.cigar(), cigar, "{}: {result}", case.name());
            }
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(read_cases(&temp_path("missing.json")).is_err());
    }

    #[test]
    fn test_serialize_skips_missing_expectations() {
        let case = ChainCase::new(
            "x".to_string(),
            "ATC".to_string(),
            "ATC".to_string(),
            vec![Anchor::new(0, 0)],
            3,
            2,
        );
        let json = serde_json::to_string(&case).unwrap();
        assert!(!json.contains("expected"));
        assert!(json.contains(r#""anchors":[[0,0]]"#));
    }
}
