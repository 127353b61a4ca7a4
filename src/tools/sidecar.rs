//! Dictionary persistence.
//!
//! A compressed artifact has no header, so the dictionary that produced it must be kept
//! beside it. SidecarStore writes it as a hidden file next to the artifact:
//! `dir/ticks.ct` is paired with `dir/.ticks.ct.ctcd`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bincode::{config, decode_from_slice, encode_to_vec, Decode, Encode};
use log::info;

use crate::codewords::dictionary::Dictionary;

/// Format version written into every sidecar.
const SIDECAR_VERSION: u8 = 1;
const SIDECAR_EXTENSION: &str = "ctcd";

/// Saves and loads the dictionary that belongs to a compressed artifact.
pub trait DictionaryStore {
    /// Persist the dictionary for the artifact at `artifact`.
    fn save(&self, dictionary: &Dictionary, artifact: &Path) -> io::Result<()>;

    /// Load the dictionary for the artifact at `artifact`.
    fn load(&self, artifact: &Path) -> io::Result<Dictionary>;

    /// Check that `dictionary` really belongs to `artifact` before decoding. Nothing ties
    /// the two together in the stored format, so every pair is accepted unless a store
    /// overrides this. A mismatch otherwise shows up as an unknown codeword while decoding.
    fn verify(&self, _dictionary: &Dictionary, _artifact: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// On-disk layout of a sidecar.
#[derive(Debug, Encode, Decode)]
struct SidecarFile {
    version: u8,
    /// (pattern, codeword) in priority order.
    entries: Vec<(String, u64)>,
}

/// Keeps the dictionary in a hidden file beside the artifact.
#[derive(Debug, Default, Clone, Copy)]
pub struct SidecarStore;

impl SidecarStore {
    pub fn new() -> Self {
        Self
    }
}

/// Where the sidecar for `artifact` lives.
pub fn sidecar_path(artifact: &Path) -> PathBuf {
    let name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    artifact.with_file_name(format!(".{}.{}", name, SIDECAR_EXTENSION))
}

/// Serialize a dictionary to sidecar bytes.
pub fn encode_dictionary(dictionary: &Dictionary) -> io::Result<Vec<u8>> {
    let file = SidecarFile {
        version: SIDECAR_VERSION,
        entries: dictionary
            .entries()
            .iter()
            .map(|(pattern, cw)| (pattern.clone(), cw.value()))
            .collect(),
    };
    encode_to_vec(&file, config::standard())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

/// Rebuild a dictionary from sidecar bytes.
pub fn decode_dictionary(bytes: &[u8]) -> io::Result<Dictionary> {
    let (file, _): (SidecarFile, usize) = decode_from_slice(bytes, config::standard())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    if file.version != SIDECAR_VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unsupported dictionary version {}.", file.version),
        ));
    }
    Dictionary::from_entries(file.entries)
}

impl DictionaryStore for SidecarStore {
    fn save(&self, dictionary: &Dictionary, artifact: &Path) -> io::Result<()> {
        let path = sidecar_path(artifact);
        let bytes = encode_dictionary(dictionary)?;
        let mut f_out = BufWriter::new(File::create(&path)?);
        f_out.write_all(&bytes)?;
        f_out.flush()?;
        info!(
            "Saved {} dictionary entries to {}.",
            dictionary.len(),
            path.display()
        );
        Ok(())
    }

    fn load(&self, artifact: &Path) -> io::Result<Dictionary> {
        let path = sidecar_path(artifact);
        let mut bytes = Vec::new();
        BufReader::new(File::open(&path)?).read_to_end(&mut bytes)?;
        let dictionary = decode_dictionary(&bytes)?;
        info!(
            "Loaded {} dictionary entries from {}.",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }
}

#[cfg(test)]
mod test {
    use super::{decode_dictionary, encode_dictionary, sidecar_path, DictionaryStore, SidecarStore};
    use crate::codewords::dictionary::Dictionary;
    use crate::tools::pattern_stats::PatternStats;
    use std::path::Path;

    fn sample_dictionary() -> Dictionary {
        let input = "AAPL,Q,B,,1000,1050,123.45,100\r\nAAPL,Q,S,,1200,1300,123.50,50\r\n";
        Dictionary::assign(&PatternStats::scan(input.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn sidecar_path_test() {
        assert_eq!(
            sidecar_path(Path::new("/data/ticks.ct")),
            Path::new("/data/.ticks.ct.ctcd")
        );
        assert_eq!(sidecar_path(Path::new("ticks.ct")), Path::new(".ticks.ct.ctcd"));
    }

    #[test]
    fn encode_decode_test() {
        let dict = sample_dictionary();
        let restored = decode_dictionary(&encode_dictionary(&dict).unwrap()).unwrap();
        assert_eq!(restored.entries(), dict.entries());
    }

    #[test]
    fn bad_sidecar_test() {
        assert!(decode_dictionary(&[]).is_err());
        let mut bytes = encode_dictionary(&sample_dictionary()).unwrap();
        bytes[0] = 9; // version
        assert!(decode_dictionary(&bytes).is_err());
    }

    #[test]
    fn save_load_test() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("ticks.ct");
        let dict = sample_dictionary();
        let store = SidecarStore::new();
        store.save(&dict, &artifact).unwrap();
        assert!(dir.path().join(".ticks.ct.ctcd").exists());

        let loaded = store.load(&artifact).unwrap();
        assert_eq!(loaded.entries(), dict.entries());
        assert!(store.verify(&loaded, &artifact).is_ok());
    }

    #[test]
    fn missing_sidecar_test() {
        let dir = tempfile::tempdir().unwrap();
        let err = SidecarStore::new()
            .load(&dir.path().join("nothing.ct"))
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
