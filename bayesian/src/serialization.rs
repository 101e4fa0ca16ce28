//! Persisted form of [`Model`].
//!
//! A model is stored as a fixed header followed by a single record:
//!
//! ```text
//! header: magic "NBCM", format version
//! record: mode tag, classes (name, documents, tokens, log prior) in learning order,
//!         tokens sorted by name with (class index, count) pairs, total documents
//! ```
//!
//! Everything is encoded with the standard bincode configuration. Decoding additionally caps the
//! bytes a model may claim, so a corrupted length prefix is rejected before any allocation.
//! Sorting makes the encoding deterministic for a given model, independently of hash map
//! iteration order.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bincode::{config, Decode, Encode};
use hashbrown::HashMap;

use crate::errors::{BayesianError, Result};
use crate::model::{ClassStats, CountingMode, Model};
use crate::utils::Indexer;

const MAGIC: [u8; 4] = *b"NBCM";
const FORMAT_VERSION: u32 = 1;

// Upper bound on the bytes a decoder may claim, so corrupted length prefixes fail instead of
// allocating.
const MAX_MODEL_SIZE: usize = 1 << 30;

fn decode_config() -> impl config::Config {
    config::standard().with_limit::<MAX_MODEL_SIZE>()
}

#[derive(Debug, Decode, Encode)]
struct Header {
    magic: [u8; 4],
    version: u32,
}

impl Header {
    const fn current() -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
        }
    }

    fn verify(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(BayesianError::invalid_model("not a bayesian model"));
        }
        if self.version != FORMAT_VERSION {
            return Err(BayesianError::invalid_model(format!(
                "unsupported format version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Decode, Encode)]
struct ClassRecord {
    name: String,
    n_documents: u64,
    n_tokens: u64,
    log_prior: f64,
}

#[derive(Debug, Decode, Encode)]
struct TokenRecord {
    token: String,
    // (class index, count)
    counts: Vec<(u64, u64)>,
}

#[derive(Debug, Decode, Encode)]
struct ModelRecord {
    mode: u8,
    classes: Vec<ClassRecord>,
    tokens: Vec<TokenRecord>,
    n_documents: u64,
}

impl Model {
    fn to_record(&self) -> ModelRecord {
        let classes = self
            .classes
            .keys()
            .iter()
            .zip(&self.class_stats)
            .map(|(name, stats)| ClassRecord {
                name: name.clone(),
                n_documents: stats.n_documents,
                n_tokens: stats.n_tokens,
                log_prior: stats.log_prior,
            })
            .collect();
        let mut tokens: Vec<_> = self
            .token_counts
            .iter()
            .map(|(token, counts)| {
                let mut counts: Vec<_> = counts
                    .iter()
                    .map(|(&class_id, &n)| (class_id as u64, n))
                    .collect();
                counts.sort_unstable();
                TokenRecord {
                    token: token.clone(),
                    counts,
                }
            })
            .collect();
        tokens.sort_unstable_by(|a, b| a.token.cmp(&b.token));
        ModelRecord {
            mode: self.mode as u8,
            classes,
            tokens,
            n_documents: self.n_documents,
        }
    }

    fn from_record(record: ModelRecord) -> Result<Self> {
        let mode = CountingMode::try_from(record.mode)?;

        let mut classes = Indexer::new();
        let mut class_stats = Vec::with_capacity(record.classes.len());
        for class in record.classes {
            if classes.get_id(class.name.as_str()) != class_stats.len() {
                return Err(BayesianError::invalid_model(format!(
                    "duplicate class: {}",
                    class.name
                )));
            }
            class_stats.push(ClassStats {
                n_documents: class.n_documents,
                n_tokens: class.n_tokens,
                log_prior: class.log_prior,
            });
        }
        let n_documents = class_stats
            .iter()
            .try_fold(0u64, |sum, stats| sum.checked_add(stats.n_documents))
            .ok_or_else(|| BayesianError::invalid_model("total documents overflows"))?;
        if n_documents != record.n_documents {
            return Err(BayesianError::invalid_model(format!(
                "total documents {} does not match the class document counts {}",
                record.n_documents, n_documents
            )));
        }

        let mut n_tokens = vec![0u64; class_stats.len()];
        let mut token_counts = HashMap::with_capacity(record.tokens.len());
        for TokenRecord { token, counts } in record.tokens {
            let mut class_counts = HashMap::with_capacity(counts.len());
            for (class_id, n) in counts {
                let class_id = usize::try_from(class_id)
                    .ok()
                    .filter(|&class_id| class_id < class_stats.len())
                    .ok_or_else(|| {
                        BayesianError::invalid_model(format!(
                            "token {:?} refers to an unknown class",
                            token
                        ))
                    })?;
                if n == 0 {
                    return Err(BayesianError::invalid_model(format!(
                        "token {:?} has a zero count",
                        token
                    )));
                }
                if class_counts.insert(class_id, n).is_some() {
                    return Err(BayesianError::invalid_model(format!(
                        "token {:?} has duplicate class counts",
                        token
                    )));
                }
                n_tokens[class_id] = n_tokens[class_id].checked_add(n).ok_or_else(|| {
                    BayesianError::invalid_model(format!(
                        "token total of class {:?} overflows",
                        classes.keys()[class_id]
                    ))
                })?;
            }
            if token_counts.insert(token, class_counts).is_some() {
                return Err(BayesianError::invalid_model("duplicate token"));
            }
        }
        for (class, (stats, n)) in classes.keys().iter().zip(class_stats.iter().zip(n_tokens)) {
            if stats.n_tokens != n {
                return Err(BayesianError::invalid_model(format!(
                    "token total of class {:?} does not match its token counts",
                    class
                )));
            }
        }

        let stored_priors: Vec<f64> = class_stats.iter().map(|stats| stats.log_prior).collect();
        let mut model = Self {
            mode,
            classes,
            class_stats,
            token_counts,
            n_documents,
        };
        model.update_priors();
        for ((class, stats), stored) in model
            .classes
            .keys()
            .iter()
            .zip(&model.class_stats)
            .zip(stored_priors)
        {
            if stats.log_prior.to_bits() != stored.to_bits() {
                return Err(BayesianError::invalid_model(format!(
                    "log prior of class {:?} does not match its document count",
                    class
                )));
            }
        }

        Ok(model)
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as [`BayesianError::IOError`].
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(Header::current(), wtr, config::standard())?;
        bincode::encode_into_std_write(self.to_record(), wtr, config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as [`BayesianError::IOError`]. If the
    /// data is not a valid model, [`BayesianError::is_decode_error()`] holds for the returned
    /// error.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let header: Header = bincode::decode_from_std_read(rdr, decode_config())?;
        header.verify()?;
        let record: ModelRecord = bincode::decode_from_std_read(rdr, decode_config())?;
        Self::from_record(record)
    }

    /// Exports the model data into a [`Vec`].
    ///
    /// # Returns
    ///
    /// The serialized model.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = vec![];
        self.write(&mut buf)?;
        Ok(buf)
    }

    /// Creates a model from a byte slice.
    ///
    /// # Arguments
    ///
    /// * `slice` - A byte slice starting with a serialized model.
    ///
    /// # Returns
    ///
    /// A model and the bytes following it.
    ///
    /// # Errors
    ///
    /// If the data is not a valid model, [`BayesianError::is_decode_error()`] holds for the
    /// returned error.
    pub fn from_slice(slice: &[u8]) -> Result<(Self, &[u8])> {
        // Decoding from memory never yields `DecodeError::Io`, so no error is reported as I/O.
        let (header, header_len) =
            bincode::decode_from_slice::<Header, _>(slice, decode_config())?;
        header.verify()?;
        let rest = &slice[header_len..];
        let (record, record_len) =
            bincode::decode_from_slice::<ModelRecord, _>(rest, decode_config())?;
        Ok((Self::from_record(record)?, &rest[record_len..]))
    }

    /// Saves the model to a file, replacing it if it exists.
    ///
    /// # Errors
    ///
    /// [`BayesianError::IOError`] is returned if the file cannot be created or written.
    pub fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut wtr = BufWriter::new(File::create(path)?);
        self.write(&mut wtr)?;
        wtr.flush()?;
        tracing::debug!(
            path = %path.display(),
            n_documents = self.n_documents,
            n_vocabulary = self.n_vocabulary(),
            "saved model"
        );
        Ok(())
    }

    /// Loads a model from a file.
    ///
    /// # Errors
    ///
    /// [`BayesianError::IOError`] is returned if the file cannot be opened or read. If the file
    /// does not contain a valid model, [`BayesianError::is_decode_error()`] holds for the
    /// returned error.
    pub fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let mut rdr = BufReader::new(File::open(path)?);
        let model = Self::read(&mut rdr)?;
        tracing::debug!(
            path = %path.display(),
            mode = %model.mode,
            n_documents = model.n_documents,
            n_vocabulary = model.n_vocabulary(),
            "loaded model"
        );
        Ok(model)
    }
}
