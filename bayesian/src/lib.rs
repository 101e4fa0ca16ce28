#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Bayesian
//!
//! A multinomial Naive Bayes text classifier.
//!
//! A [`Model`] learns token counts from labeled [`Document`]s and classifies token sequences with
//! Laplace-smoothed log posteriors. Two counting modes are supported, see [`CountingMode`].
//! Tokenization is left to the caller.
//!
//! ## Examples
//!
//! ```
//! use bayesian::{CountingMode, Document, Model};
//!
//! let mut model = Model::new(CountingMode::BooleanPresence);
//! model.learn([
//!     Document::new("good", ["tall", "handsome", "rich"]),
//!     Document::new("bad", ["bald", "poor", "ugly"]),
//! ]);
//!
//! let prediction = model.classify(&["the", "tall", "man"]);
//! assert_eq!(Some("good"), prediction.class());
//! assert!(prediction.is_certain());
//!
//! // Nothing in common with either class: both score the same.
//! let prediction = model.classify(&["the", "bad", "man"]);
//! assert!(!prediction.is_certain());
//! ```
//!
//! Models can be stored and restored losslessly:
//!
//! ```no_run
//! use bayesian::Model;
//!
//! let model = Model::load("model.bin").unwrap();
//! model.save("model-copy.bin").unwrap();
//! ```

mod document;
mod model;
mod predictor;
mod serialization;
mod trainer;
mod utils;

pub mod errors;

pub use document::Document;
pub use model::{ClassStats, CountingMode, Model};
pub use predictor::{Prediction, Predictor};
