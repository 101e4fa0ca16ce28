use std::borrow::Borrow;

use crate::document::Document;
use crate::model::{ClassStats, Model};

impl Model {
    /// Learns a batch of documents.
    ///
    /// Counts are accumulated on top of everything learned before, then the priors of all known
    /// classes are recomputed from the updated document counts. An empty batch leaves the counts
    /// untouched.
    ///
    /// # Arguments
    ///
    /// * `documents` - Labeled documents.
    ///
    /// # Examples
    ///
    /// ```
    /// use bayesian::{CountingMode, Document, Model};
    ///
    /// let mut model = Model::new(CountingMode::TermFrequency);
    /// model.learn([
    ///     Document::new("A", ["x"]),
    ///     Document::new("A", ["y"]),
    ///     Document::new("B", ["z"]),
    /// ]);
    ///
    /// assert_eq!(Some((2.0f64 / 3.0).ln()), model.prior("A"));
    /// assert_eq!(Some((1.0f64 / 3.0).ln()), model.prior("B"));
    /// ```
    pub fn learn<I, D>(&mut self, documents: I)
    where
        I: IntoIterator<Item = D>,
        D: Borrow<Document>,
    {
        let mut n_learned = 0usize;
        for doc in documents {
            self.add_document(doc.borrow());
            n_learned += 1;
        }
        self.update_priors();

        tracing::debug!(
            n_learned,
            n_documents = self.n_documents,
            n_classes = self.n_classes(),
            n_vocabulary = self.n_vocabulary(),
            "learned documents"
        );
    }

    /// Learns a single document.
    ///
    /// Equivalent to a batch containing only `document`.
    pub fn learn_document(&mut self, document: &Document) {
        self.learn([document]);
    }

    fn add_document(&mut self, doc: &Document) {
        let class_id = self.classes.get_id(doc.class());
        if class_id == self.class_stats.len() {
            self.class_stats.push(ClassStats::default());
        }
        self.n_documents += 1;

        let stats = &mut self.class_stats[class_id];
        stats.n_documents += 1;
        for token in self.mode.effective_tokens(doc.tokens()) {
            stats.n_tokens += 1;
            *self
                .token_counts
                .entry_ref(token)
                .or_default()
                .entry(class_id)
                .or_insert(0) += 1;
        }
    }

    pub(crate) fn update_priors(&mut self) {
        let n_documents = self.n_documents as f64;
        for stats in &mut self.class_stats {
            stats.log_prior = (stats.n_documents as f64 / n_documents).ln();
        }
    }
}
