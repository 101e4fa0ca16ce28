use hashbrown::HashMap;

use crate::model::Model;

/// Result of a classification.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction<'a> {
    scores: HashMap<&'a str, f64>,
    class: Option<&'a str>,
    certain: bool,
}

impl<'a> Prediction<'a> {
    /// Gets the class with the highest score, or `None` if the model knows no class.
    ///
    /// When several classes share the highest score, the one learned first is returned and
    /// [`Prediction::is_certain()`] is `false`.
    pub const fn class(&self) -> Option<&'a str> {
        self.class
    }

    /// Returns `true` if the predicted class is the only one with the highest score.
    pub const fn is_certain(&self) -> bool {
        self.certain
    }

    /// Gets the posterior log score of a class.
    ///
    /// Scores are unnormalized natural logarithms and are only meaningful for ranking.
    pub fn score(&self, class: &str) -> Option<f64> {
        self.scores.get(class).copied()
    }

    /// Gets the posterior log scores of all known classes.
    pub const fn scores(&self) -> &HashMap<&'a str, f64> {
        &self.scores
    }

    /// Consumes the prediction and returns the scores.
    pub fn into_scores(self) -> HashMap<&'a str, f64> {
        self.scores
    }
}

/// Predictor.
///
/// A predictor borrows a model, so the model cannot learn while the predictor is alive. Any
/// number of predictors can share the same model, including across threads.
///
/// # Examples
///
/// ```
/// use bayesian::{CountingMode, Document, Model, Predictor};
///
/// let mut model = Model::new(CountingMode::TermFrequency);
/// model.learn([
///     Document::new("spam", ["cheap", "pills", "cheap"]),
///     Document::new("ham", ["meeting", "at", "noon"]),
/// ]);
///
/// let predictor = Predictor::new(&model);
/// let prediction = predictor.predict(&["cheap", "meeting", "cheap"]);
/// assert_eq!(Some("spam"), prediction.class());
/// assert!(prediction.is_certain());
/// ```
pub struct Predictor<'a> {
    model: &'a Model,
    // Laplace denominators, indexed by class ID.
    denominators: Vec<f64>,
}

impl<'a> Predictor<'a> {
    /// Creates a new predictor.
    ///
    /// # Arguments
    ///
    /// * `model` - A model data.
    ///
    /// # Returns
    ///
    /// A new predictor.
    pub fn new(model: &'a Model) -> Self {
        let n_vocabulary = model.n_vocabulary() as u64;
        let denominators = model
            .class_stats
            .iter()
            .map(|stats| (stats.n_tokens + n_vocabulary) as f64)
            .collect();
        Self {
            model,
            denominators,
        }
    }

    /// Classifies a sequence of tokens.
    ///
    /// Each class starts from its log prior, and every query token adds
    /// `ln((count + 1) / (class_tokens + vocabulary))`. Tokens the model has never seen are
    /// smoothed like any other, so every score stays finite.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Tokens to classify. Repeated tokens are collapsed under
    ///   [`CountingMode::BooleanPresence`](crate::CountingMode).
    ///
    /// # Returns
    ///
    /// The scores of all known classes, the best class, and whether the best class is unique.
    pub fn predict<S>(&self, tokens: &[S]) -> Prediction<'a>
    where
        S: AsRef<str>,
    {
        let scores = self.log_posteriors(tokens);

        let mut best: Option<(usize, f64)> = None;
        let mut certain = false;
        for (class_id, &score) in scores.iter().enumerate() {
            match best {
                Some((_, best_score)) if score > best_score => {
                    best = Some((class_id, score));
                    certain = true;
                }
                Some((_, best_score)) => {
                    if score == best_score {
                        certain = false;
                    }
                }
                None => {
                    best = Some((class_id, score));
                    certain = true;
                }
            }
        }

        let classes = self.model.classes.keys();
        let class = best.map(|(class_id, _)| classes[class_id].as_str());
        tracing::trace!(n_tokens = tokens.len(), ?class, certain, "classified tokens");

        Prediction {
            scores: classes
                .iter()
                .map(String::as_str)
                .zip(scores)
                .collect(),
            class,
            certain,
        }
    }

    fn log_posteriors<S>(&self, tokens: &[S]) -> Vec<f64>
    where
        S: AsRef<str>,
    {
        let mut scores: Vec<f64> = self
            .model
            .class_stats
            .iter()
            .map(|stats| stats.log_prior)
            .collect();
        for token in self.model.mode.effective_tokens(tokens) {
            let counts = self.model.token_counts.get(token);
            for (class_id, (score, &denominator)) in
                scores.iter_mut().zip(&self.denominators).enumerate()
            {
                let n = counts
                    .and_then(|counts| counts.get(&class_id))
                    .copied()
                    .unwrap_or(0);
                *score += ((n + 1) as f64 / denominator).ln();
            }
        }
        scores
    }
}

impl Model {
    /// Classifies a sequence of tokens.
    ///
    /// Shorthand for `Predictor::new(self).predict(tokens)`. Build a [`Predictor`] once when
    /// classifying many queries.
    pub fn classify<S>(&self, tokens: &[S]) -> Prediction<'_>
    where
        S: AsRef<str>,
    {
        Predictor::new(self).predict(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    use crate::document::Document;
    use crate::model::CountingMode;

    fn good_bad_model() -> Model {
        let mut model = Model::new(CountingMode::BooleanPresence);
        model.learn([
            Document::new("good", ["tall", "handsome", "rich"]),
            Document::new("bad", ["bald", "poor", "ugly"]),
        ]);
        model
    }

    #[test]
    fn test_predict_good() {
        let model = good_bad_model();
        let prediction = model.classify(&["the", "tall", "man"]);

        assert_eq!(Some("good"), prediction.class());
        assert!(prediction.is_certain());
    }

    #[test]
    fn test_predict_bad() {
        let model = good_bad_model();
        let prediction = model.classify(&["poor", "ugly", "girl"]);

        assert_eq!(Some("bad"), prediction.class());
        assert!(prediction.is_certain());
    }

    #[test]
    fn test_predict_no_overlap_is_uncertain() {
        let model = good_bad_model();
        let prediction = model.classify(&["the", "bad", "man"]);

        assert_eq!(prediction.score("good"), prediction.score("bad"));
        assert!(!prediction.is_certain());
        // The incumbent is kept on a tie.
        assert_eq!(Some("good"), prediction.class());
    }

    #[test]
    fn test_predict_scores() {
        let model = good_bad_model();
        let prediction = model.classify(&["the", "tall", "man"]);

        // 6 distinct tokens, 3 per class.
        let prior = 0.5f64.ln();
        let unseen = (1.0f64 / 9.0).ln();
        let expected_good = prior + unseen + (2.0f64 / 9.0).ln() + unseen;
        let expected_bad = prior + unseen + unseen + unseen;
        assert_eq!(Some(expected_good), prediction.score("good"));
        assert_eq!(Some(expected_bad), prediction.score("bad"));
        assert_eq!(2, prediction.scores().len());
        assert_eq!(None, prediction.score("ugly"));
    }

    #[test]
    fn test_predict_unseen_tokens_are_finite() {
        let model = good_bad_model();
        let prediction = model.classify(&["never", "seen", "anywhere"]);

        for class in ["good", "bad"] {
            assert!(prediction.score(class).unwrap().is_finite());
        }
    }

    #[test]
    fn test_predict_empty_model() {
        let model = Model::new(CountingMode::TermFrequency);
        let prediction = model.classify(&["anything"]);

        assert!(prediction.scores().is_empty());
        assert_eq!(None, prediction.class());
        assert!(!prediction.is_certain());
    }

    #[test]
    fn test_predict_empty_query_uses_priors() {
        let mut model = Model::new(CountingMode::TermFrequency);
        model.learn([
            Document::new("A", ["x"]),
            Document::new("C", ["y"]),
            Document::new("B", ["z"]),
            Document::new("B", ["w"]),
        ]);
        let tokens: &[&str] = &[];
        let prediction = model.classify(tokens);

        assert_eq!(Some("B"), prediction.class());
        assert_eq!(Some(0.5f64.ln()), prediction.score("B"));
        // A and C tie below the maximum, which does not affect certainty.
        assert!(prediction.is_certain());
    }

    #[test]
    fn test_predict_tie_at_maximum() {
        let mut model = Model::new(CountingMode::TermFrequency);
        model.learn([
            Document::new("A", ["x"]),
            Document::new("B", ["y"]),
            Document::new("C", ["z"]),
            Document::new("A", ["y"]),
            Document::new("B", ["x"]),
        ]);
        let prediction = model.classify(&["w"]);

        assert_eq!(Some("A"), prediction.class());
        assert!(!prediction.is_certain());
    }

    #[test]
    fn test_predict_zero_score_is_a_valid_best() {
        // A single class has a prior of ln(1) = 0.
        let mut model = Model::new(CountingMode::TermFrequency);
        model.learn([Document::new("only", ["x"])]);
        let tokens: &[String] = &[];
        let prediction = model.classify(tokens);

        assert_eq!(Some(0.0), prediction.score("only"));
        assert_eq!(Some("only"), prediction.class());
        assert!(prediction.is_certain());
    }

    #[test]
    fn test_predict_term_frequency_counts_query_duplicates() {
        let mut model = Model::new(CountingMode::TermFrequency);
        model.learn([Document::new("A", ["x"]), Document::new("B", ["y"])]);
        let once = model.classify(&["x"]);
        let twice = model.classify(&["x", "x"]);

        let delta = (2.0f64 / 3.0).ln();
        assert_eq!(
            once.score("A").unwrap() + delta,
            twice.score("A").unwrap()
        );
    }

    #[test]
    fn test_predict_boolean_presence_collapses_query_duplicates() {
        let model = good_bad_model();
        let once = model.classify(&["tall"]);
        let repeated = model.classify(&["tall", "tall", "tall"]);

        assert_eq!(once, repeated);
    }

    #[test]
    fn test_predictor_reused_across_threads() {
        let model = good_bad_model();
        let predictor = Predictor::new(&model);

        thread::scope(|s| {
            let good = s.spawn(|| predictor.predict(&["tall", "rich"]).class());
            let bad = s.spawn(|| predictor.predict(&["bald", "poor"]).class());
            assert_eq!(Some("good"), good.join().unwrap());
            assert_eq!(Some("bad"), bad.join().unwrap());
        });
    }
}
