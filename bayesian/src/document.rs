/// A labeled training example.
///
/// Tokens are used as given; no normalization is applied. Their order does not affect training,
/// and duplicates only matter under [`CountingMode::TermFrequency`](crate::CountingMode).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub(crate) class: String,
    pub(crate) tokens: Vec<String>,
}

impl Document {
    /// Creates a new document.
    ///
    /// # Arguments
    ///
    /// * `class` - The class label of the document.
    /// * `tokens` - Tokens of the document.
    ///
    /// # Examples
    ///
    /// ```
    /// use bayesian::Document;
    ///
    /// let doc = Document::new("bad", ["bald", "poor", "ugly"]);
    /// assert_eq!("bad", doc.class());
    /// assert_eq!(3, doc.tokens().len());
    /// ```
    pub fn new<C, I, S>(class: C, tokens: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class: class.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Gets the class label.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Gets the tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl<C, I, S> From<(C, I)> for Document
where
    C: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from((class, tokens): (C, I)) -> Self {
        Self::new(class, tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_keeps_duplicates_and_order() {
        let doc = Document::new("x", ["a", "b", "a"]);

        assert_eq!("x", doc.class());
        assert_eq!(&["a", "b", "a"], doc.tokens());
    }

    #[test]
    fn test_document_from_tuple() {
        let doc = Document::from(("good", vec!["tall".to_string()]));

        assert_eq!(Document::new("good", ["tall"]), doc);
    }
}
