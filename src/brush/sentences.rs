/// Sentences of the journal text, handed out in order and replayed forever.
#[derive(Debug, Clone, Default)]
pub struct SentenceQueue {
    sentences: Vec<String>,
    cursor: usize,
}

impl SentenceQueue {
    /// Split on `.` and newlines, trim each piece and drop the empty ones.
    pub fn from_text(text: &str) -> Self {
        let sentences = text
            .split(['.', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        SentenceQueue {
            sentences,
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Total number of sentences handed out so far (not wrapped).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The sentence the next [`next`](Self::next) call will return.
    pub fn peek(&self) -> Option<&str> {
        if self.sentences.is_empty() {
            return None;
        }
        Some(&self.sentences[self.cursor % self.sentences.len()])
    }

    /// Return the sentence under the cursor and advance, wrapping at the end.
    pub fn next(&mut self) -> Option<&str> {
        if self.sentences.is_empty() {
            return None;
        }
        let index = self.cursor % self.sentences.len();
        self.cursor += 1;
        Some(&self.sentences[index])
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
