use tracing::debug;

use super::Brush;
use super::path::{Point, arc_length};
use super::sentences::SentenceQueue;
use crate::config::settings::HexColor;
use crate::render::fragment::{Fragment, TextFragment};

/// Replaces each finished stroke with the next sentence, sized to fit it.
#[derive(Debug, Clone)]
pub struct TextBrush {
    sentences: SentenceQueue,
    color: HexColor,
}

impl Default for TextBrush {
    fn default() -> Self {
        TextBrush::new(SentenceQueue::default(), HexColor::WHITE)
    }
}

impl TextBrush {
    pub fn new(sentences: SentenceQueue, color: HexColor) -> Self {
        TextBrush { sentences, color }
    }

    pub fn sentences(&self) -> &SentenceQueue {
        &self.sentences
    }

    pub fn set_sentences(&mut self, sentences: SentenceQueue) {
        self.sentences = sentences;
    }

    /// Start handing out sentences from the first one again.
    pub fn rewind(&mut self) {
        self.sentences.reset();
    }

    pub fn has_text(&self) -> bool {
        !self.sentences.is_empty()
    }
}

/// `2.5 * path_length / sentence_length`, counted in characters.
pub fn font_size_for(path_length: f32, sentence: &str) -> f32 {
    let chars = sentence.chars().count().max(1);
    2.5 * path_length / chars as f32
}

impl Brush for TextBrush {
    fn on_path_finished(&mut self, path: &[Point]) -> Option<Fragment> {
        let length = arc_length(path);
        if length <= 0.0 {
            debug!(samples = path.len(), "text stroke has no length, discarded");
            return None;
        }
        let sentence = self.sentences.next()?;
        Some(Fragment::Text(TextFragment {
            font_size: font_size_for(length, sentence),
            text: sentence.to_owned(),
            baseline: path.to_vec(),
            color: self.color,
        }))
    }
}
