use unicode_segmentation::UnicodeSegmentation;

use crate::config::ProcessingConfig;

const ABBREVIATIONS: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Dr.", "Prof.", "Sr.", "Jr.", "vs.", "etc.", "i.e.", "e.g.", "No.",
    "Vol.", "Ch.", "Fig.", "т.е.", "т.д.", "т.п.", "др.", "см.", "гл.",
];

/// Splits a document into sentence-aligned spans of roughly `chunk_size`
/// characters, carrying up to `chunk_overlap` characters of trailing
/// sentences into the next span.
///
/// Sizes are counted in characters, not bytes, so Cyrillic text chunks the
/// same way Latin text does.
#[derive(Debug, Clone)]
pub struct DocumentChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl DocumentChunker {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            chunk_overlap: config.chunk_overlap,
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let sentences = self.split_into_sentences(text);
        self.merge_sentences_into_chunks(sentences)
    }

    fn split_into_sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();

        for grapheme in text.graphemes(true) {
            current.push_str(grapheme);

            if is_sentence_boundary(&current) {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }

        if !current.trim().is_empty() {
            sentences.push(current.trim().to_string());
        }

        sentences
    }

    fn merge_sentences_into_chunks(&self, sentences: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current_chunk = String::new();
        let mut current_len = 0;
        let mut current_sentences: Vec<String> = Vec::new();

        for sentence in sentences {
            let sentence_len = sentence.chars().count();
            let potential_length = if current_chunk.is_empty() {
                sentence_len
            } else {
                current_len + 1 + sentence_len
            };

            if potential_length > self.chunk_size && !current_chunk.is_empty() {
                chunks.push(std::mem::take(&mut current_chunk));

                current_sentences = self.overlap_sentences(&current_sentences);
                current_chunk = current_sentences.join(" ");
                current_len = current_chunk.chars().count();
            }

            if !current_chunk.is_empty() {
                current_chunk.push(' ');
                current_len += 1;
            }
            current_chunk.push_str(&sentence);
            current_len += sentence_len;
            current_sentences.push(sentence);
        }

        if !current_chunk.is_empty() {
            chunks.push(current_chunk);
        }

        chunks
    }

    fn overlap_sentences(&self, sentences: &[String]) -> Vec<String> {
        if self.chunk_overlap == 0 {
            return Vec::new();
        }

        let mut overlap_len = 0;
        let mut overlap = Vec::new();

        for sentence in sentences.iter().rev() {
            let len = sentence.chars().count();
            if overlap_len + len > self.chunk_overlap {
                break;
            }
            overlap_len += len + 1;
            overlap.push(sentence.clone());
        }

        overlap.reverse();
        overlap
    }
}

fn is_sentence_boundary(text: &str) -> bool {
    let trimmed = text.trim_end();
    let Some(last_char) = trimmed.chars().last() else {
        return false;
    };

    if text.ends_with('\n') {
        return true;
    }

    if !matches!(last_char, '.' | '!' | '?' | '…') {
        return false;
    }

    // wait for the following whitespace so "3.5" and "..." stay intact
    if !text.ends_with(char::is_whitespace) {
        return false;
    }

    match trimmed.split_whitespace().last() {
        Some(last_word) => !ABBREVIATIONS.contains(&last_word),
        None => true,
    }
}
