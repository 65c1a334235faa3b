//! Speech recognition capability boundary
//!
//! Transcription is an external capability: the session manager hands raw
//! media frames to a `SpeechRecognizer` and appends whatever ordered text
//! fragments it yields. The default recognizer yields nothing; media is still
//! accounted so a finalized silent call produces the placeholder minute.

/// Converts decoded media frames into transcript fragments
pub trait SpeechRecognizer: Send + Sync {
    /// Return a transcript fragment for an audio chunk, if one is ready
    fn fragment_for_chunk(&self, audio: &[u8]) -> Option<String>;
}

/// Recognizer that never produces text; media frames are only counted
pub struct NullRecognizer;

impl SpeechRecognizer for NullRecognizer {
    fn fragment_for_chunk(&self, _audio: &[u8]) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_recognizer_yields_nothing() {
        let recognizer = NullRecognizer;
        assert!(recognizer.fragment_for_chunk(&[0u8; 160]).is_none());
    }
}
