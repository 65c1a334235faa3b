//! Voice-response script builder
//!
//! Renders the say/gather IVR loop into provider voice-response markup.
//! The exact markup dialect is provider-specific; this builder targets the
//! TwiML-shaped XML the configured provider consumes.

/// A single instruction in a voice-response script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// Speak text to the caller
    Say { voice: Option<String>, text: String },
    /// Collect the caller's next utterance and post it to `action`
    Gather {
        input: String,
        action: String,
        timeout_secs: u32,
        language: String,
    },
    /// Silence for a number of seconds
    Pause { length_secs: u32 },
    /// End the call
    Hangup,
}

/// Ordered voice-response script
#[derive(Debug, Clone, Default)]
pub struct VoiceScript {
    verbs: Vec<Verb>,
}

impl VoiceScript {
    pub fn new() -> Self {
        Self { verbs: Vec::new() }
    }

    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say {
            voice: None,
            text: text.into(),
        });
        self
    }

    pub fn say_with_voice(mut self, voice: impl Into<String>, text: impl Into<String>) -> Self {
        self.verbs.push(Verb::Say {
            voice: Some(voice.into()),
            text: text.into(),
        });
        self
    }

    /// Gather the next spoken utterance; results are posted to `action`
    pub fn gather_speech(mut self, action: impl Into<String>, timeout_secs: u32) -> Self {
        self.verbs.push(Verb::Gather {
            input: "speech".to_string(),
            action: action.into(),
            timeout_secs,
            language: "en-US".to_string(),
        });
        self
    }

    pub fn pause(mut self, length_secs: u32) -> Self {
        self.verbs.push(Verb::Pause { length_secs });
        self
    }

    pub fn hangup(mut self) -> Self {
        self.verbs.push(Verb::Hangup);
        self
    }

    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Render the script as voice-response markup
    pub fn render(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say { voice, text } => {
                    match voice {
                        Some(voice) => {
                            xml.push_str(&format!(
                                "<Say voice=\"{}\">{}</Say>",
                                escape(voice),
                                escape(text)
                            ));
                        }
                        None => xml.push_str(&format!("<Say>{}</Say>", escape(text))),
                    }
                }
                Verb::Gather {
                    input,
                    action,
                    timeout_secs,
                    language,
                } => {
                    xml.push_str(&format!(
                        "<Gather input=\"{}\" action=\"{}\" timeout=\"{}\" language=\"{}\"/>",
                        escape(input),
                        escape(action),
                        timeout_secs,
                        escape(language)
                    ));
                }
                Verb::Pause { length_secs } => {
                    xml.push_str(&format!("<Pause length=\"{}\"/>", length_secs));
                }
                Verb::Hangup => xml.push_str("<Hangup/>"),
            }
        }
        xml.push_str("</Response>");
        xml
    }
}

/// Empty response markup (used when a webhook replies asynchronously)
pub fn empty_response() -> String {
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response></Response>".to_string()
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_say_and_gather_render() {
        let script = VoiceScript::new()
            .say_with_voice("alice", "Welcome to Acme")
            .gather_speech("https://example.com/gather?tenantId=t1", 3)
            .say("I did not hear anything.");

        let xml = script.render();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>"));
        assert!(xml.contains("<Say voice=\"alice\">Welcome to Acme</Say>"));
        assert!(xml.contains("action=\"https://example.com/gather?tenantId=t1\""));
        assert!(xml.contains("timeout=\"3\""));
        assert!(xml.ends_with("</Response>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = VoiceScript::new().say("Fish & Chips <Ltd>").render();
        assert!(xml.contains("<Say>Fish &amp; Chips &lt;Ltd&gt;</Say>"));
    }

    #[test]
    fn test_pause_and_hangup() {
        let xml = VoiceScript::new().say("Goodbye").pause(1).hangup().render();
        assert!(xml.contains("<Pause length=\"1\"/>"));
        assert!(xml.contains("<Hangup/>"));
    }

    #[test]
    fn test_empty_response() {
        assert!(empty_response().contains("<Response></Response>"));
    }
}
