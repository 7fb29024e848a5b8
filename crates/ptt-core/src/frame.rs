//! Device frame classification
//!
//! The device sends bare ASCII text with no length prefix. Each read is
//! decoded and classified on its own by literal prefix; a command split
//! across two reads is not reassembled.

/// Prefix of a button press frame
pub const PRESS_PREFIX: &str = "+PTT=P";

/// Prefix of a button release frame
pub const RELEASE_PREFIX: &str = "+PTT=R";

/// Button command forwarded to the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PttCommand {
    /// Button pressed
    Press,
    /// Button released
    Release,
}

impl PttCommand {
    /// Payload posted into the script environment
    pub fn payload(self) -> &'static str {
        match self {
            PttCommand::Press => "pttp",
            PttCommand::Release => "pttr",
        }
    }
}

/// One decoded unit of device input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `+PTT=P...`
    Press,
    /// `+PTT=R...`
    Release,
    /// Anything else; dropped by the reader
    Unrecognized(String),
}

impl Frame {
    /// Classify decoded text by prefix
    pub fn classify(text: &str) -> Frame {
        if text.starts_with(PRESS_PREFIX) {
            Frame::Press
        } else if text.starts_with(RELEASE_PREFIX) {
            Frame::Release
        } else {
            Frame::Unrecognized(text.to_string())
        }
    }

    /// Decode raw bytes as UTF-8 (lossy) and classify
    pub fn decode(bytes: &[u8]) -> Frame {
        Frame::classify(&String::from_utf8_lossy(bytes))
    }

    /// Command carried by this frame, if any
    pub fn command(&self) -> Option<PttCommand> {
        match self {
            Frame::Press => Some(PttCommand::Press),
            Frame::Release => Some(PttCommand::Release),
            Frame::Unrecognized(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        assert_eq!(Frame::decode(b"+PTT=Pxxxxxx"), Frame::Press);
        assert_eq!(Frame::decode(b"+PTT=R\r\n"), Frame::Release);
        assert_eq!(Frame::Press.command().map(PttCommand::payload), Some("pttp"));
        assert_eq!(Frame::Release.command().map(PttCommand::payload), Some("pttr"));
    }

    #[test]
    fn test_exact_prefix_only() {
        assert_eq!(Frame::decode(b"+PTT=P"), Frame::Press);
        // Prefix must be at the very start of the read
        assert!(Frame::decode(b"\r\n+PTT=P").command().is_none());
        assert!(Frame::decode(b"+ptt=p").command().is_none());
        assert!(Frame::decode(b"+PTT=").command().is_none());
        assert!(Frame::decode(b"").command().is_none());
    }

    #[test]
    fn test_split_frame_is_missed() {
        assert!(Frame::decode(b"+PT").command().is_none());
        assert!(Frame::decode(b"T=P").command().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let frame = Frame::decode(&[0xff, 0xfe, b'a']);
        assert_eq!(frame, Frame::Unrecognized("\u{fffd}\u{fffd}a".into()));

        let mut bytes = b"+PTT=R".to_vec();
        bytes.push(0xff);
        assert_eq!(Frame::decode(&bytes), Frame::Release);
    }
}
