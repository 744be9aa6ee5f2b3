use crate::error::{ChoraleError, Result};

/// Extract the speaker label from a channel filename.
///
/// Channel files follow `<session>-<date>-<speaker>[_qualifier][.ext]`: the
/// speaker is the third dash-separated segment, with any underscore
/// qualifier and file extension stripped. A name that does not carry three
/// dash-separated segments is a hard error: defaulting the speaker would
/// mis-attribute every chunk of the channel with no way to repair it after
/// the merge.
pub fn resolve_speaker(name: &str) -> Result<String> {
    let segments: Vec<&str> = name.split('-').collect();
    if segments.len() < 3 {
        return Err(ChoraleError::SpeakerParse(format!(
            "'{}' has {} dash-separated segment(s), expected at least 3",
            name,
            segments.len()
        )));
    }

    let speaker = segments[2]
        .split('_')
        .next()
        .unwrap_or("")
        .split('.')
        .next()
        .unwrap_or("");

    if speaker.is_empty() {
        return Err(ChoraleError::SpeakerParse(format!(
            "'{}' yields an empty speaker label",
            name
        )));
    }

    Ok(speaker.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_third_segment() {
        assert_eq!(
            resolve_speaker("standup-20240312-alice.wav").unwrap(),
            "alice"
        );
    }

    #[test]
    fn test_strips_underscore_qualifier() {
        assert_eq!(
            resolve_speaker("standup-20240312-alice_mic2.wav").unwrap(),
            "alice"
        );
    }

    #[test]
    fn test_strips_extension_without_qualifier() {
        assert_eq!(resolve_speaker("call-jan-bob.wav").unwrap(), "bob");
    }

    #[test]
    fn test_extra_segments_still_use_third() {
        assert_eq!(
            resolve_speaker("retro-2024-carol-take2.wav").unwrap(),
            "carol"
        );
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(resolve_speaker("a-b-dave").unwrap(), "dave");
    }

    #[test]
    fn test_too_few_segments_is_error() {
        assert!(resolve_speaker("flatname.wav").is_err());
        assert!(resolve_speaker("only-two.wav").is_err());
    }

    #[test]
    fn test_empty_speaker_segment_is_error() {
        assert!(resolve_speaker("a-b-.wav").is_err());
        assert!(resolve_speaker("a-b-_mic.wav").is_err());
    }

    #[test]
    fn test_error_is_speaker_parse() {
        match resolve_speaker("nope") {
            Err(ChoraleError::SpeakerParse(_)) => {}
            other => panic!("expected SpeakerParse, got {:?}", other),
        }
    }
}
