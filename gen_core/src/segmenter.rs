use crate::error::SegmenterError;

/// One speaker's contiguous utterance, in transcript order. Immutable once
/// produced by the segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub index: usize,
    pub speaker: String,
    pub text: String,
}

/// Parse a transcript blob into ordered speaker turns.
///
/// A line containing a `Name:` delimiter starts a new turn; delimiter-free
/// lines continue the current turn, joined with single spaces. Blank lines
/// are skipped and do not terminate a turn. Lines before the first
/// delimiter are discarded.
pub fn segment_transcript(transcript: &str) -> Result<Vec<Turn>, SegmenterError> {
    let mut turns: Vec<Turn> = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    let finish = |turns: &mut Vec<Turn>, current: Option<(String, Vec<String>)>| {
        if let Some((speaker, parts)) = current {
            let text = parts
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            turns.push(Turn {
                index: turns.len(),
                speaker,
                text,
            });
        }
    };

    for line in transcript.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some((speaker, text)) = line.split_once(':') {
            finish(&mut turns, current.take());
            current = Some((speaker.trim().to_string(), vec![text.trim().to_string()]));
        } else if let Some((_, parts)) = current.as_mut() {
            parts.push(line.to_string());
        }
    }
    finish(&mut turns, current.take());

    if turns.is_empty() {
        return Err(SegmenterError::EmptyTranscript);
    }
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(index: usize, speaker: &str, text: &str) -> Turn {
        Turn {
            index,
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn one_turn_per_delimiter_line() {
        let turns = segment_transcript("A: hi\nB: hello\nA: bye").unwrap();
        assert_eq!(
            turns,
            vec![turn(0, "A", "hi"), turn(1, "B", "hello"), turn(2, "A", "bye")]
        );
    }

    #[test]
    fn continuation_lines_attach_to_preceding_turn() {
        let turns = segment_transcript("A: hi\nmore\nB: hello").unwrap();
        assert_eq!(turns, vec![turn(0, "A", "hi more"), turn(1, "B", "hello")]);
    }

    #[test]
    fn blank_lines_do_not_terminate_a_turn() {
        let turns = segment_transcript("A: hi\n\nstill talking\n\nB: hello").unwrap();
        assert_eq!(
            turns,
            vec![turn(0, "A", "hi still talking"), turn(1, "B", "hello")]
        );
    }

    #[test]
    fn empty_transcript_is_an_error() {
        assert_eq!(
            segment_transcript(""),
            Err(SegmenterError::EmptyTranscript)
        );
        assert_eq!(
            segment_transcript("   \n\n  \t "),
            Err(SegmenterError::EmptyTranscript)
        );
    }

    #[test]
    fn no_delimiter_lines_is_an_error() {
        assert_eq!(
            segment_transcript("just some prose\nwithout any speakers"),
            Err(SegmenterError::EmptyTranscript)
        );
    }

    #[test]
    fn whitespace_trimmed_from_speaker_and_text() {
        let turns = segment_transcript("  Alice :   hello there  ").unwrap();
        assert_eq!(turns, vec![turn(0, "Alice", "hello there")]);
    }

    #[test]
    fn consecutive_turns_for_same_speaker_stay_distinct() {
        let turns = segment_transcript("A: first\nA: second").unwrap();
        assert_eq!(turns, vec![turn(0, "A", "first"), turn(1, "A", "second")]);
    }

    #[test]
    fn text_on_delimiter_line_may_be_empty() {
        let turns = segment_transcript("A:\ncontinued below\nB: hi").unwrap();
        assert_eq!(
            turns,
            vec![turn(0, "A", "continued below"), turn(1, "B", "hi")]
        );
    }

    #[test]
    fn leading_prose_before_first_delimiter_is_dropped() {
        let turns = segment_transcript("intro prose\nA: hi").unwrap();
        assert_eq!(turns, vec![turn(0, "A", "hi")]);
    }
}
