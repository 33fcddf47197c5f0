// crates/clapdeck-player/src/queue.rs
//
// The playback queue: an ordered run of sub-sections played back to back.
// Built by filtering the requested list down to valid sections (both bounds
// parse) in their original order. Exists only while a multi-section playback
// is in flight; the player drops it on completion, explicit stop, or user
// interruption.

use clapdeck_core::VideoSubSection;

pub struct SectionQueue {
    sections: Vec<VideoSubSection>,
    cursor:   usize,
}

impl SectionQueue {
    /// Filter `list` to its valid sections, preserving order. `None` when
    /// nothing playable remains.
    pub fn from_sections(list: &[VideoSubSection]) -> Option<Self> {
        let sections: Vec<VideoSubSection> =
            list.iter().filter(|s| s.is_valid()).cloned().collect();
        if sections.is_empty() {
            None
        } else {
            Some(Self { sections, cursor: 0 })
        }
    }

    pub fn current(&self) -> Option<&VideoSubSection> {
        self.sections.get(self.cursor)
    }

    /// Advance the cursor; returns the next section, or `None` when the
    /// queue is exhausted.
    pub fn advance(&mut self) -> Option<&VideoSubSection> {
        self.cursor += 1;
        self.current()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, tcin: &str, tcout: &str) -> VideoSubSection {
        VideoSubSection { name: name.into(), tcin: tcin.into(), tcout: tcout.into() }
    }

    #[test]
    fn filters_invalid_sections_preserving_order() {
        let list = vec![
            section("a", "2", "bad"),
            section("b", "4", "6"),
            section("c", "", "9"),
            section("d", "10", "12"),
        ];
        let q = SectionQueue::from_sections(&list).unwrap();
        assert_eq!(q.len(), 2);
        assert_eq!(q.current().unwrap().name, "b");
    }

    #[test]
    fn all_invalid_means_no_queue() {
        let list = vec![section("a", "x", "y"), section("b", "", "")];
        assert!(SectionQueue::from_sections(&list).is_none());
    }

    #[test]
    fn advance_walks_to_exhaustion() {
        let list = vec![section("a", "0", "1"), section("b", "1", "2")];
        let mut q = SectionQueue::from_sections(&list).unwrap();
        assert_eq!(q.current().unwrap().name, "a");
        assert_eq!(q.advance().unwrap().name, "b");
        assert!(q.advance().is_none());
        assert_eq!(q.cursor(), 2);
    }
}
