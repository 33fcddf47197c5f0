// crates/clapdeck-core/src/sources.rs
//
// The browsable catalog: video sources and their named in/out sub-sections.
// Identity of a source is its url — the catalog never assigns synthetic ids.
//
// Sub-section bounds are stored as timecode text (the user-facing form) and
// parsed to seconds on demand. An unparsable field makes the section invalid;
// invalid sections are skipped by playback, never erased.

use serde::{Deserialize, Serialize};

use crate::helpers::timecode::parse_timecode;

/// A named in/out range over one source, bounds kept as timecode text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoSubSection {
    pub name:  String,
    pub tcin:  String,
    pub tcout: String,
}

impl VideoSubSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), tcin: String::new(), tcout: String::new() }
    }

    /// Both bounds in seconds, in the order the user typed them.
    /// `None` when either field fails to parse.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((parse_timecode(&self.tcin)?, parse_timecode(&self.tcout)?))
    }

    /// A section is playable iff both bounds parse.
    pub fn is_valid(&self) -> bool {
        self.bounds().is_some()
    }
}

/// One entry in the source catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoSource {
    pub name: String,
    pub url:  String,
    #[serde(default)]
    pub sub_sections: Vec<VideoSubSection>,
}

impl VideoSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into(), sub_sections: Vec::new() }
    }

    /// Append an empty section and return its index.
    pub fn add_section(&mut self, name: impl Into<String>) -> usize {
        self.sub_sections.push(VideoSubSection::new(name));
        self.sub_sections.len() - 1
    }

    // Field edits by index. Out-of-range indices are ignored — the UI edits
    // whatever row it is showing, and a stale index is not worth an error.

    pub fn set_section_name(&mut self, idx: usize, name: impl Into<String>) {
        if let Some(s) = self.sub_sections.get_mut(idx) {
            s.name = name.into();
        }
    }

    pub fn set_section_tcin(&mut self, idx: usize, text: impl Into<String>) {
        if let Some(s) = self.sub_sections.get_mut(idx) {
            s.tcin = text.into();
        }
    }

    pub fn set_section_tcout(&mut self, idx: usize, text: impl Into<String>) {
        if let Some(s) = self.sub_sections.get_mut(idx) {
            s.tcout = text.into();
        }
    }

    pub fn remove_section(&mut self, idx: usize) {
        if idx < self.sub_sections.len() {
            self.sub_sections.remove(idx);
        }
    }
}

/// The full list of browsable sources.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourceCatalog {
    pub sources: Vec<VideoSource>,
}

impl SourceCatalog {
    /// Load a catalog from its JSON form.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// The three bundled demo clips.
    pub fn demo() -> Self {
        Self {
            sources: vec![
                VideoSource::new("Anabela", "assets/videos/anabela.mp4"),
                VideoSource::new("Woman", "assets/videos/woman.mp4"),
                VideoSource::new("Woman 2", "assets/videos/woman2.mp4"),
            ],
        }
    }

    /// Look up a source by its identity (the url).
    pub fn by_url(&self, url: &str) -> Option<&VideoSource> {
        self.sources.iter().find(|s| s.url == url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_validity_follows_both_bounds() {
        let mut s = VideoSubSection::new("intro");
        assert!(!s.is_valid());

        s.tcin = "2".into();
        assert!(!s.is_valid()); // tcout still empty

        s.tcout = "1:10".into();
        assert_eq!(s.bounds(), Some((2.0, 70.0)));

        s.tcout = "bad".into();
        assert!(!s.is_valid());
    }

    #[test]
    fn bounds_keep_typed_order() {
        let s = VideoSubSection { name: "rev".into(), tcin: "9".into(), tcout: "4".into() };
        // Normalization is the clock store's job, not the model's.
        assert_eq!(s.bounds(), Some((9.0, 4.0)));
    }

    #[test]
    fn edit_by_index_ignores_stale_rows() {
        let mut src = VideoSource::new("clip", "a.mp4");
        let idx = src.add_section("take 1");
        src.set_section_tcin(idx, "5");
        src.set_section_tcout(idx, "8");
        assert!(src.sub_sections[idx].is_valid());

        // Stale index from a row the UI already dropped — silently ignored.
        src.set_section_name(99, "nope");
        src.remove_section(99);
        assert_eq!(src.sub_sections.len(), 1);

        src.remove_section(idx);
        assert!(src.sub_sections.is_empty());
    }

    #[test]
    fn catalog_json_round_trip() {
        let mut demo = SourceCatalog::demo();
        demo.sources[0].add_section("opening");
        demo.sources[0].set_section_tcin(0, "0:02");
        demo.sources[0].set_section_tcout(0, "0:06.5");

        let json = demo.to_json_string().unwrap();
        let back = SourceCatalog::from_json_str(&json).unwrap();

        assert_eq!(back.sources.len(), 3);
        let first = back.by_url("assets/videos/anabela.mp4").unwrap();
        assert_eq!(first.sub_sections[0].bounds(), Some((2.0, 6.5)));
    }

    #[test]
    fn sub_sections_default_to_empty_on_load() {
        let json = r#"{ "sources": [ { "name": "n", "url": "u.mp4" } ] }"#;
        let cat = SourceCatalog::from_json_str(json).unwrap();
        assert!(cat.sources[0].sub_sections.is_empty());
    }
}
