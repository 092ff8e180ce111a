//! Logical line grouping
//!
//! OCR engines emit fragments in scan order. Fragments whose top edge sits
//! within a vertical tolerance of the reference fragment are joined into one
//! logical line with single spaces.

use sw_core::{LineAnchor, RecognizedFragment};

/// Default vertical tolerance in engine pixels
pub const DEFAULT_TOLERANCE: f32 = 10.0;

/// Groups OCR fragments into logical text lines
#[derive(Debug, Clone)]
pub struct LineGrouper {
    tolerance: f32,
    anchor: LineAnchor,
}

impl LineGrouper {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            anchor: LineAnchor::Previous,
        }
    }

    /// Choose which fragment the tolerance is measured from.
    ///
    /// `LineAnchor::Previous` resets the reference on every fragment, so a
    /// long line that slopes gradually stays one line even when its ends are
    /// further apart than the tolerance. `LineAnchor::LineStart` measures
    /// from the first fragment of the line instead.
    pub fn with_anchor(mut self, anchor: LineAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Group fragments into lines, in input order
    pub fn group(&self, fragments: &[RecognizedFragment]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut reference_y: Option<f32> = None;

        for fragment in fragments {
            let y = fragment.top_left_y;
            let starts_line = match reference_y {
                None => true,
                Some(ref_y) => (ref_y - y).abs() > self.tolerance,
            };

            if starts_line {
                flush(&mut current, &mut lines);
                reference_y = Some(y);
            } else if self.anchor == LineAnchor::Previous {
                reference_y = Some(y);
            }

            current.push(fragment.text.as_str());
        }
        flush(&mut current, &mut lines);

        lines
    }

    /// Group fragments and join the lines with newlines
    pub fn format(&self, fragments: &[RecognizedFragment]) -> String {
        self.group(fragments).join("\n")
    }
}

impl Default for LineGrouper {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

fn flush(current: &mut Vec<&str>, lines: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let line = current.join(" ");
    current.clear();
    if !line.trim().is_empty() {
        lines.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frag(text: &str, y: f32) -> RecognizedFragment {
        RecognizedFragment::new(text, y)
    }

    #[test]
    fn test_empty_input() {
        let grouper = LineGrouper::default();
        assert!(grouper.group(&[]).is_empty());
        assert_eq!(grouper.format(&[]), "");
    }

    #[test]
    fn test_groups_by_vertical_band() {
        let fragments = vec![
            frag("까르띠에", 100.0),
            frag("시간의", 103.0),
            frag("결정", 98.0),
            frag("20240501", 140.0),
            frag("-", 141.0),
            frag("20240630", 139.5),
        ];

        let lines = LineGrouper::default().group(&fragments);
        assert_eq!(lines, vec!["까르띠에 시간의 결정", "20240501 - 20240630"]);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let fragments = vec![frag("a", 0.0), frag("b", 10.0), frag("c", 20.01)];
        let lines = LineGrouper::default().group(&fragments);
        assert_eq!(lines, vec!["a b", "c"]);
    }

    #[test]
    fn test_previous_anchor_drifts() {
        // Each step is within tolerance, the ends are 24px apart
        let fragments = vec![frag("a", 0.0), frag("b", 8.0), frag("c", 16.0), frag("d", 24.0)];

        let drifting = LineGrouper::new(10.0).group(&fragments);
        assert_eq!(drifting, vec!["a b c d"]);

        let anchored = LineGrouper::new(10.0)
            .with_anchor(LineAnchor::LineStart)
            .group(&fragments);
        assert_eq!(anchored, vec!["a b", "c d"]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let fragments = vec![frag(" ", 0.0), frag("주소", 50.0)];
        assert_eq!(LineGrouper::default().format(&fragments), "주소");
    }

    #[test]
    fn test_non_monotonic_input() {
        let fragments = vec![frag("아래", 200.0), frag("위", 10.0), frag("위2", 12.0)];
        let lines = LineGrouper::default().group(&fragments);
        assert_eq!(lines, vec!["아래", "위 위2"]);
    }

    proptest! {
        #[test]
        fn prop_fragments_within_tolerance_form_one_line(
            base in -1000.0f32..1000.0,
            offsets in proptest::collection::vec(0.0f32..9.5, 1..30),
        ) {
            let fragments: Vec<RecognizedFragment> = offsets
                .iter()
                .enumerate()
                .map(|(i, off)| frag(&format!("w{i}"), base + off))
                .collect();

            let lines = LineGrouper::default().group(&fragments);
            prop_assert_eq!(lines.len(), 1);
        }
    }
}
