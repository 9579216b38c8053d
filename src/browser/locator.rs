//! CSS locators rendered into single JavaScript element expressions.
//!
//! A locator is a chain of CSS selections, each optionally indexed, scoped to
//! the match of the previous one. This keeps the page objects free of raw
//! JavaScript: they compose locators, the client turns them into one
//! `Runtime.evaluate` round-trip.

#[derive(Debug, Clone)]
pub struct Locator {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
struct Segment {
    selector: String,
    index: usize,
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Self {
            segments: vec![Segment {
                selector: selector.to_string(),
                index: 0,
            }],
        }
    }

    /// Pick the n-th match (0-based) of the last segment.
    pub fn nth(mut self, index: usize) -> Self {
        if let Some(last) = self.segments.last_mut() {
            last.index = index;
        }
        self
    }

    /// Scope a further selection to the current element.
    pub fn child(mut self, selector: &str) -> Self {
        self.segments.push(Segment {
            selector: selector.to_string(),
            index: 0,
        });
        self
    }

    /// JavaScript expression evaluating to the element, or `null` when any
    /// step of the chain has no match.
    pub fn js_element(&self) -> String {
        let mut body = String::from("var el = document;");
        for segment in &self.segments {
            body.push_str(&format!(
                " el = el.querySelectorAll('{}')[{}]; if (!el) return null;",
                escape(&segment.selector),
                segment.index
            ));
        }
        body.push_str(" return el;");
        format!("(function() {{ {} }})()", body)
    }

    /// JavaScript expression counting the matches of the last segment within
    /// the scope established by the preceding ones. Missing scope counts as 0.
    pub fn js_count(&self) -> String {
        let (last, scope) = self
            .segments
            .split_last()
            .expect("locator always has at least one segment");

        let mut body = String::from("var el = document;");
        for segment in scope {
            body.push_str(&format!(
                " el = el.querySelectorAll('{}')[{}]; if (!el) return 0;",
                escape(&segment.selector),
                segment.index
            ));
        }
        body.push_str(&format!(
            " return el.querySelectorAll('{}').length;",
            escape(&last.selector)
        ));
        format!("(function() {{ {} }})()", body)
    }

    /// Human-readable form for error messages.
    pub fn describe(&self) -> String {
        self.segments
            .iter()
            .map(|s| {
                if s.index == 0 {
                    s.selector.clone()
                } else {
                    format!("{}[{}]", s.selector, s.index)
                }
            })
            .collect::<Vec<_>>()
            .join(" >> ")
    }
}

fn escape(selector: &str) -> String {
    selector.replace('\\', "\\\\").replace('\'', "\\'")
}
