use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("invalid page selection '{token}': {reason}")]
    Syntax { token: String, reason: &'static str },

    #[error("page {value} is out of range (1-{max})")]
    OutOfRange { value: u64, max: u32 },

    #[error("no pages selected")]
    Empty,
}

impl SelectionError {
    fn syntax(token: &str, reason: &'static str) -> Self {
        SelectionError::Syntax {
            token: token.to_string(),
            reason,
        }
    }
}

/// One component of a selection, in 1-based page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSpec {
    Single(u64),
    Range(u64, u64),
}

impl PageSpec {
    /// Parse a single component like "5" or "3-7"
    pub fn parse(s: &str) -> Result<Self, SelectionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SelectionError::syntax(s, "empty component"));
        }

        match s.split_once('-') {
            Some((start_str, end_str)) => {
                if start_str.trim().is_empty() || end_str.trim().is_empty() {
                    return Err(SelectionError::syntax(s, "range needs both ends"));
                }
                let start = parse_page_number(start_str)?;
                let end = parse_page_number(end_str)?;
                if start > end {
                    return Err(SelectionError::syntax(s, "range start is after its end"));
                }
                Ok(PageSpec::Range(start, end))
            }
            None => Ok(PageSpec::Single(parse_page_number(s)?)),
        }
    }

    fn bounds(&self) -> (u64, u64) {
        match *self {
            PageSpec::Single(n) => (n, n),
            PageSpec::Range(start, end) => (start, end),
        }
    }
}

fn parse_page_number(s: &str) -> Result<u64, SelectionError> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SelectionError::syntax(s, "not a page number"));
    }
    s.parse::<u64>()
        .map_err(|_| SelectionError::syntax(s, "page number too large"))
}

/// Strip the optional `[...]` wrapping used by the legacy list and range flags.
fn strip_brackets(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(s)
}

/// An unresolved page selection: the union of every spec, or every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    specs: Vec<PageSpec>,
    all: bool,
}

impl Selection {
    pub fn all() -> Self {
        Selection {
            specs: Vec::new(),
            all: true,
        }
    }

    /// Parse a combined expression like "1,3-5,7". An empty string selects nothing.
    pub fn parse(expression: &str) -> Result<Self, SelectionError> {
        let mut selection = Selection::default();
        if expression.trim().is_empty() {
            return Ok(selection);
        }
        for part in expression.split(',') {
            selection.specs.push(PageSpec::parse(part)?);
        }
        Ok(selection)
    }

    /// Legacy `--select-index`: one page number.
    pub fn parse_legacy_index(value: &str) -> Result<Self, SelectionError> {
        Ok(Selection {
            specs: vec![PageSpec::Single(parse_page_number(value)?)],
            all: false,
        })
    }

    /// Legacy `--select-range`: a pair like "[2,5]" (or "2-5").
    pub fn parse_legacy_range(value: &str) -> Result<Self, SelectionError> {
        let inner = strip_brackets(value);
        let spec = match inner.split_once(',') {
            Some((start_str, end_str)) => {
                let start = parse_page_number(start_str)?;
                let end = parse_page_number(end_str)?;
                if start > end {
                    return Err(SelectionError::syntax(
                        value,
                        "range start is after its end",
                    ));
                }
                PageSpec::Range(start, end)
            }
            None if inner.contains('-') => PageSpec::parse(inner)?,
            None => return Err(SelectionError::syntax(value, "expected a pair like [2,5]")),
        };
        Ok(Selection {
            specs: vec![spec],
            all: false,
        })
    }

    /// Legacy `--select-list`: explicit numbers like "[1,4,9]" (or "1,4,9").
    pub fn parse_legacy_list(value: &str) -> Result<Self, SelectionError> {
        let inner = strip_brackets(value);
        let specs = inner
            .split(',')
            .map(|n| parse_page_number(n).map(PageSpec::Single))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection { specs, all: false })
    }

    pub fn union(mut self, other: Selection) -> Self {
        self.specs.extend(other.specs);
        self.all |= other.all;
        self
    }

    /// Resolve against a document with `page_count` pages.
    pub fn resolve(&self, page_count: u32) -> Result<PageSet, SelectionError> {
        self.resolve_within(page_count)
    }

    /// Resolve with every 1-based value restricted to `1..=max`.
    pub fn resolve_within(&self, max: u32) -> Result<PageSet, SelectionError> {
        if self.all {
            if max == 0 {
                return Err(SelectionError::Empty);
            }
            return Ok(PageSet((0..max as usize).collect()));
        }
        if self.specs.is_empty() {
            return Err(SelectionError::Empty);
        }

        let mut indices = Vec::new();
        for spec in &self.specs {
            let (start, end) = spec.bounds();
            for value in [start, end] {
                if value == 0 || value > u64::from(max) {
                    return Err(SelectionError::OutOfRange { value, max });
                }
            }
            indices.extend((start - 1) as usize..end as usize);
        }
        indices.sort_unstable();
        indices.dedup();
        Ok(PageSet(indices))
    }
}

/// Ascending, duplicate-free, zero-based page indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet(Vec<usize>);

impl PageSet {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Every index in `0..page_count` that is not selected.
    pub fn complement(&self, page_count: usize) -> Vec<usize> {
        (0..page_count).filter(|i| !self.contains(*i)).collect()
    }
}
