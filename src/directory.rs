use crate::error::ParseError;
use crate::reference::COUNTRY_CODE_DE;

use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Half-open character range of a field within a fixed-width record.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub start: usize,
    pub end: usize,
}

impl Field {
    const fn new(start: usize, end: usize) -> Self {
        Field { start, end }
    }

    fn extract(&self, chars: &[char]) -> String {
        let end = self.end.min(chars.len());
        let start = self.start.min(end);
        chars[start..end].iter().collect::<String>().trim().to_string()
    }
}

/// Layout of one record in the Bundesbank bank code directory.
#[derive(Debug, Clone, Copy)]
pub struct FeedLayout {
    pub min_line_len: usize,
    pub bank_code: Field,
    pub bank_name: Field,
    pub bic: Field,
}

pub const BUNDESBANK_LAYOUT: FeedLayout = FeedLayout {
    min_line_len: 168,
    bank_code: Field::new(0, 8),
    bank_name: Field::new(9, 67),
    bic: Field::new(139, 150),
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankRecord {
    country_code: String,
    bank_name: String,
    bank_code: String,
    bic: String,
}

impl BankRecord {
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn bank_code(&self) -> &str {
        &self.bank_code
    }

    pub fn bic(&self) -> &str {
        &self.bic
    }
}

/// In-memory index of bank records keyed by BIC.
///
/// Load once, then share read-only.
#[derive(Debug)]
pub struct BankDirectory {
    layout: FeedLayout,
    country_code: String,
    banks: HashMap<String, BankRecord>,
}

impl Default for BankDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl BankDirectory {
    pub fn new() -> Self {
        Self::with_layout(BUNDESBANK_LAYOUT, COUNTRY_CODE_DE)
    }

    pub fn with_layout(layout: FeedLayout, country_code: &str) -> Self {
        BankDirectory {
            layout,
            country_code: country_code.to_string(),
            banks: HashMap::new(),
        }
    }

    pub fn load_from_path(&mut self, path: &Path) -> Result<usize, ParseError> {
        let file = File::open(path)?;
        let count = self.load(BufReader::new(file))?;
        log::info!("loaded {} bank records from {}", count, path.display());
        Ok(count)
    }

    /// Reads fixed-width records from `reader` and returns how many lines this call processed.
    ///
    /// A line shorter than the layout aborts the load with
    /// [`ParseError::InvalidEntry`]. Records from earlier lines of the same
    /// call are kept in the index even though the call reports an error.
    /// A BIC seen twice keeps the later record. Trailing text after the last
    /// `\n` is not a record and is ignored.
    pub fn load<R: BufRead>(&mut self, mut reader: R) -> Result<usize, ParseError> {
        let mut buf = Vec::new();
        let mut count = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            if !buf.ends_with(b"\n") {
                log::debug!("ignoring {} trailing bytes without a line terminator", buf.len());
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(&['\n', '\r'][..]);
            let chars: Vec<char> = line.chars().collect();
            if chars.len() < self.layout.min_line_len {
                log::warn!(
                    "rejecting bank directory line {}: {} characters",
                    count + 1,
                    chars.len()
                );
                return Err(ParseError::InvalidEntry {
                    line: count + 1,
                    expected: self.layout.min_line_len,
                    actual: chars.len(),
                });
            }

            let record = self.parse_record(&chars);
            self.banks.insert(record.bic.clone(), record);
            count += 1;
        }
        log::debug!(
            "processed {} lines, directory holds {} banks",
            count,
            self.banks.len()
        );
        Ok(count)
    }

    fn parse_record(&self, chars: &[char]) -> BankRecord {
        BankRecord {
            country_code: self.country_code.clone(),
            bank_name: self.layout.bank_name.extract(chars),
            bank_code: self.layout.bank_code.extract(chars),
            bic: self.layout.bic.extract(chars).trim_matches(' ').to_string(),
        }
    }

    /// Exact, case-sensitive lookup of the bank code for a BIC.
    pub fn lookup_bank_code(&self, bic: &str) -> Option<&str> {
        self.banks.get(bic).map(|record| record.bank_code.as_str())
    }

    pub fn get(&self, bic: &str) -> Option<&BankRecord> {
        self.banks.get(bic)
    }

    /// All records in no particular order.
    pub fn list_all(&self) -> Vec<BankRecord> {
        self.banks.values().cloned().collect()
    }

    /// Records whose name contains `query`, closest names first.
    ///
    /// Matching is case-insensitive and ranked by edit distance between the
    /// lowercased name and query. An empty query returns every record unranked.
    pub fn search_by_name(&self, query: &str) -> Vec<&BankRecord> {
        let mut hits: Vec<&BankRecord> = self.banks.values().collect();
        if query.is_empty() {
            return hits;
        }
        let query = query.to_lowercase();
        hits.retain(|record| record.bank_name.to_lowercase().contains(&query));
        hits.sort_by_cached_key(|record| {
            strsim::levenshtein(&record.bank_name.to_lowercase(), &query)
        });
        hits
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }
}
