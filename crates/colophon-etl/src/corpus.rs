//! Corpus export parser.
//!
//! Turns the flat text export of a reading list into catalog records.
//! The export alternates title and author lines, padded with blank
//! lines, subscription banners, and promotional excerpt blocks, so the
//! parser is a small line-oriented scanner rather than a grammar.

use std::sync::OnceLock;

use regex::Regex;

use colophon_core::model::NewBook;

use crate::config::Config;

/// Publisher assigned at ingestion time, before enrichment has run.
const PLACEHOLDER_PUBLISHER: &str = "Unknown";

/// Regex that recognises a trailing `(<language> Edition)` annotation.
fn edition_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // The pattern is a compile-time constant, so this cannot fail.
        Regex::new(r"(?i)\(([^)]*?)\s*Edition\)").expect("edition pattern is valid")
    })
}

/// Split an edition annotation off a raw title line.
///
/// Returns the cleaned title and the captured language, or `None` when
/// the line carries no edition annotation. The language capture is
/// taken verbatim and may be empty for a bare `(Edition)` marker.
fn split_edition_suffix(raw_title: &str) -> Option<(String, String)> {
    let captures = edition_pattern().captures(raw_title)?;
    let matched = captures.get(0)?.as_str();
    let language = captures.get(1)?.as_str().to_string();
    let clean_title = raw_title.replacen(matched, "", 1).trim().to_string();
    Some((clean_title, language))
}

/// Line scanner for the corpus export format.
///
/// The scanner is configured from [`Config`] so deployments with a
/// different export locale can swap the excerpt marker and noise
/// tokens without touching the code.
#[derive(Debug, Clone)]
pub struct CorpusParser {
    excerpt_marker: String,
    noise_tokens: Vec<String>,
    default_language: String,
    default_format: String,
}

impl CorpusParser {
    /// Create a parser from the loaded configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            // Stored uppercased once; the marker check is case-insensitive.
            excerpt_marker: config.excerpt_marker.to_uppercase(),
            noise_tokens: config.noise_tokens.clone(),
            default_language: config.default_language.clone(),
            default_format: config.default_format.clone(),
        }
    }

    /// Iterate over the catalog records found in `content`.
    #[must_use]
    pub fn candidates<'a>(&'a self, content: &'a str) -> Candidates<'a> {
        Candidates {
            parser: self,
            lines: content.lines().map(str::trim).collect(),
            cursor: 0,
        }
    }

    /// Parse `content` into a vector of catalog records.
    #[must_use]
    pub fn parse(&self, content: &str) -> Vec<NewBook> {
        self.candidates(content).collect()
    }

    /// A noise line matches one of the configured tokens exactly.
    ///
    /// Lines that merely contain a token are real content, so a title
    /// such as "Prime Reading for Fun" survives.
    fn is_noise(&self, line: &str) -> bool {
        self.noise_tokens.iter().any(|token| token == line)
    }

    /// An excerpt header contains the marker anywhere, in any case.
    fn is_excerpt_header(&self, line: &str) -> bool {
        line.to_uppercase().contains(&self.excerpt_marker)
    }

    fn build_record(&self, raw_title: &str, author: &str) -> NewBook {
        let (title, language) = split_edition_suffix(raw_title)
            .unwrap_or_else(|| (raw_title.to_string(), self.default_language.clone()));
        NewBook::new(title, author, language, &self.default_format)
            .with_publishing_house(PLACEHOLDER_PUBLISHER)
    }
}

/// Iterator over the records of one corpus export.
///
/// Lines are trimmed up front; the scanner then walks them once,
/// pairing each title line with the next non-blank, non-noise line as
/// its author. A trailing title with no author line is dropped.
#[derive(Debug)]
pub struct Candidates<'a> {
    parser: &'a CorpusParser,
    lines: Vec<&'a str>,
    cursor: usize,
}

impl Iterator for Candidates<'_> {
    type Item = NewBook;

    fn next(&mut self) -> Option<NewBook> {
        while self.cursor < self.lines.len() {
            let line = self.lines[self.cursor];

            if line.is_empty() || self.parser.is_noise(line) {
                self.cursor += 1;
                continue;
            }

            if self.parser.is_excerpt_header(line) {
                // Skip the marker line plus the next two non-blank lines,
                // the excerpt's own title and author. Noise lines count
                // here: the export prints them as part of the block.
                self.cursor += 1;
                let mut skipped = 0;
                while self.cursor < self.lines.len() && skipped < 2 {
                    if !self.lines[self.cursor].is_empty() {
                        skipped += 1;
                    }
                    self.cursor += 1;
                }
                continue;
            }

            let raw_title = line;
            self.cursor += 1;

            while self.cursor < self.lines.len()
                && (self.lines[self.cursor].is_empty()
                    || self.parser.is_noise(self.lines[self.cursor]))
            {
                self.cursor += 1;
            }
            let author = *self.lines.get(self.cursor)?;
            self.cursor += 1;

            return Some(self.parser.build_record(raw_title, author));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CorpusParser {
        CorpusParser::new(&Config::default())
    }

    #[test]
    fn test_parse_title_author_pairs() {
        let content = "Il nome della rosa\nUmberto Eco\n\nIl Gattopardo\nGiuseppe Tomasi di Lampedusa\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Il nome della rosa");
        assert_eq!(records[0].author, "Umberto Eco");
        assert_eq!(records[0].language, "Italian");
        assert_eq!(records[0].format, "Ebook");
        assert_eq!(
            records[0].publishing_house.as_deref(),
            Some(PLACEHOLDER_PUBLISHER)
        );
        assert_eq!(records[1].title, "Il Gattopardo");
    }

    #[test]
    fn test_lines_are_trimmed() {
        let content = "  Il nome della rosa  \r\n\tUmberto Eco\t\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Il nome della rosa");
        assert_eq!(records[0].author, "Umberto Eco");
    }

    #[test]
    fn test_noise_between_title_and_author_is_skipped() {
        let content = "Il deserto dei Tartari\nPrime Reading\nDino Buzzati\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Il deserto dei Tartari");
        assert_eq!(records[0].author, "Dino Buzzati");
    }

    #[test]
    fn test_noise_requires_exact_match() {
        // A line merely containing the token is real content, so here it
        // becomes a title with the next line as its author.
        let content = "Prime Reading for Fun\nSomeone\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Prime Reading for Fun");
        assert_eq!(records[0].author, "Someone");
    }

    #[test]
    fn test_excerpt_block_is_skipped() {
        let content = "ESTRATTO GRATUITO\nSample Title\nSample Author\nIl barone rampante\nItalo Calvino\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Il barone rampante");
        assert_eq!(records[0].author, "Italo Calvino");
    }

    #[test]
    fn test_excerpt_marker_is_case_insensitive_substring() {
        let content = "Un estratto dal libro\nSkipped One\nSkipped Two\nLessico famigliare\nNatalia Ginzburg\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Lessico famigliare");
    }

    #[test]
    fn test_excerpt_skip_counts_noise_lines() {
        // The two lines consumed after the marker are any non-blank
        // lines, including noise tokens.
        let content = "ESTRATTO\nPrime Reading\nSample Title\nLa Storia\nElsa Morante\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "La Storia");
        assert_eq!(records[0].author, "Elsa Morante");
    }

    #[test]
    fn test_excerpt_block_at_end_of_input() {
        let content = "Il visconte dimezzato\nItalo Calvino\nESTRATTO\nSample Title\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Il visconte dimezzato");
    }

    #[test]
    fn test_edition_suffix_sets_language_and_cleans_title() {
        let content = "Il nome della rosa (Italian Edition)\nUmberto Eco\n";
        let records = parser().parse(content);

        assert_eq!(records[0].title, "Il nome della rosa");
        assert_eq!(records[0].language, "Italian");
    }

    #[test]
    fn test_edition_suffix_is_case_insensitive() {
        let content = "Some Novel (english edition)\nAn Author\n";
        let records = parser().parse(content);

        assert_eq!(records[0].title, "Some Novel");
        assert_eq!(records[0].language, "english");
    }

    #[test]
    fn test_bare_edition_marker_yields_empty_language() {
        let content = "Strano libro (Edition)\nQualcuno\n";
        let records = parser().parse(content);

        assert_eq!(records[0].title, "Strano libro");
        assert_eq!(records[0].language, "");
    }

    #[test]
    fn test_missing_edition_suffix_uses_default_language() {
        let content = "Cristo si è fermato a Eboli\nCarlo Levi\n";
        let records = parser().parse(content);

        assert_eq!(records[0].language, "Italian");
    }

    #[test]
    fn test_non_edition_parenthetical_is_preserved() {
        let content = "La coscienza di Zeno (Oscar classici Vol. 2)\nItalo Svevo\n";
        let records = parser().parse(content);

        assert_eq!(records[0].title, "La coscienza di Zeno (Oscar classici Vol. 2)");
        assert_eq!(records[0].language, "Italian");
    }

    #[test]
    fn test_edition_suffix_mid_title() {
        // Only the annotation is removed; anything after it survives.
        let content = "Il fu Mattia Pascal (Italian Edition) illustrato\nLuigi Pirandello\n";
        let records = parser().parse(content);

        assert_eq!(records[0].title, "Il fu Mattia Pascal  illustrato");
        assert_eq!(records[0].language, "Italian");
    }

    #[test]
    fn test_trailing_title_without_author_is_dropped() {
        let content = "Se questo è un uomo\nPrimo Levi\nOrphan Title\n";
        let records = parser().parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Se questo è un uomo");
    }

    #[test]
    fn test_empty_input_yields_no_records() {
        assert!(parser().parse("").is_empty());
        assert!(parser().parse("\n\n  \n").is_empty());
    }

    #[test]
    fn test_custom_marker_and_noise_tokens() {
        let config = Config {
            excerpt_marker: "SAMPLE".to_string(),
            noise_tokens: vec!["Kindle Unlimited".to_string()],
            ..Config::default()
        };
        let parser = CorpusParser::new(&config);

        let content = "Free sample inside\nOne\nTwo\nKindle Unlimited\nReal Title\nReal Author\n";
        let records = parser.parse(content);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Real Title");
        assert_eq!(records[0].author, "Real Author");
    }

    #[test]
    fn test_candidates_is_lazy() {
        let content = "A\nB\nC\nD\n";
        let parser = parser();
        let mut candidates = parser.candidates(content);

        let first = candidates.next().unwrap();
        assert_eq!(first.title, "A");
        assert_eq!(first.author, "B");

        let second = candidates.next().unwrap();
        assert_eq!(second.title, "C");
        assert_eq!(second.author, "D");

        assert!(candidates.next().is_none());
    }
}
