//! Classification of free-form engine output into progress signals.
//!
//! The engine prints no structured progress, and its wording varies across
//! versions and platforms. Each rule below recognises one family of lines;
//! rules are tried in priority order and the first one that recognises a line
//! decides its signal, even when that signal is `NoSignal`.

use nom::{
    bytes::complete::{tag, tag_no_case, take_till1},
    character::complete::{digit1, one_of, space0, space1},
    IResult,
};

use crate::model::ProgressSignal;

type Rule = fn(&str, u32) -> Option<ProgressSignal>;

/// Most specific first
const RULES: &[Rule] = &[page_range_rule, page_rule, page_marker_rule];

/// Classify one line of engine output.
///
/// `known_total` is the page total known so far (0 when unknown). A total is
/// only reported when it exceeds `known_total`, and current pages are clamped
/// to it once it is known.
pub fn classify(line: &str, known_total: u32) -> ProgressSignal {
    RULES
        .iter()
        .find_map(|rule| rule(line, known_total))
        .unwrap_or(ProgressSignal::NoSignal)
}

/// "Processing pages 1 through 42."
fn page_range_rule(line: &str, known_total: u32) -> Option<ProgressSignal> {
    let (_first, last) = scan_words(line, page_range)?;
    if last > known_total {
        Some(ProgressSignal::TotalPages(last))
    } else {
        Some(ProgressSignal::NoSignal)
    }
}

/// "Page 7", "page 7"
fn page_rule(line: &str, known_total: u32) -> Option<ProgressSignal> {
    scan_words(line, page_number).map(|page| current_page(page, known_total))
}

/// "%%Page: iv 4", "page: 4", "page=4", "page #4"
fn page_marker_rule(line: &str, known_total: u32) -> Option<ProgressSignal> {
    scan_words(line, dsc_page_marker)
        .or_else(|| scan_words(line, labelled_page))
        .map(|page| current_page(page, known_total))
}

fn current_page(page: u32, known_total: u32) -> ProgressSignal {
    if known_total > 0 {
        ProgressSignal::CurrentPage(page.min(known_total))
    } else {
        ProgressSignal::CurrentPage(page)
    }
}

/// Run `parser` at every word start in `line`, returning the first match
fn scan_words<'a, T>(line: &'a str, parser: fn(&'a str) -> IResult<&'a str, T>) -> Option<T> {
    let mut previous: Option<char> = None;
    for (idx, c) in line.char_indices() {
        let at_word_start = !previous.is_some_and(|p| p.is_alphanumeric());
        if at_word_start {
            if let Ok((_, value)) = parser(&line[idx..]) {
                return Some(value);
            }
        }
        previous = Some(c);
    }
    None
}

/// Parse a page number that fits in a u32
fn number(input: &str) -> IResult<&str, u32> {
    let (rest, digits) = digit1(input)?;
    match digits.parse::<u32>() {
        Ok(n) => Ok((rest, n)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

/// Succeeds only if the input does not continue the current word
fn word_end(input: &str) -> IResult<&str, ()> {
    match input.chars().next() {
        Some(c) if c.is_alphanumeric() => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
        _ => Ok((input, ())),
    }
}

fn page_range(input: &str) -> IResult<&str, (u32, u32)> {
    let (input, _) = tag_no_case("processing")(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag_no_case("pages")(input)?;
    let (input, _) = space1(input)?;
    let (input, first) = number(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag_no_case("through")(input)?;
    let (input, _) = space1(input)?;
    let (input, last) = number(input)?;
    let (input, _) = word_end(input)?;
    Ok((input, (first, last)))
}

fn page_number(input: &str) -> IResult<&str, u32> {
    let (input, _) = tag_no_case("page")(input)?;
    let (input, _) = space1(input)?;
    let (input, page) = number(input)?;
    let (input, _) = word_end(input)?;
    Ok((input, page))
}

/// PostScript DSC comment: `%%Page: <label> <ordinal>`
fn dsc_page_marker(input: &str) -> IResult<&str, u32> {
    let (input, _) = tag("%%Page:")(input)?;
    let (input, _) = space0(input)?;
    let (input, _label) = take_till1(char::is_whitespace)(input)?;
    let (input, _) = space1(input)?;
    let (input, ordinal) = number(input)?;
    let (input, _) = word_end(input)?;
    Ok((input, ordinal))
}

fn labelled_page(input: &str) -> IResult<&str, u32> {
    let (input, _) = tag_no_case("page")(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = one_of(":=#")(input)?;
    let (input, _) = space0(input)?;
    let (input, page) = number(input)?;
    let (input, _) = word_end(input)?;
    Ok((input, page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProgressSignal::*;

    #[test]
    fn test_processing_pages_sets_total() {
        assert_eq!(classify("Processing pages 1 through 42", 0), TotalPages(42));
        assert_eq!(classify("Processing pages 1 through 42.", 10), TotalPages(42));
    }

    #[test]
    fn test_processing_pages_never_lowers_total() {
        assert_eq!(classify("Processing pages 1 through 42.", 42), NoSignal);
        assert_eq!(classify("Processing pages 1 through 3.", 42), NoSignal);
    }

    #[test]
    fn test_page_line() {
        assert_eq!(classify("Page 7", 42), CurrentPage(7));
        assert_eq!(classify("page 3", 0), CurrentPage(3));
        assert_eq!(classify("PAGE 12", 0), CurrentPage(12));
    }

    #[test]
    fn test_page_clamped_to_known_total() {
        assert_eq!(classify("Page 50", 42), CurrentPage(42));
    }

    #[test]
    fn test_page_inside_sentence() {
        assert_eq!(classify("Writing page 3 of output", 10), CurrentPage(3));
        assert_eq!(classify("[Page 4]", 10), CurrentPage(4));
    }

    #[test]
    fn test_page_requires_word_boundaries() {
        assert_eq!(classify("homepage 3", 10), NoSignal);
        assert_eq!(classify("Page 12a", 0), NoSignal);
        assert_eq!(classify("Pages 3", 0), NoSignal);
    }

    #[test]
    fn test_structural_markers() {
        assert_eq!(classify("%%Page: iv 4", 0), CurrentPage(4));
        assert_eq!(classify("%%Page: 9 9", 5), CurrentPage(5));
        assert_eq!(classify("page: 5", 0), CurrentPage(5));
        assert_eq!(classify("current page=6", 0), CurrentPage(6));
        assert_eq!(classify("page #2", 0), CurrentPage(2));
    }

    #[test]
    fn test_lines_without_signal() {
        assert_eq!(classify("Loading font cache", 0), NoSignal);
        assert_eq!(
            classify("GPL Ghostscript 10.02.1 (2023-11-01)", 0),
            NoSignal
        );
        assert_eq!(classify("Processing started, writing output", 3), NoSignal);
        assert_eq!(classify("", 0), NoSignal);
    }

    #[test]
    fn test_number_overflow_is_not_a_page() {
        assert_eq!(classify("Page 99999999999", 0), NoSignal);
    }

    #[test]
    fn test_captured_engine_session() {
        let lines = [
            "GPL Ghostscript 10.02.1 (2023-11-01)",
            "Copyright (C) 2023 Artifex Software, Inc.  All rights reserved.",
            "Processing pages 1 through 3.",
            "Page 1",
            "Page 2",
            "Loading NimbusSans-Regular font from %rom%Resource/Font/NimbusSans-Regular...",
            "Page 3",
        ];
        let mut total = 0;
        let mut signals = Vec::new();
        for line in lines {
            let signal = classify(line, total);
            if let TotalPages(n) = signal {
                total = n;
            }
            if signal != NoSignal {
                signals.push(signal);
            }
        }
        pretty_assertions::assert_eq!(
            signals,
            vec![TotalPages(3), CurrentPage(1), CurrentPage(2), CurrentPage(3)]
        );
    }
}
