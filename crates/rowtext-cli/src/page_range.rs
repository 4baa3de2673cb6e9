//! `--pages` selections such as `1,3-5`.

/// Parse a 1-based page selection into sorted, deduplicated 0-based indices.
///
/// Empty items are ignored, so `"1,,2,"` selects pages 1 and 2. A reversed
/// range like `5-3` is an error rather than an empty selection.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>, String> {
    let mut pages = Vec::new();

    for item in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match item.split_once('-') {
            Some((start, end)) => {
                let start = page_number(start, page_count)?;
                let end = page_number(end, page_count)?;
                if start > end {
                    return Err(format!("reversed page range: '{item}'"));
                }
                pages.extend(start - 1..end);
            }
            None => pages.push(page_number(item, page_count)? - 1),
        }
    }

    if pages.is_empty() {
        return Err(format!("no pages selected by '{input}'"));
    }
    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

fn page_number(token: &str, page_count: usize) -> Result<usize, String> {
    let token = token.trim();
    let page: usize = token
        .parse()
        .map_err(|_| format!("invalid page number: '{token}'"))?;
    match page {
        0 => Err("page 0 is invalid (pages start at 1)".to_string()),
        p if p > page_count => Err(format!(
            "page {p} exceeds document page count ({page_count})"
        )),
        p => Ok(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pages_and_ranges() {
        assert_eq!(parse_page_range("2", 3).unwrap(), vec![1]);
        assert_eq!(parse_page_range("1-3", 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(
            parse_page_range("1-2,5,7-8", 8).unwrap(),
            vec![0, 1, 4, 6, 7]
        );
    }

    #[test]
    fn overlaps_collapse() {
        assert_eq!(parse_page_range("3,1-3,2", 4).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn tolerant_of_spacing_and_empty_items() {
        assert_eq!(parse_page_range(" 1 , 2 - 3 ,", 3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_page_range("0", 2).unwrap_err().contains("page 0"));
        assert!(parse_page_range("3", 2).unwrap_err().contains("exceeds"));
        assert!(parse_page_range("a", 2).unwrap_err().contains("invalid"));
        assert!(parse_page_range("2-1", 2).unwrap_err().contains("reversed"));
        assert!(parse_page_range(",", 2).unwrap_err().contains("no pages"));
    }

    #[test]
    fn empty_document_has_nothing_to_select() {
        assert!(parse_page_range("1", 0).is_err());
    }
}
