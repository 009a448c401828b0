//! Basket file loading (spec §6): plain text, one symbol per line, `#`
//! comments allowed, blank lines ignored.

use std::fs;
use std::path::Path;

use crate::error::OrchestratorError;

pub fn load_basket(path: &Path) -> Result<Vec<String>, OrchestratorError> {
    let content = fs::read_to_string(path)
        .map_err(|e| OrchestratorError::Config(format!("failed to read basket file '{}': {e}", path.display())))?;

    let symbols: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect();

    if symbols.is_empty() {
        return Err(OrchestratorError::Config(format!("basket file '{}' contains no symbols", path.display())));
    }

    Ok(symbols)
}

/// Derives the basket's display name for the report-directory convention:
/// the file stem, e.g. `nifty50.txt` -> `nifty50`.
pub fn basket_name(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("basket").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let f = write_file("# nifty basket\nRELIANCE\n\nTCS\n# trailing comment\nINFY\n");
        let symbols = load_basket(f.path()).unwrap();
        assert_eq!(symbols, vec!["RELIANCE", "TCS", "INFY"]);
    }

    #[test]
    fn empty_basket_is_a_config_error() {
        let f = write_file("# only comments\n\n");
        assert!(load_basket(f.path()).is_err());
    }

    #[test]
    fn basket_name_uses_file_stem() {
        let path = Path::new("/tmp/nifty50.txt");
        assert_eq!(basket_name(path), "nifty50");
    }
}
