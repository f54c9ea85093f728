//! Small argument and file helpers shared by the commands

use anyhow::{Context, Result, bail};
use augur_core::AspectRatio;
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// clap value parser for `--aspect-ratio`
pub fn parse_aspect_ratio(value: &str) -> Result<AspectRatio> {
    AspectRatio::from_str(value.trim()).map_err(|_| {
        anyhow::anyhow!("invalid aspect ratio '{value}', expected one of 1:1, 3:4, 4:3, 9:16, 16:9")
    })
}

/// clap value parser for `--birth-date`; accepts `YYYY-MM-DD`
pub fn parse_birth_date(value: &str) -> Result<String> {
    let value = value.trim();
    // chrono accepts single-digit months and days; the zero-padded form is required here
    if value.len() != 10 {
        bail!("invalid date '{value}', expected YYYY-MM-DD");
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("'{value}' is not a calendar date in YYYY-MM-DD form"))?;
    Ok(value.to_string())
}

/// Merges piped stdin and an optional prompt argument into a single prompt.
///
/// Supports usage like:
///   cat dream.txt | augur advice 'what does this mean?'   // stdin + arg
///   cat dream.txt | augur advice                          // stdin only
pub fn merge_stdin_and_prompt(prompt: Option<String>) -> Option<String> {
    let mut stdin_buf = String::new();
    let stdin_piped = !atty::is(atty::Stream::Stdin)
        && std::io::stdin().read_to_string(&mut stdin_buf).is_ok()
        && !stdin_buf.trim().is_empty();

    combine_prompt(stdin_piped.then_some(stdin_buf), prompt)
}

fn combine_prompt(stdin: Option<String>, prompt: Option<String>) -> Option<String> {
    match (stdin, prompt) {
        (Some(stdin), Some(prompt)) => {
            if stdin.ends_with('\n') {
                Some(format!("{stdin}{prompt}"))
            } else {
                Some(format!("{stdin}\n{prompt}"))
            }
        }
        (Some(stdin), None) => Some(stdin),
        (None, prompt) => prompt,
    }
}

/// Write generated media, creating parent directories as needed
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_aspect_ratio() {
        assert_eq!(parse_aspect_ratio("9:16").unwrap(), AspectRatio::Tall);
        assert_eq!(parse_aspect_ratio(" 1:1 ").unwrap(), AspectRatio::Square);
        let err = parse_aspect_ratio("21:9").unwrap_err();
        assert!(err.to_string().contains("expected one of"));
    }

    #[test]
    fn test_parse_birth_date() {
        assert_eq!(parse_birth_date("1990-04-12").unwrap(), "1990-04-12");
        assert_eq!(parse_birth_date("2000-02-29").unwrap(), "2000-02-29");
        assert!(parse_birth_date("1900-02-29").is_err());
        assert!(parse_birth_date("1990-13-01").is_err());
        assert!(parse_birth_date("1990-04-31").is_err());
        assert!(parse_birth_date("12/04/1990").is_err());
        assert!(parse_birth_date("1990-4-12").is_err());
    }

    #[test]
    fn test_combine_prompt() {
        assert_eq!(
            combine_prompt(Some("dream\n".into()), Some("meaning?".into())),
            Some("dream\nmeaning?".to_string())
        );
        assert_eq!(
            combine_prompt(Some("dream".into()), Some("meaning?".into())),
            Some("dream\nmeaning?".to_string())
        );
        assert_eq!(
            combine_prompt(Some("dream".into()), None),
            Some("dream".to_string())
        );
        assert_eq!(combine_prompt(None, None), None);
    }

    #[test]
    fn test_write_output_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/card.jpg");

        write_output(&path, b"jpeg").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg");
    }
}
