use std::path::Path;

use oxtkit::{DictType, FontBinding, LanguageTag};

/// Validate file path exists and is a file
pub fn validate_file_path(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Path is not a file: {}", path.display()));
    }

    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return Err(format!("Cannot create output directory: {}", e));
            }
        }
    }

    if path.is_dir() {
        return Err(format!("Output path is a directory: {}", path.display()));
    }

    Ok(())
}

/// Validate language tag syntax (registry membership is checked later)
pub fn validate_language_tag(tag: &str) -> Result<(), String> {
    LanguageTag::parse(tag)
        .map(|_| ())
        .map_err(|e| format!("{}. Expected a BCP 47 tag such as az or az-AZ", e))
}

/// Validate a `ROLE=Family` font assignment
pub fn validate_font_assignment(assignment: &str) -> Result<(), String> {
    FontBinding::parse_assignment(assignment)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Validate a `--dicttype` value
pub fn validate_dict_type(value: &str) -> Result<(), String> {
    value
        .parse::<DictType>()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("words.txt");
        std::fs::write(&file, "a\n").unwrap();

        assert!(validate_file_path(&file).is_ok());
        assert!(validate_file_path(dir.path()).unwrap_err().contains("not a file"));
        assert!(
            validate_file_path(&dir.path().join("missing.txt"))
                .unwrap_err()
                .contains("does not exist")
        );
    }

    #[test]
    fn test_output_path_creates_parent() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/dir/out.oxt");
        assert!(validate_output_path(&out).is_ok());
        assert!(dir.path().join("nested/dir").is_dir());
        assert!(validate_output_path(dir.path()).is_err());
        assert!(validate_output_path(Path::new("out.oxt")).is_ok());
    }

    #[test]
    fn test_language_tag() {
        assert!(validate_language_tag("az").is_ok());
        assert!(validate_language_tag("az_AZ").is_ok());
        assert!(validate_language_tag("qaa-x-mylang").is_ok());
        assert!(validate_language_tag("i-klingon").is_ok());
        assert!(validate_language_tag("").is_err());
        assert!(validate_language_tag("not a tag").is_err());
    }

    #[test]
    fn test_font_and_dict_type() {
        assert!(validate_font_assignment("UI_SANS=\"Noto Sans\"").is_ok());
        assert!(validate_font_assignment("UI_SANS").is_err());
        assert!(validate_dict_type("ptall").is_ok());
        assert!(validate_dict_type("csv").unwrap_err().contains("csv"));
    }
}
