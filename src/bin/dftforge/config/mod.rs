use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use dft_forge::{FileMap, FunctionalParams};

use crate::cli::InputOptions;

pub fn load_params(path: &Path) -> Result<FunctionalParams> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read functional parameters: {}", path.display()))?;
    FunctionalParams::from_toml(&text)
        .with_context(|| format!("Invalid functional parameters in {}", path.display()))
}

/// Builds the file map from the optional TOML file, then applies `--file`
/// and `--code` overrides in that order.
pub fn build_file_map(opts: &InputOptions) -> Result<FileMap> {
    let mut files = match &opts.files {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read file map: {}", path.display()))?;
            toml::from_str::<FileMap>(&text)
                .with_context(|| format!("Invalid file map in {}", path.display()))?
        }
        None => FileMap::new(),
    };

    for (role, path) in &opts.roles {
        files.insert(role.as_str(), path.as_str());
    }
    if let Some(code) = &opts.code {
        files.insert("code", code.as_str());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn options(files: Option<PathBuf>) -> InputOptions {
        InputOptions {
            config: PathBuf::from("params.toml"),
            files,
            roles: vec![("energy".into(), "OUTCAR.2".into())],
            code: Some("qe".into()),
            quiet: true,
        }
    }

    #[test]
    fn overrides_apply_over_file_map() {
        let mut map = NamedTempFile::new().unwrap();
        writeln!(map, "code = \"vasp\"\nenergy = \"OUTCAR\"\ndensity = \"CHGCAR\"").unwrap();

        let files = build_file_map(&options(Some(map.path().to_path_buf()))).unwrap();
        assert_eq!(files.code(), Some("qe"));
        assert_eq!(files.get("energy"), Some("OUTCAR.2"));
        assert_eq!(files.get("density"), Some("CHGCAR"));
    }

    #[test]
    fn flags_alone_build_a_map() {
        let files = build_file_map(&options(None)).unwrap();
        assert_eq!(files.len(), 2);
    }
}
