use ai_sentinel::CliOutput;
use std::{fs, io::Write, path::PathBuf};
use tempfile::NamedTempFile;

/// Write CLI output to stdout or to a file
///
/// File output is atomic (temp file in the target directory, then rename)
/// and missing parent directories are created.
pub fn write_output(
    output: &CliOutput,
    output_path: Option<&PathBuf>,
) -> Result<(), std::io::Error> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    match output_path {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    fs::create_dir_all(parent)?;
                    parent
                }
                _ => std::path::Path::new("."),
            };

            let mut temp_file = NamedTempFile::new_in(dir)?;
            temp_file.write_all(json.as_bytes())?;
            temp_file.write_all(b"\n")?;
            temp_file.flush()?;
            temp_file.persist(path)?;

            log::info!("Output written to: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
