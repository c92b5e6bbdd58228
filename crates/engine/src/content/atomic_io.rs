use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes through a sibling temp file so readers never observe a partial file.
pub(crate) fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = sibling_tmp_path(path);
    fs::write(&tmp_path, text.as_bytes())?;
    if let Err(error) = replace_file(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn replace_file(tmp_path: &Path, final_path: &Path) -> io::Result<()> {
    // Windows rename refuses to overwrite.
    match fs::remove_file(final_path) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    fs::rename(tmp_path, final_path)
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "content".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn overwrites_and_leaves_no_temp_file() {
        let temp = TempDir::new().expect("tempdir");
        let target = temp.path().join("nested").join("base.manifest.json");

        write_text_atomic(&target, "first").expect("first write");
        write_text_atomic(&target, "second").expect("second write");

        assert_eq!(fs::read_to_string(&target).expect("read"), "second");
        assert!(!sibling_tmp_path(&target).exists());
    }
}
